//-
// Copyright (c) 2026, The Mailfold Authors
//
// This file is part of Mailfold.
//
// Mailfold is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free
// Software Foundation, either version 3 of the License, or (at your option)
// any later version.
//
// Mailfold is distributed in the hope that it will be useful, but WITHOUT ANY
// WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more
// details.
//
// You should have received a copy of the GNU General Public License along with
// Mailfold. If not, see <http://www.gnu.org/licenses/>.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{} is not a valid Maildir", .0.display())]
    InvalidMaildir(PathBuf),
    #[error("{} is not a directory", .0.display())]
    NotADirectory(PathBuf),
    /// The content could not be written into `tmp`. Nothing was delivered,
    /// but a partial file may be left behind in `tmp`.
    #[error("Failed to write {name} into tmp: {source}")]
    WriteFailed {
        name: String,
        #[source]
        source: io::Error,
    },
    /// The content is fully written into `tmp` but could not be moved into
    /// `new`. Whether the message counts as delivered is up to the caller.
    #[error("Failed to move {name} from tmp to new: {source}")]
    MoveFailed {
        name: String,
        #[source]
        source: io::Error,
    },
    #[error("Message not found: {0}")]
    NotFound(String),
    #[error("Unsafe message name")]
    UnsafeName,
    #[error("Invalid flag: {0:?}")]
    InvalidFlag(char),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Nix(#[from] nix::Error),
}

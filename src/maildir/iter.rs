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

//! Enumeration of the messages in a Maildir.
//!
//! Listing a Maildir first moves everything in `new` into `cur`, so a listing
//! doubles as marking every message as seen. The iterators then walk `cur`
//! lazily in whatever order the file system returns entries. Entries added or
//! removed while iterating may or may not be observed.
//!
//! The iterators are single-pass. Calling `list_names()` again re-reads the
//! directories.

use std::fs;

use log::warn;

use super::filename::logical_name;
use super::Maildir;
use crate::support::error::Error;
use crate::support::safe_name::is_safe_name;

impl Maildir {
    /// Move everything in `new` to `cur`, then iterate the logical names of
    /// everything in `cur`.
    pub fn list_names(&self) -> Result<Names<'_>, Error> {
        self.sweep_new()?;
        Ok(Names {
            maildir: self,
            entries: fs::read_dir(&self.cur_dir)?,
        })
    }

    /// Like `list_names()`, but also reads the content of each message.
    pub fn list_files(&self) -> Result<Files<'_>, Error> {
        Ok(Files {
            names: self.list_names()?,
        })
    }

    /// Like `list_names()`, but also opens each message for reading.
    pub fn list_streams(&self) -> Result<Streams<'_>, Error> {
        Ok(Streams {
            names: self.list_names()?,
        })
    }

    fn sweep_new(&self) -> Result<(), Error> {
        for entry in fs::read_dir(&self.new_dir)? {
            let entry = entry?;
            let filename = entry.file_name();
            match filename.to_str() {
                Some(name) if is_safe_name(name) => self.cur(name)?,
                Some(name) if name.starts_with('.') => (),
                _ => warn!(
                    "{} Leaving unexpected file {:?} in new",
                    self.log_prefix, filename
                ),
            }
        }

        Ok(())
    }
}

/// Iterator over the logical names of the messages in `cur`.
pub struct Names<'a> {
    maildir: &'a Maildir,
    entries: fs::ReadDir,
}

impl Iterator for Names<'_> {
    type Item = Result<String, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.entries.next()? {
                Ok(entry) => entry,
                Err(e) => return Some(Err(e.into())),
            };

            let filename = entry.file_name();
            let filename = match filename.to_str() {
                Some(filename) => filename,
                None => {
                    warn!(
                        "{} Skipping non-UTF-8 file {:?} in cur",
                        self.maildir.log_prefix, filename
                    );
                    continue;
                }
            };

            // Hidden files are not messages
            if filename.starts_with('.') {
                continue;
            }

            let name = logical_name(filename);
            if !is_safe_name(name) {
                warn!(
                    "{} Skipping unaddressable file {:?} in cur",
                    self.maildir.log_prefix, filename
                );
                continue;
            }

            return Some(Ok(name.to_owned()));
        }
    }
}

/// Iterator over the names and contents of the messages in `cur`.
pub struct Files<'a> {
    names: Names<'a>,
}

impl Iterator for Files<'_> {
    type Item = Result<(String, Vec<u8>), Error>;

    fn next(&mut self) -> Option<Self::Item> {
        let name = match self.names.next()? {
            Ok(name) => name,
            Err(e) => return Some(Err(e)),
        };

        Some(self.names.maildir.fetch(&name).map(|content| (name, content)))
    }
}

/// Iterator over the names of the messages in `cur` and open handles to them.
pub struct Streams<'a> {
    names: Names<'a>,
}

impl Iterator for Streams<'_> {
    type Item = Result<(String, fs::File), Error>;

    fn next(&mut self) -> Option<Self::Item> {
        let name = match self.names.next()? {
            Ok(name) => name,
            Err(e) => return Some(Err(e)),
        };

        Some(
            self.names
                .maildir
                .get_stream(&name)
                .map(|stream| (name, stream)),
        )
    }
}

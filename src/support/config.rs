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

use serde::{Deserialize, Serialize};

/// Tunables for a Maildir manager.
///
/// This is typically loaded from a TOML file passed to the command-line tool
/// with `--config`. Every field has a default, so an empty file (or no file at
/// all) gives the standard Maildir behaviour.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct MaildirConfig {
    /// Options relating to how new messages are written.
    #[serde(default)]
    pub delivery: DeliveryConfig,

    /// Options relating to flag changes on seen messages.
    #[serde(default)]
    pub flags: FlagsConfig,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct DeliveryConfig {
    /// The host name embedded in generated message names.
    ///
    /// If unset, the system host name is used. This should be set when
    /// several machines share the Maildir over a network file system and do
    /// not have distinct host names of their own.
    pub host_name: String,

    /// If true, each message is flushed to stable storage before it is moved
    /// into `new`.
    ///
    /// Disabling this makes delivery faster at the cost of possibly exposing
    /// a truncated message after a system crash.
    pub sync: bool,

    /// The UNIX permissions given to delivered message files.
    pub file_mode: u32,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        DeliveryConfig {
            host_name: String::new(),
            sync: true,
            file_mode: 0o600,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct FlagsConfig {
    /// How many times a flag change is retried when another process renamed
    /// the message out from under it.
    ///
    /// With the default of 0, flag changes assume there is at most one
    /// writer per message: if the file was renamed between reading its flags
    /// and renaming it, the error is returned to the caller and the change is
    /// lost. With a positive value, the message is located again, the flags
    /// recomputed from its new name, and the rename retried.
    pub conflict_retries: u32,
}

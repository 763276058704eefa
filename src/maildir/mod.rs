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

//! The Maildir message store.
//!
//! # Layout
//!
//! A Maildir is a directory with exactly three subdirectories:
//!
//! - `tmp/<name>`: a message being written. Files here are private to the
//! process writing them.
//!
//! - `new/<name>`: a delivered message nobody has looked at yet. The file name
//! is exactly the logical name of the message.
//!
//! - `cur/<name>:2,<flags>`: a message which has been seen by some reader.
//! `<flags>` is a sorted string of single-character flags.
//!
//! Each message is exactly one file in exactly one of these directories.
//!
//! # Concurrency
//!
//! There is no locking. Every state change is a single `rename()`, which the
//! file system performs atomically, so concurrent readers never observe a
//! partially-delivered message or a message in two places at once. Moving a
//! message from `new` to `cur` is idempotent, and losing that race to another
//! process is indistinguishable from the message already having been moved.
//!
//! Flag changes read the current file name, compute the new one, and rename.
//! If another process renames the file in between, the source no longer
//! exists and the change fails. By default this is returned to the caller,
//! which amounts to supporting at most one writer per message at a time.
//! `FlagsConfig::conflict_retries` allows locating the message again and
//! recomputing the change instead.
//!
//! Nothing is cached. Each operation on a logical name finds the current file
//! by scanning `cur`, since any cached mapping could go stale the moment
//! another process renames a file.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use log::{debug, error, info, warn};

use crate::support::config::MaildirConfig;
use crate::support::error::Error;
use crate::support::file_ops::{self, ErrorTransforms, IgnoreKinds};
use crate::support::safe_name::is_safe_name;

pub mod filename;
pub mod iter;
pub mod structure;
pub mod unique_name;

use self::filename::{
    format_cur_filename, is_valid_flag, logical_name, parse_cur_filename,
};
use self::unique_name::UniqueNameGenerator;

pub use self::iter::{Files, Names, Streams};

/// A handle on a verified Maildir.
///
/// The handle itself holds no state about the messages within; every method
/// goes straight to the file system.
#[derive(Debug)]
pub struct Maildir {
    log_prefix: String,
    root: PathBuf,
    tmp_dir: PathBuf,
    new_dir: PathBuf,
    cur_dir: PathBuf,
    config: MaildirConfig,
    names: UniqueNameGenerator,
}

impl Maildir {
    /// Create the Maildir structure under `base` and open it.
    ///
    /// `base` must already exist. See `structure::initialize()`.
    pub fn initialize(base: impl AsRef<Path>) -> Result<Self, Error> {
        structure::initialize(base.as_ref())?;
        Maildir::open(base)
    }

    /// Return whether `base` has the structure of a Maildir.
    pub fn verify(base: impl AsRef<Path>) -> bool {
        structure::verify(base.as_ref())
    }

    /// Remove all messages under `base` and the Maildir structure itself.
    pub fn destroy(base: impl AsRef<Path>) -> Result<(), Error> {
        structure::destroy(base.as_ref())
    }

    pub fn open(base: impl AsRef<Path>) -> Result<Self, Error> {
        Maildir::open_with_config(base, MaildirConfig::default())
    }

    /// Open the Maildir at `base`.
    ///
    /// Fails with `Error::InvalidMaildir` if `base` does not have all three
    /// subdirectories.
    pub fn open_with_config(
        base: impl AsRef<Path>,
        config: MaildirConfig,
    ) -> Result<Self, Error> {
        let root = base.as_ref().to_owned();
        if !structure::verify(&root) {
            return Err(Error::InvalidMaildir(root));
        }

        let names = UniqueNameGenerator::new(&config.delivery.host_name)?;

        Ok(Maildir {
            log_prefix: root.display().to_string(),
            tmp_dir: root.join(structure::TMP),
            new_dir: root.join(structure::NEW),
            cur_dir: root.join(structure::CUR),
            root,
            config,
            names,
        })
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &MaildirConfig {
        &self.config
    }

    /// Generate a fresh logical name, as would be used for the next delivery.
    pub fn generate_name(&self) -> String {
        self.names.next_name()
    }

    /// Deliver a message with the given content into `new`.
    ///
    /// Returns the logical name of the new message.
    pub fn save_mail(&self, content: &[u8]) -> Result<String, Error> {
        self.save_mail_from(content)
    }

    /// Deliver a message whose content is read from `content`.
    ///
    /// The content is written into `tmp` under a new unique name and then
    /// renamed into `new`. Errors reading `content` or writing the file are
    /// reported as `Error::WriteFailed`; the rename failing is reported as
    /// `Error::MoveFailed`. In both cases, the file in `tmp` is left alone.
    pub fn save_mail_from(&self, content: impl Read) -> Result<String, Error> {
        self.save_mail_with_flags(content, &[])
    }

    /// Like `save_mail_from()`, but delivers straight into `cur` carrying
    /// `flags` when any are given.
    ///
    /// The message becomes visible through a single rename out of `tmp`, so
    /// no reader ever sees it without its flags.
    pub fn save_mail_with_flags(
        &self,
        content: impl Read,
        flags: &[char],
    ) -> Result<String, Error> {
        if let Some(&flag) = flags.iter().find(|&&f| !is_valid_flag(f)) {
            return Err(Error::InvalidFlag(flag));
        }

        let mut flag_str = String::new();
        for &flag in flags {
            if let Some(updated) = filename::add_flag(&flag_str, flag) {
                flag_str = updated;
            }
        }

        let name = self.names.next_name();
        let tmp_path = self.tmp_dir.join(&name);

        if let Err(source) = file_ops::spit_new(
            &tmp_path,
            self.config.delivery.file_mode,
            self.config.delivery.sync,
            content,
        ) {
            error!(
                "{} Failed to write {}: {}",
                self.log_prefix,
                tmp_path.display(),
                source
            );
            return Err(Error::WriteFailed { name, source });
        }

        let (dest, stage) = if flags.is_empty() {
            (self.new_dir.join(&name), structure::NEW)
        } else {
            (
                self.cur_dir.join(format_cur_filename(&name, &flag_str)),
                structure::CUR,
            )
        };

        if let Err(source) = fs::rename(&tmp_path, dest) {
            error!(
                "{} Failed to move {} into {}: {}",
                self.log_prefix, name, stage, source
            );
            return Err(Error::MoveFailed { name, source });
        }

        info!("{} Delivered {} into {}", self.log_prefix, name, stage);
        Ok(name)
    }

    /// Return whether `name` is in `new`, i.e., has not been seen yet.
    pub fn is_new(&self, name: &str) -> Result<bool, Error> {
        check_name(name)?;
        Ok(self.new_dir.join(name).is_file())
    }

    /// Move `name` from `new` to `cur` with an empty flag set.
    ///
    /// This is a no-op if `name` is not in `new`, whether because it was
    /// already moved (possibly by another process) or never existed.
    pub fn cur(&self, name: &str) -> Result<(), Error> {
        check_name(name)?;
        let moved = fs::rename(
            self.new_dir.join(name),
            self.cur_dir.join(format_cur_filename(name, "")),
        )
        .map(|()| true)
        .ignore_not_found()?;

        if moved {
            debug!("{} Moved {} to cur", self.log_prefix, name);
        }
        Ok(())
    }

    /// Read the full content of `name`, moving it to `cur` first if needed.
    pub fn fetch(&self, name: &str) -> Result<Vec<u8>, Error> {
        let filename = self.resolve(name)?;
        fs::read(self.cur_dir.join(filename))
            .on_not_found(Error::NotFound(name.to_owned()))
    }

    /// Open `name` for reading, moving it to `cur` first if needed.
    pub fn get_stream(&self, name: &str) -> Result<fs::File, Error> {
        let filename = self.resolve(name)?;
        fs::File::open(self.cur_dir.join(filename))
            .on_not_found(Error::NotFound(name.to_owned()))
    }

    /// Return whether `name` exists in either `new` or `cur`.
    pub fn exists(&self, name: &str) -> Result<bool, Error> {
        Ok(self.is_new(name)? || self.find_filename(name)?.is_some())
    }

    /// Delete `name`, wherever it is.
    pub fn remove(&self, name: &str) -> Result<(), Error> {
        check_name(name)?;

        match fs::remove_file(self.new_dir.join(name)) {
            Ok(()) => {
                info!("{} Removed {} from new", self.log_prefix, name);
                return Ok(());
            }
            Err(e) if io::ErrorKind::NotFound == e.kind() => (),
            Err(e) => return Err(e.into()),
        }

        let filename = self
            .find_filename(name)?
            .ok_or_else(|| Error::NotFound(name.to_owned()))?;
        fs::remove_file(self.cur_dir.join(&filename))
            .on_not_found(Error::NotFound(name.to_owned()))?;
        info!("{} Removed {}", self.log_prefix, filename);
        Ok(())
    }

    /// Return the flags on `name`, moving it to `cur` first if needed.
    ///
    /// Returns `None` if there is no such message.
    pub fn get_flags(&self, name: &str) -> Result<Option<String>, Error> {
        self.cur(name)?;
        Ok(self
            .find_filename(name)?
            .map(|filename| parse_cur_filename(&filename).flags.to_owned()))
    }

    /// Return whether `name` currently has `flag`.
    ///
    /// A message that does not exist has no flags.
    pub fn has_flag(&self, name: &str, flag: char) -> Result<bool, Error> {
        Ok(self
            .get_flags(name)?
            .map_or(false, |flags| flags.contains(flag)))
    }

    /// Add `flag` to `name`. Does nothing if the flag is already set.
    pub fn set_flag(&self, name: &str, flag: char) -> Result<(), Error> {
        self.update_flags(name, flag, filename::add_flag, || {
            self.find_filename(name)
        })
    }

    /// Remove every occurrence of `flag` from `name`. Does nothing if the
    /// flag is not set.
    pub fn clear_flag(&self, name: &str, flag: char) -> Result<(), Error> {
        self.update_flags(name, flag, filename::remove_flag, || {
            self.find_filename(name)
        })
    }

    /// Return the current path of `name` without moving it out of `new`.
    pub fn get_path(&self, name: &str) -> Result<Option<PathBuf>, Error> {
        if let Some(filename) = self.find_filename(name)? {
            Ok(Some(self.cur_dir.join(filename)))
        } else if self.is_new(name)? {
            Ok(Some(self.new_dir.join(name)))
        } else {
            Ok(None)
        }
    }

    /// Delete everything in `tmp`, returning the number of files removed.
    ///
    /// Any delivery in progress in another process will fail, so this should
    /// only be run when no deliveries are happening.
    pub fn clear_tmp(&self) -> Result<usize, Error> {
        let removed = file_ops::remove_files_in(&self.tmp_dir)?;
        if removed > 0 {
            info!(
                "{} Removed {} abandoned file(s) from tmp",
                self.log_prefix, removed
            );
        }
        Ok(removed)
    }

    /// Find the file in `cur` whose logical name is `name`.
    ///
    /// This is a linear scan of the directory.
    pub fn find_filename(&self, name: &str) -> Result<Option<String>, Error> {
        check_name(name)?;

        for entry in fs::read_dir(&self.cur_dir)? {
            let entry = entry?;
            let filename = entry.file_name();
            if let Some(filename) = filename.to_str() {
                if name == logical_name(filename) {
                    return Ok(Some(filename.to_owned()));
                }
            }
        }

        Ok(None)
    }

    fn resolve(&self, name: &str) -> Result<String, Error> {
        self.cur(name)?;
        self.find_filename(name)?
            .ok_or_else(|| Error::NotFound(name.to_owned()))
    }

    fn update_flags(
        &self,
        name: &str,
        flag: char,
        update: impl Fn(&str, char) -> Option<String>,
        mut locate: impl FnMut() -> Result<Option<String>, Error>,
    ) -> Result<(), Error> {
        if !is_valid_flag(flag) {
            return Err(Error::InvalidFlag(flag));
        }
        self.cur(name)?;

        let mut retries = self.config.flags.conflict_retries;
        loop {
            let old_filename =
                locate()?.ok_or_else(|| Error::NotFound(name.to_owned()))?;
            let new_flags =
                match update(parse_cur_filename(&old_filename).flags, flag) {
                    Some(flags) => flags,
                    None => return Ok(()),
                };
            let new_filename = format_cur_filename(name, &new_flags);

            match fs::rename(
                self.cur_dir.join(&old_filename),
                self.cur_dir.join(&new_filename),
            ) {
                Ok(()) => {
                    debug!(
                        "{} Renamed {} to {}",
                        self.log_prefix, old_filename, new_filename
                    );
                    return Ok(());
                }
                Err(e) if io::ErrorKind::NotFound == e.kind() && retries > 0 => {
                    retries -= 1;
                    warn!(
                        "{} {} was renamed concurrently, retrying",
                        self.log_prefix, old_filename
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

fn check_name(name: &str) -> Result<(), Error> {
    if is_safe_name(name) {
        Ok(())
    } else {
        Err(Error::UnsafeName)
    }
}

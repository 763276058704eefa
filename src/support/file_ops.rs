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

//! Miscellaneous functions for working with files.

use std::fs;
use std::io::{self, Read, Write};
use std::os::unix::fs::OpenOptionsExt;
use std::path::Path;

use crate::support::error::Error;

/// Create a new file at `path` with the given `mode` and copy everything from
/// `data` into it, returning the number of bytes written.
///
/// The call fails if `path` already exists. If `sync` is true, the file is
/// flushed to stable storage before returning.
///
/// On failure, whatever was written so far is left in place.
pub fn spit_new(
    path: impl AsRef<Path>,
    mode: u32,
    sync: bool,
    mut data: impl Read,
) -> io::Result<u64> {
    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .mode(mode)
        .open(path)?;
    let len = io::copy(&mut data, &mut file)?;
    file.flush()?;
    if sync {
        file.sync_all()?;
    }
    Ok(len)
}

/// Delete every regular file or symlink directly inside `dir`.
///
/// Subdirectories are not descended into. Files that vanish while this runs
/// are ignored. Returns the number of files this call removed.
pub fn remove_files_in(dir: impl AsRef<Path>) -> io::Result<usize> {
    let mut removed = 0;
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            continue;
        }

        match fs::remove_file(entry.path()) {
            Ok(()) => removed += 1,
            Err(e) if io::ErrorKind::NotFound == e.kind() => (),
            Err(e) => return Err(e),
        }
    }

    Ok(removed)
}

pub trait IgnoreKinds {
    fn ignore_not_found(self) -> Self;
}

impl<R: Default> IgnoreKinds for Result<R, io::Error> {
    fn ignore_not_found(self) -> Self {
        match self {
            Ok(r) => Ok(r),
            Err(e) if io::ErrorKind::NotFound == e.kind() => Ok(R::default()),
            Err(e) => Err(e),
        }
    }
}

pub trait ErrorTransforms {
    type Coerced;
    fn on_not_found(self, error: Error) -> Self::Coerced;
}

impl<R, E: Into<Error>> ErrorTransforms for Result<R, E> {
    type Coerced = Result<R, Error>;

    fn on_not_found(self, error: Error) -> Result<R, Error> {
        match self.map_err(|e| e.into()) {
            Err(Error::Io(e)) if io::ErrorKind::NotFound == e.kind() => {
                Err(error)
            }
            s => s,
        }
    }
}

#[cfg(test)]
mod test {
    use std::os::unix::fs::PermissionsExt;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn spit_new_refuses_to_clobber() {
        let root = TempDir::new().unwrap();
        let path = root.path().join("msg");

        assert_eq!(
            5,
            spit_new(&path, 0o600, false, &mut "hello".as_bytes()).unwrap()
        );
        assert_eq!(b"hello".to_vec(), fs::read(&path).unwrap());
        assert_eq!(
            0o600,
            fs::metadata(&path).unwrap().permissions().mode() & 0o777
        );

        let err =
            spit_new(&path, 0o600, true, &mut "world".as_bytes()).unwrap_err();
        assert_eq!(io::ErrorKind::AlreadyExists, err.kind());
        assert_eq!(b"hello".to_vec(), fs::read(&path).unwrap());
    }

    #[test]
    fn remove_files_in_skips_directories() {
        let root = TempDir::new().unwrap();
        fs::write(root.path().join("a"), "a").unwrap();
        fs::write(root.path().join("b"), "b").unwrap();
        fs::create_dir(root.path().join("nested")).unwrap();
        fs::write(root.path().join("nested/c"), "c").unwrap();

        assert_eq!(2, remove_files_in(root.path()).unwrap());
        assert!(!root.path().join("a").exists());
        assert!(!root.path().join("b").exists());
        assert!(root.path().join("nested/c").is_file());
        assert_eq!(0, remove_files_in(root.path()).unwrap());
    }

    #[test]
    fn error_kind_helpers() {
        let nx: io::Result<()> =
            Err(io::Error::new(io::ErrorKind::NotFound, "gone"));
        assert!(nx.ignore_not_found().is_ok());

        let nx: io::Result<()> =
            Err(io::Error::new(io::ErrorKind::NotFound, "gone"));
        assert_matches!(
            Err(Error::NotFound(_)),
            nx.on_not_found(Error::NotFound("foo".to_owned()))
        );

        let denied: io::Result<()> =
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "no"));
        assert_matches!(
            Err(Error::Io(_)),
            denied.on_not_found(Error::NotFound("foo".to_owned()))
        );
    }
}

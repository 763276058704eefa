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

//! Creation, validation, and removal of the Maildir directory skeleton.

use std::fs;
use std::os::unix::fs::DirBuilderExt;
use std::path::Path;

use log::info;

use crate::support::error::Error;
use crate::support::file_ops;

pub const TMP: &str = "tmp";
pub const NEW: &str = "new";
pub const CUR: &str = "cur";

/// The three required subdirectories, in creation order.
pub const SUBDIRS: [&str; 3] = [TMP, NEW, CUR];

/// Create `tmp`, `new`, and `cur` beneath `base`, which must already be a
/// directory.
///
/// This is not idempotent: if any of the subdirectories already exists, the
/// file system error is returned. Subdirectories created before the failure
/// are left in place.
pub fn initialize(base: &Path) -> Result<(), Error> {
    if !base.is_dir() {
        return Err(Error::NotADirectory(base.to_owned()));
    }

    for subdir in &SUBDIRS {
        fs::DirBuilder::new().mode(0o700).create(base.join(subdir))?;
    }

    info!("{} Initialised Maildir", base.display());
    Ok(())
}

/// Return whether `base` has all three subdirectories.
pub fn verify(base: &Path) -> bool {
    SUBDIRS.iter().all(|subdir| base.join(subdir).is_dir())
}

/// Delete the files inside each subdirectory of `base`, then the
/// subdirectories themselves.
///
/// Removal of files is not recursive. A subdirectory containing a nested
/// directory therefore cannot be removed, and the resulting error is returned.
/// Missing subdirectories are skipped.
pub fn destroy(base: &Path) -> Result<(), Error> {
    if !base.is_dir() {
        return Err(Error::NotADirectory(base.to_owned()));
    }

    for subdir in &SUBDIRS {
        let path = base.join(subdir);
        if !path.is_dir() {
            continue;
        }

        file_ops::remove_files_in(&path)?;
        fs::remove_dir(&path)?;
    }

    info!("{} Destroyed Maildir", base.display());
    Ok(())
}

#[cfg(test)]
mod test {
    use std::io;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn initialize_verify_destroy() {
        crate::init_test_log();

        let root = TempDir::new().unwrap();
        assert!(!verify(root.path()));

        initialize(root.path()).unwrap();
        assert!(verify(root.path()));
        for subdir in &SUBDIRS {
            assert!(root.path().join(subdir).is_dir());
        }

        fs::write(root.path().join("tmp/a"), "a").unwrap();
        fs::write(root.path().join("new/b"), "b").unwrap();
        fs::write(root.path().join("cur/c:2,S"), "c").unwrap();

        destroy(root.path()).unwrap();
        assert!(!verify(root.path()));
        for subdir in &SUBDIRS {
            assert!(!root.path().join(subdir).exists());
        }
        // The base directory itself survives
        assert!(root.path().is_dir());
    }

    #[test]
    fn initialize_is_not_idempotent() {
        let root = TempDir::new().unwrap();
        initialize(root.path()).unwrap();

        match initialize(root.path()) {
            Err(Error::Io(e)) => {
                assert_eq!(io::ErrorKind::AlreadyExists, e.kind())
            }
            r => panic!("Unexpected result: {:?}", r),
        }
        assert!(verify(root.path()));
    }

    #[test]
    fn initialize_requires_directory() {
        let root = TempDir::new().unwrap();
        let nx = root.path().join("nx");
        assert_matches!(Err(Error::NotADirectory(_)), initialize(&nx));
        assert!(!nx.exists());

        let file = root.path().join("file");
        fs::write(&file, "").unwrap();
        assert_matches!(Err(Error::NotADirectory(_)), initialize(&file));
    }

    #[test]
    fn verify_requires_all_subdirectories() {
        let root = TempDir::new().unwrap();
        fs::create_dir(root.path().join("tmp")).unwrap();
        fs::create_dir(root.path().join("new")).unwrap();
        assert!(!verify(root.path()));

        fs::write(root.path().join("cur"), "").unwrap();
        assert!(!verify(root.path()));
    }

    #[test]
    fn destroy_skips_missing_subdirectories() {
        let root = TempDir::new().unwrap();
        fs::create_dir(root.path().join("new")).unwrap();
        fs::write(root.path().join("new/a"), "a").unwrap();

        destroy(root.path()).unwrap();
        assert!(!root.path().join("new").exists());
    }

    #[test]
    fn destroy_is_not_recursive() {
        let root = TempDir::new().unwrap();
        initialize(root.path()).unwrap();
        fs::create_dir(root.path().join("cur/nested")).unwrap();
        fs::write(root.path().join("cur/loose"), "").unwrap();

        assert_matches!(Err(Error::Io(_)), destroy(root.path()));
        assert!(root.path().join("cur/nested").is_dir());
        assert!(!root.path().join("cur/loose").exists());
    }

    #[test]
    fn destroy_requires_directory() {
        let root = TempDir::new().unwrap();
        assert_matches!(
            Err(Error::NotADirectory(_)),
            destroy(&root.path().join("nx"))
        );
    }
}

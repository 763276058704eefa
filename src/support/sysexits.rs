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

//! Constants from `sysexits.h`
//!
//! Delivery agents are expected to follow the sendmail/procmail conventions
//! for exit codes, so the command-line tool uses them throughout.

use std::io;

use super::error::Error;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub struct Sysexit(pub i32);

/// Not part of `sysexits.h`; used when a query answers "no".
pub const EX_FALSE: Sysexit = Sysexit(1);
pub const EX_USAGE: Sysexit = Sysexit(64);
pub const EX_DATAERR: Sysexit = Sysexit(65);
pub const EX_NOINPUT: Sysexit = Sysexit(66);
pub const EX_SOFTWARE: Sysexit = Sysexit(70);
pub const EX_OSERR: Sysexit = Sysexit(71);
pub const EX_CANTCREAT: Sysexit = Sysexit(73);
pub const EX_IOERR: Sysexit = Sysexit(74);
pub const EX_CONFIG: Sysexit = Sysexit(78);

impl Sysexit {
    pub fn exit(self) -> ! {
        std::process::exit(self.0)
    }
}

impl From<&Error> for Sysexit {
    fn from(e: &Error) -> Self {
        match *e {
            Error::InvalidMaildir(_) | Error::NotADirectory(_) => EX_CONFIG,
            Error::NotFound(_) => EX_NOINPUT,
            Error::Io(ref e) if io::ErrorKind::NotFound == e.kind() => {
                EX_NOINPUT
            }
            Error::UnsafeName | Error::InvalidFlag(_) => EX_DATAERR,
            Error::WriteFailed { .. } | Error::MoveFailed { .. } => {
                EX_CANTCREAT
            }
            Error::Nix(_) => EX_OSERR,
            Error::Io(_) => EX_IOERR,
        }
    }
}

#[cfg(test)]
mod test {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn error_mapping() {
        assert_eq!(
            EX_CONFIG,
            Sysexit::from(&Error::InvalidMaildir(PathBuf::from("/nx")))
        );
        assert_eq!(
            EX_NOINPUT,
            Sysexit::from(&Error::NotFound("foo".to_owned()))
        );
        assert_eq!(EX_DATAERR, Sysexit::from(&Error::InvalidFlag('/')));
        assert_eq!(
            EX_CANTCREAT,
            Sysexit::from(&Error::MoveFailed {
                name: "foo".to_owned(),
                source: io::Error::new(io::ErrorKind::Other, "x"),
            })
        );
        assert_eq!(
            EX_IOERR,
            Sysexit::from(&Error::Io(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "x"
            )))
        );
    }
}

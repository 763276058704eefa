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

//! Parsing and formatting of file names in `cur`.
//!
//! A file in `cur` is named `<logical-name>:2,<flags>`, where `2` is a fixed
//! version literal and `<flags>` is a string of single-character flags in
//! ascending order without duplicates. This module is the only place that
//! splits or joins such names.
//!
//! Other software sharing the Maildir may leave names that do not follow the
//! canonical form (unsorted or duplicated flags, a different info version, or
//! no info section at all). Those are parsed leniently: the logical name is
//! always everything before the first `:`, and only a `2,` info section
//! carries flags.

use std::collections::BTreeSet;

/// Separates the logical name from the info section.
pub const INFO_SEPARATOR: char = ':';
/// Prefix of the only info section format that carries flags.
pub const INFO_VERSION: &str = "2,";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CurFilename<'a> {
    pub name: &'a str,
    pub flags: &'a str,
}

pub fn parse_cur_filename(filename: &str) -> CurFilename<'_> {
    match filename.find(INFO_SEPARATOR) {
        None => CurFilename {
            name: filename,
            flags: "",
        },
        Some(ix) => {
            let info = &filename[ix + 1..];
            CurFilename {
                name: &filename[..ix],
                flags: if info.starts_with(INFO_VERSION) {
                    &info[INFO_VERSION.len()..]
                } else {
                    ""
                },
            }
        }
    }
}

pub fn format_cur_filename(name: &str, flags: &str) -> String {
    let mut s =
        String::with_capacity(name.len() + 1 + INFO_VERSION.len() + flags.len());
    s.push_str(name);
    s.push(INFO_SEPARATOR);
    s.push_str(INFO_VERSION);
    s.push_str(flags);
    s
}

/// Return the logical name of any entry in `new` or `cur`.
pub fn logical_name(filename: &str) -> &str {
    parse_cur_filename(filename).name
}

/// Whether `flag` may appear in a flag suffix.
///
/// Flags are conventionally upper-case letters, with lower-case letters used
/// as keywords by some clients. Anything printable is accepted except the
/// characters which have structural meaning in file names.
pub fn is_valid_flag(flag: char) -> bool {
    flag.is_ascii_graphic() && !matches!(flag, '/' | ':' | ',')
}

/// Compute the flag string that results from adding `flag` to `flags`.
///
/// Returns `None` if `flags` already contains `flag`, in which case the file
/// must not be renamed. Otherwise the result is sorted and deduplicated.
pub fn add_flag(flags: &str, flag: char) -> Option<String> {
    if flags.contains(flag) {
        return None;
    }

    Some(
        flags
            .chars()
            .chain(std::iter::once(flag))
            .collect::<BTreeSet<char>>()
            .into_iter()
            .collect(),
    )
}

/// Compute the flag string that results from removing every occurrence of
/// `flag` from `flags`.
///
/// Returns `None` if `flags` does not contain `flag`. The order of the
/// remaining flags is left untouched.
pub fn remove_flag(flags: &str, flag: char) -> Option<String> {
    if !flags.contains(flag) {
        return None;
    }

    Some(flags.chars().filter(|&c| c != flag).collect())
}

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

/// Determine whether the given logical message name is "safe".
///
/// Logical names are joined directly onto the `new` and `cur` directories, so
/// this excludes empty names and anything that could escape the directory or
/// be mistaken for something other than a message. The `:` character is
/// reserved as the separator between the logical name and the flag suffix.
///
/// This does not care about whether the name is ultimately a valid file name;
/// for that, we simply rely on the OS rejecting it.
pub fn is_safe_name(name: &str) -> bool {
    !name.is_empty() &&
        // Block directory traversal through .. and hidden files, which Maildir
        // readers are expected to ignore
        name.chars().next() != Some('.') &&
        name.find('/').is_none() &&
        name.find(':').is_none() &&
        // Don't allow any ASCII control characters
        name.find(|c| c < ' ' || c == '\x7F').is_none()
}

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

//! Generation of unique message names.
//!
//! Names have the form `<sec>.M<usec>P<pid>Q<counter>.<host>`. The counter
//! separates names generated by one process within the same microsecond. The
//! host name separates machines sharing the Maildir over a network file
//! system.
//!
//! Nothing checks whether a name is already in use. Delivery into `tmp` uses
//! an exclusive create, so a collision there fails the delivery instead of
//! overwriting anything.

use std::fmt::Write as _;
use std::sync::atomic::{AtomicU64, Ordering::SeqCst};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::support::error::Error;

/// Process-wide; shared by every generator.
static NAME_COUNTER: AtomicU64 = AtomicU64::new(0);

#[derive(Clone, Debug)]
pub struct UniqueNameGenerator {
    host_name: String,
}

impl UniqueNameGenerator {
    /// Create a generator embedding `host_name`, or the system host name if
    /// `host_name` is empty.
    pub fn new(host_name: &str) -> Result<Self, Error> {
        let host_name = if host_name.is_empty() {
            system_host_name()?
        } else {
            host_name.to_owned()
        };

        Ok(UniqueNameGenerator {
            host_name: escape_host_name(&host_name),
        })
    }

    pub fn host_name(&self) -> &str {
        &self.host_name
    }

    pub fn next_name(&self) -> String {
        // Clocks before 1970 read as zero
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        let counter = NAME_COUNTER.fetch_add(1, SeqCst) + 1;
        // Looked up on every call; a forked child inherits the counter
        let pid = nix::unistd::getpid();

        format!(
            "{}.M{}P{}Q{}.{}",
            now.as_secs(),
            now.subsec_micros(),
            pid,
            counter,
            self.host_name
        )
    }
}

fn system_host_name() -> Result<String, Error> {
    let mut buf = [0u8; 256];
    let host_name = nix::unistd::gethostname(&mut buf)?;
    Ok(host_name.to_string_lossy().into_owned())
}

/// Make `host_name` safe for use within a logical name.
///
/// Following the usual Maildir convention, `/` is written as `\057` and `:` as
/// `\072`. Control characters are dropped.
fn escape_host_name(host_name: &str) -> String {
    let mut escaped = String::with_capacity(host_name.len());
    for ch in host_name.chars() {
        match ch {
            '/' | ':' => {
                let _ = write!(escaped, "\\{:03o}", ch as u32);
            }
            ch if ch.is_control() => (),
            ch => escaped.push(ch),
        }
    }

    if escaped.is_empty() {
        escaped.push_str("localhost");
    }

    escaped
}

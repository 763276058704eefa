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

use std::path::Path;

use mailfold::support::sysexits::*;

pub(super) fn init(log_config: Option<&Path>, verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    if Ok(true) == nix::unistd::isatty(2) {
        // Running interactively; ignore logging configuration and just write
        // to stderr.
        if let Err(e) = mailfold::init_simple_log(level) {
            eprintln!("Failed to initialise logging: {}", e);
            EX_SOFTWARE.exit();
        }
    } else if let Some(log_config) = log_config {
        if let Err(e) =
            log4rs::init_file(log_config, log4rs::file::Deserializers::new())
        {
            eprintln!(
                "Failed to load logging configuration '{}': {}",
                log_config.display(),
                e
            );
            EX_CONFIG.exit();
        }
    } else {
        // Delivery agents are usually run by an MTA which discards stderr, so
        // the log goes to the mail facility by default.
        let formatter = syslog::Formatter3164 {
            facility: syslog::Facility::LOG_MAIL,
            hostname: None,
            process: env!("CARGO_PKG_NAME").to_owned(),
            pid: nix::unistd::getpid().as_raw(),
        };

        let logger = match syslog::unix(formatter) {
            Ok(logger) => logger,
            Err(e) => {
                eprintln!("Failed to connect to syslog: {}", e);
                EX_OSERR.exit()
            }
        };

        if let Err(e) =
            log::set_boxed_logger(Box::new(syslog::BasicLogger::new(logger)))
                .map(|_| log::set_max_level(level))
        {
            eprintln!("Failed to initialise logging: {}", e);
            EX_SOFTWARE.exit();
        }
    }
}

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

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use structopt::StructOpt;

use mailfold::support::config::MaildirConfig;
use mailfold::support::sysexits::*;
use mailfold::Maildir;

#[derive(StructOpt)]
#[structopt(max_term_width = 80)]
enum Command {
    /// Turn an existing directory into a Maildir.
    ///
    /// This creates the `tmp`, `new`, and `cur` subdirectories. It fails if
    /// any of them already exist.
    Init(MaildirOptions),
    /// Check whether a directory is a Maildir.
    ///
    /// Exits with status 0 if it is and 1 if it is not.
    Verify(MaildirOptions),
    /// Delete every message in a Maildir and its subdirectories.
    ///
    /// The directory given is left in place. Nested directories inside `tmp`,
    /// `new`, or `cur` are not removed, and cause this command to fail.
    Destroy(MaildirOptions),
    Deliver(DeliverSubcommand),
    List(ListSubcommand),
    /// Write the content of a message to standard output.
    ///
    /// This marks the message as seen.
    Cat(MessageOptions),
    /// Print the flags of a message.
    ///
    /// This marks the message as seen.
    Flags(MessageOptions),
    /// Add a flag to a message.
    SetFlag(FlagOptions),
    /// Remove a flag from a message.
    ClearFlag(FlagOptions),
    /// Delete a message.
    Rm(MessageOptions),
    /// Print the path to the file currently holding a message.
    ///
    /// Unlike most other commands, this does not mark the message as seen.
    Path(MessageOptions),
    /// Delete abandoned files from `tmp`.
    ///
    /// Deliveries in progress will fail if this is run concurrently with
    /// them.
    ClearTmp(MaildirOptions),
    /// Print a fresh unique message name.
    Name(MaildirOptions),
}

#[derive(StructOpt, Clone, Default)]
pub(super) struct MaildirOptions {
    /// Load Maildir options from this TOML file.
    #[structopt(long, parse(from_os_str))]
    pub(super) config: Option<PathBuf>,

    /// Configure logging with this log4rs TOML file instead of syslog. Has no
    /// effect when standard error is a terminal.
    #[structopt(long, parse(from_os_str))]
    pub(super) log_config: Option<PathBuf>,

    /// Log debugging information.
    #[structopt(short, long)]
    pub(super) verbose: bool,

    /// The Maildir to operate on.
    #[structopt(parse(from_os_str))]
    pub(super) maildir: PathBuf,
}

#[derive(StructOpt)]
pub(super) struct MessageOptions {
    #[structopt(flatten)]
    pub(super) common: MaildirOptions,

    /// The name of the message, without any flag suffix.
    pub(super) name: String,
}

#[derive(StructOpt)]
pub(super) struct FlagOptions {
    #[structopt(flatten)]
    pub(super) common: MaildirOptions,

    /// The name of the message, without any flag suffix.
    pub(super) name: String,

    /// The flag, such as 'S' (seen) or 'F' (flagged).
    pub(super) flag: char,
}

/// Deliver messages into a Maildir.
///
/// By default, this reads a single message from standard input. The name of
/// each delivered message is printed on its own line.
///
/// Messages are delivered into `new` unless flags are requested, in which
/// case they are moved into `cur` right after delivery.
///
/// Another Maildir can be imported by passing all its files into this command
/// individually. For example:
///
/// ls Maildir/cur/* | xargs -d'\n' mailfold deliver --maildir-flags target
#[derive(StructOpt)]
pub(super) struct DeliverSubcommand {
    #[structopt(flatten)]
    pub(super) common: MaildirOptions,

    /// Add this flag (e.g., 'S') to the delivered message(s). Can be passed
    /// multiple times.
    #[structopt(short, long, number_of_values(1))]
    pub(super) flag: Vec<char>,

    /// Extract flags from the ":2," suffix of the input file name(s).
    #[structopt(long)]
    pub(super) maildir_flags: bool,

    /// The files to deliver. "-" will read from stdin.
    #[structopt(parse(from_os_str), default_value = "-")]
    pub(super) inputs: Vec<PathBuf>,
}

/// List the names of the messages in a Maildir.
///
/// This moves every message in `new` into `cur`, i.e., marks everything as
/// seen. Names are printed in no particular order.
#[derive(StructOpt)]
pub(super) struct ListSubcommand {
    #[structopt(flatten)]
    pub(super) common: MaildirOptions,

    /// Print the flags of each message after its name.
    #[structopt(short, long)]
    pub(super) long: bool,
}

impl Command {
    fn common_options(&self) -> &MaildirOptions {
        match *self {
            Command::Init(ref c)
            | Command::Verify(ref c)
            | Command::Destroy(ref c)
            | Command::ClearTmp(ref c)
            | Command::Name(ref c) => c,

            Command::Cat(ref c)
            | Command::Flags(ref c)
            | Command::Rm(ref c)
            | Command::Path(ref c) => &c.common,

            Command::SetFlag(ref c) | Command::ClearFlag(ref c) => &c.common,

            Command::Deliver(ref c) => &c.common,
            Command::List(ref c) => &c.common,
        }
    }
}

pub fn main() {
    // Clap exits with status 1 instead of EX_USAGE if we use the more concise
    // API
    let cmd = Command::from_clap(&match Command::clap().get_matches_safe() {
        Ok(matches) => matches,
        Err(
            e @ clap::Error {
                kind: clap::ErrorKind::HelpDisplayed,
                ..
            },
        )
        | Err(
            e @ clap::Error {
                kind: clap::ErrorKind::VersionDisplayed,
                ..
            },
        ) => {
            println!("{}", e.message);
            return;
        }
        Err(e) => {
            eprintln!("{}", e.message);
            EX_USAGE.exit()
        }
    });

    let common = cmd.common_options().clone();
    super::logging::init(common.log_config.as_deref(), common.verbose);

    let result = match cmd {
        Command::Init(_) => Maildir::initialize(&common.maildir).map(|_| ()),
        Command::Verify(_) => {
            if Maildir::verify(&common.maildir) {
                return;
            }
            eprintln!("{} is not a Maildir", common.maildir.display());
            EX_FALSE.exit()
        }
        Command::Destroy(_) => Maildir::destroy(&common.maildir),
        Command::Deliver(cmd) => super::deliver::deliver(cmd, &open(&common)),
        Command::List(cmd) => super::mailbox::list(cmd, &open(&common)),
        Command::Cat(cmd) => super::mailbox::cat(cmd, &open(&common)),
        Command::Flags(cmd) => super::mailbox::flags(cmd, &open(&common)),
        Command::SetFlag(cmd) => {
            super::mailbox::set_flag(cmd, &open(&common))
        }
        Command::ClearFlag(cmd) => {
            super::mailbox::clear_flag(cmd, &open(&common))
        }
        Command::Rm(cmd) => super::mailbox::rm(cmd, &open(&common)),
        Command::Path(cmd) => super::mailbox::path(cmd, &open(&common)),
        Command::ClearTmp(_) => super::mailbox::clear_tmp(&open(&common)),
        Command::Name(_) => {
            println!("{}", open(&common).generate_name());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        Sysexit::from(&e).exit();
    }
}

fn open(common: &MaildirOptions) -> Maildir {
    let config = match common.config {
        Some(ref path) => load_config(path),
        None => MaildirConfig::default(),
    };

    match Maildir::open_with_config(&common.maildir, config) {
        Ok(maildir) => maildir,
        Err(e) => {
            eprintln!("{}", e);
            Sysexit::from(&e).exit()
        }
    }
}

fn load_config(path: &Path) -> MaildirConfig {
    let mut config_toml = Vec::new();
    if let Err(e) =
        fs::File::open(path).and_then(|mut f| f.read_to_end(&mut config_toml))
    {
        eprintln!("Error reading '{}': {}", path.display(), e);
        EX_CONFIG.exit();
    }

    match toml::from_slice(&config_toml) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error in config file at '{}': {}", path.display(), e);
            EX_CONFIG.exit()
        }
    }
}

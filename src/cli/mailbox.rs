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

//! The subcommands that operate on individual messages.

use std::io::{self, Write};

use chrono::prelude::*;

use super::main::{FlagOptions, ListSubcommand, MessageOptions};
use mailfold::{Error, Maildir};

pub(super) fn list(
    cmd: ListSubcommand,
    maildir: &Maildir,
) -> Result<(), Error> {
    write_list(cmd.long, maildir, &mut io::stdout().lock())
}

pub(super) fn cat(cmd: MessageOptions, maildir: &Maildir) -> Result<(), Error> {
    let mut stream = maildir.get_stream(&cmd.name)?;
    io::copy(&mut stream, &mut io::stdout().lock())?;
    Ok(())
}

pub(super) fn flags(
    cmd: MessageOptions,
    maildir: &Maildir,
) -> Result<(), Error> {
    let flags = maildir
        .get_flags(&cmd.name)?
        .ok_or_else(|| Error::NotFound(cmd.name.clone()))?;
    println!("{}", flags);
    Ok(())
}

pub(super) fn set_flag(
    cmd: FlagOptions,
    maildir: &Maildir,
) -> Result<(), Error> {
    maildir.set_flag(&cmd.name, cmd.flag)
}

pub(super) fn clear_flag(
    cmd: FlagOptions,
    maildir: &Maildir,
) -> Result<(), Error> {
    maildir.clear_flag(&cmd.name, cmd.flag)
}

pub(super) fn rm(cmd: MessageOptions, maildir: &Maildir) -> Result<(), Error> {
    maildir.remove(&cmd.name)
}

pub(super) fn path(
    cmd: MessageOptions,
    maildir: &Maildir,
) -> Result<(), Error> {
    let path = maildir
        .get_path(&cmd.name)?
        .ok_or_else(|| Error::NotFound(cmd.name.clone()))?;
    println!("{}", path.display());
    Ok(())
}

pub(super) fn clear_tmp(maildir: &Maildir) -> Result<(), Error> {
    println!("{}", maildir.clear_tmp()?);
    Ok(())
}

fn write_list(
    long: bool,
    maildir: &Maildir,
    out: &mut impl Write,
) -> Result<(), Error> {
    for name in maildir.list_names()? {
        let name = name?;
        if !long {
            writeln!(out, "{}", name)?;
            continue;
        }

        // The message may have been removed since it was listed
        let flags = match maildir.get_flags(&name)? {
            Some(flags) => flags,
            None => continue,
        };
        let delivered = delivery_time(&name)
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "-".to_owned());
        writeln!(out, "{}\t{}\t{}", name, delivered, flags)?;
    }

    Ok(())
}

/// Recover the delivery time from the leading seconds field of a unique
/// name, if the name looks like one.
fn delivery_time(name: &str) -> Option<DateTime<Local>> {
    let seconds = name.split('.').next()?.parse::<i64>().ok()?;
    Local.timestamp_opt(seconds, 0).single()
}

#[cfg(test)]
mod test {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn delivery_time_from_name() {
        let t = delivery_time("1600000000.M1P2Q3.host").unwrap();
        assert_eq!(1600000000, t.timestamp());

        assert!(delivery_time("foo.bar").is_none());
        assert!(delivery_time("").is_none());
    }

    #[test]
    fn long_listing() {
        let root = TempDir::new().unwrap();
        let maildir = Maildir::initialize(root.path()).unwrap();
        let name = maildir.save_mail(b"hello").unwrap();
        maildir.set_flag(&name, 'S').unwrap();

        let mut out = Vec::<u8>::new();
        write_list(false, &maildir, &mut out).unwrap();
        assert_eq!(format!("{}\n", name), String::from_utf8(out).unwrap());

        let mut out = Vec::<u8>::new();
        write_list(true, &maildir, &mut out).unwrap();
        let out = String::from_utf8(out).unwrap();
        let fields: Vec<&str> = out.trim_end().split('\t').collect();
        assert_eq!(3, fields.len());
        assert_eq!(name, fields[0]);
        assert_ne!("-", fields[1]);
        assert_eq!("S", fields[2]);
    }
}

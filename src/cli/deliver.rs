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
use std::io::{self, BufRead, Read};
use std::mem;
use std::path::{Path, PathBuf};

use log::error;

use super::main::DeliverSubcommand;
use mailfold::maildir::filename::{is_valid_flag, parse_cur_filename};
use mailfold::{Error, Maildir};

pub(super) fn deliver(
    mut cmd: DeliverSubcommand,
    maildir: &Maildir,
) -> Result<(), Error> {
    if let Some(&flag) = cmd.flag.iter().find(|&&f| !is_valid_flag(f)) {
        return Err(Error::InvalidFlag(flag));
    }

    let items = mem::take(&mut cmd.inputs);
    let names =
        run_delivery(&cmd, items.into_iter(), io::stdin().lock(), maildir)?;
    for name in names {
        println!("{}", name);
    }

    Ok(())
}

trait DeliveryTarget {
    fn deliver<R: Read>(
        &self,
        flags: &[char],
        data: R,
    ) -> Result<String, Error>;
}

impl DeliveryTarget for Maildir {
    fn deliver<R: Read>(
        &self,
        flags: &[char],
        data: R,
    ) -> Result<String, Error> {
        self.save_mail_with_flags(data, flags)
    }
}

fn run_delivery(
    cmd: &DeliverSubcommand,
    items: impl Iterator<Item = PathBuf>,
    mut stdin: impl Read,
    target: &impl DeliveryTarget,
) -> Result<Vec<String>, Error> {
    let mut names = Vec::new();
    for item in items {
        match deliver_single(cmd, &item, &mut stdin, target) {
            Ok(name) => names.push(name),
            Err(e) => {
                error!("Unable to process {}: {}", item.display(), e);
                // Report what did make it in before giving up
                for name in names {
                    println!("{}", name);
                }
                return Err(e);
            }
        }
    }

    Ok(names)
}

fn deliver_single(
    cmd: &DeliverSubcommand,
    item: &Path,
    stdin: &mut impl Read,
    target: &impl DeliveryTarget,
) -> Result<String, Error> {
    let item_reader: Box<dyn BufRead> = if Path::new("-") == item {
        Box::new(io::BufReader::new(stdin))
    } else {
        Box::new(io::BufReader::new(fs::File::open(item)?))
    };

    let mut flags = cmd.flag.clone();
    if cmd.maildir_flags {
        flags.extend(extract_maildir_flags(item));
    }

    target.deliver(&flags, item_reader)
}

fn extract_maildir_flags(path: &Path) -> impl Iterator<Item = char> + '_ {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| parse_cur_filename(name).flags)
        .unwrap_or("")
        .chars()
        .filter(|&ch| is_valid_flag(ch))
}

#[cfg(test)]
mod test {
    use std::cell::RefCell;

    use tempfile::TempDir;

    use super::*;
    use crate::cli::main::MaildirOptions;

    #[test]
    fn test_extract_maildir_flags() {
        fn extract(s: &str) -> Vec<char> {
            extract_maildir_flags(Path::new(s)).collect()
        }

        assert_eq!(Vec::<char>::new(), extract("foo/bar"));
        assert_eq!(Vec::<char>::new(), extract(""));
        assert_eq!(Vec::<char>::new(), extract("-"));
        assert_eq!(Vec::<char>::new(), extract("cur/foo:2,"));
        assert_eq!(Vec::<char>::new(), extract("cur/foo:1,S"));

        assert_eq!(vec!['S'], extract("foo:2,S"));
        assert_eq!(vec!['F', 'S'], extract("Maildir/cur/1.M2P3Q4.host:2,FS"));
        assert_eq!(vec!['a', 'F'], extract("x:2,a,F"));
    }

    #[derive(Default)]
    struct MockTarget {
        delivered: RefCell<Vec<(Vec<char>, Vec<u8>)>>,
    }

    impl DeliveryTarget for MockTarget {
        fn deliver<R: Read>(
            &self,
            flags: &[char],
            mut data: R,
        ) -> Result<String, Error> {
            let mut content = Vec::new();
            data.read_to_end(&mut content)?;
            let mut delivered = self.delivered.borrow_mut();
            delivered.push((flags.to_vec(), content));
            Ok(format!("msg{}", delivered.len()))
        }
    }

    fn command(flag: Vec<char>, maildir_flags: bool) -> DeliverSubcommand {
        DeliverSubcommand {
            common: MaildirOptions::default(),
            flag,
            maildir_flags,
            inputs: vec![],
        }
    }

    #[test]
    fn deliver_from_stdin_and_files() {
        let root = TempDir::new().unwrap();
        let file = root.path().join("1.M2P3Q4.host:2,RS");
        fs::write(&file, "from file").unwrap();

        let target = MockTarget::default();
        let names = run_delivery(
            &command(vec!['F'], true),
            vec![PathBuf::from("-"), file].into_iter(),
            &mut "from stdin".as_bytes(),
            &target,
        )
        .unwrap();

        assert_eq!(vec!["msg1".to_owned(), "msg2".to_owned()], names);
        let delivered = target.delivered.into_inner();
        assert_eq!((vec!['F'], b"from stdin".to_vec()), delivered[0]);
        assert_eq!(
            (vec!['F', 'R', 'S'], b"from file".to_vec()),
            delivered[1]
        );
    }

    #[test]
    fn missing_input_stops_delivery() {
        let root = TempDir::new().unwrap();
        let target = MockTarget::default();

        let result = run_delivery(
            &command(vec![], false),
            vec![root.path().join("nx"), PathBuf::from("-")].into_iter(),
            &mut "never read".as_bytes(),
            &target,
        );
        match result {
            Err(Error::Io(e)) => assert_eq!(io::ErrorKind::NotFound, e.kind()),
            r => panic!("Unexpected result: {:?}", r),
        }
        assert!(target.delivered.into_inner().is_empty());
    }

    #[test]
    fn deliver_into_maildir_with_flags() {
        let root = TempDir::new().unwrap();
        let maildir = Maildir::initialize(root.path()).unwrap();

        let names = run_delivery(
            &command(vec!['S', 'F'], false),
            vec![PathBuf::from("-")].into_iter(),
            &mut "flagged".as_bytes(),
            &maildir,
        )
        .unwrap();
        assert_eq!(1, names.len());
        assert!(!maildir.is_new(&names[0]).unwrap());
        assert!(fs::read_dir(root.path().join("new"))
            .unwrap()
            .next()
            .is_none());
        assert_eq!(
            Some("FS".to_owned()),
            maildir.get_flags(&names[0]).unwrap()
        );
        assert_eq!(b"flagged".to_vec(), maildir.fetch(&names[0]).unwrap());

        let names = run_delivery(
            &command(vec![], false),
            vec![PathBuf::from("-")].into_iter(),
            &mut "plain".as_bytes(),
            &maildir,
        )
        .unwrap();
        assert!(maildir.is_new(&names[0]).unwrap());
    }
}

//! Attribute command, in the style of the Windows `attrib` tool.
//!
//! `attrib /f` prints the attributes; `attrib +r -h /f` changes them.

use std::io::Write;

use anyhow::{Result, bail};
use clap::Args as ClapArgs;
use tracing::instrument;

use memfs_core::FileAttributes;
use memfs_mount::normalize_path;

use crate::session::Session;

#[derive(ClapArgs)]
pub struct Args {
    /// Changes (`+r`, `-r`, `+h`, `-h`, `+s`, `-s`, `+a`, `-a`) followed by the path
    #[arg(required = true, allow_hyphen_values = true, num_args = 1..)]
    pub items: Vec<String>,
}

/// Splits `+x`/`-x` tokens into the bits to set and the bits to clear.
fn parse_changes(changes: &[String]) -> Result<(FileAttributes, FileAttributes)> {
    let mut set = FileAttributes::empty();
    let mut clear = FileAttributes::empty();
    for change in changes {
        let mut chars = change.chars();
        let (Some(sign), Some(letter), None) = (chars.next(), chars.next(), chars.next()) else {
            bail!("Invalid attribute change: {change}");
        };
        let flag = match letter.to_ascii_lowercase() {
            'r' => FileAttributes::READONLY,
            'h' => FileAttributes::HIDDEN,
            's' => FileAttributes::SYSTEM,
            'a' => FileAttributes::ARCHIVE,
            _ => bail!("Unknown attribute: {letter}"),
        };
        match sign {
            '+' => set |= flag,
            '-' => clear |= flag,
            _ => bail!("Invalid attribute change: {change}"),
        }
    }
    Ok((set, clear))
}

#[instrument(level = "info", name = "cmd::attrib", skip_all)]
pub fn execute(session: &Session, args: &Args, out: &mut dyn Write) -> Result<()> {
    let Some((path, changes)) = args.items.split_last() else {
        bail!("Missing path");
    };
    let (set, clear) = parse_changes(changes)?;

    let file = session.open_existing(path)?;
    let fs = session.fs();
    if !set.is_empty() || !clear.is_empty() {
        let current = fs.get_file_information(file.handle())?.attributes;
        let mut updated = (current | set) - clear;
        if updated.is_empty() {
            // An empty set would be ignored.
            updated = FileAttributes::NORMAL;
        }
        fs.set_file_attributes(file.handle(), updated)?;
    }
    let attributes = fs.get_file_information(file.handle())?.attributes;
    writeln!(out, "{attributes}  {}", normalize_path(path))?;
    Ok(())
}

use std::io::Write;

use anyhow::{Context, Result};
use clap::Args as ClapArgs;
use tracing::{debug, instrument};

use crate::session::Session;

#[derive(ClapArgs)]
pub struct Args {
    /// Remove directories and their contents
    #[arg(short, long)]
    pub recursive: bool,

    /// Path to remove
    pub path: String,
}

#[instrument(level = "info", name = "cmd::rm", skip_all, fields(path = %args.path, recursive = args.recursive))]
pub fn execute(session: &Session, args: &Args, _out: &mut dyn Write) -> Result<()> {
    remove(session, &args.path, args.recursive)
}

/// Deletes `path`, children first when `recursive`. Each node goes away when
/// its handle is dropped.
fn remove(session: &Session, path: &str, recursive: bool) -> Result<()> {
    let file = session.open_existing(path)?;
    let fs = session.fs();

    if !file.is_directory() {
        fs.delete_file(file.handle())
            .with_context(|| format!("Cannot remove {path}"))?;
        return Ok(());
    }

    if recursive {
        for entry in fs.find_files(file.handle())? {
            let child = Session::child_path(path, &entry.file_name);
            debug!(path = %child, "Removing child");
            remove(session, &child, true)?;
        }
    }
    fs.delete_directory(file.handle())
        .with_context(|| format!("Cannot remove directory {path}"))?;
    Ok(())
}

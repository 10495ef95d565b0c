use std::io::Write;

use anyhow::Result;
use clap::Args as ClapArgs;
use tracing::instrument;

use memfs_core::path;
use memfs_mount::{CreateDisposition, CreateRequest, normalize_path};

use crate::session::Session;

#[derive(ClapArgs)]
pub struct Args {
    /// Directory to create
    pub path: String,

    /// Create missing parents; no error if the directory exists
    #[arg(short, long)]
    pub parents: bool,
}

#[instrument(level = "info", name = "cmd::mkdir", skip_all, fields(path = %args.path))]
pub fn execute(session: &Session, args: &Args, _out: &mut dyn Write) -> Result<()> {
    if !args.parents {
        session.open(&args.path, &CreateRequest::directory(CreateDisposition::CreateNew))?;
        return Ok(());
    }

    let target = normalize_path(&args.path);
    let mut current = String::from(path::ROOT);
    for component in target.split(path::SEPARATOR).filter(|c| !c.is_empty()) {
        current = path::join(&current, component);
        session.open(&current, &CreateRequest::directory(CreateDisposition::OpenAlways))?;
    }
    Ok(())
}

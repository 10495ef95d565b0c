use std::io::Write;

use anyhow::{Context, Result};
use clap::Args as ClapArgs;
use tracing::instrument;

use crate::session::Session;

#[derive(ClapArgs)]
pub struct Args {
    /// File to resize
    pub path: String,

    /// New length in bytes
    pub len: u64,
}

#[instrument(level = "info", name = "cmd::truncate", skip_all, fields(path = %args.path, len = args.len))]
pub fn execute(session: &Session, args: &Args, _out: &mut dyn Write) -> Result<()> {
    let file = session.open_existing(&args.path)?;
    session
        .fs()
        .set_end_of_file(file.handle(), args.len)
        .with_context(|| format!("Failed to resize {}", args.path))?;
    Ok(())
}

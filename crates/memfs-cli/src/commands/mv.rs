use std::io::Write;

use anyhow::{Context, Result};
use clap::Args as ClapArgs;
use tracing::instrument;

use crate::session::Session;

#[derive(ClapArgs)]
pub struct Args {
    /// Replace an existing destination file
    #[arg(short, long)]
    pub force: bool,

    /// Source path
    pub source: String,

    /// Destination path
    pub dest: String,
}

#[instrument(level = "info", name = "cmd::mv", skip_all, fields(source = %args.source, dest = %args.dest))]
pub fn execute(session: &Session, args: &Args, _out: &mut dyn Write) -> Result<()> {
    let file = session.open_existing(&args.source)?;
    session
        .fs()
        .move_file(file.handle(), &args.dest, args.force)
        .with_context(|| format!("Failed to move {} to {}", args.source, args.dest))?;
    Ok(())
}

use std::io::{Read, Write};

use anyhow::{Context, Result};
use clap::Args as ClapArgs;
use tracing::instrument;

use crate::session::Session;

#[derive(ClapArgs)]
pub struct Args {
    /// File to print
    pub path: String,
}

#[instrument(level = "info", name = "cmd::cat", skip_all, fields(path = %args.path))]
pub fn execute(session: &Session, args: &Args, out: &mut dyn Write) -> Result<()> {
    let mut file = session.open_existing(&args.path)?;
    let mut data = Vec::new();
    file.read_to_end(&mut data)
        .with_context(|| format!("Failed to read {}", args.path))?;

    out.write_all(&data)?;
    if !data.is_empty() && !data.ends_with(b"\n") {
        writeln!(out)?;
    }
    Ok(())
}

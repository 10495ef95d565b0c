use std::io::Write;

use anyhow::{Context, Result};
use clap::Args as ClapArgs;
use tracing::instrument;

use memfs_mount::{CreateDisposition, CreateRequest, WriteMode};

use crate::session::Session;

#[derive(ClapArgs)]
pub struct Args {
    /// File to write
    pub path: String,

    /// Text to store (words are joined with single spaces)
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub text: Vec<String>,
}

#[instrument(level = "info", name = "cmd::write", skip_all, fields(path = %args.path))]
pub fn execute(session: &Session, args: &Args, _out: &mut dyn Write) -> Result<()> {
    let file = session.open(&args.path, &CreateRequest::file(CreateDisposition::CreateAlways))?;
    let data = args.text.join(" ");
    session
        .fs()
        .write_file(file.handle(), 0, data.as_bytes(), WriteMode::NORMAL)
        .with_context(|| format!("Failed to write {}", args.path))?;
    Ok(())
}

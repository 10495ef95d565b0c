//! Run command: execute a script file against a fresh volume.
//!
//! # Examples
//!
//! ```bash
//! memfs run setup.memfs
//! cat setup.memfs | memfs run -
//! ```

use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args as ClapArgs;
use tracing::{info, instrument};

use memfs_mount::MountConfig;

use crate::script;
use crate::session::Session;

#[derive(ClapArgs)]
pub struct Args {
    /// Script file, or `-` for stdin
    pub script: PathBuf,
}

#[instrument(level = "info", name = "cmd::run", skip_all, fields(script = %args.script.display()))]
pub fn execute(config: MountConfig, args: &Args) -> Result<()> {
    let text = if args.script.as_os_str() == "-" {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read script from stdin")?;
        text
    } else {
        fs::read_to_string(&args.script)
            .with_context(|| format!("Failed to read script {}", args.script.display()))?
    };

    let session = Session::new(config)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let executed = script::execute_script(&session, &text, &mut out)?;
    out.flush()?;
    info!(executed, "Script finished");
    Ok(())
}

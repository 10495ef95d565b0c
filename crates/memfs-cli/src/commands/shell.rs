//! Shell command: read volume commands from stdin until EOF or `exit`.
//!
//! Failures are reported and the session continues.

use std::io::{self, BufRead, IsTerminal, Write};

use anyhow::Result;
use clap::Args as ClapArgs;
use tracing::instrument;

use memfs_mount::MountConfig;

use crate::script;
use crate::session::Session;

#[derive(ClapArgs)]
pub struct Args {
    /// Prompt shown before each command (only on a terminal)
    #[arg(long, default_value = "memfs> ")]
    pub prompt: String,
}

#[instrument(level = "info", name = "cmd::shell", skip_all)]
pub fn execute(config: MountConfig, args: &Args) -> Result<()> {
    let session = Session::new(config)?;
    let stdin = io::stdin();
    let interactive = stdin.is_terminal();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let mut lines = stdin.lock().lines();
    loop {
        if interactive {
            write!(out, "{}", args.prompt)?;
            out.flush()?;
        }
        let Some(line) = lines.next() else { break };
        let line = line?;
        match line.trim() {
            "exit" | "quit" => break,
            _ => {
                if let Err(e) = script::execute_line(&session, &line, &mut out) {
                    out.flush()?;
                    eprintln!("Error: {e:#}");
                }
            }
        }
    }
    out.flush()?;
    Ok(())
}

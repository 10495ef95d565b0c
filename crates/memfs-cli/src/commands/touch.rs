use std::io::Write;

use anyhow::Result;
use clap::Args as ClapArgs;
use tracing::instrument;

use memfs_core::{FileTime, FileTimes};
use memfs_mount::{CreateDisposition, CreateRequest};

use crate::session::Session;

#[derive(ClapArgs)]
pub struct Args {
    /// File to create or touch
    pub path: String,
}

#[instrument(level = "info", name = "cmd::touch", skip_all, fields(path = %args.path))]
pub fn execute(session: &Session, args: &Args, _out: &mut dyn Write) -> Result<()> {
    let file = session.open(&args.path, &CreateRequest::file(CreateDisposition::OpenAlways))?;
    if file.existed() {
        let now = FileTime::now();
        session.fs().set_file_time(
            file.handle(),
            FileTimes {
                last_access: now,
                last_write: now,
                ..FileTimes::unchanged()
            },
        )?;
    }
    Ok(())
}

use std::io::Write;

use anyhow::Result;
use clap::Args as ClapArgs;
use tracing::instrument;

use crate::output::{create_table, format_size};
use crate::session::Session;

#[derive(ClapArgs)]
pub struct Args {
    /// Print exact byte counts
    #[arg(short, long)]
    pub bytes: bool,
}

#[instrument(level = "info", name = "cmd::df", skip_all)]
pub fn execute(session: &Session, args: &Args, out: &mut dyn Write) -> Result<()> {
    let fs = session.fs();
    let space = fs.get_disk_free_space();
    let stats = fs.store().stats();
    let volume = fs.get_volume_information();
    let size = |n: u64| if args.bytes { n.to_string() } else { format_size(n) };

    let mut table = create_table();
    table.set_header(vec!["Volume", "Size", "Used", "Free", "Files", "Dirs"]);
    table.add_row(vec![
        volume.volume_name,
        size(space.total_bytes),
        size(stats.bytes),
        size(space.free_bytes_available),
        stats.files.to_string(),
        stats.directories.to_string(),
    ]);
    writeln!(out, "{table}")?;
    Ok(())
}

//! List command: the children of a directory, sorted by name.

use std::io::Write;

use anyhow::Result;
use clap::Args as ClapArgs;
use tracing::instrument;

use crate::output::{create_table, format_entry_type, format_size, format_time};
use crate::session::Session;

#[derive(ClapArgs)]
pub struct Args {
    /// Directory to list (default: root)
    #[arg(default_value = "/")]
    pub path: String,

    /// Show type, size, attributes and modification time
    #[arg(short, long)]
    pub long: bool,
}

#[instrument(level = "info", name = "cmd::ls", skip_all, fields(path = %args.path))]
pub fn execute(session: &Session, args: &Args, out: &mut dyn Write) -> Result<()> {
    let dir = session.open_directory(&args.path)?;
    let mut entries = session.fs().find_files(dir.handle())?;
    entries.sort_by(|a, b| a.file_name.cmp(&b.file_name));

    if !args.long {
        for entry in &entries {
            let suffix = if entry.attributes.is_directory() { "/" } else { "" };
            writeln!(out, "{}{suffix}", entry.file_name)?;
        }
        return Ok(());
    }

    let mut table = create_table();
    table.set_header(vec!["Type", "Size", "Attr", "Modified", "Name"]);
    for entry in &entries {
        let is_dir = entry.attributes.is_directory();
        table.add_row(vec![
            format_entry_type(is_dir).to_string(),
            if is_dir { "-".to_string() } else { format_size(entry.size) },
            entry.attributes.to_string(),
            format_time(entry.times.last_write),
            entry.file_name.clone(),
        ]);
    }
    writeln!(out, "{table}")?;
    Ok(())
}

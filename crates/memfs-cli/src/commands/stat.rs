use std::io::Write;

use anyhow::Result;
use clap::Args as ClapArgs;
use tracing::instrument;

use memfs_mount::normalize_path;

use crate::output::{create_table, format_entry_type, format_time};
use crate::session::Session;

#[derive(ClapArgs)]
pub struct Args {
    /// Node to describe
    pub path: String,
}

#[instrument(level = "info", name = "cmd::stat", skip_all, fields(path = %args.path))]
pub fn execute(session: &Session, args: &Args, out: &mut dyn Write) -> Result<()> {
    let file = session.open_existing(&args.path)?;
    let info = session.fs().get_file_information(file.handle())?;

    let mut table = create_table();
    table.set_header(vec!["Field", "Value"]);
    let rows = [
        ("Path", normalize_path(&args.path)),
        ("Type", format_entry_type(file.is_directory()).to_string()),
        ("Size", info.size.to_string()),
        ("Attributes", info.attributes.to_string()),
        ("Identity", info.file_index.to_string()),
        ("Links", info.number_of_links.to_string()),
        ("Created", format_time(info.times.creation)),
        ("Accessed", format_time(info.times.last_access)),
        ("Modified", format_time(info.times.last_write)),
    ];
    for (field, value) in rows {
        table.add_row(vec![field.to_string(), value]);
    }
    writeln!(out, "{table}")?;
    Ok(())
}

//! Info command: show the effective volume configuration.

use anyhow::Result;
use clap::Args as ClapArgs;
use tracing::instrument;

use memfs_mount::MountConfig;

use crate::output::{create_table, format_size};

#[derive(ClapArgs)]
pub struct Args {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[instrument(level = "info", name = "cmd::info", skip_all)]
pub fn execute(config: &MountConfig, args: &Args) -> Result<()> {
    if args.json {
        println!("{}", serde_json::to_string_pretty(config)?);
        return Ok(());
    }

    let mut table = create_table();
    table.set_header(vec!["Setting", "Value"]);
    let rows = [
        ("Volume name", config.volume_name.clone()),
        ("File system", config.file_system_name.clone()),
        ("Serial number", format!("{:08X}", config.serial_number)),
        ("Max component length", config.max_component_length.to_string()),
        (
            "Capacity",
            format!("{} ({} bytes)", format_size(config.total_bytes), config.total_bytes),
        ),
        ("Threads", config.thread_count.to_string()),
        ("Mount point", config.mount_point.clone()),
        ("Read-only", config.read_only.to_string()),
    ];
    for (setting, value) in rows {
        table.add_row(vec![setting.to_string(), value]);
    }
    println!("{table}");
    Ok(())
}

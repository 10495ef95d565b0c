use std::io::Write;

use anyhow::Result;
use clap::Args as ClapArgs;
use tracing::instrument;

use memfs_mount::normalize_path;

use crate::session::Session;

#[derive(ClapArgs)]
pub struct Args {
    /// Directory to start from (default: root)
    #[arg(default_value = "/")]
    pub path: String,
}

#[instrument(level = "info", name = "cmd::tree", skip_all, fields(path = %args.path))]
pub fn execute(session: &Session, args: &Args, out: &mut dyn Write) -> Result<()> {
    let root = normalize_path(&args.path);
    writeln!(out, "{root}")?;
    let (dirs, files) = print_level(session, &root, "", out)?;
    writeln!(out)?;
    writeln!(out, "{dirs} directories, {files} files")?;
    Ok(())
}

fn print_level(
    session: &Session,
    path: &str,
    prefix: &str,
    out: &mut dyn Write,
) -> Result<(usize, usize)> {
    let mut entries = {
        let dir = session.open_directory(path)?;
        session.fs().find_files(dir.handle())?
    };
    entries.sort_by(|a, b| a.file_name.cmp(&b.file_name));

    let (mut dirs, mut files) = (0, 0);
    let count = entries.len();
    for (i, entry) in entries.iter().enumerate() {
        let last = i + 1 == count;
        let connector = if last { "└── " } else { "├── " };
        if entry.attributes.is_directory() {
            dirs += 1;
            writeln!(out, "{prefix}{connector}{}/", entry.file_name)?;
            let child_prefix = format!("{prefix}{}", if last { "    " } else { "│   " });
            let child = Session::child_path(path, &entry.file_name);
            let (d, f) = print_level(session, &child, &child_prefix, out)?;
            dirs += d;
            files += f;
        } else {
            files += 1;
            writeln!(out, "{prefix}{connector}{}", entry.file_name)?;
        }
    }
    Ok((dirs, files))
}

//! Volume command language shared by `run` and `shell`.
//!
//! One command per line. Words are split on whitespace; double quotes group
//! words and `\` escapes the next character inside quotes. Blank lines and
//! lines starting with `#` are skipped. Each line is parsed with clap, so
//! `help` and `<command> --help` work as usual.

use std::io::Write;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};

use crate::commands::{append, attrib, cat, df, ls, mkdir, mv, rm, stat, touch, tree, truncate, write};
use crate::session::Session;

#[derive(Parser)]
#[command(no_binary_name = true, disable_version_flag = true)]
struct ScriptLine {
    #[command(subcommand)]
    command: ScriptCommand,
}

#[derive(Subcommand)]
enum ScriptCommand {
    /// Create a directory
    Mkdir(mkdir::Args),
    /// Create an empty file or update its times
    Touch(touch::Args),
    /// Replace a file's content with text
    Write(write::Args),
    /// Append text to a file
    Append(append::Args),
    /// Print a file's content
    Cat(cat::Args),
    /// List a directory
    Ls(ls::Args),
    /// Print a directory tree
    Tree(tree::Args),
    /// Move or rename a node
    Mv(mv::Args),
    /// Remove a node
    Rm(rm::Args),
    /// Show a node's metadata
    Stat(stat::Args),
    /// Show or change attributes
    #[command(disable_help_flag = true)]
    Attrib(attrib::Args),
    /// Resize a file
    Truncate(truncate::Args),
    /// Show capacity and usage
    Df(df::Args),
}

/// Splits a line into words.
pub fn tokenize(line: &str) -> Result<Vec<String>> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut in_quotes = false;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                in_word = true;
            }
            '\\' if in_quotes => match chars.next() {
                Some(escaped) => current.push(escaped),
                None => bail!("Dangling escape at end of line"),
            },
            c if c.is_whitespace() && !in_quotes => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            c => {
                current.push(c);
                in_word = true;
            }
        }
    }
    if in_quotes {
        bail!("Unterminated quote");
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}

/// Returns true for lines that carry no command.
pub fn is_blank(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty() || trimmed.starts_with('#')
}

/// Parses and executes one line against `session`.
pub fn execute_line(session: &Session, line: &str, out: &mut dyn Write) -> Result<()> {
    if is_blank(line) {
        return Ok(());
    }
    let words = tokenize(line)?;
    let parsed = match ScriptLine::try_parse_from(&words) {
        Ok(parsed) => parsed,
        Err(e) if matches!(
            e.kind(),
            clap::error::ErrorKind::DisplayHelp
                | clap::error::ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
        ) =>
        {
            write!(out, "{}", e.render())?;
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    match parsed.command {
        ScriptCommand::Mkdir(args) => mkdir::execute(session, &args, out),
        ScriptCommand::Touch(args) => touch::execute(session, &args, out),
        ScriptCommand::Write(args) => write::execute(session, &args, out),
        ScriptCommand::Append(args) => append::execute(session, &args, out),
        ScriptCommand::Cat(args) => cat::execute(session, &args, out),
        ScriptCommand::Ls(args) => ls::execute(session, &args, out),
        ScriptCommand::Tree(args) => tree::execute(session, &args, out),
        ScriptCommand::Mv(args) => mv::execute(session, &args, out),
        ScriptCommand::Rm(args) => rm::execute(session, &args, out),
        ScriptCommand::Stat(args) => stat::execute(session, &args, out),
        ScriptCommand::Attrib(args) => attrib::execute(session, &args, out),
        ScriptCommand::Truncate(args) => truncate::execute(session, &args, out),
        ScriptCommand::Df(args) => df::execute(session, &args, out),
    }
}

/// Executes every line of `text`, stopping at the first failure.
pub fn execute_script(session: &Session, text: &str, out: &mut dyn Write) -> Result<usize> {
    let mut executed = 0;
    for (index, line) in text.lines().enumerate() {
        if is_blank(line) {
            continue;
        }
        execute_line(session, line, out)
            .with_context(|| format!("line {}: {}", index + 1, line.trim()))?;
        executed += 1;
    }
    Ok(executed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use memfs_mount::MountConfig;

    fn run(text: &str) -> (Session, String) {
        let session = Session::new(MountConfig::default()).unwrap();
        let mut out = Vec::new();
        execute_script(&session, text, &mut out).unwrap();
        (session, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_tokenize() {
        assert_eq!(tokenize("ls  -l /a").unwrap(), vec!["ls", "-l", "/a"]);
        assert_eq!(
            tokenize(r#"write /f "hello world" x"#).unwrap(),
            vec!["write", "/f", "hello world", "x"]
        );
        assert_eq!(tokenize(r#"write /f "say \"hi\"""#).unwrap(), vec!["write", "/f", "say \"hi\""]);
        assert_eq!(tokenize(r#"touch """#).unwrap(), vec!["touch", ""]);
        assert!(tokenize(r#"write "open"#).is_err());
    }

    #[test]
    fn test_blank_lines() {
        assert!(is_blank(""));
        assert!(is_blank("   "));
        assert!(is_blank("# comment"));
        assert!(!is_blank("ls"));
    }

    #[test]
    fn test_script_builds_tree() {
        let (session, out) = run("mkdir /docs\n# notes\n\nwrite /docs/a.txt hello there\ncat /docs/a.txt\n");
        assert_eq!(out, "hello there\n");
        let node = session.fs().store().find("/docs/a.txt").unwrap();
        assert_eq!(node.read(0, 64), b"hello there");
    }

    #[test]
    fn test_script_stops_at_first_failure() {
        let session = Session::new(MountConfig::default()).unwrap();
        let mut out = Vec::new();
        let err = execute_script(&session, "mkdir /a\ncat /missing\nmkdir /b\n", &mut out).unwrap_err();
        assert!(format!("{err:#}").contains("line 2"));
        assert!(session.fs().store().contains("/a"));
        assert!(!session.fs().store().contains("/b"));
    }

    #[test]
    fn test_unknown_command_is_usage_error() {
        let session = Session::new(MountConfig::default()).unwrap();
        let mut out = Vec::new();
        let err = execute_line(&session, "frobnicate /x", &mut out).unwrap_err();
        assert!(err.downcast_ref::<clap::Error>().is_some());
    }
}

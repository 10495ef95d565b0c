//! Command implementations.
//!
//! `run`, `shell` and `info` are binary subcommands. Everything else is a
//! script command executed against a [`Session`](crate::session::Session).

pub mod append;
pub mod attrib;
pub mod cat;
pub mod df;
pub mod info;
pub mod ls;
pub mod mkdir;
pub mod mv;
pub mod rm;
pub mod run;
pub mod shell;
pub mod stat;
pub mod touch;
pub mod tree;
pub mod truncate;
pub mod write;

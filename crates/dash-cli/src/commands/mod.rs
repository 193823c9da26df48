//! CLI subcommand implementations.

pub mod attention;
pub mod recur;
pub mod session;
pub mod timeline;
pub mod util;

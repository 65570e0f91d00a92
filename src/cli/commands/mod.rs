//! One module per `lockbox` subcommand.

pub mod add;
pub mod audit_cmd;
pub mod category;
pub mod completions;
pub mod delete;
pub mod edit;
pub mod init;
pub mod keyfile;
pub mod list;
pub mod search;
pub mod shell;
pub mod show;
pub mod sort;

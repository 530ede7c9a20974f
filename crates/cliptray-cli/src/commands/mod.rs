pub mod clear;
pub mod common;
pub mod completions;
pub mod delete;
pub mod export;
pub mod flag;
pub mod list;
pub mod monitoring;
pub mod watch;

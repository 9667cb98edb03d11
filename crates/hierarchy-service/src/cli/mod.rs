//! 运维命令行模块
//!
//! - `commands`: clap 命令定义
//! - `runner`: 命令执行

pub mod commands;
pub mod runner;

pub use commands::{Cli, Commands, DeactivateTarget, DeleteTarget};
pub use runner::run;

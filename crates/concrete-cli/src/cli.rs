//! Command-line arguments

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "concrete")]
#[command(about = "Generate a stub implementation of a Go interface", long_about = None)]
#[command(version)]
pub struct Cli {
    /// The name of the interface to be implemented
    #[arg(short, long, value_name = "NAME", required_unless_present = "list")]
    pub interface: Option<String>,

    /// Directory of the package where the interface is defined
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub in_package: PathBuf,

    /// Package where the implementation is created [default: the interface's package]
    #[arg(long, value_name = "NAME")]
    pub impl_package: Option<String>,

    /// Name template of the concrete type; {{.Interface}} is the interface name
    #[arg(long, value_name = "TEMPLATE")]
    pub implementation: Option<String>,

    /// Write a new file in the package directory instead of printing
    #[arg(short, long)]
    pub write: bool,

    /// List the interfaces of the package
    #[arg(short, long, conflicts_with = "interface")]
    pub list: bool,

    /// Leave out import lines, for pasting into an existing file
    #[arg(long)]
    pub same_unit: bool,

    /// Receiver identifier of the generated methods [default: t]
    #[arg(long, value_name = "IDENT")]
    pub receiver: Option<String>,

    /// Also load _test.go files
    #[arg(long)]
    pub include_tests: bool,

    /// Configuration file [default: <DIR>/concrete.toml if present]
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// How load and check errors are printed
    #[arg(long, value_enum, default_value_t = MessageFormat::Human)]
    pub message_format: MessageFormat,

    /// When to color diagnostics
    #[arg(long, value_enum, default_value_t = ColorWhen::Auto)]
    pub color: ColorWhen,

    /// Show debug logging on stderr
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageFormat {
    Human,
    Json,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorWhen {
    Auto,
    Always,
    Never,
}

//! CLI argument definitions for the rule template marshaller.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use rtpl_drl::{DEFAULT_DIALECT, MarshalMode, MarshalOptions};

#[derive(Parser)]
#[command(
    name = "rtpl",
    version,
    about = "Rule template marshaller - expand rule templates over rows of data",
    long_about = "Render a rule model whose constraints and actions reference template\n\
                  variables into rule text, one rule per data row.\n\n\
                  Rows come from the model file itself or from a CSV table whose\n\
                  header names the template variables."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Marshal a template model into rules, one per row.
    Render(RenderArgs),

    /// Print the conditional rule template without expanding any rows.
    Template(TemplateArgs),

    /// List the template variables rows are aligned to.
    Variables(VariablesArgs),
}

#[derive(Parser)]
pub struct RenderArgs {
    /// Rule model JSON (a bare rule, or `{ "rule": .., "rows": [..] }`).
    #[arg(long = "model", value_name = "PATH")]
    pub model: PathBuf,

    /// CSV row table; replaces any rows embedded in the model file.
    #[arg(long = "rows", value_name = "PATH")]
    pub rows: Option<PathBuf>,

    /// Marshal strategy.
    #[arg(long = "mode", value_enum, default_value = "macro")]
    pub mode: ModeArg,

    #[command(flatten)]
    pub dialect: DialectArgs,

    /// Write rules to a file instead of stdout.
    #[arg(long = "output", short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,
}

impl RenderArgs {
    pub fn options(&self) -> MarshalOptions {
        MarshalOptions::new()
            .with_mode(self.mode.into())
            .with_default_dialect(self.dialect.default_dialect())
    }
}

#[derive(Parser)]
pub struct TemplateArgs {
    /// Rule model JSON.
    #[arg(long = "model", value_name = "PATH")]
    pub model: PathBuf,

    #[command(flatten)]
    pub dialect: DialectArgs,

    /// Write the template to a file instead of stdout.
    #[arg(long = "output", short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,
}

impl TemplateArgs {
    pub fn options(&self) -> MarshalOptions {
        MarshalOptions::new().with_default_dialect(self.dialect.default_dialect())
    }
}

#[derive(Parser)]
pub struct VariablesArgs {
    /// Rule model JSON.
    #[arg(long = "model", value_name = "PATH")]
    pub model: PathBuf,
}

/// Dialect declared on rules that carry no `dialect` attribute.
#[derive(Args)]
pub struct DialectArgs {
    /// Dialect to declare (default: mvel).
    #[arg(long = "dialect", value_name = "DIALECT", conflicts_with = "no_dialect")]
    pub dialect: Option<String>,

    /// Do not declare a dialect on rules that lack one.
    #[arg(long = "no-dialect")]
    pub no_dialect: bool,
}

impl DialectArgs {
    pub fn default_dialect(&self) -> Option<String> {
        if self.no_dialect {
            return None;
        }
        Some(
            self.dialect
                .clone()
                .unwrap_or_else(|| DEFAULT_DIALECT.to_string()),
        )
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ModeArg {
    Macro,
    Direct,
}

impl From<ModeArg> for MarshalMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Macro => MarshalMode::Macro,
            ModeArg::Direct => MarshalMode::Direct,
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

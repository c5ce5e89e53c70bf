//! CLI argument handling.
//!
//! This module contains the clap CLI definition, the checks that run before
//! clap sees the arguments, and the conversion into [`BuildConfig`].

use std::ffi::OsString;
use std::path::PathBuf;

use clap::error::{ContextKind, ContextValue, ErrorKind};
use clap::{ArgAction, Parser};

/// Minimum length of the argument vector, program name included.
///
/// Seven flag/value pairs plus the program itself.
pub const MIN_ARGS: usize = 14;

/// Flags that consume the following argument as their value.
pub const VALUE_FLAGS: [&str; 7] = [
    "--template-file",
    "--result-file",
    "--build-time",
    "--git-commit",
    "--git-time",
    "--build-number-pattern",
    "--build-number-file",
];

const USAGE_ARGS: &str = "--template-file <template_file> --build-time <build_time_template> \
--result-file <result_file> --git-commit <git_commit_template> \
--git-time <git_time_template> --build-number-pattern <build_number_pattern> \
--build-number-file <build_number_file> [--dont-increment-build-number] [--strict-git]";

/// Stamp build metadata into a source template.
///
/// Replaces the build-time, git-commit, git-time and build-number tokens in
/// the template and writes the result file. The build number is kept in its
/// own file and incremented on every run unless told otherwise.
#[derive(Parser, Debug)]
#[command(name = "buildstamp")]
#[command(version = crate::VERSION, about, long_about = None)]
#[command(args_override_self = true)]
#[command(disable_help_flag = true, disable_version_flag = true)]
pub struct Cli {
    /// Template file to read.
    #[arg(long, value_name = "TEMPLATE_FILE", allow_hyphen_values = true)]
    pub template_file: PathBuf,

    /// File to write the substituted template to.
    #[arg(long, value_name = "RESULT_FILE", allow_hyphen_values = true)]
    pub result_file: PathBuf,

    /// Token replaced by the current unix time.
    #[arg(long, value_name = "TOKEN", allow_hyphen_values = true)]
    pub build_time: String,

    /// Token replaced by the hash of HEAD.
    #[arg(long, value_name = "TOKEN", allow_hyphen_values = true)]
    pub git_commit: String,

    /// Token replaced by the commit time of HEAD (unix time).
    #[arg(long, value_name = "TOKEN", allow_hyphen_values = true)]
    pub git_time: String,

    /// Token replaced by the build number.
    #[arg(long, value_name = "TOKEN", allow_hyphen_values = true)]
    pub build_number_pattern: String,

    /// File holding the persistent build number.
    #[arg(long, value_name = "BUILD_NUMBER_FILE", allow_hyphen_values = true)]
    pub build_number_file: PathBuf,

    /// Use the stored build number as is.
    #[arg(long)]
    pub dont_increment_build_number: bool,

    /// Fail when a git command exits unsuccessfully.
    #[arg(long)]
    pub strict_git: bool,

    /// Print help.
    #[arg(long, action = ArgAction::Help)]
    pub help: Option<bool>,

    /// Print version.
    #[arg(long, action = ArgAction::Version)]
    pub version: Option<bool>,
}

/// Immutable run configuration built from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfig {
    /// Template file to read.
    pub template_file: PathBuf,
    /// File to write the result to.
    pub result_file: PathBuf,
    /// Build time token.
    pub build_time_token: String,
    /// Git commit token.
    pub git_commit_token: String,
    /// Git commit time token.
    pub git_time_token: String,
    /// Build number token.
    pub build_number_token: String,
    /// Persistent build number file.
    pub build_number_file: PathBuf,
    /// Whether to bump the stored build number.
    pub increment_build_number: bool,
    /// Whether a failing git command aborts the run.
    pub strict_git: bool,
}

impl From<Cli> for BuildConfig {
    fn from(cli: Cli) -> Self {
        Self {
            template_file: cli.template_file,
            result_file: cli.result_file,
            build_time_token: cli.build_time,
            git_commit_token: cli.git_commit,
            git_time_token: cli.git_time,
            build_number_token: cli.build_number_pattern,
            build_number_file: cli.build_number_file,
            increment_build_number: !cli.dont_increment_build_number,
            strict_git: cli.strict_git,
        }
    }
}

/// Error type for argument parsing.
#[derive(Debug, thiserror::Error)]
pub enum ArgsError {
    /// Too few arguments were given.
    #[error("Usage: {program} {}", USAGE_ARGS)]
    Usage {
        /// Program path as invoked.
        program: String,
    },
    /// An unrecognised token was given.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    /// A value-bearing flag was the last argument.
    #[error("Missing value for argument: {0}")]
    MissingValue(String),
    /// A required flag never appeared.
    #[error("Missing required argument: {0}")]
    MissingArgument(String),
    /// Any other rejection reported by the parser.
    #[error("{0}")]
    Rejected(String),
    /// Help or version output was requested; not a failure.
    #[error("{0}")]
    Info(String),
}

impl ArgsError {
    /// True for help/version output, which should exit successfully.
    pub fn is_info(&self) -> bool {
        matches!(self, ArgsError::Info(_))
    }
}

/// Parse a full argument vector (program name first) into a [`BuildConfig`].
pub fn parse_args<I, T>(args: I) -> Result<BuildConfig, ArgsError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let args: Vec<OsString> = args.into_iter().map(Into::into).collect();

    if args.len() < MIN_ARGS {
        let program = args
            .first()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_else(|| "buildstamp".to_string());
        return Err(ArgsError::Usage { program });
    }

    if let Some(flag) = dangling_value_flag(&args) {
        return Err(ArgsError::MissingValue(flag));
    }

    Cli::try_parse_from(args)
        .map(BuildConfig::from)
        .map_err(map_clap_error)
}

/// Find a value-bearing flag with nothing after it.
///
/// Walks the arguments the way they will be consumed, so a flag name used
/// as another flag's value is not mistaken for a flag.
fn dangling_value_flag(args: &[OsString]) -> Option<String> {
    let mut i = 1;
    while i < args.len() {
        match args[i].to_str() {
            Some(flag) if VALUE_FLAGS.contains(&flag) => {
                if i + 1 >= args.len() {
                    return Some(flag.to_string());
                }
                i += 2;
            }
            _ => i += 1,
        }
    }
    None
}

fn map_clap_error(err: clap::Error) -> ArgsError {
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            ArgsError::Info(err.render().to_string())
        }
        ErrorKind::UnknownArgument => {
            ArgsError::InvalidArgument(context_arg(&err).unwrap_or_else(|| first_line(&err)))
        }
        ErrorKind::MissingRequiredArgument => {
            ArgsError::MissingArgument(context_arg(&err).unwrap_or_else(|| first_line(&err)))
        }
        _ => ArgsError::Rejected(first_line(&err)),
    }
}

/// The offending argument recorded by clap, without its value placeholder.
fn context_arg(err: &clap::Error) -> Option<String> {
    let names: Vec<String> = match err.get(ContextKind::InvalidArg)? {
        ContextValue::String(s) => vec![s.clone()],
        ContextValue::Strings(v) => v.clone(),
        _ => return None,
    };

    let flags: Vec<&str> = names
        .iter()
        .filter_map(|n| n.split_whitespace().next())
        .collect();
    if flags.is_empty() {
        None
    } else {
        Some(flags.join(", "))
    }
}

fn first_line(err: &clap::Error) -> String {
    let rendered = err.render().to_string();
    let line = rendered.lines().next().unwrap_or_default();
    line.strip_prefix("error: ").unwrap_or(line).to_string()
}

//! Build stamp generation.
//!
//! Runs the whole pipeline for one build: check the repository, load the
//! template, substitute the four tokens and write the result file.

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::build_number::{BuildNumberError, BuildNumberStore};
use crate::cli::BuildConfig;
use crate::git;
use crate::process::{CommandRunner, ProcessError};
use crate::template::{Template, TemplateError};

/// Error type for a generation run.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    /// Template could not be read or the result could not be written.
    #[error(transparent)]
    Template(#[from] TemplateError),
    /// A git command could not be run.
    #[error(transparent)]
    Process(#[from] ProcessError),
    /// The build number could not be read or stored.
    #[error(transparent)]
    BuildNumber(#[from] BuildNumberError),
}

/// What a generation run substituted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationReport {
    /// Whether git reported a work tree.
    pub in_git_repo: bool,
    /// Build time as unix seconds.
    pub build_time: String,
    /// Commit hash as reported by git.
    pub commit: String,
    /// Commit time as reported by git.
    pub commit_time: String,
    /// Build number used.
    pub build_number: u64,
    /// Tokens that did not occur in the template.
    pub missing_patterns: Vec<String>,
}

/// Generate the result file using the current time.
pub fn generate(
    config: &BuildConfig,
    runner: &dyn CommandRunner,
) -> Result<GenerationReport, GenerateError> {
    generate_at(config, runner, Utc::now())
}

/// Generate the result file with `now` as the build time.
///
/// Values are computed right before their substitution, in the order build
/// time, commit, commit time, build number. The first error aborts the run;
/// by then the build number may already have been incremented.
pub fn generate_at(
    config: &BuildConfig,
    runner: &dyn CommandRunner,
    now: DateTime<Utc>,
) -> Result<GenerationReport, GenerateError> {
    let in_git_repo = git::is_inside_work_tree(runner)?;
    if !in_git_repo {
        warn!("Current directory seems to be not a git repository");
    }

    let mut template = Template::load(&config.template_file)?;

    let build_time = now.timestamp().to_string();
    template.substitute(&config.build_time_token, &build_time);

    let commit = git::current_commit(runner)?;
    template.substitute(&config.git_commit_token, &commit);

    let commit_time = git::current_commit_unix_time(runner)?;
    template.substitute(&config.git_time_token, &commit_time);

    let build_number = BuildNumberStore::new(&config.build_number_file)
        .next(config.increment_build_number)?;
    template.substitute(&config.build_number_token, &build_number.to_string());

    template.write_to(&config.result_file)?;

    info!(
        result = %config.result_file.display(),
        build_number,
        commit = %commit,
        "wrote build stamp"
    );

    Ok(GenerationReport {
        in_git_repo,
        build_time,
        commit,
        commit_time,
        build_number,
        missing_patterns: template.missing_patterns().to_vec(),
    })
}

//! Literal token substitution.
//!
//! No templating language here: a token is any literal string, and every
//! occurrence of it is replaced by the given value. Template content is kept
//! as raw bytes, so files in any encoding pass through unchanged apart from
//! the substituted tokens.

use std::fs;
use std::path::{Path, PathBuf};

use memchr::memmem;
use tracing::warn;

/// Error type for template I/O.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    /// The template could not be read.
    #[error("Error opening input file {}", path.display())]
    Read {
        /// Template path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The result could not be written.
    #[error("Error opening output file {}", path.display())]
    Write {
        /// Result path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Replace every non-overlapping occurrence of `search` in `source`.
///
/// Scanning runs left to right and resumes after each inserted replacement,
/// so the replacement text is never matched again. An empty `search` matches
/// nothing. Returns the number of replacements made.
pub fn replace_all(source: &mut Vec<u8>, search: &[u8], replacement: &[u8]) -> usize {
    if search.is_empty() {
        return 0;
    }

    let positions: Vec<usize> = memmem::find_iter(source.as_slice(), search).collect();
    if positions.is_empty() {
        return 0;
    }

    let mut out = Vec::with_capacity(
        source.len() + positions.len() * replacement.len().saturating_sub(search.len()),
    );
    let mut last = 0;
    for &pos in &positions {
        out.extend_from_slice(&source[last..pos]);
        out.extend_from_slice(replacement);
        last = pos + search.len();
    }
    out.extend_from_slice(&source[last..]);
    *source = out;

    positions.len()
}

/// Template text being progressively substituted.
#[derive(Debug, Clone)]
pub struct Template {
    content: Vec<u8>,
    source_name: String,
    missing: Vec<String>,
}

impl Template {
    /// Wrap already loaded content. `source_name` is used in diagnostics.
    pub fn new(content: impl Into<Vec<u8>>, source_name: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            source_name: source_name.into(),
            missing: Vec::new(),
        }
    }

    /// Load a template file as raw bytes.
    pub fn load(path: &Path) -> Result<Self, TemplateError> {
        let content = fs::read(path).map_err(|source| TemplateError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(content, path.display().to_string()))
    }

    /// Substitute `token` with `value` throughout the content.
    ///
    /// A token that does not occur is not an error; it is logged as a
    /// warning and remembered in [`Template::missing_patterns`].
    pub fn substitute(&mut self, token: &str, value: &str) -> usize {
        let count = replace_all(&mut self.content, token.as_bytes(), value.as_bytes());
        if count == 0 {
            warn!(
                "Pattern {} has not been found in the input file {}",
                token, self.source_name
            );
            self.missing.push(token.to_string());
        }
        count
    }

    /// Current content.
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Tokens that matched nothing, in substitution order.
    pub fn missing_patterns(&self) -> &[String] {
        &self.missing
    }

    /// Write the current content verbatim, truncating any existing file.
    pub fn write_to(&self, path: &Path) -> Result<(), TemplateError> {
        fs::write(path, &self.content).map_err(|source| TemplateError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Consume the template, returning its content.
    pub fn into_content(self) -> Vec<u8> {
        self.content
    }
}

//! Reading input files into a candidate batch.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{Instrument, debug, info_span, warn};

use crate::error::{ImportError, ImportResult};
use crate::scl::{IED_TAG, SclDocument};
use crate::tracing::span_names;

use super::candidate::{CandidateBatch, CandidateDevice};

/// File extensions accepted by default (compared case-insensitively)
pub const DEFAULT_EXTENSIONS: [&str; 6] = ["iid", "cid", "icd", "scd", "sed", "ssd"];

/// What to do with an input file that cannot be read or parsed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseFailurePolicy {
    /// Skip the file, record it and continue with the next one
    #[default]
    Skip,
    /// Fail the whole load
    Abort,
}

/// An input file that contributed no candidates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    /// Path of the file
    pub path: PathBuf,
    /// Why the file was skipped
    pub error: ImportError,
}

/// Result of a loading pass
#[derive(Debug, Clone, Default)]
pub struct LoadOutcome {
    /// Classified candidates in file order, then document order
    pub batch: CandidateBatch,
    /// Files that were skipped
    pub skipped: Vec<SkippedFile>,
    /// Number of files read and parsed successfully
    pub files_loaded: usize,
}

impl LoadOutcome {
    /// Returns true when no candidate was found
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.batch.is_empty()
    }
}

/// Loads candidate devices from SCL files.
#[derive(Debug, Clone)]
pub struct CandidateLoader {
    policy: ParseFailurePolicy,
    extensions: Vec<String>,
}

impl Default for CandidateLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl CandidateLoader {
    /// Creates a loader with the default extensions and the skip policy
    #[must_use]
    pub fn new() -> Self {
        Self {
            policy: ParseFailurePolicy::default(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| (*e).to_string()).collect(),
        }
    }

    /// Sets the parse failure policy
    #[must_use]
    pub const fn with_policy(mut self, policy: ParseFailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Replaces the accepted extensions (without leading dot)
    #[must_use]
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.extensions = extensions
            .into_iter()
            .map(|e| e.as_ref().trim_start_matches('.').to_ascii_lowercase())
            .collect();
        self
    }

    /// The parse failure policy
    #[must_use]
    pub const fn policy(&self) -> ParseFailurePolicy {
        self.policy
    }

    /// Returns true if the path has an accepted extension
    #[must_use]
    pub fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                self.extensions
                    .iter()
                    .any(|accepted| accepted.eq_ignore_ascii_case(ext))
            })
    }

    /// Reads `paths` one after another and classifies every IED they contain
    /// against `target`.
    ///
    /// Files are read strictly in the given order. An empty `paths` slice
    /// reads nothing and returns an empty outcome.
    ///
    /// # Errors
    ///
    /// With [`ParseFailurePolicy::Abort`], returns the first read or parse
    /// error. With the default policy, failing files are reported in
    /// [`LoadOutcome::skipped`] instead.
    pub async fn load(&self, paths: &[PathBuf], target: &SclDocument) -> ImportResult<LoadOutcome> {
        let span = info_span!(span_names::IMPORT_LOAD, files = paths.len());
        self.load_paths(paths, target).instrument(span).await
    }

    async fn load_paths(
        &self,
        paths: &[PathBuf],
        target: &SclDocument,
    ) -> ImportResult<LoadOutcome> {
        let mut outcome = LoadOutcome::default();

        for path in paths {
            if !self.accepts(path) {
                debug!(path = %path.display(), "Skipping file with unsupported extension");
                outcome.skipped.push(SkippedFile {
                    path: path.clone(),
                    error: ImportError::UnsupportedExtension(path.clone()),
                });
                continue;
            }

            let result = match read_input(path).await {
                Ok(text) => self
                    .load_str(&text, &path.display().to_string(), target, &mut outcome.batch)
                    .map(|found| {
                        debug!(path = %path.display(), candidates = found, "Loaded input file");
                    }),
                Err(err) => Err(err),
            };

            match result {
                Ok(()) => outcome.files_loaded += 1,
                Err(err) if self.policy == ParseFailurePolicy::Skip => {
                    warn!(path = %path.display(), error = %err, "Skipping input file");
                    outcome.skipped.push(SkippedFile {
                        path: path.clone(),
                        error: err,
                    });
                }
                Err(err) => return Err(err),
            }
        }

        Ok(outcome)
    }

    /// Parses one input and pushes each IED it contains, in document order,
    /// into `batch`. Returns the number of candidates found.
    ///
    /// The batch is left untouched when parsing fails.
    ///
    /// # Errors
    ///
    /// Returns `ImportError::Parse` if the text is not well-formed markup.
    pub fn load_str(
        &self,
        text: &str,
        origin: &str,
        target: &SclDocument,
        batch: &mut CandidateBatch,
    ) -> ImportResult<usize> {
        let source = SclDocument::parse(text).map_err(|source| ImportError::Parse {
            origin: origin.to_string(),
            source,
        })?;
        let source = Arc::new(source);

        let nodes: Vec<_> = source
            .find_descendants(source.root(), IED_TAG)
            .iter()
            .map(|ied| ied.id())
            .collect();
        // A root IED element counts as a candidate too
        let nodes = if source.root_element().local_name() == IED_TAG {
            std::iter::once(source.root()).chain(nodes).collect()
        } else {
            nodes
        };

        let mut found = 0;
        for node in nodes {
            if let Some(device) = CandidateDevice::new(Arc::clone(&source), node, origin) {
                batch.push(target, device);
                found += 1;
            }
        }
        Ok(found)
    }
}

async fn read_input(path: &Path) -> ImportResult<String> {
    let bytes = tokio::fs::read(path).await.map_err(|err| {
        if err.kind() == std::io::ErrorKind::NotFound {
            ImportError::FileNotFound(path.to_path_buf())
        } else {
            ImportError::Read {
                path: path.to_path_buf(),
                reason: err.to_string(),
            }
        }
    })?;

    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(&bytes);
    String::from_utf8(bytes.to_vec()).map_err(|err| ImportError::Read {
        path: path.to_path_buf(),
        reason: format!("not valid UTF-8: {err}"),
    })
}

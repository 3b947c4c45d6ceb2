//! Filtering of the collected file list.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use glob::{MatchOptions, Pattern};
use regex::Regex;

use crate::resolver::errors::CollectError;

const NEGATION: char = '!';

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

type Predicate = Arc<dyn Fn(&Path) -> bool + Send + Sync>;

/// Restricts which collected files are returned.
#[derive(Clone)]
pub enum FileFilter {
    /// Glob patterns applied in order; `!pattern` removes earlier matches.
    Globs(Vec<String>),
    /// Keep paths the expression matches anywhere.
    Regex(Regex),
    /// Keep paths the predicate accepts.
    Predicate(Predicate),
}

impl fmt::Debug for FileFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileFilter::Globs(patterns) => f.debug_tuple("Globs").field(patterns).finish(),
            FileFilter::Regex(re) => f.debug_tuple("Regex").field(&re.as_str()).finish(),
            FileFilter::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

impl From<&str> for FileFilter {
    fn from(pattern: &str) -> Self {
        FileFilter::Globs(vec![pattern.to_string()])
    }
}

impl From<Vec<String>> for FileFilter {
    fn from(patterns: Vec<String>) -> Self {
        FileFilter::Globs(patterns)
    }
}

impl From<Regex> for FileFilter {
    fn from(re: Regex) -> Self {
        FileFilter::Regex(re)
    }
}

impl FileFilter {
    /// Filter with an arbitrary predicate.
    pub fn predicate(f: impl Fn(&Path) -> bool + Send + Sync + 'static) -> Self {
        FileFilter::Predicate(Arc::new(f))
    }

    /// Keep the matching files, preserving their order.
    pub fn apply(&self, files: Vec<PathBuf>) -> Result<Vec<PathBuf>, CollectError> {
        match self {
            FileFilter::Globs(patterns) => {
                let compiled = patterns
                    .iter()
                    .map(|p| GlobRule::new(p))
                    .collect::<Result<Vec<_>, _>>()?;

                Ok(files
                    .into_iter()
                    .filter(|file| GlobRule::keeps(&compiled, file))
                    .collect())
            }
            FileFilter::Regex(re) => Ok(files
                .into_iter()
                .filter(|file| re.is_match(&file.to_string_lossy()))
                .collect()),
            FileFilter::Predicate(keep) => Ok(files.into_iter().filter(|file| keep(file)).collect()),
        }
    }
}

/// One compiled glob pattern.
///
/// Patterns without a separator match the file name. Relative patterns with
/// a separator match any trailing run of path components.
struct GlobRule {
    pattern: Pattern,
    negated: bool,
    basename_only: bool,
}

impl GlobRule {
    fn new(raw: &str) -> Result<Self, CollectError> {
        let (negated, body) = match raw.strip_prefix(NEGATION) {
            Some(body) => (true, body),
            None => (false, raw),
        };

        let basename_only = !body.contains('/');
        let source = if basename_only || body.starts_with('/') || body.starts_with("**/") {
            body.to_string()
        } else {
            format!("**/{}", body)
        };

        let pattern = Pattern::new(&source).map_err(|e| CollectError::InvalidPattern {
            pattern: raw.to_string(),
            message: e.to_string(),
        })?;

        Ok(GlobRule {
            pattern,
            negated,
            basename_only,
        })
    }

    fn matches(&self, file: &Path) -> bool {
        if self.basename_only {
            file.file_name()
                .map(|name| self.pattern.matches_with(&name.to_string_lossy(), MATCH_OPTIONS))
                .unwrap_or(false)
        } else {
            self.pattern.matches_path_with(file, MATCH_OPTIONS)
        }
    }

    /// The last rule that matches decides; nothing matching means dropped.
    fn keeps(rules: &[GlobRule], file: &Path) -> bool {
        rules.iter().fold(false, |kept, rule| {
            if rule.matches(file) {
                !rule.negated
            } else {
                kept
            }
        })
    }
}

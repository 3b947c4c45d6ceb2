//! Collection error types and diagnostics.

use std::path::PathBuf;

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::util::diagnostic::{suggestions, Diagnostic};

/// Error while collecting dependency files.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum CollectError {
    #[error("package.json file does not exist at {}", .path.display())]
    #[diagnostic(code(mainfiles::manifest::not_found))]
    ManifestNotFound { path: PathBuf },

    #[error("node modules directory does not exist at {}", .path.display())]
    #[diagnostic(code(mainfiles::modules::not_found))]
    ModuleDirectoryNotFound { path: PathBuf },

    #[error("failed to read {}", .path.display())]
    #[diagnostic(code(mainfiles::manifest::read))]
    ManifestRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{source} in file {}", .path.display())]
    #[diagnostic(code(mainfiles::manifest::parse))]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("group \"{group}\" does not exist in package.json")]
    #[diagnostic(code(mainfiles::group::not_found))]
    GroupNotFound { group: String },

    #[error("could not find a main file for `{package}`")]
    #[diagnostic(code(mainfiles::package::main_not_found))]
    MainNotFound {
        package: String,
        path: PathBuf,
        tried: Vec<String>,
    },

    #[error("invalid pattern `{pattern}`: {message}")]
    #[diagnostic(code(mainfiles::pattern::invalid))]
    InvalidPattern { pattern: String, message: String },
}

impl CollectError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            CollectError::ManifestNotFound { path } => {
                Diagnostic::error("package.json file does not exist")
                    .with_location(path)
                    .with_suggestion(suggestions::NO_MANIFEST)
            }

            CollectError::ModuleDirectoryNotFound { path } => {
                Diagnostic::error("node modules directory does not exist")
                    .with_location(path)
                    .with_suggestion(suggestions::NO_MODULE_DIR)
            }

            CollectError::ManifestRead { path, source } => {
                Diagnostic::error(format!("failed to read manifest: {}", source))
                    .with_location(path)
            }

            CollectError::ManifestParse { path, source } => {
                Diagnostic::error("manifest is not valid JSON")
                    .with_location(path)
                    .with_context(format!(
                        "line {}, column {}: {}",
                        source.line(),
                        source.column(),
                        source
                    ))
            }

            CollectError::GroupNotFound { group } => {
                Diagnostic::error(format!("group `{}` does not exist in package.json", group))
                    .with_suggestion(suggestions::GROUP_NOT_FOUND)
            }

            CollectError::MainNotFound {
                package,
                path,
                tried,
            } => {
                let mut diag =
                    Diagnostic::error(format!("could not find a main file for `{}`", package))
                        .with_location(path);

                for candidate in tried {
                    diag = diag.with_context(format!("looked for {}", candidate));
                }

                diag.with_suggestion(suggestions::MAIN_NOT_FOUND)
            }

            CollectError::InvalidPattern { pattern, message } => {
                Diagnostic::error(format!("invalid pattern `{}`", pattern)).with_context(message.clone())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_not_found_message() {
        let err = CollectError::GroupNotFound {
            group: "frontend".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "group \"frontend\" does not exist in package.json"
        );
    }

    #[test]
    fn test_main_not_found_diagnostic() {
        let err = CollectError::MainNotFound {
            package: "jquery".to_string(),
            path: PathBuf::from("/proj/node_modules/jquery"),
            tried: vec!["dist/jquery.js".to_string()],
        };

        let output = err.to_diagnostic().format(false);
        assert!(output.contains("could not find a main file for `jquery`"));
        assert!(output.contains("looked for dist/jquery.js"));
    }
}

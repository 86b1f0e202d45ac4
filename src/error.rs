use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::classfile::ClassFileError;

/// A classpath root that could not be scanned
#[derive(Debug)]
pub struct RootFailure {
    pub path: PathBuf,
    pub reason: String,
}

impl fmt::Display for RootFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.reason)
    }
}

/// Fatal extraction failures. Each variant names the offending type, field or path.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("Unreadable classpath roots: {}", format_failures(.failures))]
    UnreadableRoots { failures: Vec<RootFailure> },

    #[error("Malformed class {location}: {source}")]
    MalformedClass {
        location: String,
        #[source]
        source: ClassFileError,
    },

    #[error("Mojo {type_name} does not declare a goal name")]
    MissingGoalName { type_name: String },

    #[error("Goal '{goal}' is declared by both {first} and {second}")]
    DuplicateGoal {
        goal: String,
        first: String,
        second: String,
    },

    #[error("Parameter '{parameter}' is declared more than once in goal '{goal}' ({type_name})")]
    DuplicateParameter {
        goal: String,
        type_name: String,
        parameter: String,
    },

    #[error("Invalid parameter {type_name}#{field}: {reason}")]
    InvalidParameter {
        type_name: String,
        field: String,
        reason: String,
    },

    #[error("Inheritance cycle detected at {type_name}")]
    InheritanceCycle { type_name: String },

    #[error("Failed to read source file {}: {source}", .path.display())]
    SourceRead { path: PathBuf, source: io::Error },

    #[error("Invalid source pattern '{pattern}': {message}")]
    SourcePattern { pattern: String, message: String },

    #[error("Workspace error in {}: {message}", .path.display())]
    Workspace { path: PathBuf, message: String },
}

fn format_failures(failures: &[RootFailure]) -> String {
    failures
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl ExtractionError {
    pub fn workspace(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        ExtractionError::Workspace {
            path: path.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ExtractionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unreadable_roots_lists_every_failure() {
        let err = ExtractionError::UnreadableRoots {
            failures: vec![
                RootFailure {
                    path: PathBuf::from("/a/classes"),
                    reason: "not found".to_string(),
                },
                RootFailure {
                    path: PathBuf::from("/b/dep.jar"),
                    reason: "bad zip".to_string(),
                },
            ],
        };

        let msg = err.to_string();
        assert!(msg.contains("/a/classes: not found"));
        assert!(msg.contains("/b/dep.jar: bad zip"));
    }

    #[test]
    fn test_duplicate_goal_names_both_types() {
        let err = ExtractionError::DuplicateGoal {
            goal: "run".to_string(),
            first: "com.example.RunMojo".to_string(),
            second: "com.example.OtherMojo".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("'run'"));
        assert!(msg.contains("com.example.RunMojo"));
        assert!(msg.contains("com.example.OtherMojo"));
    }
}

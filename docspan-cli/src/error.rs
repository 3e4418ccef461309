//! CLI error type

use docspan_core::AlignError;
use docspan_markup::ProjectionError;
use std::fmt;
use std::path::PathBuf;

#[derive(Debug)]
pub enum CliError {
    Io { path: PathBuf, source: std::io::Error },
    Parse { path: PathBuf, message: String },
    Config(config::ConfigError),
    Align(AlignError),
    Projection(ProjectionError),
    Output(String),
    Usage(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Io { path, source } => write!(f, "{}: {}", path.display(), source),
            CliError::Parse { path, message } => {
                write!(f, "{}: could not read input: {}", path.display(), message)
            }
            CliError::Config(err) => write!(f, "Configuration error: {}", err),
            CliError::Align(err) => write!(f, "{}", err),
            CliError::Projection(err) => write!(f, "{}", err),
            CliError::Output(msg) => write!(f, "Output error: {}", msg),
            CliError::Usage(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Io { source, .. } => Some(source),
            CliError::Config(err) => Some(err),
            CliError::Align(err) => Some(err),
            CliError::Projection(err) => Some(err),
            _ => None,
        }
    }
}

impl From<config::ConfigError> for CliError {
    fn from(err: config::ConfigError) -> Self {
        CliError::Config(err)
    }
}

impl From<AlignError> for CliError {
    fn from(err: AlignError) -> Self {
        CliError::Align(err)
    }
}

impl From<ProjectionError> for CliError {
    fn from(err: ProjectionError) -> Self {
        CliError::Projection(err)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::Output(err.to_string())
    }
}

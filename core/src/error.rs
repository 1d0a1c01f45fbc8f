use std::path::PathBuf;
use thiserror::Error;

/// Startup-time configuration failures. These are the only errors that end the process.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    MissingCredential(&'static str),

    #[error("failed to read config from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config from {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// The model answered with something that is not a usable step object.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("empty response")]
    Empty,

    #[error("response is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("response is not a JSON object")]
    NotAnObject,

    #[error("missing required field '{0}'")]
    MissingField(&'static str),

    #[error("field '{field}' is invalid: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("unknown step '{0}', expected one of plan, action, observe, output")]
    UnknownStep(String),
}

/// Failure of a single tool invocation. Always turned into an observation for the model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolError {
    #[error("Tool '{0}' not found.")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("File '{0}' not found.")]
    FileNotFound(String),

    #[error("Access to '{0}' is not allowed.")]
    Forbidden(String),

    #[error("{0}")]
    Io(String),

    #[error("Command exited with status {}.\n{output}", status_label(.code))]
    CommandFailed { code: Option<i32>, output: String },

    #[error("Command timed out after {0} seconds.")]
    Timeout(u64),

    #[error("Command was interrupted by the operator.")]
    Interrupted,

    #[error("Only 'vercel' platform is supported, got '{0}'.")]
    UnsupportedPlatform(String),

    #[error("Request failed with HTTP status {0}.")]
    HttpStatus(u16),

    #[error("Request failed: {0}")]
    Request(String),

    #[error("The operator declined: {0}")]
    Declined(String),
}

fn status_label(code: &Option<i32>) -> String {
    code.map_or_else(|| "unknown".to_string(), |c| c.to_string())
}

impl ToolError {
    /// Short machine-readable name, sent to the model next to the message.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "tool_not_found",
            Self::InvalidInput(_) => "invalid_input",
            Self::FileNotFound(_) => "file_not_found",
            Self::Forbidden(_) => "forbidden",
            Self::Io(_) => "io",
            Self::CommandFailed { .. } => "command_failed",
            Self::Timeout(_) => "timeout",
            Self::Interrupted => "interrupted",
            Self::UnsupportedPlatform(_) => "unsupported_platform",
            Self::HttpStatus(_) => "http_status",
            Self::Request(_) => "request",
            Self::Declined(_) => "declined",
        }
    }
}

impl From<std::io::Error> for ToolError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

/// Why a turn ended without an output step. The session reports it and keeps going.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("model request failed: {0:#}")]
    Model(#[source] anyhow::Error),

    #[error("model kept sending malformed steps ({attempts} attempts): {last}")]
    Protocol { attempts: usize, last: ProtocolError },

    #[error("turn stopped after {0} model calls without an output step")]
    StepLimit(usize),
}

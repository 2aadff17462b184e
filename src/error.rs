//! Error type shared by providers, the engine and the audio pipeline.

use thiserror::Error;

/// Everything a [`Provider`](crate::Provider) or an audio source can fail with.
///
/// Errors never terminate a module. The engine reports them to the
/// [`Sink`](crate::Sink) and keeps waiting for the next tick or refresh.
#[derive(Debug, Error)]
pub enum Error {
    /// An external command ran but exited unsuccessfully.
    #[error("`{command}` exited with {}", describe_status(.code))]
    Exit {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Output of an external tool could not be understood.
    #[error("malformed output: {0}")]
    Parse(String),

    /// The audio backend could not open or keep a capture stream.
    #[error("audio capture: {0}")]
    Capture(String),

    #[error("{0}")]
    Provider(String),
}

impl Error {
    /// The exit status of a failed external command, if that is what failed.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Error::Exit { code, .. } => *code,
            _ => None,
        }
    }

    pub fn provider(msg: impl Into<String>) -> Self {
        Error::Provider(msg.into())
    }
}

fn describe_status(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "a signal".to_string(),
    }
}

pub type Result<T, E = Error> = core::result::Result<T, E>;

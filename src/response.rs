//! Invocation output.
//!
//! Success is reported as a plain-text message; failure as a JSON document
//! `{"Message": …, "Error": …}` followed by a newline. Exactly one
//! [`OperationResult`] is produced per invocation.

use crate::error::ConversionError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{self, Write};

/// Structured failure payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedResponse {
    #[serde(rename = "Message")]
    pub message: String,
    #[serde(rename = "Error")]
    pub error: String,
}

impl fmt::Display for FailedResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} due to {}", self.message, self.error)
    }
}

impl From<&ConversionError> for FailedResponse {
    fn from(err: &ConversionError) -> Self {
        Self {
            message: err.summary(),
            error: err.detail(),
        }
    }
}

/// The terminal outcome of one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationResult {
    Success { message: String },
    Failure(FailedResponse),
}

impl OperationResult {
    pub fn is_success(&self) -> bool {
        matches!(self, OperationResult::Success { .. })
    }

    /// Serialise the result to the invocation's output channel.
    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        match self {
            OperationResult::Success { message } => out.write_all(message.as_bytes())?,
            OperationResult::Failure(resp) => {
                serde_json::to_writer(&mut *out, resp)?;
                out.write_all(b"\n")?;
            }
        }
        out.flush()
    }

    /// The serialised output as bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        // Writing into a Vec cannot fail.
        let _ = self.write_to(&mut buf);
        buf
    }
}

impl From<&ConversionError> for OperationResult {
    fn from(err: &ConversionError) -> Self {
        OperationResult::Failure(FailedResponse::from(err))
    }
}

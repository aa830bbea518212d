//! Error types for the text2pdf function.
//!
//! Three layers, each owned by the component that detects the failure:
//!
//! * [`StorageError`]: returned by every [`crate::storage::ObjectStore`]
//!   and [`crate::storage::Connector`] implementation. Distinguishes service
//!   rejections, transport failures, signing problems and length mismatches.
//!
//! * [`RenderError`]: the PDF could not be written to its sink.
//!
//! * [`ConversionError`]: **Terminal**: one per failed invocation. Carries
//!   the pipeline [`Stage`] it failed to reach and collapses storage causes
//!   into the coarse [`ErrorKind`] callers branch on.
//!
//! Every `ConversionError` is turned into a [`crate::response::FailedResponse`]
//! in exactly one place, so the wire messages stay consistent.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Failures from the object-storage seam.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The service answered with a non-success status.
    #[error("{status} {code}: {message}")]
    Service {
        status: u16,
        code: String,
        message: String,
    },

    /// The request never produced a response (DNS, TLS, connection reset…).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The credential could not be turned into a request signer.
    #[error("request signing unavailable: {0}")]
    Signing(String),

    /// The endpoint or object path could not be turned into a URL.
    #[error("invalid endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    /// The declared content length does not match the payload.
    #[error("declared content length {declared} but payload has {actual} bytes")]
    LengthMismatch { declared: u64, actual: u64 },

    /// The object does not exist (in-memory store only; the remote store
    /// reports this as a `Service` 404).
    #[error("object '{object}' not found in bucket '{bucket}'")]
    NotFound { bucket: String, object: String },

    /// A failure injected by a test double.
    #[error("{0}")]
    Injected(String),
}

/// The PDF could not be written.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The output file could not be created, written or flushed.
    #[error("cannot write PDF to '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The layout engine failed to serialise the document.
    #[error("PDF serialisation failed: {0}")]
    Layout(#[from] flowpdf::Error),

    /// The blocking render task died before returning.
    #[error("render task aborted: {0}")]
    Aborted(String),
}

/// Coarse error classification returned by [`ConversionError::kind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    EmptyName,
    Credential,
    ClientInit,
    Fetch,
    Render,
    Upload,
}

/// Pipeline states, in order. A failure is reported against the stage the
/// pipeline was trying to reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    Start,
    NameValidated,
    CredentialLoaded,
    ClientReady,
    Fetched,
    Rendered,
    Uploaded,
    Reported,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Start => "start",
            Stage::NameValidated => "name-validated",
            Stage::CredentialLoaded => "credential-loaded",
            Stage::ClientReady => "client-ready",
            Stage::Fetched => "fetched",
            Stage::Rendered => "rendered",
            Stage::Uploaded => "uploaded",
            Stage::Reported => "reported",
        };
        f.write_str(name)
    }
}

/// A terminal failure of one conversion.
#[derive(Debug, Error)]
pub enum ConversionError {
    /// The request payload named no object.
    #[error("File name empty. Pass name of a valid .txt file in bucket - {bucket}")]
    EmptyName { bucket: String },

    /// The private key file could not be read.
    #[error("Unable to read private Key at '{path}': {source}")]
    Credential {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The credential could not produce a storage client.
    #[error("Problem getting Object Store Client handle: {source}")]
    ClientInit {
        #[source]
        source: StorageError,
    },

    /// The source object could not be read.
    #[error("Could not read file {object} from bucket {bucket}: {source}")]
    Fetch {
        object: String,
        bucket: String,
        #[source]
        source: StorageError,
    },

    /// The PDF could not be rendered to the scratch location.
    #[error("Failed to write PDF: {source}")]
    Render {
        #[source]
        source: RenderError,
    },

    /// The rendered artifact could not be read back for upload.
    #[error("failed to read PDF from {path}: {source}")]
    ArtifactUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The PDF could not be stored.
    #[error("Failed to write PDF to bucket {bucket}: {source}")]
    Upload {
        object: String,
        bucket: String,
        #[source]
        source: StorageError,
    },
}

impl ConversionError {
    /// The coarse class of this failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConversionError::EmptyName { .. } => ErrorKind::EmptyName,
            ConversionError::Credential { .. } => ErrorKind::Credential,
            ConversionError::ClientInit { .. } => ErrorKind::ClientInit,
            ConversionError::Fetch { .. } => ErrorKind::Fetch,
            ConversionError::Render { .. } => ErrorKind::Render,
            ConversionError::ArtifactUnreadable { .. } | ConversionError::Upload { .. } => {
                ErrorKind::Upload
            }
        }
    }

    /// The stage the pipeline failed to reach.
    pub fn stage(&self) -> Stage {
        match self.kind() {
            ErrorKind::EmptyName => Stage::NameValidated,
            ErrorKind::Credential => Stage::CredentialLoaded,
            ErrorKind::ClientInit => Stage::ClientReady,
            ErrorKind::Fetch => Stage::Fetched,
            ErrorKind::Render => Stage::Rendered,
            ErrorKind::Upload => Stage::Uploaded,
        }
    }

    /// Short, user-facing summary (the `Message` field of a failed response).
    pub fn summary(&self) -> String {
        match self {
            ConversionError::EmptyName { bucket } => format!(
                "File name empty. Pass name of a valid .txt file in bucket - {bucket}"
            ),
            ConversionError::Credential { .. } => "Unable to read private Key".to_string(),
            ConversionError::ClientInit { .. } => {
                "Problem getting Object Store Client handle".to_string()
            }
            ConversionError::Fetch { object, bucket, .. } => {
                format!("Could not read file {object} from bucket {bucket}")
            }
            ConversionError::Render { .. } => "Failed to write PDF".to_string(),
            ConversionError::ArtifactUnreadable { path, .. } => {
                format!("failed to read PDF from {}", path.display())
            }
            ConversionError::Upload { .. } => "Failed to write PDF to bucket".to_string(),
        }
    }

    /// The underlying cause as text (the `Error` field of a failed response).
    /// Empty when the failure has no cause beyond its summary.
    pub fn detail(&self) -> String {
        match self {
            ConversionError::EmptyName { .. } => String::new(),
            ConversionError::Credential { source, .. }
            | ConversionError::ArtifactUnreadable { source, .. } => source.to_string(),
            ConversionError::ClientInit { source }
            | ConversionError::Fetch { source, .. }
            | ConversionError::Upload { source, .. } => source.to_string(),
            ConversionError::Render { source } => source.to_string(),
        }
    }
}

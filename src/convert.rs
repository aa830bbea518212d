//! The conversion orchestrator.
//!
//! One call to [`Converter::convert`] walks the pipeline states in order:
//!
//! ```text
//! Start → NameValidated → CredentialLoaded → ClientReady → Fetched
//!       → Rendered → Uploaded → Reported
//! ```
//!
//! The first failing step ends the run with a [`ConversionError`]; nothing
//! after it executes and nothing is retried. Once a scratch artifact has been
//! reserved it is removed whether rendering or uploading succeeded or not,
//! and a failed removal never replaces the run's own result.

use crate::config::FunctionConfig;
use crate::credential;
use crate::error::{ConversionError, RenderError, Stage};
use crate::pipeline::artifact::ScratchArtifact;
use crate::pipeline::naming::derive_output_name;
use crate::pipeline::render;
use crate::response::{FailedResponse, OperationResult};
use crate::storage::{Connector, ObjectLocation, ObjectStore, OciConnector};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// A completed conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    /// The text object that was read.
    pub source: ObjectLocation,
    /// The PDF object that was written.
    pub output: ObjectLocation,
    /// Size of the uploaded PDF in bytes.
    pub pdf_bytes: u64,
}

impl Conversion {
    /// The success message reported to the caller.
    pub fn message(&self) -> String {
        format!(
            "PDF {} written to storage bucket - {}",
            self.output.object_name, self.output.bucket
        )
    }
}

/// Drives fetch → render → upload for one configuration.
pub struct Converter {
    config: FunctionConfig,
    connector: Arc<dyn Connector>,
}

impl std::fmt::Debug for Converter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Converter")
            .field("config", &self.config)
            .field("connector", &"<dyn Connector>")
            .finish()
    }
}

impl Converter {
    /// A converter talking to OCI Object Storage at the configured endpoint.
    pub fn new(config: FunctionConfig) -> Self {
        let connector = OciConnector::from_config(&config);
        Self::with_connector(config, Arc::new(connector))
    }

    /// A converter using `connector` to reach storage.
    pub fn with_connector(config: FunctionConfig, connector: Arc<dyn Connector>) -> Self {
        debug!("Converter configured: {:?}", config);
        Self { config, connector }
    }

    pub fn config(&self) -> &FunctionConfig {
        &self.config
    }

    /// Handle one raw invocation payload and produce its result.
    ///
    /// The payload is the object name; bytes that are not UTF-8 are
    /// replaced rather than rejected.
    pub async fn handle(&self, payload: &[u8]) -> OperationResult {
        let object_name = String::from_utf8_lossy(payload);
        match self.convert(&object_name).await {
            Ok(conversion) => {
                let message = conversion.message();
                info!("{}", message);
                OperationResult::Success { message }
            }
            Err(err) => {
                let response = FailedResponse::from(&err);
                error!("[{}] {}", err.stage(), response);
                OperationResult::Failure(response)
            }
        }
    }

    /// Convert the text object `object_name` into a PDF in the same bucket.
    ///
    /// # Errors
    /// One [`ConversionError`] per failed step; see [`ConversionError::kind`].
    pub async fn convert(&self, object_name: &str) -> Result<Conversion, ConversionError> {
        let started = Instant::now();
        let bucket = &self.config.bucket;
        info!("Text file name {}", object_name);

        // ── Step 1: Validate name ────────────────────────────────────────────
        if object_name.is_empty() {
            warn!("File name empty");
            return Err(ConversionError::EmptyName {
                bucket: bucket.clone(),
            });
        }
        debug!("stage {}", Stage::NameValidated);

        // ── Step 2: Load credential ──────────────────────────────────────────
        let credential = credential::load(&self.config).await?;
        debug!("stage {}", Stage::CredentialLoaded);

        // ── Step 3: Build storage client ─────────────────────────────────────
        let store = self
            .connector
            .connect(&credential)
            .map_err(|source| ConversionError::ClientInit { source })?;
        debug!("stage {}", Stage::ClientReady);

        // ── Step 4: Fetch source text ────────────────────────────────────────
        let source = ObjectLocation::new(&self.config.namespace, bucket, object_name);
        info!("Reading text file {} from storage bucket {}", object_name, bucket);
        let content = store
            .fetch(&source)
            .await
            .map_err(|source| ConversionError::Fetch {
                object: object_name.to_string(),
                bucket: bucket.clone(),
                source,
            })?;
        let text = String::from_utf8_lossy(&content).into_owned();
        debug!("stage {} ({} bytes)", Stage::Fetched, content.len());

        // ── Step 5–7: Render, upload, always clean up ────────────────────────
        let output = source.sibling(derive_output_name(object_name));
        let artifact = ScratchArtifact::create(&self.config.scratch_dir, &output.object_name)
            .map_err(|source| ConversionError::Render {
                source: RenderError::Io {
                    path: self.config.scratch_dir.clone(),
                    source,
                },
            })?;

        let outcome = render_and_upload(store.as_ref(), &artifact, text, &output).await;
        artifact.cleanup();
        let pdf_bytes = outcome?;

        info!(
            "Converted {} → {} ({} bytes) in {}ms",
            source,
            output,
            pdf_bytes,
            started.elapsed().as_millis()
        );
        Ok(Conversion {
            source,
            output,
            pdf_bytes,
        })
    }
}

/// Steps 5 and 6: everything that happens while the artifact exists.
async fn render_and_upload(
    store: &dyn ObjectStore,
    artifact: &ScratchArtifact,
    text: String,
    output: &ObjectLocation,
) -> Result<u64, ConversionError> {
    render::render_to_file(text, artifact.path())
        .await
        .map_err(|source| ConversionError::Render { source })?;
    info!("PDF Written to {}", artifact.path().display());
    debug!("stage {}", Stage::Rendered);

    let (content, length) =
        artifact
            .read()
            .await
            .map_err(|source| ConversionError::ArtifactUnreadable {
                path: artifact.path().to_path_buf(),
                source,
            })?;

    store
        .put(output, content, length)
        .await
        .map_err(|source| ConversionError::Upload {
            object: output.object_name.clone(),
            bucket: output.bucket.clone(),
            source,
        })?;
    debug!("stage {}", Stage::Uploaded);
    Ok(length)
}

//! # text2pdf
//!
//! A serverless function that turns a plain-text object in OCI Object
//! Storage into a PDF and stores it next to the source.
//!
//! ## Pipeline Overview
//!
//! ```text
//! payload ("report.txt")
//!  │
//!  ├─ 1. Validate   non-empty object name
//!  ├─ 2. Credential read the API private key from the key directory
//!  ├─ 3. Client     build a signed Object Storage client
//!  ├─ 4. Fetch      GET the text object
//!  ├─ 5. Render     flow the text onto A4 pages (Times-Roman 12 pt)
//!  ├─ 6. Upload     PUT "report.pdf" with its exact length
//!  ├─ 7. Cleanup    delete the scratch PDF, always
//!  └─ 8. Report     plain-text success or JSON {Message, Error}
//! ```
//!
//! Each invocation is independent: one credential, one client, one scratch
//! file, no retries.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use text2pdf::{Converter, FunctionConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     // TENANT_OCID, USER_OCID, REGION, FINGERPRINT, PRIVATE_KEY_NAME,
//!     // PASSPHRASE, NAMESPACE and BUCKET_NAME come from the environment.
//!     let converter = Converter::new(FunctionConfig::from_env());
//!     let result = converter.handle(b"report.txt").await;
//!     std::io::Write::write_all(&mut std::io::stdout(), &result.to_bytes()).unwrap();
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `text2pdf` binary (clap + anyhow + tracing-subscriber) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod credential;
pub mod error;
pub mod pipeline;
pub mod response;
pub mod storage;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{FunctionConfig, FunctionConfigBuilder};
pub use convert::{Conversion, Converter};
pub use credential::StorageCredential;
pub use error::{ConversionError, ErrorKind, RenderError, Stage, StorageError};
pub use pipeline::naming::derive_output_name;
pub use response::{FailedResponse, OperationResult};
pub use storage::{Connector, ObjectLocation, ObjectStore};

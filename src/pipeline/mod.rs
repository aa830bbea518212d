//! Pipeline stages for text-to-PDF conversion.
//!
//! Each submodule implements one step the orchestrator in
//! [`crate::convert`] drives in order.
//!
//! ## Data Flow
//!
//! ```text
//! naming ──▶ render ──▶ artifact
//! (a.txt → a.pdf)  (flowpdf)  (scratch file, upload, delete)
//! ```
//!
//! 1. [`naming`]: derive the PDF object name from the source name
//! 2. [`render`]: lay the text out on A4 pages; runs in `spawn_blocking`
//!    because layout and serialisation are CPU-bound
//! 3. [`artifact`]: the scratch PDF on disk; read back for upload and
//!    removed on every exit path

pub mod artifact;
pub mod naming;
pub mod render;

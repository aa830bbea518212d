//! The rendered PDF's scratch file.
//!
//! ## Why a per-invocation name?
//!
//! The function runtime may run several invocations side by side in one
//! container. Naming the scratch file only after the derived object name
//! would let two requests for `report.txt` overwrite each other's PDF, so
//! the file gets a random infix from [`tempfile`]:
//! `<scratch_dir>/<stem>-<random>.pdf`.
//!
//! The artifact is removed by [`ScratchArtifact::cleanup`] once the upload
//! attempt is over. If the pipeline unwinds before that, dropping the
//! artifact still removes the file.

use crate::pipeline::naming::output_stem;
use bytes::Bytes;
use std::io;
use std::path::Path;
use tempfile::TempPath;
use tokio::io::AsyncReadExt;
use tracing::{info, warn};

/// An on-disk PDF owned by one conversion.
#[derive(Debug)]
pub struct ScratchArtifact {
    path: TempPath,
}

impl ScratchArtifact {
    /// Reserve a unique, empty scratch file for `output_name`.
    pub fn create(scratch_dir: &Path, output_name: &str) -> io::Result<Self> {
        let prefix = format!("{}-", file_safe(output_stem(output_name)));
        let file = tempfile::Builder::new()
            .prefix(&prefix)
            .suffix(".pdf")
            .tempfile_in(scratch_dir)?;
        Ok(Self {
            path: file.into_temp_path(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open the artifact and read it whole, returning the bytes and the
    /// length reported by the filesystem.
    pub async fn read(&self) -> io::Result<(Bytes, u64)> {
        let mut file = tokio::fs::File::open(self.path()).await?;
        let length = file.metadata().await?.len();
        let mut buf = Vec::with_capacity(usize::try_from(length).unwrap_or_default());
        file.read_to_end(&mut buf).await?;
        Ok((Bytes::from(buf), length))
    }

    /// Delete the artifact. Failure is logged and otherwise ignored.
    pub fn cleanup(self) {
        let shown = self.path.display().to_string();
        match self.path.close() {
            Ok(()) => info!("Deleted temp file {}", shown),
            Err(e) => warn!("Error removing temp file {}: {}", shown, e),
        }
    }
}

/// Object names may contain `/`; scratch file names may not.
fn file_safe(stem: &str) -> String {
    stem.chars()
        .map(|c| match c {
            '/' | '\\' => '_',
            other => other,
        })
        .collect()
}

//! Signing credential assembly.
//!
//! The API private key is mounted into the function image; everything else
//! comes from configuration. Key content is not validated here: a malformed
//! key only surfaces when a storage client tries to sign with it.

use crate::config::FunctionConfig;
use crate::error::ConversionError;
use std::fmt;
use tracing::info;

/// Everything needed to sign Object Storage requests as one API user.
///
/// Immutable once loaded. `Debug` never prints the key or the passphrase.
#[derive(Clone)]
pub struct StorageCredential {
    tenancy_id: String,
    user_id: String,
    region: String,
    fingerprint: String,
    private_key: Vec<u8>,
    passphrase: String,
}

impl StorageCredential {
    pub fn new(
        tenancy_id: impl Into<String>,
        user_id: impl Into<String>,
        region: impl Into<String>,
        fingerprint: impl Into<String>,
        private_key: Vec<u8>,
        passphrase: impl Into<String>,
    ) -> Self {
        Self {
            tenancy_id: tenancy_id.into(),
            user_id: user_id.into(),
            region: region.into(),
            fingerprint: fingerprint.into(),
            private_key,
            passphrase: passphrase.into(),
        }
    }

    pub fn tenancy_id(&self) -> &str {
        &self.tenancy_id
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// PEM-encoded private key bytes.
    pub fn private_key(&self) -> &[u8] {
        &self.private_key
    }

    pub fn passphrase(&self) -> &str {
        &self.passphrase
    }

    /// The `keyId` of the request signature: `<tenancy>/<user>/<fingerprint>`.
    pub fn key_id(&self) -> String {
        format!("{}/{}/{}", self.tenancy_id, self.user_id, self.fingerprint)
    }
}

impl fmt::Debug for StorageCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageCredential")
            .field("tenancy_id", &self.tenancy_id)
            .field("user_id", &self.user_id)
            .field("region", &self.region)
            .field("fingerprint", &self.fingerprint)
            .field("private_key", &format_args!("<{} bytes>", self.private_key.len()))
            .field("passphrase", &"<redacted>")
            .finish()
    }
}

/// Read the private key named by `config` and assemble the credential.
///
/// # Errors
/// [`ConversionError::Credential`] when the key file is missing, unreadable
/// or not permitted.
pub async fn load(config: &FunctionConfig) -> Result<StorageCredential, ConversionError> {
    let path = config.private_key_path();
    let private_key = tokio::fs::read(&path)
        .await
        .map_err(|source| ConversionError::Credential {
            path: path.clone(),
            source,
        })?;
    info!("read private key from {}", path.display());

    Ok(StorageCredential::new(
        config.tenancy_id.clone(),
        config.user_id.clone(),
        config.region.clone(),
        config.fingerprint.clone(),
        private_key,
        config.passphrase.clone(),
    ))
}

//! Function configuration.
//!
//! The hosting runtime hands configuration to the function as plain
//! key/value pairs (environment variables under Fn). [`FunctionConfig`]
//! collects the recognised keys in one place; missing keys read as empty
//! strings so a misconfigured deployment fails at the step that needs the
//! value, with that step's error.
//!
//! The key directory and scratch directory are fields rather than constants
//! so tests can point them at temporary directories.

use std::fmt;
use std::path::PathBuf;

/// Directory the private key is mounted into by the function image.
pub const DEFAULT_KEY_DIR: &str = "/function";

/// Writable scratch directory available to the function.
pub const DEFAULT_SCRATCH_DIR: &str = "/tmp";

/// Recognised configuration keys.
pub mod keys {
    pub const TENANT_OCID: &str = "TENANT_OCID";
    pub const USER_OCID: &str = "USER_OCID";
    pub const REGION: &str = "REGION";
    pub const FINGERPRINT: &str = "FINGERPRINT";
    pub const PRIVATE_KEY_NAME: &str = "PRIVATE_KEY_NAME";
    pub const PASSPHRASE: &str = "PASSPHRASE";
    pub const NAMESPACE: &str = "NAMESPACE";
    pub const BUCKET_NAME: &str = "BUCKET_NAME";
    pub const PRIVATE_KEY_DIR: &str = "PRIVATE_KEY_DIR";
    pub const SCRATCH_DIR: &str = "SCRATCH_DIR";
    pub const ENDPOINT: &str = "OCI_OBJECT_STORAGE_ENDPOINT";
}

/// Configuration for one function invocation.
///
/// Built via [`FunctionConfig::builder()`], [`FunctionConfig::from_env()`] or
/// [`FunctionConfig::from_lookup()`].
#[derive(Clone, PartialEq, Eq)]
pub struct FunctionConfig {
    /// Tenancy OCID of the signing user.
    pub tenancy_id: String,

    /// User OCID the API key belongs to.
    pub user_id: String,

    /// Region identifier, e.g. `eu-frankfurt-1`. Selects the default endpoint.
    pub region: String,

    /// Fingerprint of the uploaded public key.
    pub fingerprint: String,

    /// File name of the private key inside [`Self::key_dir`].
    pub private_key_name: String,

    /// Passphrase of the private key, empty when the key is not encrypted.
    pub passphrase: String,

    /// Object Storage namespace.
    pub namespace: String,

    /// Bucket holding both the source text and the produced PDF.
    pub bucket: String,

    /// Directory holding the private key. Default: `/function`.
    pub key_dir: PathBuf,

    /// Directory for the temporary PDF. Default: `/tmp`.
    pub scratch_dir: PathBuf,

    /// Object Storage endpoint override. When `None` the regional endpoint
    /// `https://objectstorage.<region>.oraclecloud.com` is used.
    pub endpoint: Option<String>,
}

impl Default for FunctionConfig {
    fn default() -> Self {
        Self {
            tenancy_id: String::new(),
            user_id: String::new(),
            region: String::new(),
            fingerprint: String::new(),
            private_key_name: String::new(),
            passphrase: String::new(),
            namespace: String::new(),
            bucket: String::new(),
            key_dir: PathBuf::from(DEFAULT_KEY_DIR),
            scratch_dir: PathBuf::from(DEFAULT_SCRATCH_DIR),
            endpoint: None,
        }
    }
}

impl fmt::Debug for FunctionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionConfig")
            .field("tenancy_id", &self.tenancy_id)
            .field("user_id", &self.user_id)
            .field("region", &self.region)
            .field("fingerprint", &self.fingerprint)
            .field("private_key_name", &self.private_key_name)
            .field("passphrase", &if self.passphrase.is_empty() { "" } else { "<redacted>" })
            .field("namespace", &self.namespace)
            .field("bucket", &self.bucket)
            .field("key_dir", &self.key_dir)
            .field("scratch_dir", &self.scratch_dir)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl FunctionConfig {
    /// Create a new builder for `FunctionConfig`.
    pub fn builder() -> FunctionConfigBuilder {
        FunctionConfigBuilder {
            config: Self::default(),
        }
    }

    /// Read every recognised key from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read every recognised key through `lookup`. Missing keys become empty
    /// strings; missing optional keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).unwrap_or_default();
        let defaults = Self::default();
        Self {
            tenancy_id: get(keys::TENANT_OCID),
            user_id: get(keys::USER_OCID),
            region: get(keys::REGION),
            fingerprint: get(keys::FINGERPRINT),
            private_key_name: get(keys::PRIVATE_KEY_NAME),
            passphrase: get(keys::PASSPHRASE),
            namespace: get(keys::NAMESPACE),
            bucket: get(keys::BUCKET_NAME),
            key_dir: lookup(keys::PRIVATE_KEY_DIR)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.key_dir),
            scratch_dir: lookup(keys::SCRATCH_DIR)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.scratch_dir),
            endpoint: lookup(keys::ENDPOINT).filter(|v| !v.is_empty()),
        }
    }

    /// Full path of the private key file.
    pub fn private_key_path(&self) -> PathBuf {
        self.key_dir.join(&self.private_key_name)
    }

    /// The Object Storage endpoint to talk to.
    pub fn object_storage_endpoint(&self) -> String {
        match &self.endpoint {
            Some(endpoint) => endpoint.trim_end_matches('/').to_string(),
            None => format!("https://objectstorage.{}.oraclecloud.com", self.region),
        }
    }
}

/// Builder for [`FunctionConfig`].
#[derive(Debug)]
pub struct FunctionConfigBuilder {
    config: FunctionConfig,
}

impl FunctionConfigBuilder {
    pub fn tenancy_id(mut self, v: impl Into<String>) -> Self {
        self.config.tenancy_id = v.into();
        self
    }

    pub fn user_id(mut self, v: impl Into<String>) -> Self {
        self.config.user_id = v.into();
        self
    }

    pub fn region(mut self, v: impl Into<String>) -> Self {
        self.config.region = v.into();
        self
    }

    pub fn fingerprint(mut self, v: impl Into<String>) -> Self {
        self.config.fingerprint = v.into();
        self
    }

    pub fn private_key_name(mut self, v: impl Into<String>) -> Self {
        self.config.private_key_name = v.into();
        self
    }

    pub fn passphrase(mut self, v: impl Into<String>) -> Self {
        self.config.passphrase = v.into();
        self
    }

    pub fn namespace(mut self, v: impl Into<String>) -> Self {
        self.config.namespace = v.into();
        self
    }

    pub fn bucket(mut self, v: impl Into<String>) -> Self {
        self.config.bucket = v.into();
        self
    }

    pub fn key_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.key_dir = dir.into();
        self
    }

    pub fn scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.scratch_dir = dir.into();
        self
    }

    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.endpoint = Some(endpoint.into());
        self
    }

    /// Finish the configuration.
    pub fn build(self) -> FunctionConfig {
        self.config
    }
}

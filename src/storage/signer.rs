//! OCI HTTP request signing (draft-cavage HTTP Signatures, version 1).
//!
//! The signing string is the lowercase header list joined by newlines:
//!
//! ```text
//! date: Thu, 05 Jan 2014 21:31:40 GMT
//! (request-target): get /n/ns/b/bucket/o/report.txt
//! host: objectstorage.us-phoenix-1.oraclecloud.com
//! ```
//!
//! signed with RSA-PKCS#1 v1.5 / SHA-256 and sent as
//! `Authorization: Signature version="1",keyId=…,algorithm="rsa-sha256",headers=…,signature=…`.
//! Object PUTs are signed without body headers, matching the service's
//! streaming-upload rules, so the same three headers are used for both
//! operations.

use crate::credential::StorageCredential;
use crate::error::StorageError;
use base64::{
    engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD},
    Engine as _,
};
use jsonwebtoken::{crypto, Algorithm, EncodingKey};
use reqwest::{Method, Url};

/// Headers covered by every signature, in signing order.
pub const SIGNED_HEADERS: &str = "date (request-target) host";

/// Signs requests on behalf of one API key.
pub struct RequestSigner {
    key_id: String,
    key: EncodingKey,
}

impl std::fmt::Debug for RequestSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestSigner")
            .field("key_id", &self.key_id)
            .field("key", &"<rsa private key>")
            .finish()
    }
}

impl RequestSigner {
    /// Parse the credential's PEM key and prove it can sign.
    ///
    /// # Errors
    /// [`StorageError::Signing`] when the key is not an unencrypted RSA
    /// private key (PKCS#1 or PKCS#8 PEM) the signing backend accepts.
    pub fn new(credential: &StorageCredential) -> Result<Self, StorageError> {
        let pem = credential.private_key();
        if is_encrypted_pem(pem) {
            return Err(StorageError::Signing(
                "passphrase-protected private keys are not supported; \
                 decrypt the key (openssl rsa -in key.pem -out key.pem) and redeploy"
                    .to_string(),
            ));
        }

        let key = EncodingKey::from_rsa_pem(pem)
            .map_err(|e| StorageError::Signing(format!("invalid RSA private key: {e}")))?;

        // The PEM parser accepts any well-formed block; the RSA backend only
        // checks the key on first use.
        crypto::sign(b"probe", &key, Algorithm::RS256)
            .map_err(|e| StorageError::Signing(format!("unusable RSA private key: {e}")))?;

        Ok(Self {
            key_id: credential.key_id(),
            key,
        })
    }

    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// Build the `Authorization` header value for a request.
    pub fn authorization(&self, method: &Method, url: &Url, date: &str) -> Result<String, StorageError> {
        let signing_string = signing_string(method, url, date);
        let signature = self.sign(signing_string.as_bytes())?;
        Ok(format!(
            "Signature version=\"1\",keyId=\"{}\",algorithm=\"rsa-sha256\",headers=\"{}\",signature=\"{}\"",
            self.key_id, SIGNED_HEADERS, signature
        ))
    }

    /// RSA-SHA256 signature of `message`, standard base64.
    fn sign(&self, message: &[u8]) -> Result<String, StorageError> {
        let url_safe = crypto::sign(message, &self.key, Algorithm::RS256)
            .map_err(|e| StorageError::Signing(e.to_string()))?;
        let raw = URL_SAFE_NO_PAD
            .decode(url_safe)
            .map_err(|e| StorageError::Signing(e.to_string()))?;
        Ok(STANDARD.encode(raw))
    }
}

/// The `host` header value reqwest will send for `url`.
pub fn host_header(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    }
}

/// The current time as an RFC 7231 `date` header value.
pub fn http_date_now() -> String {
    chrono::Utc::now()
        .format("%a, %d %b %Y %H:%M:%S GMT")
        .to_string()
}

/// Assemble the string that gets signed.
pub fn signing_string(method: &Method, url: &Url, date: &str) -> String {
    let mut target = url.path().to_string();
    if let Some(query) = url.query() {
        target.push('?');
        target.push_str(query);
    }
    format!(
        "date: {date}\n(request-target): {} {target}\nhost: {}",
        method.as_str().to_lowercase(),
        host_header(url)
    )
}

fn is_encrypted_pem(pem: &[u8]) -> bool {
    let text = String::from_utf8_lossy(pem);
    text.contains("BEGIN ENCRYPTED PRIVATE KEY") || text.contains("Proc-Type: 4,ENCRYPTED")
}

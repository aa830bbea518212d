//! Function entry point for text2pdf.
//!
//! A thin shim over the library crate: the payload (object name) arrives on
//! stdin, configuration arrives as environment variables or flags, and the
//! result is written to stdout. Logs go to stderr so they never mix with
//! the response.

use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;
use text2pdf::{config, Converter, FunctionConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert report.txt in the configured bucket
  printf 'report.txt' | text2pdf

  # Name the object on the command line instead of stdin
  text2pdf --object report.txt

  # Local key and scratch directories (outside the function image)
  text2pdf --key-dir ~/.oci --scratch-dir /var/tmp --object report.txt

OUTPUT:
  Success   PDF report.pdf written to storage bucket - <bucket>
  Failure   {"Message":"...","Error":"..."}

ENVIRONMENT VARIABLES:
  TENANT_OCID                  Tenancy OCID of the API user
  USER_OCID                    User OCID owning the API key
  REGION                       Region, e.g. eu-frankfurt-1
  FINGERPRINT                  API key fingerprint
  PRIVATE_KEY_NAME             Key file name inside PRIVATE_KEY_DIR
  PASSPHRASE                   Key passphrase (unencrypted keys only are supported)
  NAMESPACE                    Object Storage namespace
  BUCKET_NAME                  Bucket holding the text and the PDF
  PRIVATE_KEY_DIR              Key directory (default /function)
  SCRATCH_DIR                  Scratch directory (default /tmp)
  OCI_OBJECT_STORAGE_ENDPOINT  Endpoint override
  RUST_LOG                     Log filter, e.g. text2pdf=debug
"#;

/// Render a text object from OCI Object Storage into a PDF in the same bucket.
#[derive(Parser, Debug)]
#[command(
    name = "text2pdf",
    version,
    about = "Render a text object from OCI Object Storage into a PDF in the same bucket",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Object name to convert. Read from stdin when omitted.
    #[arg(long)]
    object: Option<String>,

    /// Tenancy OCID.
    #[arg(long, env = config::keys::TENANT_OCID, default_value = "")]
    tenancy: String,

    /// User OCID.
    #[arg(long, env = config::keys::USER_OCID, default_value = "")]
    user: String,

    /// Region identifier.
    #[arg(long, env = config::keys::REGION, default_value = "")]
    region: String,

    /// API key fingerprint.
    #[arg(long, env = config::keys::FINGERPRINT, default_value = "")]
    fingerprint: String,

    /// Private key file name inside --key-dir.
    #[arg(long, env = config::keys::PRIVATE_KEY_NAME, default_value = "")]
    private_key_name: String,

    /// Private key passphrase.
    #[arg(long, env = config::keys::PASSPHRASE, default_value = "", hide_env_values = true)]
    passphrase: String,

    /// Object Storage namespace.
    #[arg(long, env = config::keys::NAMESPACE, default_value = "")]
    namespace: String,

    /// Bucket name.
    #[arg(long, env = config::keys::BUCKET_NAME, default_value = "")]
    bucket: String,

    /// Directory holding the private key.
    #[arg(long, env = config::keys::PRIVATE_KEY_DIR, default_value = config::DEFAULT_KEY_DIR)]
    key_dir: PathBuf,

    /// Directory for the temporary PDF.
    #[arg(long, env = config::keys::SCRATCH_DIR, default_value = config::DEFAULT_SCRATCH_DIR)]
    scratch_dir: PathBuf,

    /// Object Storage endpoint override.
    #[arg(long, env = config::keys::ENDPOINT)]
    endpoint: Option<String>,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long)]
    verbose: bool,

    /// Log errors only.
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    fn function_config(&self) -> FunctionConfig {
        let mut builder = FunctionConfig::builder()
            .tenancy_id(&self.tenancy)
            .user_id(&self.user)
            .region(&self.region)
            .fingerprint(&self.fingerprint)
            .private_key_name(&self.private_key_name)
            .passphrase(&self.passphrase)
            .namespace(&self.namespace)
            .bucket(&self.bucket)
            .key_dir(&self.key_dir)
            .scratch_dir(&self.scratch_dir);
        if let Some(endpoint) = self.endpoint.as_deref().filter(|e| !e.is_empty()) {
            builder = builder.endpoint(endpoint);
        }
        builder.build()
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let config = cli.function_config();
    info!("TENANT_OCID {}", config.tenancy_id);
    info!("USER_OCID {}", config.user_id);
    info!("REGION {}", config.region);
    info!("FINGERPRINT {}", config.fingerprint);
    info!("PRIVATE_KEY_NAME {}", config.private_key_name);
    info!("PRIVATE_KEY_LOCATION {}", config.private_key_path().display());
    info!("NAMESPACE {}", config.namespace);
    info!("BUCKET_NAME {}", config.bucket);

    // ── Read payload ─────────────────────────────────────────────────────
    let payload = match cli.object {
        Some(ref name) => name.clone().into_bytes(),
        None => {
            let mut buf = Vec::new();
            io::stdin()
                .read_to_end(&mut buf)
                .context("Failed to read payload from stdin")?;
            buf
        }
    };

    // ── Run conversion ───────────────────────────────────────────────────
    let result = Converter::new(config).handle(&payload).await;

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    result
        .write_to(&mut handle)
        .context("Failed to write response to stdout")?;

    Ok(if result.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

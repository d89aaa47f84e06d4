// # dnsrec - single DNS record reconciler
//
// Thin integration layer: reads the desired record from the environment,
// registers providers, runs one reconciliation and prints the result.
// All record logic lives in dnsrec-core.
//
// ## Configuration
//
// ### Record
// - `DNSREC_DOMAIN`: Zone that holds the record (required)
// - `DNSREC_NAME`: Fully qualified record name (required)
// - `DNSREC_DATA`: Record data (required)
// - `DNSREC_TYPE`: A, AAAA, CNAME, MX, NS, SRV or TXT (default: A)
// - `DNSREC_TTL`: Time to live in seconds (default: 3600)
// - `DNSREC_PRIORITY`: Priority, required for MX and SRV
// - `DNSREC_COMMENT`: Record comment, at most 160 characters
// - `DNSREC_STATE`: present or absent (default: present)
// - `DNSREC_OVERWRITE`: Rewrite the data of an existing record (default: true)
//
// ### Provider
// - `DNSREC_PROVIDER_TYPE`: Provider type (clouddns)
// - `DNSREC_USERNAME` / `DNSREC_API_KEY`: Account credentials
// - `DNSREC_CREDENTIALS_FILE`: TOML file with a `[clouddns]` section
// - `DNSREC_REGION`: Preferred endpoint region
// - `DNSREC_IDENTITY_URL`: Identity service override
// - `DNSREC_ENDPOINT`: DNS API override, skips the service catalog
// - `DNSREC_HTTP_TIMEOUT_SECS`: HTTP timeout (default: 30)
//
// ### Runtime
// - `DNSREC_MODE`: live or dry-run (default: live)
// - `DNSREC_LOG_LEVEL`: trace, debug, info, warn, error (default: warn)
//
// ## Example
//
// ```bash
// export DNSREC_DOMAIN=example.org
// export DNSREC_NAME=www.example.org
// export DNSREC_DATA=127.0.0.1
// export DNSREC_USERNAME=alice
// export DNSREC_API_KEY=0123456789abcdef
//
// dnsrec
// {"changed":true,"record":{"id":"A-1234","name":"www.example.org",...}}
// ```

mod config;
mod credentials;

use anyhow::Result;
use dnsrec_core::{ProviderRegistry, ReconciliationResult, Reconciler};
use serde::Serialize;
use std::process::ExitCode;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

use config::Config;

/// Exit codes for the possible outcomes
#[derive(Debug, Clone, Copy)]
enum DnsrecExitCode {
    /// Record is in the desired state (changed or not)
    Success = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// The reconciliation itself failed
    ReconcileFailed = 2,
}

impl From<DnsrecExitCode> for ExitCode {
    fn from(code: DnsrecExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Output printed when the run fails
#[derive(Serialize)]
struct Failure {
    failed: bool,
    msg: String,
}

fn fail(msg: impl std::fmt::Display, code: DnsrecExitCode) -> ExitCode {
    let failure = Failure {
        failed: true,
        msg: msg.to_string(),
    };
    match serde_json::to_string(&failure) {
        Ok(json) => println!("{}", json),
        Err(_) => println!("{{\"failed\":true}}"),
    }
    code.into()
}

fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => return fail(format!("Configuration error: {:#}", e), DnsrecExitCode::ConfigError),
    };

    if let Err(e) = config.validate() {
        return fail(
            format!("Configuration validation error: {:#}", e),
            DnsrecExitCode::ConfigError,
        );
    }

    let log_level = match config.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    // stdout carries the JSON result only
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        return fail(
            format!("Failed to set tracing subscriber: {}", e),
            DnsrecExitCode::ConfigError,
        );
    }

    info!(
        "Reconciling {} {} (state={:?})",
        config.record.record_type, config.record.name, config.record.state
    );

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return fail(
                format!("Failed to create tokio runtime: {}", e),
                DnsrecExitCode::ConfigError,
            );
        }
    };

    let outcome = rt.block_on(run(config)).and_then(|result| {
        serde_json::to_string(&result).map_err(anyhow::Error::from)
    });

    match outcome {
        Ok(json) => {
            println!("{}", json);
            DnsrecExitCode::Success.into()
        }
        Err(e) => {
            error!("Reconciliation failed: {:#}", e);
            fail(format!("{:#}", e), DnsrecExitCode::ReconcileFailed)
        }
    }
}

/// Build the provider and run one reconciliation
async fn run(config: Config) -> Result<ReconciliationResult> {
    let registry = ProviderRegistry::new();

    #[cfg(feature = "clouddns")]
    {
        info!("Registering Cloud DNS provider");
        dnsrec_provider_clouddns::register(&registry);
    }

    let provider = registry.create_provider(&config.provider)?;
    let reconciler = Reconciler::new(provider, config.reconciler);
    let result = reconciler.reconcile(&config.record).await?;

    info!("Reconciliation finished: changed={}", result.changed);
    Ok(result)
}

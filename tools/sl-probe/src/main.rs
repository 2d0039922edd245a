//! sl-probe: Secure Link Probe
//!
//! Exercises a device's secure layer from the command line: capability
//! probe, handshake, and sealed requests.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use link_telemetry::{init_telemetry, log_event, log_session_event, TelemetryConfig};
use secure_session::{
    HostFingerprintProvider, HttpRequest, Method, ProtocolVariant, ReqwestTransport,
    SecureSessionApi, SessionConfig, SessionManager,
};

/// sl-probe: Secure Link Probe
#[derive(Parser, Debug)]
#[command(name = "sl-probe")]
#[command(about = "Probe and talk to a device over the secure session layer")]
struct Args {
    /// Device base URL
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Client ID assigned by the device
    #[arg(short, long)]
    client_id: Option<String>,

    /// Handshake variant
    #[arg(long, value_enum)]
    variant: Option<VariantArg>,

    /// TOML configuration file
    #[arg(long)]
    config: Option<std::path::PathBuf>,

    /// Log level filter (defaults to SL_LOG_LEVEL / RUST_LOG, then info)
    #[arg(long)]
    log_level: Option<String>,

    /// JSON log output (defaults to SL_JSON_LOGS)
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum VariantArg {
    Wrapped,
    Unwrapped,
}

impl From<VariantArg> for ProtocolVariant {
    fn from(arg: VariantArg) -> Self {
        match arg {
            VariantArg::Wrapped => ProtocolVariant::Wrapped,
            VariantArg::Unwrapped => ProtocolVariant::Unwrapped,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Query the device's secure-layer capabilities
    Hello,

    /// Run the handshake and print the session snapshot
    Handshake,

    /// Handshake, then send one request through the channel
    Fetch {
        /// Request path
        path: String,

        /// Request body (sent as POST)
        #[arg(short, long)]
        body: Option<String>,

        /// Send even when the path is not on the secure allow-list
        #[arg(long)]
        force: bool,
    },
}

fn load_config(args: &Args) -> Result<SessionConfig> {
    let base = match &args.config {
        Some(path) => SessionConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => SessionConfig::default(),
    };
    let mut config = base.with_env_overrides();
    if let Some(endpoint) = &args.endpoint {
        config.base_url = endpoint.clone();
    }
    if let Some(client_id) = &args.client_id {
        config.client_id = Some(client_id.clone());
    }
    if let Some(variant) = args.variant {
        config.variant = variant.into();
    }
    config.validate()?;
    Ok(config)
}

/// Environment telemetry settings with flags applied only when given.
fn telemetry_config(args: &Args) -> TelemetryConfig {
    let mut config = TelemetryConfig::for_service("sl-probe");
    if let Some(level) = &args.log_level {
        config = config.with_log_level(level.clone());
    }
    if args.json_logs {
        config = config.with_json(true);
    }
    config
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let _telemetry = init_telemetry(telemetry_config(&args))?;

    let config = load_config(&args)?;
    let transport = ReqwestTransport::new(
        config.base_url.clone(),
        Duration::from_millis(config.handshake_timeout_ms),
    )?;
    log_event!(info, "sl-probe", "Probing device", base_url = %config.base_url);

    let manager = SessionManager::new(config, transport, HostFingerprintProvider::new())?;

    match args.command {
        Command::Hello => {
            let hello = manager.hello().await?;
            println!("{}", serde_json::to_string_pretty(&hello)?);
            if !hello.is_ready() {
                bail!("device reports status {:?}", hello.status);
            }
        }
        Command::Handshake => {
            let established = manager.initialize().await;
            let snapshot = manager.snapshot();
            log_session_event!(
                info,
                "sl-probe",
                "Handshake finished",
                established,
                manager.config().variant
            );
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
            if !established {
                bail!("secure session could not be established");
            }
        }
        Command::Fetch { path, body, force } => {
            if !manager.initialize().await {
                log_event!(
                    warn,
                    "sl-probe",
                    "Handshake failed, request will go out unencrypted"
                );
            }
            let method = if body.is_some() { Method::Post } else { Method::Get };
            let mut request = HttpRequest::new(method, path);
            if let Some(body) = body {
                request = request
                    .with_header("Content-Type", "application/json")
                    .with_body(body);
            }
            let response = if force {
                manager.dispatch(request).await?
            } else {
                manager.secure_fetch(request).await?
            };
            println!("HTTP {}", response.status);
            println!("{}", response.body);
        }
    }

    manager.reset().await;
    Ok(())
}

//! Lab issues API server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use lab_issues::api::{create_app, AppState};
use lab_issues::auth::{JwtService, Role};
use lab_issues::config::Config;
use lab_issues::metrics;
use lab_issues::service::InMemoryIssueService;
use lab_issues::utils::shutdown_signal;

/// Issue tracking API for lab computers.
#[derive(Parser, Debug)]
#[command(name = "lab-issues")]
#[command(about = "HTTP API for reporting and resolving lab computer issues")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,

    /// HTTP server port (overrides PORT).
    #[arg(short, long)]
    port: Option<u16>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (default).
    Serve {
        /// HTTP server port (overrides PORT).
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Check configuration validity.
    CheckConfig,

    /// Print a signed bearer token for a user.
    IssueToken {
        /// Numeric user id.
        #[arg(long)]
        user_id: i64,

        /// Display name stored in the token.
        #[arg(long)]
        username: String,

        /// Role: lietotājs, laborants, administrators or pārvaldnieks.
        #[arg(long)]
        role: Role,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Configuration is read before logging so LOG_JSON / VERBOSE can apply
    let config = Config::load();
    let (verbose, json) = match &config {
        Ok(c) => (args.verbose || c.verbose, c.log_json),
        Err(_) => (args.verbose, false),
    };
    init_logging(verbose, json);

    match args.command {
        Some(Command::CheckConfig) => cmd_check_config(config),
        Some(Command::IssueToken {
            user_id,
            username,
            role,
        }) => cmd_issue_token(config?, user_id, &username, role),
        Some(Command::Serve { port }) => cmd_serve(config?, port.or(args.port)).await,
        None => cmd_serve(config?, args.port).await,
    }
}

/// Initialize the tracing subscriber.
fn init_logging(verbose: bool, json: bool) {
    let filter = if verbose {
        EnvFilter::new("lab_issues=debug,tower_http=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

/// Check configuration validity.
fn cmd_check_config(config: Result<Config, envy::Error>) -> anyhow::Result<()> {
    println!("======================================================================");
    println!("LAB ISSUES API - CONFIGURATION CHECK");
    println!("======================================================================");

    print!("Loading configuration... ");
    let config = match config {
        Ok(c) => {
            println!("OK");
            c
        }
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration load failed"));
        }
    };

    print!("Validating configuration... ");
    match config.validate() {
        Ok(()) => println!("OK"),
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration validation failed"));
        }
    }

    println!("----------------------------------------------------------------------");
    println!("Configuration Summary:");
    println!("  Port: {}", config.port);
    println!("  API Prefix: {}", config.api_prefix);
    println!("  CORS Origin: {}", config.cors_origin);
    println!("  Token Issuer: {}", config.jwt_issuer);
    println!("  Token Lifetime: {} min", config.token_ttl_minutes);
    println!("  Log Format: {}", if config.log_json { "json" } else { "text" });
    println!("======================================================================");
    println!("CONFIGURATION CHECK PASSED");
    println!("======================================================================");

    Ok(())
}

/// Print a signed bearer token.
fn cmd_issue_token(config: Config, user_id: i64, username: &str, role: Role) -> anyhow::Result<()> {
    config.validate().map_err(|e| anyhow::anyhow!(e))?;

    let jwt = JwtService::from_config(&config);
    let token = jwt.issue_token(user_id, username, role)?;
    println!("{}", token);
    Ok(())
}

/// Run the HTTP server until shutdown.
async fn cmd_serve(mut config: Config, port_override: Option<u16>) -> anyhow::Result<()> {
    if let Some(port) = port_override {
        config.port = port;
    }

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        return Err(anyhow::anyhow!("Configuration validation failed: {}", e));
    }

    info!("Configuration loaded successfully");
    info!("API prefix: {}", config.api_prefix);
    info!("CORS origin: {}", config.cors_origin);

    let service = Arc::new(InMemoryIssueService::new());
    let mut state = AppState::new(service, JwtService::from_config(&config));

    match metrics::install_recorder() {
        Ok(handle) => state = state.with_metrics(handle),
        Err(e) => warn!("Metrics disabled: {}", e),
    }

    let app = create_app(state, &config)?;

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr).await?;
    info!("HTTP server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

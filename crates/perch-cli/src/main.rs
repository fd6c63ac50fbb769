//! Perch CLI - agent-assisted website authentication
//!
//! Usage:
//!   perch agents auth start --target-domain <domain> --profile-name <name>
//!   perch agents auth start --target-domain <domain> --profile-name <name> --hosted
//!   perch agents auth status <auth-agent-id>

use anyhow::Result;
use clap::{Parser, Subcommand};
use perch_api::{
    ApiClient, AuthApi, HttpAuthApi, HttpBrowsersApi, HttpInvocationsApi, InvocationsApi,
};
use perch_auth::{
    AuthFlow, CleanupGuard, ConsoleSink, HostedConfig, StartInput, StdinPrompter,
};
use perch_core::ApiConfig;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tracing::{warn, Level};
use tracing_subscriber::FmtSubscriber;

/// Bound on the cancellation cleanup so a hung delete cannot block exit
const CLEANUP_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Parser)]
#[command(name = "perch")]
#[command(author, version, about = "CLI for the Perch browser-automation platform")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file path (defaults to environment variables)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage agents
    Agents {
        #[command(subcommand)]
        command: AgentsCommands,
    },
}

#[derive(Subcommand)]
enum AgentsCommands {
    /// Manage agent authentication
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },
}

#[derive(Subcommand)]
enum AuthCommands {
    /// Start an authentication flow for a website
    Start {
        /// Target domain to authenticate with
        #[arg(long)]
        target_domain: String,

        /// Profile name to use or create
        #[arg(long)]
        profile_name: String,

        /// Optional login URL hint to skip page discovery
        #[arg(long)]
        login_url: Option<String>,

        /// Optional proxy ID to route the remote browser through
        #[arg(long)]
        proxy_id: Option<String>,

        /// Complete the login in the hosted UI instead of the terminal
        #[arg(long)]
        hosted: bool,

        /// Don't try to open the hosted URL in a local browser
        #[arg(long)]
        no_open: bool,
    },

    /// Show an auth agent record
    Status {
        /// Auth agent ID
        auth_agent_id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = ApiConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Agents {
            command: AgentsCommands::Auth { command },
        } => match command {
            AuthCommands::Start {
                target_domain,
                profile_name,
                login_url,
                proxy_id,
                hosted,
                no_open,
            } => {
                run_auth_start(
                    config,
                    StartInput {
                        target_domain,
                        profile_name,
                        login_url,
                        proxy_id,
                        hosted,
                    },
                    no_open,
                )
                .await
            }
            AuthCommands::Status { auth_agent_id } => run_auth_status(config, auth_agent_id).await,
        },
    }
}

async fn run_auth_start(config: ApiConfig, input: StartInput, no_open: bool) -> Result<()> {
    let client = ApiClient::new(&config);
    let auth = Arc::new(HttpAuthApi::new(client.clone()));
    let invocations = Arc::new(HttpInvocationsApi::new(client.clone()));
    let browsers = Arc::new(HttpBrowsersApi::new(client));

    // The cleanup task reads the invocation id through this slot; it is
    // written once when the session exists and read-only afterwards.
    let invocation: Arc<OnceLock<String>> = Arc::new(OnceLock::new());

    let guard = CleanupGuard::new(CLEANUP_TIMEOUT, {
        let invocations = invocations.clone();
        let invocation = invocation.clone();
        move || async move {
            let Some(id) = invocation.get() else {
                return;
            };
            eprintln!("Interrupted, cleaning up browsers for invocation {}...", id);
            if let Err(e) = invocations.delete_browsers(id).await {
                warn!("failed to delete invocation browsers: {}", e);
            }
        }
    });

    // Signal watcher: first interrupt triggers the one-shot cleanup,
    // then the process exits once the cleanup settles.
    {
        let guard = guard.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                guard.trigger();
                guard.settle().await;
                std::process::exit(130);
            }
        });
    }

    let hosted_config = HostedConfig {
        auto_open: !no_open,
        ..HostedConfig::default()
    };

    let flow = AuthFlow::new(
        auth,
        invocations,
        Arc::new(StdinPrompter),
        Arc::new(ConsoleSink),
    )
    .with_browsers(browsers)
    .with_hosted_config(hosted_config)
    .with_invocation_watch(invocation);

    let outcome = flow.start(input).await;

    // wait for a triggered cleanup before returning; a no-op otherwise
    guard.settle().await;

    if !outcome?.is_success() {
        std::process::exit(1);
    }
    Ok(())
}

async fn run_auth_status(config: ApiConfig, auth_agent_id: String) -> Result<()> {
    let client = ApiClient::new(&config);
    let auth = HttpAuthApi::new(client);

    let record = auth.retrieve(&auth_agent_id).await?;

    println!("ID:           {}", record.id);
    println!("Profile name: {}", record.profile_name);
    println!("Domain:       {}", record.domain);
    println!("Status:       {}", record.status);
    Ok(())
}

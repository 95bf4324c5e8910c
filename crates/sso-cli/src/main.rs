//! Teams SSO command line harness.
//!
//! Runs the host probe, decodes token claims, and drives a login against
//! scripted collaborators so the state machine can be exercised without a
//! host or an identity provider.

mod scripted;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use host_context_probe::{
    HostContext, HostContextProbe, HostContextPublisher, HostSignals, HostViewStore,
};
use scripted::{ScriptedHost, ScriptedOutcome, ScriptedProvider};
use sso_config::{init_logging, AuthConfig, DEFAULT_LOG_LEVEL};
use sso_orchestrator::{decode_token_claims, AuthSnapshot, LogoutOutcome, SsoOrchestrator};
use tracing::{info, warn};

/// Teams SSO command-line interface.
#[derive(Parser)]
#[command(name = "teams-sso")]
#[command(about = "Single sign-on orchestrator for apps embedded in the collaboration host")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = DEFAULT_LOG_LEVEL, global = true)]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the host embedding heuristic on the given signals
    Probe(ProbeArgs),
    /// Print the claims of a token without verifying its signature
    Decode {
        /// Compact token (header.payload.signature)
        token: String,
    },
    /// Run one login against scripted collaborators
    Simulate(SimulateArgs),
}

#[derive(Args, Debug)]
struct ProbeArgs {
    /// The host SDK failed to load
    #[arg(long)]
    sdk_missing: bool,

    /// The page runs inside a frame
    #[arg(long)]
    framed: bool,

    /// The host's native bridge marker is present
    #[arg(long)]
    native_bridge: bool,

    /// Browser user agent
    #[arg(long, default_value = "")]
    user_agent: String,

    /// Window name assigned by the host
    #[arg(long, default_value = "")]
    window_name: String,

    /// Page query string, used to read the initial theme
    #[arg(long, default_value = "")]
    query: String,
}

impl ProbeArgs {
    fn signals(&self) -> HostSignals {
        HostSignals {
            sdk_loaded: !self.sdk_missing,
            top_is_self: !self.framed,
            native_bridge_present: self.native_bridge,
            user_agent: self.user_agent.clone(),
            window_name: self.window_name.clone(),
        }
    }
}

#[derive(Args, Debug)]
struct SimulateArgs {
    /// JSON config file; TEAMS_SSO_* environment variables override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Run as if embedded in the host
    #[arg(long)]
    embedded: bool,

    /// Registered application id
    #[arg(long)]
    application_id: Option<String>,

    /// Resource the host token is scoped to
    #[arg(long)]
    resource_uri: Option<String>,

    /// Delegated permission scope (repeatable)
    #[arg(long = "scope")]
    scopes: Vec<String>,

    /// Redirect target for interactive sign-in
    #[arg(long)]
    redirect_uri: Option<String>,

    /// Token the host issues
    #[arg(long)]
    host_token: Option<String>,

    /// Make the host token request fail with this reason
    #[arg(long)]
    host_failure: Option<String>,

    /// Outcome of silent acquisition
    #[arg(long, value_enum, default_value = "ok")]
    silent: ScriptedOutcome,

    /// Outcome of interactive sign-in or redirect
    #[arg(long, value_enum, default_value = "ok")]
    interactive: ScriptedOutcome,

    /// Access token returned by the identity provider
    #[arg(long, default_value = "provider-token")]
    provider_token: String,

    /// Account returned by the identity provider (repeatable)
    #[arg(long = "account")]
    accounts: Vec<String>,

    /// Log out after the login finishes
    #[arg(long)]
    logout: bool,
}

impl SimulateArgs {
    fn apply(&self, config: &mut AuthConfig) {
        if let Some(id) = &self.application_id {
            config.application_id = Some(id.clone());
        }
        if let Some(resource) = &self.resource_uri {
            config.resource_uri = resource.clone();
        }
        if !self.scopes.is_empty() {
            config.scopes = Some(self.scopes.clone());
        }
        if let Some(redirect) = &self.redirect_uri {
            config.redirect_uri = Some(redirect.clone());
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    init_logging(&cli.log_level);

    match cli.command {
        Commands::Probe(args) => probe(&args)?,
        Commands::Decode { token } => {
            let claims = decode_token_claims(&token)?;
            println!("{}", serde_json::to_string_pretty(&claims)?);
        }
        Commands::Simulate(args) => simulate(args).await?,
    }

    Ok(())
}

fn probe(args: &ProbeArgs) -> Result<(), serde_json::Error> {
    let context = HostContextProbe::new(args.signals()).probe();
    let view = HostViewStore::new(None, &args.query).current();

    let report = serde_json::json!({
        "context": context,
        "embedded": context.as_bool(),
        "theme": view.theme,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

async fn simulate(args: SimulateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AuthConfig::load(args.config.as_deref())?;
    args.apply(&mut config);
    if let Some(redirect) = config.redirect_url()? {
        info!(redirect = %redirect, "Interactive sign-in redirects here");
    }

    let publisher = HostContextPublisher::new();
    let host = Arc::new(ScriptedHost::new(
        args.host_token.clone(),
        args.host_failure.clone(),
    ));
    let provider = Arc::new(ScriptedProvider {
        silent: args.silent,
        interactive: args.interactive,
        access_token: args.provider_token.clone(),
        accounts: args.accounts.clone(),
    });

    let orchestrator = Arc::new(SsoOrchestrator::new(
        config,
        host,
        provider,
        publisher.subscribe(),
    ));
    orchestrator.subscribe(Arc::new(print_snapshot));

    let login = match orchestrator.start() {
        Some(login) => login,
        None => orchestrator.spawn_login(),
    };
    publisher.publish(HostContext::from(args.embedded));

    let status = login.await?;
    info!(status = ?status, "Login finished");

    if args.logout && orchestrator.logout().await == LogoutOutcome::NothingToSignOut {
        warn!("Nothing to sign out");
    }

    Ok(())
}

/// Print one published snapshot as a JSON line.
fn print_snapshot(snapshot: &AuthSnapshot) {
    match serde_json::to_string(&snapshot.to_payload()) {
        Ok(line) => println!("{}", line),
        Err(e) => warn!(error = %e, "Failed to serialize auth state"),
    }
}

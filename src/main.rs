//! IssueDesk - issue tracker client
//!
//! Main entry point for the IssueDesk command-line client.

use std::sync::Arc;

use anyhow::Result;
use colored::Colorize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use issuedesk::auth::AuthService;
use issuedesk::cli::{Cli, Commands, IssueCommand};
use issuedesk::commands;
use issuedesk::config::Config;
use issuedesk::http::ApiClient;
use issuedesk::issues::IssueService;
use issuedesk::session;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    init_tracing(cli.verbose);

    // Load and validate configuration
    let config = Config::load(&cli.config, &cli)?;
    config.validate()?;

    let store = session::open_store(&config.session)?;
    let client = Arc::new(ApiClient::new(&config.api, store)?);
    let auth = AuthService::new(Arc::clone(&client));
    let issues = IssueService::new(client);

    if let Err(e) = dispatch(cli.command, &auth, &issues).await {
        tracing::debug!("Command failed: {}", e);
        eprintln!("{} {}", "Error:".red().bold(), e.user_message());
        std::process::exit(1);
    }
    Ok(())
}

async fn dispatch(
    command: Commands,
    auth: &AuthService,
    issues: &IssueService,
) -> issuedesk::Result<()> {
    match command {
        Commands::Login {
            email,
            username,
            password,
        } => commands::account::login(auth, &username, &email, password).await,
        Commands::Signup {
            username,
            email,
            password,
        } => commands::account::signup(auth, &username, &email, password).await,
        Commands::Logout => commands::account::logout(auth).await,
        Commands::ResetPassword {
            identifier,
            new_password,
        } => commands::account::reset_password(auth, &identifier, new_password).await,
        Commands::Whoami => commands::account::whoami(auth).await,
        Commands::Issues { command } => match command {
            IssueCommand::List { json } => commands::issues::list(issues, json).await,
            IssueCommand::Show { id, json } => commands::issues::show(issues, &id, json).await,
            IssueCommand::Create {
                title,
                description,
                status,
                priority,
            } => commands::issues::create(issues, &title, &description, &status, &priority).await,
            IssueCommand::Update {
                id,
                title,
                description,
                status,
                priority,
            } => {
                commands::issues::update(issues, &id, &title, &description, &status, &priority)
                    .await
            }
            IssueCommand::Delete { id } => commands::issues::delete(issues, &id).await,
        },
        Commands::Dashboard { json } => commands::dashboard::show(issues, json).await,
    }
}

/// Initialize tracing subscriber with environment filter
fn init_tracing(verbose: bool) {
    let default_level = if verbose {
        "issuedesk=debug"
    } else {
        "issuedesk=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

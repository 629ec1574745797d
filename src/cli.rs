//! Command-line interface definition for IssueDesk
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for account management, issue CRUD and the
//! dashboard summary.

use clap::{Parser, Subcommand};

use crate::config::SessionBackend;

/// IssueDesk - issue tracker client
///
/// Sign in to an issue tracking service and manage issues from the
/// terminal.
#[derive(Parser, Debug, Clone)]
#[command(name = "issuedesk")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: String,

    /// Override the API base URL from config
    #[arg(long, global = true)]
    pub server: Option<String>,

    /// Override the session backend (keyring, file, memory)
    #[arg(long, global = true)]
    pub store: Option<SessionBackend>,

    /// Session profile name
    #[arg(long, global = true)]
    pub profile: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for IssueDesk
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Sign in and store the session
    Login {
        /// Account email
        #[arg(short, long, default_value = "")]
        email: String,

        /// Account username
        #[arg(short, long, default_value = "")]
        username: String,

        /// Password (falls back to ISSUEDESK_PASSWORD)
        #[arg(short, long, env = "ISSUEDESK_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Register a new account
    Signup {
        /// Account username
        #[arg(short, long)]
        username: String,

        /// Account email
        #[arg(short, long)]
        email: String,

        /// Password (falls back to ISSUEDESK_PASSWORD)
        #[arg(short, long, env = "ISSUEDESK_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Sign out and forget the stored session
    Logout,

    /// Set a new password for an account
    ResetPassword {
        /// Username or email of the account
        #[arg(short, long)]
        identifier: String,

        /// New password (falls back to ISSUEDESK_PASSWORD)
        #[arg(short, long, env = "ISSUEDESK_PASSWORD", hide_env_values = true)]
        new_password: Option<String>,
    },

    /// Show the signed-in account
    Whoami,

    /// Manage issues
    Issues {
        /// Issue subcommand
        #[command(subcommand)]
        command: IssueCommand,
    },

    /// Show the dashboard summary
    Dashboard {
        /// Output in JSON format
        #[arg(short, long)]
        json: bool,
    },
}

/// Issue subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum IssueCommand {
    /// List all issues
    List {
        /// Output in JSON format
        #[arg(short, long)]
        json: bool,
    },

    /// Show a single issue
    Show {
        /// Issue id
        id: String,

        /// Output in JSON format
        #[arg(short, long)]
        json: bool,
    },

    /// Create an issue
    Create {
        /// Issue title
        #[arg(short, long)]
        title: String,

        /// Issue description
        #[arg(short, long)]
        description: String,

        /// Status label (Backlog, Todo, In Progress, Done)
        #[arg(short, long, default_value = "Todo")]
        status: String,

        /// Priority label (Low, Medium, High)
        #[arg(short, long, default_value = "Low")]
        priority: String,
    },

    /// Replace an issue's fields
    Update {
        /// Issue id
        id: String,

        /// Issue title
        #[arg(short, long)]
        title: String,

        /// Issue description
        #[arg(short, long)]
        description: String,

        /// Status label (Backlog, Todo, In Progress, Done)
        #[arg(short, long)]
        status: String,

        /// Priority label (Low, Medium, High)
        #[arg(short, long)]
        priority: String,
    },

    /// Delete an issue
    Delete {
        /// Issue id
        id: String,
    },
}

impl Cli {
    /// Parse command line arguments
    ///
    /// # Returns
    ///
    /// Returns the parsed CLI structure
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: "config/config.yaml".to_string(),
            server: None,
            store: None,
            profile: None,
            verbose: false,
            command: Commands::Whoami,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_cli_default() {
        let cli = Cli::default();
        assert_eq!(cli.config, "config/config.yaml");
        assert!(!cli.verbose);
        assert!(cli.server.is_none());
        assert!(cli.store.is_none());
        assert!(matches!(cli.command, Commands::Whoami));
    }

    #[test]
    #[serial]
    fn test_cli_parse_login() {
        std::env::remove_var("ISSUEDESK_PASSWORD");
        let cli = Cli::try_parse_from([
            "issuedesk",
            "login",
            "--email",
            "e@x.com",
            "--password",
            "p",
        ])
        .unwrap();
        if let Commands::Login {
            email,
            username,
            password,
        } = cli.command
        {
            assert_eq!(email, "e@x.com");
            assert_eq!(username, "");
            assert_eq!(password.as_deref(), Some("p"));
        } else {
            panic!("Expected Login command");
        }
    }

    #[test]
    #[serial]
    fn test_cli_login_password_from_env() {
        std::env::set_var("ISSUEDESK_PASSWORD", "from-env");
        let cli = Cli::try_parse_from(["issuedesk", "login", "--username", "x"]).unwrap();
        std::env::remove_var("ISSUEDESK_PASSWORD");
        if let Commands::Login { password, .. } = cli.command {
            assert_eq!(password.as_deref(), Some("from-env"));
        } else {
            panic!("Expected Login command");
        }
    }

    #[test]
    fn test_cli_parse_global_overrides() {
        let cli = Cli::try_parse_from([
            "issuedesk",
            "issues",
            "list",
            "--server",
            "http://example.com:9000",
            "--store",
            "memory",
            "--profile",
            "work",
            "--json",
        ])
        .unwrap();
        assert_eq!(cli.server.as_deref(), Some("http://example.com:9000"));
        assert_eq!(cli.store, Some(SessionBackend::Memory));
        assert_eq!(cli.profile.as_deref(), Some("work"));
        assert!(matches!(
            cli.command,
            Commands::Issues {
                command: IssueCommand::List { json: true }
            }
        ));
    }

    #[test]
    fn test_cli_rejects_unknown_store() {
        let result = Cli::try_parse_from(["issuedesk", "--store", "cloud", "whoami"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_parse_create_defaults() {
        let cli = Cli::try_parse_from([
            "issuedesk",
            "issues",
            "create",
            "--title",
            "t",
            "--description",
            "d",
        ])
        .unwrap();
        if let Commands::Issues {
            command:
                IssueCommand::Create {
                    title,
                    description,
                    status,
                    priority,
                },
        } = cli.command
        {
            assert_eq!(title, "t");
            assert_eq!(description, "d");
            assert_eq!(status, "Todo");
            assert_eq!(priority, "Low");
        } else {
            panic!("Expected Issues Create command");
        }
    }

    #[test]
    fn test_cli_parse_update_requires_all_fields() {
        let result = Cli::try_parse_from(["issuedesk", "issues", "update", "3", "--title", "t"]);
        assert!(result.is_err());

        let cli = Cli::try_parse_from([
            "issuedesk",
            "issues",
            "update",
            "3",
            "--title",
            "t",
            "--description",
            "d",
            "--status",
            "In Progress",
            "--priority",
            "High",
        ])
        .unwrap();
        if let Commands::Issues {
            command: IssueCommand::Update { id, status, .. },
        } = cli.command
        {
            assert_eq!(id, "3");
            assert_eq!(status, "In Progress");
        } else {
            panic!("Expected Issues Update command");
        }
    }

    #[test]
    fn test_cli_parse_delete_and_dashboard() {
        let cli = Cli::try_parse_from(["issuedesk", "issues", "delete", "9"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Issues {
                command: IssueCommand::Delete { .. }
            }
        ));

        let cli = Cli::try_parse_from(["issuedesk", "dashboard", "-j"]).unwrap();
        assert!(matches!(cli.command, Commands::Dashboard { json: true }));
    }

    #[test]
    fn test_cli_verbose_flag() {
        let cli = Cli::try_parse_from(["issuedesk", "-v", "logout"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Logout));
    }
}

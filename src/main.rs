#![forbid(unsafe_code)]

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use userreg::{AddOutcome, Config, UserStore};

/// Register users in a local SQLite file and check their credentials.
#[derive(Parser, Debug)]
#[command(name = "userreg", version, about)]
struct Cli {
    /// Path to a TOML config file
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Database file (overrides `database.path` from the config)
    #[arg(long, global = true, value_name = "FILE")]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the users table if it does not exist
    Init,
    /// Register a new user
    Add {
        username: String,
        email: String,
        password: String,
    },
    /// Check a username and password
    Login { username: String, password: String },
    /// Print all registered users
    List,
}

fn main() -> Result<ExitCode> {
    // Logs go to stderr so `list` output on stdout stays clean.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = Config::load_or_default(cli.config.as_deref())?;
    if let Some(db) = cli.db {
        config.database.path = db;
    }

    let db_path = &config.database.path;
    let store = UserStore::open(db_path)
        .with_context(|| format!("Failed to open user database: {}", db_path.display()))?;
    store
        .initialize()
        .context("Failed to initialize user schema")?;

    match cli.command {
        Command::Init => {
            tracing::info!(path = %db_path.display(), "User database initialized");
            println!("Initialized {}", db_path.display());
            Ok(ExitCode::SUCCESS)
        }
        Command::Add {
            username,
            email,
            password,
        } => match store.add_user(&username, &email, &password)? {
            AddOutcome::Created(user) => {
                println!("Created user '{}' (id {})", user.username, user.id);
                Ok(ExitCode::SUCCESS)
            }
            AddOutcome::RejectedDuplicate => {
                println!("Username '{username}' is already taken");
                Ok(ExitCode::FAILURE)
            }
        },
        Command::Login { username, password } => {
            if store.authenticate(&username, &password)? {
                println!("Authenticated");
                Ok(ExitCode::SUCCESS)
            } else {
                println!("Invalid username or password");
                Ok(ExitCode::FAILURE)
            }
        }
        Command::List => {
            store.display_users()?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_add_with_global_db_flag() {
        let cli = Cli::try_parse_from([
            "userreg", "add", "u1", "u1@x.com", "p1", "--db", "/tmp/u.db",
        ])
        .unwrap();
        assert_eq!(cli.db, Some(PathBuf::from("/tmp/u.db")));
        match cli.command {
            Command::Add {
                username,
                email,
                password,
            } => {
                assert_eq!(username, "u1");
                assert_eq!(email, "u1@x.com");
                assert_eq!(password, "p1");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn add_requires_all_three_fields() {
        assert!(Cli::try_parse_from(["userreg", "add", "u1", "u1@x.com"]).is_err());
    }
}

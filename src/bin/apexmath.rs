use clap::{Parser, Subcommand};
use log::{error, info, warn};
use std::process::ExitCode;
use std::sync::Arc;

use apexmath_session::config::ClientConfig;
use apexmath_session::router::Navigation;
use apexmath_session::storage::FileKeyValueStore;
use apexmath_session::{SessionContext, SessionError};

/// ApexMath session client
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log in as an administrator or teacher
    Login {
        username: String,
        #[arg(long, env = "APEXMATH_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Log out the staff identity
    Logout,
    /// Open a student session with a verification code
    Verify { code: String, student_name: String },
    /// Record a new status for the student session
    SetStatus { status: String },
    /// Drop the student session
    ClearStudent,
    /// Show both identities
    Status,
    /// Run the route guard for a route name or path
    Navigate { target: String },
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize env
    match dotenvy::dotenv() {
        Ok(path) => info!("Environment variables loaded from {}", path.display()),
        Err(e) => warn!("No .env file loaded: {}", e),
    };

    // Initialize logging
    env_logger::init();

    let args = Args::parse();

    match run(args.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command) -> Result<(), SessionError> {
    let config = ClientConfig::from_env()?;
    info!("API base: {}", config.base_url());

    let storage = Arc::new(FileKeyValueStore::open(&config.storage_path)?);
    let context = SessionContext::new(config, storage)?;

    match command {
        Command::Login { username, password } => {
            let identity = context.credentials().login(&username, &password).await?;
            println!("Logged in as {} ({})", identity.display_name, identity.role);
        }
        Command::Logout => {
            context.credentials().logout()?;
            println!("Logged out");
        }
        Command::Verify { code, student_name } => {
            let identity = context.student().verify_code(&code, &student_name).await?;
            println!(
                "Session {} for exam {} ({})",
                identity.session_id, identity.exam_id, identity.status
            );
        }
        Command::SetStatus { status } => {
            if !context.student().has_session() {
                println!("No student session");
            }
            context.student().update_status(&status)?;
        }
        Command::ClearStudent => {
            context.student().clear_session()?;
            println!("Student session cleared");
        }
        Command::Status => {
            let credentials = context.credentials();
            match credentials.identity() {
                Some(identity) => println!("Staff: {} ({})", identity.display_name, identity.role),
                None => println!("Staff: not logged in"),
            }
            let student = context.student();
            if student.has_session() {
                println!(
                    "Student: session {} for exam {} ({})",
                    student.session_id(),
                    student.exam_id(),
                    student.session_status()
                );
            } else {
                println!("Student: no session");
            }
        }
        Command::Navigate { target } => {
            let navigator = context.navigator();
            let outcome = if target.starts_with('/') {
                navigator.navigate_path(&target)?
            } else {
                navigator.navigate(&target)?
            };
            match outcome {
                Navigation::Completed {
                    route,
                    redirected_from: Some(from),
                } => println!("{} -> redirected to {}", from, route),
                Navigation::Completed { route, .. } => println!("{} -> allowed", route),
                Navigation::Superseded => println!("{} -> superseded", target),
                Navigation::NotFound(name) => println!("{} -> no such route", name),
            }
        }
    }

    Ok(())
}

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::error;

use shiksha::config::{load_config, schema_json};
use shiksha::routes::{check, Route};
use shiksha::session::now_millis;
use shiksha::startup;
use shiksha::state::AppState;
use shiksha::utils::logger::init_logging;
use shiksha::views::{home, DashboardView, Screen, SignInForm, SignUpForm};

#[derive(Parser, Debug)]
#[command(name = "shiksha", about = "Sign in, sign up and manage your profile")]
struct Args {
    /// Path to the YAML configuration file. A missing file is allowed.
    #[arg(long, global = true, env = "SHIKSHA_CONFIG", default_value = "config.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the landing page
    Home,
    /// Sign in with email and password
    Signin {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Create an account
    Signup {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        confirm_password: String,
    },
    /// Show the signed-in user's profile
    Dashboard,
    /// Change first and/or last name
    UpdateProfile {
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Report whether the dashboard would render
    Guard,
    /// Print the configuration JSON schema
    Schema,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    if let Command::Schema = args.command {
        println!("{}", schema_json());
        return ExitCode::SUCCESS;
    }

    let config = match load_config(&args.config) {
        Ok(config) => Arc::new(config),
        Err(e) => {
            eprintln!("Invalid configuration in {}: {}", args.config.display(), e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = init_logging(&config.logging) {
        eprintln!("{}", e);
        return ExitCode::FAILURE;
    }

    let state = match startup::build(config) {
        Ok(state) => state,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let screen = match run(&state, args.command).await {
        Ok(screen) => screen,
        Err(message) => {
            eprintln!("{}", message);
            return ExitCode::FAILURE;
        }
    };

    println!("{}", screen.render());
    if screen.error.is_some() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

async fn run(state: &AppState, command: Command) -> Result<Screen, String> {
    let auth = state.auth.as_ref();
    let screen = match command {
        Command::Home => home(),
        Command::Signin { email, password } => SignInForm::new(email, password)
            .submit(auth)
            .await
            .map_err(|e| e.to_string())?,
        Command::Signup {
            email,
            password,
            confirm_password,
        } => SignUpForm::new(email, password, confirm_password)
            .submit(auth)
            .await
            .map_err(|e| e.to_string())?,
        Command::Dashboard => {
            DashboardView::new(state.tokens.clone()).mount(auth).await
        }
        Command::UpdateProfile {
            first_name,
            last_name,
        } => {
            let mut view = DashboardView::new(state.tokens.clone());
            let screen = view.mount(auth).await;
            if screen.route() != Route::Dashboard {
                return Ok(screen);
            }
            view.edit();
            if let Some(first_name) = first_name {
                view.set_first_name(first_name);
            }
            if let Some(last_name) = last_name {
                view.set_last_name(last_name);
            }
            view.save(auth).await
        }
        Command::Logout => DashboardView::new(state.tokens.clone()).logout(auth),
        Command::Guard => match check(state.tokens.as_ref(), now_millis()) {
            Ok(()) => Screen::at(Route::Dashboard).line("Session is valid"),
            Err(_) => Screen::at(Route::SignIn),
        },
        Command::Schema => unreachable!("schema is printed before configuration is loaded"),
    };
    Ok(screen)
}

//! Account commands against the care backend.

use clap::Subcommand;
use eldercare_core::auth::{Registration, Role, UserPatch};

use super::{open_app, print_json, CliResult};

#[derive(Subcommand)]
pub enum AuthAction {
    /// Sign in
    Login {
        email: String,
        /// Password (or set ELDERCARE_PASSWORD)
        #[arg(long, env = "ELDERCARE_PASSWORD", hide_env_values = true)]
        password: String,
        /// Keep the token after the session ends
        #[arg(long)]
        remember: bool,
    },
    /// Create an account and sign in
    Register {
        name: String,
        email: String,
        #[arg(long, env = "ELDERCARE_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        phone: Option<String>,
        /// caregiver or elderly
        #[arg(long, default_value = "caregiver")]
        role: Role,
    },
    /// Sign out and clear medications and events
    Logout,
    /// Refresh the signed-in user from the backend
    Me,
    /// Request a password reset e-mail
    ResetPassword {
        email: String,
    },
    /// Update the signed-in user's account
    Update {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
    },
    /// Show who is signed in
    Status,
}

pub async fn run(action: AuthAction) -> CliResult {
    let mut app = open_app()?;

    match action {
        AuthAction::Login {
            email,
            password,
            remember,
        } => {
            let user = app.login(&email, &password, remember).await?;
            print_json(&user)?;
        }
        AuthAction::Register {
            name,
            email,
            password,
            phone,
            role,
        } => {
            let user = app
                .register(Registration {
                    name,
                    email,
                    password,
                    phone,
                    role,
                })
                .await?;
            print_json(&user)?;
        }
        AuthAction::Logout => {
            app.logout()?;
            println!("signed out");
        }
        AuthAction::Me => {
            let user = app.auth.me(&app.api).await?;
            print_json(&user)?;
        }
        AuthAction::ResetPassword { email } => {
            app.auth.reset_password(&app.api, &email).await?;
            println!("ok");
        }
        AuthAction::Update { name, email, phone } => {
            let patch = UserPatch { name, email, phone };
            if patch.is_empty() {
                return Err("nothing to update".into());
            }
            let user = app.auth.update_profile(&app.api, patch).await?;
            print_json(&user)?;
        }
        AuthAction::Status => {
            print_json(&serde_json::json!({
                "authenticated": app.auth.is_authenticated(),
                "user": app.auth.current_user(),
                "remember": app.auth.remembers(),
                "hasToken": app.auth.token().is_some(),
            }))?;
        }
    }
    Ok(())
}

//! Account commands: login, signup, logout, password reset and whoami

use colored::Colorize;

use crate::auth::{AuthService, AuthState};
use crate::commands::require_secret;
use crate::error::Result;

/// Sign in and store the session.
///
/// # Arguments
///
/// * `auth` - Auth service sharing the configured session store
/// * `username` - Account username (may be empty when `email` is given)
/// * `email` - Account email (may be empty when `username` is given)
/// * `password` - Password from the flag or `ISSUEDESK_PASSWORD`
pub async fn login(
    auth: &AuthService,
    username: &str,
    email: &str,
    password: Option<String>,
) -> Result<()> {
    let password = require_secret(password, "password")?;
    let profile = auth.login(username, email, &password).await?;
    println!(
        "{} Signed in as {} <{}>",
        "✓".green(),
        profile.username.bold(),
        profile.email
    );
    Ok(())
}

/// Register a new account. The user still has to log in afterwards.
pub async fn signup(
    auth: &AuthService,
    username: &str,
    email: &str,
    password: Option<String>,
) -> Result<()> {
    let password = require_secret(password, "password")?;
    auth.signup(username, email, &password).await?;
    println!(
        "{} Account {} created. Run `issuedesk login` to sign in.",
        "✓".green(),
        username.trim().bold()
    );
    Ok(())
}

/// Sign out. The local session is always removed.
pub async fn logout(auth: &AuthService) -> Result<()> {
    let outcome = auth.logout().await?;
    if outcome.remote_confirmed {
        println!("{} Signed out", "✓".green());
    } else {
        println!(
            "{} Signed out locally; the server could not be reached",
            "!".yellow()
        );
    }
    Ok(())
}

/// Set a new password for the account named by `identifier`.
pub async fn reset_password(
    auth: &AuthService,
    identifier: &str,
    new_password: Option<String>,
) -> Result<()> {
    let new_password = require_secret(new_password, "new password")?;
    auth.reset_password(identifier, &new_password).await?;
    println!(
        "{} Password updated. Sign in again with the new password.",
        "✓".green()
    );
    Ok(())
}

/// Print the signed-in account, if any.
pub async fn whoami(auth: &AuthService) -> Result<()> {
    match auth.state().await? {
        AuthState::Authenticated(session) => {
            println!("{} <{}>", session.username.bold(), session.email);
        }
        AuthState::Anonymous => println!("Not signed in"),
    }
    Ok(())
}

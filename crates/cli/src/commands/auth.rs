//! Account commands.

use mangaverse_core::Email;
use tracing::{info, warn};

use super::{CommandError, Context};

/// # Errors
///
/// Returns an error if the credentials are refused.
pub async fn login(ctx: &Context, email: &Email, password: &str) -> Result<(), CommandError> {
    let mut auth = ctx.auth();
    ctx.account()?
        .login(&mut auth, email.as_str(), password)
        .await?;
    Ok(())
}

/// Register and wait for the welcome email request to finish, so it is not
/// cut short when the process exits.
///
/// # Errors
///
/// Returns an error if the passwords differ or the account is refused.
pub async fn register(
    ctx: &Context,
    name: &str,
    email: &Email,
    password: &str,
    confirm: &str,
) -> Result<(), CommandError> {
    let mut auth = ctx.auth();
    let welcome = ctx
        .account()?
        .register(&mut auth, name, email.as_str(), password, confirm)
        .await?;

    if let Err(e) = welcome.await {
        warn!(error = %e, "welcome email task did not complete");
    }
    Ok(())
}

pub fn logout(ctx: &Context) {
    let mut auth = ctx.auth();
    if !auth.is_authenticated() {
        info!("You are not logged in.");
        return;
    }
    auth.logout();
}

/// # Errors
///
/// Returns an error if the request fails.
pub async fn forgot_password(ctx: &Context, email: &Email) -> Result<(), CommandError> {
    ctx.account()?.forgot_password(email.as_str()).await?;
    Ok(())
}

/// # Errors
///
/// Returns an error if the token is missing, the passwords differ or are too
/// weak, or the server refuses the reset.
pub async fn reset_password(
    ctx: &Context,
    token: Option<&str>,
    password: &str,
    confirm: &str,
) -> Result<(), CommandError> {
    ctx.account()?
        .reset_password(token, password, confirm)
        .await?;
    Ok(())
}

pub fn whoami(ctx: &Context) {
    match ctx.auth().user() {
        Some(user) => info!("{} <{}> ({:?})", user.name, user.email, user.role),
        None => info!("You are not logged in."),
    }
}


use seedshelf_api_models::{AuthResponse, LoginRequest, RegisterRequest};

use crate::cli::{LoginArgs, RegisterArgs};
use crate::client::{CliError, CliResult};
use crate::commands::Console;
use crate::output::render_session;
use crate::workspace::Workspace;

pub(crate) async fn handle_login(
    workspace: &mut Workspace,
    args: LoginArgs,
    console: &mut Console<'_>,
) -> CliResult<()> {
    let username = required(console.value_or_ask(args.username, "username")?, "username")?;
    let password = required_secret(console.secret_or_ask(args.password, "password")?)?;

    let response = workspace
        .api
        .login(&LoginRequest { username, password })
        .await?;
    remember(workspace, response, console)
}

pub(crate) async fn handle_register(
    workspace: &mut Workspace,
    args: RegisterArgs,
    console: &mut Console<'_>,
) -> CliResult<()> {
    let username = required(console.value_or_ask(args.username, "username")?, "username")?;
    let email = required(console.value_or_ask(args.email, "email")?, "email")?;
    let password = required_secret(console.secret_or_ask(args.password, "password")?)?;

    let response = workspace
        .api
        .register(&RegisterRequest {
            username,
            email,
            password,
        })
        .await?;
    remember(workspace, response, console)
}

pub(crate) fn handle_logout(workspace: &mut Workspace, console: &mut Console<'_>) -> CliResult<()> {
    let was_signed_in = workspace.auth.is_authenticated();
    workspace.auth.clear()?;
    if was_signed_in {
        tracing::info!("session cleared");
        writeln!(console.out, "logged out")?;
    } else {
        writeln!(console.out, "not logged in")?;
    }
    Ok(())
}

pub(crate) fn handle_whoami(workspace: &Workspace, console: &mut Console<'_>) -> CliResult<()> {
    render_session(
        workspace.auth.session(),
        workspace.auth.controls(),
        console.format,
        console.out,
    )
}

fn remember(
    workspace: &mut Workspace,
    response: AuthResponse,
    console: &mut Console<'_>,
) -> CliResult<()> {
    let AuthResponse { token, user } = response;
    tracing::info!(username = %user.username, role = user.role.as_str(), "signed in");
    workspace.auth.save(token, user)?;
    render_session(
        workspace.auth.session(),
        workspace.auth.controls(),
        console.format,
        console.out,
    )
}

fn required(value: String, field: &str) -> CliResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CliError::validation(format!("{field} must not be empty")));
    }
    Ok(trimmed.to_string())
}

/// Passwords are sent verbatim; only emptiness is rejected.
fn required_secret(value: String) -> CliResult<String> {
    if value.is_empty() {
        return Err(CliError::validation("password must not be empty"));
    }
    Ok(value)
}

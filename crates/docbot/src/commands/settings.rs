//! Messaging credentials: show and update.

use std::io::{self, BufRead, IsTerminal};

use docbot_core::{CredentialField, Credentials, Dashboard, SettingsForm};
use secrecy::SecretString;

use crate::cli::{GlobalOpts, OutputFormat, SettingsArgs, SettingsCommand, SettingsSetArgs};
use crate::error::CliError;
use crate::output::{self, Painter, Tone};

use super::util;

/// Fallback source for the admin password in non-interactive use.
const PASSWORD_ENV: &str = "DOCBOT_ADMIN_PASSWORD";

fn detail(c: &Credentials) -> String {
    output::detail_lines(&[
        (CredentialField::BusinessAccountId.label(), or_unset(&c.business_account_id)),
        (CredentialField::PhoneNumberId.label(), or_unset(&c.phone_number_id)),
        (CredentialField::AccessToken.label(), or_unset(&c.access_token)),
        (CredentialField::WebhookVerifyToken.label(), or_unset(&c.webhook_verify_token)),
    ])
}

fn or_unset(value: &str) -> String {
    if value.is_empty() {
        "(not set)".into()
    } else {
        value.to_owned()
    }
}

fn render(format: &OutputFormat, credentials: &Credentials) -> String {
    output::render_single(format, credentials, detail, |c| {
        format!(
            "{}\n{}\n{}\n{}",
            c.business_account_id, c.phone_number_id, c.access_token, c.webhook_verify_token
        )
    })
}

fn has_omitted_field(args: &SettingsSetArgs) -> bool {
    args.business_account_id.is_none()
        || args.phone_number_id.is_none()
        || args.access_token.is_none()
        || args.webhook_verify_token.is_none()
}

/// `--password-stdin`, then `DOCBOT_ADMIN_PASSWORD`, then an interactive prompt.
fn read_admin_password(from_stdin: bool) -> Result<SecretString, CliError> {
    if from_stdin {
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        let password = line.trim_end_matches(['\r', '\n']).to_owned();
        return Ok(SecretString::from(password));
    }

    if let Ok(password) = std::env::var(PASSWORD_ENV) {
        return Ok(SecretString::from(password));
    }

    if !io::stdin().is_terminal() {
        return Err(CliError::Validation {
            field: "admin_password".into(),
            reason: format!("no terminal to prompt on; use --password-stdin or set {PASSWORD_ENV}"),
        });
    }

    let password = dialoguer::Password::new()
        .with_prompt("Admin password")
        .interact()
        .map_err(util::prompt_err)?;
    Ok(SecretString::from(password))
}

async fn set(
    dashboard: &Dashboard,
    args: SettingsSetArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let mut form: SettingsForm = dashboard.settings_form();

    if has_omitted_field(&args) {
        if let Err(err) = form.load().await {
            tracing::warn!(error = %err, "could not load stored settings");
        }
    }

    let edits = [
        (CredentialField::BusinessAccountId, args.business_account_id),
        (CredentialField::PhoneNumberId, args.phone_number_id),
        (CredentialField::AccessToken, args.access_token),
        (CredentialField::WebhookVerifyToken, args.webhook_verify_token),
    ];
    for (field, value) in edits {
        if let Some(value) = value {
            form.set_field(field, value);
        }
    }

    if form.credentials().has_masked_token() {
        tracing::debug!("submitting the masked access token; the server keeps the stored one");
    }

    form.set_admin_password(read_admin_password(args.password_stdin)?);
    let response = form.submit().await?;

    if !global.quiet {
        let painter = Painter::new(&global.color);
        eprintln!("{}", painter.paint(&response.message, Tone::Good));
    }
    Ok(())
}

pub async fn handle(
    dashboard: &Dashboard,
    args: SettingsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        SettingsCommand::Show => {
            let mut form = dashboard.settings_form();
            let credentials = form.load().await?;
            output::print_output(&render(&global.output, credentials), global.quiet);
            Ok(())
        }
        SettingsCommand::Set(set_args) => set(dashboard, set_args, global).await,
    }
}

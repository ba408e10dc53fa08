//! `passvault update` — change an existing account.
//!
//! Anything left blank keeps its current value.

use crate::cli::commands::unexpected;
use crate::cli::output;
use crate::cli::{prompt_passphrase, read_optional_field, read_password_choice};
use crate::cli::{AccountFields, Cli, Context};
use crate::errors::Result;
use crate::vault::{AccountUpdate, Operation, OperationOutput};

/// Execute the `update` command.
pub fn execute(cli: &Cli, name: &str, fields: &AccountFields) -> Result<Option<String>> {
    let ctx = Context::load(cli)?;

    let update = AccountUpdate {
        password: read_password_choice(name, fields.generate, true)?,
        username: read_optional_field(fields.username.clone(), "New username (blank to keep)")?,
        url: read_optional_field(fields.url.clone(), "New URL (blank to keep)")?,
    };

    let passphrase = prompt_passphrase(&ctx.vault_path, false)?;
    let result = ctx.session(passphrase)?.execute(Operation::Update {
        name: name.to_string(),
        update,
    })?;

    match result {
        OperationOutput::Updated { changed: true } => {
            output::success(&format!("Account '{name}' updated"));
            Ok(None)
        }
        OperationOutput::Updated { changed: false } => {
            output::info(&format!("Nothing to change for '{name}'"));
            Ok(None)
        }
        other => unexpected(other),
    }
}

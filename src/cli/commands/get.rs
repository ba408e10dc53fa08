//! `passvault get` — show an account's username and URL.
//!
//! The password is never shown here; see `get-password`.

use crate::cli::commands::unexpected;
use crate::cli::output;
use crate::cli::{prompt_passphrase, Cli, Context};
use crate::errors::Result;
use crate::vault::{Operation, OperationOutput};

/// Execute the `get` command.
pub fn execute(cli: &Cli, name: &str) -> Result<Option<String>> {
    let ctx = Context::load(cli)?;
    let passphrase = prompt_passphrase(&ctx.vault_path, false)?;

    let result = ctx.session(passphrase)?.execute(Operation::Get {
        name: name.to_string(),
    })?;

    match result {
        OperationOutput::Account(summary) => Ok(Some(output::account_table(&summary))),
        other => unexpected(other),
    }
}

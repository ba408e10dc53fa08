//! `passvault list` — show every account name.

use crate::cli::commands::unexpected;
use crate::cli::output;
use crate::cli::{prompt_passphrase, Cli, Context};
use crate::errors::Result;
use crate::vault::{Operation, OperationOutput};

/// Execute the `list` command.
pub fn execute(cli: &Cli) -> Result<Option<String>> {
    let ctx = Context::load(cli)?;
    let passphrase = prompt_passphrase(&ctx.vault_path, false)?;

    match ctx.session(passphrase)?.execute(Operation::List)? {
        OperationOutput::Accounts(accounts) if accounts.is_empty() => {
            output::info("No accounts in this vault yet.");
            output::tip("Run `passvault add <NAME>` to add your first account.");
            Ok(None)
        }
        OperationOutput::Accounts(accounts) => Ok(Some(output::accounts_table(&accounts))),
        other => unexpected(other),
    }
}

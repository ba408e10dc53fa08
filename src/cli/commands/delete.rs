//! `passvault delete` — remove an account from the vault.

use std::io::{self, IsTerminal};

use dialoguer::Confirm;

use crate::cli::commands::unexpected;
use crate::cli::output;
use crate::cli::{prompt_error, prompt_passphrase, Cli, Context};
use crate::errors::{PassVaultError, Result};
use crate::vault::{Operation, OperationOutput};

/// Execute the `delete` command.
pub fn execute(cli: &Cli, name: &str, force: bool) -> Result<Option<String>> {
    let ctx = Context::load(cli)?;

    // Unless --force is set, ask for confirmation before deleting.
    if !force {
        if !io::stdin().is_terminal() {
            return Err(PassVaultError::CommandFailed(
                "refusing to delete without confirmation — pass --force".into(),
            ));
        }
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete account '{name}'?"))
            .default(false)
            .interact()
            .map_err(prompt_error)?;

        if !confirmed {
            return Err(PassVaultError::UserCancelled);
        }
    }

    let passphrase = prompt_passphrase(&ctx.vault_path, false)?;
    let result = ctx.session(passphrase)?.execute(Operation::Delete {
        name: name.to_string(),
    })?;

    match result {
        OperationOutput::Deleted { total } => {
            output::success(&format!("Deleted account '{name}' ({total} left)"));
            Ok(None)
        }
        other => unexpected(other),
    }
}

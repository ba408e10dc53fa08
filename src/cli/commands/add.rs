//! `passvault add` — store a new account.

use crate::cli::commands::unexpected;
use crate::cli::output;
use crate::cli::{prompt_passphrase, read_optional_field, read_password_choice};
use crate::cli::{AccountFields, Cli, Context};
use crate::errors::Result;
use crate::vault::store::validate_account_name;
use crate::vault::{NewAccount, Operation, OperationOutput, PasswordChoice};

/// Execute the `add` command.
pub fn execute(cli: &Cli, name: &str, fields: &AccountFields) -> Result<Option<String>> {
    // Catch bad names before asking for anything.
    validate_account_name(name)?;
    let ctx = Context::load(cli)?;

    let password = read_password_choice(name, fields.generate, false)?
        .unwrap_or(PasswordChoice::Generated);
    let account = NewAccount {
        password,
        username: read_optional_field(fields.username.clone(), "Username (optional)")?,
        url: read_optional_field(fields.url.clone(), "URL (optional)")?,
    };

    let passphrase = prompt_passphrase(&ctx.vault_path, true)?;
    let result = ctx.session(passphrase)?.execute(Operation::Add {
        name: name.to_string(),
        account,
    })?;

    match result {
        OperationOutput::Added { generated, total } => {
            output::success(&format!("Account '{name}' added ({total} total)"));
            if generated {
                output::tip(&format!(
                    "A password was generated. Pipe it somewhere with: passvault get-password {name}"
                ));
            }
            Ok(None)
        }
        other => unexpected(other),
    }
}

//! `passvault get-password` — write a password to a pipe or file.
//!
//! Refuses to print to a terminal.  The password is written as-is,
//! without a trailing newline, so `passvault get-password x | xclip`
//! copies exactly the password.

use std::io::{self, IsTerminal, Write};

use crate::cli::commands::unexpected;
use crate::cli::{prompt_passphrase, Cli, Context};
use crate::errors::{PassVaultError, Result};
use crate::vault::{Operation, OperationOutput};

/// Execute the `get-password` command.
pub fn execute(cli: &Cli, name: &str) -> Result<Option<String>> {
    if io::stdout().is_terminal() {
        return Err(PassVaultError::InteractiveSink);
    }

    let ctx = Context::load(cli)?;
    let passphrase = prompt_passphrase(&ctx.vault_path, false)?;

    let result = ctx.session(passphrase)?.execute(Operation::GetPassword {
        name: name.to_string(),
    })?;

    match result {
        OperationOutput::Password(password) => {
            let mut out = io::stdout().lock();
            out.write_all(password.as_bytes())?;
            out.flush()?;
            // `password` drops here and zeroes its copy.
            Ok(None)
        }
        other => unexpected(other),
    }
}

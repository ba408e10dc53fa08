//! One module per subcommand.  Each `execute` returns any non-secret
//! text for `main` to print on success.

pub mod add;
pub mod completions;
pub mod delete;
pub mod get;
pub mod get_password;
pub mod list;
pub mod update;

use crate::errors::{PassVaultError, Result};
use crate::vault::OperationOutput;

/// A session answered with an output the command did not ask for.
pub(crate) fn unexpected(output: OperationOutput) -> Result<Option<String>> {
    Err(PassVaultError::CommandFailed(format!(
        "unexpected session output: {output:?}"
    )))
}

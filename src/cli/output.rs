//! Colored terminal output helpers.
//!
//! All user-facing output goes through these functions so we get
//! consistent styling across every command.

use comfy_table::{ContentArrangement, Table};
use console::style;

use crate::vault::{AccountMetadata, AccountSummary};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Print a green success message: "check_mark {msg}"
pub fn success(msg: &str) {
    println!("{} {}", style("\u{2713}").green().bold(), msg);
}

/// Print a red error message: "x_mark {msg}"
pub fn error(msg: &str) {
    eprintln!("{} {}", style("\u{2717}").red().bold(), msg);
}

/// Print a yellow warning: "warning_sign {msg}"
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("\u{26a0}").yellow().bold(), msg);
}

/// Print a blue info message to stderr, so piped stdout stays clean.
pub fn info(msg: &str) {
    eprintln!("{} {}", style("\u{2139}").blue().bold(), msg);
}

/// Print a dim tip/hint: "arrow {msg}"
pub fn tip(msg: &str) {
    eprintln!("{} {}", style("\u{2192}").dim(), style(msg).dim());
}

/// Render account names with their timestamps (Name, Created, Updated).
pub fn accounts_table(accounts: &[AccountMetadata]) -> String {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Name", "Created", "Updated"]);

    for a in accounts {
        table.add_row(vec![
            a.name.clone(),
            a.created_at.format(TIME_FORMAT).to_string(),
            a.updated_at.format(TIME_FORMAT).to_string(),
        ]);
    }

    table.to_string()
}

/// Render one account's non-secret fields as a two-column table.
pub fn account_table(account: &AccountSummary) -> String {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Field", "Value"]);

    table.add_row(vec!["Name", account.name.as_str()]);
    table.add_row(vec!["Username", account.username.as_deref().unwrap_or("-")]);
    table.add_row(vec!["URL", account.url.as_deref().unwrap_or("-")]);
    table.add_row(vec![
        "Created".to_string(),
        account.created_at.format(TIME_FORMAT).to_string(),
    ]);
    table.add_row(vec![
        "Updated".to_string(),
        account.updated_at.format(TIME_FORMAT).to_string(),
    ]);

    table.to_string()
}

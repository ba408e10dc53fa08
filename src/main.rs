use clap::Parser;
use tracing_subscriber::EnvFilter;

use passvault::cli::commands;
use passvault::cli::output;
use passvault::cli::{Cli, Commands};
use passvault::vault::SessionOutcome;

/// Route `tracing` to stderr.  `-v` forces debug output for passvault;
/// otherwise `PASSVAULT_LOG` (env-filter syntax) applies, default `warn`.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("passvault=debug")
    } else {
        EnvFilter::try_from_env("PASSVAULT_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Add {
            ref name,
            ref fields,
        } => commands::add::execute(&cli, name, fields),
        Commands::Update {
            ref name,
            ref fields,
        } => commands::update::execute(&cli, name, fields),
        Commands::List => commands::list::execute(&cli),
        Commands::Get { ref name } => commands::get::execute(&cli, name),
        Commands::GetPassword { ref name } => commands::get_password::execute(&cli, name),
        Commands::Delete { ref name, force } => commands::delete::execute(&cli, name, force),
        Commands::Completions { ref shell } => commands::completions::execute(shell),
    };

    let outcome = SessionOutcome::from_result(&result);
    match (&outcome, result) {
        (SessionOutcome::Success(Some(rendered)), _) => println!("{rendered}"),
        (SessionOutcome::Cancelled, _) => output::info("Cancelled."),
        (_, Err(e)) => output::error(&e.to_string()),
        _ => {}
    }

    std::process::exit(outcome.exit_code());
}

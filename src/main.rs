use clap::Parser;
use tracing_subscriber::EnvFilter;

use lockbox::cli::commands;
use lockbox::cli::{CategoryAction, Cli, Commands};

fn main() {
    // RUST_LOG=lockbox=debug for open/save/lock tracing.  Secret material
    // is never logged at any level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("lockbox=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init => commands::init::execute(&cli),
        Commands::List => commands::list::execute(&cli),
        Commands::Search { ref term } => commands::search::execute(&cli, term),
        Commands::Sort { by } => commands::sort::execute(&cli, by),
        Commands::Add {
            ref name,
            ref category,
            ref site,
            ref login,
            ref secret,
        } => commands::add::execute(
            &cli,
            &commands::add::NewEntry {
                name,
                category,
                site: site.as_deref(),
                login: login.as_deref(),
                secret: secret.as_deref(),
            },
        ),
        Commands::Show { ref name, copy } => commands::show::execute(&cli, name, copy),
        Commands::Edit {
            ref name,
            ref secret,
        } => commands::edit::execute(&cli, name, secret.as_deref()),
        Commands::Delete { ref name, force } => commands::delete::execute(&cli, name, force),
        Commands::Category { ref action } => match action {
            CategoryAction::Add { name } => commands::category::execute_add(&cli, name),
            CategoryAction::Delete { name, force } => {
                commands::category::execute_delete(&cli, name, *force)
            }
            CategoryAction::List => commands::category::execute_list(&cli),
        },
        Commands::Shell => commands::shell::execute(&cli),
        Commands::KeyfileGenerate { ref path } => {
            commands::keyfile::execute(&cli, path.as_deref())
        }
        Commands::Audit { last, ref since } => {
            commands::audit_cmd::execute(&cli, last, since.as_deref())
        }
        Commands::Completions { shell } => commands::completions::execute(shell),
    };

    if let Err(e) = result {
        lockbox::cli::output::error(&e.to_string());
        std::process::exit(1);
    }
}

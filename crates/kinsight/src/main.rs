mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let db = cli.db.as_deref();

    match cli.command {
        Commands::Init => commands::init::run(db),
        Commands::Ingest { file, dir, child } => {
            commands::ingest::run(db, file.as_deref(), dir.as_deref(), child.as_deref())
        }
        Commands::Summary { child, date } => commands::query::summary(db, &child.id, date),
        Commands::Trajectory { child, topic } => commands::query::trajectory(db, &child.id, &topic),
        Commands::Growth { child, month } => commands::query::growth(db, &child.id, month),
        Commands::Conversations {
            child,
            date,
            from,
            to,
        } => commands::query::conversations(db, &child.id, date, from.zip(to)),
        Commands::Usage { child, date } => commands::query::usage(db, &child.id, date),
        Commands::Report { child, month } => commands::report::run(db, &child.id, month),
        Commands::Forget { child } => commands::forget::run(db, &child.id),
        Commands::Version => commands::version::run(),
    }
}

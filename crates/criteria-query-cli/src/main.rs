use clap::Parser;
use criteria_query_cli::Cli;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        1 => "criteria_query=debug,criteria_query_cli=debug".into(),
        _ => "criteria_query=trace,criteria_query_cli=trace".into(),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let output = criteria_query_cli::run(&cli)?;
    println!("{output}");
    Ok(())
}

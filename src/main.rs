use clap::Parser;
use macdtester::cli::{run, Cli};

fn init_tracing() -> Result<(), String> {
    let filter = std::env::var("MACDTESTER_LOG").unwrap_or_else(|_| "info".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_new(filter)
        .map_err(|err| format!("invalid log filter: {err}"))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn main() -> std::process::ExitCode {
    if let Err(err) = init_tracing() {
        eprintln!("error: {err}");
        return std::process::ExitCode::from(2);
    }
    run(Cli::parse())
}

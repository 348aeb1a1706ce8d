use clap::Parser;
use teachingkit_export::cli::Cli;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(err) = cli.run().await {
        eprintln!("teachingkit-export error: {:#}", err);
        std::process::exit(1);
    }
}

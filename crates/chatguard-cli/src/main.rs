use chatguard_cli::cli::Cli;
use chatguard_cli::commands;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.global.verbose);

    let config = commands::resolve_config(&cli.global)?;
    commands::run(cli.command, config).await
}

/// Filter used when `RUST_LOG` is unset
fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "chatguard=debug,chatguard_cli=debug,chatguard_classifiers=debug,chatguard_escalation=debug,chatguard_telemetry=debug"
    } else {
        "chatguard=info,chatguard_cli=info,chatguard_classifiers=warn,chatguard_escalation=info,chatguard_telemetry=info"
    }
}

fn init_logging(verbose: bool) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter(verbose).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "cinerec-server")]
#[command(about = "Movie metadata proxy and recommendation backend", long_about = None)]
struct Args {
    /// YAML config file. Defaults to cinerec-server.yaml when present.
    #[arg(short, long)]
    config: Option<String>,
    #[arg(short, long)]
    debug: bool,
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let default_filter = if args.debug {
        "cinerec_rs=debug,tower_http=debug"
    } else {
        "cinerec_rs=info,tower_http=info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    if args.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    if let Err(e) = cinerec_rs::run(args.config.as_deref()).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

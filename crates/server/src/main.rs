use clap::{Parser, Subcommand};
use tracing::info;

use adlens_core::Config;
use adlens_server::upstream::SpecSource;
use adlens_server::{app_config, build_router};

/// Creative headline analysis server.
#[derive(Parser, Debug)]
#[command(name = "adlens", version, about = "Creative headline analysis server")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP server (default)
    Serve,
    /// Extract features and validate headlines against the configured policy
    Check {
        /// Headlines to check
        #[arg(required = true)]
        headlines: Vec<String>,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

async fn serve(config: Config) -> anyhow::Result<()> {
    config.log_summary();
    config.validate()?;

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = app_config::build_app_state(config)?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);
    info!("API docs at http://{}/docs", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn check(config: &Config, headlines: &[String], json: bool) -> anyhow::Result<()> {
    let engine = app_config::build_engine(config)?;
    let spec = app_config::build_spec_source(config)?.fetch_spec().await?;

    let results: Vec<serde_json::Value> = headlines
        .iter()
        .map(|headline| {
            let features = engine.extract(headline);
            let validation = engine.validate(headline, &spec);
            serde_json::json!({
                "headline": headline,
                "features": features,
                "ok": validation.ok,
                "issues": validation.issues,
            })
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    println!(
        "policy {} (max {} / warn {} chars)",
        spec.version, spec.headline.max_chars, spec.headline.warn_at
    );
    for (headline, result) in headlines.iter().zip(&results) {
        let mark = if result["ok"].as_bool().unwrap_or(false) { "ok  " } else { "FAIL" };
        println!("{} {}", mark, headline);
        if let Some(issues) = result["issues"].as_array() {
            for issue in issues.iter().filter_map(|i| i.as_str()) {
                println!("       - {}", issue);
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_level(true)
        .init();

    let cli = Cli::parse();
    let config = app_config::load_config();

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await?,
        Command::Check { headlines, json } => check(&config, &headlines, json).await?,
    }

    Ok(())
}

//! DuckieMind API Server

use std::path::PathBuf;

use clap::Parser;
use duckie_server::{AppConfig, start_server};
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "duckie_server=info,duckie_core=info,duckie_api=info,tower_http=info";
const DEBUG_FILTER: &str = "duckie_server=debug,duckie_core=debug,duckie_api=debug,tower_http=debug";

#[derive(Parser, Debug)]
#[command(name = "duckie-server")]
#[command(about = "DuckieMind student wellness assistant API server", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to config file (default: ./duckiemind.toml, then the user config dir)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the bind address from the config file
    #[arg(short, long)]
    bind: Option<String>,

    /// Enable debug logging (ignored when RUST_LOG is set)
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> miette::Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .rgb_colors(miette::RgbColors::Preferred)
                .with_cause_chain()
                .with_syntax_highlighting(miette::highlighters::SyntectHighlighter::default())
                .color(true)
                .context_lines(5)
                .tab_width(2)
                .break_words(true)
                .build(),
        )
    }))?;
    miette::set_panic_hook();

    let cli = Cli::parse();

    duckie_core::config::load_dotenv();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if cli.debug { DEBUG_FILTER } else { DEFAULT_FILTER })
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(true)
        .with_line_number(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_timer(tracing_subscriber::fmt::time::LocalTime::rfc_3339())
        .pretty()
        .init();

    let mut config = AppConfig::load(cli.config.as_deref()).await?;
    if let Some(bind) = cli.bind {
        config.server.bind_address = bind;
    }

    start_server(config).await?;

    Ok(())
}

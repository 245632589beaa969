mod check_commands;

use std::{io::Read, path::PathBuf};

use {
    anyhow::Context,
    clap::{Args, Parser, Subcommand},
    tracing::{info, warn},
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
    voxrelay_cleaner::{CleaningOptions, clean},
    voxrelay_config::{VoxrelayConfig, validate},
};

#[derive(Parser)]
#[command(name = "voxrelay", about = "voxrelay: text cleaning and streaming TTS relay")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Config file (overrides discovery in ./ and ~/.config/voxrelay/).
    #[arg(long, global = true, env = "VOXRELAY_CONFIG")]
    config: Option<PathBuf>,

    /// Address to bind to (overrides config value).
    #[arg(long, global = true)]
    bind: Option<String>,
    /// Port to listen on (overrides config value).
    #[arg(long, global = true)]
    port: Option<u16>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the relay server (default when no subcommand is provided).
    Serve,
    /// Clean TEXT (or stdin) and print the result.
    Clean(CleanArgs),
    /// Print the effective voice table.
    Voices,
    /// Validate the configuration.
    Check,
}

#[derive(Args, Debug, Default)]
struct CleanArgs {
    /// Text to clean. Read from stdin when omitted.
    text: Option<String>,
    /// Strip markdown syntax.
    #[arg(long)]
    markdown: bool,
    /// Strip emoji and other supplementary-plane characters.
    #[arg(long)]
    emoji: bool,
    /// Strip URLs.
    #[arg(long)]
    url: bool,
    /// Strip `[n]` citation markers.
    #[arg(long)]
    citations: bool,
    /// Delete all whitespace, including newlines.
    #[arg(long)]
    whitespace: bool,
    /// Comma-separated words to remove.
    #[arg(long, value_name = "LIST")]
    keywords: Option<String>,
}

impl CleanArgs {
    fn options(&self) -> CleaningOptions {
        CleaningOptions {
            remove_markdown: self.markdown,
            remove_emoji: self.emoji,
            remove_url: self.url,
            remove_citations: self.citations,
            remove_whitespace: self.whitespace,
            custom_keywords: self.keywords.clone().unwrap_or_default(),
        }
    }
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    // Logs go to stderr so `clean` and `voices` output stays pipeable.
    if cli.json_logs {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

/// Load `--config` if given, otherwise discover the config file, then apply
/// `--bind` and `--port`.
///
/// Returns the config and the file it came from.
fn load_config(cli: &Cli) -> anyhow::Result<(VoxrelayConfig, Option<PathBuf>)> {
    let (mut config, source) = match &cli.config {
        Some(path) => (voxrelay_config::load_config(path)?, Some(path.clone())),
        None => voxrelay_config::discover_and_load()?,
    };

    // CLI args override config values
    if let Some(bind) = &cli.bind {
        config.server.bind.clone_from(bind);
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    Ok((config, source))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    init_telemetry(&cli);

    match &cli.command {
        // Default: start the server when no subcommand is provided
        None | Some(Commands::Serve) => serve(&cli).await,
        Some(Commands::Clean(args)) => run_clean(args),
        Some(Commands::Voices) => {
            let (config, _) = load_config(&cli)?;
            print_voices(&config);
            Ok(())
        },
        Some(Commands::Check) => {
            let (config, source) = load_config(&cli)?;
            check_commands::handle_check(&config, source.as_deref())
        },
    }
}

async fn serve(cli: &Cli) -> anyhow::Result<()> {
    info!(version = env!("CARGO_PKG_VERSION"), "voxrelay starting");

    let (config, source) = load_config(cli)?;
    if let Some(path) = &source {
        info!(path = %path.display(), "loaded config");
    }

    let result = validate(&config);
    for d in &result.diagnostics {
        warn!(severity = %d.severity, path = %d.path, "{}", d.message);
    }
    if result.has_errors() {
        anyhow::bail!(
            "refusing to start: configuration has {} error(s), run `voxrelay check` for details",
            result.count(voxrelay_config::Severity::Error)
        );
    }

    voxrelay_gateway::start_gateway(config).await
}

fn run_clean(args: &CleanArgs) -> anyhow::Result<()> {
    let text = match &args.text {
        Some(text) => text.clone(),
        None => read_stdin().context("failed to read text from stdin")?,
    };
    println!("{}", clean(&text, &args.options()));
    Ok(())
}

fn read_stdin() -> std::io::Result<String> {
    let mut buf = String::new();
    std::io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn print_voices(config: &VoxrelayConfig) {
    let entries = config.voice_map().entries();
    let width = entries.iter().map(|e| e.key.len()).max().unwrap_or(0);
    for entry in entries {
        let marker = if entry.key == config.relay.default_voice {
            " (default)"
        } else {
            ""
        };
        println!("{:<width$}  {}{marker}", entry.key, entry.voice);
    }
}

// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, info, warn};
use std::fs::File;
use std::io::BufReader;
use std::io::Write;
use std::path::{Path, PathBuf};

use ytsubs::Controller;
use ytsubs::app_config::{self, API_URL_ENV, Config};
use ytsubs::language_utils;
use ytsubs::server;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the captions of a video as JSON
    Fetch {
        /// Video URL
        url: String,

        /// Print `M:SS - text` lines instead of JSON
        #[arg(short, long)]
        timestamps: bool,
    },

    /// Write the captions of a video to an SRT file
    Srt {
        /// Video URL
        url: String,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,

        /// Force overwrite of existing output files
        #[arg(short, long)]
        force_overwrite: bool,
    },

    /// Print oEmbed metadata of a video
    Info {
        /// Video URL
        url: String,
    },

    /// Run the HTTP service
    Serve {
        /// Address to bind (overrides HOST)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind (overrides PORT)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Generate shell completions for ytsubs
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug)]
struct GlobalOptions {
    /// Configuration file path
    #[arg(short, long = "config", global = true, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, global = true, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Preferred caption language code (e.g., 'en', 'de', 'pt-BR')
    #[arg(short = 'L', long, global = true)]
    language: Option<String>,

    /// Managed caption backend address
    #[arg(long, global = true, env = API_URL_ENV)]
    api_url: Option<String>,
}

/// ytsubs - YouTube subtitle retrieval
///
/// Fetches the captions of a video through a managed backend, falling back to
/// direct extraction, and prints or exports them.
#[derive(Parser, Debug)]
#[command(name = "ytsubs")]
#[command(version)]
#[command(about = "Fetch YouTube captions as JSON, timestamps or SRT")]
#[command(long_about = "ytsubs resolves a video URL, retrieves its captions and prints or exports them.

EXAMPLES:
    ytsubs fetch https://youtu.be/dQw4w9WgXcQ            # Captions as JSON
    ytsubs fetch -t https://youtu.be/dQw4w9WgXcQ         # Captions as M:SS lines
    ytsubs srt -o subs/ https://youtu.be/dQw4w9WgXcQ     # Write an SRT file
    ytsubs -L de fetch https://youtu.be/dQw4w9WgXcQ      # Prefer German captions
    ytsubs serve --port 8000                             # Run the HTTP service
    ytsubs completions bash > ytsubs.bash                # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config. If the config file doesn't exist, a default one
    will be created automatically. YTSUBS_API_URL overrides the backend address,
    HOST and PORT the service address.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOptions,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji and ANSI color for log level
    fn decoration_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("❌ ", "1;31"),
            Level::Warn => ("🚧 ", "1;33"),
            Level::Info => (" ", "1;32"),
            Level::Debug => ("🔍 ", "1;36"),
            Level::Trace => ("📋 ", "1;35"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (emoji, color) = Self::decoration_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "\x1B[{}m{} {} {}\x1B[0m", color, now, emoji, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger at trace; the effective level is set once the config is known
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    if let Commands::Completions { shell } = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "ytsubs", &mut std::io::stdout());
        return Ok(());
    }

    if let Some(cmd_log_level) = &cli.global.log_level {
        let level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let mut config = load_config(&cli.global)?;
    if let Commands::Serve { host, port } = &cli.command {
        if let Some(host) = host {
            config.server.host = host.clone();
        }
        if let Some(port) = port {
            config.server.port = *port;
        }
    }

    config.validate().context("Configuration validation failed")?;
    log::set_max_level(config.log_level.to_level_filter());

    match cli.command {
        Commands::Fetch { url, timestamps } => {
            let controller = Controller::with_config(config)?;
            let result = controller.fetch(&url).await?;

            if timestamps {
                for line in result.timestamp_lines() {
                    println!("{}", line);
                }
            } else {
                println!("{}", serde_json::to_string_pretty(&result)?);
            }
        }
        Commands::Srt {
            url,
            output_dir,
            force_overwrite,
        } => {
            let controller = Controller::with_config(config)?;
            if let Some(path) = controller.export(&url, &output_dir, force_overwrite).await? {
                println!("{}", path.display());
            }
        }
        Commands::Info { url } => {
            let controller = Controller::with_config(config)?;
            let info = controller.video_info(&url).await?;
            println!("{}", serde_json::to_string_pretty(&info)?);
        }
        Commands::Serve { .. } => server::serve(&config).await?,
        Commands::Completions { .. } => {}
    }

    Ok(())
}

/// Load the config file (writing a default one when missing), then apply
/// environment and command line overrides, in that order
fn load_config(options: &GlobalOptions) -> Result<Config> {
    let config_path = &options.config_path;

    let mut config = if Path::new(config_path).exists() {
        let file = File::open(config_path).context(format!("Failed to open config file: {}", config_path))?;

        let reader = BufReader::new(file);
        serde_json::from_reader(reader).context(format!("Failed to parse config file: {}", config_path))?
    } else {
        warn!("Config file not found at '{}', creating default config.", config_path);

        let config = Config::default();
        let config_json =
            serde_json::to_string_pretty(&config).context("Failed to serialize default config to JSON")?;

        std::fs::write(config_path, config_json)
            .context(format!("Failed to write default config to file: {}", config_path))?;

        config
    };

    config.apply_env();

    if let Some(api_url) = &options.api_url {
        info!("Using caption backend at {}", api_url);
        config.backend.base_url = api_url.clone();
    }

    if let Some(language) = &options.language {
        config.language = language_utils::normalize_language_hint(language)
            .with_context(|| format!("Invalid language code: {}", language))?;
    }

    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }

    Ok(config)
}

mod commands;

use addtocal_core::{AddToCalResult, DurationStyle};
use addtocal_core::addtocal_config::{AddToCalConfig, parse_timezone};
use addtocal_core::normalize::NormalizeOptions;
use anyhow::{Context, Result};
use chrono_tz::Tz;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "addtocal")]
#[command(about = "Fill in \"add to calendar\" links in HTML pages")]
struct Cli {
    /// Log progress (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Timezone event times are written in (default: config, then system timezone)
    #[arg(long, global = true)]
    timezone: Option<String>,

    /// How Yahoo durations are written
    #[arg(long, global = true, value_enum)]
    duration_style: Option<DurationStyleArg>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rewrite an HTML page, setting the href of every add-to-calendar link
    Render {
        /// HTML file to read, or "-" for stdin
        input: String,

        /// Write the result here instead of stdout
        #[arg(short, long)]
        output: Option<String>,

        /// URL of the page, used in ICS files for events without a URL
        #[arg(long)]
        page_url: Option<String>,
    },
    /// Print the add-to-calendar link(s) for a single event
    Link(commands::link::LinkArgs),
    /// List supported providers
    Providers,
    /// Manage the config file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Create a commented default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the effective configuration, including the resolved timezone
    Show,
    /// Print the config file path
    Path,
}

#[derive(Clone, Copy, ValueEnum)]
enum DurationStyleArg {
    Legacy,
    HoursMinutes,
}

impl From<DurationStyleArg> for DurationStyle {
    fn from(arg: DurationStyleArg) -> Self {
        match arg {
            DurationStyleArg::Legacy => DurationStyle::Legacy,
            DurationStyleArg::HoursMinutes => DurationStyle::HoursMinutes,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;
    run(cli, AddToCalConfig::load)
}

/// Dispatch a command. Only the commands that use the config load it, so
/// `config path` and `config init` still work when the file is broken.
fn run(cli: Cli, load: impl FnOnce() -> AddToCalResult<AddToCalConfig>) -> Result<()> {
    let load_config = || -> Result<AddToCalConfig> {
        let mut config = load().context("Failed to load config")?;
        if let Some(tz) = cli.timezone {
            config.timezone = Some(tz);
        }
        if let Some(style) = cli.duration_style {
            config.duration_style = style.into();
        }
        Ok(config)
    };

    match cli.command {
        Commands::Render {
            input,
            output,
            page_url,
        } => {
            let mut config = load_config()?;
            if page_url.is_some() {
                config.page_url = page_url;
            }
            let options = normalize_options(&config)?;
            commands::render::run(&input, output.as_deref(), options, config.page_url)
        }
        Commands::Link(args) => {
            let config = load_config()?;
            let options = normalize_options(&config)?;
            commands::link::run(args, &options, config.page_url.as_deref())
        }
        Commands::Providers => {
            commands::providers::run();
            Ok(())
        }
        Commands::Config { action } => match action {
            ConfigAction::Init { force } => commands::config::init(force),
            ConfigAction::Show => {
                let config = load_config()?.resolved(system_timezone())?;
                commands::config::show(&config)
            }
            ConfigAction::Path => commands::config::path(),
        },
    }
}

/// Log to stderr so stdout stays clean for HTML and links
fn init_logging(verbose: bool) -> Result<()> {
    let default_filter = if verbose { "info" } else { "warn" };
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber).context("Failed to set up logging")?;

    Ok(())
}

fn system_timezone() -> Tz {
    iana_time_zone::get_timezone()
        .ok()
        .and_then(|name| parse_timezone(&name).ok())
        .unwrap_or(Tz::UTC)
}

/// Configured timezone, else the system timezone, else UTC.
fn normalize_options(config: &AddToCalConfig) -> Result<NormalizeOptions> {
    Ok(config.normalize_options(system_timezone())?)
}

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use profilebit_cache::{
    InvalidationBus, InvalidationEvent, InvalidationScope, JsonFileStore, KeyValueStore,
    MemoryStore, ProgressCache,
};
use profilebit_core::{
    ConfigManager, LoggingConfig, PhotoKind, ProfileBitConfig, StaticProfileSource, UserId,
};
use profilebit_widget::{ProfileCompletionWidget, WidgetSettings};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "profilebit")]
#[command(about = "ProfileBit CLI - Profile completion progress and widget rendering", long_about = None)]
#[command(version)]
struct Cli {
    /// Output format (json, pretty)
    #[arg(short, long, global = true, default_value = "pretty")]
    output: OutputFormat,

    /// Config file; defaults to ./.profilebit.toml then ~/.profilebit/config.toml
    #[arg(long, global = true, env = "PROFILEBIT_CONFIG")]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    Json,
    Pretty,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the widget HTML for a user
    Render(WidgetArgs),

    /// Show the formatted progress for a user
    Progress(WidgetArgs),

    /// Print the widget's configuration form
    Controls {
        /// Profile data fixture (JSON)
        #[arg(short, long)]
        fixture: PathBuf,
    },

    /// Publish a domain event and drop the affected cache entries
    Invalidate(InvalidateArgs),

    /// Write a default config file
    InitConfig {
        /// Destination path
        #[arg(default_value = ".profilebit.toml")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Args)]
struct WidgetArgs {
    /// Profile data fixture (JSON)
    #[arg(short, long)]
    fixture: PathBuf,

    /// Viewing user; omit to render as an anonymous visitor
    #[arg(short, long)]
    user: Option<UserId>,

    /// Widget settings: a typed TOML file or the host's flat JSON values
    #[arg(short, long)]
    settings: Option<PathBuf>,
}

#[derive(Args)]
struct InvalidateArgs {
    /// Event to publish
    #[arg(value_enum)]
    event: EventArg,

    /// User the event concerns
    #[arg(long)]
    user: Option<UserId>,

    /// Profile field the event concerns
    #[arg(long)]
    field: Option<u64>,

    /// Profile field group the event concerns
    #[arg(long)]
    group: Option<u64>,

    /// Photo kind for photo-upload-setting-changed (profile_photo, cover_photo)
    #[arg(long)]
    kind: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum EventArg {
    AvatarUploaded,
    AvatarDeleted,
    CoverImageUploaded,
    CoverImageDeleted,
    ProfileUpdated,
    FieldSaved,
    FieldDeleted,
    GroupDeleted,
    PhotoUploadSettingChanged,
    FieldsReordered,
}

impl InvalidateArgs {
    fn to_event(&self) -> Result<InvalidationEvent> {
        let user = || self.user.ok_or_else(|| anyhow!("--user is required for this event"));
        let field = || self.field.ok_or_else(|| anyhow!("--field is required for this event"));

        let event = match self.event {
            EventArg::AvatarUploaded => InvalidationEvent::AvatarUploaded { user_id: user()? },
            EventArg::AvatarDeleted => InvalidationEvent::AvatarDeleted { user_id: user()? },
            EventArg::CoverImageUploaded => {
                InvalidationEvent::CoverImageUploaded { user_id: user()? }
            }
            EventArg::CoverImageDeleted => InvalidationEvent::CoverImageDeleted { user_id: user()? },
            EventArg::ProfileUpdated => InvalidationEvent::ProfileUpdated { user_id: user()? },
            EventArg::FieldSaved => InvalidationEvent::FieldSaved { field_id: field()? },
            EventArg::FieldDeleted => InvalidationEvent::FieldDeleted { field_id: field()? },
            EventArg::GroupDeleted => InvalidationEvent::GroupDeleted {
                group_id: self
                    .group
                    .ok_or_else(|| anyhow!("--group is required for this event"))?,
            },
            EventArg::PhotoUploadSettingChanged => {
                let kind = self
                    .kind
                    .as_deref()
                    .ok_or_else(|| anyhow!("--kind is required for this event"))?;
                InvalidationEvent::PhotoUploadSettingChanged {
                    kind: kind.parse::<PhotoKind>().map_err(|e| anyhow!(e))?,
                }
            }
            EventArg::FieldsReordered => InvalidationEvent::FieldsReordered,
        };
        Ok(event)
    }
}

// Output structures
#[derive(Serialize)]
struct InvalidationResult {
    event: String,
    scope: String,
    listeners: usize,
    listener_failures: u64,
    store: String,
}

#[derive(Serialize)]
struct InitConfigResult {
    path: String,
    status: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref()).context("Failed to load configuration")?;
    init_tracing(&config.logging, cli.verbose)?;

    // Execute command
    match execute_command(&cli, &config) {
        Ok(output) => {
            print_output(&cli.output, &output)?;
            Ok(())
        }
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            std::process::exit(1);
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<ProfileBitConfig> {
    let manager = match path {
        Some(path) => ConfigManager::from_path(path)?,
        None => ConfigManager::load()?,
    };
    Ok(manager.into_config())
}

fn init_tracing(logging: &LoggingConfig, verbose: bool) -> Result<()> {
    let level = if verbose { "debug" } else { logging.level.as_str() };
    let filter = EnvFilter::try_new(level)
        .with_context(|| format!("Invalid log filter: {}", level))?;
    let registry = tracing_subscriber::registry().with(filter);

    // Logs go to stderr so rendered output on stdout stays clean.
    match logging.format.as_str() {
        "json" => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
        "compact" => registry
            .with(fmt::layer().compact().with_writer(std::io::stderr))
            .try_init(),
        _ => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init(),
    }
    .map_err(|e| anyhow!("Failed to initialize logging: {}", e))
}

fn open_store(config: &ProfileBitConfig) -> Result<(Arc<dyn KeyValueStore>, String)> {
    match &config.cache.store_path {
        Some(path) => {
            let store = JsonFileStore::open(path)
                .with_context(|| format!("Failed to open progress store {}", path.display()))?;
            Ok((Arc::new(store), path.display().to_string()))
        }
        None => Ok((Arc::new(MemoryStore::new()), "memory".to_string())),
    }
}

fn build_cache(config: &ProfileBitConfig) -> Result<(Arc<ProgressCache>, String)> {
    let (store, description) = open_store(config)?;
    let cache = ProgressCache::from_config(store, &config.cache);
    debug!(store = %description, namespace = cache.namespace(), "Progress cache ready");
    Ok((Arc::new(cache), description))
}

fn load_fixture(path: &Path) -> Result<StaticProfileSource> {
    StaticProfileSource::from_json_file(path)
        .with_context(|| format!("Failed to load fixture {}", path.display()))
}

fn load_settings(path: Option<&Path>) -> Result<WidgetSettings> {
    let Some(path) = path else {
        return Ok(WidgetSettings::default());
    };
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings {}", path.display()))?;

    if path.extension().is_some_and(|ext| ext == "toml") {
        return toml::from_str(&content)
            .with_context(|| format!("Invalid settings file {}", path.display()));
    }

    let values: BTreeMap<String, Value> = serde_json::from_str(&content)
        .with_context(|| format!("Invalid settings file {}", path.display()))?;
    Ok(WidgetSettings::from_host_values(&values)?)
}

fn build_widget(config: &ProfileBitConfig, args: &WidgetArgs) -> Result<ProfileCompletionWidget> {
    let settings = load_settings(args.settings.as_deref())?;
    let (cache, _) = build_cache(config)?;
    Ok(ProfileCompletionWidget::from_config(cache, settings, &config.cache))
}

fn execute_command(cli: &Cli, config: &ProfileBitConfig) -> Result<Value> {
    match &cli.command {
        Commands::Render(args) => {
            let source = load_fixture(&args.fixture)?;
            let widget = build_widget(config, args)?;
            let html = widget
                .render(&source, args.user)
                .context("Failed to render widget")?;
            Ok(match cli.output {
                OutputFormat::Json => serde_json::json!({ "html": html }),
                OutputFormat::Pretty => Value::String(html),
            })
        }

        Commands::Progress(args) => {
            let source = load_fixture(&args.fixture)?;
            let widget = build_widget(config, args)?;
            match widget.progress(&source, args.user) {
                Some(progress) => Ok(serde_json::to_value(progress)?),
                None => Ok(Value::Null),
            }
        }

        Commands::Controls { fixture } => {
            let source = load_fixture(fixture)?;
            let (cache, _) = build_cache(config)?;
            let widget = ProfileCompletionWidget::new(cache, WidgetSettings::default());
            Ok(serde_json::to_value(widget.controls(&source))?)
        }

        Commands::Invalidate(args) => execute_invalidate(args, config),

        Commands::InitConfig { path, force } => {
            if path.exists() && !force {
                return Err(anyhow!(
                    "{} already exists, pass --force to overwrite",
                    path.display()
                ));
            }
            ConfigManager::create_default_config(path)?;
            Ok(serde_json::to_value(InitConfigResult {
                path: path.display().to_string(),
                status: "created".to_string(),
            })?)
        }
    }
}

fn execute_invalidate(args: &InvalidateArgs, config: &ProfileBitConfig) -> Result<Value> {
    let event = args.to_event()?;
    let (cache, store) = build_cache(config)?;
    let bus = InvalidationBus::for_cache(cache);

    let scope = match event.scope() {
        InvalidationScope::User(user_id) => format!("user {}", user_id),
        InvalidationScope::All => "all".to_string(),
    };
    let event_name = event.name().to_string();
    bus.publish(event);

    let stats = bus.stats();
    Ok(serde_json::to_value(InvalidationResult {
        event: event_name,
        scope,
        listeners: bus.listener_count(),
        listener_failures: stats.listener_failures,
        store,
    })?)
}

fn print_output(format: &OutputFormat, value: &Value) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(value)?);
        }
        OutputFormat::Pretty => {
            print_pretty(value, 0)?;
        }
    }
    Ok(())
}

fn print_pretty(value: &Value, depth: usize) -> Result<()> {
    let indent = "  ".repeat(depth);
    match value {
        Value::Object(map) => {
            for (key, val) in map {
                let key_colored = key.cyan().bold();
                match val {
                    Value::String(s) => {
                        println!("{}{}: {}", indent, key_colored, s.green());
                    }
                    Value::Number(n) => {
                        println!("{}{}: {}", indent, key_colored, n.to_string().yellow());
                    }
                    Value::Bool(b) => {
                        let val_colored = if *b {
                            "true".green()
                        } else {
                            "false".red()
                        };
                        println!("{}{}: {}", indent, key_colored, val_colored);
                    }
                    Value::Null => {
                        println!("{}{}: {}", indent, key_colored, "-".dimmed());
                    }
                    nested => {
                        println!("{}{}:", indent, key_colored);
                        print_pretty(nested, depth + 1)?;
                    }
                }
            }
        }
        Value::Array(arr) => {
            for (i, item) in arr.iter().enumerate() {
                println!("{}{}{}:", indent, "Item ".cyan(), (i + 1).to_string().yellow());
                print_pretty(item, depth + 1)?;
            }
        }
        Value::String(s) => {
            println!("{}", s);
        }
        Value::Null => {
            println!("{}", "Nothing to show".dimmed());
        }
        _ => {
            println!("{}", serde_json::to_string_pretty(value)?);
        }
    }
    Ok(())
}

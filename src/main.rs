//! dorkforge CLI - build search dorks and open them across engines.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use dorkforge::{
    history::FormState,
    opener::{PrintOpener, SystemOpener},
    DorkQuery, Dorker, SearchEngine, SearchStatus, Settings, Tag, TagColor, Theme,
};

/// dorkforge - search dork builder
#[derive(Parser)]
#[command(name = "dorkforge")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Directory holding saved engines, history and tags
    #[arg(long, global = true, env = "DORKFORGE_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Operation budget for formatter scripts
    #[arg(long, global = true, env = "DORKFORGE_MAX_OPERATIONS")]
    max_operations: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the dork for each engine and open it in the browser
    Search(SearchArgs),

    /// Manage search engines
    #[command(subcommand)]
    Engines(EngineCommand),

    /// Show or change an engine's operator configuration
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Work with formatter scripts
    #[command(subcommand)]
    Formatter(FormatterCommand),

    /// Browse and annotate past searches
    #[command(subcommand)]
    History(HistoryCommand),

    /// Manage tags
    #[command(subcommand)]
    Tags(TagCommand),

    /// Export all data as JSON (to stdout when no file is given)
    Export {
        file: Option<PathBuf>,
    },

    /// Import data previously exported
    Import {
        file: PathBuf,
    },

    /// Show or change the theme preference
    Theme {
        #[arg(value_enum)]
        action: Option<ThemeAction>,
    },
}

#[derive(Args)]
struct SearchArgs {
    /// Search query
    query: String,

    /// Engines to use (comma-separated ids). Defaults to all enabled engines.
    #[arg(short, long, value_delimiter = ',')]
    engines: Vec<String>,

    /// Restrict results to this domain (repeatable)
    #[arg(short, long = "include")]
    include: Vec<String>,

    /// Exclude this domain (repeatable)
    #[arg(short = 'x', long = "exclude")]
    exclude: Vec<String>,

    /// File type filter, e.g. pdf
    #[arg(short, long)]
    filetype: Option<String>,

    /// Print the URLs without opening them or saving history
    #[arg(long)]
    dry_run: bool,

    /// Print URLs instead of launching the browser (history is still saved)
    #[arg(long)]
    print: bool,

    /// Output format
    #[arg(long, default_value = "text")]
    format: OutputFormat,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output
    Json,
}

#[derive(Subcommand)]
enum EngineCommand {
    /// List all engines
    List,
    /// Add a custom engine
    Add {
        #[arg(long)]
        id: String,
        #[arg(long)]
        name: String,
        /// Search URL; the encoded query is appended to it
        #[arg(long)]
        url: String,
        #[arg(long, default_value = "")]
        icon: String,
    },
    /// Remove a custom engine
    Remove { id: String },
    /// Enable an engine
    Enable { id: String },
    /// Disable an engine
    Disable { id: String },
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Print an engine's effective configuration as JSON
    Show { id: String },
    /// Change fields of an engine's configuration
    Set(ConfigSetArgs),
    /// Restore an engine's default configuration
    Reset { id: String },
}

#[derive(Args)]
struct ConfigSetArgs {
    id: String,
    /// Include template, e.g. "site:$domain"
    #[arg(long)]
    include: Option<String>,
    /// Exclude template, e.g. "-site:$domain"
    #[arg(long)]
    exclude: Option<String>,
    /// File type template, e.g. "filetype:$type"
    #[arg(long)]
    file: Option<String>,
    #[arg(long, action = ArgAction::Set)]
    supports_exclude: Option<bool>,
    #[arg(long, action = ArgAction::Set)]
    supports_filetype: Option<bool>,
    /// Route domains and query through formatter scripts
    #[arg(long, action = ArgAction::Set)]
    advanced: Option<bool>,
    /// Script file for include domains
    #[arg(long)]
    include_formatter: Option<PathBuf>,
    /// Script file for exclude domains
    #[arg(long)]
    exclude_formatter: Option<PathBuf>,
    /// Script file for the whole query
    #[arg(long)]
    query_formatter: Option<PathBuf>,
}

#[derive(Subcommand)]
enum FormatterCommand {
    /// Run a formatter script on one input and print the result
    Test { file: PathBuf, input: String },
}

#[derive(Subcommand)]
enum HistoryCommand {
    /// List past searches, newest first
    List {
        /// Only bookmarked searches
        #[arg(long)]
        bookmarked: bool,
        /// Only searches carrying this tag id
        #[arg(long)]
        tag: Option<String>,
        #[arg(long, default_value = "text")]
        format: OutputFormat,
    },
    /// Print a search as editable form fields
    Show { id: String },
    /// Set the status of a search
    Status { id: String, status: SearchStatus },
    /// Replace the tags of a search
    Tags { id: String, tags: Vec<String> },
    /// Replace the notes of a search
    Notes { id: String, text: String },
    /// Toggle the bookmark on a search
    Bookmark { id: String },
    /// Open a past search again
    Rerun {
        id: String,
        #[arg(long)]
        print: bool,
    },
    /// Delete a search
    Delete { id: String },
}

#[derive(Subcommand)]
enum TagCommand {
    /// List tags
    List,
    /// Create or update a tag
    Save {
        #[arg(long)]
        id: String,
        #[arg(long)]
        name: String,
        /// teal, blue, purple, success, warning or danger
        #[arg(long, default_value = "teal")]
        color: TagColor,
    },
    /// Delete a tag
    Delete { id: String },
}

#[derive(Clone, Copy, ValueEnum)]
enum ThemeAction {
    Dark,
    Light,
    Toggle,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    if cli.verbose {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
            )
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    }

    let mut settings = Settings::default();
    if let Some(dir) = cli.data_dir {
        settings = settings.with_data_dir(dir);
    }
    if let Some(max) = cli.max_operations {
        settings = settings.with_max_operations(max);
    }
    let dorker = Dorker::open(&settings)
        .with_context(|| format!("opening data directory {}", settings.data_dir.display()))?;

    match cli.command {
        Commands::Search(args) => run_search(dorker, args),
        Commands::Engines(cmd) => run_engines(&dorker, cmd),
        Commands::Config(cmd) => run_config(&dorker, cmd),
        Commands::Formatter(FormatterCommand::Test { file, input }) => {
            let source = read_script(&file)?;
            println!("{}", dorker.formatter().evaluate_for_test(&source, &input));
            Ok(())
        }
        Commands::History(cmd) => run_history(dorker, cmd),
        Commands::Tags(cmd) => run_tags(&dorker, cmd),
        Commands::Export { file } => {
            let json = dorker.export()?;
            match file {
                Some(path) => {
                    fs::write(&path, json)
                        .with_context(|| format!("writing {}", path.display()))?;
                    eprintln!("Exported to {}", path.display());
                }
                None => println!("{}", json),
            }
            Ok(())
        }
        Commands::Import { file } => {
            let json = fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let summary = dorker.import(&json)?;
            println!(
                "Imported {} searches and {} tags (version {})",
                summary.history,
                summary.tags,
                summary.version.as_deref().unwrap_or("unknown")
            );
            if let Some(n) = summary.engine_configs {
                println!("  {} engine configurations", n);
            }
            if let Some(n) = summary.custom_engines {
                println!("  {} custom engines", n);
            }
            Ok(())
        }
        Commands::Theme { action } => {
            let themes = dorker.themes();
            let theme = match action {
                None => themes.get(),
                Some(ThemeAction::Toggle) => themes.toggle()?,
                Some(ThemeAction::Dark) => set_theme(&dorker, Theme::Dark)?,
                Some(ThemeAction::Light) => set_theme(&dorker, Theme::Light)?,
            };
            println!("{}", if theme == Theme::Dark { "dark" } else { "light" });
            Ok(())
        }
    }
}

fn set_theme(dorker: &Dorker, theme: Theme) -> Result<Theme> {
    dorker.themes().set(theme)?;
    Ok(theme)
}

fn attach_opener(dorker: Dorker, print: bool) -> Dorker {
    if print {
        return dorker.with_opener(PrintOpener);
    }
    match SystemOpener::detect() {
        Some(opener) => dorker.with_opener(opener),
        None => {
            eprintln!("Warning: no browser launcher found, printing URLs instead");
            dorker.with_opener(PrintOpener)
        }
    }
}

fn run_search(dorker: Dorker, args: SearchArgs) -> Result<()> {
    let mut query = DorkQuery::new(&args.query)
        .with_include_domains(args.include)
        .with_exclude_domains(args.exclude);
    if let Some(filetype) = args.filetype {
        query = query.with_file_type(filetype);
    }

    if args.dry_run {
        let urls = dorker.preview(&query, &args.engines)?;
        match args.format {
            OutputFormat::Text => {
                for built in &urls {
                    println!("{:<12} {}", built.engine_id, built.url);
                }
            }
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&urls)?),
        }
        return Ok(());
    }

    let dorker = attach_opener(dorker, args.print);
    let report = dorker.dispatch(&query, &args.engines)?;
    match args.format {
        OutputFormat::Text => {
            eprintln!(
                "Opened {} of {} tabs (history id {})",
                report.opened(),
                report.urls.len(),
                report.history_id
            );
            for id in &report.failed {
                eprintln!("  failed: {}", id);
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }
    Ok(())
}

fn run_engines(dorker: &Dorker, cmd: EngineCommand) -> Result<()> {
    let registry = dorker.registry();
    match cmd {
        EngineCommand::List => {
            let enabled = registry.enabled_engine_ids();
            println!("Search engines:\n");
            for engine in registry.list_all_engines() {
                let mark = if enabled.contains(&engine.id) { "*" } else { " " };
                let kind = if registry.is_builtin(&engine.id) {
                    ""
                } else {
                    " (custom)"
                };
                println!(
                    "  {} {:<12} {} {}{}",
                    mark, engine.id, engine.icon, engine.name, kind
                );
            }
            println!();
            println!("* = enabled");
            println!("Usage: dorkforge search \"query\" -e google,bing -i example.com");
        }
        EngineCommand::Add {
            id,
            name,
            url,
            icon,
        } => {
            let engine = registry.add_engine(SearchEngine::new(id, name, url, icon))?;
            println!("Added {} ({})", engine.id, engine.url);
        }
        EngineCommand::Remove { id } => {
            registry.remove_engine(&id)?;
            println!("Removed {}", id);
        }
        EngineCommand::Enable { id } => registry.set_engine_enabled(&id, true)?,
        EngineCommand::Disable { id } => registry.set_engine_enabled(&id, false)?,
    }
    Ok(())
}

fn run_config(dorker: &Dorker, cmd: ConfigCommand) -> Result<()> {
    let registry = dorker.registry();
    let configs = registry.configurations();
    match cmd {
        ConfigCommand::Show { id } => {
            ensure_engine(dorker, &id)?;
            let config = configs.get_configuration(&id);
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        ConfigCommand::Set(args) => {
            ensure_engine(dorker, &args.id)?;
            let mut config = configs.get_configuration(&args.id);
            if let Some(v) = args.include {
                config.include_syntax = v;
            }
            if let Some(v) = args.exclude {
                config.exclude_syntax = v;
            }
            if let Some(v) = args.file {
                config.file_syntax = v;
            }
            if let Some(v) = args.supports_exclude {
                config.supports_exclude_domains = v;
            }
            if let Some(v) = args.supports_filetype {
                config.supports_filetype = v;
            }
            if let Some(v) = args.advanced {
                config.use_advanced_formatting = v;
            }
            if let Some(path) = args.include_formatter {
                config.include_domain_formatter = Some(checked_script(dorker, &path)?);
            }
            if let Some(path) = args.exclude_formatter {
                config.exclude_domain_formatter = Some(checked_script(dorker, &path)?);
            }
            if let Some(path) = args.query_formatter {
                config.query_formatter = Some(checked_script(dorker, &path)?);
            }
            configs.update_configuration(&args.id, config)?;
            println!("Updated configuration for {}", args.id);
        }
        ConfigCommand::Reset { id } => {
            ensure_engine(dorker, &id)?;
            configs.update_configuration(&id, configs.default_for(&id))?;
            println!("Reset configuration for {}", id);
        }
    }
    Ok(())
}

fn ensure_engine(dorker: &Dorker, id: &str) -> Result<()> {
    if dorker.registry().find(id).is_none() {
        anyhow::bail!("Unknown engine '{}'", id);
    }
    Ok(())
}

fn read_script(path: &PathBuf) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn checked_script(dorker: &Dorker, path: &PathBuf) -> Result<String> {
    let source = read_script(path)?;
    dorker
        .formatter()
        .check(&source)
        .with_context(|| format!("invalid formatter in {}", path.display()))?;
    Ok(source)
}

fn run_history(dorker: Dorker, cmd: HistoryCommand) -> Result<()> {
    let history = dorker.history();
    match cmd {
        HistoryCommand::List {
            bookmarked,
            tag,
            format,
        } => {
            let items: Vec<_> = history
                .list()
                .into_iter()
                .filter(|item| !bookmarked || item.bookmarked)
                .filter(|item| tag.as_ref().map_or(true, |t| item.tags.contains(t)))
                .collect();
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&items)?),
                OutputFormat::Text => {
                    for item in &items {
                        let when = chrono::DateTime::from_timestamp_millis(item.timestamp)
                            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                            .unwrap_or_default();
                        let tags: Vec<_> = dorker
                            .tags()
                            .resolve(&item.tags)
                            .into_iter()
                            .map(|t| t.name)
                            .collect();
                        println!(
                            "{} {} [{:?}] {}{}",
                            if item.bookmarked { "★" } else { " " },
                            item.id,
                            item.status,
                            item.query,
                            if tags.is_empty() {
                                String::new()
                            } else {
                                format!("  #{}", tags.join(" #"))
                            }
                        );
                        println!("    {}  {}", when, item.engines.join(", "));
                    }
                }
            }
        }
        HistoryCommand::Show { id } => {
            let item = history
                .get(&id)
                .with_context(|| format!("No history item '{}'", id))?;
            let form: FormState = item.to_form_state();
            println!("{}", serde_json::to_string_pretty(&form)?);
        }
        HistoryCommand::Status { id, status } => history.update_status(&id, status)?,
        HistoryCommand::Tags { id, tags } => history.update_tags(&id, tags)?,
        HistoryCommand::Notes { id, text } => history.update_notes(&id, &text)?,
        HistoryCommand::Bookmark { id } => history.toggle_bookmark(&id)?,
        HistoryCommand::Delete { id } => history.delete(&id)?,
        HistoryCommand::Rerun { id, print } => {
            let report = attach_opener(dorker, print).rerun(&id)?;
            eprintln!(
                "Opened {} of {} tabs (history id {})",
                report.opened(),
                report.urls.len(),
                report.history_id
            );
        }
    }
    Ok(())
}

fn run_tags(dorker: &Dorker, cmd: TagCommand) -> Result<()> {
    let tags = dorker.tags();
    match cmd {
        TagCommand::List => {
            for tag in tags.list() {
                println!("  {:<12} {:<20} {}", tag.id, tag.name, tag.color.as_str());
            }
        }
        TagCommand::Save { id, name, color } => tags.save(Tag::new(id, name, color))?,
        TagCommand::Delete { id } => tags.delete(&id)?,
    }
    Ok(())
}

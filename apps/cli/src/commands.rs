//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Utc;
use clap::{Parser, Subcommand};
use color_eyre::eyre::{Report, Result, WrapErr, eyre};
use guidegen_api::{ApiClient, ApiRequest};
use guidegen_assets::AssetIngestor;
use guidegen_core::pipeline::{GuideOutput, ProgressReporter};
use guidegen_core::{GuideInput, ValidationIssue, generate_guide, validate};
use guidegen_shared::{AppConfig, CategoryMap, GuideError, init_config, load_config};
use guidegen_taxonomy::TaxonomyResolver;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// guidegen: build publishable Snowflake guides from a TOML description.
#[derive(Parser)]
#[command(
    name = "guidegen",
    version,
    about = "Assemble, validate and package Snowflake guides.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Generate a guide archive from an input file.
    Generate {
        /// Guide description (TOML).
        #[arg(short, long)]
        input: PathBuf,

        /// Directory for the archive (defaults to `defaults.output_dir`).
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Skip the taxonomy fetch and use built-in categories only.
        #[arg(long)]
        offline: bool,
    },

    /// Validate an existing guide markdown file.
    Validate {
        /// Markdown file to check.
        #[arg(short, long)]
        file: PathBuf,

        /// Expected guide id.
        #[arg(long)]
        id: String,
    },

    /// Print the resolved category labels and taxonomy paths.
    Categories {
        /// Use built-in categories only.
        #[arg(long)]
        offline: bool,
    },

    /// Check whether a feature can be demonstrated in the learning environment.
    CheckFeature {
        /// Free-text feature description.
        #[arg(required = true, num_args = 1..)]
        description: Vec<String>,
    },

    /// Scan a SQL file for statements the learning environment rejects.
    CheckSql {
        file: PathBuf,
    },

    /// Send a request through the REST API connection.
    Api {
        /// HTTP method.
        method: String,

        /// Path appended to the account URL, e.g. `/api/v2/databases`.
        path: String,

        /// Extra header, `name=value` (repeatable).
        #[arg(long = "header", value_parser = parse_key_val)]
        headers: Vec<(String, String)>,

        /// Query parameter, `name=value` (repeatable).
        #[arg(long = "param", value_parser = parse_key_val)]
        params: Vec<(String, String)>,

        /// JSON request body.
        #[arg(long)]
        body: Option<String>,

        /// Request id sent as `X-Request-GUID` (defaults to a fresh UUID).
        #[arg(long)]
        request_id: Option<String>,

        /// Request timeout in milliseconds (defaults to `api.timeout_ms`).
        #[arg(long)]
        timeout_ms: Option<u64>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

fn parse_key_val(s: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got '{s}'"))?;
    if key.trim().is_empty() {
        return Err(format!("empty name in '{s}'"));
    }
    Ok((key.trim().to_string(), value.to_string()))
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "guidegen=info",
        1 => "guidegen=debug",
        _ => "guidegen=trace",
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Generate {
            input,
            out,
            offline,
        } => cmd_generate(&input, out, offline).await,
        Command::Validate { file, id } => cmd_validate(&file, &id),
        Command::Categories { offline } => cmd_categories(offline).await,
        Command::CheckFeature { description } => cmd_check_feature(&description.join(" ")),
        Command::CheckSql { file } => cmd_check_sql(&file),
        Command::Api {
            method,
            path,
            headers,
            params,
            body,
            request_id,
            timeout_ms,
        } => {
            let mut request = ApiRequest::new(method, path);
            for (name, value) in headers {
                request = request.header(name, value);
            }
            for (name, value) in params {
                request = request.param(name, value);
            }
            if let Some(body) = body {
                let json = serde_json::from_str(&body).wrap_err("--body is not valid JSON")?;
                request = request.body(json);
            }
            request = request
                .request_id(request_id.unwrap_or_else(|| Uuid::now_v7().to_string()));
            cmd_api(request, timeout_ms).await
        }
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn resolve_categories(config: &AppConfig, offline: bool) -> CategoryMap {
    TaxonomyResolver::from(&config.taxonomy)
        .offline(offline || config.taxonomy.offline)
        .resolve()
        .await
}

async fn cmd_generate(input: &Path, out: Option<PathBuf>, offline: bool) -> Result<()> {
    let config = load_config()?;
    let base_dir = input
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let out_dir = out.unwrap_or_else(|| PathBuf::from(&config.defaults.output_dir));

    info!(input = %input.display(), out = %out_dir.display(), "generating guide");

    let guide = GuideInput::load(input)?;

    let reporter = CliProgress::new();
    reporter.phase("Resolving categories");
    let categories = resolve_categories(&config, offline).await;

    let resolved = guide.into_request(base_dir, &categories, &config.defaults, &config.assets);
    let request = match resolved {
        Ok(request) => request,
        Err(GuideError::UnknownCategory(label)) => {
            return Err(reporter.abort(eyre!(
                "unknown product '{label}'; run `guidegen categories` to list valid labels"
            )));
        }
        Err(e) => return Err(reporter.abort(e.into())),
    };

    let ingestor = AssetIngestor::new(&config.assets).map_err(|e| reporter.abort(e.into()))?;
    let work_dir = tempfile::tempdir()
        .wrap_err("cannot create working directory")
        .map_err(|e| reporter.abort(e))?;
    let output = generate_guide(&request, &ingestor, work_dir.path(), &reporter)
        .await
        .map_err(|e| reporter.abort(e.into()))?;

    std::fs::create_dir_all(&out_dir)
        .wrap_err_with(|| format!("cannot create output directory {}", out_dir.display()))?;
    let archive_name = format!(
        "{}_{}.zip",
        output.guide_id,
        Utc::now().format("%Y%m%d_%H%M%S")
    );
    let archive_path = out_dir.join(archive_name);
    std::fs::write(&archive_path, &output.archive)
        .wrap_err_with(|| format!("cannot write {}", archive_path.display()))?;

    // Print summary
    println!();
    if output.issues.is_empty() {
        println!("  Local validation passed (key checks).");
    } else {
        println!("  Validation issues (key CI checks):");
        print_issues(&output.issues);
    }
    if !output.assets.is_empty() {
        println!("  Saved assets:");
        for asset in &output.assets {
            println!("    {} ({} bytes)", asset.relative_path, asset.byte_size);
        }
    }
    println!("  Archive: {}", archive_path.display());
    println!("  SHA-256: {}", output.sha256);
    println!("  Time:    {:.1}s", output.elapsed.as_secs_f64());
    println!();
    println!(
        "  Next: unzip into your fork of the sfguides repo, review {}/{}.md, and open a PR.",
        output.guide_id, output.guide_id
    );

    Ok(())
}

fn cmd_validate(file: &Path, id: &str) -> Result<()> {
    let text = std::fs::read_to_string(file)
        .wrap_err_with(|| format!("cannot read {}", file.display()))?;

    let issues = validate(&text, id);
    if issues.is_empty() {
        println!("Local validation passed (key checks).");
        return Ok(());
    }

    println!("Validation issues (key CI checks):");
    print_issues(&issues);
    Err(eyre!("{} validation issue(s) in {}", issues.len(), file.display()))
}

async fn cmd_categories(offline: bool) -> Result<()> {
    let config = load_config()?;
    let categories = resolve_categories(&config, offline).await;

    let width = categories.labels().map(str::len).max().unwrap_or(0);
    for (label, path) in categories.iter() {
        println!("{label:<width$}  {path}");
    }
    Ok(())
}

fn cmd_check_feature(description: &str) -> Result<()> {
    match guidegen_constraints::check_feature_compatibility(description) {
        Ok(()) => {
            println!("FEATURE COMPATIBLE: Can proceed with template generation");
            println!("Feature: {description}");
            Ok(())
        }
        Err(GuideError::ConstraintViolation { report }) => {
            println!("{report}");
            Err(eyre!("feature is not compatible with the learning environment"))
        }
        Err(e) => Err(e.into()),
    }
}

fn cmd_check_sql(file: &Path) -> Result<()> {
    let sql = std::fs::read_to_string(file)
        .wrap_err_with(|| format!("could not read file {}", file.display()))?;

    let violations = guidegen_constraints::check_sql(&sql);
    println!("{}", guidegen_constraints::sql_report(&violations));

    if violations.is_empty() {
        Ok(())
    } else {
        Err(eyre!("{} SQL constraint violation(s)", violations.len()))
    }
}

async fn cmd_api(request: ApiRequest, timeout_ms: Option<u64>) -> Result<()> {
    let config = load_config()?;
    let client = ApiClient::from_config(&config.api)?;
    let request = request.timeout_ms(timeout_ms.unwrap_or(config.api.timeout_ms));

    let response = client.send_request(&request).await;
    println!("{}", serde_json::to_string_pretty(&response)?);

    if response.is_success() {
        Ok(())
    } else {
        Err(eyre!("API request returned status {}", response.status))
    }
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

fn print_issues(issues: &[ValidationIssue]) {
    for issue in issues {
        println!("    - {issue}");
    }
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        spinner.set_style(style);
        spinner.enable_steady_tick(Duration::from_millis(80));
        Self { spinner }
    }

    /// Clear the spinner before an error propagates.
    fn abort(&self, err: Report) -> Report {
        self.spinner.finish_and_clear();
        err
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn validated(&self, issues: &[ValidationIssue]) {
        if !issues.is_empty() {
            self.spinner
                .set_message(format!("Validation found {} issue(s)", issues.len()));
        }
    }

    fn done(&self, _output: &GuideOutput) {
        self.spinner.finish_and_clear();
    }
}

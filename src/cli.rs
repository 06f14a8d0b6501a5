use anyhow::{Context as _, Result};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use salesclean::pipeline::{
    MissingPolicy, PipelineSpec, SchemaMatchMode, run_pipeline, write_preview,
};
use salesclean::utils::{expand_path_template, resolve_path};
use std::io::Write as _;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "salesclean",
    version,
    about = "Clean a raw sales CSV",
    args_conflicts_with_subcommands = true
)]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Also write rolling log files to this directory
    #[arg(long, env = "SALESCLEAN_LOG_DIR", global = true)]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Running without a subcommand is the same as `clean`
    #[command(flatten)]
    pub clean: CleanArgs,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Clean the raw file and write the processed file
    Clean(CleanArgs),
    /// Print the default pipeline spec as JSON
    Config {
        /// Write the spec to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Args, Clone, Default)]
pub struct CleanArgs {
    /// Raw input file. Defaults to the spec's input path.
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Cleaned output file ({date} expands to today). Defaults to the spec's output path.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Pipeline spec JSON (see `salesclean config`)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Missing-value policy, overriding the spec
    #[arg(long, value_enum)]
    pub policy: Option<PolicyArg>,

    /// Fail when a required column is absent instead of skipping it
    #[arg(long)]
    pub strict: bool,

    /// Rows to show in the preview
    #[arg(long)]
    pub preview_rows: Option<usize>,

    /// Directory relative paths are resolved against
    #[arg(long, env = "SALESCLEAN_BASE_DIR", default_value = ".")]
    pub base_dir: PathBuf,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum PolicyArg {
    /// Fill missing quantity with 0 and missing price with the median
    Impute,
    /// Drop rows missing price or quantity
    Drop,
}

impl From<PolicyArg> for MissingPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Impute => Self::Impute,
            PolicyArg::Drop => Self::Drop,
        }
    }
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Some(Commands::Clean(args)) => handle_clean(&args),
        Some(Commands::Config { output }) => handle_config(output),
        None => handle_clean(&cli.clean),
    }
}

fn handle_clean(args: &CleanArgs) -> Result<()> {
    let spec = build_spec(args)?;

    let input = args
        .input
        .clone()
        .unwrap_or_else(|| PathBuf::from(&spec.input.path));
    let input = resolve_path(&args.base_dir, &input);

    let output = match &args.output {
        Some(o) => expand_output_arg(o),
        None => expand_path_template(&spec.output.path_template),
    };
    let output = resolve_path(&args.base_dir, &output);

    tracing::info!(
        "Cleaning {} -> {} (policy: {})",
        input.display(),
        output.display(),
        spec.missing.as_str()
    );

    let report = run_pipeline(&spec, &input, &output)
        .with_context(|| format!("Failed to clean {}", input.display()))?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    write_preview(&mut out, &report, spec.output.preview_rows)
        .context("Failed to print preview")?;
    out.flush()?;
    Ok(())
}

fn handle_config(output: Option<PathBuf>) -> Result<()> {
    let spec = PipelineSpec::default_sales();
    match output {
        Some(path) => {
            spec.to_file(&path)?;
            tracing::info!("Default spec written to {}", path.display());
        }
        None => {
            let json = spec.to_json()?;
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            writeln!(out, "{json}")?;
        }
    }
    Ok(())
}

/// Expand `{date}` in an `--output` argument. Anything else, including a path
/// that is not valid UTF-8, is passed through untouched.
fn expand_output_arg(path: &Path) -> PathBuf {
    match path.to_str() {
        Some(s) if s.contains("{date}") => expand_path_template(s),
        _ => path.to_path_buf(),
    }
}

/// Load the spec file (or the built-in default) and apply flag overrides.
fn build_spec(args: &CleanArgs) -> Result<PipelineSpec> {
    let mut spec = match &args.config {
        Some(path) => {
            let path = resolve_path(&args.base_dir, path);
            tracing::info!("Loading spec from {}", path.display());
            PipelineSpec::from_file(&path)?
        }
        None => PipelineSpec::default_sales(),
    };

    if let Some(policy) = args.policy {
        spec.missing = policy.into();
    }
    if args.strict {
        spec.schema.match_mode = SchemaMatchMode::Strict;
    }
    if let Some(rows) = args.preview_rows {
        spec.output.preview_rows = rows;
    }
    Ok(spec)
}

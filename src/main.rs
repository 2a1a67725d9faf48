use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use smrt_stress::config::{resolve_path, Config};
use smrt_stress::core::ServiceTarget;
use smrt_stress::exec::ProcessExecutor;
use smrt_stress::log::Logger;
use smrt_stress::run::{check_tools, run, RunOptions};
use smrt_stress::{slog_debug, Result};

/// Stress tool: replays status, import and analysis calls against a
/// SMRT Link server in parallel and reports how many failed
#[derive(Parser, Debug)]
#[command(name = "smrt-stress")]
#[command(version, about, long_about = None)]
#[command(after_help = "ENVIRONMENT:\n    SMRT_STRESS_DEBUG=1     Enable debug logging (alternative to --debug)")]
pub struct Cli {
    /// Host name
    #[arg(long, default_value = "localhost")]
    pub host: String,

    /// Port
    #[arg(long, default_value_t = 8070)]
    pub port: u16,

    /// Number of worker processes to launch
    #[arg(long, default_value_t = 10)]
    pub nprocesses: usize,

    /// Number of iterations; each iteration submits 4 tasks
    #[arg(short = 'x', default_value_t = 5)]
    pub iterations: usize,

    /// Tasks handed to a worker at a time
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Source dataset XML (relative paths resolve against the working directory)
    #[arg(long)]
    pub dataset: Option<String>,

    /// Analysis job JSON
    #[arg(long)]
    pub analysis: Option<String>,

    /// Root directory for staged dataset copies
    #[arg(long)]
    pub output_dir: Option<String>,

    /// TOML configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Abort the run when a dataset copy or UUID rewrite fails
    #[arg(long)]
    pub strict_staging: bool,

    /// Exit with status 1 if any task failed
    #[arg(long)]
    pub fail_on_error: bool,

    /// Print the run summary as JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// Enable debug logging
    #[arg(short = 'd', long)]
    pub debug: bool,

    /// Write log lines to this file instead of stderr
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Merge flags over the config file.
    fn apply_to(&self, config: &mut Config) {
        if let Some(batch_size) = self.batch_size {
            config.batch_size = Some(batch_size);
        }
        if let Some(dataset) = &self.dataset {
            config.dataset = Some(dataset.clone());
        }
        if let Some(analysis) = &self.analysis {
            config.analysis = Some(analysis.clone());
        }
        if let Some(output_dir) = &self.output_dir {
            config.output_dir = Some(output_dir.clone());
        }
        config.strict_staging |= self.strict_staging;
        config.fail_on_error |= self.fail_on_error;
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let logger = Logger::from_env(cli.debug, cli.log_file.clone());

    let mut config = Config::load_or_default(cli.config.as_deref(), &logger)?;
    cli.apply_to(&mut config);
    slog_debug!(logger, "Effective config: {:?}", config);

    let cwd = std::env::current_dir()?;
    let opts = RunOptions {
        target: ServiceTarget::new(cli.host.clone(), cli.port),
        workers: cli.nprocesses,
        iterations: cli.iterations,
        batch_size: config.effective_batch_size(),
        dataset: resolve_path(config.effective_dataset(), &cwd),
        analysis: resolve_path(config.effective_analysis(), &cwd),
        output_root: resolve_path(config.effective_output_dir(), &cwd),
        tools: config.tools(),
        staging_policy: config.staging_policy(),
    };
    check_tools(&opts.tools, &logger);

    let executor = Arc::new(ProcessExecutor::new(logger.clone()));
    let rt = tokio::runtime::Runtime::new()?;
    let summary = rt.block_on(run(&opts, executor, &logger))?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }

    let code = config.exit_policy().exit_code(summary.failed());
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};

use grove_core::kernel::constants;
use grove_core::{AddonInstance, Application, HostConfig, KernelResult};

/// Grove: order and instantiate a project's addons
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Configuration file (JSON, YAML or TOML)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the order in which the project's addons would be instantiated
    Order {
        /// Project directory
        dir: PathBuf,
    },
    /// Instantiate the project's addons and print the resulting tree
    Tree {
        /// Project directory
        dir: PathBuf,
    },
}

impl CliArgs {
    /// Default log filter for the requested verbosity
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }

    fn project_dir(&self) -> &Path {
        match &self.command {
            Command::Order { dir } | Command::Tree { dir } => dir,
        }
    }

    /// Explicit `--config`, else `grove.toml` in the project directory, else defaults
    pub fn host_config(&self) -> KernelResult<HostConfig> {
        if let Some(path) = &self.config {
            return Ok(HostConfig::load(path)?);
        }
        let project_config = self.project_dir().join(constants::CONFIG_FILE_NAME);
        if project_config.is_file() {
            log::info!("Using project configuration {}", project_config.display());
            return Ok(HostConfig::load(&project_config)?);
        }
        Ok(HostConfig::default())
    }

    /// Run the selected command and return what should go to stdout
    pub fn run(&self) -> KernelResult<String> {
        let app = Application::with_default_loader(self.host_config()?);
        match &self.command {
            Command::Order { dir } => {
                let mut out = String::new();
                for name in app.resolve_order(dir)? {
                    let _ = writeln!(out, "{}", name);
                }
                Ok(out)
            }
            Command::Tree { dir } => {
                let instances = app.load_addons(dir)?;
                Ok(render_tree(&instances))
            }
        }
    }
}

/// One line per addon, nested addons indented under their parent
pub fn render_tree(instances: &[Arc<AddonInstance>]) -> String {
    let mut out = String::new();
    for instance in instances {
        render_instance(&mut out, instance, 0);
    }
    out
}

fn render_instance(out: &mut String, instance: &AddonInstance, depth: usize) {
    let timing = instance
        .meta()
        .initialize_in()
        .map(format_duration)
        .unwrap_or_else(|| "?".to_string());
    let _ = writeln!(
        out,
        "{}{} ({}) [{}]",
        "  ".repeat(depth),
        instance.name(),
        timing,
        instance.meta().module_path().display()
    );
    for child in instance.addons() {
        render_instance(out, child, depth + 1);
    }
}

fn format_duration(duration: Duration) -> String {
    format!("{:.3}ms", duration.as_secs_f64() * 1000.0)
}

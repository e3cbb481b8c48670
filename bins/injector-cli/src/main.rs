mod dispatcher;
mod fixtures;
mod payload;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use injector_common::config::InjectorConfig;
use injector_common::types::Language;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "injector")]
#[command(about = "Injector - Fire concurrent compile jobs at an online judge compile service", long_about = None)]
struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true, default_value = "false")]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
struct PayloadArgs {
    /// Root of the fixture tree (inputs/, expected-outputs/, source-code/)
    #[arg(short, long)]
    fixtures_dir: Option<PathBuf>,

    /// Restrict to these languages (c, cpp, java, python); repeatable
    #[arg(short, long = "language")]
    languages: Vec<Language>,

    /// Memory limit sent with each job
    #[arg(long)]
    memory_limit: Option<u32>,

    /// Time limit sent with each job
    #[arg(long)]
    time_limit: Option<u32>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the payloads and post them to the compile service
    Run {
        #[command(flatten)]
        payload: PayloadArgs,

        /// Compile endpoint URL
        #[arg(short, long)]
        url: Option<String>,

        /// Number of dispatch rounds (one request per language each round)
        #[arg(short, long)]
        iterations: Option<u32>,

        /// Maximum requests in flight
        #[arg(short, long)]
        concurrency: Option<usize>,
    },

    /// Print the payloads as JSON without sending anything
    Payloads {
        #[command(flatten)]
        payload: PayloadArgs,
    },
}

impl PayloadArgs {
    fn apply(&self, config: &mut InjectorConfig) {
        if let Some(dir) = &self.fixtures_dir {
            config.fixtures_dir = dir.clone();
        }
        if let Some(memory_limit) = self.memory_limit {
            config.limits.memory_limit = memory_limit;
        }
        if let Some(time_limit) = self.time_limit {
            config.limits.time_limit = time_limit;
        }
    }
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

/// Load fixtures and build the payloads selected by `args`
fn prepare_payloads(
    config: &InjectorConfig,
    args: &PayloadArgs,
) -> Result<Vec<injector_common::types::CompileRequest>> {
    let fixture_set = fixtures::load_all(&config.fixtures_dir).with_context(|| {
        format!(
            "Failed to load fixtures from {}",
            config.fixtures_dir.display()
        )
    })?;
    info!(fixtures_dir = %config.fixtures_dir.display(), "Loaded fixtures");

    Ok(payload::build_payloads(&fixture_set, config.limits, &args.languages))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    let mut config = InjectorConfig::from_env()?;

    match cli.command {
        Commands::Run {
            payload,
            url,
            iterations,
            concurrency,
        } => {
            payload.apply(&mut config);
            if let Some(url) = url {
                config.target_url = url;
            }
            if let Some(iterations) = iterations {
                config.iterations = iterations;
            }
            if let Some(concurrency) = concurrency {
                config.concurrency = concurrency;
            }
            config.validate()?;

            info!("Injector booting...");
            info!(
                url = %config.target_url,
                iterations = config.iterations,
                concurrency = config.concurrency,
                memory_limit = config.limits.memory_limit,
                time_limit = config.limits.time_limit,
                "Load profile"
            );

            let payloads = prepare_payloads(&config, &payload)?;
            info!(
                languages = ?payloads.iter().map(|p| p.language).collect::<Vec<_>>(),
                "Payloads ready"
            );

            dispatcher::run(&config, payloads).await?;
        }
        Commands::Payloads { payload } => {
            payload.apply(&mut config);
            let payloads = prepare_payloads(&config, &payload)?;
            let json = serde_json::to_string_pretty(&payloads)
                .context("Failed to serialize payloads")?;
            println!("{}", json);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_flags_parse() {
        let cli = Cli::try_parse_from([
            "injector",
            "run",
            "--url",
            "http://judge:8080/api/compile/json",
            "--iterations",
            "5",
            "--concurrency",
            "4",
            "-l",
            "python",
            "--language",
            "c",
        ])
        .unwrap();

        match cli.command {
            Commands::Run {
                payload,
                url,
                iterations,
                concurrency,
            } => {
                assert_eq!(url.as_deref(), Some("http://judge:8080/api/compile/json"));
                assert_eq!(iterations, Some(5));
                assert_eq!(concurrency, Some(4));
                assert_eq!(payload.languages, vec![Language::Python, Language::C]);
            }
            Commands::Payloads { .. } => panic!("expected run command"),
        }
    }

    #[test]
    fn test_unknown_language_rejected() {
        assert!(Cli::try_parse_from(["injector", "payloads", "-l", "cobol"]).is_err());
    }

    #[test]
    fn test_payload_args_override_config() {
        let args = PayloadArgs {
            fixtures_dir: Some(PathBuf::from("/tmp/fixtures")),
            languages: vec![],
            memory_limit: Some(512),
            time_limit: None,
        };
        let mut config = InjectorConfig::default();
        args.apply(&mut config);

        assert_eq!(config.fixtures_dir, PathBuf::from("/tmp/fixtures"));
        assert_eq!(config.limits.memory_limit, 512);
        assert_eq!(config.limits.time_limit, 15);
    }
}

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use tracing::{debug, error, trace};

use s3purge_rs::config::Config;
use s3purge_rs::types::RunMode;
use s3purge_rs::{CLIArgs, PurgePipeline, exit_code_from_error};

mod tracing_init;

const EXIT_CODE_PARTIAL_FAILURE: i32 = 3;

/// s3purge - Empty versioned Amazon S3 buckets as a deployment-lifecycle step.
///
/// This binary is a thin wrapper over the s3purge-rs library.
/// All core functionality is implemented in the library crate.
#[tokio::main]
async fn main() -> Result<()> {
    let (config, mode) = load_config_exit_if_err();

    if let Some(shell) = config.auto_complete_shell {
        generate(
            shell,
            &mut CLIArgs::command(),
            "s3purge",
            &mut std::io::stdout(),
        );

        return Ok(());
    }

    start_tracing_if_necessary(&config);

    trace!("config = {:?}", config);

    run(config, mode).await
}

fn load_config_exit_if_err() -> (Config, RunMode) {
    let args = CLIArgs::parse();
    let mode = args.mode;

    match Config::try_from(args) {
        Ok(config) => (config, mode),
        Err(error_message) => {
            clap::Error::raw(clap::error::ErrorKind::ValueValidation, error_message).exit()
        }
    }
}

fn start_tracing_if_necessary(config: &Config) -> bool {
    if config.tracing_config.is_none() {
        return false;
    }

    tracing_init::init_tracing(config.tracing_config.as_ref().unwrap());
    true
}

async fn run(config: Config, mode: RunMode) -> Result<()> {
    let start_time = tokio::time::Instant::now();
    debug!("purge run start.");

    let pipeline = PurgePipeline::new(config).await;
    if let Err(e) = pipeline.run(mode).await {
        error!("{:#}", e);
        std::process::exit(exit_code_from_error(&e));
    }

    let duration_sec = format!("{:.3}", start_time.elapsed().as_secs_f32());
    let stats = pipeline.stats();

    if stats.buckets_failed > 0 {
        error!(
            duration_sec = duration_sec,
            failed = stats.buckets_failed,
            "s3purge finished with failures."
        );
        std::process::exit(EXIT_CODE_PARTIAL_FAILURE);
    }

    debug!(duration_sec = duration_sec, "s3purge has been completed.");

    Ok(())
}

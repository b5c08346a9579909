mod pipelines;
mod utils;
mod config;
mod cli;

use std::env;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Result;
use log::{LevelFilter, debug, info, error};
use env_logger::Builder;
use crate::cli::{parse, Module};
use crate::config::defs::{RunConfig, PipelineError, CLUSENSE_OUT_DIR, AMPLICON_OUT_DIR, HBAR_OUT_DIR};
use crate::utils::report::LogReporter;
use pipelines::{amplicon, clusense, hbar};


#[tokio::main]
async fn main() -> Result<()> {
    let run_start = Instant::now();

    let args = parse();

    let log_level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    Builder::new()
        .filter_level(log_level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] {}: {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .init();

    let dir = env::current_dir()?;
    info!("The current directory is {:?}", dir);

    let module = args.module;
    let out_dir = setup_output_dir(args.out_dir.as_deref(), module, &dir);
    debug!("Output directory: {:?}", out_dir);

    let run_config = RunConfig {
        cwd: dir,
        out_dir,
        args,
        log_level,
    };
    debug!("Log level: {}", run_config.log_level);

    if let Err(e) = match module {
        Module::CombineClusense => combine_clusense_run(&run_config),
        Module::SummarizeAmplicons => summarize_amplicons_run(&run_config),
        Module::Hbar => hbar_run(&run_config).await,
    } {
        error!("Pipeline failed: {} at {} milliseconds.", e, run_start.elapsed().as_millis());
        std::process::exit(1);
    }

    info!("Run complete: {} milliseconds.", run_start.elapsed().as_millis());
    Ok(())
}


fn combine_clusense_run(run_config: &RunConfig) -> Result<(), PipelineError> {
    let input = resolve(&run_config.args.input, &run_config.cwd);
    let (cns, reads) = clusense::combine_clusense_output(&input, &run_config.out_dir, &LogReporter)?;
    info!("Consensus manifest: {:?}", cns);
    info!("Read manifest: {:?}", reads);
    Ok(())
}

fn summarize_amplicons_run(run_config: &RunConfig) -> Result<(), PipelineError> {
    let input = resolve(&run_config.args.input, &run_config.cwd);
    let manifest = amplicon::summarize_amp_analysis(&input, &run_config.out_dir, &LogReporter)?;
    info!("Amplicon Assembly manifest: {:?}", manifest);
    Ok(())
}

async fn hbar_run(run_config: &RunConfig) -> Result<(), PipelineError> {
    let args = &run_config.args;
    if let Some(score) = args.min_score {
        if !(0.0..=1.0).contains(&score) {
            return Err(PipelineError::InvalidConfig(format!("--min-score must be within [0, 1], got {}", score)));
        }
    }
    let config_file = args.config_file.as_ref().map(|c| resolve(c, &run_config.cwd));
    let mut runner = hbar::HbarRunner::new(
        resolve(&args.input, &run_config.cwd),
        run_config.out_dir.clone(),
        config_file,
        args.min_length,
        args.min_score,
        &LogReporter,
    );
    if let Some(executable) = &args.hbar_executable {
        runner = runner.with_executable(executable);
    }
    runner.run().await
}


/// Resolves the output directory.
/// If `out_dir` is given it is used, relative paths joined to `cwd`;
/// otherwise a per-module folder under `cwd` is used.
/// The directory is created by the pipeline itself.
fn setup_output_dir(out_dir: Option<&str>, module: Module, cwd: &Path) -> PathBuf {
    match out_dir {
        Some(out) => resolve(out, cwd),
        None => {
            let default_dir = match module {
                Module::CombineClusense => CLUSENSE_OUT_DIR,
                Module::SummarizeAmplicons => AMPLICON_OUT_DIR,
                Module::Hbar => HBAR_OUT_DIR,
            };
            cwd.join(default_dir)
        }
    }
}

fn resolve(path: &str, cwd: &Path) -> PathBuf {
    let path = PathBuf::from(path);
    if path.is_absolute() {
        path
    } else {
        cwd.join(path)
    }
}

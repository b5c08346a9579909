// src/pipelines/hbar.rs: Writes the HBAR configuration and runs the workflow once

use std::fs;
use std::path::{Path, PathBuf};
use crate::config::defs::{PipelineError, HBAR_TAG, HBAR_CONFIG_FILE, HBAR_LOG_FILE, MIN_LENGTH, MIN_SCORE, SEYMOUR_HOME};
use crate::utils::command::run_workflow;
use crate::utils::file::create_directory;
use crate::utils::report::Reporter;


pub struct HbarRunner<'a> {
    pub input_file: PathBuf,
    pub output_dir: PathBuf,
    pub config_file: Option<PathBuf>,
    pub min_length: usize,
    pub min_score: f64,
    pub executable: String,
    reporter: &'a dyn Reporter,
}

impl<'a> HbarRunner<'a> {
    pub fn new(
        input_file: PathBuf,
        output_dir: PathBuf,
        config_file: Option<PathBuf>,
        min_length: Option<usize>,
        min_score: Option<f64>,
        reporter: &'a dyn Reporter,
    ) -> Self {
        let runner = HbarRunner {
            input_file,
            output_dir,
            config_file,
            min_length: min_length.unwrap_or(MIN_LENGTH),
            min_score: min_score.unwrap_or(MIN_SCORE),
            executable: HBAR_TAG.to_string(),
            reporter,
        };
        runner.reporter.info("Initializing HbarRunner with the following:");
        runner.reporter.info(&format!("\tInput: {:?}", runner.input_file));
        runner.reporter.info(&format!("\tOutput: {:?}", runner.output_dir));
        runner.reporter.info(&format!("\tConfig: {:?}", runner.config_file));
        runner.reporter.info(&format!("\tLog: {:?}", runner.log_path()));
        runner.reporter.info(&format!("\tMinimum Length: {}", runner.min_length));
        runner.reporter.info(&format!("\tMinimum Score: {}", runner.min_score));
        runner
    }

    /// Swaps the workflow executable, e.g. for a full path to HBAR_WF2.py.
    pub fn with_executable(mut self, executable: &str) -> Self {
        self.executable = executable.to_string();
        self
    }

    pub fn config_path(&self) -> PathBuf {
        self.output_dir.join(HBAR_CONFIG_FILE)
    }

    pub fn log_path(&self) -> PathBuf {
        self.output_dir.join(HBAR_LOG_FILE)
    }

    pub async fn run(&self) -> Result<(), PipelineError> {
        let config = self.write_config()?;
        self.run_hbar(&config).await
    }

    /// Copies the supplied configuration, or renders one from the runner's options.
    pub fn write_config(&self) -> Result<PathBuf, PipelineError> {
        create_directory(&self.output_dir)?;
        let config_output = self.config_path();
        self.reporter.info(&format!("Writing HBAR configuration to {:?}", config_output));
        match &self.config_file {
            Some(existing) => {
                let source = existing.canonicalize().map_err(|e| PipelineError::io(existing, e))?;
                let same_file = config_output.canonicalize().is_ok_and(|dest| dest == source);
                if same_file {
                    self.reporter.info(&format!("Existing configuration {:?} is already in place", existing));
                } else {
                    self.reporter.info(&format!("Copying existing configuration from {:?}", existing));
                    fs::copy(existing, &config_output).map_err(|e| PipelineError::io(existing, e))?;
                }
            }
            None => {
                self.reporter.info("Creating new configuration from options");
                fs::write(&config_output, self.hgap_config()).map_err(|e| PipelineError::io(&config_output, e))?;
            }
        }
        Ok(config_output)
    }

    pub async fn run_hbar(&self, config: &Path) -> Result<(), PipelineError> {
        self.reporter.info("Running HBAR Workflow");
        run_workflow(&self.executable, config, &self.log_path()).await?;
        self.reporter.info("HBAR completed successfully");
        Ok(())
    }

    pub fn hgap_config(&self) -> String {
        let lines = [
            "[General]".to_string(),
            "#list of files of the initial bas.h5 files".to_string(),
            format!("input_fofn = {}", self.input_file.display()),
            "#The length cutoff used for seed reads".to_string(),
            format!("length_cutoff = {}", self.min_length),
            "#The length cutoff used for pre-assembly".to_string(),
            format!("length_cutoff_pr = {}", self.min_length),
            "#The read quality cutoff used for seed reads".to_string(),
            format!("RQ_threshold = {}", self.min_score),
            "#SGE job option for distributed mapping".to_string(),
            "sge_option_dm = -pe smp 16 -q secondary".to_string(),
            "#SGE job option for pre-assembly".to_string(),
            "sge_option_qf = -pe smp 16 -q secondary".to_string(),
            "#SGE job option for pre-assembly".to_string(),
            "sge_option_pa = -pe smp 16 -q secondary".to_string(),
            "#SGE job option for CA".to_string(),
            "sge_option_ca = -pe smp 16 -q secondary".to_string(),
            "#SGE job option for Quiver".to_string(),
            "sge_option_qv = -pe smp 16 -q secondary".to_string(),
            "#SGE job option for \"qsub -sync y\" to sync stage".to_string(),
            "sge_option_ck = -pe smp 1 -q secondary".to_string(),
            "# Options for blasr mapping".to_string(),
            "blasr_opt = -nCandidates 32 -minMatch 12 -maxLCPLength 15 -bestn 24 -minPctIdentity 75.0 -maxScore -1000 -nproc 16".to_string(),
            "#This is used for running quiver".to_string(),
            format!("SEYMOUR_HOME = {}", SEYMOUR_HOME),
            "#The number of best alignment hits used for pre-assembly".to_string(),
            "#It should be about the same as the final PLR coverage, slight higher might be OK.".to_string(),
            "bestn = 32".to_string(),
            "# target choices are \"pre_assembly\", \"draft_assembly\", \"all\"".to_string(),
            "# \"pre_assembly\" : generate pre_assembly for any long read assembler to use".to_string(),
            "# \"draft_assembly\": automatic submit CA assembly job when pre-assembly is done".to_string(),
            "# \"all\" : submit job for using Quiver to do final polish".to_string(),
            "target = draft_assembly".to_string(),
            "# number of chunks for distributed mapping".to_string(),
            "preassembly_num_chunk = 8".to_string(),
            "# number of chunks for pre-assembly".to_string(),
            "dist_map_num_chunk = 6".to_string(),
            "# Multi-file chunking parameters".to_string(),
            "q_chunk_size = 5".to_string(),
            "t_chunk_size = 10".to_string(),
            "# \"tmpdir\" is for preassembly, better in a ramdisk".to_string(),
            "tmpdir = /tmp".to_string(),
            "# \"big_tmpdir\" is for quiver, better in a big disk".to_string(),
            "big_tmpdir = /tmp".to_string(),
            "# Other parameters".to_string(),
            "min_cov = 8".to_string(),
            "max_cov = 100".to_string(),
            "trim_align = 1".to_string(),
            "trim_plr = 1".to_string(),
            "q_nproc = 16".to_string(),
        ];
        let mut config = lines.join("\n");
        config.push('\n');
        config
    }
}

use std::path::PathBuf;
use log::LevelFilter;
use thiserror::Error;
use crate::cli::Arguments;

// External software
pub const HBAR_TAG: &str = "HBAR_WF2.py";

// Static Filenames
pub const CNS_FOFN: &str = "Clusense_Consensus_Files.txt";
pub const READ_FOFN: &str = "Clusense_Read_Files.txt";
pub const AMP_FOFN: &str = "AmpliconAssembly_Results.fofn";
pub const AMP_RESULT_FILE: &str = "amplicon_analysis.fasta";
pub const HBAR_CONFIG_FILE: &str = "HLA_HBAR.cfg";
pub const HBAR_LOG_FILE: &str = "HLA_HBAR.log";

// Clusense naming: group_<NN>_cns.fa / group_<NN>.fa
pub const CLUSTER_PREFIX: &str = "group_";
pub const CLUSTER_CNS_SUFFIX: &str = "_cns.fa";
pub const CLUSTER_READ_SUFFIX: &str = ".fa";
pub const FASTA_OUT_EXT: &str = "fasta";
pub const NAME_DELIMITER: char = '_';

// Default output folders, relative to the working directory
pub const CLUSENSE_OUT_DIR: &str = "clusense_results";
pub const AMPLICON_OUT_DIR: &str = "amplicon_results";
pub const HBAR_OUT_DIR: &str = "hbar";

// Static Parameters
pub const MIN_LENGTH: usize = 2500;
pub const MIN_SCORE: f64 = 0.80;
pub const FASTA_LINE_WIDTH: usize = 60;
pub const SEYMOUR_HOME: &str = "/mnt/secondary/Smrtpipe/builds/Assembly_Mainline_Nightly_Archive/build470-116466/";


#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed name '{name}': {reason}")]
    MalformedName { name: String, reason: String },

    #[error("Invalid FASTA format in {path:?}: {error}")]
    InvalidFastaFormat { path: PathBuf, error: String },

    #[error("Tool {tool} failed: {error}")]
    ToolExecution { tool: String, error: String },
}

impl PipelineError {
    pub fn io<P: Into<PathBuf>>(path: P, source: std::io::Error) -> Self {
        PipelineError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn malformed<N: Into<String>, R: Into<String>>(name: N, reason: R) -> Self {
        PipelineError::MalformedName {
            name: name.into(),
            reason: reason.into(),
        }
    }
}


pub struct RunConfig  {
    pub cwd: PathBuf,
    pub out_dir: PathBuf,
    pub args: Arguments,
    pub log_level: LevelFilter,
}

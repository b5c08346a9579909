use clap::{Parser, ValueEnum};

#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq)]
pub enum Module {
    #[default]
    #[value(name = "combine_clusense")]
    CombineClusense,
    #[value(name = "summarize_amplicons")]
    SummarizeAmplicons,
    #[value(name = "hbar")]
    Hbar,
}

#[derive(Parser, Debug, Clone, Default)]
#[command(name = "hla-pipelines", version, about = "Consolidates Clusense and Amplicon Assembly output, and drives the HBAR workflow")]
pub struct Arguments {

    #[arg(short, long, value_enum)]
    pub module: Module,

    #[arg(short = 'v', long = "verbose", action)]
    pub verbose: bool,

    #[arg(short = 'i', long = "input", help = "Input directory, or the input FOFN for the hbar module")]
    pub input: String,

    #[arg(short = 'o', long = "out", help = "Output directory. If not specified, a per-module directory is created in the current working directory.")]
    pub out_dir: Option<String>,

    #[arg(short = 'c', long = "config", help = "Existing HBAR configuration to copy instead of generating one")]
    pub config_file: Option<String>,

    #[arg(long, help = "Length cutoff for seed reads (hbar)")]
    pub min_length: Option<usize>,

    #[arg(long, help = "Read quality cutoff for seed reads (hbar)")]
    pub min_score: Option<f64>,

    #[arg(long, help = "Path to the HBAR workflow script; defaults to HBAR_WF2.py on $PATH (hbar)")]
    pub hbar_executable: Option<String>,
}

pub fn parse() -> Arguments {
    Arguments::parse()
}

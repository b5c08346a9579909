// src/pipelines/clusense.rs: Gathers per-cluster Clusense output into one folder

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use crate::config::defs::{
    PipelineError, CNS_FOFN, READ_FOFN, CLUSTER_PREFIX, CLUSTER_CNS_SUFFIX, CLUSTER_READ_SUFFIX,
    FASTA_OUT_EXT, NAME_DELIMITER,
};
use crate::utils::fastx::copy_fasta;
use crate::utils::file::{base_name, copy_file, create_directory, name_token, parent_name, write_list_file};
use crate::utils::report::Reporter;


/// Consensus (summary) file and read (support) file for one cluster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterPair {
    pub consensus: PathBuf,
    pub reads: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterRecord {
    pub consensus: PathBuf,
    pub reads: PathBuf,
    pub cluster_index: usize,
    pub parent_label: String,
}


/// Looks for `group_<NN>_cns.fa` and `group_<NN>.fa` directly inside `dir`.
/// Both must be regular files, otherwise the cluster is absent.
pub fn cluster_pair_exists(dir: &Path, cluster: usize) -> Option<ClusterPair> {
    let consensus = dir.join(format!("{}{:02}{}", CLUSTER_PREFIX, cluster, CLUSTER_CNS_SUFFIX));
    let reads = dir.join(format!("{}{:02}{}", CLUSTER_PREFIX, cluster, CLUSTER_READ_SUFFIX));
    if consensus.is_file() && reads.is_file() {
        Some(ClusterPair { consensus, reads })
    } else {
        None
    }
}

pub fn is_cluster_dir(path: &Path) -> bool {
    path.is_dir() && cluster_pair_exists(path, 1).is_some()
}


/// Identifies Clusense output folders.
///
/// Immediate subdirectories of `input_dir` holding cluster 01 are returned. If none
/// qualify but `input_dir` itself does, it is returned alone; otherwise the set is empty.
///
/// # Arguments
///
/// * `input_dir` - Folder to scan.
/// * `reporter` - Progress sink.
///
/// # Returns
/// Deduplicated set of Clusense output folders.
///
pub fn find_cluster_dirs(input_dir: &Path, reporter: &dyn Reporter) -> Result<BTreeSet<PathBuf>, PipelineError> {
    reporter.info(&format!("Identifying individual Clusense output folders in {:?}", input_dir));

    let mut cluster_dirs = BTreeSet::new();
    let entries = fs::read_dir(input_dir).map_err(|e| PipelineError::io(input_dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| PipelineError::io(input_dir, e))?;
        let entry_path = entry.path();
        if is_cluster_dir(&entry_path) {
            cluster_dirs.insert(entry_path);
        }
    }

    if !cluster_dirs.is_empty() {
        reporter.info(&format!("Identified {} Clusense output folders", cluster_dirs.len()));
    } else if is_cluster_dir(input_dir) {
        reporter.info("Identified 1 Clusense output folder");
        cluster_dirs.insert(input_dir.to_path_buf());
    } else {
        reporter.info("Identified 0 Clusense output folders!");
    }
    Ok(cluster_dirs)
}


/// Probes clusters 1, 2, 3, ... in each folder and stops at the first missing pair.
/// Later clusters after a gap are never reported.
pub fn find_cluster_records<'a, I>(cluster_dirs: I, reporter: &dyn Reporter) -> Result<Vec<ClusterRecord>, PipelineError>
where
    I: IntoIterator<Item = &'a PathBuf>,
{
    reporter.info("Identifying individual Clusense clusters from identified output folders");

    let mut records = Vec::new();
    for dir in cluster_dirs {
        let mut cluster = 1;
        while let Some(pair) = cluster_pair_exists(dir, cluster) {
            let parent_label = parent_name(&pair.consensus)?;
            reporter.debug(&format!("Found cluster {:02} in {:?}", cluster, dir));
            records.push(ClusterRecord {
                consensus: pair.consensus,
                reads: pair.reads,
                cluster_index: cluster,
                parent_label,
            });
            cluster += 1;
        }
    }

    reporter.info(&format!("Identified {} individual Clusense clusters", records.len()));
    Ok(records)
}


/// Copies each cluster into `output_dir` and writes both manifests.
///
/// Consensus files become `<contig>_<cluster>_cns.fasta` with every header renamed to the
/// file stem; read files become `<contig>_<cluster>.fasta`, copied byte for byte.
///
/// # Returns
/// (consensus manifest path, read manifest path)
///
pub fn consolidate(records: &[ClusterRecord], output_dir: &Path, reporter: &dyn Reporter) -> Result<(PathBuf, PathBuf), PipelineError> {
    create_directory(output_dir)?;
    reporter.info(&format!("Outputting high-quality clusters to {:?}", output_dir));

    let mut cns_files = Vec::with_capacity(records.len());
    let mut read_files = Vec::with_capacity(records.len());
    for record in records {
        let consensus_name = base_name(&record.consensus)?;
        let cluster = name_token(&consensus_name, NAME_DELIMITER, 1, true)?;
        let contig_name = &record.parent_label;

        let cns_name = format!("{}_{}_cns", contig_name, cluster);
        let cns_path = output_dir.join(format!("{}.{}", cns_name, FASTA_OUT_EXT));
        copy_fasta(&record.consensus, &cns_path, &cns_name)?;
        cns_files.push(cns_path);

        let read_path = output_dir.join(format!("{}_{}.{}", contig_name, cluster, FASTA_OUT_EXT));
        copy_file(&record.reads, &read_path)?;
        read_files.push(read_path);
    }
    reporter.info("Finished outputting high-quality clusters");

    let cns_output = output_dir.join(CNS_FOFN);
    reporter.info(&format!("Outputting file-list to {:?}", cns_output));
    write_list_file(&cns_files, &cns_output)?;

    let read_output = output_dir.join(READ_FOFN);
    reporter.info(&format!("Outputting file-list to {:?}", read_output));
    write_list_file(&read_files, &read_output)?;

    Ok((cns_output, read_output))
}


/// Full Clusense combine: discover folders, discover clusters, copy, write manifests.
pub fn combine_clusense_output(input_dir: &Path, output_dir: &Path, reporter: &dyn Reporter) -> Result<(PathBuf, PathBuf), PipelineError> {
    create_directory(output_dir)?;
    reporter.info(&format!("Combining Clusense output from {:?} in {:?}", input_dir, output_dir));

    let cluster_dirs = find_cluster_dirs(input_dir, reporter)?;
    let records = find_cluster_records(&cluster_dirs, reporter)?;
    consolidate(&records, output_dir, reporter)
}

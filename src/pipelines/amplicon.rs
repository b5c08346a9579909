// src/pipelines/amplicon.rs: Collects Amplicon Assembly results, one per locus folder

use std::fs::{self, ReadDir};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use crate::config::defs::{PipelineError, AMP_FOFN, AMP_RESULT_FILE, FASTA_OUT_EXT, NAME_DELIMITER};
use crate::utils::file::{copy_file, create_directory, name_token, parent_name, write_list_file};
use crate::utils::report::Reporter;


#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRecord {
    pub result: PathBuf,
    pub locus: String,
}


/// Single-pass iterator over one listing of an Amplicon Assembly root.
///
/// Yields `<subdir>/amplicon_analysis.fasta` for every immediate subdirectory holding that
/// file. It cannot be rewound; call `find_results` again to rescan the file system.
pub struct AmpliconResults<'a> {
    root: PathBuf,
    entries: ReadDir,
    count: usize,
    finished: bool,
    reporter: &'a dyn Reporter,
}

impl Iterator for AmpliconResults<'_> {
    type Item = Result<PathBuf, PipelineError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        for entry in self.entries.by_ref() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    self.finished = true;
                    return Some(Err(PipelineError::io(&self.root, e)));
                }
            };
            match result_in_dir(&entry.path()) {
                Ok(Some(result_path)) => {
                    self.count += 1;
                    return Some(Ok(result_path));
                }
                Ok(None) => continue,
                Err(e) => {
                    self.finished = true;
                    return Some(Err(e));
                }
            }
        }
        self.finished = true;
        self.reporter.info(&format!("Identified {} individual Amplicon Assembly results", self.count));
        None
    }
}


/// `Some(<entry>/amplicon_analysis.fasta)` when `entry` is a folder holding that file.
/// A missing entry or file is not an error; any other stat failure is.
fn result_in_dir(entry_path: &Path) -> Result<Option<PathBuf>, PipelineError> {
    match fs::metadata(entry_path) {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => return Ok(None),
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(PipelineError::io(entry_path, e)),
    }
    let result_path = entry_path.join(AMP_RESULT_FILE);
    match fs::metadata(&result_path) {
        Ok(meta) if meta.is_file() => Ok(Some(result_path)),
        Ok(_) => Ok(None),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(PipelineError::io(result_path, e)),
    }
}


/// Starts a scan of `directory` for Amplicon Assembly results.
pub fn find_results<'a>(directory: &Path, reporter: &'a dyn Reporter) -> Result<AmpliconResults<'a>, PipelineError> {
    reporter.info("Identifying individual Amplicon Assembly results");
    let entries = fs::read_dir(directory).map_err(|e| PipelineError::io(directory, e))?;
    Ok(AmpliconResults {
        root: directory.to_path_buf(),
        entries,
        count: 0,
        finished: false,
        reporter,
    })
}


/// Locus is the second `_`-separated token of the folder holding the result,
/// e.g. `locus_DQB1_1/amplicon_analysis.fasta` gives `DQB1`.
pub fn locus_from_result(result: &Path) -> Result<ResultRecord, PipelineError> {
    let folder_name = parent_name(result)?;
    let locus = name_token(&folder_name, NAME_DELIMITER, 1, false)?;
    Ok(ResultRecord {
        result: result.to_path_buf(),
        locus,
    })
}


/// Copies each result to `output_dir/amplicon_analysis_<locus>.fasta` and writes the FOFN.
/// The first failure stops the run; files already copied are left in place.
///
/// # Returns
/// Path of the written manifest.
///
pub fn consolidate<I>(results: I, output_dir: &Path, reporter: &dyn Reporter) -> Result<PathBuf, PipelineError>
where
    I: IntoIterator<Item = Result<PathBuf, PipelineError>>,
{
    create_directory(output_dir)?;
    reporter.info("Outputting Amplicon Assembly results");

    let mut output_files = Vec::new();
    for result in results {
        let record = locus_from_result(&result?)?;
        let output_path = output_dir.join(format!("amplicon_analysis_{}.{}", record.locus, FASTA_OUT_EXT));
        copy_file(&record.result, &output_path)?;
        reporter.debug(&format!("Copied {:?} to {:?}", record.result, output_path));
        output_files.push(output_path);
    }
    reporter.info("Finished outputting Amplicon Assembly results");

    let result_output = output_dir.join(AMP_FOFN);
    write_list_file(&output_files, &result_output)?;
    Ok(result_output)
}


/// Full Amplicon Assembly summary: scan, copy, write manifest.
pub fn summarize_amp_analysis(input_dir: &Path, output_dir: &Path, reporter: &dyn Reporter) -> Result<PathBuf, PipelineError> {
    create_directory(output_dir)?;
    reporter.info(&format!("Combining AmpliconAnalysis output from {:?} to {:?}", input_dir, output_dir));
    let results = find_results(input_dir, reporter)?;
    consolidate(results, output_dir, reporter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::report::RecordingReporter;
    use tempfile::tempdir;

    fn write_result(root: &Path, folder: &str, body: &str) {
        let dir = root.join(folder);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(AMP_RESULT_FILE), body).unwrap();
    }

    #[test]
    fn test_find_results_counts_only_qualifying_dirs() {
        let root = tempdir().unwrap();
        write_result(root.path(), "locus_A_1", ">a\nA\n");
        write_result(root.path(), "locus_B_1", ">b\nC\n");
        fs::create_dir(root.path().join("locus_C_1")).unwrap();
        fs::write(root.path().join("locus_C_1").join("other.fasta"), "x").unwrap();
        fs::write(root.path().join(AMP_RESULT_FILE), "top level is ignored").unwrap();

        let reporter = RecordingReporter::new();
        let mut results: Vec<PathBuf> = find_results(root.path(), &reporter).unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        results.sort();
        assert_eq!(results, vec![
            root.path().join("locus_A_1").join(AMP_RESULT_FILE),
            root.path().join("locus_B_1").join(AMP_RESULT_FILE),
        ]);
        assert!(reporter.contains("Identified 2 individual Amplicon Assembly results"));
    }

    #[test]
    fn test_find_results_is_single_pass() {
        let root = tempdir().unwrap();
        write_result(root.path(), "locus_A_1", ">a\nA\n");

        let reporter = RecordingReporter::new();
        let mut results = find_results(root.path(), &reporter).unwrap();
        assert!(results.next().is_some());
        assert!(results.next().is_none());
        assert!(results.next().is_none());

        // A fresh scan sees new folders.
        write_result(root.path(), "locus_B_1", ">b\nC\n");
        assert_eq!(find_results(root.path(), &reporter).unwrap().count(), 2);
    }

    #[test]
    fn test_find_results_missing_root() {
        let root = tempdir().unwrap();
        let reporter = RecordingReporter::new();
        let result = find_results(&root.path().join("missing"), &reporter);
        assert!(matches!(result, Err(PipelineError::Io { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_find_results_unreadable_result_is_fatal() {
        let root = tempdir().unwrap();
        let dir = root.path().join("locus_A_1");
        fs::create_dir(&dir).unwrap();
        // self-referencing link: stat fails with a loop error, not NotFound
        let looped = dir.join(AMP_RESULT_FILE);
        std::os::unix::fs::symlink(&looped, &looped).unwrap();

        let reporter = RecordingReporter::new();
        let mut results = find_results(root.path(), &reporter).unwrap();
        assert!(matches!(results.next(), Some(Err(PipelineError::Io { .. }))));
        assert!(results.next().is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_find_results_skips_dangling_link() {
        let root = tempdir().unwrap();
        write_result(root.path(), "locus_A_1", ">a\nA\n");
        std::os::unix::fs::symlink(root.path().join("gone"), root.path().join("locus_B_1")).unwrap();

        let reporter = RecordingReporter::new();
        let results: Vec<PathBuf> = find_results(root.path(), &reporter).unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(results, vec![root.path().join("locus_A_1").join(AMP_RESULT_FILE)]);
    }

    #[test]
    fn test_locus_from_result() {
        let record = locus_from_result(Path::new("/amp/locus_DQB1_1/amplicon_analysis.fasta")).unwrap();
        assert_eq!(record.locus, "DQB1");

        let err = locus_from_result(Path::new("/amp/DQB1/amplicon_analysis.fasta")).unwrap_err();
        assert!(matches!(err, PipelineError::MalformedName { .. }));
    }

    #[test]
    fn test_consolidate_copies_bytes() {
        let root = tempdir().unwrap();
        let body = ">Barcode0--0_Cluster0_Phase0_NumReads23\nACGT\n";
        write_result(root.path(), "locus_DQB1_1", body);
        let out = root.path().join("out");

        let reporter = RecordingReporter::new();
        let results = find_results(root.path(), &reporter).unwrap();
        let manifest = consolidate(results, &out, &reporter).unwrap();

        let output = out.join("amplicon_analysis_DQB1.fasta");
        assert_eq!(fs::read_to_string(&output).unwrap(), body);
        assert_eq!(fs::read_to_string(manifest).unwrap(), format!("{}\n", output.display()));
    }

    #[test]
    fn test_consolidate_malformed_folder_aborts() {
        let root = tempdir().unwrap();
        write_result(root.path(), "nolocus", ">a\nA\n");
        let out = root.path().join("out");

        let reporter = RecordingReporter::new();
        let results = find_results(root.path(), &reporter).unwrap();
        let result = consolidate(results, &out, &reporter);
        assert!(matches!(result, Err(PipelineError::MalformedName { .. })));
        assert!(!out.join(AMP_FOFN).exists());
    }
}

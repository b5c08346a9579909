use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use crate::config::defs::PipelineError;


/// Creates a directory and any missing parents. Existing directories are left alone.
pub fn create_directory(dir: &Path) -> Result<(), PipelineError> {
    fs::create_dir_all(dir).map_err(|e| PipelineError::io(dir, e))
}


/// Writes a file-of-filenames: one path per line, in the given order.
///
/// # Arguments
///
/// * `paths` - Paths to list.
/// * `output` - Manifest file to create (truncated if present).
///
pub fn write_list_file(paths: &[PathBuf], output: &Path) -> Result<(), PipelineError> {
    let file = File::create(output).map_err(|e| PipelineError::io(output, e))?;
    let mut writer = BufWriter::new(file);
    for path in paths {
        writer.write_all(&path_bytes(path)?).map_err(|e| PipelineError::io(output, e))?;
        writer.write_all(b"\n").map_err(|e| PipelineError::io(output, e))?;
    }
    writer.flush().map_err(|e| PipelineError::io(output, e))?;
    Ok(())
}


/// Raw bytes of a path as the OS stores them, so manifests never list a lossy name.
#[cfg(unix)]
fn path_bytes(path: &Path) -> Result<Vec<u8>, PipelineError> {
    use std::os::unix::ffi::OsStrExt;
    Ok(path.as_os_str().as_bytes().to_vec())
}

#[cfg(not(unix))]
fn path_bytes(path: &Path) -> Result<Vec<u8>, PipelineError> {
    path.to_str()
        .map(|p| p.as_bytes().to_vec())
        .ok_or_else(|| PipelineError::malformed(path.display().to_string(), "path is not valid UTF-8"))
}


/// Byte-identical copy of `src` to `dest`.
pub fn copy_file(src: &Path, dest: &Path) -> Result<(), PipelineError> {
    fs::copy(src, dest).map_err(|e| PipelineError::io(src, e))?;
    Ok(())
}


/// Base name of a path as UTF-8. Fails for paths ending in `..`, roots, or non-UTF-8 names.
pub fn base_name(path: &Path) -> Result<String, PipelineError> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.to_string())
        .ok_or_else(|| PipelineError::malformed(path.display().to_string(), "path has no usable base name"))
}


/// Base name of the directory directly containing `path`.
/// Relative paths such as `group_01.fa` or `./x` are resolved against the working directory first.
pub fn parent_name(path: &Path) -> Result<String, PipelineError> {
    let parent = match path.parent() {
        Some(p) if p.file_name().is_some() => p.to_path_buf(),
        _ => {
            let absolute = path.canonicalize().map_err(|e| PipelineError::io(path, e))?;
            absolute.parent()
                .map(Path::to_path_buf)
                .ok_or_else(|| PipelineError::malformed(path.display().to_string(), "path has no parent directory"))?
        }
    };
    base_name(&parent)
}


/// Returns the token at `index` when `name` is split on `delimiter`.
/// Counts from the end when `from_end` is set (0 is the last token).
pub fn name_token(name: &str, delimiter: char, index: usize, from_end: bool) -> Result<String, PipelineError> {
    let tokens: Vec<&str> = name.split(delimiter).collect();
    let token = if from_end {
        tokens.len().checked_sub(index + 1).and_then(|i| tokens.get(i))
    } else {
        tokens.get(index)
    };
    match token {
        Some(t) if !t.is_empty() => Ok(t.to_string()),
        _ => Err(PipelineError::malformed(
            name,
            format!("expected a non-empty token at position {}{} when split on '{}'",
                    index, if from_end { " from the end" } else { "" }, delimiter),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_write_list_file() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let out = dir.path().join("list.fofn");
        let paths = vec![PathBuf::from("/a/b.fasta"), PathBuf::from("c.fasta")];
        write_list_file(&paths, &out)?;
        assert_eq!(fs::read_to_string(&out)?, "/a/b.fasta\nc.fasta\n");

        write_list_file(&[], &out)?;
        assert_eq!(fs::read_to_string(&out)?, "");
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_write_list_file_keeps_raw_bytes() -> anyhow::Result<()> {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = tempdir()?;
        let out = dir.path().join("list.fofn");
        let raw = PathBuf::from(OsStr::from_bytes(b"/data/locus_\xff_1.fasta"));
        write_list_file(&[raw], &out)?;
        assert_eq!(fs::read(&out)?, b"/data/locus_\xff_1.fasta\n".to_vec());
        Ok(())
    }

    #[test]
    fn test_copy_file_missing_source() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let result = copy_file(&dir.path().join("nope.fa"), &dir.path().join("out.fa"));
        assert!(matches!(result, Err(PipelineError::Io { .. })));
        Ok(())
    }

    #[test]
    fn test_name_token() {
        assert_eq!(name_token("locus_DQB1_1", '_', 1, false).unwrap(), "DQB1");
        assert_eq!(name_token("group_02_cns.fa", '_', 1, true).unwrap(), "02");
        assert!(name_token("locusDQB1", '_', 1, false).is_err());
        assert!(name_token("locus_", '_', 1, false).is_err());
        assert!(name_token("cns.fa", '_', 1, true).is_err());
    }

    #[test]
    fn test_parent_name() {
        assert_eq!(parent_name(Path::new("/in/A/group_01_cns.fa")).unwrap(), "A");
        assert_eq!(parent_name(Path::new("locus_DQB1_1/amplicon_analysis.fasta")).unwrap(), "locus_DQB1_1");
    }
}

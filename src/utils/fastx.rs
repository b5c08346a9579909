use seq_io::fasta::Reader as FastaReader;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use crate::config::defs::{PipelineError, FASTA_LINE_WIDTH};


/// Copies every FASTA record from `src` to `dest`, replacing each record's
/// header with `name`. Descriptions are dropped; sequences are kept as-is and
/// re-wrapped at FASTA_LINE_WIDTH.
///
/// # Arguments
///
/// * `src` - Existing FASTA file.
/// * `dest` - Output FASTA file (truncated if present).
/// * `name` - Identifier written for every record.
///
/// # Returns
/// Number of records written.
///
pub fn copy_fasta(src: &Path, dest: &Path, name: &str) -> Result<usize, PipelineError> {
    let mut reader = FastaReader::from_path(src).map_err(|e| PipelineError::io(src, e))?;
    let out = File::create(dest).map_err(|e| PipelineError::io(dest, e))?;
    let mut writer = BufWriter::new(out);

    let mut count = 0;
    for result in reader.records() {
        let record = result.map_err(|e| PipelineError::InvalidFastaFormat {
            path: src.to_path_buf(),
            error: e.to_string(),
        })?;
        write_fasta_record(&mut writer, name, None, &record.seq, FASTA_LINE_WIDTH)
            .map_err(|e| PipelineError::io(dest, e))?;
        count += 1;
    }
    writer.flush().map_err(|e| PipelineError::io(dest, e))?;
    Ok(count)
}


pub fn write_fasta_record<W: Write>(
    writer: &mut W,
    id: &str,
    desc: Option<&str>,
    seq: &[u8],
    line_width: usize,
) -> io::Result<()> {
    // Write header
    writer.write_all(b">")?;
    writer.write_all(id.as_bytes())?;
    if let Some(desc) = desc {
        writer.write_all(b" ")?;
        writer.write_all(desc.as_bytes())?;
    }
    writer.write_all(b"\n")?;

    for chunk in seq.chunks(line_width.max(1)) {
        writer.write_all(chunk)?;
        writer.write_all(b"\n")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_write_fasta_record_wraps() -> io::Result<()> {
        let mut buf = Vec::new();
        write_fasta_record(&mut buf, "seq1", Some("desc"), b"ACGTACGTAC", 4)?;
        assert_eq!(String::from_utf8(buf).unwrap(), ">seq1 desc\nACGT\nACGT\nAC\n");
        Ok(())
    }

    #[test]
    fn test_copy_fasta_renames_all_records() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let src = dir.path().join("group_01_cns.fa");
        fs::write(&src, ">Cluster0 reads=12\nACGT\nTTGA\n>Cluster0_b\nGG\n")?;
        let dest = dir.path().join("A_01_cns.fasta");

        let n = copy_fasta(&src, &dest, "A_01_cns")?;
        assert_eq!(n, 2);
        assert_eq!(fs::read_to_string(&dest)?, ">A_01_cns\nACGTTTGA\n>A_01_cns\nGG\n");
        Ok(())
    }

    #[test]
    fn test_copy_fasta_long_sequence() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let src = dir.path().join("in.fa");
        let seq = "A".repeat(FASTA_LINE_WIDTH + 5);
        fs::write(&src, format!(">x\n{}\n", seq))?;
        let dest = dir.path().join("out.fasta");

        copy_fasta(&src, &dest, "y")?;
        let expected = format!(">y\n{}\n{}\n", "A".repeat(FASTA_LINE_WIDTH), "AAAAA");
        assert_eq!(fs::read_to_string(&dest)?, expected);
        Ok(())
    }

    #[test]
    fn test_copy_fasta_missing_source() {
        let dir = tempdir().unwrap();
        let result = copy_fasta(&dir.path().join("missing.fa"), &dir.path().join("out.fasta"), "x");
        assert!(matches!(result, Err(PipelineError::Io { .. })));
        assert!(!dir.path().join("out.fasta").exists());
    }
}

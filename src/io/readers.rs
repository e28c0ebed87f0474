use crate::utils::util::Result;
use flate2::read::MultiGzDecoder;
use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::Path,
};

fn is_gzipped(path: &Path) -> bool {
    let path_str = path.to_string_lossy().to_lowercase();
    path_str.ends_with(".gz") || path_str.ends_with(".gzip") || path_str.ends_with(".bgz")
}

/// Opens an annotation file, transparently decompressing gzip/bgzip input.
pub fn open_annotation_reader(path: &Path) -> Result<Box<dyn BufRead>> {
    let file = File::open(path)
        .map_err(|error| crate::recode_error!("Failed to open file {}: {error}", path.display()))?;
    if is_gzipped(path) {
        let gz_decoder = MultiGzDecoder::new(file);
        if gz_decoder.header().is_none() {
            return Err(crate::recode_error!("Invalid gzip header: {}", path.display()));
        }
        Ok(Box::new(BufReader::new(gz_decoder)))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

pub fn open_stdin_reader() -> Box<dyn BufRead> {
    Box::new(BufReader::new(io::stdin()))
}

pub fn string_reader(input: &str) -> Box<dyn BufRead> {
    Box::new(io::Cursor::new(input.to_string().into_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::{write::GzEncoder, Compression};
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn reads_plain_and_gzipped_files() {
        let dir = tempdir().expect("temp dir should be created");
        let plain = dir.path().join("annotations.json");
        std::fs::write(&plain, "{\"input\":\"rs1\"}\n").unwrap();

        let gz = dir.path().join("annotations.json.gz");
        let mut encoder = GzEncoder::new(File::create(&gz).unwrap(), Compression::default());
        encoder.write_all(b"{\"input\":\"rs2\"}\n").unwrap();
        encoder.finish().unwrap();

        let mut line = String::new();
        open_annotation_reader(&plain).unwrap().read_line(&mut line).unwrap();
        assert_eq!(line.trim(), "{\"input\":\"rs1\"}");

        line.clear();
        open_annotation_reader(&gz).unwrap().read_line(&mut line).unwrap();
        assert_eq!(line.trim(), "{\"input\":\"rs2\"}");
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempdir().expect("temp dir should be created");
        let result = open_annotation_reader(&dir.path().join("missing.json"));
        assert!(result.is_err());
    }
}

use crate::{constants::CSI_MIN_SHIFT, error::RecodeError, utils::util::Result};
use rust_htslib::{bcf, bgzf};
use std::{
    ffi::OsString,
    fmt,
    io::{BufRead, BufReader, Write},
    path::{Path, PathBuf},
    str::FromStr,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndexType {
    #[default]
    Tbi,
    Csi,
}

impl IndexType {
    pub fn extension(&self) -> &'static str {
        match self {
            IndexType::Tbi => "tbi",
            IndexType::Csi => "csi",
        }
    }

    fn htslib_type(&self) -> bcf::index::Type {
        match self {
            IndexType::Tbi => bcf::index::Type::Tbx,
            IndexType::Csi => bcf::index::Type::Csi(CSI_MIN_SHIFT),
        }
    }
}

impl FromStr for IndexType {
    type Err = RecodeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "tbi" => Ok(IndexType::Tbi),
            "csi" => Ok(IndexType::Csi),
            _ => Err(RecodeError::InvalidIndexType {
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for IndexType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

pub fn add_extension(path: &Path, ext: &str) -> PathBuf {
    let mut out: OsString = path.as_os_str().to_os_string();
    out.push(".");
    out.push(ext);
    PathBuf::from(out)
}

pub fn validate_bgzip(path: &Path) -> Result<()> {
    if !bgzf::is_bgzip(path)? {
        return Err(RecodeError::NotBgzf {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

/// Writes VCF shards one after another into a single BGZF file, keeping only
/// the header of the first shard.
pub struct ShardConcatWriter {
    writer: bgzf::Writer,
    path: PathBuf,
    header_written: bool,
    n_shards: usize,
    n_records: usize,
}

impl ShardConcatWriter {
    pub fn new(path: &Path) -> Result<Self> {
        Ok(Self {
            writer: bgzf::Writer::from_path(path)?,
            path: path.to_path_buf(),
            header_written: false,
            n_shards: 0,
            n_records: 0,
        })
    }

    /// Appends one shard and returns the number of records copied from it.
    pub fn append_shard(&mut self, shard: &Path) -> Result<usize> {
        let mut reader = BufReader::new(bgzf::Reader::from_path(shard)?);

        let keep_header = !self.header_written;
        let mut n_records = 0;
        let mut line: Vec<u8> = Vec::new();
        loop {
            line.clear();
            let n = reader.read_until(b'\n', &mut line).map_err(|e| {
                crate::recode_error!("Failed to read shard {}: {e}", shard.display())
            })?;
            if n == 0 {
                break;
            }
            if line.starts_with(b"#") {
                if keep_header {
                    self.writer.write_all(&line)?;
                }
                continue;
            }
            self.writer.write_all(&line)?;
            if !line.ends_with(b"\n") {
                self.writer.write_all(b"\n")?;
            }
            n_records += 1;
        }

        if keep_header {
            self.header_written = true;
        }
        self.n_shards += 1;
        self.n_records += n_records;
        log::debug!(
            "Writer: Copied {} record(s) from {}",
            n_records,
            shard.display()
        );
        Ok(n_records)
    }

    pub fn n_records(&self) -> usize {
        self.n_records
    }

    /// Flushes and closes the output, returning its path.
    pub fn finish(mut self) -> Result<PathBuf> {
        if !self.header_written {
            return Err(crate::recode_error!(
                "No shards were written to {}",
                self.path.display()
            ));
        }
        self.writer.flush()?;
        log::debug!(
            "Writer: Concatenated {} shard(s), {} record(s) into {}",
            self.n_shards,
            self.n_records,
            self.path.display()
        );
        Ok(self.path)
    }
}

/// Builds a tabix or CSI index next to `path` and returns the index path.
pub fn build_index(path: &Path, index_type: IndexType, n_threads: u32) -> Result<PathBuf> {
    log::debug!(
        "Writer: Building {} index for {}",
        index_type,
        path.display()
    );
    bcf::index::build(path, None, n_threads, index_type.htslib_type()).map_err(|error| {
        crate::recode_error!(
            "Failed to build {} index for {}: {}",
            index_type,
            path.display(),
            error
        )
    })?;
    Ok(add_extension(path, index_type.extension()))
}

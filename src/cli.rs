use crate::{
    constants::*,
    core::fields::FieldSelection,
    io::vcf_writer::IndexType,
    utils::util::Result,
};
use clap::{ArgAction, ArgGroup, Parser, Subcommand};
use env_logger::fmt::Color;
use log::{Level, LevelFilter};
use once_cell::sync::Lazy;
use std::{
    fs::File,
    io::{BufRead, BufReader, Write},
    path::{Path, PathBuf},
};

/// Full version string including the crate version and git description.
///
/// # Examples
/// * `0.1.0-1ba958a-dirty` - while on a dirty branch
/// * `0.1.0-1ba958a` - with a fresh commit
pub static FULL_VERSION: Lazy<String> = Lazy::new(|| {
    let git_describe = env!("VERGEN_GIT_DESCRIBE");
    if git_describe.is_empty() {
        env!("CARGO_PKG_VERSION").to_string()
    } else {
        format!("{}-{}", env!("CARGO_PKG_VERSION"), git_describe)
    }
});

#[derive(Parser, Debug)]
#[command(name="varrecode",
          version=&**FULL_VERSION,
          about="Variant recoder and annotated VCF shard merger",
          long_about = None,
          help_template = "{name} {version}\n{about-section}\n{usage-heading}\n    {usage}\n\n{all-args}",
          )]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Specify multiple times to increase verbosity level (e.g., -vv for more verbosity)
    #[arg(
        short = 'v',
        long = "verbose",
        action = ArgAction::Count,
        global = true
    )]
    pub verbosity: u8,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Reshape annotation output into per-allele identifiers and notations
    Recode(RecodeArgs),
    /// Concatenate annotated VCF shards into one indexed file
    MergeVcf(MergeVcfArgs),
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Recode(_) => "recode",
            Command::MergeVcf(_) => "merge-vcf",
        }
    }
}

#[derive(Parser, Debug, Clone)]
#[command(group(
    ArgGroup::new("source")
        .required(false)
        .args(["input", "input_string"]),
))]
pub struct RecodeArgs {
    /// Annotation JSON lines to recode, optionally gzipped [default: standard input]
    #[arg(
        short = 'i',
        long = "input",
        value_name = "FILE",
        value_parser = check_file_exists
    )]
    pub input: Option<PathBuf>,

    /// Annotation JSON lines given inline instead of a file
    #[arg(long = "input-string", value_name = "TEXT")]
    pub input_string: Option<String>,

    /// Fields to report (comma-separated): id, hgvsg, hgvsc, hgvsp, spdi, vcf_string
    #[arg(
        long = "fields",
        value_name = "FIELDS",
        value_delimiter = ',',
        default_value = DEFAULT_FIELDS
    )]
    pub fields: Vec<String>,

    /// Also report the VCF-style allele string of each allele
    #[arg(long = "vcf-string", default_value_t = DEFAULT_VCF_STRING)]
    pub vcf_string: bool,

    /// Write output to a file [default: standard output]
    #[arg(
        short = 'o',
        long = "output",
        value_name = "FILE",
        value_parser = check_prefix_path
    )]
    pub output: Option<PathBuf>,

    /// Indent the JSON output
    #[arg(long = "pretty", default_value_t = DEFAULT_PRETTY)]
    pub pretty: bool,
}

impl RecodeArgs {
    pub fn field_selection(&self) -> Result<FieldSelection> {
        FieldSelection::new(&self.fields, self.vcf_string)
    }
}

#[derive(Parser, Debug, Clone)]
#[command(group(
    ArgGroup::new("shards")
        .required(true)
        .args(["vcfs", "vcf_list"]),
))]
#[command(group(
    ArgGroup::new("naming")
        .required(true)
        .args(["prefix", "original_file"]),
))]
#[command(arg_required_else_help(true))]
pub struct MergeVcfArgs {
    /// Annotated VCF shards to merge (bgzip-compressed)
    #[arg(
        long = "vcf",
        value_name = "VCF",
        num_args = 1..,
        value_parser = check_file_exists
    )]
    pub vcfs: Option<Vec<PathBuf>>,

    /// File containing paths of VCF shards to merge (one per line)
    #[arg(
        long = "vcf-list",
        value_name = "VCF_LIST",
        value_parser = check_file_exists
    )]
    pub vcf_list: Option<PathBuf>,

    /// Index files of the shards
    #[arg(
        long = "index",
        value_name = "INDEX",
        num_args = 1..,
        value_parser = check_file_exists
    )]
    pub indexes: Option<Vec<PathBuf>>,

    /// Directory the merged VCF and its index are written to
    #[arg(
        long = "output-dir",
        value_name = "DIR",
        value_parser = check_dir_exists
    )]
    pub output_dir: PathBuf,

    /// Name prefix of the merged VCF
    #[arg(long = "prefix", value_name = "PREFIX")]
    pub prefix: Option<String>,

    /// Original input file, its simple name is used when no prefix is given
    #[arg(long = "original-file", value_name = "FILE")]
    pub original_file: Option<PathBuf>,

    /// Index type to build: tbi|csi
    #[arg(
        long = "index-type",
        value_name = "INDEX_TYPE",
        default_value = "tbi",
        value_parser = validate_index_type
    )]
    pub index_type: IndexType,

    /// Number of threads to use for indexing
    #[arg(
        short = '@',
        value_name = "THREADS",
        default_value = "1",
        value_parser = threads_in_range
    )]
    pub num_threads: usize,
}

/// Initializes the verbosity level for logging based on the command-line arguments.
///
/// `-v` selects debug output, `-vv` and above trace output.
pub fn init_verbose(args: &Cli) {
    let filter_level: LevelFilter = match args.verbosity {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    env_logger::Builder::from_default_env()
        .format(|buf, record| {
            let level = record.level();
            let mut style = buf.style();
            match record.level() {
                Level::Error => style.set_color(Color::Red),
                Level::Warn => style.set_color(Color::Yellow),
                Level::Info => style.set_color(Color::Green),
                Level::Debug => style.set_color(Color::Blue),
                Level::Trace => style.set_color(Color::Cyan),
            };

            writeln!(
                buf,
                "{} [{}] {} - {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                style.value(level),
                record.module_path().unwrap_or("unknown_module"),
                record.args()
            )
        })
        .filter_level(filter_level)
        .init();
}

fn threads_in_range(s: &str) -> Result<usize> {
    let thread: usize = s
        .parse::<usize>()
        .map_err(|_| crate::recode_error!("`{}` is not a valid thread number", s))?;
    if thread == 0 {
        return Err(crate::recode_error!("Number of threads must be >= 1"));
    }
    Ok(thread)
}

fn check_file_exists(s: &str) -> Result<PathBuf> {
    let path = Path::new(s);
    if !path.exists() {
        return Err(crate::recode_error!(
            "File does not exist: {}",
            path.display()
        ));
    }
    Ok(path.to_path_buf())
}

fn check_dir_exists(s: &str) -> Result<PathBuf> {
    let path = Path::new(s);
    if !path.is_dir() {
        return Err(crate::recode_error!(
            "Directory does not exist: {}",
            path.display()
        ));
    }
    Ok(path.to_path_buf())
}

fn check_prefix_path(s: &str) -> Result<PathBuf> {
    let path = Path::new(s);
    if let Some(parent_dir) = path.parent() {
        if !parent_dir.as_os_str().is_empty() && !parent_dir.exists() {
            return Err(crate::recode_error!(
                "Path does not exist: {}",
                parent_dir.display()
            ));
        }
    }
    Ok(path.to_path_buf())
}

fn validate_index_type(s: &str) -> Result<IndexType> {
    s.parse()
}

impl MergeVcfArgs {
    pub fn process_vcf_paths(&self) -> Result<Vec<PathBuf>> {
        match (&self.vcfs, &self.vcf_list) {
            (Some(vcfs), None) => Ok(vcfs.clone()),
            (None, Some(list_path)) => Self::read_vcf_paths_from_file(list_path),
            _ => unreachable!("Either --vcf or --vcf-list is provided, never both"),
        }
    }

    fn read_vcf_paths_from_file(path: &Path) -> Result<Vec<PathBuf>> {
        let file = File::open(path).map_err(|e| {
            crate::recode_error!("Failed to open VCF list file {}: {}", path.display(), e)
        })?;
        let reader = BufReader::new(file);

        let mut paths = Vec::new();
        for (line_num, line) in reader.lines().enumerate() {
            let line = line
                .map_err(|e| crate::recode_error!("Error reading line {}: {}", line_num + 1, e))?;
            let trimmed = line.trim();
            // Skip empty or comment lines
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let path = PathBuf::from(trimmed);
            if !path.exists() {
                return Err(crate::recode_error!(
                    "VCF file does not exist: {}",
                    path.display()
                ));
            }
            paths.push(path);
        }

        if paths.is_empty() {
            return Err(crate::recode_error!("No VCF paths found in the input file"));
        }

        Ok(paths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fields::Field;
    use tempfile::tempdir;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).expect("CLI parse should succeed")
    }

    #[test]
    fn recode_defaults() {
        let cli = parse(&["varrecode", "recode"]);
        let Command::Recode(args) = cli.command else {
            panic!("expected recode command");
        };
        assert!(args.input.is_none() && args.input_string.is_none());
        assert_eq!(
            args.field_selection().unwrap(),
            FieldSelection::parse(DEFAULT_FIELDS, false).unwrap()
        );
        assert!(!args.pretty);
    }

    #[test]
    fn recode_fields_and_vcf_string() {
        let cli = parse(&[
            "varrecode",
            "-vv",
            "recode",
            "--input-string",
            "{}",
            "--fields",
            "hgvsg,spdi",
            "--vcf-string",
        ]);
        assert_eq!(cli.verbosity, 2);
        let Command::Recode(args) = cli.command else {
            panic!("expected recode command");
        };
        assert_eq!(
            args.field_selection().unwrap().requested(),
            &[Field::Hgvsg, Field::Spdi, Field::VcfString]
        );
    }

    #[test]
    fn recode_rejects_input_and_input_string_together() {
        let dir = tempdir().expect("temp dir should be created");
        let input = dir.path().join("in.json");
        std::fs::write(&input, "").unwrap();
        let result = Cli::try_parse_from([
            "varrecode",
            "recode",
            "--input",
            input.to_str().unwrap(),
            "--input-string",
            "{}",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn merge_vcf_requires_naming() {
        let dir = tempdir().expect("temp dir should be created");
        let shard = dir.path().join("shard.vcf.gz");
        std::fs::write(&shard, "").unwrap();
        let out = dir.path().to_str().unwrap();
        let result = Cli::try_parse_from([
            "varrecode",
            "merge-vcf",
            "--vcf",
            shard.to_str().unwrap(),
            "--output-dir",
            out,
        ]);
        assert!(result.is_err());

        let cli = parse(&[
            "varrecode",
            "merge-vcf",
            "--vcf",
            shard.to_str().unwrap(),
            "--output-dir",
            out,
            "--prefix",
            "cohort",
            "--index-type",
            "csi",
            "-@",
            "4",
        ]);
        let Command::MergeVcf(args) = cli.command else {
            panic!("expected merge-vcf command");
        };
        assert_eq!(args.index_type, IndexType::Csi);
        assert_eq!(args.num_threads, 4);
        assert_eq!(args.prefix.as_deref(), Some("cohort"));
    }

    #[test]
    fn merge_vcf_rejects_bad_index_type_and_threads() {
        let dir = tempdir().expect("temp dir should be created");
        let shard = dir.path().join("shard.vcf.gz");
        std::fs::write(&shard, "").unwrap();
        let base = [
            "varrecode",
            "merge-vcf",
            "--vcf",
            shard.to_str().unwrap(),
            "--output-dir",
            dir.path().to_str().unwrap(),
            "--prefix",
            "p",
        ];
        let mut bad_index = base.to_vec();
        bad_index.extend(["--index-type", "bai"]);
        assert!(Cli::try_parse_from(bad_index).is_err());

        let mut bad_threads = base.to_vec();
        bad_threads.extend(["-@", "0"]);
        assert!(Cli::try_parse_from(bad_threads).is_err());
    }

    #[test]
    fn vcf_list_skips_comments_and_blank_lines() {
        let dir = tempdir().expect("temp dir should be created");
        let shard = dir.path().join("shard_1.vcf.gz");
        std::fs::write(&shard, "").unwrap();
        let list = dir.path().join("shards.txt");
        std::fs::write(&list, format!("# shards\n\n{}\n", shard.display())).unwrap();

        let paths = MergeVcfArgs::read_vcf_paths_from_file(&list).unwrap();
        assert_eq!(paths, vec![shard]);
    }
}

use crate::{
    cli::MergeVcfArgs,
    constants::MERGED_VCF_SUFFIX,
    error::RecodeError,
    io::vcf_writer::{add_extension, build_index, validate_bgzip, IndexType, ShardConcatWriter},
    utils::util::{format_number_with_commas, Result},
};
use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

/// File name up to its first `.`, e.g. `sample` for `/data/sample.vcf.gz`.
fn simple_name(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_string_lossy();
    let stem = name.split('.').next().unwrap_or_default();
    (!stem.is_empty()).then(|| stem.to_string())
}

/// Output path `<dir>/<prefix>_VEP.vcf.gz`, falling back to the simple name
/// of the original input file when no prefix is given.
pub fn merged_vcf_path(
    output_dir: &Path,
    prefix: Option<&str>,
    original_file: Option<&Path>,
) -> Result<PathBuf> {
    let name = match (prefix, original_file) {
        (Some(prefix), _) if !prefix.is_empty() => prefix.to_string(),
        (_, Some(original)) => simple_name(original).ok_or(RecodeError::MissingOutputName)?,
        _ => return Err(RecodeError::MissingOutputName),
    };
    Ok(output_dir.join(format!("{name}{MERGED_VCF_SUFFIX}")))
}

fn sort_shards(mut shards: Vec<PathBuf>) -> Vec<PathBuf> {
    shards.sort_by(|a, b| a.file_name().cmp(&b.file_name()).then_with(|| a.cmp(b)));
    shards
}

fn check_shard_indexes(shards: &[PathBuf], indexes: Option<&[PathBuf]>) {
    let given: HashSet<&Path> = indexes
        .unwrap_or_default()
        .iter()
        .map(PathBuf::as_path)
        .collect();
    for shard in shards {
        let has_index = [IndexType::Tbi, IndexType::Csi].iter().any(|index_type| {
            let index = add_extension(shard, index_type.extension());
            given.contains(index.as_path()) || index.exists()
        });
        if !has_index {
            log::debug!("No index found for shard {}", shard.display());
        }
    }
}

pub fn merge_vcf(args: MergeVcfArgs) -> Result<()> {
    let shards = sort_shards(args.process_vcf_paths()?);
    let out_path = merged_vcf_path(
        &args.output_dir,
        args.prefix.as_deref(),
        args.original_file.as_deref(),
    )?;
    if shards.iter().any(|shard| shard == &out_path) {
        return Err(crate::recode_error!(
            "Output {} would overwrite one of the input shards",
            out_path.display()
        ));
    }
    for shard in &shards {
        validate_bgzip(shard)?;
    }
    check_shard_indexes(&shards, args.indexes.as_deref());

    log::info!(
        "Merging {} shard(s) into {}",
        shards.len(),
        out_path.display()
    );
    let mut writer = ShardConcatWriter::new(&out_path)?;
    for shard in &shards {
        writer.append_shard(shard)?;
    }
    let n_records = writer.n_records();
    let out_path = writer.finish()?;

    let n_threads = u32::try_from(args.num_threads)
        .map_err(|_| crate::recode_error!("Too many threads: {}", args.num_threads))?;
    let index_path = build_index(&out_path, args.index_type, n_threads)?;
    log::info!(
        "Wrote {} record(s) to {} with index {}",
        format_number_with_commas(n_records),
        out_path.display(),
        index_path.display()
    );
    Ok(())
}

use crate::{
    cli::RecodeArgs,
    core::{aggregator::RecodeOutput, recoder::Recoder},
    io::{json_engine::JsonLinesEngine, result_writer::write_results},
    utils::util::{format_number_with_commas, Result},
};

fn run_recoder(args: &RecodeArgs) -> Result<RecodeOutput> {
    let fields = args.field_selection()?;
    log::info!(
        "Reporting fields: {}",
        fields
            .requested()
            .iter()
            .map(|field| field.name())
            .collect::<Vec<_>>()
            .join(",")
    );

    match (&args.input, &args.input_string) {
        (_, Some(text)) => Recoder::new(JsonLinesEngine::empty(), fields)?.recode(text),
        (Some(path), None) => Recoder::new(JsonLinesEngine::from_path(path)?, fields)?.recode_all(),
        (None, None) => Recoder::new(JsonLinesEngine::from_stdin(), fields)?.recode_all(),
    }
}

pub fn recode(args: RecodeArgs) -> Result<()> {
    let output = run_recoder(&args)?;
    let n_entries: usize = output.iter().map(|alleles| alleles.len()).sum();
    log::info!(
        "Recoded {} input(s) into {} allele entries",
        format_number_with_commas(output.len()),
        format_number_with_commas(n_entries)
    );
    write_results(&output, args.output.as_deref(), args.pretty)
}

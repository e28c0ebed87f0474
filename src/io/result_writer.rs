use crate::{core::aggregator::RecodeOutput, utils::util::Result};
use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::Path,
};

/// Writes recoded results as a JSON array to `output`, or standard output.
pub fn write_results(output: &RecodeOutput, path: Option<&Path>, pretty: bool) -> Result<()> {
    let writer: Box<dyn Write> = match path {
        Some(path) => {
            let file = File::create(path).map_err(|e| {
                crate::recode_error!("Failed to create output file {}: {e}", path.display())
            })?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };
    write_results_to(output, writer, pretty)
}

pub fn write_results_to<W: Write>(
    output: &RecodeOutput,
    mut writer: W,
    pretty: bool,
) -> Result<()> {
    if pretty {
        serde_json::to_writer_pretty(&mut writer, output)?;
    } else {
        serde_json::to_writer(&mut writer, output)?;
    }
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

use crate::{
    core::{
        annotation::{AnnotationLine, EngineWarning},
        engine::AnnotationEngine,
        fields::EngineConfig,
    },
    utils::util::Result,
};
use rust_htslib::bgzf;
use std::{collections::VecDeque, io::Write, path::Path};

pub const VCF_HEADER: &str = "##fileformat=VCFv4.2\n##contig=<ID=1,length=248956422>\n#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\n";

/// Writes `contents` to `path` as a BGZF file.
pub fn write_bgzf(path: &Path, contents: &str) {
    let mut writer = bgzf::Writer::from_path(path).expect("bgzf writer should open");
    writer.write_all(contents.as_bytes()).unwrap();
}

/// In-memory engine: `set_input` selects the queued lines whose input matches.
#[derive(Debug, Default)]
pub struct MockEngine {
    pub lines: Vec<(AnnotationLine, Vec<EngineWarning>)>,
    pub config: Option<EngineConfig>,
    pub fail_on: Option<String>,
    pending: VecDeque<(AnnotationLine, Vec<EngineWarning>)>,
    warnings: Vec<EngineWarning>,
    pub set_input_calls: usize,
    pub reset_calls: usize,
}

impl MockEngine {
    pub fn new(lines: Vec<AnnotationLine>) -> Self {
        let lines = lines.into_iter().map(|line| (line, Vec::new())).collect();
        Self::with_warnings(lines)
    }

    pub fn with_warnings(lines: Vec<(AnnotationLine, Vec<EngineWarning>)>) -> Self {
        let pending = lines.iter().cloned().collect();
        Self {
            lines,
            pending,
            ..Default::default()
        }
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}

impl AnnotationEngine for MockEngine {
    fn configure(&mut self, config: &EngineConfig) -> Result<()> {
        self.config = Some(config.clone());
        Ok(())
    }

    fn set_input(&mut self, input: &str) -> Result<()> {
        self.set_input_calls += 1;
        self.pending = self
            .lines
            .iter()
            .filter(|(line, _)| line.input == input)
            .cloned()
            .collect();
        Ok(())
    }

    fn reset_input(&mut self) {
        self.reset_calls += 1;
        self.pending.clear();
    }

    fn next_line(&mut self) -> Result<Option<AnnotationLine>> {
        let Some((line, warnings)) = self.pending.pop_front() else {
            return Ok(None);
        };
        if self.fail_on.as_deref() == Some(line.input.as_str()) {
            return Err(crate::recode_error!("Lookup failed for {}", line.input));
        }
        self.warnings.extend(warnings);
        Ok(Some(line))
    }

    fn warnings(&self) -> &[EngineWarning] {
        &self.warnings
    }

    fn clear_warnings(&mut self) {
        self.warnings.clear();
    }
}

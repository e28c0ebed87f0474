use crate::{
    core::{
        annotation::{AnnotationLine, ColocatedVariant, ConsequenceRecord, EngineWarning, VcfStrings},
        engine::AnnotationEngine,
        fields::EngineConfig,
    },
    error::RecodeError,
    io::readers::{open_annotation_reader, open_stdin_reader, string_reader},
    utils::util::Result,
};
use serde::Deserialize;
use serde_json::Value;
use std::{io::BufRead, path::Path};

#[derive(Debug, Deserialize)]
struct RawAnnotationLine {
    input: String,
    #[serde(default)]
    transcript_consequences: Option<Vec<ConsequenceRecord>>,
    #[serde(default)]
    intergenic_consequences: Option<Vec<ConsequenceRecord>>,
    #[serde(default)]
    colocated_variants: Option<Value>,
    #[serde(default)]
    vcf_string: Option<Value>,
}

/// Replays pre-computed annotations stored as JSON lines, one annotation
/// object per line.
pub struct JsonLinesEngine {
    reader: Option<Box<dyn BufRead>>,
    config: Option<EngineConfig>,
    warnings: Vec<EngineWarning>,
    line_number: usize,
}

impl JsonLinesEngine {
    pub fn new(reader: Box<dyn BufRead>) -> Self {
        Self {
            reader: Some(reader),
            config: None,
            warnings: Vec::new(),
            line_number: 0,
        }
    }

    /// Engine with no pending input; feed it through `set_input`.
    pub fn empty() -> Self {
        Self {
            reader: None,
            config: None,
            warnings: Vec::new(),
            line_number: 0,
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        log::debug!("Reading annotations from {}", path.display());
        Ok(Self::new(open_annotation_reader(path)?))
    }

    pub fn from_stdin() -> Self {
        log::debug!("Reading annotations from standard input");
        Self::new(open_stdin_reader())
    }

    fn check_existing(&self) -> bool {
        self.config.as_ref().map_or(true, |c| c.check_existing)
    }

    fn want_vcf_string(&self) -> bool {
        self.config.as_ref().map_or(true, |c| c.vcf_string)
    }

    fn parse_line(&mut self, text: &str) -> Result<AnnotationLine> {
        let raw: RawAnnotationLine =
            serde_json::from_str(text).map_err(|error| RecodeError::EngineParse {
                line: self.line_number,
                message: error.to_string(),
            })?;

        let mut line = AnnotationLine::new(raw.input);
        line.transcript_consequences = raw.transcript_consequences.unwrap_or_default();
        line.intergenic_consequences = raw.intergenic_consequences.unwrap_or_default();

        if self.want_vcf_string() {
            if let Some(value) = raw.vcf_string {
                line.vcf_string = self.parse_vcf_string(&line.input, value);
            }
        }
        if self.check_existing() {
            if let Some(value) = raw.colocated_variants {
                line.colocated_variants = self.parse_colocated(&line.input, value);
            }
        }
        Ok(line)
    }

    fn parse_vcf_string(&mut self, input: &str, value: Value) -> Option<VcfStrings> {
        match value {
            Value::Null => None,
            Value::String(s) => Some(VcfStrings::One(s)),
            Value::Array(values) => {
                let strings: Option<Vec<String>> = values
                    .into_iter()
                    .map(|v| match v {
                        Value::String(s) => Some(s),
                        _ => None,
                    })
                    .collect();
                if strings.is_none() {
                    self.warn(format!("Ignoring malformed vcf_string for input {input}"));
                }
                strings.map(VcfStrings::Many)
            }
            _ => {
                self.warn(format!("Ignoring malformed vcf_string for input {input}"));
                None
            }
        }
    }

    fn parse_colocated(&mut self, input: &str, value: Value) -> Vec<ColocatedVariant> {
        let entries = match value {
            Value::Null => return Vec::new(),
            Value::Array(entries) => entries,
            _ => {
                self.warn(format!(
                    "Ignoring malformed colocated_variants for input {input}"
                ));
                return Vec::new();
            }
        };

        let mut colocated = Vec::with_capacity(entries.len());
        for entry in entries {
            let id = entry.get("id").and_then(Value::as_str);
            let allele_string = entry.get("allele_string").and_then(Value::as_str);
            match id {
                Some(id) => colocated.push(ColocatedVariant {
                    id: id.to_string(),
                    allele_string: allele_string.map(str::to_string),
                }),
                None => self.warn(format!(
                    "Ignoring co-located variant without id for input {input}"
                )),
            }
        }
        colocated
    }

    fn warn(&mut self, message: String) {
        log::debug!("Line {}: {}", self.line_number, message);
        self.warnings.push(EngineWarning::new(message));
    }
}

impl AnnotationEngine for JsonLinesEngine {
    fn configure(&mut self, config: &EngineConfig) -> Result<()> {
        self.config = Some(config.clone());
        Ok(())
    }

    fn set_input(&mut self, input: &str) -> Result<()> {
        self.reader = Some(string_reader(input));
        self.line_number = 0;
        Ok(())
    }

    fn reset_input(&mut self) {
        self.reader = None;
        self.line_number = 0;
    }

    fn next_line(&mut self) -> Result<Option<AnnotationLine>> {
        let mut buf = String::new();
        loop {
            let Some(reader) = self.reader.as_mut() else {
                return Ok(None);
            };
            buf.clear();
            let n = reader.read_line(&mut buf)?;
            if n == 0 {
                self.reader = None;
                return Ok(None);
            }
            self.line_number += 1;
            let text = buf.trim();
            if text.is_empty() {
                continue;
            }
            return self.parse_line(text).map(Some);
        }
    }

    fn warnings(&self) -> &[EngineWarning] {
        &self.warnings
    }

    fn clear_warnings(&mut self) {
        self.warnings.clear();
    }
}

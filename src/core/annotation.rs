use serde::Deserialize;
use serde_json::{Map, Value};

/// One consequence of an allele on a transcript or intergenic region.
///
/// Only `variant_allele` is interpreted directly; every other key is kept as
/// raw JSON so requested fields can be projected by name.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ConsequenceRecord {
    pub variant_allele: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl ConsequenceRecord {
    pub fn new(variant_allele: impl Into<String>) -> Self {
        Self {
            variant_allele: variant_allele.into(),
            fields: Map::new(),
        }
    }

    pub fn with_field(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }

    /// Returns a field value, treating JSON `null` as absent.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key).filter(|value| !value.is_null())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColocatedVariant {
    pub id: String,
    pub allele_string: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VcfStrings {
    One(String),
    Many(Vec<String>),
}

impl VcfStrings {
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        let slice: &[String] = match self {
            VcfStrings::One(s) => std::slice::from_ref(s),
            VcfStrings::Many(v) => v,
        };
        slice.iter().map(String::as_str)
    }
}

/// Annotation of a single input variant as produced by the engine.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnnotationLine {
    pub input: String,
    pub transcript_consequences: Vec<ConsequenceRecord>,
    pub intergenic_consequences: Vec<ConsequenceRecord>,
    pub colocated_variants: Vec<ColocatedVariant>,
    pub vcf_string: Option<VcfStrings>,
}

impl AnnotationLine {
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            ..Default::default()
        }
    }

    /// Transcript consequences if there are any, intergenic ones otherwise.
    pub fn consequences(&self) -> &[ConsequenceRecord] {
        if self.transcript_consequences.is_empty() {
            &self.intergenic_consequences
        } else {
            &self.transcript_consequences
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineWarning {
    pub message: String,
}

impl EngineWarning {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consequences_prefer_transcript_scope() {
        let mut line = AnnotationLine::new("rs1");
        line.intergenic_consequences.push(ConsequenceRecord::new("G"));
        assert_eq!(line.consequences()[0].variant_allele, "G");

        line.transcript_consequences.push(ConsequenceRecord::new("T"));
        assert_eq!(line.consequences().len(), 1);
        assert_eq!(line.consequences()[0].variant_allele, "T");
    }

    #[test]
    fn consequence_record_keeps_unknown_keys() {
        let record: ConsequenceRecord = serde_json::from_str(
            r#"{"variant_allele":"A","hgvsc":"ENST1:c.1G>A","hgvsp":null,"strand":1}"#,
        )
        .unwrap();
        assert_eq!(record.variant_allele, "A");
        assert_eq!(record.get("hgvsc"), Some(&Value::from("ENST1:c.1G>A")));
        assert_eq!(record.get("hgvsp"), None);
        assert_eq!(record.get("strand"), Some(&Value::from(1)));
    }

    #[test]
    fn vcf_strings_iterate_single_and_many() {
        let one = VcfStrings::One("1-10-A-T".to_string());
        assert_eq!(one.iter().collect::<Vec<_>>(), vec!["1-10-A-T"]);
        let many = VcfStrings::Many(vec!["1-10-A-T".to_string(), "1-10-A-G".to_string()]);
        assert_eq!(many.iter().count(), 2);
    }
}

use crate::{
    constants::{DEFAULT_DISTANCE, DEFAULT_FIELDS},
    core::{annotation::ConsequenceRecord, attacher::AlleleInfo},
    error::RecodeError,
    utils::util::Result,
};
use serde_json::Value;
use std::{fmt, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Id,
    Hgvsg,
    Hgvsc,
    Hgvsp,
    Spdi,
    VcfString,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::Id,
        Field::Hgvsg,
        Field::Hgvsc,
        Field::Hgvsp,
        Field::Spdi,
        Field::VcfString,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Field::Id => "id",
            Field::Hgvsg => "hgvsg",
            Field::Hgvsc => "hgvsc",
            Field::Hgvsp => "hgvsp",
            Field::Spdi => "spdi",
            Field::VcfString => "vcf_string",
        }
    }

    /// Fields describing the variant as a whole rather than one consequence.
    pub fn is_allele_less(&self) -> bool {
        matches!(self, Field::Id | Field::VcfString)
    }

    /// First value of this field across an allele's consequence records.
    pub fn extract<'r>(
        &self,
        records: impl IntoIterator<Item = &'r ConsequenceRecord>,
    ) -> Option<Value> {
        if self.is_allele_less() {
            return None;
        }
        records
            .into_iter()
            .find_map(|record| record.get(self.name()))
            .cloned()
    }

    /// Value of an allele-less field from the attached allele info.
    pub fn extract_allele_less(&self, info: &AlleleInfo) -> Option<Value> {
        match self {
            Field::Id => info.id.clone().map(Value::from),
            Field::VcfString => info.vcf_string.clone().map(Value::from),
            _ => None,
        }
    }

    fn valid_names() -> String {
        Field::ALL
            .iter()
            .map(Field::name)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl FromStr for Field {
    type Err = RecodeError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase();
        Field::ALL
            .into_iter()
            .find(|field| field.name() == normalized)
            .ok_or_else(|| RecodeError::UnknownField {
                field: s.trim().to_string(),
                valid: Field::valid_names(),
            })
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// The requested output fields, split by the scope they are read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSelection {
    requested: Vec<Field>,
    allele_fields: Vec<Field>,
    allele_less_fields: Vec<Field>,
}

impl FieldSelection {
    /// Builds the selection from field names; an empty list selects the defaults.
    pub fn new<S: AsRef<str>>(names: &[S], include_vcf_string: bool) -> Result<Self> {
        let mut requested: Vec<Field> = Vec::new();
        for name in names.iter().map(AsRef::as_ref) {
            if name.trim().is_empty() {
                continue;
            }
            let field = name.parse::<Field>()?;
            if !requested.contains(&field) {
                requested.push(field);
            }
        }

        if requested.is_empty() {
            requested = DEFAULT_FIELDS
                .split(',')
                .map(str::parse::<Field>)
                .collect::<Result<_>>()?;
        }

        if include_vcf_string && !requested.contains(&Field::VcfString) {
            requested.push(Field::VcfString);
        }

        Ok(Self::from_requested(requested))
    }

    fn from_requested(requested: Vec<Field>) -> Self {
        let (allele_less_fields, allele_fields): (Vec<Field>, Vec<Field>) =
            requested.iter().partition(|field| field.is_allele_less());
        Self {
            requested,
            allele_fields,
            allele_less_fields,
        }
    }

    /// Parses a comma-separated field list such as `id,hgvsg,spdi`.
    pub fn parse(spec: &str, include_vcf_string: bool) -> Result<Self> {
        let names: Vec<&str> = spec.split(',').collect();
        Self::new(&names, include_vcf_string)
    }

    pub fn requested(&self) -> &[Field] {
        &self.requested
    }

    pub fn allele_fields(&self) -> &[Field] {
        &self.allele_fields
    }

    pub fn allele_less_fields(&self) -> &[Field] {
        &self.allele_less_fields
    }

    pub fn contains(&self, field: Field) -> bool {
        self.requested.contains(&field)
    }
}

impl Default for FieldSelection {
    fn default() -> Self {
        Self::from_requested(vec![
            Field::Id,
            Field::Hgvsg,
            Field::Hgvsc,
            Field::Hgvsp,
            Field::Spdi,
        ])
    }
}

/// Engine settings derived from the requested fields. Built once, before
/// any line is requested from the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub hgvsg: bool,
    pub hgvsc: bool,
    pub hgvsp: bool,
    pub spdi: bool,
    pub check_existing: bool,
    pub vcf_string: bool,
    pub distance: u32,
}

impl EngineConfig {
    pub fn from_fields(fields: &FieldSelection) -> Self {
        Self {
            hgvsg: fields.contains(Field::Hgvsg),
            hgvsc: fields.contains(Field::Hgvsc),
            hgvsp: fields.contains(Field::Hgvsp),
            spdi: fields.contains(Field::Spdi),
            check_existing: fields.contains(Field::Id),
            vcf_string: fields.contains(Field::VcfString),
            distance: DEFAULT_DISTANCE,
        }
    }
}

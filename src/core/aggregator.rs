use crate::core::{
    annotation::{AnnotationLine, EngineWarning},
    attacher::{attach_allele_less, AlleleInfo},
    fields::FieldSelection,
    grouper::group_by_allele,
};
use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use serde_json::Value;
use std::{collections::HashMap, ops::Index};

/// Recoded view of one (input, allele) pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultEntry {
    pub input: String,
    #[serde(flatten)]
    pub fields: IndexMap<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warnings: Option<Vec<String>>,
}

impl ResultEntry {
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            fields: IndexMap::new(),
            warnings: None,
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    // Existing values are kept
    fn set_if_absent(&mut self, field: &str, value: Value) {
        self.fields.entry(field.to_string()).or_insert(value);
    }
}

fn push_warnings(slot: &mut Option<Vec<String>>, warnings: &[EngineWarning]) {
    slot.get_or_insert_with(Vec::new)
        .extend(warnings.iter().map(|w| w.message.clone()));
}

/// Entries of one input keyed by allele, in allele discovery order.
///
/// An input that produced no allele keeps its engine warnings here, so they
/// render next to the empty allele map as `{"warnings": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AlleleResults {
    #[serde(flatten)]
    pub alleles: IndexMap<String, ResultEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warnings: Option<Vec<String>>,
}

impl AlleleResults {
    pub fn len(&self) -> usize {
        self.alleles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alleles.is_empty()
    }

    pub fn get(&self, allele: &str) -> Option<&ResultEntry> {
        self.alleles.get(allele)
    }
}

impl Index<&str> for AlleleResults {
    type Output = ResultEntry;

    fn index(&self, allele: &str) -> &ResultEntry {
        &self.alleles[allele]
    }
}

/// Final result of one recode call: one allele map per distinct input, in
/// first-seen input order.
pub type RecodeOutput = Vec<AlleleResults>;

/// Accumulates recoded entries for a single recode call.
#[derive(Debug)]
pub struct RecodeContext<'a> {
    fields: &'a FieldSelection,
    results: HashMap<String, AlleleResults>,
    order: IndexSet<String>,
    lines: usize,
}

impl<'a> RecodeContext<'a> {
    pub fn new(fields: &'a FieldSelection) -> Self {
        Self {
            fields,
            results: HashMap::new(),
            order: IndexSet::new(),
            lines: 0,
        }
    }

    pub fn n_inputs(&self) -> usize {
        self.order.len()
    }

    pub fn n_lines(&self) -> usize {
        self.lines
    }

    /// Merges one annotation line and the warnings raised while producing it.
    pub fn merge_line(&mut self, line: &AnnotationLine, warnings: &[EngineWarning]) {
        self.lines += 1;
        let fields = self.fields;
        let bucket = group_by_allele(line);
        let allele_info = attach_allele_less(line);
        log::trace!(
            "Merging input {} with {} consequence allele(s), {} allele-less allele(s)",
            line.input,
            bucket.len(),
            allele_info.len()
        );

        let mut touched: Vec<&str> = Vec::with_capacity(bucket.len());
        for (&allele, records) in &bucket {
            let entry = self.entry(&line.input, allele);
            for field in fields.allele_fields() {
                if let Some(value) = field.extract(records.iter().copied()) {
                    entry.set_if_absent(field.name(), value);
                }
            }
            if let Some(info) = allele_info.get(allele) {
                for (name, value) in allele_less_values(fields, info) {
                    entry.set_if_absent(name, value);
                }
            }
            touched.push(allele);
        }

        // Without consequences, fall back to the alleles named by the VCF
        // strings and co-located variants that carry a requested field.
        if bucket.is_empty() {
            for (allele, info) in &allele_info {
                let values = allele_less_values(fields, info);
                if values.is_empty() {
                    continue;
                }
                let entry = self.entry(&line.input, allele);
                for (name, value) in values {
                    entry.set_if_absent(name, value);
                }
                touched.push(allele.as_str());
            }
        }

        self.order.insert(line.input.clone());
        let results = self.results.entry(line.input.clone()).or_default();
        if touched.is_empty() {
            log::warn!(
                "Input {} produced no alleles, it is reported without entries",
                line.input
            );
            if !warnings.is_empty() {
                push_warnings(&mut results.warnings, warnings);
            }
            return;
        }
        if warnings.is_empty() {
            return;
        }
        for allele in touched {
            if let Some(entry) = results.alleles.get_mut(allele) {
                push_warnings(&mut entry.warnings, warnings);
            }
        }
    }

    /// Renders the accumulated entries in first-seen input order.
    pub fn finish(mut self) -> RecodeOutput {
        self.order
            .iter()
            .map(|input| self.results.remove(input).unwrap_or_default())
            .collect()
    }

    fn entry(&mut self, input: &str, allele: &str) -> &mut ResultEntry {
        self.results
            .entry(input.to_string())
            .or_default()
            .alleles
            .entry(allele.to_string())
            .or_insert_with(|| ResultEntry::new(input))
    }
}

fn allele_less_values(fields: &FieldSelection, info: &AlleleInfo) -> Vec<(&'static str, Value)> {
    fields
        .allele_less_fields()
        .iter()
        .filter_map(|field| Some((field.name(), field.extract_allele_less(info)?)))
        .collect()
}

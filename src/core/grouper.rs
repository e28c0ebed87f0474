use crate::core::annotation::{AnnotationLine, ConsequenceRecord};
use indexmap::IndexMap;

/// Consequence records of one line keyed by allele, in allele discovery order.
pub type AlleleBucket<'a> = IndexMap<&'a str, Vec<&'a ConsequenceRecord>>;

pub fn group_by_allele(line: &AnnotationLine) -> AlleleBucket<'_> {
    let mut bucket: AlleleBucket = IndexMap::new();
    for record in line.consequences() {
        bucket
            .entry(record.variant_allele.as_str())
            .or_default()
            .push(record);
    }
    bucket
}

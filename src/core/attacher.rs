use crate::{
    constants::{ALLELE_STRING_DELIMITER, COSMIC_TAG, VCF_STRING_DELIMITER},
    core::annotation::{AnnotationLine, ColocatedVariant, VcfStrings},
};
use indexmap::IndexMap;

/// Allele-less annotations that belong to one allele.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlleleInfo {
    pub vcf_string: Option<String>,
    pub id: Option<String>,
}

pub type VcfAlleleInfo = IndexMap<String, AlleleInfo>;

/// Maps a line's VCF strings and co-located variant IDs onto the alleles
/// they describe.
pub fn attach_allele_less(line: &AnnotationLine) -> VcfAlleleInfo {
    let mut info = VcfAlleleInfo::new();
    if let Some(vcf_strings) = &line.vcf_string {
        attach_vcf_strings(vcf_strings, &mut info);
    }
    attach_colocated_ids(&line.colocated_variants, &mut info);
    info
}

/// The allele of a VCF string is its last `-` separated segment.
pub fn vcf_string_allele(vcf_string: &str) -> Option<&str> {
    let (_, allele) = vcf_string.rsplit_once(VCF_STRING_DELIMITER)?;
    (!allele.is_empty()).then_some(allele)
}

fn attach_vcf_strings(vcf_strings: &VcfStrings, info: &mut VcfAlleleInfo) {
    for vcf_string in vcf_strings.iter() {
        match vcf_string_allele(vcf_string) {
            Some(allele) => {
                info.entry(allele.to_string()).or_default().vcf_string =
                    Some(vcf_string.to_string());
            }
            None => log::debug!("Skipping unparsable VCF string '{}'", vcf_string),
        }
    }
}

fn attach_colocated_ids(colocated: &[ColocatedVariant], info: &mut VcfAlleleInfo) {
    for variant in colocated {
        let Some(allele_string) = variant.allele_string.as_deref() else {
            continue;
        };
        if allele_string.contains(COSMIC_TAG) {
            continue;
        }
        // First segment is the reference allele
        for allele in allele_string.split(ALLELE_STRING_DELIMITER).skip(1) {
            info.entry(allele.to_string()).or_default().id = Some(variant.id.clone());
        }
    }
}

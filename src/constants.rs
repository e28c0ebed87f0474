pub const DEFAULT_FIELDS: &str = "id,hgvsg,hgvsc,hgvsp,spdi";
pub const DEFAULT_DISTANCE: u32 = 0; // overlap-only, no up/downstream padding
pub const DEFAULT_PRETTY: bool = false;
pub const DEFAULT_VCF_STRING: bool = false;

// Co-located variants from this source never contribute identifiers
pub const COSMIC_TAG: &str = "COSMIC";

pub const VCF_STRING_DELIMITER: char = '-';
pub const ALLELE_STRING_DELIMITER: char = '/';

pub const MERGED_VCF_SUFFIX: &str = "_VEP.vcf.gz";
pub const CSI_MIN_SHIFT: u32 = 14;

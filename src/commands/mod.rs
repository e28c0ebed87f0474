mod merge_vcf;
mod recode;

pub use merge_vcf::{merge_vcf, merged_vcf_path};
pub use recode::recode;

pub mod cli;
pub mod commands;
pub mod error;

pub mod core {
    pub mod aggregator;
    pub mod annotation;
    pub mod attacher;
    pub mod engine;
    pub mod fields;
    pub mod grouper;
    pub mod recoder;

    #[cfg(test)]
    pub(crate) mod test_utils;
}

pub mod io {
    pub mod json_engine;
    pub mod readers;
    pub mod result_writer;
    pub mod vcf_writer;
}

pub mod utils {
    pub mod util;
}

pub mod constants;

pub use constants::*;

use crate::{
    core::{
        aggregator::{RecodeContext, RecodeOutput},
        engine::AnnotationEngine,
        fields::{EngineConfig, FieldSelection},
    },
    error::RecodeError,
    utils::util::{format_number_with_commas, Result},
};

/// Pulls annotation lines from an engine and reshapes them into recoded
/// per-allele entries.
pub struct Recoder<E: AnnotationEngine> {
    engine: E,
    fields: FieldSelection,
}

impl<E: AnnotationEngine> Recoder<E> {
    /// Configures `engine` for `fields` and wraps it.
    pub fn new(mut engine: E, fields: FieldSelection) -> Result<Self> {
        let config = EngineConfig::from_fields(&fields);
        log::debug!("Engine configuration: {:?}", config);
        engine.configure(&config)?;
        Ok(Self { engine, fields })
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Recodes a single input. Engine state is reset before and after.
    pub fn recode(&mut self, input: &str) -> Result<RecodeOutput> {
        if input.trim().is_empty() {
            return Err(RecodeError::MissingInput);
        }
        self.engine.reset_input();
        self.engine.clear_warnings();

        let output = self
            .engine
            .set_input(input)
            .and_then(|_| self.collect());

        self.engine.reset_input();
        self.engine.clear_warnings();
        output
    }

    /// Recodes everything the engine was set up to read.
    pub fn recode_all(&mut self) -> Result<RecodeOutput> {
        self.engine.clear_warnings();
        let output = self.collect();
        self.engine.clear_warnings();
        output
    }

    fn collect(&mut self) -> Result<RecodeOutput> {
        let mut context = RecodeContext::new(&self.fields);
        while let Some(line) = self.engine.next_line()? {
            context.merge_line(&line, self.engine.warnings());
            self.engine.clear_warnings();
        }
        log::debug!(
            "Recoded {} annotation line(s) into {} input(s)",
            format_number_with_commas(context.n_lines()),
            format_number_with_commas(context.n_inputs())
        );
        Ok(context.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{
        annotation::{
            AnnotationLine, ColocatedVariant, ConsequenceRecord, EngineWarning, VcfStrings,
        },
        test_utils::MockEngine,
    };
    use crate::utils::util::init_logger;
    use serde_json::{json, Value};

    fn rs699(alleles: &[&str]) -> AnnotationLine {
        let mut line = AnnotationLine::new("rs699");
        line.transcript_consequences = alleles
            .iter()
            .map(|allele| {
                ConsequenceRecord::new(*allele)
                    .with_field("hgvsc", format!("ENST00000366667.6:c.803T>{allele}"))
            })
            .collect();
        line.vcf_string = Some(VcfStrings::One("1-230710048-A-G".to_string()));
        line.colocated_variants = vec![ColocatedVariant {
            id: "rs699".to_string(),
            allele_string: Some("A/G".to_string()),
        }];
        line
    }

    fn line_with_allele(input: &str, allele: &str) -> AnnotationLine {
        let mut line = AnnotationLine::new(input);
        line.transcript_consequences = vec![ConsequenceRecord::new(allele)];
        line
    }

    #[test]
    fn new_configures_engine_once() {
        let fields = FieldSelection::parse("id,spdi", true).unwrap();
        let recoder = Recoder::new(MockEngine::default(), fields).unwrap();
        let config = recoder.engine().config.clone().unwrap();
        assert!(config.check_existing && config.spdi && config.vcf_string);
        assert!(!config.hgvsg);
        assert_eq!(config.distance, 0);
    }

    #[test]
    fn recode_rs699_end_to_end() {
        init_logger();
        let engine = MockEngine::new(vec![rs699(&["A", "G"])]);
        let fields = FieldSelection::parse("id,hgvsc", true).unwrap();
        let mut recoder = Recoder::new(engine, fields).unwrap();
        let output = recoder.recode("rs699").unwrap();

        assert_eq!(
            serde_json::to_value(&output).unwrap(),
            json!([{
                "A": {
                    "input": "rs699",
                    "hgvsc": "ENST00000366667.6:c.803T>A"
                },
                "G": {
                    "input": "rs699",
                    "hgvsc": "ENST00000366667.6:c.803T>G",
                    "id": "rs699",
                    "vcf_string": "1-230710048-A-G"
                }
            }])
        );
    }

    #[test]
    fn recode_alleles_without_vcf_match_carry_no_allele_less_fields() {
        let engine = MockEngine::new(vec![rs699(&["A", "T"])]);
        let mut recoder = Recoder::new(engine, FieldSelection::parse("", true).unwrap()).unwrap();
        let output = recoder.recode("rs699").unwrap();

        assert_eq!(output.len(), 1);
        assert_eq!(output[0].len(), 2);
        for entry in output[0].alleles.values() {
            assert_eq!(entry.input, "rs699");
            assert!(entry.get("id").is_none());
            assert!(entry.get("vcf_string").is_none());
        }
    }

    #[test]
    fn recode_rejects_empty_input_without_touching_engine() {
        let mut recoder = Recoder::new(MockEngine::default(), FieldSelection::default()).unwrap();
        assert!(matches!(recoder.recode("  "), Err(RecodeError::MissingInput)));
        assert_eq!(recoder.engine().set_input_calls, 0);
        assert_eq!(recoder.engine().reset_calls, 0);
    }

    #[test]
    fn recode_resets_state_between_calls() {
        let engine = MockEngine::new(vec![
            line_with_allele("rs1", "T"),
            line_with_allele("rs2", "C"),
        ]);
        let mut recoder = Recoder::new(engine, FieldSelection::default()).unwrap();

        let first = recoder.recode("rs1").unwrap();
        let second = recoder.recode("rs2").unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0]["T"].input, "rs1");
        assert_eq!(second.len(), 1);
        assert_eq!(second[0]["C"].input, "rs2");
        assert!(!recoder.engine().has_pending());
        assert_eq!(recoder.engine().reset_calls, 4);
    }

    #[test]
    fn recode_all_preserves_first_seen_order() {
        let engine = MockEngine::new(vec![
            line_with_allele("rs3", "A"),
            line_with_allele("rs1", "G"),
            line_with_allele("rs3", "A"),
            line_with_allele("rs2", "T"),
        ]);
        let mut recoder = Recoder::new(engine, FieldSelection::default()).unwrap();
        let output = recoder.recode_all().unwrap();
        let inputs: Vec<&str> = output
            .iter()
            .map(|alleles| alleles.alleles[0].input.as_str())
            .collect();
        assert_eq!(inputs, vec!["rs3", "rs1", "rs2"]);
    }

    #[test]
    fn warnings_do_not_leak_into_next_line() {
        let engine = MockEngine::with_warnings(vec![
            (
                line_with_allele("rs1", "T"),
                vec![EngineWarning::new("Possible invalid use of reference allele")],
            ),
            (line_with_allele("rs2", "T"), Vec::new()),
        ]);
        let mut recoder = Recoder::new(engine, FieldSelection::default()).unwrap();
        let output = recoder.recode_all().unwrap();

        assert_eq!(
            serde_json::to_value(&output[0]["T"]).unwrap()["warnings"],
            json!(["Possible invalid use of reference allele"])
        );
        assert_eq!(
            serde_json::to_value(&output[1]["T"]).unwrap().get("warnings"),
            None::<&Value>
        );
        assert!(recoder.engine().warnings().is_empty());
    }

    #[test]
    fn engine_failures_propagate() {
        let mut engine = MockEngine::new(vec![line_with_allele("rs1", "T")]);
        engine.fail_on = Some("rs1".to_string());
        let mut recoder = Recoder::new(engine, FieldSelection::default()).unwrap();
        let err = recoder.recode("rs1").unwrap_err();
        assert!(err.to_string().contains("Lookup failed for rs1"));
        assert!(!recoder.engine().has_pending());
    }
}

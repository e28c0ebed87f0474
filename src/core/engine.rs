use crate::{
    core::{
        annotation::{AnnotationLine, EngineWarning},
        fields::EngineConfig,
    },
    utils::util::Result,
};

/// Source of annotation lines, pulled one at a time by the recoder.
///
/// Warnings raised while producing a line stay available through
/// [`AnnotationEngine::warnings`] until [`AnnotationEngine::clear_warnings`]
/// is called. Errors returned by an engine are not retried.
pub trait AnnotationEngine {
    /// Applies the engine settings. Called once, before any line is requested.
    fn configure(&mut self, config: &EngineConfig) -> Result<()>;

    /// Replaces the pending input with `input`.
    fn set_input(&mut self, input: &str) -> Result<()>;

    /// Drops whatever input is still pending.
    fn reset_input(&mut self);

    /// Next annotation line, or `None` once the input is exhausted.
    fn next_line(&mut self) -> Result<Option<AnnotationLine>>;

    fn warnings(&self) -> &[EngineWarning];

    fn clear_warnings(&mut self);
}

use thiserror::Error;

/// Failures while resolving, selecting or expanding metadata.
///
/// None of these are recovered locally: a page whose metadata cannot be
/// resolved is a content bug that should surface to the caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MetaError {
    #[error("translation missing: {key}")]
    MissingTranslation { key: String },
    #[error("no template matches the available variables (candidates: {})", .candidates.join(", "))]
    NoMatchingTemplate { candidates: Vec<String> },
    #[error("variable `{name}` is not set (template: {template:?})")]
    MissingVariable { name: String, template: String },
}

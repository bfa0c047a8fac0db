use thiserror::Error;

/// Internal strategy failures. These never escape [`crate::parse_shop_text`];
/// they exist so fallthrough logging can say *why* a dialect attempt failed.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("strict JSON parse failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML parse failed: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("loose literal parse failed at byte {at}")]
    Literal { at: usize },

    #[error("no balanced object found")]
    Unbalanced,
}

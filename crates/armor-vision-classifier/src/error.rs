use std::path::PathBuf;

/// Errors raised while loading or running the number classifier.
#[derive(thiserror::Error, Debug)]
pub enum ClassifierError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("invalid model: {0}")]
    ModelShape(String),
    #[error("label table is empty")]
    EmptyLabels,
    #[error("model has {classes} classes but {labels} labels were loaded")]
    LabelCountMismatch { classes: usize, labels: usize },
    #[error("model expects {expected} inputs, got {got}")]
    InputSize { expected: usize, got: usize },
}

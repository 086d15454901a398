//! Domain-level error taxonomy for BrainBug.
//!
//! Row-level defects (records missing code) are never raised; they are
//! dropped and counted by the curator. Unknown fault codes degrade to a
//! generic classification. Everything below is a corpus- or contract-level
//! defect and is surfaced to the caller.

/// BrainBug domain errors.
#[derive(Debug, thiserror::Error)]
pub enum BrainbugError {
    #[error("malformed input: {0}")]
    MalformedInput(String),

    #[error("length mismatch: {predictions} predictions vs {references} references")]
    LengthMismatch {
        predictions: usize,
        references: usize,
    },

    #[error("nothing to evaluate: prediction and reference sequences are empty")]
    EmptyEvaluation,

    #[error("invalid split ratios: {0}")]
    InvalidRatios(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("inference error: {0}")]
    Inference(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for BrainbugError {
    fn from(err: reqwest::Error) -> Self {
        BrainbugError::Inference(err.to_string())
    }
}

/// Result type for BrainBug domain operations.
pub type Result<T> = std::result::Result<T, BrainbugError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_mismatch_display() {
        let err = BrainbugError::LengthMismatch {
            predictions: 3,
            references: 4,
        };
        let msg = err.to_string();
        assert!(msg.contains("length mismatch"));
        assert!(msg.contains('3'));
        assert!(msg.contains('4'));
    }

    #[test]
    fn test_malformed_input_display() {
        let err = BrainbugError::MalformedInput("missing column: Project".to_string());
        assert!(err.to_string().contains("malformed input"));
        assert!(err.to_string().contains("Project"));
    }

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: BrainbugError = io.into();
        assert!(matches!(err, BrainbugError::Io(_)));
    }
}

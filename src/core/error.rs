use crate::core::record::RecordId;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PolicyError {
    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    #[error("Record '{0}' not found")]
    NotFound(RecordId),

    #[error("Persistence warning: {0}")]
    PersistenceWarning(String),

    #[error("Import row {row} skipped: {reason}")]
    ImportRowSkipped { row: usize, reason: String },

    #[error("Codec failure: {0}")]
    CodecFailure(String),
}

impl PolicyError {
    /// Fatal errors abort the operation that raised them. Non-fatal ones are
    /// carried alongside a successful result in [`Outcome::warnings`].
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            Self::PersistenceWarning(_) | Self::ImportRowSkipped { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, PolicyError>;

impl From<serde_json::Error> for PolicyError {
    fn from(err: serde_json::Error) -> Self {
        Self::CodecFailure(err.to_string())
    }
}

impl From<std::io::Error> for PolicyError {
    fn from(err: std::io::Error) -> Self {
        Self::PersistenceWarning(err.to_string())
    }
}

/// Result of an operation that completed, together with any non-fatal
/// warnings raised on the way (failed saves, skipped import rows).
#[derive(Debug, Clone)]
pub struct Outcome<T> {
    pub value: T,
    pub warnings: Vec<PolicyError>,
}

impl<T> Outcome<T> {
    pub fn clean(value: T) -> Self {
        Self {
            value,
            warnings: Vec::new(),
        }
    }

    pub fn with_warnings(value: T, warnings: Vec<PolicyError>) -> Self {
        Self { value, warnings }
    }

    pub fn push_warning(&mut self, warning: PolicyError) {
        self.warnings.push(warning);
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        Outcome {
            value: f(self.value),
            warnings: self.warnings,
        }
    }

    pub fn into_value(self) -> T {
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatality_split() {
        assert!(PolicyError::MalformedRecord("x".into()).is_fatal());
        assert!(PolicyError::NotFound(RecordId::from("1")).is_fatal());
        assert!(PolicyError::CodecFailure("bad".into()).is_fatal());
        assert!(!PolicyError::PersistenceWarning("disk".into()).is_fatal());
        assert!(
            !PolicyError::ImportRowSkipped {
                row: 2,
                reason: "missing plate".into()
            }
            .is_fatal()
        );
    }

    #[test]
    fn test_outcome_map_keeps_warnings() {
        let mut outcome = Outcome::clean(2);
        outcome.push_warning(PolicyError::PersistenceWarning("quota".into()));
        let mapped = outcome.map(|v| v * 10);
        assert_eq!(mapped.value, 20);
        assert_eq!(mapped.warnings.len(), 1);
    }
}

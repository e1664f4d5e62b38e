use thiserror::Error;
use uuid::Uuid;

/// Failures reported by a [`BrainStore`](crate::store::BrainStore) adapter.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The row does not exist or is not visible to the requesting owner.
    #[error("{entity} `{id}` not found")]
    NotFound { entity: &'static str, id: Uuid },
    /// The backing service could not be reached.
    #[error("store unavailable: {message}")]
    Unavailable { message: String },
    #[error("store i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("store serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: Uuid) -> Self {
        Self::NotFound { entity, id }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }
}

/// Rejections raised while building an input payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must not be empty")]
    Empty { field: &'static str },
    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },
    #[error("{field} must be greater than zero")]
    NotPositive { field: &'static str },
}

#[derive(Debug, Error)]
pub enum BrainError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

pub type StoreResult<T> = Result<T, StoreError>;
pub type BrainResult<T> = Result<T, BrainError>;

pub(crate) fn required_text(
    value: impl Into<String>,
    field: &'static str,
) -> Result<String, ValidationError> {
    let trimmed = value.into().trim().to_string();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    Ok(trimmed)
}

pub(crate) fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

pub(crate) fn finite(value: f64, field: &'static str) -> Result<f64, ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NotFinite { field });
    }
    Ok(value)
}

pub(crate) fn positive(value: f64, field: &'static str) -> Result<f64, ValidationError> {
    let value = finite(value, field)?;
    if value <= 0.0 {
        return Err(ValidationError::NotPositive { field });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_text_trims_and_rejects_blank() {
        assert_eq!(required_text("  Read  ", "name").unwrap(), "Read");
        assert_eq!(
            required_text("   ", "name"),
            Err(ValidationError::Empty { field: "name" })
        );
    }

    #[test]
    fn positive_rejects_zero_and_nan() {
        assert_eq!(
            positive(0.0, "amount"),
            Err(ValidationError::NotPositive { field: "amount" })
        );
        assert_eq!(
            positive(f64::NAN, "amount"),
            Err(ValidationError::NotFinite { field: "amount" })
        );
        assert_eq!(positive(12.5, "amount").unwrap(), 12.5);
    }

    #[test]
    fn optional_text_drops_blank_values() {
        assert_eq!(optional_text(Some("  ".into())), None);
        assert_eq!(optional_text(Some(" rent ".into())).as_deref(), Some("rent"));
        assert_eq!(optional_text(None), None);
    }
}

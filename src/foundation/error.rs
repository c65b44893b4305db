pub type GeoTrailResult<T> = Result<T, GeoTrailError>;

#[derive(thiserror::Error, Debug)]
pub enum GeoTrailError {
    /// The dataset disagrees with itself: unknown location, missing column, bad cell.
    #[error("data integrity error: {0}")]
    DataIntegrity(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("io error: {0}")]
    Io(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl GeoTrailError {
    pub fn data_integrity(msg: impl Into<String>) -> Self {
        Self::DataIntegrity(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }

    pub fn is_data_integrity(&self) -> bool {
        matches!(self, Self::DataIntegrity(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(
            GeoTrailError::data_integrity("x")
                .to_string()
                .contains("data integrity error:")
        );
        assert!(
            GeoTrailError::validation("x")
                .to_string()
                .contains("validation error:")
        );
        assert!(GeoTrailError::io("x").to_string().contains("io error:"));
    }

    #[test]
    fn other_preserves_source() {
        let base = std::io::Error::other("boom");
        let err = GeoTrailError::Other(anyhow::Error::new(base));
        assert!(err.to_string().contains("boom"));
        assert!(!err.is_data_integrity());
    }
}

use thiserror::Error;

/// Validation failures raised at pipeline entry, before any decode work.
///
/// These are fatal to a single call: no partial detection list is ever returned
/// alongside one of these.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    #[error("shape error: {0}")]
    Shape(String),
    #[error("descriptor mismatch: {0}")]
    DescriptorMismatch(String),
    #[error("invalid thresholds: {0}")]
    InvalidThresholds(String),
}

impl DecodeError {
    pub fn shape(msg: impl Into<String>) -> Self {
        DecodeError::Shape(msg.into())
    }

    pub fn descriptor(msg: impl Into<String>) -> Self {
        DecodeError::DescriptorMismatch(msg.into())
    }

    pub fn thresholds(msg: impl Into<String>) -> Self {
        DecodeError::InvalidThresholds(msg.into())
    }

    /// Status code handed back across the C ABI.
    pub fn code(&self) -> i32 {
        match self {
            DecodeError::Shape(_) => -2,
            DecodeError::DescriptorMismatch(_) => -3,
            DecodeError::InvalidThresholds(_) => -4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_kind_and_message() {
        let err = DecodeError::shape("rank 4 not supported");
        assert_eq!(err.to_string(), "shape error: rank 4 not supported");

        let err = DecodeError::descriptor("stride 5 < 6");
        assert_eq!(err.to_string(), "descriptor mismatch: stride 5 < 6");
        assert_eq!(err.code(), -3);
    }
}

use thiserror::Error;

/// Errors returned by the buffer-consuming operations (`public_root`, `sign`,
/// `recover`). The size oracles never return this type; they keep the
/// `Sz`-with-zero-sentinel contract described in `mls_core::size`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("invalid parameters: {reason}")]
    InvalidParameters { reason: &'static str },

    #[error("hash capability allocation failed")]
    CapabilityUnavailable,

    #[error("malformed signature: {reason}")]
    MalformedSignature { reason: &'static str },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_parameters_message_includes_reason() {
        let err = CoreError::InvalidParameters {
            reason: "offset out of range",
        };
        assert_eq!(err.to_string(), "invalid parameters: offset out of range");
    }

    #[test]
    fn capability_unavailable_message() {
        assert_eq!(
            CoreError::CapabilityUnavailable.to_string(),
            "hash capability allocation failed"
        );
    }

    #[test]
    fn malformed_signature_message_includes_reason() {
        let err = CoreError::MalformedSignature {
            reason: "buffer too short for left stack",
        };
        assert_eq!(
            err.to_string(),
            "malformed signature: buffer too short for left stack"
        );
    }

    #[test]
    fn variants_are_comparable() {
        assert_eq!(
            CoreError::CapabilityUnavailable,
            CoreError::CapabilityUnavailable
        );
        assert_ne!(
            CoreError::CapabilityUnavailable,
            CoreError::InvalidParameters { reason: "x" }
        );
    }
}

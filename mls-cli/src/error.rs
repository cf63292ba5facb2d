use thiserror::Error;

/// Errors surfaced by the CLI and its owning wrapper layer, in the style of
/// `lib/src/xmss/error.rs`'s `WrapperError`: one variant per failure
/// boundary, with enough context embedded to print a useful message without
/// the caller needing to inspect a lower-level error's internals.
#[derive(Debug, Error)]
pub enum WrapperError {
    #[error("core engine error: {0}")]
    Core(#[from] mls_core::CoreError),

    #[error("I/O error reading/writing key material: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid parameters: {reason}")]
    ParameterError { reason: String },

    #[error("signing offset {offset} out of range for s={s} (2^s = {limit})")]
    OffsetOutOfRange { offset: u32, s: u32, limit: u64 },

    #[error("report serialization failed: {0}")]
    SerializationError(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_error_is_wrapped_with_context() {
        let err: WrapperError = mls_core::CoreError::CapabilityUnavailable.into();
        assert!(err.to_string().contains("core engine error"));
    }

    #[test]
    fn offset_out_of_range_message_includes_values() {
        let err = WrapperError::OffsetOutOfRange {
            offset: 9,
            s: 3,
            limit: 8,
        };
        let msg = err.to_string();
        assert!(msg.contains('9'));
        assert!(msg.contains('3'));
        assert!(msg.contains('8'));
    }
}

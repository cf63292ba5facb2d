//! Library half of the `mls-cli` package: the owning convenience wrapper,
//! error type, and benchmark-report tooling the `mls-cli` binary drives.
//! Split out so `tests/integration_test.rs` can exercise the wrapper
//! directly without going through the binary.

pub mod error;
pub mod report;
pub mod wrapper;

pub use error::WrapperError;

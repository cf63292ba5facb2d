//! Pure, caller-buffered Merkle/Lamport one-time-signature engine.
//!
//! No heap allocation happens on the hot paths in this crate. Every scratch
//! buffer is either a fixed-size stack array or a slice the caller provides,
//! sized ahead of time by the functions in [`size`]. Nothing here retries a
//! failed hash capability or logs anything; callers that want either wrap
//! this crate (see `mls-cli`).

mod capability;
mod error;
mod lamport;
mod public;
mod recover;
mod sign;
mod stack;

pub mod size;

pub use capability::{HashCapability, MAX_DIGEST};
pub use error::CoreError;
pub use public::public_root;
pub use recover::recover;
pub use sign::sign;
pub use size::{eg_sz, ew_sz, pr_sz, rc_sz, sg_sz, wa_sz, Sz};

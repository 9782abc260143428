//! Optional observability helpers for token acquisition.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit a `credential_broker.acquire` span per acquisition (fields
//!   `provider` and `stage`), a debug event per attempt, and a warning when every strategy fails.
//! - Enable `metrics` to increment `credential_broker_acquire_total` (labeled by `outcome`) and
//!   `credential_broker_attempt_total` (labeled by `method` + `outcome`).

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::{_prelude::*, error::FailureKind};

/// Outcome labels recorded for acquisitions and attempts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowOutcome {
	/// Entry to the broker.
	Attempt,
	/// A token was issued.
	Success,
	/// Configuration error or strategy exhaustion.
	Failure,
	/// A single attempt failed with the given kind.
	Rejected(FailureKind),
}
impl FlowOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowOutcome::Attempt => "attempt",
			FlowOutcome::Success => "success",
			FlowOutcome::Failure => "failure",
			FlowOutcome::Rejected(kind) => kind.as_str(),
		}
	}
}
impl Display for FlowOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

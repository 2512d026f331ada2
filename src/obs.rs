//! Optional observability helpers for handshake legs and signed calls.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `oauth1_transport.flow` with the `flow`
//!   (operation family) and `stage` (call site) fields.
//! - Enable `metrics` to increment the `oauth1_transport_flow_total` counter for every
//!   attempt/success/failure, labeled by `flow` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Records the attempt, runs `fut` inside the flow span, then records the outcome.
pub(crate) async fn observe<T, Fut>(kind: FlowKind, stage: &'static str, fut: Fut) -> Result<T>
where
	Fut: Future<Output = Result<T>>,
{
	let span = FlowSpan::new(kind, stage);

	record_flow_outcome(kind, FlowOutcome::Attempt);

	let result = span.instrument(fut).await;

	match &result {
		Ok(_) => record_flow_outcome(kind, FlowOutcome::Success),
		Err(_) => record_flow_outcome(kind, FlowOutcome::Failure),
	}

	result
}

/// Operation families observed by the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowKind {
	/// Request-token leg of the handshake.
	RequestToken,
	/// Verifier exchange for an access token.
	AccessToken,
	/// Session-handle refresh.
	Refresh,
	/// Signed JSON verb call.
	Api,
	/// Streamed binary download.
	Download,
	/// Buffered binary upload.
	Upload,
}
impl FlowKind {
	/// Every family, in handshake-then-traffic order.
	pub const ALL: [FlowKind; 6] = [
		FlowKind::RequestToken,
		FlowKind::AccessToken,
		FlowKind::Refresh,
		FlowKind::Api,
		FlowKind::Download,
		FlowKind::Upload,
	];

	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowKind::RequestToken => "request_token",
			FlowKind::AccessToken => "access_token",
			FlowKind::Refresh => "refresh",
			FlowKind::Api => "api",
			FlowKind::Download => "download",
			FlowKind::Upload => "upload",
		}
	}
}
impl Display for FlowKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowOutcome {
	/// Entry to an operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl FlowOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowOutcome::Attempt => "attempt",
			FlowOutcome::Success => "success",
			FlowOutcome::Failure => "failure",
		}
	}
}
impl Display for FlowOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

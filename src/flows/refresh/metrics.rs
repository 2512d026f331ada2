// std
use std::sync::atomic::{AtomicU64, Ordering::Relaxed};

/// How a single refresh call ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum RefreshOutcome {
	/// The access-token endpoint issued a new token.
	Rotated,
	/// Another caller rotated the observed token while this one waited on the guard.
	Coalesced,
	/// The call surfaced an error.
	Failed,
}

/// Point-in-time copy of [`RefreshMetrics`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RefreshCounts {
	/// Refresh calls entered, whatever their outcome.
	pub attempts: u64,
	/// Calls that reached the access-token endpoint and stored its answer.
	pub rotated: u64,
	/// Calls satisfied by a rotation another caller performed.
	pub coalesced: u64,
	/// Calls that returned an error.
	pub failed: u64,
}

/// Session-handle refresh counters, shared by every clone of a client.
///
/// `rotated` is the number of network refreshes. Under contention it stays at one per
/// expired token while `coalesced` absorbs the waiting callers.
#[derive(Debug, Default)]
pub struct RefreshMetrics {
	attempts: AtomicU64,
	rotated: AtomicU64,
	coalesced: AtomicU64,
	failed: AtomicU64,
}
impl RefreshMetrics {
	/// Reads every counter at once.
	pub fn snapshot(&self) -> RefreshCounts {
		RefreshCounts {
			attempts: self.attempts.load(Relaxed),
			rotated: self.rotated.load(Relaxed),
			coalesced: self.coalesced.load(Relaxed),
			failed: self.failed.load(Relaxed),
		}
	}

	/// Refresh calls entered.
	pub fn attempts(&self) -> u64 {
		self.attempts.load(Relaxed)
	}

	/// Calls that ended with a usable token, rotated or coalesced.
	pub fn successes(&self) -> u64 {
		self.rotated.load(Relaxed) + self.coalesced.load(Relaxed)
	}

	/// Calls that returned an error.
	pub fn failures(&self) -> u64 {
		self.failed.load(Relaxed)
	}

	pub(crate) fn record_attempt(&self) {
		self.attempts.fetch_add(1, Relaxed);
	}

	pub(crate) fn record(&self, outcome: RefreshOutcome) {
		let counter = match outcome {
			RefreshOutcome::Rotated => &self.rotated,
			RefreshOutcome::Coalesced => &self.coalesced,
			RefreshOutcome::Failed => &self.failed,
		};

		counter.fetch_add(1, Relaxed);
	}
}

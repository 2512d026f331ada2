// self
use crate::obs::{FlowKind, FlowOutcome};

/// Counter bumped once per attempt and once per settled outcome.
pub const FLOW_COUNTER: &str = "oauth1_transport_flow_total";

/// Increments [`FLOW_COUNTER`] with `flow` and `outcome` labels.
///
/// Nothing is emitted unless the `metrics` feature is enabled and the host application has
/// installed a recorder.
pub fn record_flow_outcome(kind: FlowKind, outcome: FlowOutcome) {
	#[cfg(feature = "metrics")]
	metrics::counter!(FLOW_COUNTER, "flow" => kind.as_str(), "outcome" => outcome.as_str())
		.increment(1);
	#[cfg(not(feature = "metrics"))]
	let _ = (kind, outcome);
}

#[cfg(test)]
mod tests {
	// std
	use std::collections::BTreeSet;
	// self
	use super::*;

	#[test]
	fn every_series_has_distinct_labels() {
		let outcomes = [FlowOutcome::Attempt, FlowOutcome::Success, FlowOutcome::Failure];
		let mut series = BTreeSet::new();

		for kind in FlowKind::ALL {
			for outcome in outcomes {
				record_flow_outcome(kind, outcome);
				series.insert((kind.as_str(), outcome.as_str()));
			}
		}

		assert_eq!(series.len(), FlowKind::ALL.len() * outcomes.len());
	}
}

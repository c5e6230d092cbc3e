// self
use crate::obs::{FlowOutcome, SessionFlow};

/// Records a flow outcome via the global metrics recorder (when enabled).
pub fn record_flow_outcome(flow: SessionFlow, outcome: FlowOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"oidc_session_flow_total",
			"flow" => flow.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (flow, outcome);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn record_flow_outcome_noop_without_metrics() {
		record_flow_outcome(SessionFlow::CheckAuth, FlowOutcome::Failure);
	}
}

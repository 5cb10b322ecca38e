use crate::domain::payment::Processor;

/// One processor's observed health as of the last probe cycle.
#[derive(Debug, Clone, Copy)]
pub struct ProcessorHealth {
	pub processor:            Processor,
	pub failing:               bool,
	pub min_response_time_ms:  u64,
}

impl ProcessorHealth {
	pub fn unreachable(processor: Processor) -> Self {
		Self {
			processor,
			failing: true,
			min_response_time_ms: u64::MAX,
		}
	}
}

/// The oracle's current routing decision. `Waiting` and `None` both mean
/// "don't send new traffic right now", but only `None` means "treat the
/// whole system as down" for `has_healthy_processors`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveProcessor {
	Default,
	Fallback,
	Waiting,
	None,
}

impl From<Processor> for ActiveProcessor {
	fn from(p: Processor) -> Self {
		match p {
			Processor::Default => ActiveProcessor::Default,
			Processor::Fallback => ActiveProcessor::Fallback,
		}
	}
}

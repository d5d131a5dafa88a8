use crate::registers::DIVISOR_MASK;

/// Down-counter producing the half bit-period strobe.
///
/// The strobe is asserted while the counter is zero; a strobe reloads the
/// counter with the divisor, so it fires once every `divisor + 1` enabled
/// ticks (every tick for divisor 0).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct ClockDivider {
	counter: u32,
}

impl ClockDivider {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn strobe(&self) -> bool {
		0 == self.counter
	}

	pub fn counter(&self) -> u32 {
		self.counter
	}

	// a disabled divider holds its count
	pub fn advance(&mut self, divisor: u32, enable: bool) {
		if !enable {
			return;
		}
		self.counter = if self.strobe() {
			divisor & DIVISOR_MASK
		} else {
			self.counter - 1
		};
	}
}

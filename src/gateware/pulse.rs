use crate::registers::XferWrite;

/// A command input that is set for exactly one tick.
///
/// There is no way to clear or keep a pulse: the register file produces a
/// fresh set of pulses every tick, all of them idle unless a write to the
/// XFER register completed in the tick before.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub struct Pulse(bool);

impl Pulse {
	pub const IDLE: Pulse = Pulse(false);

	pub(crate) fn fire(set: bool) -> Self {
		Pulse(set)
	}

	pub fn is_set(self) -> bool {
		self.0
	}
}

/// Command pulses into the protocol engine.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub struct Commands {
	pub start: Pulse,
	pub stop: Pulse,
	pub write: Pulse,
	pub read: Pulse,
}

impl Commands {
	pub fn none() -> Self {
		Self::default()
	}

	pub(crate) fn from_xfer(xfer: XferWrite) -> Self {
		Commands {
			start: Pulse::fire(xfer.is_start()),
			stop: Pulse::fire(xfer.is_stop()),
			write: Pulse::fire(xfer.is_write()),
			read: Pulse::fire(xfer.is_read()),
		}
	}

	pub fn any(&self) -> bool {
		self.start.is_set() || self.stop.is_set() || self.write.is_set() || self.read.is_set()
	}
}

use super::Levels;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Event {
	// SDA falls while SCL stays high
	Start,
	// SDA rises while SCL stays high
	Stop,
	// SCL rose; SDA level at the edge
	Rise { sda: bool },
	Fall,
}

/// Decodes bus conditions from consecutive line samples.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Monitor {
	prev: Levels,
}

impl Monitor {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn update(&mut self, now: Levels) -> Option<Event> {
		let prev = self.prev;
		self.prev = now;

		match (prev.scl, now.scl) {
			(true, true) => match (prev.sda, now.sda) {
				(true, false) => Some(Event::Start),
				(false, true) => Some(Event::Stop),
				_ => None,
			},
			(false, true) => Some(Event::Rise { sda: now.sda }),
			(true, false) => Some(Event::Fall),
			(false, false) => None,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn levels(scl: bool, sda: bool) -> Levels {
		Levels { scl, sda }
	}

	#[test]
	fn start_and_stop_need_scl_high() {
		let mut m = Monitor::new();
		assert_eq!(m.update(levels(true, false)), Some(Event::Start));
		assert_eq!(m.update(levels(false, false)), Some(Event::Fall));
		// data changes with SCL low are no conditions
		assert_eq!(m.update(levels(false, true)), None);
		assert_eq!(m.update(levels(false, false)), None);
		assert_eq!(m.update(levels(true, false)), Some(Event::Rise { sda: false }));
		assert_eq!(m.update(levels(true, true)), Some(Event::Stop));
	}

	#[test]
	fn simultaneous_change_is_an_edge() {
		let mut m = Monitor::new();
		m.update(levels(false, true));
		assert_eq!(m.update(levels(true, false)), Some(Event::Rise { sda: false }));
	}
}

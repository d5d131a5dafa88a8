/// Open-drain model of the two bus lines.
///
/// Every party on the bus either pulls a line low or releases it; an external
/// pull-up makes a line read high only if nobody pulls it. The master drives
/// SCL and SDA, targets only ever touch SDA (no clock stretching).

mod monitor;

pub use self::monitor::{
	Event,
	Monitor,
};

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Drive {
	Released,
	Pulled,
}

impl Drive {
	// high level means "let the pull-up do its job"
	pub fn from_level(high: bool) -> Self {
		if high { Drive::Released } else { Drive::Pulled }
	}

	pub fn is_released(self) -> bool {
		self == Drive::Released
	}

	// pulled wins
	pub fn wired_and(self, other: Drive) -> Drive {
		if self == Drive::Pulled || other == Drive::Pulled {
			Drive::Pulled
		} else {
			Drive::Released
		}
	}
}

impl Default for Drive {
	fn default() -> Self {
		Drive::Released
	}
}

/// What the master puts on the lines.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub struct OutLines {
	pub scl: Drive,
	pub sda: Drive,
}

/// Resolved line levels (`true`: high).
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Levels {
	pub scl: bool,
	pub sda: bool,
}

impl Default for Levels {
	fn default() -> Self {
		Levels { scl: true, sda: true }
	}
}

/// Pin-level driver below the master.
pub trait Pins {
	// apply the master's drive for the current tick
	fn set_pins(&mut self, pins: OutLines);

	// SDA level resulting from the last `set_pins`
	fn read_pin(&mut self) -> bool;
}

/// Something attached to the bus besides the master.
pub trait Target {
	// drive put on SDA during the current tick
	fn sda(&self) -> Drive;

	// see the resolved levels of the current tick; a changed drive becomes
	// visible on the next tick
	fn observe(&mut self, levels: Levels);
}

impl<'a, T: ?Sized + Target> Target for &'a mut T {
	fn sda(&self) -> Drive {
		T::sda(*self)
	}

	fn observe(&mut self, levels: Levels) {
		T::observe(*self, levels)
	}
}

/// Wired-AND of the master and all attached targets. Without targets SDA
/// reads back whatever the master drives (loopback).
#[derive(Default)]
pub struct OpenDrainBus {
	targets: Vec<Box<dyn Target>>,
	levels: Levels,
}

impl OpenDrainBus {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn attach<T: Target + 'static>(&mut self, target: T) -> &mut Self {
		self.targets.push(Box::new(target));
		self
	}

	pub fn with<T: Target + 'static>(mut self, target: T) -> Self {
		self.attach(target);
		self
	}

	pub fn levels(&self) -> Levels {
		self.levels
	}
}

impl Pins for OpenDrainBus {
	fn set_pins(&mut self, pins: OutLines) {
		let sda = self.targets.iter()
			.fold(pins.sda, |line, target| line.wired_and(target.sda()));
		self.levels = Levels {
			scl: pins.scl.is_released(),
			sda: sda.is_released(),
		};
		for target in self.targets.iter_mut() {
			target.observe(self.levels);
		}
	}

	fn read_pin(&mut self) -> bool {
		self.levels.sda
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	struct Holder(Drive);

	impl Target for Holder {
		fn sda(&self) -> Drive {
			self.0
		}

		fn observe(&mut self, _levels: Levels) {
		}
	}

	#[test]
	fn pulled_wins() {
		assert_eq!(Drive::Released.wired_and(Drive::Released), Drive::Released);
		assert_eq!(Drive::Released.wired_and(Drive::Pulled), Drive::Pulled);
		assert_eq!(Drive::Pulled.wired_and(Drive::Released), Drive::Pulled);
	}

	#[test]
	fn loopback_reads_own_drive() {
		let mut bus = OpenDrainBus::new();
		bus.set_pins(OutLines { scl: Drive::Released, sda: Drive::Pulled });
		assert!(!bus.read_pin());
		bus.set_pins(OutLines::default());
		assert!(bus.read_pin());
		assert_eq!(bus.levels(), Levels { scl: true, sda: true });
	}

	#[test]
	fn target_can_pull_released_line() {
		let mut bus = OpenDrainBus::new().with(Holder(Drive::Pulled));
		bus.set_pins(OutLines::default());
		assert!(!bus.read_pin());
		assert!(bus.levels().scl);
	}
}

use crate::pins::{
	Drive,
	OutLines,
};

use super::pulse::Commands;

/// Phases of the bus master.
///
/// Each non-idle phase lasts for one divider strobe (half a bit period);
/// `Idle` is both the reset state and where every operation ends.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum State {
	Idle,
	Start0,
	Start1,
	Restart0,
	Restart1,
	Stop0,
	Stop1,
	Stop2,
	Write0,
	Write1,
	ReadAck0,
	ReadAck1,
	Read0,
	Read1,
	Read2,
	WriteAck0,
}

impl State {
	// 4-bit encoding, used for traces
	pub fn index(self) -> u8 {
		self as u8
	}
}

impl Default for State {
	fn default() -> Self {
		State::Idle
	}
}

/// Shift buffer and acknowledge values loaded together with a command.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Load {
	pub data: u8,
	pub ack: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct MachineInputs {
	pub commands: Commands,
	pub load: Option<Load>,
	// divider strobe of the current tick
	pub strobe: bool,
	// sampled SDA level
	pub sda: bool,
}

/// The protocol engine.
///
/// It advances on every tick with a command pulse or a divider strobe.
/// A target not acknowledging is only reported through `ack`; nothing is
/// aborted or retried here.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct Machine {
	state: State,
	scl: Drive,
	sda: Drive,
	data: u8,
	// remaining bits of the current byte
	bits: u8,
	ack: bool,
}

impl Machine {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn state(&self) -> State {
		self.state
	}

	pub fn data(&self) -> u8 {
		self.data
	}

	pub fn ack(&self) -> bool {
		self.ack
	}

	pub fn lines(&self) -> OutLines {
		OutLines {
			scl: self.scl,
			sda: self.sda,
		}
	}

	// false while a command pulse is still being accepted, even in `Idle`
	pub fn is_idle(&self, commands: &Commands) -> bool {
		!commands.any() && State::Idle == self.state
	}

	pub fn advance(&mut self, inputs: &MachineInputs) {
		let current = *self;

		if let Some(load) = inputs.load {
			self.data = load.data;
			self.ack = load.ack;
		}

		if !(inputs.commands.any() || inputs.strobe) {
			return;
		}

		self.state = self.transition(&current, &inputs.commands, inputs.sda);
		if self.state != current.state {
			trace!("I2C master {:?} -> {:?} (scl: {:?}, sda: {:?})", current.state, self.state, self.scl, self.sda);
		}
	}

	// reads `current`, writes `self`; values assigned here win over a load
	// in the same tick
	fn transition(&mut self, current: &Machine, commands: &Commands, sda_in: bool) -> State {
		use self::State::*;

		match current.state {
			Idle => {
				if commands.stop.is_set() && commands.start.is_set() {
					Restart0
				} else if commands.start.is_set() {
					Start0
				} else if commands.stop.is_set() {
					Stop0
				} else if commands.write.is_set() {
					self.bits = 8;
					Write0
				} else if commands.read.is_set() {
					self.bits = 8;
					Read0
				} else {
					Idle
				}
			},

			// SDA falls while SCL is high
			Start0 => {
				self.scl = Drive::Released;
				Start1
			},
			Start1 => {
				self.sda = Drive::Pulled;
				Idle
			},

			Restart0 => {
				self.scl = Drive::Pulled;
				Restart1
			},
			Restart1 => {
				self.sda = Drive::Released;
				Start0
			},

			Stop0 => {
				self.scl = Drive::Pulled;
				Stop1
			},
			Stop1 => {
				self.scl = Drive::Released;
				self.sda = Drive::Pulled;
				Stop2
			},
			// SDA rises while SCL is high
			Stop2 => {
				self.sda = Drive::Released;
				Idle
			},

			// MSB first; data is set up while SCL is low
			Write0 => {
				self.scl = Drive::Pulled;
				if 0 == current.bits {
					// let the target acknowledge
					self.sda = Drive::Released;
					ReadAck0
				} else {
					self.sda = Drive::from_level(0 != current.data & 0x80);
					Write1
				}
			},
			Write1 => {
				self.scl = Drive::Released;
				self.data = current.data << 1;
				self.bits = current.bits - 1;
				Write0
			},
			ReadAck0 => {
				self.scl = Drive::Released;
				ReadAck1
			},
			ReadAck1 => {
				self.ack = !sda_in;
				Idle
			},

			Read0 => {
				self.scl = Drive::Pulled;
				Read1
			},
			// sample into bit 0; `Read2` moves it up, so after the last bit
			// the first one received is the MSB
			Read1 => {
				self.data = (current.data & !1) | (sda_in as u8);
				self.scl = Drive::Pulled;
				if 0 == current.bits {
					self.sda = if current.ack { Drive::Pulled } else { Drive::Released };
					WriteAck0
				} else {
					self.sda = Drive::Released;
					Read2
				}
			},
			Read2 => {
				self.scl = Drive::Released;
				self.data = current.data << 1;
				self.bits = current.bits - 1;
				Read1
			},
			WriteAck0 => {
				self.scl = Drive::Released;
				Idle
			},
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::gateware::pulse::Pulse;

	fn command(f: impl FnOnce(&mut Commands)) -> MachineInputs {
		let mut inputs = MachineInputs::default();
		f(&mut inputs.commands);
		inputs.sda = true;
		inputs
	}

	fn strobe(sda: bool) -> MachineInputs {
		MachineInputs {
			strobe: true,
			sda,
			..MachineInputs::default()
		}
	}

	// strobe until the machine is back in `Idle`, returning the visited states
	fn run_to_idle(m: &mut Machine, sda: impl Fn(&Machine) -> bool) -> Vec<State> {
		let mut visited = vec![m.state()];
		while State::Idle != m.state() {
			let level = sda(&*m);
			m.advance(&strobe(level));
			visited.push(m.state());
			assert!(visited.len() < 100);
		}
		visited
	}

	#[test]
	fn resets_idle_and_released() {
		let m = Machine::new();
		assert_eq!(m.state(), State::Idle);
		assert_eq!(m.lines(), OutLines { scl: Drive::Released, sda: Drive::Released });
	}

	#[test]
	fn idle_flag_needs_no_pending_command() {
		let m = Machine::new();
		assert!(m.is_idle(&Commands::none()));
		let mut c = Commands::none();
		c.read = Pulse::fire(true);
		assert!(!m.is_idle(&c));

		let mut busy = Machine::new();
		busy.advance(&command(|c| c.start = Pulse::fire(true)));
		assert_eq!(busy.state(), State::Start0);
		assert!(!busy.is_idle(&Commands::none()));
	}

	#[test]
	fn no_strobe_no_progress() {
		let mut m = Machine::new();
		m.advance(&command(|c| c.stop = Pulse::fire(true)));
		assert_eq!(m.state(), State::Stop0);
		m.advance(&MachineInputs::default());
		assert_eq!(m.state(), State::Stop0);
	}

	#[test]
	fn start_then_stop() {
		let mut m = Machine::new();
		m.advance(&command(|c| c.start = Pulse::fire(true)));
		let visited = run_to_idle(&mut m, |_| true);
		assert_eq!(visited, vec![State::Start0, State::Start1, State::Idle]);
		assert_eq!(m.lines(), OutLines { scl: Drive::Released, sda: Drive::Pulled });

		m.advance(&command(|c| c.stop = Pulse::fire(true)));
		let visited = run_to_idle(&mut m, |_| true);
		assert_eq!(visited, vec![State::Stop0, State::Stop1, State::Stop2, State::Idle]);
		assert_eq!(m.lines(), OutLines::default());
	}

	#[test]
	fn stop_with_start_is_restart() {
		let mut m = Machine::new();
		m.advance(&command(|c| {
			c.start = Pulse::fire(true);
			c.stop = Pulse::fire(true);
		}));
		let visited = run_to_idle(&mut m, |_| true);
		assert_eq!(visited, vec![
			State::Restart0, State::Restart1, State::Start0, State::Start1, State::Idle,
		]);
		assert_eq!(m.lines(), OutLines { scl: Drive::Released, sda: Drive::Pulled });
	}

	#[test]
	fn write_shifts_msb_first_and_samples_ack() {
		for &(target_pulls, expected) in &[(true, true), (false, false)] {
			let mut m = Machine::new();
			let mut inputs = command(|c| c.write = Pulse::fire(true));
			inputs.load = Some(Load { data: 0xa5, ack: false });
			m.advance(&inputs);

			let mut bits = Vec::new();
			let mut previous_scl = m.lines().scl;
			while State::Idle != m.state() {
				let level = match m.state() {
					State::ReadAck1 => !target_pulls,
					_ => m.lines().sda.is_released(),
				};
				m.advance(&strobe(level));
				let lines = m.lines();
				// data is taken on the rising SCL edge
				if previous_scl == Drive::Pulled && lines.scl == Drive::Released && State::Write0 == m.state() {
					bits.push(lines.sda.is_released());
				}
				previous_scl = lines.scl;
			}
			assert_eq!(bits, vec![true, false, true, false, false, true, false, true]);
			assert_eq!(m.ack(), expected);
			assert_eq!(m.lines().sda, Drive::Released);
		}
	}

	#[test]
	fn read_collects_msb_first() {
		let byte = 0xc3u8;
		let mut m = Machine::new();
		let mut inputs = command(|c| c.read = Pulse::fire(true));
		inputs.load = Some(Load { data: 0, ack: true });
		m.advance(&inputs);

		// a target putting bit `n` on the line after the n-th rising edge
		let mut rising = 0;
		let mut scl = m.lines().scl;
		let mut visited = Vec::new();
		while State::Idle != m.state() {
			let level = if 0 == rising { true } else { 0 != byte & (0x80 >> (rising - 1)) };
			visited.push(m.state());
			m.advance(&strobe(level));
			if scl == Drive::Pulled && m.lines().scl == Drive::Released && State::Read1 == m.state() {
				rising += 1;
			}
			scl = m.lines().scl;
		}
		assert_eq!(m.data(), byte);
		assert_eq!(visited.iter().filter(|&&s| State::Read1 == s).count(), 9);
		assert_eq!(*visited.last().unwrap(), State::WriteAck0);
	}

	#[test]
	fn read_drives_ack_only_when_requested() {
		for &ack in &[true, false] {
			let mut m = Machine::new();
			let mut inputs = command(|c| c.read = Pulse::fire(true));
			inputs.load = Some(Load { data: 0, ack });
			m.advance(&inputs);
			while State::WriteAck0 != m.state() {
				m.advance(&strobe(true));
			}
			let expected = if ack { Drive::Pulled } else { Drive::Released };
			assert_eq!(m.lines().sda, expected);
			assert_eq!(m.lines().scl, Drive::Pulled);
			m.advance(&strobe(true));
			assert_eq!(m.state(), State::Idle);
			assert_eq!(m.lines().sda, expected);
		}
	}

	#[test]
	fn state_indices_fit_four_bits() {
		assert_eq!(State::Idle.index(), 0);
		assert_eq!(State::Restart1.index(), 4);
		assert_eq!(State::WriteAck0.index(), 15);
	}
}

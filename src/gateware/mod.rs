/// Tick-level model of the I2C master peripheral.
///
/// Components are registers plus a transition function; a tick samples all
/// outputs first and then advances divider, engine and register file in
/// that order, so every component sees the values of the current tick.

mod clock;
mod machine;
mod pulse;
mod register_file;
mod wishbone;

pub use self::clock::ClockDivider;

pub use self::machine::{
	Load,
	Machine,
	MachineInputs,
	State,
};

pub use self::pulse::{
	Commands,
	Pulse,
};

pub use self::register_file::{
	EngineStatus,
	RegisterFile,
};

pub use self::wishbone::{
	BusRequest,
	BusResponse,
};

use crate::pins::{
	Levels,
	Pins,
};

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct I2cMaster {
	clock: ClockDivider,
	machine: Machine,
	registers: RegisterFile,
	// lines as seen during the last tick
	sampled: Levels,
}

impl I2cMaster {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn clock(&self) -> &ClockDivider {
		&self.clock
	}

	pub fn machine(&self) -> &Machine {
		&self.machine
	}

	pub fn registers(&self) -> &RegisterFile {
		&self.registers
	}

	pub fn sampled(&self) -> Levels {
		self.sampled
	}

	pub fn is_idle(&self) -> bool {
		self.machine.is_idle(&self.registers.commands())
	}

	pub fn tick<P: Pins + ?Sized>(&mut self, pins: &mut P, request: &BusRequest) -> BusResponse {
		let commands = self.registers.commands();
		let response = self.registers.respond(request);
		let load = self.registers.engine_load(request);
		let strobe = self.clock.strobe();
		let status = EngineStatus {
			idle: self.machine.is_idle(&commands),
			ack: self.machine.ack(),
			data: self.machine.data(),
		};

		let lines = self.machine.lines();
		pins.set_pins(lines);
		let sda = pins.read_pin();
		self.sampled = Levels {
			scl: lines.scl.is_released(),
			sda,
		};

		// the divider only runs while the engine has something to do
		self.clock.advance(self.registers.config().divisor(), !status.idle);
		self.machine.advance(&MachineInputs {
			commands,
			load,
			strobe,
			sda,
		});
		self.registers.advance(request, status);

		response
	}
}

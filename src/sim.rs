use crate::gateware::{
	BusRequest,
	BusResponse,
	I2cMaster,
};
use crate::host::RegisterAccess;
use crate::pins::{
	OpenDrainBus,
	Pins,
};
use crate::sequencer::Sequencer;
use crate::trace::Trace;

// ticks to wait for the peripheral's acknowledge of a single request
pub const BUS_ACK_TIMEOUT: u32 = 16;

/// The peripheral wired to its pins, advanced one tick at a time on behalf
/// of a requester.
pub struct Simulation<P: Pins = OpenDrainBus> {
	master: I2cMaster,
	pins: P,
	ticks: u64,
	trace: Option<Trace>,
}

impl<P: Pins> Simulation<P> {
	pub fn new(pins: P) -> Self {
		Simulation {
			master: I2cMaster::new(),
			pins,
			ticks: 0,
			trace: None,
		}
	}

	pub fn master(&self) -> &I2cMaster {
		&self.master
	}

	pub fn pins(&self) -> &P {
		&self.pins
	}

	pub fn ticks(&self) -> u64 {
		self.ticks
	}

	/// Start recording lines and engine state.
	pub fn record(&mut self) {
		if self.trace.is_none() {
			self.trace = Some(Trace::new());
		}
	}

	pub fn trace(&self) -> Option<&Trace> {
		self.trace.as_ref()
	}

	pub fn tick(&mut self, request: &BusRequest) -> BusResponse {
		let state = self.master.machine().state();
		let response = self.master.tick(&mut self.pins, request);
		if let Some(ref mut trace) = self.trace {
			trace.record(self.ticks, self.master.sampled(), state);
		}
		self.ticks += 1;
		response
	}

	/// Run `sequencer` until it halts; returns the number of ticks taken.
	pub fn run(&mut self, sequencer: &mut Sequencer, max_ticks: u64) -> crate::AResult<u64> {
		let start = self.ticks;
		while !sequencer.is_halted() {
			ensure!(
				self.ticks - start < max_ticks,
				"sequencer still at instruction {} ({}) after {} ticks",
				sequencer.pc(), sequencer.current(), max_ticks
			);
			let response = self.tick(&sequencer.request());
			sequencer.advance(response);
		}
		Ok(self.ticks - start)
	}

	fn transaction(&mut self, request: BusRequest) -> crate::AResult<u32> {
		let cycle = BusCycle(self);
		for _ in 0..BUS_ACK_TIMEOUT {
			let response = cycle.0.tick(&request);
			if response.ack {
				return Ok(response.data);
			}
		}
		bail!("No bus acknowledge for {:?} after {} ticks", request, BUS_ACK_TIMEOUT);
	}
}

// drops the cycle for one tick when the transaction is over
struct BusCycle<'a, P: Pins + 'a>(&'a mut Simulation<P>);

impl<'a, P: Pins> Drop for BusCycle<'a, P> {
	fn drop(&mut self) {
		self.0.tick(&BusRequest::idle());
	}
}

impl<P: Pins> RegisterAccess for Simulation<P> {
	fn read_register(&mut self, address: u32) -> crate::AResult<u32> {
		self.transaction(BusRequest::read(address))
	}

	fn write_register(&mut self, address: u32, data: u32) -> crate::AResult<()> {
		self.transaction(BusRequest::write(address, data))?;
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::host::I2cMasterExt;
	use crate::registers::{
		CONFIG_ADDR,
		XFER_ADDR,
	};
	use crate::sequencer::{
		Instruction,
		Program,
	};

	#[test]
	fn register_transaction_takes_three_ticks() {
		let mut sim = Simulation::new(OpenDrainBus::new());
		sim.write_register(CONFIG_ADDR, 9).unwrap();
		assert_eq!(sim.ticks(), 3);
		assert_eq!(sim.read_register(CONFIG_ADDR).unwrap(), 9);
		assert_eq!(sim.ticks(), 6);
	}

	#[test]
	fn run_is_bounded() {
		let program = Program::new(vec![
			Instruction::Wait { address: XFER_ADDR, mask: 0x1_0000 },
			Instruction::End,
		]).unwrap();
		let mut sequencer = Sequencer::new(program);
		let mut sim = Simulation::new(OpenDrainBus::new());
		let err = sim.run(&mut sequencer, 100).unwrap_err();
		assert!(err.to_string().contains("instruction 0"), "{}", err);
		assert_eq!(sim.ticks(), 100);
		assert!(!sequencer.is_halted());
	}

	#[test]
	fn trace_follows_start_condition() {
		let mut sim = Simulation::new(OpenDrainBus::new());
		sim.record();
		sim.set_divisor(2).unwrap();
		sim.i2c_start().unwrap();
		let trace = sim.trace().unwrap();
		let last = trace.samples().last().unwrap();
		assert!(last.scl);
		assert!(!last.sda);
		assert!(trace.samples().iter().any(|s| crate::gateware::State::Start1 == s.state));
	}
}

/// Program-driven requester on the peripheral bus.
///
/// A program is a fixed list of register writes and register polls. The
/// sequencer runs exactly one bus transaction per instruction step, drops
/// the cycle for a tick after every acknowledge, and halts for good on
/// `End`.

use std::fmt;

use crate::gateware::{
	BusRequest,
	BusResponse,
};
use crate::registers::{
	REGISTER_COUNT,
	register_name,
};

pub mod builder;
pub mod programs;
pub mod script;

pub use self::builder::ProgramBuilder;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Instruction {
	Write { address: u32, value: u32 },
	// poll until `value & mask != 0`
	Wait { address: u32, mask: u32 },
	End,
}

impl Instruction {
	pub fn address(&self) -> Option<u32> {
		match *self {
			Instruction::Write { address, .. } => Some(address),
			Instruction::Wait { address, .. } => Some(address),
			Instruction::End => None,
		}
	}
}

fn fmt_register(f: &mut fmt::Formatter, address: u32) -> fmt::Result {
	match register_name(address) {
		Some(name) => write!(f, "{}", name),
		None => write!(f, "{}", address),
	}
}

impl fmt::Display for Instruction {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match *self {
			Instruction::Write { address, value } => {
				write!(f, "write ")?;
				fmt_register(f, address)?;
				write!(f, " {}", script::format_value(address, value))
			},
			Instruction::Wait { address, mask } => {
				write!(f, "wait ")?;
				fmt_register(f, address)?;
				write!(f, " {}", script::format_value(address, mask))
			},
			Instruction::End => write!(f, "end"),
		}
	}
}

/// Validated instruction list: every register address is mapped and the
/// last instruction is `End`.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct Program {
	instructions: Vec<Instruction>,
}

impl Program {
	pub fn new(instructions: Vec<Instruction>) -> crate::AResult<Self> {
		for (pc, instruction) in instructions.iter().enumerate() {
			if let Some(address) = instruction.address() {
				ensure!(address < REGISTER_COUNT, "instruction {} ({}): register address {} out of range", pc, instruction, address);
			}
		}
		match instructions.last() {
			Some(Instruction::End) => (),
			Some(last) => bail!("program must be terminated by end, last instruction is '{}'", last),
			None => bail!("empty program, need at least end"),
		}
		Ok(Program { instructions })
	}

	pub fn instructions(&self) -> &[Instruction] {
		&self.instructions
	}
}

impl fmt::Display for Program {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		for instruction in &self.instructions {
			writeln!(f, "{}", instruction)?;
		}
		Ok(())
	}
}

/// Completed bus transactions.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct Stats {
	pub writes: u64,
	pub polls: u64,
}

#[derive(Clone, Debug)]
pub struct Sequencer {
	program: Program,
	pc: usize,
	// cycle asserted during the current tick
	active: bool,
	halted: bool,
	stats: Stats,
}

impl Sequencer {
	pub fn new(program: Program) -> Self {
		let halted = Instruction::End == program.instructions[0];
		Sequencer {
			program,
			pc: 0,
			active: true,
			halted,
			stats: Stats::default(),
		}
	}

	pub fn program(&self) -> &Program {
		&self.program
	}

	pub fn pc(&self) -> usize {
		self.pc
	}

	pub fn current(&self) -> Instruction {
		self.program.instructions[self.pc]
	}

	pub fn is_halted(&self) -> bool {
		self.halted
	}

	pub fn stats(&self) -> Stats {
		self.stats
	}

	/// Bus request presented during the current tick.
	pub fn request(&self) -> BusRequest {
		if self.halted || !self.active {
			return BusRequest::idle();
		}
		match self.current() {
			Instruction::Write { address, value } => BusRequest::write(address, value),
			Instruction::Wait { address, .. } => BusRequest::read(address),
			Instruction::End => BusRequest::idle(),
		}
	}

	/// Take the peripheral's response to `request()` of this tick.
	pub fn advance(&mut self, response: BusResponse) {
		if self.halted {
			return;
		}
		if !self.active {
			// cycle was dropped for one tick, start the next transaction
			self.active = true;
			return;
		}
		if !response.ack {
			return;
		}

		match self.current() {
			Instruction::Write { address, value } => {
				self.stats.writes += 1;
				debug!("[{}] write {} = 0x{:08x}", self.pc, address, value);
				self.pc += 1;
			},
			Instruction::Wait { address, mask } => {
				self.stats.polls += 1;
				if 0 != response.data & mask {
					debug!("[{}] wait {} & 0x{:08x}: 0x{:08x} after {} polls", self.pc, address, mask, response.data, self.stats.polls);
					self.pc += 1;
				}
			},
			Instruction::End => (),
		}
		self.active = false;

		if Instruction::End == self.current() {
			info!("Sequencer halted at {} ({} writes, {} polls)", self.pc, self.stats.writes, self.stats.polls);
			self.halted = true;
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::registers::{
		CONFIG_ADDR,
		XFER_ADDR,
		XFER_IDLE,
	};

	fn ack(data: u32) -> BusResponse {
		BusResponse { ack: true, data }
	}

	#[test]
	fn program_needs_end() {
		assert!(Program::new(vec![]).is_err());
		assert!(Program::new(vec![Instruction::Write { address: XFER_ADDR, value: 0 }]).is_err());
		assert!(Program::new(vec![Instruction::End]).is_ok());
	}

	#[test]
	fn program_rejects_unmapped_register() {
		let err = Program::new(vec![
			Instruction::Wait { address: 2, mask: 1 },
			Instruction::End,
		]).unwrap_err();
		assert!(err.to_string().contains("out of range"), "{}", err);
	}

	#[test]
	fn end_only_program_is_halted() {
		let s = Sequencer::new(Program::new(vec![Instruction::End]).unwrap());
		assert!(s.is_halted());
		assert_eq!(s.request(), BusRequest::idle());
	}

	#[test]
	fn write_holds_request_until_ack_then_drops_cycle() {
		let program = Program::new(vec![
			Instruction::Write { address: CONFIG_ADDR, value: 4 },
			Instruction::Wait { address: XFER_ADDR, mask: XFER_IDLE },
			Instruction::End,
		]).unwrap();
		let mut s = Sequencer::new(program);

		let write = BusRequest::write(CONFIG_ADDR, 4);
		assert_eq!(s.request(), write);
		s.advance(BusResponse::default());
		assert_eq!(s.request(), write);
		s.advance(ack(0));
		assert_eq!(s.pc(), 1);
		assert_eq!(s.request(), BusRequest::idle());
		s.advance(BusResponse::default());

		let read = BusRequest::read(XFER_ADDR);
		assert_eq!(s.request(), read);
		s.advance(ack(0));
		// condition not met: poll again after dropping the cycle
		assert_eq!(s.pc(), 1);
		assert_eq!(s.request(), BusRequest::idle());
		s.advance(BusResponse::default());
		assert_eq!(s.request(), read);
		s.advance(ack(XFER_IDLE));

		assert!(s.is_halted());
		assert_eq!(s.pc(), 2);
		assert_eq!(s.stats(), Stats { writes: 1, polls: 2 });
		assert_eq!(s.request(), BusRequest::idle());
	}

	#[test]
	fn halted_sequencer_stays_halted() {
		let program = Program::new(vec![
			Instruction::Write { address: XFER_ADDR, value: 0 },
			Instruction::End,
		]).unwrap();
		let mut s = Sequencer::new(program);
		s.advance(ack(0));
		assert!(s.is_halted());
		for _ in 0..4 {
			s.advance(ack(0));
			assert_eq!(s.request(), BusRequest::idle());
		}
		assert_eq!(s.pc(), 1);
		assert_eq!(s.stats().writes, 1);
	}

	#[test]
	fn instructions_print_as_script() {
		assert_eq!(Instruction::Write { address: CONFIG_ADDR, value: 4 }.to_string(), "write config 4");
		assert_eq!(Instruction::Wait { address: XFER_ADDR, mask: XFER_IDLE }.to_string(), "wait xfer IDLE");
		assert_eq!(Instruction::End.to_string(), "end");
	}
}

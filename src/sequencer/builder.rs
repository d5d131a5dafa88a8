use crate::registers::{
	CONFIG_ADDR,
	ConfigRegister,
	XFER_ADDR,
	XFER_IDLE,
	XferWrite,
};

use super::{
	Instruction,
	Program,
};

/// Assembles programs from bus operations; every command written to XFER
/// is followed by a poll for IDLE.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Default)]
pub struct ProgramBuilder {
	instructions: Vec<Instruction>,
}

impl ProgramBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn push(&mut self, instruction: Instruction) -> &mut Self {
		self.instructions.push(instruction);
		self
	}

	pub fn divisor(&mut self, divisor: u32) -> &mut Self {
		let config = ConfigRegister::with_divisor(divisor);
		self.push(Instruction::Write { address: CONFIG_ADDR, value: config.0 })
	}

	fn command(&mut self, xfer: XferWrite) -> &mut Self {
		self.push(Instruction::Write { address: XFER_ADDR, value: xfer.0 });
		self.push(Instruction::Wait { address: XFER_ADDR, mask: XFER_IDLE })
	}

	pub fn start(&mut self) -> &mut Self {
		self.command(XferWrite::start())
	}

	pub fn restart(&mut self) -> &mut Self {
		self.command(XferWrite::restart())
	}

	pub fn stop(&mut self) -> &mut Self {
		self.command(XferWrite::stop())
	}

	pub fn write(&mut self, byte: u8) -> &mut Self {
		self.command(XferWrite::write_data(byte))
	}

	pub fn read(&mut self, ack: bool) -> &mut Self {
		self.command(XferWrite::read_data(ack))
	}

	/// Start, write `bytes` (address byte included), stop.
	pub fn transaction(&mut self, bytes: &[u8]) -> &mut Self {
		self.start();
		for &byte in bytes {
			self.write(byte);
		}
		self.stop()
	}

	pub fn finish(&mut self) -> crate::AResult<Program> {
		let mut instructions = self.instructions.clone();
		instructions.push(Instruction::End);
		Program::new(instructions)
	}
}

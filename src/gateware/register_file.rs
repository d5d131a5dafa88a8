use crate::registers::{
	CONFIG_ADDR,
	ConfigRegister,
	XFER_ACK,
	XFER_ADDR,
	XFER_IDLE,
	XFER_WRITABLE_MASK,
	XferRead,
	XferWrite,
};

use super::machine::Load;
use super::pulse::Commands;
use super::wishbone::{
	BusRequest,
	BusResponse,
};

/// Engine values the register file latches every tick.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct EngineStatus {
	pub idle: bool,
	pub ack: bool,
	pub data: u8,
}

/// XFER and CONFIG registers behind the request/acknowledge bus.
///
/// The acknowledge follows a request one tick later. When a write to XFER
/// completes (acknowledge and write enable seen in the same tick) its
/// command flags become pulses for the engine on the next tick; in all
/// other ticks the pulses are idle and XFER mirrors the engine's data and
/// acknowledge instead.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct RegisterFile {
	xfer: u32,
	config: ConfigRegister,
	ack: bool,
	commands: Commands,
}

impl RegisterFile {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn xfer(&self) -> XferRead {
		XferRead(self.xfer)
	}

	pub fn config(&self) -> ConfigRegister {
		self.config
	}

	pub fn commands(&self) -> Commands {
		self.commands
	}

	pub fn read(&self, address: u32) -> u32 {
		match address {
			XFER_ADDR => self.xfer,
			CONFIG_ADDR => self.config.0,
			_ => 0,
		}
	}

	// reads have no side effect; data is whatever is latched right now
	pub fn respond(&self, request: &BusRequest) -> BusResponse {
		BusResponse {
			ack: self.ack,
			data: self.read(request.address),
		}
	}

	fn completes_xfer_write(&self, request: &BusRequest) -> bool {
		self.ack && request.is_write() && XFER_ADDR == request.address
	}

	// shift buffer and ack loaded into the engine at the end of this tick
	pub fn engine_load(&self, request: &BusRequest) -> Option<Load> {
		if !self.completes_xfer_write(request) {
			return None;
		}
		let xfer = XferWrite(request.data);
		Some(Load {
			data: xfer.data(),
			ack: xfer.is_ack(),
		})
	}

	pub fn advance(&mut self, request: &BusRequest, status: EngineStatus) {
		let mut commands = Commands::none();

		if self.completes_xfer_write(request) {
			let xfer = XferWrite(request.data & XFER_WRITABLE_MASK);
			debug!("XFER write: {:?}", xfer);
			self.xfer = xfer.0;
			commands = Commands::from_xfer(xfer);
		} else {
			if self.ack && request.is_write() {
				match request.address {
					CONFIG_ADDR => {
						self.config = ConfigRegister::with_divisor(request.data);
						debug!("CONFIG write: {:?}", self.config);
					},
					address => {
						warn!("Ignoring write of 0x{:08x} to unmapped register {}", request.data, address);
					},
				}
			}
			// only data and ack survive, command flags never linger
			self.xfer = (status.data as u32) | if status.ack { XFER_ACK } else { 0 };
		}

		self.xfer &= XFER_WRITABLE_MASK;
		if status.idle {
			self.xfer |= XFER_IDLE;
		}

		self.commands = commands;
		self.ack = request.is_active() && !self.ack;
	}
}

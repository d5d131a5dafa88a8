/// Simulated devices on the bus.
///
/// Targets react to line edges only: they shift data in on rising SCL,
/// and change their SDA drive after falling SCL. None of them stretches
/// the clock.

mod pca9548;
mod si5324;

pub use self::pca9548::{
	PCA9548_ADDRESS,
	Pca9548,
};
pub use self::si5324::{
	Dividers,
	SI5324_ADDRESS,
	SI5324_BWSEL,
	SI5324_CKSEL,
	SI5324_FASTLOCK,
	SI5324_ICAL,
	SI5324_LOL,
	SI5324_LOS,
	SI5324_N1_HS,
	SI5324_N2,
	SI5324_N31,
	SI5324_NC1_LS,
	SI5324_PARTNUM,
	SI5324_PRODUCT,
	SI5324_SFOUT,
	SI5324_SKEW,
	Si5324,
};

use crate::pins::{
	Drive,
	Event,
	Levels,
	Monitor,
	Target,
};

/// Register-level behaviour behind an addressed target.
pub trait Device {
	// 7-bit address
	fn address(&self) -> u8;

	// a byte written by the master; return whether to acknowledge it
	fn write(&mut self, byte: u8) -> bool;

	// next byte the master reads
	fn read(&mut self) -> u8;

	fn start(&mut self) {}

	fn stop(&mut self) {}
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
enum Phase {
	// not addressed; waiting for a start condition
	Idle,
	Receive { byte: u8, bits: u8, address: bool },
	Received { byte: u8, address: bool },
	// holding SDA low (or not) for the 9th clock
	AckOut { transmit: bool },
	Transmit { byte: u8, sent: u8 },
	// released SDA for the master's acknowledge
	MasterAck,
	AckIn { acked: bool },
}

/// Generic 7-bit addressed target.
pub struct Responder<D: Device> {
	device: D,
	monitor: Monitor,
	phase: Phase,
	sda: Drive,
}

impl<D: Device> Responder<D> {
	pub fn new(device: D) -> Self {
		Responder {
			device,
			monitor: Monitor::new(),
			phase: Phase::Idle,
			sda: Drive::Released,
		}
	}

	pub fn device(&self) -> &D {
		&self.device
	}

	fn put_bit(&mut self, byte: u8, bit: u8) {
		self.sda = Drive::from_level(0 != byte & (0x80 >> bit));
	}

	fn rise(&mut self, sda: bool) {
		let phase = self.phase;
		self.phase = match phase {
			Phase::Receive { byte, bits, address } => {
				let byte = (byte << 1) | (sda as u8);
				if 7 == bits {
					Phase::Received { byte, address }
				} else {
					Phase::Receive { byte, bits: bits + 1, address }
				}
			},
			Phase::Transmit { byte, sent } => Phase::Transmit { byte, sent: sent + 1 },
			Phase::MasterAck => Phase::AckIn { acked: !sda },
			phase => phase,
		};
	}

	fn fall(&mut self) {
		let phase = self.phase;
		self.phase = match phase {
			Phase::Received { byte, address: true } => {
				if byte >> 1 != self.device.address() {
					Phase::Idle
				} else {
					self.sda = Drive::Pulled;
					Phase::AckOut { transmit: 0 != byte & 1 }
				}
			},
			Phase::Received { byte, address: false } => {
				if self.device.write(byte) {
					self.sda = Drive::Pulled;
				}
				Phase::AckOut { transmit: false }
			},
			Phase::AckOut { transmit: true } => {
				let byte = self.device.read();
				self.put_bit(byte, 0);
				Phase::Transmit { byte, sent: 0 }
			},
			Phase::AckOut { transmit: false } => {
				self.sda = Drive::Released;
				Phase::Receive { byte: 0, bits: 0, address: false }
			},
			Phase::Transmit { byte, sent } => {
				if sent >= 8 {
					self.sda = Drive::Released;
					Phase::MasterAck
				} else {
					self.put_bit(byte, sent);
					Phase::Transmit { byte, sent }
				}
			},
			Phase::AckIn { acked: true } => {
				let byte = self.device.read();
				self.put_bit(byte, 0);
				Phase::Transmit { byte, sent: 0 }
			},
			Phase::AckIn { acked: false } => {
				Phase::Idle
			},
			phase => phase,
		};
	}
}

impl<D: Device> Target for Responder<D> {
	fn sda(&self) -> Drive {
		self.sda
	}

	fn observe(&mut self, levels: Levels) {
		match self.monitor.update(levels) {
			Some(Event::Start) => {
				self.device.start();
				self.sda = Drive::Released;
				self.phase = Phase::Receive { byte: 0, bits: 0, address: true };
			},
			Some(Event::Stop) => {
				if Phase::Idle != self.phase {
					self.device.stop();
				}
				self.sda = Drive::Released;
				self.phase = Phase::Idle;
			},
			Some(Event::Rise { sda }) => self.rise(sda),
			Some(Event::Fall) => self.fall(),
			None => (),
		}
	}
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
enum EchoPhase {
	Idle,
	Listen,
	Ack,
	Replay { sent: u8 },
	Done,
}

/// Test responder without address phase: acknowledges the first byte after
/// a start condition and plays it back during the next byte the master
/// reads.
pub struct Echo {
	monitor: Monitor,
	phase: EchoPhase,
	captured: u8,
	bits: u8,
	sda: Drive,
}

impl Echo {
	pub fn new() -> Self {
		Echo {
			monitor: Monitor::new(),
			phase: EchoPhase::Idle,
			captured: 0,
			bits: 0,
			sda: Drive::Released,
		}
	}

	pub fn captured(&self) -> u8 {
		self.captured
	}

	fn put_bit(&mut self, bit: u8) {
		self.sda = Drive::from_level(0 != self.captured & (0x80 >> bit));
	}
}

impl Default for Echo {
	fn default() -> Self {
		Self::new()
	}
}

impl Target for Echo {
	fn sda(&self) -> Drive {
		self.sda
	}

	fn observe(&mut self, levels: Levels) {
		match (self.monitor.update(levels), self.phase) {
			(Some(Event::Start), _) => {
				self.phase = EchoPhase::Listen;
				self.captured = 0;
				self.bits = 0;
				self.sda = Drive::Released;
			},
			(Some(Event::Stop), _) => {
				self.phase = EchoPhase::Idle;
				self.sda = Drive::Released;
			},
			(Some(Event::Rise { sda }), EchoPhase::Listen) => {
				if self.bits < 8 {
					self.captured = (self.captured << 1) | (sda as u8);
					self.bits += 1;
				}
			},
			(Some(Event::Rise { .. }), EchoPhase::Replay { sent }) => {
				self.phase = EchoPhase::Replay { sent: sent + 1 };
			},
			(Some(Event::Fall), EchoPhase::Listen) => {
				if 8 == self.bits {
					self.sda = Drive::Pulled;
					self.phase = EchoPhase::Ack;
				}
			},
			(Some(Event::Fall), EchoPhase::Ack) => {
				self.put_bit(0);
				self.phase = EchoPhase::Replay { sent: 0 };
			},
			(Some(Event::Fall), EchoPhase::Replay { sent }) => {
				if sent >= 8 {
					self.sda = Drive::Released;
					self.phase = EchoPhase::Done;
				} else {
					self.put_bit(sent);
				}
			},
			_ => (),
		}
	}
}

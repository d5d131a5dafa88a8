use super::{
	Device,
	Responder,
};

pub const SI5324_ADDRESS: u8 = 0x68;

// registers touched by the configuration sequence
pub const SI5324_BWSEL: u8 = 2;
pub const SI5324_CKSEL: u8 = 3;
pub const SI5324_SFOUT: u8 = 6;
pub const SI5324_N1_HS: u8 = 25;
pub const SI5324_NC1_LS: u8 = 31;
pub const SI5324_N2: u8 = 40;
pub const SI5324_N31: u8 = 43;
pub const SI5324_LOS: u8 = 129;
pub const SI5324_LOL: u8 = 130;
pub const SI5324_PARTNUM: u8 = 134;
pub const SI5324_ICAL: u8 = 136;
pub const SI5324_FASTLOCK: u8 = 137;
pub const SI5324_SKEW: u8 = 142;

pub const SI5324_PRODUCT: u16 = 0x0182;

const ICAL_START: u8 = 0x40;

/// Divider settings of the PLL; only the low bits of each field make it
/// into the registers.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Dividers {
	pub n1_hs: u8,
	pub nc1_ls: u32,
	pub n2_hs: u8,
	pub n2_ls: u32,
	pub n31: u32,
}

impl Dividers {
	/// 125 MHz output from a 125 MHz reference.
	pub const CLK_125MHZ: Dividers = Dividers {
		n1_hs: 1,
		nc1_ls: 7,
		n2_hs: 3,
		n2_ls: 359,
		n31: 62,
	};

	/// 62.5 MHz output.
	pub const CLK_62_5MHZ: Dividers = Dividers {
		n1_hs: 0,
		nc1_ls: 19,
		n2_hs: 1,
		n2_ls: 511,
		n31: 31,
	};

	pub fn for_frequency(hz: u32) -> crate::AResult<Self> {
		Ok(match hz {
			125_000_000 => Self::CLK_125MHZ,
			62_500_000 => Self::CLK_62_5MHZ,
			_ => bail!("no Si5324 divider settings for {} Hz", hz),
		})
	}

	/// (register, value) pairs in programming order.
	pub fn register_writes(&self) -> Vec<(u8, u8)> {
		vec![
			(SI5324_N1_HS, (u32::from(self.n1_hs) << 5) as u8),
			(SI5324_NC1_LS, (self.nc1_ls >> 16) as u8),
			(SI5324_NC1_LS + 1, (self.nc1_ls >> 8) as u8),
			(SI5324_NC1_LS + 2, self.nc1_ls as u8),
			(SI5324_N2, ((u32::from(self.n2_hs) << 5) | (self.n2_ls >> 16)) as u8),
			(SI5324_N2 + 1, (self.n2_ls >> 8) as u8),
			(SI5324_N2 + 2, self.n2_ls as u8),
			(SI5324_N31, (self.n31 >> 16) as u8),
			(SI5324_N31 + 1, (self.n31 >> 8) as u8),
			(SI5324_N31 + 2, self.n31 as u8),
		]
	}
}

/// Jitter attenuating clock multiplier, reduced to its register file.
///
/// The first byte of a write transaction sets the register pointer, every
/// further byte written or read moves it on by one. Writing ICAL starts a
/// calibration that completes at once: the bit clears and the PLL reports
/// lock.
#[derive(Clone)]
pub struct Si5324 {
	address: u8,
	registers: [u8; 256],
	pointer: u8,
	expect_pointer: bool,
}

impl Si5324 {
	pub fn new() -> Self {
		let mut registers = [0u8; 256];
		registers[SI5324_BWSEL as usize] = 0x42;
		registers[SI5324_CKSEL as usize] = 0x05;
		registers[SI5324_SFOUT as usize] = 0x2d;
		registers[SI5324_LOL as usize] = 0x01;
		registers[SI5324_PARTNUM as usize] = (SI5324_PRODUCT >> 8) as u8;
		registers[SI5324_PARTNUM as usize + 1] = SI5324_PRODUCT as u8;
		Si5324 {
			address: SI5324_ADDRESS,
			registers,
			pointer: 0,
			expect_pointer: false,
		}
	}

	pub fn target() -> Responder<Self> {
		Responder::new(Self::new())
	}

	pub fn register(&self, reg: u8) -> u8 {
		self.registers[reg as usize]
	}

	pub fn set_register(&mut self, reg: u8, value: u8) {
		self.registers[reg as usize] = value;
	}

	fn store(&mut self, value: u8) {
		let reg = self.pointer;
		debug!("Si5324: reg {} = 0x{:02x}", reg, value);
		if SI5324_ICAL == reg && 0 != value & ICAL_START {
			self.registers[reg as usize] = value & !ICAL_START;
			self.registers[SI5324_LOL as usize] &= !0x01;
		} else {
			self.registers[reg as usize] = value;
		}
	}
}

impl Default for Si5324 {
	fn default() -> Self {
		Self::new()
	}
}

impl Device for Si5324 {
	fn address(&self) -> u8 {
		self.address
	}

	fn write(&mut self, byte: u8) -> bool {
		if self.expect_pointer {
			self.pointer = byte;
			self.expect_pointer = false;
		} else {
			self.store(byte);
			self.pointer = self.pointer.wrapping_add(1);
		}
		true
	}

	fn read(&mut self) -> u8 {
		let value = self.registers[self.pointer as usize];
		self.pointer = self.pointer.wrapping_add(1);
		value
	}

	fn start(&mut self) {
		self.expect_pointer = true;
	}
}

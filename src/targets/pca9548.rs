use super::{
	Device,
	Responder,
};

pub const PCA9548_ADDRESS: u8 = 0x74;

/// 8-channel bus switch: a single control register, one bit per
/// downstream channel.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Pca9548 {
	address: u8,
	control: u8,
}

impl Pca9548 {
	pub fn new() -> Self {
		Self::with_address(PCA9548_ADDRESS)
	}

	// A2..A0 strapping moves the switch within 0x70..0x77
	pub fn with_address(address: u8) -> Self {
		Pca9548 {
			address,
			control: 0,
		}
	}

	/// Bus-attachable target around a switch at the default address.
	pub fn target() -> Responder<Self> {
		Responder::new(Self::new())
	}

	pub fn control(&self) -> u8 {
		self.control
	}

	/// Indices of the enabled channels.
	pub fn channels(&self) -> Vec<u8> {
		(0..8).filter(|&c| 0 != self.control & (1 << c)).collect()
	}
}

impl Default for Pca9548 {
	fn default() -> Self {
		Self::new()
	}
}

impl Device for Pca9548 {
	fn address(&self) -> u8 {
		self.address
	}

	fn write(&mut self, byte: u8) -> bool {
		debug!("PCA9548 @0x{:02x}: control 0x{:02x} -> 0x{:02x}", self.address, self.control, byte);
		self.control = byte;
		true
	}

	fn read(&mut self) -> u8 {
		self.control
	}
}

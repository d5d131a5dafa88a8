/// Request side of the synchronous request/acknowledge bus, as presented by
/// the requester during one tick.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct BusRequest {
	pub cycle: bool,
	pub strobe: bool,
	pub write_enable: bool,
	pub address: u32,
	pub data: u32,
}

impl BusRequest {
	// nothing requested; also what a requester presents between transactions
	pub fn idle() -> Self {
		Self::default()
	}

	pub fn read(address: u32) -> Self {
		BusRequest {
			cycle: true,
			strobe: true,
			write_enable: false,
			address,
			data: 0,
		}
	}

	pub fn write(address: u32, data: u32) -> Self {
		BusRequest {
			cycle: true,
			strobe: true,
			write_enable: true,
			address,
			data,
		}
	}

	pub fn is_active(&self) -> bool {
		self.cycle && self.strobe
	}

	pub fn is_write(&self) -> bool {
		self.is_active() && self.write_enable
	}
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct BusResponse {
	pub ack: bool,
	pub data: u32,
}

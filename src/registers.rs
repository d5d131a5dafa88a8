use std::fmt;

// register addresses on the peripheral bus
pub const XFER_ADDR:   u32 = 0;
pub const CONFIG_ADDR: u32 = 1;
pub const REGISTER_COUNT: u32 = 2;

// XFER register flags
pub const XFER_DATA_MASK: u32 = 0x0000_00ff;
pub const XFER_ACK:       u32 = 0x0000_0100;
pub const XFER_READ:      u32 = 0x0000_0200;
pub const XFER_WRITE:     u32 = 0x0000_0400;
pub const XFER_STOP:      u32 = 0x0000_0800;
pub const XFER_START:     u32 = 0x0000_1000;
pub const XFER_IDLE:      u32 = 0x0000_2000; // read only

// everything except IDLE
pub const XFER_WRITABLE_MASK: u32 = 0
	| XFER_DATA_MASK
	| XFER_ACK
	| XFER_READ
	| XFER_WRITE
	| XFER_STOP
	| XFER_START
;

// CONFIG register
pub const DIVISOR_WIDTH: u32 = 20;
pub const DIVISOR_MASK:  u32 = (1 << DIVISOR_WIDTH) - 1;

/// Flag names as accepted in sequencer scripts, in bit order.
pub const XFER_FLAG_NAMES: [(&str, u32); 6] = [
	("ACK", XFER_ACK),
	("READ", XFER_READ),
	("WRITE", XFER_WRITE),
	("STOP", XFER_STOP),
	("START", XFER_START),
	("IDLE", XFER_IDLE),
];

pub fn register_name(address: u32) -> Option<&'static str> {
	match address {
		XFER_ADDR => Some("xfer"),
		CONFIG_ADDR => Some("config"),
		_ => None,
	}
}

/// XFER register contents as read back over the bus.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct XferRead(pub u32);

impl XferRead {
	pub fn data(&self) -> u8 {
		self.0 as u8
	}

	// acknowledge latched by the master: true if the target pulled SDA low
	// after the last written byte
	pub fn is_ack(&self) -> bool {
		0 != self.0 & XFER_ACK
	}
	pub fn is_read(&self) -> bool {
		0 != self.0 & XFER_READ
	}
	pub fn is_write(&self) -> bool {
		0 != self.0 & XFER_WRITE
	}
	pub fn is_stop(&self) -> bool {
		0 != self.0 & XFER_STOP
	}
	pub fn is_start(&self) -> bool {
		0 != self.0 & XFER_START
	}
	pub fn is_idle(&self) -> bool {
		0 != self.0 & XFER_IDLE
	}
}

impl fmt::Display for XferRead {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "0x{:04x}", self.0)
	}
}

impl fmt::Debug for XferRead {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "0x{:04x} (data: 0x{:02x}", self.0, self.data())?;
		if self.is_ack() { write!(f, " [ACK]")?; }
		if self.is_read() { write!(f, " [RD]")?; }
		if self.is_write() { write!(f, " [WR]")?; }
		if self.is_stop() { write!(f, " [STOP]")?; }
		if self.is_start() { write!(f, " [START]")?; }
		if self.is_idle() { write!(f, " [IDLE]")?; }
		write!(f, ")")
	}
}

/// XFER register value to write; every write with a command flag set
/// triggers exactly one bus operation.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct XferWrite(pub u32);

impl XferWrite {
	pub fn start() -> Self {
		*XferWrite(0).set_start()
	}

	// STOP together with START is a repeated start
	pub fn restart() -> Self {
		*XferWrite(0).set_stop().set_start()
	}

	pub fn stop() -> Self {
		*XferWrite(0).set_stop()
	}

	pub fn write_data(data: u8) -> Self {
		*XferWrite(0)
			.set_data(data)
			.set_write()
	}

	// `ack`: pull SDA low after the byte to request more data
	pub fn read_data(ack: bool) -> Self {
		let mut w = XferWrite(0);
		w.set_read();
		if ack {
			w.set_ack();
		}
		w
	}

	pub fn data(&self) -> u8 {
		self.0 as u8
	}

	pub fn set_data(&mut self, data: u8) -> &mut Self {
		self.0 = (self.0 & !XFER_DATA_MASK) | (data as u32);
		self
	}

	pub fn is_ack(&self) -> bool {
		0 != self.0 & XFER_ACK
	}
	pub fn set_ack(&mut self) -> &mut Self {
		self.0 |= XFER_ACK;
		self
	}

	pub fn is_read(&self) -> bool {
		0 != self.0 & XFER_READ
	}
	pub fn set_read(&mut self) -> &mut Self {
		self.0 |= XFER_READ;
		self
	}

	pub fn is_write(&self) -> bool {
		0 != self.0 & XFER_WRITE
	}
	pub fn set_write(&mut self) -> &mut Self {
		self.0 |= XFER_WRITE;
		self
	}

	pub fn is_stop(&self) -> bool {
		0 != self.0 & XFER_STOP
	}
	pub fn set_stop(&mut self) -> &mut Self {
		self.0 |= XFER_STOP;
		self
	}

	pub fn is_start(&self) -> bool {
		0 != self.0 & XFER_START
	}
	pub fn set_start(&mut self) -> &mut Self {
		self.0 |= XFER_START;
		self
	}
}

impl fmt::Display for XferWrite {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "0x{:04x}", self.0)
	}
}

impl fmt::Debug for XferWrite {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "0x{:04x} (data: 0x{:02x}", self.0, self.data())?;
		if self.is_ack() { write!(f, " [ACK]")?; }
		if self.is_read() { write!(f, " [RD]")?; }
		if self.is_write() { write!(f, " [WR]")?; }
		if self.is_stop() { write!(f, " [STOP]")?; }
		if self.is_start() { write!(f, " [START]")?; }
		write!(f, ")")
	}
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ConfigRegister(pub u32);

impl ConfigRegister {
	// wider values are truncated to the register width
	pub fn with_divisor(divisor: u32) -> Self {
		ConfigRegister(divisor & DIVISOR_MASK)
	}

	pub fn divisor(&self) -> u32 {
		self.0 & DIVISOR_MASK
	}
}

impl fmt::Debug for ConfigRegister {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "0x{:05x} (divisor: {})", self.0, self.divisor())
	}
}

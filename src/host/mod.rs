/// Host-side driver for the I2C master
///
/// Talks to the peripheral through plain register reads and writes; after
/// every command the transfer register is polled until the engine reports
/// idle again.

use crate::registers::{
	CONFIG_ADDR,
	ConfigRegister,
	XFER_ADDR,
	XferRead,
	XferWrite,
};

pub mod pca9548;
pub mod si5324;

// polls of the transfer register before giving up on an engine that never
// returns to idle; a byte at the largest divisor needs about 2^20 * 18
// ticks
pub const IDLE_POLL_LIMIT: u32 = 1 << 24;

/// Word access to the peripheral's registers.
pub trait RegisterAccess {
	fn read_register(&mut self, address: u32) -> crate::AResult<u32>;

	fn write_register(&mut self, address: u32, data: u32) -> crate::AResult<()>;
}

pub trait I2cMasterExt: RegisterAccess {
	fn xfer_read(&mut self) -> crate::AResult<XferRead> {
		Ok(XferRead(self.read_register(XFER_ADDR)?))
	}

	fn xfer_write(&mut self, data: XferWrite) -> crate::AResult<()> {
		debug!("XFER write: {:?}", data);
		self.write_register(XFER_ADDR, data.0)
	}

	fn set_divisor(&mut self, divisor: u32) -> crate::AResult<()> {
		let config = ConfigRegister::with_divisor(divisor);
		ensure!(config.divisor() == divisor, "divisor {} doesn't fit into the config register", divisor);
		self.write_register(CONFIG_ADDR, config.0)
	}

	/// returns XFER once the engine is idle; error on timeout
	fn wait_idle(&mut self) -> crate::AResult<XferRead> {
		for _ in 0..IDLE_POLL_LIMIT {
			let xfer = self.xfer_read()?;
			if xfer.is_idle() {
				return Ok(xfer);
			}
		}
		bail!("I2C timeout - master never became idle");
	}

	fn i2c_command(&mut self, data: XferWrite) -> crate::AResult<XferRead> {
		self.xfer_write(data)?;
		self.wait_idle()
	}

	fn i2c_start(&mut self) -> crate::AResult<()> {
		self.i2c_command(XferWrite::start())?;
		Ok(())
	}

	fn i2c_restart(&mut self) -> crate::AResult<()> {
		self.i2c_command(XferWrite::restart())?;
		Ok(())
	}

	fn i2c_stop(&mut self) -> crate::AResult<()> {
		self.i2c_command(XferWrite::stop())?;
		Ok(())
	}

	/// returns whether the target acknowledged the byte
	fn i2c_write(&mut self, byte: u8) -> crate::AResult<bool> {
		let ack = self.i2c_command(XferWrite::write_data(byte))?.is_ack();
		debug!("I2C write 0x{:02x}: {}", byte, if ack { "ACK" } else { "NACK" });
		Ok(ack)
	}

	/// `ack`: acknowledge the byte, i.e. ask the target for another one
	fn i2c_read(&mut self, ack: bool) -> crate::AResult<u8> {
		let byte = self.i2c_command(XferWrite::read_data(ack))?.data();
		debug!("I2C read 0x{:02x} ({})", byte, if ack { "ACK" } else { "NACK" });
		Ok(byte)
	}
}
impl<R: RegisterAccess + ?Sized> I2cMasterExt for R {}

use crate::targets::PCA9548_ADDRESS;

use super::I2cMasterExt;

/// Enable exactly one downstream channel.
pub fn select<M: I2cMasterExt + ?Sized>(master: &mut M, channel: u8) -> crate::AResult<()> {
	ensure!(channel < 8, "PCA9548 has 8 channels, can't select {}", channel);
	debug!("PCA9548: selecting channel {}", channel);

	master.i2c_start()?;
	ensure!(master.i2c_write(PCA9548_ADDRESS << 1)?, "PCA9548 failed to ack write address");
	ensure!(master.i2c_write(1 << channel)?, "PCA9548 failed to ack control word");
	master.i2c_stop()
}

/// Read the control register (a bit mask of enabled channels).
pub fn readback<M: I2cMasterExt + ?Sized>(master: &mut M) -> crate::AResult<u8> {
	master.i2c_start()?;
	ensure!(master.i2c_write((PCA9548_ADDRESS << 1) | 1)?, "PCA9548 failed to ack read address");
	let control = master.i2c_read(false)?;
	master.i2c_stop()?;

	debug!("PCA9548: control 0x{:02x}", control);
	Ok(control)
}

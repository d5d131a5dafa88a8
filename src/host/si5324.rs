use crate::targets::{
	Dividers,
	SI5324_ADDRESS,
	SI5324_BWSEL,
	SI5324_CKSEL,
	SI5324_FASTLOCK,
	SI5324_ICAL,
	SI5324_LOL,
	SI5324_LOS,
	SI5324_PARTNUM,
	SI5324_PRODUCT,
	SI5324_SFOUT,
	SI5324_SKEW,
};

use super::I2cMasterExt;

pub fn write<M: I2cMasterExt + ?Sized>(master: &mut M, reg: u8, value: u8) -> crate::AResult<()> {
	master.i2c_start()?;
	ensure!(master.i2c_write(SI5324_ADDRESS << 1)?, "Si5324 failed to ack write address");
	ensure!(master.i2c_write(reg)?, "Si5324 failed to ack register");
	ensure!(master.i2c_write(value)?, "Si5324 failed to ack value");
	master.i2c_stop()
}

pub fn read<M: I2cMasterExt + ?Sized>(master: &mut M, reg: u8) -> crate::AResult<u8> {
	master.i2c_start()?;
	ensure!(master.i2c_write(SI5324_ADDRESS << 1)?, "Si5324 failed to ack write address");
	ensure!(master.i2c_write(reg)?, "Si5324 failed to ack register");
	master.i2c_restart()?;
	ensure!(master.i2c_write((SI5324_ADDRESS << 1) | 1)?, "Si5324 failed to ack read address");
	let value = master.i2c_read(false)?;
	master.i2c_stop()?;
	Ok(value)
}

/// Product number from registers 134/135.
pub fn ident<M: I2cMasterExt + ?Sized>(master: &mut M) -> crate::AResult<u16> {
	let high = read(master, SI5324_PARTNUM)?;
	let low = read(master, SI5324_PARTNUM + 1)?;
	Ok((u16::from(high) << 8) | u16::from(low))
}

pub fn has_input<M: I2cMasterExt + ?Sized>(master: &mut M) -> crate::AResult<bool> {
	Ok(0 == read(master, SI5324_LOS)? & 0x02)
}

pub fn has_xtal<M: I2cMasterExt + ?Sized>(master: &mut M) -> crate::AResult<bool> {
	Ok(0 == read(master, SI5324_LOS)? & 0x01)
}

pub fn locked<M: I2cMasterExt + ?Sized>(master: &mut M) -> crate::AResult<bool> {
	Ok(0 == read(master, SI5324_LOL)? & 0x01)
}

/// Output phase skew, in steps of the PLL's high speed clock.
pub fn set_skew<M: I2cMasterExt + ?Sized>(master: &mut M, skew: i8) -> crate::AResult<()> {
	write(master, SI5324_SKEW, skew as u8)
}

/// Check the product number, load `dividers` and start an internal
/// calibration with bandwidth setting `bwsel`.
pub fn program<M: I2cMasterExt + ?Sized>(master: &mut M, bwsel: u8, dividers: &Dividers) -> crate::AResult<()> {
	ensure!(bwsel < 16, "BWSEL is 4 bits wide, got {}", bwsel);
	ensure!(ident(master)? == SI5324_PRODUCT, "Si5324 does not have expected product number");
	info!("Programming Si5324 (BWSEL {}): {:?}", bwsel, dividers);

	let bwsel_reg = read(master, SI5324_BWSEL)?;
	write(master, SI5324_BWSEL, (bwsel_reg & 0x0f) | (bwsel << 4))?;
	// free run off
	let cksel_reg = read(master, SI5324_CKSEL)?;
	write(master, SI5324_CKSEL, cksel_reg | 0x10)?;
	// LVDS output
	let sfout_reg = read(master, SI5324_SFOUT)?;
	write(master, SI5324_SFOUT, (sfout_reg & 0x07) | 0x07)?;
	for (reg, value) in dividers.register_writes() {
		write(master, reg, value)?;
	}
	let fastlock_reg = read(master, SI5324_FASTLOCK)?;
	write(master, SI5324_FASTLOCK, fastlock_reg | 0x01)?;
	write(master, SI5324_ICAL, 0x40)
}

use crate::targets::{
	Dividers,
	PCA9548_ADDRESS,
	SI5324_ADDRESS,
	SI5324_BWSEL,
	SI5324_CKSEL,
	SI5324_FASTLOCK,
	SI5324_ICAL,
	SI5324_SFOUT,
};

use super::{
	Program,
	ProgramBuilder,
};

// the Si5324 sits behind this channel of the bus switch
pub const SI5324_SWITCH_CHANNEL: u8 = 7;

/// Reference transaction: address write, register byte, repeated start,
/// two reads (the first acknowledged), stop.
pub fn testbench() -> crate::AResult<Program> {
	ProgramBuilder::new()
		.divisor(4)
		.start()
		.write(0x40)
		.write(0x05)
		.restart()
		.write(0x81)
		.read(true)
		.read(false)
		.stop()
		.finish()
}

/// Enable a single downstream channel of a PCA9548 switch.
pub fn pca9548_select(channel: u8, divisor: u32) -> crate::AResult<Program> {
	ensure!(channel < 8, "PCA9548 has 8 channels, can't select {}", channel);
	ProgramBuilder::new()
		.divisor(divisor)
		.transaction(&[PCA9548_ADDRESS << 1, 1 << channel])
		.finish()
}

/// Bring up a Si5324 with the divider settings for `clk_freq` Hz; the bus
/// divisor is derived from the same frequency.
pub fn si5324_config(clk_freq: u32) -> crate::AResult<Program> {
	si5324_config_with(&Dividers::for_frequency(clk_freq)?, clk_freq / 1000)
}

/// Select the switch channel, then write BWSEL, CKSEL, SFOUT, the dividers,
/// FASTLOCK and ICAL, one transaction per register. Unlike the host driver
/// there is no read-back; the fixed bits use their reset values.
pub fn si5324_config_with(dividers: &Dividers, divisor: u32) -> crate::AResult<Program> {
	ensure!(divisor <= crate::registers::DIVISOR_MASK, "divisor {} doesn't fit into the config register", divisor);

	let mut writes = vec![
		(SI5324_BWSEL, 0b0010 | (4 << 4)),
		(SI5324_CKSEL, 0b0101 | 0x10),
		(SI5324_SFOUT, 0x07),
	];
	writes.extend(dividers.register_writes());
	writes.push((SI5324_FASTLOCK, 0x01));
	writes.push((SI5324_ICAL, 0x40));

	let mut builder = ProgramBuilder::new();
	builder.divisor(divisor);
	builder.transaction(&[PCA9548_ADDRESS << 1, 1 << SI5324_SWITCH_CHANNEL]);
	for (reg, value) in writes {
		builder.transaction(&[SI5324_ADDRESS << 1, reg, value]);
	}
	builder.finish()
}

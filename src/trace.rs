use std::io;

use crate::gateware::State;
use crate::pins::Levels;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Sample {
	pub tick: u64,
	pub scl: bool,
	pub sda: bool,
	pub state: State,
}

/// Records bus lines and engine state; only changes are stored.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Default)]
pub struct Trace {
	samples: Vec<Sample>,
}

impl Trace {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn record(&mut self, tick: u64, levels: Levels, state: State) {
		let sample = Sample {
			tick,
			scl: levels.scl,
			sda: levels.sda,
			state,
		};
		match self.samples.last() {
			Some(last) if (last.scl, last.sda, last.state) == (sample.scl, sample.sda, sample.state) => (),
			_ => self.samples.push(sample),
		}
	}

	pub fn samples(&self) -> &[Sample] {
		&self.samples
	}

	pub fn write_vcd<W: io::Write>(&self, mut out: W) -> io::Result<()> {
		writeln!(out, "$timescale 1ns $end")?;
		writeln!(out, "$scope module i2c $end")?;
		writeln!(out, "$var wire 1 c scl $end")?;
		writeln!(out, "$var wire 1 d sda $end")?;
		writeln!(out, "$var wire 4 s state $end")?;
		writeln!(out, "$upscope $end")?;
		writeln!(out, "$enddefinitions $end")?;

		let mut last: Option<Sample> = None;
		for sample in &self.samples {
			writeln!(out, "#{}", sample.tick)?;
			if last.map_or(true, |l| l.scl != sample.scl) {
				writeln!(out, "{}c", sample.scl as u8)?;
			}
			if last.map_or(true, |l| l.sda != sample.sda) {
				writeln!(out, "{}d", sample.sda as u8)?;
			}
			if last.map_or(true, |l| l.state != sample.state) {
				writeln!(out, "b{:04b} s", sample.state.index())?;
			}
			last = Some(*sample);
		}
		if let Some(last) = last {
			writeln!(out, "#{}", last.tick + 1)?;
		}
		Ok(())
	}
}

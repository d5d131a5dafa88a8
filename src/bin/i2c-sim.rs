#[macro_use]
extern crate clap;
#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;

extern crate i2c_sequencer;
use i2c_sequencer::*;

use std::fs;
use std::io;
use std::process::exit;

use i2c_sequencer::host::I2cMasterExt;
use i2c_sequencer::pins::OpenDrainBus;
use i2c_sequencer::sequencer::{
	Program,
	Sequencer,
};
use i2c_sequencer::sim::Simulation;
use i2c_sequencer::targets::{
	Dividers,
	Echo,
	Pca9548,
	Si5324,
};

fn get_param<T>(matches: &clap::ArgMatches, name: &str) -> AResult<T>
where
	T: std::str::FromStr,
	failure::Error: From<<T as std::str::FromStr>::Err>,
{
	let param = match matches.value_of(name) {
		Some(p) => p,
		None => bail!("missing parameter {}", name),
	};
	param.parse::<T>().map_err(|e| {
		let e = failure::Error::from(e);
		let msg = format!("invalid parameter {}: {}", name, e);
		e.context(msg).into()
	})
}

fn load_script(sub_m: &clap::ArgMatches) -> AResult<Program> {
	let path: String = get_param(sub_m, "SCRIPT")?;
	let text = fs::read_to_string(&path).map_err(|e| format_err!("{}: {}", path, e))?;
	sequencer::script::parse(&text).map_err(|e| {
		let msg = format!("{}: {}", path, e);
		e.context(msg).into()
	})
}

fn bus_with_target(name: &str) -> AResult<OpenDrainBus> {
	let bus = OpenDrainBus::new();
	Ok(match name {
		"none" => bus,
		"echo" => bus.with(Echo::new()),
		"pca9548" => bus.with(Pca9548::target()),
		"si5324" => bus.with(Pca9548::target()).with(Si5324::target()),
		_ => bail!("unknown target {:?}", name),
	})
}

fn write_vcd(sim: &Simulation, sub_m: &clap::ArgMatches) -> AResult<()> {
	let path = match sub_m.value_of("vcd") {
		Some(p) => p,
		None => return Ok(()),
	};
	if let Some(trace) = sim.trace() {
		let file = fs::File::create(path).map_err(|e| format_err!("{}: {}", path, e))?;
		trace.write_vcd(io::BufWriter::new(file))?;
		info!("Wrote {} trace samples to {}", trace.samples().len(), path);
	}
	Ok(())
}

fn run_program(program: Program, bus: OpenDrainBus, max_ticks: u64, sub_m: &clap::ArgMatches) -> AResult<()> {
	let mut sequencer = Sequencer::new(program);
	let mut sim = Simulation::new(bus);
	if sub_m.is_present("vcd") {
		sim.record();
	}

	let result = sim.run(&mut sequencer, max_ticks);
	// a trace of a stuck program is the interesting one
	write_vcd(&sim, sub_m)?;
	let ticks = result?;

	let stats = sequencer.stats();
	println!("halted at instruction {} after {} ticks", sequencer.pc(), ticks);
	println!("bus writes: {}", stats.writes);
	println!("bus polls:  {}", stats.polls);
	println!("xfer:       {:?}", sim.master().registers().xfer());
	Ok(())
}

fn run(sub_m: &clap::ArgMatches) -> AResult<()> {
	let program = load_script(sub_m)?;
	let target: String = get_param(sub_m, "target")?;
	let max_ticks: u64 = get_param(sub_m, "max_ticks")?;
	run_program(program, bus_with_target(&target)?, max_ticks, sub_m)
}

fn check(sub_m: &clap::ArgMatches) -> AResult<()> {
	let program = load_script(sub_m)?;
	print!("{}", program);
	Ok(())
}

fn testbench(sub_m: &clap::ArgMatches) -> AResult<()> {
	let program = sequencer::programs::testbench()?;
	run_program(program, OpenDrainBus::new(), 100_000, sub_m)
}

fn pca9548(sub_m: &clap::ArgMatches) -> AResult<()> {
	let channel: u8 = get_param(sub_m, "CHANNEL")?;
	let divisor: u32 = get_param(sub_m, "divisor")?;

	let mut sim = Simulation::new(OpenDrainBus::new().with(Pca9548::target()));
	sim.set_divisor(divisor)?;
	host::pca9548::select(&mut sim, channel)?;
	let control = host::pca9548::readback(&mut sim)?;
	ensure!(control == 1 << channel, "PCA9548 reads back 0x{:02x}, expected channel {}", control, channel);

	println!("channel {} selected (control 0x{:02x}, {} ticks)", channel, control, sim.ticks());
	Ok(())
}

fn si5324(sub_m: &clap::ArgMatches) -> AResult<()> {
	let bwsel: u8 = get_param(sub_m, "bwsel")?;
	let divisor: u32 = get_param(sub_m, "divisor")?;
	let frequency: u32 = get_param(sub_m, "frequency")?;
	let dividers = Dividers::for_frequency(frequency)?;

	let mut sim = Simulation::new(OpenDrainBus::new().with(Pca9548::target()).with(Si5324::target()));
	sim.set_divisor(divisor)?;
	host::pca9548::select(&mut sim, sequencer::programs::SI5324_SWITCH_CHANNEL)?;
	let ident = host::si5324::ident(&mut sim)?;
	println!("Si5324 product 0x{:04x}", ident);
	host::si5324::program(&mut sim, bwsel, &dividers)?;
	ensure!(host::si5324::has_xtal(&mut sim)?, "Si5324 reports no crystal");
	ensure!(host::si5324::has_input(&mut sim)?, "Si5324 reports no input clock");
	ensure!(host::si5324::locked(&mut sim)?, "Si5324 failed to lock");

	println!("locked at {} Hz ({} ticks)", frequency, sim.ticks());
	Ok(())
}

fn main_app() -> AResult<()> {
	let matches = clap_app!(@app (app_from_crate!())
		(@setting SubcommandRequiredElseHelp)
		(global_setting: clap::AppSettings::VersionlessSubcommands)
		(@subcommand run =>
			(about: "run a sequencer script on the simulated bus")
			(@arg target: -t --target +takes_value default_value("none") possible_values(&["none", "echo", "pca9548", "si5324"]) "device attached to the bus")
			(@arg max_ticks: -m --("max-ticks") +takes_value default_value("10000000") "give up after this many ticks")
			(@arg vcd: --vcd +takes_value "write line/state trace as VCD")
			(@arg SCRIPT: +required "sequencer script")
		)
		(@subcommand check =>
			(about: "parse a sequencer script and print it in normal form")
			(@arg SCRIPT: +required "sequencer script")
		)
		(@subcommand testbench =>
			(about: "run the reference transaction program against a loopback bus")
			(@arg vcd: --vcd +takes_value "write line/state trace as VCD")
		)
		(@subcommand pca9548 =>
			(about: "select a PCA9548 channel through the host driver and read it back")
			(@arg divisor: -d --divisor +takes_value default_value("4") "clock divisor")
			(@arg CHANNEL: +required "channel (0-7)")
		)
	).get_matches();

	match matches.subcommand() {
		("run", Some(sub_m)) => {
			run(sub_m)
		},
		("check", Some(sub_m)) => {
			check(sub_m)
		},
		("testbench", Some(sub_m)) => {
			testbench(sub_m)
		},
		("pca9548", Some(sub_m)) => {
			pca9548(sub_m)
		},
		("", _) => bail!("no subcommand"),
		(cmd, _) => bail!("not implemented subcommand {:?}", cmd),
	}
}

fn main() {
	env_logger::from_env(env_logger::Env::default().default_filter_or("info")).init();

	if let Err(e) = main_app() {
		error!("Error: {}", e);
		exit(1);
	}
}

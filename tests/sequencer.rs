extern crate i2c_sequencer;

use i2c_sequencer::gateware::State;
use i2c_sequencer::host::{
	pca9548,
	si5324,
};
use i2c_sequencer::pins::OpenDrainBus;
use i2c_sequencer::registers::{
	CONFIG_ADDR,
	XFER_ADDR,
	XFER_IDLE,
	XFER_START,
	XFER_STOP,
	XFER_WRITE,
};
use i2c_sequencer::sequencer::{
	Instruction,
	Program,
	Sequencer,
	programs,
	script,
};
use i2c_sequencer::sim::Simulation;
use i2c_sequencer::targets::{
	Dividers,
	Pca9548,
	Si5324,
};

fn start_write_stop() -> Program {
	Program::new(vec![
		Instruction::Write { address: CONFIG_ADDR, value: 4 },
		Instruction::Write { address: XFER_ADDR, value: XFER_START },
		Instruction::Wait { address: XFER_ADDR, mask: XFER_IDLE },
		Instruction::Write { address: XFER_ADDR, value: XFER_WRITE | 0x40 },
		Instruction::Wait { address: XFER_ADDR, mask: XFER_IDLE },
		Instruction::Write { address: XFER_ADDR, value: XFER_STOP },
		Instruction::Wait { address: XFER_ADDR, mask: XFER_IDLE },
		Instruction::End,
	]).unwrap()
}

#[test]
fn start_write_stop_on_loopback() {
	let mut sequencer = Sequencer::new(start_write_stop());
	let mut sim = Simulation::new(OpenDrainBus::new());

	let mut idle_since_write = true;
	let mut states = Vec::new();
	while !sequencer.is_halted() {
		assert!(sim.ticks() < 10_000, "stuck at {}", sequencer.pc());
		let writes = sequencer.stats().writes;
		let response = sim.tick(&sequencer.request());
		sequencer.advance(response);

		let state = sim.master().machine().state();
		if states.last() != Some(&state) {
			states.push(state);
		}
		if sequencer.stats().writes > writes {
			assert!(idle_since_write, "write {} issued while the engine was busy", writes + 1);
			idle_since_write = false;
		} else if sim.master().is_idle() {
			idle_since_write = true;
		}
	}

	let stats = sequencer.stats();
	assert_eq!(stats.writes, 4);
	assert!(stats.polls >= 3, "polls: {}", stats.polls);
	assert_eq!(sequencer.pc(), 7);
	assert!(sim.master().is_idle());
	assert_eq!(sim.pins().levels().scl, true);
	assert_eq!(sim.pins().levels().sda, true);

	assert_eq!(states[..4], [State::Idle, State::Start0, State::Start1, State::Idle]);
	assert_eq!(states.last(), Some(&State::Idle));
	assert!(states.contains(&State::ReadAck1));
	assert!(states.contains(&State::Stop2));

	// nothing happens after End
	let ticks = sim.ticks();
	for _ in 0..20 {
		let response = sim.tick(&sequencer.request());
		assert!(!response.ack);
		sequencer.advance(response);
	}
	assert_eq!(sim.ticks(), ticks + 20);
	assert_eq!(sequencer.stats(), stats);
}

#[test]
fn acknowledge_is_reported_not_acted_on() {
	let text = "
		write config 2
		write xfer START
		wait xfer IDLE
		write xfer WRITE|0xe8
		wait xfer IDLE
		end
	";
	let buses = vec![
		(OpenDrainBus::new(), false),
		(OpenDrainBus::new().with(Pca9548::target()), true),
	];
	for (bus, acked) in buses {
		let mut sequencer = Sequencer::new(script::parse(text).unwrap());
		let mut sim = Simulation::new(bus);
		sim.run(&mut sequencer, 10_000).unwrap();
		// the program carries on either way
		assert!(sequencer.is_halted());
		assert_eq!(sim.master().machine().ack(), acked);
		assert_eq!(sim.master().registers().xfer().is_ack(), acked);
	}
}

#[test]
fn testbench_program_completes() {
	let mut sequencer = Sequencer::new(programs::testbench().unwrap());
	let mut sim = Simulation::new(OpenDrainBus::new());
	sim.record();

	// XFER data as seen by each poll that let the program continue
	let mut polled = Vec::new();
	while !sequencer.is_halted() {
		assert!(sim.ticks() < 100_000, "stuck at {}", sequencer.pc());
		let pc = sequencer.pc();
		let waiting = match sequencer.current() {
			Instruction::Wait { .. } => true,
			_ => false,
		};
		let response = sim.tick(&sequencer.request());
		sequencer.advance(response);
		if waiting && sequencer.pc() != pc {
			polled.push(response.data & 0xff);
		}
	}
	assert_eq!(sequencer.stats().writes, 9);
	assert_eq!(polled.len(), 8);
	// loopback reads back a released line
	assert_eq!(polled[5], 0xff);
	assert_eq!(polled[6], 0xff);
	// stop loads zero data into the engine
	assert_eq!(polled[7], 0x00);
	assert_eq!(sim.master().registers().xfer().data(), 0x00);

	let trace = sim.trace().unwrap();
	assert!(trace.samples().iter().any(|s| State::Restart1 == s.state));
	assert!(trace.samples().iter().any(|s| State::WriteAck0 == s.state));
}

#[test]
fn script_runs_like_built_program() {
	let program = script::parse("
		write config 4
		write xfer START
		wait xfer IDLE
		write xfer WRITE|0x40
		wait xfer IDLE
		write xfer STOP
		wait xfer IDLE
		end
	").unwrap();
	assert_eq!(program, start_write_stop());

	let mut a = Sequencer::new(program);
	let mut b = Sequencer::new(start_write_stop());
	let ticks_a = Simulation::new(OpenDrainBus::new()).run(&mut a, 10_000).unwrap();
	let ticks_b = Simulation::new(OpenDrainBus::new()).run(&mut b, 10_000).unwrap();
	assert_eq!(ticks_a, ticks_b);
	assert_eq!(a.stats(), b.stats());
}

#[test]
fn divisor_zero_still_terminates() {
	let program = script::parse("
		write config 0
		write xfer START
		wait xfer IDLE
		write xfer READ
		wait xfer IDLE
		write xfer STOP
		wait xfer IDLE
		end
	").unwrap();
	let mut sequencer = Sequencer::new(program);
	let mut sim = Simulation::new(OpenDrainBus::new());
	sim.run(&mut sequencer, 1_000).unwrap();
	assert_eq!(sequencer.stats().writes, 4);
}

#[test]
fn si5324_config_program_configures_clock() {
	let bus = OpenDrainBus::new().with(Pca9548::target()).with(Si5324::target());
	let mut sim = Simulation::new(bus);
	let mut sequencer = Sequencer::new(programs::si5324_config_with(&Dividers::CLK_125MHZ, 2).unwrap());
	sim.run(&mut sequencer, 1_000_000).unwrap();
	assert_eq!(sequencer.stats().writes, 1 + 4 + 15 * 5);

	// switch channel 7, then the register writes
	assert_eq!(pca9548::readback(&mut sim).unwrap(), 0x80);
	assert_eq!(si5324::read(&mut sim, 2).unwrap(), 0x42);
	assert_eq!(si5324::read(&mut sim, 3).unwrap(), 0x15);
	assert_eq!(si5324::read(&mut sim, 25).unwrap(), 0x20);
	assert_eq!(si5324::read(&mut sim, 40).unwrap(), 0x60);
	assert_eq!(si5324::read(&mut sim, 42).unwrap(), 0x67);
	assert_eq!(si5324::read(&mut sim, 45).unwrap(), 62);
	assert_eq!(si5324::read(&mut sim, 137).unwrap(), 0x01);
	assert!(si5324::locked(&mut sim).unwrap());
}

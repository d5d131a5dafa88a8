/// Text form of sequencer programs
///
/// One instruction per line:
///
/// ```text
/// # comment
/// write config 4
/// write xfer WRITE|0x40
/// wait xfer IDLE
/// end
/// ```
///
/// Registers are given by name or number; values are `|`-joined numbers
/// (decimal, `0x` hex, `0b` binary) and XFER flag names.

use crate::registers::{
	CONFIG_ADDR,
	XFER_ADDR,
	XFER_DATA_MASK,
	XFER_FLAG_NAMES,
	register_name,
};

use super::{
	Instruction,
	Program,
};

fn parse_number(text: &str) -> crate::AResult<u32> {
	let cleaned = text.replace('_', "");
	let lower = cleaned.to_ascii_lowercase();
	let result = if lower.starts_with("0x") {
		u32::from_str_radix(&lower[2..], 16)
	} else if lower.starts_with("0b") {
		u32::from_str_radix(&lower[2..], 2)
	} else {
		lower.parse::<u32>()
	};
	result.map_err(|e| format_err!("invalid number '{}': {}", text, e))
}

fn parse_register(text: &str) -> crate::AResult<u32> {
	let lower = text.to_ascii_lowercase();
	for &address in &[XFER_ADDR, CONFIG_ADDR] {
		if Some(lower.as_str()) == register_name(address) {
			return Ok(address);
		}
	}
	parse_number(text)
}

fn parse_value(text: &str) -> crate::AResult<u32> {
	let mut value = 0;
	for term in text.split('|') {
		let term = term.trim();
		ensure!(!term.is_empty(), "empty term in '{}'", text);
		let upper = term.to_ascii_uppercase();
		value |= match XFER_FLAG_NAMES.iter().find(|&&(name, _)| name == upper) {
			Some(&(_, flag)) => flag,
			None => parse_number(term)?,
		};
	}
	Ok(value)
}

fn parse_line(line: &str) -> crate::AResult<Option<Instruction>> {
	let line = match line.find('#') {
		Some(pos) => &line[..pos],
		None => line,
	};
	let words: Vec<&str> = line.split_whitespace().collect();
	let (keyword, args) = match words.split_first() {
		None => return Ok(None),
		Some((keyword, args)) => (keyword.to_ascii_lowercase(), args),
	};

	let instruction = match (keyword.as_str(), args) {
		("write", &[register, value]) => Instruction::Write {
			address: parse_register(register)?,
			value: parse_value(value)?,
		},
		("wait", &[register, mask]) => Instruction::Wait {
			address: parse_register(register)?,
			mask: parse_value(mask)?,
		},
		("end", &[]) => Instruction::End,
		("write", _) | ("wait", _) => bail!("'{}' takes a register and a value, got {} arguments", keyword, args.len()),
		("end", _) => bail!("'end' takes no arguments"),
		_ => bail!("unknown instruction '{}'", keyword),
	};
	Ok(Some(instruction))
}

pub fn parse(text: &str) -> crate::AResult<Program> {
	let mut instructions = Vec::new();
	for (index, line) in text.lines().enumerate() {
		let parsed = with_context!(("line {}", index + 1), parse_line(line))?;
		if let Some(instruction) = parsed {
			instructions.push(instruction);
		}
	}
	Program::new(instructions)
}

/// Normal form of a register value: flag names for XFER, decimal for the
/// divisor, hex otherwise.
pub fn format_value(address: u32, value: u32) -> String {
	match address {
		XFER_ADDR => {
			let mut terms: Vec<String> = XFER_FLAG_NAMES.iter().rev()
				.filter(|&&(_, flag)| 0 != value & flag)
				.map(|&(name, _)| name.to_string())
				.collect();
			let known = XFER_FLAG_NAMES.iter().fold(0, |mask, &(_, flag)| mask | flag);
			let data = value & XFER_DATA_MASK;
			let unknown = value & !(known | XFER_DATA_MASK);
			if 0 != unknown {
				terms.push(format!("0x{:x}", unknown));
			}
			if 0 != data || terms.is_empty() {
				terms.push(format!("0x{:02x}", data));
			}
			terms.join("|")
		},
		CONFIG_ADDR => format!("{}", value),
		_ => format!("0x{:x}", value),
	}
}

use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use crate::types::*;

// One second in machine ticks; also what the frequency sink reports:
pub const TICKS_PER_SECOND: Word = Word(1 << 32);

// The word an input read yields once the host stream is exhausted.
// Programs should treat it as opaque; hosts are free to pick another convention.
pub const END_OF_INPUT: Word = Word(u64::MAX);

// The machine reaches its surroundings through this trait alone.
// Injecting it keeps the core single-threaded, synchronous and fully
// deterministic under test.
pub trait Host
{
	// Blocking read of one byte from the input stream:
	fn read_byte(&mut self) -> Word;

	// Write one byte to the output stream. Programs cannot observe failures.
	fn write_byte(&mut self, byte: u8);

	// The wall clock: seconds since the epoch in the high half, the fraction in ticks below:
	fn now(&mut self) -> Word;

	// Pause for the given number of ticks:
	fn sleep(&mut self, ticks: Word);
}

// The real process environment:
pub struct StdHost;

impl Host for StdHost
{
	fn read_byte(&mut self) -> Word
	{
		let mut byte = [0u8; 1];

		match io::stdin().lock().read_exact(&mut byte)
		{
			Ok(()) 	=> Word(byte[0] as u64),
			Err(_) 	=> END_OF_INPUT,
		}
	}

	fn write_byte(&mut self, byte: u8)
	{
		let _ = io::stdout().write_all(&[byte]);
	}

	fn now(&mut self) -> Word
	{
		match SystemTime::now().duration_since(UNIX_EPOCH)
		{
			Ok(elapsed) =>
			{
				let seconds = elapsed.as_secs().wrapping_shl(32);
				let fraction = ((elapsed.subsec_nanos() as u64) << 32) / 1_000_000_000;

				Word(seconds.wrapping_add(fraction))
			}

			// A clock before the epoch has nothing sensible to report:
			Err(_) => Word(0),
		}
	}

	fn sleep(&mut self, ticks: Word)
	{
		let seconds = ticks.0 >> 32;
		let nanos = ((ticks.0 & 0xFF_FF_FF_FF) * 1_000_000_000) >> 32;

		thread::sleep(Duration::new(seconds, nanos as u32));
	}
}

// A deterministic host for tests and embedders: scripted input, captured
// output, and a clock that only moves when the program sleeps.
pub struct ScriptedHost
{
	input: VecDeque<u8>,
	output: Vec<u8>,
	clock: Word,
	slept: Vec<Word>,
}

impl ScriptedHost
{
	pub fn new() -> ScriptedHost
	{
		ScriptedHost
		{
			input: VecDeque::new(),
			output: Vec::new(),
			clock: Word(0),
			slept: Vec::new(),
		}
	}

	pub fn with_input(input: &[u8]) -> ScriptedHost
	{
		let mut host = ScriptedHost::new();
		host.input.extend(input);
		host
	}

	pub fn set_clock(&mut self, clock: Word)
	{
		self.clock = clock;
	}

	pub fn output(&self) -> &[u8]
	{
		&self.output
	}

	pub fn slept(&self) -> &[Word]
	{
		&self.slept
	}
}

impl Host for ScriptedHost
{
	fn read_byte(&mut self) -> Word
	{
		match self.input.pop_front()
		{
			Some(byte) 	=> Word(byte as u64),
			None 		=> END_OF_INPUT,
		}
	}

	fn write_byte(&mut self, byte: u8)
	{
		self.output.push(byte);
	}

	fn now(&mut self) -> Word
	{
		self.clock
	}

	fn sleep(&mut self, ticks: Word)
	{
		self.clock = self.clock + ticks;
		self.slept.push(ticks);
	}
}

#[cfg(test)]
mod tests
{
	use super::*;

	#[test]
	fn scripted_input_drains_to_the_end_marker()
	{
		let mut host = ScriptedHost::with_input(b"ab");

		assert_eq!(host.read_byte(), Word(97));
		assert_eq!(host.read_byte(), Word(98));
		assert_eq!(host.read_byte(), END_OF_INPUT);
		assert_eq!(host.read_byte(), END_OF_INPUT);
	}

	#[test]
	fn scripted_sleep_advances_the_clock()
	{
		let mut host = ScriptedHost::new();
		host.set_clock(Word(5) + TICKS_PER_SECOND);

		host.sleep(TICKS_PER_SECOND);
		host.sleep(Word(1 << 31));

		assert_eq!(host.now(), Word(5) + Word(2 << 32) + Word(1 << 31));
		assert_eq!(host.slept(), &[TICKS_PER_SECOND, Word(1 << 31)]);
	}
}

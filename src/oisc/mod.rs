use crate::assembly::{self, AssemblerError, Labels};
use crate::host::{Host, StdHost, TICKS_PER_SECOND};
use crate::memory::{self, Memory};
use crate::types::*;

// The machine's lifecycle states. Everything but Running is absorbing.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum RunState
{
	Running,
	Complete,
	ParserError,
	MemoryError,
}

// The machine: a flat word memory, an instruction pointer and a host.
// There are no registers and no decoder - the one instruction reads its three
// operands straight out of memory.
pub struct Oisc<H: Host>
{
	memory: Memory,
	labels: Labels,
	ip: Word,
	state: RunState,
	status: String,
	host: H,
}

impl Oisc<StdHost>
{
	pub fn new() -> Oisc<StdHost>
	{
		Oisc::with_host(StdHost)
	}
}

impl<H: Host> Oisc<H>
{
	pub fn with_host(host: H) -> Oisc<H>
	{
		Oisc
		{
			memory: Memory::new(),
			labels: Labels::new(),
			ip: Word(0),
			state: RunState::Running,
			status: String::new(),
			host,
		}
	}

	// Reset to the freshly-created state. The host stays attached.
	pub fn clear(&mut self)
	{
		self.memory = Memory::new();
		self.labels = Labels::new();
		self.ip = Word(0);
		self.state = RunState::Running;
		self.status.clear();
	}

	// Assemble a program into a cleared machine.
	// A failure parks the machine in a terminal state with a rendered status.
	pub fn load_assembly(&mut self, source: &str)
	{
		self.clear();

		match assembly::assemble(source, &mut self.memory, &mut self.labels)
		{
			Ok(()) => (),

			Err(AssemblerError::Parser(err)) =>
			{
				self.state = RunState::ParserError;
				self.status = err.render(source);
			}

			Err(AssemblerError::Memory(err)) =>
			{
				self.state = RunState::MemoryError;
				self.status = format!("{:}", err);
			}
		}
	}

	pub fn state(&self) -> RunState
	{
		self.state
	}

	pub fn status(&self) -> &str
	{
		&self.status
	}

	pub fn ip(&self) -> Word
	{
		self.ip
	}

	pub fn set_ip(&mut self, ip: Word)
	{
		self.ip = ip;
	}

	pub fn get(&self, addr: Word) -> Word
	{
		self.memory.get(addr)
	}

	// Poke a memory cell from outside. Like any write it may fail the machine:
	pub fn set(&mut self, addr: Word, val: Word)
	{
		if let Err(err) = self.memory.set(addr, val)
		{
			self.fail(err);
		}
	}

	// Expose assembled labels to embedders and tests:
	pub fn find_label(&self, name: &str) -> Option<Word>
	{
		self.labels.find(name)
	}

	pub fn host(&self) -> &H
	{
		&self.host
	}

	pub fn host_mut(&mut self) -> &mut H
	{
		&mut self.host
	}

	// Execute up to steps instructions.
	// u32::MAX means unbounded: the counter never decrements, so only a state
	// change ends the loop. Partial runs keep ip exact for seamless resumption.
	pub fn run(&mut self, steps: u32)
	{
		if self.state != RunState::Running
		{
			return;
		}

		let countdown = steps != u32::MAX;
		let mut remaining = steps;

		while remaining != 0
		{
			self.step();

			if self.state != RunState::Running
			{
				break;
			}

			if countdown
			{
				remaining -= 1;
			}
		}
	}
}

impl<H: Host> Oisc<H>
{
	// One round of the primitive: fetch A, B, C, resolve the right-hand value,
	// subtract-and-branch or talk to the host.
	fn step(&mut self)
	{
		// Fetch the operand triple (implicit zeros included) and advance:
		let a = self.memory.get(self.ip);
		let b = self.memory.get(self.ip + Word(1));
		let c = self.memory.get(self.ip + Word(2));
		self.ip = self.ip + Word(3);

		// The right-hand value:
		let mb = if b < IO_BASE
		{
			self.memory.get(b)
		}
		else
		{
			match b
			{
				INPUT 		=> self.host.read_byte(),
				FREQUENCY 	=> TICKS_PER_SECOND,
				CLOCK 		=> self.host.now(),
				_ 			=> Word(0),
			}
		};

		if a < IO_BASE
		{
			// The primitive: branch if the old value does not exceed mb, then subtract.
			// Unbacked cells hold 0, so their branch is always taken; the store may
			// have to grow the memory and is the machine's one failure point.
			let ma = self.memory.get(a);

			if ma <= mb
			{
				self.ip = c;
			}

			if let Err(err) = self.memory.set(a, ma - mb)
			{
				self.fail(err);
			}

			return;
		}

		// Reserved addresses branch unconditionally and dispatch to the host:
		self.ip = c;

		match a
		{
			HALT 	=> self.state = RunState::Complete,
			OUTPUT 	=> self.host.write_byte(mb.0 as u8),
			SLEEP 	=> self.host.sleep(mb),
			_ 		=> (),
		}
	}

	fn fail(&mut self, err: memory::Error)
	{
		self.state = RunState::MemoryError;
		self.status = format!("{:}", err);
	}
}

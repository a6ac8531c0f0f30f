mod cli;

use std::env;
use std::fs;
use std::io::{self, Write};
use std::process;
use oiscsim::oisc::{Oisc, RunState};

// Instructions per runner slice. The machine resumes exactly where a slice ends,
// so the slice size is invisible to programs.
const STEP_SLICE: u32 = 1 << 24;

fn main()
{
	let mut machine = Oisc::new();

	match env::args().nth(1)
	{
		// No file argument: run the embedded usage program.
		None => machine.load_assembly(cli::USAGE_PROGRAM),

		Some(path) => match fs::read_to_string(&path)
		{
			Ok(source) => machine.load_assembly(&source),

			Err(_) =>
			{
				cli::report(RunState::ParserError, &format!("Could not open file \"{:}\"\n", path));
				process::exit(2);
			}
		}
	}

	// The runner: keep asking for bounded slices until the machine settles.
	let code = loop
	{
		machine.run(STEP_SLICE);

		match machine.state()
		{
			RunState::Running 		=> continue,
			RunState::Complete 		=> break 0,
			RunState::ParserError 	=> break 2,
			RunState::MemoryError 	=> break 3,
		}
	};

	// Program output went through the buffered stream; push it out before exiting.
	let _ = io::stdout().flush();

	if code != 0
	{
		cli::report(machine.state(), machine.status());
	}

	process::exit(code);
}

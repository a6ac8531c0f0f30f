use std::io::{self, Write};
use oiscsim::oisc::RunState;
use termion::color;
use termion::is_tty;

// The embedded demo program: the usual self-modifying print loop, counting a
// pointer through the text until the length cell runs out.
pub const USAGE_PROGRAM: &str = "
	loop: len  ?     neg             # Decrement [len]. If [len]<=1, exit.
	      0-2  text  ?+1             # Print a letter.
	      ?-2  neg   loop            # Increment letter pointer.

	text: 85 115 97 103 101 58 32    # Usage:
	      111 105 115 99 115 105 109 # oiscsim
	      32 102 105 108 101 46      # file.
	      111 105 115 99 10          # oisc
	neg:  0-1
	len:  len-text
";

// Report a terminal state on stderr.
// The headline gets a splash of red when someone is watching.
pub fn report(state: RunState, status: &str)
{
	let headline = match state
	{
		RunState::Running 		=> "Stopped while still running",
		RunState::Complete 		=> "Complete",
		RunState::ParserError 	=> "Assembly failed",
		RunState::MemoryError 	=> "Out of memory",
	};

	let stderr = io::stderr();
	let colored = is_tty(&stderr);
	let mut stderr = stderr.lock();

	if colored
	{
		let _ = writeln!(stderr, "{:}{:}{:}", color::Fg(color::Red), headline, color::Fg(color::Reset));
	}
	else
	{
		let _ = writeln!(stderr, "{:}", headline);
	}

	let _ = write!(stderr, "{:}", status);
}

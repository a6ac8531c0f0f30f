use std::convert::From;
use std::error::Error;
use std::fmt;
use std::ops::Range;
use crate::memory;

// The different ways a source text can be rejected:
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum ParserErrorKind
{
	LeadingOperator,
	DoubleOperator,
	TrailingOperator,
	OperatingOnDeclaration,
	UnseparatedTokens,
	UnexpectedToken,
	UnknownLabel,
	DuplicateLabel,
	UnterminatedBlockComment,
	SourceTooLong,
}

impl fmt::Display for ParserErrorKind
{
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result
	{
		let text = match self
		{
			ParserErrorKind::LeadingOperator 			=> "Leading operator",
			ParserErrorKind::DoubleOperator 			=> "Double operator",
			ParserErrorKind::TrailingOperator 			=> "Trailing operator",
			ParserErrorKind::OperatingOnDeclaration 	=> "Operating on declaration",
			ParserErrorKind::UnseparatedTokens 			=> "Unseparated tokens",
			ParserErrorKind::UnexpectedToken 			=> "Unexpected token",
			ParserErrorKind::UnknownLabel 				=> "Unable to find label",
			ParserErrorKind::DuplicateLabel 			=> "Duplicate label declaration",
			ParserErrorKind::UnterminatedBlockComment 	=> "Unterminated block quote",
			ParserErrorKind::SourceTooLong 				=> "Input string too long",
		};

		write!(f, "{:}", text)
	}
}

// How much of the offending line the rendered diagnostic shows:
const WINDOW_BYTES: usize = 60;
const CONTEXT_BYTES: usize = 30;

// A parser error, with the byte range of the offending token when there is one.
// Rendering needs the source text back, so it is a separate step.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ParserError
{
	pub kind: ParserErrorKind,
	pub span: Option<Range<usize>>,
}

impl ParserError
{
	pub fn new(kind: ParserErrorKind, span: Option<Range<usize>>) -> ParserError
	{
		ParserError
		{
			kind,
			span,
		}
	}

	// Render the error against its source: the kind, the 1-based line number and
	// a caret-underlined window of the offending line.
	// All slicing is byte-based; labels may put the window boundary inside a
	// UTF-8 sequence, so the final conversion is lossy.
	pub fn render(&self, source: &str) -> String
	{
		let span = match &self.span
		{
			None 		=> return format!("Parser: {:}\n", self.kind),
			Some(span) 	=> span.clone(),
		};

		let bytes = source.as_bytes();
		let line = 1 + bytes[..span.start].iter().filter(|&&b| b == b'\n').count();

		// The boundaries of the line the error sits on:
		let mut s0 = bytes[..span.start].iter().rposition(|&b| b == b'\n').map_or(0, |pos| pos + 1);
		let mut s1 = span.start;

		while s1 < bytes.len() && bytes[s1] != b'\n'
		{
			s1 += 1;
		}

		// Trim whitespace (and other control bytes) from both ends:
		while s0 < s1 && bytes[s0] <= b' '
		{
			s0 += 1;
		}

		while s1 > s0 && bytes[s1 - 1] <= b' '
		{
			s1 -= 1;
		}

		// Keep the offending token in view on long lines:
		if span.start > s0 + CONTEXT_BYTES
		{
			s0 = span.start - CONTEXT_BYTES;
		}

		// Extract the window and underline the error.
		// Control bytes keep their place in the ruler so that tabs stay aligned.
		let mut window = Vec::new();
		let mut under = Vec::new();

		for pos in s0..s1.min(s0 + WINDOW_BYTES)
		{
			let byte = bytes[pos];
			window.push(byte);

			under.push(match byte
			{
				_ if pos >= span.start && pos < span.end 	=> b'^',
				byte if byte <= b' ' 						=> byte,
				_ 											=> b' ',
			});
		}

		format!
		(
			"Parser: {:}\nLine  : {:}\n\n\t{:}\n\t{:}\n\n",
			self.kind,
			line,
			String::from_utf8_lossy(&window),
			String::from_utf8_lossy(&under)
		)
	}
}

impl fmt::Display for ParserError
{
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result
	{
		write!(f, "Parser: {:}", self.kind)
	}
}

impl Error for ParserError { }

// This is a compound error type that wraps everything assembly can run into:
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum AssemblerError
{
	Parser(ParserError),
	Memory(memory::Error),
}

impl From<ParserError> for AssemblerError
{
	fn from(err: ParserError) -> Self
	{
		AssemblerError::Parser(err)
	}
}

impl From<memory::Error> for AssemblerError
{
	fn from(err: memory::Error) -> Self
	{
		AssemblerError::Memory(err)
	}
}

impl fmt::Display for AssemblerError
{
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result
	{
		match self
		{
			AssemblerError::Parser(err) => write!(f, "{:}", err),
			AssemblerError::Memory(err) => write!(f, "{:}", err),
		}
	}
}

impl Error for AssemblerError { }

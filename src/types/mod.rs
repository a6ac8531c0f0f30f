use bitflags::bitflags;
use std::fmt;
use std::ops::{Add, Sub};

// A machine word (64 bit, newtype idiom).
// Words are both memory cells and addresses; all arithmetic wraps modulo 2^64.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub struct Word(pub u64);

impl fmt::Display for Word
{
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result
	{
		write!(f, "{:}", self.0)
	}
}

impl Add for Word
{
	type Output = Word;

	fn add(self, rhs: Word) -> Word
	{
		Word(self.0.wrapping_add(rhs.0))
	}
}

impl Sub for Word
{
	type Output = Word;

	fn sub(self, rhs: Word) -> Word
	{
		Word(self.0.wrapping_sub(rhs.0))
	}
}

// The reserved range is the 32 largest words ("negative addresses").
// Everything strictly below IO_BASE is ordinary memory.
pub const IO_BASE: Word = Word(0u64.wrapping_sub(32));

// The named host sinks at the very top of the reserved range:
pub const HALT: Word 		= Word(0u64.wrapping_sub(1));
pub const OUTPUT: Word 		= Word(0u64.wrapping_sub(2));
pub const INPUT: Word 		= Word(0u64.wrapping_sub(3));
pub const FREQUENCY: Word 	= Word(0u64.wrapping_sub(4));
pub const CLOCK: Word 		= Word(0u64.wrapping_sub(5));
pub const SLEEP: Word 		= Word(0u64.wrapping_sub(6));

// The longest assembly source text we accept, in bytes:
pub const MAX_SOURCE_BYTES: usize = (1 << 30) - 1;


// There is also a flags type for the character classes of the source language.
// The tokenizer bases all of its predicates on it.
bitflags!
{
	pub struct CharClass: u8
	{
		const SPACE 	= (1 << 0);
		const DIGIT 	= (1 << 1);
		const HEX 		= (1 << 2);
		const LABEL 	= (1 << 3);
		const OPERATOR 	= (1 << 4);
	}
}

// Classify a single character.
// Every non-ASCII character is a label character; that is what makes labels UTF-8-capable.
pub fn classify(c: char) -> CharClass
{
	match c
	{
		' ' | '\t' | '\r' | '\n' 			=> CharClass::SPACE,
		'0'..='9' 							=> CharClass::DIGIT | CharClass::HEX | CharClass::LABEL,
		'a'..='f' | 'A'..='F' 				=> CharClass::HEX | CharClass::LABEL,
		'g'..='z' | 'G'..='Z' | '_' | '.' 	=> CharClass::LABEL,
		'+' | '-' 							=> CharClass::OPERATOR,
		c if (c as u32) > 127 				=> CharClass::LABEL,
		_ 									=> CharClass::empty(),
	}
}

// Praise the nom :)
use std::ops::Range;
use nom::
{
	IResult,
	branch::alt,
	bytes::complete::{tag, take_until, take_while, take_while1},
	character::complete::char as single_char,
	sequence::{delimited, preceded},
};
use crate::assembly::error::*;
use crate::types::*;

// Note: "'src" is the lifetime of the string slice we tokenize.
// All references (label names, spans) annotated with it point into that original slice.

// The tokens of the source language.
// Numbers, the current-address marker and label recalls each produce one word;
// declarations and operators only steer the emitter.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Token<'src>
{
	Number(Word),
	Here,
	Recall(&'src str),
	Declare(&'src str),
	Plus,
	Minus,
}

impl<'src> Token<'src>
{
	// Does this token stand for a word value?
	fn is_value(&self) -> bool
	{
		matches!(self, Token::Number(_) | Token::Here | Token::Recall(_))
	}
}

// A token plus the byte range it was scanned from (for diagnostics):
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct SpannedToken<'src>
{
	pub token: Token<'src>,
	pub span: Range<usize>,
}

// Predicates over our character classes:
fn is_space(c: char) -> bool
{
	classify(c).contains(CharClass::SPACE)
}

fn is_digit(c: char) -> bool
{
	classify(c).contains(CharClass::DIGIT)
}

fn is_hex_digit(c: char) -> bool
{
	classify(c).contains(CharClass::HEX)
}

fn is_label_char(c: char) -> bool
{
	classify(c).contains(CharClass::LABEL)
}

// Whitespace is space, tab, CR and LF:
fn whitespace(i: &str) -> IResult<&str, &str>
{
	take_while1(is_space)(i)
}

// A line comment runs from '#' up to (not including) the next newline:
fn line_comment(i: &str) -> IResult<&str, &str>
{
	preceded(single_char('#'), take_while(|c| c != '\n'))(i)
}

// A block comment is "#|" ... "|#" and does not nest.
// The combinator fails when the terminator is missing; the tokenizer turns that
// into an "Unterminated block quote" error.
fn block_comment(i: &str) -> IResult<&str, &str>
{
	delimited(tag("#|"), take_until("|#"), tag("|#"))(i)
}

// A number is a run of decimal digits, or "0x"/"0X" with a (possibly empty) run
// of hex digits. Digits fold with wrap-around, like all word arithmetic.
fn number(i: &str) -> IResult<&str, Word>
{
	alt((hex_number, dec_number))(i)
}

fn hex_number(i: &str) -> IResult<&str, Word>
{
	let (rest, digits) = preceded(alt((tag("0x"), tag("0X"))), take_while(is_hex_digit))(i)?;
	Ok((rest, fold_digits(digits, 16)))
}

fn dec_number(i: &str) -> IResult<&str, Word>
{
	let (rest, digits) = take_while1(is_digit)(i)?;
	Ok((rest, fold_digits(digits, 10)))
}

fn fold_digits(digits: &str, base: u64) -> Word
{
	digits.chars().fold(Word(0), |acc, c|
	{
		let digit = c.to_digit(base as u32).unwrap_or(0) as u64;
		Word(acc.0.wrapping_mul(base).wrapping_add(digit))
	})
}

// A label identifier is a maximal run of label characters:
fn label(i: &str) -> IResult<&str, &str>
{
	take_while1(is_label_char)(i)
}

// Byte offset of a tail slice into the source it came from:
fn offset(src: &str, rest: &str) -> usize
{
	src.len() - rest.len()
}

// The tokenizer walks the source once and yields spanned tokens in stream order.
// Lexical errors come out through the iterator, so a pass trips over them exactly
// where its scan does.
pub struct Tokenizer<'src>
{
	src: &'src str,
	rest: &'src str,
	failed: bool,
}

impl<'src> Tokenizer<'src>
{
	pub fn new(src: &'src str) -> Tokenizer<'src>
	{
		Tokenizer
		{
			src,
			rest: src,
			failed: false,
		}
	}
}

impl<'src> Iterator for Tokenizer<'src>
{
	type Item = Result<SpannedToken<'src>, ParserError>;

	fn next(&mut self) -> Option<Self::Item>
	{
		if self.failed
		{
			return None;
		}

		match self.scan()
		{
			Ok(None) => None,
			Ok(Some(token)) => Some(Ok(token)),
			Err(err) =>
			{
				self.failed = true;
				Some(Err(err))
			}
		}
	}
}

impl<'src> Tokenizer<'src>
{
	fn scan(&mut self) -> Result<Option<SpannedToken<'src>>, ParserError>
	{
		self.skip_trivia()?;

		let input = self.rest;
		let start = offset(self.src, input);

		let first = match input.chars().next()
		{
			None => return Ok(None),
			Some(c) => c,
		};

		let (token, rest) = if is_digit(first)
		{
			match number(input)
			{
				Ok((rest, value)) => (Token::Number(value), rest),
				Err(_) => return Err(self.unexpected(start, first)),
			}
		}
		else if first == '?'
		{
			(Token::Here, &input[1..])
		}
		else if first == '+'
		{
			(Token::Plus, &input[1..])
		}
		else if first == '-'
		{
			(Token::Minus, &input[1..])
		}
		else if is_label_char(first)
		{
			match label(input)
			{
				Ok((rest, name)) =>
				{
					// A label run directly followed by ':' is a declaration:
					if let Some(stripped) = rest.strip_prefix(':')
					{
						(Token::Declare(name), stripped)
					}
					else
					{
						(Token::Recall(name), rest)
					}
				}
				Err(_) => return Err(self.unexpected(start, first)),
			}
		}
		else
		{
			return Err(self.unexpected(start, first));
		};

		self.rest = rest;
		let span = start..offset(self.src, rest);

		// Two value tokens need an operator, whitespace or a comment between them:
		if token.is_value() && rest.chars().next().map_or(false, |c| is_label_char(c) || c == '?')
		{
			return Err(ParserError::new(ParserErrorKind::UnseparatedTokens, Some(span)));
		}

		Ok(Some(SpannedToken { token, span }))
	}

	// Consume whitespace and comments in any order:
	fn skip_trivia(&mut self) -> Result<(), ParserError>
	{
		loop
		{
			if let Ok((rest, _)) = whitespace(self.rest)
			{
				self.rest = rest;
				continue;
			}

			if self.rest.starts_with("#|")
			{
				match block_comment(self.rest)
				{
					Ok((rest, _)) =>
					{
						self.rest = rest;
						continue;
					}
					Err(_) =>
					{
						let start = offset(self.src, self.rest);
						return Err(ParserError::new(ParserErrorKind::UnterminatedBlockComment, Some(start..self.src.len())));
					}
				}
			}

			if let Ok((rest, _)) = line_comment(self.rest)
			{
				self.rest = rest;
				continue;
			}

			return Ok(());
		}
	}

	fn unexpected(&self, start: usize, first: char) -> ParserError
	{
		ParserError::new(ParserErrorKind::UnexpectedToken, Some(start..start + first.len_utf8()))
	}
}

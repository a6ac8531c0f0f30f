use std::mem;
use std::ops::Range;
use crate::assembly::error::*;
use crate::assembly::labels::*;
use crate::assembly::parser::*;
use crate::memory::Memory;
use crate::types::*;

// Assemble source text into the given memory image and label table.
// The source is scanned twice with identical token streams: the first pass binds
// declarations to addresses, the second resolves recalls and stores words.
pub fn assemble(source: &str, memory: &mut Memory, labels: &mut Labels) -> Result<(), AssemblerError>
{
	if source.len() > MAX_SOURCE_BYTES
	{
		return Err(ParserError::new(ParserErrorKind::SourceTooLong, None).into());
	}

	Pass::new(Stage::Declare, memory, labels).run(source)?;
	Pass::new(Stage::Emit, memory, labels).run(source)
}

// Which of the two passes is scanning:
#[derive(Copy, Clone, PartialEq)]
enum Stage
{
	Declare,
	Emit,
}

// What the emitter still has to combine with the next value:
enum Pending
{
	Nothing,
	Add(Range<usize>),
	Subtract(Range<usize>),
	Declaration,
}

// One pass over the token stream.
// "addr" is the emission address (what '?' evaluates to), "acc" the value of the
// expression being built. A value is only written once the token after it proves
// that no operator extends the expression, so emission lags one word behind.
struct Pass<'st>
{
	stage: Stage,
	memory: &'st mut Memory,
	labels: &'st mut Labels,
	scope: NodeRef,
	addr: Word,
	acc: Word,
	pending: Pending,
}

impl<'st> Pass<'st>
{
	fn new(stage: Stage, memory: &'st mut Memory, labels: &'st mut Labels) -> Pass<'st>
	{
		let scope = labels.root();

		Pass
		{
			stage,
			memory,
			labels,
			scope,
			addr: Word(0),
			acc: Word(0),
			pending: Pending::Nothing,
		}
	}

	fn run(&mut self, source: &str) -> Result<(), AssemblerError>
	{
		for scanned in Tokenizer::new(source)
		{
			let SpannedToken { token, span } = scanned?;

			match token
			{
				Token::Plus | Token::Minus 	=> self.operator(token, span)?,
				Token::Number(value) 		=> self.value(value)?,
				Token::Here 				=> self.value(self.addr)?,
				Token::Recall(name) 		=> self.recall(name, span)?,
				Token::Declare(name) 		=> self.declare(name, span)?,
			}
		}

		// An operator with no value to its right never closes its expression:
		match mem::replace(&mut self.pending, Pending::Nothing)
		{
			Pending::Add(span) | Pending::Subtract(span) =>
			{
				return Err(ParserError::new(ParserErrorKind::TrailingOperator, Some(span)).into());
			}
			_ => (),
		}

		// Flush the last expression:
		self.flush()
	}
}

impl<'st> Pass<'st>
{
	fn operator(&mut self, token: Token, span: Range<usize>) -> Result<(), AssemblerError>
	{
		let kind = match self.pending
		{
			Pending::Declaration 					=> Some(ParserErrorKind::OperatingOnDeclaration),
			Pending::Add(_) | Pending::Subtract(_) 	=> Some(ParserErrorKind::DoubleOperator),
			Pending::Nothing 						=> None,
		};

		// An operator without anything to its left outranks the other complaints:
		let kind = if self.addr == Word(0) { Some(ParserErrorKind::LeadingOperator) } else { kind };

		if let Some(kind) = kind
		{
			return Err(ParserError::new(kind, Some(span)).into());
		}

		// The operator folds the next value into the previous word, so the
		// emission address steps back onto it:
		self.addr = self.addr - Word(1);

		self.pending = match token
		{
			Token::Plus => Pending::Add(span),
			_ 			=> Pending::Subtract(span),
		};

		Ok(())
	}

	fn recall(&mut self, name: &str, span: Range<usize>) -> Result<(), AssemblerError>
	{
		let node = self.labels.intern(self.scope, name);
		let value = self.labels.address(node);

		if self.stage == Stage::Emit && value == UNRESOLVED
		{
			return Err(ParserError::new(ParserErrorKind::UnknownLabel, Some(span)).into());
		}

		self.value(value)
	}

	fn declare(&mut self, name: &str, span: Range<usize>) -> Result<(), AssemblerError>
	{
		let node = self.labels.intern(self.scope, name);

		if self.stage == Stage::Declare
		{
			if self.labels.address(node) != UNRESOLVED
			{
				return Err(ParserError::new(ParserErrorKind::DuplicateLabel, Some(span)).into());
			}

			self.labels.set_address(node, self.addr);
		}

		// A top-level declaration opens a new sublabel scope; a dotted one stays inside it:
		if !name.starts_with('.')
		{
			self.scope = node;
		}

		if let Pending::Add(_) | Pending::Subtract(_) = self.pending
		{
			return Err(ParserError::new(ParserErrorKind::OperatingOnDeclaration, Some(span)).into());
		}

		self.pending = Pending::Declaration;
		Ok(())
	}

	fn value(&mut self, value: Word) -> Result<(), AssemblerError>
	{
		match mem::replace(&mut self.pending, Pending::Nothing)
		{
			Pending::Add(_) 		=> self.acc = self.acc + value,
			Pending::Subtract(_) 	=> self.acc = self.acc - value,

			Pending::Nothing | Pending::Declaration =>
			{
				// A fresh value closes the previous expression:
				self.flush()?;
				self.acc = value;
			}
		}

		self.addr = self.addr + Word(1);
		Ok(())
	}

	fn flush(&mut self) -> Result<(), AssemblerError>
	{
		// The very first flush lands on address -1 with value 0 and the
		// zero-write shortcut absorbs it.
		if self.stage == Stage::Emit
		{
			self.memory.set(self.addr - Word(1), self.acc)?;
		}

		Ok(())
	}
}

#[cfg(test)]
mod tests
{
	use super::*;

	fn assembled(source: &str) -> (Memory, Labels)
	{
		let mut memory = Memory::new();
		let mut labels = Labels::new();

		assemble(source, &mut memory, &mut labels)
			.unwrap_or_else(|err| panic!("assembling {:?} failed: {:?}", source, err));

		(memory, labels)
	}

	fn rejected(source: &str) -> ParserError
	{
		let mut memory = Memory::new();
		let mut labels = Labels::new();

		match assemble(source, &mut memory, &mut labels)
		{
			Ok(()) => panic!("assembling {:?} should have failed", source),
			Err(AssemblerError::Parser(err)) => err,
			Err(AssemblerError::Memory(err)) => panic!("unexpected memory error: {:?}", err),
		}
	}

	fn image(memory: &Memory, len: u64) -> Vec<u64>
	{
		(0..len).map(|addr| memory.get(Word(addr)).0).collect()
	}

	#[test]
	fn expressions_emit_one_word_each()
	{
		let (memory, _) = assembled("1 2 3");
		assert_eq!(image(&memory, 4), vec![1, 2, 3, 0]);
	}

	#[test]
	fn operators_fold_left_to_right_with_wrap_around()
	{
		let (memory, _) = assembled("1-2+0x21 0-1 10-4-4");
		assert_eq!(image(&memory, 3), vec![32, u64::MAX, 2]);
	}

	#[test]
	fn the_here_token_is_the_emission_address()
	{
		let (memory, _) = assembled("? ? ?+1 5+?");
		assert_eq!(image(&memory, 4), vec![0, 1, 3, 8]);
	}

	#[test]
	fn whitespace_and_newlines_extend_expressions()
	{
		let (memory, _) = assembled("1\n+ 2 - 1 4");
		assert_eq!(image(&memory, 2), vec![2, 4]);
	}

	#[test]
	fn labels_resolve_forward_and_backward()
	{
		let (memory, labels) = assembled("start: end 0 end: start");
		assert_eq!(image(&memory, 3), vec![2, 0, 0]);
		assert_eq!(labels.find("start"), Some(Word(0)));
		assert_eq!(labels.find("end"), Some(Word(2)));
	}

	#[test]
	fn declarations_do_not_break_expressions_apart()
	{
		// The pending value flushes once the next value arrives, even across a declaration:
		let (memory, labels) = assembled("1 lbl: 2");
		assert_eq!(image(&memory, 2), vec![1, 2]);
		assert_eq!(labels.find("lbl"), Some(Word(1)));
	}

	#[test]
	fn sublabels_attach_to_the_outer_scope()
	{
		let (_, labels) = assembled("a: .x: 1 b: .x: 2");

		assert_eq!(labels.find("a"), Some(Word(0)));
		assert_eq!(labels.find("a.x"), Some(Word(0)));
		assert_eq!(labels.find("b"), Some(Word(1)));
		assert_eq!(labels.find("b.x"), Some(Word(1)));
	}

	#[test]
	fn qualified_declarations_reset_the_scope()
	{
		// "a.x:" is a top-level name, so ".y" nests under it:
		let (_, labels) = assembled("a.x: .y: 0");

		assert_eq!(labels.find("a.x"), Some(Word(0)));
		assert_eq!(labels.find("a.x.y"), Some(Word(0)));
		assert_eq!(labels.find("a.y"), None);
	}

	#[test]
	fn dotted_recalls_use_the_scope_of_the_recall_site()
	{
		let (memory, _) = assembled("a: .x-2 a.x: 0 0");
		assert_eq!(memory.get(Word(0)), Word(u64::MAX));
	}

	#[test]
	fn duplicate_declarations_are_rejected()
	{
		let err = rejected("lbl: lbl: 0-1 0 0");
		assert_eq!(err.kind, ParserErrorKind::DuplicateLabel);
		assert_eq!(err.span, Some(5..9));

		// Same node through sublabel and qualified spelling:
		assert_eq!(rejected("lbl: .x: 1 lbl.x: 2").kind, ParserErrorKind::DuplicateLabel);

		// Case matters:
		assembled("lbl: LBL: 0");
	}

	#[test]
	fn operator_misuse_is_rejected()
	{
		assert_eq!(rejected("+1").kind, ParserErrorKind::LeadingOperator);
		assert_eq!(rejected("+1").span, Some(0..1));
		assert_eq!(rejected("1 2++3").kind, ParserErrorKind::DoubleOperator);
		assert_eq!(rejected("1+").kind, ParserErrorKind::TrailingOperator);
		assert_eq!(rejected("1 + ").kind, ParserErrorKind::TrailingOperator);
		assert_eq!(rejected("0+lbl:0").kind, ParserErrorKind::OperatingOnDeclaration);
		assert_eq!(rejected("0 lbl:+0").kind, ParserErrorKind::OperatingOnDeclaration);

		// The operator span for the postfix case, the declaration span for the prefix case:
		assert_eq!(rejected("0 lbl:+0").span, Some(6..7));
		assert_eq!(rejected("0+lbl:0").span, Some(2..6));

		// The first operator already stepped back onto the only word, so the
		// second one has nothing to its left:
		assert_eq!(rejected("1++2").kind, ParserErrorKind::LeadingOperator);
	}

	#[test]
	fn unresolved_recalls_fail_in_the_second_pass()
	{
		let err = rejected("lbl");
		assert_eq!(err.kind, ParserErrorKind::UnknownLabel);
		assert_eq!(err.span, Some(0..3));

		assert_eq!(rejected(".x").kind, ParserErrorKind::UnknownLabel);
		assert_eq!(rejected("lbl: .").kind, ParserErrorKind::UnknownLabel);
	}

	#[test]
	fn assembling_twice_is_idempotent()
	{
		let source = "loop: len ? neg 0-2 text ?+1 text: 72 73 neg: 0-1 len: len-text";

		let (first_memory, first_labels) = assembled(source);
		let (second_memory, second_labels) = assembled(source);

		assert_eq!(image(&first_memory, 16), image(&second_memory, 16));
		assert_eq!(first_labels, second_labels);
	}
}

mod assembler;
mod error;
mod labels;
mod parser;

pub use assembler::assemble;
pub use error::{AssemblerError, ParserError, ParserErrorKind};
pub use labels::{Labels, NodeRef, UNRESOLVED};
pub use parser::{SpannedToken, Token, Tokenizer};

//! The closed error taxonomy threaded through every pipeline stage.
//!
//! Mirrors the split the teacher's `vasm` crate uses for its own
//! `Error`/`ParseError` pair (`vasm/src/error.rs`): a `Result<T>` alias
//! over a single enum, with `From` impls so `?` composes across stage
//! boundaries without manual wrapping at every call site.

use crate::Rule;
use std::fmt;
use std::io;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    /// Preprocessor/parser-level failure (§7: "bad input").
    BadInput(pest::error::Error<Rule>),
    /// Resource exhaustion while growing a buffer.
    BadAllocation(&'static str),
    /// An operand had a tag the encoder/expander does not accept here.
    BadOperandType { construct: String, detail: &'static str },
    /// Wrong number of operands for a mnemonic or directive.
    OperandCountMismatch { construct: String, expected: usize, got: usize },
    /// Mnemonic or directive name is not one this assembler implements.
    BadOpcode(String),
    /// Mnemonic is recognized but withdrawn in MIPS32r6 (MULT/MULTU).
    DeprecatedOpcode(String),
    /// A section name referenced internally does not exist.
    MissingSection(String),
    /// A symbol name referenced by an operand or relocation is undefined.
    MissingSymbol(String),
    /// Generic encoder failure that does not fit a more specific kind.
    CodegenFailure(String),
    /// I/O failure reading the input file or writing the output file.
    FileFailure { path: PathBuf, source: io::Error },
    /// Macro expansion aborted (operand shape or count).
    MacroExpansionFailure(String),
    /// The external preprocessor/parser collaborator failed.
    PreprocessingFailure(String),
    /// A section's entity list could not accept an encoded entity.
    SectionEntityFailure(String),
    /// The symbol table rejected an insertion.
    SymbolEntityFailure(String),
    /// `get_statement_size` could not compute a size for a statement.
    StatementSizeFailure(String),
    /// A caller-side precondition was violated.
    BadFunctionArgs(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BadInput(err) => write!(f, "parsing input failed: {}", err),
            Error::BadAllocation(what) => write!(f, "allocation failed: {}", what),
            Error::BadOperandType { construct, detail } => {
                write!(f, "bad operand type in {}: {}", construct, detail)
            }
            Error::OperandCountMismatch { construct, expected, got } => write!(
                f,
                "{} expects {} operand(s), got {}",
                construct, expected, got
            ),
            Error::BadOpcode(name) => write!(f, "unknown or unimplemented opcode `{}`", name),
            Error::DeprecatedOpcode(name) => {
                write!(f, "`{}` is deprecated in MIPS32r6", name)
            }
            Error::MissingSection(name) => write!(f, "no such section `{}`", name),
            Error::MissingSymbol(name) => write!(f, "undefined symbol `{}`", name),
            Error::CodegenFailure(detail) => write!(f, "code generation failed: {}", detail),
            Error::FileFailure { path, source } => {
                write!(f, "I/O failure on `{}`: {}", path.display(), source)
            }
            Error::MacroExpansionFailure(detail) => {
                write!(f, "macro expansion failed: {}", detail)
            }
            Error::PreprocessingFailure(detail) => write!(f, "preprocessing failed: {}", detail),
            Error::SectionEntityFailure(detail) => {
                write!(f, "could not append encoded entity: {}", detail)
            }
            Error::SymbolEntityFailure(detail) => {
                write!(f, "could not record symbol: {}", detail)
            }
            Error::StatementSizeFailure(detail) => {
                write!(f, "could not compute statement size: {}", detail)
            }
            Error::BadFunctionArgs(detail) => write!(f, "bad function arguments: {}", detail),
        }
    }
}

impl std::error::Error for Error {}

impl From<pest::error::Error<Rule>> for Error {
    fn from(err: pest::error::Error<Rule>) -> Error {
        Error::BadInput(err)
    }
}

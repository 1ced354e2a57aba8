//! The pest-based parser (§4.0), grounded in the teacher's own
//! `vasm::parser` (a `pest_derive`-generated `VASMParser` driven by a
//! `.pest` grammar file, exposed as `vasm::Error = pest::error::Error<Rule>`).
//! This grammar covers labels, directives, mnemonics, registers, the
//! four numeric-literal bases, string literals and `#`-comments, per
//! SPEC_FULL.md §4.0 / §6 "Input format".

use crate::error::{Error, Result};
use crate::opcode::{DirectiveKind, Opcode};
use crate::operand::{Operand, TaggedOperand};
use crate::register::Register;
use crate::statement::{Statement, StatementStream};
use crate::util::split_radix_prefix;
use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;

#[derive(Parser)]
#[grammar = "grammar.pest"]
pub struct AsmParser;

pub fn parse(input: &str) -> Result<StatementStream> {
    let mut pairs = AsmParser::parse(Rule::program, input)?;
    let program = pairs.next().expect("program rule always produces one pair");

    let mut stream = StatementStream::new();
    let mut line_no = 0u32;

    for pair in program.into_inner() {
        if pair.as_rule() != Rule::line {
            continue;
        }
        line_no += 1;
        stream.push(parse_line(pair, line_no)?);
    }

    Ok(stream)
}

fn parse_line(pair: Pair<Rule>, line_no: u32) -> Result<Statement> {
    let mut labels = Vec::new();
    let mut kind_stmt = Statement::empty(line_no);

    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::label => {
                let text = inner.as_str();
                labels.push(text[..text.len() - 1].to_owned());
            }
            Rule::body => {
                kind_stmt = parse_body(inner, line_no)?;
            }
            _ => {}
        }
    }

    kind_stmt.labels = labels;
    Ok(kind_stmt)
}

fn parse_body(pair: Pair<Rule>, line_no: u32) -> Result<Statement> {
    let inner = pair.into_inner().next().expect("body always wraps directive or instruction");
    match inner.as_rule() {
        Rule::directive => parse_directive(inner, line_no),
        Rule::instruction => parse_instruction(inner, line_no),
        other => unreachable!("unexpected body rule {:?}", other),
    }
}

fn parse_directive(pair: Pair<Rule>, line_no: u32) -> Result<Statement> {
    let mut parts = pair.into_inner();
    let name_pair = parts.next().expect("directive always has a name");
    let name = &name_pair.as_str()[1..];
    let directive: DirectiveKind = name.parse()?;

    let operands = parts.map(parse_operand).collect::<Result<Vec<_>>>()?;
    Ok(Statement::directive(line_no, directive, operands))
}

fn parse_instruction(pair: Pair<Rule>, line_no: u32) -> Result<Statement> {
    let mut parts = pair.into_inner();
    let mnemonic_pair = parts.next().expect("instruction always has a mnemonic");
    let opcode: Opcode = mnemonic_pair.as_str().parse()?;

    let operands = parts.map(parse_operand).collect::<Result<Vec<_>>>()?;
    Ok(Statement::instruction(line_no, opcode, operands))
}

fn parse_operand(pair: Pair<Rule>) -> Result<TaggedOperand> {
    let inner = pair.into_inner().next().expect("operand always wraps one alternative");
    match inner.as_rule() {
        Rule::memory => parse_memory(inner),
        Rule::register => Ok(TaggedOperand::plain(Operand::Register(parse_register(inner.as_str())?))),
        Rule::string_literal => Ok(TaggedOperand::plain(Operand::StringLiteral(parse_string(inner)))),
        Rule::numeric_literal => Ok(TaggedOperand::plain(Operand::NumericLiteral(parse_numeric(inner.as_str())?))),
        Rule::symbol => Ok(TaggedOperand::plain(Operand::Symbol(inner.as_str().to_owned()))),
        other => unreachable!("unexpected operand rule {:?}", other),
    }
}

fn parse_memory(pair: Pair<Rule>) -> Result<TaggedOperand> {
    let mut parts = pair.into_inner();
    let offset_pair = parts.next().expect("memory operand always has an offset");
    let base_pair = parts.next().expect("memory operand always has a base register");

    let offset = parse_numeric(offset_pair.as_str())? as i16;
    let base = parse_register(base_pair.as_str())?;
    Ok(TaggedOperand::memory(base, offset))
}

fn parse_register(text: &str) -> Result<Register> {
    Register::parse(&text[1..])
}

/// Parses a numeric literal in any of the four recognized bases,
/// signed or unsigned (§4.0), returning its two's-complement `u32` bit
/// pattern.
fn parse_numeric(text: &str) -> Result<u32> {
    let (text, negative) = match text.strip_prefix('-') {
        Some(rest) => (rest, true),
        None => (text, false),
    };
    let (body, radix) = split_radix_prefix(text);
    let magnitude = u32::from_str_radix(body, radix)
        .map_err(|_| Error::BadOperandType { construct: "numeric literal".to_owned(), detail: "out of range" })?;
    Ok(if negative { magnitude.wrapping_neg() } else { magnitude })
}

/// No escape processing beyond the literal bytes between the quotes
/// (§4.0 "Input format": that job belongs to the line preprocessor,
/// not this parser).
fn parse_string(pair: Pair<Rule>) -> Vec<u8> {
    pair.into_inner().next().map(|p| p.as_str().as_bytes().to_vec()).unwrap_or_default()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::statement::StatementKind;

    #[test]
    fn parses_labeled_instruction() {
        let stream = parse("loop: add $t0, $t0, $t1\n").unwrap();
        assert_eq!(stream.len(), 1);
        assert_eq!(stream[0].labels, vec!["loop".to_owned()]);
        match &stream[0].kind {
            StatementKind::Instruction(i) => assert_eq!(i.opcode, Opcode::Add),
            _ => panic!("expected instruction"),
        }
    }

    #[test]
    fn parses_directive_with_string_operand() {
        let stream = parse(".ascii \"hi\"\n").unwrap();
        match &stream[0].kind {
            StatementKind::Directive(d) => {
                assert_eq!(d.directive, DirectiveKind::Ascii);
                assert_eq!(d.operands[0].value, Operand::StringLiteral(b"hi".to_vec()));
            }
            _ => panic!("expected directive"),
        }
    }

    #[test]
    fn parses_memory_operand() {
        let stream = parse("lw $t0, 4($sp)\n").unwrap();
        match &stream[0].kind {
            StatementKind::Instruction(i) => {
                assert_eq!(i.operands[1].offset, Some(4));
                assert_eq!(i.operands[1].register(), Some(Register::parse("sp").unwrap()));
            }
            _ => panic!("expected instruction"),
        }
    }

    #[test]
    fn parses_hex_numeric_literal() {
        let stream = parse("addi $t0, $t0, 0x50\n").unwrap();
        match &stream[0].kind {
            StatementKind::Instruction(i) => {
                assert_eq!(i.operands[2].value, Operand::NumericLiteral(0x50));
            }
            _ => panic!("expected instruction"),
        }
    }

    #[test]
    fn comment_only_line_is_empty_statement() {
        let stream = parse("# just a comment\n").unwrap();
        assert!(matches!(stream[0].kind, StatementKind::Empty));
    }
}

//! The statement stream (§3). Re-architected from the original's
//! intrusive linked list into an owned `Vec<Statement>` (SPEC_FULL.md
//! §9): the macro expander (§4.1) consumes one `Vec` and produces a
//! fresh one rather than splicing pointers in place.

use crate::opcode::{DirectiveKind, Opcode};
use crate::operand::TaggedOperand;

#[derive(Clone, Debug)]
pub struct Instruction {
    pub opcode: Opcode,
    pub operands: Vec<TaggedOperand>,
}

#[derive(Clone, Debug)]
pub struct Directive {
    pub directive: DirectiveKind,
    pub operands: Vec<TaggedOperand>,
}

#[derive(Clone, Debug)]
pub enum StatementKind {
    Empty,
    Directive(Directive),
    Instruction(Instruction),
}

#[derive(Clone, Debug)]
pub struct Statement {
    pub labels: Vec<String>,
    pub kind: StatementKind,
    pub line: u32,
}

impl Statement {
    pub fn empty(line: u32) -> Statement {
        Statement { labels: Vec::new(), kind: StatementKind::Empty, line }
    }

    pub fn instruction(line: u32, opcode: Opcode, operands: Vec<TaggedOperand>) -> Statement {
        Statement {
            labels: Vec::new(),
            kind: StatementKind::Instruction(Instruction { opcode, operands }),
            line,
        }
    }

    pub fn directive(line: u32, directive: DirectiveKind, operands: Vec<TaggedOperand>) -> Statement {
        Statement {
            labels: Vec::new(),
            kind: StatementKind::Directive(Directive { directive, operands }),
            line,
        }
    }
}

pub type StatementStream = Vec<Statement>;

//! Macro/pseudo-instruction expansion (§4.1). Runs once over the parsed
//! statement stream before pass 1 ever sees it; produces a fresh stream
//! rather than mutating the input in place (SPEC_FULL.md §9).

use crate::error::{Error, Result};
use crate::opcode::Opcode;
use crate::operand::{Mask, Operand, TaggedOperand};
use crate::register::Register;
use crate::statement::{Statement, StatementKind, StatementStream};

/// Expands `LA`/`LI`/`MOVE` pseudo-instructions and appends a delay-slot
/// `NOP` after every branch/jump (§4.1). Labels attached to an expanded
/// statement stay attached to its first emitted replacement.
pub fn expand(stream: StatementStream) -> Result<StatementStream> {
    let mut out = StatementStream::new();

    for stmt in stream {
        let line = stmt.line;
        let labels = stmt.labels;

        match stmt.kind {
            StatementKind::Instruction(instr) => {
                let mut expanded = expand_instruction(line, instr.opcode, &instr.operands)?;
                if let Some(first) = expanded.first_mut() {
                    first.labels = labels;
                }
                let needs_nop = instr.opcode.has_delay_slot();
                out.append(&mut expanded);
                if needs_nop {
                    out.push(Statement::instruction(line, Opcode::Nop, Vec::new()));
                }
            }
            other => out.push(Statement { labels, kind: other, line }),
        }
    }

    Ok(out)
}

fn expand_instruction(
    line: u32,
    opcode: Opcode,
    operands: &[TaggedOperand],
) -> Result<Vec<Statement>> {
    match opcode {
        Opcode::La | Opcode::Li => expand_load(line, opcode, operands),
        Opcode::Move => expand_move(line, operands),
        _ => Ok(vec![Statement::instruction(line, opcode, operands.to_vec())]),
    }
}

fn operand_register(operands: &[TaggedOperand], index: usize, construct: &str) -> Result<Register> {
    operands.get(index).and_then(|op| op.register()).ok_or_else(|| Error::BadOperandType {
        construct: construct.to_owned(),
        detail: "expected a register operand",
    })
}

/// `la`/`li rd, sym-or-imm` (§4.1): a symbol operand always expands to
/// `LUI rd, sym[hi]` + `ORI rd, rd, sym[lo]`; a numeric literal above
/// `0xFFFF` expands the same way with the halves of the immediate
/// instead; a numeric literal at or below `0xFFFF` folds to a single
/// `ADDIU rd, $zero, imm`.
fn expand_load(line: u32, opcode: Opcode, operands: &[TaggedOperand]) -> Result<Vec<Statement>> {
    let construct = opcode.mnemonic();
    let rd = operand_register(operands, 0, construct)?;

    match operands.get(1).map(|op| &op.value) {
        Some(Operand::Symbol(name)) => {
            let name = name.clone();
            Ok(vec![
                Statement::instruction(
                    line,
                    Opcode::Lui,
                    vec![
                        TaggedOperand::plain(Operand::Register(rd)),
                        TaggedOperand::with_mask(Operand::Symbol(name.clone()), Mask::High),
                    ],
                ),
                Statement::instruction(
                    line,
                    Opcode::Ori,
                    vec![
                        TaggedOperand::plain(Operand::Register(rd)),
                        TaggedOperand::plain(Operand::Register(rd)),
                        TaggedOperand::with_mask(Operand::Symbol(name), Mask::Low),
                    ],
                ),
            ])
        }
        Some(Operand::NumericLiteral(v)) if *v > 0xFFFF => {
            let hi = (*v >> 16) & 0xFFFF;
            let lo = *v & 0xFFFF;
            Ok(vec![
                Statement::instruction(
                    line,
                    Opcode::Lui,
                    vec![TaggedOperand::plain(Operand::Register(rd)), TaggedOperand::plain(Operand::NumericLiteral(hi))],
                ),
                Statement::instruction(
                    line,
                    Opcode::Ori,
                    vec![
                        TaggedOperand::plain(Operand::Register(rd)),
                        TaggedOperand::plain(Operand::Register(rd)),
                        TaggedOperand::plain(Operand::NumericLiteral(lo)),
                    ],
                ),
            ])
        }
        Some(Operand::NumericLiteral(v)) => Ok(vec![Statement::instruction(
            line,
            Opcode::Addiu,
            vec![
                TaggedOperand::plain(Operand::Register(rd)),
                TaggedOperand::plain(Operand::Register(Register::ZERO)),
                TaggedOperand::plain(Operand::NumericLiteral(*v)),
            ],
        )]),
        _ => Err(Error::BadOperandType { construct: construct.to_owned(), detail: "expected a symbol or numeric literal" }),
    }
}

/// `move rd, rs` -> `addu rd, rs, $zero` (§4.1).
fn expand_move(line: u32, operands: &[TaggedOperand]) -> Result<Vec<Statement>> {
    let rd = operand_register(operands, 0, "move")?;
    let rs = operand_register(operands, 1, "move")?;

    Ok(vec![Statement::instruction(
        line,
        Opcode::Addu,
        vec![
            TaggedOperand::plain(Operand::Register(rd)),
            TaggedOperand::plain(Operand::Register(rs)),
            TaggedOperand::plain(Operand::Register(Register::ZERO)),
        ],
    )])
}

#[cfg(test)]
mod test {
    use super::*;

    fn reg(n: u8) -> TaggedOperand {
        TaggedOperand::plain(Operand::Register(Register(n)))
    }

    fn imm(v: u32) -> TaggedOperand {
        TaggedOperand::plain(Operand::NumericLiteral(v))
    }

    #[test]
    fn li_small_immediate_folds_to_single_addiu() {
        let stream = vec![Statement::instruction(1, Opcode::Li, vec![reg(8), imm(5)])];
        let out = expand(stream).unwrap();
        assert_eq!(out.len(), 1);
        match &out[0].kind {
            StatementKind::Instruction(i) => assert_eq!(i.opcode, Opcode::Addiu),
            _ => panic!("expected instruction"),
        }
    }

    #[test]
    fn li_large_immediate_expands_to_lui_ori() {
        let stream = vec![Statement::instruction(1, Opcode::Li, vec![reg(8), imm(0x0001_0001)])];
        let out = expand(stream).unwrap();
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn la_with_symbol_expands_to_lui_ori_with_masks() {
        let stream =
            vec![Statement::instruction(1, Opcode::La, vec![reg(8), TaggedOperand::plain(Operand::Symbol("data".to_owned()))])];
        let out = expand(stream).unwrap();
        assert_eq!(out.len(), 2);
        match (&out[0].kind, &out[1].kind) {
            (StatementKind::Instruction(lui), StatementKind::Instruction(ori)) => {
                assert_eq!(lui.opcode, Opcode::Lui);
                assert_eq!(lui.operands[1].flags.mask, Mask::High);
                assert_eq!(ori.opcode, Opcode::Ori);
                assert_eq!(ori.operands[2].flags.mask, Mask::Low);
            }
            _ => panic!("expected two instructions"),
        }
    }

    #[test]
    fn branch_gets_delay_slot_nop() {
        let stream = vec![Statement::instruction(
            1,
            Opcode::Beq,
            vec![reg(1), reg(2), TaggedOperand::plain(Operand::Symbol("l".to_owned()))],
        )];
        let out = expand(stream).unwrap();
        assert_eq!(out.len(), 2);
        match &out[1].kind {
            StatementKind::Instruction(i) => assert_eq!(i.opcode, Opcode::Nop),
            _ => panic!("expected nop"),
        }
    }

    #[test]
    fn move_expands_to_addu_with_zero() {
        let stream = vec![Statement::instruction(1, Opcode::Move, vec![reg(8), reg(9)])];
        let out = expand(stream).unwrap();
        assert_eq!(out.len(), 1);
        match &out[0].kind {
            StatementKind::Instruction(i) => {
                assert_eq!(i.opcode, Opcode::Addu);
                assert_eq!(i.operands[2].register(), Some(Register::ZERO));
            }
            _ => panic!("expected instruction"),
        }
    }
}

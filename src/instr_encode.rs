//! Instruction encoding (§4.4): one function per MIPS instruction form
//! (R, I, J, and base+offset memory), plus the §6 opcode dispatch table
//! that picks the right form, validates operand count/shape, and emits
//! `R_MIPS_*` relocation requests for symbol operands.

use crate::error::{Error, Result};
use crate::opcode::Opcode;
use crate::operand::{Mask, Operand, TaggedOperand};
use crate::section::RelocationRequest;

pub const R_MIPS_32: u32 = 2;
pub const R_MIPS_26: u32 = 4;
pub const R_MIPS_HI16: u32 = 5;
pub const R_MIPS_LO16: u32 = 6;
pub const R_MIPS_PC16: u32 = 10;

pub struct Encoded {
    pub word: u32,
    pub relocation: Option<RelocationRequest>,
}

fn reg(operands: &[TaggedOperand], idx: usize, construct: &str) -> Result<u32> {
    operands
        .get(idx)
        .and_then(|op| op.register())
        .map(|r| r.index())
        .ok_or_else(|| Error::BadOperandType {
            construct: construct.to_owned(),
            detail: "expected a register operand",
        })
}

fn imm16(operands: &[TaggedOperand], idx: usize, construct: &str) -> Result<(u32, Option<RelocationRequest>)> {
    match operands.get(idx).map(|op| &op.value) {
        Some(Operand::NumericLiteral(v)) => Ok((*v & 0xFFFF, None)),
        Some(Operand::Symbol(name)) => {
            let mask = operands[idx].flags.mask;
            let rel_type = match mask {
                Mask::High => R_MIPS_HI16,
                Mask::Low => R_MIPS_LO16,
                Mask::None => R_MIPS_PC16,
            };
            Ok((0, Some(RelocationRequest { symbol_name: name.clone(), offset: 0, rel_type })))
        }
        _ => Err(Error::BadOperandType { construct: construct.to_owned(), detail: "expected an immediate or symbol" }),
    }
}

fn check_count(construct: &str, operands: &[TaggedOperand], expected: usize) -> Result<()> {
    if operands.len() != expected {
        return Err(Error::OperandCountMismatch {
            construct: construct.to_owned(),
            expected,
            got: operands.len(),
        });
    }
    Ok(())
}

const FUNCT_ADD: u32 = 0x20;
const FUNCT_ADDU: u32 = 0x21;
const FUNCT_SUB: u32 = 0x22;
const FUNCT_SUBU: u32 = 0x23;
const FUNCT_AND: u32 = 0x24;
const FUNCT_OR: u32 = 0x25;
const FUNCT_SLL: u32 = 0x00;
const FUNCT_JR: u32 = 0x08;
const FUNCT_JALR: u32 = 0x09;
const FUNCT_SYSCALL: u32 = 0x0C;

/// R-type: `rd, rs, rt` (three-register ALU ops).
fn form_r3(opcode_field: u32, funct: u32, operands: &[TaggedOperand], construct: &str) -> Result<Encoded> {
    check_count(construct, operands, 3)?;
    let rd = reg(operands, 0, construct)?;
    let rs = reg(operands, 1, construct)?;
    let rt = reg(operands, 2, construct)?;
    let word = (opcode_field << 26) | (rs << 21) | (rt << 16) | (rd << 11) | funct;
    Ok(Encoded { word, relocation: None })
}

/// R-type shift: `rd, rt, shamt`.
fn form_shift(funct: u32, operands: &[TaggedOperand], construct: &str) -> Result<Encoded> {
    check_count(construct, operands, 3)?;
    let rd = reg(operands, 0, construct)?;
    let rt = reg(operands, 1, construct)?;
    let shamt = match operands.get(2).map(|op| &op.value) {
        Some(Operand::NumericLiteral(v)) => *v & 0x1F,
        _ => return Err(Error::BadOperandType { construct: construct.to_owned(), detail: "expected a shift amount" }),
    };
    let word = (rt << 16) | (rd << 11) | (shamt << 6) | funct;
    Ok(Encoded { word, relocation: None })
}

/// R-type: `rs` only (`jr`).
fn form_jr(operands: &[TaggedOperand], construct: &str) -> Result<Encoded> {
    check_count(construct, operands, 1)?;
    let rs = reg(operands, 0, construct)?;
    Ok(Encoded { word: (rs << 21) | FUNCT_JR, relocation: None })
}

/// R-type: `rd, rs` (`jalr`).
fn form_jalr(operands: &[TaggedOperand], construct: &str) -> Result<Encoded> {
    check_count(construct, operands, 2)?;
    let rd = reg(operands, 0, construct)?;
    let rs = reg(operands, 1, construct)?;
    Ok(Encoded { word: (rs << 21) | (rd << 11) | FUNCT_JALR, relocation: None })
}

/// MIPS32r6 `mul`/`muh`/`mulu`/`muhu`: `rd, rs, rt` with a SPECIAL2-style
/// opcode/funct pairing distinct from pre-r6 `mult`/`multu`.
fn form_mulr6(op: u32, funct: u32, operands: &[TaggedOperand], construct: &str) -> Result<Encoded> {
    check_count(construct, operands, 3)?;
    let rd = reg(operands, 0, construct)?;
    let rs = reg(operands, 1, construct)?;
    let rt = reg(operands, 2, construct)?;
    let word = (rs << 21) | (rt << 16) | (rd << 11) | (op << 6) | funct;
    Ok(Encoded { word, relocation: None })
}

/// I-type ALU: `rt, rs, imm` (MIPS reference operand order, §9).
fn form_i_alu(opcode_field: u32, operands: &[TaggedOperand], construct: &str) -> Result<Encoded> {
    check_count(construct, operands, 3)?;
    let rt = reg(operands, 0, construct)?;
    let rs = reg(operands, 1, construct)?;
    let (imm, relocation) = imm16(operands, 2, construct)?;
    let word = (opcode_field << 26) | (rs << 21) | (rt << 16) | imm;
    Ok(Encoded { word, relocation })
}

/// I-type branch, two-register form: `rs, rt, target`.
fn form_branch2(opcode_field: u32, operands: &[TaggedOperand], construct: &str) -> Result<Encoded> {
    check_count(construct, operands, 3)?;
    let rs = reg(operands, 0, construct)?;
    let rt = reg(operands, 1, construct)?;
    let (imm, relocation) = imm16(operands, 2, construct)?;
    let word = (opcode_field << 26) | (rs << 21) | (rt << 16) | imm;
    Ok(Encoded { word, relocation })
}

/// I-type branch, one-register form: `rs, target` (`bgez`, `blez`).
fn form_branch1(opcode_field: u32, rt_field: u32, operands: &[TaggedOperand], construct: &str) -> Result<Encoded> {
    check_count(construct, operands, 2)?;
    let rs = reg(operands, 0, construct)?;
    let (imm, relocation) = imm16(operands, 1, construct)?;
    let word = (opcode_field << 26) | (rs << 21) | (rt_field << 16) | imm;
    Ok(Encoded { word, relocation })
}

/// `bal` uses operand[0] as the sole branch target (§9): no register
/// operand, just the link-and-branch displacement.
fn form_bal(operands: &[TaggedOperand], construct: &str) -> Result<Encoded> {
    check_count(construct, operands, 1)?;
    let (imm, relocation) = imm16(operands, 0, construct)?;
    // REGIMM opcode 1, rt field 0x11 selects BAL.
    let word = (1u32 << 26) | (0x11u32 << 16) | imm;
    Ok(Encoded { word, relocation })
}

/// `lui rt, imm`.
fn form_lui(operands: &[TaggedOperand], construct: &str) -> Result<Encoded> {
    check_count(construct, operands, 2)?;
    let rt = reg(operands, 0, construct)?;
    let (imm, relocation) = imm16(operands, 1, construct)?;
    let word = (0x0Fu32 << 26) | (rt << 16) | imm;
    Ok(Encoded { word, relocation })
}

/// Memory form: `rt, offset(base)`.
fn form_mem(opcode_field: u32, operands: &[TaggedOperand], construct: &str) -> Result<Encoded> {
    check_count(construct, operands, 2)?;
    let rt = reg(operands, 0, construct)?;
    let base_op = operands
        .get(1)
        .ok_or_else(|| Error::BadOperandType { construct: construct.to_owned(), detail: "expected base(offset)" })?;
    let base = base_op
        .register()
        .ok_or_else(|| Error::BadOperandType { construct: construct.to_owned(), detail: "expected a base register" })?;
    let offset = base_op.offset.unwrap_or(0) as u32 & 0xFFFF;
    let word = (opcode_field << 26) | (base.index() << 21) | (rt << 16) | offset;
    Ok(Encoded { word, relocation: None })
}

/// J-type: `target` (`j`, `jal`).
fn form_j(opcode_field: u32, operands: &[TaggedOperand], construct: &str) -> Result<Encoded> {
    check_count(construct, operands, 1)?;
    let relocation = match operands.get(0).map(|op| &op.value) {
        Some(Operand::Symbol(name)) => {
            RelocationRequest { symbol_name: name.clone(), offset: 0, rel_type: R_MIPS_26 }
        }
        _ => return Err(Error::BadOperandType { construct: construct.to_owned(), detail: "expected a symbol target" }),
    };
    Ok(Encoded { word: opcode_field << 26, relocation: Some(relocation) })
}

/// Encodes one instruction (§4.4 / §6). Returns the 32-bit word and, if
/// any operand referenced a symbol, the relocation request pass 2
/// attaches to this word's address.
pub fn encode_instruction(opcode: Opcode, operands: &[TaggedOperand]) -> Result<Encoded> {
    let c = opcode.mnemonic();
    match opcode {
        Opcode::Add => form_r3(0, FUNCT_ADD, operands, c),
        Opcode::Addu => form_r3(0, FUNCT_ADDU, operands, c),
        Opcode::Sub => form_r3(0, FUNCT_SUB, operands, c),
        Opcode::Subu => form_r3(0, FUNCT_SUBU, operands, c),
        Opcode::And => form_r3(0, FUNCT_AND, operands, c),
        Opcode::Or => form_r3(0, FUNCT_OR, operands, c),
        Opcode::Mul => form_mulr6(0x18, 0x02, operands, c),
        Opcode::Muh => form_mulr6(0x18, 0x03, operands, c),
        Opcode::Mulu => form_mulr6(0x19, 0x02, operands, c),
        Opcode::Muhu => form_mulr6(0x19, 0x03, operands, c),
        Opcode::Sll => form_shift(FUNCT_SLL, operands, c),
        Opcode::Nop => {
            check_count(c, operands, 0)?;
            Ok(Encoded { word: 0, relocation: None })
        }
        Opcode::Jr => form_jr(operands, c),
        Opcode::Jalr => form_jalr(operands, c),
        Opcode::Syscall => {
            check_count(c, operands, 0)?;
            Ok(Encoded { word: FUNCT_SYSCALL, relocation: None })
        }
        Opcode::Addi => form_i_alu(0x08, operands, c),
        Opcode::Addiu => form_i_alu(0x09, operands, c),
        Opcode::Andi => form_i_alu(0x0C, operands, c),
        Opcode::Ori => form_i_alu(0x0D, operands, c),
        Opcode::Beq => form_branch2(0x04, operands, c),
        Opcode::Bne => form_branch2(0x05, operands, c),
        Opcode::Bgez => form_branch1(0x01, 0x01, operands, c),
        Opcode::Bal => form_bal(operands, c),
        Opcode::Lui => form_lui(operands, c),
        Opcode::Lb => form_mem(0x20, operands, c),
        Opcode::Lbu => form_mem(0x24, operands, c),
        Opcode::Lw => form_mem(0x23, operands, c),
        Opcode::Sb => form_mem(0x28, operands, c),
        Opcode::Sh => form_mem(0x29, operands, c),
        Opcode::Sw => form_mem(0x2B, operands, c),
        Opcode::J => form_j(0x02, operands, c),
        Opcode::Jal => form_j(0x03, operands, c),
        Opcode::Mult => Err(Error::DeprecatedOpcode(c.to_owned())),
        Opcode::Multu => Err(Error::DeprecatedOpcode(c.to_owned())),
        Opcode::La | Opcode::Li | Opcode::Move => {
            Err(Error::CodegenFailure(format!("`{}` must be expanded before pass 2", c)))
        }
        Opcode::Beqz | Opcode::Blez => Err(Error::BadOpcode(c.to_owned())),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::register::Register;

    fn reg_operand(n: u8) -> TaggedOperand {
        TaggedOperand::plain(Operand::Register(Register(n)))
    }

    fn imm_operand(v: u32) -> TaggedOperand {
        TaggedOperand::plain(Operand::NumericLiteral(v))
    }

    #[test]
    fn add_encodes_as_r_type_special() {
        let ops = vec![reg_operand(1), reg_operand(2), reg_operand(3)];
        let enc = encode_instruction(Opcode::Add, &ops).unwrap();
        assert_eq!(enc.word >> 26, 0);
        assert_eq!(enc.word & 0x3F, FUNCT_ADD);
        assert_eq!((enc.word >> 11) & 0x1F, 1);
    }

    #[test]
    fn addiu_uses_rt_rs_imm_order() {
        let ops = vec![reg_operand(8), reg_operand(9), imm_operand(4)];
        let enc = encode_instruction(Opcode::Addiu, &ops).unwrap();
        assert_eq!(enc.word >> 26, 0x09);
        assert_eq!((enc.word >> 16) & 0x1F, 8);
        assert_eq!((enc.word >> 21) & 0x1F, 9);
        assert_eq!(enc.word & 0xFFFF, 4);
    }

    #[test]
    fn j_target_symbol_produces_relocation() {
        let ops = vec![TaggedOperand::plain(Operand::Symbol("main".to_owned()))];
        let enc = encode_instruction(Opcode::J, &ops).unwrap();
        let rel = enc.relocation.unwrap();
        assert_eq!(rel.symbol_name, "main");
        assert_eq!(rel.rel_type, R_MIPS_26);
    }

    #[test]
    fn mult_is_rejected_as_deprecated() {
        let ops = vec![reg_operand(1), reg_operand(2)];
        assert!(matches!(encode_instruction(Opcode::Mult, &ops), Err(Error::DeprecatedOpcode(_))));
    }

    #[test]
    fn beqz_survives_to_encode_is_rejected() {
        let ops = vec![reg_operand(1), TaggedOperand::plain(Operand::Symbol("l".to_owned()))];
        assert!(matches!(encode_instruction(Opcode::Beqz, &ops), Err(Error::BadOpcode(_))));
    }
}

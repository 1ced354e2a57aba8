//! Directive encoding (§4.5). `.ascii`/`.asciz`/`.string`/`.word`/
//! `.space` emit real bytes into the current section; the remaining
//! directives named in §4.2's size table have no §6 byte-emission rule
//! and fail pass 2 if reached, per SPEC_FULL.md §9 (the asymmetry is
//! intentional, not a bug to paper over).

use crate::error::{Error, Result};
use crate::opcode::DirectiveKind;
use crate::operand::{Operand, TaggedOperand};
use crate::section::RelocationRequest;
use crate::util::Endian;
use byteorder::ByteOrder;

pub struct EncodedDirective {
    pub bytes: Vec<u8>,
    pub relocations: Vec<RelocationRequest>,
}

pub fn encode_directive(directive: DirectiveKind, operands: &[TaggedOperand]) -> Result<EncodedDirective> {
    match directive {
        DirectiveKind::Word => encode_word(operands),
        DirectiveKind::Ascii => encode_string(operands, false),
        DirectiveKind::Asciz | DirectiveKind::String => encode_string(operands, true),
        DirectiveKind::Space | DirectiveKind::Skip => encode_space(operands),
        other => Err(Error::CodegenFailure(format!(
            "`.{}` has no byte encoding in pass 2",
            format!("{:?}", other).to_ascii_lowercase()
        ))),
    }
}

fn encode_word(operands: &[TaggedOperand]) -> Result<EncodedDirective> {
    let mut bytes = vec![0u8; 4 * operands.len()];
    let mut relocations = Vec::new();

    for (i, op) in operands.iter().enumerate() {
        let offset = i * 4;
        match &op.value {
            Operand::NumericLiteral(v) => Endian::write_u32(&mut bytes[offset..offset + 4], *v),
            Operand::Symbol(name) => {
                relocations.push(RelocationRequest {
                    symbol_name: name.clone(),
                    offset: offset as u32,
                    rel_type: crate::instr_encode::R_MIPS_32,
                });
            }
            _ => {
                return Err(Error::BadOperandType {
                    construct: ".word".to_owned(),
                    detail: "expected a numeric literal or symbol",
                })
            }
        }
    }

    Ok(EncodedDirective { bytes, relocations })
}

fn encode_string(operands: &[TaggedOperand], terminate: bool) -> Result<EncodedDirective> {
    let mut bytes = Vec::new();
    for op in operands {
        match &op.value {
            Operand::StringLiteral(s) => {
                bytes.extend_from_slice(s);
                if terminate {
                    bytes.push(0);
                }
            }
            _ => {
                return Err(Error::BadOperandType {
                    construct: ".ascii".to_owned(),
                    detail: "expected a string literal",
                })
            }
        }
    }
    Ok(EncodedDirective { bytes, relocations: Vec::new() })
}

fn encode_space(operands: &[TaggedOperand]) -> Result<EncodedDirective> {
    let n = match operands.first().map(|op| &op.value) {
        Some(Operand::NumericLiteral(v)) => *v,
        _ => {
            return Err(Error::BadOperandType {
                construct: ".space".to_owned(),
                detail: "expected a numeric literal",
            })
        }
    };
    Ok(EncodedDirective { bytes: vec![0u8; n as usize], relocations: Vec::new() })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn word_with_literal_emits_four_bytes() {
        let ops = vec![TaggedOperand::plain(Operand::NumericLiteral(0x01020304))];
        let enc = encode_directive(DirectiveKind::Word, &ops).unwrap();
        assert_eq!(enc.bytes, vec![0x04, 0x03, 0x02, 0x01]);
        assert!(enc.relocations.is_empty());
    }

    #[test]
    fn word_with_symbol_emits_zero_bytes_and_relocation() {
        let ops = vec![TaggedOperand::plain(Operand::Symbol("data_start".to_owned()))];
        let enc = encode_directive(DirectiveKind::Word, &ops).unwrap();
        assert_eq!(enc.bytes, vec![0, 0, 0, 0]);
        assert_eq!(enc.relocations[0].symbol_name, "data_start");
    }

    #[test]
    fn asciz_appends_nul_terminator() {
        let ops = vec![TaggedOperand::plain(Operand::StringLiteral(b"hi".to_vec()))];
        let enc = encode_directive(DirectiveKind::Asciz, &ops).unwrap();
        assert_eq!(enc.bytes, b"hi\0");
    }

    #[test]
    fn ascii_has_no_terminator() {
        let ops = vec![TaggedOperand::plain(Operand::StringLiteral(b"hi".to_vec()))];
        let enc = encode_directive(DirectiveKind::Ascii, &ops).unwrap();
        assert_eq!(enc.bytes, b"hi");
    }

    #[test]
    fn byte_directive_has_no_byte_encoding() {
        assert!(encode_directive(DirectiveKind::Byte, &[]).is_err());
    }
}

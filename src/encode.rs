//! Pass 2 (§4.3): re-walks the expanded statement stream, this time
//! emitting bytes. Each section's `pc` is reset to zero and re-driven by
//! the bytes actually appended here — which can diverge from pass 1's
//! layout size for directives whose size table entry (§4.2) has no
//! matching byte encoding (§4.5), per SPEC_FULL.md §9.

use crate::dir_encode::encode_directive;
use crate::error::{Error, Result};
use crate::instr_encode::encode_instruction;
use crate::section::{self, EncodedEntity, RelocationRequest, Section};
use crate::statement::{StatementKind, StatementStream};
use crate::util::Endian;
use byteorder::ByteOrder;

/// Resets every section's pc/entities and re-walks `stream`, appending
/// encoded bytes. Section selection follows the same directives pass 1
/// used, so a correctly laid-out stream produces identical section
/// switches here.
pub fn encode(stream: &StatementStream, sections: &mut [Section]) -> Result<()> {
    for section in sections.iter_mut() {
        section.reset_pc();
    }

    let mut current = section::TEXT;

    for stmt in stream {
        match &stmt.kind {
            StatementKind::Empty => {}
            StatementKind::Directive(d) => {
                if let Some(name) = d.directive.selects_section() {
                    current = section::index_of(sections, name)
                        .ok_or_else(|| Error::MissingSection(name.to_owned()))?;
                    continue;
                }
                let encoded = encode_directive(d.directive, &d.operands)?;
                let address = sections[current].pc;
                let relocations = encoded
                    .relocations
                    .into_iter()
                    .map(|r| RelocationRequest { offset: address + r.offset, ..r })
                    .collect();
                sections[current].push_entity(EncodedEntity { address, bytes: encoded.bytes, relocations });
            }
            StatementKind::Instruction(instr) => {
                let encoded = encode_instruction(instr.opcode, &instr.operands)?;
                let address = sections[current].pc;
                let mut bytes = vec![0u8; 4];
                Endian::write_u32(&mut bytes, encoded.word);
                let relocations = encoded
                    .relocation
                    .into_iter()
                    .map(|r| RelocationRequest { offset: address, ..r })
                    .collect();
                sections[current].push_entity(EncodedEntity { address, bytes, relocations });
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::opcode::Opcode;
    use crate::statement::Statement;

    #[test]
    fn nop_emits_four_zero_bytes() {
        let stream = vec![Statement::instruction(1, Opcode::Nop, Vec::new())];
        let mut sections = section::initial_sections();
        encode(&stream, &mut sections).unwrap();
        assert_eq!(sections[section::TEXT].entities[0].bytes, vec![0, 0, 0, 0]);
        assert_eq!(sections[section::TEXT].pc, 4);
    }
}

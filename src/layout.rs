//! Pass 1 (§4.2): walks the expanded statement stream once, assigning
//! every label a `(section, offset)` pair and recording each
//! statement's encoded size without emitting any bytes yet.

use crate::error::{Error, Result};
use crate::opcode::DirectiveKind;
use crate::operand::Operand;
use crate::section::{self, Section};
use crate::statement::{StatementKind, StatementStream};
use crate::symtab::SymbolTable;

/// A statement's size as computed during pass 1, keyed by its position
/// in the stream so pass 2 (§4.3) can look it up while re-walking.
pub type SizeTable = Vec<u32>;

/// Runs pass 1 over `stream`, populating `sections`' running `pc` (used
/// here purely as a layout counter; pass 2 resets and re-walks it) and
/// `symbols` with every label's final address. Returns the per-statement
/// size table pass 2 re-derives encoding from.
pub fn layout(stream: &StatementStream, sections: &mut [Section], symbols: &mut SymbolTable) -> Result<SizeTable> {
    let mut current = section::TEXT;
    let mut sizes = SizeTable::with_capacity(stream.len());

    for stmt in stream {
        match &stmt.kind {
            StatementKind::Empty => {
                record_labels(&stmt.labels, current, sections, symbols)?;
                sizes.push(0);
            }
            StatementKind::Directive(d) => {
                if let Some(name) = d.directive.selects_section() {
                    current = section::index_of(sections, name)
                        .ok_or_else(|| Error::MissingSection(name.to_owned()))?;
                    record_labels(&stmt.labels, current, sections, symbols)?;
                    sizes.push(0);
                    continue;
                }
                record_labels(&stmt.labels, current, sections, symbols)?;
                let size = directive_size(d.directive, &d.operands)?;
                sizes.push(size);
                sections[current].pc += size;
            }
            StatementKind::Instruction(_) => {
                record_labels(&stmt.labels, current, sections, symbols)?;
                sizes.push(4);
                sections[current].pc += 4;
            }
        }
    }

    Ok(sizes)
}

fn record_labels(
    labels: &[String],
    current: usize,
    sections: &[Section],
    symbols: &mut SymbolTable,
) -> Result<()> {
    for label in labels {
        symbols.push(label.clone(), current, sections[current].pc);
    }
    Ok(())
}

/// Computes a directive's encoded size without emitting bytes (§4.2
/// step 3). `.byte`/`.short`/`.long`/`.fill`/`.size` are not in the §6
/// directive table pass 2 actually encodes, so their layout size is a
/// literal per-SPEC_FULL.md-§9 stub: counted here, rejected in pass 2.
fn directive_size(directive: DirectiveKind, operands: &[crate::operand::TaggedOperand]) -> Result<u32> {
    Ok(match directive {
        DirectiveKind::Word => 4 * operands.len() as u32,
        DirectiveKind::Ascii | DirectiveKind::Asciz | DirectiveKind::String => {
            let mut total = 0u32;
            for op in operands {
                match &op.value {
                    Operand::StringLiteral(bytes) => {
                        total += bytes.len() as u32;
                        if directive != DirectiveKind::Ascii {
                            total += 1;
                        }
                    }
                    _ => {
                        return Err(Error::BadOperandType {
                            construct: directive_name(directive),
                            detail: "expected a string literal",
                        })
                    }
                }
            }
            total
        }
        DirectiveKind::Space | DirectiveKind::Skip => match operands.first().map(|op| &op.value) {
            Some(Operand::NumericLiteral(n)) => *n,
            _ => {
                return Err(Error::BadOperandType {
                    construct: directive_name(directive),
                    detail: "expected a numeric literal",
                })
            }
        },
        DirectiveKind::Byte => operands.len() as u32,
        DirectiveKind::Short => 2 * operands.len() as u32,
        DirectiveKind::Long => 4 * operands.len() as u32,
        DirectiveKind::Fill => match operands.first().map(|op| &op.value) {
            Some(Operand::NumericLiteral(n)) => *n,
            _ => 0,
        },
        DirectiveKind::Align | DirectiveKind::Size | DirectiveKind::Global => 0,
        DirectiveKind::Text | DirectiveKind::Data | DirectiveKind::Bss => 0,
    })
}

fn directive_name(directive: DirectiveKind) -> String {
    format!(".{}", format!("{:?}", directive).to_ascii_lowercase())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::opcode::Opcode;
    use crate::statement::Statement;

    #[test]
    fn instruction_advances_text_pc_by_four() {
        let stream = vec![
            Statement::instruction(1, Opcode::Nop, Vec::new()),
            Statement::instruction(2, Opcode::Nop, Vec::new()),
        ];
        let mut sections = section::initial_sections();
        let mut symbols = SymbolTable::new();
        let sizes = layout(&stream, &mut sections, &mut symbols).unwrap();
        assert_eq!(sizes, vec![4, 4]);
        assert_eq!(sections[section::TEXT].pc, 8);
    }

    #[test]
    fn label_records_current_section_and_offset() {
        let mut stmt = Statement::instruction(1, Opcode::Nop, Vec::new());
        stmt.labels.push("start".to_owned());
        let stream = vec![stmt];
        let mut sections = section::initial_sections();
        let mut symbols = SymbolTable::new();
        layout(&stream, &mut sections, &mut symbols).unwrap();
        let idx = symbols.index_of("start").unwrap();
        let sym = symbols.get(idx).unwrap();
        assert_eq!(sym.section, Some(section::TEXT));
        assert_eq!(sym.offset, 0);
    }
}

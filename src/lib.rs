//! Two-pass MIPS32r6 assembler producing relocatable ELF32 object files.
//!
//! The pipeline mirrors the teacher's own `vasm::assemble`/`vasm::assemble_addressed`
//! entry points: parse the whole input into a statement stream, expand
//! pseudo-instructions, run pass 1 to lay out sections and populate the
//! symbol table, run pass 2 to emit bytes and relocation requests,
//! resolve those requests against the symbol table, then serialize
//! everything to an ELF32 buffer.

pub mod dir_encode;
pub mod elf;
pub mod encode;
pub mod error;
pub mod instr_encode;
pub mod layout;
pub mod macro_expand;
pub mod opcode;
pub mod operand;
mod parser;
pub mod register;
pub mod reloc;
pub mod section;
pub mod statement;
pub mod symtab;
pub mod util;

pub use error::{Error, Result};
pub use parser::Rule;

/// Assembles `input` (a complete assembly source file) into a
/// relocatable ELF32 object file's bytes.
pub fn assemble(input: &str) -> Result<Vec<u8>> {
    log::debug!("parsing {} byte(s) of input", input.len());
    let parsed = parser::parse(input)?;

    log::debug!("expanding pseudo-instructions");
    let expanded = macro_expand::expand(parsed)?;

    let mut sections = section::initial_sections();
    let mut symbols = symtab::SymbolTable::new();

    log::debug!("pass 1: layout");
    layout::layout(&expanded, &mut sections, &mut symbols)?;

    log::debug!("pass 2: encoding");
    encode::encode(&expanded, &mut sections)?;

    let text_requests = collect_requests(&sections[section::TEXT]);
    let data_requests = collect_requests(&sections[section::DATA]);

    log::debug!("populating relocations");
    let text_rels = reloc::populate(&text_requests, &symbols)?;
    let data_rels = reloc::populate(&data_requests, &symbols)?;

    log::debug!("serializing ELF32 object");
    Ok(elf::write_object(&sections, &symbols, &text_rels, &data_rels))
}

fn collect_requests(section: &section::Section) -> Vec<section::RelocationRequest> {
    let mut requests = Vec::new();
    for entity in &section.entities {
        for rel in &entity.relocations {
            requests.push(rel.clone());
        }
    }
    requests
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn assembles_a_minimal_program() {
        let out = assemble("start:\n  add $t0, $t0, $t1\n  j start\n").unwrap();
        assert_eq!(&out[0..4], &[0x7F, b'E', b'L', b'F']);
    }

    #[test]
    fn unknown_mnemonic_fails() {
        assert!(assemble("bogus $t0, $t0, $t1\n").is_err());
    }

    #[test]
    fn undefined_symbol_fails_relocation() {
        assert!(matches!(assemble("j nowhere\n"), Err(Error::MissingSymbol(_))));
    }
}

//! Relocation population (§4.6): turns the `RelocationRequest`s collected
//! during pass 2 into `Elf32_Rel` records, resolving each request's
//! symbol name to its symbol-table index.

use crate::error::{Error, Result};
use crate::section::RelocationRequest;
use crate::symtab::SymbolTable;

/// An `Elf32_Rel` entry (§4.7): `r_offset` (4 bytes) + `r_info` (4 bytes,
/// packing the symbol index and relocation type), no addend field.
#[derive(Clone, Copy, Debug)]
pub struct Elf32Rel {
    pub r_offset: u32,
    pub r_info: u32,
}

impl Elf32Rel {
    pub fn new(r_offset: u32, sym_index: u32, rel_type: u32) -> Elf32Rel {
        Elf32Rel { r_offset, r_info: (sym_index << 8) | (rel_type & 0xFF) }
    }
}

/// Resolves one section's queued `RelocationRequest`s (each already
/// carrying its final section-relative offset) against `symbols`,
/// producing the `Elf32_Rel` records for its `.rel.<name>` companion.
pub fn populate(requests: &[RelocationRequest], symbols: &SymbolTable) -> Result<Vec<Elf32Rel>> {
    requests
        .iter()
        .map(|req| {
            let sym_index = symbols
                .index_of(&req.symbol_name)
                .ok_or_else(|| Error::MissingSymbol(req.symbol_name.clone()))?;
            Ok(Elf32Rel::new(req.offset, sym_index as u32, req.rel_type))
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn unresolved_symbol_fails() {
        let symbols = SymbolTable::new();
        let requests = vec![RelocationRequest { symbol_name: "missing".to_owned(), offset: 0, rel_type: 4 }];
        assert!(matches!(populate(&requests, &symbols), Err(Error::MissingSymbol(_))));
    }

    #[test]
    fn resolved_symbol_packs_index_and_type() {
        let mut symbols = SymbolTable::new();
        symbols.push("target".to_owned(), 1, 0);
        let requests = vec![RelocationRequest { symbol_name: "target".to_owned(), offset: 8, rel_type: 4 }];
        let rels = populate(&requests, &symbols).unwrap();
        assert_eq!(rels[0].r_offset, 8);
        assert_eq!(rels[0].r_info, (1 << 8) | 4);
    }
}

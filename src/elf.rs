//! ELF32 serialization (§4.7): assembles the final object file's ELF
//! header, section header table, and section contents (including the
//! synthesized `.symtab`/`.strtab`/`.shstrtab`) into one byte buffer.

use crate::reloc::Elf32Rel;
use crate::section::{self, Section};
use crate::symtab::SymbolTable;
use crate::util::Endian;
use byteorder::ByteOrder;

pub const EI_NIDENT: usize = 16;
pub const ELFCLASS32: u8 = 1;
pub const ELFDATA2LSB: u8 = 1;
pub const EV_CURRENT: u8 = 1;
pub const ET_REL: u16 = 1;
pub const EM_MIPS: u16 = 8;

pub const E_EHSIZE: u16 = 52;
pub const E_SHENTSIZE: u16 = 40;
pub const SIZEOF_ELF32_SYM: usize = 16;
pub const SIZEOF_ELF32_REL: usize = 8;

const E_FLAGS_MIPS32R6: u32 = 0x9000_0400;

/// Appends a NUL-terminated name to a string table buffer and returns
/// its byte offset (the table already starts with a leading NUL, per
/// the ELF string-table convention).
fn strtab_push(table: &mut Vec<u8>, name: &str) -> u32 {
    let offset = table.len() as u32;
    table.extend_from_slice(name.as_bytes());
    table.push(0);
    offset
}

struct BuiltSection {
    name_offset: u32,
    data: Vec<u8>,
}

/// Serializes `sections` and `symbols` (with per-section relocation
/// lists already populated via `reloc::populate`) into a complete
/// relocatable ELF32 object file.
pub fn write_object(
    sections: &[Section],
    symbols: &SymbolTable,
    text_rels: &[Elf32Rel],
    data_rels: &[Elf32Rel],
) -> Vec<u8> {
    let mut shstrtab = vec![0u8];
    let mut strtab = vec![0u8];

    let mut name_offsets = Vec::with_capacity(sections.len());
    for s in sections {
        name_offsets.push(strtab_push(&mut shstrtab, &s.name));
    }

    let symtab_bytes = build_symtab(symbols, &mut strtab);
    let rel_text_bytes = build_rel_bytes(text_rels);
    let rel_data_bytes = build_rel_bytes(data_rels);

    let mut built: Vec<BuiltSection> = Vec::with_capacity(sections.len());
    for (i, s) in sections.iter().enumerate() {
        let data = match i {
            section::TEXT => concat_entities(s),
            section::DATA => concat_entities(s),
            section::BSS => Vec::new(),
            section::REL_TEXT => rel_text_bytes.clone(),
            section::REL_DATA => rel_data_bytes.clone(),
            section::SYMTAB => symtab_bytes.clone(),
            section::SHSTRTAB => shstrtab.clone(),
            section::STRTAB => strtab.clone(),
            _ => Vec::new(),
        };
        built.push(BuiltSection { name_offset: name_offsets[i], data });
    }

    let shnum = sections.len();
    let mut offset = E_EHSIZE as u32;
    let mut content_offsets = vec![0u32; shnum];
    for (i, s) in sections.iter().enumerate() {
        if s.sh_type == section::SHT_NULL || s.sh_type == section::SHT_NOBITS {
            content_offsets[i] = offset;
            continue;
        }
        content_offsets[i] = offset;
        offset += built[i].data.len() as u32;
    }
    let shoff = offset;
    let e_shoff = shoff;

    let mut out = Vec::new();
    write_header(&mut out, shnum as u16, e_shoff);

    for (i, s) in sections.iter().enumerate() {
        if s.sh_type == section::SHT_NULL || s.sh_type == section::SHT_NOBITS {
            continue;
        }
        out.extend_from_slice(&built[i].data);
    }

    for (i, s) in sections.iter().enumerate() {
        write_section_header(&mut out, s, built[i].name_offset, content_offsets[i]);
    }

    out
}

fn concat_entities(section: &Section) -> Vec<u8> {
    let mut data = Vec::with_capacity(section.size() as usize);
    for entity in &section.entities {
        data.extend_from_slice(&entity.bytes);
    }
    data
}

fn build_rel_bytes(rels: &[Elf32Rel]) -> Vec<u8> {
    let mut data = vec![0u8; SIZEOF_ELF32_REL * rels.len()];
    for (i, rel) in rels.iter().enumerate() {
        let base = i * SIZEOF_ELF32_REL;
        Endian::write_u32(&mut data[base..base + 4], rel.r_offset);
        Endian::write_u32(&mut data[base + 4..base + 8], rel.r_info);
    }
    data
}

/// One record per symbol table entry, in order, `st_info=0` throughout
/// (§4.7 step 3 — this assembler's symbol table carries no bind/type
/// distinction). The null entry at index 0 falls out naturally: its
/// name is empty, so it claims offset 0 in `.strtab`, which already
/// starts with that leading NUL.
fn build_symtab(symbols: &SymbolTable, strtab: &mut Vec<u8>) -> Vec<u8> {
    let mut data = Vec::new();
    for sym in symbols.iter() {
        let name_offset = strtab_push(strtab, &sym.name);
        let shndx = sym.section.map(|s| s as u16).unwrap_or(0);
        push_sym(&mut data, name_offset, sym.offset, shndx);
    }
    data
}

fn push_sym(data: &mut Vec<u8>, name: u32, value: u32, shndx: u16) {
    let mut entry = [0u8; SIZEOF_ELF32_SYM];
    Endian::write_u32(&mut entry[0..4], name);
    Endian::write_u32(&mut entry[4..8], value);
    Endian::write_u32(&mut entry[8..12], 0); // st_size
    entry[12] = 0; // st_info
    entry[13] = 0; // st_other
    Endian::write_u16(&mut entry[14..16], shndx);
    data.extend_from_slice(&entry);
}

fn write_header(out: &mut Vec<u8>, shnum: u16, e_shoff: u32) {
    let mut ident = [0u8; EI_NIDENT];
    ident[0..4].copy_from_slice(&[0x7F, b'E', b'L', b'F']);
    ident[4] = ELFCLASS32;
    ident[5] = ELFDATA2LSB;
    ident[6] = EV_CURRENT;
    out.extend_from_slice(&ident);

    let mut rest = [0u8; 36];
    Endian::write_u16(&mut rest[0..2], ET_REL);
    Endian::write_u16(&mut rest[2..4], EM_MIPS);
    Endian::write_u32(&mut rest[4..8], EV_CURRENT as u32);
    Endian::write_u32(&mut rest[8..12], 0); // e_entry
    Endian::write_u32(&mut rest[12..16], 0); // e_phoff
    Endian::write_u32(&mut rest[16..20], e_shoff);
    Endian::write_u32(&mut rest[20..24], E_FLAGS_MIPS32R6);
    Endian::write_u16(&mut rest[24..26], E_EHSIZE);
    Endian::write_u16(&mut rest[26..28], 0); // e_phentsize
    Endian::write_u16(&mut rest[28..30], 0); // e_phnum
    Endian::write_u16(&mut rest[30..32], E_SHENTSIZE);
    Endian::write_u16(&mut rest[32..34], shnum);
    Endian::write_u16(&mut rest[34..36], section::SHSTRTAB as u16);
    out.extend_from_slice(&rest);
}

fn write_section_header(out: &mut Vec<u8>, section: &Section, name_offset: u32, offset: u32) {
    let mut entry = [0u8; 40];
    Endian::write_u32(&mut entry[0..4], name_offset);
    Endian::write_u32(&mut entry[4..8], section.sh_type);
    Endian::write_u32(&mut entry[8..12], section.sh_flags);
    Endian::write_u32(&mut entry[12..16], 0); // sh_addr
    Endian::write_u32(&mut entry[16..20], offset);
    Endian::write_u32(&mut entry[20..24], section.size());
    Endian::write_u32(&mut entry[24..28], section.link);
    Endian::write_u32(&mut entry[28..32], section.info);
    Endian::write_u32(&mut entry[32..36], if section.sh_type == section::SHT_SYMTAB { 4 } else { 1 });
    let entsize = match section.sh_type {
        t if t == section::SHT_SYMTAB => SIZEOF_ELF32_SYM as u32,
        t if t == section::SHT_REL => SIZEOF_ELF32_REL as u32,
        _ => 0,
    };
    Endian::write_u32(&mut entry[36..40], entsize);
    out.extend_from_slice(&entry);
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn header_starts_with_elf_magic_and_mips_machine() {
        let sections = section::initial_sections();
        let symbols = SymbolTable::new();
        let out = write_object(&sections, &symbols, &[], &[]);
        assert_eq!(&out[0..4], &[0x7F, b'E', b'L', b'F']);
        assert_eq!(out[4], ELFCLASS32);
        assert_eq!(out[5], ELFDATA2LSB);
        let e_machine = Endian::read_u16(&out[18..20]);
        assert_eq!(e_machine, EM_MIPS);
    }

    #[test]
    fn section_count_matches_fixed_table() {
        let sections = section::initial_sections();
        let symbols = SymbolTable::new();
        let out = write_object(&sections, &symbols, &[], &[]);
        let shnum = Endian::read_u16(&out[48..50]);
        assert_eq!(shnum, 9);
    }
}

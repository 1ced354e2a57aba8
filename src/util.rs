//! Small numeric helpers, grounded in the teacher's `vasm::int_util` and
//! `util` crate. The teacher split these into standalone crates (`util`,
//! `util-derive`); this crate folds them into a module since nothing
//! outside this one package consumes them (see DESIGN.md).

/// Wire endianness for binary output. The teacher's `util::Endian` alias
/// over `byteorder::LittleEndian` is kept verbatim since every on-disk
/// format this crate touches (ELF32/ELFDATA2LSB) is little-endian.
pub type Endian = byteorder::LittleEndian;

/// Strips a recognized base prefix and returns the literal body and radix,
/// mirroring the four bases `vasm`'s grammar accepts (decimal, `0x`, `0o`,
/// `0b`).
pub fn split_radix_prefix(text: &str) -> (&str, u32) {
    if let Some(rest) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        (rest, 16)
    } else if let Some(rest) = text.strip_prefix("0o").or_else(|| text.strip_prefix("0O")) {
        (rest, 8)
    } else if let Some(rest) = text.strip_prefix("0b").or_else(|| text.strip_prefix("0B")) {
        (rest, 2)
    } else {
        (text, 10)
    }
}

//! MIPS general-purpose register identifiers.
//!
//! Grounded in the teacher's `RegisterId` enum (`src/enums.rs`), which
//! enumerates a register set the same way for its own ISA. MIPS has a
//! fixed, well-known ABI name for each of the 32 registers; this module
//! follows that naming rather than the teacher's DLX-derived names, since
//! the ABI names are part of this assembler's external input contract.

use crate::error::{Error, Result};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Register(pub u8);

impl Register {
    pub const ZERO: Register = Register(0);

    pub fn index(self) -> u32 {
        self.0 as u32
    }

    /// Parses a register name without its leading `$` (e.g. `t0`, `31`,
    /// `zero`), case-insensitively.
    pub fn parse(name: &str) -> Result<Register> {
        let upper = name.to_ascii_uppercase();
        if let Ok(n) = upper.parse::<u8>() {
            if n < 32 {
                return Ok(Register(n));
            }
            return Err(Error::BadOperandType {
                construct: "register".to_owned(),
                detail: "numeric register must be 0-31",
            });
        }
        NAMES
            .iter()
            .position(|&candidate| candidate == upper)
            .map(|idx| Register(idx as u8))
            .ok_or_else(|| Error::BadOperandType {
                construct: "register".to_owned(),
                detail: "unrecognized register name",
            })
    }
}

const NAMES: [&str; 32] = [
    "ZERO", "AT", "V0", "V1", "A0", "A1", "A2", "A3", "T0", "T1", "T2", "T3", "T4", "T5", "T6",
    "T7", "S0", "S1", "S2", "S3", "S4", "S5", "S6", "S7", "T8", "T9", "K0", "K1", "GP", "SP",
    "FP", "RA",
];

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parses_abi_names() {
        assert_eq!(Register::parse("zero").unwrap(), Register(0));
        assert_eq!(Register::parse("t0").unwrap(), Register(8));
        assert_eq!(Register::parse("ra").unwrap(), Register(31));
        assert_eq!(Register::parse("sp").unwrap(), Register(29));
    }

    #[test]
    fn parses_numeric_names() {
        assert_eq!(Register::parse("9").unwrap(), Register(9));
    }

    #[test]
    fn rejects_unknown_name() {
        assert!(Register::parse("bogus").is_err());
    }
}

//! The closed opcode and directive enumerations (§6), plus mnemonic
//! string conversion. Grounded in the teacher's `OpCode` enum
//! (`src/enums.rs`) and its `EnumFromStr`/`InteropGetName` traits
//! (`util/src/lib.rs`), which map mnemonic strings to enum variants and
//! back. This crate hand-writes the `FromStr`/`mnemonic` impls instead of
//! depending on the teacher's `util-derive` proc-macro crate, since that
//! crate exists only to remove boilerplate the `match` arms below already
//! state plainly — see DESIGN.md.

use crate::error::Error;
use std::str::FromStr;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Opcode {
    Add,
    Addu,
    Sub,
    Subu,
    And,
    Or,
    Mul,
    Muh,
    Mulu,
    Muhu,
    Sll,
    Nop,
    Jr,
    Jalr,
    Syscall,
    Addi,
    Addiu,
    Andi,
    Ori,
    Beq,
    Bne,
    Bgez,
    Bal,
    Lui,
    Lb,
    Lbu,
    Lw,
    Sb,
    Sh,
    Sw,
    J,
    Jal,
    Mult,
    Multu,
    // Pseudo-instructions: rewritten away by the macro expander (§4.1)
    // before pass 1 ever sees them.
    La,
    Li,
    Move,
    // Recognized only so the macro expander's delay-slot NOP insertion
    // (§4.1) can match on them. Neither is in the §6 opcode table, so if
    // one survives expansion unconsumed it fails encoding with
    // `BadOpcode` — see SPEC_FULL.md §4.1 and DESIGN.md.
    Beqz,
    Blez,
}

impl Opcode {
    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Add => "add",
            Opcode::Addu => "addu",
            Opcode::Sub => "sub",
            Opcode::Subu => "subu",
            Opcode::And => "and",
            Opcode::Or => "or",
            Opcode::Mul => "mul",
            Opcode::Muh => "muh",
            Opcode::Mulu => "mulu",
            Opcode::Muhu => "muhu",
            Opcode::Sll => "sll",
            Opcode::Nop => "nop",
            Opcode::Jr => "jr",
            Opcode::Jalr => "jalr",
            Opcode::Syscall => "syscall",
            Opcode::Addi => "addi",
            Opcode::Addiu => "addiu",
            Opcode::Andi => "andi",
            Opcode::Ori => "ori",
            Opcode::Beq => "beq",
            Opcode::Bne => "bne",
            Opcode::Bgez => "bgez",
            Opcode::Bal => "bal",
            Opcode::Lui => "lui",
            Opcode::Lb => "lb",
            Opcode::Lbu => "lbu",
            Opcode::Lw => "lw",
            Opcode::Sb => "sb",
            Opcode::Sh => "sh",
            Opcode::Sw => "sw",
            Opcode::J => "j",
            Opcode::Jal => "jal",
            Opcode::Mult => "mult",
            Opcode::Multu => "multu",
            Opcode::La => "la",
            Opcode::Li => "li",
            Opcode::Move => "move",
            Opcode::Beqz => "beqz",
            Opcode::Blez => "blez",
        }
    }

    /// True for the branching/jumping mnemonics the macro expander (§4.1)
    /// follows with a delay-slot `NOP`.
    pub fn has_delay_slot(self) -> bool {
        matches!(
            self,
            Opcode::Bal
                | Opcode::Beq
                | Opcode::Beqz
                | Opcode::Bgez
                | Opcode::Blez
                | Opcode::Bne
                | Opcode::Jal
                | Opcode::Jr
        )
    }
}

impl FromStr for Opcode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Opcode, Error> {
        Ok(match s.to_ascii_uppercase().as_str() {
            "ADD" => Opcode::Add,
            "ADDU" => Opcode::Addu,
            "SUB" => Opcode::Sub,
            "SUBU" => Opcode::Subu,
            "AND" => Opcode::And,
            "OR" => Opcode::Or,
            "MUL" => Opcode::Mul,
            "MUH" => Opcode::Muh,
            "MULU" => Opcode::Mulu,
            "MUHU" => Opcode::Muhu,
            "SLL" => Opcode::Sll,
            "NOP" => Opcode::Nop,
            "JR" => Opcode::Jr,
            "JALR" => Opcode::Jalr,
            "SYSCALL" => Opcode::Syscall,
            "ADDI" => Opcode::Addi,
            "ADDIU" => Opcode::Addiu,
            "ANDI" => Opcode::Andi,
            "ORI" => Opcode::Ori,
            "BEQ" => Opcode::Beq,
            "BNE" => Opcode::Bne,
            "BGEZ" => Opcode::Bgez,
            "BAL" => Opcode::Bal,
            "LUI" => Opcode::Lui,
            "LB" => Opcode::Lb,
            "LBU" => Opcode::Lbu,
            "LW" => Opcode::Lw,
            "SB" => Opcode::Sb,
            "SH" => Opcode::Sh,
            "SW" => Opcode::Sw,
            "J" => Opcode::J,
            "JAL" => Opcode::Jal,
            "MULT" => Opcode::Mult,
            "MULTU" => Opcode::Multu,
            "LA" => Opcode::La,
            "LI" => Opcode::Li,
            "MOVE" => Opcode::Move,
            "BEQZ" => Opcode::Beqz,
            "BLEZ" => Opcode::Blez,
            other => return Err(Error::BadOpcode(other.to_owned())),
        })
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum DirectiveKind {
    Align,
    Data,
    Bss,
    Text,
    Size,
    Global,
    Byte,
    Short,
    Long,
    Word,
    Ascii,
    Asciz,
    String,
    Fill,
    Skip,
    Space,
}

impl DirectiveKind {
    /// True for the section-selector directives (§4.2 step 2).
    pub fn selects_section(self) -> Option<&'static str> {
        match self {
            DirectiveKind::Text => Some(".text"),
            DirectiveKind::Data => Some(".data"),
            DirectiveKind::Bss => Some(".bss"),
            _ => None,
        }
    }
}

impl FromStr for DirectiveKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<DirectiveKind, Error> {
        Ok(match s.to_ascii_uppercase().as_str() {
            "ALIGN" => DirectiveKind::Align,
            "DATA" => DirectiveKind::Data,
            "BSS" => DirectiveKind::Bss,
            "TEXT" => DirectiveKind::Text,
            "SIZE" => DirectiveKind::Size,
            "GLOBAL" | "GLOBL" => DirectiveKind::Global,
            "BYTE" => DirectiveKind::Byte,
            "SHORT" | "HALF" => DirectiveKind::Short,
            "LONG" => DirectiveKind::Long,
            "WORD" => DirectiveKind::Word,
            "ASCII" => DirectiveKind::Ascii,
            "ASCIZ" => DirectiveKind::Asciz,
            "STRING" => DirectiveKind::String,
            "FILL" => DirectiveKind::Fill,
            "SKIP" => DirectiveKind::Skip,
            "SPACE" => DirectiveKind::Space,
            other => return Err(Error::BadOpcode(format!(".{}", other.to_ascii_lowercase()))),
        })
    }
}

//! Instruction Set definition for the hex8 architecture.
//!
//! An instruction is a single byte. The higher 4 bits select the opcode and
//! the lower 4 bits carry the immediate. Larger constants are built with the
//! `PFIX` instruction, which shifts its immediate into the high nibble of the
//! next instruction's operand.

use crate::utils;

/// Both memories span the whole 8-bit address space.
pub const MEM_SIZE: usize = 1 << 8;

/// A dense memory image. Unwritten locations read as zero.
pub type MemImage = [u8; MEM_SIZE];

macro_rules! define_opcode {
    {
        $( $(#[$att:meta])* $name:ident = $val:expr; )*
    } => {
        /// Operation code held in the higher 4 bits of an instruction word.
        /// All 16 encodings are defined.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize))]
        #[repr(u8)]
        pub enum Opcode {
            $( $(#[$att])* $name = $val, )*
        }

        impl Opcode {
            /// All opcodes in encoding order.
            pub const ALL: [Opcode; 16] = [ $( Opcode::$name, )* ];

            pub fn name(self) -> &'static str {
                match self {
                    $( Opcode::$name => stringify!($name), )*
                }
            }

            /// Look up an opcode by its mnemonic, ignoring case.
            pub fn from_name(name: &str) -> Option<Self> {
                $( if name.eq_ignore_ascii_case(stringify!($name)) {
                    return Some(Opcode::$name);
                } )*
                None
            }
        }
    };
}

define_opcode! {
    /// Load A from memory using the operand as address
    LDAM = 0x0;
    /// Load B from memory using the operand as address
    LDBM = 0x1;
    /// Store A to memory using the operand as address
    STAM = 0x2;
    /// Load constant into A
    LDAC = 0x3;
    /// Load constant into B
    LDBC = 0x4;
    /// Load pc plus operand into A
    LDAP = 0x5;
    /// Load A from memory at A plus operand
    LDAI = 0x6;
    /// Load B from memory at B plus operand
    LDBI = 0x7;
    /// Store A to memory at B plus operand
    STAI = 0x8;
    /// Branch unconditionally
    BR = 0x9;
    /// Branch if A is zero
    BRZ = 0xa;
    /// Branch if A is negative (bit 7 set)
    BRN = 0xb;
    /// Branch to the address held in B
    BRB = 0xc;
    /// A = A + B
    ADD = 0xd;
    /// A = A - B
    SUB = 0xe;
    /// Prefix the operand of the next instruction
    PFIX = 0xf;
}

impl Opcode {
    /// Decode the lower 4 bits of `bits`.
    pub fn from_bits(bits: u8) -> Self {
        Self::ALL[(bits & 0xf) as usize]
    }

    /// Whether the operand is an offset from the instruction's own address.
    pub fn is_pc_relative(self) -> bool {
        matches!(self, Opcode::LDAP | Opcode::BR | Opcode::BRZ | Opcode::BRN)
    }

    /// The kind of data memory access performed by this opcode.
    pub fn mem_op(self) -> MemOp {
        match self {
            Opcode::LDAM | Opcode::LDBM | Opcode::LDAI | Opcode::LDBI => MemOp::Load,
            Opcode::STAM | Opcode::STAI => MemOp::Store,
            _ => MemOp::Nothing,
        }
    }
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.name())
    }
}

/// A decoded instruction word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Inst {
    pub op: Opcode,
    /// The raw 4-bit immediate, before merging a prefix.
    pub imm: u8,
}

impl Inst {
    pub fn new(op: Opcode, imm: u8) -> Self {
        Self { op, imm: imm & 0xf }
    }

    pub fn decode(word: u8) -> Self {
        Self {
            op: Opcode::from_bits(word >> 4),
            imm: word & 0xf,
        }
    }

    pub fn encode(self) -> u8 {
        (self.op as u8) << 4 | self.imm
    }
}

/// The all-zero word, `LDAM 0`.
impl Default for Inst {
    fn default() -> Self {
        Self::decode(0)
    }
}

impl From<u8> for Inst {
    fn from(word: u8) -> Self {
        Self::decode(word)
    }
}

impl From<Inst> for u8 {
    fn from(inst: Inst) -> Self {
        inst.encode()
    }
}

impl std::fmt::Display for Inst {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:<4} {:#x}", self.op, self.imm)
    }
}

/// Whether a retired instruction touched data memory and how.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum MemOp {
    #[default]
    Nothing,
    Load,
    Store,
}

impl std::fmt::Display for MemOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (name, s) = match self {
            MemOp::Nothing => ("-----", utils::gray()),
            MemOp::Load => ("load ", utils::grn()),
            MemOp::Store => ("store", utils::ylw()),
        };
        write!(f, "{}", s.paint(name))
    }
}

/// Observable state after an instruction retires. The model and the
/// pipeline tracer both produce a stream of these, and the two streams are
/// compared record by record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TraceRecord {
    /// Address the instruction was fetched from.
    pub pc: u8,
    pub inst: Inst,
    /// A after the instruction executed.
    pub areg: u8,
    /// B after the instruction executed.
    pub breg: u8,
    pub memory: MemOp,
    /// Memory address involved, 0 if none.
    pub address: u8,
    /// Memory data involved, 0 if none.
    pub data: u8,
}

impl std::fmt::Display for TraceRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "pc {pc:#04x}  {inst}  a {a} b {b}  {mem}",
            pc = self.pc,
            inst = utils::grnb().paint(self.inst.to_string()),
            a = utils::format_byte(self.areg),
            b = utils::format_byte(self.breg),
            mem = self.memory,
        )?;
        if self.memory != MemOp::Nothing {
            write!(f, " [{:#04x}] {:#04x}", self.address, self.data)?;
        }
        Ok(())
    }
}

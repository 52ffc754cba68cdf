//! This file provides the binary representation of assembled hex8 programs.

use std::{collections::BTreeMap, fmt::Display};

use anyhow::Context;

use crate::isa::{Inst, MemImage, Opcode, MEM_SIZE};

pub type SymbolMap = BTreeMap<String, u8>;

/// Immediate operand (can be raw number or address of label)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Imm {
    Num(u8),
    Label(String),
}

impl Imm {
    /// Resolve to the 4-bit immediate of an instruction at `pc`. Labels of
    /// pc-relative opcodes become offsets from `pc`.
    fn desymbol(&self, sym: &SymbolMap, op: Opcode, pc: u8) -> anyhow::Result<u8> {
        let val = match self {
            Imm::Num(n) => *n,
            Imm::Label(label) => {
                let target = *sym
                    .get(label)
                    .with_context(|| format!("undefined label `{}`", label))?;
                if op.is_pc_relative() {
                    target.wrapping_sub(pc)
                } else {
                    target
                }
            }
        };
        anyhow::ensure!(
            val <= 0xf,
            "operand {:#04x} of {} does not fit in 4 bits, use pfix",
            val,
            op
        );
        Ok(val)
    }
}

/// Assembled program: initial content of both memories.
#[derive(Debug)]
pub struct Program {
    pub imem: MemImage,
    pub dmem: MemImage,
    /// basically labels
    pub symbols: SymbolMap,
}

impl Default for Program {
    fn default() -> Self {
        Self {
            imem: [0; MEM_SIZE],
            dmem: [0; MEM_SIZE],
            symbols: Default::default(),
        }
    }
}

impl Program {
    /// Build a program directly from instruction words placed from address 0.
    pub fn from_words(words: &[u8]) -> Self {
        let mut prog = Self::default();
        for (addr, word) in words.iter().take(MEM_SIZE).enumerate() {
            prog.imem[addr] = *word;
        }
        prog
    }
}

/// One line of the assembly source.
#[derive(Debug, Default)]
pub struct SourceInfo {
    /// Instruction memory address of this line.
    pub addr: Option<u8>,
    pub inst: Option<(Opcode, Imm)>,
    /// Raw word from `.byte`.
    pub word: Option<u8>,
    pub label: Option<String>,
    /// (address, value) preloaded in data memory.
    pub data: Option<(u8, u8)>,
    pub src: String,
    /// 1-based line number.
    pub line: usize,
}

impl SourceInfo {
    pub fn write_object(&self, obj: &mut Program) -> anyhow::Result<()> {
        if let Some((addr, val)) = self.data {
            obj.dmem[addr as usize] = val;
        }
        let Some(addr) = self.addr else {
            return Ok(());
        };
        if let Some((op, imm)) = &self.inst {
            let imm = imm
                .desymbol(&obj.symbols, *op, addr)
                .with_context(|| format!("line {}: `{}`", self.line, self.src.trim()))?;
            obj.imem[addr as usize] = Inst::new(*op, imm).encode();
        }
        if let Some(word) = self.word {
            obj.imem[addr as usize] = word;
        }
        Ok(())
    }

    fn has_word(&self) -> bool {
        self.inst.is_some() || self.word.is_some()
    }
}

/// Program together with its annotated source.
#[derive(Debug, Default)]
pub struct ObjectExt {
    pub obj: Program,
    /// annotate each line with its address
    pub source: Vec<SourceInfo>,
}

impl Display for ObjectExt {
    /// display the listing
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for src in &self.source {
            match (src.addr, src.data) {
                (Some(addr), _) if src.has_word() => {
                    write!(f, "{:#04x}: {:02x}   ", addr, self.obj.imem[addr as usize])?
                }
                (_, Some((addr, val))) => write!(f, "[{:#04x}] {:02x}  ", addr, val)?,
                (Some(addr), _) => write!(f, "{:#04x}:      ", addr)?,
                (None, None) => write!(f, "{: <11}", "")?,
            }
            writeln!(f, "| {}", src.src)?
        }
        Ok(())
    }
}

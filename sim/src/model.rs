//! Instruction level reference model of the hex8 CPU.
//!
//! The model has no notion of pipelining. Each [`Hex8Model::step`] executes
//! exactly one instruction and reports the resulting [`TraceRecord`], which
//! serves as the golden reference for the hardware architectures.

use crate::isa::{Inst, MemImage, MemOp, Opcode, TraceRecord, MEM_SIZE};

#[derive(Debug, Clone)]
pub struct Hex8Model {
    pc: u8,
    areg: u8,
    breg: u8,
    /// Pending prefix. Only the lower 4 bits are ever set.
    pfix: u8,
    imem: MemImage,
    dmem: MemImage,
    n_insts: u64,
}

impl Default for Hex8Model {
    fn default() -> Self {
        Self::new()
    }
}

impl Hex8Model {
    /// A model in the reset state.
    pub fn new() -> Self {
        Self {
            pc: 0,
            areg: 0,
            breg: 0,
            pfix: 0,
            imem: [0; MEM_SIZE],
            dmem: [0; MEM_SIZE],
            n_insts: 0,
        }
    }

    /// A reset model with both memories preloaded.
    pub fn with_memory(imem: MemImage, dmem: MemImage) -> Self {
        Self {
            imem,
            dmem,
            ..Self::new()
        }
    }

    /// Zero all registers and clear both memories.
    pub fn reset(&mut self) {
        tracing::debug!("model reset after {} instructions", self.n_insts);
        *self = Self::new();
    }

    pub fn write_imem(&mut self, addr: u8, word: u8) {
        self.imem[addr as usize] = word;
    }

    pub fn write_dmem(&mut self, addr: u8, data: u8) {
        self.dmem[addr as usize] = data;
    }

    pub fn pc(&self) -> u8 {
        self.pc
    }
    pub fn areg(&self) -> u8 {
        self.areg
    }
    pub fn breg(&self) -> u8 {
        self.breg
    }
    pub fn pfix(&self) -> u8 {
        self.pfix
    }
    pub fn imem(&self) -> &MemImage {
        &self.imem
    }
    pub fn dmem(&self) -> &MemImage {
        &self.dmem
    }
    /// Number of instructions executed since the last reset.
    pub fn n_insts(&self) -> u64 {
        self.n_insts
    }

    /// Execute the instruction at `pc`.
    pub fn step(&mut self) -> TraceRecord {
        let inst = Inst::decode(self.imem[self.pc as usize]);
        // fully prefixed operand
        let oreg = (self.pfix << 4) | inst.imm;
        self.pfix = 0;

        let mut next_pc = self.pc.wrapping_add(1);
        let mut memory = MemOp::Nothing;
        let mut address = 0;
        let mut data = 0;

        match inst.op {
            Opcode::LDAM => {
                self.areg = self.dmem[oreg as usize];
                (memory, address, data) = (MemOp::Load, oreg, self.areg);
            }
            Opcode::LDBM => {
                self.breg = self.dmem[oreg as usize];
                (memory, address, data) = (MemOp::Load, oreg, self.breg);
            }
            Opcode::STAM => {
                self.dmem[oreg as usize] = self.areg;
                (memory, address, data) = (MemOp::Store, oreg, self.areg);
            }
            Opcode::LDAC => self.areg = oreg,
            Opcode::LDBC => self.breg = oreg,
            Opcode::LDAP => self.areg = self.pc.wrapping_add(oreg),
            // The indexed forms report the operand, not the effective
            // address, as the record address.
            Opcode::LDAI => {
                self.areg = self.dmem[self.areg.wrapping_add(oreg) as usize];
                (memory, address, data) = (MemOp::Load, oreg, self.areg);
            }
            Opcode::LDBI => {
                self.breg = self.dmem[self.breg.wrapping_add(oreg) as usize];
                (memory, address, data) = (MemOp::Load, oreg, self.breg);
            }
            Opcode::STAI => {
                self.dmem[self.breg.wrapping_add(oreg) as usize] = self.areg;
                (memory, address, data) = (MemOp::Store, oreg, self.areg);
            }
            Opcode::BR => next_pc = self.pc.wrapping_add(oreg),
            Opcode::BRZ => {
                if self.areg == 0 {
                    next_pc = self.pc.wrapping_add(oreg)
                }
            }
            Opcode::BRN => {
                if self.areg & 0x80 != 0 {
                    next_pc = self.pc.wrapping_add(oreg)
                }
            }
            Opcode::BRB => next_pc = self.breg,
            Opcode::ADD => self.areg = self.areg.wrapping_add(self.breg),
            Opcode::SUB => self.areg = self.areg.wrapping_sub(self.breg),
            Opcode::PFIX => self.pfix = inst.imm,
        }

        let record = TraceRecord {
            pc: self.pc,
            inst,
            areg: self.areg,
            breg: self.breg,
            memory,
            address,
            data,
        };
        tracing::trace!("model: {}", record);

        self.pc = next_pc;
        self.n_insts += 1;
        record
    }

    /// Execute `n` instructions.
    pub fn run(&mut self, n: usize) -> Vec<TraceRecord> {
        (0..n).map(|_| self.step()).collect()
    }
}

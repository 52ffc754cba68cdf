//! Hardware units shared by the hex8 architectures.
//!
//! Both memories are synchronous: a request issued during a cycle is served
//! at the clock edge, and a read response is visible during the next cycle.

use crate::{
    framework::{HardwareUnits, Signals},
    isa::{Inst, MemImage, Opcode},
};

pub struct InstructionMemory {
    binary: MemImage,
    /// Registered read response.
    rsp_data: u8,
}

impl InstructionMemory {
    fn trigger(&mut self, valid: bool, addr: u8) {
        if valid {
            self.rsp_data = self.binary[addr as usize];
        }
    }
}

pub struct DataMemory {
    binary: MemImage,
    /// Registered read response. Writes respond with 0.
    rsp_data: u8,
}

impl DataMemory {
    fn trigger(&mut self, valid: bool, write: bool, addr: u8, datain: u8) {
        if !valid {
            return;
        }
        if write {
            tracing::info!("write memory: addr = {:#04x}, datain = {:#04x}", addr, datain);
            self.binary[addr as usize] = datain;
            self.rsp_data = 0;
        } else {
            self.rsp_data = self.binary[addr as usize];
        }
    }
}

pub struct Units {
    pub(crate) imem: InstructionMemory,
    pub(crate) dmem: DataMemory,
}

impl Units {
    /// Instruction word requested on the previous cycle.
    pub fn imem_rsp(&self) -> u8 {
        self.imem.rsp_data
    }

    /// Data read on the previous cycle.
    pub fn dmem_rsp(&self) -> u8 {
        self.dmem.rsp_data
    }
}

impl HardwareUnits for Units {
    fn init(imem: MemImage, dmem: MemImage) -> Self {
        Self {
            imem: InstructionMemory {
                binary: imem,
                rsp_data: 0,
            },
            dmem: DataMemory {
                binary: dmem,
                rsp_data: 0,
            },
        }
    }

    fn clock(&mut self, sigs: &Signals) {
        self.imem.trigger(sigs.imem_req_valid, sigs.imem_req_addr);
        self.dmem.trigger(
            sigs.dmem_req_valid,
            sigs.dmem_req_write,
            sigs.dmem_req_addr,
            sigs.dmem_req_data,
        );
    }

    fn dmem(&self) -> MemImage {
        self.dmem.binary
    }
}

/// Register written by an outstanding load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum LoadDst {
    A,
    B,
}

impl LoadDst {
    /// Write `value` into the destination. Returns the new (A, B).
    pub fn write_back(self, value: u8, areg: u8, breg: u8) -> (u8, u8) {
        match self {
            LoadDst::A => (value, breg),
            LoadDst::B => (areg, value),
        }
    }
}

/// Data memory request issued by the execute unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemRequest {
    pub write: bool,
    pub addr: u8,
    pub data: u8,
    /// Set for loads.
    pub load: Option<LoadDst>,
}

/// Input of the execute unit.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExecIn {
    /// Address of the executed instruction.
    pub pc: u8,
    pub word: u8,
    pub areg: u8,
    pub breg: u8,
    pub pfix: u8,
}

/// Output of the execute unit. For loads, `areg` and `breg` are unchanged;
/// the loaded value is written back once the memory responds.
#[derive(Debug, Clone, Copy)]
pub struct ExecOut {
    pub areg: u8,
    pub breg: u8,
    pub pfix: u8,
    pub next_pc: u8,
    pub mem: Option<MemRequest>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AluFun {
    Add,
    Sub,
}

fn alu(a: u8, b: u8, fun: AluFun) -> u8 {
    match fun {
        AluFun::Add => a.wrapping_add(b),
        AluFun::Sub => a.wrapping_sub(b),
    }
}

/// Decode and execute one instruction word. Pure combinational logic.
pub fn execute(input: ExecIn) -> ExecOut {
    let ExecIn {
        pc,
        word,
        areg,
        breg,
        pfix,
    } = input;
    let inst = Inst::decode(word);
    let oreg = pfix << 4 | inst.imm;
    let target = alu(pc, oreg, AluFun::Add);

    let load = |addr: u8, dst: LoadDst| MemRequest {
        write: false,
        addr,
        data: 0,
        load: Some(dst),
    };
    let store = |addr: u8| MemRequest {
        write: true,
        addr,
        data: areg,
        load: None,
    };

    let mut out = ExecOut {
        areg,
        breg,
        pfix: 0,
        next_pc: alu(pc, 1, AluFun::Add),
        mem: None,
    };
    match inst.op {
        Opcode::LDAM => out.mem = Some(load(oreg, LoadDst::A)),
        Opcode::LDBM => out.mem = Some(load(oreg, LoadDst::B)),
        Opcode::STAM => out.mem = Some(store(oreg)),
        Opcode::LDAC => out.areg = oreg,
        Opcode::LDBC => out.breg = oreg,
        Opcode::LDAP => out.areg = target,
        Opcode::LDAI => out.mem = Some(load(alu(areg, oreg, AluFun::Add), LoadDst::A)),
        Opcode::LDBI => out.mem = Some(load(alu(breg, oreg, AluFun::Add), LoadDst::B)),
        Opcode::STAI => out.mem = Some(store(alu(breg, oreg, AluFun::Add))),
        Opcode::BR => out.next_pc = target,
        Opcode::BRZ if areg == 0 => out.next_pc = target,
        Opcode::BRN if areg >> 7 == 1 => out.next_pc = target,
        Opcode::BRZ | Opcode::BRN => {}
        Opcode::BRB => out.next_pc = breg,
        Opcode::ADD => out.areg = alu(areg, breg, AluFun::Add),
        Opcode::SUB => out.areg = alu(areg, breg, AluFun::Sub),
        Opcode::PFIX => out.pfix = inst.imm,
    }
    out
}

/// Drive a data memory request onto the interface.
pub(crate) fn drive_dmem(sigs: &mut Signals, req: &MemRequest) {
    sigs.dmem_req_valid = true;
    sigs.dmem_req_write = req.write;
    sigs.dmem_req_addr = req.addr;
    sigs.dmem_req_data = req.data;
}

/// Drive an instruction fetch onto the interface.
pub(crate) fn drive_imem(sigs: &mut Signals, pc: u8) {
    sigs.imem_req_valid = true;
    sigs.imem_req_addr = pc;
}

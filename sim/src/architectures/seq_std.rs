//! Sequential hex8 core: every instruction takes a fetch cycle and an
//! execute cycle, loads take a third cycle to write back. Nothing overlaps.

use super::hardware::{self, ExecIn, LoadDst, Units};
use crate::framework::{CpuArch, Signals};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Phase {
    #[default]
    Fetch,
    Execute,
    Memory(LoadDst),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SeqRegs {
    pub pc: u8,
    pub areg: u8,
    pub breg: u8,
    pub pfix: u8,
    pub phase: Phase,
}

pub struct Arch;

impl CpuArch for Arch {
    type StageState = SeqRegs;
    type Units = Units;

    const NAME: &'static str = "seq_std";

    fn propagate(cur: &SeqRegs, units: &Units, sigs: &mut Signals) -> SeqRegs {
        let mut nex = cur.clone();
        sigs.imem_rsp_data = units.imem_rsp();
        match cur.phase {
            Phase::Fetch => {
                hardware::drive_imem(sigs, cur.pc);
                nex.phase = Phase::Execute;
            }
            Phase::Execute => {
                let out = hardware::execute(ExecIn {
                    pc: cur.pc,
                    word: units.imem_rsp(),
                    areg: cur.areg,
                    breg: cur.breg,
                    pfix: cur.pfix,
                });
                nex.areg = out.areg;
                nex.breg = out.breg;
                nex.pfix = out.pfix;
                nex.pc = out.next_pc;
                nex.phase = Phase::Fetch;
                if let Some(req) = out.mem {
                    hardware::drive_dmem(sigs, &req);
                    if let Some(dst) = req.load {
                        nex.phase = Phase::Memory(dst);
                    }
                }
            }
            Phase::Memory(dst) => {
                let value = units.dmem_rsp();
                (nex.areg, nex.breg) = dst.write_back(value, cur.areg, cur.breg);
                nex.phase = Phase::Fetch;
                sigs.result.value = value;
            }
        }
        sigs.result.areg = nex.areg;
        sigs.result.breg = nex.breg;
        nex
    }

    fn program_counter(state: &SeqRegs) -> u8 {
        state.pc
    }

    fn registers(state: &SeqRegs) -> Vec<(&'static str, u8)> {
        vec![("a", state.areg), ("b", state.breg), ("pfix", state.pfix)]
    }
}

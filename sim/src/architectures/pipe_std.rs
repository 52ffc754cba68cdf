//! Two-stage pipelined hex8 core.
//!
//! While an instruction executes, the next one is fetched from the already
//! resolved next pc, so there is nothing to flush on branches. A load keeps
//! the fetch idle for one cycle: its data returns on the following cycle,
//! together with the fetch of the next instruction.
//!
//! ```text
//! cycle      0    1    2    3    4
//! ldac       F    E
//! ldam            F    E    M
//! add                       F    E
//! ```

use super::hardware::{self, ExecIn, LoadDst, Units};
use crate::framework::{CpuArch, Signals};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PipeRegs {
    /// Address of the last fetch, or of the next one while a load completes.
    pub pc: u8,
    pub areg: u8,
    pub breg: u8,
    pub pfix: u8,
    /// An instruction word arrives from the instruction memory this cycle.
    pub e_valid: bool,
    /// Address of that instruction.
    pub e_pc: u8,
    /// A load issued on the previous cycle completes this cycle.
    pub m_load: Option<LoadDst>,
}

pub struct Arch;

impl CpuArch for Arch {
    type StageState = PipeRegs;
    type Units = Units;

    const NAME: &'static str = "pipe_std";

    fn propagate(cur: &PipeRegs, units: &Units, sigs: &mut Signals) -> PipeRegs {
        let mut nex = PipeRegs {
            e_valid: false,
            m_load: None,
            ..cur.clone()
        };
        let (mut areg, mut breg) = (cur.areg, cur.breg);
        sigs.imem_rsp_data = units.imem_rsp();

        // Memory: write back the load issued on the previous cycle
        if let Some(dst) = cur.m_load {
            let value = units.dmem_rsp();
            (areg, breg) = dst.write_back(value, areg, breg);
            sigs.result.value = value;
        }

        // Execute
        let fetch_pc = if cur.e_valid {
            let out = hardware::execute(ExecIn {
                pc: cur.e_pc,
                word: units.imem_rsp(),
                areg,
                breg,
                pfix: cur.pfix,
            });
            (areg, breg) = (out.areg, out.breg);
            nex.pfix = out.pfix;
            if let Some(req) = out.mem {
                hardware::drive_dmem(sigs, &req);
                nex.m_load = req.load;
            }
            if nex.m_load.is_some() {
                // stall the fetch until the load completes
                nex.pc = out.next_pc;
                None
            } else {
                Some(out.next_pc)
            }
        } else {
            Some(cur.pc)
        };

        // Fetch
        if let Some(pc) = fetch_pc {
            hardware::drive_imem(sigs, pc);
            nex.pc = pc;
            nex.e_valid = true;
            nex.e_pc = pc;
        }

        (nex.areg, nex.breg) = (areg, breg);
        sigs.result.areg = areg;
        sigs.result.breg = breg;
        nex
    }

    fn program_counter(state: &PipeRegs) -> u8 {
        if state.e_valid {
            state.e_pc
        } else {
            state.pc
        }
    }

    fn registers(state: &PipeRegs) -> Vec<(&'static str, u8)> {
        vec![("a", state.areg), ("b", state.breg), ("pfix", state.pfix)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        framework::{CpuSim, PipeSim},
        isa::{Inst, Opcode, MEM_SIZE},
    };

    fn sim(prog: &[(Opcode, u8)]) -> PipeSim<Arch> {
        let mut imem = [0; MEM_SIZE];
        for (i, (op, imm)) in prog.iter().enumerate() {
            imem[i] = Inst::new(*op, *imm).encode();
        }
        let mut dmem = [0; MEM_SIZE];
        dmem[3] = 0x5a;
        PipeSim::new(imem, dmem)
    }

    #[test]
    fn test_overlapped_fetch() {
        let mut pipe = sim(&[(Opcode::LDAC, 1), (Opcode::LDBC, 2), (Opcode::ADD, 0)]);
        pipe.step();
        assert!(pipe.signals().imem_req_valid);
        assert_eq!(pipe.signals().imem_req_addr, 0);
        pipe.step();
        // ldac executes while ldbc is fetched
        assert_eq!(pipe.signals().imem_req_addr, 1);
        assert_eq!(pipe.signals().imem_rsp_data, 0x31);
        assert_eq!(pipe.signals().result.areg, 1);
        pipe.step();
        pipe.step();
        assert_eq!(pipe.signals().result.areg, 3);
        assert_eq!(pipe.cycle_count(), 4);
    }

    #[test]
    fn test_load_stalls_fetch() {
        let mut pipe = sim(&[(Opcode::LDAM, 3), (Opcode::ADD, 0)]);
        pipe.step();
        pipe.step();
        let sigs = pipe.signals();
        assert!(sigs.dmem_req_valid && !sigs.dmem_req_write);
        assert_eq!(sigs.dmem_req_addr, 3);
        assert!(!sigs.imem_req_valid);
        pipe.step();
        let sigs = pipe.signals();
        assert_eq!((sigs.result.areg, sigs.result.value), (0x5a, 0x5a));
        assert!(sigs.imem_req_valid);
        assert_eq!(sigs.imem_req_addr, 1);
    }

    #[test]
    fn test_reset_twice() {
        let mut pipe = sim(&[(Opcode::LDAC, 7), (Opcode::PFIX, 1), (Opcode::LDAM, 3)]);
        for _ in 0..4 {
            pipe.step();
        }
        pipe.set_reset(true);
        pipe.step();
        let once = pipe.state().clone();
        assert!(!pipe.signals().imem_req_valid);
        pipe.step();
        assert_eq!(&once, pipe.state());
        assert_eq!(once, PipeRegs::default());
        pipe.set_reset(false);
        pipe.step();
        assert_eq!(pipe.signals().imem_req_addr, 0);
    }
}

//! This module contains utilities for verifying the correctness of an
//! architecture's implementation against the reference model.

pub mod diff;

use anyhow::Context;

use crate::{
    architectures::{arch_names, create_sim},
    framework::{clock, CpuSim},
    isa::TraceRecord,
    model::Hex8Model,
    object::Program,
    tracer::Hex8Tracer,
};

/// Options of a hardware run.
#[derive(Debug, Clone)]
pub struct SimOption {
    /// Give up once this many cycles passed without enough retired
    /// instructions.
    pub max_cycles: u64,
    /// Number of cycles the reset is held before the run.
    pub reset_cycles: u64,
}

impl Default for SimOption {
    fn default() -> Self {
        Self {
            max_cycles: 100_000,
            reset_cycles: 2,
        }
    }
}

impl SimOption {
    pub fn set_max_cycles(mut self, max_cycles: u64) -> Self {
        self.max_cycles = max_cycles;
        self
    }

    pub fn set_reset_cycles(mut self, reset_cycles: u64) -> Self {
        self.reset_cycles = reset_cycles;
        self
    }
}

pub struct SimTester {
    arch: String,
    option: SimOption,
}

impl SimTester {
    pub fn new(arch: &str) -> Option<Self> {
        if arch_names().iter().any(|&a| a == arch) {
            Some(Self {
                arch: arch.into(),
                option: SimOption::default(),
            })
        } else {
            None
        }
    }

    pub fn with_option(mut self, option: SimOption) -> Self {
        self.option = option;
        self
    }

    pub fn arch(&self) -> &str {
        &self.arch
    }

    /// Run `program` on the hardware until `n` instructions retired, as seen
    /// by a [`Hex8Tracer`] sampling every cycle.
    pub fn trace_arch(
        &self,
        program: &Program,
        n: usize,
    ) -> anyhow::Result<(Vec<TraceRecord>, Box<dyn CpuSim>)> {
        let mut sim = create_sim(&self.arch, program.imem, program.dmem)?;
        let mut tracer = Hex8Tracer::new();
        sim.set_reset(true);
        for _ in 0..self.option.reset_cycles {
            sim.step();
            tracer.sample(sim.signals(), |_| {});
        }
        sim.set_reset(false);

        let records: Vec<_> = tracer
            .into_stream(clock(&mut *sim).take(self.option.max_cycles as usize))
            .take(n)
            .collect();
        tracing::debug!(
            "{}: {} records in {} cycles",
            self.arch,
            records.len(),
            sim.cycle_count()
        );
        if records.len() < n {
            anyhow::bail!(
                "exceed maximum CPU cycle limit: {} of {} instructions retired in {} cycles",
                records.len(),
                n,
                self.option.max_cycles
            );
        }
        Ok((records, sim))
    }

    /// Step a fresh reference model `n` times.
    pub fn trace_model(program: &Program, n: usize) -> (Vec<TraceRecord>, Hex8Model) {
        let mut model = Hex8Model::with_memory(program.imem, program.dmem);
        let records = model.run(n);
        (records, model)
    }

    /// Compare the first `n` retired instructions of the hardware with the
    /// reference model, then the data memories.
    pub fn test_program(&self, program: &Program, n: usize) -> anyhow::Result<()> {
        let (gt, model) = Self::trace_model(program, n);
        let (records, sim) = self.trace_arch(program, n)?;
        diff::compare_traces(&gt, &records).with_context(|| format!("arch {}", self.arch))?;

        let sim_dmem = sim.dmem();
        if model.dmem() != &sim_dmem {
            crate::utils::mem_diff(model.dmem(), &sim_dmem);
            anyhow::bail!("arch {}: memory mismatch", self.arch);
        }
        Ok(())
    }

    /// Assemble `src` and test its first `n` instructions.
    pub fn test_source(&self, src: &str, n: usize) -> anyhow::Result<()> {
        let obj = make_obj(src).context("assemble")?;
        self.test_program(&obj.obj, n)
    }
}

fn make_obj(src: &str) -> anyhow::Result<crate::ObjectExt> {
    let obj = crate::assemble(src, crate::AssembleOption::default().set_verbose(false))?;

    Ok(obj)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asm::tests::COUNTDOWN_H8;

    #[test]
    fn test_unknown_arch() {
        assert!(SimTester::new("pipe_full").is_none());
        assert_eq!(SimTester::new("seq_std").unwrap().arch(), "seq_std");
    }

    #[test]
    fn test_countdown() -> anyhow::Result<()> {
        for arch in arch_names() {
            let tester = SimTester::new(arch).unwrap();
            tester.test_source(COUNTDOWN_H8, 30)?;
        }
        Ok(())
    }

    #[test]
    fn test_cycle_limit() {
        let tester = SimTester::new("seq_std")
            .unwrap()
            .with_option(SimOption::default().set_max_cycles(10));
        let err = tester
            .trace_arch(&Program::default(), 10)
            .err()
            .unwrap();
        assert!(err.to_string().contains("cycle limit"));
    }

    #[test]
    fn test_no_reset_cycles() -> anyhow::Result<()> {
        let tester = SimTester::new("pipe_std")
            .unwrap()
            .with_option(SimOption::default().set_reset_cycles(0));
        tester.test_source(COUNTDOWN_H8, 12)
    }
}

pub mod architectures;
mod asm;
pub mod framework;
pub mod isa;
mod model;
pub mod object;
pub mod test;
mod tracer;
mod utils;

pub use asm::assemble;
pub use asm::AssembleOption;
pub use isa::{Inst, MemOp, Opcode, TraceRecord};
pub use model::Hex8Model;
pub use object::ObjectExt;
pub use tracer::{Hex8Tracer, TraceStream};
pub use utils::{mem_diff, mem_print};

#[cfg(test)]
mod tests {
    use crate::{assemble, AssembleOption, Hex8Model, Hex8Tracer};

    #[test]
    fn test_assemble() {
        let r = assemble(crate::asm::tests::COUNTDOWN_H8, AssembleOption::default()).unwrap();
        eprintln!("{}", r);
        assert!(r.source.iter().any(|s| s.label.as_deref() == Some("done")));
    }

    /// The model and a sampled pipeline agree without going through the
    /// test harness.
    #[test]
    fn test_trace_by_hand() {
        let r = assemble(crate::asm::tests::COUNTDOWN_H8, AssembleOption::default()).unwrap();
        let mut model = Hex8Model::with_memory(r.obj.imem, r.obj.dmem);
        let mut sim = crate::architectures::create_sim("pipe_std", r.obj.imem, r.obj.dmem).unwrap();
        let mut tracer = Hex8Tracer::new();
        let mut records = Vec::new();
        while records.len() < 20 {
            sim.step();
            tracer.sample(sim.signals(), |rec| records.push(rec));
        }
        for rec in &records {
            assert_eq!(*rec, model.step());
        }
        assert_eq!(model.dmem(), &sim.dmem());
    }
}

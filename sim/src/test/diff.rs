//! Test the architecture by comparing its trace with the "ground truth" of
//! the reference model.

use crate::isa::TraceRecord;

/// Name of the first field where two records disagree.
pub fn first_mismatch(gt: &TraceRecord, sim: &TraceRecord) -> Option<&'static str> {
    macro_rules! check {
        ($( $field:ident ),*) => {
            $( if gt.$field != sim.$field {
                return Some(stringify!($field));
            } )*
        };
    }
    check!(pc, inst, areg, breg, memory, address, data);
    None
}

/// Compare two record streams in program order. Fails on the first
/// mismatching record, or when one stream is shorter.
pub fn compare_traces(gt: &[TraceRecord], sim: &[TraceRecord]) -> anyhow::Result<()> {
    for (i, (g, s)) in gt.iter().zip(sim).enumerate() {
        if let Some(field) = first_mismatch(g, s) {
            tracing::warn!("record {}: {} mismatch", i, field);
            anyhow::bail!(
                "record {}: {} mismatch\n   model: {:?}\n     sim: {:?}",
                i,
                field,
                g,
                s
            );
        }
    }
    if gt.len() != sim.len() {
        anyhow::bail!(
            "trace length mismatch: model = {}, sim = {}",
            gt.len(),
            sim.len()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::isa::{Inst, MemOp, Opcode};

    #[test]
    fn test_compare() {
        let rec = TraceRecord {
            pc: 3,
            inst: Inst::new(Opcode::LDAI, 2),
            areg: 0x10,
            memory: MemOp::Load,
            address: 2,
            data: 0x10,
            ..Default::default()
        };
        let hw = TraceRecord {
            address: 0x12,
            ..rec
        };
        assert!(compare_traces(&[rec, rec], &[rec, rec]).is_ok());
        assert_eq!(first_mismatch(&rec, &hw), Some("address"));

        let err = compare_traces(&[rec, rec], &[rec, hw]).unwrap_err();
        assert!(err.to_string().starts_with("record 1: address mismatch"));
        let err = compare_traces(&[rec, rec], &[rec]).unwrap_err();
        assert!(err.to_string().contains("length"));
    }
}

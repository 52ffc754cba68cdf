//! Rebuild the retired-instruction stream of a two-stage hex8 pipeline from
//! its interface signals.
//!
//! The tracer is fed one [`Signals`] sample per clock edge. An instruction
//! is fetched on one edge, executes on the next, and a load completes one
//! edge later since the data memory response is registered. Stores and all
//! other instructions are emitted as soon as they execute, loads are held
//! back until their data is visible.

use std::collections::VecDeque;

use crate::{
    framework::Signals,
    isa::{Inst, MemOp, TraceRecord},
};

#[derive(Debug, Default)]
pub struct Hex8Tracer {
    /// Instruction whose fetch was requested on the previous edge.
    fetch: Option<TraceRecord>,
    /// Load waiting for its data.
    execute: Option<TraceRecord>,
    n_retired: u64,
}

impl Hex8Tracer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records emitted so far.
    pub fn n_retired(&self) -> u64 {
        self.n_retired
    }

    /// No instruction is in flight.
    pub fn is_idle(&self) -> bool {
        self.fetch.is_none() && self.execute.is_none()
    }

    /// Sample the signals of one clock edge. Every record that retires on
    /// this edge is passed to `capture`, in program order.
    pub fn sample(&mut self, sigs: &Signals, mut capture: impl FnMut(TraceRecord)) {
        if sigs.rst {
            self.fetch = None;
            self.execute = None;
            return;
        }

        // a load issued on the previous edge has its data now
        if let Some(mut rec) = self.execute.take() {
            rec.areg = sigs.result.areg;
            rec.breg = sigs.result.breg;
            rec.data = sigs.result.value;
            self.emit(rec, &mut capture);
        }

        if let Some(mut rec) = self.fetch.take() {
            rec.inst = Inst::decode(sigs.imem_rsp_data);
            rec.areg = sigs.result.areg;
            rec.breg = sigs.result.breg;
            if sigs.dmem_req_valid {
                rec.address = sigs.dmem_req_addr;
                if sigs.dmem_req_write {
                    rec.memory = MemOp::Store;
                    rec.data = sigs.dmem_req_data;
                } else {
                    rec.memory = MemOp::Load;
                }
            }
            if rec.memory == MemOp::Load {
                self.execute = Some(rec);
            } else {
                self.emit(rec, &mut capture);
            }
        }

        if sigs.imem_req_valid {
            self.fetch = Some(TraceRecord {
                pc: sigs.imem_req_addr,
                ..Default::default()
            });
        }
    }

    fn emit(&mut self, rec: TraceRecord, capture: &mut impl FnMut(TraceRecord)) {
        tracing::trace!("retire #{}: {}", self.n_retired, rec);
        self.n_retired += 1;
        capture(rec);
    }

    /// Turn a stream of per-edge samples into a stream of trace records.
    /// The returned iterator is lazy and consumes the tracer.
    pub fn into_stream<I>(self, samples: I) -> TraceStream<I>
    where
        I: Iterator<Item = Signals>,
    {
        TraceStream {
            tracer: self,
            samples,
            pending: VecDeque::new(),
        }
    }
}

/// Lazy sequence of the records retired by a sampled pipeline. Ends when the
/// samples end.
pub struct TraceStream<I> {
    tracer: Hex8Tracer,
    samples: I,
    pending: VecDeque<TraceRecord>,
}

impl<I: Iterator<Item = Signals>> Iterator for TraceStream<I> {
    type Item = TraceRecord;

    fn next(&mut self) -> Option<TraceRecord> {
        while self.pending.is_empty() {
            let sigs = self.samples.next()?;
            let pending = &mut self.pending;
            self.tracer.sample(&sigs, |rec| pending.push_back(rec));
        }
        self.pending.pop_front()
    }
}

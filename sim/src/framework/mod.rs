//! To compare different implementations of the hex8 core against the same
//! reference, we give a general cycle-level simulator framework.
//!
//! Every architecture drives the same memory interface, described by
//! [`Signals`]. This is all the pipeline tracer gets to see.

use crate::isa::MemImage;

/// Register values committed during a cycle, together with the registered
/// data memory response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CommitResult {
    pub areg: u8,
    pub breg: u8,
    /// Data returned by the data memory for the request of the previous
    /// cycle.
    pub value: u8,
}

/// Interface signals of a hex8 core, sampled once per clock edge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Signals {
    /// Synchronous reset.
    pub rst: bool,
    pub imem_req_valid: bool,
    pub imem_req_addr: u8,
    /// Instruction word requested on the previous cycle.
    pub imem_rsp_data: u8,
    pub dmem_req_valid: bool,
    pub dmem_req_write: bool,
    /// Effective address of the access.
    pub dmem_req_addr: u8,
    pub dmem_req_data: u8,
    pub result: CommitResult,
}

/// The memories and other stateful devices around the core.
pub trait HardwareUnits {
    /// A set of hardware units should be initialized from the given memories.
    fn init(imem: MemImage, dmem: MemImage) -> Self;
    /// Clock edge: the memories serve the requests in `sigs`. Responses are
    /// visible from the next cycle on.
    fn clock(&mut self, sigs: &Signals);
    /// Current data memory content.
    fn dmem(&self) -> MemImage;
}

pub trait CpuArch {
    /// Pipeline registers (flip-flops) of this architecture. The default
    /// value is the state right after reset.
    type StageState: Default + Clone + PartialEq + std::fmt::Debug;
    type Units: HardwareUnits;

    const NAME: &'static str;

    /// Combinational logic of one cycle: from the current pipeline registers
    /// and unit outputs, drive the interface signals and compute the
    /// pipeline registers of the next cycle.
    fn propagate(cur: &Self::StageState, units: &Self::Units, sigs: &mut Signals)
        -> Self::StageState;

    /// Address of the instruction the core works on.
    fn program_counter(state: &Self::StageState) -> u8;

    /// (name, value) of the architectural registers.
    fn registers(state: &Self::StageState) -> Vec<(&'static str, u8)>;
}

/// During a CPU cycle, signals in stage registers are propagated through
/// the combinational logic circuits. The signals are then latched into the
/// pipeline registers at the end of the cycle. Therefore we can use two
/// basic operations to simulate the pipeline.
pub trait CpuSim {
    /// Drive the reset input for the following cycles.
    fn set_reset(&mut self, rst: bool);

    /// Initiate the next cycle or the first cycle. This function should be
    /// called at the very beginning of the simulation, or after calling
    /// [`CpuSim::propagate_signals`]. Otherwise the behavior is undefined.
    fn initiate_next_cycle(&mut self);

    /// Propagate signals through the combinational logic circuits and clock
    /// the hardware units. This function should be called after
    /// [`CpuSim::initiate_next_cycle`]. Otherwise the behavior is undefined.
    fn propagate_signals(&mut self);

    /// Simulate one cycle.
    fn step(&mut self) {
        self.initiate_next_cycle();
        self.propagate_signals();
    }

    /// Interface signals of the last simulated cycle.
    fn signals(&self) -> &Signals;

    fn cycle_count(&self) -> u64;

    fn program_counter(&self) -> u8;

    fn registers(&self) -> Vec<(&'static str, u8)>;

    fn dmem(&self) -> MemImage;

    fn arch_name(&self) -> &'static str;
}

/// Clock `sim` forever, yielding the signals of every cycle.
pub fn clock(sim: &mut dyn CpuSim) -> impl Iterator<Item = Signals> + '_ {
    std::iter::from_fn(move || {
        sim.step();
        Some(sim.signals().clone())
    })
}

/// Pipeline simulator.
///
/// - Combinational logic: from `cur_state`, through the units' outputs, to
///   `nex_state` and the interface signals.
/// - Clock tick: `nex_state` becomes `cur_state`.
pub struct PipeSim<T: CpuArch> {
    pub(crate) cur_state: T::StageState,
    pub(crate) nex_state: T::StageState,
    pub(crate) units: T::Units,
    pub(crate) signals: Signals,
    pub(crate) rst: bool,
    pub(crate) cycle_count: u64,
}

impl<T: CpuArch> PipeSim<T> {
    /// Initialize the simulator with given memories.
    pub fn new(imem: MemImage, dmem: MemImage) -> Self {
        Self {
            cur_state: T::StageState::default(),
            nex_state: T::StageState::default(),
            units: T::Units::init(imem, dmem),
            signals: Signals::default(),
            rst: false,
            cycle_count: 0,
        }
    }

    /// Pipeline registers at the end of the last simulated cycle.
    pub fn state(&self) -> &T::StageState {
        &self.nex_state
    }
}

impl<T: CpuArch> CpuSim for PipeSim<T> {
    fn set_reset(&mut self, rst: bool) {
        self.rst = rst;
    }

    fn initiate_next_cycle(&mut self) {
        self.cur_state = self.nex_state.clone();
        self.cycle_count += 1;
    }

    fn propagate_signals(&mut self) {
        let mut sigs = Signals {
            rst: self.rst,
            ..Default::default()
        };
        self.nex_state = if self.rst {
            tracing::debug!("{}: reset in cycle {}", T::NAME, self.cycle_count);
            T::StageState::default()
        } else {
            T::propagate(&self.cur_state, &self.units, &mut sigs)
        };
        // memories are triggered at the end of the cycle
        self.units.clock(&sigs);
        self.signals = sigs;
    }

    fn signals(&self) -> &Signals {
        &self.signals
    }

    fn cycle_count(&self) -> u64 {
        self.cycle_count
    }

    fn program_counter(&self) -> u8 {
        T::program_counter(&self.nex_state)
    }

    fn registers(&self) -> Vec<(&'static str, u8)> {
        T::registers(&self.nex_state)
    }

    fn dmem(&self) -> MemImage {
        self.units.dmem()
    }

    fn arch_name(&self) -> &'static str {
        T::NAME
    }
}

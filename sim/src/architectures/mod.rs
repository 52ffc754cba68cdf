// Hardware units shared by all architectures
pub mod hardware;

pub mod pipe_std;
pub mod seq_std;

use crate::{
    framework::{CpuArch, CpuSim, PipeSim},
    isa::MemImage,
};

/// Get all architecture names
pub fn arch_names() -> Vec<&'static str> {
    vec![seq_std::Arch::NAME, pipe_std::Arch::NAME]
}

/// Create a simulator of architecture `kind` with the given memory content.
pub fn create_sim(kind: &str, imem: MemImage, dmem: MemImage) -> anyhow::Result<Box<dyn CpuSim>> {
    tracing::debug!("creating simulator: {}", kind);
    Ok(match kind {
        seq_std::Arch::NAME => Box::new(PipeSim::<seq_std::Arch>::new(imem, dmem)),
        pipe_std::Arch::NAME => Box::new(PipeSim::<pipe_std::Arch>::new(imem, dmem)),
        _ => anyhow::bail!(
            "unknown architecture `{}`, available: {}",
            kind,
            arch_names().join(", ")
        ),
    })
}

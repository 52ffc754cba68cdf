// Compare every architecture against the reference model

use std::io::Write;

use hex8_sim::{
    architectures::arch_names,
    object::Program,
    test::{SimOption, SimTester},
    Hex8Model, MemOp, Opcode,
};
use proptest::prelude::*;

const FIB_H8: &str = r#"
# fibonacci numbers: fib(n-1) at 0, fib(n) at 1
    ldac 1
    stam 0
    stam 1
loop:
    ldam 0
    ldbm 1
    add
    stam 2
    ldam 1
    stam 0
    ldam 2
    stam 1      # fib(n)
    brn done    # overflow into bit 7
    pfix 0xf
    br 0x6      # loop
done:
    br 0
"#;

fn testers() -> Vec<SimTester> {
    arch_names().into_iter().filter_map(SimTester::new).collect()
}

#[test]
fn test_fibonacci() -> anyhow::Result<()> {
    for tester in testers() {
        tester.test_source(FIB_H8, 150)?;
    }
    Ok(())
}

#[test]
fn test_model_runs_fibonacci() -> anyhow::Result<()> {
    let obj = hex8_sim::assemble(FIB_H8, hex8_sim::AssembleOption::default())?;
    let mut model = Hex8Model::with_memory(obj.obj.imem, obj.obj.dmem);
    let records = model.run(150);
    let stores = records
        .iter()
        .filter(|r| r.memory == MemOp::Store && r.address == 1)
        .map(|r| r.data)
        .collect::<Vec<_>>();
    assert_eq!(&stores[..8], &[1, 2, 3, 5, 8, 13, 21, 34]);
    // stuck at `done`
    assert_eq!(records.last().map(|r| r.inst.op), Some(Opcode::BR));
    Ok(())
}

#[test]
fn test_long_reset() -> anyhow::Result<()> {
    for tester in testers() {
        let tester = tester.with_option(SimOption::default().set_reset_cycles(7));
        tester.test_source(FIB_H8, 40)?;
    }
    Ok(())
}

#[test]
fn test_source_file() -> anyhow::Result<()> {
    let mut file = tempfile::NamedTempFile::new()?;
    file.write_all(FIB_H8.as_bytes())?;
    let content = std::fs::read_to_string(file.path())?;
    for tester in testers() {
        tester.test_source(&content, 20)?;
    }
    Ok(())
}

/// Indexed opcodes report their offset in the model and their effective
/// address in hardware, so random programs avoid them.
fn program_word() -> impl Strategy<Value = u8> {
    any::<u8>().prop_map(|w| match Opcode::from_bits(w >> 4) {
        Opcode::LDAI | Opcode::LDBI | Opcode::STAI => w & 0x0f | (Opcode::ADD as u8) << 4,
        _ => w,
    })
}

proptest! {
    #[test]
    fn random_programs_match(
        words in prop::collection::vec(program_word(), 1..48),
        data in prop::collection::vec(any::<u8>(), 16),
    ) {
        let mut program = Program::from_words(&words);
        program.dmem[..16].copy_from_slice(&data);
        for tester in testers() {
            let r = tester.test_program(&program, 64);
            prop_assert!(r.is_ok(), "{}: {:#}", tester.arch(), r.unwrap_err());
        }
    }
}

use anyhow::{Context, Result};
use binutils::{clap, verbose};
use clap::Parser;
use hex8_sim::{
    architectures::arch_names,
    assemble, mem_diff, mem_print,
    test::{SimOption, SimTester},
    AssembleOption, TraceRecord,
};

/// hex8 reference model and pipeline simulator written in rust
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about,
    long_about = None,
    styles = binutils::get_styles(),
    arg_required_else_help = true,
)]
struct Args {
    /// Path to the input .h8 file
    input: String,

    /// Run the program on a hardware architecture instead of the reference
    /// model
    #[arg(short, long)]
    arch: Option<String>,

    /// Number of instructions to retire
    #[arg(short = 'n', long, default_value_t = 64)]
    steps: usize,

    /// Maximum number of hardware cycles
    #[arg(long, default_value_t = 100_000)]
    max_cycles: u64,

    /// Compare the hardware trace with the reference model. Without `--arch`
    /// every architecture is verified
    #[arg(long)]
    verify: bool,

    /// Print every retired instruction
    #[arg(long)]
    trace: bool,

    /// Dump the final data memory
    #[arg(long)]
    dump: bool,

    /// Write logs to this file in JSON format
    #[arg(long)]
    log: Option<String>,

    #[command(flatten)]
    verbose: verbose::Verbosity,
}

fn print_trace(records: &[TraceRecord]) {
    for (i, rec) in records.iter().enumerate() {
        println!("{:>5} {}", i, rec);
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let content = std::fs::read_to_string(&args.input)
        .with_context(|| format!("could not read file `{}`", &args.input))?;

    let verbose_asm = args
        .verbose
        .log_level()
        .is_some_and(|lv| lv >= verbose::Level::Trace);

    let log_level = binutils::verbose_level_to_trace(args.verbose.log_level());
    let log_file = match &args.log {
        Some(path) => Some(
            std::fs::File::create(path)
                .with_context(|| format!("could not create log file `{}`", path))?,
        ),
        None => None,
    };
    binutils::logging_setup(log_level, log_file.as_ref());

    let obj = assemble(&content, AssembleOption::default().set_verbose(verbose_asm))?;
    let program = &obj.obj;
    let option = SimOption::default().set_max_cycles(args.max_cycles);

    if args.verify {
        let archs = match &args.arch {
            Some(arch) => vec![arch.as_str()],
            None => arch_names(),
        };
        for arch in archs {
            let tester = SimTester::new(arch)
                .with_context(|| format!("unknown architecture `{}`", arch))?
                .with_option(option.clone());
            tester.test_program(program, args.steps)?;
            println!("{}: {} instructions match", arch, args.steps);
        }
        return Ok(());
    }

    if let Some(arch) = &args.arch {
        let tester = SimTester::new(arch)
            .with_context(|| {
                format!(
                    "unknown architecture `{}`, available: {}",
                    arch,
                    arch_names().join(", ")
                )
            })?
            .with_option(option);
        let (records, sim) = tester.trace_arch(program, args.steps)?;
        if args.trace {
            print_trace(&records);
        }
        println!("{} cycles", sim.cycle_count());
        for (name, val) in sim.registers() {
            println!("{:>4} = {:#04x}", name, val);
        }
        mem_diff(&program.dmem, &sim.dmem());
        if args.dump {
            mem_print(&sim.dmem());
        }
    } else {
        let (records, model) = SimTester::trace_model(program, args.steps);
        if args.trace {
            print_trace(&records);
        }
        println!("  pc = {:#04x}", model.pc());
        println!("   a = {:#04x}", model.areg());
        println!("   b = {:#04x}", model.breg());
        mem_diff(&program.dmem, model.dmem());
        if args.dump {
            mem_print(model.dmem());
        }
    }
    Ok(())
}

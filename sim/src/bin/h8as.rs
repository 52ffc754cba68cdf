use anyhow::{Context, Result};
use binutils::{clap, verbose};
use clap::Parser;
use hex8_sim::{assemble, AssembleOption};

/// hex8 assembler written in Rust.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    long_about = None,
    styles = binutils::get_styles(),
    arg_required_else_help = true,
)]
struct Args {
    /// Path to the input .h8 file
    input: String,

    /// Output filename (default is input%.h8o)
    #[arg(short = 'o', long)]
    output: Option<String>,

    /// Print logs during assembling
    #[command(flatten)]
    verbose: verbose::Verbosity,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let verbose_asm = args
        .verbose
        .log_level()
        .is_some_and(|lv| lv >= verbose::Level::Trace);
    let log_level = binutils::verbose_level_to_trace(args.verbose.log_level());
    binutils::logging_setup(log_level, None::<&std::fs::File>);

    let content = std::fs::read_to_string(&args.input)
        .with_context(|| format!("could not read file `{}`", &args.input))?;
    let obj = assemble(&content, AssembleOption::default().set_verbose(verbose_asm))?;

    let output_path = match args.output {
        Some(path) => path,
        None => {
            let mut path = std::path::PathBuf::from(&args.input);
            path.set_extension("h8o");
            path.to_string_lossy().to_string()
        }
    };
    std::fs::write(&output_path, format!("{}", obj))
        .with_context(|| format!("could not write file `{}`", &output_path))?;
    println!("writing to file `{}`", &output_path);
    Ok(())
}

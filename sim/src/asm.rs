//! This module provides parsing utilities for the hex8 assembly.
use anyhow::{Context, Result};

use pest::Parser;
use pest_derive::Parser;

use crate::{
    isa::{Opcode, MEM_SIZE},
    object::{Imm, ObjectExt, Program, SourceInfo},
    utils::parse_literal,
};

#[derive(Parser)]
#[grammar = "src/grammar.pest"] // relative to the crate root
pub struct Hex8AsmParser;

pub fn parse(src: &str) -> Result<pest::iterators::Pairs<'_, Rule>> {
    let mut main = Hex8AsmParser::parse(Rule::main, src).context("fail to parse hex8 source")?;
    Ok(main
        .next()
        .context("empty parse tree")?
        .into_inner())
}

#[derive(Default)]
pub struct AssembleOption {
    verbose: bool,
}

impl AssembleOption {
    pub fn set_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

fn parse_num(pair: Option<pest::iterators::Pair<'_, Rule>>, max: u64, what: &str) -> Result<u8> {
    let s = pair.map(|p| p.as_str()).unwrap_or("0");
    let n = parse_literal(s).with_context(|| format!("invalid number `{}`", s))?;
    anyhow::ensure!(n <= max, "{} {} out of range 0..={}", what, s, max);
    Ok(n as u8)
}

/// Address of the next word, which must lie in the instruction memory.
fn here(cur_addr: usize) -> Result<u8> {
    anyhow::ensure!(
        cur_addr < MEM_SIZE,
        "address {:#x} is beyond the instruction memory",
        cur_addr
    );
    Ok(cur_addr as u8)
}

/// Fill `info` with one label or statement and advance the cursor.
fn parse_stmt(
    pair: pest::iterators::Pair<'_, Rule>,
    info: &mut SourceInfo,
    cur_addr: &mut usize,
) -> Result<()> {
    let rule = pair.as_rule();
    let mut it = pair.into_inner();
    match rule {
        Rule::label => {
            let name = it.next().map(|p| p.as_str()).unwrap_or_default();
            info.label = Some(name.to_string());
            info.addr = Some(here(*cur_addr)?);
        }
        Rule::inst => {
            let name = it.next().map(|p| p.as_str()).unwrap_or_default();
            let op = Opcode::from_name(name)
                .with_context(|| format!("unknown instruction `{}`", name))?;
            // a missing operand is 0
            let imm = match it.next().and_then(|p| p.into_inner().next()) {
                Some(p) if p.as_rule() == Rule::ident => Imm::Label(p.as_str().to_string()),
                p => Imm::Num(parse_num(p, 0xf, "immediate")?),
            };
            info.addr = Some(here(*cur_addr)?);
            info.inst = Some((op, imm));
            *cur_addr += 1;
        }
        Rule::d_pos => {
            *cur_addr = parse_num(it.next(), 0xff, "position")? as usize;
            info.addr = Some(*cur_addr as u8); // override
        }
        Rule::d_byte => {
            info.addr = Some(here(*cur_addr)?);
            info.word = Some(parse_num(it.next(), 0xff, "byte")?);
            *cur_addr += 1;
        }
        Rule::d_data => {
            let addr = parse_num(it.next(), 0xff, "address")?;
            let val = parse_num(it.next(), 0xff, "data")?;
            info.data = Some((addr, val));
        }
        _ => anyhow::bail!("unexpected {:?}", rule),
    }
    Ok(())
}

/// transform assembly code to binary object code
pub fn assemble(src: &str, option: AssembleOption) -> Result<ObjectExt> {
    macro_rules! verbo {
        ($e:expr) => {
            if option.verbose {
                tracing::debug!("{:?}", $e);
            }
        };
    }
    let mut src_infos = Vec::default();
    let lines = parse(src).context("fail to assemble hex8 source")?;
    let mut cur_addr = 0usize;

    for line in lines.filter(|l| l.as_rule() == Rule::line) {
        let mut src_info = SourceInfo {
            src: line.as_str().to_string(),
            line: line.as_span().start_pos().line_col().0,
            ..Default::default()
        };
        for pair in line.into_inner() {
            verbo!(&pair);
            parse_stmt(pair, &mut src_info, &mut cur_addr)
                .with_context(|| format!("line {}: `{}`", src_info.line, src_info.src.trim()))?;
        }
        verbo!(&src_info);
        src_infos.push(src_info);
    }

    let mut obj = Program::default();
    for info in &src_infos {
        if let (Some(label), Some(addr)) = (&info.label, info.addr) {
            if obj.symbols.insert(label.clone(), addr).is_some() {
                anyhow::bail!("line {}: duplicated label `{}`", info.line, label);
            }
        }
    }
    verbo!(&obj.symbols);

    for it in &src_infos {
        it.write_object(&mut obj)?;
    }

    Ok(ObjectExt {
        obj,
        source: src_infos,
    })
}

use ansi_term::{Colour, Style};

use crate::isa::{MemImage, MEM_SIZE};

pub fn gray() -> Style {
    Colour::Fixed(8).normal()
}

pub fn grn() -> Style {
    Colour::Green.normal()
}

pub fn grnb() -> Style {
    Colour::Green.bold()
}

pub fn ylw() -> Style {
    Colour::Yellow.normal()
}

/// Parse numeric literal from string in hex8 source file
pub fn parse_literal(s: &str) -> Option<u64> {
    if let Ok(r) = s.parse() {
        return Some(r);
    }
    let hex = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X"))?;
    u64::from_str_radix(hex, 16).ok()
}

/// Zero bytes are dimmed so that written values stand out.
pub fn format_byte(val: u8) -> String {
    if val == 0 {
        gray().paint(format!("{:#04x}", val)).to_string()
    } else {
        format!("{:#04x}", val)
    }
}

/// Print the bytes that differ between two memory images, 16 bytes a row.
pub fn mem_diff(left: &MemImage, right: &MemImage) {
    for row in 0..MEM_SIZE >> 4 {
        let range = (row << 4)..((row + 1) << 4);
        if left[range.clone()] != right[range.clone()] {
            print!("{:#04x}: ", row << 4);
            for byte in &left[range.clone()] {
                print!("{:02x}", *byte)
            }
            print!(" -> ");
            for (l, r) in left[range.clone()].iter().zip(&right[range]) {
                if l != r {
                    print!("{}", ylw().paint(format!("{:02x}", r)))
                } else {
                    print!("{:02x}", r)
                }
            }
            println!()
        }
    }
}

/// Print the memory image up to its last non-zero row.
pub fn mem_print(bin: &MemImage) {
    let Some(last) = bin.iter().rposition(|b| *b != 0) else {
        return;
    };
    for row in 0..=(last >> 4) {
        print!("{:#04x}: ", row << 4);
        for byte in &bin[(row << 4)..((row + 1) << 4)] {
            print!("{:02x}", *byte)
        }
        println!()
    }
}

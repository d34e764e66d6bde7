use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use dotboy::{RunOptions, DEFAULT_TICKS};
use dotboy_core::{Address, Breakpoint};

const USAGE: &str =
    "usage: dotboy <rom> [--ticks N] [--break-pc HEX]... [--break-op HEX]... [--trace]";

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let mut rom = None;
    let mut ticks = DEFAULT_TICKS;
    let mut breakpoints = Vec::new();
    let mut trace = false;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--ticks" => {
                let value = args.next().context("--ticks needs a value")?;
                ticks = value
                    .parse()
                    .with_context(|| format!("invalid tick count '{value}'"))?;
            }
            "--break-pc" => {
                let value = args.next().context("--break-pc needs an address")?;
                breakpoints.push(Breakpoint::Pc(parse_address(&value)?));
            }
            "--break-op" => {
                let value = args.next().context("--break-op needs an opcode")?;
                let opcode = u8::from_str_radix(strip_hex_prefix(&value), 16)
                    .with_context(|| format!("invalid opcode '{value}'"))?;
                breakpoints.push(Breakpoint::Opcode(opcode));
            }
            "--trace" => trace = true,
            "-h" | "--help" => {
                println!("{USAGE}");
                return Ok(());
            }
            other if other.starts_with('-') => bail!("unknown option '{other}'\n{USAGE}"),
            other => {
                if rom.is_some() {
                    bail!("more than one ROM given\n{USAGE}");
                }
                rom = Some(PathBuf::from(other));
            }
        }
    }

    init_logger(trace);

    let Some(rom) = rom else {
        bail!("no ROM path provided\n{USAGE}");
    };

    let options = RunOptions::builder()
        .rom(rom)
        .ticks(ticks)
        .breakpoints(breakpoints)
        .build();
    dotboy::run(options)?;
    Ok(())
}

/// `--trace` turns on the per-instruction log of the core on top of
/// whatever `RUST_LOG` asks for.
fn init_logger(trace: bool) {
    let mut builder = env_logger::Builder::from_default_env();
    if trace {
        builder.filter_module("dotboy_core", log::LevelFilter::Trace);
    }
    builder.init();
}

fn strip_hex_prefix(value: &str) -> &str {
    value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .or_else(|| value.strip_prefix('$'))
        .unwrap_or(value)
}

fn parse_address(value: &str) -> Result<u16> {
    let raw = i64::from_str_radix(strip_hex_prefix(value), 16)
        .with_context(|| format!("invalid address '{value}'"))?;
    let addr = Address::try_from(raw).with_context(|| format!("invalid address '{value}'"))?;
    Ok(addr.get())
}

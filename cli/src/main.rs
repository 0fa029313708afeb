use std::path::PathBuf;

use clap::Parser;
use serde::Serialize;
use tracing::{event, Level};
use tracing_subscriber::prelude::*;

use base::prelude::*;
use cpu::{
    read_word, step, Clock, CycleClock, FlatMemory, MemoryConfiguration, RegisterFile,
    DEFAULT_FREQUENCY_HZ, MIN_MEMORY_SIZE, RESET_VECTOR,
};

/// Accepts decimal, or hexadecimal with a `0x` prefix or `h` suffix.
fn parse_number(s: &str) -> Result<u32, String> {
    let (digits, radix) = if let Some(hex) = s.strip_prefix("0x").or(s.strip_prefix("0X")) {
        (hex, 16)
    } else if let Some(hex) = s.strip_suffix('h').or(s.strip_suffix('H')) {
        (hex, 16)
    } else {
        (s, 10)
    };
    u32::from_str_radix(digits, radix).map_err(|e| format!("{s}: {e}"))
}

fn parse_address(s: &str) -> Result<Address, String> {
    let n = parse_number(s)?;
    Address::try_from(n).map_err(|e| format!("{s}: {e}"))
}

/// Run a raw MSP430X binary image.
#[derive(Parser, Debug)]
#[command(name = "msp430-run", version)]
struct CliArgs {
    /// File containing the raw memory image.
    image: PathBuf,

    /// Address at which to load the image.
    #[arg(long, default_value = "0", value_parser = parse_address)]
    load_address: Address,

    /// Start executing here instead of at the address in the reset vector.
    #[arg(long, value_parser = parse_address)]
    entry: Option<Address>,

    /// Initial value of SP.
    #[arg(long, value_parser = parse_address)]
    stack_pointer: Option<Address>,

    /// Memory size in bytes (64 KiB to 1 MiB).
    #[arg(long, default_value_t = MIN_MEMORY_SIZE, value_parser = parse_number)]
    memory_size: u32,

    /// CPU clock frequency in Hz, used to report simulated time.
    #[arg(long, default_value_t = DEFAULT_FREQUENCY_HZ)]
    frequency: u32,

    /// Stop after executing this many instructions.
    #[arg(long, default_value_t = 1_000_000)]
    max_instructions: u64,

    /// Print the final machine state as JSON.
    #[arg(long)]
    dump_state: bool,
}

#[derive(Debug, Serialize)]
enum StopReason {
    InstructionLimit,
    CpuOff,
    /// The last instruction jumped to itself.
    Halted,
    Failed(String),
}

#[derive(Debug, Serialize)]
struct FinalState<'a> {
    stop: StopReason,
    instructions: u64,
    cycles: u64,
    seconds: f64,
    registers: &'a RegisterFile,
}

fn run(
    regs: &mut RegisterFile,
    mem: &mut FlatMemory,
    clk: &mut CycleClock,
    max_instructions: u64,
) -> (StopReason, u64) {
    let mut executed: u64 = 0;
    while executed < max_instructions {
        match step(regs, mem) {
            Ok(outcome) => {
                executed += 1;
                clk.consume(outcome.cycles);
                if regs.status().cpu_off() {
                    return (StopReason::CpuOff, executed);
                }
                if regs.pc() == outcome.address {
                    return (StopReason::Halted, executed);
                }
            }
            Err(e) => {
                event!(Level::ERROR, "Execution stopped at {}: {}", regs.pc(), e);
                return (StopReason::Failed(e.to_string()), executed);
            }
        }
    }
    (StopReason::InstructionLimit, executed)
}

fn run_simulator() -> Result<i32, Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Set RUST_LOG to select which trace messages get printed.
    let fmt_layer = tracing_subscriber::fmt::layer().with_target(true);
    let filter_layer = match tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new("info"))
    {
        Err(e) => {
            return Err(Box::new(e));
        }
        Ok(layer) => layer,
    };

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();

    let image = std::fs::read(&args.image)?;
    let mut mem = FlatMemory::new(&MemoryConfiguration {
        size: args.memory_size,
    })?;
    mem.load(args.load_address, &image)?;
    event!(
        Level::INFO,
        "Loaded {} bytes from {} at {}",
        image.len(),
        args.image.display(),
        args.load_address
    );

    let mut regs = RegisterFile::new();
    let entry = match args.entry {
        Some(entry) => entry,
        None => {
            let entry = Address::from(read_word(&mut mem, RESET_VECTOR)?);
            event!(Level::INFO, "Reset vector holds {}", entry);
            entry
        }
    };
    regs.set_pc(entry);
    if let Some(sp) = args.stack_pointer {
        regs.set_sp(sp);
    }

    let mut clk = CycleClock::new(args.frequency);
    let (stop, instructions) = run(&mut regs, &mut mem, &mut clk, args.max_instructions);
    event!(
        Level::INFO,
        "Stopped ({:?}) after {} instructions, {} cycles ({:?} simulated)",
        stop,
        instructions,
        clk.cycles(),
        clk.now()
    );
    let exit_code = match stop {
        StopReason::Failed(_) => 1,
        _ => 0,
    };

    if args.dump_state {
        let state = FinalState {
            stop,
            instructions,
            cycles: clk.cycles(),
            seconds: clk.seconds(),
            registers: &regs,
        };
        println!("{}", serde_json::to_string_pretty(&state)?);
    }
    Ok(exit_code)
}

fn main() {
    match run_simulator() {
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
        Ok(code) => {
            std::process::exit(code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("1234"), Ok(1234));
        assert_eq!(parse_number("0x4400"), Ok(0x4400));
        assert_eq!(parse_number("FFFEh"), Ok(0xFFFE));
        assert!(parse_number("0xZZ").is_err());
    }

    #[test]
    fn test_parse_address() {
        assert_eq!(parse_address("0x10000"), Ok(base::u20!(0x1_0000)));
        assert!(parse_address("0x100000").is_err());
    }

    #[test]
    fn test_run_stops_at_self_jump() {
        let mut mem =
            FlatMemory::new(&MemoryConfiguration::default()).expect("valid test configuration");
        // MOV #0x10,SR (sets CPUOFF)
        mem.load(base::u20!(0x4400), &[0x32, 0x40, 0x10, 0x00])
            .expect("program should fit");
        // JMP $
        mem.load(base::u20!(0x4500), &[0xFF, 0x3F])
            .expect("program should fit");

        let mut regs = RegisterFile::new();
        regs.set_pc(base::u20!(0x4500));
        let mut clk = CycleClock::default();
        let (stop, n) = run(&mut regs, &mut mem, &mut clk, 10);
        assert!(matches!(stop, StopReason::Halted));
        assert_eq!(n, 1);

        regs.set_pc(base::u20!(0x4400));
        let (stop, n) = run(&mut regs, &mut mem, &mut clk, 10);
        assert!(matches!(stop, StopReason::CpuOff));
        assert_eq!(n, 1);
        assert_eq!(clk.cycles(), 4);
    }
}

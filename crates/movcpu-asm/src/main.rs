//! CLI entry point for the movcpu binary.

use std::env;
use std::ffi::OsString;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};

use movcpu_asm::session::{LineOutcome, RunReport, Session};
use movcpu_asm::source::{read_source, read_source_file, SourceContent, STDIN_LABEL};
use movcpu_core::{
    format_memory_dump, format_register_dump, ConfigError, CpuConfig, CpuContext, ImmediatePolicy,
    Register, ScalePolicy, TraceEvent, TraceSink, DEFAULT_MEMORY_BYTES, DEFAULT_REGISTER_MASK,
    MAX_MEMORY_BYTES,
};
#[cfg(test)]
use rstest as _;
#[cfg(test)]
use tempfile as _;
use thiserror as _;

const USAGE_TEXT: &str = "\
Usage: movcpu <command> [options]

Commands:
  run <input>   Execute a source file line by line (`-` reads stdin)
  interactive   Execute lines from stdin as they arrive

Options:
  --memory-bytes <n>       Size of the memory region (default 4096, at most 16 MiB)
  --blank-memory           Start from zeroed memory instead of the sample image
  --any-scale              Accept any index scale, not only 1, 2, 4 and 8
  --truncate-immediates    Keep the low bytes of oversized immediates
  --trace                  Print one trace line per execution event to stderr
  --set <reg>=<value>      Seed a register before running (repeatable)
  --memdump <rows>x<cols>  Memory grid printed after the run (default 6x8)
  --regs <mask>            Registers printed after the run (default 0x000D)
  -h, --help               Show this help message

Examples:
  movcpu run program.s
  movcpu run program.s --set rax=0x10 --regs 0xFFFF
  movcpu interactive --blank-memory
";

/// Registers seeded before any `--set` overrides.
const DEFAULT_SEEDS: [(Register, u64); 3] = [
    (Register::Rax, 8),
    (Register::Rcx, 3),
    (Register::Rdx, 0),
];

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Run(RunArgs),
    Interactive(Options),
}

#[derive(Debug, PartialEq, Eq)]
struct RunArgs {
    input: PathBuf,
    options: Options,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
struct Options {
    memory_bytes: usize,
    blank_memory: bool,
    any_scale: bool,
    truncate_immediates: bool,
    trace: bool,
    seeds: Vec<(Register, u64)>,
    memdump: (usize, usize),
    register_mask: u16,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            memory_bytes: DEFAULT_MEMORY_BYTES,
            blank_memory: false,
            any_scale: false,
            truncate_immediates: false,
            trace: false,
            seeds: Vec::new(),
            memdump: (6, 8),
            register_mask: DEFAULT_REGISTER_MASK,
        }
    }
}

impl Options {
    fn config(&self) -> CpuConfig {
        CpuConfig {
            memory_bytes: self.memory_bytes,
            preload_sample: !self.blank_memory,
            scale_policy: if self.any_scale {
                ScalePolicy::Unrestricted
            } else {
                ScalePolicy::Architectural
            },
            immediate_policy: if self.truncate_immediates {
                ImmediatePolicy::Truncate
            } else {
                ImmediatePolicy::Strict
            },
            tracing_enabled: self.trace,
        }
    }

    fn context(&self) -> Result<CpuContext, ConfigError> {
        let context = CpuContext::with_config(&self.config())?;
        Ok(DEFAULT_SEEDS
            .iter()
            .chain(&self.seeds)
            .fold(context, |ctx, &(reg, value)| ctx.with_register(reg, value)))
    }
}

#[derive(Debug)]
enum ParseResult {
    Command(Command),
    Help,
}

fn parse_args(mut args: impl Iterator<Item = OsString>) -> Result<ParseResult, String> {
    let first = args.next().ok_or_else(|| "missing command".to_string())?;

    if first == "--help" || first == "-h" {
        return Ok(ParseResult::Help);
    }

    let command_str = first.to_string_lossy().to_string();

    match command_str.as_str() {
        "run" => {
            let (options, mut inputs) = parse_options(args)?;
            let input = inputs.pop().ok_or_else(|| "missing input path".to_string())?;
            if !inputs.is_empty() {
                return Err("multiple input paths provided".to_string());
            }
            Ok(ParseResult::Command(Command::Run(RunArgs { input, options })))
        }
        "interactive" => {
            let (options, inputs) = parse_options(args)?;
            if !inputs.is_empty() {
                return Err("interactive mode takes no input path".to_string());
            }
            Ok(ParseResult::Command(Command::Interactive(options)))
        }
        other => Err(format!("unknown command: {other}")),
    }
}

#[allow(clippy::while_let_on_iterator)]
fn parse_options(
    mut args: impl Iterator<Item = OsString>,
) -> Result<(Options, Vec<PathBuf>), String> {
    let mut options = Options::default();
    let mut inputs = Vec::new();

    while let Some(arg) = args.next() {
        let flag = arg.to_string_lossy().to_string();
        let mut value = || {
            args.next()
                .map(|value| value.to_string_lossy().to_string())
                .ok_or_else(|| format!("missing value for {flag}"))
        };

        match flag.as_str() {
            "-h" | "--help" => return Err(USAGE_TEXT.to_string()),
            "--blank-memory" => options.blank_memory = true,
            "--any-scale" => options.any_scale = true,
            "--truncate-immediates" => options.truncate_immediates = true,
            "--trace" => options.trace = true,
            "--memory-bytes" => {
                let text = value()?;
                options.memory_bytes = parse_number(&text)
                    .and_then(|n| usize::try_from(n).ok())
                    .filter(|n| *n <= MAX_MEMORY_BYTES)
                    .ok_or_else(|| format!("invalid memory size: {text}"))?;
            }
            "--set" => options.seeds.push(parse_seed(&value()?)?),
            "--memdump" => options.memdump = parse_grid(&value()?)?,
            "--regs" => {
                let text = value()?;
                options.register_mask = parse_number(&text)
                    .and_then(|n| u16::try_from(n).ok())
                    .ok_or_else(|| format!("invalid register mask: {text}"))?;
            }
            "-" => inputs.push(PathBuf::from(arg)),
            other if other.starts_with('-') => return Err(format!("unknown option: {other}")),
            _ => inputs.push(PathBuf::from(arg)),
        }
    }

    Ok((options, inputs))
}

/// Parses a decimal, `0x` hexadecimal or `0b` binary unsigned number.
fn parse_number(text: &str) -> Option<u64> {
    let text = text.trim();
    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        u64::from_str_radix(hex, 16).ok()
    } else if let Some(bin) = text.strip_prefix("0b").or_else(|| text.strip_prefix("0B")) {
        u64::from_str_radix(bin, 2).ok()
    } else {
        text.parse().ok()
    }
}

fn parse_seed(text: &str) -> Result<(Register, u64), String> {
    let (name, value) = text
        .split_once('=')
        .ok_or_else(|| format!("expected REG=VALUE, got {text}"))?;
    let name = name.trim();
    let reg = Register::from_name(name.strip_prefix('%').unwrap_or(name))
        .ok_or_else(|| format!("unknown register: {name}"))?;
    let value = value.trim();
    let parsed = match value.strip_prefix('-') {
        Some(magnitude) => parse_number(magnitude).map(|n| n.wrapping_neg()),
        None => parse_number(value),
    };
    parsed
        .map(|value| (reg, value))
        .ok_or_else(|| format!("invalid register value: {value}"))
}

fn parse_grid(text: &str) -> Result<(usize, usize), String> {
    text.split_once(['x', 'X'])
        .and_then(|(rows, cols)| Some((rows.trim().parse().ok()?, cols.trim().parse().ok()?)))
        .ok_or_else(|| format!("expected ROWSxCOLS, got {text}"))
}

fn format_trace_event(event: &TraceEvent) -> String {
    match *event {
        TraceEvent::InstructionStart { width } => {
            format!("trace: start mov{} ({} bytes)", width.suffix(), width.bytes())
        }
        TraceEvent::SourceRead { operand, value } => {
            format!("trace: read {operand:?} = 0x{value:X}")
        }
        TraceEvent::RegisterWrite {
            register,
            width,
            before,
            after,
        } => format!(
            "trace: write {register} ({} bytes) 0x{before:016X} -> 0x{after:016X}",
            width.bytes()
        ),
        TraceEvent::MemoryWrite {
            address,
            width,
            value,
        } => format!(
            "trace: store {} bytes at 0x{address:X} = 0x{value:X}",
            width.bytes()
        ),
        TraceEvent::FaultRaised { cause } => format!("trace: fault: {cause}"),
    }
}

/// Trace sink printing one line per event to stderr.
struct StderrTrace;

impl TraceSink for StderrTrace {
    fn on_event(&mut self, event: TraceEvent) {
        eprintln!("{}", format_trace_event(&event));
    }
}

fn print_dumps(ctx: &CpuContext, options: &Options) {
    let (rows, cols) = options.memdump;
    print!("{}", format_memory_dump(&ctx.memory, rows, cols));
    print!("{}", format_register_dump(&ctx.registers, options.register_mask));
}

fn load_source(input: &Path) -> io::Result<SourceContent> {
    if input.as_os_str() == "-" {
        read_source(io::stdin().lock(), STDIN_LABEL)
    } else {
        read_source_file(input)
    }
}

fn report_run(report: &RunReport) {
    for error in &report.skipped {
        eprintln!("{}", error.format_for_stderr());
    }
    if let Some(fatal) = &report.fatal {
        eprintln!("{}", fatal.format_for_stderr());
    }
}

fn build_context(options: &Options) -> Result<CpuContext, i32> {
    options.context().map_err(|e| {
        eprintln!("error: {e}");
        1
    })
}

fn run_file(args: &RunArgs) -> Result<(), i32> {
    let context = build_context(&args.options)?;
    let source = match load_source(&args.input) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("error: failed to read {}: {e}", args.input.display());
            return Err(1);
        }
    };

    let mut session = Session::new(context, &source.file_path);
    let report = session.run_source(&source, &mut StderrTrace);
    report_run(&report);

    print_dumps(session.context(), &args.options);
    println!(
        "Executed {} instruction(s), skipped {} line(s)",
        report.executed,
        report.skipped.len()
    );

    if report.completed() {
        Ok(())
    } else {
        Err(1)
    }
}

fn run_interactive(options: &Options) -> Result<(), i32> {
    let mut session = Session::new(build_context(options)?, STDIN_LABEL);
    let mut halted = false;

    for (idx, line) in io::stdin().lock().lines().enumerate() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                eprintln!("error: failed to read {STDIN_LABEL}: {e}");
                return Err(1);
            }
        };

        match session.feed_line(&line, idx + 1, &mut StderrTrace) {
            LineOutcome::Blank => {}
            LineOutcome::Executed => {
                print!(
                    "{}",
                    format_register_dump(&session.context().registers, options.register_mask)
                );
            }
            LineOutcome::Skipped(error) => eprintln!("{}", error.format_for_stderr()),
            LineOutcome::Halted(error) => {
                eprintln!("{}", error.format_for_stderr());
                halted = true;
                break;
            }
        }
    }

    print_dumps(session.context(), options);
    if halted {
        Err(1)
    } else {
        Ok(())
    }
}

fn main() {
    let exit_code = match parse_args(env::args_os().skip(1)) {
        Ok(ParseResult::Help) => {
            println!("{USAGE_TEXT}");
            0
        }
        Ok(ParseResult::Command(Command::Run(args))) => match run_file(&args) {
            Ok(()) => 0,
            Err(code) => code,
        },
        Ok(ParseResult::Command(Command::Interactive(options))) => {
            match run_interactive(&options) {
                Ok(()) => 0,
                Err(code) => code,
            }
        }
        Err(error) => {
            if error.starts_with("Usage:") {
                println!("{error}");
            } else {
                eprintln!("error: {error}");
                eprintln!("{USAGE_TEXT}");
            }
            1
        }
    };

    std::process::exit(exit_code);
}

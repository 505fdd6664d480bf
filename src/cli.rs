// Command-line front end for the resource decompressor.
//
// `decode` expands one resource blob, `header` prints its parsed header and
// `config` reports build features.

use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::{ArgAction, Args, Parser, Subcommand, ValueHint};
use log::LevelFilter;

use crate::checksum::checksum;
use crate::engine::{Engine, EngineOptions, Method};
use crate::format::header::{ResourceHeader, is_extended_resource};
use crate::io::detect_method;
use crate::registry::DEFAULT_CAPACITY;

const BUF_SIZE: usize = 64 * 1024;

// ---------------------------------------------------------------------------
// Clap CLI definition
// ---------------------------------------------------------------------------

/// Classic Mac OS compressed resource decoder.
#[derive(Parser, Debug)]
#[command(
    name = "rsrc-dcmp",
    version,
    about = "Compressed resource decoder (DonnBits, byte-wise, GreggyBits)",
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Cmd,

    /// Force overwrite existing output files.
    #[arg(short = 'f', long, global = true)]
    force: bool,

    /// Quiet mode (suppress non-error output).
    #[arg(short = 'q', long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Verbose mode (use multiple times for more detail).
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Output stats as JSON to stderr.
    #[arg(long = "json", global = true)]
    json_output: bool,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Decompress a resource blob.
    Decode(DecodeArgs),
    /// Print the extended resource header of a blob.
    Header(HeaderArgs),
    /// Print build/configuration details.
    Config,
}

#[derive(Args, Debug)]
struct DecodeArgs {
    /// Input resource file (default: stdin).
    #[arg(value_hint = ValueHint::FilePath)]
    input: Option<PathBuf>,

    /// Output file (default: stdout).
    #[arg(value_hint = ValueHint::FilePath)]
    output: Option<PathBuf>,

    /// Check/compute only (do not write output).
    #[arg(long = "check-only")]
    no_output: bool,

    /// Dump headers, tables and statistics through the logger.
    #[arg(long)]
    debug: bool,
}

#[derive(Args, Debug)]
struct HeaderArgs {
    /// Resource file.
    #[arg(value_hint = ValueHint::FilePath)]
    input: PathBuf,
}

// ---------------------------------------------------------------------------
// Global flags
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
struct Globals {
    force: bool,
    quiet: bool,
    verbose: u8,
    json_output: bool,
}

fn split(cli: Cli) -> (Cmd, Globals) {
    let globals = Globals {
        force: cli.force,
        quiet: cli.quiet,
        verbose: cli.verbose.min(2),
        json_output: cli.json_output,
    };
    (cli.command, globals)
}

#[cfg(any(test, feature = "fuzzing"))]
pub fn fuzz_try_parse_args(args: &[String]) {
    let argv: Vec<String> = std::iter::once("rsrc-dcmp".to_string())
        .chain(args.iter().cloned())
        .collect();
    if let Ok(cli) = Cli::try_parse_from(argv) {
        let _ = split(cli);
    }
}

fn log_level(globals: &Globals) -> Option<LevelFilter> {
    match globals.verbose {
        0 => None,
        1 => Some(LevelFilter::Debug),
        _ => Some(LevelFilter::Trace),
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn cmd_config() -> i32 {
    let version = env!("CARGO_PKG_VERSION");
    eprintln!("rsrc-dcmp version {version} (Rust)");

    let adler32 = cfg!(feature = "adler32") as u8;
    let file_io = cfg!(feature = "file-io") as u8;
    let ptr_size = std::mem::size_of::<*const ()>();

    eprintln!("ADLER32={adler32}");
    eprintln!("FILE_IO={file_io}");
    eprintln!("REGISTRY_CAPACITY={DEFAULT_CAPACITY}");
    eprintln!("sizeof(usize)={ptr_size}");

    0
}

fn read_input(path: Option<&Path>) -> Result<Vec<u8>, String> {
    match path {
        Some(path) => std::fs::read(path).map_err(|e| format!("input file: {}: {e}", path.display())),
        None => {
            let mut buf = Vec::new();
            io::stdin()
                .lock()
                .read_to_end(&mut buf)
                .map_err(|e| format!("stdin: {e}"))?;
            Ok(buf)
        }
    }
}

fn open_output(path: Option<&Path>, force: bool) -> Result<Box<dyn Write>, String> {
    let Some(path) = path else {
        return Ok(Box::new(BufWriter::with_capacity(BUF_SIZE, io::stdout().lock())));
    };
    if path.exists() && !force {
        return Err(format!(
            "output file exists, use -f to overwrite: {}",
            path.display()
        ));
    }
    File::create(path)
        .map(|f| Box::new(BufWriter::with_capacity(BUF_SIZE, f)) as Box<dyn Write>)
        .map_err(|e| format!("output file: {}: {e}", path.display()))
}

fn method_name(method: Option<Method>) -> String {
    method.map_or_else(|| "none".to_string(), |m| m.to_string())
}

fn cmd_decode(args: &DecodeArgs, globals: &Globals) -> i32 {
    let input = match read_input(args.input.as_deref()) {
        Ok(data) => data,
        Err(e) => {
            eprintln!("rsrc-dcmp: {e}");
            return 1;
        }
    };

    let mut engine = Engine::new(EngineOptions {
        debug: args.debug,
        ..Default::default()
    });
    let output = match engine.decompress_resource(&input) {
        Ok(data) => data,
        Err(e) => {
            eprintln!("rsrc-dcmp: decode error ({}): {e}", e.code());
            return 1;
        }
    };

    if !args.no_output {
        let mut writer = match open_output(args.output.as_deref(), globals.force) {
            Ok(w) => w,
            Err(e) => {
                eprintln!("rsrc-dcmp: {e}");
                return 1;
            }
        };
        if let Err(e) = writer.write_all(&output).and_then(|()| writer.flush()) {
            eprintln!("rsrc-dcmp: write error: {e}");
            return 1;
        }
    }

    let method = method_name(detect_method(&input).ok().flatten());
    if globals.verbose > 0 && !globals.quiet {
        eprintln!(
            "rsrc-dcmp: decoder: {method}, input size: {}, output size: {}",
            input.len(),
            output.len()
        );
    }
    if globals.json_output {
        let json = serde_json::json!({
            "command": "decode",
            "method": method,
            "input_size": input.len(),
            "output_size": output.len(),
            "checksum": format!("{:#010x}", checksum(&output)),
        });
        match serde_json::to_string_pretty(&json) {
            Ok(text) => eprintln!("{text}"),
            Err(e) => eprintln!("rsrc-dcmp: json error: {e}"),
        }
    }

    0
}

fn cmd_header(args: &HeaderArgs, globals: &Globals) -> i32 {
    let input = match read_input(Some(&args.input)) {
        Ok(data) => data,
        Err(e) => {
            eprintln!("rsrc-dcmp: {e}");
            return 1;
        }
    };

    if !is_extended_resource(&input) {
        eprintln!(
            "rsrc-dcmp: not an extended resource: {}",
            args.input.display()
        );
        return 1;
    }
    let header = match ResourceHeader::parse(&input) {
        Ok(h) => h,
        Err(e) => {
            eprintln!("rsrc-dcmp: header error ({}): {e}", e.code());
            return 1;
        }
    };
    let method = method_name(detect_method(&input).ok().flatten());

    if globals.json_output {
        let json = serde_json::json!({
            "command": "header",
            "version": header.common.header_version,
            "header_length": header.common.header_length,
            "compressed": header.common.is_compressed(),
            "actual_size": header.common.actual_size,
            "decompressor_id": header.decompressor_id(),
            "method": method,
        });
        match serde_json::to_string_pretty(&json) {
            Ok(text) => eprintln!("{text}"),
            Err(e) => eprintln!("rsrc-dcmp: json error: {e}"),
        }
    }
    if !globals.quiet {
        println!("{header}");
        println!("  Decoder:             {method}");
    }

    0
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run() -> ! {
    let cli = Cli::parse();
    let (command, globals) = split(cli);

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    builder.format_timestamp(None).format_target(false);
    if let Some(level) = log_level(&globals) {
        builder.filter_level(level);
    }
    builder.init();

    let exit_code = match &command {
        Cmd::Decode(args) => cmd_decode(args, &globals),
        Cmd::Header(args) => cmd_header(args, &globals),
        Cmd::Config => cmd_config(),
    };

    process::exit(exit_code);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

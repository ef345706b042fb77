//! Jackc CLI: compile a `.jack` file, or every `.jack` file in a directory.

use std::env;
use std::path::PathBuf;
use std::process;

use colored::Colorize;

use jackc::driver::{self, BuildConfig};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// CLI options parsed from arguments.
struct Options {
    target: PathBuf,
    config: BuildConfig,
}

fn print_usage() {
    eprintln!("Jackc {} - Jack to VM compiler", VERSION);
    eprintln!();
    eprintln!("Usage: jackc [options] <file.jack | directory>");
    eprintln!();
    eprintln!("Each Foo.jack is compiled to Foo.vm in the same directory.");
    eprintln!("A directory compiles every .jack file directly inside it.");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --jobs N        Number of parallel compile workers (default: CPU cores)");
    eprintln!("  --fail-fast     Stop starting new files after the first failure");
    eprintln!("  --verbose, -v   Print each file as it is compiled");
    eprintln!("  --help, -h      Show this help message");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  jackc Main.jack               Compile a single class");
    eprintln!("  jackc Pong/                   Compile a whole program");
    eprintln!("  jackc Pong/ --jobs 4 -v       Compile with 4 workers, verbosely");
}

fn usage_error(message: &str) -> ! {
    eprintln!("{}", message);
    print_usage();
    process::exit(64);
}

fn parse_args() -> Options {
    let args: Vec<String> = env::args().skip(1).collect();
    let mut config = BuildConfig::default();
    let mut target: Option<PathBuf> = None;

    let mut i = 0;
    while i < args.len() {
        let arg = &args[i];
        match arg.as_str() {
            "--help" | "-h" => {
                print_usage();
                process::exit(0);
            }
            "--jobs" | "-j" => {
                i += 1;
                if i >= args.len() {
                    usage_error("--jobs requires a number");
                }
                config.jobs = match args[i].parse() {
                    Ok(n) if n > 0 => n,
                    _ => usage_error(&format!("Invalid jobs number: {}", args[i])),
                };
            }
            "--fail-fast" => config.fail_fast = true,
            "--verbose" | "-v" => config.verbose = true,
            _ if arg.starts_with('-') => usage_error(&format!("Unknown option: {}", arg)),
            _ => {
                if target.is_some() {
                    usage_error("Only one file or directory can be specified");
                }
                target = Some(PathBuf::from(arg));
            }
        }
        i += 1;
    }

    match target {
        Some(target) => Options { target, config },
        None => usage_error("No input file or directory given"),
    }
}

fn main() {
    let options = parse_args();

    if !options.target.exists() {
        eprintln!(
            "{} Path '{}' does not exist",
            "error:".red().bold(),
            options.target.display()
        );
        process::exit(1);
    }

    let files = match driver::collect_sources(&options.target) {
        Ok(files) => files,
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            process::exit(1);
        }
    };

    if files.is_empty() {
        println!("No .{} files found.", jackc::SOURCE_EXTENSION);
        return;
    }

    let report = driver::build(&files, &options.config);
    driver::print_report(&report);

    if !report.is_success() {
        process::exit(1);
    }
}

//! KRY command-line driver.

mod commands;

use commands::{check_file, eval_expression, parse_file, CheckOptions};

fn main() {
    init_tracing();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage();
        return;
    }

    let command = &args[1];
    match command.as_str() {
        "parse" => {
            if args.len() < 3 {
                eprintln!("Usage: kryc parse <file.kry>");
                std::process::exit(1);
            }
            parse_file(&args[2]);
        }
        "check" => {
            let mut options = CheckOptions::default();
            let mut path = None;
            for arg in args.iter().skip(2) {
                if let Some(mode) = arg.strip_prefix("--mode=") {
                    let Some(mode) = commands::parse_mode(mode) else {
                        eprintln!("error: unknown mode '{mode}'");
                        eprintln!("Valid modes: runtime, codegen, hybrid");
                        std::process::exit(1);
                    };
                    options.mode = mode;
                } else if arg == "--quiet" || arg == "-q" {
                    options.quiet = true;
                } else if !arg.starts_with('-') && path.is_none() {
                    path = Some(arg.as_str());
                }
            }
            let Some(path) = path else {
                eprintln!("Usage: kryc check <file.kry> [--mode=<mode>] [--quiet]");
                std::process::exit(1);
            };
            if !check_file(path, &options) {
                std::process::exit(1);
            }
        }
        "eval" => {
            let mut fold_constants = true;
            let mut disassemble = false;
            let mut rest = Vec::new();
            for arg in args.iter().skip(2) {
                match arg.as_str() {
                    "--no-fold" => fold_constants = false,
                    "--disasm" => disassemble = true,
                    _ => rest.push(arg.as_str()),
                }
            }
            let Some((expr, locals)) = rest.split_first() else {
                eprintln!("Usage: kryc eval \"<expr>\" [name=value ...] [--no-fold] [--disasm]");
                std::process::exit(1);
            };
            if !eval_expression(expr, locals, fold_constants, disassemble) {
                std::process::exit(1);
            }
        }
        "help" | "--help" | "-h" => print_usage(),
        "version" | "--version" | "-V" => {
            println!("kryc {}", env!("CARGO_PKG_VERSION"));
        }
        _ => {
            eprintln!("Unknown command: {command}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    }
}

/// Install a tree-shaped subscriber when `RUST_LOG` is set.
///
/// Enable with `RUST_LOG=kry_eval=debug` or `RUST_LOG=kry_parse=trace`.
fn init_tracing() {
    use tracing_subscriber::{prelude::*, EnvFilter};

    if std::env::var("RUST_LOG").is_ok() {
        let filter = EnvFilter::from_default_env();
        tracing_subscriber::registry()
            .with(
                tracing_tree::HierarchicalLayer::new(2)
                    .with_targets(true)
                    .with_writer(std::io::stderr),
            )
            .with(filter)
            .init();
    }
}

fn print_usage() {
    println!("KRY compiler front end");
    println!();
    println!("Usage: kryc <command> [options]");
    println!();
    println!("Commands:");
    println!("  parse <file.kry>        Parse and dump the syntax tree");
    println!("  check <file.kry>        Parse and lower, reporting diagnostics");
    println!("  eval <expr> [n=v ...]   Evaluate an expression with local values");
    println!("  help                    Show this help message");
    println!("  version                 Show version information");
    println!();
    println!("Check options:");
    println!("  --mode=<mode>       Lowering mode: runtime (default), codegen, hybrid");
    println!("  --quiet, -q         Only print diagnostics");
    println!();
    println!("Eval options:");
    println!("  --no-fold           Disable constant folding");
    println!("  --disasm            Print the bytecode before the result");
    println!();
    println!("Examples:");
    println!("  kryc check app.kry");
    println!("  kryc eval \"(10 + 20) * 2 - 5\"");
    println!("  kryc eval \"string_toUpper(name)\" name='\"kry\"'");
    println!("  RUST_LOG=kry_eval=debug kryc eval \"a + b\" a=1 b=2");
}

//! Graft compiler CLI.

use graftc::{compile, CancelFlag, SourceUnit};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage();
        std::process::exit(2);
    }

    match args[1].as_str() {
        "check" => {
            if args.len() < 3 {
                eprintln!("Usage: graftc check <file.gr>...");
                std::process::exit(2);
            }
            let code = check_files(&args[2..]);
            std::process::exit(code);
        }
        "help" | "--help" | "-h" => print_usage(),
        other => {
            eprintln!("unknown command `{other}`");
            print_usage();
            std::process::exit(2);
        }
    }
}

fn check_files(paths: &[String]) -> i32 {
    let mut units = Vec::with_capacity(paths.len());
    for path in paths {
        match std::fs::read_to_string(path) {
            Ok(source) => units.push(SourceUnit::new(path.clone(), source)),
            Err(err) => {
                eprintln!("error: cannot read `{path}`: {err}");
                return 2;
            }
        }
    }

    let cancel = CancelFlag::new();
    let output = match compile(units, &cancel) {
        Ok(output) => output,
        Err(cancelled) => {
            eprintln!("error: {cancelled}");
            return 2;
        }
    };

    let mut errors = 0usize;
    for unit in &output.units {
        for diagnostic in unit.diagnostics.iter() {
            eprintln!("{}: {diagnostic}", unit.name);
        }
        errors += unit.diagnostics.error_count();
    }

    if errors > 0 {
        eprintln!("{errors} error(s)");
        1
    } else {
        0
    }
}

fn print_usage() {
    eprintln!("Graft compiler");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  graftc check <file.gr>...   Type-check the given units");
    eprintln!("  graftc help                 Show this help");
}

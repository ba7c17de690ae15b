use std::fs;
use std::io::{BufRead, Write, stdin, stdout};
use std::path::PathBuf;

use calculator_brain::CalculatorBrain;
use calculator_brain::evaluate_line;
use calculator_brain::render;
use calculator_brain::keys::UnknownSymbolError;
use clap::Parser;
use clap::Subcommand;
use miette::IntoDiagnostic;
use miette::WrapErr;

#[derive(Parser, Debug)]
#[command(about = "Keypad calculator")]
struct Args {
    /// Reject keys that are neither numbers nor known symbols
    #[arg(long, global = true)]
    strict: bool,

    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity<clap_verbosity_flag::WarnLevel>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Evaluate one key sequence, e.g. `calc keys "5 + 3 ="`
    Keys { sequence: String },
    /// Evaluate every line of a file, each from a cleared calculator
    File { filename: PathBuf },
    /// Read key sequences from stdin, keeping state between lines
    Repl,
    /// List the symbols on the keypad
    Symbols,
}

fn main() -> miette::Result<()> {
    let args = Args::parse();

    env_logger::Builder::new()
        .filter_level(args.verbose.log_level_filter())
        .parse_default_env()
        .init();

    match args.command {
        Commands::Keys { sequence } => {
            let mut brain = CalculatorBrain::new();
            run(&mut brain, None, &sequence, None, args.strict)?;
            print(&brain);
        }
        Commands::File { filename } => {
            let file_contents = fs::read_to_string(&filename)
                .into_diagnostic()
                .wrap_err_with(|| format!("reading `{}` failed", filename.display()))?;

            for (index, line) in file_contents.lines().enumerate() {
                if line.trim().is_empty() {
                    continue;
                }
                let mut brain = CalculatorBrain::new();
                run(&mut brain, filename.to_str(), line, Some(index + 1), args.strict)?;
                print(&brain);
            }
        }
        Commands::Repl => {
            let mut brain = CalculatorBrain::new();
            let mut lines = stdin().lock().lines();
            loop {
                write!(stdout(), "> ").into_diagnostic()?;
                stdout().flush().into_diagnostic()?;

                let Some(line) = lines.next() else {
                    break;
                };
                let line = line.into_diagnostic().wrap_err("reading stdin failed")?;
                match line.trim() {
                    "quit" => break,
                    line => match evaluate_line(&mut brain, None, line, args.strict) {
                        Ok(()) => print(&brain),
                        Err(e) => eprintln!("{e:?}"),
                    },
                }
            }
        }
        Commands::Symbols => {
            let brain = CalculatorBrain::new();
            let operations = brain.operations();
            for symbol in operations.symbols() {
                if let Some(operation) = operations.get(symbol) {
                    println!("{symbol}\t{operation}");
                }
            }
        }
    }
    Ok(())
}

fn run(
    brain: &mut CalculatorBrain,
    filename: Option<&str>,
    line: &str,
    line_number: Option<usize>,
    strict: bool,
) -> miette::Result<()> {
    if let Err(e) = evaluate_line(brain, filename, line, strict) {
        if let Some(unknown) = e.downcast_ref::<UnknownSymbolError>() {
            eprintln!(
                "[line {}] Error: Unknown symbol: {}",
                line_number.unwrap_or_else(|| unknown.line()),
                unknown.symbol
            );
            eprintln!("{e:?}");

            std::process::exit(65);
        }
        return Err(e);
    }
    Ok(())
}

fn print(brain: &CalculatorBrain) {
    println!("{}", render(brain));
}

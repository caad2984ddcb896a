use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use clap::Subcommand;
use env_logger::Builder;
use log::{debug, info};

use pulse::ast::Stmt;
use pulse::ast_printer::AstPrinter;
use pulse::error::PulseError;
use pulse::interpreter::Interpreter;
use pulse::parser::Parser;
use pulse::scanner::Scanner;
use pulse::token::Token;

/// Exit status for malformed input (lex or parse errors).
const EXIT_DATA_ERR: i32 = 65;

/// Exit status for runtime errors.
const EXIT_SOFTWARE: i32 = 70;

#[derive(ClapParser, Debug)]
#[command(version, about = "Pulse language interpreter", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    commands: Commands,

    /// Enable debug logging to a file
    #[arg(long, global = true)]
    log: bool,

    /// Log file written when --log is given
    #[arg(long, global = true, default_value = "app.log")]
    log_file: PathBuf,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Prints every token scanned from a file
    Tokenize { filename: PathBuf },

    /// Parses input from a file as a program and prints its AST
    Parse {
        filename: PathBuf,

        /// Emit the AST as JSON instead of prefix form
        #[arg(long)]
        json: bool,
    },

    /// Evaluates a file holding one expression and prints its value
    Evaluate { filename: PathBuf },

    /// Runs input from a file as a Pulse program
    Run { filename: PathBuf },

    /// Starts an interactive prompt; each line is run against the same globals
    Repl,
}

/// Reads the contents of a file into a String
fn read_file(filename: PathBuf) -> Result<String> {
    info!("Reading file: {:?}", filename);
    let file = File::open(&filename).context(format!("Failed to open file {:?}", filename))?;
    let mut reader = BufReader::new(file);
    let mut buf = Vec::new();

    let bytes = reader
        .read_to_end(&mut buf)
        .context(format!("Failed to read file {:?}", filename))?;

    info!("Read {} bytes from {:?}", bytes, filename);

    let source = String::from_utf8(buf)
        .map_err(PulseError::from)
        .context(format!("File {:?} is not valid UTF-8", filename))?;

    Ok(source)
}

fn init_logger(path: &Path) -> Result<()> {
    let log_file = File::create(path).context(format!("Failed to create {:?}", path))?;

    Builder::new()
        .format(|buf, record| {
            // Strip 'pulse::' from module path
            let module = record
                .module_path()
                .unwrap_or("<unnamed>")
                .strip_prefix("pulse::")
                .unwrap_or(record.module_path().unwrap_or("<unnamed>"));
            writeln!(
                buf,
                "[{}:{}] - {}",
                module,
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .filter(None, log::LevelFilter::Debug) // RUST_LOG still wins
        .parse_default_env()
        .init();

    info!("Logger initialized, writing to {:?}", path);
    Ok(())
}

/// Scans `source`, reporting every lex error.  Returns the good tokens and
/// whether any error was seen.
fn scan(source: &str) -> (Vec<Token>, bool) {
    let mut tokens = Vec::new();
    let mut had_error = false;

    for result in Scanner::new(source) {
        match result {
            Ok(token) => tokens.push(token),
            Err(e) => {
                had_error = true;
                eprintln!("{}", e);
            }
        }
    }

    (tokens, had_error)
}

fn report_all(errors: &[PulseError]) {
    for e in errors {
        debug!("Parse debug: {}", e);
        eprintln!("{}", e);
    }
}

/// Scans and parses a whole program, reporting diagnostics.  `None` means
/// the unit had errors and must not run.
fn parse_program(source: &str) -> Option<Vec<Stmt>> {
    let (tokens, lex_failed) = scan(source);
    let mut parser = Parser::new(tokens);

    match parser.parse() {
        Ok(statements) if !lex_failed => {
            info!("Parsed {} statements", statements.len());
            Some(statements)
        }
        Ok(_) => None,
        Err(errors) => {
            report_all(&errors);
            None
        }
    }
}

fn repl() -> Result<()> {
    let mut interpreter = Interpreter::new();
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("> ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            info!("End of input, leaving REPL");
            println!();
            return Ok(());
        };

        let line = line.context("Failed to read from stdin")?;

        if let Some(statements) = parse_program(&line) {
            if let Err(e) = interpreter.interpret(&statements) {
                eprintln!("{}", e);
            }
        }
    }
}

fn main() -> Result<()> {
    let args: Cli = Cli::parse();

    if args.log {
        init_logger(&args.log_file)?;
    } else {
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Off)
            .init();
    }

    info!("CLI arguments: {:?}", args);

    match args.commands {
        Commands::Tokenize { filename } => {
            info!("Command: tokenize");
            let source = read_file(filename)?;
            let mut tokenized = true;

            for token in Scanner::new(&source) {
                match token {
                    Ok(token) => println!("{}", token),
                    Err(e) => {
                        tokenized = false;
                        eprintln!("{}", e);
                    }
                }
            }

            if !tokenized {
                debug!("Tokenization failed, exiting with code {}", EXIT_DATA_ERR);
                std::process::exit(EXIT_DATA_ERR);
            }
        }

        Commands::Parse { filename, json } => {
            info!("Command: parse");
            let source = read_file(filename)?;

            let Some(statements) = parse_program(&source) else {
                std::process::exit(EXIT_DATA_ERR);
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&statements)?);
            } else {
                for stmt in &statements {
                    println!("{}", AstPrinter::print_stmt(stmt));
                }
            }
        }

        Commands::Evaluate { filename } => {
            info!("Command: evaluate");
            let source = read_file(filename)?;
            let (tokens, lex_failed) = scan(&source);
            let mut parser = Parser::new(tokens);

            let expr = match parser.parse_expression() {
                Ok(expr) if !lex_failed => expr,
                Ok(_) => std::process::exit(EXIT_DATA_ERR),
                Err(errors) => {
                    report_all(&errors);
                    std::process::exit(EXIT_DATA_ERR);
                }
            };

            debug!("Expression: {}", AstPrinter::print(&expr));

            let mut interpreter = Interpreter::new();

            match interpreter.evaluate(&expr) {
                Ok(value) => println!("{}", value),
                Err(e) => {
                    eprintln!("{}", e);
                    std::process::exit(EXIT_SOFTWARE);
                }
            }
        }

        Commands::Run { filename } => {
            info!("Command: run");
            let source = read_file(filename)?;

            let Some(statements) = parse_program(&source) else {
                std::process::exit(EXIT_DATA_ERR);
            };

            let mut interpreter = Interpreter::new();

            if let Err(e) = interpreter.interpret(&statements) {
                debug!("Runtime debug: {}", e);
                eprintln!("{}", e);
                std::process::exit(EXIT_SOFTWARE);
            }

            info!("Run finished");
        }

        Commands::Repl => {
            info!("Command: repl");
            repl()?;
        }
    }

    Ok(())
}

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process;

use clap::Parser;
use log::{debug, error};
use pagedb::{ExecuteError, PrepareError, Statement, StorageError, Table};

/// A single-table record store backed by one file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the database file, created if missing
    database: PathBuf,

    /// Enable debug logging on stderr
    #[arg(short, long)]
    debug: bool,
}

struct InputBuffer {
    buffer: Vec<u8>,
}

impl InputBuffer {
    fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    /// Reads the next line as raw bytes. Returns 0 once input is exhausted.
    fn read_input(&mut self) -> io::Result<usize> {
        self.buffer.clear();
        io::stdin().lock().read_until(b'\n', &mut self.buffer)
    }

    fn line(&self) -> Result<&str, PrepareError> {
        std::str::from_utf8(&self.buffer)
            .map(str::trim)
            .map_err(|_| PrepareError::InvalidUtf8)
    }
}

// Non-SQL statements like .exit are called “meta-commands”.
enum MetaCommands {
    Exit,
    Unrecognized,
}

impl MetaCommands {
    fn parse(input: &str) -> Option<MetaCommands> {
        match input {
            ".exit" => Some(MetaCommands::Exit),
            _ => {
                if input.starts_with('.') {
                    Some(MetaCommands::Unrecognized)
                } else {
                    None
                }
            }
        }
    }
}

fn print_prompt() -> io::Result<()> {
    print!("db > ");
    io::stdout().flush()
}

fn fatal(err: StorageError) -> ! {
    error!("{err}");
    println!("{err}");
    process::exit(1);
}

fn main() {
    let args = Args::parse();

    let log_level = if args.debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let mut table = Table::open(&args.database).unwrap_or_else(|err| fatal(err));
    debug!("serving {}", args.database.display());

    let mut input_buffer = InputBuffer::new();

    loop {
        if let Err(err) = print_prompt() {
            error!("failed to write prompt: {err}");
            process::exit(1);
        }
        match input_buffer.read_input() {
            Ok(0) => {
                println!("Error reading input");
                process::exit(1);
            }
            Err(err) => {
                error!("failed to read stdin: {err}");
                println!("Error reading input");
                process::exit(1);
            }
            Ok(_) => {}
        }

        let line = match input_buffer.line() {
            Ok(line) => line,
            Err(err) => {
                println!("{err}");
                continue;
            }
        };

        match MetaCommands::parse(line) {
            Some(MetaCommands::Exit) => break,
            Some(MetaCommands::Unrecognized) => {
                println!("Unrecognized meta-command: {line}");
                continue;
            }
            None => {}
        }

        let statement = match Statement::prepare(line) {
            Ok(statement) => statement,
            Err(err) => {
                println!("{err}");
                continue;
            }
        };

        match statement.execute(&mut table) {
            Ok(rows) => {
                for row in rows {
                    println!("{row}");
                }
                println!("Executed.");
            }
            Err(ExecuteError::TableFull) => println!("{}", ExecuteError::TableFull),
            Err(ExecuteError::Storage(err)) => fatal(err),
        }
    }

    if let Err(err) = table.close() {
        fatal(err);
    }
}

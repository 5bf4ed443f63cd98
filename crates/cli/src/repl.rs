//! Interactive command loop
//!
//! Commands:
//!
//! | Command | Transaction | Arguments |
//! |---------|-------------|-----------|
//! | `insert` | AddPerson | seven fields, prompted or inline |
//! | `update` | ChangePersonData | seven fields, prompted or inline |
//! | `read` | GetPerson | Id |
//! | `getHist` | GetPersonHistory | Id |
//! | `help` | | |
//! | `exit` | | |
//!
//! Command errors are reported and the loop continues.

use std::io::{self, Write};

use population_core::Person;
use population_executor::{Error, Population};
use tracing::debug;

use crate::render;

/// Help text printed by `help`
pub const HELP: &str = "\thelp - Prints help information
\tinsert - Insert person to registry. Arguments: (Address, City, Id, Name, Status, Surname, TelephoneNumber)
\tupdate - Update person in registry. Arguments: (Address, City, Id, Name, Status, Surname, TelephoneNumber)
\tread - Read person data. Arguments: (Id)
\tgetHist - Read person data logs. Arguments: (Id)
\texit - Exit the application";

/// Prompt shown when waiting for a command
pub const COMMAND_PROMPT: &str = "population> ";

/// What reading a line produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// A line of input, without the trailing newline
    Line(String),
    /// Ctrl-C
    Interrupted,
    /// Ctrl-D or end of input
    Eof,
}

/// Source of input lines
pub trait LineSource {
    /// Show `prompt` and read one line
    fn read_line(&mut self, prompt: &str) -> ReadOutcome;

    /// Called once when the loop ends
    fn close(&mut self) {}
}

/// Outcome of prompting for a command's arguments
enum Args {
    Ready(Vec<String>),
    Cancelled,
    Eof,
}

/// Whether the loop keeps going after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
}

/// The command loop
pub struct Repl<S, W> {
    db: Population,
    source: S,
    out: W,
}

impl<S: LineSource, W: Write> Repl<S, W> {
    /// Create a loop over `db`, reading from `source` and writing to `out`
    pub fn new(db: Population, source: S, out: W) -> Self {
        Repl { db, source, out }
    }

    /// Run until `exit` or end of input
    pub fn run(&mut self) -> io::Result<()> {
        writeln!(self.out, "Write commands separately, or give arguments inline")?;
        writeln!(self.out, "Type help for help information")?;

        loop {
            let line = match self.source.read_line(COMMAND_PROMPT) {
                ReadOutcome::Line(line) => line,
                ReadOutcome::Interrupted => continue,
                ReadOutcome::Eof => break,
            };
            if self.handle_line(&line)? == Flow::Exit {
                break;
            }
        }

        self.source.close();
        Ok(())
    }

    fn handle_line(&mut self, line: &str) -> io::Result<Flow> {
        let Some(tokens) = shlex::split(line) else {
            writeln!(self.out, "Unbalanced quotes")?;
            return Ok(Flow::Continue);
        };
        let Some((command, inline)) = tokens.split_first() else {
            return Ok(Flow::Continue);
        };

        match command.as_str() {
            "help" => writeln!(self.out, "{}", HELP)?,
            "insert" => return self.write_person(inline, "AddPerson", "insert"),
            "update" => return self.write_person(inline, "ChangePersonData", "update"),
            "read" => return self.read(inline),
            "getHist" => return self.history(inline),
            "exit" => return Ok(Flow::Exit),
            _ => writeln!(self.out, "Wrong command")?,
        }
        Ok(Flow::Continue)
    }

    fn write_person(&mut self, inline: &[String], transaction: &str, verb: &str) -> io::Result<Flow> {
        let args = match self.collect(inline, &Person::FIELD_NAMES)? {
            Args::Ready(args) => args,
            Args::Cancelled => return Ok(Flow::Continue),
            Args::Eof => return Ok(Flow::Exit),
        };
        if let Err(e) = self.db.executor().submit_transaction(transaction, &args) {
            self.report(&format!("Failed to {} person", verb), &e)?;
        }
        Ok(Flow::Continue)
    }

    fn read(&mut self, inline: &[String]) -> io::Result<Flow> {
        let args = match self.collect(inline, &["Id"])? {
            Args::Ready(args) => args,
            Args::Cancelled => return Ok(Flow::Continue),
            Args::Eof => return Ok(Flow::Exit),
        };
        match self.db.executor().submit_transaction("GetPerson", &args) {
            Ok(payload) => writeln!(self.out, "{}", String::from_utf8_lossy(&payload))?,
            Err(e) => self.report("Failed to read person data", &e)?,
        }
        Ok(Flow::Continue)
    }

    fn history(&mut self, inline: &[String]) -> io::Result<Flow> {
        let args = match self.collect(inline, &["Id"])? {
            Args::Ready(args) => args,
            Args::Cancelled => return Ok(Flow::Continue),
            Args::Eof => return Ok(Flow::Exit),
        };
        let result = match args.as_slice() {
            [id] => self.db.get_person_history(id),
            _ => Err(Error::InvalidInput {
                reason: format!("expected 1 argument (Id), got {}", args.len()),
            }),
        };
        match result {
            Ok(entries) => write!(self.out, "{}", render::history(&entries))?,
            Err(e) => self.report("Failed to read person history", &e)?,
        }
        Ok(Flow::Continue)
    }

    /// Use inline arguments if given, otherwise prompt for each field
    fn collect(&mut self, inline: &[String], fields: &[&str]) -> io::Result<Args> {
        if !inline.is_empty() {
            return Ok(Args::Ready(inline.to_vec()));
        }

        let mut values = Vec::with_capacity(fields.len());
        for field in fields {
            match self.source.read_line(&format!("{}: ", field)) {
                ReadOutcome::Line(value) => values.push(value),
                ReadOutcome::Interrupted => {
                    writeln!(self.out, "Cancelled")?;
                    return Ok(Args::Cancelled);
                }
                ReadOutcome::Eof => return Ok(Args::Eof),
            }
        }
        Ok(Args::Ready(values))
    }

    fn report(&mut self, context: &str, e: &Error) -> io::Result<()> {
        debug!(error = ?e, "{}", context);
        writeln!(self.out, "{}: {}", context, e)
    }
}

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser as ClapParser;
use iliad::errors::InterpretError;
use iliad::vm::VM;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

/// sysexits.h-style exit codes.
const EX_OK: u8 = 0;
const EX_DATAERR: u8 = 65;
const EX_SOFTWARE: u8 = 70;

#[derive(ClapParser, Debug)]
#[command(name = "iliad", about = "A bytecode compiler and VM for a small expression language")]
struct Args {
  /// Script to run. Omit to start an interactive REPL.
  path: Option<PathBuf>,
}

fn main() -> ExitCode {
  env_logger::init();
  let args = Args::parse();

  let code = match args.path {
    Some(path) => run_file(&path),
    None => run_repl(),
  };
  ExitCode::from(code)
}

fn run_file(path: &PathBuf) -> u8 {
  let source = match std::fs::read_to_string(path) {
    Ok(source) => source,
    Err(err) => {
      eprintln!("Could not read file '{}': {err}", path.display());
      return EX_DATAERR;
    }
  };

  let mut vm = VM::new();
  match vm.interpret(&source) {
    Ok(()) => EX_OK,
    Err(InterpretError::Compile(err)) => {
      eprintln!("{err}");
      EX_DATAERR
    }
    Err(InterpretError::Runtime(err)) => {
      eprintln!("{err}");
      EX_SOFTWARE
    }
  }
}

fn run_repl() -> u8 {
  let mut vm = VM::new();
  let mut editor = match DefaultEditor::new() {
    Ok(editor) => editor,
    Err(err) => {
      eprintln!("Failed to start the line editor: {err}");
      return EX_SOFTWARE;
    }
  };

  loop {
    match editor.readline("IL> ") {
      Ok(line) => {
        let _ = editor.add_history_entry(line.as_str());
        if let Err(err) = vm.interpret(&line) {
          eprintln!("{err}");
        }
      }
      Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
      Err(err) => {
        eprintln!("Readline error: {err}");
        break;
      }
    }
  }
  EX_OK
}

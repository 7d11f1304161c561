use std::fs;
use std::io::{self, BufRead, Write};

use anyhow::{Context, Result, bail};
use monkeyparse::interpreter::{self, Environment, Object};
use monkeyparse::parser;

const PROMPT: &str = ">> ";

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let input_path = args.next();
    if args.next().is_some() {
        bail!("Only one input file is supported");
    }

    match input_path {
        Some(path) => run_file(&path),
        None => run_repl(),
    }
}

fn run_file(path: &str) -> Result<()> {
    let source = fs::read_to_string(path).with_context(|| format!("Reading {path}"))?;

    let program = match parser::parse_source(&source) {
        Ok(program) => program,
        Err(error) => {
            eprintln!("{error}");
            std::process::exit(1);
        }
    };

    let environment = Environment::new(None);
    interpreter::inject_builtin_functions(&environment);
    let object = interpreter::eval(&environment, &program);
    if let Object::Error(message) = object {
        eprintln!("{message}");
        std::process::exit(1);
    }
    Ok(())
}

fn run_repl() -> Result<()> {
    println!("Monkey language REPL (Read Eval Print Loop).");

    let stdin = io::stdin();
    let mut content = String::new();

    loop {
        print!("{PROMPT}");
        io::stdout().flush().context("Flushing prompt")?;

        let mut line = String::new();
        let read = stdin
            .lock()
            .read_line(&mut line)
            .context("Reading stdin")?;
        if read == 0 {
            return Ok(());
        }

        let mut current = line.trim().to_string();
        if current.is_empty() {
            continue;
        }
        if current == "exit" {
            return Ok(());
        }
        if !current.ends_with(';') {
            current.push(';');
        }

        // Each line is parsed together with everything accepted so far and
        // the whole program is re-evaluated in a fresh environment; lines
        // that fail to parse are reported and discarded.
        let program = match parser::parse_source(&format!("{content}{current}")) {
            Ok(program) => program,
            Err(error) => {
                println!("{error}");
                continue;
            }
        };
        content.push_str(&current);

        let environment = Environment::new(None);
        interpreter::inject_builtin_functions(&environment);
        let object = interpreter::eval(&environment, &program);
        println!("{}", object.inspect());
    }
}

// src/main.rs
use std::env;
use std::error::Error;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use sld_engine::{Answer, Machine, MachineError};

/// Command-line entry point: optionally consults a `.pl` file given as
/// the first argument, then drops into an interactive goal prompt.
fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    let args: Vec<String> = env::args().collect();
    let mut machine = Machine::new();

    if let Some(path) = args.get(1) {
        let source = fs::read_to_string(path)
            .unwrap_or_else(|e| panic!("failed to read file '{}': {}", path, e));
        machine = machine
            .consult(&source)
            .unwrap_or_else(|e| panic!("failed to consult '{}': {}", path, e));
        println!("Consulted {}.", path);
    }

    let mut rl = DefaultEditor::new()?;
    let history_path = PathBuf::from(".sldc_history");
    let _ = rl.load_history(&history_path);

    println!("sldc — enter a goal (a trailing '.' is optional), 'quit' to exit.");

    loop {
        match rl.readline("?- ") {
            Ok(line) => {
                let goal_src = line.trim();
                if goal_src.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(goal_src);
                if goal_src == "quit" || goal_src == "halt" || goal_src == "exit" {
                    break;
                }
                run_goal(&machine, goal_src);
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("readline error: {e}");
                break;
            }
        }
    }

    let _ = rl.save_history(&history_path);
    Ok(())
}

/// Proves `source` against `machine`, printing the first answer and then
/// offering to backtrack into further ones on `;`, matching a
/// traditional Prolog top-level.
fn run_goal(machine: &Machine, source: &str) {
    let mut proof = match machine.prove_all_source(source) {
        Ok(proof) => proof,
        Err(e) => {
            println!("Error: {e}");
            return;
        }
    };

    loop {
        match proof.next() {
            None => {
                println!("false.");
                return;
            }
            Some(Err(MachineError::StepBudgetExceeded)) => {
                println!("(step budget exceeded)");
                return;
            }
            Some(Err(e)) => {
                println!("Error: {e}");
                return;
            }
            Some(Ok(answer)) => {
                print_answer(&answer);
                if !wants_more() {
                    return;
                }
            }
        }
    }
}

fn print_answer(answer: &Answer) {
    if answer.bindings.is_empty() {
        println!("true.");
        return;
    }
    let mut entries: Vec<_> = answer.bindings.iter().collect();
    entries.sort_by_key(|(name, _)| name.to_string());
    for (name, term) in &entries {
        print!("{} = {}", name, term);
        print!(" ");
    }
    println!();
}

/// Reads a single keystroke-like line from stdin; `;` asks for the next
/// solution, anything else stops the search here.
fn wants_more() -> bool {
    print!("  ");
    let _ = io::stdout().flush();
    let mut line = String::new();
    if io::stdin().read_line(&mut line).is_err() {
        return false;
    }
    line.trim() == ";"
}


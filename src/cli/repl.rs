/*!
Batch file processing and the interactive REPL (spec §6,
`original_source/judged/__main__.py`'s `batch`/`interactive`/
`handle_reader`/`interactive_command`).
*/

use std::io::Write;

use judged::actions::Action;
use judged::context::{Answer, Context, QueryResult};
use judged::extensions::list_extensions;
use judged::parser::parse_program;
use judged::types::JudgedError;

/// Runs every action `program` contains against `ctx`, printing each
/// query's answers. Stops at the first error.
fn handle_program(
    ctx: &mut dyn Context,
    program: &[Action],
    verbose: bool,
    verbose_questions: bool,
) -> Result<(), JudgedError> {
    for action in program {
        if verbose || (verbose_questions && matches!(action, Action::Query(_))) {
            println!("% {action}");
        }
        let result = action.perform(ctx)?;
        if let Some(result) = result {
            print_query_result(&result);
        }
    }
    Ok(())
}

fn print_query_result(result: &QueryResult) {
    if let Some(iterations) = result.iterations {
        println!("% iterations: {iterations}");
    }
    if let Some(error) = result.error {
        println!("% error: {error}");
    }
    for Answer { clause, probability } in &result.answers {
        print!("{clause}.");
        if let Some(p) = probability {
            print!(" % p = {p}");
        }
        println!();
    }
}

/// Processes every file in turn, stopping at the first error
/// (`original_source/judged/__main__.py`'s `batch`: a single `break` on
/// error, not a per-file `continue`).
pub fn batch(
    ctx: &mut dyn Context,
    files: &[std::path::PathBuf],
    verbose: bool,
    verbose_questions: bool,
) -> Result<(), JudgedError> {
    for path in files {
        let outcome = (|| -> Result<(), JudgedError> {
            let source = std::fs::read_to_string(path)
                .map_err(|e| JudgedError::Extension(format!("could not read '{}': {e}", path.display())))?;
            let program = parse_program(&source)?;
            handle_program(ctx, &program, verbose, verbose_questions)
        })();

        if let Err(e) = outcome {
            eprintln!("{}: {e}", path.display());
            return Err(e);
        }
    }
    Ok(())
}

/// A REPL over stdin: lines starting with `.` dispatch to an interactive
/// command (`.kb`, `.ext`, `.help`), anything else is parsed and run as a
/// one-line program. Errors are reported and the loop continues.
pub fn interactive(ctx: &mut dyn Context, verbose: bool, verbose_questions: bool) {
    println!("JudgeD ^_^");
    println!();

    let stdin = std::io::stdin();
    let mut line = String::new();

    loop {
        print!("> ");
        let _ = std::io::stdout().flush();
        line.clear();
        match stdin.read_line(&mut line) {
            Ok(0) => {
                println!();
                break;
            }
            Ok(_) => {}
            Err(_) => break,
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if let Some(command) = trimmed.strip_prefix('.') {
            run_interactive_command(ctx, command);
            continue;
        }

        match parse_program(trimmed) {
            Ok(program) => {
                if let Err(e) = handle_program(ctx, &program, verbose, verbose_questions) {
                    println!("Error: {e}");
                }
            }
            Err(e) => println!("Error: {e}"),
        }
    }
}

fn run_interactive_command(ctx: &dyn Context, command: &str) {
    let mut parts = command.split_whitespace();
    match parts.next() {
        Some("help") => {
            println!("% Available commands:");
            println!("% .kb: Outputs the internal knowledge base");
            println!("% .ext [name]: Lists extensions, or the predicates an extension contributes");
            println!("% .help: Displays this message");
        }
        Some("kb") => {
            println!("% Outputting internal knowledge base:");
            for clause in ctx.knowledge().asserted_clauses() {
                println!("%   {clause}");
            }
        }
        Some("ext") => match parts.next() {
            None => {
                println!("% Available extensions:");
                for ext in list_extensions() {
                    println!("% {}", ext.name());
                }
            }
            Some(name) => match list_extensions().into_iter().find(|e| e.name() == name) {
                Some(ext) => {
                    println!("% Available predicates in {name}:");
                    for info in ext.predicate_infos() {
                        println!("%   {}", info.id());
                    }
                }
                None => println!("Error: unknown extension '{name}'"),
            },
        },
        _ => println!(
            "Error: unknown interactive command '{command}', type .help to get available commands"
        ),
    }
}

//! Command-line front end: consult a program, run one-shot queries, or
//! explore interactively.
#![forbid(unsafe_code)]

use hornlog::{parse_program, parse_query, query, Database, Settings, SolveError, Solutions};
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{Config, Editor};
use std::env;
use std::fs;
use std::path::PathBuf;
use std::process;

const VERSION: &str = env!("CARGO_PKG_VERSION");
const PROMPT: &str = "?- ";

fn print_usage(program: &str) {
    eprintln!("Usage: {} [options] [program-file]", program);
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -h, --help           Show this help message");
    eprintln!("  -v, --version        Show version information");
    eprintln!("  -q, --query <goal>   Run one query and exit");
    eprintln!("  -l, --limit <n>      Bound each query to <n> resolution steps");
    eprintln!();
    eprintln!("Without -q, starts an interactive session; type goals such as");
    eprintln!("  member(X, [a, b, c]).");
}

struct Options {
    file: Option<String>,
    one_shot: Option<String>,
    settings: Settings,
}

fn parse_args(args: &[String]) -> Options {
    let program = args[0].as_str();
    let mut options =
        Options { file: None, one_shot: None, settings: Settings::default() };
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_usage(program);
                process::exit(0);
            }
            "-v" | "--version" => {
                println!("hornlog {}", VERSION);
                process::exit(0);
            }
            "-q" | "--query" => {
                if i + 1 >= args.len() {
                    eprintln!("Error: {} requires a goal argument", args[i]);
                    process::exit(1);
                }
                options.one_shot = Some(args[i + 1].clone());
                i += 2;
            }
            "-l" | "--limit" => {
                if i + 1 >= args.len() {
                    eprintln!("Error: {} requires a number", args[i]);
                    process::exit(1);
                }
                match args[i + 1].parse::<u64>() {
                    Ok(n) => options.settings.max_iterations = Some(n),
                    Err(_) => {
                        eprintln!("Error: invalid step limit `{}`", args[i + 1]);
                        process::exit(1);
                    }
                }
                i += 2;
            }
            arg if arg.starts_with('-') => {
                eprintln!("Error: unknown option `{}`", arg);
                eprintln!("Try `{} --help` for usage information", program);
                process::exit(1);
            }
            arg => {
                if options.file.is_some() {
                    eprintln!("Error: more than one program file given");
                    process::exit(1);
                }
                options.file = Some(arg.to_string());
                i += 1;
            }
        }
    }
    options
}

fn load_database(path: Option<&str>) -> Database {
    let source = match path {
        Some(path) => match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) => {
                eprintln!("Error: cannot read {}: {}", path, err);
                process::exit(1);
            }
        },
        None => return Database::new(),
    };
    match parse_program(&source) {
        Ok(rules) => Database::from_rules(rules),
        Err(err) => {
            eprintln!("{}", err);
            process::exit(2);
        }
    }
}

/// Prints every solution of `solutions`; reports how the query ended.
fn print_solutions(mut solutions: Solutions<'_>) -> Result<bool, SolveError> {
    let mut any = false;
    while solutions.next_solution()? {
        any = true;
        if let Some(row) = solutions.current() {
            if row.is_empty() {
                println!("true.");
            } else {
                let mut names: Vec<&String> = row.keys().collect();
                names.sort();
                let rendered: Vec<String> =
                    names.iter().map(|name| format!("{} = {}", name, row[*name])).collect();
                println!("{}.", rendered.join(", "));
            }
        }
    }
    if !any {
        println!("false.");
    }
    Ok(any)
}

fn run_query(db: &Database, source: &str, settings: &Settings) -> bool {
    let goals = match parse_query(source) {
        Ok(goals) => goals,
        Err(err) => {
            eprintln!("{}", err);
            return false;
        }
    };
    match print_solutions(query(db, &goals, settings.clone())) {
        Ok(any) => any,
        Err(err) => {
            eprintln!("Error: {}", err);
            false
        }
    }
}

fn repl(db: &Database, settings: &Settings) {
    println!("hornlog {} - Horn-clause logic engine", VERSION);
    println!("Type a goal such as `member(X, [a, b, c]).`; Ctrl-D exits.");
    println!();

    let config = Config::builder().auto_add_history(true).build();
    let mut editor: Editor<(), DefaultHistory> = match Editor::with_config(config) {
        Ok(editor) => editor,
        Err(err) => {
            eprintln!("Error: cannot start line editor: {}", err);
            process::exit(1);
        }
    };

    let history_path = history_path();
    if let Some(path) = &history_path {
        let _ = editor.load_history(path);
    }

    loop {
        match editor.readline(PROMPT) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                run_query(db, line, settings);
            }
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("Error: {}", err);
                break;
            }
        }
    }

    if let Some(path) = &history_path {
        if let Some(dir) = path.parent() {
            let _ = fs::create_dir_all(dir);
        }
        let _ = editor.save_history(path);
    }
}

/// `$HOME/.config/hornlog/history`; `None` when no home directory is set.
fn history_path() -> Option<PathBuf> {
    env::var("HOME").ok().map(|home| {
        let mut path = PathBuf::from(home);
        path.push(".config");
        path.push("hornlog");
        path.push("history");
        path
    })
}

fn main() {
    let args: Vec<String> = env::args().collect();
    let options = parse_args(&args);
    let db = load_database(options.file.as_deref());

    match &options.one_shot {
        Some(goal) => {
            let found = run_query(&db, goal, &options.settings);
            process::exit(if found { 0 } else { 1 });
        }
        None => repl(&db, &options.settings),
    }
}

#[cfg(test)]
mod tests {
    use super::parse_args;

    #[test]
    fn args_pick_up_file_query_and_limit() {
        let args: Vec<String> = ["hornlog", "-q", "p(X).", "-l", "500", "family.pl"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let options = parse_args(&args);
        assert_eq!(options.file.as_deref(), Some("family.pl"));
        assert_eq!(options.one_shot.as_deref(), Some("p(X)."));
        assert_eq!(options.settings.max_iterations, Some(500));
    }
}

//! Command-line front end: feed a JSON pagination request through the
//! engine and print the laid-out pages as JSON.
//!
//! ```text
//! galley request.json          # read a request file
//! galley -                     # read the request from stdin
//! ```

use std::env;
use std::fs;
use std::io::Read;
use std::process::ExitCode;

fn usage() -> ExitCode {
    eprintln!("usage: galley <request.json | ->");
    eprintln!();
    eprintln!("Reads a JSON pagination request (records + layout description");
    eprintln!("+ page options) and writes the laid-out pages to stdout.");
    ExitCode::FAILURE
}

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    let input = match args.as_slice() {
        [path] if path == "-" => {
            let mut buffer = String::new();
            if let Err(err) = std::io::stdin().read_to_string(&mut buffer) {
                eprintln!("galley: failed to read stdin: {err}");
                return ExitCode::FAILURE;
            }
            buffer
        }
        [path] => match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) => {
                eprintln!("galley: failed to read {path}: {err}");
                return ExitCode::FAILURE;
            }
        },
        _ => return usage(),
    };

    match galley::paginate_json(&input) {
        Ok(pages) => {
            println!("{pages}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("galley: {err}");
            ExitCode::FAILURE
        }
    }
}

use std::io::{self, BufRead, IsTerminal, Write};
use std::time::Duration;

use clap::Parser;

use crate::cli::commands::Cli;
use crate::cli::handlers::{CmdResult, Session, run_command};

const SHELL_HELP: &str = "\
Enter any tally command without the leading `tally`, e.g. `inc LIST ITEM`.
Shell commands:
  pending     show lists waiting to be re-sorted
  wait MS     sleep, then apply any re-sorts that came due
  help        show this help
  exit, quit  leave the shell";

/// Read commands from stdin against one live session, so continuous edits
/// re-sort only after the cooldown
pub fn run(session: &mut Session) -> CmdResult {
    let stdin = io::stdin();
    let interactive = stdin.is_terminal();
    let mut lines = stdin.lock().lines();

    loop {
        report_resorted(session);
        if interactive {
            print!("tally> ");
            io::stdout().flush()?;
        }
        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        match line {
            "exit" | "quit" => break,
            "help" => {
                println!("{}", SHELL_HELP);
                continue;
            }
            "pending" => {
                print_pending(session);
                continue;
            }
            _ => {}
        }

        let words = match split_words(line) {
            Ok(words) => words,
            Err(e) => {
                eprintln!("error: {}", e);
                continue;
            }
        };

        if words[0] == "wait" {
            match words.get(1).and_then(|ms| ms.parse::<u64>().ok()) {
                Some(ms) => std::thread::sleep(Duration::from_millis(ms)),
                None => eprintln!("error: usage: wait MS"),
            }
            continue;
        }

        let argv = std::iter::once("tally".to_string()).chain(words);
        match Cli::try_parse_from(argv) {
            Ok(cli) => {
                if cli.data_dir.is_some() {
                    eprintln!("note: -C is ignored inside the shell");
                }
                if let Err(e) = run_command(session, cli.command, cli.json) {
                    eprintln!("error: {}", e);
                }
            }
            Err(e) => {
                // clap renders help and usage errors itself
                let _ = e.print();
            }
        }
    }
    Ok(())
}

fn report_resorted(session: &mut Session) {
    for list_id in session.tracker.tick() {
        println!("(re-sorted {})", list_id);
    }
}

fn print_pending(session: &Session) {
    let mut any = false;
    for list in &session.tracker.state().lists {
        if let Some(remaining) = session.tracker.cooldown_remaining(&list.id) {
            println!("{} re-sorts in {:.1}s", list.id, remaining.as_secs_f64());
            any = true;
        }
    }
    if !any {
        println!("nothing pending");
    }
}

/// Split a shell line into words. Single or double quotes group words;
/// there are no escapes.
pub fn split_words(line: &str) -> Result<Vec<String>, String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;

    for c in line.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_word = true;
            }
            None if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            None => {
                current.push(c);
                in_word = true;
            }
        }
    }
    if let Some(q) = quote {
        return Err(format!("unclosed {} quote", q));
    }
    if in_word {
        words.push(current);
    }
    if words.is_empty() {
        return Err("empty command".to_string());
    }
    Ok(words)
}

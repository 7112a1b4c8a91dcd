use std::io::{self, BufRead, Write};

/// Asks the user a yes/no question.
#[cfg_attr(test, mockall::automock)]
pub trait Confirm: Send + Sync {
    fn confirm(&self, prompt: &str, default: bool) -> bool;
}

/// Prompts on stdout and blocks on stdin.
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&self, prompt: &str, default: bool) -> bool {
        let stdin = io::stdin();
        read_answer(&mut stdin.lock(), &mut io::stdout(), prompt, default)
    }
}

/// Print `prompt` and read until the answer is `y`/`Y`, `n`/`N` or empty.
/// Empty input and end of input both give `default`; anything else asks again.
pub fn read_answer<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    prompt: &str,
    default: bool,
) -> bool {
    loop {
        let _ = write!(output, "{prompt}");
        let _ = output.flush();

        let mut line = String::new();
        match input.read_line(&mut line) {
            Ok(0) | Err(_) => return default,
            Ok(_) => {}
        }
        match line.trim_end_matches(['\r', '\n']) {
            "" => return default,
            "y" | "Y" => return true,
            "n" | "N" => return false,
            _ => continue,
        }
    }
}

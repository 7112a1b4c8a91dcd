use std::io::{self, IsTerminal};

use crossterm::style::{StyledContent, Stylize};

/// Console output for the user. Quiet mode silences everything except errors.
#[derive(Debug, Clone, Copy)]
pub struct Printer {
    quiet: bool,
    color: bool,
}

impl Printer {
    pub fn new(quiet: bool) -> Self {
        Self {
            quiet,
            color: io::stdout().is_terminal(),
        }
    }

    /// A printer that never colors.
    #[cfg(test)]
    pub fn plain(quiet: bool) -> Self {
        Self { quiet, color: false }
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    pub fn bold(&self, msg: &str) {
        if !self.quiet {
            println!("{}", self.paint(msg.bold()));
        }
    }

    pub fn info(&self, msg: &str) {
        self.tagged("info", msg, |tag| tag.blue());
    }

    pub fn success(&self, msg: &str) {
        self.tagged("success", msg, |tag| tag.green());
    }

    pub fn warning(&self, msg: &str) {
        self.tagged("warning", msg, |tag| tag.yellow());
    }

    pub fn error(&self, msg: &str) {
        eprintln!("{}", self.format("error", msg, |tag| tag.red()));
    }

    fn tagged(&self, tag: &str, msg: &str, style: fn(&str) -> StyledContent<&str>) {
        if !self.quiet {
            println!("{}", self.format(tag, msg, style));
        }
    }

    fn format(&self, tag: &str, msg: &str, style: fn(&str) -> StyledContent<&str>) -> String {
        format!("{} {}", self.paint(style(tag).bold()), msg)
    }

    fn paint(&self, content: StyledContent<&str>) -> String {
        if self.color {
            content.to_string()
        } else {
            content.content().to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_format_has_no_escape_codes() {
        let printer = Printer::plain(false);
        let line = printer.format("success", "spotify spiced up", |tag| tag.green());
        assert_eq!(line, "success spotify spiced up");
    }

    #[test]
    fn test_colored_format_wraps_tag() {
        let printer = Printer {
            quiet: false,
            color: true,
        };
        let line = printer.format("error", "boom", |tag| tag.red());
        assert!(line.contains('\u{1b}'));
        assert!(line.ends_with(" boom"));
    }

    #[test]
    fn test_quiet_flag() {
        assert!(Printer::plain(true).is_quiet());
        assert!(!Printer::plain(false).is_quiet());
    }
}

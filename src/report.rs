// Status Reporting
// Human-readable step lines; informational only, not a protocol

/// Collects status lines and echoes them to stdout
#[derive(Debug)]
pub struct Reporter {
    lines: Vec<String>,
    echo: bool,
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Reporter {
    /// Reporter that prints every line
    pub fn new() -> Self {
        Self {
            lines: Vec::new(),
            echo: true,
        }
    }

    /// Reporter that only records, for tests and dry planning
    pub fn silent() -> Self {
        Self {
            lines: Vec::new(),
            echo: false,
        }
    }

    /// A step being taken
    pub fn step(&mut self, text: impl AsRef<str>) {
        self.push("->", text.as_ref());
    }

    /// A step that finished
    pub fn done(&mut self, text: impl AsRef<str>) {
        self.push("ok", text.as_ref());
    }

    /// Something the user should know about but that does not stop the run
    pub fn warn(&mut self, text: impl AsRef<str>) {
        self.push("!!", text.as_ref());
    }

    /// A failure that ends the current action
    pub fn fail(&mut self, text: impl AsRef<str>) {
        self.push("xx", text.as_ref());
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    fn push(&mut self, marker: &str, text: &str) {
        let line = format!("{} {}", marker, text);
        if self.echo {
            println!("{}", line);
        }
        self.lines.push(line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines_are_recorded_in_order() {
        let mut reporter = Reporter::silent();
        reporter.step("copying");
        reporter.warn("secret missing");
        reporter.done("copied 3 files");

        assert_eq!(
            reporter.lines(),
            &["-> copying", "!! secret missing", "ok copied 3 files"]
        );
    }
}

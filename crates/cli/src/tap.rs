use std::io::{self, Write};

/// TAP (Test Anything Protocol) v14 report for the conformance runner.
#[derive(Default)]
pub struct Tap {
    results: Vec<TapResult>,
}

struct TapResult {
    name: String,
    failure: Option<String>,
}

impl Tap {
    pub fn new() -> Self {
        Tap::default()
    }

    pub fn ok(&mut self, name: impl Into<String>) {
        self.results.push(TapResult {
            name: name.into(),
            failure: None,
        });
    }

    pub fn not_ok(&mut self, name: impl Into<String>, diagnostics: impl Into<String>) {
        self.results.push(TapResult {
            name: name.into(),
            failure: Some(diagnostics.into()),
        });
    }

    pub fn failure_count(&self) -> usize {
        self.results.iter().filter(|r| r.failure.is_some()).count()
    }

    /// Write the report. Diagnostics of failed tests are indented `# ` lines.
    pub fn write_to(&self, out: &mut impl Write) -> io::Result<()> {
        writeln!(out, "TAP version 14")?;
        writeln!(out, "1..{}", self.results.len())?;
        for (i, r) in self.results.iter().enumerate() {
            match &r.failure {
                None => writeln!(out, "ok {} - {}", i + 1, r.name)?,
                Some(diag) => {
                    writeln!(out, "not ok {} - {}", i + 1, r.name)?;
                    for line in diag.lines() {
                        writeln!(out, "  # {}", line)?;
                    }
                }
            }
        }
        let failed = self.failure_count();
        writeln!(out, "# tests {}", self.results.len())?;
        writeln!(out, "# pass  {}", self.results.len() - failed)?;
        writeln!(out, "# fail  {}", failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_numbers_tests_and_indents_diagnostics() {
        let mut tap = Tap::new();
        tap.ok("positive/a");
        tap.not_ok("negative/b", "line one\nline two");
        let mut buf = Vec::new();
        tap.write_to(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(
            text,
            "TAP version 14\n1..2\nok 1 - positive/a\nnot ok 2 - negative/b\n  # line one\n  # line two\n# tests 2\n# pass  1\n# fail  1\n"
        );
        assert_eq!(tap.failure_count(), 1);
    }
}

use std::io::{self, Stdout, Write};

use colored::{Color, Colorize};
use supports_color::Stream;

use crate::application::runner::{Outcome, Summary};
use crate::script::Operation;
use crate::tree::Status;

const LISTING_INDENT: &str = "      ";

/// Human-readable account of a script run.
pub struct Report<W> {
    writer: W,
    use_color: bool,
}

impl Report<Stdout> {
    /// Writes to stdout, colorized when the terminal supports it.
    pub fn stdout() -> Self {
        Self::new(io::stdout(), supports_color::on(Stream::Stdout).is_some())
    }
}

impl<W: Write> Report<W> {
    pub fn new(writer: W, use_color: bool) -> Self {
        Self { writer, use_color }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    /// One line per step. Multi-line details such as listings follow on
    /// their own indented lines.
    pub fn step(
        &mut self,
        index: usize,
        operation: &Operation,
        outcome: &Outcome,
        expected: Option<Status>,
    ) -> io::Result<()> {
        let status_color = match outcome.status {
            Status::Success => Color::Green,
            _ => Color::Yellow,
        };
        let status = self.paint(&outcome.status.to_string(), status_color);
        write!(self.writer, "{:>4}  {:<40} {}", index, operation.to_string(), status)?;

        let block = match outcome.detail.as_deref() {
            Some(detail) if detail.contains('\n') => Some(detail),
            Some(detail) if !detail.is_empty() => {
                write!(self.writer, " ({})", detail)?;
                None
            }
            _ => None,
        };

        if let Some(expected) = expected.filter(|expected| *expected != outcome.status) {
            let note = self.paint(&format!("expected {expected}"), Color::Red);
            write!(self.writer, " [{}]", note)?;
        }
        writeln!(self.writer)?;

        for line in block.into_iter().flat_map(str::lines) {
            writeln!(self.writer, "{}{}", LISTING_INDENT, line)?;
        }
        Ok(())
    }

    pub fn summary(&mut self, summary: &Summary) -> io::Result<()> {
        let unmet = format!("{} unmet", summary.unmet);
        let unmet = match summary.unmet {
            0 => unmet,
            _ => self.paint(&unmet, Color::Red),
        };
        writeln!(self.writer, "{} steps, {}", summary.steps, unmet)?;
        self.writer.flush()
    }

    fn paint(&self, text: &str, color: Color) -> String {
        if self.use_color {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(outcome: Outcome, expected: Option<Status>) -> String {
        let mut report = Report::new(Vec::new(), false);
        let operation = Operation::Stat { path: "a/b".into() };
        report.step(3, &operation, &outcome, expected).unwrap();
        String::from_utf8(report.into_inner()).unwrap()
    }

    #[test]
    fn single_line_detail_stays_inline() {
        let output = render(
            Outcome {
                status: Status::Success,
                detail: Some("directory".into()),
            },
            None,
        );
        assert_eq!(output, format!("   3  {:<40} success (directory)\n", "stat a/b"));
    }

    #[test]
    fn listing_goes_below_the_step() {
        let output = render(
            Outcome {
                status: Status::Success,
                detail: Some("a\na/b\n".into()),
            },
            None,
        );
        assert!(output.ends_with("success\n      a\n      a/b\n"));
    }

    #[test]
    fn empty_detail_prints_nothing() {
        let output = render(
            Outcome {
                status: Status::Success,
                detail: Some(String::new()),
            },
            None,
        );
        assert_eq!(output, format!("   3  {:<40} success\n", "stat a/b"));
    }

    #[test]
    fn missed_expectation_is_marked() {
        let output = render(
            Outcome {
                status: Status::NoSuchPath,
                detail: None,
            },
            Some(Status::Success),
        );
        assert!(output.ends_with("no_such_path [expected success]\n"));
    }

    #[test]
    fn summary_counts_steps() {
        let mut report = Report::new(Vec::new(), false);
        report.summary(&Summary { steps: 4, unmet: 1 }).unwrap();
        assert_eq!(report.into_inner(), b"4 steps, 1 unmet\n");
    }
}

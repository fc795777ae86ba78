//! Terminal front end: writes a preview image, prints the candidate and
//! reads one-letter commands.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use renderer::{render_scan, QuiverConfig, ScanView};
use ring_common::{EventRecord, WindGrid};

use crate::session::Action;

/// What the reviewer typed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Apply(Action),
    /// Stop without writing anything.
    Quit,
}

impl Command {
    /// `t` closed ring, `f` not closed ring, `x` exclude, `b` back, `q` quit.
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "t" => Some(Command::Apply(Action::ConfirmPositive)),
            "f" => Some(Command::Apply(Action::ConfirmNegative)),
            "x" => Some(Command::Apply(Action::Exclude)),
            "b" => Some(Command::Apply(Action::Undo)),
            "q" => Some(Command::Quit),
            _ => None,
        }
    }
}

/// The candidate being shown.
#[derive(Debug, Clone, Copy)]
pub struct CandidateView<'a> {
    /// Zero-based position among the candidates
    pub position: usize,
    pub total: usize,
    pub record: &'a EventRecord,
    pub grid: &'a WindGrid,
}

/// Presents candidates and collects commands.
pub trait Frontend {
    fn present(&mut self, view: &CandidateView<'_>) -> Result<()>;

    fn read_command(&mut self) -> Result<Command>;
}

const HELP: &str = "[t] closed ring  [f] not a closed ring  [x] do not include  [b] back  [q] quit";

/// Line-oriented front end over any reader/writer pair.
pub struct TerminalFrontend<R, W> {
    input: R,
    output: W,
    preview: PathBuf,
    window_size: f64,
    quiver: QuiverConfig,
}

impl<R: BufRead, W: Write> TerminalFrontend<R, W> {
    pub fn new(input: R, output: W, preview: impl Into<PathBuf>, window_size: f64) -> Self {
        Self {
            input,
            output,
            preview: preview.into(),
            window_size,
            quiver: QuiverConfig::default(),
        }
    }

    pub fn preview_path(&self) -> &Path {
        &self.preview
    }

    pub fn into_output(self) -> W {
        self.output
    }
}

impl<R: BufRead, W: Write> Frontend for TerminalFrontend<R, W> {
    fn present(&mut self, view: &CandidateView<'_>) -> Result<()> {
        let record = view.record;
        let config = QuiverConfig {
            title: Some(record.file_name.clone()),
            ..self.quiver.clone()
        };
        let png = render_scan(
            view.grid,
            &ScanView::around(record.center(), self.window_size),
            &config,
        )
        .with_context(|| format!("Failed to render {}", record.file_name))?;
        std::fs::write(&self.preview, png)
            .with_context(|| format!("Failed to write preview: {}", self.preview.display()))?;

        let secondary = record
            .secondary_label
            .map(|l| l.to_string())
            .unwrap_or_else(|| "-".to_string());
        writeln!(
            self.output,
            "\n[{}/{}] {}  cyclone {}  centre ({:.2}, {:.2})  label {}  slabel {}",
            view.position + 1,
            view.total,
            record.file_name,
            record.cyclone_id,
            record.lon,
            record.lat,
            record.label,
            secondary
        )?;
        writeln!(self.output, "preview: {}", self.preview.display())?;
        Ok(())
    }

    fn read_command(&mut self) -> Result<Command> {
        loop {
            write!(self.output, "{} > ", HELP)?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                // End of input behaves like quitting.
                return Ok(Command::Quit);
            }
            match Command::parse(&line) {
                Some(command) => return Ok(command),
                None => writeln!(self.output, "unknown command: {:?}", line.trim())?,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("t\n"), Some(Command::Apply(Action::ConfirmPositive)));
        assert_eq!(Command::parse(" F "), Some(Command::Apply(Action::ConfirmNegative)));
        assert_eq!(Command::parse("x"), Some(Command::Apply(Action::Exclude)));
        assert_eq!(Command::parse("b"), Some(Command::Apply(Action::Undo)));
        assert_eq!(Command::parse("q"), Some(Command::Quit));
        assert_eq!(Command::parse("yes"), None);
    }

    #[test]
    fn test_read_command_skips_unknown_input() {
        let mut frontend =
            TerminalFrontend::new(Cursor::new("?\n\nt\n"), Vec::new(), "unused.png", 3.0);
        assert_eq!(
            frontend.read_command().unwrap(),
            Command::Apply(Action::ConfirmPositive)
        );
        let out = String::from_utf8(frontend.into_output()).unwrap();
        assert_eq!(out.matches("unknown command").count(), 2);
    }

    #[test]
    fn test_end_of_input_quits() {
        let mut frontend = TerminalFrontend::new(Cursor::new(""), Vec::new(), "unused.png", 3.0);
        assert_eq!(frontend.read_command().unwrap(), Command::Quit);
    }
}

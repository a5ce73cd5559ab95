// UI utilities - console summary, lookup progress and the interactive chart

use console::{style, Key, Term};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use tracing::debug;

use crate::chart::{BarChart, CHART_HEIGHT, CHART_WIDTH};
use crate::error::{Error, Result};
use crate::types::AsnSummary;

/// Create a progress bar for the ASN lookups
pub fn create_progress(len: usize) -> ProgressBar {
    let progress = ProgressBar::new(len as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
    );
    progress
}

/// Format one ASN summary line
pub fn format_summary(summary: &AsnSummary) -> String {
    format!(
        "ASN: {}, ASName: {}, Count: {}",
        summary.asn.0, summary.name, summary.count
    )
}

/// Print the peer count and one line per ASN
pub fn print_summary(n_peers: &str, summaries: &[AsnSummary]) {
    println!("Number of Peers: {}", style(n_peers).bold());
    for summary in summaries {
        println!("{}", format_summary(summary));
    }
}

/// Print error message
pub fn print_error(message: &str) {
    eprintln!("{}", style(format!("  ❌ {}", message)).red());
}

/// Size the chart to the terminal, never larger than the fixed chart region
fn fit_chart(summaries: &[AsnSummary], rows: u16, cols: u16) -> BarChart {
    BarChart::with_size(
        summaries,
        (cols as usize).min(CHART_WIDTH),
        (rows as usize).min(CHART_HEIGHT),
    )
}

/// Whether a key press ends the chart view
fn is_quit_key(key: &Key) -> bool {
    matches!(key, Key::Char('q') | Key::Char('\u{3}'))
}

/// Full-screen terminal for the chart
///
/// The screen is cleared and the cursor hidden while the session lives.
/// Dropping it restores the cursor and clears the chart, on every exit path.
pub struct TerminalSession {
    term: Term,
}

impl TerminalSession {
    /// Acquire the terminal. Fails when stdout is not an interactive terminal.
    pub fn init() -> Result<Self> {
        let term = Term::stdout();
        if !term.is_term() {
            return Err(Error::UiInit("stdout is not a terminal".to_string()));
        }

        term.clear_screen()
            .map_err(|e| Error::UiInit(e.to_string()))?;
        term.hide_cursor()
            .map_err(|e| Error::UiInit(e.to_string()))?;

        debug!("terminal session started");
        Ok(Self { term })
    }

    /// Draw the chart and the legend under it
    pub fn render(&self, summaries: &[AsnSummary]) -> Result<()> {
        let (rows, cols) = self.term.size();
        let chart = fit_chart(summaries, rows, cols);
        debug!(rows, cols, bars = chart.visible_bars(), "rendering chart");

        for (i, line) in chart.lines().into_iter().enumerate() {
            if i == 0 {
                self.term.write_line(&style(line).cyan().bold().to_string())?;
            } else {
                self.term.write_line(&style(line).cyan().to_string())?;
            }
        }

        self.term.write_line("")?;
        for summary in summaries {
            self.term.write_line(&format_summary(summary))?;
        }
        self.term.write_line("")?;
        self.term
            .write_line(&style("Press q to quit").dim().to_string())?;
        Ok(())
    }

    /// Block until the user presses the quit key or Ctrl-C. Other keys are ignored.
    pub fn wait_for_quit(&self) -> Result<()> {
        loop {
            match self.term.read_key() {
                Ok(key) if is_quit_key(&key) => return Ok(()),
                Ok(_) => {}
                // Ctrl-C while the terminal is in raw mode
                Err(e) if e.kind() == io::ErrorKind::Interrupted => return Ok(()),
                Err(e) => return Err(Error::Terminal(e)),
            }
        }
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = self.term.show_cursor();
        let _ = self.term.clear_screen();
        debug!("terminal session closed");
    }
}

/// Draw the chart and wait for the quit key
pub fn show_chart(summaries: &[AsnSummary]) -> Result<()> {
    let session = TerminalSession::init()?;
    session.render(summaries)?;
    session.wait_for_quit()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Asn;

    #[test]
    fn test_format_summary() {
        let summary = AsnSummary {
            asn: Asn(100),
            name: "ExampleOrgLongName".to_string(),
            count: 3,
        };
        assert_eq!(
            format_summary(&summary),
            "ASN: 100, ASName: ExampleOrgLongName, Count: 3"
        );
    }

    #[test]
    fn test_chart_fits_narrow_terminal() {
        let summaries: Vec<AsnSummary> = (0..12)
            .map(|i| AsnSummary {
                asn: Asn(64500 + i),
                name: "ExampleOrgLongName".to_string(),
                count: 12 - i as usize,
            })
            .collect();

        let chart = fit_chart(&summaries, 24, 80);
        let lines = chart.lines();

        assert_eq!(lines.len(), 24);
        assert!(lines.iter().all(|l| l.chars().count() <= 80));
        assert!(lines[0].contains(crate::chart::CHART_TITLE));
        assert_eq!(chart.visible_bars(), 7);
    }

    #[test]
    fn test_chart_capped_on_wide_terminal() {
        let lines = fit_chart(&[], 60, 300).lines();
        assert_eq!(lines.len(), CHART_HEIGHT);
        assert!(lines.iter().all(|l| l.chars().count() == CHART_WIDTH));
    }

    #[test]
    fn test_quit_keys() {
        assert!(is_quit_key(&Key::Char('q')));
        assert!(is_quit_key(&Key::Char('\u{3}')));
        assert!(!is_quit_key(&Key::Escape));
        assert!(!is_quit_key(&Key::Char('x')));
        assert!(!is_quit_key(&Key::Enter));
        assert!(!is_quit_key(&Key::ArrowUp));
    }

    #[test]
    fn test_progress_counts_lookups() {
        let progress = create_progress(3);
        assert_eq!(progress.length(), Some(3));
    }
}

// Bar chart layout - turns ASN summaries into the lines drawn on screen

use crate::types::AsnSummary;

pub const CHART_TITLE: &str = "Peers per ASN Chart";

/// Largest chart region (columns x rows, border included); smaller terminals shrink it
pub const CHART_WIDTH: usize = 170;
pub const CHART_HEIGHT: usize = 25;

const BAR_WIDTH: usize = 10;
const BAR_GAP: usize = 1;
const MAX_LABEL_CHARS: usize = 10;
const LABEL_KEEP_CHARS: usize = 7;
const ELLIPSIS: &str = "...";

const BAR_CELL: char = '█';

/// Shorten an AS name to fit under a bar
///
/// Names of at most 10 characters pass through. Longer ones keep their first
/// 7 characters followed by `...`.
pub fn truncate_label(name: &str) -> String {
    if name.chars().count() <= MAX_LABEL_CHARS {
        return name.to_string();
    }
    let mut label: String = name.chars().take(LABEL_KEEP_CHARS).collect();
    label.push_str(ELLIPSIS);
    label
}

/// Vertical bar chart, one bar per ASN
#[derive(Debug, Clone)]
pub struct BarChart {
    title: String,
    width: usize,
    height: usize,
    bars: Vec<(String, usize)>,
}

impl BarChart {
    /// Build the chart for summaries already sorted for display
    pub fn with_size(summaries: &[AsnSummary], width: usize, height: usize) -> Self {
        Self {
            title: CHART_TITLE.to_string(),
            width: width.max(BAR_WIDTH + 2),
            height: height.max(5),
            bars: summaries
                .iter()
                .map(|s| (truncate_label(&s.name), s.count))
                .collect(),
        }
    }

    fn inner_width(&self) -> usize {
        self.width - 2
    }

    /// Rows available to bar bodies (the last two inner rows hold counts and labels)
    fn bar_rows(&self) -> usize {
        self.height - 4
    }

    /// Number of bars that fit horizontally
    pub fn visible_bars(&self) -> usize {
        let fit = (self.inner_width() + BAR_GAP) / (BAR_WIDTH + BAR_GAP);
        fit.min(self.bars.len())
    }

    fn bar_height(&self, count: usize, max: usize) -> usize {
        if count == 0 || max == 0 {
            return 0;
        }
        let rows = self.bar_rows();
        ((count * rows + max / 2) / max).clamp(1, rows)
    }

    /// Render the chart as `height` lines of `width` characters each
    pub fn lines(&self) -> Vec<String> {
        let inner = self.inner_width();
        let visible = &self.bars[..self.visible_bars()];
        let max = visible.iter().map(|(_, c)| *c).max().unwrap_or(0);
        let heights: Vec<usize> = visible.iter().map(|(_, c)| self.bar_height(*c, max)).collect();

        let mut lines = Vec::with_capacity(self.height);
        lines.push(self.top_border());

        let rows = self.bar_rows();
        for row in 0..rows {
            let level = rows - row;
            let body = self.row(inner, visible.len(), |i| {
                if heights[i] >= level {
                    BAR_CELL.to_string().repeat(BAR_WIDTH)
                } else {
                    " ".repeat(BAR_WIDTH)
                }
            });
            lines.push(format!("│{}│", body));
        }

        let counts = self.row(inner, visible.len(), |i| {
            format!("{:^width$}", visible[i].1, width = BAR_WIDTH)
        });
        lines.push(format!("│{}│", counts));

        let labels = self.row(inner, visible.len(), |i| {
            format!("{:^width$}", visible[i].0, width = BAR_WIDTH)
        });
        lines.push(format!("│{}│", labels));

        lines.push(format!("└{}┘", "─".repeat(inner)));
        lines
    }

    /// Lay out one cell per visible bar, padded to the inner width
    fn row(&self, inner: usize, count: usize, cell: impl Fn(usize) -> String) -> String {
        let mut line = String::with_capacity(inner * 3);
        let mut used = 0;
        for i in 0..count {
            if i > 0 {
                line.push_str(&" ".repeat(BAR_GAP));
                used += BAR_GAP;
            }
            line.push_str(&cell(i));
            used += BAR_WIDTH;
        }
        line.push_str(&" ".repeat(inner.saturating_sub(used)));
        line
    }

    fn top_border(&self) -> String {
        let inner = self.inner_width();
        let title: String = self.title.chars().take(inner).collect();
        let rest = inner - title.chars().count();
        format!("┌{}{}┐", title, "─".repeat(rest))
    }
}

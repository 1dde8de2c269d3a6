//! Plain-text tables and cards sized to the terminal.

use console::{Alignment, measure_text_width, pad_str, style, truncate_str};

pub const DEFAULT_WIDTH: usize = 100;
const MIN_COLUMN: usize = 4;
const GAP: &str = "  ";

/// Current terminal width, or [`DEFAULT_WIDTH`] when not attached to one.
pub fn terminal_width() -> usize {
    terminal_size::terminal_size()
        .map(|(terminal_size::Width(w), _)| w as usize)
        .unwrap_or(DEFAULT_WIDTH)
}

#[derive(Debug, Clone, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn row<I, S>(&mut self, cells: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut cells: Vec<String> = cells.into_iter().map(Into::into).collect();
        cells.resize(self.headers.len(), String::new());
        self.rows.push(cells);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Natural column widths, shrinking the widest columns until the row
    /// fits in `width`.
    fn column_widths(&self, width: usize) -> Vec<usize> {
        let mut widths: Vec<usize> = self
            .headers
            .iter()
            .enumerate()
            .map(|(i, h)| {
                self.rows
                    .iter()
                    .map(|r| measure_text_width(&r[i]))
                    .chain(std::iter::once(measure_text_width(h)))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let gaps = GAP.len() * widths.len().saturating_sub(1);
        while widths.iter().sum::<usize>() + gaps > width {
            let Some((idx, widest)) = widths
                .iter()
                .copied()
                .enumerate()
                .max_by_key(|(_, w)| *w)
            else {
                break;
            };
            if widest <= MIN_COLUMN {
                break;
            }
            widths[idx] = widest - 1;
        }
        widths
    }

    pub fn render(&self, width: usize) -> String {
        let widths = self.column_widths(width);
        let line = |cells: &[String]| -> String {
            cells
                .iter()
                .zip(&widths)
                .map(|(cell, w)| {
                    let cut = truncate_str(cell, *w, "…");
                    pad_str(&cut, *w, Alignment::Left, None).into_owned()
                })
                .collect::<Vec<_>>()
                .join(GAP)
                .trim_end()
                .to_string()
        };

        let mut out = String::new();
        out.push_str(&style(line(&self.headers)).bold().to_string());
        out.push('\n');
        let rule: Vec<String> = widths.iter().map(|w| "─".repeat(*w)).collect();
        out.push_str(&style(rule.join(GAP)).dim().to_string());
        out.push('\n');
        for row in &self.rows {
            out.push_str(&line(row));
            out.push('\n');
        }
        out
    }
}

/// One entity rendered as a titled block of label/value lines.
#[derive(Debug, Clone, Default)]
pub struct Card {
    pub title: String,
    pub fields: Vec<(String, String)>,
}

impl Card {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, label: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((label.into(), value.into()));
        self
    }

    pub fn render(&self, width: usize) -> String {
        let label_width = self
            .fields
            .iter()
            .map(|(l, _)| measure_text_width(l))
            .max()
            .unwrap_or(0);
        let value_width = width.saturating_sub(label_width + 4).max(10);
        let indent = " ".repeat(label_width + 4);

        let mut out = format!("{}\n", style(&self.title).bold());
        for (label, value) in &self.fields {
            let wrapped = textwrap::wrap(value, value_width);
            let label = pad_str(label, label_width, Alignment::Left, None);
            let mut lines = wrapped.iter();
            let first = lines.next().map(|l| l.as_ref()).unwrap_or("");
            out.push_str(&format!("  {}  {}\n", style(label).dim(), first));
            for rest in lines {
                out.push_str(&format!("{}{}\n", indent, rest));
            }
        }
        out
    }
}

pub fn render_cards(cards: &[Card], width: usize) -> String {
    cards
        .iter()
        .map(|c| c.render(width))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(s: &str) -> String {
        console::strip_ansi_codes(s).into_owned()
    }

    #[test]
    fn test_table_aligns_columns() {
        let mut table = Table::new(["ID", "Name"]);
        table.row(["a1", "Casey"]).row(["a22", "Bo"]);
        let out = plain(&table.render(80));
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines[0], "ID   Name");
        assert_eq!(lines[2], "a1   Casey");
        assert_eq!(lines[3], "a22  Bo");
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_table_shrinks_to_width() {
        let mut table = Table::new(["ID", "Description"]);
        table.row(["t1", "a very long description that will not fit"]);
        let out = plain(&table.render(24));
        for line in out.lines() {
            assert!(measure_text_width(line) <= 24, "{:?}", line);
        }
        assert!(out.contains('…'));
    }

    #[test]
    fn test_short_rows_are_padded() {
        let mut table = Table::new(["A", "B", "C"]);
        table.row(["1"]);
        let out = plain(&table.render(80));
        assert_eq!(out.lines().nth(2), Some("1"));
    }

    #[test]
    fn test_card_wraps_long_values() {
        let card = Card::new("Acme")
            .field("Email", "ops@acme.test")
            .field("Notes", "one two three four five six seven eight nine ten");
        let out = plain(&card.render(30));
        assert!(out.starts_with("Acme\n"));
        assert!(out.lines().count() > 3);
        assert!(out.contains("Email  ops@acme.test"));
    }
}

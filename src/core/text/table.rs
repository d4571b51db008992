//! Table normalization: rewrite Markdown and ASCII-art tables found in model
//! output as HTML tables, leaving every other line untouched.
//!
//! The scanner is a two-state machine over the input lines. `Outside` copies
//! lines through until a header row directly followed by a separator opens a
//! block; `Collecting` absorbs rows and borders until some other line closes
//! the block, which is then emitted as one HTML fragment and the closing line
//! is scanned again from `Outside`.

use super::inline::render_emphasis;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dialect {
    Markdown,
    AsciiArt,
}

/// Lines recognized as one table, kept raw so a block that cannot be laid out
/// can be emitted verbatim.
#[derive(Debug)]
struct TableBlock<'a> {
    dialect: Dialect,
    header: &'a str,
    separator: &'a str,
    rows: Vec<&'a str>,
    raw: Vec<&'a str>,
}

#[derive(Debug)]
enum ScanState<'a> {
    Outside,
    Collecting(TableBlock<'a>),
}

/// Replace every table block in `text` with an HTML table fragment.
pub fn normalize_tables(text: &str) -> String {
    let lines: Vec<&str> = text.split('\n').collect();
    let mut out: Vec<String> = Vec::with_capacity(lines.len());
    let mut state = ScanState::Outside;
    let mut i = 0;

    while i < lines.len() {
        state = match state {
            ScanState::Outside => match open_block(&lines[i..]) {
                Some((block, consumed)) => {
                    i += consumed;
                    ScanState::Collecting(block)
                }
                None => {
                    out.push(lines[i].to_string());
                    i += 1;
                    ScanState::Outside
                }
            },
            ScanState::Collecting(mut block) => {
                if block.absorb(lines[i]) {
                    i += 1;
                    ScanState::Collecting(block)
                } else {
                    out.push(block.into_html());
                    ScanState::Outside
                }
            }
        };
    }
    if let ScanState::Collecting(block) = state {
        out.push(block.into_html());
    }
    out.join("\n")
}

/// Try to open a block at the start of `lines`: a header row followed by a
/// separator, optionally preceded by an ASCII top border.
fn open_block<'a>(lines: &[&'a str]) -> Option<(TableBlock<'a>, usize)> {
    match lines {
        &[header, separator, ..] if is_header_row(header) => separator_dialect(separator)
            .map(|dialect| {
                (
                    TableBlock::new(dialect, header, separator, vec![header, separator]),
                    2,
                )
            }),
        &[border, header, separator, ..]
            if is_ascii_separator(border)
                && is_header_row(header)
                && separator_dialect(separator).is_some() =>
        {
            Some((
                TableBlock::new(
                    Dialect::AsciiArt,
                    header,
                    separator,
                    vec![border, header, separator],
                ),
                3,
            ))
        }
        _ => None,
    }
}

impl<'a> TableBlock<'a> {
    fn new(dialect: Dialect, header: &'a str, separator: &'a str, raw: Vec<&'a str>) -> Self {
        Self {
            dialect,
            header,
            separator,
            rows: Vec::new(),
            raw,
        }
    }

    /// Take `line` into the block if it continues the table.
    fn absorb(&mut self, line: &'a str) -> bool {
        let is_border = match self.dialect {
            Dialect::Markdown => is_markdown_separator(line),
            Dialect::AsciiArt => is_ascii_separator(line),
        };
        if is_border {
            self.raw.push(line);
            true
        } else if is_row(line) {
            self.rows.push(line);
            self.raw.push(line);
            true
        } else {
            false
        }
    }

    fn into_html(self) -> String {
        let columns = Columns::from_separator(self.separator);
        // An ASCII header with more cells than the separator has columns
        // cannot be laid out without losing text.
        let header_overflows = self.dialect == Dialect::AsciiArt
            && split_on_bars(self.header).len() > columns.count();
        if columns.count() == 0 || header_overflows {
            return self.raw.join("\n");
        }

        let split = |line: &str| match self.dialect {
            Dialect::Markdown => split_on_bars(line),
            Dialect::AsciiArt => columns.cells(line),
        };
        let header = split(self.header);
        let width = header.len();

        let mut html = String::from("<div class=\"table-responsive\"><table><thead><tr>");
        for cell in &header {
            push_cell(&mut html, "th", cell);
        }
        html.push_str("</tr></thead>");
        if !self.rows.is_empty() {
            html.push_str("<tbody>");
            for row in &self.rows {
                let mut cells = split(row);
                if cells.len() < width {
                    cells.resize(width, String::new());
                }
                html.push_str("<tr>");
                for cell in &cells {
                    push_cell(&mut html, "td", cell);
                }
                html.push_str("</tr>");
            }
            html.push_str("</tbody>");
        }
        html.push_str("</table></div>");
        html
    }
}

fn push_cell(html: &mut String, tag: &str, text: &str) {
    html.push_str(&format!("<{tag}>{}</{tag}>", render_emphasis(text)));
}

fn is_delimiter(c: char) -> bool {
    matches!(c, '|' | '+')
}

fn is_rule(c: char) -> bool {
    matches!(c, '-' | '=')
}

/// Column boundaries (char indices) read off a separator line.
#[derive(Debug)]
struct Columns {
    bounds: Vec<usize>,
    /// Whether the separator marks columns with `+`/`|` rather than dash runs.
    delimited: bool,
}

impl Columns {
    fn from_separator(separator: &str) -> Self {
        let chars: Vec<char> = separator.trim_end().chars().collect();
        let delimited = chars.iter().any(|&c| is_delimiter(c));
        let marks: fn(char) -> bool = if delimited { is_delimiter } else { is_rule };

        let mut bounds = Vec::new();
        let mut prev: Option<char> = None;
        for (idx, &c) in chars.iter().enumerate() {
            if marks(c) && !prev.is_some_and(marks) {
                bounds.push(idx);
            }
            prev = Some(c);
        }

        if delimited {
            let first_content = chars.iter().position(|c| !c.is_whitespace());
            if let Some(first) = first_content
                && !is_delimiter(chars[first])
            {
                bounds.insert(0, first);
            }
            if chars.last().is_some_and(|&c| !is_delimiter(c)) {
                bounds.push(chars.len());
            }
        } else if !bounds.is_empty() {
            bounds.push(chars.len());
        }
        Self { bounds, delimited }
    }

    fn count(&self) -> usize {
        self.bounds.len().saturating_sub(1)
    }

    /// Slice `line` at the column boundaries. Rows with more `|` cells than
    /// there are columns, or that do not fit the boundaries, are split on `|`
    /// instead.
    fn cells(&self, line: &str) -> Vec<String> {
        let bars = split_on_bars(line);
        let chars: Vec<char> = line.trim_end().chars().collect();
        if bars.len() > self.count() || !self.fits(&chars) {
            return bars;
        }
        self.bounds
            .windows(2)
            .map(|pair| {
                let start = pair[0].min(chars.len());
                let end = pair[1].min(chars.len());
                let cell: String = chars[start..end].iter().collect();
                cell.trim().trim_matches(is_delimiter).trim().to_string()
            })
            .collect()
    }

    /// Whether slicing at the bounds keeps every character of the row: no
    /// text past the last bound, and no bound cutting through a cell.
    fn fits(&self, chars: &[char]) -> bool {
        let last = self.bounds.last().copied().unwrap_or(0);
        if chars.get(last..).is_some_and(|rest| rest.iter().any(is_cell_text)) {
            return false;
        }
        if self.delimited {
            self.bounds
                .iter()
                .all(|&b| chars.get(b).is_none_or(|&c| is_delimiter(c)))
        } else {
            self.bounds.iter().filter(|&&b| b > 0).all(|&b| {
                !(chars.get(b - 1).is_some_and(is_cell_text) && chars.get(b).is_some_and(is_cell_text))
            })
        }
    }
}

fn is_cell_text(c: &char) -> bool {
    !c.is_whitespace() && !is_delimiter(*c)
}

/// Split a bar-delimited row into trimmed cells, dropping the outer bars.
fn split_on_bars(line: &str) -> Vec<String> {
    let trimmed = line.trim();
    let inner = trimmed.strip_prefix('|').unwrap_or(trimmed);
    let inner = inner.strip_suffix('|').unwrap_or(inner);
    inner.split('|').map(|c| c.trim().to_string()).collect()
}

/// A line that begins and ends with `|`.
fn is_row(line: &str) -> bool {
    let t = line.trim();
    t.len() >= 2 && t.starts_with('|') && t.ends_with('|')
}

fn is_header_row(line: &str) -> bool {
    is_row(line) && separator_dialect(line).is_none()
}

/// `| --- | :---: |`
fn is_markdown_separator(line: &str) -> bool {
    let t = line.trim();
    is_row(t)
        && t.contains('-')
        && t
            .chars()
            .all(|c| matches!(c, '-' | ':' | '|') || c.is_whitespace())
}

/// `+------+-----+`, `|------|`, `--------`
fn is_ascii_separator(line: &str) -> bool {
    let t = line.trim();
    if t.is_empty()
        || !t
            .chars()
            .all(|c| matches!(c, '-' | '+' | '|' | '=') || c.is_whitespace())
    {
        return false;
    }
    let mut run = 0;
    let mut longest = 0;
    for c in t.chars() {
        if matches!(c, '-' | '+' | '=') {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 0;
        }
    }
    longest >= 3
}

fn separator_dialect(line: &str) -> Option<Dialect> {
    if is_markdown_separator(line) {
        Some(Dialect::Markdown)
    } else if is_ascii_separator(line) {
        Some(Dialect::AsciiArt)
    } else {
        None
    }
}

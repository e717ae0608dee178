/*!
Human-readable output primitives: colors, boxed headers and column tables.

Everything here returns strings; nothing prints or logs. JSON output never
goes through these helpers.

Style is decided once per run by [`StyleOptions::detect`]:
  - `NO_COLOR` disables ANSI colors
  - `NO_EMOJI` disables status glyphs
  - `COLUMNS` sets the width budget (clamped to 40..=220, default 100)
*/

use std::borrow::Cow;

#[derive(Debug, Clone)]
pub struct StyleOptions {
    pub use_color: bool,
    pub use_emoji: bool,
    pub term_width: usize,
    pub box_style: BoxStyle,
}

#[derive(Debug, Clone, Copy)]
pub enum BoxStyle {
    Light,   // ┌ ┐ └ ┘
    Rounded, // ╭ ╮ ╰ ╯
}

impl StyleOptions {
    pub fn detect() -> Self {
        let term_width = std::env::var("COLUMNS")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .map(|w| w.clamp(40, 220))
            .unwrap_or(100);
        StyleOptions {
            use_color: std::env::var_os("NO_COLOR").is_none(),
            use_emoji: std::env::var_os("NO_EMOJI").is_none(),
            ..Self::plain(term_width)
        }
    }

    /// No color, no emoji, fixed width.
    pub fn plain(term_width: usize) -> Self {
        StyleOptions {
            use_color: false,
            use_emoji: false,
            term_width,
            box_style: BoxStyle::Light,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Role {
    Primary,
    Secondary,
    Accent,
    Success,
    Dim,
}

pub fn color(role: Role, text: impl AsRef<str>, style: &StyleOptions) -> String {
    if !style.use_color {
        return text.as_ref().to_string();
    }
    let code = match role {
        Role::Primary => "38;5;45",    // cyan
        Role::Secondary => "38;5;250", // gray
        Role::Accent => "38;5;213",    // magenta
        Role::Success => "38;5;82",    // green
        Role::Dim => "2",
    };
    format!("\x1b[{code}m{}\x1b[0m", text.as_ref())
}

pub fn emoji(tag: &str, style: &StyleOptions) -> &'static str {
    if !style.use_emoji {
        return "";
    }
    match tag {
        "success" => "✔",
        "list" => "📜",
        "task" => "⏱",
        _ => "",
    }
}

/// One-line title (plus optional subtitle) inside a box.
pub fn box_header(title: &str, subtitle: Option<&str>, style: &StyleOptions) -> String {
    let (tl, tr, bl, br) = match style.box_style {
        BoxStyle::Light => ('┌', '┐', '└', '┘'),
        BoxStyle::Rounded => ('╭', '╮', '╰', '╯'),
    };

    let mut inner = color(Role::Primary, title, style);
    if let Some(sub) = subtitle.filter(|s| !s.is_empty()) {
        inner.push_str("  ");
        inner.push_str(&color(Role::Secondary, sub, style));
    }

    let max_inner = style.term_width.saturating_sub(4).max(16);
    if display_width(&inner) > max_inner {
        // Drop styling rather than cut through an escape sequence.
        let plain = match subtitle.filter(|s| !s.is_empty()) {
            Some(sub) => format!("{title}  {sub}"),
            None => title.to_string(),
        };
        inner = truncate_ellipsis(&plain, max_inner);
    }

    let width = display_width(&inner);
    let rule = "─".repeat(width + 2);
    format!("{tl}{rule}{tr}\n│ {inner} │\n{bl}{rule}{br}")
}

#[derive(Debug, Clone)]
pub struct TableOpts {
    /// 0 means the style's terminal width.
    pub max_width: usize,
    pub header_sep: bool,
    pub min_col_width: usize,
}

impl Default for TableOpts {
    fn default() -> Self {
        TableOpts {
            max_width: 0,
            header_sep: true,
            min_col_width: 2,
        }
    }
}

/// Left-aligned columns separated by two spaces. Columns are shrunk widest
/// first when the table would exceed the width budget; cut cells end in `…`.
pub fn table(headers: &[&str], rows: &[Vec<String>], opts: TableOpts, style: &StyleOptions) -> String {
    if headers.is_empty() {
        return String::new();
    }
    let limit = match opts.max_width {
        0 => style.term_width,
        w => w.min(style.term_width),
    };

    let mut widths: Vec<usize> = headers.iter().map(|h| display_width(h)).collect();
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(display_width(cell));
        }
    }

    let gaps = (headers.len() - 1) * 2;
    let mut overflow = (widths.iter().sum::<usize>() + gaps).saturating_sub(limit);
    let mut order: Vec<usize> = (0..widths.len()).collect();
    order.sort_by(|a, b| widths[*b].cmp(&widths[*a]));
    for idx in order {
        if overflow == 0 {
            break;
        }
        let spare = widths[idx].saturating_sub(opts.min_col_width);
        let cut = spare.min(overflow);
        widths[idx] -= cut;
        overflow -= cut;
    }

    let mut out = vec![color(Role::Accent, aligned(headers, &widths), style)];
    if opts.header_sep {
        let sep = widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>().join("  ");
        out.push(color(Role::Dim, sep, style));
    }
    for row in rows {
        let cells: Vec<&str> = row.iter().map(String::as_str).collect();
        out.push(aligned(&cells, &widths));
    }
    out.join("\n")
}

fn aligned(cells: &[&str], widths: &[usize]) -> String {
    widths
        .iter()
        .enumerate()
        .map(|(i, w)| fit(cells.get(i).copied().unwrap_or(""), *w))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

fn fit(s: &str, width: usize) -> String {
    let len = display_width(s);
    if len > width {
        truncate_ellipsis(&strip_ansi(s), width)
    } else {
        format!("{s}{}", " ".repeat(width - len))
    }
}

pub fn truncate_ellipsis(s: &str, max_chars: usize) -> String {
    match max_chars {
        0 => String::new(),
        _ if s.chars().count() <= max_chars => s.to_string(),
        1 => "…".to_string(),
        n => {
            let mut out: String = s.chars().take(n - 1).collect();
            out.push('…');
            out
        }
    }
}

/// Remove `ESC [ ... <letter>` sequences.
fn strip_ansi(s: &str) -> Cow<'_, str> {
    if !s.contains('\x1b') {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\x1b' && chars.peek() == Some(&'[') {
            chars.next();
            for c in chars.by_ref() {
                if c.is_ascii_alphabetic() {
                    break;
                }
            }
            continue;
        }
        out.push(c);
    }
    Cow::Owned(out)
}

fn display_width(s: &str) -> usize {
    strip_ansi(s).chars().count()
}

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Color;
use ratatui::style::Style;
use ratatui::style::Stylize;
use ratatui::text::Line;
use ratatui::text::Span;
use ratatui::widgets::Widget;
use unicode_width::UnicodeWidthChar;
use unicode_width::UnicodeWidthStr;

use super::scroll_state::ScrollState;

/// Render-ready representation of one row in a selection popup.
///
/// Rows render as `icon name  description`, with the description dimmed
/// and aligned to a shared column. A row's zero-based position in the
/// visible list is its identity for pointer hit-testing and tests.
pub(crate) struct GenericDisplayRow {
    pub name: String,
    pub icon: Option<String>,
    pub description: Option<String>,
}

/// Style marker carried by every span of the highlighted row. Tests
/// assert the highlighted index by probing a rendered buffer for this
/// accent.
pub(crate) fn accent_style() -> Style {
    Style::default().fg(Color::Cyan).bold()
}

fn row_line(row: &GenericDisplayRow, desc_col: usize) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    if let Some(icon) = row.icon.as_deref()
        && !icon.is_empty()
    {
        spans.push(format!("{icon} ").dim());
    }
    spans.push(row.name.clone().into());
    if let Some(desc) = row.description.as_deref() {
        let used: usize = spans
            .iter()
            .map(|span| UnicodeWidthStr::width(span.content.as_ref()))
            .sum();
        let gap = desc_col.saturating_sub(used).max(2);
        spans.push(" ".repeat(gap).into());
        spans.push(desc.to_string().dim());
    }
    Line::from(spans)
}

fn truncate_line_to_width(line: Line<'static>, max_width: usize) -> Line<'static> {
    if max_width == 0 {
        return Line::default();
    }
    let mut used = 0usize;
    let mut spans_out: Vec<Span<'static>> = Vec::new();
    for span in line.spans {
        let text = span.content.into_owned();
        let style = span.style;
        let span_width = UnicodeWidthStr::width(text.as_str());
        if used + span_width <= max_width {
            used += span_width;
            spans_out.push(Span::styled(text, style));
            continue;
        }
        let mut truncated = String::new();
        for ch in text.chars() {
            let ch_width = UnicodeWidthChar::width(ch).unwrap_or(0);
            if used + ch_width > max_width {
                break;
            }
            truncated.push(ch);
            used += ch_width;
        }
        if !truncated.is_empty() {
            spans_out.push(Span::styled(truncated, style));
        }
        break;
    }
    Line::from(spans_out)
}

fn truncate_line_with_ellipsis_if_overflow(
    line: Line<'static>,
    max_width: usize,
) -> Line<'static> {
    if max_width == 0 {
        return Line::default();
    }
    let width: usize = line
        .spans
        .iter()
        .map(|span| UnicodeWidthStr::width(span.content.as_ref()))
        .sum();
    if width <= max_width {
        return line;
    }
    let mut truncated = truncate_line_to_width(line, max_width.saturating_sub(1));
    let ellipsis_style = truncated
        .spans
        .last()
        .map(|span| span.style)
        .unwrap_or_default();
    truncated.spans.push(Span::styled("…", ellipsis_style));
    truncated
}

/// Render a window of `rows_all` using the provided [`ScrollState`], one
/// terminal line per row, highlighting the selected row with the shared
/// accent. Shows a dimmed placeholder when the list is empty.
pub(crate) fn render_rows(
    area: Rect,
    buf: &mut Buffer,
    rows_all: &[GenericDisplayRow],
    state: &ScrollState,
    max_results: usize,
    empty_message: &str,
) {
    if area.height == 0 || area.width == 0 {
        return;
    }
    if rows_all.is_empty() {
        Line::from(empty_message.dim().italic()).render(area, buf);
        return;
    }

    let visible = max_results
        .min(rows_all.len())
        .min(area.height.max(1) as usize);
    let mut start_idx = state.scroll_top.min(rows_all.len() - 1);
    if let Some(sel) = state.selected_idx {
        if sel < start_idx {
            start_idx = sel;
        } else if visible > 0 {
            let bottom = start_idx + visible - 1;
            if sel > bottom {
                start_idx = sel + 1 - visible;
            }
        }
    }

    // Align descriptions to the widest visible name plus a two-cell gap.
    let desc_col = rows_all
        .iter()
        .skip(start_idx)
        .take(visible)
        .map(|row| {
            let icon_width = row
                .icon
                .as_deref()
                .filter(|icon| !icon.is_empty())
                .map(|icon| UnicodeWidthStr::width(icon) + 1)
                .unwrap_or(0);
            icon_width + UnicodeWidthStr::width(row.name.as_str())
        })
        .max()
        .unwrap_or(0)
        + 2;

    let mut cur_y = area.y;
    for (i, row) in rows_all.iter().enumerate().skip(start_idx).take(visible) {
        if cur_y >= area.y + area.height {
            break;
        }
        let mut line = row_line(row, desc_col);
        if Some(i) == state.selected_idx {
            let accent = accent_style();
            line.spans.iter_mut().for_each(|span| span.style = accent);
        }
        let line = truncate_line_with_ellipsis_if_overflow(line, area.width as usize);
        line.render(
            Rect {
                x: area.x,
                y: cur_y,
                width: area.width,
                height: 1,
            },
            buf,
        );
        cur_y += 1;
    }
}

/// Map a buffer position to the index of the row rendered there, if any.
pub(crate) fn hit_test_row(
    area: Rect,
    state: &ScrollState,
    len: usize,
    x: u16,
    y: u16,
) -> Option<usize> {
    if len == 0 || x < area.x || x >= area.x + area.width || y < area.y {
        return None;
    }
    let idx = state.scroll_top + (y - area.y) as usize;
    (y < area.y + area.height && idx < len).then_some(idx)
}

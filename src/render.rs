//! Drawing the menu with ratatui.

use std::str::FromStr;

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::config::Colors;
use crate::error::{Error, Result};
use crate::pager::{Layout, TextMeasure};
use crate::session::{VisibleItem, VisibleState};
use crate::text_buffer::decode_lossy;

/// Blank columns on each side of a drawn text cell.
const SIDE_PAD: u16 = 1;

/// Measures text in terminal columns, padding included.
#[derive(Clone, Copy, Debug, Default)]
pub struct TerminalMeasure;

impl TextMeasure for TerminalMeasure {
    fn measure_text(&self, text: &[u8]) -> u16 {
        text_width(text).saturating_add(2 * SIDE_PAD)
    }
}

fn text_width(text: &[u8]) -> u16 {
    let width = decode_lossy(text).width();
    u16::try_from(width).unwrap_or(u16::MAX)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Theme {
    pub normal: Style,
    pub selected: Style,
    pub out: Style,
}

impl Theme {
    pub fn from_colors(colors: &Colors) -> Result<Self> {
        let style = |fg_key, fg: &str, bg_key, bg: &str| -> Result<Style> {
            Ok(Style::default()
                .fg(parse_color(fg_key, fg)?)
                .bg(parse_color(bg_key, bg)?))
        };
        Ok(Self {
            normal: style("normal_fg", &colors.normal_fg, "normal_bg", &colors.normal_bg)?,
            selected: style(
                "selected_fg",
                &colors.selected_fg,
                "selected_bg",
                &colors.selected_bg,
            )?,
            out: style("out_fg", &colors.out_fg, "out_bg", &colors.out_bg)?,
        })
    }
}

fn parse_color(key: &'static str, value: &str) -> Result<Color> {
    Color::from_str(value.trim()).map_err(|_| Error::InvalidColor {
        key,
        value: value.to_string(),
    })
}

pub fn prompt_width(prompt: &str) -> u16 {
    if prompt.is_empty() {
        0
    } else {
        TerminalMeasure.measure_text(prompt.as_bytes())
    }
}

/// Width of the input field when items share its line.
pub fn input_width(total: u16) -> u16 {
    total / 3
}

/// Vertical rows that fit below the input line: the configured count,
/// capped by the number of items and by the terminal height.
pub fn fit_rows(lines: usize, items: usize, height: u16) -> usize {
    lines
        .min(items)
        .min(usize::from(height.saturating_sub(1)))
}

/// Page layout for a terminal `width` columns wide.
pub fn menu_layout(rows: usize, width: u16, prompt: &str) -> Layout {
    if rows > 0 {
        return Layout::Vertical { rows };
    }
    let reserved = prompt_width(prompt)
        .saturating_add(input_width(width))
        .saturating_add(TerminalMeasure.measure_text(b"<"))
        .saturating_add(TerminalMeasure.measure_text(b">"));
    Layout::Horizontal {
        budget: width.saturating_sub(reserved),
    }
}

/// Region of `screen` the menu occupies.
pub fn menu_area(screen: Rect, rows: usize, bottom: bool) -> Rect {
    let wanted = u16::try_from(rows.saturating_add(1)).unwrap_or(u16::MAX);
    let height = wanted.min(screen.height);
    let y = if bottom {
        screen.bottom().saturating_sub(height)
    } else {
        screen.y
    };
    Rect::new(screen.x, y, screen.width, height)
}

/// Columns between the start of the input field and the text cursor.
fn cursor_offset(state: &VisibleState) -> u16 {
    let before = &state.buffer[..state.cursor.min(state.buffer.len())];
    text_width(before).saturating_add(SIDE_PAD)
}

pub fn draw_menu(
    frame: &mut Frame,
    area: Rect,
    state: &VisibleState,
    theme: &Theme,
    vertical: bool,
) {
    if area.width == 0 || area.height == 0 {
        return;
    }
    frame.render_widget(Block::default().style(theme.normal), area);

    let right = area.right();
    let mut x = area.x;
    if !state.prompt.is_empty() {
        let width = prompt_width(&state.prompt).min(right - x);
        draw_cell(frame, Rect::new(x, area.y, width, 1), state.prompt.as_bytes(), theme.selected);
        x += width;
    }

    let field_width = if vertical || state.items.is_empty() {
        right - x
    } else {
        input_width(area.width).min(right - x)
    };
    draw_input(frame, Rect::new(x, area.y, field_width, 1), state, theme);

    if vertical {
        let rows = area.height.saturating_sub(1);
        for (row, item) in state.items.iter().take(usize::from(rows)).enumerate() {
            let y = area.y + 1 + row as u16;
            draw_item(frame, Rect::new(x, y, right - x, 1), item, theme);
        }
        return;
    }
    if state.items.is_empty() {
        return;
    }

    x += field_width;
    let less = TerminalMeasure.measure_text(b"<").min(right - x);
    if state.has_prev {
        draw_cell(frame, Rect::new(x, area.y, less, 1), b"<", theme.normal);
    }
    x += less;

    let more = TerminalMeasure.measure_text(b">");
    for item in &state.items {
        let room = right.saturating_sub(x).saturating_sub(more);
        let width = TerminalMeasure.measure_clamped_text(&item.text, room);
        if width == 0 {
            break;
        }
        draw_item(frame, Rect::new(x, area.y, width, 1), item, theme);
        x += width;
    }
    if state.has_next && more <= area.width {
        draw_cell(frame, Rect::new(right - more, area.y, more, 1), b">", theme.normal);
    }
}

fn draw_input(frame: &mut Frame, area: Rect, state: &VisibleState, theme: &Theme) {
    if area.width == 0 {
        return;
    }
    let column = cursor_offset(state);
    let scroll = column.saturating_sub(area.width.saturating_sub(1));
    let text = decode_lossy(&state.buffer);
    let line = Line::from(vec![Span::raw(" "), Span::raw(text)]);
    frame.render_widget(
        Paragraph::new(line).style(theme.normal).scroll((0, scroll)),
        area,
    );
    frame.set_cursor_position((area.x + column - scroll, area.y));
}

fn draw_item(frame: &mut Frame, area: Rect, item: &VisibleItem, theme: &Theme) {
    let style = if item.selected {
        theme.selected
    } else if item.multi_accepted {
        theme.out
    } else {
        theme.normal
    };
    draw_cell(frame, area, &item.text, style);
}

fn draw_cell(frame: &mut Frame, area: Rect, text: &[u8], style: Style) {
    let text = decode_lossy(text);
    let line = Line::from(Span::styled(format!(" {text} "), style));
    frame.render_widget(Paragraph::new(line).style(style), area);
}

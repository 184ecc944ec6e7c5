use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use crate::store::KeyValueStore;
use crate::task::{Filter, Task};

use super::app::{AppState, Focus, StatusKind};
use super::editor::LineInput;

const APP_TITLE: &str = "To-Do List";
const INPUT_PLACEHOLDER: &str = "Add a new task and press Enter…";
const EMPTY_LIST: &str = "No tasks here. Add something above!";
const HELP_KEY_WIDTH: usize = 12;
const COLOR_TEXT: Color = Color::Rgb(234, 236, 239);
const COLOR_MUTED: Color = Color::Rgb(160, 165, 172);
const COLOR_MUTED_DARK: Color = Color::Rgb(118, 124, 130);
const COLOR_BG_MUTED: Color = Color::Rgb(52, 56, 60);
const COLOR_BG_SELECTED: Color = Color::Rgb(40, 52, 70);
const COLOR_INFO: Color = Color::Rgb(116, 198, 219);
const COLOR_WARNING: Color = Color::Rgb(244, 200, 98);
const COLOR_ERROR: Color = Color::Rgb(255, 107, 107);
const COLOR_SUCCESS: Color = Color::Rgb(126, 210, 146);
const COLOR_ACCENT: Color = Color::Rgb(122, 170, 255);
const COLOR_BORDER_LIST: Color = Color::Rgb(92, 126, 166);
const COLOR_BORDER_INPUT: Color = Color::Rgb(180, 156, 92);

const HELP_ROWS: [(&str, &str); 12] = [
    ("a / i", "focus the add input"),
    ("enter", "add task (input) / edit (list)"),
    ("space / x", "toggle completed"),
    ("e", "edit title inline"),
    ("d / del", "delete task"),
    ("c", "clear completed"),
    ("1 2 3", "filter all / active / completed"),
    ("tab / f", "next filter"),
    ("↑ ↓ j k", "move selection"),
    ("esc", "cancel edit / leave input"),
    ("ctrl-u", "clear the text field"),
    ("q", "quit"),
];

pub fn render<S: KeyValueStore>(frame: &mut Frame, app: &AppState<S>) {
    let area = frame.size();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(2),
                Constraint::Length(3),
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(2),
            ]
            .as_ref(),
        )
        .split(area);

    render_header(frame, app, chunks[0]);
    render_input(frame, app, chunks[1]);
    render_tabs(frame, app, chunks[2]);
    render_list(frame, app, chunks[3]);
    render_footer(frame, app, chunks[4]);

    if app.show_help {
        render_help_modal(frame, area);
    }
}

fn render_header<S: KeyValueStore>(frame: &mut Frame, app: &AppState<S>, area: Rect) {
    let counts = app.list().counts();
    let line = Line::from(vec![
        Span::styled(
            APP_TITLE,
            Style::default().fg(COLOR_TEXT).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(counts.summary(), Style::default().fg(COLOR_ACCENT)),
    ]);
    let widget = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(COLOR_BG_MUTED)),
    );
    frame.render_widget(widget, area);
}

fn render_input<S: KeyValueStore>(frame: &mut Frame, app: &AppState<S>, area: Rect) {
    let focused = app.focus == Focus::Input && app.draft.is_none();
    let border = if focused {
        COLOR_BORDER_INPUT
    } else {
        COLOR_BG_MUTED
    };
    let (content, cursor_col) = if app.input.value().is_empty() {
        let placeholder = Line::from(Span::styled(
            INPUT_PLACEHOLDER,
            Style::default().fg(COLOR_MUTED_DARK),
        ));
        (placeholder, 0)
    } else {
        let (text, col) = input_window(&app.input, area.width.saturating_sub(2) as usize);
        (
            Line::from(Span::styled(text, Style::default().fg(COLOR_TEXT))),
            col,
        )
    };
    let widget = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .title("New task")
            .border_style(Style::default().fg(border)),
    );
    frame.render_widget(widget, area);

    if focused {
        let x = area.x + 1 + cursor_col;
        frame.set_cursor(x.min(area.right().saturating_sub(2)), area.y + 1);
    }
}

fn render_tabs<S: KeyValueStore>(frame: &mut Frame, app: &AppState<S>, area: Rect) {
    let counts = app.list().counts();
    let current = app.list().filter();

    let mut spans = Vec::new();
    for (idx, filter) in Filter::ALL.into_iter().enumerate() {
        if idx > 0 {
            spans.push(Span::styled("  ", Style::default().fg(COLOR_MUTED_DARK)));
        }
        let (count, color) = match filter {
            Filter::All => (counts.total, COLOR_INFO),
            Filter::Active => (counts.active, COLOR_WARNING),
            Filter::Completed => (counts.completed, COLOR_SUCCESS),
        };
        let text = format!("{} {} ({count})", idx + 1, filter.label());
        let style = if filter == current {
            Style::default()
                .fg(color)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(COLOR_MUTED)
        };
        spans.push(Span::styled(text, style));
    }

    let clear_style = if counts.completed > 0 {
        Style::default().fg(COLOR_ERROR)
    } else {
        Style::default().fg(COLOR_BG_MUTED)
    };
    spans.push(Span::raw("    "));
    spans.push(Span::styled("c Clear completed", clear_style));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_list<S: KeyValueStore>(frame: &mut Frame, app: &AppState<S>, area: Rect) {
    let visible = app.visible();
    let list_focused = app.focus == Focus::List || app.draft.is_some();
    let content_width = area.width.saturating_sub(2) as usize;
    let mut lines = Vec::new();
    let mut cursor = None;

    if visible.is_empty() {
        lines.push(Line::from(Span::styled(
            EMPTY_LIST,
            Style::default().fg(COLOR_MUTED),
        )));
    } else {
        let height = area.height.saturating_sub(2) as usize;
        let (start, end) = list_window(visible.len(), Some(app.selected), height);
        for (row, task) in visible[start..end].iter().enumerate() {
            let selected = list_focused && start + row == app.selected;
            let draft = if app.is_editing(&task.id) {
                app.draft.as_ref()
            } else {
                None
            };
            if let Some(draft) = draft {
                let prefix = row_prefix(task, selected);
                let prefix_width = prefix.chars().count();
                let (text, col) =
                    input_window(draft, content_width.saturating_sub(prefix_width));
                let x = area.x + 1 + prefix_width as u16 + col;
                cursor = Some((x, area.y + 1 + row as u16));
                lines.push(render_edit_row(prefix, text));
            } else {
                lines.push(render_list_row(
                    task,
                    selected,
                    content_width,
                    &app.ui.time_format,
                ));
            }
        }
    }

    let title = format!("Tasks · {}", app.list().filter().label());
    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(Style::default().fg(if list_focused {
                COLOR_BORDER_LIST
            } else {
                COLOR_BG_MUTED
            })),
    );
    frame.render_widget(widget, area);

    if let Some((x, y)) = cursor {
        frame.set_cursor(x.min(area.right().saturating_sub(2)), y);
    }
}

fn row_prefix(task: &Task, selected: bool) -> String {
    let pointer = if selected { "›" } else { " " };
    let mark = if task.completed { "[x]" } else { "[ ]" };
    format!("{pointer} {mark} ")
}

fn render_list_row(
    task: &Task,
    selected: bool,
    width: usize,
    time_format: &str,
) -> Line<'static> {
    let prefix = row_prefix(task, selected);
    let created = task.created_at_display(time_format);
    let reserved = prefix.chars().count() + created.chars().count() + 2;
    let title = truncate_text(&task.title, width.saturating_sub(reserved).max(1));
    let padding = width
        .saturating_sub(reserved)
        .saturating_sub(title.chars().count());

    let mut title_style = Style::default().fg(COLOR_TEXT);
    if task.completed {
        title_style = title_style
            .fg(COLOR_MUTED_DARK)
            .add_modifier(Modifier::CROSSED_OUT);
    }
    let mark_style = if task.completed {
        Style::default().fg(COLOR_SUCCESS)
    } else {
        Style::default().fg(COLOR_MUTED)
    };

    let mut line = Line::from(vec![
        Span::styled(prefix, mark_style),
        Span::styled(title, title_style),
        Span::raw(" ".repeat(padding + 2)),
        Span::styled(created, Style::default().fg(COLOR_MUTED_DARK)),
    ]);
    if selected {
        line = line.style(Style::default().bg(COLOR_BG_SELECTED));
    }
    line
}

fn render_edit_row(prefix: String, text: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(prefix, Style::default().fg(COLOR_WARNING)),
        Span::styled(
            text,
            Style::default()
                .fg(COLOR_TEXT)
                .add_modifier(Modifier::UNDERLINED),
        ),
    ])
    .style(Style::default().bg(COLOR_BG_SELECTED))
}

fn render_footer<S: KeyValueStore>(frame: &mut Frame, app: &AppState<S>, area: Rect) {
    let hint = Line::from(Span::styled(
        app.footer_hint(),
        Style::default().fg(COLOR_INFO),
    ));
    let status = match app.status_line() {
        Some((message, StatusKind::Error)) => Line::from(Span::styled(
            message.to_string(),
            Style::default()
                .fg(COLOR_ERROR)
                .add_modifier(Modifier::BOLD),
        )),
        Some((message, StatusKind::Info)) => Line::from(Span::styled(
            message.to_string(),
            Style::default().fg(COLOR_WARNING),
        )),
        None => Line::from(""),
    };
    let widget = Paragraph::new(vec![hint, status]).alignment(Alignment::Center);
    frame.render_widget(widget, area);
}

fn render_help_modal(frame: &mut Frame, area: Rect) {
    let popup = centered_rect(area, 56, HELP_ROWS.len() as u16 + 4);
    let mut lines = Vec::with_capacity(HELP_ROWS.len() + 2);
    for (keys, description) in HELP_ROWS {
        lines.push(Line::from(vec![
            Span::styled(
                format!("{keys:<width$}", width = HELP_KEY_WIDTH),
                Style::default().fg(COLOR_ACCENT),
            ),
            Span::styled(description, Style::default().fg(COLOR_TEXT)),
        ]));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "press any key to close",
        Style::default().fg(COLOR_MUTED_DARK),
    )));

    frame.render_widget(Clear, popup);
    let widget = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Keys")
                .border_style(Style::default().fg(COLOR_BORDER_LIST)),
        )
        .wrap(Wrap { trim: false });
    frame.render_widget(widget, popup);
}

/// The part of `input` that fits in `width` columns with the cursor in view,
/// plus the cursor column inside it. Scrolls like `list_window` does rows,
/// keeping one column free for a cursor sitting after the last character.
fn input_window(input: &LineInput, width: usize) -> (String, u16) {
    if width == 0 {
        return (String::new(), 0);
    }
    let chars: Vec<char> = input.value().chars().collect();
    let cursor = input.cursor().min(chars.len());
    let start = (cursor + 1).saturating_sub(width);
    let end = (start + width).min(chars.len());
    let col = (cursor - start).min(u16::MAX as usize) as u16;
    (chars[start..end].iter().collect(), col)
}

fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn list_window(total: usize, selected: Option<usize>, height: usize) -> (usize, usize) {
    if total == 0 || height == 0 {
        return (0, 0);
    }
    if total <= height {
        return (0, total);
    }
    let selected = selected.unwrap_or(0);
    let mut start = selected.saturating_sub(height / 2);
    if start + height > total {
        start = total - height;
    }
    (start, start + height)
}

fn truncate_text(value: &str, max: usize) -> String {
    if value.chars().count() <= max {
        return value.to_string();
    }
    if max <= 1 {
        return "…".to_string();
    }
    let mut out: String = value.chars().take(max - 1).collect();
    out.push('…');
    out
}

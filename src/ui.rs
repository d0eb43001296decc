use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{block::Title, Block, BorderType, Borders, Paragraph, Wrap},
    Frame,
};
use tui_dispatch::{EventKind, EventOutcome};

use crate::action::Action;
use crate::ids;
use crate::projection;
use crate::resolver::RequestState;
use crate::state::{AppState, EntityRecord};

const BG_BASE: Color = Color::Rgb(36, 22, 24);
const BG_PANEL: Color = Color::Rgb(58, 32, 36);
const BG_PANEL_ALT: Color = Color::Rgb(46, 28, 30);
const TEXT_MAIN: Color = Color::Rgb(240, 230, 220);
const TEXT_DIM: Color = Color::Rgb(186, 164, 160);
const ACCENT_RED: Color = Color::Rgb(226, 84, 76);
const ACCENT_GOLD: Color = Color::Rgb(222, 196, 120);
const ACCENT_GREEN: Color = Color::Rgb(104, 204, 120);
const HIGHLIGHT_BG: Color = ACCENT_RED;
const HIGHLIGHT_TEXT: Color = Color::Rgb(255, 246, 240);
const BORDER_ACCENT: Color = Color::Rgb(112, 72, 76);

const SIDE_MENU_WIDTH: u16 = 24;
const STAT_MAX: u32 = 255;
const STAT_BAR_WIDTH: usize = 16;
const PAGE_STEP: i16 = 10;

pub fn render(frame: &mut Frame, area: Rect, state: &AppState) {
    frame.render_widget(Block::default().style(Style::default().bg(BG_BASE)), area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(6), Constraint::Length(1)])
        .split(area);

    let body = if state.show_side_menu {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(SIDE_MENU_WIDTH), Constraint::Min(20)])
            .split(rows[0]);
        render_side_menu(frame, columns[0], state);
        columns[1]
    } else {
        rows[0]
    };

    render_detail(frame, body, state);
    render_help(frame, rows[1], state);

    if state.open_move.is_some() {
        render_move_modal(frame, area, state);
    }
}

pub fn handle_event(event: &EventKind, state: &AppState) -> EventOutcome<Action> {
    match event {
        EventKind::Resize(width, height) => {
            EventOutcome::action(Action::UiTerminalResize(*width, *height)).with_render()
        }
        EventKind::Key(key) => handle_key(*key, state),
        _ => EventOutcome::ignored(),
    }
}

fn handle_key(key: KeyEvent, state: &AppState) -> EventOutcome<Action> {
    if state.open_move.is_some() {
        return handle_modal_key(key);
    }
    if state.search.active {
        return handle_search_key(key);
    }

    let action = match key.code {
        KeyCode::Up | KeyCode::Char('k') => Some(Action::NavMove(-1)),
        KeyCode::Down | KeyCode::Char('j') => Some(Action::NavMove(1)),
        KeyCode::PageUp => Some(Action::NavMove(-PAGE_STEP)),
        KeyCode::PageDown => Some(Action::NavMove(PAGE_STEP)),
        KeyCode::Tab | KeyCode::Char(']') => Some(Action::MoveCursor(1)),
        KeyCode::BackTab | KeyCode::Char('[') => Some(Action::MoveCursor(-1)),
        KeyCode::Enter => Some(Action::MoveConfirm),
        KeyCode::Char('/') => Some(Action::SearchStart),
        KeyCode::Char('m') => Some(Action::MenuToggle),
        KeyCode::Char('r') if state.entity_state() == RequestState::Failed => {
            Some(Action::EntitySelect(state.selected_index))
        }
        KeyCode::Esc if state.show_side_menu => Some(Action::MenuClose),
        KeyCode::Char('q') => Some(Action::Quit),
        _ => None,
    };
    EventOutcome::from(action)
}

fn handle_modal_key(key: KeyEvent) -> EventOutcome<Action> {
    match key.code {
        KeyCode::Esc | KeyCode::Enter | KeyCode::Backspace => {
            EventOutcome::action(Action::MoveClose)
        }
        KeyCode::Char('q') => EventOutcome::action(Action::Quit),
        _ => EventOutcome::ignored(),
    }
}

fn handle_search_key(key: KeyEvent) -> EventOutcome<Action> {
    match key.code {
        KeyCode::Esc => EventOutcome::action(Action::SearchCancel),
        KeyCode::Enter => EventOutcome::action(Action::SearchSubmit),
        KeyCode::Backspace => EventOutcome::action(Action::SearchBackspace),
        KeyCode::Up => EventOutcome::action(Action::NavMove(-1)),
        KeyCode::Down => EventOutcome::action(Action::NavMove(1)),
        KeyCode::Char(ch) => EventOutcome::action(Action::SearchInput(ch)),
        _ => EventOutcome::ignored(),
    }
}

fn render_side_menu(frame: &mut Frame, area: Rect, state: &AppState) {
    let title = if state.search.active || !state.search.query.is_empty() {
        format!(" /{} ", state.search.query)
    } else {
        " KANTO ".to_string()
    };
    let block = panel_block(title, BG_PANEL_ALT);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if state.filtered.is_empty() {
        let empty = Paragraph::new("No matches")
            .style(Style::default().fg(TEXT_DIM))
            .alignment(Alignment::Center);
        frame.render_widget(empty, inner);
        return;
    }

    let visible = inner.height as usize;
    let highlight = state.list_highlight();
    let offset = scroll_offset(state.cursor, visible, state.filtered.len());
    let lines: Vec<Line> = state
        .filtered
        .iter()
        .enumerate()
        .skip(offset)
        .take(visible)
        .map(|(position, index)| {
            let label = format!(
                "{} {}",
                ids::to_display_code(*index),
                ids::catalog_name(*index).unwrap_or("?")
            );
            menu_line(&label, Some(position) == highlight)
        })
        .collect();
    frame.render_widget(Paragraph::new(Text::from(lines)), inner);
}

fn render_detail(frame: &mut Frame, area: Rect, state: &AppState) {
    let code = ids::to_display_code(state.selected_index);
    let block = panel_block(format!(" #{code} "), BG_PANEL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    match state.entity_state() {
        RequestState::Idle => {
            let idle = Paragraph::new("Select a Pokemon from the list")
                .style(Style::default().fg(TEXT_DIM))
                .alignment(Alignment::Center);
            frame.render_widget(idle, inner);
        }
        RequestState::Loading => {
            let name = ids::catalog_name(state.selected_index).unwrap_or("?");
            let loading = Paragraph::new(format!("[Loading #{code} {name}...]"))
                .style(Style::default().fg(TEXT_DIM))
                .alignment(Alignment::Center);
            frame.render_widget(loading, inner);
        }
        RequestState::Failed => render_error(frame, inner, state),
        RequestState::Ready => {
            if let Some(record) = state.entity_record() {
                render_record(frame, inner, record, state.move_cursor);
            }
        }
    }
}

fn render_error(frame: &mut Frame, area: Rect, state: &AppState) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!(
                "Could not load #{}",
                ids::to_display_code(state.selected_index)
            ),
            Style::default().fg(ACCENT_RED).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(state.entity_error().unwrap_or("unknown error").to_string()),
        Line::from(""),
        Line::from(Span::styled(
            "R: Retry",
            Style::default().fg(ACCENT_GOLD),
        )),
    ];
    let paragraph = Paragraph::new(Text::from(lines))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn render_record(frame: &mut Frame, area: Rect, record: &EntityRecord, move_cursor: usize) {
    let stats_height = record.stats.len() as u16 + 1;
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Length(stats_height),
            Constraint::Min(3),
        ])
        .split(area);

    let header = vec![
        Line::from(Span::styled(
            format_name(&record.name).to_ascii_uppercase(),
            Style::default()
                .fg(ACCENT_GREEN)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::styled("Height ", Style::default().fg(TEXT_DIM)),
            Span::raw(record.height.to_string()),
        ]),
        Line::from(vec![
            Span::styled("Types  ", Style::default().fg(TEXT_DIM)),
            Span::raw(
                record
                    .types
                    .iter()
                    .map(|name| format_name(name))
                    .collect::<Vec<_>>()
                    .join(" / "),
            ),
        ]),
    ];
    frame.render_widget(Paragraph::new(Text::from(header)), layout[0]);

    let stat_lines: Vec<Line> = record
        .stats
        .iter()
        .map(|stat| {
            meter_line(
                &format!("{:<16}", format_name(&stat.name)),
                u32::from(stat.value),
                STAT_MAX,
                STAT_BAR_WIDTH,
                ACCENT_GOLD,
            )
        })
        .collect();
    frame.render_widget(Paragraph::new(Text::from(stat_lines)), layout[1]);

    let moves_block = Block::default()
        .borders(Borders::TOP)
        .title(format!("Moves ({})", record.moves.len()))
        .style(Style::default().bg(BG_PANEL).fg(TEXT_MAIN))
        .border_style(Style::default().fg(BORDER_ACCENT));
    let moves_inner = moves_block.inner(layout[2]);
    frame.render_widget(moves_block, layout[2]);

    let visible = moves_inner.height as usize;
    let offset = scroll_offset(move_cursor, visible, record.moves.len());
    let move_lines: Vec<Line> = record
        .moves
        .iter()
        .enumerate()
        .skip(offset)
        .take(visible)
        .map(|(position, move_ref)| menu_line(&format_name(&move_ref.name), position == move_cursor))
        .collect();
    frame.render_widget(Paragraph::new(Text::from(move_lines)), moves_inner);
}

fn render_move_modal(frame: &mut Frame, area: Rect, state: &AppState) {
    let Some(label) = state.open_move.as_deref() else {
        return;
    };

    // Dim the background
    let buf = frame.buffer_mut();
    for y in area.y..area.y + area.height {
        for x in area.x..area.x + area.width {
            let cell = &mut buf[(x, y)];
            if let Color::Rgb(r, g, b) = cell.bg {
                cell.bg = Color::Rgb(r / 2, g / 2, b / 2);
            }
            if let Color::Rgb(r, g, b) = cell.fg {
                cell.fg = Color::Rgb(r / 2, g / 2, b / 2);
            }
        }
    }

    let modal_width = area.width.min(48);
    let modal_height = area.height.min(10);
    let modal_x = area.x + (area.width.saturating_sub(modal_width)) / 2;
    let modal_y = area.y + (area.height.saturating_sub(modal_height)) / 2;
    let modal_area = Rect::new(modal_x, modal_y, modal_width, modal_height);

    let buf = frame.buffer_mut();
    for y in modal_area.y..modal_area.y + modal_area.height {
        for x in modal_area.x..modal_area.x + modal_area.width {
            buf[(x, y)].set_char(' ').set_bg(BG_PANEL).set_fg(TEXT_MAIN);
        }
    }

    let block = panel_block(
        format!(" {} ", format_name(label).to_ascii_uppercase()),
        BG_PANEL,
    );
    let inner = block.inner(modal_area);
    frame.render_widget(block, modal_area);

    let body = match state.move_state() {
        RequestState::Loading => Line::from(Span::styled(
            "[Loading...]",
            Style::default().fg(TEXT_DIM),
        )),
        RequestState::Failed => Line::from(Span::styled(
            state.move_error().unwrap_or("unknown error").to_string(),
            Style::default().fg(ACCENT_RED),
        )),
        RequestState::Ready => match state.move_record().and_then(|record| record.description.as_deref()) {
            Some(text) => Line::from(projection::display_text(text)),
            None => Line::from(Span::styled(
                "No FireRed/LeafGreen description.",
                Style::default().fg(TEXT_DIM),
            )),
        },
        RequestState::Idle => Line::from(""),
    };

    let lines = vec![
        Line::from(""),
        body,
        Line::from(""),
        Line::from(Span::styled("ESC: Close", Style::default().fg(TEXT_DIM))),
    ];
    let paragraph = Paragraph::new(Text::from(lines))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, inner);
}

fn render_help(frame: &mut Frame, area: Rect, state: &AppState) {
    let hint = if state.open_move.is_some() {
        "Esc close"
    } else if state.search.active {
        "type to filter  Enter select  Esc cancel"
    } else {
        "↑/↓ browse  / search  m menu  [ ] moves  Enter details  q quit"
    };
    let help = Paragraph::new(Span::styled(hint, Style::default().fg(TEXT_DIM)))
        .style(Style::default().bg(BG_BASE));
    frame.render_widget(help, area);
}

fn scroll_offset(cursor: usize, visible: usize, len: usize) -> usize {
    if visible == 0 || len <= visible {
        return 0;
    }
    cursor
        .saturating_sub(visible / 2)
        .min(len - visible)
}

fn panel_block<'a, T>(title: T, bg: Color) -> Block<'a>
where
    T: Into<Title<'a>>,
{
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(title)
        .style(Style::default().bg(bg).fg(TEXT_MAIN))
        .border_style(Style::default().fg(BORDER_ACCENT))
}

fn meter_line(label: &str, current: u32, max: u32, width: usize, color: Color) -> Line<'static> {
    let max = max.max(1);
    let ratio = current.min(max) as f32 / max as f32;
    let filled = ((ratio * width as f32).round() as usize).min(width);
    let empty = width.saturating_sub(filled);
    Line::from(vec![
        Span::styled(label.to_string(), Style::default().fg(TEXT_DIM)),
        Span::styled(
            "█".repeat(filled),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
        Span::styled("░".repeat(empty), Style::default().fg(TEXT_DIM)),
        Span::styled(format!(" {current:>3}"), Style::default().fg(TEXT_MAIN)),
    ])
}

fn menu_line(label: &str, selected: bool) -> Line<'static> {
    let style = if selected {
        Style::default()
            .fg(HIGHLIGHT_TEXT)
            .bg(HIGHLIGHT_BG)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(TEXT_MAIN)
    };
    Line::from(Span::styled(label.to_string(), style))
}

/// `mr-mime` -> `Mr Mime`
pub fn format_name(name: &str) -> String {
    name.split('-')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => format!("{}{}", first.to_ascii_uppercase(), chars.as_str()),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

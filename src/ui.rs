//! UI rendering for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Modifier, Style},
    widgets::{Block, Borders, List, ListItem, Padding, Paragraph, Wrap},
};

use crate::app::{Browser, Controller, DisplayUpdate, View};
use crate::config::UiSettings;

const CONTROLS: [(&str, &str); 10] = [
    ("j/k", "up/down"),
    ("enter", "open/play/connect"),
    ("h/esc", "back"),
    ("space/p", "play/pause"),
    ("l/n", "next song"),
    ("s", "shuffle"),
    ("+/-", "volume"),
    ("u", "rescan"),
    ("b", "bluetooth"),
    ("q", "quit"),
];

/// Render the controls help text.
fn controls_text() -> String {
    CONTROLS
        .iter()
        .map(|(k, v)| format!("[{k}] {v}"))
        .collect::<Vec<String>>()
        .join(" | ")
}

/// Lines of the now-playing box.
fn now_playing_text(ctl: &Controller, browser: &Browser, now: &DisplayUpdate) -> String {
    let mut parts: Vec<String> = Vec::new();

    if !now.title.is_empty() {
        parts.push(format!("Song: {}", now.title));
    }
    if !now.artist.is_empty() {
        parts.push(format!("Artist: {}", now.artist));
    }
    parts.push(ctl.state().label().to_string());
    if ctl.shuffle_enabled() {
        parts.push("Shuffle: ON".to_string());
    } else {
        parts.push("Shuffle: OFF".to_string());
    }
    parts.push(format!("Volume: {}%", browser.volume));
    if let Some(art) = &now.art {
        parts.push(format!("Cover: {} bytes", art.len()));
    }

    let mut text = parts.join(" • ");
    if !now.status.is_empty() {
        text.push('\n');
        text.push_str(&now.status);
    }
    text
}

/// Title and rows of the main list for the current view.
fn list_rows(ctl: &Controller, browser: &Browser) -> (String, Vec<String>) {
    match &browser.view {
        View::Folders => (
            " folders ".to_string(),
            ctl.library()
                .folders()
                .iter()
                .map(|f| format!("{} ({})", f.name(), f.tracks.len()))
                .collect(),
        ),
        View::Tracks(path) => {
            let Some(folder) = ctl.library().folder(path) else {
                return (" tracks ".to_string(), Vec::new());
            };
            let playing = ctl.now_playing();
            let rows = folder
                .tracks
                .iter()
                .map(|t| {
                    if playing == Some(t.path.as_path()) {
                        format!("♪ {}", t.name)
                    } else {
                        format!("  {}", t.name)
                    }
                })
                .collect();
            (format!(" {} ", folder.name()), rows)
        }
        View::Devices => (
            " bluetooth devices ".to_string(),
            browser
                .devices
                .iter()
                .map(|d| format!("{} [{}]", d.name, d.address))
                .collect(),
        ),
    }
}

/// Slice of `total` rows that fits `height`, keeping `selected` centered when
/// possible. Returns `(start, end, selected position within the slice)`.
fn visible_window(total: usize, height: usize, selected: usize) -> (usize, usize, usize) {
    if total <= height || height == 0 {
        return (0, total, selected);
    }
    let half = height / 2;
    let mut start = selected.saturating_sub(half);
    if start + height > total {
        start = total - height;
    }
    (start, start + height, selected - start)
}

/// Render the entire UI into the provided `frame`.
pub fn draw(
    frame: &mut Frame,
    ctl: &Controller,
    browser: &Browser,
    now: &DisplayUpdate,
    ui_settings: &UiSettings,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(5),
            Constraint::Min(1),
            Constraint::Length(4),
        ])
        .split(frame.area());

    // Header
    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" stickplay ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    // Now playing
    let status_par = Paragraph::new(now_playing_text(ctl, browser, now))
        .block(
            Block::bordered()
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                })
                .title(" now playing "),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(status_par, chunks[1]);

    // Main list. Only the visible window is turned into ListItems.
    {
        let (title, rows) = list_rows(ctl, browser);
        let list_height = chunks[2].height.saturating_sub(2) as usize;
        let (start, end, selected_pos) = visible_window(rows.len(), list_height, browser.cursor);

        let items: Vec<ListItem> = rows[start..end]
            .iter()
            .map(|r| ListItem::new(r.as_str()))
            .collect();

        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title(title))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        let mut state = ratatui::widgets::ListState::default();
        if !rows.is_empty() {
            state.select(Some(selected_pos));
        }
        frame.render_stateful_widget(list, chunks[2], &mut state);
    }

    let footer = Paragraph::new(controls_text())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                }),
        )
        .wrap(Wrap { trim: true });

    frame.render_widget(footer, chunks[3]);
}

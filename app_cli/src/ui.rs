use crate::app::{App, NotificationKind};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
    Frame,
};
use std::time::Instant;
use tone_core::Band;
use visualization::{FrequencyBars, Spectrogram, Waveform};

const MAX_GAIN_DB: f32 = audio::eq::MAX_GAIN_DB;

pub fn ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(4),      // Header
            Constraint::Percentage(45), // Visualizations
            Constraint::Length(5),      // EQ
            Constraint::Min(5),         // Suggestions
            Constraint::Length(4),      // Pitch
            Constraint::Length(1),      // Key help
        ])
        .split(f.size());

    draw_header(f, app, chunks[0]);
    draw_visualizations(f, app, chunks[1]);
    draw_eq(f, app, chunks[2]);

    let suggestions = Paragraph::new(app.advice.as_str())
        .wrap(Wrap { trim: true })
        .block(Block::default().title("EQ Suggestions").borders(Borders::ALL));
    f.render_widget(suggestions, chunks[3]);

    let pitch = Paragraph::new(Text::from(vec![
        Line::raw(app.pitch_display.as_str()),
        Line::raw(format!("Notes: {}", app.note_history)),
    ]))
    .block(Block::default().title("Musical Analysis").borders(Borders::ALL));
    f.render_widget(pitch, chunks[4]);

    let help = Paragraph::new(
        "space: start/stop  s/S: skill level  1/! 2/@ 3/#: EQ up/down  q: quit",
    )
    .style(Style::default().fg(Color::DarkGray));
    f.render_widget(help, chunks[5]);
}

fn draw_header(f: &mut Frame, app: &App, area: Rect) {
    let toggle_style = if app.enabled {
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
    };

    let status = match app.notification(Instant::now()) {
        Some(n) => {
            let color = match n.kind {
                NotificationKind::Success => Color::Green,
                NotificationKind::Error => Color::Red,
            };
            Line::from(Span::styled(n.message.clone(), Style::default().fg(color)))
        }
        None => Line::raw(""),
    };

    let header = Paragraph::new(Text::from(vec![
        Line::from(vec![
            Span::styled("EvenTone", Style::default().fg(Color::Green)),
            Span::raw(format!(" - {}  ", app.source_label)),
            Span::styled(format!("[{}]", app.toggle_label()), toggle_style),
            Span::raw(format!("  Skill level: {}", app.skill_level())),
        ]),
        status,
    ]))
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(header, area);
}

fn draw_visualizations(f: &mut Frame, app: &App, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);
    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(columns[0]);

    f.render_widget(
        FrequencyBars::new(&app.spectrum)
            .block(Block::default().title("Frequency").borders(Borders::ALL)),
        left[0],
    );
    f.render_widget(
        Waveform::new(&app.samples)
            .block(Block::default().title("Waveform").borders(Borders::ALL)),
        left[1],
    );
    f.render_widget(
        Spectrogram::new(&app.spectrogram)
            .block(Block::default().title("Spectrogram").borders(Borders::ALL)),
        columns[1],
    );
}

fn draw_eq(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().title("Equalizer").borders(Borders::ALL);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1); 3])
        .split(inner);

    for (band, row) in Band::ALL.iter().zip(rows.iter()) {
        let gain = app.eq_gain(*band);
        let energy = app
            .energies
            .map(|e| format!("  (level {:.0})", e.get(*band)))
            .unwrap_or_default();

        let gauge = Gauge::default()
            .gauge_style(Style::default().fg(Color::Cyan))
            .ratio(((gain + MAX_GAIN_DB) / (2.0 * MAX_GAIN_DB)).clamp(0.0, 1.0) as f64)
            .label(format!("{}: {} dB{}", band_title(*band), gain, energy));
        f.render_widget(gauge, *row);
    }
}

fn band_title(band: Band) -> &'static str {
    match band {
        Band::Low => "Low",
        Band::Mid => "Mid",
        Band::High => "High",
    }
}

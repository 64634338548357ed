use ratatui::prelude::*;
use ratatui::widgets::*;

use super::app::App;
use crate::console::LineKind;

fn line_style(kind: LineKind) -> Style {
    match kind {
        LineKind::System => Style::default().fg(Color::Gray),
        LineKind::UserEcho => Style::default().fg(Color::White).bold(),
        LineKind::Alert => Style::default().fg(Color::Rgb(255, 140, 60)),
        LineKind::Success => Style::default().fg(Color::Green),
        LineKind::Info => Style::default().fg(Color::Cyan),
    }
}

pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .split(area);

    let header = Paragraph::new(Line::from(vec![
        Span::styled("  parsec", Style::default().fg(Color::Cyan).bold()),
        Span::styled("  system console", Style::default().fg(Color::DarkGray)),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    frame.render_widget(header, chunks[0]);

    let history = app.console.history();
    let visible_height = chunks[1].height.saturating_sub(2) as usize;
    let skip = history.len().saturating_sub(visible_height);

    let items: Vec<ListItem> = history
        .iter()
        .enumerate()
        .skip(skip)
        .map(|(i, line)| {
            ListItem::new(Line::from(vec![
                Span::styled(format!("{:>4} ", i + 1), Style::default().fg(Color::DarkGray)),
                Span::styled(line.text.clone(), line_style(line.kind)),
            ]))
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" Output ")
            .title_style(Style::default().fg(Color::White).bold()),
    );
    frame.render_widget(list, chunks[1]);

    let (title, border) = if app.console.is_processing() {
        (" Processing... ", Color::Yellow)
    } else {
        (" Command ", Color::Cyan)
    };
    let input = Paragraph::new(Line::from(vec![
        Span::styled("  $ ", Style::default().fg(Color::Green).bold()),
        Span::styled(format!("{}_", app.input), Style::default().fg(Color::White)),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .title(title)
            .title_style(Style::default().fg(border)),
    );
    frame.render_widget(input, chunks[2]);

    let help = Paragraph::new(Line::from(vec![
        Span::styled(" Enter", Style::default().fg(Color::Cyan)),
        Span::styled(" run  ", Style::default().fg(Color::DarkGray)),
        Span::styled("Tab", Style::default().fg(Color::Cyan)),
        Span::styled(" quiz  ", Style::default().fg(Color::DarkGray)),
        Span::styled("Esc", Style::default().fg(Color::Cyan)),
        Span::styled(" quit", Style::default().fg(Color::DarkGray)),
    ]));
    frame.render_widget(help, chunks[3]);
}

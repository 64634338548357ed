use ratatui::prelude::*;
use ratatui::widgets::*;

use super::app::{ensure_visible, App};
use crate::contact::whatsapp;
use crate::quiz::{Industry, Language, Priority, Step};

fn bordered(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(title)
        .title_style(Style::default().fg(Color::White).bold())
}

fn priority_color(priority: Priority) -> Color {
    match priority {
        Priority::Low => Color::Green,
        Priority::Medium => Color::Yellow,
        Priority::High => Color::Rgb(255, 140, 60),
        Priority::Critical => Color::Red,
    }
}

pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);

    let lang = app.quiz.language();
    let industry = app.quiz.industry().map(|i| i.label_in(lang)).unwrap_or("");
    let header = Paragraph::new(Line::from(vec![
        Span::styled("  parsec", Style::default().fg(Color::Cyan).bold()),
        Span::styled(
            format!("  {}", lang.pick("automation readiness quiz", "اختبار الجاهزية للأتمتة")),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(format!("    {}", industry), Style::default().fg(Color::Yellow)),
        Span::styled(
            format!("    {}%", app.quiz.progress()),
            Style::default().fg(Color::White).bold(),
        ),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    frame.render_widget(header, chunks[0]);

    match app.quiz.step() {
        Step::Unstarted => render_industries(frame, app, chunks[1]),
        Step::Answering(i) => render_question(frame, app, chunks[1], i),
        Step::CollectingCompanyName => render_company(frame, app, chunks[1]),
        Step::Completed => render_results(frame, app, chunks[1]),
    }

    let notice = app.notice.as_deref().unwrap_or("");
    frame.render_widget(
        Paragraph::new(Span::styled(format!(" {}", notice), Style::default().fg(Color::Red))),
        chunks[2],
    );

    let language_key = ("l", match lang {
        Language::En => " عربي  ",
        Language::Ar => " EN  ",
    });
    let keys: Vec<(&str, &str)> = match app.quiz.step() {
        Step::Unstarted => vec![(" ↑/↓", " choose  "), ("Enter", " start  "), language_key],
        Step::Answering(_) => vec![
            (" ↑/↓", " move  "),
            ("Space", " select  "),
            ("Enter", " confirm  "),
            ("←", " back  "),
            language_key,
        ],
        Step::CollectingCompanyName => vec![(" Enter", " finish  "), ("←", " back  ")],
        Step::Completed => vec![(" r", " restart  "), language_key],
    };
    let mut spans: Vec<Span> = keys
        .iter()
        .flat_map(|(k, d)| {
            [
                Span::styled(*k, Style::default().fg(Color::Cyan)),
                Span::styled(*d, Style::default().fg(Color::DarkGray)),
            ]
        })
        .collect();
    spans.extend([
        Span::styled("Tab", Style::default().fg(Color::Cyan)),
        Span::styled(" console  ", Style::default().fg(Color::DarkGray)),
        Span::styled("Esc", Style::default().fg(Color::Cyan)),
        Span::styled(" quit", Style::default().fg(Color::DarkGray)),
    ]);
    frame.render_widget(Paragraph::new(Line::from(spans)), chunks[3]);
}

fn render_industries(frame: &mut Frame, app: &App, area: Rect) {
    let lang = app.quiz.language();
    let items: Vec<ListItem> = Industry::ALL
        .iter()
        .enumerate()
        .map(|(i, industry)| {
            let is_selected = i == app.cursor;
            let marker = if is_selected { " >" } else { "  " };
            let style = if is_selected {
                Style::default().fg(Color::Cyan).bold()
            } else {
                Style::default().fg(Color::Gray)
            };
            ListItem::new(Line::from(vec![
                Span::styled(marker, style),
                Span::styled(format!(" {}", industry.label_in(lang)), style),
            ]))
        })
        .collect();

    let title = format!(" {} ", lang.pick("What is your industry?", "ما هي صناعتك؟"));
    frame.render_widget(List::new(items).block(bordered(&title)), area);
}

fn render_question(frame: &mut Frame, app: &App, area: Rect, index: usize) {
    let Some(question) = app.quiz.current_question() else {
        return;
    };
    let total = app.quiz.questions().len();
    let lang = app.quiz.language();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(0)])
        .split(area);

    let kind = if question.is_multi() {
        lang.pick("select all that apply", "اختر كل ما ينطبق")
    } else {
        lang.pick("select one", "اختر واحداً")
    };
    let counter = match lang {
        Language::En => format!("Question {} of {}", index + 1, total),
        Language::Ar => format!("السؤال {} من {}", index + 1, total),
    };
    let prompt = Paragraph::new(vec![
        Line::from(Span::styled(
            format!("  {}", question.prompt_in(lang)),
            Style::default().fg(Color::White).bold(),
        )),
        Line::from(Span::styled(
            format!("  {}  ({})", counter, kind),
            Style::default().fg(Color::DarkGray),
        )),
    ])
    .block(bordered(" Question "));
    frame.render_widget(prompt, chunks[0]);

    let visible_height = chunks[1].height.saturating_sub(2) as usize;
    let mut scroll = 0;
    ensure_visible(app.cursor, &mut scroll, visible_height);

    let items: Vec<ListItem> = question
        .options()
        .iter()
        .enumerate()
        .skip(scroll)
        .take(visible_height)
        .map(|(i, option)| {
            let is_cursor = i == app.cursor;
            let is_picked = app.selection.iter().any(|v| *v == option.value);
            let check = match (question.is_multi(), is_picked) {
                (true, true) => "[x]",
                (true, false) => "[ ]",
                (false, true) => "(•)",
                (false, false) => "( )",
            };
            let style = if is_cursor {
                Style::default().fg(Color::Cyan).bold()
            } else if is_picked {
                Style::default().fg(Color::Green)
            } else {
                Style::default().fg(Color::Gray)
            };
            let line = ListItem::new(Line::from(vec![
                Span::styled(format!(" {} ", if is_cursor { ">" } else { " " }), style),
                Span::styled(check, style),
                Span::styled(format!(" {}", option.label_in(lang)), style),
            ]));
            if is_cursor {
                line.style(Style::default().bg(Color::Rgb(30, 35, 50)))
            } else {
                line
            }
        })
        .collect();

    frame.render_widget(List::new(items).block(bordered(" Options ")), chunks[1]);
}

fn render_company(frame: &mut Frame, app: &App, area: Rect) {
    let lang = app.quiz.language();
    let body = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("  {}", lang.pick("Almost done!", "تقريباً انتهينا!")),
            Style::default().fg(Color::White).bold(),
        )),
        Line::from(Span::styled(
            format!(
                "  {}",
                lang.pick(
                    "Enter your company name to personalize your report",
                    "أدخل اسم شركتك لتخصيص تقريرك"
                )
            ),
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("  > ", Style::default().fg(Color::Cyan).bold()),
            Span::styled(format!("{}_", app.name_input), Style::default().fg(Color::White)),
        ]),
    ])
    .block(bordered(" Company "));
    frame.render_widget(body, area);
}

fn render_results(frame: &mut Frame, app: &App, area: Rect) {
    let (Some(pct), Ok(Some(tier))) = (app.quiz.final_percentage(), app.quiz.recommendation()) else {
        frame.render_widget(
            Paragraph::new("  No result available.").block(bordered(" Results ")),
            area,
        );
        return;
    };

    let lang = app.quiz.language();
    let color = priority_color(tier.priority);
    let message = whatsapp::quiz_report_message(app.quiz.results(), pct, tier.suggested_agent);
    let link = whatsapp::link(&app.contact.whatsapp_number, &message)
        .unwrap_or_else(|e| format!("unavailable: {}", e));

    let lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("  Score  ", Style::default().fg(Color::DarkGray)),
            Span::styled(format!("{}/100", pct), Style::default().fg(color).bold()),
            Span::styled(
                format!("   ({} of {} points)", app.quiz.results().total_score, app.quiz.max_score().unwrap_or(0)),
                Style::default().fg(Color::DarkGray),
            ),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            format!("  {}", tier.title_in(lang)),
            Style::default().fg(color).bold(),
        )),
        Line::from(Span::styled(
            format!("  {}", tier.description_in(lang)),
            Style::default().fg(Color::Gray),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled(
                format!("  {}  ", lang.pick("Our Recommendation", "توصيتنا")),
                Style::default().fg(Color::DarkGray),
            ),
            Span::styled(tier.suggested_agent_in(lang), Style::default().fg(Color::Cyan).bold()),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            format!("  {}:", lang.pick("Get Report", "احصل على التقرير")),
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(Span::styled(format!("  {}", link), Style::default().fg(Color::Green))),
    ];

    let title = format!(" Results for {} ", app.quiz.results().company_name);
    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(bordered(&title)),
        area,
    );
}

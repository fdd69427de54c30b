//! Lead detail pane.

use leads_core::{
  backend::LeadBackend,
  lead::{Lead, format_date, format_phone},
};
use leads_report::{TrackingData, extract};
use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::app::{App, Screen};

// ─── Public entry ─────────────────────────────────────────────────────────────

/// Render the detail pane into `area`.
pub fn draw<B: LeadBackend>(f: &mut Frame, area: Rect, app: &App<B>) {
  let lead = app.selected_lead();

  let title = lead.map_or_else(|| " Detail ".to_string(), |l| format!(" {} ", l.name));
  let border = if app.screen == Screen::LeadDetail {
    Color::Cyan
  } else {
    Color::DarkGray
  };
  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(border));

  let inner = block.inner(area);
  f.render_widget(block, area);

  let Some(lead) = lead else {
    f.render_widget(
      Paragraph::new("Select a lead and press Enter.").style(Style::default().fg(Color::DarkGray)),
      inner,
    );
    return;
  };

  let para = Paragraph::new(lines(lead))
    .wrap(Wrap { trim: false })
    .scroll((u16::try_from(app.detail_scroll).unwrap_or(u16::MAX), 0));
  f.render_widget(para, inner);
}

// ─── Line building ────────────────────────────────────────────────────────────

fn field(label: &str, value: String) -> Line<'static> {
  Line::from(vec![
    Span::styled(
      format!("{label:<14}"),
      Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD),
    ),
    Span::raw(value),
  ])
}

fn heading(text: &str) -> Line<'static> {
  Line::from(Span::styled(
    text.to_string(),
    Style::default()
      .fg(Color::Yellow)
      .add_modifier(Modifier::BOLD),
  ))
}

fn lines(lead: &Lead) -> Vec<Line<'static>> {
  let message = extract(&lead.message);

  let mut lines = vec![
    field("email", lead.email.clone()),
    field("phone", format_phone(&lead.phone)),
    field("position", lead.position.clone()),
    field("birth date", format_date(lead.birth_date)),
    field("created", format_date(lead.created_at.date_naive())),
    field("updated", format_date(lead.updated_at.date_naive())),
    Line::from(""),
    heading("Message"),
  ];
  lines.extend(message.text.lines().map(|l| Line::from(l.to_string())));

  if let Some(tracking) = &message.tracking {
    lines.push(Line::from(""));
    lines.push(heading("Tracking"));
    lines.extend(tracking_lines(tracking));
  }
  lines
}

fn tracking_lines(tracking: &TrackingData) -> Vec<Line<'static>> {
  let mut out = Vec::new();
  if let Some(referrer) = &tracking.referrer {
    out.push(field("referrer", referrer.clone()));
  }
  if let Some(ts) = tracking.display_timestamp() {
    out.push(field("timestamp", ts));
  }
  if let Some(session) = &tracking.session_id {
    out.push(field("session", session.clone()));
  }
  for (key, value) in &tracking.extra {
    out.push(field(key, value.clone()));
  }
  out
}

//! Create / edit form and the delete confirmation popup.

use leads_core::backend::LeadBackend;
use ratatui::{
  Frame,
  layout::{Constraint, Flex, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Clear, Paragraph},
};

use crate::app::{App, FORM_LABELS};

/// A `width` x `height` rectangle centred in `area`.
fn centered(area: Rect, width: u16, height: u16) -> Rect {
  let [row] = Layout::vertical([Constraint::Length(height)])
    .flex(Flex::Center)
    .areas(area);
  let [cell] = Layout::horizontal([Constraint::Length(width)])
    .flex(Flex::Center)
    .areas(row);
  cell
}

// ─── Form ─────────────────────────────────────────────────────────────────────

pub fn draw<B: LeadBackend>(f: &mut Frame, area: Rect, app: &App<B>) {
  let form = &app.form;
  let title = match form.editing {
    Some(id) => format!(" Edit lead {id} "),
    None => " New lead ".to_string(),
  };

  let popup = centered(area, area.width.min(72), (FORM_LABELS.len() as u16) * 2 + 4);
  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Cyan));

  let mut lines = Vec::with_capacity(FORM_LABELS.len() * 2 + 2);
  for (i, (label, value)) in FORM_LABELS.iter().zip(form.fields.iter()).enumerate() {
    let focused = i == form.focus;
    let label_style = if focused {
      Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD)
    } else {
      Style::default().fg(Color::Cyan)
    };
    lines.push(Line::from(Span::styled(label.to_string(), label_style)));
    let cursor = if focused { "_" } else { "" };
    lines.push(Line::from(format!("  {value}{cursor}")));
  }
  if let Some(err) = &form.error {
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
      err.clone(),
      Style::default().fg(Color::Red),
    )));
  }

  f.render_widget(Clear, popup);
  f.render_widget(Paragraph::new(lines).block(block), popup);
}

// ─── Delete confirmation ──────────────────────────────────────────────────────

pub fn draw_confirm<B: LeadBackend>(f: &mut Frame, area: Rect, app: &App<B>) {
  let name = app.selected_lead().map_or("this lead", |l| l.name.as_str());

  let popup = centered(area, area.width.min(50), 5);
  let block = Block::default()
    .title(" Delete ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Red));

  let lines = vec![
    Line::from(format!("Delete {name}?")),
    Line::from(""),
    Line::from(Span::styled(
      "[y] yes   [n] no",
      Style::default().fg(Color::DarkGray),
    )),
  ];

  f.render_widget(Clear, popup);
  f.render_widget(Paragraph::new(lines).block(block), popup);
}

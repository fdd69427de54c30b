//! TUI rendering: header, the active screen, and a status bar.

pub mod dashboard;
pub mod lead_detail;
pub mod lead_form;
pub mod lead_list;

use chrono::Local;
use leads_core::backend::LeadBackend;
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Paragraph},
};

use crate::app::{App, Screen};

// ─── Root draw ────────────────────────────────────────────────────────────────

/// Main draw function called each frame.
pub fn draw<B: LeadBackend>(f: &mut Frame, app: &App<B>) {
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // header
      Constraint::Min(0),    // body
      Constraint::Length(1), // status bar
    ])
    .split(f.area());

  draw_header(f, rows[0], app);
  draw_body(f, rows[1], app);
  draw_status(f, rows[2], app);
}

// ─── Header ───────────────────────────────────────────────────────────────────

fn tab_span(label: &str, active: bool) -> Span<'static> {
  let style = if active {
    Style::default()
      .fg(Color::Black)
      .bg(Color::Cyan)
      .add_modifier(Modifier::BOLD)
  } else {
    Style::default().fg(Color::White)
  };
  Span::styled(format!(" {label} "), style)
}

fn draw_header<B: LeadBackend>(f: &mut Frame, area: Rect, app: &App<B>) {
  let date = Local::now().format("%d/%m/%Y").to_string();

  let on_list = matches!(
    app.screen,
    Screen::LeadList | Screen::LeadDetail | Screen::Form | Screen::ConfirmDelete
  );
  let mut spans = vec![
    Span::styled(
      " leads ",
      Style::default()
        .fg(Color::White)
        .add_modifier(Modifier::BOLD),
    ),
    tab_span("1 Leads", on_list),
    tab_span("2 Dashboard", app.screen == Screen::Dashboard),
    tab_span("3 Reports", app.screen == Screen::Reports),
  ];

  let left_width: usize = spans.iter().map(|s| s.content.chars().count()).sum();
  let right = format!("{date} ");
  let pad = (area.width as usize)
    .saturating_sub(left_width)
    .saturating_sub(right.len());
  spans.push(Span::raw(" ".repeat(pad)));
  spans.push(Span::styled(right, Style::default().fg(Color::Gray)));

  let block = Block::default().style(Style::default().bg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);
  f.render_widget(Paragraph::new(Line::from(spans)), inner);
}

// ─── Body ─────────────────────────────────────────────────────────────────────

fn draw_body<B: LeadBackend>(f: &mut Frame, area: Rect, app: &App<B>) {
  match app.screen {
    Screen::LeadList | Screen::LeadDetail | Screen::ConfirmDelete => {
      let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);
      lead_list::draw(f, cols[0], app);
      lead_detail::draw(f, cols[1], app);
      if app.screen == Screen::ConfirmDelete {
        lead_form::draw_confirm(f, area, app);
      }
    }
    Screen::Form => lead_form::draw(f, area, app),
    Screen::Dashboard => dashboard::draw(f, area, app),
    Screen::Reports => dashboard::draw_reports(f, area, app),
  }
}

// ─── Status bar ───────────────────────────────────────────────────────────────

fn draw_status<B: LeadBackend>(f: &mut Frame, area: Rect, app: &App<B>) {
  let (mode_label, hints) = match app.screen {
    Screen::LeadList if app.filter_active => ("SEARCH", "Type to filter  Esc clear  Enter done"),
    Screen::LeadList => (
      "NORMAL",
      "jk navigate  / search  Enter detail  n new  e edit  d delete  r reload  q quit",
    ),
    Screen::LeadDetail => ("DETAIL", "jk scroll  e edit  d delete  Esc back  q quit"),
    Screen::Dashboard => ("STATS", "1 leads  3 reports  q quit"),
    Screen::Reports => ("REPORTS", "c CSV  x Excel  Esc back  q quit"),
    Screen::Form => ("FORM", "Tab next  Shift-Tab prev  Enter save  Esc cancel"),
    Screen::ConfirmDelete => ("DELETE", "y confirm  n cancel"),
  };

  let status = if app.loading {
    "Loading…".to_string()
  } else if app.status_msg.is_empty() {
    hints.to_string()
  } else {
    app.status_msg.clone()
  };

  let mode_span = Span::styled(
    format!(" {mode_label} "),
    Style::default()
      .fg(Color::Black)
      .bg(Color::Cyan)
      .add_modifier(Modifier::BOLD),
  );
  let hint_span = Span::styled(format!("  {status}"), Style::default().fg(Color::Gray));

  f.render_widget(
    Paragraph::new(Line::from(vec![mode_span, hint_span])).style(Style::default().bg(Color::Black)),
    area,
  );
}

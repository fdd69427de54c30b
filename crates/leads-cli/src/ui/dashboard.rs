//! Dashboard and reports screens. Both describe the full collection, never
//! the filtered list.

use leads_core::{backend::LeadBackend, lead::format_date};
use leads_report::{ExportFormat, Summary};
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Gauge, Paragraph},
};

use crate::app::App;

// ─── Dashboard ────────────────────────────────────────────────────────────────

pub fn draw<B: LeadBackend>(f: &mut Frame, area: Rect, app: &App<B>) {
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([Constraint::Length(5), Constraint::Min(0)])
    .split(area);
  let cols = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
    .split(rows[1]);

  draw_cards(f, rows[0], &app.summary);
  draw_positions(f, cols[0], &app.summary);
  draw_latest(f, cols[1], &app.summary);
}

fn panel(title: &str) -> Block<'static> {
  Block::default()
    .title(format!(" {title} "))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray))
}

fn draw_cards(f: &mut Frame, area: Rect, summary: &Summary) {
  let cards = [
    ("Total leads", summary.total.to_string()),
    ("Last 7 days", summary.recent.to_string()),
    ("Positions", summary.distinct_positions.to_string()),
  ];
  let cols = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Ratio(1, 3); 3])
    .split(area);

  for ((label, value), col) in cards.into_iter().zip(cols.iter()) {
    let text = Paragraph::new(Line::from(Span::styled(
      value,
      Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD),
    )))
    .centered()
    .block(panel(label));
    f.render_widget(text, *col);
  }
}

fn draw_positions(f: &mut Frame, area: Rect, summary: &Summary) {
  let block = panel("Top positions");
  let inner = block.inner(area);
  f.render_widget(block, area);

  if summary.top_positions.is_empty() {
    f.render_widget(
      Paragraph::new("No data.").style(Style::default().fg(Color::DarkGray)),
      inner,
    );
    return;
  }

  // Two rows per position: the label, then its bar.
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints(vec![Constraint::Length(1); summary.top_positions.len() * 2])
    .split(inner);

  for (i, share) in summary.top_positions.iter().enumerate() {
    f.render_widget(
      Paragraph::new(format!("{} ({})", share.position, share.count)),
      rows[i * 2],
    );
    f.render_widget(
      Gauge::default()
        .gauge_style(Style::default().fg(Color::Blue))
        .percent(share.percentage.min(100) as u16)
        .label(format!("{}%", share.percentage)),
      rows[i * 2 + 1],
    );
  }
}

fn draw_latest(f: &mut Frame, area: Rect, summary: &Summary) {
  let lines: Vec<Line> = if summary.latest.is_empty() {
    vec![Line::from(Span::styled(
      "No data.",
      Style::default().fg(Color::DarkGray),
    ))]
  } else {
    summary
      .latest
      .iter()
      .map(|entry| {
        let when = entry
          .recency
          .map(|r| r.to_string())
          .unwrap_or_else(|| format_date(entry.lead.created_at.date_naive()));
        Line::from(vec![
          Span::raw(entry.lead.name.clone()),
          Span::styled(format!("  {}", entry.lead.position), Style::default().fg(Color::Cyan)),
          Span::styled(format!("  {when}"), Style::default().fg(Color::DarkGray)),
        ])
      })
      .collect()
  };
  f.render_widget(Paragraph::new(lines).block(panel("Latest leads")), area);
}

// ─── Reports ──────────────────────────────────────────────────────────────────

pub fn draw_reports<B: LeadBackend>(f: &mut Frame, area: Rect, app: &App<B>) {
  let total = app.cache.len();
  let dir = app.export_dir.display();

  let mut lines = vec![
    Line::from(format!(
      "{total} leads across {} positions",
      app.summary.distinct_positions
    )),
    Line::from(format!("Exports are written to {dir}")),
    Line::from(""),
  ];
  for (key, format) in [("c", ExportFormat::Csv), ("x", ExportFormat::Excel)] {
    lines.push(Line::from(vec![
      Span::styled(
        format!("[{key}] "),
        Style::default()
          .fg(Color::Yellow)
          .add_modifier(Modifier::BOLD),
      ),
      Span::raw(format!("{:<8}", format.label())),
      Span::styled(
        format!("  .{}  {}", format.extension(), format.media_type()),
        Style::default().fg(Color::DarkGray),
      ),
    ]));
  }
  if app.exporting {
    lines.push(Line::from(""));
    lines.push(Line::from("Exporting…"));
  } else if total == 0 {
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
      "Nothing to export.",
      Style::default().fg(Color::DarkGray),
    )));
  }

  f.render_widget(Paragraph::new(lines).block(panel("Reports")), area);
}

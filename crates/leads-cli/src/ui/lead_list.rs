//! Lead list pane with the search box.

use leads_core::backend::LeadBackend;
use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};

use crate::{
  app::{App, Screen},
  config::SearchMode,
};

/// Render the lead list into `area`.
pub fn draw<B: LeadBackend>(f: &mut Frame, area: Rect, app: &App<B>) {
  let visible = app.visible_leads();
  let total = app.cache.len();

  let stale = if app.cache.is_stale() { " stale" } else { "" };
  let title = if app.filter_active || !app.filter.is_empty() {
    format!(" Leads ({}/{}){stale} ", visible.len(), total)
  } else {
    format!(" Leads ({total}){stale} ")
  };

  let border = if app.screen == Screen::LeadList {
    Color::Cyan
  } else {
    Color::DarkGray
  };
  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(border));

  let mut inner = block.inner(area);
  f.render_widget(block, area);

  // Search box on the last inner line, with the error beneath the query.
  if (app.filter_active || !app.filter.is_empty()) && inner.height > 2 {
    let lines = if app.search_error.is_some() { 2 } else { 1 };
    let box_area = Rect {
      x:      inner.x,
      y:      inner.y + inner.height - lines,
      width:  inner.width,
      height: lines,
    };
    inner.height = inner.height.saturating_sub(lines);

    let cursor = if app.filter_active { "_" } else { "" };
    let mode = match app.search_mode {
      SearchMode::Server => "",
      SearchMode::Local => " (local)",
    };
    let mut text = vec![Line::from(Span::styled(
      format!("/{}{cursor}{mode}", app.filter),
      Style::default().fg(Color::Yellow),
    ))];
    if let Some(err) = &app.search_error {
      text.push(Line::from(Span::styled(
        err.clone(),
        Style::default().fg(Color::Red),
      )));
    }
    f.render_widget(Paragraph::new(text), box_area);
  }

  if visible.is_empty() {
    let msg = if app.loading {
      "Loading…"
    } else if app.filter.is_empty() {
      "No leads yet. Press n to add one."
    } else {
      "No leads match the search."
    };
    f.render_widget(
      Paragraph::new(msg).style(Style::default().fg(Color::DarkGray)),
      inner,
    );
    return;
  }

  let items: Vec<ListItem> = visible
    .iter()
    .map(|lead| {
      ListItem::new(Line::from(vec![
        Span::raw(lead.name.clone()),
        Span::styled(format!("  {}", lead.email), Style::default().fg(Color::DarkGray)),
        Span::styled(format!("  {}", lead.position), Style::default().fg(Color::Cyan)),
      ]))
    })
    .collect();

  let mut state = ListState::default();
  state.select(Some(app.list_cursor.min(visible.len() - 1)));

  f.render_stateful_widget(
    List::new(items).highlight_style(
      Style::default()
        .bg(Color::Blue)
        .fg(Color::White)
        .add_modifier(Modifier::BOLD),
    ),
    inner,
    &mut state,
  );
}

// 🖥️ Terminal Dashboard - Regions table, charts, join report
//
// Same cached context as the web shell. The filter only drives the "map"
// column here (the terminal stand-in for the highlighted layer).

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use office_coverage::render::charts::{distribution, top_bars, TOP_N};
use office_coverage::render::palette::{count_color_lookup, parse_hex, FALLBACK_COLOR};
use office_coverage::render::table::{table_rows, TableRow};
use office_coverage::{AppContext, ViewFilter};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use std::collections::BTreeMap;
use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Regions,
    Charts,
    JoinReport,
}

impl Page {
    pub fn next(&self) -> Self {
        match self {
            Page::Regions => Page::Charts,
            Page::Charts => Page::JoinReport,
            Page::JoinReport => Page::Regions,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            Page::Regions => Page::JoinReport,
            Page::Charts => Page::Regions,
            Page::JoinReport => Page::Charts,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Page::Regions => "Regions",
            Page::Charts => "Charts",
            Page::JoinReport => "Join Report",
        }
    }
}

pub struct App {
    pub context: AppContext,
    /// Detail table rows, most offices first
    pub rows: Vec<TableRow>,
    pub filter: ViewFilter,
    pub state: TableState,
    pub current_page: Page,
    pub show_detail: bool,
}

impl App {
    pub fn new(context: AppContext) -> Self {
        let rows = table_rows(&context.regions);

        let mut state = TableState::default();
        if !rows.is_empty() {
            state.select(Some(0));
        }

        Self {
            context,
            rows,
            filter: ViewFilter::default(),
            state,
            current_page: Page::Regions,
            show_detail: false,
        }
    }

    pub fn selected_row(&self) -> Option<&TableRow> {
        self.state.selected().and_then(|i| self.rows.get(i))
    }

    /// Add or remove the selected region from the filter
    pub fn toggle_selected_region(&mut self) {
        if let Some(name) = self.selected_row().map(|r| r.normalized_name.clone()) {
            self.filter.toggle_region(&name);
        }
    }

    pub fn toggle_palette(&mut self) {
        self.filter.palette = self.filter.palette.toggle();
    }

    pub fn toggle_detail(&mut self) {
        self.show_detail = !self.show_detail;
    }

    pub fn clear_filter(&mut self) {
        self.filter.reset();
    }

    pub fn next_page(&mut self) {
        self.current_page = self.current_page.next();
    }

    pub fn previous_page(&mut self) {
        self.current_page = self.current_page.previous();
    }

    /// Highlight color per normalized name, for regions passing the filter
    pub fn highlight_colors(&self) -> BTreeMap<String, &'static str> {
        let filtered = self.filter.apply(&self.context.regions);
        let lookup = count_color_lookup(filtered.iter().map(|r| r.count), self.filter.palette);

        filtered
            .into_iter()
            .map(|r| {
                let color = lookup.get(&r.count).copied().unwrap_or(FALLBACK_COLOR);
                (r.normalized_name.clone(), color)
            })
            .collect()
    }

    pub fn next(&mut self) {
        let len = self.rows.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) => {
                if i >= len - 1 {
                    0
                } else {
                    i + 1
                }
            }
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.rows.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) => {
                if i == 0 {
                    len - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn page_down(&mut self) {
        let len = self.rows.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) => (i + 10).min(len - 1),
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn page_up(&mut self) {
        let i = match self.state.selected() {
            Some(i) => i.saturating_sub(10),
            None => 0,
        };
        self.state.select(Some(i));
    }
}

/// `#RRGGBB[AA]` → terminal color, alpha dropped
fn hex_color(hex: &str) -> Color {
    parse_hex(hex)
        .map(|((r, g, b), _)| Color::Rgb(r, g, b))
        .unwrap_or(Color::Gray)
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!(error = %err, "terminal dashboard stopped");
        println!("Error: {:?}", err);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                KeyCode::Enter => app.toggle_detail(),
                KeyCode::Tab => {
                    if key.modifiers.contains(KeyModifiers::SHIFT) {
                        app.previous_page();
                    } else {
                        app.next_page();
                    }
                }
                KeyCode::BackTab => app.previous_page(),
                KeyCode::Char(' ') => app.toggle_selected_region(),
                KeyCode::Char('p') => app.toggle_palette(),
                KeyCode::Char('c') => app.clear_filter(),
                KeyCode::Char('[') => app.filter.adjust_min(-1),
                KeyCode::Char(']') => app.filter.adjust_min(1),
                KeyCode::Char('{') => app.filter.adjust_max(-1),
                KeyCode::Char('}') => app.filter.adjust_max(1),
                KeyCode::Down | KeyCode::Char('j') => app.next(),
                KeyCode::Up | KeyCode::Char('k') => app.previous(),
                KeyCode::PageDown => app.page_down(),
                KeyCode::PageUp => app.page_up(),
                KeyCode::Home => app.state.select(Some(0)),
                KeyCode::End => {
                    if !app.rows.is_empty() {
                        app.state.select(Some(app.rows.len() - 1));
                    }
                }
                _ => {}
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Header with metrics
            Constraint::Min(0),    // Content area
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    if app.show_detail && app.current_page == Page::Regions {
        let content_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(chunks[1]);

        render_regions(f, content_chunks[0], app);
        render_detail_panel(f, content_chunks[1], app);
    } else {
        match app.current_page {
            Page::Regions => render_regions(f, chunks[1], app),
            Page::Charts => render_charts(f, chunks[1], app),
            Page::JoinReport => render_join_report(f, chunks[1], app),
        }
    }

    render_status_bar(f, chunks[2], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let metrics = app.context.metrics();

    let mut tab_spans = vec![];
    for (i, page) in [Page::Regions, Page::Charts, Page::JoinReport].iter().enumerate() {
        if i > 0 {
            tab_spans.push(Span::raw(" │ "));
        }
        let style = if *page == app.current_page {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        tab_spans.push(Span::styled(page.title().to_string(), style));
    }

    let metrics_line = Line::from(vec![
        Span::styled("Offices: ", Style::default().fg(Color::Gray)),
        Span::styled(
            metrics.total_offices.to_string(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled("Departments covered: ", Style::default().fg(Color::Gray)),
        Span::styled(
            metrics.covered_regions.to_string(),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled("Min: ", Style::default().fg(Color::Gray)),
        Span::styled(metrics.min_offices.to_string(), Style::default().fg(Color::Yellow)),
        Span::raw("  "),
        Span::styled("Max: ", Style::default().fg(Color::Gray)),
        Span::styled(metrics.max_offices.to_string(), Style::default().fg(Color::Magenta)),
    ]);

    let header = Paragraph::new(vec![Line::from(tab_spans), metrics_line]).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Office Network Coverage "),
    );

    f.render_widget(header, area);
}

fn render_regions(f: &mut Frame, area: Rect, app: &mut App) {
    let highlights = app.highlight_colors();

    let header_cells = ["Department", "Offices", "Map"]
        .iter()
        .map(|h| Cell::from(*h).style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)));
    let header = Row::new(header_cells).height(1).bottom_margin(1);

    let rows: Vec<Row> = app
        .rows
        .iter()
        .map(|row| {
            let map_cell = match highlights.get(&row.normalized_name) {
                Some(color) => Cell::from("■■").style(Style::default().fg(hex_color(color))),
                None => Cell::from("·").style(Style::default().fg(Color::DarkGray)),
            };

            Row::new(vec![
                Cell::from(truncate(&row.name, 32)),
                Cell::from(format!("{:>4}", row.offices)),
                map_cell,
            ])
            .style(Style::default().bg(hex_color(row.background)).fg(Color::Black))
        })
        .collect();

    let title = format!(
        " Offices per department ({} shown on map) ",
        highlights.len()
    );

    let table = Table::new(
        rows,
        [
            Constraint::Min(20),
            Constraint::Length(8),
            Constraint::Length(5),
        ],
    )
    .header(header)
    .block(Block::default().borders(Borders::ALL).title(title))
    .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn render_detail_panel(f: &mut Frame, area: Rect, app: &App) {
    let lines = match app.selected_row() {
        Some(row) => {
            let region = app.context.region(&row.normalized_name);
            let polygons = region
                .and_then(|r| r.geometry.as_ref())
                .map(|g| g.0.len())
                .unwrap_or(0);
            let in_filter = app.filter.regions.contains(&row.normalized_name);
            let highlighted = region.map(|r| app.filter.matches(r)).unwrap_or(false);

            vec![
                Line::from(Span::styled(
                    row.name.clone(),
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                )),
                Line::from(""),
                Line::from(format!("Join key:   {}", row.normalized_name)),
                Line::from(format!("Offices:    {}", row.offices)),
                Line::from(format!("Polygons:   {}", polygons)),
                Line::from(format!("Selected:   {}", if in_filter { "yes" } else { "no" })),
                Line::from(format!("On map:     {}", if highlighted { "yes" } else { "no" })),
            ]
        }
        None => vec![Line::from("No region selected")],
    };

    let panel = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" Detail "));
    f.render_widget(panel, area);
}

fn render_charts(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    let bars: Vec<Bar> = top_bars(&app.context.regions)
        .into_iter()
        .map(|bar| {
            Bar::default()
                .value(bar.value as u64)
                .label(Line::from(truncate(&bar.label, 18)))
                .style(Style::default().fg(hex_color(bar.color)))
                .value_style(Style::default().fg(Color::Black).bg(hex_color(bar.color)))
        })
        .collect();

    let chart = BarChart::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" Top {} departments by offices ", TOP_N)),
        )
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(1)
        .data(BarGroup::default().bars(&bars));
    f.render_widget(chart, chunks[0]);

    let lines: Vec<Line> = distribution(&app.context.regions)
        .into_iter()
        .map(|slice| {
            Line::from(vec![
                Span::styled("■ ", Style::default().fg(hex_color(slice.color))),
                Span::raw(format!("{:<12}", slice.label)),
                Span::styled(
                    format!("{:>3} dept.  {:>5.1}%", slice.regions, slice.share * 100.0),
                    Style::default().fg(Color::Gray),
                ),
            ])
        })
        .collect();

    let pie = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Distribution by number of offices "),
    );
    f.render_widget(pie, chunks[1]);
}

fn render_join_report(f: &mut Frame, area: Rect, app: &App) {
    let report = &app.context.report;

    let mut lines = vec![
        Line::from(format!("Office rows:       {}", app.context.office_rows)),
        Line::from(format!("Tallied offices:   {}", report.tallied_offices)),
        Line::from(format!("Matched offices:   {}", report.matched_offices)),
        Line::from(format!("Unmatched offices: {}", report.unmatched_offices())),
        Line::from(format!(
            "Loaded at:         {}",
            app.context.loaded_at.format("%Y-%m-%d %H:%M:%S UTC")
        )),
        Line::from(""),
    ];

    if report.is_complete() {
        lines.push(Line::from(Span::styled(
            "✓ Every department name matched a boundary",
            Style::default().fg(Color::Green),
        )));
    } else {
        lines.push(Line::from(Span::styled(
            "Department names without a boundary:",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )));
        for row in &report.unmatched {
            lines.push(Line::from(format!(
                "  {} ({} office(s)) from {}",
                row.region,
                row.count,
                row.spellings.join(" / ")
            )));
        }
    }

    let panel = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" Join Report "));
    f.render_widget(panel, area);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let mut spans = vec![
        Span::styled(" Filter: ", Style::default().fg(Color::Gray)),
        Span::styled(app.filter.describe(), Style::default().fg(Color::Cyan)),
    ];

    if let Some(warning) = &app.context.warning {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            format!("⚠ sample data: {}", truncate(warning, 60)),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ));
    }

    spans.push(Span::styled(
        "  │ Tab pages  j/k move  Space select  [ ] min  { } max  p palette  c clear  q quit",
        Style::default().fg(Color::DarkGray),
    ));

    let status = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL));
    f.render_widget(status, area);
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

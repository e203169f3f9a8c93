use crate::app::{App, Tab, REUSE_MAX_PCT, REUSE_MIN_PCT};
use crate::map::{ColorScale, MapLayers, CLASS_COUNT};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Cell, LineGauge, Paragraph, Row, Table, Tabs, Widget},
    Frame,
};

/// YlGn-style ramp, one color per shading class (low to high)
const RAMP: [Color; CLASS_COUNT] = [
    Color::Rgb(255, 255, 204),
    Color::Rgb(217, 240, 163),
    Color::Rgb(173, 221, 142),
    Color::Rgb(120, 198, 121),
    Color::Rgb(49, 163, 84),
    Color::Rgb(0, 104, 55),
];

/// Render the dashboard
pub fn render(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Title
            Constraint::Min(5),    // Body
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    render_title(frame, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(34), Constraint::Min(20)])
        .split(chunks[1]);

    render_sidebar(frame, app, body[0]);
    render_main(frame, app, body[1]);
    render_status_bar(frame, app, chunks[2]);
}

fn render_title(frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(
            " Waste-to-Wardrobe Index ",
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            "— CO₂ avoided by second-hand resale",
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    frame.render_widget(Paragraph::new(title), area);
}

fn render_sidebar(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(3)])
        .split(area);

    render_slider(frame, app, chunks[0]);
    render_country_list(frame, app, chunks[1]);
}

fn render_slider(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            " Reuse via resale [/] ",
            Style::default().fg(Color::Cyan),
        ));

    let ratio = (app.reuse_pct - REUSE_MIN_PCT) as f64 / (REUSE_MAX_PCT - REUSE_MIN_PCT) as f64;
    let gauge = LineGauge::default()
        .block(block)
        .filled_style(Style::default().fg(Color::Green))
        .unfilled_style(Style::default().fg(Color::DarkGray))
        .label(format!("{:>2}%", app.reuse_pct))
        .ratio(ratio);

    frame.render_widget(gauge, area);
}

fn render_country_list(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            " Countries / population (M) ",
            Style::default().fg(Color::Cyan),
        ));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let visible = inner.height as usize;
    let offset = if visible == 0 {
        0
    } else {
        app.cursor.saturating_sub(visible - 1)
    };

    let name_width = inner.width.saturating_sub(12) as usize;
    let lines: Vec<Line> = app
        .records
        .iter()
        .zip(&app.selected)
        .enumerate()
        .skip(offset)
        .take(visible)
        .map(|(i, (record, &selected))| {
            let mark = if selected { "[x]" } else { "[ ]" };
            let row = format!(
                "{mark} {:<name_width$} {:>7.1}",
                truncate(&record.country, name_width),
                record.population_millions(),
            );
            let style = if i == app.cursor {
                Style::default().fg(Color::Black).bg(Color::Green)
            } else if selected {
                Style::default().fg(Color::White)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            Line::styled(row, style)
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}

fn truncate(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

fn render_main(frame: &mut Frame, app: &mut App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(3)])
        .split(area);

    let tabs = Tabs::new(vec![" Bar Chart ", " Map ", " Data Table "])
        .select(app.tab.index())
        .style(Style::default().fg(Color::DarkGray))
        .highlight_style(Style::default().fg(Color::Green).add_modifier(Modifier::BOLD));
    frame.render_widget(tabs, chunks[0]);

    match app.tab {
        Tab::Chart => render_chart(frame, app, chunks[1]),
        Tab::Map => render_map(frame, app, chunks[1]),
        Tab::Table => render_table(frame, app, chunks[1]),
    }
}

fn render_chart(frame: &mut Frame, app: &App, area: Rect) {
    let results = app.results();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            format!(
                " CO₂e avoided (kt/year) at {}% resale coverage ",
                app.reuse_pct
            ),
            Style::default().fg(Color::Cyan),
        ));

    if results.is_empty() {
        let empty = Paragraph::new(Line::styled(
            "No countries selected — space toggles, 'a' selects all",
            Style::default().fg(Color::DarkGray),
        ))
        .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let bars: Vec<Bar> = results
        .iter()
        .map(|r| {
            Bar::default()
                .label(r.country.clone().into())
                .value(r.avoided_co2_kt.round().max(0.0) as u64)
                .text_value(format!("{:.1}", r.avoided_co2_kt))
                .style(Style::default().fg(Color::Green))
                .value_style(Style::default().fg(Color::Black).bg(Color::Green))
        })
        .collect();

    let chart = BarChart::default()
        .block(block)
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(0)
        .data(BarGroup::default().bars(&bars));

    frame.render_widget(chart, area);
}

fn render_map(frame: &mut Frame, app: &mut App, area: Rect) {
    let scale_name = match app.scale {
        ColorScale::Linear => "linear",
        ColorScale::Log => "log",
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            format!(" CO₂e savings map ({scale_name} scale, 'g' toggles) "),
            Style::default().fg(Color::Cyan),
        ));

    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.width < 2 || inner.height < 2 {
        return;
    }

    // Last row of the inner area holds the legend
    let canvas_area = Rect { height: inner.height - 1, ..inner };
    let legend_area = Rect {
        y: inner.y + inner.height - 1,
        height: 1,
        ..inner
    };

    // Remember where the canvas sits so mouse events can be mapped
    // back into braille pixels.
    app.map_area = Some((canvas_area.x, canvas_area.y, canvas_area.width, canvas_area.height));
    app.viewport.width = canvas_area.width as usize * 2;
    app.viewport.height = canvas_area.height as usize * 4;

    let layers = app.renderer.render(
        canvas_area.width as usize,
        canvas_area.height as usize,
        &app.viewport,
        &app.value_map(),
        app.scale,
    );

    frame.render_widget(ChoroplethWidget { layers }, canvas_area);
    render_legend(frame, legend_area, scale_name);
}

fn render_legend(frame: &mut Frame, area: Rect, scale_name: &str) {
    let mut spans = vec![Span::styled(" low ", Style::default().fg(Color::DarkGray))];
    for color in RAMP {
        spans.push(Span::styled("██", Style::default().fg(color)));
    }
    spans.push(Span::styled(
        format!(" high kt CO₂e ({scale_name})"),
        Style::default().fg(Color::DarkGray),
    ));
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Widget stacking the per-class fill canvases under the outline layer
struct ChoroplethWidget {
    layers: MapLayers,
}

impl ChoroplethWidget {
    fn render_layer(
        canvas: &crate::braille::BrailleCanvas,
        color: Color,
        area: Rect,
        buf: &mut Buffer,
    ) {
        for (row_idx, row_str) in canvas.rows().enumerate() {
            if row_idx >= area.height as usize {
                break;
            }
            let y = area.y + row_idx as u16;

            for (col_idx, ch) in row_str.chars().enumerate() {
                if col_idx >= area.width as usize {
                    break;
                }
                // Skip empty braille characters (U+2800)
                if ch == '\u{2800}' {
                    continue;
                }
                let x = area.x + col_idx as u16;
                buf[(x, y)].set_char(ch).set_fg(color);
            }
        }
    }
}

impl Widget for ChoroplethWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Fills from the lightest class up, outlines on top
        for (canvas, color) in self.layers.class_fills.iter().zip(RAMP) {
            Self::render_layer(canvas, color, area, buf);
        }
        Self::render_layer(&self.layers.outlines, Color::DarkGray, area, buf);
    }
}

fn render_table(frame: &mut Frame, app: &App, area: Rect) {
    let results = app.results();

    let header = Row::new(
        ["Country", "ISO", "kg/person", "Pop (M)", "Reused kg/p", "Items (M)", "CO₂ (kt)"]
            .map(|h| Cell::from(Span::styled(h, Style::default().fg(Color::Cyan)))),
    );

    let rows: Vec<Row> = results
        .iter()
        .map(|r| {
            Row::new(vec![
                Cell::from(r.country.clone()),
                Cell::from(r.iso3.clone()),
                Cell::from(format!("{:.2}", r.waste_kg_per_capita)),
                Cell::from(format!("{:.1}", r.population as f64 / 1e6)),
                Cell::from(format!("{:.2}", r.reused_kg_per_person)),
                Cell::from(format!("{:.1}", r.avoided_items / 1e6)),
                Cell::from(format!("{:.2}", r.avoided_co2_kt)),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Min(16),
            Constraint::Length(4),
            Constraint::Length(10),
            Constraint::Length(8),
            Constraint::Length(12),
            Constraint::Length(10),
            Constraint::Length(10),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(Span::styled(" Detailed results ", Style::default().fg(Color::Cyan))),
    );

    frame.render_widget(table, area);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let selected = app.selected.iter().filter(|&&s| s).count();
    let scale_name = match app.scale {
        ColorScale::Linear => "linear",
        ColorScale::Log => "log",
    };

    let mut spans = vec![
        Span::styled(" Reuse: ", Style::default().fg(Color::DarkGray)),
        Span::styled(format!("{}%", app.reuse_pct), Style::default().fg(Color::Yellow)),
        Span::styled(" | ", Style::default().fg(Color::DarkGray)),
        Span::styled(format!("{selected} selected"), Style::default().fg(Color::Green)),
        Span::styled(" | scale: ", Style::default().fg(Color::DarkGray)),
        Span::styled(scale_name, Style::default().fg(Color::Magenta)),
    ];

    if let Some(hover) = app.hover_line() {
        spans.push(Span::styled(" | ", Style::default().fg(Color::DarkGray)));
        spans.push(Span::styled(hover, Style::default().fg(Color::Cyan)));
    }

    if let Some(status) = &app.status {
        spans.push(Span::styled(" | ", Style::default().fg(Color::DarkGray)));
        spans.push(Span::styled(status.clone(), Style::default().fg(Color::Yellow)));
    }

    spans.push(Span::styled(
        " | tab:views space:select ←→:pop [/]:reuse e:export q:quit",
        Style::default().fg(Color::DarkGray),
    ));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

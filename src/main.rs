mod app;
mod braille;
mod data;
mod estimate;
mod export;
mod map;
mod ui;

use anyhow::Result;
use app::{App, Tab};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton,
    MouseEvent, MouseEventKind,
};
use crossterm::execute;
use map::ChoroplethRenderer;
use ratatui::DefaultTerminal;
use std::path::Path;
use std::time::Duration;

fn main() -> Result<()> {
    // Initialize terminal
    let mut terminal = ratatui::init();
    terminal.clear()?;

    // Enable mouse capture
    execute!(std::io::stdout(), EnableMouseCapture)?;

    // Run the app
    let result = run(&mut terminal);

    // Disable mouse capture and restore terminal
    let _ = execute!(std::io::stdout(), DisableMouseCapture);
    ratatui::restore();

    result
}

/// Handle mouse events: hover readout, and pan/zoom on the map tab
fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    // Always track position so the hover readout stays current
    app.set_mouse_pos(mouse.column, mouse.row);

    if app.tab != Tab::Map {
        return;
    }

    match mouse.kind {
        // Scroll wheel zooms towards the cursor
        MouseEventKind::ScrollUp => app.zoom_in_at(mouse.column, mouse.row),
        MouseEventKind::ScrollDown => app.zoom_out_at(mouse.column, mouse.row),
        // Click and drag to pan
        MouseEventKind::Down(MouseButton::Left) => {
            app.last_mouse = Some((mouse.column, mouse.row));
        }
        MouseEventKind::Drag(MouseButton::Left) => {
            app.handle_drag(mouse.column, mouse.row);
        }
        MouseEventKind::Up(MouseButton::Left) => {
            app.end_drag();
        }
        _ => {}
    }
}

fn run(terminal: &mut DefaultTerminal) -> Result<()> {
    let data_dir = Path::new("data");

    // The joined waste/ISO table is required; map polygons are not.
    let records = data::load_dataset(data_dir)?;

    let mut renderer = ChoroplethRenderer::new();
    data::seed_centroids(&mut renderer);
    let shapes_path = data_dir.join("ne_110m_countries.json");
    if shapes_path.exists() {
        if let Err(e) = data::load_country_shapes(&mut renderer, &shapes_path) {
            eprintln!("Warning: Failed to load country outlines: {e}");
        }
    }

    let mut app = App::new(records, renderer);

    // Main loop: every interaction triggers a full recompute + redraw
    loop {
        terminal.draw(|frame| ui::render(frame, &mut app))?;

        if event::poll(Duration::from_millis(250))? {
            match event::read()? {
                Event::Key(key) => {
                    // Only handle key press events (not release)
                    if key.kind == KeyEventKind::Press {
                        handle_key(&mut app, key.code);
                    }
                }
                Event::Mouse(mouse) => {
                    handle_mouse(&mut app, mouse);
                }
                _ => {}
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

fn handle_key(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Char('q') | KeyCode::Esc => app.quit(),

        // Views
        KeyCode::Tab => app.next_tab(),
        KeyCode::Char('1') => app.tab = Tab::Chart,
        KeyCode::Char('2') => app.tab = Tab::Map,
        KeyCode::Char('3') => app.tab = Tab::Table,

        // Reuse-percentage slider
        KeyCode::Char('[') => app.slider_dec(),
        KeyCode::Char(']') => app.slider_inc(),

        // Country selection
        KeyCode::Up => app.cursor_up(),
        KeyCode::Down => app.cursor_down(),
        KeyCode::Char(' ') => app.toggle_current(),
        KeyCode::Char('a') => app.select_all(),
        KeyCode::Char('n') => app.select_none(),

        // Population editor (steps in millions)
        KeyCode::Left => app.adjust_population(-0.1),
        KeyCode::Right => app.adjust_population(0.1),
        KeyCode::Char(',') => app.adjust_population(-1.0),
        KeyCode::Char('.') => app.adjust_population(1.0),

        // Map
        KeyCode::Char('g') => app.toggle_scale(),
        KeyCode::Char('e') => app.export_csv(),
        KeyCode::Char('u') => app.import_csv(),

        // Pan/zoom only make sense on the map tab
        KeyCode::Char('h') if app.tab == Tab::Map => app.pan(-10, 0),
        KeyCode::Char('l') if app.tab == Tab::Map => app.pan(10, 0),
        KeyCode::Char('k') if app.tab == Tab::Map => app.pan(0, -6),
        KeyCode::Char('j') if app.tab == Tab::Map => app.pan(0, 6),
        KeyCode::Char('+') | KeyCode::Char('=') if app.tab == Tab::Map => app.zoom_in(),
        KeyCode::Char('-') if app.tab == Tab::Map => app.zoom_out(),
        KeyCode::Char('0') | KeyCode::Char('r') if app.tab == Tab::Map => app.reset_view(),

        _ => {}
    }
}

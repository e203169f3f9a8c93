use std::collections::HashMap;
use std::path::Path;

use crate::data::CountryRecord;
use crate::estimate::{evaluate, ScenarioResult};
use crate::export;
use crate::map::{ChoroplethRenderer, ColorScale, Viewport};

/// Reuse-percentage slider bounds and step (10–50 %, step 5)
pub const REUSE_MIN_PCT: u8 = 10;
pub const REUSE_MAX_PCT: u8 = 50;
pub const REUSE_STEP_PCT: u8 = 5;
pub const REUSE_DEFAULT_PCT: u8 = 25;

/// Dashboard views, one per tab
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Chart,
    Map,
    Table,
}

impl Tab {
    pub fn next(self) -> Self {
        match self {
            Tab::Chart => Tab::Map,
            Tab::Map => Tab::Table,
            Tab::Table => Tab::Chart,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Tab::Chart => 0,
            Tab::Map => 1,
            Tab::Table => 2,
        }
    }
}

/// Application state. Country selection, the reuse slider, and edited
/// populations live here for the session; scenario results are derived
/// on demand and never stored.
pub struct App {
    pub records: Vec<CountryRecord>,
    pub selected: Vec<bool>,
    pub cursor: usize,
    pub reuse_pct: u8,
    pub scale: ColorScale,
    pub tab: Tab,
    pub viewport: Viewport,
    pub renderer: ChoroplethRenderer,
    pub status: Option<String>,
    pub should_quit: bool,
    /// Last mouse position for drag tracking
    pub last_mouse: Option<(u16, u16)>,
    /// ISO code of the country under the cursor on the map
    pub hovered_iso: Option<String>,
    /// Screen rect of the map canvas from the last draw (x, y, w, h),
    /// needed to translate mouse coordinates into braille pixels
    pub map_area: Option<(u16, u16, u16, u16)>,
}

impl App {
    pub fn new(records: Vec<CountryRecord>, renderer: ChoroplethRenderer) -> Self {
        // Default selection mirrors the dataset's framing: every
        // country except the United States, which dwarfs the rest.
        let selected = records.iter().map(|r| r.country != "United States").collect();

        let mut app = Self {
            records,
            selected,
            cursor: 0,
            reuse_pct: REUSE_DEFAULT_PCT,
            scale: ColorScale::Log,
            tab: Tab::Chart,
            viewport: Viewport::world(0, 0),
            renderer,
            status: None,
            should_quit: false,
            last_mouse: None,
            hovered_iso: None,
            map_area: None,
        };
        app.reset_view();
        app
    }

    /// Refit the viewport around the selected countries' centroids
    pub fn reset_view(&mut self) {
        let width = self.viewport.width.max(2);
        let height = self.viewport.height.max(4);
        let iso_codes: Vec<&str> = self
            .selected_records()
            .map(|r| r.iso3.as_str())
            .collect();
        self.viewport = match self.renderer.bounds_for(&iso_codes) {
            Some((min_lon, min_lat, max_lon, max_lat)) => Viewport::fit_bounds(
                min_lon - 5.0,
                min_lat - 5.0,
                max_lon + 5.0,
                max_lat + 5.0,
                width,
                height,
            ),
            None => Viewport::world(width, height),
        };
    }

    pub fn reuse_fraction(&self) -> f64 {
        self.reuse_pct as f64 / 100.0
    }

    fn selected_records(&self) -> impl Iterator<Item = &CountryRecord> {
        self.records
            .iter()
            .zip(&self.selected)
            .filter_map(|(r, &sel)| sel.then_some(r))
    }

    /// Scenario table for the current selection and slider position.
    /// Ephemeral: rebuilt on every call.
    pub fn results(&self) -> Vec<ScenarioResult> {
        let selected: Vec<CountryRecord> = self.selected_records().cloned().collect();
        evaluate(&selected, self.reuse_fraction())
    }

    /// Avoided CO₂ per ISO code, the choropleth's value column
    pub fn value_map(&self) -> HashMap<String, f64> {
        self.results()
            .into_iter()
            .map(|r| (r.iso3, r.avoided_co2_kt))
            .collect()
    }

    // --- Sidebar ---

    pub fn cursor_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn cursor_down(&mut self) {
        if !self.records.is_empty() {
            self.cursor = (self.cursor + 1).min(self.records.len() - 1);
        }
    }

    pub fn toggle_current(&mut self) {
        if let Some(sel) = self.selected.get_mut(self.cursor) {
            *sel = !*sel;
        }
    }

    pub fn select_all(&mut self) {
        self.selected.fill(true);
    }

    pub fn select_none(&mut self) {
        self.selected.fill(false);
    }

    /// Adjust the highlighted country's population by a delta in
    /// millions, clamped at zero. The only mutation path for the
    /// population column.
    pub fn adjust_population(&mut self, delta_millions: f64) {
        if let Some(record) = self.records.get_mut(self.cursor) {
            let delta = (delta_millions * 1e6).round() as i64;
            let new = record.population as i64 + delta;
            record.population = new.max(0) as u64;
        }
    }

    // --- Slider / toggles ---

    pub fn slider_inc(&mut self) {
        self.reuse_pct = (self.reuse_pct + REUSE_STEP_PCT).min(REUSE_MAX_PCT);
    }

    pub fn slider_dec(&mut self) {
        self.reuse_pct = self.reuse_pct.saturating_sub(REUSE_STEP_PCT).max(REUSE_MIN_PCT);
    }

    pub fn toggle_scale(&mut self) {
        self.scale = match self.scale {
            ColorScale::Linear => ColorScale::Log,
            ColorScale::Log => ColorScale::Linear,
        };
    }

    pub fn next_tab(&mut self) {
        self.tab = self.tab.next();
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    // --- Export ---

    pub fn export_csv(&mut self) {
        let results = self.results();
        self.status = Some(match export::write_results(Path::new(export::EXPORT_PATH), &results) {
            Ok(()) => format!("Exported {} rows to {}", results.len(), export::EXPORT_PATH),
            Err(e) => format!("Export failed: {e:#}"),
        });
    }

    /// Re-import a previously exported CSV as the working dataset.
    /// Round-trips exactly: evaluating the imported records reproduces
    /// the exported scenario table.
    pub fn import_csv(&mut self) {
        match export::read_records(Path::new(export::EXPORT_PATH)) {
            Ok(records) if !records.is_empty() => {
                self.selected = vec![true; records.len()];
                self.records = records;
                self.cursor = 0;
                self.status = Some(format!(
                    "Imported {} rows from {}",
                    self.records.len(),
                    export::EXPORT_PATH
                ));
            }
            Ok(_) => self.status = Some("Import skipped: file is empty".to_string()),
            Err(e) => self.status = Some(format!("Import failed: {e:#}")),
        }
    }

    // --- Map interaction (Map tab only) ---

    pub fn pan(&mut self, dx: i32, dy: i32) {
        self.viewport.pan(dx, dy);
    }

    pub fn zoom_in(&mut self) {
        self.viewport.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.viewport.zoom_out();
    }

    /// Translate a terminal position into braille pixel coordinates
    /// within the map canvas, if the position is over it.
    fn map_pixel(&self, col: u16, row: u16) -> Option<(i32, i32)> {
        let (x, y, w, h) = self.map_area?;
        if col < x || row < y || col >= x + w || row >= y + h {
            return None;
        }
        Some((((col - x) as i32) * 2, ((row - y) as i32) * 4))
    }

    pub fn zoom_in_at(&mut self, col: u16, row: u16) {
        if let Some((px, py)) = self.map_pixel(col, row) {
            self.viewport.zoom_in_at(px, py);
        }
    }

    pub fn zoom_out_at(&mut self, col: u16, row: u16) {
        if let Some((px, py)) = self.map_pixel(col, row) {
            self.viewport.zoom_out_at(px, py);
        }
    }

    pub fn handle_drag(&mut self, col: u16, row: u16) {
        if let Some((last_x, last_y)) = self.last_mouse {
            let dx = last_x as i32 - col as i32;
            let dy = last_y as i32 - row as i32;
            self.pan(dx * 2, dy * 4);
        }
        self.last_mouse = Some((col, row));
    }

    pub fn end_drag(&mut self) {
        self.last_mouse = None;
    }

    /// Refresh the hovered country from the current mouse position
    pub fn set_mouse_pos(&mut self, col: u16, row: u16) {
        self.hovered_iso = self.map_pixel(col, row).and_then(|(px, py)| {
            let (lon, lat) = self.viewport.unproject(px, py);
            self.renderer.country_at(lon, lat).map(str::to_string)
        });
    }

    /// Hover readout for the status bar: country name and avoided CO₂
    pub fn hover_line(&self) -> Option<String> {
        let iso = self.hovered_iso.as_deref()?;
        let record = self.records.iter().find(|r| r.iso3 == iso)?;
        let kt = self
            .value_map()
            .get(iso)
            .copied()
            .unwrap_or(0.0);
        Some(format!("{}: {:.2} kt", record.country, kt))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records() -> Vec<CountryRecord> {
        vec![
            CountryRecord {
                country: "France".to_string(),
                iso3: "FRA".to_string(),
                waste_kg_per_capita: 11.4,
                population: 67_000_000,
            },
            CountryRecord {
                country: "United States".to_string(),
                iso3: "USA".to_string(),
                waste_kg_per_capita: 40.22,
                population: 327_000_000,
            },
        ]
    }

    fn app() -> App {
        App::new(records(), ChoroplethRenderer::new())
    }

    #[test]
    fn test_default_selection_excludes_us() {
        let app = app();
        let names: Vec<String> = app.results().into_iter().map(|r| r.country).collect();
        assert_eq!(names, ["France"]);
    }

    #[test]
    fn test_empty_selection_gives_empty_results() {
        let mut app = app();
        app.select_none();
        assert!(app.results().is_empty());
        assert!(app.value_map().is_empty());
    }

    #[test]
    fn test_slider_clamps_to_range() {
        let mut app = app();
        for _ in 0..20 {
            app.slider_inc();
        }
        assert_eq!(app.reuse_pct, REUSE_MAX_PCT);
        for _ in 0..20 {
            app.slider_dec();
        }
        assert_eq!(app.reuse_pct, REUSE_MIN_PCT);
    }

    #[test]
    fn test_population_floor_at_zero() {
        let mut app = app();
        app.cursor = 0;
        app.adjust_population(-1000.0);
        assert_eq!(app.records[0].population, 0);
        app.adjust_population(0.1);
        assert_eq!(app.records[0].population, 100_000);
    }

    #[test]
    fn test_results_track_slider() {
        let mut app = app();
        let before = app.results()[0].avoided_co2_kt;
        app.slider_inc();
        let after = app.results()[0].avoided_co2_kt;
        assert!((after / before - 30.0 / 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_toggle_scale_flips() {
        let mut app = app();
        let initial = app.scale;
        app.toggle_scale();
        assert!(app.scale != initial);
        app.toggle_scale();
        assert!(app.scale == initial);
    }
}

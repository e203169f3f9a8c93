use std::collections::HashMap;

use crate::braille::BrailleCanvas;
use crate::map::geometry::{draw_circle, draw_line, fill_polygon, point_in_rings};
use crate::map::projection::Viewport;

/// A closed geographic ring (sequence of lon/lat coordinates)
pub type Ring = Vec<(f64, f64)>;

/// A country outline: one or more polygons, each an exterior ring
/// plus optional holes (GeoJSON polygon semantics).
pub struct CountryShape {
    pub iso3: String,
    pub polygons: Vec<Vec<Ring>>,
}

/// Number of shading classes on the choropleth ramp
pub const CLASS_COUNT: usize = 6;

/// Color scale applied before classing values
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum ColorScale {
    Linear,
    Log,
}

impl ColorScale {
    /// Normalize a value into [0, 1] against the scale maximum
    pub fn normalize(self, value: f64, max: f64) -> f64 {
        if max <= 0.0 || value <= 0.0 {
            return 0.0;
        }
        match self {
            ColorScale::Linear => (value / max).clamp(0.0, 1.0),
            ColorScale::Log => (value.ln_1p() / max.ln_1p()).clamp(0.0, 1.0),
        }
    }

    /// Map a value to a shading class in 0..CLASS_COUNT
    pub fn class(self, value: f64, max: f64) -> usize {
        let t = self.normalize(value, max);
        ((t * CLASS_COUNT as f64) as usize).min(CLASS_COUNT - 1)
    }
}

/// Rendered map layers: one fill canvas per shading class plus the
/// shared outline canvas drawn on top of the fills.
pub struct MapLayers {
    pub class_fills: Vec<BrailleCanvas>,
    pub outlines: BrailleCanvas,
}

/// Choropleth renderer over country polygons with a centroid
/// proportional-symbol fallback when no polygon data is loaded.
pub struct ChoroplethRenderer {
    shapes: Vec<CountryShape>,
    centroids: HashMap<String, (f64, f64)>,
}

impl ChoroplethRenderer {
    pub fn new() -> Self {
        Self {
            shapes: Vec::new(),
            centroids: HashMap::new(),
        }
    }

    /// Add a country outline keyed by ISO-3 code
    pub fn add_country(&mut self, iso3: &str, polygons: Vec<Vec<Ring>>) {
        self.shapes.push(CountryShape {
            iso3: iso3.to_string(),
            polygons,
        });
    }

    /// Register a country centroid (fallback symbol anchor and label position)
    pub fn add_centroid(&mut self, iso3: &str, lon: f64, lat: f64) {
        self.centroids.insert(iso3.to_string(), (lon, lat));
    }

    /// Check if polygon data is loaded
    pub fn has_shapes(&self) -> bool {
        !self.shapes.is_empty()
    }

    /// Geographic bounding box of the given ISO codes, from centroids.
    /// Returns None when no centroid matches.
    pub fn bounds_for(&self, iso_codes: &[&str]) -> Option<(f64, f64, f64, f64)> {
        let mut bounds: Option<(f64, f64, f64, f64)> = None;
        for iso in iso_codes {
            if let Some(&(lon, lat)) = self.centroids.get(*iso) {
                bounds = Some(match bounds {
                    None => (lon, lat, lon, lat),
                    Some((min_lon, min_lat, max_lon, max_lat)) => (
                        min_lon.min(lon),
                        min_lat.min(lat),
                        max_lon.max(lon),
                        max_lat.max(lat),
                    ),
                });
            }
        }
        bounds
    }

    /// ISO code of the country containing the given geographic point,
    /// for hover lookups. Falls back to the nearest centroid within
    /// a few degrees when no polygons are loaded.
    pub fn country_at(&self, lon: f64, lat: f64) -> Option<&str> {
        if self.has_shapes() {
            for shape in &self.shapes {
                for rings in &shape.polygons {
                    if point_in_rings(lon, lat, rings) {
                        return Some(&shape.iso3);
                    }
                }
            }
            return None;
        }

        let mut best: Option<(&str, f64)> = None;
        for (iso, &(c_lon, c_lat)) in &self.centroids {
            let d2 = (c_lon - lon).powi(2) + (c_lat - lat).powi(2);
            if d2 < 9.0 && best.map_or(true, |(_, b)| d2 < b) {
                best = Some((iso, d2));
            }
        }
        best.map(|(iso, _)| iso)
    }

    /// Render value-shaded countries into per-class canvases.
    /// `values` maps ISO-3 codes to avoided CO₂; countries absent from
    /// the map keep their outline but receive no fill.
    pub fn render(
        &self,
        width: usize,
        height: usize,
        viewport: &Viewport,
        values: &HashMap<String, f64>,
        scale: ColorScale,
    ) -> MapLayers {
        let mut layers = MapLayers {
            class_fills: (0..CLASS_COUNT)
                .map(|_| BrailleCanvas::new(width, height))
                .collect(),
            outlines: BrailleCanvas::new(width, height),
        };

        let max = values.values().cloned().fold(0.0_f64, f64::max);

        if self.has_shapes() {
            for shape in &self.shapes {
                let class = values.get(&shape.iso3).map(|&v| scale.class(v, max));
                for rings in &shape.polygons {
                    self.draw_polygon(&mut layers, rings, viewport, class);
                }
            }
        } else {
            // Proportional symbols at centroids: radius and class both
            // track the value so the ramp still reads at a glance.
            for (iso, &value) in values {
                if let Some(&(lon, lat)) = self.centroids.get(iso) {
                    let (px, py) = viewport.project(lon, lat);
                    if !viewport.is_visible(px, py) {
                        continue;
                    }
                    let class = scale.class(value, max);
                    let radius = 2 + class as i32;
                    draw_circle(&mut layers.class_fills[class], px, py, radius);
                }
            }
        }

        layers
    }

    /// Draw one polygon: fill into its class canvas, outline on top
    fn draw_polygon(
        &self,
        layers: &mut MapLayers,
        rings: &[Ring],
        viewport: &Viewport,
        class: Option<usize>,
    ) {
        let projected: Vec<Vec<(i32, i32)>> = rings
            .iter()
            .map(|ring| ring.iter().map(|&(lon, lat)| viewport.project(lon, lat)).collect())
            .collect();

        // Cull polygons entirely off-screen
        let on_screen = projected
            .iter()
            .flatten()
            .any(|&(px, py)| viewport.is_visible(px, py));
        if !on_screen {
            return;
        }

        if let Some(class) = class {
            fill_polygon(&mut layers.class_fills[class], &projected);
        }

        for ring in &projected {
            if ring.len() < 2 {
                continue;
            }
            let mut prev: Option<(i32, i32)> = None;
            for &(px, py) in ring.iter().chain(ring.first()) {
                if let Some((prev_x, prev_y)) = prev {
                    let dist = ((px - prev_x).abs() + (py - prev_y).abs()) as usize;
                    if dist < viewport.width
                        && viewport.line_might_be_visible((prev_x, prev_y), (px, py))
                    {
                        draw_line(&mut layers.outlines, prev_x, prev_y, px, py);
                    }
                }
                prev = Some((px, py));
            }
        }
    }
}

impl Default for ChoroplethRenderer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(min: f64, max: f64) -> Vec<Vec<Ring>> {
        vec![vec![vec![(min, min), (max, min), (max, max), (min, max)]]]
    }

    #[test]
    fn test_class_monotone_in_value() {
        let scale = ColorScale::Linear;
        let max = 100.0;
        let mut prev = 0;
        for v in [0.0, 10.0, 35.0, 60.0, 99.0, 100.0] {
            let class = scale.class(v, max);
            assert!(class >= prev);
            prev = class;
        }
        assert_eq!(scale.class(100.0, max), CLASS_COUNT - 1);
    }

    #[test]
    fn test_log_scale_keeps_membership() {
        // Log reshuffles class boundaries but zero stays zero and the
        // max stays in the top class.
        let max = 5000.0;
        assert_eq!(ColorScale::Log.class(0.0, max), 0);
        assert_eq!(ColorScale::Log.class(max, max), CLASS_COUNT - 1);
        assert!(ColorScale::Log.class(50.0, max) >= ColorScale::Linear.class(50.0, max));
    }

    #[test]
    fn test_render_fills_valued_country_only() {
        let mut renderer = ChoroplethRenderer::new();
        renderer.add_country("FRA", square(-5.0, 5.0));
        renderer.add_country("NOR", square(20.0, 30.0));

        let mut values = HashMap::new();
        values.insert("FRA".to_string(), 1000.0);

        let viewport = Viewport::new(10.0, 10.0, 2.0, 80, 160);
        let layers = renderer.render(40, 40, &viewport, &values, ColorScale::Linear);

        assert!(layers.class_fills.iter().any(|c| !c.is_blank()));
        assert!(!layers.outlines.is_blank());
    }

    #[test]
    fn test_render_empty_values_is_empty() {
        let mut renderer = ChoroplethRenderer::new();
        renderer.add_centroid("FRA", 2.2, 46.2);

        let viewport = Viewport::world(80, 160);
        let layers = renderer.render(40, 40, &viewport, &HashMap::new(), ColorScale::Linear);

        assert!(layers.class_fills.iter().all(|c| c.is_blank()));
    }

    #[test]
    fn test_country_at_polygon_and_fallback() {
        let mut renderer = ChoroplethRenderer::new();
        renderer.add_country("FRA", square(-5.0, 5.0));
        assert_eq!(renderer.country_at(0.0, 0.0), Some("FRA"));
        assert_eq!(renderer.country_at(50.0, 50.0), None);

        let mut fallback = ChoroplethRenderer::new();
        fallback.add_centroid("DEU", 10.4, 51.1);
        assert_eq!(fallback.country_at(10.0, 51.0), Some("DEU"));
        assert_eq!(fallback.country_at(-100.0, 0.0), None);
    }
}

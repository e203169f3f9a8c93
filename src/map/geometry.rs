use crate::braille::BrailleCanvas;

/// Draw a line using Bresenham's algorithm
pub fn draw_line(canvas: &mut BrailleCanvas, x0: i32, y0: i32, x1: i32, y1: i32) {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    let mut x = x0;
    let mut y = y0;

    loop {
        canvas.set_pixel_signed(x, y);

        if x == x1 && y == y1 {
            break;
        }

        let e2 = 2 * err;

        if e2 >= dy {
            if x == x1 {
                break;
            }
            err += dy;
            x += sx;
        }

        if e2 <= dx {
            if y == y1 {
                break;
            }
            err += dx;
            y += sy;
        }
    }
}

/// Draw a filled circle (proportional-symbol fallback markers)
pub fn draw_circle(canvas: &mut BrailleCanvas, cx: i32, cy: i32, radius: i32) {
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy <= radius * radius {
                canvas.set_pixel_signed(cx + dx, cy + dy);
            }
        }
    }
}

/// Fill a polygon given its rings in projected pixel coordinates,
/// using even-odd scanline filling. Multiple rings mean holes are
/// left empty, matching GeoJSON polygon semantics.
pub fn fill_polygon(canvas: &mut BrailleCanvas, rings: &[Vec<(i32, i32)>]) {
    let max_y = canvas.pixel_height() as i32;
    let max_x = canvas.pixel_width() as i32;

    let mut min_y = i32::MAX;
    let mut top_y = i32::MIN;
    for ring in rings {
        for &(_, y) in ring {
            min_y = min_y.min(y);
            top_y = top_y.max(y);
        }
    }
    if min_y > top_y {
        return;
    }
    let min_y = min_y.max(0);
    let top_y = top_y.min(max_y - 1);

    let mut crossings: Vec<i32> = Vec::new();
    for y in min_y..=top_y {
        crossings.clear();
        let scan = y as f64 + 0.5;

        for ring in rings {
            if ring.len() < 2 {
                continue;
            }
            for i in 0..ring.len() {
                let (x0, y0) = ring[i];
                let (x1, y1) = ring[(i + 1) % ring.len()];
                let (y0, y1) = (y0 as f64, y1 as f64);
                // Half-open edge rule avoids double-counting shared vertices
                if (y0 <= scan) == (y1 <= scan) {
                    continue;
                }
                let t = (scan - y0) / (y1 - y0);
                let x = x0 as f64 + t * (x1 - x0) as f64;
                crossings.push(x.round() as i32);
            }
        }

        crossings.sort_unstable();
        for pair in crossings.chunks_exact(2) {
            let start = pair[0].max(0);
            let end = pair[1].min(max_x - 1);
            for x in start..=end {
                canvas.set_pixel_signed(x, y);
            }
        }
    }
}

/// Even-odd point-in-polygon test in geographic coordinates,
/// used for hover lookups on the choropleth.
pub fn point_in_rings(lon: f64, lat: f64, rings: &[Vec<(f64, f64)>]) -> bool {
    let mut inside = false;
    for ring in rings {
        if ring.len() < 3 {
            continue;
        }
        for i in 0..ring.len() {
            let (x0, y0) = ring[i];
            let (x1, y1) = ring[(i + 1) % ring.len()];
            if (y0 <= lat) == (y1 <= lat) {
                continue;
            }
            let t = (lat - y0) / (y1 - y0);
            if lon < x0 + t * (x1 - x0) {
                inside = !inside;
            }
        }
    }
    inside
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_horizontal_line() {
        let mut canvas = BrailleCanvas::new(5, 1);
        draw_line(&mut canvas, 0, 0, 9, 0);
        assert!(!canvas.is_blank());
    }

    #[test]
    fn test_fill_square() {
        let mut canvas = BrailleCanvas::new(4, 2);
        let ring = vec![(0, 0), (8, 0), (8, 8), (0, 8)];
        fill_polygon(&mut canvas, &[ring]);
        assert_eq!(canvas.to_string(), "⣿⣿⣿⣿\n⣿⣿⣿⣿");
    }

    #[test]
    fn test_fill_with_hole() {
        let mut canvas = BrailleCanvas::new(4, 2);
        let outer = vec![(0, 0), (8, 0), (8, 8), (0, 8)];
        let hole = vec![(2, 2), (6, 2), (6, 6), (2, 6)];
        fill_polygon(&mut canvas, &[outer, hole]);
        let all_filled = "⣿⣿⣿⣿\n⣿⣿⣿⣿";
        assert!(!canvas.is_blank());
        assert_ne!(canvas.to_string(), all_filled);
    }

    #[test]
    fn test_point_in_rings() {
        let square = vec![vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]];
        assert!(point_in_rings(5.0, 5.0, &square));
        assert!(!point_in_rings(15.0, 5.0, &square));
    }
}

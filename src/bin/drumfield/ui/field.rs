//! Particle field widget - braille points on a canvas behind the grid

use ratatui::{
    layout::{Position, Rect},
    style::Color,
    symbols::Marker,
    widgets::canvas::{Canvas, Points},
    Frame,
};

use drumfield::particles::ParticleField;

/// Field units per terminal column and row (cells are about twice as tall as wide)
const UNITS_PER_COLUMN: f32 = 8.0;
const UNITS_PER_ROW: f32 = 16.0;

/// Field dimensions for a screen area
pub fn field_size(area: Rect) -> (f32, f32) {
    (area.width as f32 * UNITS_PER_COLUMN, area.height as f32 * UNITS_PER_ROW)
}

/// Field coordinates (y down) of the centre of a terminal cell
pub fn field_point(area: Rect, column: u16, row: u16) -> Option<(f32, f32)> {
    if !area.contains(Position::new(column, row)) {
        return None;
    }
    let x = ((column - area.x) as f32 + 0.5) * UNITS_PER_COLUMN;
    let y = ((row - area.y) as f32 + 0.5) * UNITS_PER_ROW;
    Some((x, y))
}

/// Draw every particle, brighter the faster it moves
pub fn render_field(frame: &mut Frame, area: Rect, field: &ParticleField, attracting: bool) {
    let (width, height) = (field.width() as f64, field.height() as f64);
    if width <= 0.0 || height <= 0.0 {
        return;
    }

    let palette = if attracting {
        [Color::Indexed(53), Color::Magenta, Color::LightMagenta]
    } else {
        [Color::DarkGray, Color::Gray, Color::White]
    };

    let mut buckets: [Vec<(f64, f64)>; 3] = Default::default();
    for particle in field.particles() {
        let energy = particle.speed() / particle.max_speed;
        let bucket = match energy {
            e if e < 0.15 => 0,
            e if e < 0.4 => 1,
            _ => 2,
        };
        // Canvas y points up
        buckets[bucket].push((particle.x as f64, height - particle.y as f64));
    }

    let canvas = Canvas::default()
        .marker(Marker::Braille)
        .x_bounds([0.0, width])
        .y_bounds([0.0, height])
        .paint(|ctx| {
            for (coords, &color) in buckets.iter().zip(&palette) {
                ctx.draw(&Points {
                    coords: coords.as_slice(),
                    color,
                });
            }
        });
    frame.render_widget(canvas, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_size_follows_area() {
        assert_eq!(field_size(Rect::new(0, 3, 100, 30)), (800.0, 480.0));
        assert_eq!(field_size(Rect::default()), (0.0, 0.0));
    }

    #[test]
    fn test_field_point_maps_cell_centres() {
        let area = Rect::new(2, 3, 10, 5);
        assert_eq!(field_point(area, 2, 3), Some((4.0, 8.0)));
        assert_eq!(field_point(area, 11, 7), Some((76.0, 72.0)));
    }

    #[test]
    fn test_field_point_outside_area() {
        let area = Rect::new(2, 3, 10, 5);
        assert_eq!(field_point(area, 1, 3), None);
        assert_eq!(field_point(area, 12, 3), None);
        assert_eq!(field_point(area, 5, 8), None);
    }
}

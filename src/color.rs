use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Color mapping: room type → Color32
// ---------------------------------------------------------------------------

/// Maps each room type to a distinct colour, shared by the map scatter and
/// the price/availability scatter so both legends agree.
#[derive(Debug, Clone)]
pub struct RoomTypeColors {
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl RoomTypeColors {
    /// Build a colour map from the dataset's distinct room types.
    pub fn new(room_types: &[String]) -> Self {
        let palette = generate_palette(room_types.len());
        let mapping: BTreeMap<String, Color32> = room_types
            .iter()
            .cloned()
            .zip(palette.into_iter())
            .collect();

        RoomTypeColors {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    /// Look up the colour for a room type.
    pub fn color_for(&self, room_type: &str) -> Color32 {
        self.mapping
            .get(room_type)
            .copied()
            .unwrap_or(self.default_color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn room_types_get_distinct_colors() {
        let colors = RoomTypeColors::new(&[
            "Entire home/apt".to_string(),
            "Private room".to_string(),
            "Shared room".to_string(),
        ]);
        let a = colors.color_for("Entire home/apt");
        let b = colors.color_for("Private room");
        let c = colors.color_for("Shared room");
        assert_ne!(a, b);
        assert_ne!(b, c);
        assert_eq!(colors.color_for("unknown"), Color32::GRAY);
    }
}

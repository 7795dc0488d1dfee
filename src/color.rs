use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

/// Bar colour of the per-year chart.
pub const ACCENT: Color32 = Color32::from_rgb(0x25, 0x6a, 0xe5);

fn hsl_to_color32(hue: f32, saturation: f32, lightness: f32) -> Color32 {
    let rgb: Srgb = Hsl::new(hue, saturation, lightness).into_color();
    Color32::from_rgb(
        (rgb.red.clamp(0.0, 1.0) * 255.0) as u8,
        (rgb.green.clamp(0.0, 1.0) * 255.0) as u8,
        (rgb.blue.clamp(0.0, 1.0) * 255.0) as u8,
    )
}

// ---------------------------------------------------------------------------
// Chart palettes
// ---------------------------------------------------------------------------

/// `n` visually distinct colours using evenly spaced hues.
pub fn category_palette(n: usize) -> Vec<Color32> {
    (0..n)
        .map(|i| hsl_to_color32((i as f32 / n as f32) * 360.0, 0.65, 0.55))
        .collect()
}

/// `n` shades of the accent hue, darkest first, for bars sorted by count.
pub fn accent_ramp(n: usize) -> Vec<Color32> {
    let hue = 218.0;
    (0..n)
        .map(|i| {
            let t = if n > 1 { i as f32 / (n - 1) as f32 } else { 0.0 };
            hsl_to_color32(hue, 0.78, 0.45 + 0.3 * t)
        })
        .collect()
}

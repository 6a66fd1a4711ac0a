use crate::color::space::{change_hsv_hue, change_hsv_saturation, change_rgb_hue, hsv_to_rgb, rgb_to_hsv};
use crate::color::RgbColor;

/// Terminal color order: black, red, green, yellow, blue, magenta, cyan (degrees).
pub const COLOR_HUES: [f64; 7] = [240.0, 0.0, 120.0, 60.0, 240.0, 300.0, 180.0];
pub const SATURATION_FLOOR: f64 = 0.4;

/// Re-hue `color` to each canonical hue, lifting saturation to the floor.
pub fn generate_base_colors(color: RgbColor) -> Vec<RgbColor> {
    let hsv = rgb_to_hsv(color);
    COLOR_HUES
        .iter()
        .map(|&degrees| {
            let mut shifted = change_hsv_hue(hsv, Some(degrees / 360.0));
            if shifted.s < SATURATION_FLOOR {
                shifted = change_hsv_saturation(shifted, Some(SATURATION_FLOOR));
            }
            hsv_to_rgb(shifted)
        })
        .collect()
}

/// Rotate every hue by `distance` turns, wrapping at the `[0, 1)` boundary.
pub fn shift_hues_distance(colors: &[RgbColor], distance: f64) -> Vec<RgbColor> {
    colors
        .iter()
        .map(|&color| {
            let hue = (rgb_to_hsv(color).h + distance).rem_euclid(1.0);
            change_rgb_hue(color, Some(hue))
        })
        .collect()
}

/// Signed distance (in turns) from the color's hue to the nearest canonical hue,
/// measured the short way round the circle.
pub fn get_min_distance_hues(color: RgbColor) -> f64 {
    let hue = rgb_to_hsv(color).h * 360.0;
    let mut best: Option<f64> = None;
    for &canonical in COLOR_HUES.iter() {
        let distance = (canonical - hue + 180.0).rem_euclid(360.0) - 180.0;
        if best.map_or(true, |b| distance.abs() < b.abs()) {
            best = Some(distance);
        }
    }
    best.unwrap_or(0.0) / 360.0
}

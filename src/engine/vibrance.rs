use crate::color::RgbColor;

pub const IDEAL_BRIGHTNESS: f64 = 1.0;
pub const BASE_COLOR_COUNT: usize = 7;

/// Saturation weighted by how close brightness is to [`IDEAL_BRIGHTNESS`].
///
/// Peaks at 1 for a fully saturated color at the ideal brightness and falls off
/// symmetrically for over- and under-exposure. Black scores 0.
pub fn calculate_vibrance(color: RgbColor) -> f64 {
    let hsv = color.to_hsv();
    if hsv.v == 0.0 {
        return 0.0;
    }
    hsv.s * (2.0 + (1.0 - (hsv.v / IDEAL_BRIGHTNESS + IDEAL_BRIGHTNESS / hsv.v)))
}

pub fn calculate_vibrance_with_list(colors: &[RgbColor]) -> Vec<(RgbColor, f64)> {
    colors.iter().map(|&c| (c, calculate_vibrance(c))).collect()
}

/// Colors closest to the ideal vibrance first (stable on ties).
pub fn sort_by_vibrance(colors: &[RgbColor]) -> Vec<RgbColor> {
    let mut scored = calculate_vibrance_with_list(colors);
    scored.sort_by(|a, b| (a.1 - 1.0).abs().total_cmp(&(b.1 - 1.0).abs()));
    scored.into_iter().map(|(color, _)| color).collect()
}

/// Keep the members of `colors` that appear in `selected`, in `colors` order.
pub fn sort_to_list(selected: &[RgbColor], colors: &[RgbColor]) -> Vec<RgbColor> {
    colors.iter().copied().filter(|c| selected.contains(c)).collect()
}

/// The 7 most vibrant colors, re-emitted in the input (dominance) order.
pub fn sort_colors(colors: &[RgbColor]) -> Vec<RgbColor> {
    let ranked = sort_by_vibrance(colors);
    let top = &ranked[..ranked.len().min(BASE_COLOR_COUNT)];
    sort_to_list(top, colors)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculate_vibrance() {
        assert!((calculate_vibrance(RgbColor(200, 0, 0)) - 0.94068627).abs() < 1e-4);
    }

    #[test]
    fn test_black_is_guarded() {
        assert_eq!(calculate_vibrance(RgbColor(0, 0, 0)), 0.0);
    }

    #[test]
    fn test_calculate_vibrance_with_list() {
        let colors = [RgbColor(200, 0, 0), RgbColor(100, 100, 100)];
        let scored = calculate_vibrance_with_list(&colors);
        assert_eq!(scored.len(), 2);
        for (color, vibrance) in scored {
            assert!(colors.contains(&color));
            assert!((0.0..=1.0).contains(&vibrance));
        }
    }

    #[test]
    fn test_sort_by_vibrance() {
        let sorted = sort_by_vibrance(&[RgbColor(10, 10, 0), RgbColor(255, 100, 0)]);
        assert_eq!(sorted, vec![RgbColor(255, 100, 0), RgbColor(10, 10, 0)]);
    }

    #[test]
    fn test_sort_colors_keeps_dominance_order() {
        // Dull colors interleaved with vivid ones; the vivid seven win but keep their slots' order
        let colors: Vec<RgbColor> = vec![
            RgbColor(20, 20, 20),
            RgbColor(255, 0, 0),
            RgbColor(30, 30, 35),
            RgbColor(0, 255, 0),
            RgbColor(0, 0, 255),
            RgbColor(40, 38, 40),
            RgbColor(255, 255, 0),
            RgbColor(0, 255, 255),
            RgbColor(255, 0, 255),
            RgbColor(250, 120, 0),
        ];
        let picked = sort_colors(&colors);
        assert_eq!(
            picked,
            vec![
                RgbColor(255, 0, 0),
                RgbColor(0, 255, 0),
                RgbColor(0, 0, 255),
                RgbColor(255, 255, 0),
                RgbColor(0, 255, 255),
                RgbColor(255, 0, 255),
                RgbColor(250, 120, 0),
            ]
        );
    }
}

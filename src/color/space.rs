use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Result, ThemeError};

/// Represents a 24-bit RGB color
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct RgbColor(pub u8, pub u8, pub u8);

/// HSV color with every channel in `[0, 1]`; hue is kept in `[0, 1)`.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct HsvColor {
    pub h: f64,
    pub s: f64,
    pub v: f64,
}

impl RgbColor {
    pub fn to_hsv(self) -> HsvColor {
        rgb_to_hsv(self)
    }

    pub fn to_hex(self) -> String {
        rgb_to_hex(self)
    }
}

impl fmt::Display for RgbColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&rgb_to_hex(*self))
    }
}

/// Serialized as `#rrggbb`
impl Serialize for RgbColor {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for RgbColor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        hex_to_rgb(&hex).map_err(serde::de::Error::custom)
    }
}

impl From<(u8, u8, u8)> for RgbColor {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        RgbColor(r, g, b)
    }
}

pub fn rgb_to_hex(color: RgbColor) -> String {
    format!("#{:02x}{:02x}{:02x}", color.0, color.1, color.2)
}

/// Parse `#rrggbb` (the leading `#` is optional).
pub fn hex_to_rgb(hex: &str) -> Result<RgbColor> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(ThemeError::InvalidHex(hex.to_string()));
    }

    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&digits[range], 16).map_err(|_| ThemeError::InvalidHex(hex.to_string()))
    };
    Ok(RgbColor(channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

pub fn rgb_to_hsv(color: RgbColor) -> HsvColor {
    let r = color.0 as f64 / 255.0;
    let g = color.1 as f64 / 255.0;
    let b = color.2 as f64 / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let v = max;
    if max == min {
        return HsvColor { h: 0.0, s: 0.0, v };
    }

    // max > min here, so max > 0 and neither division below can hit zero
    let delta = max - min;
    let s = delta / max;
    let rc = (max - r) / delta;
    let gc = (max - g) / delta;
    let bc = (max - b) / delta;

    let h = if r == max {
        bc - gc
    } else if g == max {
        2.0 + rc - bc
    } else {
        4.0 + gc - rc
    };

    HsvColor { h: (h / 6.0).rem_euclid(1.0), s, v }
}

/// Channels are truncated toward zero after scaling by 255.
pub fn hsv_to_rgb(color: HsvColor) -> RgbColor {
    let HsvColor { h, s, v } = color;
    let to_byte = |x: f64| (x * 255.0).clamp(0.0, 255.0) as u8;

    if s == 0.0 {
        let c = to_byte(v);
        return RgbColor(c, c, c);
    }

    let sector = (h * 6.0).floor();
    let f = h * 6.0 - sector;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));

    let (r, g, b) = match (sector as i64).rem_euclid(6) {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };
    RgbColor(to_byte(r), to_byte(g), to_byte(b))
}

// Channel setters. `None` leaves the color untouched so adjustment tables can
// skip a channel without branching at the call site.

pub fn change_hsv_hue(color: HsvColor, hue: Option<f64>) -> HsvColor {
    match hue {
        Some(h) => HsvColor { h: h.rem_euclid(1.0), ..color },
        None => color,
    }
}

pub fn change_hsv_saturation(color: HsvColor, saturation: Option<f64>) -> HsvColor {
    match saturation {
        Some(s) => HsvColor { s: s.clamp(0.0, 1.0), ..color },
        None => color,
    }
}

/// Setting the value of pure black (v = 0) yields a gray: black carries no hue
/// or saturation to preserve.
pub fn change_hsv_value(color: HsvColor, value: Option<f64>) -> HsvColor {
    match value {
        Some(v) => HsvColor { v: v.clamp(0.0, 1.0), ..color },
        None => color,
    }
}

pub fn change_rgb_hue(color: RgbColor, hue: Option<f64>) -> RgbColor {
    match hue {
        Some(_) => hsv_to_rgb(change_hsv_hue(rgb_to_hsv(color), hue)),
        None => color,
    }
}

pub fn change_rgb_saturation(color: RgbColor, saturation: Option<f64>) -> RgbColor {
    match saturation {
        Some(_) => hsv_to_rgb(change_hsv_saturation(rgb_to_hsv(color), saturation)),
        None => color,
    }
}

pub fn change_rgb_value(color: RgbColor, value: Option<f64>) -> RgbColor {
    match value {
        Some(_) => hsv_to_rgb(change_hsv_value(rgb_to_hsv(color), value)),
        None => color,
    }
}

/// Set value and saturation in one conversion. Palette expansion is built on
/// this; `to_hex` renders the result.
pub fn modify_rgb_value_saturation(color: RgbColor, value: Option<f64>, saturation: Option<f64>) -> RgbColor {
    hsv_to_rgb(change_hsv_saturation(change_hsv_value(rgb_to_hsv(color), value), saturation))
}

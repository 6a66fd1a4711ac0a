//! Table-driven expansion of 7 base colors into 16-slot dark/light palettes.
//!
//! Every engine shares [`make_palette`]; they differ only in the numeric
//! preset they hand it.

use std::collections::HashMap;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::color::space::{hex_to_rgb, modify_rgb_value_saturation};
use crate::color::RgbColor;
use crate::error::ThemeError;

pub const SLOT_COUNT: usize = 16;

/// Value levels: `(bg_dark, bg_light, fg_dark, fg_light, accent_dark, accent_light)`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ValueLevels {
    pub bg_dark: f64,
    pub bg_light: f64,
    pub fg_dark: f64,
    pub fg_light: f64,
    pub accent_dark: f64,
    pub accent_light: f64,
}

/// Saturation levels; `accent: None` keeps the base colors' own saturation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SaturationLevels {
    pub black: f64,
    pub white: f64,
    pub accent: Option<f64>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VariantPreset {
    pub values: ValueLevels,
    pub saturations: SaturationLevels,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PaletteExpansion {
    pub dark: VariantPreset,
    pub light: VariantPreset,
}

pub const STANDARD: PaletteExpansion = PaletteExpansion {
    dark: VariantPreset {
        values: ValueLevels { bg_dark: 0.1, bg_light: 0.7, fg_dark: 0.3, fg_light: 0.9, accent_dark: 0.7, accent_light: 0.9 },
        saturations: SaturationLevels { black: 0.2, white: 0.05, accent: None },
    },
    light: VariantPreset {
        values: ValueLevels { bg_dark: 0.9, bg_light: 0.3, fg_dark: 0.7, fg_light: 0.1, accent_dark: 0.5, accent_light: 0.3 },
        saturations: SaturationLevels { black: 0.5, white: 0.2, accent: None },
    },
};

pub const PASTEL: PaletteExpansion = PaletteExpansion {
    dark: VariantPreset {
        values: ValueLevels { bg_dark: 0.1, bg_light: 0.7, fg_dark: 0.3, fg_light: 0.9, accent_dark: 0.9, accent_light: 1.0 },
        saturations: SaturationLevels { black: 0.2, white: 0.05, accent: Some(0.4) },
    },
    light: VariantPreset {
        values: ValueLevels { bg_dark: 0.9, bg_light: 0.3, fg_dark: 0.7, fg_light: 0.1, accent_dark: 0.6, accent_light: 0.4 },
        saturations: SaturationLevels { black: 0.5, white: 0.2, accent: Some(0.4) },
    },
};

impl PaletteExpansion {
    pub fn expand(&self, base: &[RgbColor]) -> ThemePalette {
        ThemePalette {
            dark: make_palette(base, &self.dark),
            light: make_palette(base, &self.light),
        }
    }
}

fn adjust(color: RgbColor, value: f64, saturation: Option<f64>) -> RgbColor {
    modify_rgb_value_saturation(color, Some(value), saturation)
}

/// Slots 0/7/8/15 come from the anchor `base[0]`, slots 1–6 and 9–14 from
/// `base[1..=6]`. Short base lists are reused cyclically.
pub fn make_palette(base: &[RgbColor], preset: &VariantPreset) -> Slots {
    let pick = |i: usize| base.get(i % base.len().max(1)).copied().unwrap_or_default();
    let ValueLevels { bg_dark, bg_light, fg_dark, fg_light, accent_dark, accent_light } = preset.values;
    let SaturationLevels { black, white, accent } = preset.saturations;

    let anchor = pick(0);
    let mut slots = [RgbColor::default(); SLOT_COUNT];
    slots[0] = adjust(anchor, bg_dark, Some(black));
    slots[7] = adjust(anchor, bg_light, Some(white));
    slots[8] = adjust(anchor, fg_dark, Some(black));
    slots[15] = adjust(anchor, fg_light, Some(white));

    for i in 1..=6 {
        let color = pick(i);
        slots[i] = adjust(color, accent_dark, accent);
        slots[i + 8] = adjust(color, accent_light, accent);
    }
    Slots(slots)
}

/// Exactly sixteen colors, serialized as `{"color0": "#rrggbb", ..., "color15": ...}`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(try_from = "HashMap<String, String>")]
pub struct Slots(pub [RgbColor; SLOT_COUNT]);

impl Slots {
    pub fn get(&self, slot: usize) -> RgbColor {
        self.0[slot]
    }

    pub fn hex(&self, slot: usize) -> String {
        self.get(slot).to_hex()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// `("color0", "#rrggbb")` pairs in slot order.
    pub fn named(&self) -> impl Iterator<Item = (String, String)> + '_ {
        self.0.iter().enumerate().map(|(i, c)| (format!("color{}", i), c.to_hex()))
    }
}

impl Serialize for Slots {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (name, hex) in self.named() {
            map.serialize_entry(&name, &hex)?;
        }
        map.end()
    }
}

impl TryFrom<HashMap<String, String>> for Slots {
    type Error = ThemeError;

    fn try_from(map: HashMap<String, String>) -> Result<Self, Self::Error> {
        if map.len() != SLOT_COUNT {
            return Err(ThemeError::InvalidPalette(format!("expected {} slots, found {}", SLOT_COUNT, map.len())));
        }

        let mut slots = [RgbColor::default(); SLOT_COUNT];
        for (i, slot) in slots.iter_mut().enumerate() {
            let name = format!("color{}", i);
            let hex = map
                .get(&name)
                .ok_or_else(|| ThemeError::InvalidPalette(format!("missing slot {}", name)))?;
            *slot = hex_to_rgb(hex)?;
        }
        Ok(Slots(slots))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemePalette {
    pub dark: Slots,
    pub light: Slots,
}

impl ThemePalette {
    pub fn variant(&self, light: bool) -> &Slots {
        if light {
            &self.light
        } else {
            &self.dark
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::space::rgb_to_hsv;

    fn reds() -> Vec<RgbColor> {
        vec![RgbColor(255, 0, 0); 7]
    }

    #[test]
    fn test_make_palette_fills_every_slot() {
        let preset = VariantPreset {
            values: ValueLevels { bg_dark: 1.0, bg_light: 0.9, fg_dark: 0.8, fg_light: 0.7, accent_dark: 0.6, accent_light: 0.5 },
            saturations: SaturationLevels { black: 1.0, white: 0.9, accent: Some(0.8) },
        };
        let slots = make_palette(&reds(), &preset);
        assert_eq!(slots.len(), 16);
        assert_eq!(slots.named().count(), 16);
    }

    #[test]
    fn test_anchor_slots_use_value_table() {
        let palette = STANDARD.expand(&reds());
        // color0 = red at value 0.1, saturation 0.2
        assert_eq!(palette.dark.get(0), RgbColor(25, 20, 20));
        assert_eq!(palette.dark.get(0), modify_rgb_value_saturation(RgbColor(255, 0, 0), Some(0.1), Some(0.2)));
        assert_eq!(palette.light.get(9), modify_rgb_value_saturation(RgbColor(255, 0, 0), Some(0.3), None));
        assert!(rgb_to_hsv(palette.dark.get(15)).v > rgb_to_hsv(palette.dark.get(7)).v);
        assert!(rgb_to_hsv(palette.light.get(0)).v > rgb_to_hsv(palette.light.get(15)).v);
    }

    #[test]
    fn test_accent_saturation_is_optional() {
        let standard = STANDARD.expand(&reds());
        assert_eq!(rgb_to_hsv(standard.dark.get(1)).s, 1.0);

        let pastel = PASTEL.expand(&reds());
        assert!((rgb_to_hsv(pastel.dark.get(1)).s - 0.4).abs() < 0.01);
    }

    #[test]
    fn test_short_base_is_cycled() {
        let palette = STANDARD.expand(&[RgbColor(0, 0, 255), RgbColor(0, 255, 0)]);
        assert_eq!(palette.dark.len(), 16);
        assert_eq!(palette.dark.get(1), palette.dark.get(3));
    }

    #[test]
    fn test_slots_json_shape() {
        let palette = STANDARD.expand(&reds());
        let json = serde_json::to_value(&palette).unwrap();
        assert_eq!(json["dark"].as_object().unwrap().len(), 16);
        assert_eq!(json["light"].as_object().unwrap().len(), 16);
        assert_eq!(json["dark"]["color0"], "#191414");

        let back: ThemePalette = serde_json::from_value(json).unwrap();
        assert_eq!(back, palette);
    }

    #[test]
    fn test_slots_reject_missing_entries() {
        let mut map: HashMap<String, String> = STANDARD.expand(&reds()).dark.named().collect();
        map.remove("color9");
        assert!(Slots::try_from(map).is_err());
    }
}

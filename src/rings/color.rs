//! sRGB colors with HSL lightness shifting.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::ConfigError;

/// sRGB color with components in [0, 1]
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(try_from = "String")]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Build from a packed 0xRRGGBB value
    pub fn from_hex_u32(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as f32 / 255.0,
            g: ((hex >> 8) & 0xff) as f32 / 255.0,
            b: (hex & 0xff) as f32 / 255.0,
        }
    }

    /// Convert to (hue, saturation, lightness), each in [0, 1]
    pub fn to_hsl(self) -> (f32, f32, f32) {
        let max = self.r.max(self.g).max(self.b);
        let min = self.r.min(self.g).min(self.b);
        let lightness = (min + max) / 2.0;

        if max == min {
            return (0.0, 0.0, lightness);
        }

        let delta = max - min;
        let saturation = if lightness <= 0.5 {
            delta / (max + min)
        } else {
            delta / (2.0 - max - min)
        };

        let hue = if max == self.r {
            (self.g - self.b) / delta + if self.g < self.b { 6.0 } else { 0.0 }
        } else if max == self.g {
            (self.b - self.r) / delta + 2.0
        } else {
            (self.r - self.g) / delta + 4.0
        };

        (hue / 6.0, saturation, lightness)
    }

    /// Build from (hue, saturation, lightness); hue wraps, the rest clamp to [0, 1]
    pub fn from_hsl(hue: f32, saturation: f32, lightness: f32) -> Self {
        let h = hue.rem_euclid(1.0);
        let s = saturation.clamp(0.0, 1.0);
        let l = lightness.clamp(0.0, 1.0);

        if s == 0.0 {
            return Self::new(l, l, l);
        }

        let p = if l <= 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let q = 2.0 * l - p;

        Self::new(
            hue_to_channel(q, p, h + 1.0 / 3.0),
            hue_to_channel(q, p, h),
            hue_to_channel(q, p, h - 1.0 / 3.0),
        )
    }

    /// Shift HSL lightness by `delta`, keeping hue and saturation
    pub fn offset_lightness(self, delta: f32) -> Self {
        if delta == 0.0 {
            return self;
        }
        let (h, s, l) = self.to_hsl();
        Self::from_hsl(h, s, l + delta)
    }

    /// Linear-light components for an sRGB render target
    pub fn to_linear(self) -> [f32; 3] {
        [
            srgb_to_linear(self.r),
            srgb_to_linear(self.g),
            srgb_to_linear(self.b),
        ]
    }
}

fn hue_to_channel(q: f32, p: f32, t: f32) -> f32 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        q + (p - q) * 6.0 * t
    } else if t < 0.5 {
        p
    } else if t < 2.0 / 3.0 {
        q + (p - q) * 6.0 * (2.0 / 3.0 - t)
    } else {
        q
    }
}

fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

impl FromStr for Rgb {
    type Err = ConfigError;

    /// Parse `#rrggbb` (the leading `#` is optional)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.trim().strip_prefix('#').unwrap_or(s.trim());
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ConfigError::Color(s.to_string()));
        }
        u32::from_str_radix(digits, 16)
            .map(Self::from_hex_u32)
            .map_err(|_| ConfigError::Color(s.to_string()))
    }
}

impl TryFrom<String> for Rgb {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        write!(
            f,
            "#{:02x}{:02x}{:02x}",
            channel(self.r),
            channel(self.g),
            channel(self.b)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: Rgb, b: Rgb) {
        assert!(
            (a.r - b.r).abs() < 1e-4 && (a.g - b.g).abs() < 1e-4 && (a.b - b.b).abs() < 1e-4,
            "{:?} != {:?}",
            a,
            b
        );
    }

    #[test]
    fn test_parse_hex() {
        assert_eq!("#00ffff".parse::<Rgb>().unwrap(), Rgb::new(0.0, 1.0, 1.0));
        assert_eq!("FF0000".parse::<Rgb>().unwrap(), Rgb::new(1.0, 0.0, 0.0));
        assert!("#0ff".parse::<Rgb>().is_err());
        assert!("#gggggg".parse::<Rgb>().is_err());
        assert!("".parse::<Rgb>().is_err());
    }

    #[test]
    fn test_display_round_trips_hex() {
        assert_eq!(Rgb::from_hex_u32(0x44ff44).to_string(), "#44ff44");
    }

    #[test]
    fn test_hsl_of_cyan() {
        let (h, s, l) = Rgb::new(0.0, 1.0, 1.0).to_hsl();
        assert!((h - 0.5).abs() < 1e-6);
        assert!((s - 1.0).abs() < 1e-6);
        assert!((l - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_zero_offset_preserves_color() {
        let color = Rgb::from_hex_u32(0xff4444);
        assert_close(color.offset_lightness(0.0), color);
    }

    #[test]
    fn test_lightness_shift_darkens() {
        let shifted = Rgb::new(0.0, 1.0, 1.0).offset_lightness(-0.01);
        assert_close(shifted, Rgb::new(0.0, 0.98, 0.98));
    }

    #[test]
    fn test_lightness_clamps() {
        let black = Rgb::from_hex_u32(0x202020).offset_lightness(-1.0);
        assert_close(black, Rgb::new(0.0, 0.0, 0.0));

        let white = Rgb::from_hex_u32(0xffffff).offset_lightness(0.5);
        assert_close(white, Rgb::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn test_linear_conversion_endpoints() {
        assert_eq!(Rgb::new(0.0, 0.0, 0.0).to_linear(), [0.0, 0.0, 0.0]);
        let white = Rgb::new(1.0, 1.0, 1.0).to_linear();
        assert!(white.iter().all(|c| (c - 1.0).abs() < 1e-6));
    }
}

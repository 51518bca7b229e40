use std::ops::{ Add, Sub, Mul };

use serde::{ Serialize, Deserialize };

use crate::feq;

/// A color.
///
/// Represented conventionally with red-green-blue (RGB) values. Each value
/// nominally ranges from 0.0 to 1.0 inclusive; values outside that range are
/// clamped when the color is quantized for output.
///
/// # Examples
///
/// Darken the letter color by a lighting intensity:
///
/// ```
/// # use letter_raster::color::Color;
/// let lit = Color::letter().shade(0.5);
/// assert_eq!(lit, Color::rgb8(255, 105, 180) * 0.5);
/// ```
#[derive(Copy, Clone, Debug, Default, PartialOrd, Serialize, Deserialize)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

/// Partial equality on two colors.
///
/// Colors are compared component-wise, accounting for possible floating
/// point error in comparisons.
impl PartialEq for Color {
    fn eq(&self, other: &Color) -> bool {
        feq(self.r, other.r) &&
            feq(self.g, other.g) &&
            feq(self.b, other.b)
    }
}

impl Color {
    /// Creates a color with red, green and blue values.
    pub fn rgb(r: f64, g: f64, b: f64) -> Color {
        Color { r, g, b }
    }

    /// Creates a color from 8-bit channels.
    pub fn rgb8(r: u8, g: u8, b: u8) -> Color {
        Color {
            r: r as f64 / 255.0,
            g: g as f64 / 255.0,
            b: b as f64 / 255.0,
        }
    }

    /// The color black.
    pub fn black() -> Color {
        Color { r: 0.0, g: 0.0, b: 0.0 }
    }

    /// The color white.
    pub fn white() -> Color {
        Color { r: 1.0, g: 1.0, b: 1.0 }
    }

    /// The hot pink shared by every face of both letters.
    pub fn letter() -> Color {
        Color::rgb8(255, 105, 180)
    }

    /// The dark grey the scene is cleared to.
    pub fn background() -> Color {
        Color::rgb8(35, 35, 35)
    }

    /// The yellow of the light source marker.
    pub fn light_marker() -> Color {
        Color::rgb8(255, 255, 0)
    }

    /// Scales every channel by a lighting intensity.
    pub fn shade(&self, intensity: f64) -> Color {
        *self * intensity
    }

    /// Linearly interpolates from `self` (at `t == 0`) to `other` (`t == 1`).
    pub fn lerp(&self, other: &Color, t: f64) -> Color {
        *self + (*other - *self) * t
    }

    /// Quantizes to 8-bit channels, clamping out-of-range values.
    ///
    /// ```
    /// # use letter_raster::color::Color;
    /// assert_eq!(Color::rgb(1.5, 0.5, -0.2).to_rgb8(), [255, 128, 0]);
    /// ```
    pub fn to_rgb8(&self) -> [u8; 3] {
        let q = |c: f64| (c * 255.0).round().clamp(0.0, 255.0) as u8;
        [q(self.r), q(self.g), q(self.b)]
    }
}

/// Adds two colors together.
///
/// Components are added together individually.
impl Add<Color> for Color {
    type Output = Color;

    fn add(self, other: Color) -> Self::Output {
        Color {
            r: self.r + other.r,
            g: self.g + other.g,
            b: self.b + other.b,
        }
    }
}

/// Subtracts one color from another.
impl Sub<Color> for Color {
    type Output = Color;

    fn sub(self, other: Color) -> Self::Output {
        Color {
            r: self.r - other.r,
            g: self.g - other.g,
            b: self.b - other.b,
        }
    }
}

/// Multiplies a color by a scalar.
impl Mul<f64> for Color {
    type Output = Color;

    fn mul(self, other: f64) -> Self::Output {
        Color {
            r: self.r * other,
            g: self.g * other,
            b: self.b * other,
        }
    }
}

#[test]
fn add_colors() {
    let c1 = Color::rgb(0.9, 0.6, 0.75);
    let c2 = Color::rgb(0.7, 0.1, 0.25);

    assert_eq!(c1 + c2, Color::rgb(1.6, 0.7, 1.0));
}

#[test]
fn subtract_colors() {
    let c1 = Color::rgb(0.9, 0.6, 0.75);
    let c2 = Color::rgb(0.7, 0.1, 0.25);

    assert_eq!(c1 - c2, Color::rgb(0.2, 0.5, 0.5));
}

#[test]
fn shade_color() {
    let c = Color::rgb(0.2, 0.3, 0.4);

    assert_eq!(c.shade(2.0), Color::rgb(0.4, 0.6, 0.8));
}

#[test]
fn lerp_colors() {
    let c = Color::black().lerp(&Color::white(), 0.25);

    assert_eq!(c, Color::rgb(0.25, 0.25, 0.25));
}

#[test]
fn rgb8_round_trip() {
    assert_eq!(Color::letter().to_rgb8(), [255, 105, 180]);
    assert_eq!(Color::background().to_rgb8(), [35, 35, 35]);
}

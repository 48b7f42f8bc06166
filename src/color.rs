use std::ops::{ Add, Sub, Mul };

use serde::{ Serialize, Deserialize };

use crate::feq;
use crate::consts::MAX_CHANNEL;

/// A color.
///
/// Represented with red-green-blue (RGB) values. While shading, channels are
/// nominally in `0.0..=1.0`, but sums of light contributions may exceed that
/// range; a color is only clamped when it is quantized into a pixel.
///
/// # Examples
///
/// Light a red surface with white light:
///
/// ```
/// # use raycast::color::Color;
/// let lit = Color::hadamard(&Color::white(), &Color::red());
/// assert_eq!(lit, Color::rgb(1.0, 0.0, 0.0));
/// ```
///
/// Quantize an over-exposed color:
///
/// ```
/// # use raycast::color::Color;
/// let hot = Color::rgb(1.7, 0.5, -0.2);
/// assert_eq!(hot.to_rgb8(), [255, 127, 0]);
/// ```
#[derive(Copy, Clone, Debug, Default, PartialOrd, Serialize, Deserialize)]
#[serde(from = "[f64; 3]", into = "[f64; 3]")]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

/// Partial equality on two colors.
///
/// Channels are compared individually, accounting for possible floating point
/// error.
impl PartialEq for Color {
    fn eq(&self, other: &Color) -> bool {
        feq(self.r, other.r) &&
            feq(self.g, other.g) &&
            feq(self.b, other.b)
    }
}

impl From<[f64; 3]> for Color {
    fn from(c: [f64; 3]) -> Color {
        Color { r: c[0], g: c[1], b: c[2] }
    }
}

impl From<Color> for [f64; 3] {
    fn from(c: Color) -> [f64; 3] {
        [c.r, c.g, c.b]
    }
}

impl Color {
    /// Creates a color with red, green and blue values.
    pub fn rgb(r: f64, g: f64, b: f64) -> Color {
        Color { r, g, b }
    }

    /// The color black, which is also "no light".
    pub fn black() -> Color {
        Color { r: 0.0, g: 0.0, b: 0.0 }
    }

    pub fn white() -> Color {
        Color { r: 1.0, g: 1.0, b: 1.0 }
    }

    pub fn red() -> Color {
        Color { r: 1.0, g: 0.0, b: 0.0 }
    }

    /// Computes the Hadamard product of two colors.
    ///
    /// This is provided as an associated function of `Color` to prevent
    /// possible confusion with the `*` operator. Each channel of `c1` is
    /// multiplied by the matching channel of `c2`; this is how a light's color
    /// filters through a surface color.
    pub fn hadamard(c1: &Color, c2: &Color) -> Color {
        Color {
            r: c1.r * c2.r,
            g: c1.g * c2.g,
            b: c1.b * c2.b,
        }
    }

    /// Clamps every channel into `0.0..=1.0`.
    pub fn clamp(&self) -> Color {
        Color {
            r: self.r.clamp(0.0, 1.0),
            g: self.g.clamp(0.0, 1.0),
            b: self.b.clamp(0.0, 1.0),
        }
    }

    /// Clamps the color, scales it to `0..=255` and truncates each channel.
    pub fn to_rgb8(&self) -> [u8; 3] {
        let c = self.clamp();

        [
            (c.r * MAX_CHANNEL) as u8,
            (c.g * MAX_CHANNEL) as u8,
            (c.b * MAX_CHANNEL) as u8,
        ]
    }

    /// Whether every channel is exactly zero.
    pub fn is_black(&self) -> bool {
        self.r == 0.0 && self.g == 0.0 && self.b == 0.0
    }

    /// Whether every channel is a finite number.
    pub fn is_finite(&self) -> bool {
        self.r.is_finite() && self.g.is_finite() && self.b.is_finite()
    }
}

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

/// Multiplies a scalar by a color.
impl Mul<Color> for f64 {
    type Output = Color;

    fn mul(self, other: Color) -> Self::Output {
        other * self
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
fn scale_color() {
    assert_eq!(Color::rgb(0.2, 0.3, 0.4) * 2.0, Color::rgb(0.4, 0.6, 0.8));
    assert_eq!(0.5 * Color::white(), Color::rgb(0.5, 0.5, 0.5));
}

#[test]
fn clamp_out_of_range() {
    let c = Color::rgb(-0.5, 0.25, 3.0);

    assert_eq!(c.clamp(), Color::rgb(0.0, 0.25, 1.0));
}

#[test]
fn quantize_truncates() {
    assert_eq!(Color::white().to_rgb8(), [255, 255, 255]);
    assert_eq!(Color::rgb(0.5, 0.999, 0.0).to_rgb8(), [127, 254, 0]);
}

use std::ops::{ Add, Sub, Mul };

use crate::feq;

/// A color.
///
/// Represented with red-green-blue (RGB) values. Components are nominally in
/// `0.0..=1.0`, but shading may push them outside that range; clamping is left
/// to the image encoder.
///
/// # Examples
///
/// Construct the color red:
///
/// ```
/// # #![allow(unused)]
/// # use whitted::color::Color;
/// let red = Color::red();
/// assert_eq!(red, Color::rgb(1.0, 0.0, 0.0));
/// ```
///
/// Mix two lights:
///
/// ```
/// # #![allow(unused)]
/// # use whitted::color::Color;
/// let mixed = Color::green() + Color::blue() * 0.5;
/// assert_eq!(mixed, Color::rgb(0.0, 1.0, 0.5));
/// ```
#[derive(Copy, Clone, Debug, Default)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

/// Partial equality on two colors.
///
/// Similar to the `PartialEq` implementation on `Tuple4D`, `Color`s are
/// compared component-wise, accounting for possible floating point error in
/// comparisons.
impl PartialEq for Color {
    fn eq(&self, other: &Color) -> bool {
        feq(self.r, other.r) &&
            feq(self.g, other.g) &&
            feq(self.b, other.b)
    }
}

impl From<[f64; 3]> for Color {
    fn from(rgb: [f64; 3]) -> Color {
        Color { r: rgb[0], g: rgb[1], b: rgb[2] }
    }
}

// Named colors for `Color::from_hex`.
pub const BLACK: u32 = 0x000000;
pub const WHITE: u32 = 0xFFFFFF;
pub const RED: u32 = 0xFF0000;
pub const ORANGE: u32 = 0xFFA500;
pub const YELLOW: u32 = 0xFFFF00;
pub const TEAL: u32 = 0x008080;
pub const NAVY: u32 = 0x000080;
pub const PURPLE: u32 = 0x800080;
pub const PINK: u32 = 0xFF1493;

impl Color {
    /// Creates a color with red, green and blue values.
    pub fn rgb(r: f64, g: f64, b: f64) -> Color {
        Color { r, g, b }
    }

    /// Creates a color from a `0xRRGGBB` literal.
    ///
    /// ```
    /// # use whitted::color::{ Color, TEAL };
    /// assert_eq!(Color::from_hex(0xFF0000), Color::red());
    /// assert_eq!(Color::from_hex(TEAL), Color::rgb(0.0, 128.0 / 255.0, 128.0 / 255.0));
    /// ```
    pub fn from_hex(hex: u32) -> Color {
        let channel = |shift: u32| ((hex >> shift) & 0xFF) as f64 / 255.0;

        Color { r: channel(16), g: channel(8), b: channel(0) }
    }

    pub fn black() -> Color { Color::rgb(0.0, 0.0, 0.0) }
    pub fn white() -> Color { Color::rgb(1.0, 1.0, 1.0) }
    pub fn red() -> Color { Color::rgb(1.0, 0.0, 0.0) }
    pub fn green() -> Color { Color::rgb(0.0, 1.0, 0.0) }
    pub fn blue() -> Color { Color::rgb(0.0, 0.0, 1.0) }

    /// Computes the Hadamard product of two colors.
    ///
    /// This is provided as an associated function of `Color` to prevent
    /// possible confusion with the `*` operator.
    ///
    /// The hadamard product multiplies each component of the two colors, and
    /// yields a new color containing those products. (In other words, this is
    /// a dot product which doesn't sum the component products).
    ///
    /// # Examples
    ///
    /// Computing the Hadamard product between yellow and purple:
    ///
    /// ```
    /// # use whitted::color::Color;
    /// let yellow = Color::rgb(1.0, 1.0, 0.0);
    /// let purple = Color::rgb(1.0, 0.0, 1.0);
    /// let product = Color::hadamard(&yellow, &purple);
    /// assert_eq!(product, Color::red());
    /// ```
    pub fn hadamard(c1: &Color, c2: &Color) -> Color {
        let r = c1.r * c2.r;
        let g = c1.g * c2.g;
        let b = c1.b * c2.b;

        Color { r, g, b }
    }

    /// Compares two colors component-wise with an explicit tolerance.
    pub fn approx_eq(&self, other: &Color, tolerance: f64) -> bool {
        (self.r - other.r).abs() < tolerance
            && (self.g - other.g).abs() < tolerance
            && (self.b - other.b).abs() < tolerance
    }

    /// Scales each component to `0..=255`, clamping out-of-range values.
    pub fn to_rgb8(&self) -> [u8; 3] {
        let scale = |c: f64| (c.clamp(0.0, 1.0) * 255.0).round() as u8;

        [scale(self.r), scale(self.g), scale(self.b)]
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
///
/// Components are subtracted from one another individually.
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
///
/// Each component is multiplied by the scalar.
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
///
/// Returns a color with each component multiplied by the scalar.
impl Mul<Color> for f64 {
    type Output = Color;

    fn mul(self, other: Color) -> Self::Output {
        Color {
            r: self * other.r,
            g: self * other.g,
            b: self * other.b,
        }
    }
}

/// Multiplies a color by a color.
///
/// For colors `c1` and `c2`, `c1 * c2` is shorthand for
/// `Color::hadamard(&c1, &c2)`. Consider using the `Color::hadamard` call
/// directly, as the `*` operator for `Color`s can be somewhat ambiguous.
///
/// # Examples
///
/// ```
/// # use whitted::color::Color;
/// let c1 = Color::red();
/// let c2 = Color::blue();
/// assert_eq!(c1 * c2, Color::hadamard(&c1, &c2));
/// ```
impl Mul<Color> for Color {
    type Output = Color;

    fn mul(self, other: Color) -> Self::Output {
        Color::hadamard(&self, &other)
    }
}

#[test]
fn add_colors() {
    let c1 = Color::rgb(0.9, 0.6, 0.75);
    let c2 = Color::rgb(0.7, 0.1, 0.25);
    let c3 = Color { r: 1.6, g: 0.7, b: 1.0 };

    assert_eq!(c1 + c2, c3);
}

#[test]
fn subtract_colors() {
    let c1 = Color::rgb(0.9, 0.6, 0.75);
    let c2 = Color::rgb(0.7, 0.1, 0.25);
    let c3 = Color { r: 0.2, g: 0.5, b: 0.5 };

    assert_eq!(c1 - c2, c3);
}

#[test]
fn multiply_colors() {
    let c1 = Color::rgb(0.2, 0.3, 0.4);
    let c2 = Color { r: 0.4, g: 0.6, b: 0.8 };

    assert_eq!(c1 * 2.0, c2);
}

#[test]
fn hadamard_product() {
    let c1 = Color::rgb(1.0, 0.2, 0.4);
    let c2 = Color::rgb(0.9, 1.0, 0.1);

    assert_eq!(c1 * c2, Color::rgb(0.9, 0.2, 0.04));
}

#[test]
fn hex_channels() {
    assert_eq!(Color::from_hex(WHITE), Color::white());
    assert_eq!(Color::from_hex(BLACK), Color::black());
    assert_eq!(Color::from_hex(ORANGE), Color::rgb(1.0, 165.0 / 255.0, 0.0));
}

#[test]
fn eight_bit_channels_are_clamped() {
    assert_eq!(Color::rgb(1.5, 0.5, -0.5).to_rgb8(), [255, 128, 0]);
    assert_eq!(Color::rgb(0.0, 1.0, 0.2).to_rgb8(), [0, 255, 51]);
}

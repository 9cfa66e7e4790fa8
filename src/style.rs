//! Style attributes attached to scene primitives.
//!
//! Provides the RGBA color type with hex parsing plus the stroke, fill, and
//! marker style records the classifier compares and the command engine
//! mutates. Series identity is decided by exact attribute equality, so every
//! type here derives `PartialEq`.

use crate::error::{Error, Result};

/// RGBA color with 8-bit components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rgba {
    /// Red component (0-255).
    pub r: u8,
    /// Green component (0-255).
    pub g: u8,
    /// Blue component (0-255).
    pub b: u8,
    /// Alpha component (0-255, 255 = fully opaque).
    pub a: u8,
}

impl Rgba {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);
    /// Opaque black.
    pub const BLACK: Self = Self::new(0, 0, 0, 255);
    /// Opaque white.
    pub const WHITE: Self = Self::new(255, 255, 255, 255);

    /// Create a new RGBA color.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque RGB color (alpha = 255).
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Create a color with modified alpha.
    #[must_use]
    pub const fn with_alpha(self, a: u8) -> Self {
        Self::new(self.r, self.g, self.b, a)
    }

    /// Parse a `#rrggbb` or `#rrggbbaa` hex string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidColor`] when the string is not a 6- or
    /// 8-digit hex color.
    pub fn from_hex(s: &str) -> Result<Self> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        let parse = |range: std::ops::Range<usize>| -> Result<u8> {
            u8::from_str_radix(&hex[range], 16)
                .map_err(|_| Error::InvalidColor(s.to_string()))
        };
        match hex.len() {
            6 => Ok(Self::rgb(parse(0..2)?, parse(2..4)?, parse(4..6)?)),
            8 => Ok(Self::new(
                parse(0..2)?,
                parse(2..4)?,
                parse(4..6)?,
                parse(6..8)?,
            )),
            _ => Err(Error::InvalidColor(s.to_string())),
        }
    }

    /// Format as a lowercase `#rrggbb` string (alpha omitted when opaque).
    #[must_use]
    pub fn to_hex(self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

/// Dash pattern of a stroked line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LineStyle {
    /// Continuous line.
    #[default]
    Solid,
    /// Dashed line.
    Dashed,
    /// Dotted line.
    Dotted,
    /// Alternating dash-dot line.
    DashDot,
}

/// Marker glyph drawn at data points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MarkerShape {
    /// No marker.
    #[default]
    None,
    /// Filled circle.
    Circle,
    /// Filled square.
    Square,
    /// Filled triangle.
    Triangle,
    /// Diamond shape.
    Diamond,
    /// Cross (+).
    Plus,
    /// X shape.
    X,
}

impl MarkerShape {
    /// Whether this shape draws anything.
    #[must_use]
    pub const fn is_visible(self) -> bool {
        !matches!(self, Self::None)
    }
}

/// Stroke style of a line primitive.
#[derive(Debug, Clone, PartialEq)]
pub struct StrokeStyle {
    /// Line color.
    pub color: Rgba,
    /// Line width in points.
    pub width: f64,
    /// Dash pattern.
    pub style: LineStyle,
    /// Opacity (0.0-1.0).
    pub alpha: f64,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            color: Rgba::BLACK,
            width: 1.5,
            style: LineStyle::Solid,
            alpha: 1.0,
        }
    }
}

/// Fill style of a polygon or rectangle primitive.
#[derive(Debug, Clone, PartialEq)]
pub struct FillStyle {
    /// Face color.
    pub face: Rgba,
    /// Edge color.
    pub edge: Rgba,
    /// Edge width in points.
    pub edge_width: f64,
    /// Opacity (0.0-1.0).
    pub alpha: f64,
    /// Hatch pattern string, if any (e.g. `"//"`).
    pub hatch: Option<String>,
}

impl Default for FillStyle {
    fn default() -> Self {
        Self {
            face: Rgba::rgb(31, 119, 180),
            edge: Rgba::BLACK,
            edge_width: 1.0,
            alpha: 1.0,
            hatch: None,
        }
    }
}

/// Marker style of a point-cloud primitive (or line markers).
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerStyle {
    /// Marker glyph.
    pub shape: MarkerShape,
    /// Marker size in points.
    pub size: f64,
    /// Face color.
    pub face: Rgba,
    /// Edge color.
    pub edge: Rgba,
    /// Opacity (0.0-1.0).
    pub alpha: f64,
}

impl Default for MarkerStyle {
    fn default() -> Self {
        Self {
            shape: MarkerShape::None,
            size: 6.0,
            face: Rgba::rgb(31, 119, 180),
            edge: Rgba::BLACK,
            alpha: 1.0,
        }
    }
}

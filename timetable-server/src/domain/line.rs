//! Line identity: product, colors and display style.
//!
//! The upstream identifies a service by a trip number (`*Z`), a product
//! code (`*G`), an operator and a display label. Products come from a
//! fixed code table; unknown codes map to [`Product::Unknown`].

use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize, Serializer};
use tracing::debug;

/// Mode of transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Product {
    HighSpeedTrain,
    RegionalTrain,
    SuburbanTrain,
    Subway,
    Tram,
    Bus,
    Ferry,
    Cablecar,
    Unknown,
}

static PRODUCTS: LazyLock<HashMap<&'static str, Product>> = LazyLock::new(|| {
    use Product::*;
    HashMap::from([
        ("ICE", HighSpeedTrain),
        ("TGV", HighSpeedTrain),
        ("RJ", HighSpeedTrain),
        ("RJX", HighSpeedTrain),
        ("EC", HighSpeedTrain),
        ("IC", HighSpeedTrain),
        ("ICN", HighSpeedTrain),
        ("EN", HighSpeedTrain),
        ("NJ", HighSpeedTrain),
        ("IR", RegionalTrain),
        ("RE", RegionalTrain),
        ("R", RegionalTrain),
        ("PE", RegionalTrain),
        ("D", RegionalTrain),
        ("S", SuburbanTrain),
        ("SN", SuburbanTrain),
        ("M", Subway),
        ("T", Tram),
        ("B", Bus),
        ("BUS", Bus),
        ("NFB", Bus),
        ("BAT", Ferry),
        ("FAE", Ferry),
        ("cablecar", Cablecar),
        ("FUN", Cablecar),
    ])
});

impl Product {
    /// Looks up an upstream product code.
    ///
    /// # Examples
    ///
    /// ```
    /// use timetable_server::domain::Product;
    ///
    /// assert_eq!(Product::from_code("IC"), Product::HighSpeedTrain);
    /// assert_eq!(Product::from_code("T"), Product::Tram);
    /// assert_eq!(Product::from_code("ZZZ"), Product::Unknown);
    /// ```
    pub fn from_code(code: &str) -> Self {
        match PRODUCTS.get(code.trim()) {
            Some(product) => *product,
            None => {
                debug!(code, "unmapped product code");
                Product::Unknown
            }
        }
    }
}

/// Error returned when parsing an invalid hex color.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid color {input:?}: {reason}")]
pub struct ColorError {
    input: String,
    reason: &'static str,
}

/// An opaque 24-bit RGB color.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color(u32);

impl Color {
    pub const BLACK: Color = Color(0x000000);
    pub const WHITE: Color = Color(0xffffff);

    pub fn from_rgb(rgb: u32) -> Self {
        Color(rgb & 0xffffff)
    }

    /// Parses a 3- or 6-digit hex color, with or without a leading `#`.
    ///
    /// A 3-digit color is widened by doubling each digit, so `"f0a"` reads
    /// as `"ff00aa"`.
    ///
    /// # Examples
    ///
    /// ```
    /// use timetable_server::domain::Color;
    ///
    /// assert_eq!(Color::parse_hex("f0a").unwrap(), Color::parse_hex("ff00aa").unwrap());
    /// assert_eq!(Color::parse_hex("#2e3192").unwrap().to_hex(), "#2e3192");
    /// assert!(Color::parse_hex("abcd").is_err());
    /// ```
    pub fn parse_hex(s: &str) -> Result<Self, ColorError> {
        let err = |reason| ColorError {
            input: s.to_string(),
            reason,
        };
        let digits = s.trim();
        let digits = digits.strip_prefix('#').unwrap_or(digits);
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(err("must contain only hex digits"));
        }
        let widened: String = match digits.len() {
            3 => digits.chars().flat_map(|c| [c, c]).collect(),
            6 => digits.to_string(),
            _ => return Err(err("must be 3 or 6 hex digits")),
        };
        u32::from_str_radix(&widened, 16)
            .map(Color)
            .map_err(|_| err("must contain only hex digits"))
    }

    pub fn rgb(&self) -> u32 {
        self.0
    }

    /// Returns the color as `#rrggbb`.
    pub fn to_hex(&self) -> String {
        format!("#{:06x}", self.0)
    }
}

impl fmt::Debug for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Color({})", self.to_hex())
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Color::parse_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Badge shape for a line label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    #[default]
    Rect,
}

/// How a line label is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Style {
    pub shape: Shape,
    pub background: Color,
    pub foreground: Color,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            shape: Shape::Rect,
            background: Color::BLACK,
            foreground: Color::WHITE,
        }
    }
}

/// A public-transport service identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    /// Trip number within the operator's timetable.
    pub trip_number: Option<String>,
    pub operator: Option<String>,
    pub product: Product,
    /// Label shown to riders, e.g. `"IC 1"` or `"S12"`.
    pub label: Option<String>,
    pub style: Style,
}

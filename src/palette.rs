use std::fmt;

use crate::{Error, Result};

/// A symbolic theme color reference, e.g. `var(--memphis-blue)`.
///
/// Tokens are written verbatim into inline styles; resolving them to a
/// concrete color is left to the page's stylesheet.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColorToken(String);

impl ColorToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Token for a CSS custom property: `var(--{name})`.
    pub fn css_var(name: &str) -> Self {
        Self(format!("var(--{name})"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ColorToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ColorToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

pub const MEMPHIS_COLOR_NAMES: [&str; 6] = [
    "memphis-yellow",
    "memphis-pink",
    "memphis-blue",
    "memphis-purple",
    "memphis-orange",
    "memphis-green",
];

/// Ordered, immutable, non-empty list of color tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<ColorToken>,
}

impl Default for Palette {
    fn default() -> Self {
        Self::memphis()
    }
}

impl Palette {
    pub fn new(colors: Vec<ColorToken>) -> Result<Self> {
        if colors.is_empty() {
            return Err(Error::InvalidConfig("palette must not be empty".into()));
        }
        if let Some(blank) = colors.iter().position(|c| c.as_str().trim().is_empty()) {
            return Err(Error::InvalidConfig(format!(
                "palette entry {blank} is blank"
            )));
        }
        Ok(Self { colors })
    }

    /// The six Memphis theme variables, in assignment order.
    pub fn memphis() -> Self {
        Self {
            colors: MEMPHIS_COLOR_NAMES
                .iter()
                .map(|name| ColorToken::css_var(name))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ColorToken> {
        self.colors.get(index)
    }

    pub fn contains(&self, token: &ColorToken) -> bool {
        self.colors.contains(token)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ColorToken> {
        self.colors.iter()
    }

    /// Maps a unit value to a palette entry: `floor(unit * len)`.
    ///
    /// Values outside `[0, 1)` and NaN are clamped onto the first or last
    /// entry, so any generator output yields a valid token.
    pub fn pick(&self, unit: f64) -> &ColorToken {
        let last = self.colors.len() - 1;
        let scaled = (unit * self.colors.len() as f64).floor();
        let index = if scaled.is_nan() || scaled < 0.0 {
            0
        } else if scaled >= last as f64 {
            last
        } else {
            scaled as usize
        };
        &self.colors[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memphis_palette_order() {
        let palette = Palette::memphis();
        let tokens = palette.iter().map(ColorToken::as_str).collect::<Vec<_>>();
        assert_eq!(
            tokens,
            vec![
                "var(--memphis-yellow)",
                "var(--memphis-pink)",
                "var(--memphis-blue)",
                "var(--memphis-purple)",
                "var(--memphis-orange)",
                "var(--memphis-green)",
            ]
        );
    }

    #[test]
    fn pick_floors_scaled_unit() {
        let palette = Palette::memphis();
        assert_eq!(palette.pick(0.0).as_str(), "var(--memphis-yellow)");
        assert_eq!(palette.pick(0.17).as_str(), "var(--memphis-pink)");
        assert_eq!(palette.pick(0.5).as_str(), "var(--memphis-purple)");
        assert_eq!(palette.pick(0.999_999).as_str(), "var(--memphis-green)");
    }

    #[test]
    fn pick_clamps_out_of_range_values() {
        let palette = Palette::memphis();
        assert_eq!(palette.pick(-3.0).as_str(), "var(--memphis-yellow)");
        assert_eq!(palette.pick(f64::NAN).as_str(), "var(--memphis-yellow)");
        assert_eq!(palette.pick(1.0).as_str(), "var(--memphis-green)");
        assert_eq!(palette.pick(f64::INFINITY).as_str(), "var(--memphis-green)");
    }

    #[test]
    fn rejects_empty_or_blank_palettes() {
        assert!(matches!(Palette::new(Vec::new()), Err(Error::InvalidConfig(_))));
        assert!(matches!(
            Palette::new(vec![ColorToken::new("red"), ColorToken::new("  ")]),
            Err(Error::InvalidConfig(_))
        ));
    }
}

use unicode_normalization::UnicodeNormalization;

use crate::palette::Palette;
use crate::selector::parse_selector_groups;
use crate::{Error, Result};

pub const DEFAULT_MARKER_CLASS: &str = "memphis-element";
pub const DEFAULT_SEED_ATTRIBUTE: &str = "data-color-seed";
pub const DEFAULT_SEED_HOST: &str = "body";
pub const DEFAULT_STYLE_PROPERTY: &str = "color";
pub const DEFAULT_SWAP_EVENT: &str = "htmx:afterSwap";

/// How element text is turned into the per-element key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KeyNormalization {
    /// Text content exactly as it appears in the document.
    #[default]
    Verbatim,
    /// Unicode NFC, so canonically equivalent text gets the same color.
    Nfc,
}

impl KeyNormalization {
    pub fn apply(self, text: String) -> String {
        match self {
            Self::Verbatim => text,
            Self::Nfc => text.nfc().collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignerConfig {
    pub palette: Palette,
    pub marker_class: String,
    pub seed_attribute: String,
    /// Selector for the element carrying the seed attribute. The swap
    /// listener is registered on the same element.
    pub seed_host: String,
    pub style_property: String,
    pub swap_event: String,
    pub key_normalization: KeyNormalization,
}

impl Default for AssignerConfig {
    fn default() -> Self {
        Self {
            palette: Palette::memphis(),
            marker_class: DEFAULT_MARKER_CLASS.to_string(),
            seed_attribute: DEFAULT_SEED_ATTRIBUTE.to_string(),
            seed_host: DEFAULT_SEED_HOST.to_string(),
            style_property: DEFAULT_STYLE_PROPERTY.to_string(),
            swap_event: DEFAULT_SWAP_EVENT.to_string(),
            key_normalization: KeyNormalization::Verbatim,
        }
    }
}

impl AssignerConfig {
    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    pub fn with_marker_class(mut self, class_name: impl Into<String>) -> Self {
        self.marker_class = class_name.into();
        self
    }

    pub fn with_seed_attribute(mut self, name: impl Into<String>) -> Self {
        self.seed_attribute = name.into();
        self
    }

    pub fn with_seed_host(mut self, selector: impl Into<String>) -> Self {
        self.seed_host = selector.into();
        self
    }

    pub fn with_style_property(mut self, property: impl Into<String>) -> Self {
        self.style_property = property.into();
        self
    }

    pub fn with_swap_event(mut self, event: impl Into<String>) -> Self {
        self.swap_event = event.into();
        self
    }

    pub fn with_key_normalization(mut self, normalization: KeyNormalization) -> Self {
        self.key_normalization = normalization;
        self
    }

    /// Selector matching target elements.
    pub fn marker_selector(&self) -> String {
        format!(".{}", self.marker_class)
    }

    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("marker_class", &self.marker_class),
            ("seed_attribute", &self.seed_attribute),
            ("seed_host", &self.seed_host),
            ("style_property", &self.style_property),
            ("swap_event", &self.swap_event),
        ] {
            if value.trim().is_empty() {
                return Err(Error::InvalidConfig(format!("{field} must not be empty")));
            }
        }

        if !self
            .marker_class
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
        {
            return Err(Error::InvalidConfig(format!(
                "marker_class {:?} must be a single class token",
                self.marker_class
            )));
        }

        if !self
            .style_property
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-')
        {
            return Err(Error::InvalidConfig(format!(
                "style_property {:?} must be a single property name",
                self.style_property
            )));
        }

        parse_selector_groups(&self.seed_host)
            .map_err(|_| Error::InvalidConfig(format!("invalid seed_host {:?}", self.seed_host)))?;
        Ok(())
    }
}

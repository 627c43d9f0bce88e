//! Deterministic palette colors for marked page elements.
//!
//! Each element carrying the marker class gets one of the palette's theme
//! tokens as its inline `color`, chosen by a string-seeded generator from
//! the page seed followed by the element's text. The same seed and text
//! always produce the same color, so colors stay put across reloads and
//! partial content swaps.
//!
//! ```
//! use memphis_colors::{AssignerConfig, ColorAssigner, Page};
//!
//! let mut page = Page::from_html(
//!     r#"<body data-color-seed="abc"><span class="memphis-element">Hello</span></body>"#,
//! )?;
//! ColorAssigner::new(AssignerConfig::default())?.install(&mut page);
//! page.finish_loading()?;
//! page.assert_style(".memphis-element", "color", "var(--memphis-purple)")?;
//! # Ok::<(), memphis_colors::Error>(())
//! ```

mod assigner;
mod config;
mod dom;
mod html;
mod page;
mod palette;
mod seedrandom;
mod selector;

pub use assigner::ColorAssigner;
pub use config::{
    AssignerConfig, DEFAULT_MARKER_CLASS, DEFAULT_SEED_ATTRIBUTE, DEFAULT_SEED_HOST,
    DEFAULT_STYLE_PROPERTY, DEFAULT_SWAP_EVENT, KeyNormalization,
};
pub use dom::{Dom, NodeId};
pub use page::{Event, HTMX_AFTER_SWAP, Handler, ListenerId, Page, READY_EVENT};
pub use palette::{ColorToken, MEMPHIS_COLOR_NAMES, Palette};
pub use seedrandom::{Arc4Random, Arc4Stream, SeedRandom};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("html parse error: {0}")]
    HtmlParse(String),
    #[error("unsupported selector: {0}")]
    UnsupportedSelector(String),
    #[error("selector not found: {0}")]
    SelectorNotFound(String),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("{0} target is not an element")]
    NotAnElement(String),
    #[error(
        "assertion failed for {selector}: expected {expected}, actual {actual}, snippet {dom_snippet}"
    )]
    AssertionFailed {
        selector: String,
        expected: String,
        actual: String,
        dom_snippet: String,
    },
}

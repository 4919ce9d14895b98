//! A dynamic menu for the terminal.
//!
//! Lines read from stdin become menu items. Typing filters them: every
//! space-separated token must occur in an item, and matches are ranked exact,
//! then prefix, then substring. The chosen line (or the typed text when
//! nothing matches) is printed to stdout.

pub mod config;
pub mod error;
pub mod item;
pub mod keymap;
pub mod matcher;
pub mod pager;
pub mod render;
pub mod session;
pub mod text_buffer;

pub use error::{Error, Result};
pub use item::{read_items, Item};
pub use matcher::{match_items, Band, Comparator, MatchSet};
pub use pager::{compute_page, Layout, PageWindow, TextMeasure};
pub use session::{Action, Session, SessionConfig, Status, VisibleItem, VisibleState};
pub use text_buffer::{Direction, TextBuffer};

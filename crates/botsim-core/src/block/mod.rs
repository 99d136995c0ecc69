//! Block tree domain module.
//!
//! # Module Structure
//!
//! - `model`: closed sum types for layout nodes (`Block`) and interactive
//!   elements (`BlockElement`)
//! - `search`: label and action lookups over a tree
//!
//! # Usage
//!
//! ```ignore
//! use botsim_core::block::{Block, find_by_label};
//! ```

mod model;
mod search;

// Re-export public API
pub use model::{
    ActionsBlock, Block, BlockElement, ButtonElement, ButtonStyle, DividerBlock, HeaderBlock,
    InputBlock, OptionGroup, OptionObject, SectionBlock, SelectElement, SelectSource, Selector,
    TextInputElement, TextKind, TextObject,
};
pub use search::{Found, Match, find_by_action_and_value, find_by_label, visible_texts};

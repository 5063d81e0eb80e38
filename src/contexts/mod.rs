//! The three execution contexts and the typed requests they exchange.

pub mod background;
pub mod page;
pub mod popup;

pub use background::BackgroundContext;
pub use page::PageContext;
pub use popup::{ActiveTab, PopupController};

//! The element catalogue: element records, the registries they refer to, and
//! the views pages are built from.

mod categoriser;
mod element;
mod history;
mod implementation;

pub mod dofs;
pub mod family;
pub mod record;

pub use categoriser::{Categoriser, Category, Families};
pub use element::{Element, NameFilter};
pub use family::{Family, Member};
pub use history::{HistoryProvider, Timestamps};
pub use implementation::{split_params, ImplementationError, Library, Params};
pub use record::Record;

#![doc = svgbobdoc::transform!(
//! Data model and markup rendering for a catalogue of finite element
//! definitions.
//!
//! # Overview
//!
//! The catalogue is a directory of element records (`.def` files, YAML) plus
//! a handful of registries they refer to. A build reads all of them into a
//! [`Categoriser`](catalog::Categoriser), then renders pages from the views
//! each [`Element`](catalog::Element) offers:
//!
//! ```svgbob
//!   +----------------+     +-----------------+     +-------------+
//!   | categories     |     | implementations |     | families    |
//!   | references     |     | .yml            |     | .yml        |
//!   +-------+--------+     +--------+--------+     +------+------+
//!           |                       |                     |
//!           +-----------------------+---------------------+
//!                                   |
//!                                   v
//!   +-----------+  parse   +---------------+  history  +--------------+
//!   | *.def     |--------->| Categoriser   |<----------| commit times |
//!   +-----------+          +-------+-------+           +--------------+
//!                                  |
//!                                  v
//!                          +---------------+  markup   +--------------+
//!                          | element views |---------->| HTML         |
//!                          +---------------+           +--------------+
//! ```
//!
//! Prose throughout the catalogue, from element notes to whole pages, is
//! written in a small markup language rendered by [`Markup`](markup::Markup):
//! headings, paragraphs, lists, fenced code, links, citations, inline macros
//! and `{{symbol}}` interpolation.
//!
//! ## Building
//!
//! 1. Registries are loaded: categories, implementations, families, then
//!    reference cells.
//! 2. Element records are parsed in parallel and added in name order, each
//!    registering with the families it belongs to.
//! 3. Pages are rendered from element views and markup sources.
)]

#[macro_use]
pub mod error;
pub mod util;
pub mod source;
pub mod markup;
pub mod catalog;

pub use tracing;
pub use rayon;

//! In-process document model.
//!
//! Just enough of a DOM for the controllers: an element tree replaced on
//! every render, `closest`-style target traversal, form values and a
//! document-level listener table.

mod document;
mod element;
mod event;

pub use document::{Document, Handler, ListenerId, NodeId};
pub use element::Element;
pub use event::{Event, EventKind};

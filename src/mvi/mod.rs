//! Model-View-Intent primitives shared by the storefront state core.
//!
//! ```text
//! Intent ──→ Reducer ──→ State ──→ View
//!    ↑                              │
//!    └──────────────────────────────┘
//! ```
//!
//! - **State**: immutable snapshot of everything the view needs
//! - **Intent**: a user action or system event (an "action")
//! - **Reducer**: pure function folding intents into state

mod intent;
mod reducer;
mod state;

pub use intent::Intent;
pub use reducer::{replay, Reducer};
pub use state::ViewState;

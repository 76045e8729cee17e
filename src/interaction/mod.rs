//! # Interaction Module
//!
//! Mouse-driven interaction with loaded props: casting camera rays from
//! pointer positions, intersecting them against registered objects, and
//! mapping the resulting hits to scene-level effects.
//!
//! ## Key Components
//!
//! - [`picking`] - NDC conversion, ray construction, ray/AABB hit testing
//! - [`dispatch`] - Click → effect mapping with stable priority order
//!
//! Picking is pure with respect to scene state and fully deterministic;
//! dispatch performs at most one effect per click.

pub mod dispatch;
pub mod picking;

// Re-export main types
pub use dispatch::{DispatchOutcome, InteractionDispatcher, InteractionMap, PopupState, PropEffect};
pub use picking::{cursor_hint, CursorHint, PointerNdc, PropHit, Ray, ScenePicker};

//! Panel renderers
//!
//! Each renderer is a pure function of its inputs that produces a retained
//! [`draw::DrawList`] for one panel. Nothing here touches a real drawing
//! surface; the Bevy adapter in [`crate::plugins::backend`] consumes the lists.

pub mod draw;
pub mod energy_chart;
pub mod free_body;
pub mod palette;
pub mod projector;
pub mod quantities;
pub mod scene;
pub mod time_series;

//! Centralized event definitions
//!
//! Host input (keyboard, mouse, or tests) is translated into [`PanelCommand`]
//! events; the panels and playback plugins are the only readers.

use bevy::prelude::*;

#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub enum PanelCommand {
    TogglePlayback,
    /// Deliver exactly one snapshot while paused
    Step,
    Restart,
    ToggleGrid,
    ToggleVectors,
    ZoomIn,
    ZoomOut,
    /// Pan the scene view by a pixel offset (panel space, Y down)
    Pan(Vec2),
    ResetView,
    Quit,
}

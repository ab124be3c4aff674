//! Freebody prelude module
//!
//! Re-exports the types most callers need to build snapshots and render
//! panels from them.

pub use bevy::prelude::*;

pub use crate::config::PanelsConfig;
pub use crate::events::PanelCommand;
pub use crate::states::PlaybackState;

pub use crate::physics::derived::{ObjectQuantities, QuantityCache, SnapshotQuantities};
pub use crate::physics::energy::{EnergyHistory, EnergySample, EnergyStatistics};
pub use crate::physics::forces::{ForceInferenceEngine, ForceKind, ForceVector, Provenance};
pub use crate::physics::math::{Scalar, Vector};
pub use crate::physics::snapshot::{
    CircularMotionState, PhysicsObject, Shape, TrajectoryPoint, WorldSnapshot,
};

pub use crate::render::draw::{DrawCommand, DrawList, Layer};
pub use crate::render::energy_chart::EnergyHistoryRenderer;
pub use crate::render::free_body::FreeBodyRenderer;
pub use crate::render::projector::{CoordinateProjector, ViewTransform};
pub use crate::render::quantities::QuantitiesRenderer;
pub use crate::render::scene::{SceneFrame, SceneOptions, SceneRenderer};
pub use crate::render::time_series::{Quantity, TimeSeriesSampler};

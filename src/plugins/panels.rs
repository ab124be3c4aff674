//! Panels plugin
//!
//! Owns the inputs every panel is rendered from (current snapshot, energy
//! history, scene toggles, zoom/pan) and re-renders all panels into
//! [`PanelFrames`] whenever one of those inputs changes. Nothing here runs on
//! a timer; an unchanged world costs one change check per frame.

use crate::config::PanelsConfig;
use crate::events::PanelCommand;
use crate::physics::derived::QuantityCache;
use crate::physics::energy::EnergyHistory;
use crate::physics::forces::ForceInferenceEngine;
use crate::physics::snapshot::WorldSnapshot;
use crate::render::draw::DrawList;
use crate::render::energy_chart::EnergyHistoryRenderer;
use crate::render::free_body::FreeBodyRenderer;
use crate::render::projector::ViewTransform;
use crate::render::quantities::QuantitiesRenderer;
use crate::render::scene::{SceneFrame, SceneOptions, SceneRenderer};
use crate::render::time_series::TimeSeriesSampler;
use bevy::prelude::*;

/// Frame phases, in order.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum PanelSet {
    Input,
    Playback,
    Render,
    Draw,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PanelId {
    Scene,
    FreeBody,
    Position,
    Velocity,
    Acceleration,
    Energy,
    Quantities,
}

impl PanelId {
    pub const ALL: [PanelId; 7] = [
        PanelId::Scene,
        PanelId::FreeBody,
        PanelId::Position,
        PanelId::Velocity,
        PanelId::Acceleration,
        PanelId::Energy,
        PanelId::Quantities,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

/// Where each panel sits, in layout pixels (origin top-left, Y down).
#[derive(Resource, Clone, Debug, PartialEq)]
pub struct PanelLayout {
    size: Vec2,
    rects: [Rect; 7],
}

impl Default for PanelLayout {
    fn default() -> Self {
        Self::standard()
    }
}

impl PanelLayout {
    const MARGIN: f32 = 20.0;
    const GAP: f32 = 10.0;

    /// Scene on the left with the energy chart and object info below it,
    /// free body diagram and the three motion graphs stacked on the right.
    pub fn standard() -> Self {
        let scene = Vec2::new(800.0, 600.0);
        let energy = Vec2::new(540.0, 220.0);
        let quantities = Vec2::new(250.0, 220.0);
        let free_body = Vec2::new(400.0, 350.0);
        let graph = Vec2::new(400.0, 150.0);

        let left = Vec2::splat(Self::MARGIN);
        let right_x = left.x + scene.x + Self::MARGIN;
        let at = |origin: Vec2, size: Vec2| Rect::from_corners(origin, origin + size);

        let scene_rect = at(left, scene);
        let energy_rect = at(Vec2::new(left.x, scene_rect.max.y + Self::GAP), energy);
        let quantities_rect = at(
            Vec2::new(energy_rect.max.x + Self::GAP, energy_rect.min.y),
            quantities,
        );
        let free_body_rect = at(Vec2::new(right_x, left.y), free_body);
        let graph_rect = |row: usize| {
            let y = free_body_rect.max.y + Self::GAP + row as f32 * (graph.y + Self::GAP);
            at(Vec2::new(right_x, y), graph)
        };

        let rects = [
            scene_rect,
            free_body_rect,
            graph_rect(0),
            graph_rect(1),
            graph_rect(2),
            energy_rect,
            quantities_rect,
        ];
        let extent = rects
            .iter()
            .fold(Vec2::ZERO, |extent, rect| extent.max(rect.max));

        Self {
            size: extent + Vec2::splat(Self::MARGIN),
            rects,
        }
    }

    /// Total layout size; the camera fits this into the window.
    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn rect(&self, panel: PanelId) -> Rect {
        self.rects[panel.index()]
    }

    pub fn canvas(&self, panel: PanelId) -> Vec2 {
        self.rect(panel).size()
    }

    pub fn panel_at(&self, point: Vec2) -> Option<PanelId> {
        PanelId::ALL
            .into_iter()
            .find(|panel| self.rect(*panel).contains(point))
    }
}

/// The snapshot most recently delivered by the driver, replaced wholesale.
#[derive(Resource, Default, Debug)]
pub struct CurrentSnapshot(Option<WorldSnapshot>);

impl CurrentSnapshot {
    pub fn get(&self) -> Option<&WorldSnapshot> {
        self.0.as_ref()
    }

    pub fn replace(&mut self, snapshot: WorldSnapshot) {
        self.0 = Some(snapshot);
    }

    pub fn clear(&mut self) {
        self.0 = None;
    }
}

#[derive(Resource, Default, Debug, Deref, DerefMut)]
pub struct EnergyLog(pub EnergyHistory);

#[derive(Resource, Default, Debug, Clone, Copy, Deref, DerefMut)]
pub struct SceneDisplay(pub SceneOptions);

#[derive(Resource, Default, Debug, Clone, Copy, Deref, DerefMut)]
pub struct SceneView(pub ViewTransform);

#[derive(Resource, Default, Debug, Deref, DerefMut)]
pub struct DerivedCache(pub QuantityCache);

#[derive(Resource, Clone, Default)]
pub struct PanelRenderers {
    pub scene: SceneRenderer,
    pub free_body: FreeBodyRenderer,
    pub forces: ForceInferenceEngine,
    pub sampler: TimeSeriesSampler,
    pub energy: EnergyHistoryRenderer,
    pub quantities: QuantitiesRenderer,
}

impl PanelRenderers {
    pub fn from_config(config: &PanelsConfig) -> Self {
        Self {
            scene: SceneRenderer::new(config.scene.clone()),
            free_body: FreeBodyRenderer::new(config.free_body.clone()),
            forces: ForceInferenceEngine::new(config.forces.clone()).with_standard_rules(),
            sampler: TimeSeriesSampler::new(config.sampling.clone()),
            energy: EnergyHistoryRenderer::new(),
            quantities: QuantitiesRenderer,
        }
    }
}

/// Latest draw list of every panel.
#[derive(Resource, Default, Debug)]
pub struct PanelFrames {
    frames: [DrawList; 7],
    renders: u64,
}

impl PanelFrames {
    pub fn get(&self, panel: PanelId) -> &DrawList {
        &self.frames[panel.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (PanelId, &DrawList)> {
        PanelId::ALL.into_iter().zip(self.frames.iter())
    }

    /// How many render passes have run.
    pub fn renders(&self) -> u64 {
        self.renders
    }

    fn set(&mut self, panel: PanelId, list: DrawList) {
        self.frames[panel.index()] = list;
    }
}

pub struct PanelsPlugin {
    config: Option<PanelsConfig>,
}

impl PanelsPlugin {
    pub fn new() -> Self {
        Self { config: None }
    }

    pub fn with_config(config: PanelsConfig) -> Self {
        Self {
            config: Some(config),
        }
    }
}

impl Default for PanelsPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for PanelsPlugin {
    fn build(&self, app: &mut App) {
        let config = self
            .config
            .clone()
            .unwrap_or_else(PanelsConfig::load_from_user_config);

        match toml::to_string_pretty(&config) {
            Ok(toml_string) => {
                debug!("=== Current Configuration (TOML) ===\n{}", toml_string);
                debug!("=== End Configuration ===");
            }
            Err(e) => {
                error!("Failed to serialize configuration to TOML: {}", e);
            }
        }

        app.insert_resource(PanelRenderers::from_config(&config));
        app.insert_resource(SceneDisplay(SceneOptions {
            show_grid: config.display.show_grid,
            show_vectors: config.display.show_vectors,
        }));
        app.insert_resource(SceneView(ViewTransform::new(
            config.display.zoom,
            Vec2::ZERO,
        )));
        app.insert_resource(config);
        app.init_resource::<PanelLayout>();
        app.init_resource::<CurrentSnapshot>();
        app.init_resource::<EnergyLog>();
        app.init_resource::<DerivedCache>();
        app.init_resource::<PanelFrames>();

        app.add_event::<PanelCommand>();

        app.configure_sets(
            Update,
            (
                PanelSet::Input,
                PanelSet::Playback,
                PanelSet::Render,
                PanelSet::Draw,
            )
                .chain(),
        );

        app.add_systems(
            Update,
            (apply_view_commands, render_panels)
                .chain()
                .in_set(PanelSet::Render),
        );
    }
}

fn on_off(enabled: bool) -> &'static str {
    if enabled { "on" } else { "off" }
}

pub fn apply_view_commands(
    mut commands: EventReader<PanelCommand>,
    mut scene_display: ResMut<SceneDisplay>,
    mut view: ResMut<SceneView>,
) {
    for command in commands.read() {
        match *command {
            PanelCommand::ToggleGrid => {
                scene_display.show_grid = !scene_display.show_grid;
                info!("Grid {}", on_off(scene_display.show_grid));
            }
            PanelCommand::ToggleVectors => {
                scene_display.show_vectors = !scene_display.show_vectors;
                info!("Velocity vectors {}", on_off(scene_display.show_vectors));
            }
            PanelCommand::ZoomIn => {
                view.zoom_in();
                debug!("Zoom {:.0}%", view.zoom() * 100.0);
            }
            PanelCommand::ZoomOut => {
                view.zoom_out();
                debug!("Zoom {:.0}%", view.zoom() * 100.0);
            }
            PanelCommand::Pan(delta) => view.pan_by(delta),
            PanelCommand::ResetView => {
                view.reset();
                info!("View reset");
            }
            _ => {}
        }
    }
}

#[allow(clippy::too_many_arguments)]
pub fn render_panels(
    snapshot: Res<CurrentSnapshot>,
    history: Res<EnergyLog>,
    scene_display: Res<SceneDisplay>,
    view: Res<SceneView>,
    renderers: Res<PanelRenderers>,
    layout: Res<PanelLayout>,
    mut cache: ResMut<DerivedCache>,
    mut frames: ResMut<PanelFrames>,
) {
    let inputs_changed = snapshot.is_changed()
        || history.is_changed()
        || scene_display.is_changed()
        || view.is_changed()
        || renderers.is_changed()
        || layout.is_changed();
    if !inputs_changed {
        return;
    }

    // Replacing the snapshot is what identifies a new one; the key alone
    // misses drivers that edit objects without bumping the version
    if snapshot.is_changed() {
        cache.invalidate();
    }

    let snapshot = snapshot.get();
    let scene_frame = match snapshot {
        Some(snapshot) => Some(SceneFrame::new(snapshot, cache.get_or_compute(snapshot))),
        None => None,
    };

    frames.set(
        PanelId::Scene,
        renderers.scene.render(
            scene_frame,
            &view.0,
            layout.canvas(PanelId::Scene),
            scene_display.0,
        ),
    );
    frames.set(
        PanelId::FreeBody,
        renderers
            .free_body
            .render(snapshot, &renderers.forces, layout.canvas(PanelId::FreeBody)),
    );

    let [position, velocity, acceleration] = renderers
        .sampler
        .panels(snapshot, layout.canvas(PanelId::Position));
    frames.set(PanelId::Position, position);
    frames.set(PanelId::Velocity, velocity);
    frames.set(PanelId::Acceleration, acceleration);

    frames.set(
        PanelId::Energy,
        renderers
            .energy
            .render(history.samples(), layout.canvas(PanelId::Energy)),
    );
    frames.set(
        PanelId::Quantities,
        renderers
            .quantities
            .render(scene_frame, layout.canvas(PanelId::Quantities)),
    );

    frames.renders += 1;
    trace!("Rendered panels (pass {})", frames.renders);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::math::Vector;
    use crate::physics::snapshot::PhysicsObject;
    use crate::render::draw::Layer;
    use crate::render::quantities;
    use crate::render::scene::WAITING_MESSAGE;
    use crate::test_utils::create_test_app;

    fn app() -> App {
        let mut app = create_test_app();
        app.add_plugins(PanelsPlugin::with_config(PanelsConfig::default()));
        app
    }

    #[test]
    fn test_layout_panels_do_not_overlap() {
        let layout = PanelLayout::standard();
        for a in PanelId::ALL {
            for b in PanelId::ALL {
                if a != b {
                    assert!(layout.rect(a).intersect(layout.rect(b)).is_empty());
                }
            }
            assert!(layout.rect(a).max.cmple(layout.size()).all());
        }
        assert_eq!(layout.canvas(PanelId::Scene), Vec2::new(800.0, 600.0));
        assert_eq!(
            layout.panel_at(Vec2::new(400.0, 300.0)),
            Some(PanelId::Scene)
        );
        assert_eq!(layout.panel_at(Vec2::new(-5.0, 0.0)), None);
    }

    #[test]
    fn test_first_update_renders_placeholders() {
        let mut app = app();
        app.update();

        let frames = app.world().resource::<PanelFrames>();
        assert_eq!(frames.renders(), 1);
        assert!(frames.get(PanelId::Scene).contains_text(WAITING_MESSAGE));
    }

    #[test]
    fn test_renders_only_when_inputs_change() {
        let mut app = app();
        app.update();
        app.update();
        assert_eq!(app.world().resource::<PanelFrames>().renders(), 1);

        let snapshot = WorldSnapshot::default()
            .with_object(PhysicsObject::new("ball", 1.0, Vector::new(10.0, 10.0)));
        app.world_mut()
            .resource_mut::<CurrentSnapshot>()
            .replace(snapshot);
        app.update();

        let frames = app.world().resource::<PanelFrames>();
        assert_eq!(frames.renders(), 2);
        assert!(!frames.get(PanelId::Scene).contains_text(WAITING_MESSAGE));
    }

    #[test]
    fn test_replaced_snapshot_with_same_key_is_rederived() {
        let mut app = app();
        let moving = PhysicsObject::new("ball", 1.0, Vector::new(10.0, 10.0))
            .with_velocity(Vector::new(3.0, 4.0));
        app.world_mut()
            .resource_mut::<CurrentSnapshot>()
            .replace(WorldSnapshot::default().with_object(moving));
        app.update();
        assert!(
            app.world()
                .resource::<PanelFrames>()
                .get(PanelId::Scene)
                .contains_text("v=5.0 m/s")
        );

        // Same version, time and object count; only the object state differs
        let resting = PhysicsObject::new("ball", 1.0, Vector::new(10.0, 10.0));
        app.world_mut()
            .resource_mut::<CurrentSnapshot>()
            .replace(WorldSnapshot::default().with_object(resting));
        app.update();

        let frames = app.world().resource::<PanelFrames>();
        assert_eq!(frames.get(PanelId::Scene).count(Layer::Velocity), 0);
        assert!(frames.get(PanelId::Quantities).contains_text("v: 0.00 m/s"));
    }

    #[test]
    fn test_object_info_panel_follows_snapshot() {
        let mut app = app();
        app.update();
        assert!(
            app.world()
                .resource::<PanelFrames>()
                .get(PanelId::Quantities)
                .contains_text(WAITING_MESSAGE)
        );

        let snapshot = WorldSnapshot::default().with_object(
            PhysicsObject::new("ball", 2.0, Vector::new(10.0, 10.0))
                .with_velocity(Vector::new(3.0, 4.0)),
        );
        app.world_mut()
            .resource_mut::<CurrentSnapshot>()
            .replace(snapshot);
        app.update();

        let info = app
            .world()
            .resource::<PanelFrames>()
            .get(PanelId::Quantities);
        assert!(info.contains_text(quantities::TITLE));
        assert!(info.contains_text("KE: 25.00 J"));
    }

    #[test]
    fn test_view_commands() {
        let mut app = app();
        app.update();

        app.world_mut().send_event(PanelCommand::ToggleGrid);
        app.world_mut().send_event(PanelCommand::ZoomIn);
        app.world_mut()
            .send_event(PanelCommand::Pan(Vec2::new(5.0, -3.0)));
        app.update();

        assert!(!app.world().resource::<SceneDisplay>().show_grid);
        let view = app.world().resource::<SceneView>().0;
        assert!((view.zoom() - 1.1).abs() < 1e-6);
        assert_eq!(view.pan(), Vec2::new(5.0, -3.0));
        assert_eq!(app.world().resource::<PanelFrames>().renders(), 2);

        app.world_mut().send_event(PanelCommand::ResetView);
        app.update();
        assert!(app.world().resource::<SceneView>().is_identity());
    }
}

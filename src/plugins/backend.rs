//! Bevy drawing backend
//!
//! Puts every panel's [`DrawList`] on screen. Strokes are immediate-mode
//! gizmos redrawn each frame; fills and text are entities respawned only when
//! [`PanelFrames`] changes. One 2D camera shows the whole layout, scaled to
//! fit the window.

use crate::plugins::panels::{PanelFrames, PanelLayout, PanelSet};
use crate::render::draw::{DrawCommand, DrawList, TextAlign, clip_segment};
use crate::render::palette;
use bevy::prelude::*;
use bevy::render::camera::ScalingMode;
use bevy::sprite::Anchor;

const WINDOW_BACKGROUND: Color = palette::hex(0xe9ecef);
const PANEL_BORDER: Color = palette::hex(0xced4da);
/// Strokes at least this wide go through [`HeavyStrokes`]
const HEAVY_STROKE_WIDTH: f32 = 2.0;
const DEPTH_STEP: f32 = 0.001;

/// Gizmo group for arrows and chart curves.
#[derive(Default, Reflect, GizmoConfigGroup)]
pub struct HeavyStrokes;

/// Marks entities spawned from the current panel frames.
#[derive(Component)]
pub struct PanelGraphic;

#[derive(Resource)]
pub struct PanelMeshes {
    unit_circle: Handle<Mesh>,
}

pub struct BackendPlugin;

impl Plugin for BackendPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(ClearColor(WINDOW_BACKGROUND));
        app.init_gizmo_group::<HeavyStrokes>();

        app.add_systems(Startup, (spawn_camera, configure_gizmos, create_meshes));
        app.add_systems(
            Update,
            (sync_panel_graphics, draw_panel_strokes).in_set(PanelSet::Draw),
        );
    }
}

/// Layout pixels (origin top-left, Y down) to world units (origin at the
/// layout center, Y up).
pub fn layout_to_world(point: Vec2, layout_size: Vec2) -> Vec2 {
    Vec2::new(point.x - layout_size.x / 2.0, layout_size.y / 2.0 - point.y)
}

pub fn world_to_layout(point: Vec2, layout_size: Vec2) -> Vec2 {
    Vec2::new(point.x + layout_size.x / 2.0, layout_size.y / 2.0 - point.y)
}

fn spawn_camera(mut commands: Commands, layout: Res<PanelLayout>) {
    let size = layout.size();
    commands.spawn((
        Name::new("Panels Camera"),
        Camera2d,
        Projection::from(OrthographicProjection {
            scaling_mode: ScalingMode::AutoMin {
                min_width: size.x,
                min_height: size.y,
            },
            ..OrthographicProjection::default_2d()
        }),
    ));
}

fn configure_gizmos(mut config_store: ResMut<GizmoConfigStore>) {
    config_store
        .config_mut::<DefaultGizmoConfigGroup>()
        .0
        .line
        .width = 1.5;
    config_store.config_mut::<HeavyStrokes>().0.line.width = 3.0;
}

fn create_meshes(mut commands: Commands, mut meshes: ResMut<Assets<Mesh>>) {
    commands.insert_resource(PanelMeshes {
        unit_circle: meshes.add(Circle::new(1.0)),
    });
}

fn anchor(align: TextAlign) -> Anchor {
    match align {
        TextAlign::Left => Anchor::BottomLeft,
        TextAlign::Center => Anchor::BottomCenter,
        TextAlign::Right => Anchor::BottomRight,
    }
}

/// Strokes of one panel, clipped to it and moved into world space.
fn panel_segments(list: &DrawList, panel: Rect, layout_size: Vec2) -> Vec<(Vec2, Vec2, Color, f32)> {
    let bounds = list.bounds();
    list.items()
        .iter()
        .filter_map(|item| {
            let stroke = item.command.stroke()?;
            Some((item, *stroke))
        })
        .flat_map(|(item, stroke)| {
            item.command
                .stroke_segments()
                .into_iter()
                .filter_map(move |(a, b)| clip_segment(a, b, bounds))
                .map(move |(a, b)| {
                    (
                        layout_to_world(panel.min + a, layout_size),
                        layout_to_world(panel.min + b, layout_size),
                        stroke.color,
                        stroke.width,
                    )
                })
        })
        .collect()
}

pub fn draw_panel_strokes(
    frames: Res<PanelFrames>,
    layout: Res<PanelLayout>,
    mut gizmos: Gizmos,
    mut heavy: Gizmos<HeavyStrokes>,
) {
    let layout_size = layout.size();

    for (panel, list) in frames.iter() {
        let rect = layout.rect(panel);
        for (from, to, color, width) in panel_segments(list, rect, layout_size) {
            if width >= HEAVY_STROKE_WIDTH {
                heavy.line_2d(from, to, color);
            } else {
                gizmos.line_2d(from, to, color);
            }
        }

        gizmos.rect_2d(
            Isometry2d::from_translation(layout_to_world(rect.center(), layout_size)),
            rect.size(),
            PANEL_BORDER,
        );
    }
}

pub fn sync_panel_graphics(
    mut commands: Commands,
    frames: Res<PanelFrames>,
    layout: Res<PanelLayout>,
    meshes: Option<Res<PanelMeshes>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    existing: Query<Entity, With<PanelGraphic>>,
) {
    if !frames.is_changed() {
        return;
    }
    let Some(meshes) = meshes else {
        return;
    };

    for entity in &existing {
        commands.entity(entity).despawn();
    }

    let layout_size = layout.size();
    let mut depth = 0.0;
    for (panel, list) in frames.iter() {
        let rect = layout.rect(panel);
        let bounds = list.bounds();

        for item in list.items() {
            depth += DEPTH_STEP;
            let at = |point: Vec2| {
                layout_to_world(rect.min + point, layout_size).extend(depth)
            };

            match &item.command {
                DrawCommand::FillRect { rect: fill, color } => {
                    let visible = fill.intersect(bounds);
                    if visible.is_empty() {
                        continue;
                    }
                    commands.spawn((
                        PanelGraphic,
                        Sprite::from_color(*color, visible.size()),
                        Transform::from_translation(at(visible.center())),
                    ));
                }
                DrawCommand::FillCircle {
                    center,
                    radius,
                    color,
                } => {
                    if !bounds.contains(*center) {
                        continue;
                    }
                    commands.spawn((
                        PanelGraphic,
                        Mesh2d(meshes.unit_circle.clone()),
                        MeshMaterial2d(materials.add(ColorMaterial::from(*color))),
                        Transform::from_translation(at(*center)).with_scale(Vec3::splat(*radius)),
                    ));
                }
                DrawCommand::Text {
                    position,
                    text,
                    style,
                } => {
                    if !bounds.contains(*position) {
                        continue;
                    }
                    commands.spawn((
                        PanelGraphic,
                        Text2d::new(text.clone()),
                        TextFont {
                            font_size: style.size,
                            ..default()
                        },
                        TextColor(style.color),
                        anchor(style.align),
                        Transform::from_translation(at(*position)),
                    ));
                }
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::draw::{Layer, Stroke};

    const LAYOUT: Vec2 = Vec2::new(1260.0, 870.0);

    #[test]
    fn test_layout_and_world_are_inverse() {
        let corner = layout_to_world(Vec2::ZERO, LAYOUT);
        assert_eq!(corner, Vec2::new(-630.0, 435.0));
        assert_eq!(layout_to_world(LAYOUT / 2.0, LAYOUT), Vec2::ZERO);

        let point = Vec2::new(123.0, 456.0);
        assert_eq!(world_to_layout(layout_to_world(point, LAYOUT), LAYOUT), point);
    }

    #[test]
    fn test_segments_are_clipped_to_their_panel() {
        let panel = Rect::new(20.0, 20.0, 120.0, 70.0);
        let mut list = DrawList::new(panel.size());
        list.line(
            Layer::Grid,
            Vec2::new(50.0, 25.0),
            Vec2::new(500.0, 25.0),
            Stroke::solid(palette::GRID, 1.0),
        );
        list.line(
            Layer::Grid,
            Vec2::new(-50.0, -5.0),
            Vec2::new(-10.0, -5.0),
            Stroke::solid(palette::GRID, 1.0),
        );

        let segments = panel_segments(&list, panel, LAYOUT);

        assert_eq!(segments.len(), 1);
        let (from, to, _, width) = segments[0];
        assert_eq!(world_to_layout(from, LAYOUT), Vec2::new(70.0, 45.0));
        assert_eq!(world_to_layout(to, LAYOUT), Vec2::new(120.0, 45.0));
        assert_eq!(width, 1.0);
    }
}

//! Controls plugin
//!
//! Translates keyboard and mouse input into [`PanelCommand`] events. Every
//! other plugin reacts to the commands, never to raw input, so tests drive the
//! app by sending commands directly.

use crate::events::PanelCommand;
use crate::plugins::backend::world_to_layout;
use crate::plugins::panels::{PanelId, PanelLayout, PanelSet};
use bevy::input::ButtonState;
use bevy::input::keyboard::{Key, KeyboardInput};
use bevy::input::mouse::MouseWheel;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;

pub struct ControlsPlugin;

impl Plugin for ControlsPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (
                keyboard_input_handler,
                scroll_zoom_handler,
                drag_pan_handler,
                quit_on_command,
            )
                .in_set(PanelSet::Input),
        );
    }
}

/// Key bindings. `None` for keys that do nothing.
pub fn key_command(key: &Key) -> Option<PanelCommand> {
    match key {
        Key::Character(c) => match c.to_lowercase().as_str() {
            "g" => Some(PanelCommand::ToggleGrid),
            "v" => Some(PanelCommand::ToggleVectors),
            "r" => Some(PanelCommand::ResetView),
            "n" => Some(PanelCommand::Restart),
            "s" => Some(PanelCommand::Step),
            "+" | "=" => Some(PanelCommand::ZoomIn),
            "-" => Some(PanelCommand::ZoomOut),
            "q" => Some(PanelCommand::Quit),
            _ => None,
        },
        Key::Space => Some(PanelCommand::TogglePlayback),
        Key::ArrowRight => Some(PanelCommand::Step),
        Key::Escape => Some(PanelCommand::Quit),
        _ => None,
    }
}

/// One zoom step per wheel event, in or out by the sign of the scroll.
pub fn zoom_command(scroll_y: f32) -> Option<PanelCommand> {
    if scroll_y > 0.0 {
        Some(PanelCommand::ZoomIn)
    } else if scroll_y < 0.0 {
        Some(PanelCommand::ZoomOut)
    } else {
        None
    }
}

fn keyboard_input_handler(
    mut keyboard_events: EventReader<KeyboardInput>,
    mut commands: EventWriter<PanelCommand>,
) {
    for event in keyboard_events.read() {
        if event.state != ButtonState::Pressed {
            continue;
        }

        if let Some(command) = key_command(&event.logical_key) {
            commands.write(command);
        }
    }
}

/// Cursor position in layout pixels, if it is inside the window.
fn cursor_in_layout(
    window: &Window,
    camera: &Camera,
    camera_transform: &GlobalTransform,
    layout: &PanelLayout,
) -> Option<Vec2> {
    let cursor = window.cursor_position()?;
    let world = camera.viewport_to_world_2d(camera_transform, cursor).ok()?;
    Some(world_to_layout(world, layout.size()))
}

fn scroll_zoom_handler(
    mut wheel_events: EventReader<MouseWheel>,
    window: Single<&Window, With<PrimaryWindow>>,
    camera: Single<(&Camera, &GlobalTransform)>,
    layout: Res<PanelLayout>,
    mut commands: EventWriter<PanelCommand>,
) {
    let (camera, camera_transform) = *camera;
    let over_scene = cursor_in_layout(&window, camera, camera_transform, &layout)
        .and_then(|cursor| layout.panel_at(cursor))
        == Some(PanelId::Scene);

    for event in wheel_events.read() {
        if !over_scene {
            continue;
        }
        if let Some(command) = zoom_command(event.y) {
            commands.write(command);
        }
    }
}

/// Right or middle drag over the scene pans it.
fn drag_pan_handler(
    buttons: Res<ButtonInput<MouseButton>>,
    window: Single<&Window, With<PrimaryWindow>>,
    camera: Single<(&Camera, &GlobalTransform)>,
    layout: Res<PanelLayout>,
    mut last_cursor: Local<Option<Vec2>>,
    mut commands: EventWriter<PanelCommand>,
) {
    let dragging = buttons.any_pressed([MouseButton::Right, MouseButton::Middle]);
    let (camera, camera_transform) = *camera;
    let cursor = cursor_in_layout(&window, camera, camera_transform, &layout);

    let Some(cursor) = cursor.filter(|_| dragging) else {
        *last_cursor = None;
        return;
    };

    match *last_cursor {
        Some(previous) => {
            let delta = cursor - previous;
            if delta != Vec2::ZERO {
                commands.write(PanelCommand::Pan(delta));
            }
            *last_cursor = Some(cursor);
        }
        None if layout.panel_at(cursor) == Some(PanelId::Scene) => {
            *last_cursor = Some(cursor);
        }
        None => {}
    }
}

fn quit_on_command(mut commands: EventReader<PanelCommand>, mut exit: EventWriter<AppExit>) {
    if commands.read().any(|command| *command == PanelCommand::Quit) {
        info!("Quit requested");
        exit.write(AppExit::Success);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_test_app, press_key};

    #[test]
    fn test_key_bindings() {
        let character = |c: &str| Key::Character(c.into());

        assert_eq!(key_command(&character("G")), Some(PanelCommand::ToggleGrid));
        assert_eq!(key_command(&character("v")), Some(PanelCommand::ToggleVectors));
        assert_eq!(key_command(&character("=")), Some(PanelCommand::ZoomIn));
        assert_eq!(key_command(&character("-")), Some(PanelCommand::ZoomOut));
        assert_eq!(key_command(&Key::Space), Some(PanelCommand::TogglePlayback));
        assert_eq!(key_command(&Key::Escape), Some(PanelCommand::Quit));
        assert_eq!(key_command(&character("x")), None);
        assert_eq!(key_command(&Key::Enter), None);
    }

    #[test]
    fn test_scroll_direction() {
        assert_eq!(zoom_command(1.0), Some(PanelCommand::ZoomIn));
        assert_eq!(zoom_command(-0.5), Some(PanelCommand::ZoomOut));
        assert_eq!(zoom_command(0.0), None);
    }

    #[derive(Resource, Default)]
    struct Seen(Vec<PanelCommand>);

    fn record(mut commands: EventReader<PanelCommand>, mut seen: ResMut<Seen>) {
        seen.0.extend(commands.read().copied());
    }

    #[test]
    fn test_key_presses_become_commands() {
        let mut app = create_test_app();
        app.init_resource::<Seen>();
        app.add_systems(Update, (keyboard_input_handler, record).chain());

        press_key(&mut app, Key::Character("g".into()));
        press_key(&mut app, Key::Space);
        app.update();

        assert_eq!(
            app.world().resource::<Seen>().0,
            vec![PanelCommand::ToggleGrid, PanelCommand::TogglePlayback]
        );
    }

    #[test]
    fn test_quit_command_exits() {
        let mut app = create_test_app();
        app.add_systems(Update, quit_on_command);

        app.world_mut().send_event(PanelCommand::Quit);
        app.update();

        assert_eq!(app.should_exit(), Some(AppExit::Success));
    }
}

//! Test utilities for plugin testing

use crate::events::PanelCommand;
use crate::states::PlaybackState;
use bevy::input::ButtonState;
use bevy::input::keyboard::{Key, KeyboardInput, NativeKeyCode};
use bevy::prelude::*;

/// Creates a minimal test app with core Bevy plugins needed for testing
pub fn create_test_app() -> App {
    let mut app = App::new();

    app.add_plugins((
        MinimalPlugins,
        bevy::input::InputPlugin,
        bevy::state::app::StatesPlugin,
    ));

    app.add_event::<PanelCommand>();
    app.init_state::<PlaybackState>();

    app
}

/// Queues a key press as the window would deliver it
pub fn press_key(app: &mut App, key: Key) {
    app.world_mut().send_event(KeyboardInput {
        key_code: KeyCode::Unidentified(NativeKeyCode::Unidentified),
        logical_key: key,
        state: ButtonState::Pressed,
        text: None,
        repeat: false,
        window: Entity::PLACEHOLDER,
    });
}

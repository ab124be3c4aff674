use bevy::prelude::*;

#[derive(States, Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum PlaybackState {
    #[default]
    Playing,
    Paused,
}

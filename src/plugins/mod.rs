pub mod backend;
pub mod controls;
pub mod panels;
pub mod playback;

pub use backend::BackendPlugin;
pub use controls::ControlsPlugin;
pub use panels::PanelsPlugin;
pub use playback::PlaybackPlugin;

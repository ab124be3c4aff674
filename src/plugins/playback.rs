//! Playback plugin
//!
//! Stands in for the external simulation driver: it hands the panels one
//! prepared [`WorldSnapshot`] per frame while playing and appends the matching
//! energy sample. Snapshots come from a JSON-lines file or from a closed-form
//! demo; nothing here integrates dynamics.

use crate::config::PanelsConfig;
use crate::events::PanelCommand;
use crate::physics::energy::{EnergyHistory, EnergySample};
use crate::physics::math::{self, Scalar, TAU, Vector};
use crate::physics::snapshot::{
    CircularMotionState, PhysicsObject, Shape, TrajectoryPoint, WorldSnapshot,
};
use crate::plugins::panels::{CurrentSnapshot, EnergyLog, PanelSet};
use crate::render::palette;
use crate::states::PlaybackState;
use bevy::prelude::*;
use std::fmt;
use std::path::{Path, PathBuf};

/// Seconds between demo snapshots
pub const DEMO_STEP: Scalar = 1.0 / 60.0;
/// Demo trails stop growing after this many points
const MAX_TRAJECTORY_POINTS: usize = 1000;

#[derive(Debug)]
pub enum SnapshotFileError {
    Read { path: PathBuf, source: std::io::Error },
    Empty(PathBuf),
}

impl fmt::Display for SnapshotFileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotFileError::Read { path, source } => {
                write!(f, "could not read {}: {source}", path.display())
            }
            SnapshotFileError::Empty(path) => {
                write!(f, "{} contains no readable snapshots", path.display())
            }
        }
    }
}

impl std::error::Error for SnapshotFileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SnapshotFileError::Read { source, .. } => Some(source),
            SnapshotFileError::Empty(_) => None,
        }
    }
}

/// Parses one snapshot per non-blank line. Unreadable lines are skipped with
/// a warning. Snapshots without a version are numbered by position.
pub fn parse_json_lines(content: &str) -> Vec<WorldSnapshot> {
    let mut snapshots: Vec<WorldSnapshot> = content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .filter_map(|(index, line)| match serde_json::from_str(line) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                warn!("Skipping snapshot on line {}: {e}", index + 1);
                None
            }
        })
        .collect();

    for (index, snapshot) in snapshots.iter_mut().enumerate() {
        if snapshot.version == 0 {
            snapshot.version = index as u64 + 1;
        }
    }
    snapshots
}

pub fn load_json_lines(path: &Path) -> Result<Vec<WorldSnapshot>, SnapshotFileError> {
    let content = std::fs::read_to_string(path).map_err(|source| SnapshotFileError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let snapshots = parse_json_lines(&content);
    if snapshots.is_empty() {
        return Err(SnapshotFileError::Empty(path.to_path_buf()));
    }
    info!("Loaded {} snapshots from {}", snapshots.len(), path.display());
    Ok(snapshots)
}

/// A projectile launched from the left and a body in uniform circular motion,
/// both evaluated in closed form, next to a static platform.
pub fn demo_snapshots(duration: Scalar) -> Vec<WorldSnapshot> {
    const GRAVITY: Scalar = 9.8;
    const LAUNCH: Vector = Vector::new(10.0, 2.0);
    const LAUNCH_VELOCITY: Vector = Vector::new(12.0, 14.0);
    const ORBIT_CENTER: Vector = Vector::new(70.0, 60.0);
    const ORBIT_RADIUS: Scalar = 10.0;
    const ANGULAR_VELOCITY: Scalar = 2.0;

    let landing = {
        let (a, b, c) = (-0.5 * GRAVITY, LAUNCH_VELOCITY.y, LAUNCH.y);
        (-b - (b * b - 4.0 * a * c).sqrt()) / (2.0 * a)
    };
    let projectile_at = |t: Scalar| {
        if t < landing {
            let position = LAUNCH + LAUNCH_VELOCITY * t + Vector::new(0.0, -0.5 * GRAVITY * t * t);
            let velocity = LAUNCH_VELOCITY + Vector::new(0.0, -GRAVITY * t);
            (position, velocity, Vector::new(0.0, -GRAVITY))
        } else {
            let rest = Vector::new(LAUNCH.x + LAUNCH_VELOCITY.x * landing, 0.0);
            (rest, Vector::ZERO, Vector::ZERO)
        }
    };
    let orbiter_at = |t: Scalar| {
        let angle = (ANGULAR_VELOCITY * t).rem_euclid(TAU);
        let radial = math::unit_from_angle(angle);
        let position = ORBIT_CENTER + radial * ORBIT_RADIUS;
        let velocity = Vector::new(-radial.y, radial.x) * ANGULAR_VELOCITY * ORBIT_RADIUS;
        let acceleration = -radial * ANGULAR_VELOCITY * ANGULAR_VELOCITY * ORBIT_RADIUS;
        (angle, position, velocity, acceleration)
    };

    let frames = (duration.max(0.0) / DEMO_STEP).round() as usize + 1;
    let mut ball_path = Vec::new();
    let mut orbit_path = Vec::new();

    (0..frames)
        .map(|frame| {
            let time = frame as Scalar * DEMO_STEP;
            let (position, velocity, acceleration) = projectile_at(time);
            if ball_path.len() < MAX_TRAJECTORY_POINTS {
                ball_path.push(TrajectoryPoint::at(position, time));
            }
            let ball = PhysicsObject::new("ball", 2.0, position)
                .with_label("Ball")
                .with_initial_position(LAUNCH)
                .with_velocity(velocity)
                .with_acceleration(acceleration)
                .with_color(palette::hex(0xe67e22))
                .with_trajectory(ball_path.clone());

            let (angle, position, velocity, acceleration) = orbiter_at(time);
            if orbit_path.len() < MAX_TRAJECTORY_POINTS {
                orbit_path.push(TrajectoryPoint::at(position, time));
            }
            let orbiter = PhysicsObject::new("orbiter", 1.0, position)
                .with_label("Orbiter")
                .with_shape(Shape::Square { side: 2.0 })
                .with_initial_position(ORBIT_CENTER + Vector::new(ORBIT_RADIUS, 0.0))
                .with_velocity(velocity)
                .with_acceleration(acceleration)
                .with_color(palette::hex(0x16a085))
                .with_circular_motion(CircularMotionState {
                    center: ORBIT_CENTER,
                    radius: ORBIT_RADIUS,
                    angular_velocity: ANGULAR_VELOCITY,
                    angle,
                    enabled: true,
                    clockwise: false,
                })
                .with_trajectory(orbit_path.clone());

            let platform = PhysicsObject::new("platform", 50.0, Vector::new(85.0, 1.0))
                .with_label("Platform")
                .with_shape(Shape::Rectangle {
                    width: 16.0,
                    height: 2.0,
                })
                .with_color(palette::hex(0x7f8c8d))
                .fixed();

            WorldSnapshot {
                version: frame as u64 + 1,
                gravity_strength: GRAVITY,
                time,
                ..Default::default()
            }
            .with_object(ball)
            .with_object(orbiter)
            .with_object(platform)
            .with_recomputed_totals()
        })
        .collect()
}

/// One snapshot handed out by [`SnapshotReplay::advance`].
#[derive(Debug)]
pub struct Delivery {
    pub snapshot: WorldSnapshot,
    /// The first snapshot of a (re)started run
    pub restarted: bool,
}

/// Prepared snapshots and a cursor into them.
#[derive(Resource, Debug, Default)]
pub struct SnapshotReplay {
    frames: Vec<WorldSnapshot>,
    cursor: usize,
    looping: bool,
}

impl SnapshotReplay {
    pub fn new(frames: Vec<WorldSnapshot>, looping: bool) -> Self {
        Self {
            frames,
            cursor: 0,
            looping,
        }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Index of the next snapshot to deliver.
    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn is_finished(&self) -> bool {
        !self.looping && self.cursor >= self.frames.len()
    }

    pub fn restart(&mut self) {
        self.cursor = 0;
    }

    pub fn advance(&mut self) -> Option<Delivery> {
        if self.cursor >= self.frames.len() {
            if !self.looping || self.frames.is_empty() {
                return None;
            }
            self.cursor = 0;
        }

        let restarted = self.cursor == 0;
        let snapshot = self.frames.get(self.cursor)?.clone();
        self.cursor += 1;
        Some(Delivery {
            snapshot,
            restarted,
        })
    }
}

pub struct PlaybackPlugin {
    frames: Option<Vec<WorldSnapshot>>,
}

impl PlaybackPlugin {
    /// Plays the built-in demo.
    pub fn new() -> Self {
        Self { frames: None }
    }

    pub fn with_frames(frames: Vec<WorldSnapshot>) -> Self {
        Self {
            frames: Some(frames),
        }
    }
}

impl Default for PlaybackPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for PlaybackPlugin {
    fn build(&self, app: &mut App) {
        let config = app
            .world()
            .get_resource::<PanelsConfig>()
            .cloned()
            .unwrap_or_default();

        let frames = self
            .frames
            .clone()
            .unwrap_or_else(|| demo_snapshots(config.playback.demo_duration));
        info!("Playback ready with {} snapshots", frames.len());
        app.insert_resource(SnapshotReplay::new(frames, config.playback.looping));

        app.insert_state(if config.playback.start_paused {
            PlaybackState::Paused
        } else {
            PlaybackState::Playing
        });

        app.add_systems(
            Update,
            (
                handle_playback_commands,
                advance_playback.run_if(in_state(PlaybackState::Playing)),
            )
                .chain()
                .in_set(PanelSet::Playback),
        );
    }
}

fn deliver(
    replay: &mut SnapshotReplay,
    current: &mut CurrentSnapshot,
    energy: &mut EnergyHistory,
) -> bool {
    let Some(delivery) = replay.advance() else {
        return false;
    };

    if delivery.restarted {
        energy.clear();
    }
    energy.record(EnergySample::from_snapshot(&delivery.snapshot));
    current.replace(delivery.snapshot);
    true
}

pub fn advance_playback(
    mut replay: ResMut<SnapshotReplay>,
    mut current: ResMut<CurrentSnapshot>,
    mut energy: ResMut<EnergyLog>,
    mut next_state: ResMut<NextState<PlaybackState>>,
) {
    if !deliver(&mut replay, &mut current, &mut energy) {
        info!("Reached the end of the replay");
        next_state.set(PlaybackState::Paused);
    }
}

pub fn handle_playback_commands(
    mut commands: EventReader<PanelCommand>,
    state: Res<State<PlaybackState>>,
    mut next_state: ResMut<NextState<PlaybackState>>,
    mut replay: ResMut<SnapshotReplay>,
    mut current: ResMut<CurrentSnapshot>,
    mut energy: ResMut<EnergyLog>,
) {
    for command in commands.read() {
        match command {
            PanelCommand::TogglePlayback => match state.get() {
                PlaybackState::Playing => {
                    next_state.set(PlaybackState::Paused);
                    info!("Playback paused");
                }
                PlaybackState::Paused => {
                    if replay.is_finished() {
                        replay.restart();
                    }
                    next_state.set(PlaybackState::Playing);
                    info!("Playback resumed");
                }
            },
            PanelCommand::Step => {
                if !deliver(&mut replay, &mut current, &mut energy) {
                    info!("Nothing left to step through");
                }
            }
            PanelCommand::Restart => {
                replay.restart();
                energy.clear();
                current.clear();
                deliver(&mut replay, &mut current, &mut energy);
                info!("Playback restarted");
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::derived;
    use crate::plugins::panels::PanelsPlugin;
    use crate::test_utils::create_test_app;

    fn frames(count: usize) -> Vec<WorldSnapshot> {
        (0..count)
            .map(|i| WorldSnapshot {
                version: i as u64 + 1,
                time: i as Scalar * 0.1,
                ..Default::default()
            })
            .collect()
    }

    fn app(frames: Vec<WorldSnapshot>, config: PanelsConfig) -> App {
        let mut app = create_test_app();
        app.add_plugins((
            PanelsPlugin::with_config(config),
            PlaybackPlugin::with_frames(frames),
        ));
        app
    }

    #[test]
    fn test_replay_loops() {
        let mut replay = SnapshotReplay::new(frames(2), true);

        assert!(replay.advance().unwrap().restarted);
        assert!(!replay.advance().unwrap().restarted);
        let wrapped = replay.advance().unwrap();
        assert!(wrapped.restarted);
        assert_eq!(wrapped.snapshot.version, 1);
    }

    #[test]
    fn test_replay_without_looping_finishes() {
        let mut replay = SnapshotReplay::new(frames(1), false);
        assert!(replay.advance().is_some());
        assert!(replay.is_finished());
        assert!(replay.advance().is_none());

        replay.restart();
        assert_eq!(replay.position(), 0);
        assert!(!replay.is_finished());
    }

    #[test]
    fn test_parse_json_lines_skips_bad_lines() {
        let content = r#"{"width": 50, "height": 40, "time": 0.5}

not json
{"width": 50, "height": 40, "time": 1.0, "version": 9}
"#;
        let snapshots = parse_json_lines(content);

        assert_eq!(snapshots.len(), 2);
        assert_eq!(snapshots[0].version, 1);
        assert_eq!(snapshots[1].version, 9);
        assert_eq!(snapshots[1].time, 1.0);
    }

    #[test]
    fn test_missing_snapshot_file() {
        let result = load_json_lines(Path::new("/definitely/not/here.jsonl"));
        assert!(matches!(result, Err(SnapshotFileError::Read { .. })));
    }

    #[test]
    fn test_demo_is_closed_form() {
        let snapshots = demo_snapshots(3.5);
        assert_eq!(snapshots.len(), 211);

        let first = &snapshots[0];
        let ball = first.object("ball").unwrap();
        assert_eq!(ball.position, Vector::new(10.0, 2.0));
        assert_eq!(ball.trajectory.len(), 1);

        let last = snapshots.last().unwrap();
        let ball = last.object("ball").unwrap();
        assert_eq!(ball.position.y, 0.0);
        assert_eq!(ball.velocity, Vector::ZERO);
        assert_eq!(ball.trajectory.len(), snapshots.len());

        let orbiter = last.object("orbiter").unwrap();
        let motion = orbiter.active_circular_motion().unwrap();
        assert!((orbiter.position.distance(motion.center) - 10.0).abs() < 1e-9);
        assert!(
            (derived::speed(orbiter.velocity) - derived::tangential_velocity(motion)).abs()
                < 1e-9
        );
        assert!(last.object("platform").unwrap().is_static);
    }

    #[test]
    fn test_playing_delivers_one_snapshot_per_update() {
        let mut app = app(frames(3), PanelsConfig::default());

        app.update();
        app.update();

        let world = app.world();
        assert_eq!(world.resource::<CurrentSnapshot>().get().unwrap().version, 2);
        assert_eq!(world.resource::<EnergyLog>().len(), 2);
    }

    #[test]
    fn test_end_of_replay_pauses() {
        let mut config = PanelsConfig::default();
        config.playback.looping = false;
        let mut app = app(frames(1), config);

        app.update();
        app.update();
        app.update();

        assert_eq!(
            *app.world().resource::<State<PlaybackState>>().get(),
            PlaybackState::Paused
        );
        assert_eq!(app.world().resource::<EnergyLog>().len(), 1);
    }

    #[test]
    fn test_step_and_restart_while_paused() {
        let mut config = PanelsConfig::default();
        config.playback.start_paused = true;
        let mut app = app(frames(3), config);

        app.update();
        assert!(app.world().resource::<CurrentSnapshot>().get().is_none());

        app.world_mut().send_event(PanelCommand::Step);
        app.world_mut().send_event(PanelCommand::Step);
        app.update();
        assert_eq!(
            app.world()
                .resource::<CurrentSnapshot>()
                .get()
                .unwrap()
                .version,
            2
        );

        app.world_mut().send_event(PanelCommand::Restart);
        app.update();
        let world = app.world();
        assert_eq!(world.resource::<CurrentSnapshot>().get().unwrap().version, 1);
        assert_eq!(world.resource::<EnergyLog>().len(), 1);
    }
}

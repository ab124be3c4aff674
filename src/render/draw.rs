//! Retained draw commands.
//!
//! Renderers describe a frame as an ordered [`DrawList`] in panel pixel
//! coordinates (origin top-left, Y down). Order is paint order. Every command
//! carries the [`Layer`] it belongs to so tests can assert on what a frame
//! contains without a real drawing surface.
//!
//! Stroke geometry (dashes, arrowheads, circle outlines) is resolved here into
//! plain line segments by [`DrawCommand::stroke_segments`], which keeps the
//! backend adapter a thin loop over segments.

use bevy::color::Color;
use bevy::math::{Rect, Vec2};

/// Half-angle between an arrow's shaft and each side of its head
pub const ARROW_HEAD_ANGLE: f32 = core::f32::consts::PI / 6.0;

/// Segments used to approximate a circle outline
pub const CIRCLE_SEGMENTS: usize = 48;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Layer {
    Background,
    Ground,
    Grid,
    Trajectory,
    InitialMarker,
    Displacement,
    Body,
    Velocity,
    CircularMotion,
    Force,
    Axis,
    Series,
    Legend,
    Hud,
    Placeholder,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Dash {
    pub on: f32,
    pub off: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stroke {
    pub color: Color,
    pub width: f32,
    pub dash: Option<Dash>,
}

impl Stroke {
    pub fn solid(color: Color, width: f32) -> Self {
        Self {
            color,
            width,
            dash: None,
        }
    }

    pub fn dashed(color: Color, width: f32, on: f32, off: f32) -> Self {
        Self {
            color,
            width,
            dash: Some(Dash { on, off }),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextStyle {
    pub size: f32,
    pub color: Color,
    pub align: TextAlign,
    pub bold: bool,
}

impl TextStyle {
    pub fn new(size: f32, color: Color) -> Self {
        Self {
            size,
            color,
            align: TextAlign::Left,
            bold: false,
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn centered(mut self) -> Self {
        self.align = TextAlign::Center;
        self
    }

    pub fn right_aligned(mut self) -> Self {
        self.align = TextAlign::Right;
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    FillRect {
        rect: Rect,
        color: Color,
    },
    StrokeRect {
        rect: Rect,
        stroke: Stroke,
    },
    FillCircle {
        center: Vec2,
        radius: f32,
        color: Color,
    },
    StrokeCircle {
        center: Vec2,
        radius: f32,
        stroke: Stroke,
    },
    Line {
        from: Vec2,
        to: Vec2,
        stroke: Stroke,
    },
    Polyline {
        points: Vec<Vec2>,
        stroke: Stroke,
    },
    /// Shaft from `from` to `to` with two stroked head barbs at `to`
    Arrow {
        from: Vec2,
        to: Vec2,
        head_length: f32,
        stroke: Stroke,
    },
    /// `position` is the text baseline anchor, interpreted per `style.align`
    Text {
        position: Vec2,
        text: String,
        style: TextStyle,
    },
}

impl DrawCommand {
    pub fn stroke(&self) -> Option<&Stroke> {
        match self {
            DrawCommand::StrokeRect { stroke, .. }
            | DrawCommand::StrokeCircle { stroke, .. }
            | DrawCommand::Line { stroke, .. }
            | DrawCommand::Polyline { stroke, .. }
            | DrawCommand::Arrow { stroke, .. } => Some(stroke),
            _ => None,
        }
    }

    /// Whether this command paints geometry (anything but text).
    pub fn is_shape(&self) -> bool {
        !matches!(self, DrawCommand::Text { .. })
    }

    /// Stroked geometry as line segments, with dashes applied.
    ///
    /// Fills and text have no stroke segments.
    pub fn stroke_segments(&self) -> Vec<(Vec2, Vec2)> {
        let Some(stroke) = self.stroke() else {
            return Vec::new();
        };

        let outline = match self {
            DrawCommand::StrokeRect { rect, .. } => vec![
                rect.min,
                Vec2::new(rect.max.x, rect.min.y),
                rect.max,
                Vec2::new(rect.min.x, rect.max.y),
                rect.min,
            ],
            DrawCommand::StrokeCircle { center, radius, .. } => {
                circle_points(*center, *radius, CIRCLE_SEGMENTS)
            }
            DrawCommand::Line { from, to, .. } | DrawCommand::Arrow { from, to, .. } => {
                vec![*from, *to]
            }
            DrawCommand::Polyline { points, .. } => points.clone(),
            _ => Vec::new(),
        };

        let mut segments = match stroke.dash {
            Some(dash) => dash_polyline(&outline, dash),
            None => outline.windows(2).map(|pair| (pair[0], pair[1])).collect(),
        };

        if let DrawCommand::Arrow {
            from,
            to,
            head_length,
            ..
        } = self
        {
            if let Some([left, right]) = arrow_head(*from, *to, *head_length) {
                segments.push((*to, left));
                segments.push((*to, right));
            }
        }

        segments
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DrawItem {
    pub layer: Layer,
    pub command: DrawCommand,
}

/// One panel's frame: its pixel size and its commands in paint order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DrawList {
    size: Vec2,
    items: Vec<DrawItem>,
}

impl DrawList {
    pub fn new(size: Vec2) -> Self {
        Self {
            size,
            items: Vec::new(),
        }
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    /// The panel rectangle in its own pixel space.
    pub fn bounds(&self) -> Rect {
        Rect::from_corners(Vec2::ZERO, self.size)
    }

    pub fn push(&mut self, layer: Layer, command: DrawCommand) {
        self.items.push(DrawItem { layer, command });
    }

    pub fn items(&self) -> &[DrawItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn in_layer(&self, layer: Layer) -> impl Iterator<Item = &DrawCommand> {
        self.items
            .iter()
            .filter(move |item| item.layer == layer)
            .map(|item| &item.command)
    }

    pub fn count(&self, layer: Layer) -> usize {
        self.in_layer(layer).count()
    }

    /// All text in paint order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.items.iter().filter_map(|item| match &item.command {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn contains_text(&self, needle: &str) -> bool {
        self.texts().any(|text| text.contains(needle))
    }

    pub fn fill_background(&mut self, color: Color) {
        let rect = self.bounds();
        self.push(Layer::Background, DrawCommand::FillRect { rect, color });
    }

    pub fn text(&mut self, layer: Layer, position: Vec2, text: impl Into<String>, style: TextStyle) {
        self.push(
            layer,
            DrawCommand::Text {
                position,
                text: text.into(),
                style,
            },
        );
    }

    pub fn line(&mut self, layer: Layer, from: Vec2, to: Vec2, stroke: Stroke) {
        self.push(layer, DrawCommand::Line { from, to, stroke });
    }

    pub fn arrow(&mut self, layer: Layer, from: Vec2, to: Vec2, head_length: f32, stroke: Stroke) {
        self.push(
            layer,
            DrawCommand::Arrow {
                from,
                to,
                head_length,
                stroke,
            },
        );
    }

    /// Centered placeholder message on a plain background.
    pub fn placeholder(size: Vec2, background: Color, message: &str, style: TextStyle) -> Self {
        let mut list = Self::new(size);
        list.fill_background(background);
        list.text(Layer::Placeholder, size / 2.0, message, style.centered());
        list
    }
}

/// The two outer points of an arrowhead at `to`, or `None` for a
/// zero-length arrow.
pub fn arrow_head(from: Vec2, to: Vec2, length: f32) -> Option<[Vec2; 2]> {
    let shaft = to - from;
    if shaft.length_squared() <= f32::EPSILON {
        return None;
    }

    let angle = shaft.y.atan2(shaft.x);
    let side = |offset: f32| {
        let a = angle + offset;
        to - Vec2::new(a.cos(), a.sin()) * length
    };
    Some([side(-ARROW_HEAD_ANGLE), side(ARROW_HEAD_ANGLE)])
}

/// Closed outline of a circle; the first point is repeated at the end.
pub fn circle_points(center: Vec2, radius: f32, segments: usize) -> Vec<Vec2> {
    let segments = segments.max(3);
    (0..=segments)
        .map(|i| {
            let angle = i as f32 / segments as f32 * core::f32::consts::TAU;
            center + Vec2::new(angle.cos(), angle.sin()) * radius
        })
        .collect()
}

/// Splits a polyline into dash segments, carrying the dash phase across
/// vertices so curved outlines keep an even pattern.
pub fn dash_polyline(points: &[Vec2], dash: Dash) -> Vec<(Vec2, Vec2)> {
    let period = dash.on + dash.off;
    if dash.on <= 0.0 || period <= 0.0 {
        return points.windows(2).map(|pair| (pair[0], pair[1])).collect();
    }

    let mut segments = Vec::new();
    let mut phase = 0.0_f32;

    for pair in points.windows(2) {
        let (start, end) = (pair[0], pair[1]);
        let length = start.distance(end);
        if length <= f32::EPSILON {
            continue;
        }
        let direction = (end - start) / length;

        let mut travelled = 0.0_f32;
        while travelled < length {
            let drawing = phase < dash.on;
            let left_in_state = if drawing { dash.on - phase } else { period - phase };
            let step = left_in_state.min(length - travelled);
            if drawing {
                segments.push((
                    start + direction * travelled,
                    start + direction * (travelled + step),
                ));
            }
            travelled += step;
            phase = (phase + step) % period;
        }
    }

    segments
}

/// Clips a segment to `bounds` (Liang-Barsky); `None` when fully outside.
pub fn clip_segment(a: Vec2, b: Vec2, bounds: Rect) -> Option<(Vec2, Vec2)> {
    let delta = b - a;
    let mut t_enter = 0.0_f32;
    let mut t_exit = 1.0_f32;

    let edges = [
        (-delta.x, a.x - bounds.min.x),
        (delta.x, bounds.max.x - a.x),
        (-delta.y, a.y - bounds.min.y),
        (delta.y, bounds.max.y - a.y),
    ];

    for (p, q) in edges {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let t = q / p;
        if p < 0.0 {
            if t > t_exit {
                return None;
            }
            t_enter = t_enter.max(t);
        } else {
            if t < t_enter {
                return None;
            }
            t_exit = t_exit.min(t);
        }
    }

    Some((a + delta * t_enter, a + delta * t_exit))
}

use crate::geometry::{Point, Rect};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Straight-alpha colour with 8-bit channels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 1.0)
    }

    pub const fn with_alpha(self, a: f32) -> Self {
        Self::new(self.r, self.g, self.b, a)
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}

/// The 2D drawing operations effects issue against their surface.
///
/// Alpha arguments multiply the colour's own alpha, matching a canvas
/// `globalAlpha` that is set for one operation and then restored.
pub trait Surface {
    fn clear(&mut self, width: f64, height: f64);

    fn stroke_line(&mut self, from: Point, to: Point, color: Rgba, line_width: f64);

    fn fill_rect(&mut self, rect: Rect, color: Rgba, alpha: f64);

    /// Strokes a single path made of disjoint segments.
    fn stroke_segments(
        &mut self,
        segments: &[(Point, Point)],
        color: Rgba,
        line_width: f64,
        alpha: f64,
    );

    /// Radial gradient from `inner` at the center to transparent at `radius`,
    /// filled over the gradient's bounding square.
    fn fill_radial_glow(&mut self, center: Point, radius: f64, inner: Rgba);

    fn fill_circle(&mut self, center: Point, radius: f64, color: Rgba);

    fn stroke_circle(&mut self, center: Point, radius: f64, color: Rgba, line_width: f64);

    /// Centered text glyph rotated by `rotation` radians around `at`.
    fn fill_glyph(&mut self, glyph: char, at: Point, size: f64, rotation: f64, alpha: f64);
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCommand {
    Clear {
        width: f64,
        height: f64,
    },
    Line {
        from: Point,
        to: Point,
        color: Rgba,
        line_width: f64,
    },
    FillRect {
        rect: Rect,
        color: Rgba,
        alpha: f64,
    },
    Segments {
        segments: Vec<(Point, Point)>,
        color: Rgba,
        line_width: f64,
        alpha: f64,
    },
    Glow {
        center: Point,
        radius: f64,
        inner: Rgba,
    },
    FillCircle {
        center: Point,
        radius: f64,
        color: Rgba,
    },
    StrokeCircle {
        center: Point,
        radius: f64,
        color: Rgba,
        line_width: f64,
    },
    Glyph {
        glyph: char,
        at: Point,
        size: f64,
        rotation: f64,
        alpha: f64,
    },
}

/// Surface that keeps every command it receives.
#[derive(Clone, Debug, Default)]
pub struct Recorder {
    commands: Vec<DrawCommand>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Drains recorded commands, leaving the recorder empty.
    pub fn take(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Commands issued since (and including) the most recent clear.
    pub fn last_frame(&self) -> &[DrawCommand] {
        let start = self
            .commands
            .iter()
            .rposition(|c| matches!(c, DrawCommand::Clear { .. }))
            .unwrap_or(0);
        &self.commands[start..]
    }

    pub fn count_where(&self, pred: impl Fn(&DrawCommand) -> bool) -> usize {
        self.commands.iter().filter(|c| pred(c)).count()
    }
}

impl Surface for Recorder {
    fn clear(&mut self, width: f64, height: f64) {
        self.commands.push(DrawCommand::Clear { width, height });
    }

    fn stroke_line(&mut self, from: Point, to: Point, color: Rgba, line_width: f64) {
        self.commands.push(DrawCommand::Line {
            from,
            to,
            color,
            line_width,
        });
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgba, alpha: f64) {
        self.commands
            .push(DrawCommand::FillRect { rect, color, alpha });
    }

    fn stroke_segments(
        &mut self,
        segments: &[(Point, Point)],
        color: Rgba,
        line_width: f64,
        alpha: f64,
    ) {
        self.commands.push(DrawCommand::Segments {
            segments: segments.to_vec(),
            color,
            line_width,
            alpha,
        });
    }

    fn fill_radial_glow(&mut self, center: Point, radius: f64, inner: Rgba) {
        self.commands.push(DrawCommand::Glow {
            center,
            radius,
            inner,
        });
    }

    fn fill_circle(&mut self, center: Point, radius: f64, color: Rgba) {
        self.commands.push(DrawCommand::FillCircle {
            center,
            radius,
            color,
        });
    }

    fn stroke_circle(&mut self, center: Point, radius: f64, color: Rgba, line_width: f64) {
        self.commands.push(DrawCommand::StrokeCircle {
            center,
            radius,
            color,
            line_width,
        });
    }

    fn fill_glyph(&mut self, glyph: char, at: Point, size: f64, rotation: f64, alpha: f64) {
        self.commands.push(DrawCommand::Glyph {
            glyph,
            at,
            size,
            rotation,
            alpha,
        });
    }
}

/// A surface shared with the code that mounted the effect, so recorded
/// output stays readable after the effect is handed to a `Stage`.
impl<S: Surface> Surface for Rc<RefCell<S>> {
    fn clear(&mut self, width: f64, height: f64) {
        self.borrow_mut().clear(width, height)
    }

    fn stroke_line(&mut self, from: Point, to: Point, color: Rgba, line_width: f64) {
        self.borrow_mut().stroke_line(from, to, color, line_width)
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgba, alpha: f64) {
        self.borrow_mut().fill_rect(rect, color, alpha)
    }

    fn stroke_segments(
        &mut self,
        segments: &[(Point, Point)],
        color: Rgba,
        line_width: f64,
        alpha: f64,
    ) {
        self.borrow_mut().stroke_segments(segments, color, line_width, alpha)
    }

    fn fill_radial_glow(&mut self, center: Point, radius: f64, inner: Rgba) {
        self.borrow_mut().fill_radial_glow(center, radius, inner)
    }

    fn fill_circle(&mut self, center: Point, radius: f64, color: Rgba) {
        self.borrow_mut().fill_circle(center, radius, color)
    }

    fn stroke_circle(&mut self, center: Point, radius: f64, color: Rgba, line_width: f64) {
        self.borrow_mut().stroke_circle(center, radius, color, line_width)
    }

    fn fill_glyph(&mut self, glyph: char, at: Point, size: f64, rotation: f64, alpha: f64) {
        self.borrow_mut().fill_glyph(glyph, at, size, rotation, alpha)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_frame_starts_at_most_recent_clear() {
        let mut rec = Recorder::new();
        rec.clear(10.0, 10.0);
        rec.fill_circle(Point::new(1.0, 1.0), 2.0, Rgba::opaque(1, 2, 3));
        rec.clear(10.0, 10.0);
        rec.fill_circle(Point::new(5.0, 5.0), 2.0, Rgba::opaque(1, 2, 3));
        rec.stroke_circle(Point::new(5.0, 5.0), 4.0, Rgba::opaque(1, 2, 3), 1.0);

        let frame = rec.last_frame();
        assert_eq!(frame.len(), 3);
        assert!(matches!(frame[0], DrawCommand::Clear { .. }));
        assert_eq!(rec.len(), 5);
    }

    #[test]
    fn take_drains_commands() {
        let mut rec = Recorder::new();
        rec.clear(1.0, 1.0);
        assert_eq!(rec.take().len(), 1);
        assert!(rec.is_empty());
    }

    #[test]
    fn draw_commands_serialize_with_op_tag() {
        let cmd = DrawCommand::FillCircle {
            center: Point::new(1.0, 2.0),
            radius: 4.0,
            color: Rgba::opaque(249, 112, 104),
        };
        let json = serde_json::to_value(&cmd).unwrap();
        assert_eq!(json["op"], "fill_circle");
        assert_eq!(json["radius"], 4.0);
    }

    #[test]
    fn shared_recorder_sees_writes_through_clone() {
        let shared = Rc::new(RefCell::new(Recorder::new()));
        let mut handle = Rc::clone(&shared);
        handle.clear(4.0, 4.0);
        handle.fill_glyph('x', Point::new(1.0, 1.0), 10.0, 0.0, 0.5);
        assert_eq!(shared.borrow().len(), 2);
    }

    #[test]
    fn rgba_displays_like_css() {
        assert_eq!(Rgba::new(29, 211, 176, 0.2).to_string(), "rgba(29, 211, 176, 0.2)");
    }
}

//! Drawing surfaces.
//!
//! The field renders through [`DrawContext`], a small immediate-mode 2D API
//! (clear, fill circle, stroke line, and the style state those use). Any
//! target that can provide one can host the animation:
//!
//! - [`GpuContext`](crate::gpu::GpuContext) for a window,
//! - [`RasterContext`](crate::raster::RasterContext) for images,
//! - [`RecordingContext`] to capture the command stream in tests.
//!
//! A [`SurfaceHandle`] is what a host passes to
//! [`ParticleField::new`](crate::ParticleField::new); it either yields a
//! context or fails, which is the only construction error the field has.

use glam::{Vec2, Vec3};

/// Immediate-mode 2D drawing operations.
///
/// Style state (fill, stroke, alpha, line width) persists across calls
/// until changed, like a canvas context.
pub trait DrawContext {
    /// Current pixel dimensions.
    fn size(&self) -> Vec2;

    /// Set new pixel dimensions. Contents after a resize are unspecified
    /// until the next clear.
    fn set_size(&mut self, size: Vec2);

    /// Clear a rectangle to transparent.
    fn clear_rect(&mut self, origin: Vec2, size: Vec2);

    fn set_fill_color(&mut self, color: Vec3);

    fn set_stroke_color(&mut self, color: Vec3);

    /// Alpha multiplier applied to every subsequent fill and stroke.
    fn set_global_alpha(&mut self, alpha: f32);

    fn set_line_width(&mut self, width: f32);

    /// Fill a disc with the current fill colour.
    fn fill_circle(&mut self, center: Vec2, radius: f32);

    /// Stroke a segment with the current stroke colour and width.
    fn stroke_line(&mut self, from: Vec2, to: Vec2);

    /// Clear the whole surface.
    fn clear(&mut self) {
        let size = self.size();
        self.clear_rect(Vec2::ZERO, size);
    }
}

/// Something that can hand out a 2D drawing context.
pub trait SurfaceHandle {
    type Context: DrawContext;

    /// Consume the handle and return its context, or `None` when the
    /// surface cannot provide one.
    fn context_2d(self) -> Option<Self::Context>;
}

/// One recorded drawing operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawCommand {
    SetSize(Vec2),
    ClearRect { origin: Vec2, size: Vec2 },
    SetFillColor(Vec3),
    SetStrokeColor(Vec3),
    SetGlobalAlpha(f32),
    SetLineWidth(f32),
    FillCircle { center: Vec2, radius: f32 },
    StrokeLine { from: Vec2, to: Vec2 },
}

/// A drawn primitive with the style state in effect when it was issued.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Stroke {
    Circle {
        center: Vec2,
        radius: f32,
        color: Vec3,
        alpha: f32,
    },
    Line {
        from: Vec2,
        to: Vec2,
        color: Vec3,
        alpha: f32,
        width: f32,
    },
}

/// Context that records every call.
#[derive(Debug, Clone)]
pub struct RecordingContext {
    size: Vec2,
    commands: Vec<DrawCommand>,
}

impl RecordingContext {
    pub fn new(size: Vec2) -> Self {
        Self {
            size,
            commands: Vec::new(),
        }
    }

    /// All commands issued since creation or the last [`take`](Self::take).
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Drain the recorded commands.
    pub fn take(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Commands issued after the most recent full clear.
    pub fn last_frame(&self) -> &[DrawCommand] {
        let start = self
            .commands
            .iter()
            .rposition(|c| matches!(c, DrawCommand::ClearRect { .. }))
            .map(|i| i + 1)
            .unwrap_or(0);
        &self.commands[start..]
    }

    /// Replay the last frame's commands, resolving style state into
    /// self-contained primitives.
    pub fn last_frame_strokes(&self) -> Vec<Stroke> {
        let mut fill = Vec3::ZERO;
        let mut stroke = Vec3::ZERO;
        let mut alpha = 1.0;
        let mut width = 1.0;
        let mut out = Vec::new();

        for command in &self.commands {
            match *command {
                DrawCommand::ClearRect { .. } => out.clear(),
                DrawCommand::SetSize(_) => {}
                DrawCommand::SetFillColor(c) => fill = c,
                DrawCommand::SetStrokeColor(c) => stroke = c,
                DrawCommand::SetGlobalAlpha(a) => alpha = a,
                DrawCommand::SetLineWidth(w) => width = w,
                DrawCommand::FillCircle { center, radius } => out.push(Stroke::Circle {
                    center,
                    radius,
                    color: fill,
                    alpha,
                }),
                DrawCommand::StrokeLine { from, to } => out.push(Stroke::Line {
                    from,
                    to,
                    color: stroke,
                    alpha,
                    width,
                }),
            }
        }
        out
    }
}

impl DrawContext for RecordingContext {
    fn size(&self) -> Vec2 {
        self.size
    }

    fn set_size(&mut self, size: Vec2) {
        self.size = size;
        self.commands.push(DrawCommand::SetSize(size));
    }

    fn clear_rect(&mut self, origin: Vec2, size: Vec2) {
        self.commands.push(DrawCommand::ClearRect { origin, size });
    }

    fn set_fill_color(&mut self, color: Vec3) {
        self.commands.push(DrawCommand::SetFillColor(color));
    }

    fn set_stroke_color(&mut self, color: Vec3) {
        self.commands.push(DrawCommand::SetStrokeColor(color));
    }

    fn set_global_alpha(&mut self, alpha: f32) {
        self.commands.push(DrawCommand::SetGlobalAlpha(alpha));
    }

    fn set_line_width(&mut self, width: f32) {
        self.commands.push(DrawCommand::SetLineWidth(width));
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32) {
        self.commands.push(DrawCommand::FillCircle { center, radius });
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2) {
        self.commands.push(DrawCommand::StrokeLine { from, to });
    }
}

/// Handle for a [`RecordingContext`].
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    size: Vec2,
    available: bool,
}

impl RecordingSurface {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            size: Vec2::new(width, height),
            available: true,
        }
    }

    /// A surface that refuses to provide a context.
    pub fn unavailable() -> Self {
        Self {
            size: Vec2::ZERO,
            available: false,
        }
    }
}

impl SurfaceHandle for RecordingSurface {
    type Context = RecordingContext;

    fn context_2d(self) -> Option<RecordingContext> {
        self.available.then(|| RecordingContext::new(self.size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_resolves_style_state() {
        let mut ctx = RecordingContext::new(Vec2::new(10.0, 10.0));
        ctx.clear();
        ctx.set_stroke_color(Vec3::X);
        ctx.set_global_alpha(0.25);
        ctx.set_line_width(0.5);
        ctx.stroke_line(Vec2::ZERO, Vec2::ONE);
        ctx.set_fill_color(Vec3::Y);
        ctx.set_global_alpha(1.0);
        ctx.fill_circle(Vec2::splat(5.0), 2.0);

        let strokes = ctx.last_frame_strokes();
        assert_eq!(
            strokes,
            vec![
                Stroke::Line {
                    from: Vec2::ZERO,
                    to: Vec2::ONE,
                    color: Vec3::X,
                    alpha: 0.25,
                    width: 0.5,
                },
                Stroke::Circle {
                    center: Vec2::splat(5.0),
                    radius: 2.0,
                    color: Vec3::Y,
                    alpha: 1.0,
                },
            ]
        );
    }

    #[test]
    fn test_last_frame_starts_after_clear() {
        let mut ctx = RecordingContext::new(Vec2::new(10.0, 10.0));
        ctx.fill_circle(Vec2::ZERO, 1.0);
        ctx.clear();
        ctx.fill_circle(Vec2::ONE, 1.0);
        assert_eq!(
            ctx.last_frame(),
            &[DrawCommand::FillCircle {
                center: Vec2::ONE,
                radius: 1.0
            }]
        );
    }

    #[test]
    fn test_unavailable_surface_has_no_context() {
        assert!(RecordingSurface::unavailable().context_2d().is_none());
        let ctx = RecordingSurface::new(640.0, 480.0).context_2d().unwrap();
        assert_eq!(ctx.size(), Vec2::new(640.0, 480.0));
    }
}

//! # netfield - Interactive Particle Network Background
//!
//! A field of slowly drifting particles, joined by faint lines whenever two
//! come close, that swells and parts around the pointer. Meant to sit behind
//! page or app content as a decorative background.
//!
//! ## Quick Start
//!
//! ```ignore
//! use netfield::prelude::*;
//!
//! fn main() -> Result<(), RunError> {
//!     netfield::run(RunOptions::default())
//! }
//! ```
//!
//! ## Hosting the field yourself
//!
//! [`ParticleField`] does not schedule itself. Give it a surface, feed it
//! events, and call [`tick`](ParticleField::tick) once per display frame:
//!
//! ```ignore
//! let mut field = ParticleField::new(RasterSurface::new(1280, 720), FieldConfig::default())?;
//!
//! field.set_pointer(Some(Vec2::new(400.0, 300.0)));
//! field.set_theme(Theme::Dark);
//! while field.is_running() {
//!     field.tick();
//!     // present field.context() ...
//! }
//! ```
//!
//! Any type implementing [`DrawContext`] can be drawn into. The crate ships
//! three: [`GpuContext`](gpu::GpuContext) for windows,
//! [`RasterContext`](raster::RasterContext) for images, and
//! [`RecordingContext`](surface::RecordingContext) for tests.
//!
//! ## Each frame
//!
//! 1. The surface is cleared.
//! 2. Every pair of particles closer than the connection distance is joined
//!    by a line, fading linearly to nothing at that distance.
//! 3. Each particle bounces off the surface edges, moves one step, grows and
//!    is pushed away if the pointer is near (relaxing back otherwise), and is
//!    drawn.

pub mod color;
pub mod config;
pub mod connections;
pub mod error;
pub mod gpu;
pub mod input;
pub mod particle;
pub mod raster;
mod simulation;
pub mod surface;
pub mod theme;
pub mod time;
mod window;

pub use color::{ColorWeights, Palette, ParticleColor};
pub use config::FieldConfig;
pub use connections::{connection_opacity, find_connections, Connection, Connections};
pub use error::{ConfigError, FieldError, GpuError, RunError};
pub use glam::{Vec2, Vec3};
pub use input::{FieldEvent, HostCommand, Pointer};
pub use particle::Particle;
pub use simulation::ParticleField;
pub use surface::{DrawContext, SurfaceHandle};
pub use theme::{Theme, ThemePreference, ThemeWatcher};
pub use window::{run, RunOptions};

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use netfield::prelude::*;
/// ```
pub mod prelude {
    pub use crate::color::{ColorWeights, Palette, ParticleColor};
    pub use crate::config::FieldConfig;
    pub use crate::error::{FieldError, RunError};
    pub use crate::input::FieldEvent;
    pub use crate::particle::Particle;
    pub use crate::raster::RasterSurface;
    pub use crate::simulation::ParticleField;
    pub use crate::surface::{DrawContext, RecordingSurface, SurfaceHandle};
    pub use crate::theme::{Theme, ThemePreference};
    pub use crate::window::{run, RunOptions};
    pub use crate::{Vec2, Vec3};
}

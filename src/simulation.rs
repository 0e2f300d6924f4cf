//! The particle field simulator.

use glam::Vec2;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::config::FieldConfig;
use crate::connections::Connections;
use crate::error::FieldError;
use crate::input::{FieldEvent, Pointer};
use crate::particle::Particle;
use crate::surface::{DrawContext, SurfaceHandle};
use crate::theme::Theme;

/// An animated network of drifting particles.
///
/// The field owns a fixed population, the drawing context it renders into,
/// and the last pointer and theme values it was given. It never schedules
/// itself: a host calls [`tick`](Self::tick) once per display frame while
/// [`is_running`](Self::is_running) is true.
///
/// ```ignore
/// let mut field = ParticleField::new(RecordingSurface::new(1280.0, 720.0), FieldConfig::default())?;
/// field.set_pointer(Some(Vec2::new(640.0, 360.0)));
/// field.tick();
/// ```
pub struct ParticleField<C: DrawContext> {
    context: C,
    config: FieldConfig,
    particles: Vec<Particle>,
    pointer: Pointer,
    theme: Theme,
    running: bool,
    frame: u64,
}

impl<C: DrawContext> ParticleField<C> {
    /// Create a field on `surface` with a randomly seeded population.
    pub fn new<S>(surface: S, config: FieldConfig) -> Result<Self, FieldError>
    where
        S: SurfaceHandle<Context = C>,
    {
        Self::with_rng(surface, config, &mut SmallRng::from_entropy())
    }

    /// Create a field with a deterministic population drawn from `seed`.
    pub fn with_seed<S>(surface: S, config: FieldConfig, seed: u64) -> Result<Self, FieldError>
    where
        S: SurfaceHandle<Context = C>,
    {
        Self::with_rng(surface, config, &mut SmallRng::seed_from_u64(seed))
    }

    /// Create a field, sampling particles from `rng`.
    ///
    /// Fails only when the surface cannot provide a drawing context.
    pub fn with_rng<S, R>(surface: S, config: FieldConfig, rng: &mut R) -> Result<Self, FieldError>
    where
        S: SurfaceHandle<Context = C>,
        R: Rng,
    {
        let context = surface.context_2d().ok_or(FieldError::SurfaceUnavailable)?;
        let size = context.size();
        let particles = (0..config.particle_count)
            .map(|_| Particle::spawn(rng, &config, size))
            .collect();
        Ok(Self::assemble(context, config, particles))
    }

    /// Create a field with an explicit population.
    ///
    /// `config.particle_count` is ignored; the population is `particles`.
    pub fn from_particles<S>(
        surface: S,
        config: FieldConfig,
        particles: Vec<Particle>,
    ) -> Result<Self, FieldError>
    where
        S: SurfaceHandle<Context = C>,
    {
        let context = surface.context_2d().ok_or(FieldError::SurfaceUnavailable)?;
        Ok(Self::assemble(context, config, particles))
    }

    fn assemble(context: C, config: FieldConfig, particles: Vec<Particle>) -> Self {
        let size = context.size();
        log::info!(
            "Particle field started: {} particles on {}x{} surface",
            particles.len(),
            size.x,
            size.y
        );
        Self {
            context,
            config,
            particles,
            pointer: Pointer::default(),
            theme: Theme::default(),
            running: true,
            frame: 0,
        }
    }

    /// Resize the surface. Particles are left where they are; any now
    /// outside the bounds find their way back through reflection.
    pub fn resize(&mut self, width: f32, height: f32) {
        log::debug!("Surface resized to {}x{}", width, height);
        self.context.set_size(Vec2::new(width, height));
    }

    /// Set or clear the pointer position in surface coordinates.
    pub fn set_pointer(&mut self, position: Option<Vec2>) {
        self.pointer.set(position);
    }

    /// Store the theme used for connection strokes from the next frame on.
    pub fn set_theme(&mut self, theme: Theme) {
        if self.theme != theme {
            log::debug!("Connection theme set to {:?}", theme);
        }
        self.theme = theme;
    }

    /// Route a host event to the matching setter.
    pub fn handle_event(&mut self, event: FieldEvent) {
        match event {
            FieldEvent::Resized { width, height } => self.resize(width, height),
            FieldEvent::PointerMoved(position) => self.set_pointer(Some(position)),
            FieldEvent::PointerLeft => self.set_pointer(None),
            FieldEvent::ThemeChanged(theme) => self.set_theme(theme),
        }
    }

    /// Resume host-driven ticking.
    pub fn start(&mut self) {
        if !self.running {
            log::info!("Particle field resumed at frame {}", self.frame);
        }
        self.running = true;
    }

    /// Pause host-driven ticking. The last frame stays on the surface.
    pub fn stop(&mut self) {
        if self.running {
            log::info!("Particle field paused at frame {}", self.frame);
        }
        self.running = false;
    }

    /// Whether the host should keep calling [`tick`](Self::tick).
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Advance and render exactly one frame.
    ///
    /// Clears the surface, strokes every connection, then updates and
    /// fills each particle in population order. Connections are computed
    /// from positions before this frame's movement.
    pub fn tick(&mut self) {
        let size = self.context.size();
        self.context.clear_rect(Vec2::ZERO, size);

        self.draw_connections();
        self.update_and_draw_particles(size);

        self.frame += 1;
    }

    fn draw_connections(&mut self) {
        let stroke = self.config.palette.connection_color(self.theme);
        let connections = Connections::new(
            &self.particles,
            self.config.connection_distance,
            self.config.connection_alpha,
        );

        for connection in connections {
            self.context.set_stroke_color(stroke);
            self.context.set_global_alpha(connection.opacity);
            self.context.set_line_width(self.config.line_width);
            self.context.stroke_line(connection.from, connection.to);
            self.context.set_global_alpha(1.0);
        }
    }

    fn update_and_draw_particles(&mut self, size: Vec2) {
        let pointer = self.pointer.position();

        for particle in &mut self.particles {
            particle.step(size, pointer, &self.config);

            self.context.set_fill_color(self.config.palette.resolve(particle.color));
            self.context.set_global_alpha(particle.opacity);
            self.context.fill_circle(particle.position, particle.radius);
            self.context.set_global_alpha(1.0);
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    pub fn context(&self) -> &C {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut C {
        &mut self.context
    }

    pub fn pointer(&self) -> Option<Vec2> {
        self.pointer.position()
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Current surface size.
    pub fn size(&self) -> Vec2 {
        self.context.size()
    }

    /// Frames rendered so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::ParticleColor;
    use crate::surface::{DrawCommand, RecordingContext, RecordingSurface, Stroke};

    fn still(x: f32, y: f32, radius: f32) -> Particle {
        Particle::new(Vec2::new(x, y), Vec2::ZERO, radius, ParticleColor::Primary, 1.0)
    }

    fn field(particles: Vec<Particle>) -> ParticleField<RecordingContext> {
        ParticleField::from_particles(RecordingSurface::new(400.0, 300.0), FieldConfig::default(), particles)
            .unwrap()
    }

    #[test]
    fn test_unavailable_surface_is_fatal() {
        let result = ParticleField::new(RecordingSurface::unavailable(), FieldConfig::default());
        assert!(matches!(result, Err(FieldError::SurfaceUnavailable)));
    }

    #[test]
    fn test_population_size_fixed() {
        let mut f = ParticleField::with_seed(RecordingSurface::new(800.0, 600.0), FieldConfig::default(), 3).unwrap();
        assert_eq!(f.particles().len(), 80);
        for _ in 0..50 {
            f.tick();
        }
        assert_eq!(f.particles().len(), 80);
        assert_eq!(f.frame(), 50);
    }

    #[test]
    fn test_same_seed_same_population() {
        let a = ParticleField::with_seed(RecordingSurface::new(800.0, 600.0), FieldConfig::default(), 42).unwrap();
        let b = ParticleField::with_seed(RecordingSurface::new(800.0, 600.0), FieldConfig::default(), 42).unwrap();
        assert_eq!(a.particles(), b.particles());
    }

    #[test]
    fn test_frame_order_clear_lines_circles() {
        let mut f = field(vec![still(10.0, 10.0, 1.0), still(50.0, 10.0, 1.0)]);
        f.tick();

        let commands = f.context().commands();
        assert!(matches!(commands[0], DrawCommand::ClearRect { .. }));

        let strokes = f.context().last_frame_strokes();
        assert_eq!(strokes.len(), 3);
        assert!(matches!(strokes[0], Stroke::Line { .. }));
        assert!(matches!(strokes[1], Stroke::Circle { .. }));
        assert!(matches!(strokes[2], Stroke::Circle { .. }));
    }

    #[test]
    fn test_alpha_restored_after_each_draw() {
        let mut f = field(vec![still(10.0, 10.0, 1.0), still(50.0, 10.0, 1.0)]);
        f.tick();
        let last_alpha = f
            .context()
            .commands()
            .iter()
            .rev()
            .find_map(|c| match c {
                DrawCommand::SetGlobalAlpha(a) => Some(*a),
                _ => None,
            });
        assert_eq!(last_alpha, Some(1.0));
    }

    #[test]
    fn test_theme_picks_connection_color() {
        let mut f = field(vec![still(10.0, 10.0, 1.0), still(20.0, 10.0, 1.0)]);
        let palette = f.config().palette;

        f.tick();
        let line_color = |f: &ParticleField<RecordingContext>| {
            f.context().last_frame_strokes().iter().find_map(|s| match s {
                Stroke::Line { color, .. } => Some(*color),
                _ => None,
            })
        };
        assert_eq!(line_color(&f), Some(palette.primary));

        f.set_theme(Theme::Dark);
        f.tick();
        assert_eq!(line_color(&f), Some(palette.primary_light));
    }

    #[test]
    fn test_events_route_to_setters() {
        let mut f = field(vec![]);
        f.handle_event(FieldEvent::PointerMoved(Vec2::new(3.0, 4.0)));
        assert_eq!(f.pointer(), Some(Vec2::new(3.0, 4.0)));
        f.handle_event(FieldEvent::PointerLeft);
        assert_eq!(f.pointer(), None);
        f.handle_event(FieldEvent::Resized { width: 10.0, height: 20.0 });
        assert_eq!(f.size(), Vec2::new(10.0, 20.0));
        f.handle_event(FieldEvent::ThemeChanged(Theme::Dark));
        assert_eq!(f.theme(), Theme::Dark);
    }

    #[test]
    fn test_start_stop() {
        let mut f = field(vec![]);
        assert!(f.is_running());
        f.stop();
        assert!(!f.is_running());
        f.start();
        assert!(f.is_running());
    }
}

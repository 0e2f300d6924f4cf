//! Particle state and the per-frame rules applied to it.
//!
//! Each rule is a small method so the simulator's update pass reads as the
//! sequence it is: reflect, advance, interact with the pointer.

use glam::Vec2;
use rand::Rng;

use crate::color::ParticleColor;
use crate::config::FieldConfig;

/// One point of the field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    /// Centre in surface coordinates.
    pub position: Vec2,
    /// Displacement per frame. Only boundary reflection changes it.
    pub velocity: Vec2,
    /// Displayed radius, eased toward `original_radius` or its hover size.
    pub radius: f32,
    pub original_radius: f32,
    pub color: ParticleColor,
    pub opacity: f32,
}

impl Particle {
    /// Create a particle at rest size.
    pub fn new(position: Vec2, velocity: Vec2, radius: f32, color: ParticleColor, opacity: f32) -> Self {
        Self {
            position,
            velocity,
            radius,
            original_radius: radius,
            color,
            opacity,
        }
    }

    /// Sample a particle uniformly inside a `size` surface.
    ///
    /// Every attribute is drawn independently. Positions keep the whole disc
    /// on the surface; an axis shorter than the diameter places the particle
    /// at its midpoint.
    pub fn spawn<R: Rng>(rng: &mut R, config: &FieldConfig, size: Vec2) -> Self {
        let radius = rng.gen::<f32>() * (config.max_radius - config.min_radius) + config.min_radius;

        let mut axis = |extent: f32| {
            let span = extent - radius * 2.0;
            if span > 0.0 {
                rng.gen::<f32>() * span + radius
            } else {
                extent * 0.5
            }
        };
        let position = Vec2::new(axis(size.x), axis(size.y));

        let velocity = Vec2::new(
            (rng.gen::<f32>() - 0.5) * config.max_speed,
            (rng.gen::<f32>() - 0.5) * config.max_speed,
        );
        let color = config.color_weights.pick(rng.gen::<f32>());
        let opacity = rng.gen::<f32>() * 0.5 + 0.5;

        Self::new(position, velocity, radius, color, opacity)
    }

    /// Flip each velocity component whose next step would carry the disc
    /// edge past the surface.
    ///
    /// Only a component heading toward the violated edge is flipped, so a
    /// particle left outside by a shrink keeps heading back in.
    pub fn reflect(&mut self, size: Vec2) {
        let next = self.position + self.velocity;

        if (next.x + self.radius > size.x && self.velocity.x > 0.0)
            || (next.x - self.radius < 0.0 && self.velocity.x < 0.0)
        {
            self.velocity.x = -self.velocity.x;
        }

        if (next.y + self.radius > size.y && self.velocity.y > 0.0)
            || (next.y - self.radius < 0.0 && self.velocity.y < 0.0)
        {
            self.velocity.y = -self.velocity.y;
        }
    }

    /// Move one frame along the velocity.
    #[inline]
    pub fn advance(&mut self) {
        self.position += self.velocity;
    }

    /// Close `factor` of the gap between the displayed radius and `target`.
    #[inline]
    pub fn ease_radius(&mut self, target: f32, factor: f32) {
        self.radius += (target - self.radius) * factor;
    }

    /// Apply pointer influence for this frame.
    ///
    /// Inside `config.pointer_radius` the particle grows toward its hover
    /// size and is pushed directly away from the pointer, hardest at the
    /// centre and fading to nothing at the edge. Anywhere else it relaxes
    /// back to its original radius. A pointer exactly on the centre has no
    /// direction and pushes nothing.
    pub fn interact(&mut self, pointer: Option<Vec2>, config: &FieldConfig) {
        let influence = config.pointer_radius;

        let near = pointer.and_then(|p| {
            let offset = self.position - p;
            let distance = offset.length();
            (distance < influence).then_some((offset, distance))
        });

        match near {
            Some((offset, distance)) => {
                self.ease_radius(self.original_radius * config.hover_scale, config.ease_factor);

                if distance > 0.0 {
                    let force = (influence - distance) / influence;
                    self.position += offset / distance * force * config.repel_strength;
                }
            }
            None => self.ease_radius(self.original_radius, config.ease_factor),
        }
    }

    /// Full update for one frame: reflect, advance, pointer interaction.
    pub fn step(&mut self, size: Vec2, pointer: Option<Vec2>, config: &FieldConfig) {
        self.reflect(size);
        self.advance();
        self.interact(pointer, config);
    }
}

//! Proximity connections between particles.
//!
//! Every unordered pair closer than the connection distance is linked by a
//! line whose alpha falls linearly with distance. The set is derived from
//! positions each frame and never stored: [`Connections`] walks the pairs
//! lazily so the draw pass can consume it without an intermediate buffer.
//!
//! The scan is a plain O(N²) double loop. At background-effect population
//! sizes (around a hundred particles) that is a few thousand distance checks
//! per frame.

use glam::Vec2;

use crate::particle::Particle;

/// A line between two particles, `a < b`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Connection {
    pub a: usize,
    pub b: usize,
    pub from: Vec2,
    pub to: Vec2,
    pub distance: f32,
    /// Stroke alpha in `(0, max_alpha]`.
    pub opacity: f32,
}

/// Alpha of a line spanning `distance`, or `None` when the pair is too far
/// apart to connect.
///
/// `max_alpha * (1 - distance / threshold)`: strictly decreasing in
/// distance and reaching zero at the threshold, where no line is drawn.
#[inline]
pub fn connection_opacity(distance: f32, threshold: f32, max_alpha: f32) -> Option<f32> {
    if distance < threshold {
        Some(max_alpha * (1.0 - distance / threshold))
    } else {
        None
    }
}

/// Lazy iterator over all connected pairs, in `(i, j)` row-major order with `i < j`.
pub struct Connections<'a> {
    particles: &'a [Particle],
    threshold: f32,
    max_alpha: f32,
    i: usize,
    j: usize,
}

impl<'a> Connections<'a> {
    pub fn new(particles: &'a [Particle], threshold: f32, max_alpha: f32) -> Self {
        Self {
            particles,
            threshold,
            max_alpha,
            i: 0,
            j: 1,
        }
    }
}

impl Iterator for Connections<'_> {
    type Item = Connection;

    fn next(&mut self) -> Option<Connection> {
        let n = self.particles.len();
        while self.i < n {
            while self.j < n {
                let (a, b) = (self.i, self.j);
                self.j += 1;

                let from = self.particles[a].position;
                let to = self.particles[b].position;
                let distance = from.distance(to);

                if let Some(opacity) = connection_opacity(distance, self.threshold, self.max_alpha) {
                    return Some(Connection {
                        a,
                        b,
                        from,
                        to,
                        distance,
                        opacity,
                    });
                }
            }
            self.i += 1;
            self.j = self.i + 1;
        }
        None
    }
}

/// Collect every connection into a vector.
pub fn find_connections(particles: &[Particle], threshold: f32, max_alpha: f32) -> Vec<Connection> {
    Connections::new(particles, threshold, max_alpha).collect()
}

//! End-to-end frames rendered into the software rasteriser.

use netfield::prelude::*;
use netfield::raster::RasterContext;

fn field_of(particles: Vec<Particle>) -> ParticleField<RasterContext> {
    ParticleField::from_particles(RasterSurface::new(200, 160), FieldConfig::default(), particles).unwrap()
}

fn dot(x: f32, y: f32, radius: f32, color: ParticleColor) -> Particle {
    Particle::new(Vec2::new(x, y), Vec2::ZERO, radius, color, 1.0)
}

#[test]
fn test_particle_is_filled_with_its_palette_colour() {
    let mut field = field_of(vec![dot(50.0, 50.0, 4.0, ParticleColor::Secondary)]);
    field.tick();

    let (rgb, alpha) = field.context().color_at(50, 50).unwrap();
    assert!((alpha - 1.0).abs() < 1e-5);
    assert!(rgb.abs_diff_eq(Palette::default().secondary, 1e-4));

    let (_, far) = field.context().color_at(150, 150).unwrap();
    assert_eq!(far, 0.0);
}

#[test]
fn test_connection_is_faint() {
    let mut field = field_of(vec![
        dot(20.0, 100.0, 1.0, ParticleColor::Primary),
        dot(120.0, 100.0, 1.0, ParticleColor::Primary),
    ]);
    field.tick();

    let strongest = (97..=102)
        .filter_map(|y| field.context().color_at(70, y))
        .map(|(_, a)| a)
        .fold(0.0f32, f32::max);
    assert!(strongest > 0.0);
    assert!(strongest <= 0.5 * (1.0 - 100.0 / 150.0) + 1e-4);
}

#[test]
fn test_each_tick_starts_from_a_cleared_surface() {
    let mut p = dot(50.0, 50.0, 3.0, ParticleColor::Primary);
    p.velocity = Vec2::new(0.5, 0.0);
    let mut field = field_of(vec![p]);

    for _ in 0..40 {
        field.tick();
    }
    let (_, alpha) = field.context().color_at(50, 50).unwrap();
    assert_eq!(alpha, 0.0);
}

#[test]
fn test_resize_reallocates_raster() {
    let mut field = field_of(vec![dot(10.0, 10.0, 2.0, ParticleColor::Primary)]);
    field.resize(64.0, 32.0);
    field.tick();

    assert_eq!(field.context().width(), 64);
    assert_eq!(field.context().height(), 32);
    assert_eq!(field.context().to_image(Vec3::ONE).dimensions(), (64, 32));
}

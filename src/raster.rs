//! CPU rasterizer.
//!
//! [`RasterContext`] implements [`DrawContext`] over a premultiplied RGBA
//! float buffer with source-over blending and a half-pixel coverage ramp on
//! circle and line edges. It backs headless snapshots and lets tests check
//! real pixels without a GPU.

use std::path::Path;

use glam::{Vec2, Vec3, Vec4};
use image::{Rgba, RgbaImage};

use crate::surface::{DrawContext, SurfaceHandle};

/// Handle for an in-memory raster surface.
#[derive(Debug, Clone, Copy)]
pub struct RasterSurface {
    width: u32,
    height: u32,
}

impl RasterSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl SurfaceHandle for RasterSurface {
    type Context = RasterContext;

    fn context_2d(self) -> Option<RasterContext> {
        Some(RasterContext::new(self.width, self.height))
    }
}

/// Software 2D context.
#[derive(Debug, Clone)]
pub struct RasterContext {
    width: u32,
    height: u32,
    /// Premultiplied RGBA, row-major.
    pixels: Vec<Vec4>,
    fill: Vec3,
    stroke: Vec3,
    alpha: f32,
    line_width: f32,
}

impl RasterContext {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Vec4::ZERO; (width as usize) * (height as usize)],
            fill: Vec3::ZERO,
            stroke: Vec3::ZERO,
            alpha: 1.0,
            line_width: 1.0,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Premultiplied RGBA at a pixel, or `None` outside the surface.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Vec4> {
        (x < self.width && y < self.height).then(|| self.pixels[self.index(x, y)])
    }

    /// Un-premultiplied colour and alpha at a pixel.
    pub fn color_at(&self, x: u32, y: u32) -> Option<(Vec3, f32)> {
        self.pixel(x, y).map(|p| {
            if p.w > 0.0 {
                (p.truncate() / p.w, p.w)
            } else {
                (Vec3::ZERO, 0.0)
            }
        })
    }

    /// Composite the surface over an opaque `background` into an 8-bit image.
    pub fn to_image(&self, background: Vec3) -> RgbaImage {
        RgbaImage::from_fn(self.width, self.height, |x, y| {
            let p = self.pixels[self.index(x, y)];
            let rgb = p.truncate() + background * (1.0 - p.w);
            let [r, g, b] = crate::color::rgb_to_bytes(rgb);
            Rgba([r, g, b, 255])
        })
    }

    /// Write the surface over `background` as a PNG.
    pub fn save_png(&self, path: impl AsRef<Path>, background: Vec3) -> image::ImageResult<()> {
        self.to_image(background).save(path)
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        (y as usize) * (self.width as usize) + x as usize
    }

    /// Blend `color` with `coverage` at a pixel, source-over.
    #[inline]
    fn blend(&mut self, x: u32, y: u32, color: Vec3, coverage: f32) {
        let a = (coverage * self.alpha).clamp(0.0, 1.0);
        if a <= 0.0 {
            return;
        }
        let i = self.index(x, y);
        let dst = self.pixels[i];
        self.pixels[i] = color.extend(1.0) * a + dst * (1.0 - a);
    }

    /// Pixel rectangle covering `[min, max]`, clipped to the surface.
    fn clip(&self, min: Vec2, max: Vec2) -> Option<(u32, u32, u32, u32)> {
        let x0 = min.x.floor().max(0.0);
        let y0 = min.y.floor().max(0.0);
        let x1 = max.x.ceil().min(self.width as f32);
        let y1 = max.y.ceil().min(self.height as f32);
        (x0 < x1 && y0 < y1).then(|| (x0 as u32, y0 as u32, x1 as u32, y1 as u32))
    }
}

/// Coverage ramp: 1 inside, 0 beyond half a pixel past the edge.
#[inline]
fn coverage(edge_distance: f32) -> f32 {
    (0.5 - edge_distance).clamp(0.0, 1.0)
}

fn segment_distance(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq == 0.0 {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

impl DrawContext for RasterContext {
    fn size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }

    fn set_size(&mut self, size: Vec2) {
        self.width = size.x.max(0.0) as u32;
        self.height = size.y.max(0.0) as u32;
        self.pixels = vec![Vec4::ZERO; (self.width as usize) * (self.height as usize)];
    }

    fn clear_rect(&mut self, origin: Vec2, size: Vec2) {
        if let Some((x0, y0, x1, y1)) = self.clip(origin, origin + size) {
            for y in y0..y1 {
                let row = self.index(0, y);
                self.pixels[row + x0 as usize..row + x1 as usize].fill(Vec4::ZERO);
            }
        }
    }

    fn set_fill_color(&mut self, color: Vec3) {
        self.fill = color;
    }

    fn set_stroke_color(&mut self, color: Vec3) {
        self.stroke = color;
    }

    fn set_global_alpha(&mut self, alpha: f32) {
        self.alpha = alpha;
    }

    fn set_line_width(&mut self, width: f32) {
        self.line_width = width;
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32) {
        let reach = Vec2::splat(radius + 1.0);
        let Some((x0, y0, x1, y1)) = self.clip(center - reach, center + reach) else {
            return;
        };
        let color = self.fill;
        for y in y0..y1 {
            for x in x0..x1 {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                self.blend(x, y, color, coverage(p.distance(center) - radius));
            }
        }
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2) {
        let half = self.line_width * 0.5;
        let reach = Vec2::splat(half + 1.0);
        let Some((x0, y0, x1, y1)) = self.clip(from.min(to) - reach, from.max(to) + reach) else {
            return;
        };
        let color = self.stroke;
        for y in y0..y1 {
            for x in x0..x1 {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                self.blend(x, y, color, coverage(segment_distance(p, from, to) - half));
            }
        }
    }
}

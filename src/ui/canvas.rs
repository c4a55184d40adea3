/// Drawing surface: an RGB raster addressed in 800×600 logical units.
///
/// Shapes are rasterized by sampling pixel centres, so the same calls at
/// the same size always produce the same pixels. Text is not rasterized;
/// labels are kept as overlays for the terminal renderer to print.

use crate::domain::entity::{Rgb, SURFACE_H, SURFACE_W};

/// What the painter needs from a drawing surface.
pub trait Surface {
    fn clear(&mut self, color: Rgb);
    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgb);
    fn fill_ellipse(&mut self, cx: f32, cy: f32, rx: f32, ry: f32, color: Rgb);
    /// Closed polygon, even-odd fill.
    fn fill_polygon(&mut self, points: &[(f32, f32)], color: Rgb);
    fn fill_text_centered(&mut self, x: f32, y: f32, text: &str, color: Rgb);
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Label {
    /// Pixel column of the label's centre.
    pub px: usize,
    /// Pixel row of the baseline.
    pub py: usize,
    pub text: String,
    pub color: Rgb,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PixelCanvas {
    pub width: usize,
    pub height: usize,
    scale_x: f32,
    scale_y: f32,
    pixels: Vec<Rgb>,
    pub labels: Vec<Label>,
}

impl PixelCanvas {
    /// A raster of `width × height` pixels covering the whole logical surface.
    pub fn new(width: usize, height: usize) -> Self {
        PixelCanvas {
            width,
            height,
            scale_x: width as f32 / SURFACE_W,
            scale_y: height as f32 / SURFACE_H,
            pixels: vec![Rgb::new(0, 0, 0); width * height],
            labels: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn get(&self, px: usize, py: usize) -> Option<Rgb> {
        if px < self.width && py < self.height {
            Some(self.pixels[py * self.width + px])
        } else {
            None
        }
    }

    /// Pixel containing a logical point, if it is on the canvas.
    pub fn to_pixel(&self, x: f32, y: f32) -> Option<(usize, usize)> {
        if x < 0.0 || y < 0.0 {
            return None;
        }
        let px = (x * self.scale_x) as usize;
        let py = (y * self.scale_y) as usize;
        if px < self.width && py < self.height { Some((px, py)) } else { None }
    }

    /// Logical coordinate of a pixel centre.
    fn centre(&self, px: usize, py: usize) -> (f32, f32) {
        ((px as f32 + 0.5) / self.scale_x, (py as f32 + 0.5) / self.scale_y)
    }

    /// Pixel range covering a logical span, clipped to the canvas.
    fn span(lo: f32, hi: f32, scale: f32, limit: usize) -> std::ops::Range<usize> {
        let a = (lo * scale).floor().max(0.0) as usize;
        let b = ((hi * scale).ceil().max(0.0) as usize).min(limit);
        a.min(b)..b
    }

    fn put(&mut self, px: usize, py: usize, color: Rgb) {
        if px < self.width && py < self.height {
            self.pixels[py * self.width + px] = color;
        }
    }

    /// Shapes smaller than a pixel still leave a mark at their centre.
    fn dot(&mut self, x: f32, y: f32, color: Rgb) {
        if let Some((px, py)) = self.to_pixel(x, y) {
            self.put(px, py, color);
        }
    }
}

impl Surface for PixelCanvas {
    fn clear(&mut self, color: Rgb) {
        self.pixels.fill(color);
        self.labels.clear();
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgb) {
        if self.is_empty() {
            return;
        }
        let (x0, x1) = if w < 0.0 { (x + w, x) } else { (x, x + w) };
        let (y0, y1) = if h < 0.0 { (y + h, y) } else { (y, y + h) };
        let mut hit = false;
        for py in Self::span(y0, y1, self.scale_y, self.height) {
            for px in Self::span(x0, x1, self.scale_x, self.width) {
                let (cx, cy) = self.centre(px, py);
                if cx >= x0 && cx < x1 && cy >= y0 && cy < y1 {
                    self.put(px, py, color);
                    hit = true;
                }
            }
        }
        if !hit {
            self.dot((x0 + x1) / 2.0, (y0 + y1) / 2.0, color);
        }
    }

    fn fill_ellipse(&mut self, cx: f32, cy: f32, rx: f32, ry: f32, color: Rgb) {
        if self.is_empty() || rx <= 0.0 || ry <= 0.0 {
            return;
        }
        let mut hit = false;
        for py in Self::span(cy - ry, cy + ry, self.scale_y, self.height) {
            for px in Self::span(cx - rx, cx + rx, self.scale_x, self.width) {
                let (lx, ly) = self.centre(px, py);
                let dx = (lx - cx) / rx;
                let dy = (ly - cy) / ry;
                if dx * dx + dy * dy <= 1.0 {
                    self.put(px, py, color);
                    hit = true;
                }
            }
        }
        if !hit {
            self.dot(cx, cy, color);
        }
    }

    fn fill_polygon(&mut self, points: &[(f32, f32)], color: Rgb) {
        if self.is_empty() || points.len() < 3 {
            return;
        }
        let (mut min_x, mut max_x, mut min_y, mut max_y) = (f32::MAX, f32::MIN, f32::MAX, f32::MIN);
        for &(x, y) in points {
            min_x = min_x.min(x);
            max_x = max_x.max(x);
            min_y = min_y.min(y);
            max_y = max_y.max(y);
        }
        let mut hit = false;
        for py in Self::span(min_y, max_y, self.scale_y, self.height) {
            for px in Self::span(min_x, max_x, self.scale_x, self.width) {
                let (lx, ly) = self.centre(px, py);
                if point_in_polygon(lx, ly, points) {
                    self.put(px, py, color);
                    hit = true;
                }
            }
        }
        if !hit {
            self.dot((min_x + max_x) / 2.0, (min_y + max_y) / 2.0, color);
        }
    }

    fn fill_text_centered(&mut self, x: f32, y: f32, text: &str, color: Rgb) {
        if let Some((px, py)) = self.to_pixel(x, y) {
            self.labels.push(Label { px, py, text: text.to_string(), color });
        }
    }
}

/// Even-odd ray casting.
fn point_in_polygon(x: f32, y: f32, pts: &[(f32, f32)]) -> bool {
    let mut inside = false;
    let mut j = pts.len() - 1;
    for i in 0..pts.len() {
        let (xi, yi) = pts[i];
        let (xj, yj) = pts[j];
        if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Flatten a quadratic Bézier into `segments` points (start excluded).
pub fn quad_bezier(p0: (f32, f32), ctrl: (f32, f32), p1: (f32, f32), segments: usize) -> Vec<(f32, f32)> {
    let n = segments.max(1);
    (1..=n)
        .map(|i| {
            let t = i as f32 / n as f32;
            let u = 1.0 - t;
            (
                u * u * p0.0 + 2.0 * u * t * ctrl.0 + t * t * p1.0,
                u * u * p0.1 + 2.0 * u * t * ctrl.1 + t * t * p1.1,
            )
        })
        .collect()
}

// Drawing surface: an offscreen RGBA buffer plus pointer stroke state
//
// Mouse and touch input share the same three transitions. The last sampled
// position is tracked per stroke for both sources.

use base64::{engine::general_purpose, Engine};
use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_filled_circle_mut;

use crate::core::errors::SurfaceError;
use crate::utils::image_ops::{encode_png, resample};

/// Fixed buffer height; width follows the container
pub const SURFACE_HEIGHT: u32 = 300;
/// Ink line width in pixels
pub const STROKE_WEIGHT: f32 = 3.0;

pub const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);
pub const INK: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Maximum distance between stamps along a segment
const STAMP_SPACING: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Raw input as delivered by the host page
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    MouseDown(Point),
    MouseMove(Point),
    MouseUp,
    /// Active touches, first one drives the stroke
    TouchStart(Vec<Point>),
    TouchMove(Vec<Point>),
    TouchEnd,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StrokeState {
    Idle,
    Drawing { last: Point },
}

pub struct DrawingSurface {
    buffer: RgbaImage,
    state: StrokeState,
}

impl DrawingSurface {
    pub fn new(container_width: u32) -> Self {
        Self {
            buffer: RgbaImage::from_pixel(container_width.max(1), SURFACE_HEIGHT, BACKGROUND),
            state: StrokeState::Idle,
        }
    }

    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    pub fn buffer(&self) -> &RgbaImage {
        &self.buffer
    }

    pub fn state(&self) -> StrokeState {
        self.state
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self.state, StrokeState::Drawing { .. })
    }

    /// True when every pixel is background
    pub fn is_blank(&self) -> bool {
        self.buffer.pixels().all(|p| *p == BACKGROUND)
    }

    fn contains(&self, p: Point) -> bool {
        p.is_finite()
            && p.x >= 0.0
            && p.x <= self.width() as f32
            && p.y >= 0.0
            && p.y <= self.height() as f32
    }

    /// Start a stroke with a single dot. Ignored outside the surface.
    pub fn begin_stroke(&mut self, p: Point) -> bool {
        if !self.contains(p) {
            return false;
        }
        self.stamp(p);
        self.state = StrokeState::Drawing { last: p };
        true
    }

    /// Draw from the previous sample to `p`. No-op when idle or when `p`
    /// is not a finite position.
    pub fn extend_stroke(&mut self, p: Point) {
        if !p.is_finite() {
            return;
        }
        if let StrokeState::Drawing { last } = self.state {
            self.draw_segment(last, p);
            self.state = StrokeState::Drawing { last: p };
        }
    }

    pub fn end_stroke(&mut self) {
        self.state = StrokeState::Idle;
    }

    pub fn handle_input(&mut self, event: InputEvent) {
        match event {
            InputEvent::MouseDown(p) => {
                self.begin_stroke(p);
            }
            InputEvent::MouseMove(p) => self.extend_stroke(p),
            InputEvent::TouchStart(touches) => {
                if let Some(&p) = touches.first() {
                    self.begin_stroke(p);
                }
            }
            InputEvent::TouchMove(touches) => {
                if let Some(&p) = touches.first() {
                    self.extend_stroke(p);
                }
            }
            InputEvent::MouseUp | InputEvent::TouchEnd => self.end_stroke(),
        }
    }

    /// Reset to background. Stroke state is left alone.
    pub fn clear(&mut self) {
        for pixel in self.buffer.pixels_mut() {
            *pixel = BACKGROUND;
        }
    }

    /// Rebuild the buffer at `container_width` x `SURFACE_HEIGHT`, scaling
    /// existing ink into it.
    pub fn resize(&mut self, container_width: u32) {
        let width = container_width.max(1);
        if width == self.width() {
            return;
        }
        self.buffer = resample(&self.buffer, width, SURFACE_HEIGHT);
    }

    pub fn export_png(&self) -> Result<Vec<u8>, SurfaceError> {
        Ok(encode_png(&self.buffer)?)
    }

    /// `data:image/png;base64,...` as sent to the recognition endpoint
    pub fn export_data_uri(&self) -> Result<String, SurfaceError> {
        let png = self.export_png()?;
        Ok(format!(
            "data:image/png;base64,{}",
            general_purpose::STANDARD.encode(png)
        ))
    }

    fn stamp(&mut self, p: Point) {
        let radius = (STROKE_WEIGHT / 2.0).floor() as i32;
        draw_filled_circle_mut(
            &mut self.buffer,
            (p.x.round() as i32, p.y.round() as i32),
            radius,
            INK,
        );
    }

    /// Stamp along `from..to`, clipped to the buffer plus a stroke-width margin
    fn draw_segment(&mut self, from: Point, to: Point) {
        let margin = STROKE_WEIGHT as f64;
        let Some((from, to)) = clip_segment(
            from,
            to,
            (-margin, -margin),
            (self.width() as f64 + margin, self.height() as f64 + margin),
        ) else {
            return;
        };
        let (dx, dy) = (to.x - from.x, to.y - from.y);
        let steps = ((dx.hypot(dy) / STAMP_SPACING).ceil() as usize).max(1);
        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            self.stamp(Point::new(from.x + dx * t, from.y + dy * t));
        }
    }
}

/// Liang-Barsky clip of `from..to` against the box `min..max`.
/// Computed in f64 so far-off samples cannot overflow the deltas.
fn clip_segment(
    from: Point,
    to: Point,
    min: (f64, f64),
    max: (f64, f64),
) -> Option<(Point, Point)> {
    let (x0, y0) = (from.x as f64, from.y as f64);
    let (dx, dy) = (to.x as f64 - x0, to.y as f64 - y0);
    let (mut t0, mut t1) = (0.0_f64, 1.0_f64);

    for (p, q) in [
        (-dx, x0 - min.0),
        (dx, max.0 - x0),
        (-dy, y0 - min.1),
        (dy, max.1 - y0),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }

    let at = |t: f64| Point::new((x0 + dx * t) as f32, (y0 + dy * t) as f32);
    Some((at(t0), at(t1)))
}

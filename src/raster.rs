use crate::canvas::Command;
use crate::error::AwesomeTableError;
use crate::font::{GlyphPlacement, TextPaint};
use crate::types::{BBox, Color, Point, Size};
use base64::Engine;
use image::{DynamicImage, GrayImage, Luma, Rgba, RgbaImage, RgbImage};
use std::path::Path as FsPath;
use tiny_skia::{
    FillRule, LineCap, LineJoin, Paint, Path, PathBuilder, Pixmap, Rect, Stroke, Transform,
};
use ttf_parser::{GlyphId, OutlineBuilder};

#[derive(Clone)]
struct RasterState {
    fill_color: Color,
    line_width: u32,
}

impl Default for RasterState {
    fn default() -> Self {
        Self {
            fill_color: Color::BLACK,
            line_width: 1,
        }
    }
}

/// Replays a command list onto a transparent raster of `size`.
pub fn rasterize(size: Size, commands: &[Command]) -> Result<RgbaImage, AwesomeTableError> {
    let mut pixmap = Pixmap::new(size.width, size.height).ok_or_else(|| {
        AwesomeTableError::InvalidConfiguration(format!(
            "invalid raster size {}x{}",
            size.width, size.height
        ))
    })?;
    render_commands(&mut pixmap, commands)?;
    Ok(pixmap_to_rgba(&pixmap))
}

fn render_commands(pixmap: &mut Pixmap, commands: &[Command]) -> Result<(), AwesomeTableError> {
    let mut state = RasterState::default();
    for command in commands {
        match command {
            Command::SetFillColor(color) => state.fill_color = *color,
            Command::SetLineWidth(width) => state.line_width = *width,
            Command::DrawLine { start, end } => {
                if let Some(bbox) = line_pixels(*start, *end, state.line_width) {
                    fill_pixels(pixmap, bbox, state.fill_color);
                }
            }
            Command::FillRect(bbox) => fill_pixels(pixmap, *bbox, state.fill_color),
            Command::DrawText {
                xy,
                text,
                face,
                anchor,
                stroke_width,
                stroke_fill,
            } => {
                let paint = TextPaint {
                    fill: state.fill_color,
                    anchor: *anchor,
                    stroke_width: *stroke_width,
                    stroke_fill: *stroke_fill,
                };
                face.draw(pixmap, *xy, text, &paint)?;
            }
        }
    }
    Ok(())
}

/// Pixel box covered by an axis-aligned segment of `width`. Both endpoints
/// are painted; thickness is centred on the segment, extra pixel after.
pub(crate) fn line_pixels(start: Point, end: Point, width: u32) -> Option<BBox> {
    if width == 0 {
        return None;
    }
    let w = width as i32;
    let before = (w - 1) / 2;
    if start.y == end.y {
        let (x0, x1) = (start.x.min(end.x), start.x.max(end.x));
        Some(BBox::new(x0, start.y - before, x1 + 1, start.y - before + w))
    } else if start.x == end.x {
        let (y0, y1) = (start.y.min(end.y), start.y.max(end.y));
        Some(BBox::new(start.x - before, y0, start.x - before + w, y1 + 1))
    } else {
        None
    }
}

fn fill_pixels(pixmap: &mut Pixmap, bbox: BBox, color: Color) {
    if color.a == 0 {
        return;
    }
    let Some(rect) = Rect::from_ltrb(
        bbox.left as f32,
        bbox.top as f32,
        bbox.right as f32,
        bbox.bottom as f32,
    ) else {
        return;
    };
    let mut paint = fill_paint(color);
    paint.anti_alias = false;
    pixmap.fill_rect(rect, &paint, Transform::identity(), None);
}

/// Fills (and optionally strokes first) the outlines of a laid out glyph
/// run. Returns the number of glyphs that produced a path.
pub(crate) fn fill_glyph_outlines(
    pixmap: &mut Pixmap,
    face: &ttf_parser::Face<'_>,
    placements: &[GlyphPlacement],
    fill: Color,
    stroke: Option<(f32, Color)>,
) -> usize {
    let paths: Vec<Path> = placements
        .iter()
        .filter_map(|placement| {
            let mut builder =
                GlyphPathBuilder::new(placement.origin_x, placement.origin_y, placement.scale);
            face.outline_glyph(GlyphId(placement.glyph_id), &mut builder)?;
            builder.finish()
        })
        .collect();

    if let Some((width, color)) = stroke {
        let mut sk_stroke = Stroke::default();
        sk_stroke.width = width.max(0.0);
        sk_stroke.line_cap = LineCap::Round;
        sk_stroke.line_join = LineJoin::Round;
        let paint = fill_paint(color);
        for path in &paths {
            pixmap.stroke_path(path, &paint, &sk_stroke, Transform::identity(), None);
        }
    }

    let paint = fill_paint(fill);
    for path in &paths {
        pixmap.fill_path(path, &paint, FillRule::Winding, Transform::identity(), None);
    }
    paths.len()
}

/// Glyph outline sink; font units are y-up, the raster is y-down.
struct GlyphPathBuilder {
    builder: PathBuilder,
    origin_x: f32,
    origin_y: f32,
    scale: f32,
}

impl GlyphPathBuilder {
    fn new(origin_x: f32, origin_y: f32, scale: f32) -> Self {
        Self {
            builder: PathBuilder::new(),
            origin_x,
            origin_y,
            scale,
        }
    }

    fn x(&self, x: f32) -> f32 {
        self.origin_x + x * self.scale
    }

    fn y(&self, y: f32) -> f32 {
        self.origin_y - y * self.scale
    }

    fn finish(self) -> Option<Path> {
        self.builder.finish()
    }
}

impl OutlineBuilder for GlyphPathBuilder {
    fn move_to(&mut self, x: f32, y: f32) {
        let (x, y) = (self.x(x), self.y(y));
        self.builder.move_to(x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let (x, y) = (self.x(x), self.y(y));
        self.builder.line_to(x, y);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let (x1, y1, x, y) = (self.x(x1), self.y(y1), self.x(x), self.y(y));
        self.builder.quad_to(x1, y1, x, y);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let (x1, y1) = (self.x(x1), self.y(y1));
        let (x2, y2) = (self.x(x2), self.y(y2));
        let (x, y) = (self.x(x), self.y(y));
        self.builder.cubic_to(x1, y1, x2, y2, x, y);
    }

    fn close(&mut self) {
        self.builder.close();
    }
}

fn fill_paint(color: Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(to_sk_color(color));
    paint.anti_alias = true;
    paint
}

fn to_sk_color(color: Color) -> tiny_skia::Color {
    tiny_skia::Color::from_rgba8(color.r, color.g, color.b, color.a)
}

fn pixmap_to_rgba(pixmap: &Pixmap) -> RgbaImage {
    let mut out = RgbaImage::new(pixmap.width(), pixmap.height());
    for (src, dst) in pixmap.pixels().iter().zip(out.pixels_mut()) {
        let c = src.demultiply();
        *dst = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
    }
    out
}

pub fn blank(size: Size, fill: Color) -> RgbaImage {
    RgbaImage::from_pixel(size.width, size.height, Rgba(fill.to_array()))
}

/// Copies `src` onto `dst` with its top-left at `at`, clipped to `dst`.
/// With a mask every channel is blended as `src * m + dst * (255 - m)`.
pub fn paste(
    dst: &mut RgbaImage,
    src: &RgbaImage,
    at: Point,
    mask: Option<&GrayImage>,
) -> Result<(), AwesomeTableError> {
    if let Some(mask) = mask {
        if mask.dimensions() != src.dimensions() {
            return Err(AwesomeTableError::Image(format!(
                "mask is {}x{} but image is {}x{}",
                mask.width(),
                mask.height(),
                src.width(),
                src.height()
            )));
        }
    }
    let (dst_w, dst_h) = (dst.width() as i64, dst.height() as i64);
    for (sx, sy, px) in src.enumerate_pixels() {
        let dx = at.x as i64 + sx as i64;
        let dy = at.y as i64 + sy as i64;
        if dx < 0 || dy < 0 || dx >= dst_w || dy >= dst_h {
            continue;
        }
        let target = dst.get_pixel_mut(dx as u32, dy as u32);
        match mask {
            None => *target = *px,
            Some(mask) => {
                let m = mask.get_pixel(sx, sy).0[0];
                for c in 0..4 {
                    target.0[c] = blend(px.0[c], target.0[c], m);
                }
            }
        }
    }
    Ok(())
}

fn blend(src: u8, dst: u8, mask: u8) -> u8 {
    let tmp = src as u32 * mask as u32 + dst as u32 * (255 - mask as u32) + 128;
    (((tmp >> 8) + tmp) >> 8) as u8
}

/// Region of `img` inside `bbox`, clipped to the image bounds.
pub fn crop(img: &RgbaImage, bbox: BBox) -> RgbaImage {
    let left = bbox.left.clamp(0, img.width() as i32) as u32;
    let top = bbox.top.clamp(0, img.height() as i32) as u32;
    let right = bbox.right.clamp(left as i32, img.width() as i32) as u32;
    let bottom = bbox.bottom.clamp(top as i32, img.height() as i32) as u32;
    image::imageops::crop_imm(img, left, top, right - left, bottom - top).to_image()
}

pub fn alpha_channel(img: &RgbaImage) -> GrayImage {
    GrayImage::from_fn(img.width(), img.height(), |x, y| {
        Luma([img.get_pixel(x, y).0[3]])
    })
}

/// Drops the alpha channel without compositing.
pub fn flatten_rgb(img: &RgbaImage) -> RgbImage {
    DynamicImage::ImageRgba8(img.clone()).to_rgb8()
}

/// Writes `img` as RGB; the format follows the file extension.
pub fn save(img: &RgbaImage, path: &FsPath) -> Result<(), AwesomeTableError> {
    flatten_rgb(img).save(path)?;
    Ok(())
}

/// Decodes an image from a file path or a `data:` URI.
pub fn load_image(source: &str) -> Result<DynamicImage, AwesomeTableError> {
    if let Some((mime, data)) = parse_data_uri(source) {
        return decode_image(&data, Some(&mime));
    }
    let bytes = std::fs::read(FsPath::new(source))?;
    decode_image(&bytes, None)
}

pub fn decode_image(data: &[u8], mime: Option<&str>) -> Result<DynamicImage, AwesomeTableError> {
    let guessed_format = if let Some(mime) = mime {
        if mime.contains("png") {
            Some(image::ImageFormat::Png)
        } else if mime.contains("jpeg") || mime.contains("jpg") {
            Some(image::ImageFormat::Jpeg)
        } else {
            None
        }
    } else {
        image::guess_format(data).ok()
    };

    let decoded = match guessed_format {
        Some(fmt) => image::load_from_memory_with_format(data, fmt)?,
        None => image::load_from_memory(data)?,
    };
    Ok(decoded)
}

fn parse_data_uri(uri: &str) -> Option<(String, Vec<u8>)> {
    if !uri.starts_with("data:") {
        return None;
    }
    let (header, payload) = uri.split_once(',')?;
    let mime = header
        .trim_start_matches("data:")
        .split(';')
        .next()
        .filter(|v| !v.is_empty())
        .unwrap_or("application/octet-stream")
        .to_string();
    let data = if header.contains(";base64") {
        base64::engine::general_purpose::STANDARD
            .decode(payload)
            .ok()?
    } else {
        payload.as_bytes().to_vec()
    };
    Some((mime, data))
}

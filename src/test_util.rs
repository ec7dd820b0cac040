use crate::error::AwesomeTableError;
use crate::font::{FontCache, FontFace, FontProvider, TextExtent, TextPaint, anchor_offset};
use crate::types::{Color, Point};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use tiny_skia::{Paint, Pixmap, Rect as SkRect, Transform};

/// Deterministic face for tests: every char advances `size / 2`, ink spans
/// 4/5 of the size above the baseline and 1/5 below, and each
/// non-whitespace char paints a solid block.
#[derive(Debug, Clone)]
pub(crate) struct BlockFont {
    pub(crate) name: String,
    pub(crate) size: u32,
}

impl BlockFont {
    pub(crate) fn new(size: u32) -> Self {
        Self {
            name: "block.ttf".to_string(),
            size,
        }
    }
}

impl FontFace for BlockFont {
    fn name(&self) -> &str {
        &self.name
    }

    fn size(&self) -> u32 {
        self.size
    }

    fn extent(&self, text: &str) -> TextExtent {
        let size = self.size as f32;
        let ascent = size * 0.8;
        let descent = size * 0.2;
        TextExtent {
            advance: text.chars().count() as f32 * size / 2.0,
            ink_top: -ascent,
            ink_bottom: descent,
            ascender: -ascent,
            descender: descent,
        }
    }

    fn draw(
        &self,
        pixmap: &mut Pixmap,
        xy: Point,
        text: &str,
        paint: &TextPaint,
    ) -> Result<(), AwesomeTableError> {
        let extent = self.extent(text);
        let (ax, ay) = anchor_offset(&extent, paint.anchor);
        let origin_x = xy.x as f32 - ax;
        let origin_y = xy.y as f32 - ay;
        let advance = self.size as f32 / 2.0;
        let sw = paint.stroke_width as f32;
        for (idx, ch) in text.chars().enumerate() {
            if ch.is_whitespace() {
                continue;
            }
            let left = origin_x + idx as f32 * advance;
            let top = origin_y + extent.ink_top;
            let height = extent.ink_bottom - extent.ink_top;
            if sw > 0.0 {
                let stroke = paint.stroke_fill.unwrap_or(paint.fill);
                fill_block(pixmap, left - sw, top - sw, advance + 2.0 * sw, height + 2.0 * sw, stroke);
            }
            fill_block(pixmap, left, top, advance, height, paint.fill);
        }
        Ok(())
    }
}

fn fill_block(pixmap: &mut Pixmap, x: f32, y: f32, w: f32, h: f32, color: Color) {
    let Some(rect) = SkRect::from_xywh(x, y, w, h) else {
        return;
    };
    let mut paint = Paint::default();
    paint.set_color_rgba8(color.r, color.g, color.b, color.a);
    paint.anti_alias = false;
    pixmap.fill_rect(rect, &paint, Transform::identity(), None);
}

/// Serves [`BlockFont`] for any name starting with `block`.
#[derive(Default)]
pub(crate) struct BlockFontProvider {
    loads: Arc<AtomicUsize>,
}

impl BlockFontProvider {
    pub(crate) fn load_counter(&self) -> Arc<AtomicUsize> {
        self.loads.clone()
    }
}

impl FontProvider for BlockFontProvider {
    fn load(&self, font: &str, size: u32) -> Result<Arc<dyn FontFace>, AwesomeTableError> {
        if !font.starts_with("block") {
            return Err(AwesomeTableError::FontNotFound(font.to_string()));
        }
        if size == 0 {
            return Err(AwesomeTableError::Font("font size must be > 0".to_string()));
        }
        self.loads.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(BlockFont {
            name: font.to_string(),
            size,
        }))
    }
}

pub(crate) fn block_fonts() -> Arc<FontCache> {
    Arc::new(FontCache::new(BlockFontProvider::default()))
}

/// Unique path under the system temp dir.
pub(crate) fn temp_path(name: &str) -> PathBuf {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let n = COUNTER.fetch_add(1, Ordering::SeqCst);
    std::env::temp_dir().join(format!("awesometable_{}_{n}_{name}", std::process::id()))
}

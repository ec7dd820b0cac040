mod canvas;
mod cell;
mod debug;
mod error;
mod font;
mod geometry;
mod image_data;
mod image_info;
mod label;
mod layer;
mod line;
mod perf;
pub mod raster;
mod table;
#[cfg(test)]
mod test_util;
mod text;
mod types;

pub use canvas::{Canvas, Command};
pub use cell::{Cell, CellState};
use debug::DebugLogger;
pub use error::AwesomeTableError;
pub use font::{
    CacheStats, FileFontProvider, FontCache, FontFace, FontKey, FontProvider, TextExtent,
    TextPaint, TrueTypeFont, anchor_offset, anchored_bbox,
};
pub use geometry::{EdgeStyle, Rect};
pub use image_data::{ImageData, SceneDict};
pub use image_info::{ImageInfo, Placement};
pub use label::{Label, LabelKey};
pub use layer::{Drawable, Layer};
pub use line::{Line, LineMode};
use perf::PerfLogger;
use std::path::PathBuf;
use std::sync::Arc;
pub use table::Table;
pub use text::{DEFAULT_FONT, DEFAULT_FONT_SIZE, Text, TextStyle, draw_text};
pub use types::{Anchor, BBox, Color, Horizontal, Point, Size, Vertical};

/// Configures fonts and logging for an [`ImageData`] scene.
pub struct ImageDataBuilder {
    font_dirs: Vec<PathBuf>,
    shape_text: bool,
    font_cache_capacity: Option<usize>,
    fonts: Option<Arc<FontCache>>,
    debug_path: Option<PathBuf>,
    perf_enabled: bool,
    perf_path: Option<PathBuf>,
}

impl Default for ImageDataBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageDataBuilder {
    pub fn new() -> Self {
        Self {
            font_dirs: Vec::new(),
            shape_text: true,
            font_cache_capacity: None,
            fonts: None,
            debug_path: None,
            perf_enabled: false,
            perf_path: None,
        }
    }

    pub fn register_font_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.font_dirs.push(path.into());
        self
    }

    // Shape text with rustybuzz before measuring/drawing (default on).
    pub fn shape_text(mut self, enabled: bool) -> Self {
        self.shape_text = enabled;
        self
    }

    // Bound the font cache; oldest entries are evicted first.
    pub fn font_cache_capacity(mut self, max_entries: usize) -> Self {
        self.font_cache_capacity = Some(max_entries);
        self
    }

    // Share an existing cache (and its provider) instead of building one.
    pub fn fonts(mut self, fonts: Arc<FontCache>) -> Self {
        self.fonts = Some(fonts);
        self
    }

    pub fn debug_log(mut self, path: impl Into<PathBuf>) -> Self {
        self.debug_path = Some(path.into());
        self
    }

    // Enable performance logging to a JSONL file for timing/counter inspection.
    pub fn perf_log(mut self, path: impl Into<PathBuf>) -> Self {
        self.perf_enabled = true;
        self.perf_path = Some(path.into());
        self
    }

    // Toggle performance logging (uses default file when enabled and no path is set).
    pub fn perf(mut self, enabled: bool) -> Self {
        self.perf_enabled = enabled;
        self
    }

    fn validate(&self, size: Size) -> Result<(), AwesomeTableError> {
        if size.is_empty() {
            return Err(AwesomeTableError::InvalidConfiguration(format!(
                "canvas must be non-empty, got {}x{}",
                size.width, size.height
            )));
        }
        if self.font_cache_capacity == Some(0) {
            return Err(AwesomeTableError::InvalidConfiguration(
                "font_cache_capacity must be > 0".to_string(),
            ));
        }
        if self.fonts.is_some() && (!self.font_dirs.is_empty() || self.font_cache_capacity.is_some())
        {
            return Err(AwesomeTableError::InvalidConfiguration(
                "fonts() cannot be combined with register_font_dir or font_cache_capacity"
                    .to_string(),
            ));
        }
        Ok(())
    }

    pub fn build(self, background: image::RgbaImage) -> Result<ImageData, AwesomeTableError> {
        self.validate(Size::new(background.width(), background.height()))?;
        let debug = if let Some(path) = self.debug_path {
            Some(Arc::new(DebugLogger::new(path)?))
        } else {
            None
        };
        let perf = if self.perf_enabled || self.perf_path.is_some() {
            let path = self
                .perf_path
                .unwrap_or_else(|| PathBuf::from("awesometable_perf.log"));
            Some(Arc::new(PerfLogger::new(path)?))
        } else {
            None
        };
        let fonts = match self.fonts {
            Some(fonts) => fonts,
            None => {
                let mut provider = FileFontProvider::new().shape_text(self.shape_text);
                // Registered directories are searched in registration order.
                for dir in self.font_dirs.into_iter().rev() {
                    provider = provider.with_font_dir(dir);
                }
                let mut cache = FontCache::new(provider).with_debug(debug.clone());
                if let Some(max_entries) = self.font_cache_capacity {
                    cache = cache.with_capacity_limit(max_entries);
                }
                Arc::new(cache)
            }
        };
        Ok(ImageData::new(background, fonts).with_loggers(debug, perf))
    }

    pub fn build_blank(self, size: Size, fill: Color) -> Result<ImageData, AwesomeTableError> {
        self.validate(size)?;
        self.build(raster::blank(size, fill))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{block_fonts, temp_path};

    #[test]
    fn builder_rejects_empty_canvas() {
        let err = match ImageData::builder()
            .fonts(block_fonts())
            .build_blank(Size::new(0, 10), Color::WHITE)
        {
            Ok(_) => panic!("empty canvas should be rejected"),
            Err(err) => err,
        };
        assert!(matches!(err, AwesomeTableError::InvalidConfiguration(_)));
    }

    #[test]
    fn builder_rejects_zero_cache_capacity() {
        let result = ImageData::builder()
            .font_cache_capacity(0)
            .build_blank(Size::new(4, 4), Color::WHITE);
        assert!(matches!(
            result,
            Err(AwesomeTableError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn builder_rejects_injected_cache_with_font_dirs() {
        let result = ImageData::builder()
            .fonts(block_fonts())
            .register_font_dir("/usr/share/fonts")
            .build_blank(Size::new(4, 4), Color::WHITE);
        assert!(matches!(
            result,
            Err(AwesomeTableError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn builder_shares_injected_cache() {
        let fonts = block_fonts();
        let data = ImageData::builder()
            .fonts(fonts.clone())
            .build_blank(Size::new(8, 6), Color::WHITE)
            .unwrap();
        assert!(Arc::ptr_eq(data.fonts(), &fonts));
        assert_eq!(data.size(), Size::new(8, 6));
        assert_eq!(data.background().get_pixel(7, 5).0, Color::WHITE.to_array());
    }

    #[test]
    fn debug_and_perf_logs_record_a_save() {
        let debug_path = temp_path("scene_debug.jsonl");
        let perf_path = temp_path("scene_perf.jsonl");
        let image_path = temp_path("scene_logged.png");
        {
            let mut data = ImageData::builder()
                .fonts(block_fonts())
                .debug_log(&debug_path)
                .perf_log(&perf_path)
                .build_blank(Size::new(40, 20), Color::WHITE)
                .unwrap();
            data.text(
                Point::new(1, 1),
                "ok",
                &TextStyle::default().with_font("block.ttf", 10),
            )
            .unwrap();
            data.save(&image_path).unwrap();
        }

        let debug = std::fs::read_to_string(&debug_path).unwrap();
        assert!(debug.contains("\"type\":\"layer.render\",\"name\":\"lines\""));
        assert!(debug.contains("\"type\":\"layer.render\",\"name\":\"texts\""));
        assert!(debug.contains(
            "\"type\":\"debug.summary\",\"context\":\"scene.save\",\"counts\":{\"label.emit\":1,\"layer.render\":2}"
        ));

        let perf = std::fs::read_to_string(&perf_path).unwrap();
        assert!(perf.contains("\"name\":\"image.save\""));
        assert!(perf.contains("\"name\":\"layer.texts\""));
        let hot_path = perf_path.with_file_name(format!(
            "{}_hot.log",
            perf_path.file_stem().unwrap().to_string_lossy()
        ));
        assert!(hot_path.exists());

        for path in [
            &debug_path,
            &perf_path,
            &hot_path,
            &image_path,
            &image_path.with_extension("txt"),
        ] {
            let _ = std::fs::remove_file(path);
        }
    }
}

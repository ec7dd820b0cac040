use crate::debug::DebugLogger;
use crate::error::AwesomeTableError;
use crate::font::FontCache;
use crate::image_info::{ImageInfo, Placement};
use crate::label::Label;
use crate::layer::{Drawable, Layer};
use crate::line::{Line, LineMode};
use crate::perf::PerfLogger;
use crate::raster;
use crate::table::Table;
use crate::text::{Text, TextStyle, draw_text};
use crate::types::{Color, Point, Size};
use crate::ImageDataBuilder;
use image::{DynamicImage, GrayImage, RgbaImage};
use sha2::{Digest, Sha256};
use std::fmt::Write as _;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

const TEXT_LAYER: &str = "texts";
const LINE_LAYER: &str = "lines";

/// Structured export of a scene: the composite plus parallel label and
/// point lists (four points per label).
#[derive(Debug, Clone)]
pub struct SceneDict {
    pub image: RgbaImage,
    pub label: Vec<String>,
    pub point: Vec<Point>,
}

/// Top-level scene: a background plus free texts, lines, images and
/// tables. Nothing is cached; every raster accessor re-renders.
pub struct ImageData {
    background: RgbaImage,
    size: Size,
    texts: Vec<Text>,
    lines: Vec<Line>,
    images: Vec<ImageInfo>,
    tables: Vec<Table>,
    fonts: Arc<FontCache>,
    debug: Option<Arc<DebugLogger>>,
    perf: Option<Arc<PerfLogger>>,
}

impl ImageData {
    pub fn builder() -> ImageDataBuilder {
        ImageDataBuilder::new()
    }

    pub fn new(background: RgbaImage, fonts: Arc<FontCache>) -> Self {
        let size = Size::new(background.width(), background.height());
        Self {
            background,
            size,
            texts: Vec::new(),
            lines: Vec::new(),
            images: Vec::new(),
            tables: Vec::new(),
            fonts,
            debug: None,
            perf: None,
        }
    }

    pub fn blank(size: Size, fill: Color, fonts: Arc<FontCache>) -> Self {
        Self::new(raster::blank(size, fill), fonts)
    }

    pub(crate) fn with_loggers(
        mut self,
        debug: Option<Arc<DebugLogger>>,
        perf: Option<Arc<PerfLogger>>,
    ) -> Self {
        self.debug = debug;
        self.perf = perf;
        self
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn background(&self) -> &RgbaImage {
        &self.background
    }

    pub fn fonts(&self) -> &Arc<FontCache> {
        &self.fonts
    }

    pub fn texts(&self) -> &[Text] {
        &self.texts
    }

    pub fn texts_mut(&mut self) -> &mut [Text] {
        &mut self.texts
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn images(&self) -> &[ImageInfo] {
        &self.images
    }

    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    pub fn tables_mut(&mut self) -> &mut [Table] {
        &mut self.tables
    }

    /// Adds a free text through whitespace-trimming placement.
    pub fn text(
        &mut self,
        pos: Point,
        content: &str,
        style: &TextStyle,
    ) -> Result<&mut Text, AwesomeTableError> {
        let text = draw_text(pos, content, style, &self.fonts)?;
        Ok(self.push_text(text))
    }

    pub fn push_text(&mut self, text: Text) -> &mut Text {
        self.texts.push(text);
        let last = self.texts.len() - 1;
        &mut self.texts[last]
    }

    /// Adds a free line; `mode` is `s`, `d` or `s<dash>d<gap>`.
    pub fn line(
        &mut self,
        start: Point,
        end: Point,
        width: u32,
        fill: Color,
        mode: &str,
    ) -> Result<(), AwesomeTableError> {
        let mode: LineMode = mode.parse()?;
        self.push_line(
            Line::new(start, end)
                .with_width(width)
                .with_fill(fill)
                .with_mode(mode),
        );
        Ok(())
    }

    pub fn push_line(&mut self, line: Line) {
        self.lines.push(line);
    }

    pub fn paste(&mut self, image: DynamicImage, placement: Placement, mask: Option<GrayImage>) {
        self.images.push(ImageInfo::new(image, placement, mask));
    }

    pub fn push_image(&mut self, image: ImageInfo) {
        self.images.push(image);
    }

    pub fn push_table(&mut self, table: Table) -> &mut Table {
        self.tables.push(table);
        let last = self.tables.len() - 1;
        &mut self.tables[last]
    }

    /// Every text of every table cell (merged-away cells included), then
    /// the free texts.
    pub fn text_layer(&self) -> Layer<'_> {
        let mut layer = Layer::new(TEXT_LAYER, 0, self.size);
        for table in &self.tables {
            for cell in table.iter() {
                for text in cell.texts() {
                    layer.push(Drawable::Text(text));
                }
            }
        }
        for text in &self.texts {
            layer.push(Drawable::Text(text));
        }
        layer
    }

    /// Visible cells' fill and borders, each explicitly set table outline,
    /// then the free lines.
    pub fn line_layer(&self) -> Layer<'_> {
        let mut layer = Layer::new(LINE_LAYER, 1, self.size);
        for table in &self.tables {
            for cell in table.iter().filter(|cell| cell.visible()) {
                if let Some(fill) = cell.fill() {
                    layer.push(Drawable::Fill(cell.bbox(), fill));
                }
                for line in cell.rect().lines() {
                    layer.push(Drawable::Line(line));
                }
            }
            if table.has_outline() {
                for line in table.rect().lines() {
                    layer.push(Drawable::Line(line));
                }
            }
        }
        for line in &self.lines {
            layer.push(Drawable::Line(line));
        }
        layer
    }

    fn render_layer(&self, layer: &Layer<'_>) -> Result<RgbaImage, AwesomeTableError> {
        layer.render_with(self.debug.as_deref(), self.perf.as_deref())
    }

    pub fn text_image(&self) -> Result<RgbaImage, AwesomeTableError> {
        self.render_layer(&self.text_layer())
    }

    pub fn line_image(&self) -> Result<RgbaImage, AwesomeTableError> {
        self.render_layer(&self.line_layer())
    }

    /// Lines first, text pasted over them through its own alpha.
    pub fn doc_image(&self) -> Result<RgbaImage, AwesomeTableError> {
        let mut doc = self.line_image()?;
        let text = self.text_image()?;
        let mask = raster::alpha_channel(&text);
        raster::paste(&mut doc, &text, Point::ORIGIN, Some(&mask))?;
        Ok(doc)
    }

    /// Background, then the document layers, then every pasted image.
    pub fn image(&self) -> Result<RgbaImage, AwesomeTableError> {
        let started = Instant::now();
        let mut out = self.background.clone();
        let doc = self.doc_image()?;
        let doc_mask = raster::alpha_channel(&doc);
        raster::paste(&mut out, &doc, Point::ORIGIN, Some(&doc_mask))?;
        for info in &self.images {
            raster::paste(&mut out, info.image(), info.topleft(), info.mask())?;
        }
        if let Some(perf) = self.perf.as_deref() {
            perf.log_since("image.compose", started);
        }
        Ok(out)
    }

    pub fn mask(&self) -> Result<GrayImage, AwesomeTableError> {
        Ok(raster::alpha_channel(&self.image()?))
    }

    /// Free-text labels in insertion order, then each table's labels.
    pub fn labels(&self) -> Vec<Label> {
        let mut labels: Vec<Label> = self.texts.iter().map(Text::label).collect();
        for table in &self.tables {
            labels.extend(table.labels());
        }
        if let Some(debug) = self.debug.as_deref() {
            debug.increment("label.emit", labels.len() as u64);
        }
        labels
    }

    pub fn as_dict(&self) -> Result<SceneDict, AwesomeTableError> {
        let image = self.image()?;
        let labels = self.labels();
        let label = labels.iter().map(Label::key_content).collect();
        let point = labels.iter().flat_map(|l| l.quad).collect();
        Ok(SceneDict {
            image,
            label,
            point,
        })
    }

    /// Writes the composite as RGB to `path` and the labels to a sidecar
    /// with the same stem and a `.txt` extension.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), AwesomeTableError> {
        let path = path.as_ref();
        let started = Instant::now();
        let image = self.image()?;
        raster::save(&image, path)?;

        let filename = path.display().to_string();
        let labels = self.labels();
        let mut sidecar = String::new();
        for label in &labels {
            let _ = writeln!(&mut sidecar, "{filename};{label}");
        }
        std::fs::write(sidecar_path(path), sidecar)?;

        if let Some(perf) = self.perf.as_deref() {
            perf.log_since("image.save", started);
            perf.log_counts(
                "scene",
                &[
                    ("texts", self.texts.len() as u64),
                    ("lines", self.lines.len() as u64),
                    ("images", self.images.len() as u64),
                    ("tables", self.tables.len() as u64),
                    ("labels", labels.len() as u64),
                ],
            );
            perf.flush();
        }
        if let Some(debug) = self.debug.as_deref() {
            debug.log_event("scene.save", &filename, &[("labels", labels.len() as u64)]);
            debug.emit_summary("scene.save");
            debug.flush();
        }
        Ok(())
    }

    /// SHA-256 over the composite pixels and the label lines.
    pub fn fingerprint(&self) -> Result<String, AwesomeTableError> {
        let image = self.image()?;
        let mut hasher = Sha256::new();
        hasher.update(image.width().to_le_bytes());
        hasher.update(image.height().to_le_bytes());
        hasher.update(image.as_raw());
        for label in self.labels() {
            hasher.update(label.to_string().as_bytes());
            hasher.update(b"\n");
        }
        let digest = hasher.finalize();
        let mut out = String::with_capacity(digest.len() * 2);
        for b in digest {
            let _ = write!(&mut out, "{:02x}", b);
        }
        Ok(out)
    }
}

pub(crate) fn sidecar_path(path: &Path) -> std::path::PathBuf {
    path.with_extension("txt")
}

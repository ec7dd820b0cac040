use crate::canvas::{Canvas, Command};
use crate::debug::DebugLogger;
use crate::error::AwesomeTableError;
use crate::line::Line;
use crate::perf::PerfLogger;
use crate::raster;
use crate::text::Text;
use crate::types::{BBox, Color, Size};
use image::RgbaImage;

#[derive(Debug, Clone, Copy)]
pub enum Drawable<'a> {
    Text(&'a Text),
    Line(&'a Line),
    Fill(BBox, Color),
}

impl Drawable<'_> {
    fn render(&self, canvas: &mut Canvas) -> Result<(), AwesomeTableError> {
        match self {
            Drawable::Text(text) => text.render(canvas),
            Drawable::Line(line) => line.render(canvas),
            Drawable::Fill(bbox, color) => {
                canvas.set_fill_color(*color);
                canvas.fill_rect(*bbox);
                Ok(())
            }
        }
    }
}

/// Transient, ordered view over scene items; rendered in insertion order
/// onto a fresh transparent raster each time.
#[derive(Debug, Clone)]
pub struct Layer<'a> {
    name: String,
    index: usize,
    size: Size,
    items: Vec<Drawable<'a>>,
}

impl<'a> Layer<'a> {
    pub fn new(name: impl Into<String>, index: usize, size: Size) -> Self {
        Self {
            name: name.into(),
            index,
            size,
            items: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn push(&mut self, item: Drawable<'a>) {
        self.items.push(item);
    }

    pub fn items(&self) -> &[Drawable<'a>] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Command list for the whole layer. Fails on the first item that
    /// cannot be drawn.
    pub fn record(&self) -> Result<Vec<Command>, AwesomeTableError> {
        let mut canvas = Canvas::new(self.size);
        for item in &self.items {
            item.render(&mut canvas)?;
        }
        Ok(canvas.finish())
    }

    pub fn render(&self) -> Result<RgbaImage, AwesomeTableError> {
        self.render_with(None, None)
    }

    pub(crate) fn render_with(
        &self,
        debug: Option<&DebugLogger>,
        perf: Option<&PerfLogger>,
    ) -> Result<RgbaImage, AwesomeTableError> {
        let started = std::time::Instant::now();
        let commands = self.record()?;
        let image = raster::rasterize(self.size, &commands)?;
        if let Some(perf) = perf {
            perf.log_since(&format!("layer.{}", self.name), started);
        }
        if let Some(debug) = debug {
            debug.increment("layer.render", 1);
            debug.log_event(
                "layer.render",
                &self.name,
                &[
                    ("index", self.index as u64),
                    ("items", self.items.len() as u64),
                    ("commands", commands.len() as u64),
                ],
            );
        }
        Ok(image)
    }
}

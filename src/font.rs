use crate::debug::DebugLogger;
use crate::error::AwesomeTableError;
use crate::raster;
use crate::types::{Anchor, BBox, Color, Horizontal, Point, Vertical};
use rustybuzz::{Direction as HbDirection, Face as HbFace, UnicodeBuffer};
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tiny_skia::Pixmap;
use ttf_parser::GlyphId;

/// Horizontal layout extent of a string, in pixels, relative to the pen
/// origin on the baseline (y grows downwards).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextExtent {
    pub advance: f32,
    pub ink_top: f32,
    pub ink_bottom: f32,
    /// Ascender and descender lines; vertical anchors sit on these.
    pub ascender: f32,
    pub descender: f32,
}

impl TextExtent {
    pub fn middle(&self) -> f32 {
        (self.ascender + self.descender) / 2.0
    }
}

/// Offset of the anchor point from the pen origin.
pub fn anchor_offset(extent: &TextExtent, anchor: Anchor) -> (f32, f32) {
    let ax = match anchor.horizontal {
        Horizontal::Left => 0.0,
        Horizontal::Middle => extent.advance / 2.0,
        Horizontal::Right => extent.advance,
    };
    let ay = match anchor.vertical {
        Vertical::Top => extent.ascender,
        Vertical::Middle => extent.middle(),
        Vertical::Bottom => extent.descender,
    };
    (ax, ay)
}

/// Box of a string relative to its anchor point. Whitespace advance is
/// included horizontally; the stroke grows the box on every side.
pub fn anchored_bbox(extent: &TextExtent, anchor: Anchor, stroke_width: u32) -> BBox {
    let (ax, ay) = anchor_offset(extent, anchor);
    let sw = stroke_width as f32;
    BBox::new(
        (-ax - sw).floor() as i32,
        (extent.ink_top - ay - sw).floor() as i32,
        (extent.advance - ax + sw).ceil() as i32,
        (extent.ink_bottom - ay + sw).ceil() as i32,
    )
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextPaint {
    pub fill: Color,
    pub anchor: Anchor,
    pub stroke_width: u32,
    pub stroke_fill: Option<Color>,
}

/// A loaded font at one pixel size.
pub trait FontFace: fmt::Debug + Send + Sync {
    fn name(&self) -> &str;

    fn size(&self) -> u32;

    fn extent(&self, text: &str) -> TextExtent;

    /// Box of `text` relative to the anchor point.
    fn bbox(&self, text: &str, anchor: Anchor, stroke_width: u32) -> BBox {
        anchored_bbox(&self.extent(text), anchor, stroke_width)
    }

    fn draw(
        &self,
        pixmap: &mut Pixmap,
        xy: Point,
        text: &str,
        paint: &TextPaint,
    ) -> Result<(), AwesomeTableError>;
}

/// Resolves a font identity at a pixel size into a loaded face.
pub trait FontProvider: Send + Sync {
    fn load(&self, font: &str, size: u32) -> Result<Arc<dyn FontFace>, AwesomeTableError>;
}

#[derive(Clone, Copy)]
pub(crate) struct GlyphPlacement {
    pub(crate) glyph_id: u16,
    pub(crate) origin_x: f32,
    pub(crate) origin_y: f32,
    pub(crate) scale: f32,
}

pub struct TrueTypeFont {
    name: String,
    data: Arc<Vec<u8>>,
    size: u32,
    units_per_em: f32,
    ascender: f32,
    descender: f32,
    shape_text: bool,
}

impl fmt::Debug for TrueTypeFont {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrueTypeFont")
            .field("name", &self.name)
            .field("size", &self.size)
            .field("bytes", &self.data.len())
            .finish()
    }
}

impl TrueTypeFont {
    pub fn from_bytes(
        name: impl Into<String>,
        data: Arc<Vec<u8>>,
        size: u32,
        shape_text: bool,
    ) -> Result<Self, AwesomeTableError> {
        let name = name.into();
        if size == 0 {
            return Err(AwesomeTableError::Font(format!(
                "font size must be > 0 for {name}"
            )));
        }
        let Ok(face) = ttf_parser::Face::parse(&data, 0) else {
            return Err(AwesomeTableError::Font(format!(
                "invalid font data for {name}"
            )));
        };
        let units_per_em = face.units_per_em().max(1) as f32;
        let ascender = face.ascender() as f32;
        let descender = face.descender() as f32;
        Ok(Self {
            name,
            data,
            size,
            units_per_em,
            ascender,
            descender,
            shape_text,
        })
    }

    fn scale(&self) -> f32 {
        self.size as f32 / self.units_per_em
    }

    /// Glyph origins for `text` laid out from a baseline origin at (0, 0),
    /// plus the total advance.
    fn layout(&self, text: &str) -> (Vec<GlyphPlacement>, f32) {
        if self.shape_text {
            if let Some(shaped) = self.layout_shaped(text) {
                return shaped;
            }
        }
        self.layout_unshaped(text)
    }

    fn layout_shaped(&self, text: &str) -> Option<(Vec<GlyphPlacement>, f32)> {
        let face = HbFace::from_slice(&self.data, 0)?;
        let font_size = self.size as f32;
        let hb_units = face.units_per_em().max(1) as f32;
        let scale = font_size / hb_units;
        let mut buffer = UnicodeBuffer::new();
        buffer.set_direction(detect_direction(text));
        buffer.push_str(text);
        let output = rustybuzz::shape(&face, &[], buffer);
        let infos = output.glyph_infos();
        let positions = output.glyph_positions();
        if infos.len() != positions.len() {
            return None;
        }

        let mut out = Vec::with_capacity(infos.len());
        let mut pen_x = 0.0f32;
        let mut pen_y = 0.0f32;
        for (info, pos) in infos.iter().zip(positions.iter()) {
            let gid = info.glyph_id as u16;
            if gid != 0 {
                let x_off = (pos.x_offset as f32 / hb_units) * font_size;
                let y_off = (pos.y_offset as f32 / hb_units) * font_size;
                out.push(GlyphPlacement {
                    glyph_id: gid,
                    origin_x: pen_x + x_off,
                    origin_y: -(pen_y + y_off),
                    scale,
                });
            }
            pen_x += (pos.x_advance as f32 / hb_units) * font_size;
            pen_y += (pos.y_advance as f32 / hb_units) * font_size;
        }
        Some((out, pen_x))
    }

    fn layout_unshaped(&self, text: &str) -> (Vec<GlyphPlacement>, f32) {
        let Ok(face) = ttf_parser::Face::parse(&self.data, 0) else {
            return (Vec::new(), 0.0);
        };
        let font_size = self.size as f32;
        let scale = self.scale();

        let mut out = Vec::new();
        let mut pen_x = 0.0f32;
        for ch in text.chars() {
            let gid = face.glyph_index(ch).map(|id| id.0).unwrap_or(0);
            if gid == 0 {
                pen_x += font_size * 0.5;
                continue;
            }
            out.push(GlyphPlacement {
                glyph_id: gid,
                origin_x: pen_x,
                origin_y: 0.0,
                scale,
            });
            let advance_units = face.glyph_hor_advance(GlyphId(gid)).unwrap_or(0) as f32;
            let adv = advance_units * scale;
            pen_x += if adv > 0.0 { adv } else { font_size * 0.5 };
        }
        (out, pen_x)
    }

    fn extent_of(&self, face: &ttf_parser::Face<'_>, placements: &[GlyphPlacement], advance: f32) -> TextExtent {
        let scale = self.scale();
        let mut ink: Option<(f32, f32)> = None;
        for placement in placements {
            let Some(rect) = face.glyph_bounding_box(GlyphId(placement.glyph_id)) else {
                continue;
            };
            let top = placement.origin_y - rect.y_max as f32 * placement.scale;
            let bottom = placement.origin_y - rect.y_min as f32 * placement.scale;
            ink = Some(match ink {
                Some((t, b)) => (t.min(top), b.max(bottom)),
                None => (top, bottom),
            });
        }
        let ascender = -self.ascender * scale;
        let descender = -self.descender * scale;
        let (ink_top, ink_bottom) = ink.unwrap_or((ascender, descender));
        TextExtent {
            advance,
            ink_top,
            ink_bottom,
            ascender,
            descender,
        }
    }
}

impl FontFace for TrueTypeFont {
    fn name(&self) -> &str {
        &self.name
    }

    fn size(&self) -> u32 {
        self.size
    }

    fn extent(&self, text: &str) -> TextExtent {
        let (placements, advance) = self.layout(text);
        let Ok(face) = ttf_parser::Face::parse(&self.data, 0) else {
            return TextExtent {
                advance,
                ink_top: 0.0,
                ink_bottom: 0.0,
                ascender: 0.0,
                descender: 0.0,
            };
        };
        self.extent_of(&face, &placements, advance)
    }

    fn draw(
        &self,
        pixmap: &mut Pixmap,
        xy: Point,
        text: &str,
        paint: &TextPaint,
    ) -> Result<(), AwesomeTableError> {
        let face = ttf_parser::Face::parse(&self.data, 0)
            .map_err(|e| AwesomeTableError::Font(format!("{}: {e}", self.name)))?;
        let (placements, advance) = self.layout(text);
        let extent = self.extent_of(&face, &placements, advance);
        let (ax, ay) = anchor_offset(&extent, paint.anchor);
        let origin_x = xy.x as f32 - ax;
        let origin_y = xy.y as f32 - ay;
        let placed: Vec<GlyphPlacement> = placements
            .into_iter()
            .map(|p| GlyphPlacement {
                origin_x: p.origin_x + origin_x,
                origin_y: p.origin_y + origin_y,
                ..p
            })
            .collect();

        let stroke = (paint.stroke_width > 0).then(|| {
            (
                paint.stroke_width as f32 * 2.0,
                paint.stroke_fill.unwrap_or(paint.fill),
            )
        });
        let drawn = raster::fill_glyph_outlines(pixmap, &face, &placed, paint.fill, stroke);
        if drawn == 0 && !text.trim().is_empty() && raster_debug_text() {
            eprintln!(
                "[awesometable][raster-text] skip: no outlines font='{}' size={} text='{}'",
                self.name,
                self.size,
                truncate_debug_text(text)
            );
        }
        Ok(())
    }
}

fn raster_debug_text() -> bool {
    std::env::var("AWESOMETABLE_RASTER_DEBUG_TEXT")
        .map(|v| !v.is_empty() && v != "0" && !v.eq_ignore_ascii_case("false"))
        .unwrap_or(false)
}

fn truncate_debug_text(text: &str) -> String {
    const MAX_CHARS: usize = 48;
    let mut out = String::new();
    for (idx, ch) in text.chars().enumerate() {
        if idx >= MAX_CHARS {
            out.push_str("...");
            break;
        }
        out.push(if ch.is_control() { ' ' } else { ch });
    }
    out
}

fn detect_direction(text: &str) -> HbDirection {
    for ch in text.chars() {
        let code = ch as u32;
        let rtl = matches!(
            code,
            0x0590..=0x08FF | 0xFB1D..=0xFDFF | 0xFE70..=0xFEFF | 0x1EE00..=0x1EEFF
        );
        if rtl {
            return HbDirection::RightToLeft;
        }
    }
    HbDirection::LeftToRight
}

/// Loads TrueType/OpenType files either by path or by file name inside the
/// configured font directories.
pub struct FileFontProvider {
    font_dirs: Vec<PathBuf>,
    shape_text: bool,
    data_cache: Mutex<HashMap<PathBuf, Arc<Vec<u8>>>>,
}

impl FileFontProvider {
    pub fn new() -> Self {
        Self {
            font_dirs: system_font_dirs(),
            shape_text: true,
            data_cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_font_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        // Explicit directories win over the system ones.
        self.font_dirs.insert(0, dir.into());
        self
    }

    pub fn shape_text(mut self, enabled: bool) -> Self {
        self.shape_text = enabled;
        self
    }

    pub fn font_dirs(&self) -> &[PathBuf] {
        &self.font_dirs
    }

    pub fn resolve_path(&self, font: &str) -> Option<PathBuf> {
        let direct = Path::new(font);
        if direct.is_file() {
            return Some(direct.to_path_buf());
        }
        if direct.is_absolute() {
            return None;
        }
        self.font_dirs
            .iter()
            .map(|dir| dir.join(font))
            .find(|path| path.is_file())
    }

    fn read_font_bytes(&self, path: &Path) -> Result<Arc<Vec<u8>>, AwesomeTableError> {
        if let Ok(cache) = self.data_cache.lock() {
            if let Some(bytes) = cache.get(path) {
                return Ok(bytes.clone());
            }
        }
        let bytes = std::fs::read(path).map_err(|e| {
            AwesomeTableError::Font(format!("failed to read font {}: {e}", path.display()))
        })?;
        let bytes = Arc::new(bytes);
        if let Ok(mut cache) = self.data_cache.lock() {
            cache.insert(path.to_path_buf(), bytes.clone());
        }
        Ok(bytes)
    }
}

impl Default for FileFontProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl FontProvider for FileFontProvider {
    fn load(&self, font: &str, size: u32) -> Result<Arc<dyn FontFace>, AwesomeTableError> {
        let path = self
            .resolve_path(font)
            .ok_or_else(|| AwesomeTableError::FontNotFound(font.to_string()))?;
        let data = self.read_font_bytes(&path)?;
        let face = TrueTypeFont::from_bytes(font, data, size, self.shape_text)?;
        Ok(Arc::new(face))
    }
}

fn system_font_dirs() -> Vec<PathBuf> {
    let mut dirs = Vec::new();

    if let Ok(extra) = std::env::var("AWESOMETABLE_FONT_DIR") {
        for path in std::env::split_paths(&extra) {
            if !path.as_os_str().is_empty() {
                dirs.push(path);
            }
        }
    }

    #[cfg(target_os = "windows")]
    {
        dirs.push(PathBuf::from(r"C:\Windows\Fonts"));
        if let Ok(windir) = std::env::var("WINDIR") {
            dirs.push(PathBuf::from(windir).join("Fonts"));
        }
    }

    #[cfg(target_os = "linux")]
    {
        dirs.push(PathBuf::from("/usr/share/fonts"));
        dirs.push(PathBuf::from("/usr/local/share/fonts"));
        if let Ok(home) = std::env::var("HOME") {
            dirs.push(PathBuf::from(home).join(".fonts"));
        }
    }

    #[cfg(target_os = "macos")]
    {
        dirs.push(PathBuf::from("/System/Library/Fonts"));
        dirs.push(PathBuf::from("/Library/Fonts"));
        if let Ok(home) = std::env::var("HOME") {
            dirs.push(PathBuf::from(home).join("Library/Fonts"));
        }
    }

    dirs
}

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct FontKey {
    pub font: String,
    pub size: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

struct CacheState {
    map: HashMap<FontKey, Arc<dyn FontFace>>,
    order: VecDeque<FontKey>,
    hits: u64,
    misses: u64,
}

/// Memoizes (font identity, size) → loaded face. Unbounded unless a
/// capacity is set, in which case the oldest entry is evicted first.
pub struct FontCache {
    provider: Box<dyn FontProvider>,
    state: Mutex<CacheState>,
    max_entries: Option<usize>,
    debug: Option<Arc<DebugLogger>>,
}

impl FontCache {
    pub fn new(provider: impl FontProvider + 'static) -> Self {
        Self {
            provider: Box::new(provider),
            state: Mutex::new(CacheState {
                map: HashMap::new(),
                order: VecDeque::new(),
                hits: 0,
                misses: 0,
            }),
            max_entries: None,
            debug: None,
        }
    }

    pub fn with_capacity_limit(mut self, max_entries: usize) -> Self {
        self.max_entries = Some(max_entries.max(1));
        self
    }

    pub(crate) fn with_debug(mut self, debug: Option<Arc<DebugLogger>>) -> Self {
        self.debug = debug;
        self
    }

    pub fn get(&self, font: &str, size: u32) -> Result<Arc<dyn FontFace>, AwesomeTableError> {
        let key = FontKey {
            font: font.to_string(),
            size,
        };
        if let Ok(mut state) = self.state.lock() {
            if let Some(face) = state.map.get(&key).cloned() {
                state.hits = state.hits.saturating_add(1);
                if let Some(debug) = self.debug.as_deref() {
                    debug.increment("font_cache.hit", 1);
                }
                return Ok(face);
            }
        }

        let face = self.provider.load(font, size)?;
        if let Some(debug) = self.debug.as_deref() {
            debug.increment("font_cache.miss", 1);
        }
        if let Ok(mut state) = self.state.lock() {
            state.misses = state.misses.saturating_add(1);
            if !state.map.contains_key(&key) {
                state.map.insert(key.clone(), face.clone());
                state.order.push_back(key);
            }
            if let Some(max_entries) = self.max_entries {
                while state.map.len() > max_entries {
                    let Some(old) = state.order.pop_front() else {
                        break;
                    };
                    state.map.remove(&old);
                }
            }
        }
        Ok(face)
    }

    pub fn contains(&self, font: &str, size: u32) -> bool {
        let key = FontKey {
            font: font.to_string(),
            size,
        };
        self.state
            .lock()
            .map(|state| state.map.contains_key(&key))
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.state.lock().map(|state| state.map.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every cached face and resets the counters.
    pub fn clear(&self) {
        if let Ok(mut state) = self.state.lock() {
            state.map.clear();
            state.order.clear();
            state.hits = 0;
            state.misses = 0;
        }
    }

    pub fn stats(&self) -> CacheStats {
        self.state
            .lock()
            .map(|state| CacheStats {
                hits: state.hits,
                misses: state.misses,
                entries: state.map.len(),
            })
            .unwrap_or_default()
    }
}

impl fmt::Debug for FontCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontCache")
            .field("stats", &self.stats())
            .field("max_entries", &self.max_entries)
            .finish()
    }
}

use crate::canvas::Canvas;
use crate::error::AwesomeTableError;
use crate::font::{FontCache, FontFace};
use crate::geometry::{EdgeStyle, Rect};
use crate::label::{Label, LabelKey};
use crate::line::{Line, LineMode};
use crate::types::{Anchor, BBox, Color, Point};
use std::sync::Arc;

pub const DEFAULT_FONT: &str = "simfang.ttf";
pub const DEFAULT_FONT_SIZE: u32 = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextStyle {
    pub font: String,
    pub font_size: u32,
    pub fill: Color,
    pub anchor: Anchor,
    pub stroke_width: u32,
    pub stroke_fill: Option<Color>,
    pub underline: bool,
    pub deleteline: bool,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font: DEFAULT_FONT.to_string(),
            font_size: DEFAULT_FONT_SIZE,
            fill: Color::BLACK,
            anchor: Anchor::LT,
            stroke_width: 0,
            stroke_fill: None,
            underline: false,
            deleteline: false,
        }
    }
}

impl TextStyle {
    pub fn with_font(mut self, font: impl Into<String>, font_size: u32) -> Self {
        self.font = font.into();
        self.font_size = font_size;
        self
    }

    pub fn with_anchor(mut self, anchor: Anchor) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn with_fill(mut self, fill: Color) -> Self {
        self.fill = fill;
        self
    }

    pub fn with_stroke(mut self, width: u32, fill: Option<Color>) -> Self {
        self.stroke_width = width;
        self.stroke_fill = fill;
        self
    }

    pub fn with_underline(mut self, underline: bool) -> Self {
        self.underline = underline;
        self
    }

    pub fn with_deleteline(mut self, deleteline: bool) -> Self {
        self.deleteline = deleteline;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Refresh {
    GeometryDirty,
    BboxReady(BBox),
    EdgesReady,
    Clean,
}

/// A positioned string. Its rect is always the font bbox of the content at
/// the current anchor, translated to `xy`.
#[derive(Debug, Clone)]
pub struct Text {
    rect: Rect,
    xy: Point,
    content: String,
    fill: Color,
    anchor: Anchor,
    stroke_width: u32,
    stroke_fill: Option<Color>,
    underline: bool,
    deleteline: bool,
    font: String,
    face: Arc<dyn FontFace>,
    strike: Option<Line>,
}

impl Text {
    pub fn new(
        xy: Point,
        content: impl Into<String>,
        style: &TextStyle,
        fonts: &FontCache,
    ) -> Result<Self, AwesomeTableError> {
        let face = fonts.get(&style.font, style.font_size)?;
        Ok(Self::from_face(xy, content, style, face))
    }

    /// Builds a text from an already loaded face; `style.font` and
    /// `style.font_size` are taken from the face.
    pub fn from_face(
        xy: Point,
        content: impl Into<String>,
        style: &TextStyle,
        face: Arc<dyn FontFace>,
    ) -> Self {
        let mut text = Self {
            rect: Rect::default(),
            xy,
            content: content.into(),
            fill: style.fill,
            anchor: style.anchor,
            stroke_width: style.stroke_width,
            stroke_fill: style.stroke_fill,
            underline: style.underline,
            deleteline: style.deleteline,
            font: face.name().to_string(),
            face,
            strike: None,
        };
        text.refresh();
        text
    }

    /// Runs the refresh chain to completion after a geometry-affecting write.
    fn refresh(&mut self) {
        let mut stage = Refresh::GeometryDirty;
        loop {
            stage = match stage {
                Refresh::GeometryDirty => Refresh::BboxReady(
                    self.face
                        .bbox(&self.content, self.anchor, self.stroke_width)
                        .translate(self.xy),
                ),
                Refresh::BboxReady(bbox) => {
                    // set_ltrb regenerates the four edges.
                    self.rect.set_ltrb(bbox);
                    Refresh::EdgesReady
                }
                Refresh::EdgesReady => {
                    self.refresh_decorations();
                    Refresh::Clean
                }
                Refresh::Clean => break,
            };
        }
    }

    fn refresh_decorations(&mut self) {
        let underline_fill = if self.underline {
            self.fill
        } else {
            Color::TRANSPARENT
        };
        self.rect.set_style(EdgeStyle {
            width: 1,
            fill: underline_fill,
            mode: LineMode::Solid,
        });
        self.strike = self.deleteline.then(|| {
            Line::new(self.rect.midleft(), self.rect.midright()).with_fill(self.fill)
        });
    }

    pub fn rect(&self) -> &Rect {
        &self.rect
    }

    pub fn bbox(&self) -> BBox {
        self.rect.bbox()
    }

    pub fn xy(&self) -> Point {
        self.xy
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn fill(&self) -> Color {
        self.fill
    }

    pub fn anchor(&self) -> Anchor {
        self.anchor
    }

    pub fn font(&self) -> &str {
        &self.font
    }

    pub fn font_size(&self) -> u32 {
        self.face.size()
    }

    pub fn face(&self) -> &Arc<dyn FontFace> {
        &self.face
    }

    pub fn stroke_width(&self) -> u32 {
        self.stroke_width
    }

    pub fn stroke_fill(&self) -> Option<Color> {
        self.stroke_fill
    }

    pub fn underline(&self) -> bool {
        self.underline
    }

    pub fn deleteline(&self) -> bool {
        self.deleteline
    }

    /// Strike-through segment, present while `deleteline` is on.
    pub fn deleteline_segment(&self) -> Option<&Line> {
        self.strike.as_ref()
    }

    pub fn set_xy(&mut self, xy: Point) {
        self.xy = xy;
        self.refresh();
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
        self.refresh();
    }

    pub fn set_anchor(&mut self, anchor: Anchor) {
        self.anchor = anchor;
        self.refresh();
    }

    /// Sets position and anchor with a single refresh.
    pub fn place(&mut self, xy: Point, anchor: Anchor) {
        self.xy = xy;
        self.anchor = anchor;
        self.refresh();
    }

    pub fn set_stroke_width(&mut self, stroke_width: u32) {
        self.stroke_width = stroke_width;
        self.refresh();
    }

    pub fn set_stroke_fill(&mut self, stroke_fill: Option<Color>) {
        self.stroke_fill = stroke_fill;
    }

    pub fn set_fill(&mut self, fill: Color) {
        self.fill = fill;
        self.refresh_decorations();
    }

    pub fn set_underline(&mut self, underline: bool) {
        self.underline = underline;
        self.refresh_decorations();
    }

    pub fn set_deleteline(&mut self, deleteline: bool) {
        self.deleteline = deleteline;
        self.refresh_decorations();
    }

    /// Switches font; on failure the text is left unchanged.
    pub fn set_font(&mut self, font: &str, fonts: &FontCache) -> Result<(), AwesomeTableError> {
        let face = fonts.get(font, self.face.size())?;
        self.font = font.to_string();
        self.face = face;
        self.refresh();
        Ok(())
    }

    pub fn set_font_size(
        &mut self,
        font_size: u32,
        fonts: &FontCache,
    ) -> Result<(), AwesomeTableError> {
        let face = fonts.get(&self.font, font_size)?;
        self.face = face;
        self.refresh();
        Ok(())
    }

    pub fn move_by(&mut self, dx: i32, dy: i32) {
        self.set_xy(self.xy.offset(dx, dy));
    }

    pub fn moved(&self, dx: i32, dy: i32) -> Text {
        let mut text = self.clone();
        text.move_by(dx, dy);
        text
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.content.contains(needle)
    }

    pub fn label(&self) -> Label {
        Label::from_rect(&self.rect, LabelKey::Text, self.content.clone())
    }

    pub fn render(&self, canvas: &mut Canvas) -> Result<(), AwesomeTableError> {
        canvas.set_fill_color(self.fill);
        canvas.draw_text(
            self.xy,
            &self.content,
            self.face.clone(),
            self.anchor,
            self.stroke_width,
            self.stroke_fill,
        );
        if let Some(strike) = &self.strike {
            strike.render(canvas)?;
        }
        if self.underline {
            self.rect.bottom_line().render(canvas)?;
        }
        Ok(())
    }
}

/// Builds a [`Text`] whose box hugs the visible glyphs: surrounding
/// whitespace is stripped and the anchor point moved so the remaining
/// characters stay where they would have been drawn.
pub fn draw_text(
    xy: Point,
    content: &str,
    style: &TextStyle,
    fonts: &FontCache,
) -> Result<Text, AwesomeTableError> {
    let face = fonts.get(&style.font, style.font_size)?;
    if content.trim() == content {
        return Ok(Text::from_face(xy, content, style, face));
    }

    let mut xy = xy;
    let mut anchor = style.anchor;
    let mut content = content;
    let mut bbox = face.bbox(content, anchor, style.stroke_width).translate(xy);

    if content.ends_with(char::is_whitespace) {
        content = content.trim_end();
        xy = Point::new(bbox.left, bbox.middle_y());
        anchor = Anchor::LM;
        bbox = face.bbox(content, anchor, style.stroke_width).translate(xy);
    }
    if content.starts_with(char::is_whitespace) {
        content = content.trim_start();
        xy = Point::new(bbox.right, bbox.middle_y());
        anchor = Anchor::RM;
    }

    let style = TextStyle {
        anchor,
        ..style.clone()
    };
    Ok(Text::from_face(xy, content, &style, face))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Command;
    use crate::test_util::block_fonts;
    use crate::types::Size;

    fn block_style() -> TextStyle {
        TextStyle::default().with_font("block.ttf", 20)
    }

    #[test]
    fn rect_tracks_anchor_and_position() {
        let fonts = block_fonts();
        let mut text = Text::new(Point::new(10, 10), "abcd", &block_style(), &fonts).unwrap();
        assert_eq!(text.bbox(), BBox::new(10, 10, 50, 30));

        text.set_anchor(Anchor::MM);
        assert_eq!(text.bbox(), BBox::new(-10, 0, 30, 20));
        text.set_xy(Point::new(100, 100));
        assert_eq!(text.bbox(), BBox::new(80, 90, 120, 110));
        text.set_content("ab");
        assert_eq!(text.bbox(), BBox::new(90, 90, 110, 110));
        text.set_stroke_width(2);
        assert_eq!(text.bbox(), BBox::new(88, 88, 112, 112));
        assert!(text.rect().edges_consistent());
    }

    #[test]
    fn font_size_change_reloads_face() {
        let fonts = block_fonts();
        let mut text = Text::new(Point::ORIGIN, "ab", &block_style(), &fonts).unwrap();
        text.set_font_size(40, &fonts).unwrap();
        assert_eq!(text.font_size(), 40);
        assert_eq!(text.bbox(), BBox::new(0, 0, 40, 40));
    }

    #[test]
    fn failed_font_switch_leaves_text_unchanged() {
        let fonts = block_fonts();
        let mut text = Text::new(Point::ORIGIN, "ab", &block_style(), &fonts).unwrap();
        let err = text.set_font("nope.ttf", &fonts).unwrap_err();
        assert!(matches!(err, AwesomeTableError::FontNotFound(_)));
        assert_eq!(text.font(), "block.ttf");
        assert_eq!(text.bbox(), BBox::new(0, 0, 20, 20));
    }

    #[test]
    fn draw_text_keeps_clean_strings_as_given() {
        let fonts = block_fonts();
        for anchor in Anchor::ALL {
            let style = block_style().with_anchor(anchor);
            let drawn = draw_text(Point::new(3, 4), "ab", &style, &fonts).unwrap();
            let direct = Text::new(Point::new(3, 4), "ab", &style, &fonts).unwrap();
            assert_eq!(drawn.anchor(), anchor);
            assert_eq!(drawn.xy(), direct.xy(), "{anchor}");
            assert_eq!(drawn.content(), direct.content());
            assert_eq!(drawn.bbox(), direct.bbox(), "{anchor}");
            assert_eq!(drawn.rect().lines(), direct.rect().lines(), "{anchor}");
        }
    }

    #[test]
    fn draw_text_strips_both_sides() {
        let fonts = block_fonts();
        let text = draw_text(Point::ORIGIN, "  ab  ", &block_style(), &fonts).unwrap();
        assert_eq!(text.content(), "ab");
        assert_eq!(text.anchor(), Anchor::RM);
        assert_eq!(text.xy(), Point::new(40, 10));
        assert_eq!(text.bbox(), BBox::new(20, 0, 40, 20));
    }

    #[test]
    fn draw_text_trailing_only_anchors_left_middle() {
        let fonts = block_fonts();
        let text = draw_text(Point::new(5, 5), "ab  ", &block_style(), &fonts).unwrap();
        assert_eq!(text.content(), "ab");
        assert_eq!(text.anchor(), Anchor::LM);
        assert_eq!(text.xy(), Point::new(5, 15));
        assert_eq!(text.bbox(), BBox::new(5, 5, 25, 25));
    }

    #[test]
    fn draw_text_is_deterministic() {
        let fonts = block_fonts();
        let style = block_style().with_anchor(Anchor::MB);
        let a = draw_text(Point::new(50, 50), " x y ", &style, &fonts).unwrap();
        let b = draw_text(Point::new(50, 50), " x y ", &style, &fonts).unwrap();
        assert_eq!(a.bbox(), b.bbox());
        assert_eq!(a.xy(), b.xy());
        assert_eq!(a.content(), "x y");
    }

    #[test]
    fn decorations_follow_fill_and_geometry() {
        let fonts = block_fonts();
        let style = block_style()
            .with_fill(Color::rgb(200, 0, 0))
            .with_underline(true)
            .with_deleteline(true);
        let mut text = Text::new(Point::ORIGIN, "ab", &style, &fonts).unwrap();
        let strike = text.deleteline_segment().unwrap();
        assert_eq!(strike.start, Point::new(0, 10));
        assert_eq!(strike.end, Point::new(20, 10));
        assert_eq!(strike.fill, Color::rgb(200, 0, 0));
        assert_eq!(text.rect().bottom_line().fill, Color::rgb(200, 0, 0));

        text.move_by(10, 0);
        assert_eq!(text.deleteline_segment().unwrap().start, Point::new(10, 10));
        text.set_underline(false);
        text.set_deleteline(false);
        assert!(text.deleteline_segment().is_none());
        assert_eq!(text.rect().bottom_line().fill, Color::TRANSPARENT);
    }

    #[test]
    fn render_draws_text_then_decorations() {
        let fonts = block_fonts();
        let style = block_style().with_underline(true).with_deleteline(true);
        let text = Text::new(Point::ORIGIN, "ab", &style, &fonts).unwrap();
        let mut canvas = Canvas::new(Size::new(40, 40));
        text.render(&mut canvas).unwrap();
        let commands = canvas.finish();
        let lines: Vec<_> = commands
            .iter()
            .filter_map(|c| match c {
                Command::DrawLine { start, end } => Some((*start, *end)),
                _ => None,
            })
            .collect();
        assert!(matches!(commands[0], Command::DrawText { .. }));
        assert_eq!(
            lines,
            vec![
                (Point::new(0, 10), Point::new(20, 10)),
                (Point::new(0, 20), Point::new(20, 20)),
            ]
        );
    }

    #[test]
    fn moved_copy_leaves_source_in_place() {
        let fonts = block_fonts();
        let text = Text::new(Point::ORIGIN, "ab", &block_style(), &fonts).unwrap();
        let copy = text.moved(5, 6);
        assert_eq!(copy.bbox(), BBox::new(5, 6, 25, 26));
        assert_eq!(text.bbox(), BBox::new(0, 0, 20, 20));
        assert!(text.contains("b"));
        assert!(!text.contains("c"));
        assert_eq!(text.label().to_string(), "0;0;20;0;20;20;0;20;text@ab");
    }
}

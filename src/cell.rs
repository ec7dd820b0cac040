use crate::error::AwesomeTableError;
use crate::geometry::{EdgeStyle, Rect};
use crate::label::{Label, LabelKey};
use crate::line::LineMode;
use crate::text::Text;
use crate::types::{Anchor, BBox, Color, Horizontal, Point, Vertical};

/// Membership of a cell inside its table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CellState {
    #[default]
    Active,
    /// Absorbed at least one other cell.
    Spanning,
    /// Soft-deleted by a merge; keeps its slot in the row index.
    MergedAway,
}

/// Bordered container of texts. When an alignment is set every text is
/// re-placed after each geometry, padding or membership change.
#[derive(Debug, Clone)]
pub struct Cell {
    rect: Rect,
    fill: Option<Color>,
    texts: Vec<Text>,
    state: CellState,
    align: Option<Anchor>,
    padding_width: i32,
}

impl Cell {
    pub fn new(left: i32, top: i32, width: i32, height: i32) -> Self {
        Self {
            rect: Rect::with_style(
                left,
                top,
                width,
                height,
                EdgeStyle {
                    width: 1,
                    fill: Color::TRANSPARENT,
                    mode: LineMode::Solid,
                },
            ),
            fill: None,
            texts: Vec::new(),
            state: CellState::Active,
            align: None,
            padding_width: 0,
        }
    }

    pub fn with_outline(mut self, outline: Color) -> Self {
        self.set_outline(outline);
        self
    }

    pub fn with_line_width(mut self, line_width: u32) -> Self {
        self.set_line_width(line_width);
        self
    }

    pub fn with_fill(mut self, fill: Color) -> Self {
        self.fill = Some(fill);
        self
    }

    pub fn with_padding(mut self, padding_width: i32) -> Self {
        self.set_padding_width(padding_width);
        self
    }

    pub fn with_align(mut self, code: &str) -> Result<Self, AwesomeTableError> {
        self.set_align(code)?;
        Ok(self)
    }

    pub fn with_text(mut self, text: Text) -> Self {
        self.push(text);
        self
    }

    pub fn rect(&self) -> &Rect {
        &self.rect
    }

    pub fn bbox(&self) -> BBox {
        self.rect.bbox()
    }

    pub fn fill(&self) -> Option<Color> {
        self.fill
    }

    pub fn outline(&self) -> Color {
        self.rect.style().fill
    }

    pub fn line_width(&self) -> u32 {
        self.rect.style().width
    }

    pub fn padding_width(&self) -> i32 {
        self.padding_width
    }

    pub fn align(&self) -> Option<Anchor> {
        self.align
    }

    pub fn state(&self) -> CellState {
        self.state
    }

    pub fn visible(&self) -> bool {
        self.state != CellState::MergedAway
    }

    pub fn set_fill(&mut self, fill: Option<Color>) {
        self.fill = fill;
    }

    pub fn set_outline(&mut self, outline: Color) {
        let style = EdgeStyle {
            fill: outline,
            ..self.rect.style()
        };
        self.rect.set_style(style);
        self.realign();
    }

    pub fn set_line_width(&mut self, line_width: u32) {
        let style = EdgeStyle {
            width: line_width,
            ..self.rect.style()
        };
        self.rect.set_style(style);
        self.realign();
    }

    pub fn set_padding_width(&mut self, padding_width: i32) {
        self.padding_width = padding_width;
        self.realign();
    }

    /// Parses and applies a two-character alignment code. A bad code
    /// leaves the previous alignment and text positions untouched.
    pub fn set_align(&mut self, code: &str) -> Result<(), AwesomeTableError> {
        if code.chars().count() != 2 {
            return Err(AwesomeTableError::InvalidAlign(code.to_string()));
        }
        let anchor: Anchor = code
            .parse()
            .map_err(|_| AwesomeTableError::InvalidAlign(code.to_string()))?;
        self.align = Some(anchor);
        self.realign();
        Ok(())
    }

    /// Drops the alignment; texts keep their current positions.
    pub fn clear_align(&mut self) {
        self.align = None;
    }

    pub(crate) fn mark_merged_away(&mut self) {
        self.state = CellState::MergedAway;
    }

    /// Mutates the cell rectangle, then re-applies alignment.
    pub fn reshape(&mut self, f: impl FnOnce(&mut Rect)) {
        f(&mut self.rect);
        self.rect.recompute_edges();
        self.realign();
    }

    pub fn move_by(&mut self, dx: i32, dy: i32) {
        self.reshape(|rect| rect.move_by(dx, dy));
    }

    /// Anchor point for texts under `anchor`, padding applied inward.
    pub fn align_point(&self, anchor: Anchor) -> Point {
        let rect = &self.rect;
        let p = self.padding_width;
        let x = match anchor.horizontal {
            Horizontal::Left => rect.left() + p,
            Horizontal::Middle => rect.centerx(),
            Horizontal::Right => rect.right() - p,
        };
        let y = match anchor.vertical {
            Vertical::Top => rect.top() + p,
            Vertical::Middle => rect.centery(),
            Vertical::Bottom => rect.bottom() - p,
        };
        Point::new(x, y)
    }

    pub fn realign(&mut self) {
        let Some(anchor) = self.align else {
            return;
        };
        let xy = self.align_point(anchor);
        for text in &mut self.texts {
            text.place(xy, anchor);
        }
    }

    pub fn push(&mut self, text: Text) {
        self.texts.push(text);
        self.realign();
    }

    pub fn clear(&mut self) {
        self.texts.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.texts.len()
    }

    pub fn text(&self, index: usize) -> Option<&Text> {
        self.texts.get(index)
    }

    /// Mutable access to one text. Alignment is not re-applied; call
    /// [`Cell::realign`] after moving it if the cell is aligned.
    pub fn text_mut(&mut self, index: usize) -> Option<&mut Text> {
        self.texts.get_mut(index)
    }

    pub fn texts(&self) -> &[Text] {
        &self.texts
    }

    /// True when any text contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.texts.iter().any(|text| text.contains(needle))
    }

    /// Grows to the union with `other` and takes over its texts. A
    /// merged-away cell stays hidden.
    pub fn merge(&mut self, other: &mut Cell) {
        self.rect.union_with(&other.rect);
        self.texts.append(&mut other.texts);
        if self.state == CellState::Active {
            self.state = CellState::Spanning;
        }
        self.realign();
    }

    pub fn label(&self) -> Label {
        Label::from_rect(&self.rect, LabelKey::Cell, "")
    }
}

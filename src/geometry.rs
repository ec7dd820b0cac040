use crate::line::{Line, LineMode};
use crate::types::{BBox, Color, Point, Size};

/// Style shared by the four boundary edges of a [`Rect`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeStyle {
    pub width: u32,
    pub fill: Color,
    pub mode: LineMode,
}

impl Default for EdgeStyle {
    fn default() -> Self {
        Self {
            width: 1,
            fill: Color::TRANSPARENT,
            mode: LineMode::Solid,
        }
    }
}

const LEFT: usize = 0;
const TOP: usize = 1;
const RIGHT: usize = 2;
const BOTTOM: usize = 3;

/// Mutable axis-aligned rectangle whose boundary edges are regenerated by
/// every mutator, so an edge is never observed stale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rect {
    left: i32,
    top: i32,
    width: i32,
    height: i32,
    style: EdgeStyle,
    edges: [Line; 4],
}

impl Rect {
    pub fn new(left: i32, top: i32, width: i32, height: i32) -> Self {
        Self::with_style(left, top, width, height, EdgeStyle::default())
    }

    pub fn with_style(left: i32, top: i32, width: i32, height: i32, style: EdgeStyle) -> Self {
        let origin = Point::new(left, top);
        let mut rect = Self {
            left,
            top,
            width,
            height,
            style,
            edges: std::array::from_fn(|_| Line::new(origin, origin)),
        };
        rect.recompute_edges();
        rect
    }

    pub fn from_bbox(bbox: BBox) -> Self {
        Self::new(bbox.left, bbox.top, bbox.width(), bbox.height())
    }

    /// Rebuilds the four edges from the current corners.
    pub fn recompute_edges(&mut self) {
        let style = self.style;
        let make = |start: Point, end: Point| {
            Line::new(start, end)
                .with_width(style.width)
                .with_fill(style.fill)
                .with_mode(style.mode)
        };
        self.edges = [
            make(self.topleft(), self.bottomleft()),
            make(self.topleft(), self.topright()),
            make(self.topright(), self.bottomright()),
            make(self.bottomleft(), self.bottomright()),
        ];
    }

    pub fn left(&self) -> i32 {
        self.left
    }

    pub fn top(&self) -> i32 {
        self.top
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn right(&self) -> i32 {
        self.left + self.width
    }

    pub fn bottom(&self) -> i32 {
        self.top + self.height
    }

    pub fn centerx(&self) -> i32 {
        self.left + self.width / 2
    }

    pub fn centery(&self) -> i32 {
        self.top + self.height / 2
    }

    pub fn center(&self) -> Point {
        Point::new(self.centerx(), self.centery())
    }

    pub fn topleft(&self) -> Point {
        Point::new(self.left, self.top)
    }

    pub fn topright(&self) -> Point {
        Point::new(self.right(), self.top)
    }

    pub fn bottomleft(&self) -> Point {
        Point::new(self.left, self.bottom())
    }

    pub fn bottomright(&self) -> Point {
        Point::new(self.right(), self.bottom())
    }

    pub fn midleft(&self) -> Point {
        Point::new(self.left, self.centery())
    }

    pub fn midright(&self) -> Point {
        Point::new(self.right(), self.centery())
    }

    pub fn midtop(&self) -> Point {
        Point::new(self.centerx(), self.top)
    }

    pub fn midbottom(&self) -> Point {
        Point::new(self.centerx(), self.bottom())
    }

    pub fn size(&self) -> Size {
        Size::new(self.width.max(0) as u32, self.height.max(0) as u32)
    }

    pub fn bbox(&self) -> BBox {
        BBox::new(self.left, self.top, self.right(), self.bottom())
    }

    pub fn style(&self) -> EdgeStyle {
        self.style
    }

    pub fn left_line(&self) -> &Line {
        &self.edges[LEFT]
    }

    pub fn top_line(&self) -> &Line {
        &self.edges[TOP]
    }

    pub fn right_line(&self) -> &Line {
        &self.edges[RIGHT]
    }

    pub fn bottom_line(&self) -> &Line {
        &self.edges[BOTTOM]
    }

    /// Edges in left, top, right, bottom order.
    pub fn lines(&self) -> &[Line; 4] {
        &self.edges
    }

    pub fn set_style(&mut self, style: EdgeStyle) {
        self.style = style;
        self.recompute_edges();
    }

    pub fn set_left(&mut self, left: i32) {
        self.left = left;
        self.recompute_edges();
    }

    pub fn set_top(&mut self, top: i32) {
        self.top = top;
        self.recompute_edges();
    }

    pub fn set_width(&mut self, width: i32) {
        self.width = width;
        self.recompute_edges();
    }

    pub fn set_height(&mut self, height: i32) {
        self.height = height;
        self.recompute_edges();
    }

    /// Moves the rectangle so its right edge sits at `right`.
    pub fn set_right(&mut self, right: i32) {
        self.left = right - self.width;
        self.recompute_edges();
    }

    /// Moves the rectangle so its bottom edge sits at `bottom`.
    pub fn set_bottom(&mut self, bottom: i32) {
        self.top = bottom - self.height;
        self.recompute_edges();
    }

    pub fn set_topleft(&mut self, at: Point) {
        self.left = at.x;
        self.top = at.y;
        self.recompute_edges();
    }

    /// Moves the rectangle so its bottom-right corner sits at `at`.
    pub fn set_bottomright(&mut self, at: Point) {
        self.left = at.x - self.width;
        self.top = at.y - self.height;
        self.recompute_edges();
    }

    pub fn set_size(&mut self, width: i32, height: i32) {
        self.width = width;
        self.height = height;
        self.recompute_edges();
    }

    pub fn set_ltrb(&mut self, bbox: BBox) {
        self.left = bbox.left;
        self.top = bbox.top;
        self.width = bbox.width();
        self.height = bbox.height();
        self.recompute_edges();
    }

    pub fn move_by(&mut self, dx: i32, dy: i32) {
        self.left += dx;
        self.top += dy;
        self.recompute_edges();
    }

    /// Grows this rectangle to the smallest one covering both.
    pub fn union_with(&mut self, other: &Rect) {
        let bbox = BBox::new(
            self.left.min(other.left),
            self.top.min(other.top),
            self.right().max(other.right()),
            self.bottom().max(other.bottom()),
        );
        self.set_ltrb(bbox);
    }

    pub fn contains_point(&self, point: Point) -> bool {
        point.x >= self.left
            && point.x < self.right()
            && point.y >= self.top
            && point.y < self.bottom()
    }

    pub fn edges_consistent(&self) -> bool {
        let expected = [
            (self.topleft(), self.bottomleft()),
            (self.topleft(), self.topright()),
            (self.topright(), self.bottomright()),
            (self.bottomleft(), self.bottomright()),
        ];
        self.edges
            .iter()
            .zip(expected)
            .all(|(line, (start, end))| line.start == start && line.end == end)
    }
}

impl Default for Rect {
    fn default() -> Self {
        Rect::new(0, 0, 0, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edges_follow_every_mutation() {
        let mut rect = Rect::new(10, 20, 30, 40);
        assert!(rect.edges_consistent());

        let steps: Vec<Box<dyn Fn(&mut Rect)>> = vec![
            Box::new(|r| r.set_left(-5)),
            Box::new(|r| r.set_top(7)),
            Box::new(|r| r.set_width(100)),
            Box::new(|r| r.set_height(3)),
            Box::new(|r| r.set_right(50)),
            Box::new(|r| r.set_bottom(90)),
            Box::new(|r| r.set_topleft(Point::new(1, 2))),
            Box::new(|r| r.set_bottomright(Point::new(200, 300))),
            Box::new(|r| r.set_size(11, 13)),
            Box::new(|r| r.move_by(-4, 9)),
            Box::new(|r| r.set_ltrb(BBox::new(0, 0, 8, 8))),
            Box::new(|r| r.union_with(&Rect::new(50, 60, 5, 5))),
        ];
        for step in steps {
            step(&mut rect);
            assert!(rect.edges_consistent(), "stale edges after mutation: {rect:?}");
        }
        assert_eq!(rect.bbox(), BBox::new(0, 0, 55, 65));
    }

    #[test]
    fn right_and_bottom_setters_move_instead_of_resize() {
        let mut rect = Rect::new(0, 0, 10, 20);
        rect.set_right(25);
        rect.set_bottom(30);
        assert_eq!(rect.topleft(), Point::new(15, 10));
        assert_eq!(rect.size(), Size::new(10, 20));
    }

    #[test]
    fn edge_style_is_carried_onto_lines() {
        let mut rect = Rect::new(0, 0, 4, 4);
        let style = EdgeStyle {
            width: 3,
            fill: Color::rgb(1, 2, 3),
            mode: LineMode::Dashed,
        };
        rect.set_style(style);
        for line in rect.lines() {
            assert_eq!(line.width, 3);
            assert_eq!(line.fill, Color::rgb(1, 2, 3));
            assert_eq!(line.mode, LineMode::Dashed);
        }
    }

    #[test]
    fn center_uses_truncating_halves() {
        let rect = Rect::new(1, 1, 5, 7);
        assert_eq!(rect.center(), Point::new(3, 4));
        assert_eq!(rect.midleft(), Point::new(1, 4));
        assert_eq!(rect.midright(), Point::new(6, 4));
    }

    #[test]
    fn right_edge_runs_top_to_bottom_on_the_right() {
        let rect = Rect::new(0, 0, 10, 5);
        assert_eq!(rect.right_line().start, Point::new(10, 0));
        assert_eq!(rect.right_line().end, Point::new(10, 5));
    }
}

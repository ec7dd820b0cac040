use crate::error::AwesomeTableError;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

// Label lines join coordinates with ';'.
impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{};{}", self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BBox {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl BBox {
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn translate(self, by: Point) -> Self {
        Self {
            left: self.left + by.x,
            top: self.top + by.y,
            right: self.right + by.x,
            bottom: self.bottom + by.y,
        }
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    /// Vertical midpoint, floored.
    pub fn middle_y(&self) -> i32 {
        (self.top + self.bottom).div_euclid(2)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// RGBA8 color with straight (non-premultiplied) alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgba(0, 0, 0, 255);
    pub const WHITE: Color = Color::rgba(255, 255, 255, 255);
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Horizontal {
    Left,
    Middle,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Vertical {
    Top,
    Middle,
    Bottom,
}

/// Which point of a text box (or cell) a position refers to. Written as a
/// two-character code, horizontal first: `lt`, `mm`, `rb`, ...
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Anchor {
    pub horizontal: Horizontal,
    pub vertical: Vertical,
}

impl Anchor {
    pub const LT: Anchor = Anchor::new(Horizontal::Left, Vertical::Top);
    pub const MT: Anchor = Anchor::new(Horizontal::Middle, Vertical::Top);
    pub const RT: Anchor = Anchor::new(Horizontal::Right, Vertical::Top);
    pub const LM: Anchor = Anchor::new(Horizontal::Left, Vertical::Middle);
    pub const MM: Anchor = Anchor::new(Horizontal::Middle, Vertical::Middle);
    pub const RM: Anchor = Anchor::new(Horizontal::Right, Vertical::Middle);
    pub const LB: Anchor = Anchor::new(Horizontal::Left, Vertical::Bottom);
    pub const MB: Anchor = Anchor::new(Horizontal::Middle, Vertical::Bottom);
    pub const RB: Anchor = Anchor::new(Horizontal::Right, Vertical::Bottom);

    pub const ALL: [Anchor; 9] = [
        Anchor::LT,
        Anchor::MT,
        Anchor::RT,
        Anchor::LM,
        Anchor::MM,
        Anchor::RM,
        Anchor::LB,
        Anchor::MB,
        Anchor::RB,
    ];

    pub const fn new(horizontal: Horizontal, vertical: Vertical) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match (self.horizontal, self.vertical) {
            (Horizontal::Left, Vertical::Top) => "lt",
            (Horizontal::Middle, Vertical::Top) => "mt",
            (Horizontal::Right, Vertical::Top) => "rt",
            (Horizontal::Left, Vertical::Middle) => "lm",
            (Horizontal::Middle, Vertical::Middle) => "mm",
            (Horizontal::Right, Vertical::Middle) => "rm",
            (Horizontal::Left, Vertical::Bottom) => "lb",
            (Horizontal::Middle, Vertical::Bottom) => "mb",
            (Horizontal::Right, Vertical::Bottom) => "rb",
        }
    }
}

impl Default for Anchor {
    fn default() -> Self {
        Anchor::LT
    }
}

impl FromStr for Anchor {
    type Err = AwesomeTableError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let mut chars = raw.chars();
        let (Some(h), Some(v), None) = (chars.next(), chars.next(), chars.next()) else {
            return Err(AwesomeTableError::InvalidAnchor(raw.to_string()));
        };
        let horizontal = match h {
            'l' => Horizontal::Left,
            'm' => Horizontal::Middle,
            'r' => Horizontal::Right,
            _ => return Err(AwesomeTableError::InvalidAnchor(raw.to_string())),
        };
        let vertical = match v {
            't' => Vertical::Top,
            'm' => Vertical::Middle,
            'b' => Vertical::Bottom,
            _ => return Err(AwesomeTableError::InvalidAnchor(raw.to_string())),
        };
        Ok(Anchor::new(horizontal, vertical))
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchor_codes_round_trip_through_parse() {
        for anchor in Anchor::ALL {
            assert_eq!(anchor.as_str().parse::<Anchor>().unwrap(), anchor);
        }
    }

    #[test]
    fn anchor_parse_rejects_unknown_codes() {
        for raw in ["", "l", "ltt", "xx", "tl", "la", "ls"] {
            let err = raw.parse::<Anchor>().unwrap_err();
            assert!(matches!(err, AwesomeTableError::InvalidAnchor(_)), "{raw}");
        }
    }

    #[test]
    fn bbox_middle_floors_negative_sums() {
        assert_eq!(BBox::new(0, -3, 4, 0).middle_y(), -2);
        assert_eq!(BBox::new(0, 1, 4, 4).middle_y(), 2);
    }

    #[test]
    fn point_formats_as_label_pair() {
        assert_eq!(Point::new(3, -4).to_string(), "3;-4");
    }
}

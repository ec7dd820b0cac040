use crate::canvas::Canvas;
use crate::error::AwesomeTableError;
use crate::types::{Color, Point};
use std::fmt;
use std::str::FromStr;

const DEFAULT_DASH: u32 = 4;
const DEFAULT_GAP: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LineMode {
    #[default]
    Solid,
    Dashed,
    Custom {
        dash: u32,
        gap: u32,
    },
}

impl LineMode {
    pub fn dash_gap(&self) -> Option<(u32, u32)> {
        match self {
            LineMode::Solid => None,
            LineMode::Dashed => Some((DEFAULT_DASH, DEFAULT_GAP)),
            LineMode::Custom { dash, gap } => Some((*dash, *gap)),
        }
    }
}

/// Parses the compact mode strings: `s`, `d`, or `s<dash>d<gap>` such as `s6d3`.
impl FromStr for LineMode {
    type Err = AwesomeTableError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "s" => return Ok(LineMode::Solid),
            "d" => return Ok(LineMode::Dashed),
            _ => {}
        }
        let invalid = || AwesomeTableError::InvalidLineMode(raw.to_string());
        let rest = raw.strip_prefix('s').ok_or_else(invalid)?;
        let (dash, gap) = rest.split_once('d').ok_or_else(invalid)?;
        let dash: u32 = dash.parse().map_err(|_| invalid())?;
        let gap: u32 = gap.parse().map_err(|_| invalid())?;
        if dash == 0 || i32::try_from(dash).is_err() || i32::try_from(gap).is_err() {
            return Err(invalid());
        }
        Ok(LineMode::Custom { dash, gap })
    }
}

impl fmt::Display for LineMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineMode::Solid => f.write_str("s"),
            LineMode::Dashed => f.write_str("d"),
            LineMode::Custom { dash, gap } => write!(f, "s{}d{}", dash, gap),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub start: Point,
    pub end: Point,
    pub width: u32,
    pub fill: Color,
    pub mode: LineMode,
}

impl Line {
    pub fn new(start: Point, end: Point) -> Self {
        Self {
            start,
            end,
            width: 1,
            fill: Color::TRANSPARENT,
            mode: LineMode::Solid,
        }
    }

    pub fn with_width(mut self, width: u32) -> Self {
        self.width = width;
        self
    }

    pub fn with_fill(mut self, fill: Color) -> Self {
        self.fill = fill;
        self
    }

    pub fn with_mode(mut self, mode: LineMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn is_vertical(&self) -> bool {
        self.start.x == self.end.x
    }

    pub fn is_horizontal(&self) -> bool {
        self.start.y == self.end.y
    }

    pub fn move_by(&mut self, dx: i32, dy: i32) {
        self.start = self.start.offset(dx, dy);
        self.end = self.end.offset(dx, dy);
    }

    pub fn moved(&self, dx: i32, dy: i32) -> Line {
        let mut line = self.clone();
        line.move_by(dx, dy);
        line
    }

    pub fn move_start(&mut self, dx: i32, dy: i32) {
        self.start = self.start.offset(dx, dy);
    }

    pub fn move_end(&mut self, dx: i32, dy: i32) {
        self.end = self.end.offset(dx, dy);
    }

    /// Painted pieces of the line: the whole segment when solid, the dashes
    /// otherwise. Fails for slanted lines before producing anything.
    pub fn segments(&self) -> Result<Vec<(Point, Point)>, AwesomeTableError> {
        if !self.is_vertical() && !self.is_horizontal() {
            return Err(AwesomeTableError::InvalidLine(format!(
                "({}) -> ({}) is neither vertical nor horizontal",
                self.start, self.end
            )));
        }
        let Some((dash, gap)) = self.mode.dash_gap() else {
            return Ok(vec![(self.start, self.end)]);
        };
        let invalid = || AwesomeTableError::InvalidLineMode(self.mode.to_string());
        let dash = i32::try_from(dash).map_err(|_| invalid())?;
        let gap = i32::try_from(gap).map_err(|_| invalid())?;
        if dash == 0 {
            return Err(invalid());
        }
        let step = dash
            .checked_add(gap)
            .and_then(|step| usize::try_from(step).ok())
            .ok_or_else(invalid)?;
        let mut out = Vec::new();
        if self.is_vertical() {
            let x = self.start.x;
            let (from, to) = ordered(self.start.y, self.end.y);
            for y in (from..to).step_by(step) {
                out.push((Point::new(x, y), Point::new(x, y.saturating_add(dash).min(to))));
            }
        } else {
            let y = self.start.y;
            let (from, to) = ordered(self.start.x, self.end.x);
            for x in (from..to).step_by(step) {
                out.push((Point::new(x, y), Point::new(x.saturating_add(dash).min(to), y)));
            }
        }
        Ok(out)
    }

    pub fn render(&self, canvas: &mut Canvas) -> Result<(), AwesomeTableError> {
        let segments = self.segments()?;
        canvas.set_fill_color(self.fill);
        canvas.set_line_width(self.width);
        for (start, end) in segments {
            canvas.draw_line(start, end);
        }
        Ok(())
    }
}

fn ordered(a: i32, b: i32) -> (i32, i32) {
    if a <= b { (a, b) } else { (b, a) }
}

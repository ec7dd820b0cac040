use crate::font::FontFace;
use crate::types::{Anchor, BBox, Color, Point, Size};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub enum Command {
    SetFillColor(Color),
    SetLineWidth(u32),
    // Axis-aligned segment; both endpoints are painted.
    DrawLine {
        start: Point,
        end: Point,
    },
    FillRect(BBox),
    DrawText {
        xy: Point,
        text: String,
        face: Arc<dyn FontFace>,
        anchor: Anchor,
        stroke_width: u32,
        stroke_fill: Option<Color>,
    },
}

#[derive(Debug, Clone)]
struct GraphicsState {
    fill_color: Color,
    line_width: u32,
}

/// Records draw commands for one layer; `raster::rasterize` replays them.
pub struct Canvas {
    size: Size,
    commands: Vec<Command>,
    current_state: GraphicsState,
}

impl Canvas {
    pub fn new(size: Size) -> Self {
        Self {
            size,
            commands: Vec::new(),
            current_state: GraphicsState {
                fill_color: Color::BLACK,
                line_width: 1,
            },
        }
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn set_fill_color(&mut self, color: Color) {
        if self.current_state.fill_color == color {
            return;
        }
        self.current_state.fill_color = color;
        self.commands.push(Command::SetFillColor(color));
    }

    pub fn set_line_width(&mut self, width: u32) {
        if self.current_state.line_width == width {
            return;
        }
        self.current_state.line_width = width;
        self.commands.push(Command::SetLineWidth(width));
    }

    pub fn draw_line(&mut self, start: Point, end: Point) {
        self.commands.push(Command::DrawLine { start, end });
    }

    pub fn fill_rect(&mut self, bbox: BBox) {
        self.commands.push(Command::FillRect(bbox));
    }

    pub fn draw_text(
        &mut self,
        xy: Point,
        text: &str,
        face: Arc<dyn FontFace>,
        anchor: Anchor,
        stroke_width: u32,
        stroke_fill: Option<Color>,
    ) {
        self.commands.push(Command::DrawText {
            xy,
            text: text.to_string(),
            face,
            anchor,
            stroke_width,
            stroke_fill,
        });
    }

    pub fn finish(self) -> Vec<Command> {
        self.commands
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_changes_are_deduplicated() {
        let mut canvas = Canvas::new(Size::new(10, 10));
        canvas.set_fill_color(Color::BLACK);
        canvas.set_line_width(1);
        assert!(canvas.commands().is_empty());

        canvas.set_fill_color(Color::WHITE);
        canvas.set_fill_color(Color::WHITE);
        canvas.set_line_width(3);
        canvas.draw_line(Point::new(0, 0), Point::new(0, 5));
        let commands = canvas.finish();
        assert_eq!(commands.len(), 3);
        assert!(matches!(commands[0], Command::SetFillColor(c) if c == Color::WHITE));
        assert!(matches!(commands[1], Command::SetLineWidth(3)));
    }
}

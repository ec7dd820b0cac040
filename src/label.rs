use crate::geometry::Rect;
use crate::types::Point;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LabelKey {
    Text,
    Cell,
    Image,
}

impl LabelKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            LabelKey::Text => "text",
            LabelKey::Cell => "cell",
            LabelKey::Image => "image",
        }
    }
}

impl fmt::Display for LabelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Annotation record. The quad is a snapshot taken at construction, in
/// topleft, topright, bottomright, bottomleft order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    pub quad: [Point; 4],
    pub key: LabelKey,
    pub content: String,
}

impl Label {
    pub fn new(quad: [Point; 4], key: LabelKey, content: impl Into<String>) -> Self {
        Self {
            quad,
            key,
            content: content.into(),
        }
    }

    pub fn from_rect(rect: &Rect, key: LabelKey, content: impl Into<String>) -> Self {
        Self::new(
            [
                rect.topleft(),
                rect.topright(),
                rect.bottomright(),
                rect.bottomleft(),
            ],
            key,
            content,
        )
    }

    pub fn points(&self) -> &[Point; 4] {
        &self.quad
    }

    pub fn key_content(&self) -> String {
        format!("{}@{}", self.key, self.content)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for point in &self.quad {
            write!(f, "{point};")?;
        }
        write!(f, "{}@{}", self.key, self.content)
    }
}

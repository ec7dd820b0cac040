use crate::error::AwesomeTableError;
use crate::geometry::Rect;
use crate::label::{Label, LabelKey};
use crate::raster;
use crate::types::{BBox, Point};
use image::{DynamicImage, GrayImage, RgbaImage};

/// Where an inset goes: a top-left point (rect sized to the image) or an
/// explicit box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    At(Point),
    Box(BBox),
}

impl Default for Placement {
    fn default() -> Self {
        Placement::At(Point::ORIGIN)
    }
}

/// Raster inset pasted over the composite at its rect's top-left.
#[derive(Debug, Clone)]
pub struct ImageInfo {
    rect: Rect,
    image: RgbaImage,
    mask: Option<GrayImage>,
}

impl ImageInfo {
    /// Without an explicit mask, images carrying alpha use their alpha
    /// channel and grayscale images their luminance.
    pub fn new(image: DynamicImage, placement: Placement, mask: Option<GrayImage>) -> Self {
        let rect = match placement {
            Placement::At(at) => Rect::new(at.x, at.y, image.width() as i32, image.height() as i32),
            Placement::Box(bbox) => Rect::from_bbox(bbox),
        };
        let mask = mask.or_else(|| default_mask(&image));
        Self {
            rect,
            image: image.to_rgba8(),
            mask,
        }
    }

    /// Decodes `source` (file path or `data:` URI) and places it.
    pub fn load(source: &str, placement: Placement) -> Result<Self, AwesomeTableError> {
        let image = raster::load_image(source)?;
        Ok(Self::new(image, placement, None))
    }

    pub fn rect(&self) -> &Rect {
        &self.rect
    }

    pub fn topleft(&self) -> Point {
        self.rect.topleft()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn mask(&self) -> Option<&GrayImage> {
        self.mask.as_ref()
    }

    pub fn label(&self) -> Label {
        Label::from_rect(&self.rect, LabelKey::Image, "")
    }
}

fn default_mask(image: &DynamicImage) -> Option<GrayImage> {
    match image {
        DynamicImage::ImageLuma8(gray) => Some(gray.clone()),
        img if img.color().has_alpha() => Some(raster::alpha_channel(&img.to_rgba8())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgb, RgbImage, Rgba};

    #[test]
    fn point_placement_sizes_rect_to_image() {
        let info = ImageInfo::new(
            DynamicImage::ImageRgb8(RgbImage::from_pixel(7, 3, Rgb([1, 2, 3]))),
            Placement::At(Point::new(5, 6)),
            None,
        );
        assert_eq!(info.rect().bbox(), BBox::new(5, 6, 12, 9));
        assert!(info.mask().is_none());
        assert_eq!(info.label().to_string(), "5;6;12;6;12;9;5;9;image@");
    }

    #[test]
    fn box_placement_uses_the_box() {
        let info = ImageInfo::new(
            DynamicImage::ImageRgb8(RgbImage::new(2, 2)),
            Placement::Box(BBox::new(1, 1, 40, 30)),
            None,
        );
        assert_eq!(info.rect().bbox(), BBox::new(1, 1, 40, 30));
        assert_eq!(info.topleft(), Point::new(1, 1));
    }

    #[test]
    fn default_masks_follow_the_color_type() {
        let rgba = RgbaImage::from_pixel(2, 2, Rgba([9, 9, 9, 77]));
        let info = ImageInfo::new(DynamicImage::ImageRgba8(rgba), Placement::default(), None);
        assert_eq!(info.mask().unwrap().get_pixel(0, 0).0, [77]);

        let gray = GrayImage::from_pixel(2, 2, Luma([140]));
        let info = ImageInfo::new(DynamicImage::ImageLuma8(gray), Placement::default(), None);
        assert_eq!(info.mask().unwrap().get_pixel(1, 1).0, [140]);

        let explicit = GrayImage::from_pixel(2, 2, Luma([3]));
        let info = ImageInfo::new(
            DynamicImage::ImageRgb8(RgbImage::new(2, 2)),
            Placement::default(),
            Some(explicit),
        );
        assert_eq!(info.mask().unwrap().get_pixel(0, 1).0, [3]);
    }

    #[test]
    fn missing_files_fail_to_load() {
        let err = ImageInfo::load("/nonexistent/awesometable/inset.png", Placement::default())
            .unwrap_err();
        assert!(matches!(err, AwesomeTableError::Io(_)));
    }
}

//! Dark pixel coverage of a bitmap.

use image::DynamicImage;

/// Fraction of pixels whose luma is below `dark_luma`.
///
/// Transparent pixels are treated as paper.
pub fn ink_coverage(image: &DynamicImage, dark_luma: u8) -> f32 {
    let total = u64::from(image.width()) * u64::from(image.height());
    if total == 0 {
        return 0.0;
    }

    let dark = if image.color().has_alpha() {
        image
            .to_luma_alpha8()
            .pixels()
            .filter(|p| p.0[1] > 0 && p.0[0] < dark_luma)
            .count()
    } else {
        image
            .to_luma8()
            .pixels()
            .filter(|p| p.0[0] < dark_luma)
            .count()
    };

    (dark as f64 / total as f64) as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, LumaA, Rgb, RgbImage};

    #[test]
    fn test_empty_image() {
        let img = DynamicImage::ImageLuma8(GrayImage::new(0, 0));
        assert_eq!(ink_coverage(&img, 128), 0.0);
    }

    #[test]
    fn test_half_dark() {
        let mut img = GrayImage::from_pixel(2, 2, Luma([255]));
        img.put_pixel(0, 0, Luma([10]));
        img.put_pixel(1, 0, Luma([127]));
        assert_eq!(ink_coverage(&DynamicImage::ImageLuma8(img), 128), 0.5);
    }

    #[test]
    fn test_color_pixels_use_luma() {
        let mut img = RgbImage::from_pixel(4, 1, Rgb([255, 255, 255]));
        img.put_pixel(0, 0, Rgb([0, 0, 255]));
        img.put_pixel(1, 0, Rgb([255, 255, 0]));
        let coverage = ink_coverage(&DynamicImage::ImageRgb8(img), 128);
        assert_eq!(coverage, 0.25);
    }

    #[test]
    fn test_transparent_pixels_are_paper() {
        let mut img = image::GrayAlphaImage::from_pixel(2, 1, LumaA([0, 0]));
        img.put_pixel(1, 0, LumaA([0, 255]));
        assert_eq!(ink_coverage(&DynamicImage::ImageLumaA8(img), 128), 0.5);
    }
}

use std::io::Cursor;

use image::ImageFormat;

use crate::core::error::{AppError, Result};

/// Crop the largest centred square out of an encoded image.
///
/// The output keeps the input's encoding. Only PNG and JPEG are accepted.
pub fn center_square_crop(data: &[u8]) -> Result<(Vec<u8>, ImageFormat)> {
    let format = image::guess_format(data)
        .map_err(|e| AppError::BadRequest(format!("Unrecognised image data: {}", e)))?;

    if !matches!(format, ImageFormat::Png | ImageFormat::Jpeg) {
        return Err(AppError::BadRequest(format!(
            "Unsupported image format: {:?}",
            format
        )));
    }

    let image = image::load_from_memory_with_format(data, format)
        .map_err(|e| AppError::BadRequest(format!("Failed to decode image: {}", e)))?;

    let side = image.width().min(image.height());
    let x = (image.width() - side) / 2;
    let y = (image.height() - side) / 2;
    let cropped = image.crop_imm(x, y, side, side);

    let mut out = Cursor::new(Vec::new());
    cropped
        .write_to(&mut out, format)
        .map_err(|e| AppError::Internal(format!("Failed to encode cropped image: {}", e)))?;

    Ok((out.into_inner(), format))
}

pub fn extension_for(format: ImageFormat) -> &'static str {
    match format {
        ImageFormat::Png => "png",
        _ => "jpg",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn encode(image: &RgbImage, format: ImageFormat) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        image.write_to(&mut out, format).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_landscape_crops_to_centre() {
        // Left and right quarters red, centre green
        let image = RgbImage::from_fn(8, 4, |x, _| {
            if (2..6).contains(&x) {
                Rgb([0, 255, 0])
            } else {
                Rgb([255, 0, 0])
            }
        });

        let (data, format) = center_square_crop(&encode(&image, ImageFormat::Png)).unwrap();
        assert_eq!(format, ImageFormat::Png);

        let cropped = image::load_from_memory(&data).unwrap().to_rgb8();
        assert_eq!(cropped.dimensions(), (4, 4));
        assert!(cropped.pixels().all(|p| *p == Rgb([0, 255, 0])));
    }

    #[test]
    fn test_portrait_jpeg_stays_jpeg() {
        let image = RgbImage::from_pixel(6, 10, Rgb([10, 20, 30]));

        let (data, format) = center_square_crop(&encode(&image, ImageFormat::Jpeg)).unwrap();
        assert_eq!(format, ImageFormat::Jpeg);
        assert_eq!(extension_for(format), "jpg");

        let cropped = image::load_from_memory(&data).unwrap();
        assert_eq!((cropped.width(), cropped.height()), (6, 6));
    }

    #[test]
    fn test_rejects_non_image() {
        assert!(matches!(
            center_square_crop(b"definitely not an image"),
            Err(AppError::BadRequest(_))
        ));
    }
}

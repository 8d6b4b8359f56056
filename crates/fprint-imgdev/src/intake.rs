//! Raw image intake.
//!
//! Drivers may hand over an image without dimensions and rely on the
//! declared sensor size instead. Declared dimensions always win over what
//! the image carries.

use fprint_core::{Error, Result};
use fprint_hardware::{DriverConfig, Image};

/// Resolve dimensions, check sanity and convert to standard orientation.
///
/// # Errors
///
/// Returns [`Error::InvalidImage`] if a dimension is still unknown after
/// applying the declared size, or if the pixel buffer does not match the
/// dimensions.
///
/// # Examples
///
/// ```
/// use fprint_hardware::{DriverConfig, Image};
/// use fprint_imgdev::intake::prepare;
///
/// let config = DriverConfig::default().with_dimensions(2, 2);
/// let image = prepare(Image::new(0, 0, vec![0; 4]), &config).unwrap();
/// assert_eq!((image.width, image.height), (2, 2));
/// ```
pub fn prepare(mut image: Image, config: &DriverConfig) -> Result<Image> {
    if let Some(width) = config.declared_width() {
        image.width = width;
    }
    if let Some(height) = config.declared_height() {
        image.height = height;
    }

    if image.width == 0 || image.height == 0 {
        return Err(Error::InvalidImage(format!(
            "unresolved dimensions {}x{}",
            image.width, image.height
        )));
    }
    if !image.is_sane() {
        return Err(Error::InvalidImage(format!(
            "{}x{} image with {} bytes",
            image.width,
            image.height,
            image.data.len()
        )));
    }

    image.standardize();
    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fprint_hardware::ImageFlags;
    use rstest::rstest;

    #[test]
    fn test_declared_dimensions_override() {
        let config = DriverConfig::default().with_dimensions(4, 2);
        let image = prepare(Image::new(2, 4, vec![0; 8]), &config).unwrap();
        assert_eq!((image.width, image.height), (4, 2));
    }

    #[test]
    fn test_image_dimensions_used_when_undeclared() {
        let image = prepare(Image::new(3, 3, vec![0; 9]), &DriverConfig::default()).unwrap();
        assert_eq!((image.width, image.height), (3, 3));
    }

    #[rstest]
    #[case(Image::new(0, 3, vec![0; 9]))]
    #[case(Image::new(3, 0, vec![0; 9]))]
    #[case(Image::new(3, 3, vec![0; 8]))]
    #[case(Image::new(3, 3, vec![]))]
    fn test_rejected_images(#[case] image: Image) {
        let result = prepare(image, &DriverConfig::default());
        assert!(matches!(result, Err(Error::InvalidImage(_))));
    }

    #[test]
    fn test_output_is_standardized() {
        let flags = ImageFlags {
            v_flipped: false,
            h_flipped: true,
            colors_inverted: false,
        };
        let raw = Image::new(2, 1, vec![10, 20]).with_flags(flags);

        let image = prepare(raw, &DriverConfig::default()).unwrap();
        assert_eq!(image.data, vec![20, 10]);
        assert!(image.flags.is_standard());
    }
}

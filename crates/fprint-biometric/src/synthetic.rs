//! Synthetic finger images for demos and tests.
//!
//! Images are white with short dark ridge segments laid out on an 8x8 pixel
//! grid. Every segment yields exactly two ridge endings, so an image with
//! `n` segments carries `2n` minutiae. The `variant` flips the orientation
//! of every segment, producing a print that does not match the original.

use fprint_hardware::Image;

const CELL: u32 = 8;
const MARGIN: u32 = 2;
const SEGMENT_LEN: u32 = 5;

/// Number of segments that fit in an image of the given size.
pub fn capacity(width: u32, height: u32) -> usize {
    let cols = width.saturating_sub(MARGIN) / CELL;
    let rows = height.saturating_sub(MARGIN) / CELL;
    (cols * rows) as usize
}

/// Render a synthetic finger with `segments` ridge segments.
///
/// Segments beyond the image [`capacity`] are dropped.
///
/// # Examples
///
/// ```
/// use fprint_biometric::synthetic;
///
/// let image = synthetic::finger(64, 64, 6, 0);
/// assert!(image.is_sane());
/// ```
pub fn finger(width: u32, height: u32, segments: usize, variant: u32) -> Image {
    let mut data = vec![255u8; width as usize * height as usize];
    let cols = width.saturating_sub(MARGIN) / CELL;
    let count = segments.min(capacity(width, height));

    for k in 0..count as u32 {
        let x0 = MARGIN + (k % cols) * CELL;
        let y0 = MARGIN + (k / cols) * CELL;
        let vertical = (k + variant) % 2 == 1;

        for step in 0..SEGMENT_LEN {
            let (x, y) = if vertical {
                (x0, y0 + step)
            } else {
                (x0 + step, y0)
            };
            data[(y * width + x) as usize] = 0;
        }
    }

    Image::new(width, height, data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::extract_minutiae;
    use rstest::rstest;

    #[rstest]
    #[case(0, 0)]
    #[case(4, 8)]
    #[case(5, 10)]
    #[case(6, 12)]
    fn test_minutiae_per_segment(#[case] segments: usize, #[case] minutiae: usize) {
        let image = finger(64, 64, segments, 0);
        let item = extract_minutiae(&image).unwrap();
        assert_eq!(item.minutiae_count(), minutiae);
    }

    #[test]
    fn test_capacity_limits_segments() {
        assert_eq!(capacity(18, 10), 2);
        let image = finger(18, 10, 5, 0);
        let item = extract_minutiae(&image).unwrap();
        assert_eq!(item.minutiae_count(), 4);
    }

    #[test]
    fn test_variants_differ() {
        assert_ne!(finger(32, 32, 3, 0).data, finger(32, 32, 3, 1).data);
        assert_eq!(finger(32, 32, 3, 0).data, finger(32, 32, 3, 2).data);
    }
}

//! Minutiae extraction from a standardized raster.
//!
//! Pixels darker than the midpoint of the image's contrast range are ridge
//! pixels. Each ridge pixel is classified by its crossing number, the number
//! of ridge/background transitions around its 8-neighborhood: one transition
//! marks a ridge ending, three mark a bifurcation. The image is expected to
//! hold thinned (one pixel wide) ridges.

use fprint_hardware::Image;
use tracing::debug;

use crate::error::{BiometricError, Result};
use crate::print::{Minutia, MinutiaKind, PrintItem};

/// 8-neighborhood in circular order; entry `i` points at `i * 45` degrees
/// with y growing downwards.
const NEIGHBORS: [(i32, i32); 8] = [
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Extract minutiae from a sane, standardized image.
///
/// # Errors
///
/// Returns an error if the image dimensions do not match its pixel buffer.
pub fn extract_minutiae(image: &Image) -> Result<PrintItem> {
    if !image.is_sane() {
        return Err(BiometricError::image_rejected(format!(
            "{}x{} image with {} bytes",
            image.width,
            image.height,
            image.data.len()
        )));
    }

    let Some(threshold) = ridge_threshold(&image.data) else {
        debug!("image has no contrast, no minutiae");
        return Ok(PrintItem::default());
    };

    let is_ridge = |x: i64, y: i64| -> bool {
        if x < 0 || y < 0 {
            return false;
        }
        image
            .pixel(x as u32, y as u32)
            .is_some_and(|value| value < threshold)
    };

    let mut minutiae = Vec::new();
    for y in 1..image.height.saturating_sub(1) {
        for x in 1..image.width.saturating_sub(1) {
            let (cx, cy) = (x as i64, y as i64);
            if !is_ridge(cx, cy) {
                continue;
            }

            let ring: Vec<bool> = NEIGHBORS
                .iter()
                .map(|(dx, dy)| is_ridge(cx + *dx as i64, cy + *dy as i64))
                .collect();
            let transitions = (0..8).filter(|&i| ring[i] != ring[(i + 1) % 8]).count();

            match transitions / 2 {
                1 => {
                    let direction = ring
                        .iter()
                        .position(|&ridge| ridge)
                        .map(|i| (((i + 4) % 8) * 45) as u16)
                        .unwrap_or(0);
                    minutiae.push(Minutia::new(x, y, direction, MinutiaKind::Ending));
                }
                3 => minutiae.push(Minutia::new(x, y, 0, MinutiaKind::Bifurcation)),
                _ => {}
            }
        }
    }

    debug!(count = minutiae.len(), "extracted minutiae");
    Ok(PrintItem::new(minutiae))
}

/// Midpoint of the contrast range, `None` for a flat image.
fn ridge_threshold(data: &[u8]) -> Option<u8> {
    let min = *data.iter().min()?;
    let max = *data.iter().max()?;
    if min == max {
        return None;
    }
    Some(((min as u16 + max as u16 + 1) / 2) as u8)
}

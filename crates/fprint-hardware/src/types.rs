//! Common types shared between drivers and the session core.
//!
//! This module defines the driver description and the raster image a driver
//! hands to the core when a scan completes.

use serde::{Deserialize, Serialize};

/// Driver identification.
///
/// The driver name is stamped into every print produced through the driver so
/// prints can be checked for compatibility before a comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverInfo {
    /// Short driver name (e.g., "uru4000", "mock").
    pub name: String,

    /// Human-readable device description.
    pub full_name: String,

    /// Device type discriminator within the driver.
    pub devtype: u32,
}

impl DriverInfo {
    /// Create a new DriverInfo with required fields.
    pub fn new(name: impl Into<String>, full_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            full_name: full_name.into(),
            devtype: 0,
        }
    }

    /// Set the device type.
    pub fn with_devtype(mut self, devtype: u32) -> Self {
        self.devtype = devtype;
        self
    }
}

/// Orientation and color flags reported with a raw image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageFlags {
    /// Rows are stored bottom to top.
    pub v_flipped: bool,

    /// Columns are stored right to left.
    pub h_flipped: bool,

    /// Ridges are light on a dark background.
    pub colors_inverted: bool,
}

impl ImageFlags {
    /// Whether the image is already in standard orientation and polarity.
    pub fn is_standard(&self) -> bool {
        !self.v_flipped && !self.h_flipped && !self.colors_inverted
    }
}

/// 8-bit grayscale raster image captured by a sensor.
///
/// A width or height of `0` means the driver left the dimension to the
/// declared sensor size; it is resolved during intake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    /// Image width in pixels.
    pub width: u32,

    /// Image height in pixels.
    pub height: u32,

    /// Row-major pixel data, one byte per pixel.
    pub data: Vec<u8>,

    /// Orientation and polarity of `data`.
    pub flags: ImageFlags,

    /// When the image was captured.
    pub captured_at: chrono::DateTime<chrono::Utc>,
}

impl Image {
    /// Create a new image with standard flags and the current timestamp.
    ///
    /// # Examples
    ///
    /// ```
    /// use fprint_hardware::types::Image;
    ///
    /// let image = Image::new(4, 2, vec![255; 8]);
    /// assert!(image.is_sane());
    /// ```
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            data,
            flags: ImageFlags::default(),
            captured_at: chrono::Utc::now(),
        }
    }

    /// Set the image flags.
    pub fn with_flags(mut self, flags: ImageFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Number of pixels implied by the dimensions, `None` on overflow.
    pub fn expected_len(&self) -> Option<usize> {
        (self.width as usize).checked_mul(self.height as usize)
    }

    /// Check that the dimensions are set and agree with the pixel buffer.
    pub fn is_sane(&self) -> bool {
        if self.width == 0 || self.height == 0 || self.data.is_empty() {
            return false;
        }
        self.expected_len() == Some(self.data.len())
    }

    /// Pixel value at `(x, y)`, `None` outside the image.
    pub fn pixel(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let index = y as usize * self.width as usize + x as usize;
        self.data.get(index).copied()
    }

    /// Bring the image to standard orientation and polarity.
    ///
    /// Undoes vertical and horizontal flips and color inversion, then clears
    /// the flags. Must only be called on a sane image.
    pub fn standardize(&mut self) {
        let width = self.width as usize;

        if self.flags.v_flipped {
            let rows: Vec<Vec<u8>> = self.data.chunks(width).rev().map(<[u8]>::to_vec).collect();
            self.data = rows.concat();
        }

        if self.flags.h_flipped {
            for row in self.data.chunks_mut(width) {
                row.reverse();
            }
        }

        if self.flags.colors_inverted {
            for pixel in &mut self.data {
                *pixel = 255 - *pixel;
            }
        }

        self.flags = ImageFlags::default();
    }
}

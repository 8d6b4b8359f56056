//! Per-scan acquisition buffer.

use fprint_biometric::PrintData;
use fprint_hardware::Image;

/// Image and extracted fragment of the scan in flight.
///
/// Both slots are released before a result is delivered and whenever the
/// scan is cancelled.
#[derive(Debug, Default)]
pub struct AcquisitionBuffer {
    image: Option<Image>,
    print: Option<PrintData>,
}

impl AcquisitionBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store_image(&mut self, image: Image) {
        self.image = Some(image);
    }

    pub fn image(&self) -> Option<&Image> {
        self.image.as_ref()
    }

    pub fn take_image(&mut self) -> Option<Image> {
        self.image.take()
    }

    pub fn store_print(&mut self, print: PrintData) {
        self.print = Some(print);
    }

    pub fn print(&self) -> Option<&PrintData> {
        self.print.as_ref()
    }

    pub fn take_print(&mut self) -> Option<PrintData> {
        self.print.take()
    }

    /// Release both slots.
    pub fn clear(&mut self) {
        self.image = None;
        self.print = None;
    }

    pub fn is_empty(&self) -> bool {
        self.image.is_none() && self.print.is_none()
    }
}

//! Print data store.
//!
//! A [`PrintData`] owns zero or more template fragments ([`PrintItem`]), each
//! derived from exactly one image. Enrollment accumulates one fragment per
//! completed stage; verification and identification use a single-fragment
//! probe. Fragments are prepended in constant time.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Kind of a minutia point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MinutiaKind {
    /// A ridge ends.
    Ending,
    /// A ridge splits in two.
    Bifurcation,
}

/// Distinguishing feature point of a fingerprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Minutia {
    pub x: u32,
    pub y: u32,
    /// Ridge direction in degrees, `0..360`.
    pub direction: u16,
    pub kind: MinutiaKind,
}

impl Minutia {
    pub fn new(x: u32, y: u32, direction: u16, kind: MinutiaKind) -> Self {
        Self {
            x,
            y,
            direction: direction % 360,
            kind,
        }
    }

    /// Squared pixel distance to another minutia.
    pub fn distance_sq(&self, other: &Minutia) -> u64 {
        let dx = self.x.abs_diff(other.x) as u64;
        let dy = self.y.abs_diff(other.y) as u64;
        dx * dx + dy * dy
    }

    /// Smallest angle between the two directions, in degrees.
    pub fn direction_diff(&self, other: &Minutia) -> u16 {
        let diff = self.direction.abs_diff(other.direction);
        diff.min(360 - diff)
    }
}

/// One template fragment, the features of a single image.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrintItem {
    minutiae: Vec<Minutia>,
}

impl PrintItem {
    pub fn new(minutiae: Vec<Minutia>) -> Self {
        Self { minutiae }
    }

    pub fn minutiae(&self) -> &[Minutia] {
        &self.minutiae
    }

    /// Number of distinguishing features in the fragment.
    pub fn minutiae_count(&self) -> usize {
        self.minutiae.len()
    }
}

/// Encoding of the fragments in a print.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrintDataType {
    #[default]
    NbisMinutiae,
}

/// Ownership container for template fragments.
///
/// # Examples
///
/// ```
/// use fprint_biometric::print::{PrintData, PrintItem};
///
/// let mut print = PrintData::new("mock", 0);
/// print.prepend(PrintItem::default());
/// print.prepend(PrintItem::default());
/// assert_eq!(print.len(), 2);
///
/// print.clear();
/// print.clear();
/// assert!(print.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrintData {
    driver: String,
    devtype: u32,
    kind: PrintDataType,
    items: VecDeque<PrintItem>,
}

impl PrintData {
    /// Create an empty print for the given driver.
    pub fn new(driver: impl Into<String>, devtype: u32) -> Self {
        Self {
            driver: driver.into(),
            devtype,
            kind: PrintDataType::NbisMinutiae,
            items: VecDeque::new(),
        }
    }

    /// Create a print holding a single fragment.
    pub fn from_item(driver: impl Into<String>, devtype: u32, item: PrintItem) -> Self {
        let mut print = Self::new(driver, devtype);
        print.prepend(item);
        print
    }

    pub fn driver(&self) -> &str {
        &self.driver
    }

    pub fn devtype(&self) -> u32 {
        self.devtype
    }

    pub fn kind(&self) -> PrintDataType {
        self.kind
    }

    /// Add a fragment at the front.
    pub fn prepend(&mut self, item: PrintItem) {
        self.items.push_front(item);
    }

    /// Remove and return the front fragment.
    pub fn take_first(&mut self) -> Option<PrintItem> {
        self.items.pop_front()
    }

    pub fn items(&self) -> impl Iterator<Item = &PrintItem> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Release every fragment. Releasing an empty print is a no-op.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Whether this print was produced by the given driver and device type.
    pub fn is_compatible(&self, driver: &str, devtype: u32) -> bool {
        self.driver == driver && self.devtype == devtype
    }

    /// Encode the print for storage.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Decode a print produced by [`to_bytes`](Self::to_bytes).
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not a valid encoded print.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(n: u32) -> PrintItem {
        PrintItem::new(
            (0..n)
                .map(|i| Minutia::new(i, i, 0, MinutiaKind::Ending))
                .collect(),
        )
    }

    #[test]
    fn test_prepend_keeps_newest_first() {
        let mut print = PrintData::new("mock", 0);
        print.prepend(item(1));
        print.prepend(item(2));

        let counts: Vec<usize> = print.items().map(PrintItem::minutiae_count).collect();
        assert_eq!(counts, vec![2, 1]);
    }

    #[test]
    fn test_take_first() {
        let mut print = PrintData::from_item("mock", 0, item(3));
        assert_eq!(print.take_first().map(|i| i.minutiae_count()), Some(3));
        assert!(print.take_first().is_none());
        assert!(print.is_empty());
    }

    #[test]
    fn test_clear_is_idempotent() {
        let mut print = PrintData::new("mock", 0);
        print.clear();
        assert!(print.is_empty());

        print.prepend(item(4));
        print.clear();
        print.clear();
        assert_eq!(print.len(), 0);
    }

    #[test]
    fn test_compatibility() {
        let print = PrintData::new("uru4000", 1);
        assert!(print.is_compatible("uru4000", 1));
        assert!(!print.is_compatible("uru4000", 2));
        assert!(!print.is_compatible("mock", 1));
    }

    #[test]
    fn test_bytes_round_trip() {
        let mut print = PrintData::new("mock", 0);
        print.prepend(item(2));
        print.prepend(item(5));

        let bytes = print.to_bytes().unwrap();
        let decoded = PrintData::from_bytes(&bytes).unwrap();
        assert_eq!(decoded, print);
    }

    #[test]
    fn test_from_bytes_rejects_garbage() {
        assert!(PrintData::from_bytes(b"not a print").is_err());
    }

    #[test]
    fn test_minutia_geometry() {
        let a = Minutia::new(10, 10, 350, MinutiaKind::Ending);
        let b = Minutia::new(13, 14, 10, MinutiaKind::Ending);
        assert_eq!(a.distance_sq(&b), 25);
        assert_eq!(a.direction_diff(&b), 20);
        assert_eq!(Minutia::new(0, 0, 360, MinutiaKind::Ending).direction, 0);
    }
}

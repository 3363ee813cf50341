//! Page length units and standard page sizes
//!
//! Every position and size taken by the stamping functions is in PDF points
//! (1/72 inch). [`mm`] and [`cm`] convert caller-friendly lengths.

const MM_PER_INCH: f32 = 25.4;
const POINTS_PER_INCH: f32 = 72.0;

/// Simple length type stored in millimeters
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Length(pub f32);

impl Length {
    /// Create a length from millimeters
    pub fn from_mm(mm: f32) -> Self {
        Length(mm)
    }

    /// Create a length from centimeters
    pub fn from_cm(cm: f32) -> Self {
        Length(cm * 10.0)
    }

    /// Create a length from inches
    pub fn from_inches(inches: f32) -> Self {
        Length(inches * MM_PER_INCH)
    }

    /// Create a length from points (1/72 inch)
    pub fn from_pt(pt: f32) -> Self {
        Length(pt * MM_PER_INCH / POINTS_PER_INCH)
    }

    /// Get the value in millimeters
    pub fn mm(&self) -> f32 {
        self.0
    }

    /// Get the value in points (1/72 inch)
    pub fn pt(&self) -> f32 {
        self.0 * POINTS_PER_INCH / MM_PER_INCH
    }
}

/// Millimeters to points
pub fn mm(value: f32) -> f32 {
    Length::from_mm(value).pt()
}

/// Centimeters to points
pub fn cm(value: f32) -> f32 {
    Length::from_cm(value).pt()
}

/// Page dimensions in points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

impl PageSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// A4 size (210mm × 297mm), the size of every freshly drawn canvas
    pub fn a4() -> Self {
        Self {
            width: mm(210.0),
            height: mm(297.0),
        }
    }

    /// US Letter size (8.5" × 11")
    pub fn letter() -> Self {
        Self {
            width: Length::from_inches(8.5).pt(),
            height: Length::from_inches(11.0).pt(),
        }
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self::a4()
    }
}

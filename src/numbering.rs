//! Page number formatting
//!
//! A page number is printed with an enclosure: a fixed prefix and suffix
//! around the decimal number, e.g. `— 5 —` or `p.5`.

use std::fmt;
use std::str::FromStr;
use crate::error::{Error, Result};

/// Decoration placed around a page number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NumberEnclosure {
    /// `– 5 –`
    EnDash,
    /// `— 5 —`
    #[default]
    EmDash,
    /// `- 5 -`
    Minus,
    /// `(5)`
    Parens,
    /// `p.5`
    Page,
    /// `P.5`
    PageUpper,
}

impl NumberEnclosure {
    /// All enclosures, in key order
    pub const ALL: [NumberEnclosure; 6] = [
        NumberEnclosure::EnDash,
        NumberEnclosure::EmDash,
        NumberEnclosure::Minus,
        NumberEnclosure::Parens,
        NumberEnclosure::Page,
        NumberEnclosure::PageUpper,
    ];

    /// The key used to select this enclosure by name
    pub fn key(&self) -> &'static str {
        match self {
            NumberEnclosure::EnDash => "en_dash",
            NumberEnclosure::EmDash => "em_dash",
            NumberEnclosure::Minus => "minus",
            NumberEnclosure::Parens => "parens",
            NumberEnclosure::Page => "page",
            NumberEnclosure::PageUpper => "Page",
        }
    }

    /// The (prefix, suffix) pair written around the number
    pub fn affixes(&self) -> (&'static str, &'static str) {
        match self {
            NumberEnclosure::EnDash => ("\u{2013} ", " \u{2013}"),
            NumberEnclosure::EmDash => ("\u{2014} ", " \u{2014}"),
            NumberEnclosure::Minus => ("- ", " -"),
            NumberEnclosure::Parens => ("(", ")"),
            NumberEnclosure::Page => ("p.", ""),
            NumberEnclosure::PageUpper => ("P.", ""),
        }
    }
}

impl FromStr for NumberEnclosure {
    type Err = Error;

    /// Keys are case sensitive: `page` and `Page` are different styles.
    fn from_str(key: &str) -> Result<Self> {
        NumberEnclosure::ALL
            .into_iter()
            .find(|encl| encl.key() == key)
            .ok_or_else(|| Error::InvalidEnclosure(key.to_string()))
    }
}

impl fmt::Display for NumberEnclosure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Render a page number with its enclosure
///
/// ```
/// use pdf_stamp_tools::numbering::{format_number, NumberEnclosure};
///
/// assert_eq!(format_number(3, NumberEnclosure::Parens), "(3)");
/// assert_eq!(format_number(12, NumberEnclosure::Page), "p.12");
/// ```
pub fn format_number(num: u32, enclosure: NumberEnclosure) -> String {
    let (prefix, suffix) = enclosure.affixes();
    format!("{prefix}{num}{suffix}")
}

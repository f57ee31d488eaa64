//! Text extraction and page parsing.
//!
//! Everything here is a pure function over strings: regex field extraction
//! ([`text`]), the marketplace page parsers ([`pages`]), the raise-delay
//! rule table ([`timing`]), and system chat notice recognition
//! ([`patterns`]). Keeping the parsers transport-free is what lets the
//! polling modules unit-test against canned HTML.

pub(crate) mod pages;
pub(crate) mod patterns;
pub(crate) mod text;
pub(crate) mod timing;

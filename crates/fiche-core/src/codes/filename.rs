use regex::Regex;
use std::sync::LazyLock;

use crate::model::{CodeMatch, VendorTag};

/// Sheets saved under their bare supplier reference, e.g. `123456.pdf`.
static REFERENCE_FILENAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^([0-9]{5,6})\.pdf$").expect("valid filename pattern"));

/// Optional fast path: a file named after a 5 or 6 digit reference is taken
/// as a sheet of `vendor` carrying that single code, without reading it.
///
/// Off unless the caller supplies a vendor. Content extraction stays the
/// authoritative source for every other file.
pub fn code_from_filename(filename: &str, vendor: &str) -> Option<CodeMatch> {
    let caps = REFERENCE_FILENAME.captures(filename)?;
    Some(CodeMatch {
        codes: vec![caps[1].to_string()],
        vendor: VendorTag::supplier(vendor),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_six_digit_filename() {
        let found = code_from_filename("123456.pdf", "AUTOBEST").unwrap();
        assert_eq!(found.codes, vec!["123456"]);
        assert_eq!(found.vendor, VendorTag::supplier("AUTOBEST"));
    }

    #[test]
    fn test_five_digit_filename_uppercase_extension() {
        let found = code_from_filename("12345.PDF", "AUTOBEST").unwrap();
        assert_eq!(found.codes, vec!["12345"]);
    }

    #[test]
    fn test_other_filenames_not_matched() {
        assert!(code_from_filename("1234.pdf", "AUTOBEST").is_none());
        assert!(code_from_filename("1234567.pdf", "AUTOBEST").is_none());
        assert!(code_from_filename("R123456.pdf", "AUTOBEST").is_none());
        assert!(code_from_filename("123456 v2.pdf", "AUTOBEST").is_none());
        assert!(code_from_filename("123456.pdf.bak", "AUTOBEST").is_none());
    }
}

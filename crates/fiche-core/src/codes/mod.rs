pub mod filename;

use crate::extraction::PageContent;
use crate::model::{CodeMatch, VendorTag};
use crate::rules::schema::Precedence;
use crate::rules::{CompiledVendor, VendorRules};

/// Extract identifying codes from a document's pages.
///
/// Steps:
/// 1. Join the pages in order and collect every barcode match, deduplicated
/// 2. Note which vendor signatures appear on any page
/// 3. An `override` vendor whose code is captured wins outright
/// 4. With no barcode, the first `fallback` vendor present decides the tag,
///    with its captured code if any
/// 5. Otherwise the barcodes are returned as generic codes
pub fn extract_codes(pages: &[PageContent], rules: &VendorRules) -> CodeMatch {
    let page_texts: Vec<String> = pages.iter().map(|p| p.text()).collect();
    // Pages are joined with a newline so digits never run across a page break
    let full_text = page_texts.join("\n");

    let mut barcodes: Vec<String> = Vec::new();
    for m in rules.ean.find_iter(&full_text) {
        let code = m.as_str();
        if !barcodes.iter().any(|c| c == code) {
            barcodes.push(code.to_string());
        }
    }

    let present = |v: &&CompiledVendor| page_texts.iter().any(|t| t.contains(&v.def.signature));

    for vendor in rules.with_precedence(Precedence::Override).filter(present) {
        if let Some(code) = capture_code(vendor, &full_text) {
            tracing::debug!(vendor = %vendor.def.vendor, %code, "vendor code overrides barcodes");
            return CodeMatch {
                codes: vec![code],
                vendor: VendorTag::supplier(&vendor.def.vendor),
            };
        }
        tracing::debug!(vendor = %vendor.def.vendor, "signature found but no code captured");
    }

    if barcodes.is_empty() {
        if let Some(vendor) = rules.with_precedence(Precedence::Fallback).find(present) {
            let code = capture_code(vendor, &full_text);
            if code.is_none() {
                tracing::debug!(vendor = %vendor.def.vendor, "signature found but no code captured");
            }
            return CodeMatch {
                codes: code.into_iter().collect(),
                vendor: VendorTag::supplier(&vendor.def.vendor),
            };
        }
    }

    CodeMatch {
        codes: barcodes,
        vendor: VendorTag::Generic,
    }
}

/// First capture of the vendor's code pattern in the text.
fn capture_code(vendor: &CompiledVendor, text: &str) -> Option<String> {
    vendor
        .code
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|code| !code.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> VendorRules {
        VendorRules::builtin().unwrap()
    }

    fn pages(texts: &[&str]) -> Vec<PageContent> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| PageContent::from_text(i + 1, t))
            .collect()
    }

    #[test]
    fn test_distinct_barcodes_generic() {
        let found = extract_codes(
            &pages(&["EAN 3760123456789\nEAN 3760123456796\nEAN 3760123456789"]),
            &rules(),
        );
        assert_eq!(found.vendor, VendorTag::Generic);
        assert_eq!(found.codes, vec!["3760123456789", "3760123456796"]);
    }

    #[test]
    fn test_barcodes_dedup_across_pages() {
        let found = extract_codes(
            &pages(&["Code: 3760123456789", "rappel 3760123456789", "4006381333931"]),
            &rules(),
        );
        assert_eq!(found.codes, vec!["3760123456789", "4006381333931"]);
    }

    #[test]
    fn test_barcode_must_be_word_bounded() {
        let found = extract_codes(
            &pages(&["serial 37601234567890 and ref X3760123456789"]),
            &rules(),
        );
        assert!(found.codes.is_empty());
        assert_eq!(found.vendor, VendorTag::Generic);
    }

    #[test]
    fn test_digits_do_not_join_across_pages() {
        let found = extract_codes(&pages(&["3760123", "456789"]), &rules());
        assert!(found.codes.is_empty());
    }

    #[test]
    fn test_autobest_overrides_barcodes() {
        let found = extract_codes(
            &pages(&[
                "Fiche produit AUTOBEST\nEAN 3760123456789",
                "123456 AUTOBEST - BP 67 - 67000 STRASBOURG",
            ]),
            &rules(),
        );
        assert_eq!(found.vendor, VendorTag::supplier("AUTOBEST"));
        assert_eq!(found.codes, vec!["123456"]);
    }

    #[test]
    fn test_autobest_signature_without_code_falls_back_to_barcodes() {
        let found = extract_codes(
            &pages(&["Distribué par AUTOBEST\nEAN 3760123456789"]),
            &rules(),
        );
        assert_eq!(found.vendor, VendorTag::Generic);
        assert_eq!(found.codes, vec!["3760123456789"]);
    }

    #[test]
    fn test_lma_code_without_barcodes() {
        let found = extract_codes(
            &pages(&["WORKWEAR 1880   7110 TERREAU\nwww.lma-lebeurre.com"]),
            &rules(),
        );
        assert_eq!(found.vendor, VendorTag::supplier("LMA"));
        assert_eq!(found.codes, vec!["7110"]);
    }

    #[test]
    fn test_lma_without_code_keeps_tag() {
        let found = extract_codes(&pages(&["Veste\nwww.lma-lebeurre.com"]), &rules());
        assert_eq!(found.vendor, VendorTag::supplier("LMA"));
        assert!(found.codes.is_empty());
    }

    #[test]
    fn test_lma_code_needs_four_digits() {
        let found = extract_codes(
            &pages(&["WORKWEAR 1880 711\nwww.lma-lebeurre.com"]),
            &rules(),
        );
        assert_eq!(found.vendor, VendorTag::supplier("LMA"));
        assert!(found.codes.is_empty());
    }

    #[test]
    fn test_lma_ignored_when_barcodes_present() {
        let found = extract_codes(
            &pages(&["WORKWEAR 1880 7110\nwww.lma-lebeurre.com\n3760123456789"]),
            &rules(),
        );
        assert_eq!(found.vendor, VendorTag::Generic);
        assert_eq!(found.codes, vec!["3760123456789"]);
    }

    #[test]
    fn test_marker_without_signature_is_ignored() {
        let found = extract_codes(&pages(&["WORKWEAR 1880 7110"]), &rules());
        assert_eq!(found, CodeMatch::default());
    }
}

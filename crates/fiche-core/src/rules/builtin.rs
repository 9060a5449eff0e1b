use crate::error::FicheError;
use crate::rules::schema::VendorRuleSetDef;

const VENDORS_JSON: &str = include_str!("../../../../rules/vendors.json");

/// Load the built-in vendor rule set (AUTOBEST and LMA sheet formats).
pub fn load_builtin() -> Result<VendorRuleSetDef, FicheError> {
    let ruleset: VendorRuleSetDef = serde_json::from_str(VENDORS_JSON)?;
    Ok(ruleset)
}

//! WASM bindings for medication label scanning.
//!
//! The browser form runs the same date normalizer, label extractor and
//! validation as the CLI and the inventory store.

use wasm_bindgen::prelude::*;

use medinv_core::inventory;
use medinv_core::label::rules::dates::format_canonical;
use medinv_core::label::{FieldSource, LabelParser};
use medinv_core::models::medication::{ExpiryStatus, ExtractedFields, DEFAULT_WARN_WITHIN_DAYS};

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn to_js<T: serde::Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Extract form fields from recognized label text.
///
/// Fields that were not found are left out of the returned object.
#[wasm_bindgen]
pub fn parse_medication_text(text: &str) -> Result<JsValue, JsValue> {
    let result = LabelParser::new().parse(text);
    to_js(&result.fields)
}

/// Normalize an expiry token to `YYYY-MM-DD`.
#[wasm_bindgen]
pub fn normalize_date(token: &str) -> Option<String> {
    medinv_core::normalize_date_str(token)
}

/// Validate a form payload the way the inventory store does.
///
/// Returns the cleaned record, or throws the validation message.
#[wasm_bindgen]
pub fn validate_medication(payload: JsValue) -> Result<JsValue, JsValue> {
    let value: serde_json::Value = serde_wasm_bindgen::from_value(payload)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    let medication = inventory::validate_json(&value.to_string())
        .map_err(|e| JsValue::from_str(&e.to_string()))?;

    to_js(&medication)
}

/// Expiry badge for a date relative to `today` ("expired", "expiring_soon"
/// or "ok").
#[wasm_bindgen]
pub fn expiry_status(date: &str, today: &str) -> Option<String> {
    let expiry = medinv_core::normalize_date(date)?;
    let today = medinv_core::normalize_date(today)?;

    let status = match ExpiryStatus::evaluate(expiry, today, DEFAULT_WARN_WITHIN_DAYS) {
        ExpiryStatus::Expired { .. } => "expired",
        ExpiryStatus::ExpiringSoon { .. } => "expiring_soon",
        ExpiryStatus::Ok { .. } => "ok",
    };
    Some(status.to_string())
}

/// Label scanner class for browser use.
#[wasm_bindgen]
pub struct LabelScanner {
    parser: LabelParser,
}

#[wasm_bindgen]
impl LabelScanner {
    /// Create a new label scanner.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            parser: LabelParser::new(),
        }
    }

    /// Ignore trimmed lines shorter than `length` characters.
    #[wasm_bindgen]
    pub fn set_min_line_length(&mut self, length: usize) {
        self.parser = self.parser.clone().with_min_line_length(length);
    }

    /// Extract form fields from text.
    #[wasm_bindgen]
    pub fn extract(&self, text: &str) -> Result<JsValue, JsValue> {
        to_js(&self.parser.parse(text).fields)
    }

    /// Extract fields along with the message shown to the user.
    #[wasm_bindgen]
    pub fn extract_with_summary(&self, text: &str) -> Result<JsValue, JsValue> {
        let result = self.parser.parse(text);

        #[derive(serde::Serialize)]
        #[serde(rename_all = "camelCase")]
        struct ScanSummary {
            fields: ExtractedFields,
            found: usize,
            message: String,
            expiry_date: Option<String>,
            sources: Vec<FieldSource>,
            warnings: Vec<String>,
        }

        let output = ScanSummary {
            found: result.fields.found_count(),
            message: result.outcome().to_string(),
            expiry_date: result.fields.expiry_date.as_ref().map(format_canonical),
            fields: result.fields,
            sources: result.sources,
            warnings: result.warnings,
        };

        to_js(&output)
    }
}

impl Default for LabelScanner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medinv_core::models::medication::MedicationDraft;
    use serde_json::{json, Value};
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    const LABEL: &str = "Schmerzmittel Forte\nWirkstoff: Paracetamol 500 mg\nMuster Pharma GmbH\nMHD: 05/26";

    fn from_js(value: JsValue) -> Value {
        serde_wasm_bindgen::from_value(value).unwrap()
    }

    fn draft(name: &str) -> JsValue {
        serde_wasm_bindgen::to_value(&MedicationDraft {
            name: name.to_string(),
            manufacturer: "Muster Pharma GmbH".to_string(),
            active_ingredient: "Paracetamol 500 mg".to_string(),
            expiry_date: "05/26".to_string(),
        })
        .unwrap()
    }

    #[wasm_bindgen_test]
    fn test_normalize_date() {
        assert_eq!(normalize_date("05/26").as_deref(), Some("2026-05-31"));
        assert_eq!(normalize_date("31.02.2025"), None);
    }

    #[wasm_bindgen_test]
    fn test_expiry_status() {
        assert_eq!(
            expiry_status("2025-01-31", "2025-02-01").as_deref(),
            Some("expired")
        );
        assert_eq!(
            expiry_status("2025-03-01", "2025-02-01").as_deref(),
            Some("expiring_soon")
        );
        assert_eq!(expiry_status("12/2030", "2025-02-01").as_deref(), Some("ok"));
        assert_eq!(expiry_status("soon", "2025-02-01"), None);
    }

    #[wasm_bindgen_test]
    fn test_parse_medication_text() {
        let fields = from_js(parse_medication_text(LABEL).unwrap());

        assert_eq!(
            fields,
            json!({
                "name": "Schmerzmittel Forte",
                "manufacturer": "Muster Pharma GmbH",
                "activeIngredient": "Paracetamol 500 mg",
                "expiryDate": "2026-05-31"
            })
        );
    }

    #[wasm_bindgen_test]
    fn test_scanner_summary() {
        let scanner = LabelScanner::new();

        let summary = from_js(scanner.extract_with_summary(LABEL).unwrap());
        assert_eq!(summary["found"].as_f64(), Some(4.0));
        assert_eq!(summary["expiryDate"], json!("2026-05-31"));
        assert_eq!(
            summary["message"],
            json!("4 field(s) pre-filled, please review before saving")
        );

        let summary = from_js(scanner.extract_with_summary("???").unwrap());
        assert_eq!(summary["found"].as_f64(), Some(0.0));
        assert_eq!(summary["fields"], json!({}));
        assert_eq!(
            summary["message"],
            json!("text recognized but no clear fields found, please fill in manually")
        );
    }

    #[wasm_bindgen_test]
    fn test_validate_medication() {
        let medication = from_js(validate_medication(draft("Schmerzmittel Forte")).unwrap());
        assert_eq!(medication["name"], json!("Schmerzmittel Forte"));
        assert_eq!(medication["expiryDate"], json!("2026-05-31"));

        let error = validate_medication(draft("X")).unwrap_err();
        assert_eq!(
            error.as_string().as_deref(),
            Some("name must be between 2 and 120 chars")
        );

        assert!(validate_medication(JsValue::NULL).is_err());
    }
}

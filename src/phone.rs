// src/phone.rs
//
// Kenyan MSISDN handling for M-Pesa charges.

const COUNTRY_CODE: &str = "254";
const NORMALIZED_LEN: usize = 12;

/// Reduces a phone number to digits in `254XXXXXXXXX` form.
///
/// Accepts local (`0712…`), international (`+254712…`, `254712…`) and bare
/// subscriber (`712…`) formats. Input that fits none of them is returned as
/// its digits only, which then fails [`validate_phone`].
pub fn normalize_phone(input: &str) -> String {
    let digits: String = input.chars().filter(|c| c.is_ascii_digit()).collect();

    if let Some(rest) = digits.strip_prefix('0') {
        return format!("{COUNTRY_CODE}{rest}");
    }
    // Checked before the bare subscriber case: Kenyan subscriber numbers start
    // with 7 or 1, so nine digits beginning with 254 are a truncated
    // international number and must stay invalid.
    if digits.starts_with(COUNTRY_CODE) {
        return digits;
    }
    if digits.len() == NORMALIZED_LEN - COUNTRY_CODE.len() {
        return format!("{COUNTRY_CODE}{digits}");
    }
    digits
}

pub fn validate_phone(input: &str) -> bool {
    let normalized = normalize_phone(input);
    normalized.len() == NORMALIZED_LEN && normalized.starts_with(COUNTRY_CODE)
}

/// `+254…` form, as the gateway expects for mobile money.
pub fn to_international(input: &str) -> String {
    format!("+{}", normalize_phone(input))
}

use wolfhost::phone::{normalize_phone, to_international, validate_phone};

#[test]
fn local_format_gets_country_code() {
    assert_eq!(normalize_phone("0713046497"), "254713046497");
    assert_eq!(normalize_phone("0110123456"), "254110123456");
}

#[test]
fn international_formats_are_kept() {
    assert_eq!(normalize_phone("254713046497"), "254713046497");
    assert_eq!(normalize_phone("+254713046497"), "254713046497");
    assert_eq!(normalize_phone("+254 713 046 497"), "254713046497");
    assert_eq!(normalize_phone("(254) 713-046-497"), "254713046497");
}

#[test]
fn bare_subscriber_number_gets_country_code() {
    assert_eq!(normalize_phone("713046497"), "254713046497");
}

#[test]
fn every_supported_format_normalizes_to_twelve_digits() {
    for subscriber in ["712345678", "798765432", "110000001"] {
        for input in [
            format!("0{subscriber}"),
            format!("254{subscriber}"),
            format!("+254{subscriber}"),
        ] {
            let normalized = normalize_phone(&input);
            assert_eq!(normalized.len(), 12, "{input}");
            assert!(normalized.starts_with("254"), "{input}");
            assert!(validate_phone(&input), "{input}");
        }
    }
}

#[test]
fn validation_rejects_wrong_lengths_and_prefixes() {
    assert!(validate_phone("0713046497"));
    assert!(!validate_phone("12345"));
    assert!(!validate_phone(""));
    assert!(!validate_phone("07130464971"));
    assert!(!validate_phone("+1 415 555 0100"));
    assert!(!validate_phone("25471304649"));
    assert!(!validate_phone("254123456"));
}

#[test]
fn international_form_has_plus_prefix() {
    assert_eq!(to_international("0713046497"), "+254713046497");
}

#[test]
fn nine_digits_starting_with_country_code_are_not_subscriber_numbers() {
    assert_eq!(normalize_phone("254123456"), "254123456");
    assert_eq!(normalize_phone("712345678"), "254712345678");
}

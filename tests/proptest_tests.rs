// SPDX-License-Identifier: MIT OR Apache-2.0

//! Property-based tests using proptest.
//!
//! These tests check coercion, clamping and parsing against arbitrary input.

use propcfg::adapters::properties_file::{render_value, strip_quotes, unescape};
use propcfg::adapters::PropertiesParser;
use propcfg::domain::{Setting, SettingKind};
use propcfg::ports::SettingsParser;
use proptest::prelude::*;

// Integer defaults are inferred as Integer and read back unchanged
proptest! {
    #[test]
    fn test_integer_default_is_inferred(n in any::<i64>()) {
        let setting = Setting::new(n.to_string(), false);
        prop_assert_eq!(setting.kind(), SettingKind::Integer);
        prop_assert_eq!(setting.get_i64(0), Some(n));
        prop_assert_eq!(setting.get_f64(0), Some(n as f64));
    }
}

// Non-numeric text never changes an Integer setting
proptest! {
    #[test]
    fn test_integer_rejects_words(word in "[a-zA-Z][a-zA-Z ]{0,15}") {
        let setting = Setting::new("30", false);
        prop_assert!(setting.set(&word).is_err());
        prop_assert!(!setting.append(&word));
        prop_assert_eq!(setting.value(), "30");
        prop_assert_eq!(setting.len(), 1);
        prop_assert!(!setting.is_changed());
    }
}

// Integer values are clamped into inclusive bounds
proptest! {
    #[test]
    fn test_integer_clamping(
        value in any::<i64>(),
        minimum in -1000i64..0,
        maximum in 0i64..1000,
    ) {
        let setting = Setting::integer(0)
            .with_bounds(minimum as f64, maximum as f64)
            .build()
            .unwrap();
        setting.set(&value.to_string()).unwrap();
        prop_assert_eq!(setting.get_i64(0), Some(value.clamp(minimum, maximum)));

        // Clamping is idempotent
        let first = setting.value();
        setting.set(&value.to_string()).unwrap();
        prop_assert_eq!(setting.value(), first);
    }
}

// Double values are clamped into inclusive bounds
proptest! {
    #[test]
    fn test_double_clamping(
        value in -1.0e6f64..1.0e6,
        minimum in -100.0f64..0.0,
        maximum in 0.0f64..100.0,
    ) {
        let setting = Setting::double(0.5)
            .with_bounds(minimum, maximum)
            .build()
            .unwrap();
        setting.set(&value.to_string()).unwrap();
        prop_assert_eq!(setting.get_f64(0), Some(value.clamp(minimum, maximum)));
    }
}

// Bounds never rewrite values that are already stored
proptest! {
    #[test]
    fn test_bounds_are_not_retroactive(value in 100i64..10_000) {
        let setting = Setting::integer(0).build().unwrap();
        setting.set(&value.to_string()).unwrap();
        prop_assert!(setting.set_maximum(10.0));
        prop_assert_eq!(setting.get_i64(0), Some(value));
    }
}

// String settings store any text as given
proptest! {
    #[test]
    fn test_string_accepts_anything(text in "\\PC*") {
        let setting = Setting::string("default").build().unwrap();
        setting.set(&text).unwrap();
        prop_assert_eq!(setting.value(), text);
    }
}

// Boolean spellings coerce to the canonical form
proptest! {
    #[test]
    fn test_boolean_spellings(
        truthy in prop::sample::select(vec!["true", "TRUE", "yes", "On", "1"]),
        falsy in prop::sample::select(vec!["false", "No", "off", "0"]),
    ) {
        let setting = Setting::boolean(false).build().unwrap();
        setting.set(truthy).unwrap();
        prop_assert_eq!(setting.value(), "true");
        setting.set(falsy).unwrap();
        prop_assert_eq!(setting.value(), "false");
    }
}

// A single key=value line parses to the trimmed value
proptest! {
    #[test]
    fn test_parser_single_entry(
        key in "[a-zA-Z][a-zA-Z0-9_.]{0,20}",
        value in "[^\\n\\r]{0,40}",
    ) {
        let parser = PropertiesParser::new();
        let entries = parser.parse(&format!("{}={}\n", key, value)).unwrap();
        prop_assert_eq!(entries.len(), 1);
        prop_assert_eq!(entries.get(&key).map(String::as_str), Some(value.trim()));
    }
}

// Any string value written to a file line reads back unchanged
proptest! {
    #[test]
    fn test_string_value_survives_file_line(text in "(?s).{0,40}") {
        let line = format!("motd={}\n", render_value(SettingKind::String, &text));
        let entries = PropertiesParser::new().parse(&line).unwrap();
        prop_assert_eq!(entries.len(), 1);
        let raw = entries.get("motd").unwrap();
        prop_assert_eq!(unescape(strip_quotes(raw)), text);
    }
}

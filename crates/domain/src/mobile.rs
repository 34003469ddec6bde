//! Mobile number canonicalization.
//!
//! Every auth flow keys users and rate limit counters by the canonical
//! mobile: the digits of the user-entered text with one national trunk `0`
//! removed. Spacing, punctuation and a leading `+` never change the key.

use serde::{Deserialize, Serialize};
use tourism_core::{AppError, AppResult};

/// Dial code used when no table entry matches the cleaned digits.
pub const DEFAULT_COUNTRY_CODE: &str = "98";

/// Known dial codes with the total digit count expected for that country.
///
/// Ordered most specific first so a three-digit code is tried before any
/// two-digit code.
const DIAL_CODES: &[DialCode] = &[
    DialCode {
        prefix: "964",
        total_length: 11,
    },
    DialCode {
        prefix: "98",
        total_length: 10,
    },
    DialCode {
        prefix: "93",
        total_length: 9,
    },
    DialCode {
        prefix: "90",
        total_length: 10,
    },
];

#[derive(Debug, Clone, Copy)]
struct DialCode {
    prefix: &'static str,
    total_length: usize,
}

/// Mobile number split into dial code and national part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedMobile {
    /// Country dial code without a leading `+`.
    pub country_code: String,
    /// Remaining digits after the dial code.
    pub national_number: String,
}

/// Returns the canonical form of a user-entered mobile number.
///
/// Strips every non-digit character, then removes exactly one leading `0`.
/// Returns `None` for missing input or when no digits remain.
#[must_use]
pub fn standardize(raw: Option<&str>) -> Option<String> {
    let cleaned = clean_digits(raw?);
    if cleaned.is_empty() {
        return None;
    }

    Some(cleaned)
}

/// Splits a user-entered mobile number into country code and national number.
///
/// Cleans the input the same way as [`standardize`] and matches the digits
/// against the dial code table. Unknown shapes fall back to
/// [`DEFAULT_COUNTRY_CODE`] with all cleaned digits as the national number.
#[must_use]
pub fn parse(raw: Option<&str>) -> Option<ParsedMobile> {
    let cleaned = standardize(raw)?;

    let matched = DIAL_CODES.iter().find(|dial_code| {
        cleaned.len() == dial_code.total_length && cleaned.starts_with(dial_code.prefix)
    });

    Some(match matched {
        Some(dial_code) => ParsedMobile {
            country_code: dial_code.prefix.to_owned(),
            national_number: cleaned[dial_code.prefix.len()..].to_owned(),
        },
        None => ParsedMobile {
            country_code: DEFAULT_COUNTRY_CODE.to_owned(),
            national_number: cleaned,
        },
    })
}

fn clean_digits(raw: &str) -> String {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();

    match digits.strip_prefix('0') {
        Some(rest) => rest.to_owned(),
        None => digits,
    }
}

/// Endpoint-level shape requirements applied on top of the canonical form.
///
/// The canonical path never enforces a length; call sites that need a
/// stricter shape attach a policy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MobilePolicy {
    exact_length: Option<usize>,
    required_prefix: Option<String>,
}

impl MobilePolicy {
    /// Accepts any non-empty canonical mobile.
    #[must_use]
    pub fn permissive() -> Self {
        Self::default()
    }

    /// Requires an exact digit count and a leading digit sequence.
    #[must_use]
    pub fn national(exact_length: usize, required_prefix: impl Into<String>) -> Self {
        Self {
            exact_length: Some(exact_length),
            required_prefix: Some(required_prefix.into()),
        }
    }

    /// Parses a policy name from configuration.
    pub fn from_name(name: &str) -> AppResult<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "permissive" => Ok(Self::permissive()),
            "national" => Ok(Self::national(10, "9")),
            other => Err(AppError::Validation(format!(
                "unknown mobile policy '{other}', expected 'permissive' or 'national'"
            ))),
        }
    }

    /// Checks a canonical mobile against this policy.
    pub fn validate(&self, canonical: &str) -> AppResult<()> {
        if let Some(length) = self.exact_length
            && canonical.len() != length
        {
            return Err(AppError::Validation(format!(
                "mobile number must have exactly {length} digits"
            )));
        }

        if let Some(prefix) = self.required_prefix.as_deref()
            && !canonical.starts_with(prefix)
        {
            return Err(AppError::Validation(format!(
                "mobile number must start with '{prefix}'"
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn international_format_keeps_country_digits() {
        assert_eq!(
            standardize(Some("+98 912-345 6789")),
            Some("989123456789".to_owned())
        );
    }

    #[test]
    fn trunk_zero_is_removed() {
        assert_eq!(
            standardize(Some("09123456789")),
            Some("9123456789".to_owned())
        );
    }

    #[test]
    fn only_one_leading_zero_is_removed() {
        assert_eq!(standardize(Some("0098912")), Some("098912".to_owned()));
    }

    #[test]
    fn missing_or_digitless_input_is_invalid() {
        assert_eq!(standardize(None), None);
        assert_eq!(standardize(Some("")), None);
        assert_eq!(standardize(Some("call me")), None);
        assert_eq!(standardize(Some("0")), None);
        assert_eq!(parse(Some("---")), None);
        assert_eq!(parse(None), None);
    }

    #[test]
    fn iranian_number_with_country_code_splits() {
        let parsed = parse(Some("+98 912 345 67"));
        assert_eq!(
            parsed,
            Some(ParsedMobile {
                country_code: "98".to_owned(),
                national_number: "91234567".to_owned(),
            })
        );
    }

    #[test]
    fn iraqi_number_matches_three_digit_code() {
        let parsed = parse(Some("0964 770 123 45"));
        assert_eq!(
            parsed,
            Some(ParsedMobile {
                country_code: "964".to_owned(),
                national_number: "77012345".to_owned(),
            })
        );
    }

    #[test]
    fn afghan_and_turkish_numbers_split() {
        assert_eq!(
            parse(Some("93 7001234")).map(|parsed| parsed.country_code),
            Some("93".to_owned())
        );
        assert_eq!(
            parse(Some("90 53212345")).map(|parsed| parsed.country_code),
            Some("90".to_owned())
        );
    }

    #[test]
    fn unknown_shape_falls_back_to_default_country() {
        let parsed = parse(Some("0912 345 6789"));
        assert_eq!(
            parsed,
            Some(ParsedMobile {
                country_code: DEFAULT_COUNTRY_CODE.to_owned(),
                national_number: "9123456789".to_owned(),
            })
        );
    }

    #[test]
    fn short_input_falls_back_to_default_country() {
        assert_eq!(
            parse(Some("98")),
            Some(ParsedMobile {
                country_code: DEFAULT_COUNTRY_CODE.to_owned(),
                national_number: "98".to_owned(),
            })
        );
    }

    #[test]
    fn national_policy_checks_length_and_prefix() {
        let policy = MobilePolicy::national(10, "9");
        assert!(policy.validate("9123456789").is_ok());
        assert!(policy.validate("912345678").is_err());
        assert!(policy.validate("8123456789").is_err());
    }

    #[test]
    fn permissive_policy_accepts_any_digits() {
        assert!(MobilePolicy::permissive().validate("1").is_ok());
    }

    #[test]
    fn policy_names_parse() {
        assert_eq!(
            MobilePolicy::from_name("National").ok(),
            Some(MobilePolicy::national(10, "9"))
        );
        assert!(MobilePolicy::from_name("strict").is_err());
    }

    proptest! {
        #[test]
        fn standardized_output_is_digits_only(raw in ".*") {
            if let Some(canonical) = standardize(Some(&raw)) {
                prop_assert!(!canonical.is_empty());
                prop_assert!(canonical.chars().all(|character| character.is_ascii_digit()));
            }
        }

        #[test]
        fn punctuation_and_one_trunk_zero_do_not_change_the_key(
            digits in "[1-9][0-9]{5,12}",
            separator in "[ ()+.-]{0,3}",
        ) {
            let decorated: String = digits
                .chars()
                .flat_map(|digit| std::iter::once(digit).chain(separator.chars()))
                .collect();
            let with_trunk_zero = format!("0{decorated}");

            prop_assert_eq!(standardize(Some(&digits)), Some(digits.clone()));
            prop_assert_eq!(standardize(Some(&decorated)), Some(digits.clone()));
            prop_assert_eq!(standardize(Some(&with_trunk_zero)), Some(digits));
        }

        #[test]
        fn clean_input_is_a_fixed_point(digits in "[1-9][0-9]{0,14}") {
            let once = standardize(Some(&digits));
            let twice = once.as_deref().and_then(|value| standardize(Some(value)));
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn parse_is_deterministic(raw in ".*") {
            prop_assert_eq!(parse(Some(&raw)), parse(Some(&raw)));
        }
    }
}

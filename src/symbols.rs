//! Symbol directory
//!
//! Fixed company-name → ticker table. Lookups are exact on the uppercased,
//! whitespace-collapsed name; there is no fuzzy matching.

use crate::models::Currency;

/// Static table — zero allocation
const DIRECTORY: &[(&str, &str)] = &[
    // NSE
    ("TCS", "TCS.NS"),
    ("INFOSYS", "INFY.NS"),
    ("RELIANCE", "RELIANCE.NS"),
    ("HDFC", "HDFCBANK.NS"),
    ("ICICI", "ICICIBANK.NS"),
    ("WIPRO", "WIPRO.NS"),
    ("HINDUSTAN UNILEVER", "HINDUNILVR.NS"),
    ("TATA STEEL", "TATASTEEL.NS"),
    // US
    ("TESLA", "TSLA"),
    ("APPLE", "AAPL"),
    ("MICROSOFT", "MSFT"),
];

/// Suffixes of Indian exchange listings (NSE, BSE).
const INR_SUFFIXES: &[&str] = &[".NS", ".BO"];

/// Normalise a user-typed company name into directory key form.
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

/// Resolve a company name to its ticker symbol.
pub fn resolve(name: &str) -> Option<&'static str> {
    let key = normalize_name(name);
    DIRECTORY
        .iter()
        .find(|(company, _)| *company == key)
        .map(|(_, symbol)| *symbol)
}

/// Currency implied by the listing suffix of `symbol`.
pub fn currency_for(symbol: &str) -> Currency {
    let upper = symbol.to_uppercase();
    if INR_SUFFIXES.iter().any(|suffix| upper.ends_with(suffix)) {
        Currency::Inr
    } else {
        Currency::Usd
    }
}

/// All known company names, in table order.
pub fn companies() -> impl Iterator<Item = &'static str> {
    DIRECTORY.iter().map(|(company, _)| *company)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_is_case_insensitive() {
        for name in ["tcs", "TCS", "Tcs"] {
            assert_eq!(resolve(name), Some("TCS.NS"));
        }
    }

    #[test]
    fn test_multi_word_names() {
        assert_eq!(resolve("tata   steel"), Some("TATASTEEL.NS"));
        assert_eq!(resolve(" Hindustan Unilever "), Some("HINDUNILVR.NS"));
    }

    #[test]
    fn test_unknown_company() {
        assert_eq!(resolve("dogecoin"), None);
        assert_eq!(resolve("tata"), None);
        assert_eq!(resolve(""), None);
    }

    #[test]
    fn test_currency_inference() {
        assert_eq!(currency_for("TCS.NS"), Currency::Inr);
        assert_eq!(currency_for("RELIANCE.BO"), Currency::Inr);
        assert_eq!(currency_for("AAPL"), Currency::Usd);
        assert_eq!(currency_for("NSE"), Currency::Usd);
    }

    #[test]
    fn test_every_company_resolves() {
        assert_eq!(companies().count(), 11);
        for company in companies() {
            assert!(resolve(company).is_some(), "{} did not resolve", company);
        }
    }
}

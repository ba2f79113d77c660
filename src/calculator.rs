//! Calculator handler
//!
//! Recognises EMI / SIP requests by keyword and answers them with
//! deterministic formulas. Amount, rate and years are read positionally
//! from the first three numbers in the message.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use crate::models::{CalculationKind, CalculationRequest};

/// Longest term accepted, in years.
const MAX_YEARS: f64 = 100.0;

lazy_static! {
    static ref NUMBER: Regex = Regex::new(r"\d+(?:\.\d+)?").expect("valid number pattern");
}

/// Monthly installment for a loan of `principal` at `rate` percent p.a. over `years`.
pub fn calculate_emi(principal: f64, rate: f64, years: u32) -> f64 {
    let r = monthly_rate(rate);
    let n = f64::from(years * 12);

    // Zero interest: straight division of the principal.
    if r == 0.0 {
        return round2(principal / n);
    }

    let growth = (1.0 + r).powf(n);
    round2(principal * r * growth / (growth - 1.0))
}

/// Future value of a monthly `investment` at `rate` percent p.a. over `years`,
/// contributions made at the start of each month.
pub fn calculate_sip(investment: f64, rate: f64, years: u32) -> f64 {
    let r = monthly_rate(rate);
    let n = f64::from(years * 12);

    if r == 0.0 {
        return round2(investment * n);
    }

    let growth = (1.0 + r).powf(n);
    round2(investment * ((growth - 1.0) / r) * (1.0 + r))
}

fn monthly_rate(rate: f64) -> f64 {
    rate / (12.0 * 100.0)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Detect the calculation kind. "emi" wins when both tokens are present.
fn detect_kind(lowered: &str) -> Option<CalculationKind> {
    if lowered.contains("emi") {
        Some(CalculationKind::Emi)
    } else if lowered.contains("sip") {
        Some(CalculationKind::Sip)
    } else {
        None
    }
}

/// Parse a message into a calculation request, or `None` if it is not one.
pub fn parse_request(message: &str) -> Option<CalculationRequest> {
    let lowered = message.to_lowercase();
    let kind = detect_kind(&lowered)?;

    let numbers: Vec<f64> = NUMBER
        .find_iter(&lowered)
        .take(3)
        .filter_map(|m| m.as_str().parse::<f64>().ok())
        .collect();

    let [amount, rate, years] = numbers[..] else {
        debug!(kind = ?kind, found = numbers.len(), "calculation trigger without three numbers");
        return None;
    };

    if !amount.is_finite() || !rate.is_finite() {
        debug!(amount, rate, "calculation inputs not representable");
        return None;
    }

    if amount <= 0.0 || rate < 0.0 || years <= 0.0 || years.fract() != 0.0 || years > MAX_YEARS {
        debug!(amount, rate, years, "calculation inputs out of range");
        return None;
    }

    Some(CalculationRequest {
        kind,
        amount,
        annual_rate_percent: rate,
        years: years as u32,
    })
}

/// Compute and format the answer for a parsed request.
///
/// `None` when the result is not a finite amount (e.g. an absurd rate
/// overflowing the compounding factor).
pub fn answer(request: &CalculationRequest) -> Option<String> {
    let CalculationRequest {
        kind,
        amount,
        annual_rate_percent: rate,
        years,
    } = *request;

    let result = match kind {
        CalculationKind::Emi => calculate_emi(amount, rate, years),
        CalculationKind::Sip => calculate_sip(amount, rate, years),
    };

    if !result.is_finite() {
        debug!(kind = ?kind, amount, rate, years, "calculation result not finite");
        return None;
    }

    let text = match kind {
        CalculationKind::Emi => format!(
            "Approximate EMI for ₹{} at {}% for {} years is ₹{:.2}/month.",
            amount, rate, years, result
        ),
        CalculationKind::Sip => format!(
            "Your SIP of ₹{} at {}% for {} years will grow to around ₹{:.2}.",
            amount, rate, years, result
        ),
    };

    Some(text)
}

/// Handler entry point: `None` means "not a calculation" and the router moves on.
pub fn try_calculate(message: &str) -> Option<String> {
    parse_request(message).and_then(|request| answer(&request))
}

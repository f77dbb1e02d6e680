// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Validation of K8s resource quantity strings (`10m`, `100Mi`, `2Gi`, `1e3`).

use tessera_k8s::Quantity;

const SUFFIXES: &[&str] = &[
	"Ki", "Mi", "Gi", "Ti", "Pi", "Ei", "n", "u", "m", "k", "M", "G", "T", "P", "E",
];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{value}' is not a valid quantity: {reason}")]
pub struct QuantityError {
	pub value: String,
	pub reason: &'static str,
}

/// Parse a non-negative quantity in canonical K8s syntax.
pub fn parse_quantity(value: &str) -> Result<Quantity, QuantityError> {
	let invalid = |reason| QuantityError {
		value: value.to_string(),
		reason,
	};

	let unsigned = value.strip_prefix('+').unwrap_or(value);
	if unsigned.starts_with('-') {
		return Err(invalid("must not be negative"));
	}

	let split = unsigned
		.find(|c: char| !(c.is_ascii_digit() || c == '.'))
		.unwrap_or(unsigned.len());
	let (number, suffix) = unsigned.split_at(split);

	if !number.chars().any(|c| c.is_ascii_digit()) {
		return Err(invalid("missing numeric part"));
	}
	if number.matches('.').count() > 1 {
		return Err(invalid("more than one decimal point"));
	}
	if !is_valid_suffix(suffix) {
		return Err(invalid("unknown suffix"));
	}

	Ok(Quantity(value.to_string()))
}

fn is_valid_suffix(suffix: &str) -> bool {
	if suffix.is_empty() || SUFFIXES.contains(&suffix) {
		return true;
	}
	// Decimal exponent, e.g. `1e3` or `5E-2`.
	match suffix.strip_prefix(['e', 'E']) {
		Some(exp) => {
			let digits = exp.strip_prefix(['+', '-']).unwrap_or(exp);
			!digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
		}
		None => false,
	}
}

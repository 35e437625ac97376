//! Schema-driven parser for tokenized feed lines.
//!
//! Each line of the feed is one of three shapes:
//!
//! - an empty line (single empty token), the repeat-signal convention,
//! - a timestamp label line (e.g., `Jan 30, 2009 field updated 10:30 AM`),
//! - a fixed-order stock quote line: company name (one or more fields),
//!   ticker, then seven numeric fields.
//!
//! There is no explicit marker distinguishing the shapes. Discrimination uses
//! the P/E slot: after stripping the format's trailing padding, the last
//! field of a quote line is either numeric or the missing-value marker `-`;
//! anything else means the line is a timestamp label.
//!
//! The quote schema is applied by name from the tail of the line with an
//! explicit field count, so a future schema change fails loudly instead of
//! silently misaligning fields.

use crate::error::{ReportError, Result};
use crate::types::{FeedEvent, Quote, PE_RATIO_MISSING};

// ============================================================================
// Schema constants
// ============================================================================

/// Marker the feed uses for a missing P/E ratio.
pub const MISSING_VALUE_MARKER: &str = "-";

/// Numeric fields of a quote line, in order after the ticker: current price,
/// dollar change, percent change, YTD change, high, low, P/E.
const NUMERIC_FIELD_COUNT: usize = 7;

/// Minimum fields in a quote line: company (>= 1) + ticker + the numerics.
const MIN_RECORD_FIELDS: usize = NUMERIC_FIELD_COUNT + 2;

// ============================================================================
// Parser
// ============================================================================

/// Parse one tokenized line into a [`FeedEvent`].
///
/// Parsing is pure: no state is read or written. The tokens are expected to
/// be whitespace-normalized by the feed source; trailing empty tokens (the
/// upstream format pads every line with one trailing separator) are stripped
/// here before the schema is applied.
///
/// # Errors
///
/// * [`ReportError::MalformedField`] - a required numeric field failed to
///   parse (P/E is the only field with a fallback)
/// * [`ReportError::TruncatedRecord`] - a quote line with too few fields
pub fn parse_line(tokens: &[String]) -> Result<FeedEvent> {
    // Blank-line convention: an empty line tokenizes to a single empty token.
    if tokens.is_empty() || (tokens.len() == 1 && tokens[0].is_empty()) {
        return Ok(FeedEvent::Repeat);
    }

    let fields = strip_trailing_padding(tokens);

    // The P/E slot discriminates quotes from timestamp labels.
    let pe_slot = match fields.last() {
        Some(token) => token.as_str(),
        None => return Ok(FeedEvent::Repeat),
    };
    if pe_slot.parse::<f64>().is_err() && pe_slot != MISSING_VALUE_MARKER {
        return Ok(FeedEvent::Timestamp(join_label(fields)));
    }

    parse_quote(fields).map(FeedEvent::Quote)
}

/// Drop trailing empty tokens left by the format's one-column padding.
fn strip_trailing_padding(tokens: &[String]) -> &[String] {
    let mut end = tokens.len();
    while end > 0 && tokens[end - 1].is_empty() {
        end -= 1;
    }
    &tokens[..end]
}

/// Join a timestamp label from its fields with single spaces.
fn join_label(fields: &[String]) -> String {
    fields.join(" ")
}

/// Apply the fixed quote schema, tail-first.
fn parse_quote(fields: &[String]) -> Result<Quote> {
    if fields.len() < MIN_RECORD_FIELDS {
        return Err(ReportError::TruncatedRecord {
            expected: MIN_RECORD_FIELDS,
            actual: fields.len(),
        });
    }

    let numeric_start = fields.len() - NUMERIC_FIELD_COUNT;
    let numeric = &fields[numeric_start..];

    // P/E is the last field and the only one allowed to be missing.
    let pe_ratio = numeric[6].parse::<f64>().unwrap_or(PE_RATIO_MISSING);

    // Remaining numerics are required, in tail-first schema order.
    let low = parse_required(&numeric[5], "low")?;
    let high = parse_required(&numeric[4], "high")?;
    let ytd_change = parse_required(&numeric[3], "ytd_change")?;
    let percent_change = parse_required(&numeric[2], "percent_change")?;
    let dollar_change = parse_required(&numeric[1], "dollar_change")?;
    let current = parse_required(&numeric[0], "current")?;

    let ticker = fields[numeric_start - 1].clone();
    let company = fields[..numeric_start - 1].join(" ");

    Ok(Quote {
        company,
        ticker,
        current,
        dollar_change,
        percent_change,
        ytd_change,
        high,
        low,
        pe_ratio,
    })
}

/// Parse a required numeric field; failure is fatal for the record.
fn parse_required(token: &str, field: &'static str) -> Result<f64> {
    token.parse::<f64>().map_err(|_| ReportError::MalformedField {
        field,
        value: token.to_string(),
    })
}

// ============================================================================
// Tests
// ============================================================================

//! Token usage accounting — raw provider counters plus derived totals and
//! efficiency ratios.

use serde::Serialize;
use serde_json::Value;

// ---------------------------------------------------------------------------
// Raw counters
// ---------------------------------------------------------------------------

/// The four raw usage counters reported by the provider. Any counter missing
/// from the payload defaults to 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RawUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cache_creation_input_tokens: u64,
    pub cache_read_input_tokens: u64,
}

impl RawUsage {
    /// Read counters from a `usage` JSON object.
    pub fn from_value(usage: &Value) -> Self {
        Self {
            input_tokens: read_counter(usage, "input_tokens"),
            output_tokens: read_counter(usage, "output_tokens"),
            cache_creation_input_tokens: read_counter(usage, "cache_creation_input_tokens"),
            cache_read_input_tokens: read_counter(usage, "cache_read_input_tokens"),
        }
    }

    /// Overwrite each counter that is present in `usage`, leaving the rest
    /// untouched. Streamed usage arrives incrementally (`message_start`
    /// seeds input counts, `message_delta` carries output counts), and the
    /// fields are cumulative snapshots — overwrite by key, never add.
    pub fn merge_from(&mut self, usage: &Value) {
        merge_counter(usage, "input_tokens", &mut self.input_tokens);
        merge_counter(usage, "output_tokens", &mut self.output_tokens);
        merge_counter(
            usage,
            "cache_creation_input_tokens",
            &mut self.cache_creation_input_tokens,
        );
        merge_counter(
            usage,
            "cache_read_input_tokens",
            &mut self.cache_read_input_tokens,
        );
    }
}

fn read_counter(usage: &Value, key: &str) -> u64 {
    usage.get(key).and_then(Value::as_u64).unwrap_or(0)
}

fn merge_counter(usage: &Value, key: &str, slot: &mut u64) {
    if let Some(n) = usage.get(key).and_then(Value::as_u64) {
        *slot = n;
    }
}

// ---------------------------------------------------------------------------
// Derived report
// ---------------------------------------------------------------------------

/// Usage counters plus derived totals and ratios. Every derived field is a
/// pure function of the four raw counters — recomputed on each parse, never
/// stored independently.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageReport {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cache_creation_input_tokens: u64,
    pub cache_read_input_tokens: u64,
    /// `input + cache_creation + cache_read`.
    pub total_input_tokens: u64,
    /// `total_input_tokens + output`.
    pub total_tokens: u64,
    /// Percent of input tokens served from cache, one fractional digit.
    /// `"0.0"` when there are no input tokens.
    pub cache_efficiency: String,
    /// Output tokens as a percent of the grand total, one fractional digit.
    /// `"0.0"` when there are no tokens at all.
    pub output_ratio: String,
}

/// Derive the full report from raw counters.
pub fn derive(raw: &RawUsage) -> UsageReport {
    let total_input_tokens =
        raw.input_tokens + raw.cache_creation_input_tokens + raw.cache_read_input_tokens;
    let total_tokens = total_input_tokens + raw.output_tokens;

    UsageReport {
        input_tokens: raw.input_tokens,
        output_tokens: raw.output_tokens,
        cache_creation_input_tokens: raw.cache_creation_input_tokens,
        cache_read_input_tokens: raw.cache_read_input_tokens,
        total_input_tokens,
        total_tokens,
        cache_efficiency: ratio_pct(raw.cache_read_input_tokens, total_input_tokens),
        output_ratio: ratio_pct(raw.output_tokens, total_tokens),
    }
}

/// `100 * numerator / denominator` rendered with exactly one fractional
/// digit; `"0.0"` when the denominator is 0.
fn ratio_pct(numerator: u64, denominator: u64) -> String {
    if denominator == 0 {
        return "0.0".to_string();
    }
    format!("{:.1}", (numerator as f64 / denominator as f64) * 100.0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn totals_are_sums_of_raw_counters() {
        let report = derive(&RawUsage {
            input_tokens: 100,
            output_tokens: 50,
            cache_creation_input_tokens: 20,
            cache_read_input_tokens: 30,
        });

        assert_eq!(report.total_input_tokens, 150);
        assert_eq!(report.total_tokens, 200);
    }

    #[test]
    fn ratios_have_one_fractional_digit() {
        let report = derive(&RawUsage {
            input_tokens: 100,
            output_tokens: 50,
            cache_creation_input_tokens: 20,
            cache_read_input_tokens: 30,
        });

        // 30 / 150 = 20%, 50 / 200 = 25%
        assert_eq!(report.cache_efficiency, "20.0");
        assert_eq!(report.output_ratio, "25.0");
    }

    #[test]
    fn zero_denominators_report_zero() {
        let report = derive(&RawUsage::default());

        assert_eq!(report.cache_efficiency, "0.0");
        assert_eq!(report.output_ratio, "0.0");
        assert_eq!(report.total_tokens, 0);
    }

    #[test]
    fn output_only_usage_has_zero_cache_efficiency() {
        let report = derive(&RawUsage {
            output_tokens: 42,
            ..Default::default()
        });

        assert_eq!(report.cache_efficiency, "0.0");
        assert_eq!(report.output_ratio, "100.0");
    }

    #[test]
    fn from_value_defaults_missing_counters() {
        let raw = RawUsage::from_value(&json!({ "input_tokens": 7 }));

        assert_eq!(raw.input_tokens, 7);
        assert_eq!(raw.output_tokens, 0);
        assert_eq!(raw.cache_read_input_tokens, 0);
    }

    #[test]
    fn merge_overwrites_present_keys_only() {
        let mut raw = RawUsage {
            input_tokens: 100,
            output_tokens: 5,
            ..Default::default()
        };
        raw.merge_from(&json!({ "output_tokens": 90 }));

        assert_eq!(raw.input_tokens, 100, "absent key must not be reset");
        assert_eq!(raw.output_tokens, 90, "present key overwrites, not adds");
    }
}

//! Size admission policy for uploads
//!
//! A selected video must pass the size gate twice: once when it is staged
//! and once more immediately before commit. The policy itself is a pure
//! function of the byte size; callers decide what to do with a rejection.

use crate::models::AdmissionDecision;

/// Default upload limit: 20 MiB
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 20 * 1024 * 1024;

/// Size threshold gate for uploads
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdmissionPolicy {
    max_bytes: u64,
}

impl Default for AdmissionPolicy {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl AdmissionPolicy {
    pub fn new(max_bytes: u64) -> Self {
        Self { max_bytes }
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Evaluate a byte size against the configured limit
    ///
    /// Pure and deterministic. On rejection the reason contains both the
    /// actual size and the limit in human-readable form.
    pub fn evaluate(&self, size_bytes: u64) -> AdmissionDecision {
        if size_bytes <= self.max_bytes {
            AdmissionDecision {
                accepted: true,
                actual_size_bytes: size_bytes,
                reason_if_rejected: None,
            }
        } else {
            let reason = format!(
                "File size ({}) exceeds limit of {}",
                format_file_size(size_bytes),
                format_file_size(self.max_bytes)
            );
            AdmissionDecision {
                accepted: false,
                actual_size_bytes: size_bytes,
                reason_if_rejected: Some(reason),
            }
        }
    }
}

/// Format a byte count with binary-prefix units and two decimal places
///
/// Zero formats as "0 B"; everything else as `size / 1024^i` where `i`
/// is the largest power of 1024 not exceeding the size (capped at GB).
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }

    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    format!("{:.2} {}", value, UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_zero() {
        assert_eq!(format_file_size(0), "0 B");
    }

    #[test]
    fn test_format_exact_units() {
        assert_eq!(format_file_size(1024), "1.00 KB");
        assert_eq!(format_file_size(1_048_576), "1.00 MB");
        assert_eq!(format_file_size(1024 * 1024 * 1024), "1.00 GB");
    }

    #[test]
    fn test_format_fractional() {
        assert_eq!(format_file_size(1536), "1.50 KB");
        assert_eq!(format_file_size(500), "500.00 B");
    }

    #[test]
    fn test_accepts_up_to_limit() {
        let policy = AdmissionPolicy::default();
        assert!(policy.evaluate(0).accepted);
        assert!(policy.evaluate(5 * 1024 * 1024).accepted);
        assert!(policy.evaluate(DEFAULT_MAX_UPLOAD_BYTES).accepted);
    }

    #[test]
    fn test_rejects_above_limit() {
        let policy = AdmissionPolicy::default();
        let decision = policy.evaluate(DEFAULT_MAX_UPLOAD_BYTES + 1);
        assert!(!decision.accepted);
        assert_eq!(decision.actual_size_bytes, DEFAULT_MAX_UPLOAD_BYTES + 1);
        assert!(decision.reason_if_rejected.is_some());
    }

    #[test]
    fn test_rejection_reason_names_both_sizes() {
        let policy = AdmissionPolicy::default();
        // 25 MiB video against the 20 MiB default limit
        let decision = policy.evaluate(26_214_400);
        assert!(!decision.accepted);
        let reason = decision.reason_if_rejected.unwrap();
        assert!(reason.contains("25.00 MB"), "reason was: {}", reason);
        assert!(reason.contains("20.00 MB"), "reason was: {}", reason);
    }

    #[test]
    fn test_custom_limit() {
        let policy = AdmissionPolicy::new(1024);
        assert!(policy.evaluate(1024).accepted);
        assert!(!policy.evaluate(1025).accepted);
    }
}

//! Verification engine: compares a scanned serial against the assigned one.
//!
//! Kept side-effect free so the comparison can be tested against a table of
//! (expected, scanned) pairs without persistence. Callers are responsible for
//! rejecting empty scans before invoking [`verify`]; any non-empty input
//! yields a deterministic verdict.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::TraySerial;

/// Verdict of a single verification attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ScanResult {
    /// Scanned serial equals the assigned serial.
    Matched,
    /// Scanned serial differs from the assigned serial.
    Mismatched,
}

impl ScanResult {
    /// Stable string form used in persistence and wire payloads.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Matched => "matched",
            Self::Mismatched => "mismatched",
        }
    }

    /// Whether the verdict advances the workflow.
    pub fn is_match(self) -> bool {
        self == Self::Matched
    }
}

impl fmt::Display for ScanResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error raised when parsing an unknown scan result string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("scan result must be matched or mismatched")]
pub struct UnknownScanResult;

impl FromStr for ScanResult {
    type Err = UnknownScanResult;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "matched" => Ok(Self::Matched),
            "mismatched" => Ok(Self::Mismatched),
            _ => Err(UnknownScanResult),
        }
    }
}

/// Compare a scanned serial against the case's assigned serial.
///
/// The scanned input is trimmed before comparison; the comparison itself is
/// exact and case-sensitive.
///
/// # Examples
/// ```
/// use backend::domain::{ScanResult, TraySerial, verify};
///
/// let assigned = TraySerial::new("TR-2024-001").expect("valid serial");
/// assert_eq!(verify(&assigned, " TR-2024-001 "), ScanResult::Matched);
/// assert_eq!(verify(&assigned, "tr-2024-001"), ScanResult::Mismatched);
/// ```
pub fn verify(assigned: &TraySerial, scanned: &str) -> ScanResult {
    if scanned.trim() == assigned.as_str() {
        ScanResult::Matched
    } else {
        ScanResult::Mismatched
    }
}

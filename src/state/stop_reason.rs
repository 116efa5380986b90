/// Stop conditions for a listing traversal
///
/// A traversal always ends with exactly one of these. None of them is an
/// error: the records gathered before the stop are always kept.
use std::fmt;

/// Why the pagination controller stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StopReason {
    // ===== Circuit breakers =====
    /// The safety page ceiling was exceeded
    SafetyCeiling,

    /// The operator's explicit page cap was exceeded
    PageCap,

    // ===== End-of-data signals =====
    /// Too many consecutive pages yielded no listings
    EmptyPages,

    /// A late page repeated page 1's leading listings
    LoopDetected,

    /// Most of a page's listings had already been seen
    DuplicateRate,
}

impl StopReason {
    /// Returns true if the stop means the site ran out of new listings
    pub fn is_end_of_data(&self) -> bool {
        matches!(self, Self::EmptyPages | Self::LoopDetected | Self::DuplicateRate)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SafetyCeiling => "safety_ceiling",
            Self::PageCap => "page_cap",
            Self::EmptyPages => "empty_pages",
            Self::LoopDetected => "loop_detected",
            Self::DuplicateRate => "duplicate_rate",
        }
    }

    /// Human-readable explanation for logs and the run summary
    pub fn describe(&self) -> &'static str {
        match self {
            Self::SafetyCeiling => "reached the safety page ceiling",
            Self::PageCap => "reached the requested page limit",
            Self::EmptyPages => "consecutive empty pages, end of listings",
            Self::LoopDetected => "pagination wrapped around to page 1",
            Self::DuplicateRate => "page was mostly already-seen listings",
        }
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

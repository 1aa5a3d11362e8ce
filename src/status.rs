//! Status events reported to whoever drives a session.

use std::fmt;

/// Below the budget but within this distance of it counts as near the limit.
pub const NEAR_LIMIT_BAND: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Within,
    NearLimit,
    OverBudget,
}

impl Verdict {
    pub fn of(length: usize, budget: usize) -> Self {
        if length > budget {
            Verdict::OverBudget
        } else if length > budget.saturating_sub(NEAR_LIMIT_BAND) {
            Verdict::NearLimit
        } else {
            Verdict::Within
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    CatalogLoading,
    CatalogLoaded { count: usize },
    CatalogFailed { reason: String },
    ImageLoading,
    Generating { cols: u32, rows: u32, estimated: usize },
    Done { length: usize, budget: usize, truncated: bool, verdict: Verdict },
}

impl Status {
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Status::CatalogFailed { .. } | Status::Done { verdict: Verdict::OverBudget, .. }
        )
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::CatalogLoading => write!(f, "Loading emoji catalog..."),
            Status::CatalogLoaded { count } => write!(f, "Loaded {count} emoji"),
            Status::CatalogFailed { reason } => write!(f, "Emoji catalog unavailable: {reason}"),
            Status::ImageLoading => write!(f, "Loading image..."),
            Status::Generating { cols, rows, estimated } => {
                write!(f, "Generating {cols}x{rows} (estimated ~{estimated} chars)")
            }
            Status::Done { length, budget, truncated, verdict } => {
                write!(f, "Done: {length} / {budget} chars")?;
                if *truncated {
                    write!(f, " (truncated)")?;
                }
                match verdict {
                    Verdict::OverBudget => write!(f, " - over the limit"),
                    Verdict::NearLimit => write!(f, " - close to the limit"),
                    Verdict::Within => Ok(()),
                }
            }
        }
    }
}

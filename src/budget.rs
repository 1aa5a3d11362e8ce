//! Output budget enforcement.

/// Headroom kept below the budget when truncating, large enough for the marker.
pub const TRUNCATION_MARGIN: usize = 20;
pub const TRUNCATION_MARKER: &str = "...(truncated)\n";

/// Length of a text in UTF-16 code units.
pub fn text_len(s: &str) -> usize {
    s.encode_utf16().count()
}

/// What to do when the rendered text is longer than the budget.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(not(target_arch = "wasm32"), derive(clap::ValueEnum))]
pub enum BudgetPolicy {
    /// Keep the text as is and only flag the overage.
    ReportOnly,
    /// Drop whole trailing lines and append a marker.
    #[default]
    Truncate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enforced {
    pub text: String,
    pub truncated: bool,
}

pub fn enforce(text: String, budget: usize, policy: BudgetPolicy) -> Enforced {
    if text_len(&text) <= budget || policy == BudgetPolicy::ReportOnly {
        return Enforced { text, truncated: false };
    }
    Enforced { text: truncate_lines(&text, budget), truncated: true }
}

/// Keep whole lines while they fit in `budget - TRUNCATION_MARGIN`, then the
/// marker if it still fits. Budgets shorter than the marker get no marker.
pub fn truncate_lines(text: &str, budget: usize) -> String {
    let limit = budget.saturating_sub(TRUNCATION_MARGIN);
    let mut out = String::new();
    let mut len = 0;
    for line in text.split_inclusive('\n') {
        let line_len = text_len(line);
        if len + line_len > limit {
            break;
        }
        out.push_str(line);
        len += line_len;
    }
    if len + text_len(TRUNCATION_MARKER) <= budget {
        out.push_str(TRUNCATION_MARKER);
    }
    out
}

/// A budget allocation that would reach or pass the spending cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BudgetViolation {
    pub proposed_minor: i64,
    pub cap_minor: i64,
    pub already_allocated_minor: i64,
    pub shortfall_minor: i64,
}

impl BudgetViolation {
    pub fn message(&self) -> String {
        if self.shortfall_minor > 0 {
            format!(
                "allocation of {} exceeds the remaining budget by {} (cap {}, already allocated {})",
                self.proposed_minor,
                self.shortfall_minor,
                self.cap_minor,
                self.already_allocated_minor
            )
        } else {
            format!(
                "allocation of {} would exhaust the budget cap of {} (already allocated {})",
                self.proposed_minor, self.cap_minor, self.already_allocated_minor
            )
        }
    }
}

/// Guard run before any mutation that allocates value against a budget.
/// The allocation must leave headroom: ok iff
/// `already_allocated + proposed < cap`.
pub fn check_budget(
    proposed_minor: i64,
    cap_minor: i64,
    already_allocated_minor: i64,
) -> Result<(), BudgetViolation> {
    let total = already_allocated_minor
        .checked_add(proposed_minor)
        .unwrap_or(i64::MAX);
    if total < cap_minor {
        return Ok(());
    }

    Err(BudgetViolation {
        proposed_minor,
        cap_minor,
        already_allocated_minor,
        shortfall_minor: total.saturating_sub(cap_minor),
    })
}

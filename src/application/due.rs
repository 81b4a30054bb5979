use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueBadge { Overdue, DueSoon }

impl DueBadge {
    pub fn label(self) -> &'static str {
        match self { DueBadge::Overdue => "Overdue", DueBadge::DueSoon => "Due Soon" }
    }
}

/// Days ahead of `today` (inclusive) that still count as due soon.
pub const DUE_SOON_DAYS: i64 = 2;

/// Classifies a due date relative to `today`. Evaluated at render time.
pub fn classify(due_date: Option<NaiveDate>, today: NaiveDate) -> Option<DueBadge> {
    let due = due_date?;
    if due < today {
        return Some(DueBadge::Overdue);
    }
    if (due - today).num_days() <= DUE_SOON_DAYS {
        return Some(DueBadge::DueSoon);
    }
    None
}

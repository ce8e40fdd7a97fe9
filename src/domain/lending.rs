//! Lending rules
//!
//! Pure functions over loan, book and member snapshots. Repositories call them
//! inside the transaction that performs the corresponding write.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::loan::{self, LoanStatus};
use crate::models::user::UserStatus;
use super::DomainError;

/// Days added to the current due date on each renewal
pub const RENEWAL_WINDOW_DAYS: i64 = 14;

/// Renewal cap stamped on new loans when no other value is configured
pub const DEFAULT_MAX_RENEWALS: i32 = 2;

/// Loan status as presented to readers. `Overdue` is derived, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoanDisplayStatus {
    Active,
    Overdue,
    Returned,
}

pub fn project_status(
    status: LoanStatus,
    due_date: DateTime<Utc>,
    now: DateTime<Utc>,
) -> LoanDisplayStatus {
    match status {
        LoanStatus::Returned => LoanDisplayStatus::Returned,
        LoanStatus::Active if due_date < now => LoanDisplayStatus::Overdue,
        LoanStatus::Active => LoanDisplayStatus::Active,
    }
}

/// Status of `loan` as displayed at `now`
pub fn display_status(loan: &loan::Model, now: DateTime<Utc>) -> LoanDisplayStatus {
    project_status(loan.status, loan.due_date, now)
}

/// Checkout preconditions, in evaluation order: member standing, copy
/// availability, then duplicate active loan for the same pair.
pub fn ensure_can_checkout(
    user_status: UserStatus,
    available_copies: i32,
    has_active_loan_for_pair: bool,
) -> Result<(), DomainError> {
    if user_status != UserStatus::Active {
        return Err(DomainError::InvalidState(format!(
            "User is not active (status: {:?})",
            user_status
        )));
    }
    if available_copies <= 0 {
        return Err(DomainError::Unavailable(
            "No copies of this book are available".to_string(),
        ));
    }
    if has_active_loan_for_pair {
        return Err(DomainError::DuplicateLoan);
    }
    Ok(())
}

pub fn ensure_can_renew(loan: &loan::Model) -> Result<(), DomainError> {
    if loan.status != LoanStatus::Active {
        return Err(DomainError::InvalidState("Loan is not active".to_string()));
    }
    if loan.renewal_count >= loan.max_renewals {
        return Err(DomainError::RenewalLimitReached {
            renewals: loan.renewal_count,
            max: loan.max_renewals,
        });
    }
    Ok(())
}

/// New due date after one renewal, counted from the current due date
pub fn renewed_due_date(due_date: DateTime<Utc>) -> DateTime<Utc> {
    due_date + Duration::days(RENEWAL_WINDOW_DAYS)
}

pub fn ensure_can_return(loan: &loan::Model) -> Result<(), DomainError> {
    if loan.status != LoanStatus::Active {
        return Err(DomainError::InvalidState("Loan is not active".to_string()));
    }
    Ok(())
}

/// Available copies after the total changes from `old_total` to `new_total`.
///
/// Shifts the available count by the same delta and clamps at zero. The result
/// is not reconciled against the number of active loans.
pub fn recompute_available_copies(available: i32, old_total: i32, new_total: i32) -> i32 {
    (available + (new_total - old_total)).max(0)
}

pub fn ensure_no_active_loans(active_loans: u64, entity: &str) -> Result<(), DomainError> {
    if active_loans > 0 {
        return Err(DomainError::Conflict(format!(
            "Cannot delete {} with {} active loan(s)",
            entity, active_loans
        )));
    }
    Ok(())
}

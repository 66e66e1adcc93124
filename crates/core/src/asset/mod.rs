//! Asset availability rules.
//!
//! An asset is loanable only while it is in service and physically in
//! stock. While loaned, its location field carries an opaque loan marker;
//! returning the loan restores `in_stock`. The location/status pair is the
//! single source of truth for availability - there is no separate
//! "available" flag to drift.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Asset service status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetStatus {
    /// Newly acquired, not yet commissioned.
    New,
    /// In service and usable.
    InService,
    /// Temporarily unavailable for maintenance.
    Maintenance,
    /// Decommissioned.
    OutOfService,
}

/// Location tag for an asset sitting in stock.
pub const LOCATION_IN_STOCK: &str = "in_stock";

/// Location tag for an asset assigned to an office.
pub const LOCATION_OFFICE: &str = "office";

const LOAN_MARKER_PREFIX: &str = "loaned:";

/// Builds the location marker recorded on an asset while it is loaned out.
#[must_use]
pub fn loan_marker(user_id: Uuid) -> String {
    format!("{LOAN_MARKER_PREFIX}{user_id}")
}

/// Returns true if the location string is a loan marker.
#[must_use]
pub fn is_loan_marker(location: &str) -> bool {
    location.starts_with(LOAN_MARKER_PREFIX)
}

/// Returns true if an asset may be issued on a new loan.
///
/// Requires `in_service` status and `in_stock` location; everything else
/// (including a location already holding a loan marker) is unavailable.
#[must_use]
pub fn is_loanable(status: AssetStatus, location: &str) -> bool {
    status == AssetStatus::InService && location == LOCATION_IN_STOCK
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_service_in_stock_is_loanable() {
        assert!(is_loanable(AssetStatus::InService, LOCATION_IN_STOCK));
    }

    #[test]
    fn test_wrong_status_blocks_loan() {
        assert!(!is_loanable(AssetStatus::New, LOCATION_IN_STOCK));
        assert!(!is_loanable(AssetStatus::Maintenance, LOCATION_IN_STOCK));
        assert!(!is_loanable(AssetStatus::OutOfService, LOCATION_IN_STOCK));
    }

    #[test]
    fn test_wrong_location_blocks_loan() {
        assert!(!is_loanable(AssetStatus::InService, LOCATION_OFFICE));

        let marker = loan_marker(Uuid::new_v4());
        assert!(!is_loanable(AssetStatus::InService, &marker));
    }

    #[test]
    fn test_loan_marker_round_trip() {
        let user_id = Uuid::new_v4();
        let marker = loan_marker(user_id);
        assert!(is_loan_marker(&marker));
        assert!(!is_loan_marker(LOCATION_IN_STOCK));
        assert!(!is_loan_marker(LOCATION_OFFICE));
    }

    #[test]
    fn test_issue_then_return_restores_availability() {
        // Mirrors the loan lifecycle: marker while ongoing, in_stock after.
        let status = AssetStatus::InService;
        let location = loan_marker(Uuid::new_v4());
        assert!(!is_loanable(status, &location));
        assert!(is_loanable(status, LOCATION_IN_STOCK));
    }
}

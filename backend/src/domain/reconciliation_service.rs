//! Reconciles the allowance event log into per-user schedule updates.
//!
//! For every user the most recent event wins (ties go to the event that
//! appears later in the log). Its schedule is normalized and the next payment
//! date computed with the reference date as both base and reference. A
//! malformed schedule only affects that user: the failure is kept in the
//! update and the user's payment day becomes empty.

use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use crate::domain::models::{AllowanceEvent, ReconciledUpdate};
use crate::domain::schedule_normalizer::normalize;

/// Compute the latest schedule update for each user in the event log
pub fn reconcile(
    events: &[AllowanceEvent],
    reference_date: NaiveDate,
) -> BTreeMap<String, ReconciledUpdate> {
    let mut latest: BTreeMap<&str, &AllowanceEvent> = BTreeMap::new();
    for event in events {
        match latest.get(event.user_id.as_str()) {
            Some(current) if current.timestamp > event.timestamp => {}
            _ => {
                latest.insert(event.user_id.as_str(), event);
            }
        }
    }

    let updates: BTreeMap<String, ReconciledUpdate> = latest
        .into_iter()
        .map(|(user_id, event)| {
            let next_payment = normalize(&event.frequency, &event.raw_day)
                .and_then(|schedule| schedule.next_occurrence(reference_date, reference_date));

            match &next_payment {
                Ok(date) => debug!(
                    "User {}: {} '{}' next payment on {}",
                    user_id, event.frequency, event.raw_day, date
                ),
                Err(e) => warn!(
                    "User {}: no next payment for {} '{}': {}",
                    user_id, event.frequency, event.raw_day, e
                ),
            }

            let update = ReconciledUpdate {
                frequency: event.frequency.clone(),
                raw_day: event.raw_day.clone(),
                next_payment,
                updated_at: event.timestamp,
            };
            (user_id.to_string(), update)
        })
        .collect();

    let failed = updates.values().filter(|u| u.failure().is_some()).count();
    info!(
        "Reconciled {} events into {} user updates ({} failed) as of {}",
        events.len(),
        updates.len(),
        failed,
        reference_date
    );

    updates
}

/// All events for one user, oldest first. Events with equal timestamps keep
/// their log order.
pub fn events_for_user<'a>(events: &'a [AllowanceEvent], user_id: &str) -> Vec<&'a AllowanceEvent> {
    let mut user_events: Vec<&AllowanceEvent> =
        events.iter().filter(|e| e.user_id == user_id).collect();
    user_events.sort_by_key(|e| e.timestamp);
    user_events
}

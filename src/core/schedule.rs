use std::collections::HashSet;

use chrono::{NaiveTime, Timelike};
use serde::Serialize;
use utoipa::ToSchema;

/// A non-cancelled job already booked on the candidate's date.
#[derive(Debug, Clone)]
pub struct BookedSlot {
    pub job_id: u64,
    pub client_id: u64,
    pub employee_id: u64,
    pub employee_name: String,
    pub start_minutes: i32,
    pub duration_minutes: i32,
}

impl BookedSlot {
    fn end_minutes(&self) -> i32 {
        self.start_minutes + self.duration_minutes
    }
}

/// A proposed job assignment, times already reduced to minutes-from-midnight.
#[derive(Debug, Clone, Copy)]
pub struct Candidate {
    pub client_id: u64,
    pub employee_id: u64,
    pub start_minutes: i32,
    pub duration_minutes: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ValidationOutcome {
    #[schema(example = false)]
    pub is_valid: bool,
    #[schema(example = "employee has an approved absence", nullable = true)]
    pub message: Option<String>,
}

impl ValidationOutcome {
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            message: None,
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            message: Some(message.into()),
        }
    }
}

pub fn minutes_from_midnight(t: NaiveTime) -> i32 {
    (t.hour() * 60 + t.minute()) as i32
}

/// Half-open interval overlap: touching endpoints do not conflict.
pub fn overlaps(start1: i32, end1: i32, start2: i32, end2: i32) -> bool {
    start1 < end2 && end1 > start2
}

/// Decides whether `candidate` may be booked given the worker's absence state
/// and the tenant's other bookings that day. An exact duplicate booking (same
/// client and worker) is reported before the generic double-booking case so
/// the caller gets the more specific message.
pub fn check_assignment(
    candidate: &Candidate,
    employee_absent: bool,
    booked: &[BookedSlot],
) -> ValidationOutcome {
    if employee_absent {
        return ValidationOutcome::invalid("employee has an approved absence");
    }

    let start = candidate.start_minutes;
    let end = start + candidate.duration_minutes;

    let mut double_booked: Option<&BookedSlot> = None;

    for slot in booked {
        if !overlaps(start, end, slot.start_minutes, slot.end_minutes()) {
            continue;
        }

        if slot.client_id == candidate.client_id && slot.employee_id == candidate.employee_id {
            return ValidationOutcome::invalid(
                "this client already has a booking with this cleaner at the same time",
            );
        }

        if slot.employee_id == candidate.employee_id && double_booked.is_none() {
            double_booked = Some(slot);
        }
    }

    if let Some(slot) = double_booked {
        return ValidationOutcome::invalid(format!(
            "{} is already booked during this time slot",
            slot.employee_name
        ));
    }

    ValidationOutcome::valid()
}

/// Workers who cannot take the given slot: anyone absent that day plus anyone
/// whose existing booking overlaps the slot.
pub fn unavailable_employees(
    start_minutes: i32,
    duration_minutes: i32,
    absent_ids: &[u64],
    booked: &[BookedSlot],
) -> HashSet<u64> {
    let end = start_minutes + duration_minutes;

    let mut unavailable: HashSet<u64> = absent_ids.iter().copied().collect();

    for slot in booked {
        if overlaps(start_minutes, end, slot.start_minutes, slot.end_minutes()) {
            unavailable.insert(slot.employee_id);
        }
    }

    unavailable
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(job_id: u64, client_id: u64, employee_id: u64, start: i32, duration: i32) -> BookedSlot {
        BookedSlot {
            job_id,
            client_id,
            employee_id,
            employee_name: format!("Worker {}", employee_id),
            start_minutes: start,
            duration_minutes: duration,
        }
    }

    #[test]
    fn overlap_is_symmetric() {
        let cases = [
            (600, 720, 660, 780),
            (600, 720, 720, 840),
            (0, 60, 30, 90),
            (100, 200, 400, 500),
        ];
        for (s1, e1, s2, e2) in cases {
            assert_eq!(overlaps(s1, e1, s2, e2), overlaps(s2, e2, s1, e1));
        }
    }

    #[test]
    fn touching_intervals_do_not_overlap() {
        // 10:00-12:00 followed immediately by 12:00-14:00
        assert!(!overlaps(600, 720, 720, 840));
        assert!(!overlaps(720, 840, 600, 720));
        // one minute of overlap does conflict
        assert!(overlaps(600, 721, 720, 840));
    }

    #[test]
    fn absence_blocks_any_time_slot() {
        let candidate = Candidate {
            client_id: 1,
            employee_id: 7,
            start_minutes: 0,
            duration_minutes: 15,
        };
        let outcome = check_assignment(&candidate, true, &[]);
        assert!(!outcome.is_valid);
        assert_eq!(
            outcome.message.as_deref(),
            Some("employee has an approved absence")
        );

        // a completely different slot the same day is equally blocked
        let late = Candidate {
            start_minutes: 1380,
            duration_minutes: 45,
            ..candidate
        };
        assert!(!check_assignment(&late, true, &[]).is_valid);
    }

    #[test]
    fn duplicate_booking_takes_precedence_over_double_booking() {
        let candidate = Candidate {
            client_id: 3,
            employee_id: 7,
            start_minutes: 600,
            duration_minutes: 120,
        };
        // same worker double-booked elsewhere AND an exact duplicate
        let booked = vec![
            slot(10, 9, 7, 630, 60),
            slot(11, 3, 7, 600, 120),
        ];
        let outcome = check_assignment(&candidate, false, &booked);
        assert!(!outcome.is_valid);
        assert!(outcome.message.unwrap().contains("already has a booking"));
    }

    #[test]
    fn double_booked_worker_is_named() {
        let candidate = Candidate {
            client_id: 3,
            employee_id: 7,
            start_minutes: 600,
            duration_minutes: 120,
        };
        let booked = vec![slot(10, 9, 7, 630, 60)];
        let outcome = check_assignment(&candidate, false, &booked);
        assert!(!outcome.is_valid);
        assert_eq!(
            outcome.message.as_deref(),
            Some("Worker 7 is already booked during this time slot")
        );
    }

    #[test]
    fn other_workers_do_not_conflict() {
        let candidate = Candidate {
            client_id: 3,
            employee_id: 7,
            start_minutes: 600,
            duration_minutes: 120,
        };
        // overlapping job, but a different worker for a different client
        let booked = vec![slot(10, 9, 8, 630, 60)];
        assert!(check_assignment(&candidate, false, &booked).is_valid);
    }

    #[test]
    fn edited_job_excluded_at_fetch_never_conflicts_with_itself() {
        // Re-validating an edit: the caller excludes the job's own row, so an
        // otherwise-identical slot list is empty and the edit passes.
        let candidate = Candidate {
            client_id: 3,
            employee_id: 7,
            start_minutes: 600,
            duration_minutes: 120,
        };
        assert!(check_assignment(&candidate, false, &[]).is_valid);
    }

    #[test]
    fn unavailable_is_union_of_absent_and_overlapping() {
        let booked = vec![
            slot(1, 1, 2, 600, 60),  // overlaps
            slot(2, 1, 3, 720, 60),  // touches, does not overlap
            slot(3, 1, 4, 540, 120), // overlaps
        ];
        let unavailable = unavailable_employees(600, 120, &[9], &booked);
        assert_eq!(unavailable, HashSet::from([9, 2, 4]));
    }

    #[test]
    fn minutes_conversion() {
        let t = NaiveTime::from_hms_opt(10, 30, 0).unwrap();
        assert_eq!(minutes_from_midnight(t), 630);
        assert_eq!(
            minutes_from_midnight(NaiveTime::from_hms_opt(0, 0, 0).unwrap()),
            0
        );
    }
}

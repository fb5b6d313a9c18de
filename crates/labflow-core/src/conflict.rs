use labflow_schema::Slot;
use labflow_store::SlotReservation;

/// Find the first requested slot that collides with an existing reservation.
///
/// Pure given its inputs: no reads, no writes. Scan order is the candidate
/// list first, then reservation load order, so the reported slot is the
/// earliest candidate that cannot be honored. O(candidates × reservations),
/// which is fine at the scale of one institution's labs.
pub fn find_conflict(existing: &[SlotReservation], candidates: &[Slot]) -> Option<Slot> {
    for candidate in candidates {
        for reservation in existing {
            if reservation.slot().overlaps(candidate) {
                return Some(*candidate);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use labflow_schema::TimeOfDay;

    fn slot(date: &str, time: TimeOfDay) -> Slot {
        Slot::new(date.parse().unwrap(), time)
    }

    fn reservation(id: &str, date: &str, time: TimeOfDay) -> SlotReservation {
        SlotReservation {
            id: id.into(),
            lab_id: "lab-1".into(),
            lab_name: "Systems Lab".to_owned(),
            date: date.parse().unwrap(),
            time,
            request_id: "req-0".into(),
            created_at: "2024-04-01T08:00:00Z".to_owned(),
        }
    }

    #[test]
    fn empty_ledger_never_conflicts() {
        let candidates = vec![slot("2024-05-01", TimeOfDay::FullDay)];
        assert_eq!(find_conflict(&[], &candidates), None);
    }

    #[test]
    fn empty_candidate_list_never_conflicts() {
        let existing = vec![reservation("r1", "2024-05-01", TimeOfDay::FullDay)];
        assert_eq!(find_conflict(&existing, &[]), None);
    }

    #[test]
    fn full_day_reservation_blocks_every_band() {
        let existing = vec![reservation("r1", "2024-05-01", TimeOfDay::FullDay)];
        for time in [TimeOfDay::Forenoon, TimeOfDay::Afternoon, TimeOfDay::FullDay] {
            let hit = find_conflict(&existing, &[slot("2024-05-01", time)]);
            assert_eq!(hit, Some(slot("2024-05-01", time)));
        }
    }

    #[test]
    fn full_day_candidate_blocked_by_half_day() {
        // An existing AN reservation blocks a FULL candidate on the same date
        let existing = vec![reservation("r1", "2024-05-01", TimeOfDay::Afternoon)];
        let hit = find_conflict(&existing, &[slot("2024-05-01", TimeOfDay::FullDay)]);
        assert_eq!(hit, Some(slot("2024-05-01", TimeOfDay::FullDay)));
    }

    #[test]
    fn distinct_half_days_do_not_conflict() {
        let existing = vec![reservation("r1", "2024-05-01", TimeOfDay::Forenoon)];
        assert_eq!(
            find_conflict(&existing, &[slot("2024-05-01", TimeOfDay::Afternoon)]),
            None
        );
    }

    #[test]
    fn same_half_day_conflicts() {
        let existing = vec![reservation("r1", "2024-05-01", TimeOfDay::Forenoon)];
        let hit = find_conflict(&existing, &[slot("2024-05-01", TimeOfDay::Forenoon)]);
        assert_eq!(hit, Some(slot("2024-05-01", TimeOfDay::Forenoon)));
    }

    #[test]
    fn different_dates_do_not_conflict() {
        let existing = vec![reservation("r1", "2024-05-01", TimeOfDay::FullDay)];
        assert_eq!(
            find_conflict(&existing, &[slot("2024-05-02", TimeOfDay::FullDay)]),
            None
        );
    }

    #[test]
    fn first_colliding_candidate_wins() {
        let existing = vec![
            reservation("r1", "2024-05-02", TimeOfDay::Forenoon),
            reservation("r2", "2024-05-03", TimeOfDay::Forenoon),
        ];
        // Both the second and third candidates collide; the scan must
        // report the second (earliest in candidate order).
        let candidates = vec![
            slot("2024-05-01", TimeOfDay::Forenoon),
            slot("2024-05-03", TimeOfDay::FullDay),
            slot("2024-05-02", TimeOfDay::Forenoon),
        ];
        assert_eq!(
            find_conflict(&existing, &candidates),
            Some(slot("2024-05-03", TimeOfDay::FullDay))
        );
    }
}

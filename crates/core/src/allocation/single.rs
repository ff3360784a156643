//! Single-slot suggester

use chrono::NaiveDateTime;

use super::is_slot_available;
use crate::models::{Apartment, ApartmentId, Booking, ParkingSlot, Suggestion};

/// Every slot free for the whole of `[start, end)`
///
/// The requesting apartment's own slot, when free, comes first with
/// `is_priority` set. All other free slots follow in directory order. An
/// apartment missing from the directory gets an empty list.
pub fn suggest_single(
    apartment_id: &ApartmentId,
    start: NaiveDateTime,
    end: NaiveDateTime,
    apartments: &[Apartment],
    slots: &[ParkingSlot],
    bookings: &[Booking],
) -> Vec<Suggestion> {
    let Some(apartment) = apartments.iter().find(|a| &a.id == apartment_id) else {
        return Vec::new();
    };

    let mut suggestions = Vec::new();

    if let Some(own_id) = apartment.owned_slot() {
        if let Some(own) = slots.iter().find(|s| &s.id == own_id) {
            if is_slot_available(&own.id, start, end, bookings) {
                suggestions.push(Suggestion::from_slot(own, true));
            }
        }
    }

    // The own slot is excluded here even when it was taken
    let own_id = apartment.parking_slot_id.as_ref();
    suggestions.extend(
        slots
            .iter()
            .filter(|slot| Some(&slot.id) != own_id)
            .filter(|slot| is_slot_available(&slot.id, start, end, bookings))
            .map(|slot| Suggestion::from_slot(slot, false)),
    );

    suggestions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocation::fixtures::*;
    use crate::models::SlotId;

    fn apt(id: &str) -> ApartmentId {
        ApartmentId::new(id)
    }

    #[test]
    fn test_own_slot_first_without_bookings() {
        let directory = building();
        let result = suggest_single(
            &apt("apt-6"),
            at(1, 16),
            at(2, 11),
            &directory.apartments,
            &directory.slots,
            &[],
        );

        assert_eq!(result.len(), directory.slots.len());
        assert_eq!(result[0].slot_name, "Slot 118");
        assert!(result[0].is_priority);
        assert!(result[1..].iter().all(|s| !s.is_priority));

        let rest: Vec<_> = result[1..].iter().map(|s| s.slot_id.clone()).collect();
        let expected: Vec<_> = directory
            .slots
            .iter()
            .filter(|s| s.id.as_str() != "ps-6")
            .map(|s| s.id.clone())
            .collect();
        assert_eq!(rest, expected);
    }

    #[test]
    fn test_own_slot_first_regardless_of_directory_order() {
        let directory = building();
        // ps-105 sits near the end of the directory
        let result = suggest_single(
            &apt("apt-105"),
            at(1, 16),
            at(2, 11),
            &directory.apartments,
            &directory.slots,
            &[],
        );
        assert_eq!(result[0].slot_id, SlotId::new("ps-105"));
        assert!(result[0].is_priority);
        assert_eq!(result.iter().filter(|s| s.slot_id.as_str() == "ps-105").count(), 1);
    }

    #[test]
    fn test_taken_own_slot_is_not_listed() {
        let directory = building();
        let bookings = vec![booking(&directory, "ps-6", at(1, 12), at(1, 20))];
        let result = suggest_single(
            &apt("apt-6"),
            at(1, 16),
            at(2, 11),
            &directory.apartments,
            &directory.slots,
            &bookings,
        );

        assert_eq!(result.len(), directory.slots.len() - 1);
        assert!(result.iter().all(|s| s.slot_id.as_str() != "ps-6"));
        assert!(result.iter().all(|s| !s.is_priority));
    }

    #[test]
    fn test_apartment_without_parking() {
        let directory = building();
        let result = suggest_single(
            &apt("apt-2"),
            at(1, 16),
            at(2, 11),
            &directory.apartments,
            &directory.slots,
            &[],
        );
        assert_eq!(result.len(), directory.slots.len());
        assert!(result.iter().all(|s| !s.is_priority));
        assert_eq!(result[0].slot_id, directory.slots[0].id);
    }

    #[test]
    fn test_unknown_apartment_is_empty() {
        let directory = building();
        let result = suggest_single(
            &apt("apt-999"),
            at(1, 16),
            at(2, 11),
            &directory.apartments,
            &directory.slots,
            &[],
        );
        assert!(result.is_empty());
    }

    #[test]
    fn test_everything_taken() {
        let directory = building();
        let bookings = occupy_all_except(&directory, &[], at(1, 0), at(10, 0));
        let result = suggest_single(
            &apt("apt-6"),
            at(1, 16),
            at(2, 11),
            &directory.apartments,
            &directory.slots,
            &bookings,
        );
        assert!(result.is_empty());
    }

    #[test]
    fn test_empty_directory() {
        let result = suggest_single(&apt("apt-6"), at(1, 16), at(2, 11), &[], &[], &[]);
        assert!(result.is_empty());
    }

    #[test]
    fn test_accepted_suggestion_blocks_requery() {
        let directory = building();
        let mut bookings = Vec::new();
        let first = suggest_single(
            &apt("apt-6"),
            at(1, 16),
            at(2, 11),
            &directory.apartments,
            &directory.slots,
            &bookings,
        );
        let chosen = first[0].slot_id.clone();
        bookings.push(booking(&directory, chosen.as_str(), at(1, 16), at(2, 11)));

        assert!(!is_slot_available(&chosen, at(1, 16), at(2, 11), &bookings));
        let again = suggest_single(
            &apt("apt-6"),
            at(1, 16),
            at(2, 11),
            &directory.apartments,
            &directory.slots,
            &bookings,
        );
        assert!(again.iter().all(|s| s.slot_id != chosen));
        assert_eq!(again.len(), first.len() - 1);
    }

    #[test]
    fn test_deterministic() {
        let directory = building();
        let bookings = vec![booking(&directory, "ps-7", at(1, 0), at(3, 0))];
        let run = || {
            suggest_single(
                &apt("apt-6"),
                at(1, 16),
                at(2, 11),
                &directory.apartments,
                &directory.slots,
                &bookings,
            )
        };
        assert_eq!(run(), run());
    }
}

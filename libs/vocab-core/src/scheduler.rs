//! Fixed-ladder review scheduler.
//!
//! Three pure operations over card review state:
//! - [`select_due`] picks the cards whose review time has arrived
//! - [`shuffle`] randomizes the review order
//! - [`next_state`] computes the schedule after a grading
//!
//! The clock and the random source are always passed in by the caller.

use chrono::{DateTime, Duration, Utc};
use rand::{Rng, SeedableRng};
use rand_pcg::Mcg128Xsl64;

use crate::error::InvalidGradeError;
use crate::types::{Card, CardState, CardStatus, CardUpdate, Grade};

/// Interval after a `normal` grading, in days.
pub const NORMAL_INTERVAL_DAYS: u32 = 1;

/// Intervals for the 1st, 2nd and 3rd+ consecutive `familiar` gradings.
pub const FAMILIAR_LADDER_DAYS: [u32; 3] = [2, 4, 8];

/// Anything carrying a card review state.
pub trait Schedulable {
    fn review_state(&self) -> &CardState;
}

impl Schedulable for CardState {
    fn review_state(&self) -> &CardState {
        self
    }
}

impl Schedulable for Card {
    fn review_state(&self) -> &CardState {
        &self.state
    }
}

/// Whether a card should be shown at `now`.
pub fn is_due(state: &CardState, now: DateTime<Utc>) -> bool {
    if state.status == CardStatus::New {
        return true;
    }
    match state.next_review_at {
        None => true,
        Some(at) => at <= now,
    }
}

/// Cards due at `now`, in input order.
pub fn select_due<T>(cards: &[T], now: DateTime<Utc>) -> Vec<T>
where
    T: Schedulable + Clone,
{
    cards
        .iter()
        .filter(|card| is_due(card.review_state(), now))
        .cloned()
        .collect()
}

/// Fisher-Yates shuffle into a new vector; `items` is left untouched.
pub fn shuffle<T, R>(items: &[T], rng: &mut R) -> Vec<T>
where
    T: Clone,
    R: Rng + ?Sized,
{
    let mut shuffled = items.to_vec();
    for i in (1..shuffled.len()).rev() {
        let j = rng.gen_range(0..=i);
        shuffled.swap(i, j);
    }
    shuffled
}

/// [`shuffle`] with a PCG generator seeded from `seed`.
pub fn shuffle_seeded<T: Clone>(items: &[T], seed: u64) -> Vec<T> {
    let mut rng = Mcg128Xsl64::seed_from_u64(seed);
    shuffle(items, &mut rng)
}

/// Interval for the `streak`-th consecutive `familiar` grading (1-based).
pub fn familiar_interval(streak: u32) -> u32 {
    let last = FAMILIAR_LADDER_DAYS.len() - 1;
    let index = (streak.max(1) - 1) as usize;
    FAMILIAR_LADDER_DAYS[index.min(last)]
}

/// Schedule after grading `state` with `grade` at `now`.
pub fn next_state(state: &CardState, grade: Grade, now: DateTime<Utc>) -> CardUpdate {
    match grade {
        // Re-shown later in the session; nothing is rescheduled.
        Grade::Again => CardUpdate {
            status: state.status,
            next_review_at: None,
            current_interval: state.current_interval,
            consecutive_familiar_count: 0,
        },
        Grade::Normal => CardUpdate {
            status: CardStatus::Normal,
            next_review_at: Some(now + Duration::days(NORMAL_INTERVAL_DAYS as i64)),
            current_interval: NORMAL_INTERVAL_DAYS,
            consecutive_familiar_count: 0,
        },
        Grade::Familiar => {
            let streak = state.consecutive_familiar_count.saturating_add(1);
            let interval = familiar_interval(streak);
            CardUpdate {
                status: CardStatus::Familiar,
                next_review_at: Some(now + Duration::days(interval as i64)),
                current_interval: interval,
                consecutive_familiar_count: streak,
            }
        }
    }
}

/// [`next_state`] for a grade given as text, as it arrives from clients.
pub fn next_state_for_action(
    state: &CardState,
    action: &str,
    now: DateTime<Utc>,
) -> Result<CardUpdate, InvalidGradeError> {
    let grade: Grade = action.parse()?;
    Ok(next_state(state, grade, now))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, 9, 30, 0).unwrap()
    }

    fn state(status: CardStatus, next_review_at: Option<DateTime<Utc>>) -> CardState {
        CardState {
            status,
            next_review_at,
            ..Default::default()
        }
    }

    #[test]
    fn new_card_is_due_even_with_future_date() {
        let card = state(CardStatus::New, Some(t0() + Duration::days(30)));
        assert!(is_due(&card, t0()));
    }

    #[test]
    fn unscheduled_card_is_due() {
        assert!(is_due(&state(CardStatus::Familiar, None), t0()));
    }

    #[test]
    fn due_boundary_is_inclusive() {
        let card = state(CardStatus::Normal, Some(t0()));
        assert!(is_due(&card, t0()));
        assert!(!is_due(&card, t0() - Duration::seconds(1)));
    }

    #[test]
    fn select_due_keeps_new_and_past_cards_in_order() {
        let a = state(CardStatus::New, None);
        let b = state(CardStatus::Normal, Some(t0() - Duration::days(1)));
        let c = state(CardStatus::Familiar, Some(t0() + Duration::days(1)));

        let due = select_due(&[a.clone(), b.clone(), c], t0());
        assert_eq!(due, vec![a, b]);
    }

    #[test]
    fn select_due_on_empty_input() {
        let due: Vec<CardState> = select_due(&[], t0());
        assert!(due.is_empty());
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let items: Vec<u32> = (0..50).collect();
        let mut shuffled = shuffle_seeded(&items, 7);
        assert_eq!(shuffled.len(), items.len());
        assert_ne!(shuffled, items);

        shuffled.sort_unstable();
        assert_eq!(shuffled, items);
    }

    #[test]
    fn shuffle_keeps_duplicates() {
        let items = vec!["a", "b", "a", "c", "a"];
        let mut shuffled = shuffle_seeded(&items, 3);
        shuffled.sort_unstable();
        assert_eq!(shuffled, vec!["a", "a", "a", "b", "c"]);
    }

    #[test]
    fn shuffle_is_deterministic_per_seed() {
        let items: Vec<u32> = (0..20).collect();
        assert_eq!(shuffle_seeded(&items, 42), shuffle_seeded(&items, 42));
    }

    #[test]
    fn shuffle_handles_empty_and_single() {
        let empty: Vec<u8> = vec![];
        assert!(shuffle_seeded(&empty, 1).is_empty());
        assert_eq!(shuffle_seeded(&[9u8], 1), vec![9]);
    }

    #[test]
    fn shuffle_reaches_every_permutation_of_three() {
        let items = [1, 2, 3];
        let mut rng = Mcg128Xsl64::seed_from_u64(11);
        let mut counts = std::collections::HashMap::new();
        for _ in 0..6000 {
            *counts.entry(shuffle(&items, &mut rng)).or_insert(0u32) += 1;
        }

        assert_eq!(counts.len(), 6);
        // Expected 1000 each; allow a generous band.
        assert!(counts.values().all(|&n| (800..1200).contains(&n)), "{counts:?}");
    }

    #[test]
    fn familiar_ladder_caps_interval_not_counter() {
        let mut current = CardState::default();
        let mut intervals = Vec::new();
        let mut counts = Vec::new();

        for day in 0..6 {
            let update = next_state(&current, Grade::Familiar, t0() + Duration::days(day));
            intervals.push(update.current_interval);
            counts.push(update.consecutive_familiar_count);
            current = current.with_update(&update);
        }

        assert_eq!(intervals, vec![2, 4, 8, 8, 8, 8]);
        assert_eq!(counts, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn normal_resets_streak() {
        let current = CardState {
            status: CardStatus::Familiar,
            next_review_at: Some(t0()),
            current_interval: 8,
            consecutive_familiar_count: 4,
        };

        let update = next_state(&current, Grade::Normal, t0());
        assert_eq!(
            update,
            CardUpdate {
                status: CardStatus::Normal,
                next_review_at: Some(t0() + Duration::days(1)),
                current_interval: 1,
                consecutive_familiar_count: 0,
            }
        );

        let after = next_state(&current.with_update(&update), Grade::Familiar, t0());
        assert_eq!(after.current_interval, 2);
    }

    #[test]
    fn again_keeps_status_and_interval() {
        let current = CardState {
            status: CardStatus::Familiar,
            next_review_at: Some(t0() - Duration::days(1)),
            current_interval: 4,
            consecutive_familiar_count: 2,
        };

        let update = next_state(&current, Grade::Again, t0());
        assert_eq!(update.status, CardStatus::Familiar);
        assert_eq!(update.next_review_at, None);
        assert_eq!(update.current_interval, 4);
        assert_eq!(update.consecutive_familiar_count, 0);

        let after = next_state(&current.with_update(&update), Grade::Familiar, t0());
        assert_eq!(after.current_interval, 2);
    }

    #[test]
    fn again_on_new_card_stays_new() {
        let update = next_state(&CardState::default(), Grade::Again, t0());
        assert_eq!(update.status, CardStatus::New);
        assert_eq!(update.current_interval, 0);
    }

    #[test]
    fn end_to_end_schedule() {
        let t1 = t0() + Duration::days(2);
        let t2 = t1 + Duration::days(4);

        let first = next_state(&CardState::default(), Grade::Familiar, t0());
        assert_eq!(
            first,
            CardUpdate {
                status: CardStatus::Familiar,
                next_review_at: Some(t0() + Duration::days(2)),
                current_interval: 2,
                consecutive_familiar_count: 1,
            }
        );

        let second = next_state(&CardState::default().with_update(&first), Grade::Familiar, t1);
        assert_eq!(second.current_interval, 4);
        assert_eq!(second.consecutive_familiar_count, 2);
        assert_eq!(second.next_review_at, Some(t1 + Duration::days(4)));

        let third = next_state(&CardState::default().with_update(&second), Grade::Normal, t2);
        assert_eq!(
            third,
            CardUpdate {
                status: CardStatus::Normal,
                next_review_at: Some(t2 + Duration::days(1)),
                current_interval: 1,
                consecutive_familiar_count: 0,
            }
        );
    }

    #[test]
    fn text_action_is_parsed_before_scheduling() {
        let update = next_state_for_action(&CardState::default(), "normal", t0()).unwrap();
        assert_eq!(update.status, CardStatus::Normal);

        let err = next_state_for_action(&CardState::default(), "hard", t0()).unwrap_err();
        assert_eq!(err, InvalidGradeError::new("hard"));
        assert_eq!(err.to_string(), "invalid grade: hard");
    }

    #[test]
    fn familiar_interval_ladder() {
        assert_eq!(familiar_interval(1), 2);
        assert_eq!(familiar_interval(2), 4);
        assert_eq!(familiar_interval(3), 8);
        assert_eq!(familiar_interval(100), 8);
    }
}

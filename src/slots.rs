//! Daily time slot generation.
//!
//! Produces the ordered class and break intervals of one day from the day
//! window, the period length, and the requested breaks.
//!
//! # Algorithm
//!
//! 1. Emit consecutive class intervals while they end within the window.
//!    Right after the 2nd class, emit the first break (if requested).
//! 2. With 2+ breaks requested and one still unplaced, put a break before
//!    the final class. Classes are contiguous, so the break is anchored at
//!    the previous interval's end and the final class is pushed back by the
//!    break length. A pushed class that no longer fits is dropped.
//! 3. Remaining breaks go between two adjacent classes, at most one per
//!    pair, and only where the break does not overlap the following class.
//!
//! There is no rebalancing: a window too short for the requested periods
//! and breaks simply yields fewer periods.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::models::{add_minutes, sub_minutes, TimeSlot};

/// Generator input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotParams {
    /// Day start.
    pub start: NaiveTime,
    /// Day end; no interval extends past it.
    pub end: NaiveTime,
    /// Class length (minutes).
    pub period_minutes: u32,
    /// Breaks requested.
    pub breaks: u32,
    /// Break length (minutes).
    pub break_minutes: u32,
}

/// Interval classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlotKind {
    Class,
    Break,
}

/// One generated interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySlot {
    pub slot: TimeSlot,
    pub kind: SlotKind,
}

impl DaySlot {
    fn class(start: NaiveTime, end: NaiveTime) -> Self {
        Self {
            slot: TimeSlot::new(start, end),
            kind: SlotKind::Class,
        }
    }

    fn brk(start: NaiveTime, end: NaiveTime) -> Self {
        Self {
            slot: TimeSlot::new(start, end),
            kind: SlotKind::Break,
        }
    }

    /// Whether this is a class interval.
    #[inline]
    pub fn is_class(&self) -> bool {
        self.kind == SlotKind::Class
    }
}

/// Generates the day's class and break intervals in order.
pub fn generate_slots(params: &SlotParams) -> Vec<DaySlot> {
    let mut slots = Vec::new();
    if params.period_minutes == 0 {
        return slots;
    }
    // Zero-length breaks are not intervals.
    let breaks = if params.break_minutes == 0 { 0 } else { params.breaks };
    let within = |t: NaiveTime| t <= params.end;

    let mut placed = 0;
    let mut classes = 0;
    let mut cursor = params.start;

    while let Some(class_end) = add_minutes(cursor, params.period_minutes).filter(|&t| within(t)) {
        slots.push(DaySlot::class(cursor, class_end));
        classes += 1;
        cursor = class_end;

        if classes == 2 && placed < breaks {
            match add_minutes(class_end, params.break_minutes).filter(|&t| within(t)) {
                Some(break_end) => {
                    slots.push(DaySlot::brk(class_end, break_end));
                    placed += 1;
                    cursor = break_end;
                }
                // Nothing else can fit after a break that overruns the window.
                None => break,
            }
        }
    }

    if breaks >= 2 && placed < breaks && slots.len() >= 2 && insert_trailing_break(&mut slots, params)
    {
        placed += 1;
    }

    let mut remaining = breaks - placed;
    let mut i = 0;
    while remaining > 0 && i + 1 < slots.len() {
        let (curr, next) = (slots[i], slots[i + 1]);
        if curr.is_class() && next.is_class() {
            if let Some(break_end) = add_minutes(curr.slot.end, params.break_minutes) {
                if break_end <= next.slot.start {
                    slots.insert(i + 1, DaySlot::brk(curr.slot.end, break_end));
                    remaining -= 1;
                    i += 2;
                    continue;
                }
            }
        }
        i += 1;
    }

    slots
}

/// Places a break before the final class. Returns whether a break was placed.
fn insert_trailing_break(slots: &mut Vec<DaySlot>, params: &SlotParams) -> bool {
    let Some(&last) = slots.last() else {
        return false;
    };
    if !last.is_class() {
        return false;
    }
    slots.pop();
    let Some(prev_end) = slots.last().map(|s| s.slot.end) else {
        slots.push(last);
        return false;
    };

    let gap_start = sub_minutes(last.slot.start, params.break_minutes);
    if let Some(break_start) = gap_start.filter(|&t| t >= prev_end) {
        slots.push(DaySlot::brk(break_start, last.slot.start));
        slots.push(last);
        return true;
    }

    // Anchor at the previous end and push the final class back.
    let shifted = add_minutes(prev_end, params.break_minutes).and_then(|break_end| {
        add_minutes(last.slot.end, params.break_minutes).map(|class_end| (break_end, class_end))
    });
    match shifted {
        Some((break_end, class_end)) if break_end <= params.end => {
            slots.push(DaySlot::brk(prev_end, break_end));
            if class_end <= params.end {
                slots.push(DaySlot::class(break_end, class_end));
            }
            true
        }
        _ => {
            slots.push(last);
            false
        }
    }
}

/// Class intervals only, breaks filtered out.
pub fn class_slots(params: &SlotParams) -> Vec<TimeSlot> {
    generate_slots(params)
        .into_iter()
        .filter(DaySlot::is_class)
        .map(|s| s.slot)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::parse_hhmm;
    use proptest::prelude::*;

    fn params(start: &str, end: &str, period: u32, breaks: u32, break_len: u32) -> SlotParams {
        SlotParams {
            start: parse_hhmm(start).unwrap(),
            end: parse_hhmm(end).unwrap(),
            period_minutes: period,
            breaks,
            break_minutes: break_len,
        }
    }

    fn render(slots: &[DaySlot]) -> Vec<String> {
        slots
            .iter()
            .map(|s| match s.kind {
                SlotKind::Class => s.slot.to_string(),
                SlotKind::Break => format!("{} break", s.slot),
            })
            .collect()
    }

    #[test]
    fn test_short_window_stops_early() {
        let slots = generate_slots(&params("09:00", "12:00", 60, 1, 15));
        assert_eq!(
            render(&slots),
            vec!["09:00-10:00", "10:00-11:00", "11:00-11:15 break"]
        );
    }

    #[test]
    fn test_no_breaks() {
        let slots = generate_slots(&params("09:00", "12:00", 60, 0, 15));
        assert_eq!(
            render(&slots),
            vec!["09:00-10:00", "10:00-11:00", "11:00-12:00"]
        );
    }

    #[test]
    fn test_trailing_break_shifts_final_class() {
        let slots = generate_slots(&params("09:00", "13:00", 50, 2, 10));
        assert_eq!(
            render(&slots),
            vec![
                "09:00-09:50",
                "09:50-10:40",
                "10:40-10:50 break",
                "10:50-11:40",
                "11:40-11:50 break",
                "11:50-12:40",
            ]
        );
    }

    #[test]
    fn test_trailing_break_consumes_final_class() {
        let slots = generate_slots(&params("08:00", "11:55", 55, 2, 10));
        assert_eq!(
            render(&slots),
            vec![
                "08:00-08:55",
                "08:55-09:50",
                "09:50-10:00 break",
                "10:00-10:55",
                "10:55-11:05 break",
            ]
        );
    }

    #[test]
    fn test_trailing_break_skipped_when_day_ends_on_break() {
        let slots = generate_slots(&params("09:00", "12:00", 60, 2, 15));
        assert_eq!(
            render(&slots),
            vec!["09:00-10:00", "10:00-11:00", "11:00-11:15 break"]
        );
    }

    #[test]
    fn test_extra_breaks_never_overlap_contiguous_classes() {
        let slots = generate_slots(&params("08:00", "16:00", 50, 4, 10));
        let breaks = slots.iter().filter(|s| !s.is_class()).count();
        assert_eq!(breaks, 2);
    }

    #[test]
    fn test_first_break_overrunning_window_is_dropped() {
        let slots = generate_slots(&params("09:00", "11:00", 60, 1, 15));
        assert_eq!(render(&slots), vec!["09:00-10:00", "10:00-11:00"]);
    }

    #[test]
    fn test_class_slots_filters_breaks() {
        let classes = class_slots(&params("09:00", "13:00", 50, 2, 10));
        assert_eq!(classes.len(), 4);
        assert_eq!(classes[3].to_string(), "11:50-12:40");
    }

    #[test]
    fn test_zero_period_yields_nothing() {
        assert!(generate_slots(&params("09:00", "12:00", 0, 0, 0)).is_empty());
    }

    proptest! {
        #[test]
        fn prop_slots_ordered_and_within_window(
            start_min in 360u32..720,
            span in 30u32..600,
            period in 20u32..120,
            breaks in 0u32..5,
            break_len in 0u32..40,
        ) {
            let start = NaiveTime::from_hms_opt(start_min / 60, start_min % 60, 0).unwrap();
            let end = add_minutes(start, span).unwrap();
            let slots = generate_slots(&SlotParams {
                start,
                end,
                period_minutes: period,
                breaks,
                break_minutes: break_len,
            });

            for s in &slots {
                prop_assert!(s.slot.start < s.slot.end);
                prop_assert!(s.slot.start >= start);
                prop_assert!(s.slot.end <= end);
            }
            for pair in slots.windows(2) {
                prop_assert!(pair[0].slot.end <= pair[1].slot.start);
            }
            let classes: Vec<_> = slots.iter().filter(|s| s.is_class()).collect();
            for pair in classes.windows(2) {
                prop_assert!(pair[0].slot.start < pair[1].slot.start);
            }
        }
    }
}

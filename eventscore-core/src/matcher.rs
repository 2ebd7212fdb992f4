//! Matching of detected events against ground-truth intervals.
//!
//! Every truth gets a matching window (its interval widened by the configured
//! delay and tolerance). An event matches a truth when the event's
//! representative instant lies inside that window, both ends inclusive. All
//! matches are recorded: windows may overlap, so one event can confirm
//! several truths and one truth can be confirmed by several events.
//!
//! Matching is a pure function of `(truths, events, policy)`: the scan is a
//! plain nested loop over the inputs in their given order, without sorting or
//! indexing, so the same inputs always give the same [`Evaluation`].

use std::collections::BTreeMap;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

use crate::annotations::{Event, IntervalId, Truth};
use crate::config::MatchingPolicy;
use crate::time::Timestamp;

/// Acceptance window of a truth, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchWindow {
    pub begin: Timestamp,
    pub end: Timestamp,
}

impl MatchWindow {
    /// Widens `[begin, end]` according to `policy`.
    ///
    /// The end always moves by `delay + tolerance`. The begin moves back by
    /// `tolerance`, or, in uncompromising mode, forward by
    /// `delay - tolerance` so that early detections are rejected.
    pub fn derive(begin: Timestamp, end: Timestamp, policy: &MatchingPolicy) -> Self {
        let delay = policy.delay();
        let tolerance = policy.tolerance();

        let window_begin = if policy.uncompromising {
            begin + delay - tolerance
        } else {
            begin - tolerance
        };

        Self {
            begin: window_begin,
            end: end + delay + tolerance,
        }
    }

    pub fn contains(&self, time: Timestamp) -> bool {
        self.begin <= time && time <= self.end
    }
}

/// Counts produced by one evaluation of events against a ground truth.
///
/// `duplicate_events` and `duplicate_truths` are diagnostics layered on top
/// of the true/false positive counts, never subtracted from them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Evaluation {
    /// Number of events, unfiltered.
    pub detected: usize,
    /// Truths that are scored, i.e. all truths minus the ambiguous ones.
    pub positives: usize,
    pub true_positive: usize,
    pub false_positive: usize,
    pub false_negative: usize,
    /// Matches on a truth that an earlier event had already matched.
    pub duplicate_events: usize,
    /// Matches of an event that had already matched an earlier truth.
    pub duplicate_truths: usize,
    pub ambiguous: usize,
}

impl Add for Evaluation {
    type Output = Evaluation;

    fn add(self, rhs: Evaluation) -> Evaluation {
        Evaluation {
            detected: self.detected + rhs.detected,
            positives: self.positives + rhs.positives,
            true_positive: self.true_positive + rhs.true_positive,
            false_positive: self.false_positive + rhs.false_positive,
            false_negative: self.false_negative + rhs.false_negative,
            duplicate_events: self.duplicate_events + rhs.duplicate_events,
            duplicate_truths: self.duplicate_truths + rhs.duplicate_truths,
            ambiguous: self.ambiguous + rhs.ambiguous,
        }
    }
}

impl AddAssign for Evaluation {
    fn add_assign(&mut self, rhs: Evaluation) {
        *self = *self + rhs;
    }
}

impl Sum for Evaluation {
    fn sum<I: Iterator<Item = Evaluation>>(iter: I) -> Evaluation {
        iter.fold(Evaluation::default(), Add::add)
    }
}

impl<'a> Sum<&'a Evaluation> for Evaluation {
    fn sum<I: Iterator<Item = &'a Evaluation>>(iter: I) -> Evaluation {
        iter.copied().sum()
    }
}

/// Symmetric record of all event/truth correspondences.
///
/// A pair is present in both directions or in neither.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSet {
    by_truth: BTreeMap<IntervalId, Vec<IntervalId>>,
    by_event: BTreeMap<IntervalId, Vec<IntervalId>>,
}

impl MatchSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `event` matched `truth`, in both directions.
    pub fn insert(&mut self, event: IntervalId, truth: IntervalId) {
        self.by_event.entry(event).or_default().push(truth);
        self.by_truth.entry(truth).or_default().push(event);
    }

    /// Events that matched `truth`, in scan order.
    pub fn events_for(&self, truth: IntervalId) -> &[IntervalId] {
        self.by_truth.get(&truth).map(Vec::as_slice).unwrap_or_default()
    }

    /// Truths that `event` matched, in scan order.
    pub fn truths_for(&self, event: IntervalId) -> &[IntervalId] {
        self.by_event.get(&event).map(Vec::as_slice).unwrap_or_default()
    }

    /// Number of recorded (event, truth) pairs.
    pub fn len(&self) -> usize {
        self.by_event.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_event.is_empty()
    }

    /// Checks that every pair is recorded in both directions.
    pub fn is_consistent(&self) -> bool {
        let pair_count =
            |map: &BTreeMap<IntervalId, Vec<IntervalId>>, a: IntervalId, b: IntervalId| {
                map.get(&a).map_or(0, |v| v.iter().filter(|&&x| x == b).count())
            };
        self.by_event.iter().all(|(&event, truths)| {
            truths.iter().all(|&truth| {
                pair_count(&self.by_event, event, truth) == pair_count(&self.by_truth, truth, event)
            })
        }) && self.len() == self.by_truth.values().map(Vec::len).sum::<usize>()
    }
}

/// Per-event diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventOutcome {
    pub event: Event,
    pub matched_truths: Vec<IntervalId>,
    /// True when this event matched a truth already matched by an earlier event.
    pub duplicate: bool,
}

impl EventOutcome {
    pub fn is_match(&self) -> bool {
        !self.matched_truths.is_empty()
    }
}

/// Per-truth diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TruthOutcome {
    pub truth: Truth,
    pub window: MatchWindow,
    pub matched_events: Vec<IntervalId>,
}

impl TruthOutcome {
    pub fn is_match(&self) -> bool {
        !self.matched_events.is_empty()
    }
}

/// Full result of a matching pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchOutcome {
    pub evaluation: Evaluation,
    pub matches: MatchSet,
    pub events: Vec<EventOutcome>,
    pub truths: Vec<TruthOutcome>,
}

impl MatchOutcome {
    /// Events that matched no truth at all.
    pub fn false_positives(&self) -> impl Iterator<Item = &Event> {
        self.events.iter().filter(|o| !o.is_match()).map(|o| &o.event)
    }

    /// Scored truths that no event matched.
    pub fn false_negatives(&self) -> impl Iterator<Item = &Truth> {
        self.truths
            .iter()
            .filter(|o| !o.truth.is_ambiguous && !o.is_match())
            .map(|o| &o.truth)
    }
}

/// Scores detections against ground truth under a [`MatchingPolicy`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventMatcher {
    policy: MatchingPolicy,
}

impl EventMatcher {
    pub fn new(policy: MatchingPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &MatchingPolicy {
        &self.policy
    }

    /// Window of `truth`: the one derived at load time, else from this policy.
    pub fn window_for(&self, truth: &Truth) -> MatchWindow {
        truth
            .window
            .unwrap_or_else(|| MatchWindow::derive(truth.begin, truth.end, &self.policy))
    }

    /// Counts only.
    pub fn evaluate(&self, truths: &[Truth], events: &[Event]) -> Evaluation {
        self.match_events(truths, events).evaluation
    }

    /// Runs the matching pass and keeps per-entry diagnostics.
    pub fn match_events(&self, truths: &[Truth], events: &[Event]) -> MatchOutcome {
        let windows: Vec<MatchWindow> = truths.iter().map(|t| self.window_for(t)).collect();

        let mut matches = MatchSet::new();
        // Bookkeeping is positional so that repeated ids cannot merge entries
        let mut truth_hits: Vec<Vec<IntervalId>> = vec![Vec::new(); truths.len()];
        let mut event_outcomes = Vec::with_capacity(events.len());
        let mut duplicate_events = 0;
        let mut duplicate_truths = 0;
        let mut false_positive = 0;

        for event in events {
            let time = event.representative_time(self.policy.anchor);
            let mut matched_truths = Vec::new();
            let mut duplicate = false;

            for ((truth, window), hits) in truths.iter().zip(&windows).zip(truth_hits.iter_mut()) {
                if !window.contains(time) {
                    continue;
                }
                if !matched_truths.is_empty() {
                    // several truths for one event
                    duplicate_truths += 1;
                }
                if !hits.is_empty() {
                    // several events for one truth
                    duplicate_events += 1;
                    duplicate = true;
                }
                matched_truths.push(truth.id);
                hits.push(event.id);
                matches.insert(event.id, truth.id);
            }

            if matched_truths.is_empty() {
                false_positive += 1;
            }
            event_outcomes.push(EventOutcome {
                event: event.clone(),
                matched_truths,
                duplicate,
            });
        }

        let mut true_positive = 0;
        let mut false_negative = 0;
        let mut ambiguous = 0;
        let mut truth_outcomes = Vec::with_capacity(truths.len());

        for ((truth, window), hits) in truths.iter().zip(windows).zip(truth_hits) {
            if truth.is_ambiguous {
                ambiguous += 1;
            } else if hits.is_empty() {
                false_negative += 1;
            } else {
                true_positive += 1;
            }
            truth_outcomes.push(TruthOutcome {
                truth: truth.clone(),
                window,
                matched_events: hits,
            });
        }

        let evaluation = Evaluation {
            detected: events.len(),
            positives: truths.len() - ambiguous,
            true_positive,
            false_positive,
            false_negative,
            duplicate_events,
            duplicate_truths,
            ambiguous,
        };

        MatchOutcome {
            evaluation,
            matches,
            events: event_outcomes,
            truths: truth_outcomes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EventAnchor;

    fn secs(s: i64) -> Timestamp {
        Timestamp::from_millis(s * 1_000)
    }

    fn truth(id: IntervalId, begin: i64, end: i64) -> Truth {
        Truth::new(id, secs(begin), secs(end))
    }

    fn event_at(s: i64) -> Event {
        Event::new(secs(s), secs(s))
    }

    #[test]
    fn test_window_lenient() {
        let policy = MatchingPolicy::new(5.0, 1.0, false);
        let window = MatchWindow::derive(secs(10), secs(20), &policy);
        assert_eq!(window.begin, secs(9));
        assert_eq!(window.end, secs(26));
    }

    #[test]
    fn test_window_uncompromising() {
        let policy = MatchingPolicy::new(5.0, 1.0, true);
        let window = MatchWindow::derive(secs(10), secs(20), &policy);
        assert_eq!(window.begin, secs(14));
        assert_eq!(window.end, secs(26));
        assert!(!window.contains(secs(12)));
        assert!(window.contains(secs(14)));
        assert!(window.contains(secs(26)));
    }

    #[test]
    fn test_one_event_two_truths_counts_duplicate_truth() {
        let matcher = EventMatcher::new(MatchingPolicy::new(0.0, 3.0, false));
        let truths = vec![truth(1, 10, 20), truth(2, 18, 30)];
        let outcome = matcher.match_events(&truths, &[event_at(19)]);

        assert_eq!(outcome.evaluation.true_positive, 2);
        assert_eq!(outcome.evaluation.duplicate_truths, 1);
        assert_eq!(outcome.evaluation.duplicate_events, 0);
        assert_eq!(outcome.matches.truths_for(19_000), &[1, 2]);
        assert!(!outcome.events[0].duplicate);
    }

    #[test]
    fn test_event_only_matching_ambiguous_truth_is_not_false_positive() {
        let matcher = EventMatcher::new(MatchingPolicy::new(0.0, 0.0, false));
        let truths = vec![truth(1, 10, 20).ambiguous()];
        let evaluation = matcher.evaluate(&truths, &[event_at(15)]);

        assert_eq!(evaluation.false_positive, 0);
        assert_eq!(evaluation.true_positive, 0);
        assert_eq!(evaluation.ambiguous, 1);
        assert_eq!(evaluation.positives, 0);
    }

    #[test]
    fn test_precomputed_window_wins_over_matcher_policy() {
        let load_policy = MatchingPolicy::new(0.0, 10.0, false);
        let truths = vec![truth(1, 10, 20).with_window(&load_policy)];
        let matcher = EventMatcher::new(MatchingPolicy::new(0.0, 0.0, false));
        assert_eq!(matcher.evaluate(&truths, &[event_at(25)]).true_positive, 1);

        let bare = vec![truth(1, 10, 20)];
        assert_eq!(matcher.evaluate(&bare, &[event_at(25)]).true_positive, 0);
    }

    #[test]
    fn test_midpoint_anchor() {
        let policy = MatchingPolicy::new(0.0, 0.0, false).with_anchor(EventAnchor::Midpoint);
        let matcher = EventMatcher::new(policy);
        let truths = vec![truth(1, 10, 20)];
        // Starts before the window, midpoint inside it
        let event = Event::new(secs(4), secs(24));
        assert_eq!(matcher.evaluate(&truths, &[event.clone()]).true_positive, 1);

        let begin_matcher = EventMatcher::new(MatchingPolicy::new(0.0, 0.0, false));
        assert_eq!(begin_matcher.evaluate(&truths, &[event]).true_positive, 0);
    }

    #[test]
    fn test_repeated_event_ids_do_not_merge_counts() {
        let matcher = EventMatcher::new(MatchingPolicy::new(0.0, 0.0, false));
        let truths = vec![truth(1, 10, 20)];
        let events = vec![event_at(30), event_at(30)];
        let evaluation = matcher.evaluate(&truths, &events);
        assert_eq!(evaluation.false_positive, 2);
        assert_eq!(evaluation.false_negative, 1);
    }

    #[test]
    fn test_match_set_consistency() {
        let matcher = EventMatcher::new(MatchingPolicy::new(2.0, 3.0, false));
        let truths = vec![truth(1, 10, 20), truth(2, 15, 25), truth(3, 100, 110)];
        let events = vec![event_at(12), event_at(16), event_at(50), event_at(104)];
        let outcome = matcher.match_events(&truths, &events);

        assert!(outcome.matches.is_consistent());
        assert_eq!(outcome.matches.len(), 5);
        for o in &outcome.truths {
            for &e in &o.matched_events {
                assert!(outcome.matches.truths_for(e).contains(&o.truth.id));
            }
        }
    }

    #[test]
    fn test_outcome_iterators() {
        let matcher = EventMatcher::new(MatchingPolicy::new(0.0, 0.0, false));
        let truths = vec![truth(1, 10, 20), truth(2, 40, 50), truth(3, 60, 70).ambiguous()];
        let outcome = matcher.match_events(&truths, &[event_at(15), event_at(30)]);

        let fps: Vec<_> = outcome.false_positives().map(|e| e.id).collect();
        let fns: Vec<_> = outcome.false_negatives().map(|t| t.id).collect();
        assert_eq!(fps, vec![30_000]);
        assert_eq!(fns, vec![2]);
    }

    #[test]
    fn test_evaluation_sum() {
        let a = Evaluation {
            detected: 3,
            positives: 2,
            true_positive: 1,
            false_positive: 2,
            false_negative: 1,
            duplicate_events: 0,
            duplicate_truths: 1,
            ambiguous: 0,
        };
        let b = Evaluation {
            detected: 1,
            positives: 4,
            true_positive: 1,
            false_positive: 0,
            false_negative: 3,
            duplicate_events: 2,
            duplicate_truths: 0,
            ambiguous: 1,
        };
        let total: Evaluation = [a, b].iter().sum();
        assert_eq!(total.detected, 4);
        assert_eq!(total.positives, 6);
        assert_eq!(total.false_negative, 4);
        assert_eq!(total.duplicate_events, 2);
        assert_eq!(total.ambiguous, 1);

        let mut running = Evaluation::default();
        running += a;
        running += b;
        assert_eq!(running, total);
    }
}

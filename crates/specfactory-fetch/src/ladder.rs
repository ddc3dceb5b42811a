// SPDX-License-Identifier: MIT OR Apache-2.0
//! Fallback ladder: fetcher-mode sequencing driven by outcome classification
//! (`spec.md` §4.3).

use specfactory_types::{FetchMethod, FetchOutcome};

/// What the scheduler should do next after one fetch attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LadderAction {
    /// Outcome was `ok`; stop, the source is done.
    Done,
    /// Terminal outcome (`not_found`/`bad_content`/`login_wall`); stop and
    /// skip the source, no assertions emitted.
    Skip,
    /// Retry the same URL with the next fetcher mode in the ladder.
    TryAlternateFetcher(FetchMethod),
    /// Wait the policy-configured delay, then retry the same mode.
    WaitAndRetrySame,
    /// All modes exhausted or `max_retries` reached; source fails.
    FallbackExhausted,
}

/// Default fetcher-mode sequence tried in order
/// (`spec.md` §4.3 "Fetcher modes").
const DEFAULT_LADDER: &[FetchMethod] = &[FetchMethod::DynamicBrowser, FetchMethod::Http, FetchMethod::Crawlee];

/// Tracks one source's progress through the fallback ladder across attempts.
#[derive(Debug, Clone)]
pub struct LadderState {
    modes: Vec<FetchMethod>,
    mode_index: usize,
    attempts: u32,
    max_retries: u32,
    pub(crate) retry_reasons: Vec<&'static str>,
}

impl LadderState {
    /// Start a new ladder at the given starting mode, with `max_retries`
    /// total attempts allowed across all modes combined
    /// (`spec.md` §4.3 default: 1).
    #[must_use]
    pub fn new(starting_mode: FetchMethod, max_retries: u32) -> Self {
        let modes: Vec<FetchMethod> = std::iter::once(starting_mode)
            .chain(DEFAULT_LADDER.iter().copied().filter(|m| *m != starting_mode))
            .collect();
        Self { modes, mode_index: 0, attempts: 0, max_retries, retry_reasons: Vec::new() }
    }

    /// Current fetcher mode to use for the next attempt.
    #[must_use]
    pub fn current_mode(&self) -> FetchMethod {
        self.modes[self.mode_index]
    }

    /// Total attempts made so far, across all modes.
    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Record one attempt's outcome and decide the next action
    /// (`spec.md` §4.3 fallback-ladder table).
    pub fn record(&mut self, outcome: FetchOutcome) -> LadderAction {
        self.attempts += 1;
        if outcome == FetchOutcome::Ok {
            return LadderAction::Done;
        }
        if outcome.should_skip() {
            return LadderAction::Skip;
        }
        if self.attempts > self.max_retries {
            return LadderAction::FallbackExhausted;
        }
        if outcome.should_wait_and_retry() {
            self.retry_reasons.push(reason_token(outcome));
            return LadderAction::WaitAndRetrySame;
        }
        if outcome.should_try_alternate_fetcher() {
            self.retry_reasons.push(reason_token(outcome));
            if self.mode_index + 1 < self.modes.len() {
                self.mode_index += 1;
                return LadderAction::TryAlternateFetcher(self.current_mode());
            }
            return LadderAction::FallbackExhausted;
        }
        LadderAction::FallbackExhausted
    }
}

fn reason_token(outcome: FetchOutcome) -> &'static str {
    match outcome {
        FetchOutcome::Blocked => "blocked",
        FetchOutcome::BotChallenge => "bot_challenge",
        FetchOutcome::ServerError => "server_error",
        FetchOutcome::NetworkTimeout => "network_timeout",
        FetchOutcome::FetchError => "fetch_error",
        FetchOutcome::RateLimited => "rate_limited",
        _ => "unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_outcome_stops_the_ladder() {
        let mut ladder = LadderState::new(FetchMethod::Http, 1);
        assert_eq!(ladder.record(FetchOutcome::Ok), LadderAction::Done);
    }

    #[test]
    fn terminal_outcome_skips_without_consuming_retries() {
        let mut ladder = LadderState::new(FetchMethod::Http, 1);
        assert_eq!(ladder.record(FetchOutcome::NotFound), LadderAction::Skip);
    }

    #[test]
    fn blocked_outcome_advances_to_next_mode() {
        let mut ladder = LadderState::new(FetchMethod::DynamicBrowser, 2);
        let action = ladder.record(FetchOutcome::Blocked);
        assert_eq!(action, LadderAction::TryAlternateFetcher(FetchMethod::Http));
        assert_eq!(ladder.current_mode(), FetchMethod::Http);
    }

    #[test]
    fn rate_limited_retries_same_mode() {
        let mut ladder = LadderState::new(FetchMethod::Http, 2);
        let action = ladder.record(FetchOutcome::RateLimited);
        assert_eq!(action, LadderAction::WaitAndRetrySame);
        assert_eq!(ladder.current_mode(), FetchMethod::Http);
    }

    #[test]
    fn exhausting_max_retries_reports_fallback_exhausted() {
        let mut ladder = LadderState::new(FetchMethod::Http, 1);
        assert_eq!(ladder.record(FetchOutcome::ServerError), LadderAction::TryAlternateFetcher(FetchMethod::DynamicBrowser));
        assert_eq!(ladder.record(FetchOutcome::ServerError), LadderAction::FallbackExhausted);
    }

    #[test]
    fn exhausting_all_ladder_modes_reports_fallback_exhausted() {
        let mut ladder = LadderState::new(FetchMethod::DynamicBrowser, 10);
        assert_eq!(ladder.record(FetchOutcome::Blocked), LadderAction::TryAlternateFetcher(FetchMethod::Http));
        assert_eq!(ladder.record(FetchOutcome::Blocked), LadderAction::TryAlternateFetcher(FetchMethod::Crawlee));
        assert_eq!(ladder.record(FetchOutcome::Blocked), LadderAction::FallbackExhausted);
    }
}

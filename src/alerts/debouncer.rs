use tokio::time::{Duration, Instant};

/// Speech history used to suppress repeated warnings. Times are monotonic so a wall
/// clock step never stretches or skips the repeat interval.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlertState {
    /// Empty when nothing has been said since the last reset.
    pub last_message: String,
    pub last_spoken_at: Option<Instant>,
}

#[derive(Debug, Clone)]
pub struct AlertDebouncer {
    state: AlertState,
    repeat_interval: Duration,
}

impl AlertDebouncer {
    pub fn new(repeat_interval: Duration) -> Self {
        Self {
            state: AlertState::default(),
            repeat_interval,
        }
    }

    pub fn state(&self) -> &AlertState {
        &self.state
    }

    /// A changed warning is spoken at once; an unchanged one only after the repeat interval.
    pub fn should_speak(&self, candidate: &str, now: Instant) -> bool {
        if candidate.is_empty() {
            return false;
        }

        candidate != self.state.last_message || self.interval_elapsed(now)
    }

    pub fn record(&mut self, message: &str, now: Instant) {
        self.state = AlertState {
            last_message: message.to_string(),
            last_spoken_at: Some(now),
        };
    }

    /// Forget the last message so a new session starts without suppression.
    pub fn reset(&mut self) {
        self.state.last_message.clear();
    }

    fn interval_elapsed(&self, now: Instant) -> bool {
        self.state
            .last_spoken_at
            .map(|spoken_at| now.saturating_duration_since(spoken_at) > self.repeat_interval)
            .unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WARNING: &str = "Warning: person is near";

    fn debouncer() -> AlertDebouncer {
        AlertDebouncer::new(Duration::from_millis(7_000))
    }

    #[test]
    fn empty_candidate_is_never_spoken() {
        assert!(!debouncer().should_speak("", Instant::now()));
    }

    #[test]
    fn repeat_is_suppressed_until_interval_passes() {
        let start = Instant::now();
        let at = |ms: u64| start + Duration::from_millis(ms);
        let mut gate = debouncer();
        assert!(gate.should_speak(WARNING, at(0)));
        gate.record(WARNING, at(0));

        assert!(!gate.should_speak(WARNING, at(3_000)));
        assert!(!gate.should_speak(WARNING, at(3_000)));
        assert!(!gate.should_speak(WARNING, at(7_000)));
        assert!(gate.should_speak(WARNING, at(7_001)));
    }

    #[test]
    fn changed_warning_is_spoken_immediately() {
        let start = Instant::now();
        let mut gate = debouncer();
        gate.record(WARNING, start);
        assert!(gate.should_speak("Warning: chair is near", start + Duration::from_millis(10)));
    }

    #[test]
    fn earlier_instant_than_last_alert_counts_as_no_time_elapsed() {
        let start = Instant::now() + Duration::from_secs(60);
        let mut gate = debouncer();
        gate.record(WARNING, start);

        assert!(!gate.should_speak(WARNING, start - Duration::from_secs(30)));
        assert!(gate.should_speak(WARNING, start + Duration::from_millis(7_001)));
    }

    #[test]
    fn reset_clears_last_message() {
        let start = Instant::now();
        let mut gate = debouncer();
        gate.record(WARNING, start);
        gate.reset();

        assert!(gate.state().last_message.is_empty());
        assert!(gate.should_speak(WARNING, start + Duration::from_millis(100)));
    }
}

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

/// Minimum spacing between answered commands, per channel.
pub struct CooldownGate {
    cooldown: Duration,
    last_served: Mutex<HashMap<String, Option<Instant>>>,
}

impl CooldownGate {
    /// Registers every allow-listed channel as never served, so the first
    /// command after startup is answered.
    pub fn new<I, S>(channels: I, cooldown: Duration) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let seeded = channels.into_iter().map(|c| (c.into(), None)).collect();

        Self {
            cooldown,
            last_served: Mutex::new(seeded),
        }
    }

    /// True when at least the cooldown has passed since the channel was last
    /// served. Channels never served are always allowed.
    pub fn allow_at(&self, channel: &str, now: Instant) -> bool {
        let last_served = self.last_served.lock().unwrap_or_else(|e| e.into_inner());
        match last_served.get(channel).copied().flatten() {
            Some(last) => now.saturating_duration_since(last) >= self.cooldown,
            None => true,
        }
    }

    /// Stamps the channel as served at `now`. An older stamp never replaces a
    /// newer one, so a slow dispatch finishing late cannot reopen the window.
    pub fn record_at(&self, channel: &str, now: Instant) {
        let mut last_served = self.last_served.lock().unwrap_or_else(|e| e.into_inner());
        let slot = last_served.entry(channel.to_string()).or_insert(None);
        *slot = Some(slot.map_or(now, |last| last.max(now)));
    }

    #[cfg(test)]
    pub fn last_served(&self, channel: &str) -> Option<Instant> {
        self.last_served
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(channel)
            .copied()
            .flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COOLDOWN: Duration = Duration::from_secs(30);

    #[test]
    fn first_command_after_start_is_allowed() {
        let start = Instant::now();
        let gate = CooldownGate::new(["C1", "C2"], COOLDOWN);
        assert!(gate.allow_at("C1", start));
        assert!(gate.allow_at("C2", start + Duration::from_millis(1)));
        assert_eq!(gate.last_served("C1"), None);
    }

    #[test]
    fn first_command_is_allowed_even_when_cooldown_exceeds_clock_age() {
        let start = Instant::now();
        let cooldown = Duration::from_secs(100 * 365 * 24 * 3600);
        let gate = CooldownGate::new(["C1"], cooldown);

        assert!(gate.allow_at("C1", start));
        gate.record_at("C1", start);
        assert!(!gate.allow_at("C1", start + Duration::from_secs(3600)));
    }

    #[test]
    fn blocks_inside_window_and_reopens_at_boundary() {
        let start = Instant::now();
        let gate = CooldownGate::new(["C1"], COOLDOWN);
        let t0 = start + Duration::from_secs(100);
        gate.record_at("C1", t0);

        assert!(!gate.allow_at("C1", t0 + Duration::from_millis(1)));
        assert!(!gate.allow_at("C1", t0 + Duration::from_secs(15)));
        assert!(!gate.allow_at("C1", t0 + COOLDOWN - Duration::from_millis(1)));
        assert!(gate.allow_at("C1", t0 + COOLDOWN));
        assert!(gate.allow_at("C1", t0 + Duration::from_secs(3600)));
    }

    #[test]
    fn older_stamp_does_not_replace_newer_one() {
        let start = Instant::now();
        let gate = CooldownGate::new(["C1"], COOLDOWN);
        let t0 = start + Duration::from_secs(1);
        let later = t0 + COOLDOWN;

        gate.record_at("C1", later);
        gate.record_at("C1", t0);

        assert_eq!(gate.last_served("C1"), Some(later));
        assert!(!gate.allow_at("C1", later + Duration::from_millis(500)));
    }

    #[test]
    fn channels_are_independent() {
        let start = Instant::now();
        let gate = CooldownGate::new(["C1", "C2"], COOLDOWN);
        let t0 = start + Duration::from_secs(1);
        gate.record_at("C1", t0);

        assert!(!gate.allow_at("C1", t0 + Duration::from_secs(1)));
        assert!(gate.allow_at("C2", t0 + Duration::from_secs(1)));
    }

    #[test]
    fn checking_does_not_consume_the_window() {
        let start = Instant::now();
        let gate = CooldownGate::new(["C1"], COOLDOWN);

        for _ in 0..3 {
            assert!(gate.allow_at("C1", start + Duration::from_secs(1)));
        }
        assert_eq!(gate.last_served("C1"), None);
    }

    #[test]
    fn unknown_channel_is_allowed() {
        let gate = CooldownGate::new(Vec::<String>::new(), COOLDOWN);
        assert!(gate.allow_at("elsewhere", Instant::now()));
        assert_eq!(gate.last_served("elsewhere"), None);
    }
}

//! Static wellness content: motivational quotes and the guided breathing cycle.

use std::time::Duration;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Quote {
    pub id: u32,
    pub text: &'static str,
}

pub const QUOTES: [Quote; 8] = [
    Quote {
        id: 1,
        text: "Believe you can and you're halfway there.",
    },
    Quote {
        id: 2,
        text: "The secret of getting ahead is getting started.",
    },
    Quote {
        id: 3,
        text: "It’s not whether you get knocked down, it’s whether you get up.",
    },
    Quote {
        id: 4,
        text: "The only way to do great work is to love what you do.",
    },
    Quote {
        id: 5,
        text: "Success is not final, failure is not fatal: it is the courage to continue that counts.",
    },
    Quote {
        id: 6,
        text: "Don't watch the clock; do what it does. Keep going.",
    },
    Quote {
        id: 7,
        text: "The future belongs to those who believe in the beauty of their dreams.",
    },
    Quote {
        id: 8,
        text: "Well done is better than well said.",
    },
];

pub fn quote(id: u32) -> Option<&'static Quote> {
    QUOTES.iter().find(|q| q.id == id)
}

/// The quote after `id`, wrapping back to the first.
pub fn next_quote(id: u32) -> Option<&'static Quote> {
    let index = QUOTES.iter().position(|q| q.id == id)?;
    QUOTES.get((index + 1) % QUOTES.len())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreathingPhase {
    pub name: &'static str,
    pub duration: Duration,
}

pub const BREATHING_PHASES: [BreathingPhase; 3] = [
    BreathingPhase {
        name: "Breathe In",
        duration: Duration::from_millis(4000),
    },
    BreathingPhase {
        name: "Hold",
        duration: Duration::from_millis(4000),
    },
    BreathingPhase {
        name: "Breathe Out",
        duration: Duration::from_millis(6000),
    },
];

pub fn cycle_duration() -> Duration {
    BREATHING_PHASES.iter().map(|p| p.duration).sum()
}

/// Phase active `elapsed` after the exercise started; the cycle repeats.
pub fn phase_at(elapsed: Duration) -> &'static BreathingPhase {
    let cycle = cycle_duration().as_millis();
    let mut offset = elapsed.as_millis() % cycle;
    for phase in &BREATHING_PHASES {
        let length = phase.duration.as_millis();
        if offset < length {
            return phase;
        }
        offset -= length;
    }
    &BREATHING_PHASES[0]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_quote_ids_are_sequential() {
        for (index, quote) in QUOTES.iter().enumerate() {
            assert_eq!(quote.id as usize, index + 1);
        }
    }

    #[test]
    fn test_quote_lookup() {
        assert_eq!(quote(2).unwrap().text, "The secret of getting ahead is getting started.");
        assert!(quote(0).is_none());
        assert!(quote(9).is_none());
    }

    #[test]
    fn test_next_quote_wraps() {
        assert_eq!(next_quote(1).unwrap().id, 2);
        assert_eq!(next_quote(8).unwrap().id, 1);
        assert!(next_quote(42).is_none());
    }

    #[test]
    fn test_breathing_cycle() {
        assert_eq!(cycle_duration(), Duration::from_secs(14));
        assert_eq!(phase_at(Duration::ZERO).name, "Breathe In");
        assert_eq!(phase_at(Duration::from_millis(3999)).name, "Breathe In");
        assert_eq!(phase_at(Duration::from_millis(4000)).name, "Hold");
        assert_eq!(phase_at(Duration::from_millis(8000)).name, "Breathe Out");
        assert_eq!(phase_at(Duration::from_millis(13_999)).name, "Breathe Out");
        assert_eq!(phase_at(Duration::from_millis(14_000)).name, "Breathe In");
    }
}

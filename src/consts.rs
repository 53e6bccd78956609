//! Project-wide constants.

/// Simulated network delay for the local stub and the served API.
/// Long enough to watch optimism at work.
pub const DEFAULT_LATENCY_MS: u64 = 2000;

/// Odds that a simulated mutation fails.
pub const DEFAULT_FAILURE_RATE: f64 = 0.3;

/// Minimum accepted item text length, after trimming.
pub const MIN_TEXT_LEN: usize = 5;

/// Texts a seeded store starts with.
pub const SEED_TEXTS: &[&str] = &[
    "Water the plants",
    "Read the borrow checker chapter",
    "Reply to the landlord",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_rate_is_a_probability() {
        assert!((0.0..=1.0).contains(&DEFAULT_FAILURE_RATE));
    }

    #[test]
    fn seeds_pass_validation_length() {
        for text in SEED_TEXTS {
            assert!(text.trim().len() >= MIN_TEXT_LEN);
        }
    }
}

use std::time::Duration;

/// PARIS standard: 1 word = 50 dit-lengths, so dit_ms = 1200 / wpm
const WPM_MILLIS_NUMERATOR: u64 = 1200;

const DIT_UNITS: u64 = 1;
const DAH_UNITS: u64 = 3;
const CHAR_GAP_UNITS: u64 = 3;
const WORD_GAP_UNITS: u64 = 7;

/// Whole milliseconds for `units` dit-lengths at `wpm`, rounded down.
///
/// Callers are expected to validate `wpm` first; zero is treated as 1 so the
/// timer path can never divide by zero.
fn units_to_millis(wpm: u32, units: u64) -> u64 {
    (WPM_MILLIS_NUMERATOR * units) / u64::from(wpm.max(1))
}

/// Duration of a dit (1 unit)
pub fn dit_duration(wpm: u32) -> Duration {
    Duration::from_millis(units_to_millis(wpm, DIT_UNITS))
}

/// Duration of a dah (3 units)
pub fn dah_duration(wpm: u32) -> Duration {
    Duration::from_millis(units_to_millis(wpm, DAH_UNITS))
}

/// Silence after the last symbol before a character is complete (3 units)
pub fn char_gap(wpm: u32) -> Duration {
    Duration::from_millis(units_to_millis(wpm, CHAR_GAP_UNITS))
}

/// Silence after the last symbol before a word separator is due (7 units)
pub fn word_gap(wpm: u32) -> Duration {
    Duration::from_millis(units_to_millis(wpm, WORD_GAP_UNITS))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dit_duration_at_common_speeds() {
        assert_eq!(dit_duration(10).as_millis(), 120);
        assert_eq!(dit_duration(12).as_millis(), 100);
        assert_eq!(dit_duration(20).as_millis(), 60);
        assert_eq!(dit_duration(25).as_millis(), 48);
    }

    #[test]
    fn test_gaps_at_ten_wpm() {
        assert_eq!(dah_duration(10).as_millis(), 360);
        assert_eq!(char_gap(10).as_millis(), 360);
        assert_eq!(word_gap(10).as_millis(), 840);
    }

    #[test]
    fn test_durations_are_floored() {
        // 1200 / 7 = 171.43, 3600 / 7 = 514.29, 8400 / 7 = 1200
        assert_eq!(dit_duration(7).as_millis(), 171);
        assert_eq!(dah_duration(7).as_millis(), 514);
        assert_eq!(word_gap(7).as_millis(), 1200);
    }

    #[test]
    fn test_ordering_over_supported_range() {
        for wpm in 1..=60 {
            let dit = dit_duration(wpm);
            let dah = dah_duration(wpm);
            assert!(dit > Duration::ZERO, "wpm {wpm}");
            assert!(word_gap(wpm) > char_gap(wpm), "wpm {wpm}");
            assert!(char_gap(wpm) >= dah, "wpm {wpm}");
            assert!(dah > dit, "wpm {wpm}");
        }
    }

    #[test]
    fn test_dah_is_3x_dit() {
        for wpm in 1..=60u32 {
            let dit = dit_duration(wpm).as_millis();
            let dah = dah_duration(wpm).as_millis();
            if 1200 % wpm == 0 {
                assert_eq!(dah, dit * 3, "wpm {wpm}");
            } else {
                // Flooring happens after the multiply, so dah can gain up to 2ms
                assert!(dah >= dit * 3 && dah < dit * 3 + 3, "wpm {wpm}");
            }
        }
    }

    #[test]
    fn test_zero_wpm_does_not_panic() {
        assert_eq!(dit_duration(0), dit_duration(1));
    }
}

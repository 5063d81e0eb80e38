use crate::domain::ScoreLabel;

const RAGE_MARKERS: &[&str] = &["rage", "ragebait", "rage bait", "rage-bait"];

/// Maps a free-text model reply onto the closed label set.
///
/// Rage markers are checked before engage markers. Anything unrecognised
/// is `Maybe`.
pub fn normalize(raw: &str) -> ScoreLabel {
    let text = raw.trim().to_lowercase();
    if text.is_empty() {
        return ScoreLabel::Maybe;
    }

    if text == "red" || RAGE_MARKERS.iter().any(|marker| text.contains(marker)) {
        return ScoreLabel::Rage;
    }

    if text == "green" || text.contains("engage") {
        return ScoreLabel::Engage;
    }

    // "maybe" / "yellow" and every unrecognised reply land on the same label.
    ScoreLabel::Maybe
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rage_markers_are_detected_in_any_case() {
        for raw in [
            "rage",
            "RAGEBAIT",
            " RAGEBAIT ",
            "Rage Bait",
            "this is rage-bait.",
            "red",
            "RED",
            "The answer: ragebait",
        ] {
            assert_eq!(normalize(raw), ScoreLabel::Rage, "input {raw:?}");
        }
    }

    #[test]
    fn engage_markers_are_detected() {
        for raw in ["ENGAGE", "engage.", "Answer: Engage", "green", " Green "] {
            assert_eq!(normalize(raw), ScoreLabel::Engage, "input {raw:?}");
        }
    }

    #[test]
    fn rage_wins_over_engage() {
        assert_eq!(normalize("engage or ragebait"), ScoreLabel::Rage);
    }

    #[test]
    fn everything_else_is_maybe() {
        for raw in ["", "   ", "MAYBE", "yellow", "no idea", "redacted", "greenish", "🤷"] {
            assert_eq!(normalize(raw), ScoreLabel::Maybe, "input {raw:?}");
        }
    }

    #[test]
    fn normalization_is_deterministic() {
        let input = "  Possibly RAGE  ";
        assert_eq!(normalize(input), normalize(input));
    }
}

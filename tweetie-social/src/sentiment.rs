//! Compound sentiment polarity for post text.
//!
//! [`VaderScorer`] wraps the VADER lexicon analyzer. Building the analyzer is
//! the expensive part, so callers build one scorer per fetch and reuse it
//! for every post.
use vader_sentiment::SentimentIntensityAnalyzer;

/// Maps text to a single polarity scalar in `[-1.0, 1.0]`.
///
/// Implementations must be pure: scoring the same text twice yields the same
/// value. Plain closures implement the trait, which keeps fetch tests cheap.
///
/// ```
/// use tweetie_social::sentiment::SentimentScorer;
///
/// let always_positive = |_: &str| 0.5;
/// assert_eq!(always_positive.compound("anything"), 0.5);
/// ```
pub trait SentimentScorer {
    fn compound(&self, text: &str) -> f64;
}

impl<F> SentimentScorer for F
where
    F: Fn(&str) -> f64,
{
    fn compound(&self, text: &str) -> f64 {
        clamp_score(self(text))
    }
}

pub struct VaderScorer {
    analyzer: SentimentIntensityAnalyzer<'static>,
}

impl VaderScorer {
    pub fn new() -> Self {
        Self {
            analyzer: SentimentIntensityAnalyzer::new(),
        }
    }
}

impl Default for VaderScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl SentimentScorer for VaderScorer {
    fn compound(&self, text: &str) -> f64 {
        if text.trim().is_empty() {
            return 0.0;
        }
        let scores = self.analyzer.polarity_scores(text);
        clamp_score(scores.get("compound").copied().unwrap_or(0.0))
    }
}

fn clamp_score(raw: f64) -> f64 {
    if raw.is_finite() {
        raw.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLES: &[&str] = &[
        "VADER is smart, handsome, and funny.",
        "This parser generator is AWESOME!!! :)",
        "The build is broken again and I hate it.",
        "Worst. Release. Ever.",
        "Released v4.13 today, see https://github.com/antlr/antlr4 #antlr",
        "@jack ok",
        "",
    ];

    #[test]
    fn polarity_follows_the_text() {
        let scorer = VaderScorer::new();
        assert!(scorer.compound("VADER is smart, handsome, and funny.") > 0.5);
        assert!(scorer.compound("The build is broken again and I hate it.") < 0.0);
    }

    #[test]
    fn scores_are_bounded_and_deterministic() {
        let scorer = VaderScorer::new();
        for text in SAMPLES {
            let first = scorer.compound(text);
            let second = scorer.compound(text);
            assert!((-1.0..=1.0).contains(&first), "{text:?} scored {first}");
            assert_eq!(first.to_bits(), second.to_bits(), "{text:?} drifted");
        }
    }

    #[test]
    fn separate_scorers_agree() {
        let a = VaderScorer::new();
        let b = VaderScorer::default();
        for text in SAMPLES {
            assert_eq!(a.compound(text), b.compound(text));
        }
    }

    #[test]
    fn blank_text_is_neutral() {
        assert_eq!(VaderScorer::new().compound("   "), 0.0);
    }

    #[test]
    fn closure_scores_are_clamped() {
        let wild = |_: &str| 7.5;
        let broken = |_: &str| f64::NAN;
        assert_eq!(wild.compound("x"), 1.0);
        assert_eq!(broken.compound("x"), 0.0);
    }
}

//! Weighted multi-field similarity between a local representative and a
//! remote candidate, and the accept/reject decision.

use strsim::normalized_levenshtein;
use tracing::warn;

use crate::catalog::Representative;
use crate::sources::Candidate;

/// Scores above this accept the candidate; the comparison is strict.
pub const MATCH_THRESHOLD: f64 = 40.0;

/// The four scored roles, each with its own comparison strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Title,
    Container,
    Year,
    Author,
}

impl FieldKind {
    pub const ALL: [FieldKind; 4] = [
        FieldKind::Title,
        FieldKind::Container,
        FieldKind::Year,
        FieldKind::Author,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FieldKind::Title => "title",
            FieldKind::Container => "container",
            FieldKind::Year => "year",
            FieldKind::Author => "author",
        }
    }
}

/// Product-combined similarity on a scale where a perfect four-field match
/// lands above 100, plus the kinds excluded because one side had no value.
#[derive(Debug, Clone)]
pub struct Score {
    pub value: f64,
    pub missing: Vec<FieldKind>,
}

/// Multiplies the contributions of every field present on both sides, then
/// scales by 100. Absent fields are multiplicative identities, not
/// penalties, so a three-field match can outscore a four-field one with a
/// single weak field.
pub fn score(rep: &Representative, candidate: &Candidate) -> Score {
    let mut value = 1.0;
    let mut missing = Vec::new();

    for kind in FieldKind::ALL {
        match contribution(kind, rep, candidate) {
            Some(c) => value *= c,
            None => missing.push(kind),
        }
    }

    if !missing.is_empty() {
        let fields: Vec<&str> = missing.iter().map(|k| k.name()).collect();
        warn!(
            title = %truncated(&rep.title),
            fields = fields.join(", "),
            "candidate fields missing, scoring on the rest"
        );
    }

    Score {
        value: value * 100.0,
        missing,
    }
}

pub fn decide(score: &Score) -> bool {
    score.value > MATCH_THRESHOLD
}

fn contribution(kind: FieldKind, rep: &Representative, candidate: &Candidate) -> Option<f64> {
    match kind {
        FieldKind::Title => candidate
            .title
            .as_deref()
            .map(|theirs| text_similarity(&rep.title, theirs)),
        FieldKind::Container => match (rep.container.as_deref(), candidate.container.as_deref()) {
            (Some(ours), Some(theirs)) => Some(text_similarity(ours, theirs)),
            _ => None,
        },
        FieldKind::Year => match (rep.year.as_deref(), candidate.year) {
            (Some(ours), Some(theirs)) => Some(year_weight(ours, theirs)),
            _ => None,
        },
        FieldKind::Author => match (rep.author.as_deref(), candidate.author_family.as_deref()) {
            (Some(ours), Some(theirs)) => Some(author_weight(ours, theirs)),
            _ => None,
        },
    }
}

/// Normalized Levenshtein similarity after case folding: 1.0 identical,
/// 0.0 maximally dissimilar.
fn text_similarity(ours: &str, theirs: &str) -> f64 {
    normalized_levenshtein(&ours.to_lowercase(), &theirs.to_lowercase())
}

/// Soft binary weight: equal years bias the product up, unequal ones down,
/// neither gates it.
fn year_weight(ours: &str, theirs: i64) -> f64 {
    let equal = match ours.trim().parse::<i64>() {
        Ok(n) => n == theirs,
        Err(_) => ours.trim() == theirs.to_string(),
    };
    if equal { 1.5 } else { 0.5 }
}

fn author_weight(ours: &str, family: &str) -> f64 {
    if ours.to_lowercase().contains(&family.to_lowercase()) {
        1.5
    } else {
        0.5
    }
}

fn truncated(title: &str) -> String {
    title.chars().take(49).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rep(title: &str, container: Option<&str>, author: Option<&str>, year: Option<&str>) -> Representative {
        Representative {
            title: title.to_string(),
            container: container.map(str::to_string),
            author: author.map(str::to_string),
            year: year.map(str::to_string),
        }
    }

    fn candidate(
        title: Option<&str>,
        container: Option<&str>,
        author_family: Option<&str>,
        year: Option<i64>,
    ) -> Candidate {
        Candidate {
            title: title.map(str::to_string),
            container: container.map(str::to_string),
            author_family: author_family.map(str::to_string),
            year,
            doi: None,
            abstract_text: None,
        }
    }

    #[test]
    fn worked_example_scores_225() {
        let rep = rep("Deep Learning", Some("Nature"), Some("John Smith"), Some("2016"));
        let cand = candidate(Some("Deep Learning"), None, Some("Smith"), Some(2016));

        let score = score(&rep, &cand);
        assert!((score.value - 225.0).abs() < 1e-9);
        assert_eq!(score.missing, vec![FieldKind::Container]);
    }

    #[test]
    fn all_fields_null_scores_exactly_100() {
        let rep = rep("Anything", Some("Venue"), Some("Author"), Some("2000"));
        let cand = candidate(None, None, None, None);

        let score = score(&rep, &cand);
        assert_eq!(score.value, 100.0);
        assert_eq!(score.missing.len(), 4);
    }

    #[test]
    fn case_folding_invariance() {
        let lower = rep("deep learning", Some("nature"), Some("john smith"), Some("2016"));
        let upper = rep("DEEP LEARNING", Some("NATURE"), Some("JOHN SMITH"), Some("2016"));
        let cand = candidate(Some("Deep Learning"), Some("Nature"), Some("SMITH"), Some(2016));

        assert_eq!(score(&lower, &cand).value, score(&upper, &cand).value);
    }

    #[test]
    fn dissimilar_title_gates_the_product() {
        let rep = rep("Deep Learning", Some("Nature"), Some("John Smith"), Some("2016"));
        let cand = candidate(
            Some("Qualitative Studies in Medieval Archaeology"),
            Some("Nature"),
            Some("Smith"),
            Some(2016),
        );

        let s = score(&rep, &cand);
        assert!(!decide(&s), "near-zero title similarity must collapse the score");
    }

    #[test]
    fn title_similarity_is_monotonic_in_shared_characters() {
        let local = rep("deep learning", None, None, None);
        let close = score(&local, &candidate(Some("deep learnXng"), None, None, None));
        let closer = score(&local, &candidate(Some("deep learning"), None, None, None));
        assert!(closer.value >= close.value);
    }

    #[test]
    fn year_weight_is_soft_binary() {
        let local = rep("T", None, None, Some(" 2016 "));
        let equal = score(&local, &candidate(Some("T"), None, None, Some(2016)));
        let unequal = score(&local, &candidate(Some("T"), None, None, Some(2017)));
        assert!((equal.value - 150.0).abs() < 1e-9);
        assert!((unequal.value - 50.0).abs() < 1e-9);
    }

    #[test]
    fn author_substring_match_is_case_insensitive() {
        let local = rep("T", None, Some("John SMITH"), None);
        let hit = score(&local, &candidate(Some("T"), None, Some("smith"), None));
        let miss = score(&local, &candidate(Some("T"), None, Some("Jones"), None));
        assert!((hit.value - 150.0).abs() < 1e-9);
        assert!((miss.value - 50.0).abs() < 1e-9);
    }

    #[test]
    fn threshold_is_strictly_greater_than() {
        let exactly = Score { value: 40.0, missing: Vec::new() };
        let barely = Score { value: 40.0001, missing: Vec::new() };
        assert!(!decide(&exactly));
        assert!(decide(&barely));
    }

    #[test]
    fn unresolved_local_column_excludes_the_field() {
        let local = rep("T", None, None, None);
        let cand = candidate(Some("T"), Some("Nature"), Some("Smith"), Some(2016));

        let s = score(&local, &cand);
        assert_eq!(s.value, 100.0);
        assert_eq!(
            s.missing,
            vec![FieldKind::Container, FieldKind::Year, FieldKind::Author]
        );
    }
}

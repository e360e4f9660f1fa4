use crate::azure::types::Reviewer;

use super::locale::{collate, Locale};

/// Team aliases that show up as reviewers on every PR and carry no signal.
pub const DEFAULT_EXCLUDED_REVIEWERS: [&str; 2] = [
    "[APPV - Fb-App-Vivo]\\Revisores N2",
    "[APPV - Fb-App-Vivo]/Revisores N2",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteTier {
    Waiting,
    Approved,
    Rejected,
}

impl VoteTier {
    pub fn icon(&self) -> &'static str {
        match self {
            VoteTier::Waiting => "⏳",
            VoteTier::Approved => "✔",
            VoteTier::Rejected => "✖",
        }
    }

    pub fn label(&self, locale: Locale) -> &'static str {
        match (locale, self) {
            (Locale::PtBr, VoteTier::Waiting) => "Aguardando revisão",
            (Locale::PtBr, VoteTier::Approved) => "Aprovado",
            (Locale::PtBr, VoteTier::Rejected) => "Rejeitado",
            (Locale::En, VoteTier::Waiting) => "awaiting review",
            (Locale::En, VoteTier::Approved) => "approved",
            (Locale::En, VoteTier::Rejected) => "rejected",
        }
    }
}

/// Map an Azure DevOps vote (10, 5, 0, -5, -10, or absent) to a tier.
pub fn classify_vote(vote: Option<i32>) -> VoteTier {
    match vote {
        None | Some(0) => VoteTier::Waiting,
        Some(v) if v > 0 => VoteTier::Approved,
        Some(_) => VoteTier::Rejected,
    }
}

/// Drop reviewers whose display name exactly matches an excluded name.
pub fn filter_reviewers<'a, S: AsRef<str>>(
    reviewers: &'a [Reviewer],
    excluded: &[S],
) -> Vec<&'a Reviewer> {
    reviewers
        .iter()
        .filter(|r| !excluded.iter().any(|name| name.as_ref() == r.display_name))
        .collect()
}

/// Voted reviewers first, then by name (case- and accent-insensitive).
/// Stable, so equal names keep their API order.
pub fn sort_reviewers(reviewers: &mut [&Reviewer]) {
    reviewers.sort_by(|a, b| {
        b.has_voted()
            .cmp(&a.has_voted())
            .then_with(|| collate(&a.display_name, &b.display_name))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::cmp::Ordering;

    fn reviewer(name: &str, vote: Option<i32>) -> Reviewer {
        Reviewer {
            id: String::new(),
            display_name: name.to_string(),
            unique_name: None,
            vote,
            is_required: false,
        }
    }

    #[test]
    fn test_classify_vote() {
        assert_eq!(classify_vote(None), VoteTier::Waiting);
        assert_eq!(classify_vote(Some(0)), VoteTier::Waiting);
        assert_eq!(classify_vote(Some(10)), VoteTier::Approved);
        assert_eq!(classify_vote(Some(5)), VoteTier::Approved);
        assert_eq!(classify_vote(Some(-5)), VoteTier::Rejected);
        assert_eq!(classify_vote(Some(-10)), VoteTier::Rejected);
    }

    #[test]
    fn test_vote_labels() {
        assert_eq!(VoteTier::Waiting.label(Locale::En), "awaiting review");
        assert_eq!(VoteTier::Waiting.label(Locale::PtBr), "Aguardando revisão");
        assert_eq!(VoteTier::Rejected.icon(), "✖");
    }

    #[test]
    fn test_filter_removes_both_team_aliases() {
        let reviewers = vec![
            reviewer("[APPV - Fb-App-Vivo]\\Revisores N2", None),
            reviewer("Ana", Some(10)),
            reviewer("[APPV - Fb-App-Vivo]/Revisores N2", Some(10)),
        ];
        let kept = filter_reviewers(&reviewers, &DEFAULT_EXCLUDED_REVIEWERS);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].display_name, "Ana");
    }

    #[test]
    fn test_filter_matches_exactly() {
        let reviewers = vec![reviewer("[appv - fb-app-vivo]/revisores n2", None)];
        let kept = filter_reviewers(&reviewers, &DEFAULT_EXCLUDED_REVIEWERS);
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn test_sort_voted_first_then_by_name() {
        let reviewers = vec![
            reviewer("carla", None),
            reviewer("Bruno", Some(-10)),
            reviewer("Álvaro", Some(0)),
            reviewer("ana", Some(10)),
        ];
        let mut refs: Vec<&Reviewer> = reviewers.iter().collect();
        sort_reviewers(&mut refs);
        let names: Vec<&str> = refs.iter().map(|r| r.display_name.as_str()).collect();
        assert_eq!(names, vec!["ana", "Bruno", "Álvaro", "carla"]);
    }

    fn arb_reviewer() -> impl Strategy<Value = Reviewer> {
        (
            prop_oneof![
                Just("Ana".to_string()),
                Just("ana".to_string()),
                Just("Bruno".to_string()),
                Just("Çélia".to_string()),
                Just(DEFAULT_EXCLUDED_REVIEWERS[0].to_string()),
                Just(DEFAULT_EXCLUDED_REVIEWERS[1].to_string()),
                "[a-zA-Z ]{1,8}",
            ],
            proptest::option::of(-10i32..=10),
        )
            .prop_map(|(name, vote)| reviewer(&name, vote))
    }

    proptest! {
        #[test]
        fn prop_classify_vote_sign(v in any::<i32>()) {
            let tier = classify_vote(Some(v));
            match v.cmp(&0) {
                Ordering::Greater => prop_assert_eq!(tier, VoteTier::Approved),
                Ordering::Less => prop_assert_eq!(tier, VoteTier::Rejected),
                Ordering::Equal => prop_assert_eq!(tier, VoteTier::Waiting),
            }
        }

        #[test]
        fn prop_filter_then_sort_orders_reviewers(reviewers in prop::collection::vec(arb_reviewer(), 0..12)) {
            let mut kept = filter_reviewers(&reviewers, &DEFAULT_EXCLUDED_REVIEWERS);
            sort_reviewers(&mut kept);

            for r in &kept {
                prop_assert!(!DEFAULT_EXCLUDED_REVIEWERS.contains(&r.display_name.as_str()));
            }
            let first_unvoted = kept.iter().position(|r| !r.has_voted()).unwrap_or(kept.len());
            prop_assert!(kept[first_unvoted..].iter().all(|r| !r.has_voted()));
            for pair in kept.windows(2) {
                if pair[0].has_voted() == pair[1].has_voted() {
                    prop_assert_ne!(collate(&pair[0].display_name, &pair[1].display_name), Ordering::Greater);
                }
            }
        }
    }
}

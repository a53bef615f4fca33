//! Deterministic zone choice used whenever the reasoning service cannot be.

use putaway_core::ZoneId;
use putaway_warehouse::{ConstraintSet, Specialization, ZoneCatalog};

/// Which preference picked the fallback zone, in the order they are tried.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FallbackRule {
    /// A candidate laid out for the item category's specialization.
    Specialization(Specialization),
    /// The candidate preferred by the most advisory constraints.
    AdvisoryScore(usize),
    FirstCandidate,
}

impl FallbackRule {
    pub fn confidence(self) -> f64 {
        match self {
            FallbackRule::Specialization(_) => 0.8,
            FallbackRule::AdvisoryScore(_) => 0.6,
            FallbackRule::FirstCandidate => 0.5,
        }
    }

    pub fn describe(self) -> String {
        match self {
            FallbackRule::Specialization(s) => format!("matches the category's {s:?} specialization"),
            FallbackRule::AdvisoryScore(1) => "satisfies the advisory constraint".to_string(),
            FallbackRule::AdvisoryScore(n) => format!("satisfies the most advisory constraints ({n})"),
            FallbackRule::FirstCandidate => "first eligible zone in registration order".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackChoice {
    pub zone: ZoneId,
    pub rule: FallbackRule,
}

/// Pick a zone from `candidates` (registration order, non-empty).
///
/// Returns `None` only for an empty candidate list.
pub fn choose(
    catalog: &ZoneCatalog,
    candidates: &[ZoneId],
    specialization: Option<Specialization>,
    constraints: &ConstraintSet,
) -> Option<FallbackChoice> {
    if let Some(wanted) = specialization {
        let matching = candidates
            .iter()
            .find(|id| catalog.get(id).is_some_and(|z| z.specialization == wanted));
        if let Some(zone) = matching {
            return Some(FallbackChoice {
                zone: zone.clone(),
                rule: FallbackRule::Specialization(wanted),
            });
        }
    }

    // Strictly greater keeps the earliest zone on ties.
    let mut best: Option<(&ZoneId, usize)> = None;
    for id in candidates {
        let score = constraints.advisory_score(id);
        if score > best.map_or(0, |(_, s)| s) {
            best = Some((id, score));
        }
    }
    if let Some((zone, score)) = best {
        return Some(FallbackChoice {
            zone: zone.clone(),
            rule: FallbackRule::AdvisoryScore(score),
        });
    }

    candidates.first().map(|zone| FallbackChoice {
        zone: zone.clone(),
        rule: FallbackRule::FirstCandidate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use putaway_warehouse::{
        Category, CategoryRuleResolver, ItemSubmission, SafetyConstraintEvaluator, TurnoverClass, ZoneTable,
    };

    fn ids(ids: &[&str]) -> Vec<ZoneId> {
        ids.iter().map(|i| ZoneId::new(*i).unwrap()).collect()
    }

    fn constraints_for(catalog: &ZoneCatalog, submission: ItemSubmission) -> ConstraintSet {
        let item = CategoryRuleResolver::default()
            .resolve(&submission.validate().unwrap())
            .item;
        SafetyConstraintEvaluator::new(catalog).evaluate(&item)
    }

    #[test]
    fn specialization_wins_when_available() {
        let catalog = ZoneCatalog::new(ZoneTable::standard()).unwrap();
        let constraints = constraints_for(&catalog, ItemSubmission::new("M", "Press", Category::Machinery, 100.0));

        let choice = choose(&catalog, &ids(&["A", "E"]), Some(Specialization::Heavy), &constraints).unwrap();

        assert_eq!(choice.zone.as_str(), "E");
        assert_eq!(choice.rule, FallbackRule::Specialization(Specialization::Heavy));
    }

    #[test]
    fn advisory_score_used_without_specialization_match() {
        let catalog = ZoneCatalog::new(ZoneTable::standard()).unwrap();
        let constraints = constraints_for(
            &catalog,
            ItemSubmission::new("E1", "Phone", Category::Electronics, 2.0).with_turnover(TurnoverClass::High),
        );

        let choice = choose(&catalog, &ids(&["A", "B", "D", "E"]), None, &constraints).unwrap();

        assert_eq!(choice.zone.as_str(), "D");
        assert_eq!(choice.rule, FallbackRule::AdvisoryScore(1));
    }

    #[test]
    fn equal_advisory_scores_go_to_earliest_registered_zone() {
        let catalog = ZoneCatalog::new(ZoneTable::standard()).unwrap();
        let constraints = constraints_for(
            &catalog,
            ItemSubmission::new("E2", "Power Bank", Category::Electronics, 10.0)
                .with_flammable(true)
                .with_turnover(TurnoverClass::High),
        );
        let c = ZoneId::new("C").unwrap();
        let d = ZoneId::new("D").unwrap();
        assert_eq!(constraints.advisory_score(&c), 1);
        assert_eq!(constraints.advisory_score(&d), 1);

        let choice = choose(&catalog, &ids(&["A", "C", "D", "E"]), None, &constraints).unwrap();

        assert_eq!(choice.zone, c);
        assert_eq!(choice.rule, FallbackRule::AdvisoryScore(1));
    }

    #[test]
    fn first_candidate_is_last_resort() {
        let catalog = ZoneCatalog::new(ZoneTable::standard()).unwrap();
        let constraints = constraints_for(&catalog, ItemSubmission::new("T", "Shirts", Category::Textiles, 30.0));

        let choice = choose(&catalog, &ids(&["B", "E"]), Some(Specialization::General), &constraints).unwrap();

        assert_eq!(choice.zone.as_str(), "B");
        assert_eq!(choice.rule, FallbackRule::FirstCandidate);
        assert!(choose(&catalog, &[], None, &constraints).is_none());
    }
}

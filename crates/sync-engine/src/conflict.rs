// crates/sync-engine/src/conflict.rs
//! Conflict resolution

use crate::diff::DiffPlan;
use crate::types::SyncAction;
use log::{info, warn};
use sheetbridge_core::{ConflictPolicy, Direction, SyncKey};

/// Conflicts after the run policy has been applied
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Conflicts turned into a one-sided update, in key order
    pub resolved: Vec<(SyncKey, SyncAction)>,
    /// Conflicts reported without writing, in key order
    pub unresolved: Vec<SyncKey>,
}

/// Applies the conflict policy to the conflicted keys of a plan
#[derive(Debug, Clone, Copy)]
pub struct ConflictResolver {
    policy: ConflictPolicy,
    direction: Direction,
}

impl ConflictResolver {
    /// Creates a resolver for one run
    pub fn new(policy: ConflictPolicy, direction: Direction) -> Self {
        Self { policy, direction }
    }

    /// Resolves one conflicted key; `None` leaves it unresolved
    ///
    /// A winning side is only honored when the run may write the other store.
    pub fn resolve_one(&self) -> Option<SyncAction> {
        match self.policy {
            ConflictPolicy::Fail => None,
            ConflictPolicy::AWins if self.direction.writes_b() => Some(SyncAction::UpdateBFromA),
            ConflictPolicy::BWins if self.direction.writes_a() => Some(SyncAction::UpdateAFromB),
            ConflictPolicy::AWins | ConflictPolicy::BWins => None,
        }
    }

    /// Resolves every conflict in the plan; other keys are not touched
    pub fn resolve(&self, plan: &DiffPlan) -> Resolution {
        let mut resolution = Resolution::default();

        for key in plan.keys_for(SyncAction::Conflict) {
            match self.resolve_one() {
                Some(action) => {
                    info!("{}: conflict resolved by {} as {}", key, self.policy, action);
                    resolution.resolved.push((key.clone(), action));
                }
                None => {
                    warn!(
                        "{}: unresolved conflict (policy {}, direction {})",
                        key, self.policy, self.direction
                    );
                    resolution.unresolved.push(key.clone());
                }
            }
        }

        resolution
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fail_never_resolves() {
        for direction in [Direction::Both, Direction::ToA, Direction::ToB] {
            let resolver = ConflictResolver::new(ConflictPolicy::Fail, direction);
            assert_eq!(resolver.resolve_one(), None);
        }
    }

    #[test]
    fn test_a_wins_writes_b() {
        let resolver = ConflictResolver::new(ConflictPolicy::AWins, Direction::Both);
        assert_eq!(resolver.resolve_one(), Some(SyncAction::UpdateBFromA));

        let resolver = ConflictResolver::new(ConflictPolicy::AWins, Direction::ToB);
        assert_eq!(resolver.resolve_one(), Some(SyncAction::UpdateBFromA));
    }

    #[test]
    fn test_b_wins_writes_a() {
        let resolver = ConflictResolver::new(ConflictPolicy::BWins, Direction::ToA);
        assert_eq!(resolver.resolve_one(), Some(SyncAction::UpdateAFromB));
    }

    #[test]
    fn test_excluded_target_stays_unresolved() {
        let resolver = ConflictResolver::new(ConflictPolicy::AWins, Direction::ToA);
        assert_eq!(resolver.resolve_one(), None);

        let resolver = ConflictResolver::new(ConflictPolicy::BWins, Direction::ToB);
        assert_eq!(resolver.resolve_one(), None);
    }

    #[test]
    fn test_resolve_only_touches_conflicts() {
        let key = |k: &str| SyncKey::parse(k).unwrap();
        let plan: DiffPlan = vec![
            (key("K3"), SyncAction::Conflict),
            (key("K1"), SyncAction::Conflict),
            (key("K2"), SyncAction::UpdateBFromA),
        ]
        .into_iter()
        .collect();

        let resolution = ConflictResolver::new(ConflictPolicy::BWins, Direction::Both).resolve(&plan);
        assert_eq!(
            resolution.resolved,
            vec![
                (key("K1"), SyncAction::UpdateAFromB),
                (key("K3"), SyncAction::UpdateAFromB)
            ]
        );
        assert!(resolution.unresolved.is_empty());
        assert_eq!(plan.action(&key("K2")), Some(SyncAction::UpdateBFromA));

        let resolution = ConflictResolver::new(ConflictPolicy::Fail, Direction::Both).resolve(&plan);
        assert_eq!(resolution.unresolved, vec![key("K1"), key("K3")]);
    }

    #[test]
    fn test_resolve_empty_plan() {
        let resolver = ConflictResolver::new(ConflictPolicy::Fail, Direction::Both);
        assert_eq!(resolver.resolve(&DiffPlan::default()), Resolution::default());
    }
}

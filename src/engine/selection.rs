//! Random picks made during a session.
//!
//! All helpers take the caller's `fastrand::Rng` so tests can seed it.

use fastrand::Rng;

use crate::types::{ModelChoice, Reaction};

/// Draw up to `n` items without replacement by repeatedly removing a random
/// index from the working list. Fewer than `n` items → all of them.
pub fn sample_without_replacement<T>(rng: &mut Rng, mut items: Vec<T>, n: usize) -> Vec<T> {
    let mut picked = Vec::with_capacity(n.min(items.len()));
    while picked.len() < n && !items.is_empty() {
        let idx = rng.usize(..items.len());
        picked.push(items.swap_remove(idx));
    }
    picked
}

pub fn pick_reaction(rng: &mut Rng, reactions: &[Reaction]) -> Option<Reaction> {
    if reactions.is_empty() {
        return None;
    }
    Some(reactions[rng.usize(..reactions.len())])
}

pub fn pick_index(rng: &mut Rng, len: usize) -> Option<usize> {
    (len > 0).then(|| rng.usize(..len))
}

/// Pick a model uniformly among those whose id differs from `current`.
pub fn pick_replacement_model<'a>(
    rng: &mut Rng,
    models: &'a [ModelChoice],
    current: &str,
) -> Option<&'a ModelChoice> {
    let candidates: Vec<&ModelChoice> = models.iter().filter(|m| m.id != current).collect();
    if candidates.is_empty() {
        return None;
    }
    Some(candidates[rng.usize(..candidates.len())])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MODELS;
    use std::collections::HashSet;

    #[test]
    fn test_sample_five_distinct() {
        for seed in 0..50 {
            let mut rng = Rng::with_seed(seed);
            let source: Vec<u32> = (0..12).collect();
            let picked = sample_without_replacement(&mut rng, source.clone(), 5);
            assert_eq!(picked.len(), 5);
            let unique: HashSet<_> = picked.iter().collect();
            assert_eq!(unique.len(), 5);
            assert!(picked.iter().all(|p| source.contains(p)));
        }
    }

    #[test]
    fn test_sample_fewer_than_requested_returns_all() {
        let mut rng = Rng::with_seed(7);
        let mut picked = sample_without_replacement(&mut rng, vec!["a", "b", "c"], 5);
        picked.sort();
        assert_eq!(picked, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_sample_exactly_n() {
        let mut rng = Rng::with_seed(3);
        let mut picked = sample_without_replacement(&mut rng, vec![1, 2, 3, 4, 5], 5);
        picked.sort();
        assert_eq!(picked, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_sample_empty() {
        let mut rng = Rng::with_seed(1);
        assert!(sample_without_replacement::<u8>(&mut rng, vec![], 5).is_empty());
    }

    #[test]
    fn test_replacement_never_current() {
        for seed in 0..200 {
            let mut rng = Rng::with_seed(seed);
            let current = MODELS[(seed as usize) % MODELS.len()].id;
            let next = pick_replacement_model(&mut rng, MODELS, current).unwrap();
            assert_ne!(next.id, current);
        }
    }

    #[test]
    fn test_replacement_with_unknown_current_uses_full_list() {
        let mut rng = Rng::with_seed(11);
        let seen: HashSet<_> = (0..500)
            .filter_map(|_| pick_replacement_model(&mut rng, MODELS, "legacy/model"))
            .map(|m| m.id)
            .collect();
        assert_eq!(seen.len(), MODELS.len());
    }

    #[test]
    fn test_no_replacement_when_only_current() {
        let mut rng = Rng::with_seed(5);
        let only = [MODELS[3]];
        assert!(pick_replacement_model(&mut rng, &only, MODELS[3].id).is_none());
        assert!(pick_replacement_model(&mut rng, &[], "any").is_none());
    }

    #[test]
    fn test_pick_reaction_covers_set() {
        let mut rng = Rng::with_seed(2);
        let seen: HashSet<_> = (0..200)
            .filter_map(|_| pick_reaction(&mut rng, &Reaction::ALL))
            .collect();
        assert_eq!(seen.len(), Reaction::ALL.len());
        assert!(pick_reaction(&mut rng, &[]).is_none());
    }

    #[test]
    fn test_pick_index() {
        let mut rng = Rng::with_seed(9);
        assert_eq!(pick_index(&mut rng, 0), None);
        assert_eq!(pick_index(&mut rng, 1), Some(0));
        assert!(pick_index(&mut rng, 4).unwrap() < 4);
    }
}

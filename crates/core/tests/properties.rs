use std::collections::BTreeMap;
use std::ops::Bound;

use proptest::prelude::*;

use rankset_core::skiplist::cmp_key;
use rankset_core::{AddOutcome, Limit, ScoreRange, SkipListConfig, SortedSetData};

#[derive(Debug, Clone)]
enum Step {
    Add { member: u8, score: i16 },
    Remove { member: u8 },
    Incr { member: u8, delta: i8 },
}

const MEMBER_SPACE: u8 = 24;

fn member_name(m: u8) -> String {
    format!("m{:02}", m % MEMBER_SPACE)
}

fn step_strategy() -> impl Strategy<Value = Step> {
    prop_oneof![
        4 => (any::<u8>(), -50i16..50).prop_map(|(member, score)| Step::Add { member, score }),
        2 => any::<u8>().prop_map(|member| Step::Remove { member }),
        1 => (any::<u8>(), any::<i8>()).prop_map(|(member, delta)| Step::Incr { member, delta }),
    ]
}

/// Entries of the reference model in `(score, member)` order.
fn model_order(model: &BTreeMap<String, f64>) -> Vec<(f64, String)> {
    let mut entries: Vec<(f64, String)> = model.iter().map(|(m, &s)| (s, m.clone())).collect();
    entries.sort_by(|a, b| cmp_key(a.0, &a.1, b.0, &b.1));
    entries
}

fn apply(set: &mut SortedSetData, model: &mut BTreeMap<String, f64>, step: &Step) {
    match step {
        Step::Add { member, score } => {
            let name = member_name(*member);
            let score = f64::from(*score);
            let expected = match model.get(&name) {
                None => AddOutcome::Added,
                Some(&s) if s == score => AddOutcome::Unchanged,
                Some(_) => AddOutcome::Updated,
            };
            assert_eq!(set.add(&name, score).unwrap(), expected);
            model.insert(name, score);
        }
        Step::Remove { member } => {
            let name = member_name(*member);
            assert_eq!(set.remove(&name), model.remove(&name).is_some());
        }
        Step::Incr { member, delta } => {
            let name = member_name(*member);
            let next = model.get(&name).copied().unwrap_or(0.0) + f64::from(*delta);
            assert_eq!(set.incr_by(&name, f64::from(*delta)).unwrap(), next);
            model.insert(name, next);
        }
    }
}

fn new_set(seed: u64) -> SortedSetData {
    let config = SkipListConfig {
        seed: Some(seed),
        ..SkipListConfig::default()
    };
    SortedSetData::new("prop".to_string(), &config)
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]

    #[test]
    fn prop_matches_sorted_model(
        seed in any::<u64>(),
        steps in prop::collection::vec(step_strategy(), 1..200),
    ) {
        let mut set = new_set(seed);
        let mut model = BTreeMap::new();

        for step in &steps {
            apply(&mut set, &mut model, step);
            if let Err(e) = set.validate() {
                return Err(TestCaseError::fail(format!("after {:?}: {}", step, e)));
            }
        }

        let expected = model_order(&model);
        let actual: Vec<(f64, String)> = set.iter().map(|(s, m)| (s, m.to_string())).collect();
        prop_assert_eq!(&actual, &expected);
        prop_assert_eq!(set.len(), expected.len() as u64);

        for (i, (score, member)) in expected.iter().enumerate() {
            prop_assert_eq!(set.score(member), Some(*score));
            prop_assert_eq!(set.rank(member), Some(i as u64));
            prop_assert_eq!(set.rev_rank(member), Some((expected.len() - 1 - i) as u64));
        }
    }

    #[test]
    fn prop_score_ranges_agree_with_filter(
        seed in any::<u64>(),
        steps in prop::collection::vec(step_strategy(), 1..120),
        lo in -60i16..60,
        width in 0i16..60,
        lo_open in any::<bool>(),
        hi_open in any::<bool>(),
        offset in 0usize..10,
        count in 0usize..10,
    ) {
        let mut set = new_set(seed);
        let mut model = BTreeMap::new();
        for step in &steps {
            apply(&mut set, &mut model, step);
        }

        let (lo, hi) = (f64::from(lo), f64::from(lo + width));
        let min = if lo_open { Bound::Excluded(lo) } else { Bound::Included(lo) };
        let max = if hi_open { Bound::Excluded(hi) } else { Bound::Included(hi) };
        let range = ScoreRange::new(min, max);

        let inside: Vec<String> = model_order(&model)
            .into_iter()
            .filter(|(s, _)| range.contains(*s))
            .map(|(_, m)| m)
            .collect();

        let got: Vec<String> = set
            .range_by_score(&range, None)
            .unwrap()
            .into_iter()
            .map(|e| e.member)
            .collect();
        prop_assert_eq!(&got, &inside);
        prop_assert_eq!(set.count_by_score(&range).unwrap(), inside.len() as u64);

        let page: Vec<String> = set
            .range_by_score(&range, Some(Limit::new(offset, count)))
            .unwrap()
            .into_iter()
            .map(|e| e.member)
            .collect();
        let want: Vec<String> = inside.iter().skip(offset).take(count).cloned().collect();
        prop_assert_eq!(page, want);

        let rev_page: Vec<String> = set
            .rev_range_by_score(&range, Some(Limit::new(offset, count)))
            .unwrap()
            .into_iter()
            .map(|e| e.member)
            .collect();
        let want: Vec<String> = inside.iter().rev().skip(offset).take(count).cloned().collect();
        prop_assert_eq!(rev_page, want);
    }

    #[test]
    fn prop_rank_ranges_agree_with_slices(
        seed in any::<u64>(),
        steps in prop::collection::vec(step_strategy(), 1..120),
        start in -30i64..30,
        stop in -30i64..30,
    ) {
        let mut set = new_set(seed);
        let mut model = BTreeMap::new();
        for step in &steps {
            apply(&mut set, &mut model, step);
        }
        let order: Vec<String> = model_order(&model).into_iter().map(|(_, m)| m).collect();
        let len = order.len() as i64;

        let norm = |i: i64| if i < 0 { len + i } else { i };
        let (s, e) = (norm(start).max(0), norm(stop).min(len - 1));
        let want: Vec<String> = if s > e || s >= len {
            Vec::new()
        } else {
            order[s as usize..=e as usize].to_vec()
        };

        let got: Vec<String> = set
            .range_by_rank(start, stop)
            .into_iter()
            .map(|e| e.member)
            .collect();
        prop_assert_eq!(&got, &want);

        let reversed: Vec<String> = order.iter().rev().cloned().collect();
        let want_rev: Vec<String> = if s > e || s >= len {
            Vec::new()
        } else {
            reversed[s as usize..=e as usize].to_vec()
        };
        let got_rev: Vec<String> = set
            .rev_range_by_rank(start, stop)
            .into_iter()
            .map(|e| e.member)
            .collect();
        prop_assert_eq!(got_rev, want_rev);
    }

    #[test]
    fn prop_repeated_add_is_idempotent(
        seed in any::<u64>(),
        steps in prop::collection::vec(step_strategy(), 1..80),
        member in any::<u8>(),
        score in -50i16..50,
    ) {
        let mut set = new_set(seed);
        let mut model = BTreeMap::new();
        for step in &steps {
            apply(&mut set, &mut model, step);
        }
        let name = member_name(member);
        set.add(&name, f64::from(score)).unwrap();
        let after_first = (set.len(), set.rank(&name));
        prop_assert_eq!(set.add(&name, f64::from(score)).unwrap(), AddOutcome::Unchanged);
        prop_assert_eq!((set.len(), set.rank(&name)), after_first);
    }
}

use std::collections::HashSet;

use asgsim::prelude::*;
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// All 2^n samples of size n.
fn all_samples(n: usize) -> Vec<Vec<AlleleType>> {
    (0..1_u32 << n)
        .map(|bits| {
            (0..n)
                .map(|i| AlleleType::from((bits >> i) & 1 == 1))
                .collect()
        })
        .collect()
}

/// The first history, over increasing seeds, with at most
/// `max_internal` internal lineages and at least one branching.
fn small_history(n: usize, sigma: f64, max_internal: usize) -> (u64, EventHistory) {
    for seed in 0.. {
        let mut rng = StdRng::seed_from_u64(seed);
        let history = asgsim::simulate(n, sigma, &mut rng).unwrap();
        if history.num_branchings() > 0 && history.num_internal() <= max_internal {
            return (seed, history);
        }
    }
    unreachable!()
}

#[test]
fn test_likelihoods_of_all_samples_sum_to_one() {
    let (_, history) = small_history(4, 1.0, 10);
    for ancestor in AlleleType::ALL {
        let total: f64 = all_samples(4)
            .iter()
            .map(|y| asgsim::likelihood(y, &history, 0.3, ancestor).unwrap())
            .sum();
        assert!((total - 1.0).abs() < 1e-9, "{}", total);
    }
}

#[test]
fn test_four_samples_unit_selection() {
    let (seed, history) = small_history(4, 1.0, 8);
    let n = history.sample_size();
    let ancestor = history.ultimate_ancestor();

    // internal lineages are exactly the ids that are
    // neither sampled nor the ultimate ancestor
    let mut ids = HashSet::new();
    for event in history.events() {
        match *event {
            Event::Coalescence {
                parent,
                children: (a, b),
                ..
            } => ids.extend([parent, a, b]),
            Event::Branching {
                lineage,
                continuing,
                incoming,
                ..
            } => ids.extend([lineage, continuing, incoming]),
            _ => unreachable!(),
        }
    }
    let internal = ids
        .iter()
        .filter(|&&l| usize::from(l) > n && l != ancestor)
        .count();
    assert_eq!(history.num_internal(), internal);

    let mut rng = StdRng::seed_from_u64(seed);
    let u = 0.5;
    let ancestor_type = AlleleType::Advantaged;
    let annotated = asgsim::overlay(&history, u, &mut rng).unwrap();
    let observed = asgsim::project(&annotated, ancestor_type).unwrap();
    assert_eq!(observed.len(), 4);

    let exact = asgsim::likelihood(&observed, &history, u, ancestor_type).unwrap();
    let empirical =
        asgsim::empirical_likelihood(&observed, &history, u, ancestor_type, 10_000, &mut rng)
            .unwrap();
    assert!(exact > 0.0 && exact <= 1.0);
    assert!(
        (exact - empirical).abs() < 0.02,
        "exact {} empirical {}",
        exact,
        empirical
    );
}

#[test]
fn test_validate_likelihood_from_parameters() {
    let (seed, _) = small_history(3, 0.5, 8);
    let params = ModelParametersBuilder::default()
        .sample_size(3)
        .selection(0.5)
        .mutation_rate(0.25)
        .ancestor_type(0)
        .trials(10_000)
        .seed(seed)
        .build()
        .unwrap();
    let comparison = params.validate_likelihood().unwrap();
    assert_eq!(comparison.observed.len(), 3);
    assert!(comparison.absolute_difference() < 0.02);
    let again = params.validate_likelihood().unwrap();
    assert_eq!(again.history, comparison.history);
    assert_eq!(again.observed, comparison.observed);
    assert_eq!(again.empirical, comparison.empirical);
    assert!((again.exact - comparison.exact).abs() <= 1e-10 * comparison.exact);
}

#[test]
fn test_huge_mutation_rate_fails_fast() {
    let params = ModelParametersBuilder::default()
        .sample_size(3)
        .selection(0.5)
        .mutation_rate(1e20)
        .build()
        .unwrap();
    assert!(matches!(
        params.validate_likelihood(),
        Err(AsgError::MutationError { .. })
    ));
}

#[test]
fn test_enumeration_too_large() {
    // without selection every non-root coalescence
    // creates an internal lineage: m = n - 2
    let mut rng = StdRng::seed_from_u64(0);
    let n = ExactLikelihood::DEFAULT_MAX_INTERNAL + 3;
    let history = asgsim::simulate(n, 0.0, &mut rng).unwrap();
    let observed = vec![AlleleType::Advantaged; n];
    assert_eq!(
        asgsim::likelihood(&observed, &history, 0.1, AlleleType::Advantaged),
        Err(AsgError::EnumerationTooLarge {
            internal: n - 2,
            limit: ExactLikelihood::DEFAULT_MAX_INTERNAL
        })
    );
}

#[test]
fn test_neutral_pair_closed_form() {
    let id = |x| LineageId::new(x).unwrap();
    let history = EventHistory::from_events(
        2,
        vec![Event::Coalescence {
            time: Time::new(0.8).unwrap(),
            parent: id(3),
            children: (id(2), id(1)),
        }],
    )
    .unwrap();
    let model = TwoStateMutation::new(1.25).unwrap();
    let same = model.same_state_probability(0.8);
    let switch = model.switch_probability(0.8);
    use AlleleType::*;
    let cases = [
        ([Advantaged, Advantaged], same * same),
        ([Advantaged, Disadvantaged], same * switch),
        ([Disadvantaged, Disadvantaged], switch * switch),
    ];
    for (observed, expected) in cases {
        let p = asgsim::likelihood(&observed, &history, 1.25, Advantaged).unwrap();
        assert!((p - expected).abs() < 1e-12);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn test_likelihood_is_a_deterministic_probability(n in 2..5_usize,
                                                      sigma in 0.0..1.5_f64,
                                                      u in 0.01..2.0_f64,
                                                      bits in 0..16_u32,
                                                      seed in 0..u64::MAX) {
        let mut rng = StdRng::seed_from_u64(seed);
        let history = asgsim::simulate(n, sigma, &mut rng).unwrap();
        prop_assume!(history.num_internal() <= 12);
        let observed: Vec<AlleleType> = (0..n)
            .map(|i| AlleleType::from((bits >> i) & 1 == 1))
            .collect();
        for ancestor in AlleleType::ALL {
            let p = asgsim::likelihood(&observed, &history, u, ancestor).unwrap();
            prop_assert!((0.0..=1.0).contains(&p));
            let q = asgsim::likelihood(&observed, &history, u, ancestor).unwrap();
            prop_assert!((p - q).abs() <= 1e-10 * p);
        }
    }
}

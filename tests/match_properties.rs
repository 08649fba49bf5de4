use facematch::matcher::{compare_descriptors, DEFAULT_THRESHOLD};
use facematch::{face, Descriptor, MatchError};
use rand::{rngs::StdRng, Rng, SeedableRng};

fn random_descriptor(rng: &mut StdRng, dim: usize) -> Descriptor {
    Descriptor::from((0..dim).map(|_| rng.gen_range(-0.5..0.5)).collect::<Vec<f32>>())
}

#[test]
fn test_self_distance_is_zero_and_matches() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..50 {
        let a = random_descriptor(&mut rng, 128);
        let results = compare_descriptors(&a, &[a.clone()], DEFAULT_THRESHOLD).unwrap();
        assert_eq!(results[0].distance, 0.0);
        assert!(results[0].is_match);
    }
}

#[test]
fn test_distance_is_symmetric() {
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..50 {
        let a = random_descriptor(&mut rng, 128);
        let b = random_descriptor(&mut rng, 128);
        assert_eq!(
            face::euclidean_distance(&a, &b).unwrap(),
            face::euclidean_distance(&b, &a).unwrap()
        );
    }
}

#[test]
fn test_one_result_per_candidate() {
    let mut rng = StdRng::seed_from_u64(3);
    let reference = random_descriptor(&mut rng, 128);
    for count in [0, 1, 5, 32] {
        let candidates: Vec<Descriptor> =
            (0..count).map(|_| random_descriptor(&mut rng, 128)).collect();
        let results = compare_descriptors(&reference, &candidates, DEFAULT_THRESHOLD).unwrap();
        assert_eq!(results.len(), count);
        for (i, r) in results.iter().enumerate() {
            assert_eq!(r.index, i);
            assert!(r.distance >= 0.0);
            assert_eq!(r.is_match, r.distance <= DEFAULT_THRESHOLD);
        }
    }
}

#[test]
fn test_mismatched_dimensions_rejected() {
    let mut rng = StdRng::seed_from_u64(5);
    let reference = random_descriptor(&mut rng, 128);
    let candidates = vec![
        random_descriptor(&mut rng, 128),
        random_descriptor(&mut rng, 128),
        random_descriptor(&mut rng, 64),
    ];
    match compare_descriptors(&reference, &candidates, DEFAULT_THRESHOLD) {
        Err(MatchError::InvalidInput { index, .. }) => assert_eq!(index, 2),
        other => panic!("expected InvalidInput, got {:?}", other),
    }
}

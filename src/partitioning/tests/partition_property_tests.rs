use proptest::prelude::*;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::algs::meshgen::{StructuredCell, rectangle_mesh};
use crate::partitioning::metrics::{edge_cut, imbalance};
use crate::partitioning::{ElementPartition, trivial_partition};

#[test]
fn strip_cut_counts_part_changes() {
    let mut mesh =
        rectangle_mesh(24, 1, [0.0, 0.0], [24.0, 1.0], StructuredCell::Quadrilateral).unwrap();
    mesh.compute_topological().unwrap();
    let topo = mesh.topology().unwrap();

    let blocks = trivial_partition(24, 4).unwrap();
    assert_eq!(edge_cut(topo, &blocks), 3);

    let mut rng = SmallRng::seed_from_u64(123);
    let ranks = (0..24).map(|_| rng.gen_range(0..4)).collect();
    let random = ElementPartition::new(ranks, 4).unwrap();
    let used = random.counts().iter().filter(|&&c| c > 0).count();
    // a path touching `used` parts changes part at least `used - 1` times
    assert!(edge_cut(topo, &random) >= used - 1);
}

proptest! {
    #[test]
    fn prop_trivial_blocks(
        (n, p) in (1usize..400).prop_flat_map(|n| (Just(n), 1..=n.min(64)))
    ) {
        let part = trivial_partition(n, p).unwrap();
        prop_assert_eq!(part.len(), n);
        prop_assert!(part.ranks().iter().all(|&r| r < p));
        // non-decreasing, so every rank is a contiguous range
        prop_assert!(part.ranks().windows(2).all(|w| w[0] <= w[1]));

        let counts = part.counts();
        let block = n / p;
        for &c in &counts[..p - 1] {
            prop_assert_eq!(c, block);
        }
        prop_assert_eq!(counts[p - 1], block + n % p);
        prop_assert_eq!(counts.iter().sum::<usize>(), n);
    }

    #[test]
    fn prop_too_few_elements(n in 0usize..20, extra in 1usize..10) {
        prop_assert!(trivial_partition(n, n + extra).is_err());
    }

    #[test]
    fn prop_imbalance_at_least_one(seed in any::<u64>(), p in 1usize..6) {
        let mut rng = SmallRng::seed_from_u64(seed);
        let ranks = (0..50).map(|_| rng.gen_range(0..p)).collect();
        let part = ElementPartition::new(ranks, p).unwrap();
        prop_assert!(imbalance(&part) >= 1.0 - 1e-12);
    }
}

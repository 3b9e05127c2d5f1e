//! Region tree serialization regression test
//!
//! Writes segmented trees in the text format, reads them back, and checks
//! that the reloaded trees are identical, including merged regions.
//!
//! Run with:
//! ```
//! cargo test -p quadseg-region --test serial_reg
//! ```

use quadseg_core::{Field, Rect};
use quadseg_region::{
    PredicateKind, QuarterPolicy, RegionError, RegionTree, SplitMergeOptions, segment,
    split_merge,
};
use quadseg_test::{RegParams, noise_field, quadrant_field};

fn flag(b: bool) -> f64 {
    if b { 1.0 } else { 0.0 }
}

#[test]
fn serial_round_trip_reg() {
    let mut rp = RegParams::new("serial_round_trip");

    let color = {
        let mut f = Field::new(24, 24, 3).unwrap();
        f.fill_rect(Rect::new(0, 0, 24, 12), &[255.0, 0.0, 0.0]).unwrap();
        f.fill_rect(Rect::new(0, 12, 12, 12), &[0.5, 0.25, 0.125]).unwrap();
        f
    };
    let trees = [
        segment(
            &quadrant_field(8, 8, [1.0, 1.0, 2.0, 3.0]),
            &SplitMergeOptions::default(),
            PredicateKind::ZeroVariance,
        )
        .unwrap(),
        segment(&color, &SplitMergeOptions::default(), PredicateKind::ZeroVariance).unwrap(),
        split_merge(
            &noise_field(33, 20, 1, 100.0, 9),
            Rect::new(3, 1, 29, 18),
            &SplitMergeOptions::new(10.0, 2).with_quarter_policy(QuarterPolicy::Floor),
            &PredicateKind::BoundedVariance,
        )
        .unwrap(),
    ];

    for tree in &trees {
        let bytes = tree.write_to_bytes().unwrap();
        let read = RegionTree::read_from_bytes(&bytes).unwrap();
        rp.compare_values(1.0, flag(&read == tree), 0.0);

        // Writing the reloaded tree reproduces the same text
        let again = read.write_to_bytes().unwrap();
        rp.compare_strings(&bytes, &again);

        // Derived data survives too
        rp.compare_values(tree.valid_leaf_count() as f64, read.valid_leaf_count() as f64, 0.0);
        rp.compare_strings(
            format!("{:?}", tree.label_map()).as_bytes(),
            format!("{:?}", read.label_map()).as_bytes(),
        );
    }

    if rp.display() {
        let bytes = trees[0].write_to_bytes().unwrap();
        eprintln!("{}", String::from_utf8_lossy(&bytes));
    }

    assert!(rp.cleanup());
}

#[test]
fn serial_file_reg() {
    let mut rp = RegParams::new("serial_file");

    let field = quadrant_field(16, 16, [4.0, 4.0, 4.0, 9.0]);
    let tree = segment(&field, &SplitMergeOptions::default(), PredicateKind::ZeroVariance).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("quadrants.rt");
    tree.write_to_file(&path).unwrap();
    let read = RegionTree::read_from_file(&path).unwrap();
    rp.compare_values(1.0, flag(read == tree), 0.0);

    let mut reader = std::io::Cursor::new(tree.write_to_bytes().unwrap());
    let read = RegionTree::read_from_reader(&mut reader).unwrap();
    rp.compare_values(1.0, flag(read == tree), 0.0);

    let missing = RegionTree::read_from_file(dir.path().join("missing.rt"));
    rp.compare_values(1.0, flag(matches!(missing, Err(RegionError::Core(_)))), 0.0);

    assert!(rp.cleanup());
}

#[test]
fn serial_corrupt_reg() {
    let mut rp = RegParams::new("serial_corrupt");

    let tree = segment(
        &quadrant_field(4, 4, [1.0, 1.0, 2.0, 3.0]),
        &SplitMergeOptions::default(),
        PredicateKind::ZeroVariance,
    )
    .unwrap();
    let text = String::from_utf8(tree.write_to_bytes().unwrap()).unwrap();

    let corruptions = [
        // Truncated region list
        text.lines().take(6).collect::<Vec<_>>().join("\n"),
        // Unknown field
        text.replace("label = 2", "colour = 2"),
        // Merged region that its keeper does not contain
        text.replace("merged = 1", "merged = 3"),
        // Child rectangle outside its parent
        text.replace("Region[4]: x = 2, y = 2", "Region[4]: x = 3, y = 2"),
        // Wrong channel count for the labels
        text.replace("Channels = 1", "Channels = 3"),
        // Garbage number
        text.replace("Number of regions = 5", "Number of regions = five"),
    ];
    for corrupt in &corruptions {
        let result = RegionTree::read_from_bytes(corrupt.as_bytes());
        rp.compare_values(1.0, flag(result.is_err()), 0.0);
    }

    // Unchanged text still loads
    rp.compare_values(1.0, flag(RegionTree::read_from_bytes(text.as_bytes()).is_ok()), 0.0);

    assert!(rp.cleanup());
}

use std::fs;
use std::path::Path;

use tempfile::tempdir;

use ascflim::{
    discover, stem_of, threshold_related, AcquisitionParams, DatasetError, QuantityKind,
    SuffixTable, ThresholdOptions,
};

fn write_asc(dir : &Path, name : &str, contents : &str) {
    fs::write(dir.join(name), contents).unwrap();
}

fn read_grid(path : &Path) -> Vec<Vec<f64>> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            line.split_whitespace()
                .map(|token| token.parse::<f64>().unwrap())
                .collect()
        })
        .collect()
}

#[test]
fn discovers_exactly_the_kinds_on_disk() {
    let dir = tempdir().unwrap();
    write_asc(dir.path(), "pos_0000_a1.asc", "1 2\n3 4\n");
    write_asc(dir.path(), "pos_0000_a2.asc", "1 2\n3 4\n");
    write_asc(dir.path(), "pos_0000_chi.asc", "1 1\n1 1\n");
    write_asc(dir.path(), "pos_0001_a1.asc", "9 9\n9 9\n");

    let mut found = discover(&dir.path().join("pos_0000"), &SuffixTable::default());
    found.sort();
    assert_eq!(found, vec![QuantityKind::A1, QuantityKind::A2, QuantityKind::Chi]);
}

#[test]
fn stem_resolution_matches_the_export_convention() {
    let table = SuffixTable::default();
    assert_eq!(stem_of(Path::new("pos_0000_a1.asc"), &table),
        Path::new("pos_0000"));
    assert_eq!(stem_of(Path::new("pos_0000_a1[%].asc"), &table),
        Path::new("pos_0000"));
    assert_eq!(stem_of(Path::new("run/pos_0000_photons.asc"), &table),
        Path::new("run/pos_0000"));
}

#[test]
fn ratio_export_masks_invalid_division() {
    let dir = tempdir().unwrap();
    write_asc(dir.path(), "pos_0000_a1.asc", "2 0\n4 8\n");
    write_asc(dir.path(), "pos_0000_a2.asc", "1 5\n0 2\n");
    let out = tempdir().unwrap();

    let written = threshold_related(
        &dir.path().join("pos_0000_a1.asc"),
        out.path(),
        &ThresholdOptions::default(),
    ).unwrap();

    // a1, a2 and the derived ratio
    assert_eq!(written.len(), 3);
    let ratio_path = out.path().join("pos_0000_ar.th.asc");
    assert!(written.contains(&ratio_path));

    // range thresholds flag nothing (0 is inside [0, inf)), but
    // the ratio masks the zero numerator and zero denominator
    let ratio = read_grid(&ratio_path);
    assert_eq!(ratio[0][0], 2.0);
    assert!(ratio[0][1].is_nan());
    assert!(ratio[1][0].is_nan());
    assert_eq!(ratio[1][1], 4.0);

    // the a1 export itself survives unmasked
    let a1 = read_grid(&out.path().join("pos_0000_a1.th.asc"));
    assert_eq!(a1, vec![vec![2.0, 0.0], vec![4.0, 8.0]]);
}

#[test]
fn one_bad_fit_pixel_masks_every_quantity() {
    let dir = tempdir().unwrap();
    write_asc(dir.path(), "pos_0000_a1.asc", "2 2\n2 2\n");
    write_asc(dir.path(), "pos_0000_a2.asc", "1 1\n1 1\n");
    write_asc(dir.path(), "pos_0000_chi.asc", "1 10\n1 1\n");
    let out = tempdir().unwrap();

    threshold_related(
        &dir.path().join("pos_0000_chi.asc"),
        out.path(),
        &ThresholdOptions::default(),
    ).unwrap();

    // chi = 10 fails the default [0.5, 2] fit-quality range at
    // (0, 1); the a1 export is masked there too
    let a1 = read_grid(&out.path().join("pos_0000_a1.th.asc"));
    assert_eq!(a1[0][0], 2.0);
    assert!(a1[0][1].is_nan());

    let ratio = read_grid(&out.path().join("pos_0000_ar.th.asc"));
    assert_eq!(ratio[0][0], 2.0);
    assert!(ratio[0][1].is_nan());
}

#[test]
fn binned_photons_gate_dim_regions() {
    let dir = tempdir().unwrap();
    // 3x3 photon grid; windowed sums with half-window 1 stay
    // far below the 3000-photon confidence floor
    write_asc(dir.path(), "pos_0000_photons.asc", "10 10 10\n10 10 10\n10 10 10\n");
    write_asc(dir.path(), "pos_0000_t1.asc", "1 1 1\n1 1 1\n1 1 1\n");
    let out = tempdir().unwrap();

    threshold_related(
        &dir.path().join("pos_0000_photons.asc"),
        out.path(),
        &ThresholdOptions::default(),
    ).unwrap();

    let t1 = read_grid(&out.path().join("pos_0000_t1.th.asc"));
    assert!(t1.iter().flatten().all(|value| value.is_nan()));

    // with the confidence floor relaxed everything survives
    let relaxed = ThresholdOptions {
        acquisition : AcquisitionParams {
            min_binned_photons : 0.0,
            ..AcquisitionParams::default()
        },
        ..ThresholdOptions::default()
    };
    threshold_related(
        &dir.path().join("pos_0000_photons.asc"),
        out.path(),
        &relaxed,
    ).unwrap();
    let t1 = read_grid(&out.path().join("pos_0000_t1.th.asc"));
    assert!(t1.iter().flatten().all(|value| *value == 1.0));
}

#[test]
fn dry_run_reports_without_writing() {
    let dir = tempdir().unwrap();
    write_asc(dir.path(), "pos_0000_a1.asc", "1 2\n3 4\n");
    let out = tempdir().unwrap();

    let options = ThresholdOptions {
        dry_run : true,
        ..ThresholdOptions::default()
    };
    let written = threshold_related(
        &dir.path().join("pos_0000_a1.asc"),
        out.path(),
        &options,
    ).unwrap();

    assert_eq!(written, vec![out.path().join("pos_0000_a1.th.asc")]);
    assert!(!written[0].exists());
}

#[test]
fn mismatched_member_shapes_are_fatal_for_the_set() {
    let dir = tempdir().unwrap();
    write_asc(dir.path(), "pos_0000_a1.asc", "1 2\n3 4\n");
    write_asc(dir.path(), "pos_0000_chi.asc", "1 1 1\n1 1 1\n1 1 1\n");
    let out = tempdir().unwrap();

    let result = threshold_related(
        &dir.path().join("pos_0000_a1.asc"),
        out.path(),
        &ThresholdOptions::default(),
    );
    assert!(matches!(result, Err(DatasetError::FormatError(_))
        | Err(DatasetError::DimensionsError(_))));
}

#[test]
fn output_file_path_supplies_the_stem() {
    let dir = tempdir().unwrap();
    write_asc(dir.path(), "pos_0000_a1.asc", "1 2\n3 4\n");
    write_asc(dir.path(), "pos_0000_a2.asc", "1 1\n1 1\n");
    let out = tempdir().unwrap();

    let written = threshold_related(
        &dir.path().join("pos_0000_a1.asc"),
        &out.path().join("renamed_a1.asc"),
        &ThresholdOptions::default(),
    ).unwrap();

    assert!(written.contains(&out.path().join("renamed_a1.th.asc")));
    assert!(written.contains(&out.path().join("renamed_ar.th.asc")));
}

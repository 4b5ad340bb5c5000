use crate::image_pipeline::batch::{BatchSampleGenerator, CutoffLadder};
use crate::image_pipeline::buffer::ImageBuffer;
use crate::image_pipeline::common::error::BlurError;
use crate::image_pipeline::filter::{FilterEngine, FilterMode};
use crate::image_pipeline::test_utils::{calibrated_pattern, max_abs_diff, pattern_image};

fn energy_removed(original: &ImageBuffer, filtered: &ImageBuffer) -> f64 {
    original
        .samples()
        .iter()
        .zip(filtered.samples())
        .map(|(a, b)| (a - b).powi(2))
        .sum()
}

#[test]
fn default_ladder_spans_forty_to_half_cpd() {
    let ladder = CutoffLadder::default();
    let candidates = ladder.candidates();

    assert_eq!(candidates.len(), 3950);
    assert_eq!(candidates[0], 40.0);
    assert_eq!(*candidates.last().unwrap(), 0.51);
    assert_eq!(ladder.count_above(5.0), 3500);
}

#[test]
fn cutoffs_follow_quarter_circle() {
    let ladder = CutoffLadder::default();
    let cutoffs = ladder.sample_cutoffs(5.0, 7);

    assert_eq!(cutoffs.len(), 8);
    assert_eq!(cutoffs[0], 40.0);
    assert_eq!(cutoffs[7], 5.0);
    assert!(cutoffs[..7].iter().all(|&c| c > 5.0));
    assert!(cutoffs.windows(2).all(|w| w[0] >= w[1]));

    // x = 1 of 7 lands at index floor(3500 * sqrt(48) / 7) = 3464 -> 5.36
    assert!((cutoffs[6] - 5.36).abs() < 1e-9);

    // spacing shrinks toward the target end
    let first_gap = cutoffs[0] - cutoffs[1];
    let last_gap = cutoffs[5] - cutoffs[6];
    assert!(first_gap > last_gap);
}

#[test]
fn zero_samples_yields_only_target() {
    let ladder = CutoffLadder::default();
    assert_eq!(ladder.sample_cutoffs(3.0, 0), vec![3.0]);
}

#[test]
fn target_above_ladder_repeats_target() {
    let ladder = CutoffLadder::default();
    assert_eq!(ladder.sample_cutoffs(55.0, 3), vec![55.0; 4]);
}

#[test]
fn ladder_rejects_unordered_candidates() {
    assert!(matches!(
        CutoffLadder::new(vec![1.0, 2.0]),
        Err(BlurError::DomainError(_))
    ));
    assert!(CutoffLadder::new(Vec::new()).is_err());
    assert!(CutoffLadder::new(vec![3.0, -1.0]).is_err());
    assert_eq!(
        CutoffLadder::from_hundredths(300, 297).unwrap().candidates(),
        &[3.0, 2.99, 2.98]
    );
}

#[test]
fn ladder_stop_at_type_maximum_is_empty() {
    assert!(matches!(
        CutoffLadder::from_hundredths(100, u32::MAX),
        Err(BlurError::DomainError(_))
    ));
    assert!(CutoffLadder::from_hundredths(u32::MAX, u32::MAX).is_err());
    assert_eq!(
        CutoffLadder::from_hundredths(u32::MAX, u32::MAX - 1).unwrap().candidates().len(),
        1
    );
}

#[test]
fn batch_has_expected_length_and_ends_at_target() {
    let image = calibrated_pattern(16, 24);
    let engine = FilterEngine::default();
    let generator = BatchSampleGenerator::new(&engine, FilterMode::Sequential);

    let batch = generator.generate_batch(&image, 5.0, 7).unwrap();
    let direct = engine.apply(&image, 5.0, FilterMode::Sequential).unwrap();

    assert_eq!(batch.len(), 8);
    assert!(max_abs_diff(&batch[7], &direct) < 1e-12);
}

#[test]
fn batch_blur_increases_toward_target() {
    let image = calibrated_pattern(24, 24);
    let engine = FilterEngine::default();
    let ladder = CutoffLadder::from_hundredths(100, 1).unwrap();
    let generator = BatchSampleGenerator::with_ladder(&engine, ladder, FilterMode::Sequential);

    let samples: Vec<_> = generator
        .samples(&image, 0.02, 4)
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();

    assert_eq!(samples.len(), 5);
    for pair in samples.windows(2) {
        assert!(pair[0].cycles_per_degree >= pair[1].cycles_per_degree);
        assert!(energy_removed(&image, &pair[0].image) < energy_removed(&image, &pair[1].image));
    }
    assert_eq!(
        samples.iter().map(|s| s.index).collect::<Vec<_>>(),
        vec![0, 1, 2, 3, 4]
    );
}

#[test]
fn parallel_batch_matches_sequential_batch() {
    let image = calibrated_pattern(12, 18);
    let engine = FilterEngine::default();

    let sequential = BatchSampleGenerator::new(&engine, FilterMode::Sequential)
        .generate_batch(&image, 8.0, 3)
        .unwrap();
    let parallel = BatchSampleGenerator::new(&engine, FilterMode::Parallel)
        .generate_batch(&image, 8.0, 3)
        .unwrap();

    assert_eq!(sequential.len(), parallel.len());
    for (a, b) in sequential.iter().zip(&parallel) {
        assert!(max_abs_diff(a, b) < 1e-9);
    }
}

#[test]
fn failing_sample_fails_batch() {
    let image = pattern_image(8, 8);
    let engine = FilterEngine::default();
    let generator = BatchSampleGenerator::new(&engine, FilterMode::Sequential);

    let mut samples = generator.samples(&image, 5.0, 3).unwrap();
    assert!(matches!(samples.next(), Some(Err(BlurError::PreconditionError(_)))));
    assert!(samples.next().is_none());

    assert!(generator.generate_batch(&image, 5.0, 3).is_err());
}

#[test]
fn invalid_target_is_rejected_up_front() {
    let image = ImageBuffer::filled(4, 4, 3, 1.0).unwrap();
    let engine = FilterEngine::default();
    let generator = BatchSampleGenerator::new(&engine, FilterMode::Sequential);

    assert!(matches!(
        generator.generate_batch(&image, 0.0, 3),
        Err(BlurError::DomainError(_))
    ));
}

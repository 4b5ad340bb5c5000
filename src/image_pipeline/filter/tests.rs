use std::f64::consts::PI;

use crate::image_pipeline::buffer::ImageBuffer;
use crate::image_pipeline::common::error::{BlurError, Result};
use crate::image_pipeline::filter::{
    ChannelExecutor, ChannelPlane, FilterConfig, FilterEngine, FilterMode, SequentialExecutor,
    SpectralKernel,
};
use crate::image_pipeline::test_utils::{REFERENCE_PPD, calibrated_pattern, max_abs_diff, pattern_image};

/// Returns planes in reverse channel order.
struct ReversingExecutor;

impl ChannelExecutor for ReversingExecutor {
    fn name(&self) -> &'static str {
        "reversing"
    }

    fn execute(&self, planes: Vec<ChannelPlane>, kernel: &SpectralKernel) -> Result<Vec<ChannelPlane>> {
        let mut out = SequentialExecutor.execute(planes, kernel)?;
        out.reverse();
        Ok(out)
    }
}

/// Reports channel 0 for every plane.
struct DuplicatingExecutor;

impl ChannelExecutor for DuplicatingExecutor {
    fn name(&self) -> &'static str {
        "duplicating"
    }

    fn execute(&self, planes: Vec<ChannelPlane>, kernel: &SpectralKernel) -> Result<Vec<ChannelPlane>> {
        let out = SequentialExecutor.execute(planes, kernel)?;
        Ok(out
            .into_iter()
            .map(|p| ChannelPlane {
                index: 0,
                samples: p.samples,
            })
            .collect())
    }
}

/// Poisons every sample of channel 1 and saturates channel 2.
struct NonFiniteExecutor;

impl ChannelExecutor for NonFiniteExecutor {
    fn name(&self) -> &'static str {
        "non-finite"
    }

    fn execute(&self, planes: Vec<ChannelPlane>, kernel: &SpectralKernel) -> Result<Vec<ChannelPlane>> {
        let out = SequentialExecutor.execute(planes, kernel)?;
        Ok(out
            .into_iter()
            .map(|p| {
                let fill = match p.index {
                    1 => Some(f64::NAN),
                    2 => Some(f64::INFINITY),
                    _ => None,
                };
                let samples = match fill {
                    Some(v) => vec![v; p.samples.len()],
                    None => p.samples,
                };
                ChannelPlane { index: p.index, samples }
            })
            .collect())
    }
}

fn stripes(height: usize, width: usize, along_rows: bool, cycles: usize) -> ImageBuffer {
    let mut data = Vec::with_capacity(height * width * 3);
    for row in 0..height {
        for col in 0..width {
            let (t, n) = if along_rows { (row, height) } else { (col, width) };
            let v = 128.0 + 100.0 * (2.0 * PI * (cycles * t) as f64 / n as f64).cos();
            data.extend_from_slice(&[v, v, v]);
        }
    }
    ImageBuffer::new(height, width, 3, data).unwrap()
}

#[test]
fn very_high_cutoff_is_identity() {
    let image = calibrated_pattern(24, 40);
    let engine = FilterEngine::default();

    let out = engine.apply(&image, 1e6, FilterMode::Sequential).unwrap();

    assert!(max_abs_diff(&image, &out) < 1e-6);
}

#[test]
fn near_zero_cutoff_averages_each_channel() {
    let image = calibrated_pattern(24, 40);
    let engine = FilterEngine::default();

    let out = engine.apply(&image, 1e-6, FilterMode::Sequential).unwrap();

    for channel in 0..3 {
        let mean = image.channel_mean(channel);
        for v in out.channel_plane(channel) {
            assert!((v - mean).abs() < 1e-6, "channel {channel}: {v} vs {mean}");
        }
    }
}

#[test]
fn lower_cutoff_removes_more_detail() {
    let image = calibrated_pattern(32, 32);
    let engine = FilterEngine::default();

    let mild = engine.apply(&image, 0.5, FilterMode::Sequential).unwrap();
    let strong = engine.apply(&image, 0.05, FilterMode::Sequential).unwrap();

    assert!(max_abs_diff(&image, &strong) > max_abs_diff(&image, &mild));
}

#[test]
fn sequential_and_parallel_agree() {
    let image = calibrated_pattern(30, 45);
    let engine = FilterEngine::new(FilterConfig::builder().threads(Some(3)).build());
    assert!(engine.parallel_available());

    let sequential = engine.apply(&image, 0.3, FilterMode::Sequential).unwrap();
    let outcome = engine.apply_with_report(&image, 0.3, FilterMode::Parallel).unwrap();

    assert_eq!(outcome.report.executed, FilterMode::Parallel);
    assert!(!outcome.report.fell_back());
    assert!(max_abs_diff(&sequential, &outcome.image) < 1e-9);
}

#[test]
fn output_is_clipped_to_intensity_range() {
    let mut data = Vec::new();
    let mut out_of_range = 0;
    for i in 0..(8 * 8 * 3) {
        let v = match i % 3 {
            0 => 300.0,
            1 => -50.0,
            _ => 100.0,
        };
        if v != 100.0 {
            out_of_range += 1;
        }
        data.push(v);
    }
    let image = ImageBuffer::new(8, 8, 3, data)
        .unwrap()
        .with_pixels_per_degree(REFERENCE_PPD)
        .unwrap();

    let outcome = FilterEngine::default()
        .apply_with_report(&image, 1e6, FilterMode::Sequential)
        .unwrap();

    assert_eq!(outcome.report.clipped_samples, out_of_range);
    assert!(outcome.image.samples().iter().all(|&v| (0.0..=255.0).contains(&v)));
    assert!((outcome.image.sample(3, 3, 0) - 255.0).abs() < 1e-9);
    assert!(outcome.image.sample(3, 3, 1).abs() < 1e-9);
}

#[test]
fn hard_edges_stay_in_range_at_every_cutoff() {
    let mut data = Vec::new();
    for _row in 0..16 {
        for col in 0..32 {
            let v = if col % 8 < 4 { 255.0 } else { 0.0 };
            data.extend_from_slice(&[v, 255.0 - v, v]);
        }
    }
    let image = ImageBuffer::new(16, 32, 3, data)
        .unwrap()
        .with_pixels_per_degree(REFERENCE_PPD)
        .unwrap();
    let engine = FilterEngine::default();

    for cpd in [0.01, 0.1, 0.3, 0.6, 1.0, 5.0] {
        let out = engine.apply(&image, cpd, FilterMode::Sequential).unwrap();
        assert!(out.samples().iter().all(|&v| (0.0..=255.0).contains(&v)));
    }
}

#[test]
fn blur_is_isotropic_across_axes() {
    let pixels_per_degree: f64 = 10.0;
    let cycles_per_degree = 0.72;
    let sigma = pixels_per_degree * cycles_per_degree / 2.0;
    let gain = (-9.0 / (sigma * sigma)).exp();
    let engine = FilterEngine::default();

    for along_rows in [true, false] {
        let (height, width) = (8, 16);
        let image = stripes(height, width, along_rows, 3)
            .with_pixels_per_degree(pixels_per_degree)
            .unwrap();

        let out = engine.apply(&image, cycles_per_degree, FilterMode::Sequential).unwrap();

        for row in 0..height {
            for col in 0..width {
                let (t, n) = if along_rows { (row, height) } else { (col, width) };
                let expected = 128.0 + 100.0 * gain * (2.0 * PI * (3 * t) as f64 / n as f64).cos();
                for channel in 0..3 {
                    let got = out.sample(row, col, channel);
                    assert!(
                        (got - expected).abs() < 1e-6,
                        "along_rows={along_rows} ({row},{col}): {got} vs {expected}"
                    );
                }
            }
        }
    }
}

#[test]
fn output_keeps_shape_and_calibration() {
    let image = calibrated_pattern(12, 20);
    let before = image.clone();
    let engine = FilterEngine::default();

    let once = engine.apply(&image, 0.4, FilterMode::Sequential).unwrap();
    let twice = engine.apply(&once, 0.4, FilterMode::Sequential).unwrap();

    assert_eq!(image, before);
    assert_eq!(once.dimensions(), (12, 20));
    assert_eq!(once.channels(), 3);
    assert_eq!(once.pixels_per_degree(), image.pixels_per_degree());
    assert_eq!(twice.pixels_per_degree(), image.pixels_per_degree());
}

#[test]
fn uncalibrated_buffer_is_rejected() {
    let image = pattern_image(8, 8);
    let err = FilterEngine::default()
        .apply(&image, 5.0, FilterMode::Sequential)
        .unwrap_err();

    assert!(matches!(err, BlurError::PreconditionError(_)));
    assert_eq!(err.to_string(), "calibration required before filtering");
}

#[test]
fn four_channel_buffer_is_rejected() {
    let image = ImageBuffer::filled(8, 8, 4, 10.0)
        .unwrap()
        .with_pixels_per_degree(REFERENCE_PPD)
        .unwrap();
    let err = FilterEngine::default()
        .apply(&image, 5.0, FilterMode::Sequential)
        .unwrap_err();

    assert!(matches!(err, BlurError::UnsupportedFormat { channels: 4 }));
}

#[test]
fn non_positive_cutoff_is_rejected() {
    let image = calibrated_pattern(8, 8);
    let engine = FilterEngine::default();

    for cpd in [0.0, -2.0, f64::NAN] {
        assert!(matches!(
            engine.apply(&image, cpd, FilterMode::Sequential),
            Err(BlurError::DomainError(_))
        ));
    }
}

#[test]
fn parallel_request_falls_back_when_pool_unavailable() {
    let image = calibrated_pattern(10, 14);
    let engine = FilterEngine::new(FilterConfig::builder().threads(Some(0)).build());
    assert!(!engine.parallel_available());

    let outcome = engine.apply_with_report(&image, 0.5, FilterMode::Parallel).unwrap();
    let sequential = engine.apply(&image, 0.5, FilterMode::Sequential).unwrap();

    assert_eq!(outcome.report.requested, FilterMode::Parallel);
    assert_eq!(outcome.report.executed, FilterMode::Sequential);
    assert!(outcome.report.fell_back());
    assert!(max_abs_diff(&sequential, &outcome.image) < 1e-12);
}

#[test]
fn disabled_fallback_surfaces_concurrency_error() {
    let image = calibrated_pattern(10, 14);
    let config = FilterConfig::builder().allow_fallback(false).build();
    let engine = FilterEngine::with_executors(Box::new(SequentialExecutor), None, config);

    let result = engine.apply(&image, 0.5, FilterMode::Parallel);

    assert!(matches!(result, Err(BlurError::ConcurrencyUnavailable(_))));
    assert!(engine.apply(&image, 0.5, FilterMode::Sequential).is_ok());
}

#[test]
fn channels_are_reassembled_by_index() {
    let image = calibrated_pattern(16, 16);
    let reference = FilterEngine::default()
        .apply(&image, 0.4, FilterMode::Sequential)
        .unwrap();
    let engine = FilterEngine::with_executors(
        Box::new(SequentialExecutor),
        Some(Box::new(ReversingExecutor)),
        FilterConfig::default(),
    );

    let out = engine.apply(&image, 0.4, FilterMode::Parallel).unwrap();

    assert!(max_abs_diff(&reference, &out) < 1e-12);
}

#[test]
fn duplicate_channel_results_fail() {
    let image = calibrated_pattern(8, 8);
    let engine = FilterEngine::with_executors(
        Box::new(DuplicatingExecutor),
        None,
        FilterConfig::default(),
    );

    let result = engine.apply(&image, 0.4, FilterMode::Sequential);

    assert!(matches!(result, Err(BlurError::ExecutionError(_))));
}

#[test]
fn report_records_filter_steps() {
    let image = calibrated_pattern(8, 8);
    let outcome = FilterEngine::default()
        .apply_with_report(&image, 0.4, FilterMode::Sequential)
        .unwrap();

    let timings = &outcome.report.timings;
    assert!(timings.get_step("build_mask").is_some());
    assert!(timings.get_step("spectral_filter").is_some());
    assert!(timings.get_step("assemble").is_some());
    assert_eq!(timings.steps().len(), 3);
}

#[test]
fn non_finite_input_is_rejected_before_filtering() {
    let mut data = pattern_image(4, 4).samples().to_vec();
    data[5] = f64::INFINITY;

    let result = ImageBuffer::new(4, 4, 3, data);

    assert!(matches!(result, Err(BlurError::DomainError(_))));
}

#[test]
fn non_finite_channel_results_are_clipped() {
    let image = calibrated_pattern(6, 6);
    let engine = FilterEngine::with_executors(
        Box::new(NonFiniteExecutor),
        None,
        FilterConfig::default(),
    );

    let outcome = engine.apply_with_report(&image, 5.0, FilterMode::Sequential).unwrap();

    assert!(outcome.image.samples().iter().all(|v| (0.0..=255.0).contains(v)));
    assert_eq!(outcome.image.sample(3, 3, 1), 0.0);
    assert_eq!(outcome.image.sample(3, 3, 2), 255.0);
    assert!(outcome.report.clipped_samples >= 72);
}

#[test]
fn sequential_requests_never_build_the_pool() {
    let image = calibrated_pattern(8, 8);
    let engine = FilterEngine::new(FilterConfig::builder().threads(Some(0)).build());

    engine.apply(&image, 0.5, FilterMode::Sequential).unwrap();
    assert!(!engine.parallel_initialised());

    let outcome = engine.apply_with_report(&image, 0.5, FilterMode::Parallel).unwrap();
    assert!(engine.parallel_initialised());
    assert!(outcome.report.fell_back());
}

use crate::image_pipeline::buffer::ImageBuffer;

/// Reference display calibration (1024x768, 36x27 cm at 61 cm).
pub(crate) const REFERENCE_PPD: f64 = 30.284;

/// Deterministic RGB test card with edges and texture in every channel.
pub(crate) fn pattern_image(height: usize, width: usize) -> ImageBuffer {
    let mut data = Vec::with_capacity(height * width * 3);
    for row in 0..height {
        for col in 0..width {
            let edge = if col < width / 3 { 220.0 } else { 30.0 };
            data.push(edge);
            data.push(((row * 31 + col * 17) % 256) as f64);
            data.push(if (row / 2 + col) % 2 == 0 { 250.0 } else { 5.0 });
        }
    }
    ImageBuffer::new(height, width, 3, data).unwrap()
}

pub(crate) fn calibrated_pattern(height: usize, width: usize) -> ImageBuffer {
    pattern_image(height, width)
        .with_pixels_per_degree(REFERENCE_PPD)
        .unwrap()
}

pub(crate) fn max_abs_diff(a: &ImageBuffer, b: &ImageBuffer) -> f64 {
    assert_eq!(a.dimensions(), b.dimensions());
    assert_eq!(a.channels(), b.channels());
    a.samples()
        .iter()
        .zip(b.samples())
        .map(|(x, y)| (x - y).abs())
        .fold(0.0, f64::max)
}

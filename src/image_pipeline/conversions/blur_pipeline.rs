use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{info, instrument, warn};

use crate::image_pipeline::{
    batch::BatchSampleGenerator,
    buffer::ImageBuffer,
    common::{BlurError, PipelineTimings, Result, Timer},
    conversions::BlurConfig,
    decode::{ImageReader, StandardImageReader},
    encode::{ImageWriter, OutputFormat, StandardImageWriter},
    filter::FilterEngine,
    foveation::compose_foveated,
};

/// One encoded level of a batch.
#[derive(Debug, Clone)]
pub struct EncodedSample {
    pub index: usize,
    pub cycles_per_degree: f64,
    pub bytes: Vec<u8>,
}

/// Decode → calibrate → filter → encode, with injected codecs.
pub struct BlurPipeline<R: ImageReader, W: ImageWriter> {
    reader: R,
    writer: W,
    engine: FilterEngine,
    config: BlurConfig,
}

impl BlurPipeline<StandardImageReader, StandardImageWriter> {
    /// Pipeline with the standard codecs, writing PNG.
    pub fn new(config: BlurConfig) -> Self {
        Self::with_custom(StandardImageReader::default(), StandardImageWriter::default(), config)
    }

    /// Pipeline whose writer encodes the format named by `output_path`'s extension.
    pub fn for_output<P: AsRef<Path>>(output_path: P, config: BlurConfig) -> Result<Self> {
        let format = OutputFormat::from_path(output_path.as_ref())?;
        Ok(Self::with_custom(
            StandardImageReader::default(),
            StandardImageWriter::new(format),
            config,
        ))
    }
}

impl<R: ImageReader, W: ImageWriter> BlurPipeline<R, W> {
    pub fn with_custom(reader: R, writer: W, config: BlurConfig) -> Self {
        let engine = FilterEngine::new(config.filter_config());
        Self {
            reader,
            writer,
            engine,
            config,
        }
    }

    fn validate_dimensions(&self, width: usize, height: usize) -> Result<()> {
        if !self.config.validate_dimensions {
            return Ok(());
        }

        if width == 0 || height == 0 {
            return Err(BlurError::InvalidDimensions(width, height));
        }

        if let Some(max) = self.config.max_dimension {
            if width > max || height > max {
                warn!("Image dimensions {}x{} exceed maximum {}", width, height, max);
                return Err(BlurError::InvalidDimensions(width, height));
            }
        }

        Ok(())
    }

    /// Decodes, validates and calibrates an input image.
    pub fn load(&self, input_data: &[u8], timings: &mut PipelineTimings) -> Result<ImageBuffer> {
        let timer = Timer::start("decode");
        let image = self.reader.read_image(input_data)?;
        timings.record(timer);

        let timer = Timer::start("validate_dimensions");
        self.validate_dimensions(image.width(), image.height())?;
        timings.record(timer);

        let timer = Timer::start("calibrate");
        let pixels_per_degree = self.config.geometry.pixels_per_degree()?;
        let image = image.with_pixels_per_degree(pixels_per_degree)?;
        timings.record(timer);

        Ok(image)
    }

    #[instrument(skip(self, input_data, output), fields(input_size = input_data.len()))]
    pub fn blur(&self, input_data: &[u8], cycles_per_degree: f64, output: &mut dyn Write) -> Result<()> {
        self.blur_with_timings(input_data, cycles_per_degree, output)
            .map(|_| ())
    }

    pub fn blur_with_timings(
        &self,
        input_data: &[u8],
        cycles_per_degree: f64,
        output: &mut dyn Write,
    ) -> Result<PipelineTimings> {
        let mut timings = PipelineTimings::new();
        info!("Applying filter of {:.2} cycles per degree", cycles_per_degree);

        let image = self.load(input_data, &mut timings)?;

        let timer = Timer::start("filter");
        let outcome = self
            .engine
            .apply_with_report(&image, cycles_per_degree, self.config.mode)?;
        timings.record(timer);
        if let Some(reason) = &outcome.report.fallback_reason {
            warn!("Filtered sequentially: {}", reason);
        }

        let timer = Timer::start("encode");
        self.writer.write_image(&outcome.image, output, &self.config)?;
        timings.record(timer);

        info!(
            "Blur complete: {}x{} in {:.3}ms",
            image.width(),
            image.height(),
            timings.total_duration().as_secs_f64() * 1000.0
        );
        Ok(timings)
    }

    #[instrument(skip(self, input_path, output_path))]
    pub fn blur_file<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input_path: P,
        cycles_per_degree: f64,
        output_path: Q,
    ) -> Result<PipelineTimings> {
        let input_path = input_path.as_ref();
        let output_path = output_path.as_ref();

        info!(
            input = %input_path.display(),
            output = %output_path.display(),
            "Blurring file"
        );

        let mut timings = PipelineTimings::new();
        let input_data = read_input(input_path, &mut timings)?;

        let mut encoded = Vec::new();
        let blur_timings = self.blur_with_timings(&input_data, cycles_per_degree, &mut encoded)?;
        timings.extend(&blur_timings);

        write_output(output_path, &encoded, &mut timings)?;
        Ok(timings)
    }

    /// Filters and encodes every level of a batch, sharpest first.
    #[instrument(skip(self, input_data), fields(input_size = input_data.len()))]
    pub fn batch(
        &self,
        input_data: &[u8],
        cycles_per_degree: f64,
        sample_count: usize,
    ) -> Result<Vec<EncodedSample>> {
        let mut timings = PipelineTimings::new();
        let image = self.load(input_data, &mut timings)?;
        let generator = BatchSampleGenerator::new(&self.engine, self.config.mode);

        let mut encoded = Vec::with_capacity(sample_count + 1);
        for sample in generator.samples(&image, cycles_per_degree, sample_count)? {
            let sample = sample?;
            let timer = Timer::start("encode");
            let mut bytes = Vec::new();
            self.writer.write_image(&sample.image, &mut bytes, &self.config)?;
            timings.record(timer);

            encoded.push(EncodedSample {
                index: sample.index,
                cycles_per_degree: sample.cycles_per_degree,
                bytes,
            });
        }

        info!(levels = encoded.len(), "Batch encoded");
        timings.log_summary();
        Ok(encoded)
    }

    /// Writes a batch into `output_dir`, creating it if needed, and returns
    /// the written paths in batch order.
    #[instrument(skip(self, input_path, output_dir))]
    pub fn batch_to_dir<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input_path: P,
        cycles_per_degree: f64,
        sample_count: usize,
        output_dir: Q,
    ) -> Result<Vec<PathBuf>> {
        let input_path = input_path.as_ref();
        let output_dir = output_dir.as_ref();

        let mut timings = PipelineTimings::new();
        let input_data = read_input(input_path, &mut timings)?;
        let samples = self.batch(&input_data, cycles_per_degree, sample_count)?;

        std::fs::create_dir_all(output_dir).map_err(|e| {
            BlurError::OutputWriteError(format!("{}: {}", output_dir.display(), e))
        })?;

        let stem = input_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("image");

        let mut written = Vec::new();
        for sample in samples {
            let path = output_dir.join(sample_file_name(
                stem,
                sample.index,
                sample.cycles_per_degree,
                self.writer.extension(),
            ));
            std::fs::write(&path, &sample.bytes)
                .map_err(|e| BlurError::OutputWriteError(format!("{}: {}", path.display(), e)))?;
            info!("Saved {}", path.display());
            written.push(path);
        }

        Ok(written)
    }

    /// Builds a batch and composites it around `fixation` (`(x, y)` pixels).
    #[instrument(skip(self, input_data, output), fields(input_size = input_data.len()))]
    pub fn foveate(
        &self,
        input_data: &[u8],
        cycles_per_degree: f64,
        sample_count: usize,
        fixation: (usize, usize),
        output: &mut dyn Write,
    ) -> Result<()> {
        let mut timings = PipelineTimings::new();
        let image = self.load(input_data, &mut timings)?;

        let timer = Timer::start("batch");
        let levels = BatchSampleGenerator::new(&self.engine, self.config.mode).generate_batch(
            &image,
            cycles_per_degree,
            sample_count,
        )?;
        timings.record(timer);

        let timer = Timer::start("composite");
        let composite = compose_foveated(&levels, fixation, &self.config.foveation)?;
        timings.record(timer);

        let timer = Timer::start("encode");
        self.writer.write_image(&composite, output, &self.config)?;
        timings.record(timer);

        timings.log_summary();
        Ok(())
    }

    pub fn foveate_file<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input_path: P,
        cycles_per_degree: f64,
        sample_count: usize,
        fixation: (usize, usize),
        output_path: Q,
    ) -> Result<()> {
        let mut timings = PipelineTimings::new();
        let input_data = read_input(input_path.as_ref(), &mut timings)?;

        let mut encoded = Vec::new();
        self.foveate(&input_data, cycles_per_degree, sample_count, fixation, &mut encoded)?;

        write_output(output_path.as_ref(), &encoded, &mut timings)
    }

    pub fn engine(&self) -> &FilterEngine {
        &self.engine
    }

    pub fn config(&self) -> &BlurConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: BlurConfig) {
        self.engine = FilterEngine::new(config.filter_config());
        self.config = config;
    }
}

/// `<stem>_<index>_<cpd>cpd.<ext>`, e.g. `scene_03_12.50cpd.png`.
pub fn sample_file_name(stem: &str, index: usize, cycles_per_degree: f64, extension: &str) -> String {
    format!("{stem}_{index:02}_{cycles_per_degree:.2}cpd.{extension}")
}

fn read_input(path: &Path, timings: &mut PipelineTimings) -> Result<Vec<u8>> {
    let timer = Timer::start("read_input_file");
    let data = std::fs::read(path)
        .map_err(|e| BlurError::InputReadError(format!("{}: {}", path.display(), e)))?;
    timings.record(timer);
    Ok(data)
}

/// Writes fully encoded output; the destination is only touched once
/// every earlier stage has succeeded.
fn write_output(path: &Path, encoded: &[u8], timings: &mut PipelineTimings) -> Result<()> {
    let timer = Timer::start("write_output_file");
    std::fs::write(path, encoded)
        .map_err(|e| BlurError::OutputWriteError(format!("{}: {}", path.display(), e)))?;
    timings.record(timer);
    Ok(())
}

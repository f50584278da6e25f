use crate::{AudioDevice, CoreError, CoreResult, SessionCommand, peak_db};

use std::{
    fs,
    panic::Location,
    path::{Path, PathBuf},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
        mpsc as std_mpsc,
    },
    time::Duration,
};

use cpal::{
    Device, Stream, StreamConfig,
    traits::{DeviceTrait, HostTrait, StreamTrait},
};
use error_location::ErrorLocation;
use hound::{SampleFormat, WavSpec, WavWriter};
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument, warn};

/// Default capture length handed to the recognition service.
pub const DEFAULT_RECORD_DURATION: Duration = Duration::from_secs(10);

/// Prefix of every artifact file name.
const ARTIFACT_FILE_PREFIX: &str = "song-sleuth-capture";

/// Peak readings are reported once per this much audio.
pub(crate) const PEAK_INTERVAL_MS: usize = 100;

/// Records a fixed-length clip from the default input device into a WAV file.
///
/// The cpal callback only forwards sample blocks; a writer thread computes
/// peak levels, encodes the artifact and posts session commands.
pub struct CpalRecorder {
    device: Device,
    config: StreamConfig,
    stream: Option<Stream>,
    /// Set to abandon the in-flight capture. A fresh flag is created per
    /// capture so a late writer thread can never report into a newer session.
    cancelled: Option<Arc<AtomicBool>>,
    artifact_dir: PathBuf,
    /// Each capture writes its own file, so a late writer cleaning up after a
    /// cancel never touches a newer capture's artifact.
    capture_seq: u64,
    artifact_path: PathBuf,
    record_duration: Duration,
    events: mpsc::Sender<SessionCommand>,
}

impl CpalRecorder {
    /// Open the default input device. Artifacts are written into
    /// `artifact_dir`.
    #[track_caller]
    #[instrument(skip(events))]
    pub fn new(
        artifact_dir: PathBuf,
        record_duration: Duration,
        events: mpsc::Sender<SessionCommand>,
    ) -> CoreResult<Self> {
        let host = cpal::default_host();

        let device = host
            .default_input_device()
            .ok_or(CoreError::NoMicrophoneFound {
                location: ErrorLocation::from(Location::caller()),
            })?;

        let config = device
            .default_input_config()
            .map_err(|e| CoreError::DeviceError {
                reason: format!("Failed to get config: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        info!(
            device_id = ?device.id(),
            sample_rate = config.sample_rate(),
            channels = config.channels(),
            "CpalRecorder initialized"
        );

        Ok(Self {
            device,
            config: config.into(),
            stream: None,
            cancelled: None,
            artifact_path: artifact_path_for(&artifact_dir, 0),
            artifact_dir,
            capture_seq: 0,
            record_duration,
            events,
        })
    }

    fn release_stream(&mut self) {
        if let Some(stream) = self.stream.take() {
            drop(stream);
            debug!("Audio stream released");
        }
    }
}

impl AudioDevice for CpalRecorder {
    #[track_caller]
    #[instrument(skip(self))]
    fn start(&mut self) -> CoreResult<()> {
        if self.stream.is_some() {
            return Err(CoreError::DeviceError {
                reason: "Capture already running".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        // The controller only starts from idle, so the previous artifact has
        // already been submitted or abandoned.
        if self.artifact_path.exists() {
            if let Err(e) = fs::remove_file(&self.artifact_path) {
                debug!(error = %e, artifact_path = ?self.artifact_path, "Previous artifact not removed");
            }
        }
        self.capture_seq += 1;
        self.artifact_path = artifact_path_for(&self.artifact_dir, self.capture_seq);

        let cancelled = Arc::new(AtomicBool::new(false));
        let (chunk_tx, chunk_rx) = std_mpsc::channel::<Vec<f32>>();

        let job = CaptureJob {
            spec: WavSpec {
                channels: self.config.channels,
                sample_rate: self.config.sample_rate,
                bits_per_sample: 16,
                sample_format: SampleFormat::Int,
            },
            target_samples: target_samples(
                self.config.sample_rate,
                self.config.channels,
                self.record_duration,
            ),
            artifact_path: self.artifact_path.clone(),
            cancelled: Arc::clone(&cancelled),
            events: self.events.clone(),
        };

        std::thread::Builder::new()
            .name("capture-writer".to_string())
            .spawn(move || run_capture_worker(job, chunk_rx))
            .map_err(|e| CoreError::DeviceError {
                reason: format!("Failed to spawn writer thread: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        // On any failure below the sender is dropped with the closure, and the
        // flag keeps the writer from reporting a failure nobody asked for.
        let stream = self
            .device
            .build_input_stream(
                &self.config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    // Receiver gone means the writer finished; nothing to do.
                    let _ = chunk_tx.send(data.to_vec());
                },
                |err| {
                    error!("Audio stream error: {}", err);
                },
                None,
            )
            .map_err(|e| {
                cancelled.store(true, Ordering::Release);
                CoreError::DeviceError {
                    reason: format!("Failed to build stream: {}", e),
                    location: ErrorLocation::from(Location::caller()),
                }
            })?;

        stream.play().map_err(|e| {
            cancelled.store(true, Ordering::Release);
            CoreError::DeviceError {
                reason: format!("Failed to start stream: {}", e),
                location: ErrorLocation::from(Location::caller()),
            }
        })?;

        self.stream = Some(stream);
        self.cancelled = Some(cancelled);

        info!(
            duration_ms = self.record_duration.as_millis(),
            artifact_path = ?self.artifact_path,
            "Audio capture started"
        );

        Ok(())
    }

    #[instrument(skip(self))]
    fn cancel(&mut self) -> CoreResult<()> {
        // Flag first so the writer discards the partial file instead of
        // reporting an early end of stream.
        if let Some(cancelled) = self.cancelled.take() {
            cancelled.store(true, Ordering::Release);
        }
        self.release_stream();

        info!("Audio capture cancelled");

        Ok(())
    }

    #[instrument(skip(self))]
    fn stop(&mut self) -> CoreResult<()> {
        self.cancelled = None;
        self.release_stream();

        info!("Audio capture stopped");

        Ok(())
    }

    fn artifact_path(&self) -> &Path {
        &self.artifact_path
    }
}

/// Everything the writer thread needs for one capture.
pub(crate) struct CaptureJob {
    pub(crate) spec: WavSpec,
    pub(crate) target_samples: usize,
    pub(crate) artifact_path: PathBuf,
    pub(crate) cancelled: Arc<AtomicBool>,
    pub(crate) events: mpsc::Sender<SessionCommand>,
}

impl CaptureJob {
    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    fn discard_artifact(&self) {
        if let Err(e) = fs::remove_file(&self.artifact_path) {
            debug!(error = %e, artifact_path = ?self.artifact_path, "No partial artifact to remove");
        }
    }

    fn fail(&self, reason: String) {
        self.discard_artifact();

        if self.is_cancelled() {
            return;
        }

        error!(reason = %reason, "Capture failed");
        if self
            .events
            .blocking_send(SessionCommand::CaptureFailed { reason })
            .is_err()
        {
            warn!("Session controller gone, capture failure dropped");
        }
    }
}

/// Artifact path for the `seq`-th capture of this process.
pub(crate) fn artifact_path_for(dir: &Path, seq: u64) -> PathBuf {
    dir.join(format!(
        "{}-{}-{}.wav",
        ARTIFACT_FILE_PREFIX,
        std::process::id(),
        seq
    ))
}

/// Interleaved sample count for `duration` of audio.
pub(crate) fn target_samples(sample_rate: u32, channels: u16, duration: Duration) -> usize {
    let per_second = sample_rate as usize * usize::from(channels);
    let samples = per_second as u128 * duration.as_millis() / 1000;
    usize::try_from(samples).unwrap_or(usize::MAX).max(1)
}

/// Drain sample blocks into the artifact, reporting peaks and the outcome.
///
/// Posts exactly one terminal command (`RecordingComplete` or `CaptureFailed`)
/// unless the job was cancelled, in which case it posts nothing and removes
/// the partial file.
pub(crate) fn run_capture_worker(job: CaptureJob, chunks: std_mpsc::Receiver<Vec<f32>>) {
    let mut writer = match WavWriter::create(&job.artifact_path, job.spec) {
        Ok(writer) => writer,
        Err(e) => {
            return job.fail(format!("Failed to create {:?}: {}", job.artifact_path, e));
        }
    };

    let peak_window = (job.spec.sample_rate as usize * usize::from(job.spec.channels)
        * PEAK_INTERVAL_MS
        / 1000)
        .max(1);
    let mut window: Vec<f32> = Vec::with_capacity(peak_window);
    let mut written = 0usize;

    while let Ok(chunk) = chunks.recv() {
        if job.is_cancelled() {
            drop(writer);
            job.discard_artifact();
            debug!(written, "Capture abandoned");
            return;
        }

        for &sample in chunk.iter().take(job.target_samples - written) {
            if let Err(e) = writer.write_sample(to_pcm16(sample)) {
                drop(writer);
                return job.fail(format!("Failed to write sample: {}", e));
            }
            written += 1;

            window.push(sample);
            if window.len() >= peak_window {
                // UI feedback only; a full channel just skips a frame.
                let _ = job
                    .events
                    .try_send(SessionCommand::PeakChanged(peak_db(&window)));
                window.clear();
            }
        }

        if written >= job.target_samples {
            if let Err(e) = writer.finalize() {
                return job.fail(format!("Failed to finalize artifact: {}", e));
            }

            if job.is_cancelled() {
                job.discard_artifact();
                return;
            }

            info!(written, artifact_path = ?job.artifact_path, "Capture written");

            if job
                .events
                .blocking_send(SessionCommand::RecordingComplete)
                .is_err()
            {
                warn!("Session controller gone, capture completion dropped");
            }
            return;
        }
    }

    drop(writer);
    job.fail(format!(
        "Audio stream ended after {} of {} samples",
        written, job.target_samples
    ));
}

fn to_pcm16(sample: f32) -> i16 {
    let clamped = if sample.is_finite() {
        sample.clamp(-1.0, 1.0)
    } else {
        0.0
    };
    (clamped * f32::from(i16::MAX)) as i16
}

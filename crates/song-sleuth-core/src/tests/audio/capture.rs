use crate::{
    SessionCommand,
    audio::capture::{CaptureJob, artifact_path_for, run_capture_worker, target_samples},
};

use std::{
    path::PathBuf,
    sync::{Arc, atomic::AtomicBool, mpsc as std_mpsc},
    time::Duration,
};

use hound::{SampleFormat, WavReader, WavSpec};
use tokio::sync::mpsc;

const RATE: u32 = 8_000;

fn job(
    artifact_path: PathBuf,
    target: usize,
    cancelled: bool,
) -> (CaptureJob, mpsc::Receiver<SessionCommand>) {
    let (events, events_rx) = mpsc::channel(64);
    let job = CaptureJob {
        spec: WavSpec {
            channels: 1,
            sample_rate: RATE,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        },
        target_samples: target,
        artifact_path,
        cancelled: Arc::new(AtomicBool::new(cancelled)),
        events,
    };
    (job, events_rx)
}

fn drain(rx: &mut mpsc::Receiver<SessionCommand>) -> Vec<SessionCommand> {
    let mut commands = Vec::new();
    while let Ok(command) = rx.try_recv() {
        commands.push(command);
    }
    commands
}

/// WHAT: Sample targets scale with rate, channels and duration
/// WHY: The clip length handed to recognition depends on it
#[test]
fn given_stream_formats_when_computing_target_then_interleaved_count() {
    // Given/When/Then: Stereo, mono and degenerate durations
    assert_eq!(target_samples(48_000, 2, Duration::from_secs(10)), 960_000);
    assert_eq!(target_samples(RATE, 1, Duration::from_millis(250)), 2_000);
    assert_eq!(target_samples(44_100, 1, Duration::ZERO), 1);
}

/// WHAT: A full capture writes the clip, reports peaks, then completes
/// WHY: Exactly one terminal command per capture, after the artifact exists
#[test]
#[allow(clippy::unwrap_used)]
fn given_enough_samples_when_capturing_then_artifact_written_and_completion_posted() {
    // Given: A 2000-sample job fed more than enough audio at half scale
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clip.wav");
    let (job, mut events) = job(path.clone(), 2_000, false);
    let (tx, rx) = std_mpsc::channel();
    for _ in 0..6 {
        tx.send(vec![0.5f32; 500]).unwrap();
    }
    drop(tx);

    // When: The worker drains the blocks
    run_capture_worker(job, rx);

    // Then: Two peak readings (one per 800 samples), then completion
    let commands = drain(&mut events);
    assert_eq!(commands.len(), 3);
    for command in &commands[..2] {
        let SessionCommand::PeakChanged(peak) = command else {
            unreachable!("expected a peak, got {command:?}");
        };
        assert!((peak - (-6.0206)).abs() < 1e-3);
    }
    assert!(matches!(commands[2], SessionCommand::RecordingComplete));

    // Then: The artifact holds exactly the target sample count
    let reader = WavReader::open(&path).unwrap();
    assert_eq!(reader.spec().sample_rate, RATE);
    assert_eq!(reader.len(), 2_000);
}

/// WHAT: A stream that ends early reports a capture failure
/// WHY: A truncated clip must never be submitted for recognition
#[test]
#[allow(clippy::unwrap_used)]
fn given_stream_ending_early_when_capturing_then_failure_posted_and_file_removed() {
    // Given: A job that only receives 100 of 2000 samples
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clip.wav");
    let (job, mut events) = job(path.clone(), 2_000, false);
    let (tx, rx) = std_mpsc::channel();
    tx.send(vec![0.1f32; 100]).unwrap();
    drop(tx);

    // When: The worker runs
    run_capture_worker(job, rx);

    // Then: One failure, no completion, no file left behind
    let commands = drain(&mut events);
    assert!(matches!(
        commands.as_slice(),
        [SessionCommand::CaptureFailed { reason }] if reason.contains("100 of 2000")
    ));
    assert!(!path.exists());
}

/// WHAT: A cancelled capture posts nothing and leaves no file
/// WHY: Cancel must not produce a late completion or failure
#[test]
#[allow(clippy::unwrap_used)]
fn given_cancelled_job_when_samples_arrive_then_nothing_posted() {
    // Given: A job cancelled before its first block
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clip.wav");
    let (job, mut events) = job(path.clone(), 2_000, true);
    let (tx, rx) = std_mpsc::channel();
    tx.send(vec![0.5f32; 4_000]).unwrap();
    drop(tx);

    // When: The worker runs
    run_capture_worker(job, rx);

    // Then: Silence, and the partial artifact is gone
    assert!(drain(&mut events).is_empty());
    assert!(!path.exists());
}

/// WHAT: Consecutive captures get distinct artifact paths in the same directory
/// WHY: A cancelled capture's cleanup must never hit a newer capture's file
#[test]
fn given_consecutive_captures_when_naming_artifacts_then_paths_differ() {
    // Given: One artifact directory
    let dir = std::env::temp_dir();

    // When: Naming two consecutive captures
    let first = artifact_path_for(&dir, 1);
    let second = artifact_path_for(&dir, 2);

    // Then: Same directory, different files
    assert_ne!(first, second);
    assert_eq!(first.parent(), Some(dir.as_path()));
    assert_eq!(second.parent(), Some(dir.as_path()));
}

/// WHAT: A cancelled writer only removes its own artifact
/// WHY: A late cleanup must leave the next capture's recording intact
#[test]
#[allow(clippy::unwrap_used)]
fn given_cancelled_writer_and_newer_capture_when_cleaning_up_then_newer_artifact_kept() {
    // Given: A newer capture's artifact already on disk
    let dir = tempfile::tempdir().unwrap();
    let newer = artifact_path_for(dir.path(), 2);
    std::fs::write(&newer, b"RIFF").unwrap();

    // Given: The older capture, cancelled, still draining a block
    let older = artifact_path_for(dir.path(), 1);
    let (job, mut events) = job(older.clone(), 2_000, true);
    let (tx, rx) = std_mpsc::channel();
    tx.send(vec![0.5f32; 100]).unwrap();
    drop(tx);

    // When: The older writer wakes up and cleans up
    run_capture_worker(job, rx);

    // Then: Only the older artifact is gone
    assert!(drain(&mut events).is_empty());
    assert!(!older.exists());
    assert!(newer.exists());
}

/// WHAT: An unwritable artifact path fails the capture
/// WHY: Disk errors surface as a capture failure, not a hang
#[test]
#[allow(clippy::unwrap_used)]
fn given_unwritable_path_when_capturing_then_failure_posted() {
    // Given: A path inside a directory that does not exist
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("clip.wav");
    let (job, mut events) = job(path, 10, false);
    let (_tx, rx) = std_mpsc::channel::<Vec<f32>>();

    // When: The worker runs
    run_capture_worker(job, rx);

    // Then: A single failure
    assert!(matches!(
        drain(&mut events).as_slice(),
        [SessionCommand::CaptureFailed { .. }]
    ));
}

/// WHAT: The default microphone records a short clip end to end
/// WHY: Exercises the real cpal stream; needs an input device
#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
#[allow(clippy::unwrap_used)]
fn given_default_microphone_when_recording_then_completion_posted() {
    use crate::{AudioDevice, CpalRecorder};

    // Given: A recorder writing a quarter-second clip
    let dir = tempfile::tempdir().unwrap();
    let (events, mut events_rx) = mpsc::channel(64);
    let mut recorder =
        CpalRecorder::new(dir.path().to_path_buf(), Duration::from_millis(250), events).unwrap();

    // When: Recording until the worker reports back
    recorder.start().unwrap();
    let terminal = loop {
        match events_rx.blocking_recv().unwrap() {
            SessionCommand::PeakChanged(_) => continue,
            other => break other,
        }
    };
    recorder.stop().unwrap();

    // Then: Completion and a readable artifact
    assert!(matches!(terminal, SessionCommand::RecordingComplete));
    assert!(recorder.artifact_path().starts_with(dir.path()));
    assert!(WavReader::open(recorder.artifact_path()).unwrap().len() > 0);
}

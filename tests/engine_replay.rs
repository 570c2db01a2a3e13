//! End-to-end replay of a captured frame stream through the public API

use std::fs;
use std::io::Write;

use iss_bridge::config::{EngineConfig, SourceConfig, TelemetryConfig};
use iss_bridge::frame::encoder::{encode_barometer_frame, encode_sensor_frame};
use iss_bridge::frame::protocol::FrameType;
use iss_bridge::runner::Runner;
use iss_bridge::source::{FrameSource, LogFileSource};
use iss_bridge::station::assembler::PacketAssembler;
use iss_bridge::telemetry::JsonlObservationLogger;
use tempfile::tempdir;

/// Ten minutes of a station reporting every ten seconds
fn capture_lines(start_secs: i64) -> Vec<(i64, String)> {
    let mut lines = Vec::new();
    let mut rain_ticks: u8 = 126;

    for minute in 0..10 {
        let base = start_secs + minute * 60;
        let barometer = encode_barometer_frame(FrameType::StationBarometer, 97650);
        lines.push((base, barometer.to_line()));

        let payloads = [
            [0x80, 0x05, 0x40, 0x2A, 0x80, 0x00],
            [0xA0, 0x05, 0x40, 0xF4, 0x10, 0x00],
            [0x90, 0x05, 0x40, 0x0A, 0x00, 0x00],
            [0xE0, 0x05, 0x40, rain_ticks, 0x00, 0x00],
        ];
        for (offset, payload) in (10..).step_by(10).zip(payloads) {
            lines.push((base + offset, encode_sensor_frame(payload).to_line()));
        }
        // Corrupted in transit
        lines.push((base + 50, "I 100 80 05 40 2A 80 00 00 00 -54".to_string()));

        rain_ticks = (rain_ticks + 1) & 0x7F;
    }

    lines
}

#[test]
fn test_replay_emits_one_observation_per_minute() {
    let start = 1_700_000_040;
    let mut assembler = PacketAssembler::new(&EngineConfig::default());

    let observations: Vec<_> = capture_lines(start)
        .iter()
        .filter_map(|(ts, line)| assembler.decode_line(line, *ts))
        .collect();

    // The last minute stays open
    assert_eq!(observations.len(), 9);
    for (i, obs) in observations.iter().enumerate() {
        assert_eq!(obs.date_time, start + i as i64 * 60);
        assert_eq!(obs.date_time % 60, 0);
        assert_eq!(obs.wind_speed, Some(2.24));
        assert_eq!(obs.wind_direction, Some(90.0));
        assert_eq!(obs.outside_temperature, Some(20.0));
        assert_eq!(obs.outside_humidity, Some(51.0));
        assert_eq!(obs.dew_point, Some(9.4));
        assert_eq!(obs.wind_gust, Some(4.47));
    }

    // First rain frame is the baseline; one tip per minute after that,
    // across the 127 -> 0 wrap
    assert_eq!(observations[0].rain, Some(0.0));
    for obs in &observations[1..] {
        assert_eq!(obs.rain, Some(0.2001));
    }
    assert_eq!(observations[8].rain_accumulated, Some(1.6008));

    let stats = assembler.stats();
    assert_eq!(stats.frames, 60);
    assert_eq!(stats.crc_failures, 10);
    assert_eq!(stats.observations, 9);
}

#[tokio::test]
async fn test_runner_with_file_source_and_jsonl_log() {
    let dir = tempdir().unwrap();
    let frame_log = dir.path().join("frames.log");
    let cursor_file = dir.path().join("cursor.json");
    let log_dir = dir.path().join("observations");

    let start = 1_700_000_040;
    let mut file = fs::File::create(&frame_log).unwrap();
    for (ts, line) in capture_lines(start) {
        writeln!(file, "{} {}", ts * 1000, line).unwrap();
    }
    file.flush().unwrap();

    let source_config = SourceConfig {
        frame_log: frame_log.to_string_lossy().into_owned(),
        cursor_file: cursor_file.to_string_lossy().into_owned(),
        ..Default::default()
    };
    let telemetry_config = TelemetryConfig {
        log_dir: log_dir.to_string_lossy().into_owned(),
        ..Default::default()
    };

    let logger = JsonlObservationLogger::new(&telemetry_config).unwrap();
    let mut runner = Runner::new(
        LogFileSource::from_config(&source_config),
        &EngineConfig::default(),
        source_config.clone(),
    )
    .with_sink(Box::new(logger));

    assert_eq!(runner.warm_up().await.unwrap(), 0);
    let observations = runner.poll_once().await.unwrap();
    assert_eq!(observations.len(), 9);

    let last_ms = (start + 9 * 60 + 50) * 1000;
    assert_eq!(runner.cursor(), last_ms);
    assert!(runner.poll_once().await.unwrap().is_empty());

    let mut source = LogFileSource::from_config(&source_config);
    assert_eq!(source.load_cursor().await.unwrap(), last_ms);

    let log_file = log_dir.join("observations_20231114_221400.jsonl");
    let content = fs::read_to_string(log_file).unwrap();
    assert_eq!(content.lines().count(), 9);

    let first: serde_json::Value = serde_json::from_str(content.lines().next().unwrap()).unwrap();
    assert_eq!(first["dateTime"], start);
    assert_eq!(first["usUnits"], 17);
    assert_eq!(first["interval"], 1);
}

#[tokio::test]
async fn test_restart_resumes_after_cursor() {
    let dir = tempdir().unwrap();
    let frame_log = dir.path().join("frames.log");

    let start = 1_700_000_040;
    let lines = capture_lines(start);
    let (first_half, second_half) = lines.split_at(30);

    let write = |lines: &[(i64, String)]| {
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&frame_log)
            .unwrap();
        for (ts, line) in lines {
            writeln!(file, "{} {}", ts * 1000, line).unwrap();
        }
    };

    let source_config = SourceConfig {
        frame_log: frame_log.to_string_lossy().into_owned(),
        cursor_file: dir.path().join("cursor.json").to_string_lossy().into_owned(),
        ..Default::default()
    };

    write(first_half);
    let mut runner = Runner::new(
        LogFileSource::from_config(&source_config),
        &EngineConfig::default(),
        source_config.clone(),
    );
    runner.warm_up().await.unwrap();
    let before: Vec<_> = runner.poll_once().await.unwrap();
    assert_eq!(before.len(), 4);

    // A fresh process primes from history, then continues where the first stopped
    write(second_half);
    let mut runner = Runner::new(
        LogFileSource::from_config(&source_config),
        &EngineConfig::default(),
        source_config,
    );
    assert_eq!(runner.warm_up().await.unwrap(), 30);
    let after = runner.poll_once().await.unwrap();

    let minutes: Vec<_> = before.iter().chain(&after).map(|o| o.date_time).collect();
    let expected: Vec<_> = (0..9).map(|m| start + m * 60).collect();
    assert_eq!(minutes, expected);
    assert_eq!(after[0].outside_temperature, Some(20.0));
}

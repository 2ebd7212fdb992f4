//! Video information used by the statistics: duration and recording start.
//!
//! Recordings are commonly named `YYYYMMDD_HHMMSS_<camera>.<ext>`. When the
//! detector stamps its events with wall-clock time, that prefix is the
//! instant subtracted from every event to bring it back to video time.

use std::path::Path;

use chrono::NaiveDateTime;
use ffprobe::{FfProbeError, ffprobe};
use log::{debug, info};

use crate::config::StartTimestamp;
use crate::error::{CoreError, CoreResult};
use crate::time::Timestamp;

const FILE_NAME_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Duration and detected start of a video.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoInfo {
    pub duration: Timestamp,
    pub start_timestamp: Option<NaiveDateTime>,
}

/// Parses the `YYYYMMDD_HHMMSS_` prefix of a file name.
pub fn start_timestamp_from_filename(path: &Path) -> Option<NaiveDateTime> {
    let name = path.file_name()?.to_str()?;
    let (date, rest) = name.split_once('_')?;
    let (time, _) = rest.split_once('_')?;
    let is_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !is_digits(date) || !is_digits(time) {
        return None;
    }
    NaiveDateTime::parse_from_str(&format!("{date}_{time}"), FILE_NAME_TIMESTAMP_FORMAT).ok()
}

/// Reads the container duration with ffprobe.
pub fn probe_video(path: &Path) -> CoreResult<VideoInfo> {
    debug!("Running ffprobe for duration on: {}", path.display());
    let metadata = ffprobe(path).map_err(|e| map_ffprobe_error(e, path))?;

    let seconds = metadata
        .format
        .duration
        .as_deref()
        .and_then(|d| d.trim().parse::<f64>().ok())
        .ok_or_else(|| {
            CoreError::Probe(format!("no duration reported for {}", path.display()))
        })?;

    let info = VideoInfo {
        duration: Timestamp::from_seconds(seconds),
        start_timestamp: start_timestamp_from_filename(path),
    };
    debug!("Video {} lasts {}", path.display(), info.duration);
    Ok(info)
}

fn map_ffprobe_error(err: FfProbeError, path: &Path) -> CoreError {
    match err {
        FfProbeError::Io(io_err) => {
            CoreError::Probe(format!("failed to start ffprobe on {}: {io_err}", path.display()))
        }
        FfProbeError::Status(output) => CoreError::Probe(format!(
            "ffprobe exited with {} on {}: {}",
            output.status,
            path.display(),
            String::from_utf8_lossy(&output.stderr).trim()
        )),
        FfProbeError::Deserialize(err) => CoreError::Probe(format!(
            "unreadable ffprobe output for {}: {err}",
            path.display()
        )),
        // FfProbeError is non_exhaustive
        other => CoreError::Probe(format!("ffprobe failed on {}: {other:?}", path.display())),
    }
}

/// Offset subtracted from detection stamps.
///
/// A fixed offset wins. Otherwise the video file name prefix is used, read
/// as UTC, and without one the offset is zero.
pub fn resolve_start_offset(start: StartTimestamp, video: Option<&Path>) -> Timestamp {
    match start {
        StartTimestamp::Fixed(ms) => Timestamp::from_millis(ms),
        StartTimestamp::FromVideoName => {
            match video.and_then(start_timestamp_from_filename) {
                Some(start) => {
                    info!("Video is considered to start at {start}");
                    Timestamp::from_millis(start.and_utc().timestamp_millis())
                }
                None => Timestamp::ZERO,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_start_timestamp_from_filename() {
        let expected = NaiveDate::from_ymd_opt(2014, 6, 12)
            .and_then(|d| d.and_hms_opt(8, 30, 15))
            .unwrap();
        assert_eq!(
            start_timestamp_from_filename(Path::new("/videos/20140612_083015_cam1.mp4")),
            Some(expected)
        );
    }

    #[test]
    fn test_start_timestamp_requires_prefix() {
        for name in [
            "cam1.mp4",
            "20140612_083015.mp4",
            "2014061x_083015_cam1.mp4",
            "20141312_083015_cam1.mp4",
            "_083015_cam1.mp4",
        ] {
            assert_eq!(start_timestamp_from_filename(Path::new(name)), None, "{name}");
        }
    }

    #[test]
    fn test_resolve_start_offset() {
        let video = Path::new("19700101_000010_cam.avi");
        assert_eq!(
            resolve_start_offset(StartTimestamp::FromVideoName, Some(video)).as_millis(),
            10_000
        );
        assert_eq!(
            resolve_start_offset(StartTimestamp::Fixed(500), Some(video)).as_millis(),
            500
        );
        assert_eq!(
            resolve_start_offset(StartTimestamp::FromVideoName, None),
            Timestamp::ZERO
        );
        assert_eq!(
            resolve_start_offset(StartTimestamp::FromVideoName, Some(Path::new("cam.avi"))),
            Timestamp::ZERO
        );
    }

    #[test]
    fn test_probe_missing_video_fails() {
        let result = probe_video(Path::new("/definitely/not/here.mp4"));
        assert!(matches!(result, Err(CoreError::Probe(_))));
    }

    #[test]
    fn test_ffprobe_errors_map_to_probe() {
        let path = Path::new("clip.mp4");
        let err = map_ffprobe_error(
            FfProbeError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "no ffprobe")),
            path,
        );
        assert!(matches!(err, CoreError::Probe(ref m) if m.contains("clip.mp4") && m.contains("no ffprobe")));

        let json_err = serde_json::from_str::<u32>("x").unwrap_err();
        let err = map_ffprobe_error(FfProbeError::Deserialize(json_err), path);
        assert!(matches!(err, CoreError::Probe(ref m) if m.starts_with("unreadable ffprobe output")));
    }
}

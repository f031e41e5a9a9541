use crate::annotations::detection::summarize;
use crate::config::{SourceMode, ViewerConfig};
use crate::display::{FrameSink, KeyPress, KeyWait};
use crate::error::ViewerError;
use crate::frame_acquisition::frame_source::{FrameSource, open_source};
use crate::object_detection::detector_adapter::DetectorAdapter;
use crate::object_detection::object_detection_model::ObjectDetectionModel;
use crate::overlay::renderer::{font_scale, render};
use crate::source_selection::source_selector::SourceSelector;
use std::time::Duration;

/// How long video mode waits for a key after each frame.
pub const VIDEO_KEY_POLL: Duration = Duration::from_millis(1);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriverState {
    Running,
    Stopped,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    /// The source ran out of frames.
    EndOfStream,
    /// ESC was pressed (or the window closed) in video mode.
    Cancelled,
    /// The single image was shown and a key was pressed.
    Acknowledged,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunSummary {
    pub frames_rendered: usize,
    pub stop_reason: StopReason,
}

/// Pulls frames, detects, renders and displays them until told to stop.
///
/// Every exit from `run`, including errors, releases the frame source and
/// closes the sink before returning.
pub struct Driver<M, K> {
    detector: DetectorAdapter<M>,
    sink: K,
    state: DriverState,
}

impl<M: ObjectDetectionModel, K: FrameSink> Driver<M, K> {
    pub fn new(detector: DetectorAdapter<M>, sink: K) -> Self {
        Driver {
            detector,
            sink,
            state: DriverState::Stopped,
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> DriverState {
        self.state
    }

    #[cfg(test)]
    pub fn sink(&self) -> &K {
        &self.sink
    }

    pub fn run(
        &mut self,
        source: &mut dyn FrameSource,
        mode: SourceMode,
    ) -> Result<RunSummary, ViewerError> {
        self.state = DriverState::Running;
        let outcome = self.run_loop(source, mode);
        self.state = DriverState::Stopped;
        source.release();
        self.sink.close();
        match &outcome {
            Ok(summary) => log::info!(
                "stopped after {} frames ({:?})",
                summary.frames_rendered,
                summary.stop_reason
            ),
            Err(e) => log::error!("stopped on error: {}", e),
        }
        outcome
    }

    fn run_loop(
        &mut self,
        source: &mut dyn FrameSource,
        mode: SourceMode,
    ) -> Result<RunSummary, ViewerError> {
        let wait = match mode {
            SourceMode::Image => KeyWait::Forever,
            SourceMode::Video => KeyWait::Poll(VIDEO_KEY_POLL),
        };
        let mut frames_rendered = 0;
        let mut stop_reason = StopReason::EndOfStream;
        while self.state == DriverState::Running {
            let Some(mut frame) = source.next_frame() else {
                stop_reason = StopReason::EndOfStream;
                self.state = DriverState::Stopped;
                continue;
            };
            let detections = self.detector.detect(&frame)?;
            log::debug!("frame {}: {}", frames_rendered, summarize(&detections));
            let scale = font_scale(frame.width());
            render(&mut frame, &detections, scale);
            frames_rendered += 1;

            let key = self.sink.show(&frame, wait)?;
            match mode {
                SourceMode::Image => {
                    stop_reason = StopReason::Acknowledged;
                    self.state = DriverState::Stopped;
                }
                SourceMode::Video if key == Some(KeyPress::Escape) => {
                    stop_reason = StopReason::Cancelled;
                    self.state = DriverState::Stopped;
                }
                SourceMode::Video => {}
            }
        }
        Ok(RunSummary {
            frames_rendered,
            stop_reason,
        })
    }
}

/// Picks a source from the configured dataset, opens it and runs it to completion.
///
/// Nothing reaches the detector when no source can be selected or opened.
pub fn run_session<M: ObjectDetectionModel, K: FrameSink>(
    config: &ViewerConfig,
    model: M,
    sink: K,
) -> Result<RunSummary, ViewerError> {
    let mut selector = SourceSelector::from_config(config);
    let path = selector.select()?;
    let mut source = open_source(&path, config)?;
    let mut driver = Driver::new(DetectorAdapter::new(model), sink);
    driver.run(source.as_mut(), config.mode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SourceOrientation;
    use crate::display::file_sink::FileSink;
    use crate::frame_acquisition::capture_stream::tests::SyntheticStream;
    use crate::frame_acquisition::frame_source::{ImageFrameSource, VideoFrameSource};
    use crate::object_detection::detector_adapter::tests::StubModel;
    use crate::overlay::renderer::OVERLAY_COLOR;
    use image::RgbImage;
    use std::collections::VecDeque;

    /// Keeps every frame it is shown and answers with scripted key presses.
    #[derive(Default)]
    struct RecordingSink {
        frames: Vec<RgbImage>,
        waits: Vec<KeyWait>,
        keys: VecDeque<Option<KeyPress>>,
        closes: usize,
        fail: bool,
    }

    impl FrameSink for RecordingSink {
        fn show(
            &mut self,
            frame: &RgbImage,
            wait: KeyWait,
        ) -> Result<Option<KeyPress>, ViewerError> {
            if self.fail {
                return Err(ViewerError::Display("no display".to_string()));
            }
            self.frames.push(frame.clone());
            self.waits.push(wait);
            Ok(self.keys.pop_front().flatten())
        }

        fn close(&mut self) {
            self.closes += 1;
        }
    }

    #[test]
    fn image_mode_renders_one_frame_and_waits_for_a_key() {
        let mut source = ImageFrameSource::new(RgbImage::new(1000, 800));
        let sink = RecordingSink {
            keys: VecDeque::from([Some(KeyPress::Other)]),
            ..RecordingSink::default()
        };
        let mut driver = Driver::new(DetectorAdapter::new(StubModel::cat()), sink);
        let summary = driver.run(&mut source, SourceMode::Image).unwrap();

        assert_eq!(
            summary,
            RunSummary {
                frames_rendered: 1,
                stop_reason: StopReason::Acknowledged
            }
        );
        assert_eq!(driver.state(), DriverState::Stopped);
        let sink = driver.sink();
        assert_eq!(sink.waits, vec![KeyWait::Forever]);
        assert_eq!(sink.closes, 1);
        let frame = &sink.frames[0];
        assert_eq!(frame.get_pixel(10, 10), &OVERLAY_COLOR);
        assert_eq!(frame.get_pixel(50, 50), &OVERLAY_COLOR);
        assert_ne!(frame.get_pixel(30, 15), &OVERLAY_COLOR);
    }

    #[test]
    fn escape_on_third_frame_stops_video_mode() {
        let stream = SyntheticStream::endless(64, 48);
        let releases = stream.releases.clone();
        let mut source = VideoFrameSource::new(stream, SourceOrientation::Flipped);
        let sink = RecordingSink {
            keys: VecDeque::from([None, Some(KeyPress::Other), Some(KeyPress::Escape)]),
            ..RecordingSink::default()
        };
        let mut driver = Driver::new(DetectorAdapter::new(StubModel::cat()), sink);
        let summary = driver.run(&mut source, SourceMode::Video).unwrap();

        assert_eq!(summary.frames_rendered, 3);
        assert_eq!(summary.stop_reason, StopReason::Cancelled);
        assert_eq!(driver.sink().frames.len(), 3);
        assert!(
            driver
                .sink()
                .waits
                .iter()
                .all(|w| *w == KeyWait::Poll(VIDEO_KEY_POLL))
        );
        drop(source);
        assert_eq!(releases.get(), 1);
    }

    #[test]
    fn video_mode_stops_at_end_of_stream() {
        let stream = SyntheticStream::finite(32, 32, 4);
        let releases = stream.releases.clone();
        let mut source = VideoFrameSource::new(stream, SourceOrientation::Upright);
        let mut driver = Driver::new(
            DetectorAdapter::new(StubModel::new(Vec::new(), &[])),
            RecordingSink::default(),
        );
        let summary = driver.run(&mut source, SourceMode::Video).unwrap();

        assert_eq!(summary.frames_rendered, 4);
        assert_eq!(summary.stop_reason, StopReason::EndOfStream);
        assert_eq!(releases.get(), 1);
        // No detections: frames reach the sink unchanged.
        assert_eq!(driver.sink().frames[3].get_pixel(0, 0).0, [3, 0, 0]);
    }

    #[test]
    fn detector_failure_still_releases_resources() {
        let stream = SyntheticStream::endless(16, 16);
        let releases = stream.releases.clone();
        let mut source = VideoFrameSource::new(stream, SourceOrientation::Flipped);
        let mut model = StubModel::cat();
        model.fail = true;
        let mut driver = Driver::new(DetectorAdapter::new(model), RecordingSink::default());
        let result = driver.run(&mut source, SourceMode::Video);

        assert!(matches!(result, Err(ViewerError::DetectorInvocation(_))));
        assert_eq!(releases.get(), 1);
        assert_eq!(driver.sink().closes, 1);
        assert!(driver.sink().frames.is_empty());
        assert_eq!(driver.state(), DriverState::Stopped);
    }

    #[test]
    fn display_failure_still_releases_resources() {
        let stream = SyntheticStream::endless(16, 16);
        let releases = stream.releases.clone();
        let mut source = VideoFrameSource::new(stream, SourceOrientation::Flipped);
        let sink = RecordingSink {
            fail: true,
            ..RecordingSink::default()
        };
        let mut driver = Driver::new(DetectorAdapter::new(StubModel::cat()), sink);
        let result = driver.run(&mut source, SourceMode::Video);

        assert!(matches!(result, Err(ViewerError::Display(_))));
        assert_eq!(releases.get(), 1);
        assert_eq!(driver.sink().closes, 1);
    }

    #[test]
    fn empty_pool_never_reaches_the_detector() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("readme.txt"), b"no images here").unwrap();
        let config = ViewerConfig {
            dataset_path: dir.path().to_path_buf(),
            ..ViewerConfig::default()
        };
        let model = StubModel::cat();
        let calls = model.calls.clone();
        let result = run_session(&config, model, RecordingSink::default());

        assert!(matches!(result, Err(ViewerError::EmptyPool { .. })));
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn session_annotates_a_random_image_into_the_output_directory() {
        let dataset = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        RgbImage::new(120, 90)
            .save(dataset.path().join("only.png"))
            .unwrap();
        let config = ViewerConfig {
            dataset_path: dataset.path().to_path_buf(),
            seed: Some(3),
            ..ViewerConfig::default()
        };
        let sink = FileSink::new(output.path()).unwrap();
        let summary = run_session(&config, StubModel::cat(), sink).unwrap();

        assert_eq!(summary.frames_rendered, 1);
        let annotated = image::open(output.path().join("frame_000000.png"))
            .unwrap()
            .into_rgb8();
        assert_eq!(annotated.get_pixel(10, 10), &OVERLAY_COLOR);
    }
}

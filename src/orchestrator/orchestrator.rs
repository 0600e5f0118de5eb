use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::state::{Command, CommandError, CommandOutcome, GuardViolation, OrchestratorState};
use crate::analysis::{AnalysisClient, AnalysisKind, AnalysisResult};
use crate::capture::{CameraSession, FrameCapture, VideoFrame};
use crate::narration::{NarrationChannel, Status};
use crate::overlay::{Canvas2D, OverlayRenderer, SharedCanvas};

/// The analysis currently awaiting a response
struct InFlight {
    id: Uuid,
    kind: AnalysisKind,
    session_id: Uuid,
    cancel: CancellationToken,
}

/// What `begin` hands to the rest of an analysis
struct Flight {
    id: Uuid,
    still: VideoFrame,
    jpeg_quality: u8,
    cancel: CancellationToken,
}

/// Ends a flight whose future was dropped before `complete` ran
///
/// Cancels the request and, if the flight is still current, returns the
/// orchestrator to `Ready`.
struct FlightGuard<'a> {
    orchestrator: &'a Orchestrator,
    flight_id: Uuid,
    cancel: CancellationToken,
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.cancel.cancel();

        let mut inner = self.orchestrator.inner();
        if inner
            .in_flight
            .as_ref()
            .is_some_and(|flight| flight.id == self.flight_id)
        {
            inner.in_flight = None;
            inner.state = OrchestratorState::Ready;
            warn!("Analysis abandoned by its caller, back to ready");
        }
    }
}

struct Inner {
    state: OrchestratorState,
    session: Option<CameraSession>,
    in_flight: Option<InFlight>,
}

/// Drives capture, analysis, overlay and narration from user commands
///
/// Commands take `&self` so that a `stop` can run while a `detect` or `read`
/// is suspended on the network. No lock is held across that suspension.
pub struct Orchestrator {
    /// Serialises camera start/stop; held across device acquisition only
    capture: tokio::sync::Mutex<FrameCapture>,
    client: AnalysisClient,
    renderer: OverlayRenderer,
    canvas: SharedCanvas,
    narration: NarrationChannel,
    inner: Mutex<Inner>,
}

impl Orchestrator {
    pub fn new(
        capture: FrameCapture,
        client: AnalysisClient,
        canvas: SharedCanvas,
        narration: NarrationChannel,
    ) -> Self {
        Self {
            capture: tokio::sync::Mutex::new(capture),
            client,
            renderer: OverlayRenderer::default(),
            canvas,
            narration,
            inner: Mutex::new(Inner {
                state: OrchestratorState::Idle,
                session: None,
                in_flight: None,
            }),
        }
    }

    pub fn with_renderer(mut self, renderer: OverlayRenderer) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn state(&self) -> OrchestratorState {
        self.inner().state
    }

    pub fn session(&self) -> Option<CameraSession> {
        self.inner().session.clone()
    }

    /// Current narrated status line
    pub fn status(&self) -> Status {
        self.narration.status()
    }

    pub fn narration(&self) -> &NarrationChannel {
        &self.narration
    }

    pub fn canvas(&self) -> SharedCanvas {
        self.canvas.clone()
    }

    /// Run one user command
    pub async fn dispatch(&self, command: Command) -> Result<CommandOutcome, CommandError> {
        match command {
            Command::StartCamera => self
                .start()
                .await
                .map(|session| CommandOutcome::Started { session }),
            Command::StopCamera => {
                self.stop().await;
                Ok(CommandOutcome::Stopped)
            }
            Command::Detect => self
                .analyze(AnalysisKind::DetectObjects)
                .await
                .map(|result| CommandOutcome::Analyzed { result }),
            Command::ReadText => self
                .analyze(AnalysisKind::ReadText)
                .await
                .map(|result| CommandOutcome::Analyzed { result }),
        }
    }

    /// `Idle -> Ready`. On failure the state stays `Idle`.
    pub async fn start(&self) -> Result<CameraSession, CommandError> {
        let mut capture = self.capture.lock().await;

        if self.state() != OrchestratorState::Idle {
            return Err(self.reject(GuardViolation::CameraAlreadyRunning));
        }

        match capture.start().await {
            Ok(session) => {
                self.lock_canvas()
                    .resize(session.frame_width, session.frame_height);
                {
                    let mut inner = self.inner();
                    inner.state = OrchestratorState::Ready;
                    inner.session = Some(session.clone());
                }
                self.narration.info("Camera ready");
                Ok(session)
            }
            Err(e) => {
                let err = CommandError::Camera(e);
                warn!("Camera start failed: {}", err);
                self.narration.error(&err.to_string());
                Err(err)
            }
        }
    }

    /// `Ready|Busy -> Idle`. Cancels any in-flight analysis. A no-op when idle.
    pub async fn stop(&self) {
        let mut capture = self.capture.lock().await;

        let was_running = {
            let mut inner = self.inner();
            if let Some(flight) = inner.in_flight.take() {
                info!("Cancelling in-flight {:?} request", flight.kind);
                flight.cancel.cancel();
            }
            inner.session = None;
            std::mem::replace(&mut inner.state, OrchestratorState::Idle) != OrchestratorState::Idle
        };

        capture.stop();
        drop(capture);

        if was_running {
            self.narration.info("Camera stopped");
        }
    }

    /// Run object detection; failures come back as `AnalysisResult::Failure`
    pub async fn detect(&self) -> AnalysisResult {
        self.analyze_or_failure(AnalysisKind::DetectObjects).await
    }

    /// Run text recognition; failures come back as `AnalysisResult::Failure`
    pub async fn read(&self) -> AnalysisResult {
        self.analyze_or_failure(AnalysisKind::ReadText).await
    }

    async fn analyze_or_failure(&self, kind: AnalysisKind) -> AnalysisResult {
        match self.analyze(kind).await {
            Ok(result) => result,
            Err(err) => AnalysisResult::Failure(Self::failure_message(kind, &err)),
        }
    }

    /// `Ready -> Busy -> Ready` around one analysis round-trip
    ///
    /// Dropping the returned future before it resolves cancels the request
    /// and returns the orchestrator to `Ready`.
    pub async fn analyze(&self, kind: AnalysisKind) -> Result<AnalysisResult, CommandError> {
        let prepared = {
            let capture = self.capture.lock().await;
            let mut inner = self.inner();
            let prepared = Self::begin(kind, &capture, &mut inner);
            match &prepared {
                Ok(_) => self.narration.info(kind.progress_message()),
                Err(err) => self.narrate_failure(kind, err),
            }
            prepared
        };

        let Flight {
            id,
            still,
            jpeg_quality,
            cancel,
        } = prepared?;

        let _guard = FlightGuard {
            orchestrator: self,
            flight_id: id,
            cancel: cancel.clone(),
        };

        let (still, encoded) = match still.encode_jpeg_off_thread(jpeg_quality).await {
            Ok(encoded) => encoded,
            Err(e) => return self.complete(kind, id, None, Err(CommandError::Camera(e))),
        };

        info!(
            "Submitting {} frame ({}x{}, {} bytes) to {}",
            encoded.mime,
            encoded.width,
            encoded.height,
            encoded.len(),
            kind.endpoint()
        );

        let response = match kind {
            AnalysisKind::DetectObjects => self
                .client
                .detect_objects(encoded, &cancel)
                .await
                .map(AnalysisResult::Detections),
            AnalysisKind::ReadText => self
                .client
                .recognize_text(encoded, &cancel)
                .await
                .map(AnalysisResult::Text),
        };

        self.complete(kind, id, Some(&still), response.map_err(CommandError::Analysis))
    }

    /// Check the state, copy the still and mark the flight as started
    fn begin(
        kind: AnalysisKind,
        capture: &FrameCapture,
        inner: &mut Inner,
    ) -> Result<Flight, CommandError> {
        match inner.state {
            OrchestratorState::Idle => return Err(GuardViolation::CameraNotStarted.into()),
            OrchestratorState::Busy => return Err(GuardViolation::AnalysisInProgress.into()),
            OrchestratorState::Ready => {}
        }

        let (session_id, still) = capture.grab_still()?;
        let flight = Flight {
            id: Uuid::new_v4(),
            still,
            jpeg_quality: capture.jpeg_quality(),
            cancel: CancellationToken::new(),
        };

        inner.state = OrchestratorState::Busy;
        inner.in_flight = Some(InFlight {
            id: flight.id,
            kind,
            session_id,
            cancel: flight.cancel.clone(),
        });

        Ok(flight)
    }

    /// Close the flight and announce its outcome, unless `stop` got there first
    ///
    /// Runs entirely under the state lock so a concurrent `stop` is ordered
    /// either before (result discarded) or after (its narration wins).
    fn complete(
        &self,
        kind: AnalysisKind,
        flight_id: Uuid,
        still: Option<&VideoFrame>,
        response: Result<AnalysisResult, CommandError>,
    ) -> Result<AnalysisResult, CommandError> {
        let mut inner = self.inner();

        let flight = match inner.in_flight.take() {
            Some(flight) if flight.id == flight_id => flight,
            other => {
                inner.in_flight = other;
                info!("Discarding {:?} response for a stopped session", kind);
                return Err(CommandError::Discarded);
            }
        };
        inner.state = OrchestratorState::Ready;

        match response {
            Ok(result) => {
                if let (AnalysisResult::Detections(detections), Some(still)) = (&result, still) {
                    self.renderer
                        .render(&mut *self.lock_canvas(), still, detections);
                }
                debug!("{:?} for session {} finished", kind, flight.session_id);
                self.narration.info(&result.summary());
                Ok(result)
            }
            Err(err) => {
                self.narrate_failure(kind, &err);
                Err(err)
            }
        }
    }

    fn reject(&self, guard: GuardViolation) -> CommandError {
        warn!("Rejected command: {}", guard);
        self.narration.error(&guard.to_string());
        CommandError::Guard(guard)
    }

    fn narrate_failure(&self, kind: AnalysisKind, err: &CommandError) {
        match err {
            CommandError::Guard(guard) => {
                self.reject(*guard);
            }
            CommandError::Discarded => {}
            CommandError::Camera(_) | CommandError::Analysis(_) => {
                let message = Self::failure_message(kind, err);
                warn!("{}", message);
                self.narration.error(&message);
            }
        }
    }

    fn failure_message(kind: AnalysisKind, err: &CommandError) -> String {
        match err {
            CommandError::Camera(e) => format!("{}: {}", kind.failure_prefix(), e),
            CommandError::Analysis(e) => format!("{}: {}", kind.failure_prefix(), e),
            CommandError::Guard(_) | CommandError::Discarded => err.to_string(),
        }
    }

    fn inner(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_canvas(&self) -> MutexGuard<'_, dyn Canvas2D + 'static> {
        self.canvas.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

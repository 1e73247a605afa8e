use std::sync::mpsc::{Receiver, Sender};
use std::sync::{Arc, PoisonError};
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::info;

use crate::app::{Browser, Controller, PlaybackState, SharedController, SharedDisplay, View};
use crate::config;
use crate::error::PlayerError;
use crate::mpris::{ControlCmd, MprisHandle};
use crate::pairing::Pairing;
use crate::ui;

use super::workers::{self, ScanSource, WorkerEvent};

/// Everything the event loop reads and mutates while handling input.
pub struct Session {
    pub settings: config::Settings,
    pub controller: SharedController,
    pub display: SharedDisplay,
    pub browser: Browser,
    pub scan_source: ScanSource,
    pub pairing: Arc<dyn Pairing + Send + Sync>,
    pub worker_tx: Sender<WorkerEvent>,
}

impl Session {
    fn lock(&self) -> std::sync::MutexGuard<'_, Controller> {
        self.controller.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn quit(&self) {
        let fade = Duration::from_millis(self.settings.audio.quit_fade_out_ms);
        self.lock().shutdown(fade);
        info!("quit requested");
    }

    /// Queue a rescan of the configured source.
    pub fn rescan(&self) {
        self.lock().report_status("Scanning for music...");
        workers::spawn_rescan(
            self.scan_source.clone(),
            self.settings.library.clone(),
            self.worker_tx.clone(),
        );
    }

    fn scan_devices(&self) {
        self.lock().report_status("Scanning for Bluetooth devices...");
        workers::spawn_device_scan(Arc::clone(&self.pairing), self.worker_tx.clone());
    }

    fn change_volume(&mut self, delta: i32) {
        let level = i32::from(self.browser.volume) + delta;
        let applied = self.lock().set_volume(level);
        self.browser.volume = applied;
    }

    fn activate(&mut self) {
        let controller = Arc::clone(&self.controller);
        let mut ctl = controller.lock().unwrap_or_else(PoisonError::into_inner);

        match self.browser.view.clone() {
            View::Folders => {
                let Some(path) = ctl
                    .library()
                    .folders()
                    .get(self.browser.cursor)
                    .map(|f| f.path.clone())
                else {
                    return;
                };
                if let Err(err) = ctl.select_folder(&path) {
                    ctl.report_status(format!("Error: {err}"));
                    return;
                }
                self.browser.open_folder(path);
            }
            View::Tracks(path) => {
                let already_selected = ctl.selected_folder().is_some_and(|f| f.path == path);
                if !already_selected {
                    if let Err(err) = ctl.select_folder(&path) {
                        ctl.report_status(format!("Error: {err}"));
                        return;
                    }
                }
                let played = ctl.play_track_at(self.browser.cursor);
                self.follow(&mut ctl, played.map(Some));
            }
            View::Devices => {
                let Some(device) = self.browser.devices.get(self.browser.cursor) else {
                    return;
                };
                ctl.report_status(format!("Connecting to {}...", device.address));
                workers::spawn_connect(
                    Arc::clone(&self.pairing),
                    device.address.clone(),
                    self.worker_tx.clone(),
                );
            }
        }
    }

    /// Move the cursor onto the track that started, or report a failure the
    /// controller has not already shown.
    fn follow(&mut self, ctl: &mut Controller, played: Result<Option<usize>, PlayerError>) {
        match played {
            Ok(Some(index)) => {
                let showing_selected = match (&self.browser.view, ctl.selected_folder()) {
                    (View::Tracks(path), Some(folder)) => *path == folder.path,
                    _ => false,
                };
                if showing_selected {
                    self.browser.cursor = index;
                }
            }
            Ok(None) => {}
            Err(PlayerError::Engine(_)) => {}
            Err(err) => ctl.report_status(format!("Error: {err}")),
        }
    }

    fn advance(&mut self) {
        let controller = Arc::clone(&self.controller);
        let mut ctl = controller.lock().unwrap_or_else(PoisonError::into_inner);
        let played = ctl.advance();
        self.follow(&mut ctl, played);
    }

    fn play_or_resume(&mut self) {
        let controller = Arc::clone(&self.controller);
        let mut ctl = controller.lock().unwrap_or_else(PoisonError::into_inner);
        match ctl.state() {
            PlaybackState::Paused => ctl.toggle_pause(),
            PlaybackState::Playing => {}
            PlaybackState::Idle => {
                if ctl.selected_folder().is_some() {
                    let index = ctl.current_index();
                    let played = ctl.play_track_at(index);
                    self.follow(&mut ctl, played.map(Some));
                }
            }
        }
    }

    /// Handle a command from the session bus. Returns `true` on quit.
    pub fn handle_control_cmd(&mut self, cmd: ControlCmd) -> bool {
        match cmd {
            ControlCmd::Quit => {
                self.quit();
                return true;
            }
            ControlCmd::Play => self.play_or_resume(),
            ControlCmd::Pause => {
                let mut ctl = self.lock();
                if ctl.state() == PlaybackState::Playing {
                    ctl.toggle_pause();
                }
            }
            ControlCmd::PlayPause => {
                let state = self.lock().state();
                if state == PlaybackState::Idle {
                    self.play_or_resume();
                } else {
                    self.lock().toggle_pause();
                }
            }
            ControlCmd::Next => self.advance(),
        }
        false
    }

    /// Handle a key press. Returns `true` on quit.
    pub fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') => {
                self.quit();
                return true;
            }
            KeyCode::Char('j') | KeyCode::Down => {
                let len = self.browser.len(self.lock().library());
                self.browser.next(len);
            }
            KeyCode::Char('k') | KeyCode::Up => {
                let len = self.browser.len(self.lock().library());
                self.browser.prev(len);
            }
            KeyCode::Enter => self.activate(),
            KeyCode::Backspace | KeyCode::Esc | KeyCode::Char('h') => self.browser.back(),
            KeyCode::Char(' ') | KeyCode::Char('p') => self.lock().toggle_pause(),
            KeyCode::Char('l') | KeyCode::Char('n') => self.advance(),
            KeyCode::Char('s') => {
                let mut ctl = self.lock();
                let enabled = !ctl.shuffle_enabled();
                ctl.set_shuffle_enabled(enabled);
                ctl.report_status(if enabled { "Shuffle on" } else { "Shuffle off" });
            }
            KeyCode::Char('+') | KeyCode::Char('=') => self.change_volume(5),
            KeyCode::Char('-') => self.change_volume(-5),
            KeyCode::Char('u') => self.rescan(),
            KeyCode::Char('b') => self.scan_devices(),
            _ => {}
        }
        false
    }

    /// Fold a finished background job into the session.
    pub fn handle_worker_event(&mut self, event: WorkerEvent) {
        workers::apply_worker_event(event, &self.controller, &mut self.browser);
        let len = self.browser.len(self.lock().library());
        self.browser.clamp_cursor(len);
    }
}

/// What MPRIS last reported, so the bus is only touched on change.
#[derive(Debug, Default)]
pub struct EventLoopState {
    last_playback: PlaybackState,
    last_track: (String, String),
}

impl EventLoopState {
    fn sync_mpris(&mut self, session: &Session, mpris: &MprisHandle) {
        let playback = session.lock().state();
        let now = session.display.snapshot();
        let track = (now.title, now.artist);

        if playback != self.last_playback {
            mpris.set_playback(playback);
            self.last_playback = playback;
        }
        if track != self.last_track {
            mpris.set_track(&track.0, &track.1);
            self.last_track = track;
        }
    }
}

/// Main terminal event loop: draws, handles input, applies background job
/// results and keeps MPRIS in sync. Returns `Ok(())` when shutdown is requested.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    session: &mut Session,
    mpris: &MprisHandle,
    control_rx: &Receiver<ControlCmd>,
    worker_rx: &Receiver<WorkerEvent>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut state = EventLoopState::default();

    loop {
        while let Ok(ev) = worker_rx.try_recv() {
            session.handle_worker_event(ev);
        }

        state.sync_mpris(session, mpris);

        let now = session.display.snapshot();
        {
            let ctl = session.lock();
            terminal.draw(|f| ui::draw(f, &ctl, &session.browser, &now, &session.settings.ui))?;
        }

        while let Ok(cmd) = control_rx.try_recv() {
            if session.handle_control_cmd(cmd) {
                return Ok(());
            }
        }

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if session.handle_key(key.code) {
                    return Ok(());
                }
            }
        }
    }
}

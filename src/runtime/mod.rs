use std::env;
use std::path::PathBuf;
use std::sync::{Arc, mpsc};
use std::time::Duration;

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::info;

use crate::app::{Browser, Controller, SharedDisplay};
use crate::audio::AudioPlayer;
use crate::metadata::LoftyMetadata;
use crate::mpris::ControlCmd;
use crate::pairing::Bluetoothctl;
use crate::watchdog::Watchdog;

mod event_loop;
mod logging;
mod settings;
mod workers;

use event_loop::Session;
use workers::ScanSource;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let (settings, problem) = settings::load_settings();

    let mut args = env::args().skip(1);
    let first = args.next();
    if first.as_deref() == Some("--print-config") {
        print!("{}", settings.to_toml()?);
        return Ok(());
    }

    let log_file = logging::init(&settings.log);
    settings::report_problem(problem.as_deref());
    info!(log_file = ?log_file, "stickplay starting");

    // A directory argument replaces removable drive discovery.
    let scan_source = match first {
        Some(dir) => ScanSource::Directory(PathBuf::from(dir)),
        None => ScanSource::Removable(settings.devices.clone()),
    };

    let audio_player = AudioPlayer::new(&settings.audio);
    let display = SharedDisplay::default();
    let mut controller = Controller::new(
        Box::new(audio_player),
        Box::new(LoftyMetadata::new(settings.ui.unknown_artist.clone())),
        Box::new(display.clone()),
    )
    .with_shuffle_overrides_selection(settings.playback.shuffle_overrides_selection);
    controller.set_shuffle_enabled(settings.playback.shuffle);
    let volume = controller.set_volume(i32::from(settings.audio.initial_volume));
    let controller = controller.into_shared();

    let mut watchdog = Watchdog::spawn(
        Arc::clone(&controller),
        Duration::from_millis(settings.playback.watchdog_interval_ms),
    );

    let (control_tx, control_rx) = mpsc::channel::<ControlCmd>();
    let mpris = crate::mpris::spawn_mpris(control_tx);

    let scan_now =
        settings.devices.scan_on_startup || matches!(scan_source, ScanSource::Directory(_));

    let (worker_tx, worker_rx) = mpsc::channel();
    let mut session = Session {
        pairing: Arc::new(Bluetoothctl::new(&settings.pairing)),
        settings,
        controller,
        display,
        browser: Browser::new(volume),
        scan_source,
        worker_tx,
    };
    if scan_now {
        session.rescan();
    }

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result =
        event_loop::run(&mut terminal, &mut session, &mpris, &control_rx, &worker_rx);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    watchdog.stop();
    info!("stickplay exiting");
    run_result
}

use std::collections::HashMap;
use std::sync::{Arc, Mutex, mpsc::Sender};

use async_io::{Timer, block_on};
use tracing::{info, warn};
use zbus::{Connection, interface};
use zvariant::{OwnedValue, Value};

use crate::app::PlaybackState;

const BUS_NAME: &str = "org.mpris.MediaPlayer2.stickplay";
const OBJECT_PATH: &str = "/org/mpris/MediaPlayer2";

/// Commands arriving from the session bus, handled by the event loop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ControlCmd {
    Quit,
    Play,
    Pause,
    PlayPause,
    Next,
}

#[derive(Debug, Default)]
struct SharedState {
    playback: PlaybackState,
    title: Option<String>,
    artist: Option<String>,
}

/// Handle used by the event loop to publish what the bus reports.
pub struct MprisHandle {
    state: Arc<Mutex<SharedState>>,
}

impl MprisHandle {
    pub fn set_playback(&self, playback: PlaybackState) {
        if let Ok(mut s) = self.state.lock() {
            s.playback = playback;
        }
    }

    /// Empty strings clear the corresponding field.
    pub fn set_track(&self, title: &str, artist: &str) {
        if let Ok(mut s) = self.state.lock() {
            s.title = (!title.is_empty()).then(|| title.to_string());
            s.artist = (!artist.is_empty()).then(|| artist.to_string());
        }
    }
}

struct RootIface {
    tx: Sender<ControlCmd>,
}

#[interface(name = "org.mpris.MediaPlayer2")]
impl RootIface {
    fn raise(&self) {}

    fn quit(&self) {
        let _ = self.tx.send(ControlCmd::Quit);
    }

    #[zbus(property)]
    fn can_quit(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_raise(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn has_track_list(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn identity(&self) -> &str {
        "stickplay"
    }

    #[zbus(property)]
    fn supported_uri_schemes(&self) -> Vec<String> {
        vec!["file".to_string()]
    }

    #[zbus(property)]
    fn supported_mime_types(&self) -> Vec<String> {
        vec![
            "audio/mpeg".to_string(),
            "audio/wav".to_string(),
            "audio/ogg".to_string(),
        ]
    }
}

struct PlayerIface {
    tx: Sender<ControlCmd>,
    state: Arc<Mutex<SharedState>>,
}

#[interface(name = "org.mpris.MediaPlayer2.Player")]
impl PlayerIface {
    fn next(&self) {
        let _ = self.tx.send(ControlCmd::Next);
    }

    fn play(&self) {
        let _ = self.tx.send(ControlCmd::Play);
    }

    fn pause(&self) {
        let _ = self.tx.send(ControlCmd::Pause);
    }

    fn play_pause(&self) {
        let _ = self.tx.send(ControlCmd::PlayPause);
    }

    #[zbus(property)]
    fn playback_status(&self) -> &str {
        let Ok(s) = self.state.lock() else {
            return "Stopped";
        };
        match s.playback {
            PlaybackState::Idle => "Stopped",
            PlaybackState::Playing => "Playing",
            PlaybackState::Paused => "Paused",
        }
    }

    #[zbus(property)]
    fn can_control(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_play(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_pause(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_go_next(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_go_previous(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn metadata(&self) -> HashMap<String, OwnedValue> {
        let mut map = HashMap::new();
        let Ok(s) = self.state.lock() else {
            return map;
        };

        if let Some(v) = s
            .title
            .clone()
            .and_then(|t| OwnedValue::try_from(Value::from(t)).ok())
        {
            map.insert("xesam:title".to_string(), v);
        }
        if let Some(v) = s
            .artist
            .clone()
            .and_then(|a| OwnedValue::try_from(Value::from(vec![a])).ok())
        {
            map.insert("xesam:artist".to_string(), v);
        }
        map
    }
}

/// Serve the MPRIS interfaces on the session bus from a background thread.
///
/// Bus failures are logged and leave the player running without remote control.
pub fn spawn_mpris(tx: Sender<ControlCmd>) -> MprisHandle {
    let state = Arc::new(Mutex::new(SharedState::default()));

    let state_for_thread = state.clone();
    std::thread::spawn(move || {
        block_on(async move {
            let connection = match Connection::session().await {
                Ok(c) => c,
                Err(e) => {
                    warn!(error = %e, "MPRIS: failed to connect to session bus");
                    return;
                }
            };

            if let Err(e) = connection.request_name(BUS_NAME).await {
                warn!(error = %e, "MPRIS: failed to acquire name");
                return;
            }

            let object_server = connection.object_server();

            if let Err(e) = object_server
                .at(OBJECT_PATH, RootIface { tx: tx.clone() })
                .await
            {
                warn!(error = %e, "MPRIS: failed to register root iface");
                return;
            }

            if let Err(e) = object_server
                .at(
                    OBJECT_PATH,
                    PlayerIface {
                        tx,
                        state: state_for_thread,
                    },
                )
                .await
            {
                warn!(error = %e, "MPRIS: failed to register player iface");
                return;
            }

            info!(name = BUS_NAME, "MPRIS service registered");

            // Keep the service alive.
            loop {
                Timer::after(std::time::Duration::from_secs(3600)).await;
            }
        });
    });

    MprisHandle { state }
}

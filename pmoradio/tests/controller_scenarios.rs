//! Scénarios du contrôleur avec un écran émulé et un lecteur factice.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use nix::errno::Errno;
use nix::sys::signal::kill;
use nix::unistd::Pid;

use pmoconfig::Config;
use pmopiface::{EventListener, InputEvent, MemoryLcd};
use pmoradio::{
    Bindings, HostInfo, PlayerCommand, PlayerLauncher, PlayerProcess, ProcessLauncher,
    RadioAction, RadioConfigExt, RadioController, RadioError, RadioOptions, Station,
    StationCatalog,
};

#[derive(Debug, Clone, PartialEq, Eq)]
enum PlayerCall {
    Launch { pid: u32, args: Vec<String> },
    Terminate { pid: u32 },
}

#[derive(Default, Clone)]
struct RecordingLauncher {
    command: PlayerCommand,
    calls: Arc<Mutex<Vec<PlayerCall>>>,
    next_pid: u32,
}

struct RecordingProcess {
    pid: u32,
    calls: Arc<Mutex<Vec<PlayerCall>>>,
}

impl PlayerLauncher for RecordingLauncher {
    type Process = RecordingProcess;

    fn launch(&mut self, source: &str) -> pmoradio::Result<RecordingProcess> {
        self.next_pid += 1;
        let pid = 1000 + self.next_pid;
        self.calls.lock().unwrap().push(PlayerCall::Launch {
            pid,
            args: self.command.invocation(source),
        });
        Ok(RecordingProcess {
            pid,
            calls: self.calls.clone(),
        })
    }
}

impl PlayerProcess for RecordingProcess {
    fn id(&self) -> u32 {
        self.pid
    }

    fn terminate(&mut self) -> pmoradio::Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(PlayerCall::Terminate { pid: self.pid });
        Ok(())
    }
}

struct FixedHost;

impl HostInfo for FixedHost {
    fn mac_address(&self) -> String {
        "b8:27:eb:12:34:56".to_string()
    }

    fn hostname(&self) -> String {
        "piradio.clients.dur.ac.uk".to_string()
    }

    fn ip_address(&self) -> String {
        "10.0.0.7".to_string()
    }
}

type TestRadio = RadioController<MemoryLcd, RecordingLauncher>;

/// Radio construite sur le catalogue par défaut de la configuration.
fn default_radio() -> (TestRadio, Arc<Mutex<Vec<PlayerCall>>>) {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::load_config(dir.path().to_str().unwrap()).unwrap();

    let catalog = StationCatalog::new(config.get_radio_stations().unwrap()).unwrap();
    let launcher = RecordingLauncher {
        command: config.get_radio_player_command().unwrap(),
        ..RecordingLauncher::default()
    };
    let calls = launcher.calls.clone();
    let options = RadioOptions {
        hold: Duration::ZERO,
        host: Box::new(FixedHost),
    };
    let radio = RadioController::new(
        MemoryLcd::new(),
        launcher,
        catalog,
        config.get_radio_start_station().unwrap(),
        options,
    )
    .unwrap();
    (radio, calls)
}

fn launches(calls: &Arc<Mutex<Vec<PlayerCall>>>) -> Vec<Vec<String>> {
    calls
        .lock()
        .unwrap()
        .iter()
        .filter_map(|call| match call {
            PlayerCall::Launch { args, .. } => Some(args.clone()),
            PlayerCall::Terminate { .. } => None,
        })
        .collect()
}

#[test]
fn next_station_wraps_around_the_catalog() {
    let (mut radio, _) = default_radio();
    assert_eq!(radio.current_station().name, "Heart");

    for _ in 0..3 {
        radio.next_station().unwrap();
    }
    assert_eq!(radio.current_station_index(), 6);
    assert_eq!(radio.current_station().name, "Planet Rock");

    radio.next_station().unwrap();
    assert_eq!(radio.current_station_index(), 0);
    assert_eq!(radio.current_station().name, "Purple Radio");

    radio.previous_station().unwrap();
    assert_eq!(radio.current_station_index(), 6);
}

#[test]
fn change_station_is_modulo_catalog_length() {
    let (mut radio, _) = default_radio();
    let len = radio.catalog().len() as i64;
    for i in 0..len {
        radio.change_station(i).unwrap();
        let expected = radio.current_station_index();
        radio.change_station(i + len).unwrap();
        assert_eq!(radio.current_station_index(), expected);
        radio.change_station(i - len).unwrap();
        assert_eq!(radio.current_station_index(), expected);
    }
}

#[test]
fn play_and_stop_keep_handle_in_sync() {
    let (mut radio, calls) = default_radio();
    assert!(!radio.is_playing());
    assert_eq!(radio.player_id(), None);

    radio.play().unwrap();
    assert!(radio.is_playing());
    let pid = radio.player_id().unwrap();

    radio.stop().unwrap();
    assert!(!radio.is_playing());
    assert_eq!(radio.player_id(), None);

    assert_eq!(
        calls.lock().unwrap().last(),
        Some(&PlayerCall::Terminate { pid })
    );
}

#[test]
fn double_play_and_double_stop_are_rejected() {
    let (mut radio, calls) = default_radio();

    assert!(matches!(radio.stop(), Err(RadioError::NotPlaying)));

    radio.play().unwrap();
    let pid = radio.player_id();
    assert!(matches!(radio.play(), Err(RadioError::AlreadyPlaying)));
    assert_eq!(radio.player_id(), pid);
    assert_eq!(launches(&calls).len(), 1);
}

#[test]
fn changing_station_while_playing_restarts_player() {
    let (mut radio, calls) = default_radio();
    radio.play().unwrap();
    radio.change_station(1).unwrap();

    assert!(radio.is_playing());
    assert_eq!(
        *calls.lock().unwrap(),
        vec![
            PlayerCall::Launch {
                pid: 1001,
                args: vec![
                    "-quiet".to_string(),
                    "http://media-ice.musicradio.com/HeartTyneWearMP3".to_string()
                ],
            },
            PlayerCall::Terminate { pid: 1001 },
            PlayerCall::Launch {
                pid: 1002,
                args: vec![
                    "-quiet".to_string(),
                    "-playlist".to_string(),
                    "http://www.radiofeeds.co.uk/bbcradio1.pls".to_string()
                ],
            },
        ]
    );
}

#[test]
fn changing_station_while_stopped_only_updates_display() {
    let (mut radio, calls) = default_radio();
    radio.change_station(5).unwrap();

    assert!(!radio.is_playing());
    assert!(calls.lock().unwrap().is_empty());
    assert_eq!(radio.display().line(1), "6/7 Capital FM");
}

#[test]
fn update_display_is_idempotent() {
    let (mut radio, _) = default_radio();
    radio.play().unwrap();

    radio.update_display().unwrap();
    let first = radio.display().render();
    radio.update_display().unwrap();
    assert_eq!(radio.display().render(), first);
    assert_eq!(radio.display().line(1), "4/7 Heart");
}

#[test]
fn stop_only_touches_the_glyph() {
    let (mut radio, _) = default_radio();
    radio.play().unwrap();
    radio.stop().unwrap();

    let lcd = radio.display();
    assert_eq!(lcd.visible_bytes(0)[0], pmoradio::controller::PAUSE_SYMBOL_INDEX);
    assert_eq!(lcd.line(1), "4/7 Heart");
}

#[test]
fn listener_drives_the_radio() {
    let (mut radio, calls) = default_radio();

    let mut listener: EventListener<TestRadio, RadioError> = EventListener::new();
    Bindings::piface_defaults()
        .bind_ir("any", RadioAction::PresetFromEvent)
        .register(&mut listener);

    let events = listener.sender().unwrap();
    events.send(InputEvent::switch_pressed(0)).unwrap();
    events.send(InputEvent::switch_pressed(2)).unwrap();
    events.send(InputEvent::ir("1")).unwrap();
    events.send(InputEvent::ir("KEY_MENU")).unwrap();
    events.send(InputEvent::switch_pressed(4)).unwrap();
    events.send(InputEvent::Shutdown).unwrap();

    listener.activate(&mut radio).unwrap();

    assert!(radio.is_playing());
    assert_eq!(radio.current_station().name, "BBC Radio 1");
    assert_eq!(launches(&calls).len(), 3);
    assert_eq!(radio.display().line(1), "2/7 BBC Radio 1");
}

#[test]
fn close_terminates_the_player() {
    let (mut radio, calls) = default_radio();
    radio.play().unwrap();
    let pid = radio.player_id().unwrap();

    radio.close().unwrap();
    assert!(!radio.is_playing());
    assert!(!radio.display().is_backlight_on());
    assert_eq!(
        calls.lock().unwrap().last(),
        Some(&PlayerCall::Terminate { pid })
    );

    // Fermer une radio arrêtée n'est pas une erreur
    radio.close().unwrap();
}

#[test]
fn dropping_the_radio_stops_a_real_player() {
    let launcher = ProcessLauncher::new(PlayerCommand {
        program: "sleep".to_string(),
        args: Vec::new(),
        ..PlayerCommand::default()
    });
    let catalog = StationCatalog::new(vec![Station::new("Silence", "30")]).unwrap();
    let options = RadioOptions {
        hold: Duration::ZERO,
        host: Box::new(FixedHost),
    };
    let mut radio = RadioController::new(MemoryLcd::new(), launcher, catalog, 0, options).unwrap();
    radio.play().unwrap();
    let pid = Pid::from_raw(radio.player_id().unwrap() as i32);

    // Une erreur de démarrage abandonne la radio sans appeler close()
    drop(radio);

    let deadline = Instant::now() + Duration::from_secs(5);
    while kill(pid, None) != Err(Errno::ESRCH) {
        assert!(Instant::now() < deadline, "player {} still running", pid);
        std::thread::sleep(Duration::from_millis(20));
    }
}

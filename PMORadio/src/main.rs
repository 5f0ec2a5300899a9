use std::process::ExitCode;

use anyhow::{Context, Result};
use crossbeam_channel::Sender;
use pmoconfig::{Config, get_config};
use pmopiface::sources::{ConsoleSource, LircSource, SwitchSource};
use pmopiface::{EventListener, InputEvent, Lcd, MemoryLcd, PiFaceCad};
use pmoradio::{
    DisplayBackend, ProcessLauncher, RadioConfigExt, RadioController, RadioError,
    StationCatalog, init_logging,
};
use tokio::signal::unix::{SignalKind, signal};
use tracing::{error, info, warn};

type Radio<D> = RadioController<D, ProcessLauncher>;

#[tokio::main]
async fn main() -> ExitCode {
    let config = get_config();
    let _log_handle = init_logging(&config);
    info!(version = env!("CARGO_PKG_VERSION"), "📻 Starting PMORadio");

    match run(&config).await {
        Ok(code) => code,
        Err(err) => {
            error!("❌ {:#}", err);
            ExitCode::FAILURE
        }
    }
}

async fn run(config: &Config) -> Result<ExitCode> {
    // ========== PHASE 1 : Lecteur externe ==========
    // Vérifié avant de toucher au matériel
    let launcher = config.get_radio_player_launcher()?;
    if let Err(err) = launcher.check_available() {
        eprintln!("{}", err);
        error!("❌ {}", err);
        return Ok(ExitCode::FAILURE);
    }

    let catalog = StationCatalog::new(config.get_radio_stations()?)?;
    let start = config.get_radio_start_station()?;
    info!("🎵 {} station(s), starting at #{}", catalog.len(), start);

    // ========== PHASE 2 : Écran et sources d'entrée ==========
    let backend = config.get_radio_display_backend()?;
    info!(backend=%backend, "Opening display");
    match backend {
        DisplayBackend::Piface => {
            let (lcd, switches) = PiFaceCad::open().context("Cannot open PiFace CAD")?;
            let radio = RadioController::new(
                lcd,
                launcher,
                catalog,
                start,
                config.get_radio_options()?,
            )?;
            run_radio(radio, config, move |events| {
                SwitchSource::new(switches).spawn(events)?;
                Ok(())
            })
            .await
        }
        DisplayBackend::Console => {
            let radio = RadioController::new(
                MemoryLcd::with_echo(),
                launcher,
                catalog,
                start,
                config.get_radio_options()?,
            )?;
            info!("⌨️  Console commands: s<N> (switch N), ir <CODE>, q");
            run_radio(radio, config, |events| {
                ConsoleSource::spawn(events)?;
                Ok(())
            })
            .await
        }
    }
}

async fn run_radio<D, F>(mut radio: Radio<D>, config: &Config, spawn_sources: F) -> Result<ExitCode>
where
    D: Lcd + Send + 'static,
    F: FnOnce(Sender<InputEvent>) -> pmopiface::Result<()>,
{
    // ========== PHASE 3 : Sources d'entrée ==========
    // Tout ce qui peut échouer au démarrage passe avant le lancement du lecteur
    let mut listener: EventListener<Radio<D>, RadioError> = EventListener::new();
    let prepared = prepare_listener(&mut listener, config, spawn_sources);
    let events = match prepared {
        Ok(events) => events,
        Err(err) => return Err(close_after(&mut radio, err)),
    };

    // ========== PHASE 4 : Démarrage automatique ==========
    match boot(&mut radio, config) {
        Ok(true) => {}
        Ok(false) => return Ok(ExitCode::SUCCESS),
        Err(err) => return Err(close_after(&mut radio, err)),
    }

    tokio::spawn(forward_shutdown_signal(events));

    info!("✅ PMORadio is ready");
    let (outcome, closed) = tokio::task::spawn_blocking(move || {
        let outcome = listener.activate(&mut radio);
        let closed = radio.close();
        (outcome, closed)
    })
    .await
    .context("Input listener thread panicked")?;

    if let Err(err) = closed {
        warn!("⚠️ Radio did not close cleanly: {}", err);
    }
    outcome?;
    info!("👋 PMORadio stopped");
    Ok(ExitCode::SUCCESS)
}

/// Enregistre les actions et démarre les sources d'entrée.
fn prepare_listener<D, F>(
    listener: &mut EventListener<Radio<D>, RadioError>,
    config: &Config,
    spawn_sources: F,
) -> Result<Sender<InputEvent>>
where
    D: Lcd + Send + 'static,
    F: FnOnce(Sender<InputEvent>) -> pmopiface::Result<()>,
{
    config.get_radio_bindings()?.register(listener);
    let events = listener
        .sender()
        .context("Input listener already activated")?;

    spawn_sources(events.clone()).context("Cannot start input sources")?;
    if config.get_radio_lirc_enabled()? {
        let socket = config.get_radio_lirc_socket()?;
        if let Err(err) = LircSource::new(&socket).spawn(events.clone()) {
            warn!(socket=%socket, "⚠️ IR remote disabled: {}", err);
        }
    }
    Ok(events)
}

/// Lance la lecture ou affiche l'écran de veille selon l'heure.
///
/// Retourne `false` si le programme doit s'arrêter là.
fn boot<D: Lcd>(radio: &mut Radio<D>, config: &Config) -> Result<bool> {
    let gate = config.get_radio_schedule()?;
    if gate.permits_now() {
        radio.play()?;
        return Ok(true);
    }

    info!("😴 Outside listening hours, not starting playback");
    radio.show_sleep_screen(gate.wake_hour())?;
    if config.get_radio_exit_when_asleep()? {
        return Ok(false);
    }
    radio.wake_display()?;
    Ok(true)
}

/// Ferme la radio (au mieux) avant de remonter `err`.
fn close_after<D: Lcd>(radio: &mut Radio<D>, err: anyhow::Error) -> anyhow::Error {
    if let Err(close_err) = radio.close() {
        warn!("⚠️ Radio did not close cleanly: {}", close_err);
    }
    err
}

/// Transforme SIGINT/SIGTERM en [`InputEvent::Shutdown`] pour la boucle d'écoute.
async fn forward_shutdown_signal(events: Sender<InputEvent>) {
    let mut terminate = match signal(SignalKind::terminate()) {
        Ok(stream) => stream,
        Err(err) => {
            warn!("⚠️ Cannot listen for SIGTERM: {}", err);
            if tokio::signal::ctrl_c().await.is_ok() {
                let _ = events.send(InputEvent::Shutdown);
            }
            return;
        }
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => info!("SIGINT received"),
        _ = terminate.recv() => info!("SIGTERM received"),
    }
    let _ = events.send(InputEvent::Shutdown);
}

//! Boutons de la PiFace CAD, réveillés par l'interruption du MCP23S17.

use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::Sender;
use rppal::gpio::{Gpio, InputPin, Trigger};

use crate::error::Result;
use crate::event::InputEvent;
use crate::piface::{INTERRUPT_GPIO, SwitchPort};
use crate::sources::report_failure;

const SOURCE_NAME: &str = "piface-switches";
const POLL_TIMEOUT: Duration = Duration::from_millis(500);

pub struct SwitchSource {
    port: SwitchPort,
    interrupt_gpio: u8,
}

impl SwitchSource {
    pub fn new(port: SwitchPort) -> Self {
        Self {
            port,
            interrupt_gpio: INTERRUPT_GPIO,
        }
    }

    /// Configure la ligne d'interruption et démarre le thread de lecture.
    pub fn spawn(self, events: Sender<InputEvent>) -> Result<JoinHandle<()>> {
        let mut pin = Gpio::new()?.get(self.interrupt_gpio)?.into_input_pullup();
        pin.set_interrupt(Trigger::FallingEdge, None)?;

        // Une interruption en attente maintiendrait INTA au niveau bas
        self.port.take_changes()?;
        tracing::info!(
            gpio = self.interrupt_gpio,
            state = %format!("{:08b}", self.port.read_state()?),
            "Listening for PiFace switches"
        );

        let handle = thread::Builder::new()
            .name(SOURCE_NAME.to_string())
            .spawn(move || self.run(pin, events))?;
        Ok(handle)
    }

    fn run(self, mut pin: InputPin, events: Sender<InputEvent>) {
        loop {
            match pin.poll_interrupt(true, Some(POLL_TIMEOUT)) {
                Ok(Some(_)) => {}
                // Front manqué : la ligne est restée basse, on relit quand même
                Ok(None) if pin.is_low() => {}
                Ok(None) => continue,
                Err(err) => {
                    report_failure(&events, SOURCE_NAME, format!("interrupt polling: {}", err));
                    return;
                }
            }

            let changes = match self.port.take_changes() {
                Ok(changes) => changes,
                Err(err) => {
                    report_failure(&events, SOURCE_NAME, format!("reading switches: {}", err));
                    return;
                }
            };

            for change in changes {
                let event = InputEvent::Switch {
                    pin: change.pin,
                    direction: change.direction,
                };
                tracing::debug!(event = %event, "Switch event");
                if events.send(event).is_err() {
                    tracing::debug!("Input listener gone, stopping switch source");
                    return;
                }
            }
        }
    }
}

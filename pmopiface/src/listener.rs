//! Boucle d'écoute des événements d'entrée.
//!
//! Les sources (boutons, lircd, stdin) tournent chacune dans leur thread et
//! ne font qu'envoyer des [`InputEvent`] dans un canal. Un seul thread appelle
//! [`EventListener::activate`] : les handlers sont donc exécutés un par un,
//! dans l'ordre d'arrivée, avec un accès exclusif au contexte.

use crossbeam_channel::{Receiver, Sender, unbounded};

use crate::error::CadError;
use crate::event::{Direction, InputEvent};

/// Condition de déclenchement d'un handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    /// Un bouton précis dans un sens précis.
    Switch { pin: u8, direction: Direction },
    /// Une touche de télécommande (comparaison insensible à la casse).
    Ir { code: String },
    /// N'importe quelle touche de télécommande.
    AnyIr,
}

impl Trigger {
    pub fn switch_on(pin: u8) -> Self {
        Trigger::Switch {
            pin,
            direction: Direction::On,
        }
    }

    pub fn ir(code: impl Into<String>) -> Self {
        Trigger::Ir {
            code: code.into().to_lowercase(),
        }
    }

    pub fn matches(&self, event: &InputEvent) -> bool {
        match (self, event) {
            (
                Trigger::Switch { pin, direction },
                InputEvent::Switch {
                    pin: event_pin,
                    direction: event_direction,
                },
            ) => pin == event_pin && direction == event_direction,
            (Trigger::Ir { code }, InputEvent::Ir { code: event_code }) => {
                code.eq_ignore_ascii_case(event_code)
            }
            (Trigger::AnyIr, InputEvent::Ir { .. }) => true,
            _ => false,
        }
    }
}

type Handler<C, E> = Box<dyn FnMut(&mut C, &InputEvent) -> Result<(), E> + Send>;

struct Registration<C, E> {
    trigger: Trigger,
    handler: Handler<C, E>,
}

/// Associe des [`Trigger`] à des handlers et les exécute en série.
///
/// Le contexte `C` (typiquement le contrôleur de la radio) est passé
/// explicitement à chaque handler au lieu d'être capturé globalement.
pub struct EventListener<C, E> {
    registrations: Vec<Registration<C, E>>,
    sender: Option<Sender<InputEvent>>,
    receiver: Receiver<InputEvent>,
}

impl<C, E> Default for EventListener<C, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C, E> EventListener<C, E> {
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self {
            registrations: Vec::new(),
            sender: Some(sender),
            receiver,
        }
    }

    /// Enregistre `handler` pour les événements correspondant à `trigger`.
    ///
    /// Plusieurs handlers peuvent partager un même trigger ; ils sont appelés
    /// dans l'ordre d'enregistrement.
    pub fn register<F>(&mut self, trigger: Trigger, handler: F)
    where
        F: FnMut(&mut C, &InputEvent) -> Result<(), E> + Send + 'static,
    {
        tracing::debug!(trigger = ?trigger, "Registering input handler");
        self.registrations.push(Registration {
            trigger,
            handler: Box::new(handler),
        });
    }

    pub fn registered(&self) -> usize {
        self.registrations.len()
    }

    /// Canal sur lequel les sources publient leurs événements.
    ///
    /// Doit être appelé avant [`EventListener::activate`].
    pub fn sender(&self) -> Option<Sender<InputEvent>> {
        self.sender.clone()
    }

    fn dispatch(&mut self, context: &mut C, event: &InputEvent) -> Result<(), E> {
        let mut handled = false;
        for registration in self
            .registrations
            .iter_mut()
            .filter(|r| r.trigger.matches(event))
        {
            handled = true;
            (registration.handler)(context, event)?;
        }
        if handled {
            tracing::debug!(event = %event, "Input event dispatched");
        } else {
            tracing::trace!(event = %event, "No handler for input event");
        }
        Ok(())
    }
}

impl<C, E: From<CadError>> EventListener<C, E> {
    /// Bloque et distribue les événements jusqu'à réception de
    /// [`InputEvent::Shutdown`] ou fermeture de toutes les sources.
    ///
    /// La première erreur renvoyée par un handler arrête la boucle et est
    /// propagée, tout comme un [`InputEvent::SourceFailed`].
    pub fn activate(&mut self, context: &mut C) -> Result<(), E> {
        // Sans notre propre émetteur, la boucle se termine quand la dernière source disparaît
        self.sender = None;
        tracing::info!(handlers = self.registrations.len(), "Input listener active");

        while let Ok(event) = self.receiver.recv() {
            match event {
                InputEvent::Shutdown => {
                    tracing::info!("Shutdown requested, leaving input listener");
                    return Ok(());
                }
                InputEvent::SourceFailed { name, reason } => {
                    tracing::error!(source = %name, "Input source failed: {}", reason);
                    return Err(CadError::SourceFailed { name, reason }.into());
                }
                event => self.dispatch(context, &event)?,
            }
        }

        tracing::info!("All input sources closed, leaving input listener");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[derive(Default)]
    struct Counter {
        calls: Vec<String>,
    }

    #[derive(Debug, PartialEq)]
    enum TestError {
        Handler(&'static str),
        Source(String),
    }

    impl From<CadError> for TestError {
        fn from(err: CadError) -> Self {
            TestError::Source(err.to_string())
        }
    }

    #[test]
    fn test_trigger_matching() {
        assert!(Trigger::switch_on(2).matches(&InputEvent::switch_pressed(2)));
        assert!(!Trigger::switch_on(2).matches(&InputEvent::switch_pressed(3)));
        assert!(!Trigger::switch_on(2).matches(&InputEvent::Switch {
            pin: 2,
            direction: Direction::Off
        }));
        assert!(Trigger::ir("KEY_PLAY").matches(&InputEvent::ir("key_play")));
        assert!(Trigger::AnyIr.matches(&InputEvent::ir("7")));
        assert!(!Trigger::AnyIr.matches(&InputEvent::switch_pressed(0)));
    }

    #[test]
    fn test_events_are_dispatched_in_order_until_shutdown() {
        let mut listener: EventListener<Counter, TestError> = EventListener::new();
        listener.register(Trigger::switch_on(0), |ctx, _| {
            ctx.calls.push("toggle".into());
            Ok(())
        });
        listener.register(Trigger::AnyIr, |ctx, event| {
            ctx.calls.push(format!("preset {:?}", event.number()));
            Ok(())
        });

        let tx = listener.sender().unwrap();
        tx.send(InputEvent::switch_pressed(0)).unwrap();
        tx.send(InputEvent::switch_pressed(5)).unwrap();
        tx.send(InputEvent::ir("4")).unwrap();
        tx.send(InputEvent::Shutdown).unwrap();
        tx.send(InputEvent::switch_pressed(0)).unwrap();

        let mut ctx = Counter::default();
        listener.activate(&mut ctx).unwrap();
        assert_eq!(ctx.calls, vec!["toggle", "preset Some(4)"]);
    }

    #[test]
    fn test_handler_error_stops_the_loop() {
        let mut listener: EventListener<Counter, TestError> = EventListener::new();
        listener.register(Trigger::switch_on(1), |_, _| Err(TestError::Handler("boom")));
        listener.register(Trigger::switch_on(2), |ctx, _| {
            ctx.calls.push("next".into());
            Ok(())
        });

        let tx = listener.sender().unwrap();
        tx.send(InputEvent::switch_pressed(1)).unwrap();
        tx.send(InputEvent::switch_pressed(2)).unwrap();

        let mut ctx = Counter::default();
        assert_eq!(listener.activate(&mut ctx), Err(TestError::Handler("boom")));
        assert!(ctx.calls.is_empty());
    }

    #[test]
    fn test_loop_ends_when_sources_are_gone() {
        let mut listener: EventListener<Counter, TestError> = EventListener::new();
        listener.register(Trigger::switch_on(0), |ctx, _| {
            ctx.calls.push("toggle".into());
            Ok(())
        });

        let tx = listener.sender().unwrap();
        let source = thread::spawn(move || {
            tx.send(InputEvent::switch_pressed(0)).unwrap();
        });
        source.join().unwrap();

        let mut ctx = Counter::default();
        listener.activate(&mut ctx).unwrap();
        assert_eq!(ctx.calls, vec!["toggle"]);
    }

    #[test]
    fn test_failed_source_ends_the_loop_with_an_error() {
        let mut listener: EventListener<Counter, TestError> = EventListener::new();
        listener.register(Trigger::switch_on(0), |ctx, _| {
            ctx.calls.push("toggle".into());
            Ok(())
        });

        // Un second émetteur reste vivant, comme celui du relais des signaux
        let signals = listener.sender().unwrap();
        let tx = listener.sender().unwrap();
        let source = thread::spawn(move || {
            tx.send(InputEvent::switch_pressed(0)).unwrap();
            tx.send(InputEvent::source_failed("piface-switches", "SPI transfer failed"))
                .unwrap();
        });
        source.join().unwrap();

        let mut ctx = Counter::default();
        assert_eq!(
            listener.activate(&mut ctx),
            Err(TestError::Source(
                "Input source piface-switches failed: SPI transfer failed".to_string()
            ))
        );
        assert_eq!(ctx.calls, vec!["toggle"]);
        drop(signals);
    }
}

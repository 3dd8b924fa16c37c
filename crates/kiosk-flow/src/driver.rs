//! Async driver around [`FlowController`].
//!
//! The driver multiplexes three inputs with `tokio::select!`: user actions from
//! an mpsc channel, runtime notifications, and completions of the background
//! tasks it spawned (liveness checks and timers). Each input goes through the
//! controller and the returned effects are applied against the runtime.
//! Runtime call failures are logged and never end the loop. The rendered
//! screen is published on a watch channel after every step.

use std::time::Duration;

use kiosk_core::{KioskConfig, ServiceName, ServiceStatus};
use kiosk_peripherals::{KioskEvent, KioskRuntime, LivenessProbe, PeripheralError};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::controller::{FlowController, RuntimeSnapshot, UiAction};
use crate::display::Screen;
use crate::effects::{Effect, LivenessOutcome};

/// Completion of a background task.
#[derive(Debug)]
enum Signal {
    Liveness { run: u64, outcome: LivenessOutcome },
    ThanksElapsed(u64),
    StatusRestore,
}

enum Wake {
    Action(Option<UiAction>),
    Event(kiosk_peripherals::Result<kiosk_peripherals::RawEvent>),
    Task(Signal),
}

pub struct KioskDriver<R, P> {
    runtime: R,
    probe: P,
    controller: FlowController,
    tasks: JoinSet<Signal>,
    screen_tx: watch::Sender<Screen>,
    liveness_timeout: Duration,
}

impl<R, P> KioskDriver<R, P>
where
    R: KioskRuntime,
    P: LivenessProbe + Clone + 'static,
{
    pub fn new(runtime: R, probe: P, config: KioskConfig) -> Self {
        let liveness_timeout = config.liveness.timeout();
        let controller = FlowController::new(config);
        let (screen_tx, _) = watch::channel(controller.screen().clone());
        Self {
            runtime,
            probe,
            controller,
            tasks: JoinSet::new(),
            screen_tx,
            liveness_timeout,
        }
    }

    /// Receiver of every rendered screen.
    pub fn subscribe_screen(&self) -> watch::Receiver<Screen> {
        self.screen_tx.subscribe()
    }

    pub fn controller(&self) -> &FlowController {
        &self.controller
    }

    /// Query the runtime for services, statuses and application properties,
    /// then initialize the controller.
    pub async fn initialize(&mut self) {
        let names = match self.runtime.services().await {
            Ok(names) => names,
            Err(err) => {
                error!("cannot list services: {}", err);
                Vec::new()
            }
        };

        let mut services = Vec::with_capacity(names.len());
        for name in names {
            let status = match self.runtime.service_status(&name).await {
                Ok(status) => status,
                Err(err) => {
                    warn!("cannot read status of {}: {}", name, err);
                    ServiceStatus::Unknown
                }
            };
            services.push((name, status));
        }

        let description = self.runtime.app_description().await.unwrap_or_else(|err| {
            warn!("cannot read application description: {}", err);
            String::new()
        });

        let barcode_auto_trigger = if services
            .iter()
            .any(|(name, _)| *name == ServiceName::BarcodeReading)
        {
            match self.runtime.barcode_auto_trigger().await {
                Ok(auto) => Some(auto),
                Err(err) => {
                    warn!("cannot read barcode trigger mode: {}", err);
                    Some(false)
                }
            }
        } else {
            None
        };

        info!("application starting with {} services", services.len());
        let effects = self.controller.initialize(RuntimeSnapshot {
            services,
            description,
            barcode_auto_trigger,
        });
        self.apply(effects).await;
        self.publish();
    }

    /// Run until a shutdown action arrives, the action channel closes or the
    /// runtime disconnects. Returns the controller in its final state.
    pub async fn run(mut self, mut actions: mpsc::Receiver<UiAction>) -> FlowController {
        loop {
            let wake = tokio::select! {
                action = actions.recv() => Wake::Action(action),
                event = self.runtime.next_event() => Wake::Event(event),
                Some(joined) = self.tasks.join_next(), if !self.tasks.is_empty() => {
                    match joined {
                        Ok(signal) => Wake::Task(signal),
                        Err(err) => {
                            error!("background task failed: {}", err);
                            continue;
                        }
                    }
                }
            };

            let effects = match wake {
                Wake::Action(Some(UiAction::Shutdown)) | Wake::Action(None) => {
                    info!("shutting down");
                    let effects = self.controller.shutdown();
                    self.apply(effects).await;
                    self.publish();
                    break;
                }
                Wake::Action(Some(action)) => {
                    debug!("ui action: {:?}", action);
                    self.controller.apply(action)
                }
                Wake::Event(Ok(raw)) => match KioskEvent::decode(raw) {
                    Ok(event) => self.controller.handle_event(event),
                    Err(err) => {
                        warn!("undecodable notification: {}", err);
                        continue;
                    }
                },
                Wake::Event(Err(err @ PeripheralError::Disconnected { .. })) => {
                    error!("{}", err);
                    break;
                }
                Wake::Event(Err(err)) => {
                    warn!("runtime notification error: {}", err);
                    continue;
                }
                Wake::Task(Signal::Liveness { run, outcome }) => {
                    self.controller.on_liveness_result(run, outcome)
                }
                Wake::Task(Signal::ThanksElapsed(token)) => {
                    self.controller.on_thanks_elapsed(token)
                }
                Wake::Task(Signal::StatusRestore) => self.controller.on_status_restore(),
            };

            self.apply(effects).await;
            self.publish();
        }

        self.tasks.abort_all();
        self.controller
    }

    async fn apply(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Subscribe(subscription) => {
                    if let Err(err) = self.runtime.subscribe(&subscription).await {
                        error!("subscribe {} failed: {}", subscription, err);
                    }
                }
                Effect::Unsubscribe(subscription) => {
                    if let Err(err) = self.runtime.unsubscribe(&subscription).await {
                        error!("unsubscribe {} failed: {}", subscription, err);
                    }
                }
                Effect::Execute(command) => {
                    if let Err(err) = self.runtime.execute(&command).await {
                        error!("{} failed: {}", command, err);
                    }
                }
                Effect::CheckLiveness { run } => {
                    let probe = self.probe.clone();
                    let timeout = self.liveness_timeout;
                    self.tasks.spawn(async move {
                        let outcome = match tokio::time::timeout(timeout, probe.probe()).await {
                            Ok(Ok(status)) => LivenessOutcome::Status(status),
                            Ok(Err(err)) => LivenessOutcome::Failed(err.to_string()),
                            Err(_) => LivenessOutcome::Failed(format!(
                                "no answer after {}ms",
                                timeout.as_millis()
                            )),
                        };
                        Signal::Liveness { run, outcome }
                    });
                }
                Effect::ScheduleThanksReturn { token, after } => {
                    self.tasks.spawn(async move {
                        tokio::time::sleep(after).await;
                        Signal::ThanksElapsed(token)
                    });
                }
                Effect::ScheduleStatusRestore { after } => {
                    self.tasks.spawn(async move {
                        tokio::time::sleep(after).await;
                        Signal::StatusRestore
                    });
                }
            }
        }
    }

    fn publish(&self) {
        self.screen_tx.send_replace(self.controller.screen().clone());
    }
}

//! Autonomous commands that drive the catapult machine.
//!
//! Commands never mutate the catapult directly.  They send messages
//! through a [`MachineClient`] and poll the observed state, so a
//! routine that waits for `ReadyToFire` works whether the reload took
//! one tick or two hundred.

use std::time::Duration;

use sling_command::{AutoCommand, Command, InOrder};
use sling_machine::MachineClient;
use tracing::debug;

use crate::cata::{CataGraph, CataId, CataMessage};

/// Sends one message to the catapult machine and finishes immediately.
pub struct SignalCata {
    client: MachineClient<CataGraph>,
    message: CataMessage,
}

impl SignalCata {
    pub fn new(client: MachineClient<CataGraph>, message: CataMessage) -> Self {
        Self { client, message }
    }
}

impl AutoCommand for SignalCata {
    fn run(&mut self) -> bool {
        debug!(message = ?self.message, "signaling catapult");
        self.client.send_message(self.message);
        true
    }

    fn duplicate(&self) -> Box<dyn AutoCommand> {
        Box::new(Self {
            client: self.client.clone(),
            message: self.message,
        })
    }
}

/// Finishes once the catapult machine reports the wanted state.
///
/// Pair this with a timeout: a machine that never reaches the wanted
/// state would otherwise block its routine forever.
pub struct AwaitCataState {
    client: MachineClient<CataGraph>,
    want: CataId,
}

impl AwaitCataState {
    pub fn new(client: MachineClient<CataGraph>, want: CataId) -> Self {
        Self { client, want }
    }
}

impl AutoCommand for AwaitCataState {
    fn run(&mut self) -> bool {
        self.client.current_state() == self.want
    }

    fn on_timeout(&mut self) {
        debug!(want = ?self.want, observed = ?self.client.current_state(), "gave up waiting for catapult state");
    }

    fn duplicate(&self) -> Box<dyn AutoCommand> {
        Box::new(Self {
            client: self.client.clone(),
            want: self.want,
        })
    }
}

/// One full shot: wait until cocked, fire, confirm release, and wait
/// for the automatic reload to finish.
///
/// Each wait carries its own timeout so a mechanical failure degrades
/// to a skipped shot instead of a wedged autonomous routine.
pub fn fire_and_reload(client: MachineClient<CataGraph>) -> Command {
    let steps = vec![
        Command::new(AwaitCataState::new(client.clone(), CataId::ReadyToFire))
            .with_timeout(Duration::from_secs(3)),
        Command::new(SignalCata::new(client.clone(), CataMessage::Fire)),
        Command::new(AwaitCataState::new(client.clone(), CataId::Firing))
            .with_timeout(Duration::from_millis(500)),
        Command::new(AwaitCataState::new(client, CataId::ReadyToFire))
            .with_timeout(Duration::from_secs(3)),
    ];
    Command::new(InOrder::new(steps))
}

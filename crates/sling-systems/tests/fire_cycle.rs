//! End-to-end shot cycle: a spawned catapult machine on simulated
//! hardware, driven by the `fire_and_reload` routine through a
//! command controller, with a plant task standing in for physics.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use sling_command::CommandController;
use sling_hal::{PidController, SimAngleSensor, SimMotorGroup};
use sling_machine::StateMachine;
use sling_systems::{
    CataGraph, CataId, CataSystem, CataTuning, DropMode, fire_and_reload,
};

#[tokio::test]
async fn full_shot_cycle_on_sim_hardware() {
    let sensor = SimAngleSensor::new(100.0);
    let motor = SimMotorGroup::new("cata");
    let feedback = PidController::new(0.5, 0.0, 0.0).with_target_window(2.0);
    let system = CataSystem::new(
        Box::new(motor.clone()),
        Arc::new(sensor.clone()),
        Box::new(feedback),
        CataTuning::default(),
    );

    let machine = StateMachine::spawn(
        system,
        CataGraph::initial(DropMode::Unnecessary),
        Duration::from_millis(1),
    );
    let client = machine.client();

    // Plant: whenever the machine fires, the arm swings up past the
    // release threshold; whenever it reloads, the arm gets drawn back
    // down to the ready angle.
    let seen = Arc::new(Mutex::new(Vec::<CataId>::new()));
    let plant = {
        let client = machine.client();
        let sensor = sensor.clone();
        let seen = Arc::clone(&seen);
        tokio::spawn(async move {
            loop {
                let state = client.current_state();
                {
                    let mut log = seen.lock().unwrap();
                    if log.last() != Some(&state) {
                        log.push(state);
                    }
                }
                match state {
                    CataId::Firing => sensor.set_degrees(10.0),
                    CataId::Reloading => sensor.set_degrees(100.0),
                    _ => {}
                }
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        })
    };

    let mut controller = CommandController::with_tick(Duration::from_millis(1));
    controller.add(fire_and_reload(client.clone()));
    controller.run().await;
    plant.abort();

    assert_eq!(client.current_state(), CataId::ReadyToFire);
    let seen = seen.lock().unwrap();
    assert!(
        seen.contains(&CataId::Firing),
        "shot must pass through Firing, saw {seen:?}"
    );
    assert!(
        motor.stop_count() >= 1,
        "motor stopped after the shot completed"
    );
}

//! One simulation step of a piece of thermostatic equipment.

use chrono::NaiveDateTime;

use crate::error::EquipmentResult;
use crate::results::{AmbientConditions, StepResults};
use crate::traits::ThermostaticEquipment;

/// Inputs for one step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepContext {
    /// Start of the step.
    pub now: NaiveDateTime,
    pub ambient: AmbientConditions,
}

/// Run one step: decide the mode (or duty cycles in ideal mode), inject the
/// resulting heat into the tank and commit the new tank states.
///
/// Minimum time in mode applies to thermostat decisions only; in ideal mode
/// the reported mode follows the largest duty cycle.
pub fn run_step<E: ThermostaticEquipment + ?Sized>(
    equipment: &mut E,
    ctx: &StepContext,
) -> EquipmentResult<StepResults> {
    equipment
        .heater_mut()
        .tank_mut()
        .set_ambient(ctx.ambient.zone_temp_c)?;
    equipment.prepare(ctx)?;

    let mut heats = vec![0.0; equipment.heater().tank().n_nodes()];
    if equipment.heater().use_ideal_mode() {
        let duty = equipment.solve_capacity(ctx)?;
        for (mode, fraction) in duty.iter() {
            equipment.compute_heat_injection(mode, fraction, &mut heats);
        }
        let heater = equipment.heater_mut();
        heater.timer.force(duty.dominant_mode(), ctx.now);
        heater.duty = Some(duty);
    } else {
        let requested = equipment.choose_mode(ctx)?;
        let heater = equipment.heater_mut();
        let mode = heater.timer.request(requested, ctx.now);
        heater.duty = None;
        equipment.compute_heat_injection(mode, 1.0, &mut heats);
    }

    let mut output = equipment.power_and_gains(ctx, &mut heats)?;
    let h_loss = equipment.heater().tank().h_loss()?;
    equipment.add_tank_losses(h_loss, &mut output);

    let tank = equipment.heater_mut().tank_mut();
    tank.update(&heats)?;
    tank.commit();

    let heater = equipment.heater();
    Ok(StepResults {
        time: ctx.now,
        mode: heater.mode(),
        duty_cycles: heater.duty_cycles().cloned(),
        output,
        setpoint_c: heater.setpoint(),
        deadband_c: heater.deadband(),
        heat_pump: equipment.heat_pump_report(),
    })
}

//! Stratified water tank as an RC network.
//!
//! Nodes `WH1` (top) to `WHn` (bottom) each hold an equal share of the water
//! volume, lose heat to the ambient node `AMB` and conduct to their vertical
//! neighbors.

use nalgebra::DVector;
use tn_core::{Time, constants::WATER_HEAT_CAPACITY_J_PER_L_K, ensure_positive};
use tn_network::RcParam;
use tn_statespace::{RcModel, RcModelConfig, StateSpaceModel};

use crate::error::{EquipmentError, EquipmentResult};

pub const AMBIENT_NODE: &str = "AMB";

#[derive(Debug, Clone, PartialEq)]
pub struct WaterTankConfig {
    pub nodes: usize,
    /// Total water volume, L.
    pub volume_l: f64,
    /// Overall loss coefficient to ambient, W/K.
    pub ua_w_per_k: f64,
    /// Conduction resistance between adjacent nodes, K/W.
    pub node_resistance_k_per_w: f64,
    pub initial_temp_c: f64,
}

impl Default for WaterTankConfig {
    fn default() -> Self {
        Self {
            nodes: 2,
            volume_l: 189.3,
            ua_w_per_k: 2.2,
            node_resistance_k_per_w: 0.1,
            initial_temp_c: 51.67,
        }
    }
}

#[derive(Debug, Clone)]
pub struct WaterTank {
    rc: RcModel,
    /// Loss resistance of each node to ambient, K/W.
    r_loss: f64,
}

impl WaterTank {
    pub fn new(config: &WaterTankConfig, time_res: Time) -> EquipmentResult<Self> {
        let n = config.nodes;
        if n == 0 {
            return Err(EquipmentError::InvalidArg {
                what: "tank needs at least one node".into(),
            });
        }
        for (what, v) in [
            ("volume", config.volume_l),
            ("UA", config.ua_w_per_k),
            ("node resistance", config.node_resistance_k_per_w),
        ] {
            ensure_positive(v, what).map_err(|e| EquipmentError::InvalidArg {
                what: format!("tank {e}"),
            })?;
        }

        let c_node = config.volume_l / n as f64 * WATER_HEAT_CAPACITY_J_PER_L_K;
        let r_loss = n as f64 / config.ua_w_per_k;
        let mut params = Vec::with_capacity(3 * n);
        for k in 1..=n {
            params.push(RcParam::capacitor(format!("WH{k}"), c_node));
            params.push(RcParam::resistor(format!("WH{k}"), AMBIENT_NODE, r_loss));
            if k < n {
                params.push(RcParam::resistor(
                    format!("WH{k}"),
                    format!("WH{}", k + 1),
                    config.node_resistance_k_per_w,
                ));
            }
        }

        let rc_config = RcModelConfig::new("Water Tank", time_res)
            .with_initial_states(vec![config.initial_temp_c; n]);
        let rc = RcModel::from_params(&params, &[AMBIENT_NODE], rc_config)?;
        Ok(Self { rc, r_loss })
    }

    pub fn rc(&self) -> &RcModel {
        &self.rc
    }

    pub fn into_rc(self) -> RcModel {
        self.rc
    }

    pub fn model(&self) -> &StateSpaceModel {
        self.rc.model()
    }

    pub fn model_mut(&mut self) -> &mut StateSpaceModel {
        self.rc.model_mut()
    }

    pub fn n_nodes(&self) -> usize {
        self.rc.n_nodes()
    }

    pub fn time_step_s(&self) -> f64 {
        self.model().time_step_s()
    }

    pub fn capacitances(&self) -> &[f64] {
        self.rc.capacitances()
    }

    /// State index of tank node `WH<number>` (1-based, top first).
    pub fn state_index(&self, number: usize) -> EquipmentResult<usize> {
        Ok(self.model().state_names().index(&format!("T_WH{number}"))?)
    }

    pub fn states(&self) -> &[f64] {
        self.model().states().as_slice()
    }

    pub fn set_states(&mut self, states: &[f64]) -> EquipmentResult<()> {
        self.model_mut()
            .set_states(DVector::from_column_slice(states))?;
        Ok(())
    }

    /// Zone temperature around the tank for the coming step.
    pub fn set_ambient(&mut self, temp_c: f64) -> EquipmentResult<()> {
        self.model_mut()
            .set_next_input(&format!("T_{AMBIENT_NODE}"), temp_c)?;
        Ok(())
    }

    pub fn ambient(&self) -> EquipmentResult<f64> {
        let idx = self
            .model()
            .input_names()
            .index(&format!("T_{AMBIENT_NODE}"))?;
        Ok(self.model().next_inputs()[idx])
    }

    /// Heat lost through the jacket to ambient, W (positive when the tank is warmer).
    pub fn h_loss(&self) -> EquipmentResult<f64> {
        let t_amb = self.ambient()?;
        Ok(self
            .states()
            .iter()
            .map(|t| (t - t_amb) / self.r_loss)
            .sum())
    }

    /// Next states with `heats` (W per node) added; not committed.
    pub fn update(&mut self, heats: &[f64]) -> EquipmentResult<Vec<f64>> {
        Ok(self.rc.update_with_heat(heats)?.iter().copied().collect())
    }

    pub fn commit(&mut self) {
        self.model_mut().commit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tn_core::s;

    fn tank(nodes: usize) -> WaterTank {
        let config = WaterTankConfig {
            nodes,
            initial_temp_c: 50.0,
            ..WaterTankConfig::default()
        };
        WaterTank::new(&config, s(60.0)).unwrap()
    }

    #[test]
    fn node_layout() {
        let t = tank(12);
        assert_eq!(t.n_nodes(), 12);
        assert_eq!(t.state_index(1).unwrap(), 0);
        assert_eq!(t.state_index(10).unwrap(), 9);
        assert_eq!(t.model().input_names().names()[0], "T_AMB");
        let total: f64 = t.capacitances().iter().sum();
        assert!((total - 189.3 * WATER_HEAT_CAPACITY_J_PER_L_K).abs() < 1e-6);
    }

    #[test]
    fn loss_matches_ua() {
        let mut t = tank(3);
        t.set_ambient(20.0).unwrap();
        let loss = t.h_loss().unwrap();
        assert!((loss - 2.2 * 30.0).abs() < 1e-9);
    }

    #[test]
    fn heat_raises_only_staged_state() {
        let mut t = tank(2);
        t.set_ambient(50.0).unwrap();
        let next = t.update(&[0.0, 4500.0]).unwrap();
        assert!(next[1] > 50.0);
        assert_eq!(t.states()[1], 50.0);
        t.commit();
        assert_eq!(t.states()[1], next[1]);
    }

    #[test]
    fn zero_nodes_rejected() {
        let config = WaterTankConfig {
            nodes: 0,
            ..WaterTankConfig::default()
        };
        assert!(WaterTank::new(&config, s(60.0)).is_err());
    }

    #[test]
    fn bad_volume_names_the_parameter() {
        for volume_l in [0.0, f64::NAN] {
            let config = WaterTankConfig {
                volume_l,
                ..WaterTankConfig::default()
            };
            match WaterTank::new(&config, s(60.0)) {
                Err(EquipmentError::InvalidArg { what }) => assert!(what.contains("volume")),
                other => panic!("expected invalid volume, got {other:?}"),
            }
        }
    }
}

//! 零力矩故障计数
//!
//! 巡航激活且车速高于最低转向车速时，转向伺服上报力矩连续为 0 的周期数。
//! 达到阈值即判定转向临时故障（伺服停止响应）。

use carlink_params::ZERO_TORQUE_FAULT_CYCLES;
use tracing::debug;

/// 故障计数器状态
///
/// 由估计器独占，可通过 `with_fault_state` 注入。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FaultCounterState {
    /// 连续零力矩周期数
    pub zero_torque_streak: u32,
    /// 上一周期巡航是否激活
    pub cruise_enabled_prev: bool,
}

impl FaultCounterState {
    /// 推进一个周期，返回本周期是否处于转向临时故障
    ///
    /// - 巡航由未激活变为激活：计数清零（与车速无关）
    /// - 巡航激活且车速高于 `min_steer_speed`：力矩恰为 0 则 +1，否则清零
    /// - 其余情况：计数保持不变
    pub fn update(
        &mut self,
        cruise_enabled: bool,
        v_ego: f64,
        steering_torque: f64,
        min_steer_speed: f64,
    ) -> bool {
        let was_faulted = self.is_faulted();

        if cruise_enabled && !self.cruise_enabled_prev {
            self.zero_torque_streak = 0;
        }

        if cruise_enabled && v_ego > min_steer_speed {
            if steering_torque == 0.0 {
                self.zero_torque_streak = self.zero_torque_streak.saturating_add(1);
            } else {
                self.zero_torque_streak = 0;
            }
        }

        self.cruise_enabled_prev = cruise_enabled;

        let faulted = self.is_faulted();
        if faulted != was_faulted {
            debug!(
                streak = self.zero_torque_streak,
                faulted, "zero-torque steer fault changed"
            );
        }
        faulted
    }

    /// 计数是否已达到故障阈值
    pub fn is_faulted(&self) -> bool {
        self.zero_torque_streak >= ZERO_TORQUE_FAULT_CYCLES
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const SPEED: f64 = 20.0;
    const MIN_STEER_SPEED: f64 = 5.0;

    fn run(state: &mut FaultCounterState, cycles: u32, enabled: bool, v_ego: f64, torque: f64) -> bool {
        let mut faulted = false;
        for _ in 0..cycles {
            faulted = state.update(enabled, v_ego, torque, MIN_STEER_SPEED);
        }
        faulted
    }

    #[test]
    fn test_fault_at_exactly_1000_cycles() {
        let mut state = FaultCounterState::default();

        assert!(!run(&mut state, 999, true, SPEED, 0.0));
        assert_eq!(state.zero_torque_streak, 999);

        assert!(state.update(true, SPEED, 0.0, MIN_STEER_SPEED));
        assert_eq!(state.zero_torque_streak, 1000);
    }

    #[test]
    fn test_nonzero_torque_resets() {
        let mut state = FaultCounterState::default();
        run(&mut state, 500, true, SPEED, 0.0);
        assert_eq!(state.zero_torque_streak, 500);

        assert!(!state.update(true, SPEED, 0.3, MIN_STEER_SPEED));
        assert_eq!(state.zero_torque_streak, 0);
    }

    #[test]
    fn test_enable_transition_resets_even_at_low_speed() {
        let mut state = FaultCounterState {
            zero_torque_streak: 1200,
            cruise_enabled_prev: false,
        };
        assert!(!state.update(true, 1.0, 0.0, MIN_STEER_SPEED));
        assert_eq!(state.zero_torque_streak, 0);
    }

    #[test]
    fn test_paused_when_cruise_disabled() {
        let mut state = FaultCounterState::default();
        run(&mut state, 300, true, SPEED, 0.0);

        run(&mut state, 50, false, SPEED, 0.0);
        assert_eq!(state.zero_torque_streak, 300);
        assert!(!state.cruise_enabled_prev);
    }

    #[test]
    fn test_paused_below_min_steer_speed() {
        let mut state = FaultCounterState::default();
        run(&mut state, 300, true, SPEED, 0.0);

        run(&mut state, 50, true, MIN_STEER_SPEED, 0.0);
        assert_eq!(state.zero_torque_streak, 300);

        run(&mut state, 10, true, SPEED, 0.0);
        assert_eq!(state.zero_torque_streak, 310);
    }

    #[test]
    fn test_fault_persists_while_paused() {
        let mut state = FaultCounterState::default();
        assert!(run(&mut state, 1000, true, SPEED, 0.0));
        assert!(state.update(true, 0.0, 0.0, MIN_STEER_SPEED));
    }

    #[test]
    fn test_reenable_clears_fault() {
        let mut state = FaultCounterState::default();
        run(&mut state, 1000, true, SPEED, 0.0);
        state.update(false, SPEED, 0.0, MIN_STEER_SPEED);

        assert!(!state.update(true, SPEED, 0.0, MIN_STEER_SPEED));
        assert_eq!(state.zero_torque_streak, 1);
    }

    proptest! {
        /// 巡航持续激活、车速足够时，故障当且仅当末尾连续零力矩周期数 ≥ 1000
        #[test]
        fn prop_fault_matches_trailing_zero_run(
            prefix in proptest::collection::vec(any::<bool>(), 0..50),
            trailing in 0u32..1500,
        ) {
            let mut state = FaultCounterState::default();
            let mut expected_run = 0u32;
            let mut faulted = false;

            for zero in prefix {
                let torque = if zero { 0.0 } else { 1.0 };
                faulted = state.update(true, SPEED, torque, MIN_STEER_SPEED);
                expected_run = if zero { expected_run + 1 } else { 0 };
            }
            for _ in 0..trailing {
                faulted = state.update(true, SPEED, 0.0, MIN_STEER_SPEED);
                expected_run += 1;
            }

            prop_assert_eq!(state.zero_torque_streak, expected_run);
            prop_assert_eq!(faulted, expected_run >= ZERO_TORQUE_FAULT_CYCLES);
        }

        /// 计数只会在巡航激活时增长
        #[test]
        fn prop_streak_never_grows_while_disabled(
            start in 0u32..2000,
            torques in proptest::collection::vec(0.0..1.0f64, 1..100),
        ) {
            let mut state = FaultCounterState { zero_torque_streak: start, cruise_enabled_prev: false };
            for torque in torques {
                state.update(false, SPEED, torque, MIN_STEER_SPEED);
                prop_assert_eq!(state.zero_torque_streak, start);
            }
        }
    }
}

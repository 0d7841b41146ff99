//! Motion-monitor status transitions.
//!
//! `NotMonitored → SetpointNotReachedYet → SetpointReached`. The dispatch
//! layer only ever resets progress: a monitor-mode change away from
//! do-not-monitor, or a new setpoint under monitor-forever once reached.
//! `SetpointReached` comes from the controller's progress reporter.

use mc_common::motion::state::{MotionMonitorMode, MotionMonitorStatus};

/// Events that drive the monitor status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorEvent {
    /// Monitor mode written.
    ModeChanged(MotionMonitorMode),
    /// New setpoint received while the joint is configured with this mode.
    NewSetpoint(MotionMonitorMode),
    /// Controller reports the active setpoint as reached.
    SetpointReached,
}

/// Status following `current` after `event`. Total: every pair has an answer.
pub const fn next_status(current: MotionMonitorStatus, event: MonitorEvent) -> MotionMonitorStatus {
    use MonitorEvent as E;
    use MotionMonitorMode as M;
    use MotionMonitorStatus as S;

    match (current, event) {
        // A fresh mode always restarts tracking.
        (_, E::ModeChanged(M::DontMonitor)) => S::NotMonitored,
        (_, E::ModeChanged(M::Once | M::Forever)) => S::SetpointNotReachedYet,

        (S::SetpointReached, E::NewSetpoint(M::Forever)) => S::SetpointNotReachedYet,
        (s, E::NewSetpoint(_)) => s,

        (S::SetpointNotReachedYet, E::SetpointReached) => S::SetpointReached,
        (s, E::SetpointReached) => s,
    }
}

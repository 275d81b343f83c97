//! Timeout budgets for readiness waits.

use std::time::Duration;

const DEPLOYMENT: Duration = Duration::from_secs(10 * 60);
const SERVICE_LOAD_BALANCER: Duration = Duration::from_secs(5 * 60);
const POD_READY: Duration = Duration::from_secs(5 * 60);

/// Fixed interval between readiness polls. Not affected by the
/// multiplier.
pub const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Wait budgets, scaled by a caller-supplied multiplier for slow
/// clusters.
#[derive(Debug, Clone, Copy)]
pub struct Timeouts {
    multiplier: u32,
}

impl Timeouts {
    pub fn new(multiplier: u32) -> Self {
        Self {
            multiplier: multiplier.max(1),
        }
    }

    /// Budget for parts of a deployment to become ready (CRDs, jobs).
    pub fn deployment(&self) -> Duration {
        DEPLOYMENT * self.multiplier
    }

    /// Budget for a service to be assigned a load balancer.
    pub fn load_balancer(&self) -> Duration {
        SERVICE_LOAD_BALANCER * self.multiplier
    }

    /// Budget for selected pods to report ready.
    pub fn pod_ready(&self) -> Duration {
        POD_READY * self.multiplier
    }
}

impl Default for Timeouts {
    fn default() -> Self {
        Self::new(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multiplier_scales_budgets() {
        let timeouts = Timeouts::new(3);
        assert_eq!(timeouts.pod_ready(), POD_READY * 3);
        assert_eq!(timeouts.deployment(), DEPLOYMENT * 3);
    }

    #[test]
    fn zero_multiplier_clamps_to_one() {
        let timeouts = Timeouts::new(0);
        assert_eq!(timeouts.pod_ready(), POD_READY);
    }
}

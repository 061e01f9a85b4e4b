use std::fmt;

/// Health of a container as seen by the exporter.
///
/// The discriminants form a severity scale consumed by alerting rules, so the
/// numeric values are part of the exposed contract and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HealthStatus {
    /// Container is not running.
    Crit = -2,
    /// Running, but in a transitional or unknown health state.
    Fail = -1,
    /// Running, healthcheck reports unhealthy.
    Unhealthy = 0,
    /// Running without a configured healthcheck.
    Running = 1,
    /// Running, healthcheck reports healthy.
    Healthy = 2,
}

impl HealthStatus {
    /// Numeric value exported as the gauge sample.
    pub fn value(self) -> i8 {
        self as i8
    }

    /// Tag exported as the `status_text` label.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Crit => "CRIT",
            Self::Fail => "FAIL",
            Self::Unhealthy => "UNHEALTHY",
            Self::Running => "RUNNING",
            Self::Healthy => "HEALTHY",
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw state of a container as reported by the runtime.
///
/// Every field has a "not present" default so that partial inspection data
/// still classifies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerState {
    /// Lifecycle status, e.g. `running`, `exited`, `restarting`, `paused`.
    pub lifecycle: String,
    pub running: bool,
    pub restarting: bool,
    pub exit_code: Option<i64>,
    /// Healthcheck status; `None` if no healthcheck is configured.
    pub health: Option<String>,
}

/// Outcome of classifying a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// The container exited successfully and is not a long running service.
    Omit,
    Status(HealthStatus),
}

/// Maps the raw runtime state of a container onto the health taxonomy.
///
/// The checks are evaluated in order and the first match wins:
///
/// 1. `exited` with exit code `0` is a finished one-shot job and is omitted.
/// 2. `restarting` (status or flag) is [`HealthStatus::Fail`].
/// 3. Not running is [`HealthStatus::Crit`].
/// 4. No healthcheck is [`HealthStatus::Running`].
/// 5. `healthy` / `unhealthy` map to their counterparts.
/// 6. Any other health status (e.g. `starting`) is [`HealthStatus::Fail`].
///
/// # Examples
///
/// ```
/// # use docker_healthcheck_exporter::container::{classify, Classification, ContainerState, HealthStatus};
/// let state = ContainerState {
///     lifecycle: "running".to_owned(),
///     running: true,
///     health: Some("healthy".to_owned()),
///     ..Default::default()
/// };
/// assert_eq!(classify(&state), Classification::Status(HealthStatus::Healthy));
/// ```
pub fn classify(state: &ContainerState) -> Classification {
    if state.lifecycle == "exited" && state.exit_code == Some(0) {
        return Classification::Omit;
    }

    let status = if state.lifecycle == "restarting" || state.restarting {
        HealthStatus::Fail
    } else if !state.running {
        HealthStatus::Crit
    } else {
        match state.health.as_deref() {
            None => HealthStatus::Running,
            Some("healthy") => HealthStatus::Healthy,
            Some("unhealthy") => HealthStatus::Unhealthy,
            Some(_) => HealthStatus::Fail,
        }
    };

    Classification::Status(status)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running(health: Option<&str>) -> ContainerState {
        ContainerState {
            lifecycle: "running".to_owned(),
            running: true,
            health: health.map(str::to_owned),
            ..Default::default()
        }
    }

    #[test]
    fn test_taxonomy_values_and_tags() {
        let expected = [
            (HealthStatus::Crit, -2, "CRIT"),
            (HealthStatus::Fail, -1, "FAIL"),
            (HealthStatus::Unhealthy, 0, "UNHEALTHY"),
            (HealthStatus::Running, 1, "RUNNING"),
            (HealthStatus::Healthy, 2, "HEALTHY"),
        ];
        for (status, value, tag) in expected {
            assert_eq!(status.value(), value);
            assert_eq!(status.as_str(), tag);
            assert_eq!(status.to_string(), tag);
        }
        assert!(HealthStatus::Crit < HealthStatus::Fail);
        assert!(HealthStatus::Running < HealthStatus::Healthy);
    }

    #[test]
    fn test_classify_healthy() {
        assert_eq!(
            classify(&running(Some("healthy"))),
            Classification::Status(HealthStatus::Healthy)
        );
    }

    #[test]
    fn test_classify_unhealthy() {
        assert_eq!(
            classify(&running(Some("unhealthy"))),
            Classification::Status(HealthStatus::Unhealthy)
        );
    }

    #[test]
    fn test_classify_without_healthcheck() {
        assert_eq!(
            classify(&running(None)),
            Classification::Status(HealthStatus::Running)
        );
    }

    #[test]
    fn test_classify_unknown_health_is_fail() {
        assert_eq!(
            classify(&running(Some("starting"))),
            Classification::Status(HealthStatus::Fail)
        );
        assert_eq!(
            classify(&running(Some("garbage"))),
            Classification::Status(HealthStatus::Fail)
        );
    }

    #[test]
    fn test_classify_exited_with_error_is_crit() {
        let state = ContainerState {
            lifecycle: "exited".to_owned(),
            running: false,
            exit_code: Some(1),
            ..Default::default()
        };
        assert_eq!(
            classify(&state),
            Classification::Status(HealthStatus::Crit)
        );
    }

    #[test]
    fn test_classify_exited_successfully_is_omitted() {
        let state = ContainerState {
            lifecycle: "exited".to_owned(),
            running: false,
            exit_code: Some(0),
            ..Default::default()
        };
        assert_eq!(classify(&state), Classification::Omit);
    }

    #[test]
    fn test_classify_exited_without_exit_code_is_crit() {
        let state = ContainerState {
            lifecycle: "exited".to_owned(),
            ..Default::default()
        };
        assert_eq!(
            classify(&state),
            Classification::Status(HealthStatus::Crit)
        );
    }

    #[test]
    fn test_classify_restarting_ignores_health() {
        let mut state = running(Some("healthy"));
        state.lifecycle = "restarting".to_owned();
        assert_eq!(
            classify(&state),
            Classification::Status(HealthStatus::Fail)
        );

        let mut state = running(Some("healthy"));
        state.restarting = true;
        assert_eq!(
            classify(&state),
            Classification::Status(HealthStatus::Fail)
        );
    }

    #[test]
    fn test_classify_restarting_flag_beats_not_running() {
        let state = ContainerState {
            lifecycle: "exited".to_owned(),
            restarting: true,
            exit_code: Some(137),
            ..Default::default()
        };
        assert_eq!(
            classify(&state),
            Classification::Status(HealthStatus::Fail)
        );
    }

    #[test]
    fn test_classify_empty_state_is_crit() {
        assert_eq!(
            classify(&ContainerState::default()),
            Classification::Status(HealthStatus::Crit)
        );
    }

    #[test]
    fn test_classify_is_deterministic() {
        let lifecycles = ["", "running", "exited", "restarting", "paused", "dead"];
        let healths = [None, Some("healthy"), Some("unhealthy"), Some("starting")];
        for lifecycle in lifecycles {
            for health in healths {
                for running in [false, true] {
                    for restarting in [false, true] {
                        for exit_code in [None, Some(0), Some(1)] {
                            let state = ContainerState {
                                lifecycle: lifecycle.to_owned(),
                                running,
                                restarting,
                                exit_code,
                                health: health.map(str::to_owned),
                            };
                            assert_eq!(classify(&state), classify(&state.clone()));
                        }
                    }
                }
            }
        }
    }
}

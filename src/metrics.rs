//! Prometheus text exposition of a [`Reading`].
use std::fmt::Write;

use crate::scheduler::Reading;

/// Content type of the rendered exposition.
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Escapes a label value: `\` as `\\`, newlines as `\n` and `"` as `\"`.
pub fn escape_label_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '"' => out.push_str("\\\""),
            c => out.push(c),
        }
    }
    out
}

/// Renders the exporter and container health metrics.
///
/// `instance` is attached to every sample as the `instance` label. The
/// snapshot age is reported as `0` while no refresh has succeeded yet.
/// Container samples are sorted by name.
pub fn render(instance: &str, reading: &Reading) -> String {
    let instance = escape_label_value(instance);
    let mut out = String::with_capacity(1024 + reading.snapshot.len() * 256);

    let exporter_metrics = [
        (
            "docker_healthcheck_exporter_up",
            "Exporter is running and can talk to Docker (1/0).",
            "gauge",
            u8::from(reading.up).to_string(),
        ),
        (
            "docker_healthcheck_exporter_refresh_errors_total",
            "Number of Docker refresh errors.",
            "counter",
            reading.failures.to_string(),
        ),
        (
            "docker_healthcheck_exporter_refresh_duration_seconds",
            "Last refresh duration in seconds.",
            "gauge",
            reading.last_duration.as_secs_f64().to_string(),
        ),
        (
            "docker_healthcheck_exporter_snapshot_age_seconds",
            "Age of the last successful snapshot in seconds.",
            "gauge",
            reading
                .age
                .map_or(0.0, |age| age.as_secs_f64())
                .to_string(),
        ),
    ];

    // writing to a String never fails
    for (name, help, kind, value) in exporter_metrics {
        let _ = writeln!(out, "# HELP {name} {help}");
        let _ = writeln!(out, "# TYPE {name} {kind}");
        let _ = writeln!(out, "{name}{{instance=\"{instance}\"}} {value}");
    }

    let _ = writeln!(
        out,
        "# HELP docker_container_health_status Container health status \
         (-2 crit, -1 fail, 0 unhealthy, 1 running(no healthcheck), 2 healthy)."
    );
    let _ = writeln!(out, "# TYPE docker_container_health_status gauge");

    let mut containers: Vec<_> = reading.snapshot.values().collect();
    containers.sort_unstable_by(|a, b| a.name().cmp(b.name()));
    for container in containers {
        let _ = writeln!(
            out,
            "docker_container_health_status{{instance=\"{}\",name=\"{}\",container_id=\"{}\",\
             image=\"{}\",compose_project=\"{}\",compose_service=\"{}\",status_text=\"{}\"}} {}",
            instance,
            escape_label_value(container.name()),
            escape_label_value(container.container_id()),
            escape_label_value(container.image()),
            escape_label_value(container.compose_project()),
            escape_label_value(container.compose_service()),
            container.status_text(),
            container.status(),
        );
    }

    out
}

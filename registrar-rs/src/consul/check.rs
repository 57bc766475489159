//! Health check derivation from service attributes.

use registrar_core::Service;

use super::records::AgentServiceCheck;

/// Interval for HTTP and script checks when `check_interval` is not set.
pub const DEFAULT_INTERVAL: &str = "10s";

/// Replace `$SERVICE_IP` with the origin host IP, then `$SERVICE_PORT` with the origin host port (all occurrences, literal).
pub fn interpolate_service(script: &str, service: &Service) -> String {
    script
        .replace("$SERVICE_IP", &service.origin.host_ip)
        .replace("$SERVICE_PORT", &service.origin.host_port)
}

/// Health check for a service, from its attributes. First match wins:
/// `check_http`, `check_cmd`, `check_script`, `check_ttl`. None when no check attribute is set.
pub fn build_check(service: &Service) -> Option<AgentServiceCheck> {
    let mut check = AgentServiceCheck::default();
    if let Some(path) = service.attr("check_http") {
        check.http = format!("http://{}:{}{}", service.ip, service.port, path);
        if let Some(timeout) = service.attr("check_timeout") {
            check.timeout = timeout.to_string();
        }
    } else if let Some(cmd) = service.attr("check_cmd") {
        check.script = format!(
            "check-cmd {} {} {}",
            short_container_id(&service.origin.container_id),
            service.origin.exposed_port,
            cmd
        );
    } else if let Some(script) = service.attr("check_script") {
        check.script = interpolate_service(script, service);
    } else if let Some(ttl) = service.attr("check_ttl") {
        check.ttl = ttl.to_string();
    } else {
        return None;
    }

    // TTL checks are pushed by the service, never polled.
    if !check.script.is_empty() || !check.http.is_empty() {
        check.interval = service
            .attr("check_interval")
            .unwrap_or(DEFAULT_INTERVAL)
            .to_string();
    }
    Some(check)
}

/// First 12 characters of a container ID; shorter IDs are used whole.
fn short_container_id(id: &str) -> &str {
    id.char_indices().nth(12).map_or(id, |(end, _)| &id[..end])
}

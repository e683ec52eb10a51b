//! Pointer speed application.
//!
//! Two mechanisms: the driver's linear acceleration property when the device
//! advertises it, and a coordinate transformation matrix otherwise. Extended
//! mode always uses the matrix, trading driver-native behavior for a wider
//! speed range. Every property set is fire-and-forget.

use crate::commands::InputBackend;
use crate::config::{Config, Profile};
use crate::device::Device;

pub const ACCEL_PROP: &str = "libinput Accel Speed";
pub const CTM_PROP: &str = "Coordinate Transformation Matrix";

/// Diagonal scale for the transform matrix. The positive floor keeps the
/// scale away from zero, which would freeze pointer motion entirely.
pub fn ctm_scale(speed: f64) -> f64 {
    if speed < 0.0 {
        speed.max(-5.0)
    } else {
        speed.min(5.0).max(0.05)
    }
}

fn ctm_values(scale: f64) -> Vec<String> {
    [scale, 0.0, 0.0, 0.0, scale, 0.0, 0.0, 0.0, 1.0]
        .iter()
        .map(|v| v.to_string())
        .collect()
}

fn set_ctm<B: InputBackend>(backend: &B, device_id: &str, speed: f64) {
    backend.set_prop(device_id, CTM_PROP, &ctm_values(ctm_scale(speed)));
}

/// Apply a speed setting to one device id.
pub fn apply_to_device<B: InputBackend>(backend: &B, device_id: &str, speed: f64, extended: bool) {
    if extended {
        set_ctm(backend, device_id, speed);
    } else if backend.device_has_prop(device_id, ACCEL_PROP) {
        backend.set_prop(device_id, ACCEL_PROP, &[format!("{:.2}", speed)]);
    } else {
        log::info!(
            "device {} has no '{}'; using the transform matrix instead",
            device_id,
            ACCEL_PROP
        );
        set_ctm(backend, device_id, speed);
    }
}

/// Apply a name profile to every connected device reporting that name, then
/// to whatever ids the server resolves for the name right now (covers
/// devices whose id changed since the last scan).
pub fn apply_by_name<B: InputBackend>(
    backend: &B,
    devices: &[Device],
    name: &str,
    profile: Profile,
) {
    for device in devices.iter().filter(|d| d.name == name) {
        apply_to_device(backend, &device.id, profile.speed, profile.extended);
    }
    for id in backend.pointer_ids_for_name(name) {
        apply_to_device(backend, &id, profile.speed, profile.extended);
    }
}

/// Re-apply every saved profile to the connected devices: id profiles first,
/// then name profiles for devices that did not receive an id profile.
pub fn apply_all<B: InputBackend>(backend: &B, devices: &[Device], config: &Config) {
    for device in devices {
        if let Some(profile) = config.by_id.get(&device.id) {
            apply_to_device(backend, &device.id, profile.speed, profile.extended);
        }
    }
    for device in devices {
        if config.by_id.contains_key(&device.id) {
            continue;
        }
        if let Some(profile) = config.by_name.get(&device.name) {
            apply_to_device(backend, &device.id, profile.speed, profile.extended);
        }
    }
}

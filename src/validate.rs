use std::fmt;
use std::net::IpAddr;

use log::debug;
use serde_yaml::Value;
use thiserror::Error;

use crate::types::{Device, DeviceType, Vlan, DEFAULT_DESCRIPTION};

const VLAN_ID_MIN: i64 = 1;
const VLAN_ID_MAX: i64 = 4094;

const UNKNOWN_HOSTNAME: &str = "unknown";

/// How a batch of records reacts to an invalid one.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum BatchPolicy {
    /// Stop at the first invalid record.
    #[default]
    FailFast,
    /// Validate every record and report all invalid ones together.
    CollectAll,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        FieldError {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Every field of a single record that failed validation.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FieldErrors(pub Vec<FieldError>);

impl FieldErrors {
    fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.push(FieldError::new(field, message));
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[cfg(test)]
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|e| e.field.as_str())
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self.0.len();
        write!(
            f,
            "{count} validation error{}",
            if count == 1 { "" } else { "s" }
        )?;
        for error in &self.0 {
            write!(f, "\n  {}: {}", error.field, error.message)?;
        }
        Ok(())
    }
}

#[derive(Error, Debug, PartialEq)]
#[error("Validation failed for device #{position} ({hostname}): {errors}")]
pub struct RecordError {
    /// 1-based position of the record in the inventory.
    pub position: usize,
    pub hostname: String,
    pub errors: FieldErrors,
}

#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error(transparent)]
    Record(RecordError),
    #[error("{} of the inventory records are invalid:\n{}", .0.len(), join_records(.0))]
    Records(Vec<RecordError>),
}

impl ValidationError {
    #[cfg(test)]
    pub fn records(&self) -> &[RecordError] {
        match self {
            ValidationError::Record(record) => std::slice::from_ref(record),
            ValidationError::Records(records) => records,
        }
    }
}

fn join_records(records: &[RecordError]) -> String {
    records
        .iter()
        .map(RecordError::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Validate every inventory record in order, applying `policy` to invalid ones.
pub(crate) fn validate_devices(
    records: &[Value],
    policy: BatchPolicy,
) -> Result<Vec<Device>, ValidationError> {
    let mut devices = Vec::with_capacity(records.len());
    let mut failures = Vec::new();

    for (i, record) in records.iter().enumerate() {
        match validate_device(record) {
            Ok(device) => {
                debug!("Device #{} ({}) is valid", i + 1, device.hostname);
                devices.push(device);
            }
            Err(errors) => {
                let failure = RecordError {
                    position: i + 1,
                    hostname: record_hostname(record),
                    errors,
                };

                match policy {
                    BatchPolicy::FailFast => return Err(ValidationError::Record(failure)),
                    BatchPolicy::CollectAll => failures.push(failure),
                }
            }
        }
    }

    if failures.is_empty() {
        Ok(devices)
    } else {
        Err(ValidationError::Records(failures))
    }
}

fn record_hostname(record: &Value) -> String {
    record
        .get("hostname")
        .and_then(Value::as_str)
        .unwrap_or(UNKNOWN_HOSTNAME)
        .to_string()
}

/// Validate a single raw record, reporting every failing field at once.
///
/// `ip` and `mask` are only checked for being IP address literals of either family;
/// whether the mask is a contiguous netmask is left to rendering.
pub(crate) fn validate_device(record: &Value) -> Result<Device, FieldErrors> {
    let mut errors = FieldErrors::default();

    if !record.is_mapping() {
        errors.push("__root__", "record must be a mapping of fields");
        return Err(errors);
    }

    let hostname = required_str(record, "hostname", &mut errors);
    let interface = required_str(record, "interface", &mut errors);

    let ip = required_str(record, "ip", &mut errors);
    if let Some(ip) = &ip {
        if ip.parse::<IpAddr>().is_err() {
            errors.push("ip", format!("'{ip}' is not a valid IP address"));
        }
    }

    let mask = required_str(record, "mask", &mut errors);
    if let Some(mask) = &mask {
        if mask.parse::<IpAddr>().is_err() {
            errors.push("mask", format!("'{mask}' is not a valid subnet mask"));
        }
    }

    let device_type = match optional_str(record, "device_type", &mut errors) {
        None => Some(DeviceType::default()),
        Some(name) => {
            let device_type = DeviceType::from_name(&name);
            if device_type.is_none() {
                errors.push(
                    "device_type",
                    format!(
                        "Unknown device_type '{name}'. Supported: {:?}",
                        DeviceType::supported()
                    ),
                );
            }
            device_type
        }
    };

    let description = optional_str(record, "description", &mut errors)
        .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string());

    let vlans = validate_vlans(record.get("vlans"), &mut errors);

    match (hostname, interface, ip, mask, device_type) {
        (Some(hostname), Some(interface), Some(ip), Some(mask), Some(device_type))
            if errors.is_empty() =>
        {
            Ok(Device {
                hostname,
                interface,
                ip,
                mask,
                device_type,
                description,
                vlans,
            })
        }
        _ => Err(errors),
    }
}

fn validate_vlans(value: Option<&Value>, errors: &mut FieldErrors) -> Vec<Vlan> {
    let Some(value) = value else {
        return Vec::new();
    };

    let Some(entries) = value.as_sequence() else {
        errors.push("vlans", "expected a list of VLANs");
        return Vec::new();
    };

    entries
        .iter()
        .enumerate()
        .filter_map(|(i, entry)| validate_vlan(entry, &format!("vlans.{i}"), errors))
        .collect()
}

fn validate_vlan(entry: &Value, path: &str, errors: &mut FieldErrors) -> Option<Vlan> {
    if !entry.is_mapping() {
        errors.push(path, "VLAN must be a mapping with 'id' and 'name'");
        return None;
    }

    let id = match entry.get("id") {
        None => {
            errors.push(format!("{path}.id"), "field required");
            None
        }
        Some(value) => match value.as_i64() {
            None => {
                errors.push(format!("{path}.id"), "expected an integer");
                None
            }
            Some(id) if !(VLAN_ID_MIN..=VLAN_ID_MAX).contains(&id) => {
                errors.push(
                    format!("{path}.id"),
                    format!("VLAN id {id} is outside the valid range {VLAN_ID_MIN}-{VLAN_ID_MAX}"),
                );
                None
            }
            Some(id) => u16::try_from(id).ok(),
        },
    };

    let name = required_str_at(entry, "name", &format!("{path}.name"), errors);

    match (id, name) {
        (Some(id), Some(name)) => Some(Vlan { id, name }),
        _ => None,
    }
}

fn required_str(record: &Value, field: &str, errors: &mut FieldErrors) -> Option<String> {
    required_str_at(record, field, field, errors)
}

// `path` is the name the field is reported under.
fn required_str_at(
    record: &Value,
    field: &str,
    path: &str,
    errors: &mut FieldErrors,
) -> Option<String> {
    match record.get(field) {
        None => {
            errors.push(path, "field required");
            None
        }
        Some(value) => as_string(value, path, errors),
    }
}

fn optional_str(record: &Value, field: &str, errors: &mut FieldErrors) -> Option<String> {
    record
        .get(field)
        .and_then(|value| as_string(value, field, errors))
}

fn as_string(value: &Value, field: &str, errors: &mut FieldErrors) -> Option<String> {
    match value.as_str() {
        Some(s) => Some(s.to_string()),
        None => {
            errors.push(field, "expected a string");
            None
        }
    }
}

use std::fmt;

use serde::Serialize;

pub const DEFAULT_DESCRIPTION: &str = "Uplink";

/// Static mapping between a device type and the template rendering it.
pub const TEMPLATE_MAP: [(DeviceType, &str); 2] = [
    (DeviceType::CiscoIos, "cisco_base.j2"),
    (DeviceType::JuniperJunos, "juniper_base.j2"),
];

#[derive(Serialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DeviceType {
    #[default]
    CiscoIos,
    JuniperJunos,
}

impl DeviceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceType::CiscoIos => "cisco_ios",
            DeviceType::JuniperJunos => "juniper_junos",
        }
    }

    /// Resolve a device type from its inventory name, limited to the keys of [`TEMPLATE_MAP`].
    pub fn from_name(name: &str) -> Option<DeviceType> {
        TEMPLATE_MAP
            .iter()
            .map(|(device_type, _)| *device_type)
            .find(|device_type| device_type.as_str() == name)
    }

    pub fn template_name(&self) -> &'static str {
        TEMPLATE_MAP
            .iter()
            .find(|(device_type, _)| device_type == self)
            .map(|(_, template)| *template)
            .unwrap_or_default()
    }

    pub fn supported() -> Vec<&'static str> {
        TEMPLATE_MAP.iter().map(|(t, _)| t.as_str()).collect()
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Serialize, Debug, Clone)]
#[cfg_attr(test, derive(PartialEq))]
pub struct Vlan {
    pub(crate) id: u16,
    pub(crate) name: String,
}

/// A validated inventory entry. Only produced by [`crate::validate::validate_device`].
#[derive(Serialize, Debug, Clone)]
#[cfg_attr(test, derive(PartialEq))]
pub struct Device {
    pub(crate) hostname: String,
    pub(crate) interface: String,
    pub(crate) ip: String,
    pub(crate) mask: String,
    pub(crate) device_type: DeviceType,
    pub(crate) description: String,
    pub(crate) vlans: Vec<Vlan>,
}

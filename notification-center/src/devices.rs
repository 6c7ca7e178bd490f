//! Device name lookup built from the machine list of a snapshot.

use admin_query::Machine;
use std::collections::HashMap;

/// Mapping from device identifier to display name.
///
/// Lookups for unknown devices simply miss; callers decide how to present
/// a missing name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceIndex {
    names: HashMap<String, String>,
}

impl DeviceIndex {
    /// Build the index. When a device id repeats, the last machine wins.
    pub fn from_machines(machines: &[Machine]) -> Self {
        let names = machines
            .iter()
            .map(|m| (m.device_id.clone(), m.name.clone()))
            .collect();
        Self { names }
    }

    /// Display name for `device_id`, if the device is known.
    pub fn name(&self, device_id: &str) -> Option<&str> {
        self.names.get(device_id).map(String::as_str)
    }

    /// Resolve an optional device reference.
    pub fn resolve(&self, device_id: Option<&str>) -> Option<&str> {
        device_id.and_then(|id| self.name(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn machine(device_id: &str, name: &str) -> Machine {
        Machine {
            device_id: device_id.to_string(),
            name: name.to_string(),
        }
    }

    #[test]
    fn test_unknown_device_misses() {
        let index = DeviceIndex::from_machines(&[machine("d1", "Kiosk A")]);
        assert_eq!(index.name("d1"), Some("Kiosk A"));
        assert_eq!(index.name("d2"), None);
        assert_eq!(index.resolve(None), None);
    }

    #[test]
    fn test_duplicate_ids_keep_last() {
        let index = DeviceIndex::from_machines(&[machine("d1", "Old"), machine("d1", "New")]);
        assert_eq!(index.name("d1"), Some("New"));
    }
}

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// One set of readings reported by a vehicle.
///
/// JSON field names are camelCase (`engineOn`, `batteryStatus`, ...) to match
/// the payloads vehicles submit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TelemetryRecord {
    /// Tyre pressure.
    pub pressure: f64,
    /// Engine temperature.
    pub temperature: f64,
    pub engine_on: bool,
    pub battery_status: f64,
    pub oil_level: f64,
    pub brakes_wear: f64,
    pub fuel_level: f64,
    /// Odometer reading.
    pub mileage: f64,
    /// Set when the vehicle reports an active fault.
    pub fault: bool,
}

impl TelemetryRecord {
    /// JSON names of every field a submission must carry, in declaration order.
    pub const REQUIRED_FIELDS: [&'static str; 9] = [
        "pressure",
        "temperature",
        "engineOn",
        "batteryStatus",
        "oilLevel",
        "brakesWear",
        "fuelLevel",
        "mileage",
        "fault",
    ];

    /// Numeric readings paired with their JSON names, in declaration order.
    pub fn numeric_fields(&self) -> [(&'static str, f64); 7] {
        [
            ("pressure", self.pressure),
            ("temperature", self.temperature),
            ("batteryStatus", self.battery_status),
            ("oilLevel", self.oil_level),
            ("brakesWear", self.brakes_wear),
            ("fuelLevel", self.fuel_level),
            ("mileage", self.mileage),
        ]
    }

    /// Reject readings that cannot be persisted as JSON numbers.
    pub fn validate(&self) -> Result<(), TypeError> {
        match self.numeric_fields().iter().find(|(_, v)| !v.is_finite()) {
            Some((field, _)) => Err(TypeError::NonFiniteField { field }),
            None => Ok(()),
        }
    }
}

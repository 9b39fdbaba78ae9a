//! Signals exchanged between the plugins and the host over the signal bus

use crate::door::DoorStatus;
use serde::{Deserialize, Serialize};

/// An event published on the signal bus
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "signal", rename_all = "snake_case")]
pub enum Signal {
    /// The door plugin pulsed a relay; carries the status recorded afterwards
    DoorActuated { status: DoorStatus },
    /// The host raised an alarm with a short message
    AlarmToggled { txt: String },
    /// The host started a program
    StationsScheduled,
}

impl Signal {
    /// Bus name of the signal
    pub fn name(&self) -> &'static str {
        match self {
            Signal::DoorActuated { .. } => "door_actuated",
            Signal::AlarmToggled { .. } => "alarm_toggled",
            Signal::StationsScheduled => "stations_scheduled",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_serialization() {
        let json = serde_json::to_string(&Signal::DoorActuated {
            status: DoorStatus::Open,
        })
        .unwrap();
        assert_eq!(json, r#"{"signal":"door_actuated","status":"open"}"#);

        let json = serde_json::to_string(&Signal::StationsScheduled).unwrap();
        assert_eq!(json, r#"{"signal":"stations_scheduled"}"#);
    }

    #[test]
    fn test_signal_names() {
        assert_eq!(
            Signal::AlarmToggled {
                txt: "rain".to_string()
            }
            .name(),
            "alarm_toggled"
        );
        assert_eq!(Signal::StationsScheduled.name(), "stations_scheduled");
    }
}

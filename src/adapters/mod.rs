//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements         | Connects to                    |
//! |------------|--------------------|--------------------------------|
//! | `hardware` | SensorPort         | DS18x20 on the 1-Wire bus      |
//! |            | ActuatorPort       | Relay, status LED (GPIO)       |
//! | `log_sink` | EventSink          | Serial log output              |
//! | `nvs`      | EepromPort         | NVS / in-memory byte store     |
//! |            | ConfigPort         | (blanket, via EepromPort)      |

pub mod hardware;
pub mod log_sink;
pub mod nvs;

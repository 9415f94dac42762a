use serde::{Deserialize, Serialize};

/// Current conditions at the pool, as reported by a weather service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherConditions {
    pub temperature_f: f64,
    pub uv_index: f64,
    #[serde(default)]
    pub humidity: Option<f64>,
    #[serde(default)]
    pub wind_speed_mph: Option<f64>,
    /// Free-form sky description, e.g. "Sunny" or "Rainy".
    #[serde(default)]
    pub conditions: Option<String>,
}

impl WeatherConditions {
    pub fn new(temperature_f: f64, uv_index: f64) -> Self {
        Self {
            temperature_f,
            uv_index,
            humidity: None,
            wind_speed_mph: None,
            conditions: None,
        }
    }
}

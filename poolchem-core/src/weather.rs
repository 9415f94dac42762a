use poolchem_schemas::weather::WeatherConditions;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AlgaeRisk {
    Low,
    Medium,
    High,
}

impl fmt::Display for AlgaeRisk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AlgaeRisk::Low => "Low",
            AlgaeRisk::Medium => "Medium",
            AlgaeRisk::High => "High",
        };
        f.write_str(s)
    }
}

/// Estimated effect of the current weather on the pool.
#[derive(Debug, Clone, Serialize)]
pub struct WeatherImpact {
    /// Inches of water lost per day.
    pub evaporation_rate: f64,
    /// Free chlorine lost per day, in ppm.
    pub chlorine_loss: f64,
    pub algae_risk: AlgaeRisk,
    pub recommendations: Vec<String>,
}

pub fn analyze_weather_impact(weather: &WeatherConditions) -> WeatherImpact {
    let temperature = weather.temperature_f;
    let humidity = weather.humidity.unwrap_or(50.0);
    let wind = weather.wind_speed_mph.unwrap_or(0.0);
    let sky = weather.conditions.as_deref().unwrap_or("").to_ascii_lowercase();

    let evaporation_rate = (temperature / 100.0) * (1.0 - humidity / 100.0) * (1.0 + wind / 10.0) * 0.25;
    let chlorine_loss = (temperature / 100.0) * (1.0 + weather.uv_index / 5.0) * 0.5;

    let sunny = sky == "sunny" || sky == "partly cloudy";
    let algae_risk = if temperature > 85.0 && sunny {
        AlgaeRisk::High
    } else if temperature > 75.0 {
        AlgaeRisk::Medium
    } else {
        AlgaeRisk::Low
    };

    let mut recommendations = Vec::new();
    if evaporation_rate > 0.2 {
        recommendations.push("High evaporation expected: check the water level daily.".to_string());
    }
    if chlorine_loss > 0.3 {
        recommendations.push("Significant chlorine loss expected: test chlorine daily.".to_string());
    }
    if algae_risk == AlgaeRisk::High {
        recommendations.push("High algae risk: keep free chlorine at the top of its range and brush the walls.".to_string());
    }
    if sky.contains("rain") {
        recommendations.push("Rain dilutes pool chemistry: retest pH and alkalinity after it stops.".to_string());
    }

    WeatherImpact {
        evaporation_rate,
        chlorine_loss,
        algae_risk,
        recommendations,
    }
}

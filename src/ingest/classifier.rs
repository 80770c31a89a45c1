use crate::db::Condition;

/// Hourly precipitation (mm) above which the hour counts as stormy
pub const STORMY_PRECIPITATION_MM: f64 = 10.0;

/// Relative humidity (%) above which a dry hour counts as cloudy
pub const CLOUDY_HUMIDITY_PERCENT: f64 = 80.0;

/// Derive the dashboard condition for one hour
///
/// First match wins: heavy rain, any rain, humid, otherwise sunny. A missing
/// reading never satisfies a threshold.
pub fn classify(precipitation: Option<f64>, humidity: Option<f64>) -> Condition {
    let exceeds = |value: Option<f64>, threshold: f64| value.is_some_and(|v| v > threshold);

    if exceeds(precipitation, STORMY_PRECIPITATION_MM) {
        Condition::Stormy
    } else if exceeds(precipitation, 0.0) {
        Condition::Rainy
    } else if exceeds(humidity, CLOUDY_HUMIDITY_PERCENT) {
        Condition::Cloudy
    } else {
        Condition::Sunny
    }
}

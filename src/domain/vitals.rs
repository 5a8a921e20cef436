//! Vital signs: unit normalization, plausibility checks and clinical alerts.
//!
//! Readings arrive in whatever units the ward uses. They are converted to
//! canonical units (°C, kg, cm, mg/dL) before range checks and alerting, and
//! stored canonically.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::errors::{AppError, AppResult};

const LB_TO_KG: f64 = 0.453_592_37;
const IN_TO_CM: f64 = 2.54;
const MMOL_TO_MG_DL: f64 = 18.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum TemperatureUnit {
    #[default]
    #[serde(rename = "C")]
    Celsius,
    #[serde(rename = "F")]
    Fahrenheit,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum WeightUnit {
    #[default]
    #[serde(rename = "kg")]
    Kilograms,
    #[serde(rename = "lb")]
    Pounds,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum HeightUnit {
    #[default]
    #[serde(rename = "cm")]
    Centimeters,
    #[serde(rename = "in")]
    Inches,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum GlucoseUnit {
    #[default]
    #[serde(rename = "mg/dL")]
    MgPerDl,
    #[serde(rename = "mmol/L")]
    MmolPerL,
}

/// Raw reading as submitted by a clinician
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct RecordVitals {
    pub patient_id: Uuid,
    #[schema(example = 38.4)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub temperature_unit: TemperatureUnit,
    #[schema(example = 128)]
    pub systolic_bp: Option<i32>,
    #[schema(example = 82)]
    pub diastolic_bp: Option<i32>,
    pub heart_rate: Option<i32>,
    pub respiratory_rate: Option<i32>,
    #[schema(example = 97.0)]
    pub oxygen_saturation: Option<f64>,
    pub weight: Option<f64>,
    #[serde(default)]
    pub weight_unit: WeightUnit,
    pub height: Option<f64>,
    #[serde(default)]
    pub height_unit: HeightUnit,
    pub blood_glucose: Option<f64>,
    #[serde(default)]
    pub glucose_unit: GlucoseUnit,
    #[validate(range(min = 0, max = 10, message = "Pain score must be 0-10"))]
    pub pain_score: Option<i32>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

/// Measurements in canonical units
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Measurements {
    pub temperature_c: Option<f64>,
    pub systolic_bp: Option<i32>,
    pub diastolic_bp: Option<i32>,
    pub heart_rate: Option<i32>,
    pub respiratory_rate: Option<i32>,
    pub oxygen_saturation: Option<f64>,
    pub weight_kg: Option<f64>,
    pub height_cm: Option<f64>,
    pub blood_glucose_mg_dl: Option<f64>,
    pub pain_score: Option<i32>,
    /// Derived when both weight and height are present
    pub bmi: Option<f64>,
}

impl RecordVitals {
    fn is_empty(&self) -> bool {
        self.temperature.is_none()
            && self.systolic_bp.is_none()
            && self.diastolic_bp.is_none()
            && self.heart_rate.is_none()
            && self.respiratory_rate.is_none()
            && self.oxygen_saturation.is_none()
            && self.weight.is_none()
            && self.height.is_none()
            && self.blood_glucose.is_none()
            && self.pain_score.is_none()
    }

    /// Convert to canonical units and reject implausible values.
    ///
    /// Values are left at full precision so alert thresholds see the real
    /// reading; use [`Measurements::rounded`] for storage.
    pub fn normalize(&self) -> AppResult<Measurements> {
        if self.is_empty() {
            return Err(AppError::bad_request(
                "EMPTY_VITALS",
                "At least one measurement is required",
            ));
        }

        let temperature_c = self.temperature.map(|t| match self.temperature_unit {
            TemperatureUnit::Celsius => t,
            TemperatureUnit::Fahrenheit => (t - 32.0) * 5.0 / 9.0,
        });
        let weight_kg = self.weight.map(|w| match self.weight_unit {
            WeightUnit::Kilograms => w,
            WeightUnit::Pounds => w * LB_TO_KG,
        });
        let height_cm = self.height.map(|h| match self.height_unit {
            HeightUnit::Centimeters => h,
            HeightUnit::Inches => h * IN_TO_CM,
        });
        let blood_glucose_mg_dl = self.blood_glucose.map(|g| match self.glucose_unit {
            GlucoseUnit::MgPerDl => g,
            GlucoseUnit::MmolPerL => g * MMOL_TO_MG_DL,
        });

        check_range("temperature", temperature_c, 25.0, 45.0)?;
        check_range("systolic_bp", self.systolic_bp.map(f64::from), 40.0, 300.0)?;
        check_range("diastolic_bp", self.diastolic_bp.map(f64::from), 20.0, 200.0)?;
        check_range("heart_rate", self.heart_rate.map(f64::from), 20.0, 300.0)?;
        check_range("respiratory_rate", self.respiratory_rate.map(f64::from), 4.0, 80.0)?;
        check_range("oxygen_saturation", self.oxygen_saturation, 0.0, 100.0)?;
        check_range("weight", weight_kg, 0.2, 500.0)?;
        check_range("height", height_cm, 20.0, 300.0)?;
        check_range("blood_glucose", blood_glucose_mg_dl, 10.0, 2000.0)?;
        check_range("pain_score", self.pain_score.map(f64::from), 0.0, 10.0)?;

        match (self.systolic_bp, self.diastolic_bp) {
            (Some(sys), Some(dia)) if dia >= sys => {
                return Err(invalid("Diastolic pressure must be below systolic pressure"));
            }
            (Some(_), None) | (None, Some(_)) => {
                return Err(invalid("Blood pressure needs both systolic and diastolic values"));
            }
            _ => {}
        }

        let bmi = match (weight_kg, height_cm) {
            (Some(kg), Some(cm)) => {
                let m = cm / 100.0;
                Some(kg / (m * m))
            }
            _ => None,
        };

        Ok(Measurements {
            temperature_c,
            systolic_bp: self.systolic_bp,
            diastolic_bp: self.diastolic_bp,
            heart_rate: self.heart_rate,
            respiratory_rate: self.respiratory_rate,
            oxygen_saturation: self.oxygen_saturation,
            weight_kg,
            height_cm,
            blood_glucose_mg_dl,
            pain_score: self.pain_score,
            bmi,
        })
    }
}

impl Measurements {
    /// Storage precision: one decimal, two for weight.
    pub fn rounded(&self) -> Self {
        Self {
            temperature_c: self.temperature_c.map(round1),
            weight_kg: self.weight_kg.map(round2),
            height_cm: self.height_cm.map(round1),
            blood_glucose_mg_dl: self.blood_glucose_mg_dl.map(round1),
            bmi: self.bmi.map(round1),
            ..*self
        }
    }
}

fn invalid(message: impl Into<String>) -> AppError {
    AppError::bad_request("INVALID_VITALS", message)
}

fn check_range(name: &str, value: Option<f64>, min: f64, max: f64) -> AppResult<()> {
    match value {
        Some(v) if !v.is_finite() || v < min || v > max => Err(invalid(format!(
            "{} must be between {} and {}",
            name, min, max
        ))),
        _ => Ok(()),
    }
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertSeverity {
    Critical,
    Warning,
}

/// Clinical alert raised by an out-of-range measurement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct VitalAlert {
    #[schema(example = "CRITICAL_HYPOXEMIA")]
    pub code: String,
    pub severity: AlertSeverity,
    pub parameter: String,
    pub value: f64,
    pub message: String,
}

impl VitalAlert {
    fn new(
        code: &str,
        severity: AlertSeverity,
        parameter: &str,
        value: f64,
        message: &str,
    ) -> Self {
        Self {
            code: code.to_string(),
            severity,
            parameter: parameter.to_string(),
            value: round2(value),
            message: message.to_string(),
        }
    }
}

use AlertSeverity::{Critical, Warning};

fn oxygen_alert(spo2: f64) -> Option<VitalAlert> {
    let p = "oxygen_saturation";
    if spo2 < 90.0 {
        Some(VitalAlert::new(
            "CRITICAL_HYPOXEMIA",
            Critical,
            p,
            spo2,
            "SpO2 below 90%",
        ))
    } else if spo2 < 95.0 {
        Some(VitalAlert::new(
            "LOW_OXYGEN_SATURATION",
            Warning,
            p,
            spo2,
            "SpO2 below 95%",
        ))
    } else {
        None
    }
}

fn temperature_alert(celsius: f64) -> Option<VitalAlert> {
    let p = "temperature";
    if celsius >= 40.0 {
        Some(VitalAlert::new(
            "HYPERPYREXIA",
            Critical,
            p,
            celsius,
            "Temperature at or above 40°C",
        ))
    } else if celsius < 35.0 {
        Some(VitalAlert::new(
            "HYPOTHERMIA",
            Critical,
            p,
            celsius,
            "Temperature below 35°C",
        ))
    } else if celsius >= 38.0 {
        Some(VitalAlert::new(
            "FEVER",
            Warning,
            p,
            celsius,
            "Temperature at or above 38°C",
        ))
    } else {
        None
    }
}

fn blood_pressure_alert(sys: i32, dia: i32) -> Option<VitalAlert> {
    let p = "blood_pressure";
    let v = f64::from(sys);
    if sys >= 180 || dia >= 120 {
        Some(VitalAlert::new(
            "HYPERTENSIVE_CRISIS",
            Critical,
            p,
            v,
            "Blood pressure at or above 180/120",
        ))
    } else if sys >= 140 || dia >= 90 {
        Some(VitalAlert::new(
            "HYPERTENSION",
            Warning,
            p,
            v,
            "Blood pressure at or above 140/90",
        ))
    } else if sys < 90 || dia < 60 {
        Some(VitalAlert::new(
            "HYPOTENSION",
            Warning,
            p,
            v,
            "Blood pressure below 90/60",
        ))
    } else {
        None
    }
}

fn heart_rate_alert(bpm: i32) -> Option<VitalAlert> {
    let p = "heart_rate";
    let v = f64::from(bpm);
    if bpm > 130 {
        Some(VitalAlert::new(
            "SEVERE_TACHYCARDIA",
            Critical,
            p,
            v,
            "Heart rate above 130 bpm",
        ))
    } else if bpm < 40 {
        Some(VitalAlert::new(
            "SEVERE_BRADYCARDIA",
            Critical,
            p,
            v,
            "Heart rate below 40 bpm",
        ))
    } else if bpm > 100 {
        Some(VitalAlert::new(
            "TACHYCARDIA",
            Warning,
            p,
            v,
            "Heart rate above 100 bpm",
        ))
    } else if bpm < 60 {
        Some(VitalAlert::new(
            "BRADYCARDIA",
            Warning,
            p,
            v,
            "Heart rate below 60 bpm",
        ))
    } else {
        None
    }
}

fn respiratory_alert(rate: i32) -> Option<VitalAlert> {
    let p = "respiratory_rate";
    let v = f64::from(rate);
    if rate > 30 {
        Some(VitalAlert::new(
            "SEVERE_TACHYPNEA",
            Critical,
            p,
            v,
            "Respiratory rate above 30/min",
        ))
    } else if rate < 8 {
        Some(VitalAlert::new(
            "SEVERE_BRADYPNEA",
            Critical,
            p,
            v,
            "Respiratory rate below 8/min",
        ))
    } else if rate > 20 {
        Some(VitalAlert::new(
            "TACHYPNEA",
            Warning,
            p,
            v,
            "Respiratory rate above 20/min",
        ))
    } else if rate < 12 {
        Some(VitalAlert::new(
            "BRADYPNEA",
            Warning,
            p,
            v,
            "Respiratory rate below 12/min",
        ))
    } else {
        None
    }
}

fn glucose_alert(mg_dl: f64) -> Option<VitalAlert> {
    let p = "blood_glucose";
    if mg_dl < 54.0 {
        Some(VitalAlert::new(
            "SEVERE_HYPOGLYCEMIA",
            Critical,
            p,
            mg_dl,
            "Glucose below 54 mg/dL",
        ))
    } else if mg_dl >= 400.0 {
        Some(VitalAlert::new(
            "SEVERE_HYPERGLYCEMIA",
            Critical,
            p,
            mg_dl,
            "Glucose at or above 400 mg/dL",
        ))
    } else if mg_dl < 70.0 {
        Some(VitalAlert::new(
            "HYPOGLYCEMIA",
            Warning,
            p,
            mg_dl,
            "Glucose below 70 mg/dL",
        ))
    } else if mg_dl > 180.0 {
        Some(VitalAlert::new(
            "HYPERGLYCEMIA",
            Warning,
            p,
            mg_dl,
            "Glucose above 180 mg/dL",
        ))
    } else {
        None
    }
}

fn pain_alert(score: i32) -> Option<VitalAlert> {
    (score >= 7).then(|| {
        VitalAlert::new(
            "SEVERE_PAIN",
            Warning,
            "pain_score",
            f64::from(score),
            "Pain score 7 or higher",
        )
    })
}

/// Alerts for a set of canonical measurements.
///
/// At most one alert per parameter (the most severe band). Critical alerts
/// come first; within a severity, parameters keep a fixed order: SpO2,
/// temperature, blood pressure, heart rate, respiratory rate, glucose, pain.
pub fn generate_alerts(m: &Measurements) -> Vec<VitalAlert> {
    let blood_pressure = match (m.systolic_bp, m.diastolic_bp) {
        (Some(sys), Some(dia)) => blood_pressure_alert(sys, dia),
        _ => None,
    };

    let mut alerts: Vec<VitalAlert> = [
        m.oxygen_saturation.and_then(oxygen_alert),
        m.temperature_c.and_then(temperature_alert),
        blood_pressure,
        m.heart_rate.and_then(heart_rate_alert),
        m.respiratory_rate.and_then(respiratory_alert),
        m.blood_glucose_mg_dl.and_then(glucose_alert),
        m.pain_score.and_then(pain_alert),
    ]
    .into_iter()
    .flatten()
    .collect();

    // stable: keeps parameter order within a severity
    alerts.sort_by_key(|a| a.severity);
    alerts
}

/// Stored vitals record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Vitals {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub patient_id: Uuid,
    pub recorded_by: Uuid,
    #[serde(flatten)]
    pub measurements: Measurements,
    pub notes: Option<String>,
    pub alerts: Vec<VitalAlert>,
    pub recorded_at: DateTime<Utc>,
}

impl Vitals {
    pub fn has_critical_alert(&self) -> bool {
        self.alerts.iter().any(|a| a.severity == Critical)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading() -> RecordVitals {
        RecordVitals {
            patient_id: Uuid::new_v4(),
            ..Default::default()
        }
    }

    fn codes(alerts: &[VitalAlert]) -> Vec<&str> {
        alerts.iter().map(|a| a.code.as_str()).collect()
    }

    #[test]
    fn test_empty_reading_rejected() {
        let err = reading().normalize().unwrap_err();
        assert_eq!(err.code(), "EMPTY_VITALS");
    }

    #[test]
    fn test_fahrenheit_converted() {
        let mut r = reading();
        r.temperature = Some(101.3);
        r.temperature_unit = TemperatureUnit::Fahrenheit;
        let m = r.normalize().unwrap();
        assert_eq!(m.rounded().temperature_c, Some(38.5));
        assert_eq!(codes(&generate_alerts(&m)), vec!["FEVER"]);
    }

    #[test]
    fn test_imperial_weight_height_and_bmi() {
        let mut r = reading();
        r.weight = Some(154.0);
        r.weight_unit = WeightUnit::Pounds;
        r.height = Some(70.0);
        r.height_unit = HeightUnit::Inches;
        let m = r.normalize().unwrap().rounded();
        assert_eq!(m.weight_kg, Some(69.85));
        assert_eq!(m.height_cm, Some(177.8));
        assert_eq!(m.bmi, Some(22.1));
    }

    #[test]
    fn test_mmol_glucose_converted() {
        let mut r = reading();
        r.blood_glucose = Some(2.5);
        r.glucose_unit = GlucoseUnit::MmolPerL;
        let m = r.normalize().unwrap();
        assert_eq!(m.rounded().blood_glucose_mg_dl, Some(45.0));
        let alerts = generate_alerts(&m);
        assert_eq!(codes(&alerts), vec!["SEVERE_HYPOGLYCEMIA"]);
        assert_eq!(alerts[0].severity, AlertSeverity::Critical);
    }

    #[test]
    fn test_out_of_range_rejected() {
        let mut r = reading();
        r.heart_rate = Some(900);
        assert_eq!(r.normalize().unwrap_err().code(), "INVALID_VITALS");

        let mut r = reading();
        r.oxygen_saturation = Some(f64::NAN);
        assert_eq!(r.normalize().unwrap_err().code(), "INVALID_VITALS");
    }

    #[test]
    fn test_half_blood_pressure_rejected() {
        let mut r = reading();
        r.systolic_bp = Some(120);
        assert_eq!(r.normalize().unwrap_err().code(), "INVALID_VITALS");
    }

    #[test]
    fn test_low_spo2_is_critical_hypoxemia() {
        let mut r = reading();
        r.oxygen_saturation = Some(86.0);
        let alerts = generate_alerts(&r.normalize().unwrap());
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].code, "CRITICAL_HYPOXEMIA");
        assert_eq!(alerts[0].severity, AlertSeverity::Critical);
    }

    #[test]
    fn test_one_alert_per_parameter_most_severe_wins() {
        let m = Measurements {
            systolic_bp: Some(190),
            diastolic_bp: Some(95),
            heart_rate: Some(140),
            ..Default::default()
        };
        assert_eq!(
            codes(&generate_alerts(&m)),
            vec!["HYPERTENSIVE_CRISIS", "SEVERE_TACHYCARDIA"]
        );
    }

    #[test]
    fn test_critical_alerts_sorted_first() {
        let m = Measurements {
            oxygen_saturation: Some(93.0),
            temperature_c: Some(38.5),
            respiratory_rate: Some(35),
            pain_score: Some(8),
            ..Default::default()
        };
        assert_eq!(
            codes(&generate_alerts(&m)),
            vec![
                "SEVERE_TACHYPNEA",
                "LOW_OXYGEN_SATURATION",
                "FEVER",
                "SEVERE_PAIN"
            ]
        );
    }

    #[test]
    fn test_threshold_boundaries() {
        let at = |spo2: f64| {
            generate_alerts(&Measurements {
                oxygen_saturation: Some(spo2),
                ..Default::default()
            })
        };
        assert_eq!(codes(&at(90.0)), vec!["LOW_OXYGEN_SATURATION"]);
        assert!(at(95.0).is_empty());

        let temp = |c: f64| {
            generate_alerts(&Measurements {
                temperature_c: Some(c),
                ..Default::default()
            })
        };
        assert_eq!(codes(&temp(40.0)), vec!["HYPERPYREXIA"]);
        assert_eq!(codes(&temp(34.9)), vec!["HYPOTHERMIA"]);
        assert!(temp(37.9).is_empty());
    }

    #[test]
    fn test_alerts_use_unrounded_temperature() {
        let mut r = reading();
        r.temperature = Some(34.96);
        let m = r.normalize().unwrap();
        assert_eq!(m.rounded().temperature_c, Some(35.0));
        assert_eq!(codes(&generate_alerts(&m)), vec!["HYPOTHERMIA"]);

        r.temperature = Some(39.96);
        let m = r.normalize().unwrap();
        assert_eq!(m.rounded().temperature_c, Some(40.0));
        assert_eq!(codes(&generate_alerts(&m)), vec!["FEVER"]);
    }

    #[test]
    fn test_alerts_use_unrounded_glucose() {
        let mut r = reading();
        r.blood_glucose = Some(22.22);
        r.glucose_unit = GlucoseUnit::MmolPerL;
        let m = r.normalize().unwrap();
        assert_eq!(m.rounded().blood_glucose_mg_dl, Some(400.0));
        assert_eq!(codes(&generate_alerts(&m)), vec!["HYPERGLYCEMIA"]);
    }

    #[test]
    fn test_hypotension_warning() {
        let m = Measurements {
            systolic_bp: Some(85),
            diastolic_bp: Some(55),
            ..Default::default()
        };
        assert_eq!(codes(&generate_alerts(&m)), vec!["HYPOTENSION"]);
    }

    #[test]
    fn test_normal_vitals_have_no_alerts() {
        let m = Measurements {
            temperature_c: Some(36.8),
            systolic_bp: Some(118),
            diastolic_bp: Some(76),
            heart_rate: Some(72),
            respiratory_rate: Some(16),
            oxygen_saturation: Some(98.0),
            blood_glucose_mg_dl: Some(95.0),
            pain_score: Some(2),
            ..Default::default()
        };
        assert!(generate_alerts(&m).is_empty());
    }
}

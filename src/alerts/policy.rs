use crate::models::Detection;

use super::config::{AlertConfig, AlertSelection};

pub const PERSON_CLASS_LABEL: &str = "person";

/// Maps a single detection to the warning it should raise, if any. Pure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProximityPolicy {
    pub warning_threshold: f64,
    pub min_score: f64,
}

impl Default for ProximityPolicy {
    fn default() -> Self {
        Self::from(&AlertConfig::default())
    }
}

impl From<&AlertConfig> for ProximityPolicy {
    fn from(config: &AlertConfig) -> Self {
        Self {
            warning_threshold: config.warning_threshold,
            min_score: config.min_score,
        }
    }
}

impl ProximityPolicy {
    pub fn qualifies(&self, detection: &Detection) -> bool {
        detection.score > self.min_score
    }

    pub fn evaluate(&self, detection: &Detection) -> Option<String> {
        if !self.qualifies(detection) || detection.proximity() <= self.warning_threshold {
            return None;
        }

        Some(warning_message(&detection.class))
    }

    /// Picks the one warning to voice for a frame.
    pub fn select<'a, I>(&self, detections: I, selection: AlertSelection) -> Option<String>
    where
        I: IntoIterator<Item = &'a Detection>,
    {
        let alerting = detections
            .into_iter()
            .filter_map(|detection| self.evaluate(detection).map(|msg| (detection.proximity(), msg)));

        match selection {
            AlertSelection::LastEvaluated => alerting.last().map(|(_, msg)| msg),
            AlertSelection::Nearest => alerting
                .fold(None::<(f64, String)>, |best, candidate| match best {
                    Some(current) if current.0 >= candidate.0 => Some(current),
                    _ => Some(candidate),
                })
                .map(|(_, msg)| msg),
        }
    }
}

fn warning_message(class: &str) -> String {
    if class == PERSON_CLASS_LABEL {
        "Warning: person is near".to_string()
    } else {
        format!("Warning: {class} is near")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BoundingBox;

    fn detection(class: &str, score: f64, width: f64, height: f64) -> Detection {
        Detection::new(class, score, BoundingBox::new(0.0, 0.0, width, height))
    }

    #[test]
    fn low_confidence_never_alerts() {
        let policy = ProximityPolicy::default();
        assert_eq!(policy.evaluate(&detection("person", 0.66, 100.0, 100.0)), None);
        assert_eq!(policy.evaluate(&detection("car", 0.1, 500.0, 500.0)), None);
    }

    #[test]
    fn near_person_gets_person_warning() {
        let policy = ProximityPolicy::default();
        assert_eq!(
            policy.evaluate(&detection("person", 0.9, 20.0, 10.0)).as_deref(),
            Some("Warning: person is near")
        );
    }

    #[test]
    fn near_object_names_its_class() {
        let policy = ProximityPolicy::default();
        assert_eq!(
            policy.evaluate(&detection("bicycle", 0.7, 50.0, 4.0)).as_deref(),
            Some("Warning: bicycle is near")
        );
    }

    #[test]
    fn area_at_threshold_is_not_near() {
        let policy = ProximityPolicy::default();
        assert_eq!(policy.evaluate(&detection("person", 0.9, 15.0, 10.0)), None);
        assert!(policy.evaluate(&detection("person", 0.9, 15.1, 10.0)).is_some());
    }

    #[test]
    fn threshold_comes_from_config() {
        let policy = ProximityPolicy::from(&AlertConfig {
            warning_threshold: 10_000.0,
            ..AlertConfig::default()
        });
        assert_eq!(policy.evaluate(&detection("dog", 0.9, 50.0, 50.0)), None);
        assert!(policy.evaluate(&detection("dog", 0.9, 200.0, 60.0)).is_some());
    }

    #[test]
    fn last_evaluated_selection_keeps_final_alert() {
        let policy = ProximityPolicy::default();
        let frame = vec![
            detection("person", 0.9, 100.0, 100.0),
            detection("chair", 0.9, 20.0, 10.0),
            detection("cup", 0.9, 1.0, 1.0),
        ];
        assert_eq!(
            policy.select(&frame, AlertSelection::LastEvaluated).as_deref(),
            Some("Warning: chair is near")
        );
    }

    #[test]
    fn nearest_selection_prefers_largest_box() {
        let policy = ProximityPolicy::default();
        let frame = vec![
            detection("person", 0.9, 100.0, 100.0),
            detection("chair", 0.9, 20.0, 10.0),
        ];
        assert_eq!(
            policy.select(&frame, AlertSelection::Nearest).as_deref(),
            Some("Warning: person is near")
        );
        assert_eq!(policy.select(&Vec::<Detection>::new(), AlertSelection::Nearest), None);
    }
}

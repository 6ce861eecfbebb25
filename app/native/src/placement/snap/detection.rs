//! Drag-time snap target detection.
//!
//! Pure functions over the zone catalog: no locks, no I/O. The manager feeds
//! them a consistent snapshot of zones and weights.

use std::cmp::Ordering;

use serde::Serialize;
use serde_json::Value;

use super::zone::{SnapZone, ZoneAction, ZoneKind};
use crate::placement::geometry::{Point, Rect};
use crate::placement::registry::Window;
use crate::placement::weights::WeightTable;

/// Default confidence for advisor zones that do not state one.
const ADVISOR_DEFAULT_CONFIDENCE: f64 = 0.5;

/// Distance thresholds used during detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectionSettings {
    /// Pixel distance within which a zone becomes a candidate.
    pub threshold: f64,
    /// Threshold multiplier for magnetic zones.
    pub magnetic_multiplier: f64,
}

impl Default for DetectionSettings {
    fn default() -> Self { Self { threshold: 20.0, magnetic_multiplier: 1.5 } }
}

/// A zone the dragged window could snap into.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapCandidate {
    pub zone_id: String,
    pub kind: ZoneKind,
    /// Resolved destination on the monitor.
    pub frame: Rect,
    pub distance: f64,
    pub confidence: f64,
    #[serde(skip)]
    pub actions: Vec<ZoneAction>,
}

/// `(1 − distance/threshold) × (1/priority) × weight`, clamped to `[0, 1]`.
#[must_use]
pub fn confidence(distance: f64, threshold: f64, priority: u32, weight: f64) -> f64 {
    if threshold <= 0.0 {
        return 0.0;
    }
    let proximity = 1.0 - distance / threshold;
    let value = proximity * (1.0 / f64::from(priority.max(1))) * weight;
    if value.is_finite() { value.clamp(0.0, 1.0) } else { 0.0 }
}

/// Learned weight of a zone relative to a uniform table.
///
/// A zone with an average weight scores 1.0; unknown zones score 1.0.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn relative_weight(weights: &WeightTable, zone_id: &str) -> f64 {
    weights
        .get(zone_id)
        .map_or(1.0, |weight| weight * weights.len() as f64)
}

/// Computes every candidate within reach of `cursor`, ranked.
#[must_use]
pub fn detect(
    zones: &[SnapZone],
    weights: &WeightTable,
    window: &Window,
    monitor_frame: &Rect,
    cursor: Point,
    settings: DetectionSettings,
) -> Vec<SnapCandidate> {
    let mut candidates: Vec<SnapCandidate> = zones
        .iter()
        .filter(|zone| zone.enabled && zone.conditions.accepts(window))
        .filter_map(|zone| {
            let threshold = if zone.magnetic {
                settings.threshold * settings.magnetic_multiplier
            } else {
                settings.threshold
            };
            let distance = zone.resolve_trigger(monitor_frame).distance_to_point(cursor);
            if distance > threshold {
                return None;
            }
            Some(SnapCandidate {
                zone_id: zone.id.clone(),
                kind: zone.kind,
                frame: zone.resolve(monitor_frame),
                distance,
                confidence: confidence(
                    distance,
                    threshold,
                    zone.priority,
                    relative_weight(weights, &zone.id),
                ),
                actions: zone.actions.clone(),
            })
        })
        .collect();
    rank(&mut candidates);
    candidates
}

/// Sorts by confidence descending, then distance ascending.
pub fn rank(candidates: &mut [SnapCandidate]) {
    candidates.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.distance.partial_cmp(&b.distance).unwrap_or(Ordering::Equal))
    });
}

/// Parses an advisor answer of the form
/// `{"zones": [{"id": "...", "area": {x, y, width, height}, "confidence": 0.8}]}`.
///
/// Areas are percentages of `monitor_frame`. Malformed entries are skipped.
#[must_use]
pub fn parse_advisor_zones(answer: &Value, monitor_frame: &Rect, cursor: Point) -> Vec<SnapCandidate> {
    let Some(zones) = answer.get("zones").and_then(Value::as_array) else {
        return Vec::new();
    };

    zones
        .iter()
        .filter_map(|entry| {
            let id = entry.get("id")?.as_str()?;
            let area: Rect = serde_json::from_value(entry.get("area")?.clone()).ok()?;
            if area.is_degenerate() {
                return None;
            }
            let frame = Rect::from_percent(&area, monitor_frame);
            let confidence = entry
                .get("confidence")
                .and_then(Value::as_f64)
                .unwrap_or(ADVISOR_DEFAULT_CONFIDENCE)
                .clamp(0.0, 1.0);
            Some(SnapCandidate {
                zone_id: id.to_string(),
                kind: ZoneKind::Advisor,
                frame,
                distance: frame.distance_to_point(cursor),
                confidence,
                actions: vec![ZoneAction::Fit],
            })
        })
        .collect()
}

/// Merges advisor candidates into the local ones and re-ranks.
///
/// When both name the same zone the higher confidence wins.
#[must_use]
pub fn merge(mut local: Vec<SnapCandidate>, advisor: Vec<SnapCandidate>) -> Vec<SnapCandidate> {
    for suggestion in advisor {
        match local.iter_mut().find(|c| c.zone_id == suggestion.zone_id) {
            Some(existing) => {
                if suggestion.confidence > existing.confidence {
                    existing.confidence = suggestion.confidence;
                }
            }
            None => local.push(suggestion),
        }
    }
    rank(&mut local);
    local
}

use crate::normalizer::{self, Normalized};
use crate::record::{LogRecord, ValuePoint};
use std::collections::BTreeMap;
use tracing::{debug, trace};

/// A device needs more than this many points to be charted.
pub const RENDER_THRESHOLD: usize = 3;

/// Per-device series, keyed by device name. Points keep store read order.
#[derive(Debug, Default)]
pub struct SeriesMap {
    devices: BTreeMap<String, Vec<ValuePoint>>,
}

impl SeriesMap {
    /// Normalize every record and fold it into its device's series.
    ///
    /// `on_record` sees each normalized record before it is aggregated.
    pub fn from_records<F>(records: &[LogRecord], mut on_record: F) -> Self
    where
        F: FnMut(&LogRecord, &Normalized),
    {
        let mut map = SeriesMap::default();
        for record in records {
            let n = normalizer::normalize(&record.entry);
            trace!(
                timestamp = %record.timestamp,
                device = %n.device,
                cleaned = %n.cleaned,
                value = n.value,
                rule = %n.rule,
                "normalized"
            );
            on_record(record, &n);
            map.push(n.device, ValuePoint::new(record.timestamp.clone(), n.value));
        }
        map
    }

    /// Appends to the device's series, creating it on first sight.
    /// Returns `false` (and drops the point) for an empty device name.
    pub fn push(&mut self, device: String, point: ValuePoint) -> bool {
        if device.is_empty() {
            debug!(timestamp = %point.timestamp, "skipping record without a device name");
            return false;
        }
        self.devices.entry(device).or_default().push(point);
        true
    }

    #[cfg(test)]
    pub fn get(&self, device: &str) -> Option<&[ValuePoint]> {
        self.devices.get(device).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[ValuePoint])> {
        self.devices.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Devices with enough points to chart, in name order.
    pub fn renderable(&self) -> impl Iterator<Item = (&str, &[ValuePoint])> {
        self.iter().filter(|(_, points)| is_renderable(points))
    }
}

pub fn is_renderable(points: &[ValuePoint]) -> bool {
    points.len() > RENDER_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(ts: &str, entry: &str) -> LogRecord {
        LogRecord {
            timestamp: ts.to_string(),
            entry: entry.to_string(),
        }
    }

    #[test]
    fn keeps_read_order_without_sorting() {
        let records = vec![
            rec("2015-01-01 10:00:00", "Device: LivingRoom to On"),
            rec("2015-01-01 09:00:00", "Device: LivingRoom to 73.5"),
            rec("2015-01-01 11:00:00", "Device: LivingRoom to Off"),
            rec("2015-01-01 12:00:00", "Device: LivingRoom to 70"),
        ];
        let map = SeriesMap::from_records(&records, |_, _| {});
        let points = map.get("LivingRoom").unwrap();
        let values: Vec<f64> = points.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![1.0, 73.5, 0.0, 70.0]);
        assert_eq!(points[1].timestamp, "2015-01-01 09:00:00");
    }

    #[test]
    fn sentinel_points_are_retained() {
        let records = vec![
            rec("t1", "Device: Garage to Unknown"),
            rec("t2", "Device: Garage to 5"),
        ];
        let mut sentinels = 0;
        let map = SeriesMap::from_records(&records, |_, n| {
            if n.is_sentinel() {
                sentinels += 1;
            }
        });
        assert_eq!(sentinels, 1);
        let values: Vec<f64> = map.get("Garage").unwrap().iter().map(|p| p.value).collect();
        assert_eq!(values, vec![normalizer::SENTINEL, 5.0]);
    }

    #[test]
    fn threshold_is_more_than_three() {
        let mut map = SeriesMap::default();
        for i in 0..3 {
            map.push("Three".into(), ValuePoint::new(format!("t{i}"), 1.0));
        }
        for i in 0..4 {
            map.push("Four".into(), ValuePoint::new(format!("t{i}"), 1.0));
        }
        let names: Vec<&str> = map.renderable().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["Four"]);
    }

    #[test]
    fn empty_device_names_are_skipped() {
        let mut map = SeriesMap::default();
        assert!(!map.push(String::new(), ValuePoint::new("t", 1.0)));
        assert!(map.is_empty());
    }
}

//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

//! Fetch statistics collector

use stats::{MinMax, OnlineStats};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

type MeasurementType = u64;

struct StatCollector {
    online: OnlineStats,
    minmax: MinMax<MeasurementType>,
}

pub struct StatResults {
    pub len: usize,
    pub min: MeasurementType,
    pub max: MeasurementType,
    pub mean: f64,
    pub stddev: f64,
}

/// Measurements keyed by `<measure>.<schema>`
pub struct Statistics(BTreeMap<String, StatCollector>);

impl Statistics {
    pub fn new() -> Statistics {
        Statistics(BTreeMap::new())
    }
    fn collector(&mut self, key: String) -> &mut StatCollector {
        self.0.entry(key).or_insert(StatCollector {
            online: OnlineStats::new(),
            minmax: MinMax::new(),
        })
    }
    pub fn add(&mut self, key: String, value: MeasurementType) {
        let collector = self.collector(key);
        collector.online.add(value);
        collector.minmax.add(value);
    }
    /// Record one completed select request
    pub fn add_fetch(&mut self, schema: &str, elapsed: Duration, new_features: usize) {
        self.add(format!("fetch_ms.{}", schema), elapsed.as_millis() as u64);
        self.add(format!("new_features.{}", schema), new_features as u64);
    }
    /// Record one request which failed
    pub fn add_failure(&mut self, schema: &str) {
        self.add(format!("failures.{}", schema), 1);
    }
    pub fn results(&self, key: &str) -> StatResults {
        if let Some(collector) = self.0.get(key) {
            StatResults {
                len: collector.minmax.len(),
                min: *collector.minmax.min().unwrap_or(&0),
                max: *collector.minmax.max().unwrap_or(&0),
                mean: collector.online.mean(),
                stddev: collector.online.stddev(),
            }
        } else {
            StatResults {
                len: 0,
                min: 0,
                max: 0,
                mean: 0.0,
                stddev: 0.0,
            }
        }
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
    pub fn as_csv(&self) -> String {
        let mut csv = "key,count,min,max,mean,stddev\n".to_string();
        for key in self.0.keys() {
            let res = self.results(key);
            csv.push_str(&format!(
                "{},{},{},{},{:.3},{:.3}\n",
                key, res.len, res.min, res.max, res.mean, res.stddev
            ));
        }
        csv
    }
}

impl fmt::Debug for StatResults {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "#measurements: {}, min: {}, max: {}, mean: {:.3} +/- {:.3}",
            self.len, self.min, self.max, self.mean, self.stddev
        )
    }
}

impl fmt::Debug for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for key in self.0.keys() {
            let res = self.results(key);
            write!(f, "{}: {:?}\n", key, res)?;
        }
        Ok(())
    }
}

#[test]
fn test_fetch_stats() {
    let mut stats = Statistics::new();
    assert!(stats.is_empty());
    stats.add_fetch("poi", Duration::from_millis(10), 3);
    stats.add_fetch("poi", Duration::from_millis(30), 0);
    stats.add_fetch("roads", Duration::from_millis(5), 7);
    let res = stats.results("fetch_ms.poi");
    assert_eq!(res.len, 2);
    assert_eq!(res.min, 10);
    assert_eq!(res.max, 30);
    assert_eq!(res.mean, 20.0);
    assert_eq!(stats.results("new_features.roads").max, 7);
    assert_eq!(stats.results("fetch_ms.unknown").len, 0);

    let csv = stats.as_csv();
    assert!(csv.starts_with("key,count,min,max,mean,stddev\n"));
    assert!(csv.contains("fetch_ms.poi,2,10,30,20.000,10.000\n"));
}

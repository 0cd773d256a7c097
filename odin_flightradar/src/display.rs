/*
 * Copyright © 2025, United States Government, as represented by the Administrator of
 * the National Aeronautics and Space Administration. All rights reserved.
 *
 * The “ODIN” software is licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License. You may obtain a copy
 * of the License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software distributed under
 * the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
 * either express or implied. See the License for the specific language governing permissions
 * and limitations under the License.
 */

//! helpers for clients that present published aircraft lists. These are pure functions of a published list,
//! rendering itself is up to the client.

use std::str::FromStr;
use serde::{Serialize,Deserialize};
use crate::{AltitudeUnit, EnrichedAircraft};

pub const METERS_PER_FOOT: f64 = 0.3048;
pub const KMH_PER_KNOT: f64 = 1.8520008892119;
pub const MPH_PER_KNOT: f64 = 1.15078;

#[derive(Serialize,Deserialize,Debug,Clone,Copy,PartialEq,Eq)]
#[serde(rename_all="lowercase")]
pub enum DisplayUnits {
    Metric,
    Imperial,
}

#[derive(Serialize,Deserialize,Debug,Clone,Copy,PartialEq,Eq)]
#[serde(rename_all="lowercase")]
pub enum SpeedUnits {
    Metric,   // km/h
    Imperial, // mph
    Knots,
}

impl FromStr for DisplayUnits {
    type Err = String;
    fn from_str (s: &str)->Result<Self,Self::Err> {
        match s.to_lowercase().as_str() {
            "metric" => Ok(DisplayUnits::Metric),
            "imperial" => Ok(DisplayUnits::Imperial),
            _ => Err( format!("unknown units '{s}' (expected metric|imperial)"))
        }
    }
}

impl FromStr for SpeedUnits {
    type Err = String;
    fn from_str (s: &str)->Result<Self,Self::Err> {
        match s.to_lowercase().as_str() {
            "metric" | "kmh" => Ok(SpeedUnits::Metric),
            "imperial" | "mph" => Ok(SpeedUnits::Imperial),
            "knots" | "kn" => Ok(SpeedUnits::Knots),
            _ => Err( format!("unknown speed units '{s}' (expected metric|imperial|knots)"))
        }
    }
}

/// 16 point compass label for a bearing in degrees. Each label covers a 22.5° sector centered on its direction
pub fn cardinal_direction (bearing: f64)->&'static str {
    const LABELS: [&str;16] = [
        "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE",
        "S", "SSW", "SW", "WSW", "W", "WNW", "NW", "NNW"
    ];
    const SECTOR: f64 = 22.5;

    let b = bearing.rem_euclid(360.0);
    // upper sector bounds are inclusive, i.e. 11.25 is still N
    let idx = ((b - SECTOR/2.0) / SECTOR).ceil().rem_euclid(16.0) as usize;
    LABELS[idx % 16]
}

/// altitude of an aircraft in the requested units (missing altitudes count as 0)
pub fn display_altitude (ac: &EnrichedAircraft, units: DisplayUnits)->f64 {
    let alt = ac.altitude.unwrap_or(0.0);
    match (ac.unit, units) {
        (AltitudeUnit::Feet, DisplayUnits::Metric) => alt * METERS_PER_FOOT,
        (AltitudeUnit::Meters, DisplayUnits::Imperial) => alt / METERS_PER_FOOT,
        _ => alt
    }
}

/// distances are published in meters
pub fn display_distance (meters: f64, units: DisplayUnits)->f64 {
    match units {
        DisplayUnits::Metric => meters,
        DisplayUnits::Imperial => meters / METERS_PER_FOOT,
    }
}

/// speeds are published in knots
pub fn speed_in (units: SpeedUnits, knots: f64)->f64 {
    match units {
        SpeedUnits::Metric => knots * KMH_PER_KNOT,
        SpeedUnits::Imperial => knots * MPH_PER_KNOT,
        SpeedUnits::Knots => knots,
    }
}

/// split a published list into aircraft at or below `threshold` ("at the window") and the ones above it ("passing by").
/// Both parts keep the order of the input list
pub fn split_by_altitude (list: &[EnrichedAircraft], threshold: f64, units: DisplayUnits)->(Vec<&EnrichedAircraft>,Vec<&EnrichedAircraft>) {
    list.iter().partition( |ac| display_altitude( ac, units) <= threshold)
}

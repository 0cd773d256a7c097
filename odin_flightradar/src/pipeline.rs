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

//! the enrichment and ranking of a settled aircraft batch.
//!
//! This is a synchronous transform over data that is already complete - it does not await anything and does
//! not mutate its input. Each published [`EnrichedAircraft`] is built from the raw record, its (optional) flight
//! detail and the reference tables.

use std::{cmp::Ordering, fmt, str::FromStr};
use serde::{Serialize,Deserialize};

use crate::{
    EnrichedAircraft, FlightDetail, FlightRadarConfig, RawAircraft,
    details::SettledAircraft, geo::GeoPos, reference::ReferenceStore
};

/// what we show if we can't find the airline
pub const UNKNOWN_AIRLINE: &str = "Unknown";

#[derive(Serialize,Deserialize,Debug,Clone,Copy,PartialEq,Eq)]
#[serde(rename_all="lowercase")]
pub enum SortKey {
    Distance,
    Altitude,
    Speed,
    Flight,   // callsign
    Airline,
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str (s: &str)->Result<Self,Self::Err> {
        match s.to_lowercase().as_str() {
            "distance" => Ok(SortKey::Distance),
            "altitude" => Ok(SortKey::Altitude),
            "speed" => Ok(SortKey::Speed),
            "flight" | "callsign" => Ok(SortKey::Flight),
            "airline" => Ok(SortKey::Airline),
            _ => Err( format!("unknown sort key '{s}' (expected distance|altitude|speed|flight|airline)"))
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SortKey::Distance => "distance",
            SortKey::Altitude => "altitude",
            SortKey::Speed => "speed",
            SortKey::Flight => "flight",
            SortKey::Airline => "airline",
        };
        write!(f, "{s}")
    }
}

/// sort and truncation policy for published lists
#[derive(Debug,Clone,Copy,PartialEq)]
pub struct RankPolicy {
    pub sort: Option<SortKey>,
    pub descending: bool,
    pub limit: usize,
}

impl RankPolicy {
    pub fn from_config (config: &FlightRadarConfig)->Self {
        RankPolicy { sort: config.sort, descending: config.sort_descending, limit: config.limit }
    }
}

/// run the whole pipeline over a settled batch: enrich, sort and truncate
pub fn process_batch (batch: &[SettledAircraft], refs: &ReferenceStore, center: &GeoPos, policy: &RankPolicy)->Vec<EnrichedAircraft> {
    let enriched: Vec<EnrichedAircraft> = batch.iter()
        .filter_map( |s| enrich( &s.aircraft, s.detail.as_ref(), refs, center))
        .collect();

    rank( enriched, policy)
}

/// build the display record for a raw aircraft, or None if the aircraft has no callsign
pub fn enrich (raw: &RawAircraft, detail: Option<&FlightDetail>, refs: &ReferenceStore, center: &GeoPos)->Option<EnrichedAircraft> {
    let callsign = raw.callsign()?;
    let info = refs.resolve_aircraft( raw.mode_s_code.as_deref(), raw.model.as_deref());

    let airline = match non_blank( &raw.airline) {
        Some(name) => name.to_string(),
        None => {
            if let Some(operator) = info.and_then( |i| i.operator()) {
                operator.to_string() // the registered operator trumps whatever the callsign says
            } else {
                refs.find_airline_by_callsign_prefix( callsign)
                    .map( |airline| airline.display_name())
                    .unwrap_or_else( || UNKNOWN_AIRLINE.to_string())
            }
        }
    };

    let aircraft_type = match non_blank( &raw.aircraft_type) {
        Some(t) => Some(t.to_string()),
        None => info.and_then( |i| i.type_display()).map( str::to_string)
    };

    let (distance, bearing) = match raw.position() {
        Some(pos) => (Some( center.distance_to( &pos)), Some( center.bearing_to( &pos))),
        None => (None, None)
    };

    let origin = detail.and_then( |d| d.origin.as_ref());
    let destination = detail.and_then( |d| d.destination.as_ref());

    Some( EnrichedAircraft {
        id: raw.id.clone(),
        callsign: callsign.to_string(),
        mode_s_code: raw.mode_s_code.clone(),
        model: raw.model.clone(),
        registration: raw.registration.clone(),
        flight: raw.flight.clone(),
        latitude: raw.latitude,
        longitude: raw.longitude,
        altitude: raw.altitude,
        unit: raw.unit,
        speed: raw.speed,
        heading: raw.heading,
        vertical_rate: raw.vertical_rate,
        squawk: raw.squawk.clone(),
        on_ground: raw.on_ground,
        timestamp: raw.timestamp,

        airline,
        aircraft_type,
        distance,
        bearing,

        origin: origin.map( |o| o.name.clone()),
        origin_id: origin.and_then( |o| o.id.clone()),
        origin_country: origin.and_then( |o| o.country.clone()),
        destination: destination.map( |d| d.name.clone()),
        destination_id: destination.and_then( |d| d.id.clone()),
        destination_country: destination.and_then( |d| d.country.clone()),
    })
}

/// sort (if the policy has a key) and truncate to the policy limit
pub fn rank (mut list: Vec<EnrichedAircraft>, policy: &RankPolicy)->Vec<EnrichedAircraft> {
    if let Some(key) = policy.sort {
        sort_aircraft( &mut list, key, policy.descending);
    }
    list.truncate( policy.limit);
    list
}

/// stable sort - entries with equal keys keep their relative order in both directions.
/// Missing numeric values compare as 0, NaNs are ordered by `f64::total_cmp`
pub fn sort_aircraft (list: &mut [EnrichedAircraft], key: SortKey, descending: bool) {
    list.sort_by( |a,b| {
        let ord = compare( a, b, key);
        if descending { ord.reverse() } else { ord }
    });
}

fn compare (a: &EnrichedAircraft, b: &EnrichedAircraft, key: SortKey)->Ordering {
    match key {
        SortKey::Distance => cmp_num( a.distance, b.distance),
        SortKey::Altitude => cmp_num( a.altitude, b.altitude),
        SortKey::Speed => cmp_num( a.speed, b.speed),
        SortKey::Flight => a.callsign.cmp( &b.callsign),
        SortKey::Airline => a.airline.cmp( &b.airline),
    }
}

#[inline]
fn cmp_num (a: Option<f64>, b: Option<f64>)->Ordering {
    a.unwrap_or(0.0).total_cmp( &b.unwrap_or(0.0))
}

fn non_blank (s: &Option<String>)->Option<&str> {
    s.as_deref().map( str::trim).filter( |s| !s.is_empty())
}

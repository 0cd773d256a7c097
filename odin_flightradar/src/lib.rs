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

//! crate to track aircraft around a fixed observer position.
//!
//! Each poll cycle retrieves the raw aircraft within a bounding box from a [`FlightDataSource`], resolves
//! per-aircraft flight details concurrently ([`details`]), enriches the settled batch with reference data and
//! observer geometry ([`pipeline`]) and hands the sorted, truncated list to a [`publisher::Publisher`] that
//! only notifies its consumer if the list has changed.

use std::{fmt, fs, path::{Path,PathBuf}, time::Duration};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_repr::{Serialize_repr,Deserialize_repr};
use chrono::{DateTime,Utc};
use async_trait::async_trait;

pub mod errors;
use errors::Result;

pub mod geo;
use crate::geo::{BoundingBox,GeoPos};

pub mod reference;
pub mod details;
pub mod pipeline;
use pipeline::SortKey;

pub mod publisher;
pub mod tracker;
pub mod display;

pub mod fr24;
use fr24::Fr24Config;

/* #region config ***********************************************************************************/

#[derive(Deserialize,Serialize,Debug,Clone)]
pub struct FlightRadarConfig {
    pub center_point: GeoPos,        // observer position
    pub distance: f64,               // search radius in meters
    pub limit: usize,                // max number of published aircraft
    pub sort: Option<SortKey>,       // None keeps the upstream order
    #[serde(default)]
    pub sort_descending: bool,
    pub update_interval: Duration,   // poll interval
    pub data_dir: PathBuf,           // where to find airlines.csv, aircrafts.csv and planetypes.csv
    #[serde(default)]
    pub detail_timeout: Option<Duration>, // None: wait for every detail request to settle
    pub fr24: Fr24Config,
}

impl FlightRadarConfig {
    pub fn bounding_box (&self)->BoundingBox {
        geo::bounding_box( &self.center_point, self.distance)
    }
}

/// load a RON config file, e.g. `load_config::<FlightRadarConfig>("configs/flightradar.ron")`
pub fn load_config<C> (path: impl AsRef<Path>)->Result<C> where C: DeserializeOwned {
    let s = fs::read_to_string( path.as_ref())?;
    Ok( ron::from_str( &s)? )
}

/* #endregion config */

/* #region data model *******************************************************************************/

/// unit of reported altitudes. Serialized as number since that is what display clients test for
#[derive(Serialize_repr,Deserialize_repr,Debug,Clone,Copy,PartialEq,Eq,Default)]
#[repr(u8)]
pub enum AltitudeUnit {
    #[default]
    Feet = 0,
    Meters = 1,
}

/// an aircraft as reported by the upstream source in a single poll cycle
#[derive(Serialize,Deserialize,Debug,Clone,PartialEq,Default)]
#[serde(rename_all="camelCase")]
pub struct RawAircraft {
    pub id: String,                         // upstream flight id (used to query details)
    pub callsign: Option<String>,
    pub mode_s_code: Option<String>,        // ICAO 24bit transponder hex
    pub model: Option<String>,              // ICAO aircraft type code
    pub registration: Option<String>,
    pub flight: Option<String>,             // flight number
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub altitude: Option<f64>,
    pub unit: AltitudeUnit,
    pub speed: Option<f64>,                 // ground speed in knots
    pub heading: Option<f64>,
    pub vertical_rate: Option<f64>,
    pub squawk: Option<String>,
    pub on_ground: bool,
    pub origin_iata: Option<String>,
    pub destination_iata: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,

    // display values a source might already provide. Resolved from reference data if not set
    pub airline: Option<String>,
    pub aircraft_type: Option<String>,
}

impl RawAircraft {
    pub fn position (&self)->Option<GeoPos> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some( GeoPos::new( lat, lon)),
            _ => None
        }
    }

    /// callsign if it is set and not blank
    pub fn callsign (&self)->Option<&str> {
        self.callsign.as_deref().map( str::trim).filter( |cs| !cs.is_empty())
    }
}

impl fmt::Display for RawAircraft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!( f, "RawAircraft( id: {}", self.id)?;
        if let Some(cs) = &self.callsign { write!( f, ", cs: \"{cs}\"")?; }
        if let Some(hex) = &self.mode_s_code { write!( f, ", icao24: {hex}")?; }
        if let Some(pos) = self.position() { write!( f, ", pos: {pos}")?; }
        if let Some(alt) = self.altitude { write!( f, ", alt: {alt:.0}")?; }
        if let Some(spd) = self.speed { write!( f, ", spd: {spd:.0}")?; }
        write!( f, ")")
    }
}

/// one end of a flight route
#[derive(Serialize,Deserialize,Debug,Clone,PartialEq)]
pub struct RouteEndpoint {
    pub name: String,
    pub id: Option<String>,      // airport IATA code
    pub country: Option<String>,
}

/// extended flight information we get from a per-aircraft query
#[derive(Serialize,Deserialize,Debug,Clone,PartialEq,Default)]
pub struct FlightDetail {
    pub origin: Option<RouteEndpoint>,
    pub destination: Option<RouteEndpoint>,
}

/// the display-ready aircraft record we publish. Built fresh every poll cycle
#[derive(Serialize,Deserialize,Debug,Clone,PartialEq)]
#[serde(rename_all="camelCase")]
pub struct EnrichedAircraft {
    pub id: String,
    pub callsign: String,
    #[serde(skip_serializing_if="Option::is_none")] pub mode_s_code: Option<String>,
    #[serde(skip_serializing_if="Option::is_none")] pub model: Option<String>,
    #[serde(skip_serializing_if="Option::is_none")] pub registration: Option<String>,
    #[serde(skip_serializing_if="Option::is_none")] pub flight: Option<String>,
    #[serde(skip_serializing_if="Option::is_none")] pub latitude: Option<f64>,
    #[serde(skip_serializing_if="Option::is_none")] pub longitude: Option<f64>,
    #[serde(skip_serializing_if="Option::is_none")] pub altitude: Option<f64>,
    pub unit: AltitudeUnit,
    #[serde(skip_serializing_if="Option::is_none")] pub speed: Option<f64>,
    #[serde(skip_serializing_if="Option::is_none")] pub heading: Option<f64>,
    #[serde(skip_serializing_if="Option::is_none")] pub vertical_rate: Option<f64>,
    #[serde(skip_serializing_if="Option::is_none")] pub squawk: Option<String>,
    pub on_ground: bool,
    #[serde(skip_serializing_if="Option::is_none")] pub timestamp: Option<DateTime<Utc>>,

    //--- derived fields
    pub airline: String,
    #[serde(rename="type", skip_serializing_if="Option::is_none")] pub aircraft_type: Option<String>,
    #[serde(skip_serializing_if="Option::is_none")] pub distance: Option<f64>, // meters from observer
    #[serde(skip_serializing_if="Option::is_none")] pub bearing: Option<f64>,  // degrees from observer

    //--- route (if we got flight details)
    #[serde(skip_serializing_if="Option::is_none")] pub origin: Option<String>,
    #[serde(skip_serializing_if="Option::is_none")] pub origin_id: Option<String>,
    #[serde(skip_serializing_if="Option::is_none")] pub origin_country: Option<String>,
    #[serde(skip_serializing_if="Option::is_none")] pub destination: Option<String>,
    #[serde(skip_serializing_if="Option::is_none")] pub destination_id: Option<String>,
    #[serde(skip_serializing_if="Option::is_none")] pub destination_country: Option<String>,
}

impl fmt::Display for EnrichedAircraft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!( f, "{:8} {:<24}", self.callsign, self.airline)?;
        if let Some(t) = &self.aircraft_type { write!( f, " {t}")?; }
        if let Some(alt) = self.altitude { write!( f, ", alt: {alt:.0}")?; }
        if let Some(spd) = self.speed { write!( f, ", spd: {spd:.0}")?; }
        if let Some(dist) = self.distance { write!( f, ", dist: {:.1}km", dist / 1000.0)?; }
        if let Some(brg) = self.bearing { write!( f, ", brg: {brg:.0}")?; }
        if let (Some(orig),Some(dest)) = (&self.origin, &self.destination) { write!( f, ", {orig} -> {dest}")?; }
        Ok(())
    }
}

/* #endregion data model */

/* #region data source ******************************************************************************/

/// the upstream flight tracking provider. This is a black box for the tracker - all it needs is a
/// bounding box query for current aircraft and a per-aircraft query for route details
#[async_trait]
pub trait FlightDataSource: Send + Sync {
    async fn get_aircraft (&self, bbox: &BoundingBox)->Result<Vec<RawAircraft>>;
    async fn get_flight_detail (&self, id: &str)->Result<FlightDetail>;
}

/* #endregion data source */

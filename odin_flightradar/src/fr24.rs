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

//! a [`FlightDataSource`] that uses the public FlightRadar24 web feed.
//!
//! The feed endpoint returns a JSON object with one positional array per flight (keyed by flight id), plus some
//! bookkeeping entries such as "full_count" and "version". The click handler endpoint returns the flight details
//! we use for route information.

use chrono::{DateTime,Utc};
use reqwest::{Client, header::{ACCEPT, HeaderValue}};
use serde::{Serialize,Deserialize};
use serde_json::{Map,Value};
use async_trait::async_trait;
use tracing::warn;

use crate::{
    AltitudeUnit, FlightDataSource, FlightDetail, RawAircraft, RouteEndpoint,
    errors::{Result,parse_error,op_failed}, geo::BoundingBox
};

#[derive(Deserialize,Serialize,Debug,Clone)]
pub struct Fr24Config {
    pub feed_url: String,    // e.g. "https://data-cloud.flightradar24.com/zones/fcgi/feed.js"
    pub detail_url: String,  // e.g. "https://data-live.flightradar24.com/clickhandler/"
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for Fr24Config {
    fn default()->Self {
        Fr24Config {
            feed_url: "https://data-cloud.flightradar24.com/zones/fcgi/feed.js".to_string(),
            detail_url: "https://data-live.flightradar24.com/clickhandler/".to_string(),
            user_agent: None,
        }
    }
}

pub struct Fr24Connector {
    config: Fr24Config,
    client: Client,
}

impl Fr24Connector {
    pub fn new (config: Fr24Config)->Result<Self> {
        let mut builder = Client::builder();
        if let Some(ua) = &config.user_agent {
            builder = builder.user_agent( ua.as_str());
        }
        let client = builder.build()?;
        Ok( Fr24Connector { config, client } )
    }

    async fn get_json (&self, url: &str, query: &[(&str,String)])->Result<Value> {
        let response = self.client.get( url)
            .header( ACCEPT, HeaderValue::from_static("application/json"))
            .query( query)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err( op_failed!("request to {} failed: {}", url, response.status()))
        }
        Ok( response.json::<Value>().await? )
    }
}

#[async_trait]
impl FlightDataSource for Fr24Connector {

    async fn get_aircraft (&self, bbox: &BoundingBox)->Result<Vec<RawAircraft>> {
        let bounds = format!("{:.4},{:.4},{:.4},{:.4}", bbox.north(), bbox.south(), bbox.west(), bbox.east());
        let query = [
            ("bounds", bounds),
            ("faa", "1".to_string()),
            ("satellite", "1".to_string()),
            ("mlat", "1".to_string()),
            ("flarm", "1".to_string()),
            ("adsb", "1".to_string()),
            ("gnd", "0".to_string()),
            ("air", "1".to_string()),
            ("vehicles", "0".to_string()),
            ("estimated", "1".to_string()),
            ("gliders", "0".to_string()),
            ("stats", "0".to_string()),
        ];

        let json = self.get_json( &self.config.feed_url, &query).await?;
        parse_feed( &json)
    }

    async fn get_flight_detail (&self, id: &str)->Result<FlightDetail> {
        let query = [ ("flight", id.to_string()), ("version", "1.5".to_string()) ];
        let json = self.get_json( &self.config.detail_url, &query).await?;
        parse_flight_detail( &json)
    }
}

/* #region response parsing **************************************************************************/

/// feed entries that are not flights
const FEED_META_KEYS: [&str;3] = ["full_count", "version", "stats"];

/// positional fields of a feed flight array:
///   0: mode-S hex,  1: lat,  2: lon,  3: heading,  4: altitude (ft),  5: ground speed (kn),  6: squawk,
///   7: radar,  8: model,  9: registration,  10: timestamp (epoch secs),  11: origin IATA,  12: destination IATA,
///  13: flight number,  14: on ground,  15: vertical rate (ft/min),  16: callsign,  17: glider,  18: airline ICAO
pub fn parse_feed (json: &Value)->Result<Vec<RawAircraft>> {
    let entries = json.as_object().ok_or_else( || parse_error!("feed response is not an object"))?;

    let mut list = Vec::with_capacity( entries.len());
    for (id, entry) in entries.iter() {
        if FEED_META_KEYS.contains( &id.as_str()) { continue }

        match parse_feed_entry( id, entry) {
            Ok(aircraft) => list.push(aircraft),
            Err(e) => warn!("ignoring feed entry {}: {}", id, e)
        }
    }
    Ok(list)
}

fn parse_feed_entry (id: &str, entry: &Value)->Result<RawAircraft> {
    let a = entry.as_array().ok_or_else( || parse_error!("not an array"))?;
    if a.len() < 17 { return Err( parse_error!("only {} fields", a.len())) }

    let timestamp = a[10].as_i64().and_then( |secs| DateTime::<Utc>::from_timestamp( secs, 0));

    Ok( RawAircraft {
        id: id.to_string(),
        callsign: string_at( a, 16),
        mode_s_code: string_at( a, 0),
        model: string_at( a, 8),
        registration: string_at( a, 9),
        flight: string_at( a, 13),
        latitude: a[1].as_f64(),
        longitude: a[2].as_f64(),
        altitude: a[4].as_f64(),
        unit: AltitudeUnit::Feet,
        speed: a[5].as_f64(),
        heading: a[3].as_f64(),
        vertical_rate: a[15].as_f64(),
        squawk: string_at( a, 6),
        on_ground: a[14].as_i64().map( |v| v != 0).or( a[14].as_bool()).unwrap_or(false),
        origin_iata: string_at( a, 11),
        destination_iata: string_at( a, 12),
        timestamp,
        airline: None,
        aircraft_type: None,
    })
}

fn string_at (a: &[Value], idx: usize)->Option<String> {
    a.get(idx).and_then( |v| v.as_str()).map( str::trim).filter( |s| !s.is_empty()).map( str::to_string)
}

/// the parts of a click handler response we use
pub fn parse_flight_detail (json: &Value)->Result<FlightDetail> {
    let obj = json.as_object().ok_or_else( || parse_error!("flight detail response is not an object"))?;

    let airport = obj.get("airport").and_then( |v| v.as_object());
    let origin = airport.and_then( |a| a.get("origin")).and_then( parse_route_endpoint);
    let destination = airport.and_then( |a| a.get("destination")).and_then( parse_route_endpoint);

    Ok( FlightDetail { origin, destination } )
}

fn parse_route_endpoint (v: &Value)->Option<RouteEndpoint> {
    let ap: &Map<String,Value> = v.as_object()?;
    let name = ap.get("name")?.as_str()?.to_string();
    let id = ap.get("code").and_then( |c| c.get("iata")).and_then( |s| s.as_str()).map( str::to_string);
    let country = ap.get("position")
        .and_then( |p| p.get("country"))
        .and_then( |c| c.get("name"))
        .and_then( |s| s.as_str())
        .map( str::to_string);

    Some( RouteEndpoint { name, id, country } )
}

/* #endregion response parsing */

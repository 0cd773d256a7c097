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

use std::path::PathBuf;
use tokio;
use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use odin_flightradar::{
    load_config, FlightRadarConfig, EnrichedAircraft,
    details::DetailFetcher,
    display::{cardinal_direction, display_altitude, display_distance, speed_in, split_by_altitude, DisplayUnits, SpeedUnits},
    fr24::Fr24Connector, pipeline::{RankPolicy, SortKey}, reference::ReferenceStore, tracker::poll_cycle,
};

#[derive(Parser, Debug)]
#[command(version, about, long_about = "show the aircraft that are currently around a fixed position")]
pub struct Args {
    /// RON config file
    #[arg(short,long, default_value = "configs/flightradar.ron")]
    pub config: PathBuf,

    /// sort key (distance|altitude|speed|flight|airline), overrides config
    #[arg(short,long)]
    pub sort: Option<SortKey>,

    /// sort in descending order
    #[arg(short,long)]
    pub descending: bool,

    /// max number of aircraft, overrides config
    #[arg(short,long)]
    pub limit: Option<usize>,

    #[arg(short,long, default_value = "metric")]
    pub units: DisplayUnits,

    #[arg(long, default_value = "knots")]
    pub speed_units: SpeedUnits,

    /// aircraft at or below this altitude (in display units) are listed as "at the window"
    #[arg(short,long, default_value_t = 3000.0)]
    pub altitude_threshold: f64,
}

#[tokio::main]
async fn main()->Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter( EnvFilter::from_default_env())
        .try_init();

    let args = Args::parse();

    let config: FlightRadarConfig = load_config( &args.config)?;
    let refs = ReferenceStore::load_from_dir( &config.data_dir);
    let source = Fr24Connector::new( config.fr24.clone())?;
    let fetcher = DetailFetcher::with_timeout( config.detail_timeout);

    let mut policy = RankPolicy::from_config( &config);
    if args.sort.is_some() { policy.sort = args.sort }
    if args.descending { policy.descending = true }
    if let Some(limit) = args.limit { policy.limit = limit }

    let list = poll_cycle( &source, &refs, &fetcher, &config.bounding_box(), &config.center_point, &policy).await?;
    let (low, high) = split_by_altitude( &list, args.altitude_threshold, args.units);

    println!("------- at the window ({})", low.len());
    for ac in low { print_aircraft( ac, &args) }

    println!("------- passing by ({})", high.len());
    for ac in high { print_aircraft( ac, &args) }

    Ok(())
}

fn print_aircraft (ac: &EnrichedAircraft, args: &Args) {
    let (alt_unit, dist_unit, dist_scale) = match args.units {
        DisplayUnits::Metric => ("m", "km", 1000.0),
        DisplayUnits::Imperial => ("ft", "mi", 5280.0),
    };
    let speed_unit = match args.speed_units {
        SpeedUnits::Metric => "km/h",
        SpeedUnits::Imperial => "mph",
        SpeedUnits::Knots => "kn",
    };

    print!("{:8} {:<24} {:>6.0}{}", ac.callsign, ac.airline, display_altitude( ac, args.units), alt_unit);
    if let Some(spd) = ac.speed { print!(" {:>5.0}{}", speed_in( args.speed_units, spd), speed_unit) }
    if let Some(dist) = ac.distance { print!(" {:>5.1}{}", display_distance( dist, args.units) / dist_scale, dist_unit) }
    if let Some(brg) = ac.bearing { print!(" {:>3}", cardinal_direction( brg)) }
    if let Some(t) = &ac.aircraft_type { print!("  {t}") }
    if let (Some(orig),Some(dest)) = (&ac.origin, &ac.destination) { print!("  {orig} -> {dest}") }
    println!();
}

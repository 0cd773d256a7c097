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

use std::{path::PathBuf, sync::Arc};
use tokio;
use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use odin_flightradar::{
    load_config, FlightRadarConfig, EnrichedAircraft,
    fr24::Fr24Connector, publisher::FnPublishAction, reference::ReferenceStore, tracker::FlightTracker,
};

#[derive(Parser, Debug)]
#[command(version, about, long_about = "periodically publish the aircraft around a fixed position")]
pub struct Args {
    /// RON config file
    #[arg(short,long, default_value = "configs/flightradar.ron")]
    pub config: PathBuf,

    /// print published lists as JSON instead of text lines
    #[arg(short,long)]
    pub json: bool,
}

#[tokio::main]
async fn main()->Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter( EnvFilter::from_default_env())  // use RUST_LOG to set max level
        .try_init();

    let args = Args::parse();

    let config: FlightRadarConfig = load_config( &args.config)?;
    let refs = ReferenceStore::load_from_dir( &config.data_dir);
    let source = Fr24Connector::new( config.fr24.clone())?;

    let json = args.json;
    let action = FnPublishAction::new( move |list: &[EnrichedAircraft]| {
        if json {
            println!("{}", serde_json::to_string( list)?);
        } else {
            println!("------- {} aircraft", list.len());
            for ac in list { println!("{ac}") }
        }
        Ok(())
    });

    let tracker = FlightTracker::new( Arc::new(config), Arc::new(source), Arc::new(refs), action);
    tracker.spawn().await?;

    Ok(())
}

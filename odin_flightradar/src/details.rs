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

use std::time::Duration;
use futures::future::join_all;
use tracing::{debug,warn};

use crate::{FlightDataSource, FlightDetail, RawAircraft, errors::{OdinFlightRadarError,Result}};

/// a raw aircraft whose detail lookup has completed, successfully (`detail` is set) or not
#[derive(Debug,Clone,PartialEq)]
pub struct SettledAircraft {
    pub aircraft: RawAircraft,
    pub detail: Option<FlightDetail>,
}

/// resolves flight details for a whole batch of aircraft.
/// All lookups of a batch run concurrently (one request per aircraft) and [`DetailFetcher::fetch_all`] only
/// returns once every single one of them has settled. Failed lookups are logged and settle without detail,
/// they never abort the batch.
#[derive(Debug,Clone,Default)]
pub struct DetailFetcher {
    timeout: Option<Duration>,
}

impl DetailFetcher {
    pub fn new ()->Self { DetailFetcher { timeout: None } }

    /// per item timeout. Without it a lookup that never completes stalls its batch
    pub fn with_timeout (timeout: Option<Duration>)->Self { DetailFetcher { timeout } }

    /// returns one `SettledAircraft` per input aircraft, in input order
    pub async fn fetch_all<S> (&self, source: &S, batch: Vec<RawAircraft>)->Vec<SettledAircraft> where S: FlightDataSource + ?Sized {
        let n = batch.len();
        let lookups = batch.into_iter().map( move |aircraft| async move {
            let detail = self.fetch_detail( source, &aircraft).await;
            SettledAircraft { aircraft, detail }
        });

        let settled = join_all( lookups).await;
        debug!("{} of {} flight detail lookups settled with data", settled.iter().filter(|s| s.detail.is_some()).count(), n);
        settled
    }

    async fn fetch_detail<S> (&self, source: &S, aircraft: &RawAircraft)->Option<FlightDetail> where S: FlightDataSource + ?Sized {
        let result: Result<FlightDetail> = if let Some(dur) = self.timeout {
            match tokio::time::timeout( dur, source.get_flight_detail( &aircraft.id)).await {
                Ok(res) => res,
                Err(_) => Err( OdinFlightRadarError::TimeoutError(dur))
            }
        } else {
            source.get_flight_detail( &aircraft.id).await
        };

        match result {
            Ok(detail) => Some(detail),
            Err(e) => {
                warn!("no flight details for {}: {}", aircraft.id, e);
                None
            }
        }
    }
}

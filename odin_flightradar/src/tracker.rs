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

use std::{sync::Arc, time::Duration};
use tokio::{task::JoinHandle, time::{interval, MissedTickBehavior}};
use tracing::{debug,info,error};

use crate::{
    EnrichedAircraft, FlightDataSource, FlightRadarConfig,
    details::DetailFetcher, errors::Result, geo::{BoundingBox,GeoPos},
    pipeline::{process_batch, RankPolicy}, publisher::{PublishAction, Publisher},
    reference::ReferenceStore,
};

/// one poll cycle: query the aircraft in `bbox`, wait for all their detail lookups to settle and
/// run the enrichment pipeline over the completed batch.
/// The only error is a failed bounding box query, in which case there is nothing to publish
pub async fn poll_cycle<S> (
    source: &S,
    refs: &ReferenceStore,
    fetcher: &DetailFetcher,
    bbox: &BoundingBox,
    center: &GeoPos,
    policy: &RankPolicy
)->Result<Vec<EnrichedAircraft>> where S: FlightDataSource + ?Sized
{
    let batch = source.get_aircraft( bbox).await?;
    debug!("got {} aircraft within {}", batch.len(), bbox);

    let settled = fetcher.fetch_all( source, batch).await;
    Ok( process_batch( &settled, refs, center, policy) )
}

/// the stand-alone driver that periodically polls a [`FlightDataSource`] and publishes changed lists.
///
/// Poll cycles are serialized: the next tick is only awaited once the current cycle (including all its
/// detail lookups) has completed, and ticks that were missed in the meantime are skipped. This means
/// there never are two cycles racing to publish.
pub struct FlightTracker<S,A> where S: FlightDataSource, A: PublishAction {
    config: Arc<FlightRadarConfig>,
    source: Arc<S>,
    refs: Arc<ReferenceStore>,
    fetcher: DetailFetcher,
    bbox: BoundingBox,
    policy: RankPolicy,
    publisher: Publisher<A>,
    n_cycles: usize,
}

impl<S,A> FlightTracker<S,A> where S: FlightDataSource, A: PublishAction {

    pub fn new (config: Arc<FlightRadarConfig>, source: Arc<S>, refs: Arc<ReferenceStore>, action: A)->Self {
        let fetcher = DetailFetcher::with_timeout( config.detail_timeout);
        let bbox = config.bounding_box();
        let policy = RankPolicy::from_config( &config);
        let publisher = Publisher::new( action);

        FlightTracker { config, source, refs, fetcher, bbox, policy, publisher, n_cycles: 0 }
    }

    pub fn config (&self)->&FlightRadarConfig { &self.config }
    pub fn bounding_box (&self)->&BoundingBox { &self.bbox }
    pub fn publisher (&self)->&Publisher<A> { &self.publisher }
    pub fn n_cycles (&self)->usize { self.n_cycles }

    /// run a single poll cycle and publish the result if it changed.
    /// Returns Ok(true) if we published, Ok(false) if the list was unchanged
    pub async fn update (&mut self)->Result<bool> {
        self.n_cycles += 1;
        let list = poll_cycle( self.source.as_ref(), &self.refs, &self.fetcher, &self.bbox, &self.config.center_point, &self.policy).await?;
        self.publisher.publish( list).await
    }

    /// the poll loop. Errors are logged and retried with the next tick, this never terminates on its own
    pub async fn run (mut self) {
        info!("tracking aircraft within {:.0}m of {} every {:?}", self.config.distance, self.config.center_point, self.config.update_interval);

        let mut timer = interval( self.config.update_interval.max( Duration::from_secs(1))); // interval() panics on zero
        timer.set_missed_tick_behavior( MissedTickBehavior::Skip);

        loop {
            timer.tick().await; // first tick completes immediately
            if let Err(e) = self.update().await {
                error!("poll cycle {} failed: {}", self.n_cycles, e);
            }
        }
    }
}

impl<S,A> FlightTracker<S,A> where S: FlightDataSource + 'static, A: PublishAction + 'static {
    /// run the poll loop as a tokio task. Abort the returned handle to stop tracking
    pub fn spawn (self)->JoinHandle<()> {
        tokio::spawn( self.run())
    }
}

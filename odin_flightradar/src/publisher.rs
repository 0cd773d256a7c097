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

use std::{fmt::{self,Debug}, future::{Future,ready}};
use tokio::sync::mpsc;
use tracing::debug;

use crate::{EnrichedAircraft, errors::{Result,op_failed}};

/// the consumer side of a [`Publisher`]. This is a callback that gets the full list whenever it changed.
/// Instances are created where the application is assembled and then moved into the publisher
pub trait PublishAction: Debug + Send + Sync {
    fn execute (&self, list: &[EnrichedAircraft]) -> impl Future<Output = Result<()>> + Send;
}

/// a PublishAction that does nothing, for tracker runs that only log
#[derive(Debug,Default)]
pub struct NoPublishAction;

impl PublishAction for NoPublishAction {
    fn execute (&self, _list: &[EnrichedAircraft]) -> impl Future<Output = Result<()>> + Send { ready(Ok(())) }
}

/// a PublishAction that wraps a synchronous closure
pub struct FnPublishAction<F> where F: Fn(&[EnrichedAircraft])->Result<()> + Send + Sync {
    f: F
}

impl<F> FnPublishAction<F> where F: Fn(&[EnrichedAircraft])->Result<()> + Send + Sync {
    pub fn new (f: F)->Self { FnPublishAction{f} }
}

impl<F> PublishAction for FnPublishAction<F> where F: Fn(&[EnrichedAircraft])->Result<()> + Send + Sync {
    fn execute (&self, list: &[EnrichedAircraft]) -> impl Future<Output = Result<()>> + Send { ready( (self.f)(list)) }
}

impl<F> Debug for FnPublishAction<F> where F: Fn(&[EnrichedAircraft])->Result<()> + Send + Sync {
    fn fmt (&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "FnPublishAction") }
}

/// a PublishAction that sends (cloned) lists to a tokio channel, e.g. to hand them over to a display task
#[derive(Debug)]
pub struct ChannelPublishAction {
    tx: mpsc::Sender<Vec<EnrichedAircraft>>
}

impl ChannelPublishAction {
    pub fn new (tx: mpsc::Sender<Vec<EnrichedAircraft>>)->Self { ChannelPublishAction{tx} }
}

impl PublishAction for ChannelPublishAction {
    async fn execute (&self, list: &[EnrichedAircraft])->Result<()> {
        self.tx.send( list.to_vec()).await.map_err( |_| op_failed!("publish channel closed"))
    }
}

/// hands enriched lists to its action, but only if they differ (by value) from the last one it handed out.
/// We start out with an empty list, i.e. a consumer that has not seen anything yet is not notified about
/// not having any aircraft around
#[derive(Debug)]
pub struct Publisher<A> where A: PublishAction {
    action: A,
    last_published: Vec<EnrichedAircraft>,
    n_published: usize,
}

impl<A> Publisher<A> where A: PublishAction {
    pub fn new (action: A)->Self {
        Publisher { action, last_published: Vec::new(), n_published: 0 }
    }

    /// returns true if the list was changed and the action got executed.
    /// If the action fails we keep the previous list so that the next identical publication is retried
    pub async fn publish (&mut self, list: Vec<EnrichedAircraft>)->Result<bool> {
        if list == self.last_published {
            debug!("aircraft list unchanged, skipping publication");
            return Ok(false)
        }

        self.action.execute( &list).await?;
        self.last_published = list;
        self.n_published += 1;
        debug!("published {} aircraft (publication #{})", self.last_published.len(), self.n_published);
        Ok(true)
    }

    pub fn last_published (&self)->&[EnrichedAircraft] { self.last_published.as_slice() }
    pub fn n_published (&self)->usize { self.n_published }
    pub fn action (&self)->&A { &self.action }
}

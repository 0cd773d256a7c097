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

use std::{collections::{HashMap, HashSet}, sync::{Arc, Mutex, atomic::{AtomicBool, AtomicUsize, Ordering}}, time::{Duration, Instant}};
use async_trait::async_trait;
use tokio::sync::mpsc;

use odin_flightradar::{
    EnrichedAircraft, FlightDataSource, FlightDetail, FlightRadarConfig, RawAircraft, RouteEndpoint,
    details::DetailFetcher, errors::{OdinFlightRadarError, Result}, fr24::Fr24Config, geo::GeoPos,
    pipeline::SortKey, publisher::*, reference::ReferenceStore, tracker::FlightTracker,
};

const CENTER: GeoPos = GeoPos { lat: 60.168489, lon: 24.939830 };

/// a data source we can script from within the tests
#[derive(Default)]
struct MockSource {
    aircraft: Mutex<Vec<RawAircraft>>,
    failing_details: HashSet<String>,
    slow_details: HashSet<String>,
    detail_delays: HashMap<String,Duration>,
    fail_query: AtomicBool,
    n_detail_requests: AtomicUsize,
    completed: Mutex<Vec<String>>, // ids in order of detail completion
}

impl MockSource {
    fn new (aircraft: Vec<RawAircraft>)->Self {
        MockSource { aircraft: Mutex::new(aircraft), ..MockSource::default() }
    }

    fn set_aircraft (&self, aircraft: Vec<RawAircraft>) {
        *self.aircraft.lock().unwrap() = aircraft;
    }
}

#[async_trait]
impl FlightDataSource for MockSource {
    async fn get_aircraft (&self, _bbox: &odin_flightradar::geo::BoundingBox)->Result<Vec<RawAircraft>> {
        if self.fail_query.load( Ordering::Relaxed) {
            Err( OdinFlightRadarError::OpFailedError("upstream not available".to_string()))
        } else {
            Ok( self.aircraft.lock().unwrap().clone())
        }
    }

    async fn get_flight_detail (&self, id: &str)->Result<FlightDetail> {
        self.n_detail_requests.fetch_add( 1, Ordering::Relaxed);

        if self.slow_details.contains(id) {
            tokio::time::sleep( Duration::from_secs(30)).await;
        }
        if let Some(delay) = self.detail_delays.get(id) {
            tokio::time::sleep( *delay).await;
        }
        self.completed.lock().unwrap().push( id.to_string());

        if self.failing_details.contains(id) {
            return Err( OdinFlightRadarError::OpFailedError(format!("no details for {id}")))
        }

        Ok( FlightDetail {
            origin: Some( RouteEndpoint { name: format!("origin of {id}"), id: Some("HEL".to_string()), country: Some("Finland".to_string()) }),
            destination: Some( RouteEndpoint { name: format!("destination of {id}"), id: Some("ARN".to_string()), country: Some("Sweden".to_string()) }),
        })
    }
}

fn aircraft (i: usize)->RawAircraft {
    RawAircraft {
        id: format!("id{i}"),
        callsign: Some( format!("FIN{i}")),
        latitude: Some( CENTER.lat + 0.02 * i as f64),
        longitude: Some( CENTER.lon),
        altitude: Some( 1000.0 * i as f64),
        speed: Some( 250.0),
        ..RawAircraft::default()
    }
}

fn config (limit: usize, detail_timeout: Option<Duration>)->Arc<FlightRadarConfig> {
    Arc::new( FlightRadarConfig {
        center_point: CENTER,
        distance: 60_000.0,
        limit,
        sort: Some(SortKey::Distance),
        sort_descending: false,
        update_interval: Duration::from_secs(1),
        data_dir: "resources/data".into(),
        detail_timeout,
        fr24: Fr24Config::default(),
    })
}

fn refs ()->Arc<ReferenceStore> {
    let airlines = r#"2355,"Finnair",\N,"AY","FIN","FINNAIR","Finland",Y"#;
    Arc::new( ReferenceStore::from_readers( airlines.as_bytes(), "".as_bytes(), "".as_bytes()))
}

#[tokio::test]
async fn test_failed_detail_does_not_stall_batch () {
    let mut source = MockSource::new( (1..=5).map( aircraft).collect());
    source.failing_details.insert( "id3".to_string());
    let source = Arc::new( source);

    let mut tracker = FlightTracker::new( config(10, None), source.clone(), refs(), NoPublishAction);
    assert!( tracker.update().await.unwrap());

    let list = tracker.publisher().last_published();
    for ac in list { println!("{ac}") }

    assert_eq!( list.len(), 5);
    assert_eq!( source.n_detail_requests.load( Ordering::Relaxed), 5);
    for ac in list {
        if ac.id == "id3" {
            assert!( ac.origin.is_none() && ac.destination.is_none());
        } else {
            assert_eq!( ac.origin, Some( format!("origin of {}", ac.id)));
            assert_eq!( ac.destination_id.as_deref(), Some("ARN"));
        }
        assert_eq!( ac.airline, "Finnair");
    }
}

#[tokio::test]
async fn test_publish_only_changes () {
    let source = Arc::new( MockSource::new( (1..=3).map( aircraft).collect()));
    let n_calls = Arc::new( AtomicUsize::new(0));
    let n = n_calls.clone();
    let action = FnPublishAction::new( move |list: &[EnrichedAircraft]| {
        println!("published {} aircraft", list.len());
        n.fetch_add( 1, Ordering::Relaxed);
        Ok(())
    });

    let mut tracker = FlightTracker::new( config(5, None), source.clone(), refs(), action);

    assert!( tracker.update().await.unwrap());
    assert!( !tracker.update().await.unwrap()); // same data, no publication
    assert_eq!( n_calls.load( Ordering::Relaxed), 1);

    let mut changed: Vec<RawAircraft> = (1..=3).map( aircraft).collect();
    changed[0].altitude = Some(1500.0);
    source.set_aircraft( changed);

    assert!( tracker.update().await.unwrap());
    assert_eq!( n_calls.load( Ordering::Relaxed), 2);
    assert_eq!( tracker.publisher().n_published(), 2);
    assert_eq!( tracker.n_cycles(), 3);
}

#[tokio::test]
async fn test_empty_first_result () {
    let source = Arc::new( MockSource::new( Vec::new()));
    let mut tracker = FlightTracker::new( config(5, None), source, refs(), NoPublishAction);

    assert!( !tracker.update().await.unwrap());
    assert_eq!( tracker.publisher().n_published(), 0);
}

#[tokio::test]
async fn test_failed_query_publishes_nothing () {
    let source = Arc::new( MockSource::new( (1..=2).map( aircraft).collect()));
    let mut tracker = FlightTracker::new( config(5, None), source.clone(), refs(), NoPublishAction);

    assert!( tracker.update().await.unwrap());
    let before = tracker.publisher().last_published().to_vec();

    source.fail_query.store( true, Ordering::Relaxed);
    let res = tracker.update().await;
    println!("update with failing query: {res:?}");
    assert!( res.is_err());
    assert_eq!( tracker.publisher().n_published(), 1);
    assert_eq!( tracker.publisher().last_published(), before.as_slice());
}

#[tokio::test]
async fn test_failed_action_is_retried () {
    let source = Arc::new( MockSource::new( (1..=2).map( aircraft).collect()));
    let n_calls = Arc::new( AtomicUsize::new(0));
    let n = n_calls.clone();
    let action = FnPublishAction::new( move |_list: &[EnrichedAircraft]| {
        if n.fetch_add( 1, Ordering::Relaxed) == 0 {
            Err( OdinFlightRadarError::OpFailedError("consumer not ready".to_string()))
        } else {
            Ok(())
        }
    });

    let mut tracker = FlightTracker::new( config(5, None), source, refs(), action);
    assert!( tracker.update().await.is_err());
    assert!( tracker.publisher().last_published().is_empty());

    assert!( tracker.update().await.unwrap()); // same list, but it never reached the consumer
    assert_eq!( n_calls.load( Ordering::Relaxed), 2);
}

#[tokio::test]
async fn test_detail_timeout () {
    let mut source = MockSource::new( (1..=3).map( aircraft).collect());
    source.slow_details.insert( "id2".to_string());

    let fetcher = DetailFetcher::with_timeout( Some( Duration::from_millis(100)));
    let settled = tokio::time::timeout( Duration::from_secs(5), fetcher.fetch_all( &source, (1..=3).map( aircraft).collect())).await
        .expect("batch stalled despite timeout");

    let ids: Vec<&str> = settled.iter().map( |s| s.aircraft.id.as_str()).collect();
    assert_eq!( ids, vec!["id1","id2","id3"]); // input order
    assert!( settled[0].detail.is_some());
    assert!( settled[1].detail.is_none());
    assert!( settled[2].detail.is_some());
}

#[tokio::test]
async fn test_concurrent_detail_lookups () {
    const N: usize = 6;
    let step = Duration::from_millis(60);

    // later aircraft answer sooner, i.e. completions arrive in reverse order
    let mut source = MockSource::new( Vec::new());
    for i in 1..=N {
        source.detail_delays.insert( format!("id{i}"), step * (N + 1 - i) as u32);
    }

    let fetcher = DetailFetcher::new();
    let t0 = Instant::now();
    let settled = fetcher.fetch_all( &source, (1..=N).map( aircraft).collect()).await;
    let elapsed = t0.elapsed();

    let completed = source.completed.lock().unwrap().clone();
    println!("batch of {N} settled after {elapsed:?}, completion order: {completed:?}");

    // bounded by the slowest lookup (6 x 60ms), not the sum of all lookups (21 x 60ms)
    assert!( elapsed >= step * N as u32);
    assert!( elapsed < step * 12, "lookups did not run concurrently: {elapsed:?}");

    assert_eq!( source.n_detail_requests.load( Ordering::Relaxed), N);
    let expected: Vec<String> = (1..=N).rev().map( |i| format!("id{i}")).collect();
    assert_eq!( completed, expected);

    // each lookup is collected exactly once, in input order
    let ids: Vec<String> = settled.iter().map( |s| s.aircraft.id.clone()).collect();
    let input: Vec<String> = (1..=N).map( |i| format!("id{i}")).collect();
    assert_eq!( ids, input);
    for s in &settled {
        assert_eq!( s.detail.as_ref().and_then( |d| d.origin.as_ref()).map( |o| o.name.clone()), Some( format!("origin of {}", s.aircraft.id)));
    }
}

#[tokio::test]
async fn test_spawned_tracker () {
    let source = Arc::new( MockSource::new( (1..=7).map( aircraft).collect()));
    let (tx, mut rx) = mpsc::channel(4);

    let tracker = FlightTracker::new( config(5, Some( Duration::from_secs(1))), source, refs(), ChannelPublishAction::new(tx));
    let handle = tracker.spawn();

    let list = tokio::time::timeout( Duration::from_secs(5), rx.recv()).await
        .expect("no publication within 5 sec")
        .expect("channel closed");
    handle.abort();

    for ac in &list { println!("{ac}") }
    assert_eq!( list.len(), 5);
    let ids: Vec<&str> = list.iter().map( |ac| ac.id.as_str()).collect();
    assert_eq!( ids, vec!["id1","id2","id3","id4","id5"]);
}

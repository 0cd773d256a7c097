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

use odin_flightradar::{AltitudeUnit, EnrichedAircraft, display::*};

fn aircraft (id: &str, altitude: Option<f64>, unit: AltitudeUnit)->EnrichedAircraft {
    EnrichedAircraft {
        id: id.to_string(),
        callsign: format!("FIN{id}"),
        mode_s_code: None, model: None, registration: None, flight: None,
        latitude: None, longitude: None,
        altitude,
        unit,
        speed: None, heading: None, vertical_rate: None, squawk: None,
        on_ground: false,
        timestamp: None,
        airline: "Finnair".to_string(),
        aircraft_type: None, distance: None, bearing: None,
        origin: None, origin_id: None, origin_country: None,
        destination: None, destination_id: None, destination_country: None,
    }
}

#[test]
fn test_cardinal_direction () {
    assert_eq!( cardinal_direction( 0.0), "N");
    assert_eq!( cardinal_direction( 11.25), "N");
    assert_eq!( cardinal_direction( 11.26), "NNE");
    assert_eq!( cardinal_direction( 45.0), "NE");
    assert_eq!( cardinal_direction( 90.0), "E");
    assert_eq!( cardinal_direction( 180.0), "S");
    assert_eq!( cardinal_direction( 270.0), "W");
    assert_eq!( cardinal_direction( 348.75), "NNW");
    assert_eq!( cardinal_direction( 348.76), "N");
    assert_eq!( cardinal_direction( 359.9), "N");
    assert_eq!( cardinal_direction( -90.0), "W");
    assert_eq!( cardinal_direction( 720.0), "N");
}

#[test]
fn test_units () {
    let ac = aircraft( "1", Some(10000.0), AltitudeUnit::Feet);
    assert!( (display_altitude( &ac, DisplayUnits::Metric) - 3048.0).abs() < 1e-6);
    assert_eq!( display_altitude( &ac, DisplayUnits::Imperial), 10000.0);

    let ac = aircraft( "2", Some(3048.0), AltitudeUnit::Meters);
    assert!( (display_altitude( &ac, DisplayUnits::Imperial) - 10000.0).abs() < 1e-6);

    assert_eq!( display_distance( 1000.0, DisplayUnits::Metric), 1000.0);
    assert!( (speed_in( SpeedUnits::Metric, 100.0) - 185.2).abs() < 0.01);
    assert!( (speed_in( SpeedUnits::Imperial, 100.0) - 115.078).abs() < 0.001);
    assert_eq!( speed_in( SpeedUnits::Knots, 100.0), 100.0);

    assert_eq!( "Imperial".parse::<DisplayUnits>(), Ok(DisplayUnits::Imperial));
    assert_eq!( "kn".parse::<SpeedUnits>(), Ok(SpeedUnits::Knots));
    assert!( "furlongs".parse::<SpeedUnits>().is_err());
}

#[test]
fn test_split_by_altitude () {
    let list = vec![
        aircraft( "1", Some(35000.0), AltitudeUnit::Feet),
        aircraft( "2", Some(3000.0), AltitudeUnit::Meters),
        aircraft( "3", None, AltitudeUnit::Feet),
        aircraft( "4", Some(2000.0), AltitudeUnit::Feet),
    ];

    let (low, high) = split_by_altitude( &list, 3000.0, DisplayUnits::Metric);
    let low: Vec<&str> = low.iter().map( |ac| ac.id.as_str()).collect();
    let high: Vec<&str> = high.iter().map( |ac| ac.id.as_str()).collect();
    println!("low: {low:?}, high: {high:?}");

    assert_eq!( low, vec!["2","3","4"]); // threshold is inclusive, missing altitude counts as 0
    assert_eq!( high, vec!["1"]);
}

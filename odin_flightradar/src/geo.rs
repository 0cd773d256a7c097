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

#![allow(uncommon_codepoints)]

//! spherical earth geometry for the flight tracker: query regions, great circle distance and bearing.
//! All functions are pure and use the mean earth radius, i.e. results are reproducible to floating point
//! precision. We don't need ellipsoid accuracy to rank aircraft around an observer.

use std::fmt;
use serde::{Serialize,Deserialize};
use ::geo::{Bearing, Destination, Distance, HaversineMeasure, Point};

/// mean earth radius in meters
pub const MEAN_EARTH_RADIUS: f64 = 6371000.0;

/// haversine metric space for our earth radius (geo's default is the GRS80 mean radius)
pub const EARTH: HaversineMeasure = HaversineMeasure::new( MEAN_EARTH_RADIUS);

/// a geodetic position in degrees. Note the (lat,lon) order, which is what observers and feeds use
#[derive(Debug,Clone,Copy,PartialEq,Serialize,Deserialize)]
pub struct GeoPos {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPos {
    pub fn new (lat: f64, lon: f64)->Self { GeoPos{ lat, lon } }

    /// geo points are (x: lon, y: lat)
    pub fn as_point (&self)->Point { Point::new( self.lon, self.lat) }

    pub fn distance_to (&self, other: &GeoPos)->f64 { haversine_distance( self, other) }
    pub fn bearing_to (&self, other: &GeoPos)->f64 { bearing( self, other) }
}

impl From<Point> for GeoPos {
    fn from (p: Point)->Self { GeoPos::new( p.y(), p.x()) }
}

impl fmt::Display for GeoPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:.5},{:.5}]", self.lat, self.lon)
    }
}

/// the rectangular lat/lon region we use to scope upstream queries
#[derive(Debug,Clone,Copy,PartialEq,Serialize,Deserialize)]
pub struct BoundingBox {
    pub top_left: GeoPos,
    pub bottom_right: GeoPos,
}

impl BoundingBox {
    pub fn north (&self)->f64 { self.top_left.lat }
    pub fn south (&self)->f64 { self.bottom_right.lat }
    pub fn west (&self)->f64 { self.top_left.lon }
    pub fn east (&self)->f64 { self.bottom_right.lon }

    /// does not handle boxes that straddle the antimeridian
    pub fn contains (&self, p: &GeoPos)->bool {
        p.lat <= self.north() && p.lat >= self.south() && p.lon >= self.west() && p.lon <= self.east()
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BoundingBox( nw: {}, se: {})", self.top_left, self.bottom_right)
    }
}

/// the smallest lat/lon box that encloses a circle of `radius` meters around `center`.
/// If the circle reaches a pole the box spans all longitudes and is clamped at that pole
pub fn bounding_box (center: &GeoPos, radius: f64)->BoundingBox {
    let δ = radius / MEAN_EARTH_RADIUS; // angular radius
    let dlat = δ.to_degrees();
    let north = center.lat + dlat;
    let south = center.lat - dlat;

    if north >= 90.0 || south <= -90.0 {
        return BoundingBox {
            top_left: GeoPos::new( north.min(90.0), -180.0),
            bottom_right: GeoPos::new( south.max(-90.0), 180.0),
        }
    }

    // the circle touches its east/west meridians at this bearing, which is not 90° off the equator
    let b = (δ.tan() * center.lat.to_radians().tan()).clamp( -1.0, 1.0).acos().to_degrees();
    let p = center.as_point();
    let east = EARTH.destination( p, b, radius).x();
    let west = EARTH.destination( p, 360.0 - b, radius).x();

    BoundingBox {
        top_left: GeoPos::new( north, west),
        bottom_right: GeoPos::new( south, east),
    }
}

/// great circle distance in meters
pub fn haversine_distance (a: &GeoPos, b: &GeoPos)->f64 {
    EARTH.distance( a.as_point(), b.as_point())
}

/// initial bearing in degrees [0..360) when facing from `a` towards `b` (a==b yields 0)
pub fn bearing (a: &GeoPos, b: &GeoPos)->f64 {
    EARTH.bearing( a.as_point(), b.as_point())
}

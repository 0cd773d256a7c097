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

//! the static reference tables we join live aircraft against: airlines, tail (mode-S) registry and aircraft types.
//!
//! The tables are header-less CSV files (airlines in OpenFlights format). They are loaded once, indexed by their
//! natural keys and never mutated afterwards, which means a `ReferenceStore` can be shared through an `Arc`
//! without locking. Load errors never propagate - a bad row is skipped and a missing file leaves its table
//! empty, in which case lookups just don't find anything.

use std::{collections::HashMap, fmt, fs::File, io::Read, path::Path};
use csv::{ReaderBuilder, StringRecord};
use tracing::{info,warn,error};

use crate::errors::{OdinFlightRadarError,Result,parse_error};

pub const AIRLINES_FILE: &str = "airlines.csv";
pub const AIRCRAFTS_FILE: &str = "aircrafts.csv";
pub const PLANETYPES_FILE: &str = "planetypes.csv";

/// OpenFlights marker for missing values
const NULL_MARKER: &str = "\\N";

#[derive(Debug,Clone,PartialEq)]
pub struct AirlineRecord {
    pub id: i64,
    pub name: Option<String>,
    pub alias: Option<String>,
    pub iata: Option<String>,
    pub icao: Option<String>,
    pub callsign: Option<String>,
    pub country: Option<String>,
    pub active: bool,
}

impl AirlineRecord {
    /// alias if we have one, name otherwise (empty if neither is set). Inactive airlines get a '*' suffix
    pub fn display_name (&self)->String {
        let name = non_empty( &self.alias)
            .or( non_empty( &self.name))
            .unwrap_or_default();

        if self.active { name.to_string() } else { format!("{name}*") }
    }
}

/// tail registry entry
#[derive(Debug,Clone,PartialEq)]
pub struct AircraftRecord {
    pub icao: String,              // mode-S hex code (lowercase)
    pub reg_id: Option<String>,
    pub model: Option<String>,
    pub aircraft_type: Option<String>,
    pub operator: Option<String>,
}

#[derive(Debug,Clone,PartialEq)]
pub struct PlaneTypeRecord {
    pub name: Option<String>,
    pub iata: Option<String>,
    pub icao: Option<String>,
}

/// result of a tail/type resolution. Type registry entries have no operator
#[derive(Debug,Clone,Copy,PartialEq)]
pub enum AircraftInfo<'a> {
    Tail(&'a AircraftRecord),
    PlaneType(&'a PlaneTypeRecord),
}

impl<'a> AircraftInfo<'a> {
    pub fn operator (&self)->Option<&'a str> {
        match self {
            AircraftInfo::Tail(rec) => non_empty( &rec.operator),
            AircraftInfo::PlaneType(_) => None
        }
    }

    /// the `type` field if there is one, the `name` field otherwise
    pub fn type_display (&self)->Option<&'a str> {
        match self {
            AircraftInfo::Tail(rec) => non_empty( &rec.aircraft_type),
            AircraftInfo::PlaneType(rec) => non_empty( &rec.name)
        }
    }
}

#[derive(Debug,Clone,Copy,Default,PartialEq,Eq)]
pub struct ReferenceStats {
    pub airlines: usize,
    pub aircraft: usize,
    pub plane_types: usize,
}

impl fmt::Display for ReferenceStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!( f, "{} airlines, {} aircraft, {} plane types", self.airlines, self.aircraft, self.plane_types)
    }
}

/// the read-only reference tables and their indexes
#[derive(Debug,Default)]
pub struct ReferenceStore {
    airlines: Vec<AirlineRecord>,
    airline_by_icao: HashMap<String,usize>,

    aircraft_by_icao: HashMap<String,AircraftRecord>,
    plane_type_by_icao: HashMap<String,PlaneTypeRecord>,
}

impl ReferenceStore {

    /// load the reference tables from explicit paths. Tables that can't be opened remain empty
    pub fn load (airlines: impl AsRef<Path>, aircraft: impl AsRef<Path>, plane_types: impl AsRef<Path>)->Self {
        let mut store = ReferenceStore::default();

        if let Some(file) = open_table( airlines.as_ref()) {
            store.set_airlines( read_table( "airlines", file, parse_airline));
        }
        if let Some(file) = open_table( aircraft.as_ref()) {
            store.set_aircraft( read_table( "aircrafts", file, parse_aircraft));
        }
        if let Some(file) = open_table( plane_types.as_ref()) {
            store.set_plane_types( read_table( "planetypes", file, parse_plane_type));
        }

        info!("reference data loaded: {}", store.stats());
        store
    }

    /// load from `dir/airlines.csv`, `dir/aircrafts.csv` and `dir/planetypes.csv`
    pub fn load_from_dir (dir: impl AsRef<Path>)->Self {
        let dir = dir.as_ref();
        Self::load( dir.join(AIRLINES_FILE), dir.join(AIRCRAFTS_FILE), dir.join(PLANETYPES_FILE))
    }

    pub fn from_readers<A,T,P> (airlines: A, aircraft: T, plane_types: P)->Self where A: Read, T: Read, P: Read {
        let mut store = ReferenceStore::default();
        store.set_airlines( read_table( "airlines", airlines, parse_airline));
        store.set_aircraft( read_table( "aircrafts", aircraft, parse_aircraft));
        store.set_plane_types( read_table( "planetypes", plane_types, parse_plane_type));
        store
    }

    fn set_airlines (&mut self, airlines: Vec<AirlineRecord>) {
        self.airline_by_icao.clear();
        for (idx,airline) in airlines.iter().enumerate() {
            if let Some(icao) = non_empty( &airline.icao) {
                self.airline_by_icao.entry( icao.to_string()).or_insert( idx); // first entry wins
            }
        }
        self.airlines = airlines;
    }

    fn set_aircraft (&mut self, aircraft: Vec<AircraftRecord>) {
        self.aircraft_by_icao = aircraft.into_iter()
            .fold( HashMap::new(), |mut map, rec| {
                map.entry( rec.icao.clone()).or_insert( rec);
                map
            });
    }

    fn set_plane_types (&mut self, plane_types: Vec<PlaneTypeRecord>) {
        let mut map = HashMap::with_capacity( plane_types.len());
        for rec in plane_types {
            if let Some(icao) = non_empty( &rec.icao) {
                map.entry( icao.to_lowercase()).or_insert( rec);
            }
        }
        self.plane_type_by_icao = map;
    }

    pub fn stats (&self)->ReferenceStats {
        ReferenceStats {
            airlines: self.airlines.len(),
            aircraft: self.aircraft_by_icao.len(),
            plane_types: self.plane_type_by_icao.len()
        }
    }

    pub fn airlines (&self)->&[AirlineRecord] { self.airlines.as_slice() }

    /* #region lookups ************************************************************************/

    pub fn find_airline_by_icao (&self, code: &str)->Option<&AirlineRecord> {
        self.airline_by_icao.get( code).map( |idx| &self.airlines[*idx])
    }

    /// airline whose ICAO code matches the first 3 characters of the callsign
    pub fn find_airline_by_callsign_prefix (&self, callsign: &str)->Option<&AirlineRecord> {
        let prefix = match callsign.char_indices().nth(3) {
            Some((i,_)) => &callsign[..i],
            None => callsign
        };
        self.find_airline_by_icao( prefix)
    }

    pub fn find_aircraft_by_tail_icao (&self, code: &str)->Option<&AircraftRecord> {
        self.aircraft_by_icao.get( code.to_lowercase().as_str())
    }

    pub fn find_plane_type_by_icao (&self, code: &str)->Option<&PlaneTypeRecord> {
        self.plane_type_by_icao.get( code.to_lowercase().as_str())
    }

    /// tail registry lookup by mode-S code, falling back to the type registry by model code
    pub fn resolve_aircraft (&self, mode_s_code: Option<&str>, model: Option<&str>)->Option<AircraftInfo<'_>> {
        mode_s_code
            .and_then( |hex| self.find_aircraft_by_tail_icao( hex))
            .map( AircraftInfo::Tail)
            .or_else( || {
                model.and_then( |mdl| self.find_plane_type_by_icao( mdl)).map( AircraftInfo::PlaneType)
            })
    }

    /* #endregion lookups */
}

/* #region table parsing ******************************************************************************/

fn non_empty (s: &Option<String>)->Option<&str> {
    s.as_deref().filter( |s| !s.is_empty())
}

fn open_table (path: &Path)->Option<File> {
    match File::open( path) {
        Ok(file) => Some(file),
        Err(e) => {
            error!("cannot open reference table {:?}: {}", path, e);
            None
        }
    }
}

/// read all rows of a header-less CSV source, skipping (and logging) the ones that don't parse
fn read_table<R,T,F> (table: &str, src: R, parse_row: F)->Vec<T> where R: Read, F: Fn(&StringRecord)->Result<T> {
    let mut reader = ReaderBuilder::new()
        .has_headers( false)
        .flexible( true) // we check field counts ourselves so that we can report them
        .from_reader( src);

    let mut rows = Vec::new();
    let mut n_skipped = 0;
    for (i,rec) in reader.records().enumerate() {
        match rec.map_err( OdinFlightRadarError::from).and_then( |rec| parse_row(&rec)) {
            Ok(row) => rows.push(row),
            Err(e) => {
                warn!("skipping {} row {}: {}", table, i+1, e);
                n_skipped += 1;
            }
        }
    }

    if n_skipped > 0 { warn!("{} rows of {} could not be parsed", n_skipped, table) }
    rows
}

fn field (rec: &StringRecord, idx: usize, null_marker: &str)->Option<String> {
    rec.get(idx).map( str::trim).filter( |s| *s != null_marker && !s.is_empty()).map( str::to_string)
}

fn check_len (rec: &StringRecord, n: usize)->Result<()> {
    if rec.len() < n {
        Err( parse_error!("expected {} fields, got {}: {:?}", n, rec.len(), rec))
    } else {
        Ok(())
    }
}

/// `id,name,alias,iata,icao,callsign,country,active`
fn parse_airline (rec: &StringRecord)->Result<AirlineRecord> {
    check_len( rec, 8)?;

    let id_field = rec.get(0).unwrap_or_default().trim();
    let id = id_field.parse::<i64>().map_err( |_| parse_error!("invalid airline id '{}'", id_field))?;

    Ok( AirlineRecord {
        id,
        name: field( rec, 1, NULL_MARKER),
        alias: field( rec, 2, NULL_MARKER),
        iata: field( rec, 3, NULL_MARKER),
        icao: field( rec, 4, NULL_MARKER),
        callsign: field( rec, 5, NULL_MARKER),
        country: field( rec, 6, NULL_MARKER),
        active: rec.get(7).map( |s| s.trim() == "Y").unwrap_or(false),
    })
}

/// `icao,regid,mdl,type,operator`
fn parse_aircraft (rec: &StringRecord)->Result<AircraftRecord> {
    check_len( rec, 5)?;

    let icao = field( rec, 0, "").ok_or_else( || parse_error!("missing mode-S code: {:?}", rec))?;

    Ok( AircraftRecord {
        icao: icao.to_lowercase(),
        reg_id: field( rec, 1, ""),
        model: field( rec, 2, ""),
        aircraft_type: field( rec, 3, ""),
        operator: field( rec, 4, ""),
    })
}

/// `name,iata,icao`
fn parse_plane_type (rec: &StringRecord)->Result<PlaneTypeRecord> {
    check_len( rec, 3)?;

    Ok( PlaneTypeRecord {
        name: field( rec, 0, ""),
        iata: field( rec, 1, ""),
        icao: field( rec, 2, ""),
    })
}

/* #endregion table parsing */

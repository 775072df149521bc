//! Parser for the `australian_postcodes.csv` layout.
//!
//! Each row is one locality/postcode pair. Coordinates appear as `long`/`lat`
//! in current releases and `Long_precise`/`Lat_precise` in some older ones.

use std::io::Read;
use std::path::Path;

use postcodes_gazetteer_models::{NameRecord, State};
use serde::Deserialize;

use crate::IngestError;

/// A raw row from the postcodes CSV. Unknown columns are ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CsvRow {
    pub postcode: Option<String>,
    pub locality: Option<String>,
    pub state: Option<String>,
    pub long: Option<String>,
    pub lat: Option<String>,
    #[serde(rename = "Long_precise")]
    pub long_precise: Option<String>,
    #[serde(rename = "Lat_precise")]
    pub lat_precise: Option<String>,
    #[serde(rename = "lgaregion")]
    pub lga_region: Option<String>,
    #[serde(rename = "lgacode")]
    pub lga_code: Option<String>,
    #[serde(rename = "sa3name")]
    pub sa3_name: Option<String>,
    #[serde(rename = "sa4name")]
    pub sa4_name: Option<String>,
    pub region: Option<String>,
    pub electorate: Option<String>,
}

/// Trimmed, non-empty text.
fn text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
}

/// Parses the first non-empty value as a finite float.
fn coordinate(primary: Option<&str>, fallback: Option<&str>) -> Option<f64> {
    let raw = text(primary).or_else(|| text(fallback))?;
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Left-pads numeric postcodes to four digits ("800" becomes "0800").
///
/// Returns `None` for anything that is not one to four ASCII digits.
#[must_use]
pub fn normalize_postcode(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.len() > 4 || !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some(format!("{trimmed:0>4}"))
}

impl CsvRow {
    /// Converts the row into a record.
    ///
    /// Returns `None` when the postcode, locality, or state is missing or
    /// invalid.
    #[must_use]
    pub fn to_record(&self) -> Option<NameRecord> {
        let postcode = normalize_postcode(self.postcode.as_deref()?)?;
        let name = text(self.locality.as_deref())?;
        let state = State::parse(&text(self.state.as_deref())?.to_uppercase())?;

        Some(NameRecord {
            name,
            state,
            postcode,
            latitude: coordinate(self.lat.as_deref(), self.lat_precise.as_deref()),
            longitude: coordinate(self.long.as_deref(), self.long_precise.as_deref()),
            lga_name: text(self.lga_region.as_deref()),
            lga_code: text(self.lga_code.as_deref()),
            region: text(self.region.as_deref()),
            sa3_name: text(self.sa3_name.as_deref()),
            sa4_name: text(self.sa4_name.as_deref()),
            electoral_division: text(self.electorate.as_deref()),
        })
    }
}

/// Parses records from any CSV source with a header row.
///
/// Malformed rows and rows without a postcode, locality, or valid state are
/// skipped.
///
/// # Errors
///
/// Returns an error if the header row cannot be read.
pub fn parse_csv(reader: impl Read) -> Result<Vec<NameRecord>, IngestError> {
    let mut csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    csv_reader.headers()?;

    let mut records = Vec::new();
    let mut skipped = 0u64;

    for result in csv_reader.deserialize::<CsvRow>() {
        let row = match result {
            Ok(r) => r,
            Err(e) => {
                log::trace!("  skipping malformed row: {e}");
                skipped += 1;
                continue;
            }
        };

        match row.to_record() {
            Some(record) => records.push(record),
            None => skipped += 1,
        }
    }

    log::info!("Parsed {} records from CSV ({skipped} skipped)", records.len());

    Ok(records)
}

/// Parses records from a CSV file.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or its header read.
pub fn parse_csv_path(path: &Path) -> Result<Vec<NameRecord>, IngestError> {
    let file = std::fs::File::open(path).map_err(|e| IngestError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_csv(std::io::BufReader::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
id,postcode,locality,state,long,lat,dc,type,status,sa3,sa3name,sa4,sa4name,region,Lat_precise,Long_precise,SA1_MAINCODE_2011,SA1_MAINCODE_2016,SA2_MAINCODE_2016,SA2_NAME_2016,SA3_CODE_2016,SA3_NAME_2016,SA4_CODE_2016,SA4_NAME_2016,RA_2011,RA_2016,MMM_2015,MMM_2019,ced,altitude,chargezone,phn_code,phn_name,lgaregion,lgacode,electorate,electoraterating
230,200,AUSTRALIAN NATIONAL UNIVERSITY,ACT,149.1189,-35.2777,,Post Office Boxes,Updated 6-Feb-2020,80105,North Canberra,801,Australian Capital Territory,R1,-35.2777,149.1189,,,,,,,,,,,,,,,,,,Unincorporated ACT,89399,Canberra,
1,800,DARWIN,NT,130.83668,-12.458684,,Delivery Area,,70101,Darwin City,701,Darwin,R1,-12.458684,130.83668,,,,,,,,,,,,,,,,,,Darwin,71000,Solomon,
2,2000,SYDNEY,nsw,,,,Delivery Area,,11703,Sydney Inner City,117,Sydney - City and Inner South,R1,-33.8688,151.2093,,,,,,,,,,,,,,,,,,Sydney,17200,Sydney,
3,2000,,NSW,151.2,-33.8,,,,,,,,,,,,,,,,,,,,,,,,,,,,,,,
4,9999,NOWHERE,XX,151.2,-33.8,,,,,,,,,,,,,,,,,,,,,,,,,,,,,,,
5,3000,MELBOURNE,VIC,abc,-37.8136,,,,,,,,,,,,,,,,,,,,,,,,,,,,,,,
";

    #[test]
    fn parses_valid_rows_and_skips_invalid() {
        let records = parse_csv(SAMPLE.as_bytes()).unwrap();
        let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["AUSTRALIAN NATIONAL UNIVERSITY", "DARWIN", "SYDNEY", "MELBOURNE"]
        );
    }

    #[test]
    fn pads_postcodes() {
        let records = parse_csv(SAMPLE.as_bytes()).unwrap();
        assert_eq!(records[0].postcode, "0200");
        assert_eq!(records[1].postcode, "0800");
        assert_eq!(normalize_postcode(" 2000 "), Some("2000".to_string()));
        assert_eq!(normalize_postcode("20000"), None);
        assert_eq!(normalize_postcode("2a00"), None);
    }

    #[test]
    fn reads_optional_attributes() {
        let records = parse_csv(SAMPLE.as_bytes()).unwrap();
        let darwin = &records[1];
        assert_eq!(darwin.state, State::Nt);
        assert_eq!(darwin.coordinates(), Some((-12.458_684, 130.836_68)));
        assert_eq!(darwin.lga_name.as_deref(), Some("Darwin"));
        assert_eq!(darwin.lga_code.as_deref(), Some("71000"));
        assert_eq!(darwin.sa3_name.as_deref(), Some("Darwin City"));
        assert_eq!(darwin.sa4_name.as_deref(), Some("Darwin"));
        assert_eq!(darwin.region.as_deref(), Some("R1"));
        assert_eq!(darwin.electoral_division.as_deref(), Some("Solomon"));
    }

    #[test]
    fn falls_back_to_precise_coordinates_and_uppercases_state() {
        let records = parse_csv(SAMPLE.as_bytes()).unwrap();
        let sydney = &records[2];
        assert_eq!(sydney.state, State::Nsw);
        assert_eq!(sydney.coordinates(), Some((-33.8688, 151.2093)));
    }

    #[test]
    fn unparsable_coordinates_become_none() {
        let records = parse_csv(SAMPLE.as_bytes()).unwrap();
        let melbourne = &records[3];
        assert_eq!(melbourne.latitude, Some(-37.8136));
        assert_eq!(melbourne.longitude, None);
    }
}

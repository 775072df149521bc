//! Gazetteer storage in `DuckDB`.
//!
//! One `localities` table holds a row per locality/postcode pair. A `_meta`
//! key/value table records when the directory was last loaded. The default
//! file lives at `data/postcodes.duckdb`.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use duckdb::Connection;
use postcodes_gazetteer_models::{GazetteerStatistics, LgaInfo, NameRecord, State, StateCounts};

use crate::{DbError, Gazetteer, GazetteerStore};

const SELECT_RECORDS: &str = "SELECT locality, state, postcode, latitude, longitude, lga_name, \
     lga_code, region, sa3_name, sa4_name, electorate FROM localities";

/// A row as read from `DuckDB`, before the state code is validated.
struct RawRecord {
    name: String,
    state: String,
    postcode: String,
    latitude: Option<f64>,
    longitude: Option<f64>,
    lga_name: Option<String>,
    lga_code: Option<String>,
    region: Option<String>,
    sa3_name: Option<String>,
    sa4_name: Option<String>,
    electoral_division: Option<String>,
}

impl RawRecord {
    fn from_row(row: &duckdb::Row<'_>) -> duckdb::Result<Self> {
        Ok(Self {
            name: row.get(0)?,
            state: row.get(1)?,
            postcode: row.get(2)?,
            latitude: row.get(3)?,
            longitude: row.get(4)?,
            lga_name: row.get(5)?,
            lga_code: row.get(6)?,
            region: row.get(7)?,
            sa3_name: row.get(8)?,
            sa4_name: row.get(9)?,
            electoral_division: row.get(10)?,
        })
    }

    fn into_record(self) -> Result<NameRecord, DbError> {
        let state = parse_state(&self.state)?;
        Ok(NameRecord {
            name: self.name,
            state,
            postcode: self.postcode,
            latitude: self.latitude,
            longitude: self.longitude,
            lga_name: self.lga_name,
            lga_code: self.lga_code,
            region: self.region,
            sa3_name: self.sa3_name,
            sa4_name: self.sa4_name,
            electoral_division: self.electoral_division,
        })
    }
}

fn parse_state(code: &str) -> Result<State, DbError> {
    State::parse(code).ok_or_else(|| DbError::Conversion {
        message: format!("Unknown state code {code:?}"),
    })
}

fn to_count(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}

/// Appends an optional state restriction, binding its parameter.
fn state_clause(state: Option<State>, params: &mut Vec<String>) -> &'static str {
    state.map_or("", |s| {
        params.push(s.as_ref().to_string());
        " AND state = ?"
    })
}

/// Gazetteer backed by a single `DuckDB` connection.
///
/// `duckdb::Connection` is `Send` but not `Sync`, so the connection is
/// wrapped in a `Mutex`.
pub struct DuckDbGazetteer {
    conn: Mutex<Connection>,
}

impl DuckDbGazetteer {
    /// Opens (or creates) the gazetteer `DuckDB` and ensures the schema
    /// exists.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the connection or schema creation fails.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        if let Some(parent) = path.parent() {
            crate::paths::ensure_dir(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("SET threads = 4; SET memory_limit = '512MB';")?;
        log::info!("Opened gazetteer at {}", path.display());

        Self::from_connection(conn)
    }

    /// Opens the gazetteer at [`crate::paths::database_path`].
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the connection or schema creation fails.
    pub fn open_default() -> Result<Self, DbError> {
        Self::open(&crate::paths::database_path())
    }

    /// Opens an empty in-memory gazetteer.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the connection or schema creation fails.
    pub fn open_in_memory() -> Result<Self, DbError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    /// Wraps an existing connection, creating the schema if needed.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if schema creation fails.
    pub fn from_connection(conn: Connection) -> Result<Self, DbError> {
        create_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, DbError> {
        self.conn.lock().map_err(|_| DbError::Poisoned)
    }

    fn query_records(&self, sql: &str, params: Vec<String>) -> Result<Vec<NameRecord>, DbError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(duckdb::params_from_iter(params), RawRecord::from_row)?;

        rows.map(|row| row.map_err(DbError::from).and_then(RawRecord::into_record))
            .collect()
    }

    fn query_names(&self, sql: &str, params: Vec<String>) -> Result<Vec<String>, DbError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(duckdb::params_from_iter(params), |row| row.get(0))?;

        Ok(rows.collect::<Result<Vec<String>, _>>()?)
    }

    fn get_meta(&self, key: &str) -> Result<Option<String>, DbError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT value FROM _meta WHERE key = ?")?;
        match stmt.query_row([key], |row| row.get(0)) {
            Ok(v) => Ok(Some(v)),
            Err(duckdb::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(DbError::DuckDb(e)),
        }
    }

    fn set_meta(&self, key: &str, value: &str) -> Result<(), DbError> {
        self.conn()?.execute(
            "INSERT INTO _meta (key, value) VALUES (?, ?)
             ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value",
            duckdb::params![key, value],
        )?;
        Ok(())
    }
}

fn create_schema(conn: &Connection) -> Result<(), DbError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS localities (
            locality TEXT NOT NULL,
            state TEXT NOT NULL,
            postcode TEXT NOT NULL,
            latitude DOUBLE,
            longitude DOUBLE,
            lga_name TEXT,
            lga_code TEXT,
            region TEXT,
            sa3_name TEXT,
            sa4_name TEXT,
            electorate TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_localities_postcode ON localities (postcode);
        CREATE INDEX IF NOT EXISTS idx_localities_state ON localities (state);

        CREATE TABLE IF NOT EXISTS _meta (
            key TEXT PRIMARY KEY,
            value TEXT
        );",
    )?;
    log::debug!("Gazetteer schema ready");
    Ok(())
}

impl Gazetteer for DuckDbGazetteer {
    fn lookup_exact(&self, name: &str, state: Option<State>) -> Result<Vec<NameRecord>, DbError> {
        let mut params = vec![name.trim().to_string()];
        let state_sql = state_clause(state, &mut params);
        self.query_records(
            &format!(
                "{SELECT_RECORDS} WHERE lower(locality) = lower(?){state_sql} \
                 ORDER BY postcode, state"
            ),
            params,
        )
    }

    fn all_names(&self, state: Option<State>) -> Result<Vec<String>, DbError> {
        let mut params = Vec::new();
        let state_sql = state_clause(state, &mut params);
        self.query_names(
            &format!(
                "SELECT DISTINCT locality FROM localities WHERE 1 = 1{state_sql} ORDER BY locality"
            ),
            params,
        )
    }

    fn all_records_with_coordinates(
        &self,
        state: Option<State>,
    ) -> Result<Vec<NameRecord>, DbError> {
        let mut params = Vec::new();
        let state_sql = state_clause(state, &mut params);
        self.query_records(
            &format!(
                "{SELECT_RECORDS} WHERE latitude IS NOT NULL AND longitude IS NOT NULL{state_sql} \
                 ORDER BY locality, state, postcode"
            ),
            params,
        )
    }

    fn lookup_postcode(&self, postcode: &str) -> Result<Vec<NameRecord>, DbError> {
        self.query_records(
            &format!("{SELECT_RECORDS} WHERE postcode = ? ORDER BY locality, state"),
            vec![postcode.trim().to_string()],
        )
    }

    fn search_prefix(
        &self,
        prefix: &str,
        state: Option<State>,
        limit: usize,
    ) -> Result<Vec<String>, DbError> {
        let mut params = vec![prefix.trim().to_string()];
        let state_sql = state_clause(state, &mut params);
        self.query_names(
            &format!(
                "SELECT DISTINCT locality FROM localities \
                 WHERE starts_with(lower(locality), lower(?)){state_sql} \
                 ORDER BY locality LIMIT {limit}"
            ),
            params,
        )
    }

    fn search_substring(
        &self,
        fragment: &str,
        state: Option<State>,
        limit: usize,
    ) -> Result<Vec<String>, DbError> {
        let mut params = vec![fragment.trim().to_string()];
        let state_sql = state_clause(state, &mut params);
        self.query_names(
            &format!(
                "SELECT DISTINCT locality FROM localities \
                 WHERE contains(lower(locality), lower(?)){state_sql} \
                 ORDER BY locality LIMIT {limit}"
            ),
            params,
        )
    }

    fn search_lga(
        &self,
        fragment: &str,
        state: Option<State>,
    ) -> Result<Vec<NameRecord>, DbError> {
        let mut params = vec![fragment.trim().to_string()];
        let state_sql = state_clause(state, &mut params);
        self.query_records(
            &format!(
                "{SELECT_RECORDS} WHERE contains(lower(lga_name), lower(?)){state_sql} \
                 ORDER BY locality, postcode"
            ),
            params,
        )
    }

    fn search_region(
        &self,
        fragment: &str,
        state: Option<State>,
    ) -> Result<Vec<NameRecord>, DbError> {
        let mut params = vec![fragment.trim().to_string()];
        let state_sql = state_clause(state, &mut params);
        self.query_records(
            &format!(
                "{SELECT_RECORDS} WHERE contains(lower(region), lower(?)){state_sql} \
                 ORDER BY locality, postcode"
            ),
            params,
        )
    }

    fn search_statistical_area(
        &self,
        fragment: &str,
        state: Option<State>,
    ) -> Result<Vec<NameRecord>, DbError> {
        let fragment = fragment.trim().to_string();
        let mut params = vec![fragment.clone(), fragment];
        let state_sql = state_clause(state, &mut params);
        self.query_records(
            &format!(
                "{SELECT_RECORDS} WHERE (contains(lower(sa3_name), lower(?)) \
                 OR contains(lower(sa4_name), lower(?))){state_sql} \
                 ORDER BY locality, postcode"
            ),
            params,
        )
    }

    fn all_lgas(&self, state: Option<State>) -> Result<Vec<LgaInfo>, DbError> {
        let mut params = Vec::new();
        let state_sql = state_clause(state, &mut params);
        let sql = format!(
            "SELECT lga_name, lga_code, state, COUNT(DISTINCT locality) FROM localities \
             WHERE lga_name IS NOT NULL AND lga_name <> ''{state_sql} \
             GROUP BY lga_name, lga_code, state \
             ORDER BY state, lga_name, lga_code NULLS FIRST"
        );

        let conn = self.conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(duckdb::params_from_iter(params), |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, Option<String>>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, i64>(3)?,
            ))
        })?;

        let mut lgas = Vec::new();
        for row in rows {
            let (lga_name, lga_code, state, count) = row?;
            lgas.push(LgaInfo {
                lga_name,
                lga_code,
                state: parse_state(&state)?,
                suburb_count: to_count(count),
            });
        }
        Ok(lgas)
    }

    fn validate_combination(
        &self,
        name: &str,
        postcode: &str,
        state: Option<State>,
    ) -> Result<bool, DbError> {
        let mut params = vec![name.trim().to_string(), postcode.trim().to_string()];
        let state_sql = state_clause(state, &mut params);
        let sql = format!(
            "SELECT COUNT(*) FROM localities \
             WHERE lower(locality) = lower(?) AND postcode = ?{state_sql}"
        );

        let conn = self.conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let count: i64 = stmt.query_row(duckdb::params_from_iter(params), |row| row.get(0))?;
        Ok(count > 0)
    }

    fn statistics(&self) -> Result<GazetteerStatistics, DbError> {
        let conn = self.conn()?;

        let (total, postcodes, suburbs, lgas): (i64, i64, i64, i64) = conn.query_row(
            "SELECT COUNT(*), COUNT(DISTINCT postcode), COUNT(DISTINCT locality), \
             COUNT(DISTINCT NULLIF(lga_name, '')) FROM localities",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
        )?;

        let mut stmt = conn.prepare(
            "SELECT state, COUNT(DISTINCT postcode), COUNT(DISTINCT locality) \
             FROM localities GROUP BY state",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, i64>(2)?,
            ))
        })?;

        let mut by_state = Vec::new();
        for row in rows {
            let (state, postcodes, suburbs) = row?;
            by_state.push(StateCounts {
                state: parse_state(&state)?,
                postcodes: to_count(postcodes),
                suburbs: to_count(suburbs),
            });
        }
        by_state.sort_by_key(|counts| counts.state);

        Ok(GazetteerStatistics {
            total_records: to_count(total),
            unique_postcodes: to_count(postcodes),
            unique_suburbs: to_count(suburbs),
            unique_lgas: to_count(lgas),
            by_state,
        })
    }

    fn loaded_at(&self) -> Result<Option<String>, DbError> {
        self.get_meta("loaded_at")
    }
}

impl GazetteerStore for DuckDbGazetteer {
    fn clear(&self) -> Result<(), DbError> {
        self.conn()?.execute_batch("DELETE FROM localities;")?;
        log::info!("Cleared gazetteer");
        Ok(())
    }

    fn insert(&self, records: &[NameRecord]) -> Result<usize, DbError> {
        if records.is_empty() {
            return Ok(0);
        }

        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO localities (locality, state, postcode, latitude, longitude, \
                 lga_name, lga_code, region, sa3_name, sa4_name, electorate)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )?;

            for record in records {
                stmt.execute(duckdb::params![
                    record.name,
                    record.state.as_ref(),
                    record.postcode,
                    record.latitude,
                    record.longitude,
                    record.lga_name.as_deref(),
                    record.lga_code.as_deref(),
                    record.region.as_deref(),
                    record.sa3_name.as_deref(),
                    record.sa4_name.as_deref(),
                    record.electoral_division.as_deref(),
                ])?;
            }
        }
        tx.commit()?;

        Ok(records.len())
    }

    fn mark_loaded(&self) -> Result<(), DbError> {
        self.set_meta("loaded_at", &chrono::Utc::now().to_rfc3339())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> DuckDbGazetteer {
        let db = DuckDbGazetteer::open_in_memory().unwrap();
        let mut paddington_qld = NameRecord::new("Paddington", State::Qld, "4064")
            .with_coordinates(-27.459, 153.000)
            .with_lga("Brisbane");
        paddington_qld.region = Some("Brisbane Inner".to_string());

        let mut newcastle = NameRecord::new("Newcastle", State::Nsw, "2300")
            .with_coordinates(-32.9283, 151.7817)
            .with_lga("Newcastle");
        newcastle.sa3_name = Some("Newcastle".to_string());
        newcastle.sa4_name = Some("Newcastle and Lake Macquarie".to_string());

        db.insert(&[
            NameRecord::new("Sydney", State::Nsw, "2000")
                .with_coordinates(-33.8688, 151.2093)
                .with_lga("Sydney"),
            NameRecord::new("Haymarket", State::Nsw, "2000")
                .with_coordinates(-33.8806, 151.2050)
                .with_lga("Sydney"),
            NameRecord::new("Paddington", State::Nsw, "2021")
                .with_coordinates(-33.884, 151.231)
                .with_lga("Sydney"),
            paddington_qld,
            newcastle,
            NameRecord::new("Newcastle West", State::Nsw, "2302"),
        ])
        .unwrap();
        db
    }

    #[test]
    fn lookup_exact_ignores_case() {
        let db = fixture();
        let records = db.lookup_exact("paddington", None).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].postcode, "2021");
        assert_eq!(records[1].state, State::Qld);

        let qld = db.lookup_exact("PADDINGTON", Some(State::Qld)).unwrap();
        assert_eq!(qld.len(), 1);
        assert_eq!(qld[0].region.as_deref(), Some("Brisbane Inner"));
    }

    #[test]
    fn all_names_are_distinct_and_sorted() {
        let db = fixture();
        assert_eq!(
            db.all_names(None).unwrap(),
            vec!["Haymarket", "Newcastle", "Newcastle West", "Paddington", "Sydney"]
        );
        assert_eq!(db.all_names(Some(State::Qld)).unwrap(), vec!["Paddington"]);
    }

    #[test]
    fn records_with_coordinates() {
        let db = fixture();
        let records = db.all_records_with_coordinates(None).unwrap();
        assert_eq!(records.len(), 5);
        assert!(records.iter().all(|r| r.coordinates().is_some()));
    }

    #[test]
    fn lookup_postcode() {
        let db = fixture();
        let names: Vec<String> = db
            .lookup_postcode("2000")
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["Haymarket", "Sydney"]);
        assert!(db.lookup_postcode("9999").unwrap().is_empty());
    }

    #[test]
    fn prefix_and_substring_search() {
        let db = fixture();
        assert_eq!(
            db.search_prefix("newc", None, 10).unwrap(),
            vec!["Newcastle", "Newcastle West"]
        );
        assert_eq!(db.search_prefix("newc", None, 1).unwrap(), vec!["Newcastle"]);
        assert_eq!(
            db.search_substring("ding", None, 10).unwrap(),
            vec!["Paddington"]
        );
    }

    #[test]
    fn lga_region_and_statistical_area_search() {
        let db = fixture();
        assert_eq!(db.search_lga("sydney", None).unwrap().len(), 3);
        assert_eq!(db.search_region("brisbane", None).unwrap().len(), 1);
        assert_eq!(db.search_statistical_area("lake macq", None).unwrap().len(), 1);
        assert!(db.search_region("brisbane", Some(State::Nsw)).unwrap().is_empty());
    }

    #[test]
    fn lists_lgas_with_counts() {
        let db = fixture();
        let lgas = db.all_lgas(Some(State::Nsw)).unwrap();
        let names: Vec<&str> = lgas.iter().map(|l| l.lga_name.as_str()).collect();
        assert_eq!(names, vec!["Newcastle", "Sydney"]);
        assert_eq!(lgas[1].suburb_count, 3);
    }

    #[test]
    fn validates_combinations() {
        let db = fixture();
        assert!(db.validate_combination("sydney", "2000", None).unwrap());
        assert!(db.validate_combination("Sydney", "2000", Some(State::Nsw)).unwrap());
        assert!(!db.validate_combination("Sydney", "2000", Some(State::Vic)).unwrap());
        assert!(!db.validate_combination("Sydney", "2021", None).unwrap());
    }

    #[test]
    fn statistics() {
        let db = fixture();
        let stats = db.statistics().unwrap();
        assert_eq!(stats.total_records, 6);
        assert_eq!(stats.unique_postcodes, 5);
        assert_eq!(stats.unique_suburbs, 5);
        assert_eq!(stats.unique_lgas, 3);
        assert_eq!(stats.by_state.len(), 2);
        assert_eq!(stats.by_state[0].state, State::Nsw);
        assert_eq!(stats.by_state[0].suburbs, 5);
    }

    #[test]
    fn clear_and_mark_loaded() {
        let db = fixture();
        assert_eq!(db.loaded_at().unwrap(), None);
        db.mark_loaded().unwrap();
        assert!(db.loaded_at().unwrap().is_some());

        db.clear().unwrap();
        assert_eq!(db.statistics().unwrap().total_records, 0);
    }
}

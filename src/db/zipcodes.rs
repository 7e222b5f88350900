use crate::db::connection::Database;
use crate::domain::ZipCodeSource;
use crate::errors::AppError;
use rusqlite::params;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZipMapping {
    pub zip: String,
    pub state: String,
    pub primary_city: Option<String>,
}

pub fn get_target_zips_for_state(db: &Database, state_abbr: &str) -> Result<Vec<String>, AppError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare(
            "SELECT zip FROM ref_zipcode_mapping WHERE state = ?1 ORDER BY zip",
        )?;

        let rows = stmt.query_map(params![state_abbr], |row| row.get::<_, String>(0))?;

        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    })
}

/// Upsert zip → state rows, e.g. from a reference CSV.
pub fn save_zip_mappings(db: &Database, mappings: &[ZipMapping]) -> Result<usize, AppError> {
    db.with_conn(|conn| {
        let tx = conn.transaction()?;
        for m in mappings {
            tx.execute(
                r#"
                INSERT INTO ref_zipcode_mapping (zip, state, primary_city)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(zip) DO UPDATE SET
                    state = excluded.state,
                    primary_city = excluded.primary_city
                "#,
                params![m.zip.trim(), m.state.trim().to_uppercase(), m.primary_city],
            )?;
        }
        tx.commit()?;
        Ok(mappings.len())
    })
}

/// Read `zip,state[,primary_city]` lines. A header row and blank lines are skipped.
pub fn parse_zip_csv(text: &str) -> Result<Vec<ZipMapping>, AppError> {
    let mut out = Vec::new();
    for (n, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || (n == 0 && line.to_lowercase().starts_with("zip")) {
            continue;
        }
        let mut parts = line.splitn(3, ',').map(str::trim);
        let (Some(zip), Some(state)) = (parts.next(), parts.next()) else {
            return Err(AppError::Config(format!("line {}: expected zip,state", n + 1)));
        };
        if zip.is_empty() || state.is_empty() {
            return Err(AppError::Config(format!("line {}: empty zip or state", n + 1)));
        }
        out.push(ZipMapping {
            zip: zip.to_string(),
            state: state.to_string(),
            primary_city: parts.next().filter(|c| !c.is_empty()).map(str::to_string),
        });
    }
    Ok(out)
}

impl ZipCodeSource for Database {
    fn zips_for_state(&self, state: &str) -> Result<Vec<String>, AppError> {
        get_target_zips_for_state(self, state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connection::init_db;
    use tempfile::TempDir;

    fn make_test_db() -> (TempDir, Database) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(dir.path().join("zips.sqlite").to_string_lossy().to_string());
        init_db(&db).expect("schema init failed");
        (dir, db)
    }

    #[test]
    fn zips_are_filtered_by_state() {
        let (_dir, db) = make_test_db();
        let rows = parse_zip_csv("zip,state,primary_city\n84604,ut,Provo\n84101,UT,\n10001,NY,New York\n").unwrap();
        assert_eq!(save_zip_mappings(&db, &rows).unwrap(), 3);

        assert_eq!(db.zips_for_state("UT").unwrap(), vec!["84101", "84604"]);
        assert_eq!(db.zips_for_state("NY").unwrap(), vec!["10001"]);
        assert!(db.zips_for_state("CA").unwrap().is_empty());
    }

    #[test]
    fn upsert_moves_zip_between_states() {
        let (_dir, db) = make_test_db();
        save_zip_mappings(&db, &parse_zip_csv("84604,UT").unwrap()).unwrap();
        save_zip_mappings(&db, &parse_zip_csv("84604,ID,Somewhere").unwrap()).unwrap();

        assert!(db.zips_for_state("UT").unwrap().is_empty());
        assert_eq!(db.zips_for_state("ID").unwrap(), vec!["84604"]);
    }

    #[test]
    fn csv_rejects_short_lines() {
        assert!(matches!(parse_zip_csv("84604"), Err(AppError::Config(_))));
    }
}

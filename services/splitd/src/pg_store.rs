//! PostgreSQL implementation of the dataset store contract.
//!
//! One pooled connection is held exclusively for the request's duration
//! and released when the store is dropped. Identifiers go through the
//! allow-list validator before landing in a statement; class values and
//! window bounds travel as bind parameters only.

use async_trait::async_trait;
use futures::TryStreamExt;
use sqlx::pool::PoolConnection;
use sqlx::{Postgres, Row};

use stratify::ident::{quote_identifier, validate_identifier};
use stratify::{Attribute, AttributeType, DatasetStore, Result as SplitResult, RowWindow, SplitError};

pub struct PgDatasetStore {
    conn: PoolConnection<Postgres>,
}

impl PgDatasetStore {
    pub fn new(conn: PoolConnection<Postgres>) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl DatasetStore for PgDatasetStore {
    async fn create_dataset(&mut self, name: &str, attributes: &[Attribute]) -> SplitResult<()> {
        let stmt = create_table_stmt(name, attributes)?;
        sqlx::query(&stmt)
            .execute(&mut *self.conn)
            .await
            .map_err(map_sqlx_err)?;
        Ok(())
    }

    async fn destroy_dataset(&mut self, name: &str) -> SplitResult<()> {
        let stmt = format!("DROP TABLE IF EXISTS {}", quote_identifier(name)?);
        sqlx::query(&stmt)
            .execute(&mut *self.conn)
            .await
            .map_err(map_sqlx_err)?;
        Ok(())
    }

    async fn bulk_load(
        &mut self,
        name: &str,
        delimiter: char,
        has_header: bool,
        data: &[u8],
    ) -> SplitResult<()> {
        let stmt = copy_in_stmt(name, delimiter, has_header)?;
        let mut copy = self
            .conn
            .copy_in_raw(&stmt)
            .await
            .map_err(map_sqlx_err)?;
        copy.send(data).await.map_err(map_sqlx_err)?;
        copy.finish().await.map_err(map_sqlx_err)?;
        Ok(())
    }

    async fn column_names(&mut self, table: &str) -> SplitResult<Vec<String>> {
        validate_identifier(table)?;
        let columns: Vec<String> = sqlx::query_scalar(
            "SELECT column_name FROM information_schema.columns \
             WHERE table_schema = current_schema() AND table_name = $1 \
             ORDER BY ordinal_position",
        )
        .bind(table)
        .fetch_all(&mut *self.conn)
        .await
        .map_err(map_sqlx_err)?;

        if columns.is_empty() {
            return Err(SplitError::Schema(format!("unknown dataset '{table}'")));
        }
        Ok(columns)
    }

    async fn distinct_values(&mut self, table: &str, column: &str) -> SplitResult<Vec<String>> {
        let stmt = format!(
            "SELECT DISTINCT {}::text FROM {}",
            quote_identifier(column)?,
            quote_identifier(table)?
        );
        let values: Vec<Option<String>> = sqlx::query_scalar(&stmt)
            .fetch_all(&mut *self.conn)
            .await
            .map_err(map_sqlx_err)?;
        // NULL class values belong to no partition and are excluded;
        // a parameterized equality match could never select them.
        Ok(values.into_iter().flatten().collect())
    }

    async fn count_where(&mut self, table: &str, column: &str, value: &str) -> SplitResult<u64> {
        let stmt = format!(
            "SELECT COUNT(*) FROM {} WHERE {}::text = $1",
            quote_identifier(table)?,
            quote_identifier(column)?
        );
        let count: i64 = sqlx::query_scalar(&stmt)
            .bind(value)
            .fetch_one(&mut *self.conn)
            .await
            .map_err(map_sqlx_err)?;
        Ok(count as u64)
    }

    async fn copy_rows(&mut self, window: &RowWindow<'_>, sink: &mut Vec<u8>) -> SplitResult<u64> {
        // Re-seed the session so ORDER BY random() yields the same full
        // ordering for every call with this seed.
        sqlx::query("SELECT setseed($1)")
            .bind(fold_seed(window.seed))
            .execute(&mut *self.conn)
            .await
            .map_err(map_sqlx_err)?;

        let stmt = select_window_stmt(window)?;
        let mut rows = sqlx::query(&stmt)
            .bind(window.where_value)
            .bind(bound_i64(window.limit))
            .bind(bound_i64(window.offset))
            .fetch(&mut *self.conn);

        let mut writer = csv::Writer::from_writer(&mut *sink);
        let mut appended = 0u64;
        while let Some(row) = rows.try_next().await.map_err(map_sqlx_err)? {
            let mut record = Vec::with_capacity(window.columns.len());
            for i in 0..window.columns.len() {
                let field: Option<String> = row.try_get(i).map_err(map_sqlx_err)?;
                record.push(field.unwrap_or_default());
            }
            writer
                .write_record(&record)
                .map_err(|e| SplitError::Store(e.to_string()))?;
            appended += 1;
        }
        writer
            .flush()
            .map_err(|e| SplitError::Store(e.to_string()))?;
        Ok(appended)
    }
}

fn create_table_stmt(name: &str, attributes: &[Attribute]) -> SplitResult<String> {
    if attributes.is_empty() {
        return Err(SplitError::Validation(
            "dataset needs at least one attribute".to_string(),
        ));
    }
    let mut definitions = Vec::with_capacity(attributes.len());
    for attribute in attributes {
        definitions.push(format!(
            "{} {}",
            quote_identifier(&attribute.name)?,
            sql_type(attribute.kind)
        ));
    }
    Ok(format!(
        "CREATE TABLE {} ({})",
        quote_identifier(name)?,
        definitions.join(", ")
    ))
}

fn copy_in_stmt(name: &str, delimiter: char, has_header: bool) -> SplitResult<String> {
    // The delimiter was allow-listed upstream; it cannot close the quoted literal.
    Ok(format!(
        "COPY {} FROM STDIN WITH (FORMAT csv, HEADER {}, DELIMITER '{}')",
        quote_identifier(name)?,
        has_header,
        delimiter
    ))
}

fn select_window_stmt(window: &RowWindow<'_>) -> SplitResult<String> {
    let columns: Vec<String> = window
        .columns
        .iter()
        .map(|c| Ok(format!("{}::text", quote_identifier(c)?)))
        .collect::<SplitResult<_>>()?;
    Ok(format!(
        "SELECT {} FROM {} WHERE {}::text = $1 ORDER BY random() LIMIT $2 OFFSET $3",
        columns.join(", "),
        quote_identifier(window.table)?,
        quote_identifier(window.where_column)?
    ))
}

fn sql_type(kind: AttributeType) -> &'static str {
    match kind {
        AttributeType::Integer => "int",
        AttributeType::Real => "numeric",
        AttributeType::Text => "text",
    }
}

/// Clamps a window bound into Postgres's bigint domain. An offset past
/// i64::MAX is past any real table anyway; the window just comes back
/// empty.
fn bound_i64(n: u64) -> i64 {
    n.min(i64::MAX as u64) as i64
}

/// Folds an integer seed into setseed's [-1, 1] domain. Equal seeds map
/// to equal arguments, so equal seeds produce equal orderings. The seed
/// is reduced modulo a Mersenne prime first so the product stays within
/// f64's integer precision and huge seeds keep distinct orderings.
fn fold_seed(seed: i64) -> f64 {
    const MODULUS: i64 = (1 << 31) - 1;
    (((seed % MODULUS) as f64) * 0.618_033_988_749_895).fract()
}

fn map_sqlx_err(err: sqlx::Error) -> SplitError {
    if let sqlx::Error::Database(db) = &err {
        if let Some(code) = db.code() {
            // undefined_table / undefined_column
            if code == "42P01" || code == "42703" {
                return SplitError::Schema(db.message().to_string());
            }
        }
    }
    SplitError::Store(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs() -> Vec<Attribute> {
        vec![
            Attribute { name: "sepal_length".to_string(), kind: AttributeType::Real },
            Attribute { name: "petals".to_string(), kind: AttributeType::Integer },
            Attribute { name: "species".to_string(), kind: AttributeType::Text },
        ]
    }

    #[test]
    fn test_create_table_stmt() {
        let stmt = create_table_stmt("iris", &attrs()).unwrap();
        assert_eq!(
            stmt,
            "CREATE TABLE \"iris\" (\"sepal_length\" numeric, \"petals\" int, \"species\" text)"
        );
    }

    #[test]
    fn test_create_table_rejects_bad_identifiers() {
        let mut bad = attrs();
        bad[0].name = "x; DROP TABLE y".to_string();
        assert!(create_table_stmt("iris", &bad).is_err());
        assert!(create_table_stmt("iris\"", &attrs()).is_err());
        assert!(create_table_stmt("iris", &[]).is_err());
    }

    #[test]
    fn test_copy_in_stmt() {
        let stmt = copy_in_stmt("iris", ';', true).unwrap();
        assert_eq!(
            stmt,
            "COPY \"iris\" FROM STDIN WITH (FORMAT csv, HEADER true, DELIMITER ';')"
        );
    }

    #[test]
    fn test_select_window_stmt_binds_values_only() {
        let columns = vec!["sepal_length".to_string(), "species".to_string()];
        let window = RowWindow {
            table: "iris",
            columns: &columns,
            where_column: "species",
            where_value: "'; DROP TABLE iris; --",
            seed: 7,
            limit: 10,
            offset: 20,
        };
        let stmt = select_window_stmt(&window).unwrap();
        assert_eq!(
            stmt,
            "SELECT \"sepal_length\"::text, \"species\"::text FROM \"iris\" \
             WHERE \"species\"::text = $1 ORDER BY random() LIMIT $2 OFFSET $3"
        );
        // The hostile value never appears in the statement text.
        assert!(!stmt.contains("DROP"));
    }

    #[test]
    fn test_fold_seed_is_deterministic_and_in_domain() {
        for seed in [i64::MIN, -12345, -1, 0, 1, 42, 12345, i64::MAX] {
            let folded = fold_seed(seed);
            assert!((-1.0..=1.0).contains(&folded), "seed {seed} -> {folded}");
            assert_eq!(folded.to_bits(), fold_seed(seed).to_bits());
        }
        assert_ne!(fold_seed(1), fold_seed(2));
    }

    #[test]
    fn test_fold_seed_keeps_huge_seeds_distinct() {
        // Beyond 2^52 the raw product would lose its fractional part and
        // collapse neighbouring seeds to the same argument.
        assert_ne!(fold_seed(1 << 60), fold_seed((1 << 60) + 1));
        assert_ne!(fold_seed(i64::MAX), fold_seed(i64::MAX - 1));
        assert_ne!(fold_seed(i64::MAX), 0.0);
    }

    #[test]
    fn test_bound_i64_clamps_to_bigint_range() {
        assert_eq!(bound_i64(0), 0);
        assert_eq!(bound_i64(250), 250);
        assert_eq!(bound_i64(i64::MAX as u64), i64::MAX);
        assert_eq!(bound_i64(u64::MAX), i64::MAX);
    }
}

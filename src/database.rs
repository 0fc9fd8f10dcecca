use chrono::{DateTime, Utc};
use mobc::{Manager, Pool};
use rusqlite::{params, Connection, Result as SqliteResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, error, info};

use crate::models::STATUS_UNVERIFIED;
use crate::scraping::types::ScrapedLead;

fn log_rusqlite_error(context: &str, err: &rusqlite::Error) {
    error!("🔥 SQLite Error in {}: {:?}", context, err);
}

/// A lead row as persisted. `ScrapedLead` plus provenance columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredLead {
    pub id: Option<i64>,
    pub name: String,
    pub job_title: String,
    pub company: String,
    pub inferred_email: String,
    pub verified_status: String,
    pub verification_details: Option<String>,
    pub source_url: String,
    pub scraped_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

pub struct SqliteManager {
    db_path: String,
}

impl SqliteManager {
    pub fn new(db_path: String) -> Self {
        debug!("🔧 Creating SqliteManager for path: {}", db_path);
        Self { db_path }
    }
}

#[async_trait::async_trait]
impl Manager for SqliteManager {
    type Connection = Connection;
    type Error = rusqlite::Error;

    async fn connect(&self) -> Result<Self::Connection, Self::Error> {
        debug!(
            "🔌 SqliteManager::connect() - Opening database: {}",
            self.db_path
        );

        let conn = match Connection::open(&self.db_path) {
            Ok(c) => c,
            Err(e) => {
                log_rusqlite_error("Connection::open", &e);
                return Err(e);
            }
        };

        // Some PRAGMA statements return a row, so execute() alone is not enough
        let exec_pragma =
            |conn: &Connection, pragma: &str| -> Result<(), rusqlite::Error> {
                match conn.execute(pragma, []) {
                    Ok(_) => Ok(()),
                    Err(rusqlite::Error::ExecuteReturnedResults) => {
                        conn.query_row(pragma, [], |_| Ok(()))
                    }
                    Err(e) => Err(e),
                }
            };

        exec_pragma(&conn, "PRAGMA journal_mode=WAL")?;
        exec_pragma(&conn, "PRAGMA synchronous=NORMAL")?;
        exec_pragma(&conn, "PRAGMA cache_size=1000000")?;
        exec_pragma(&conn, "PRAGMA temp_store=memory")?;

        if let Err(e) = init_database(&conn) {
            log_rusqlite_error("init_database", &e);
            return Err(e);
        }

        debug!("✅ SqliteManager::connect() completed successfully");
        Ok(conn)
    }

    async fn check(&self, conn: Self::Connection) -> Result<Self::Connection, Self::Error> {
        match conn.query_row("SELECT 1", [], |_| Ok(())) {
            Ok(_) => Ok(conn),
            Err(e) => {
                log_rusqlite_error("connection check", &e);
                Err(e)
            }
        }
    }
}

fn init_database(conn: &Connection) -> SqliteResult<()> {
    debug!("🏗️ init_database() - Creating tables and indexes...");

    create_leads_table(conn)?;
    create_scrape_runs_table(conn)?;
    create_indexes(conn)?;

    Ok(())
}

pub type DbPool = Pool<SqliteManager>;

pub async fn create_db_pool(
    db_path: &str,
) -> Result<DbPool, Box<dyn std::error::Error + Send + Sync>> {
    // Ensure directory exists
    if let Some(parent) = Path::new(db_path).parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let manager = SqliteManager::new(db_path.to_string());
    let pool = Pool::builder().max_open(10).max_idle(5).build(manager);

    info!("✓ SQLite connection pool created: {}", db_path);
    Ok(pool)
}

fn create_leads_table(conn: &Connection) -> SqliteResult<()> {
    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS leads (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            job_title TEXT NOT NULL,
            company TEXT NOT NULL,
            inferred_email TEXT NOT NULL,
            verified_status TEXT NOT NULL DEFAULT 'UNVERIFIED',
            verification_details TEXT,
            source_url TEXT NOT NULL,
            scraped_at TEXT NOT NULL,
            last_updated TEXT NOT NULL,
            UNIQUE(name, source_url)
        )
        "#,
        [],
    )?;
    Ok(())
}

fn create_scrape_runs_table(conn: &Connection) -> SqliteResult<()> {
    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS scrape_runs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            run_id TEXT NOT NULL,
            url TEXT NOT NULL,
            leads_found INTEGER NOT NULL,
            duration_ms INTEGER NOT NULL,
            success BOOLEAN NOT NULL,
            error_message TEXT,
            scraped_at TEXT NOT NULL
        )
        "#,
        [],
    )?;
    Ok(())
}

fn create_indexes(conn: &Connection) -> SqliteResult<()> {
    let indexes = [
        "CREATE INDEX IF NOT EXISTS idx_leads_source_url ON leads(source_url)",
        "CREATE INDEX IF NOT EXISTS idx_leads_email ON leads(inferred_email)",
        "CREATE INDEX IF NOT EXISTS idx_leads_status ON leads(verified_status)",
        "CREATE INDEX IF NOT EXISTS idx_scrape_runs_url ON scrape_runs(url)",
        "CREATE INDEX IF NOT EXISTS idx_scrape_runs_scraped_at ON scrape_runs(scraped_at DESC)",
    ];

    for (i, index_sql) in indexes.iter().enumerate() {
        if let Err(e) = conn.execute(index_sql, []) {
            log_rusqlite_error(&format!("create index {}", i + 1), &e);
            return Err(e);
        }
    }

    Ok(())
}

/// Drops and recreates the whole schema. Backing for the destructive
/// `/create-tables` endpoint.
pub async fn recreate_tables(
    pool: &DbPool,
) -> Result<Vec<String>, Box<dyn std::error::Error + Send + Sync>> {
    let conn = pool.get().await?;

    for table in ["leads", "scrape_runs"] {
        debug!("🗑️ Dropping table {} (if present)", table);
        conn.execute(&format!("DROP TABLE IF EXISTS {}", table), [])?;
    }

    init_database(&conn)?;

    info!("✓ Schema recreated: leads, scrape_runs");
    Ok(vec!["leads".to_string(), "scrape_runs".to_string()])
}

/// Upserts scraped leads for a source page. Re-scraping a page refreshes
/// existing rows keyed on (name, source_url) instead of duplicating them.
pub async fn store_leads(
    pool: &DbPool,
    source_url: &str,
    leads: &[ScrapedLead],
) -> Result<Vec<StoredLead>, Box<dyn std::error::Error + Send + Sync>> {
    debug!(
        "💾 store_leads() - source: {}, leads: {}",
        source_url,
        leads.len()
    );

    let conn = pool.get().await?;
    let now = Utc::now();
    let mut stored = Vec::with_capacity(leads.len());

    for lead in leads {
        match conn.execute(
            r#"
            INSERT INTO leads (
                name, job_title, company, inferred_email, verified_status,
                verification_details, source_url, scraped_at, last_updated
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ON CONFLICT (name, source_url) DO UPDATE SET
                job_title = excluded.job_title,
                company = excluded.company,
                inferred_email = excluded.inferred_email,
                last_updated = excluded.last_updated
            "#,
            params![
                lead.name,
                lead.job_title,
                lead.company,
                lead.inferred_email,
                STATUS_UNVERIFIED,
                Option::<String>::None,
                source_url,
                now.to_rfc3339(),
                now.to_rfc3339(),
            ],
        ) {
            Ok(_) => {
                let id: i64 = conn.query_row(
                    "SELECT id FROM leads WHERE name = ?1 AND source_url = ?2",
                    params![lead.name, source_url],
                    |row| row.get(0),
                )?;

                stored.push(StoredLead {
                    id: Some(id),
                    name: lead.name.clone(),
                    job_title: lead.job_title.clone(),
                    company: lead.company.clone(),
                    inferred_email: lead.inferred_email.clone(),
                    verified_status: STATUS_UNVERIFIED.to_string(),
                    verification_details: None,
                    source_url: source_url.to_string(),
                    scraped_at: now,
                    last_updated: now,
                });
            }
            Err(e) => {
                log_rusqlite_error("store_leads", &e);
                return Err(Box::new(e));
            }
        }
    }

    debug!("✅ Stored {} leads for {}", stored.len(), source_url);
    Ok(stored)
}

pub async fn record_scrape_run(
    pool: &DbPool,
    run_id: &str,
    url: &str,
    leads_found: usize,
    duration_ms: u64,
    success: bool,
    error_message: Option<&str>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let conn = pool.get().await?;

    conn.execute(
        r#"
        INSERT INTO scrape_runs (
            run_id, url, leads_found, duration_ms, success, error_message, scraped_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
        params![
            run_id,
            url,
            leads_found as i64,
            duration_ms as i64,
            success,
            error_message,
            Utc::now().to_rfc3339(),
        ],
    )?;

    Ok(())
}

/// Cheap round-trip used by the health endpoint.
pub async fn check_connectivity(
    pool: &DbPool,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let conn = pool.get().await?;
    conn.query_row("SELECT 1", [], |_| Ok(()))?;
    Ok(())
}

pub fn lead_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<StoredLead> {
    let scraped_at_str: String = row.get(8)?;
    let last_updated_str: String = row.get(9)?;

    let parse_ts = |idx: usize, s: &str| {
        DateTime::parse_from_rfc3339(s)
            .map_err(|_| {
                rusqlite::Error::InvalidColumnType(
                    idx,
                    s.to_string(),
                    rusqlite::types::Type::Text,
                )
            })
            .map(|dt| dt.with_timezone(&Utc))
    };

    Ok(StoredLead {
        id: row.get(0)?,
        name: row.get(1)?,
        job_title: row.get(2)?,
        company: row.get(3)?,
        inferred_email: row.get(4)?,
        verified_status: row.get(5)?,
        verification_details: row.get(6)?,
        source_url: row.get(7)?,
        scraped_at: parse_ts(8, &scraped_at_str)?,
        last_updated: parse_ts(9, &last_updated_str)?,
    })
}

pub const LEAD_COLUMNS: &str = "id, name, job_title, company, inferred_email, \
     verified_status, verification_details, source_url, scraped_at, last_updated";

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_db_path() -> String {
        std::env::temp_dir()
            .join(format!("scrapriq-test-{}.db", uuid::Uuid::new_v4()))
            .to_string_lossy()
            .into_owned()
    }

    fn sample_lead(name: &str) -> ScrapedLead {
        ScrapedLead {
            name: name.to_string(),
            job_title: "CEO".to_string(),
            company: "example.com".to_string(),
            inferred_email: format!(
                "{}@example.com",
                name.to_lowercase().replace(' ', ".")
            ),
        }
    }

    #[tokio::test]
    async fn store_and_reread_leads() {
        let pool = create_db_pool(&temp_db_path()).await.unwrap();

        let leads = vec![sample_lead("John Smith"), sample_lead("Jane Doe")];
        let stored = store_leads(&pool, "https://example.com/team", &leads)
            .await
            .unwrap();

        assert_eq!(stored.len(), 2);
        assert!(stored.iter().all(|l| l.id.is_some()));
        assert!(stored
            .iter()
            .all(|l| l.verified_status == STATUS_UNVERIFIED));

        let conn = pool.get().await.unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM leads", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn rescrape_updates_instead_of_duplicating() {
        let pool = create_db_pool(&temp_db_path()).await.unwrap();
        let url = "https://example.com/about";

        store_leads(&pool, url, &[sample_lead("John Smith")])
            .await
            .unwrap();

        let mut updated = sample_lead("John Smith");
        updated.job_title = "Founder".to_string();
        store_leads(&pool, url, &[updated]).await.unwrap();

        let conn = pool.get().await.unwrap();
        let (count, title): (i64, String) = conn
            .query_row(
                "SELECT COUNT(*), MAX(job_title) FROM leads WHERE source_url = ?1",
                [url],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        assert_eq!(count, 1);
        assert_eq!(title, "Founder");
    }

    #[tokio::test]
    async fn recreate_tables_drops_existing_rows() {
        let pool = create_db_pool(&temp_db_path()).await.unwrap();
        store_leads(&pool, "https://example.com/team", &[sample_lead("John Smith")])
            .await
            .unwrap();

        let tables = recreate_tables(&pool).await.unwrap();
        assert_eq!(tables, vec!["leads", "scrape_runs"]);

        let conn = pool.get().await.unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM leads", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn records_scrape_runs() {
        let pool = create_db_pool(&temp_db_path()).await.unwrap();
        record_scrape_run(
            &pool,
            "run-1",
            "https://example.com",
            3,
            120,
            true,
            None,
        )
        .await
        .unwrap();
        record_scrape_run(
            &pool,
            "run-1",
            "https://broken.example.com",
            0,
            40,
            false,
            Some("HTTP error: 404"),
        )
        .await
        .unwrap();

        let conn = pool.get().await.unwrap();
        let failures: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM scrape_runs WHERE success = 0",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(failures, 1);
    }
}

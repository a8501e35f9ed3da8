//! SQLite-backed Flood Watch store
//!
//! `open()` uses a WAL-mode database file under the data directory so the
//! API server and `flood` batch commands can share it. Each mutation is a
//! single statement or one transaction whose first statement writes, so a
//! concurrent writer waits on the database lock instead of reading stale
//! rows. Report photos live next to the database under `media/`.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};
use sqlx::FromRow;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tokio::fs;
use tracing::{debug, info, warn};

use flood_core::ledger::{EmailLog, FloodHistory, ReportLedger, UserDirectory, WardRegistry};
use flood_core::{
    ActionId, AlertId, AlertRecord, Coordinates, EmailLogEntry, FloodError, FloodResult,
    HistoricalFloodEvent, PhotoAttachment, PhotoUpload, ReportAction, ReportDraft, ReportId,
    ReportRecord, ReportStatus, ReviewDecision, RiskChange, RiskLevel, StatusCounts, UserId,
    UserRecord, Vote, VoteTally, WardId, WardRecord, WardYearStats, DEFAULT_RELIABILITY_SCORE,
};

use crate::error::{DbError, DbResult};
use crate::schema::FLOOD_SCHEMA;

const DATABASE_FILE: &str = "flood.db";
const MEDIA_DIR: &str = "media";
const MAX_CONNECTIONS: u32 = 5;
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Flood Watch store
///
/// Implements every ledger trait over a SQLite pool. `in_memory()` serves
/// tests and keeps no photos on disk.
pub struct FloodStore {
    pool: SqlitePool,
    media_dir: Option<PathBuf>,
}

impl FloodStore {
    pub async fn in_memory() -> DbResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        // Each connection to `:memory:` is its own database, so the pool
        // holds exactly one and never retires it.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        Self::init(pool, None).await
    }

    /// Open (or create) the database under `data_dir`
    pub async fn open(data_dir: impl Into<PathBuf>) -> DbResult<Self> {
        let data_dir = data_dir.into();
        let media_dir = data_dir.join(MEDIA_DIR);

        for path in [&data_dir, &media_dir] {
            fs::create_dir_all(path)
                .await
                .map_err(|e| DbError::io(path, e))?;
        }

        let database = data_dir.join(DATABASE_FILE);
        let options = SqliteConnectOptions::new()
            .filename(&database)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(BUSY_TIMEOUT)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect_with(options)
            .await?;

        let store = Self::init(pool, Some(media_dir)).await?;
        info!(path = ?database, "Opened flood store");
        Ok(store)
    }

    async fn init(pool: SqlitePool, media_dir: Option<PathBuf>) -> DbResult<Self> {
        for statement in FLOOD_SCHEMA {
            sqlx::query(statement).execute(&pool).await?;
        }
        Ok(Self { pool, media_dir })
    }

    /// Root directory for stored report photos
    pub fn media_dir(&self) -> Option<&Path> {
        self.media_dir.as_deref()
    }

    /// The database answers a trivial query
    pub async fn is_ready(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }

    /// Close the pool, waiting for checked-out connections to return
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Write the photo under the media root. Returns the metadata and the
    /// absolute path written, if any.
    async fn store_photo(
        &self,
        created_at: DateTime<Utc>,
        photo: &PhotoUpload,
    ) -> DbResult<(PhotoAttachment, Option<PathBuf>)> {
        let mut attachment = PhotoAttachment {
            file_name: photo.file_name.clone(),
            content_type: photo.content_type.clone(),
            size_bytes: photo.data.len() as u64,
            stored_path: None,
        };
        let Some(media) = &self.media_dir else {
            return Ok((attachment, None));
        };

        let relative = PathBuf::from("reports")
            .join(created_at.format("%Y/%m/%d").to_string())
            .join(format!(
                "{}_{}",
                uuid::Uuid::new_v4().simple(),
                sanitize_file_name(&photo.file_name)
            ));
        let full = media.join(&relative);

        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| DbError::io(parent, e))?;
        }
        fs::write(&full, &photo.data)
            .await
            .map_err(|e| DbError::io(&full, e))?;

        attachment.stored_path = Some(relative.to_string_lossy().replace('\\', "/"));
        Ok((attachment, Some(full)))
    }

    async fn insert_report_row(
        &self,
        draft: &ReportDraft,
        photo: Option<PhotoAttachment>,
        created_at: DateTime<Utc>,
    ) -> DbResult<ReportRecord> {
        let photo_json = photo.as_ref().map(serde_json::to_string).transpose()?;

        let result = sqlx::query(
            r#"
            INSERT INTO reports (
                reporter_id, ward_id, location, latitude, longitude,
                description, photo, status, created_at, reliability_score
            ) VALUES (?, ?, ?, ?, ?, ?, ?, 'Pending', ?, ?)
            "#,
        )
        .bind(draft.reporter_id.as_str())
        .bind(draft.ward_id.map(|w| w.0 as i64))
        .bind(&draft.location)
        .bind(draft.coordinates.latitude)
        .bind(draft.coordinates.longitude)
        .bind(&draft.description)
        .bind(photo_json)
        .bind(created_at)
        .bind(DEFAULT_RELIABILITY_SCORE)
        .execute(&self.pool)
        .await?;

        Ok(ReportRecord {
            report_id: ReportId(result.last_insert_rowid() as u64),
            reporter_id: draft.reporter_id.clone(),
            ward_id: draft.ward_id,
            location: draft.location.clone(),
            coordinates: draft.coordinates,
            description: draft.description.clone(),
            photo,
            status: ReportStatus::Pending,
            created_at,
            upvotes: 0,
            downvotes: 0,
            reliability_score: DEFAULT_RELIABILITY_SCORE,
        })
    }

    async fn review_tx(
        &self,
        report_id: ReportId,
        admin_id: &UserId,
        decision: ReviewDecision,
        notes: Option<String>,
    ) -> DbResult<(ReportRecord, ReportAction)> {
        let id = report_id.0 as i64;
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            "UPDATE reports SET status = ? WHERE report_id = ? AND status = 'Pending'",
        )
        .bind(to_sql(&decision.target_status())?)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            let status: Option<String> =
                sqlx::query_scalar("SELECT status FROM reports WHERE report_id = ?")
                    .bind(id)
                    .fetch_optional(&mut *tx)
                    .await?;
            return Err(match status {
                None => FloodError::not_found(format!("report {}", report_id)),
                Some(status) => FloodError::InvalidStateTransition(format!(
                    "report {} is already {}",
                    report_id, status
                )),
            }
            .into());
        }

        let created_at = Utc::now();
        let inserted = sqlx::query(
            r#"
            INSERT INTO report_actions (report_id, admin_id, decision, notes, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(id)
        .bind(admin_id.as_str())
        .bind(to_sql(&decision)?)
        .bind(notes.as_deref())
        .bind(created_at)
        .execute(&mut *tx)
        .await?;

        let record = sqlx::query_as::<_, ReportRow>("SELECT * FROM reports WHERE report_id = ?")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?
            .into_record()?;

        tx.commit().await?;

        let action = ReportAction {
            action_id: ActionId(inserted.last_insert_rowid() as u64),
            report_id,
            admin_id: admin_id.clone(),
            decision,
            notes,
            created_at,
        };
        Ok((record, action))
    }

    async fn vote_tx(&self, report_id: ReportId, voter: &UserId, vote: Vote) -> DbResult<VoteTally> {
        let id = report_id.0 as i64;
        let mut tx = self.pool.begin().await?;

        let recorded = sqlx::query(
            r#"
            INSERT INTO report_votes (report_id, user_id, vote, voted_at)
            SELECT ?, ?, ?, ?
            WHERE EXISTS (SELECT 1 FROM reports WHERE report_id = ?)
            ON CONFLICT (report_id, user_id)
            DO UPDATE SET vote = excluded.vote, voted_at = excluded.voted_at
            "#,
        )
        .bind(id)
        .bind(voter.as_str())
        .bind(to_sql(&vote)?)
        .bind(Utc::now())
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if recorded.rows_affected() == 0 {
            return Err(FloodError::not_found(format!("report {}", report_id)).into());
        }

        sqlx::query(
            r#"
            UPDATE reports SET
                upvotes = (SELECT COUNT(*) FROM report_votes WHERE report_id = ?1 AND vote = 'up'),
                downvotes = (SELECT COUNT(*) FROM report_votes WHERE report_id = ?1 AND vote = 'down')
            WHERE report_id = ?1
            "#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        let (upvotes, downvotes): (i64, i64) =
            sqlx::query_as("SELECT upvotes, downvotes FROM reports WHERE report_id = ?")
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;

        tx.commit().await?;

        Ok(VoteTally {
            report_id,
            upvotes: upvotes as u32,
            downvotes: downvotes as u32,
            vote,
        })
    }

    async fn set_risk_tx(&self, ward_id: WardId, level: RiskLevel) -> DbResult<RiskChange> {
        let id = ward_id.0 as i64;
        let mut tx = self.pool.begin().await?;

        // Claim the row first so the read below happens under the write lock
        let claimed = sqlx::query("UPDATE wards SET ward_id = ward_id WHERE ward_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if claimed.rows_affected() == 0 {
            return Err(FloodError::not_found(format!("ward {}", ward_id)).into());
        }

        let previous: String =
            sqlx::query_scalar("SELECT current_risk_level FROM wards WHERE ward_id = ?")
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;
        let previous: RiskLevel = from_sql("current_risk_level", &previous)?;

        if previous != level {
            sqlx::query(
                "UPDATE wards SET current_risk_level = ?, last_updated = ? WHERE ward_id = ?",
            )
            .bind(to_sql(&level)?)
            .bind(Utc::now())
            .bind(id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(RiskChange {
            ward_id,
            previous,
            current: level,
        })
    }

    async fn users_where(&self, clause: &str, ward_id: Option<WardId>) -> DbResult<Vec<UserRecord>> {
        let sql = format!("SELECT * FROM users WHERE {} ORDER BY user_id", clause);
        let mut query = sqlx::query_as::<_, UserRow>(&sql);
        if let Some(ward_id) = ward_id {
            query = query.bind(ward_id.0 as i64);
        }
        query
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(UserRow::into_record)
            .collect()
    }
}

/// Serde name of a unit enum, as stored in its text column
fn to_sql<T: Serialize>(value: &T) -> DbResult<String> {
    match serde_json::to_value(value)? {
        Value::String(name) => Ok(name),
        other => Ok(other.to_string()),
    }
}

fn from_sql<T: DeserializeOwned>(field: &'static str, raw: &str) -> DbResult<T> {
    serde_json::from_value(Value::String(raw.to_string()))
        .map_err(|_| DbError::invalid_value(field, raw))
}

fn limit_param(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "photo".to_string()
    } else {
        cleaned.to_string()
    }
}

#[derive(Debug, FromRow)]
struct ReportRow {
    report_id: i64,
    reporter_id: String,
    ward_id: Option<i64>,
    location: String,
    latitude: f64,
    longitude: f64,
    description: String,
    photo: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
    upvotes: i64,
    downvotes: i64,
    reliability_score: f64,
}

impl ReportRow {
    fn into_record(self) -> DbResult<ReportRecord> {
        Ok(ReportRecord {
            report_id: ReportId(self.report_id as u64),
            reporter_id: UserId(self.reporter_id),
            ward_id: self.ward_id.map(|w| WardId(w as u64)),
            location: self.location,
            coordinates: Coordinates::new(self.latitude, self.longitude),
            description: self.description,
            photo: self.photo.as_deref().map(serde_json::from_str).transpose()?,
            status: from_sql("status", &self.status)?,
            created_at: self.created_at,
            upvotes: self.upvotes as u32,
            downvotes: self.downvotes as u32,
            reliability_score: self.reliability_score,
        })
    }
}

#[derive(Debug, FromRow)]
struct ActionRow {
    action_id: i64,
    report_id: i64,
    admin_id: String,
    decision: String,
    notes: Option<String>,
    created_at: DateTime<Utc>,
}

impl ActionRow {
    fn into_record(self) -> DbResult<ReportAction> {
        Ok(ReportAction {
            action_id: ActionId(self.action_id as u64),
            report_id: ReportId(self.report_id as u64),
            admin_id: UserId(self.admin_id),
            decision: from_sql("decision", &self.decision)?,
            notes: self.notes,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct WardRow {
    ward_id: i64,
    name: String,
    geometry: String,
    current_risk_level: String,
    population: i64,
    critical_infrastructure: bool,
    last_updated: DateTime<Utc>,
}

impl WardRow {
    fn into_record(self) -> DbResult<WardRecord> {
        Ok(WardRecord {
            ward_id: WardId(self.ward_id as u64),
            name: self.name,
            geometry: serde_json::from_str(&self.geometry)?,
            current_risk_level: from_sql("current_risk_level", &self.current_risk_level)?,
            population: self.population as u64,
            critical_infrastructure: self.critical_infrastructure,
            last_updated: self.last_updated,
        })
    }
}

#[derive(Debug, FromRow)]
struct AlertRow {
    alert_id: i64,
    ward_id: i64,
    risk_level: String,
    message: String,
    issued_at: DateTime<Utc>,
}

impl AlertRow {
    fn into_record(self) -> DbResult<AlertRecord> {
        Ok(AlertRecord {
            alert_id: AlertId(self.alert_id as u64),
            ward_id: WardId(self.ward_id as u64),
            risk_level: from_sql("risk_level", &self.risk_level)?,
            message: self.message,
            issued_at: self.issued_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct EventRow {
    event_id: i64,
    name: String,
    description: String,
    date_occurred: NaiveDate,
    affected_wards: String,
    latitude: f64,
    longitude: f64,
    risk_level: String,
    estimated_casualties: i64,
    estimated_displaced: i64,
    rainfall_mm: f64,
    primary_cause: String,
    data_source: String,
}

impl EventRow {
    fn into_record(self) -> DbResult<HistoricalFloodEvent> {
        Ok(HistoricalFloodEvent {
            event_id: self.event_id as u64,
            name: self.name,
            description: self.description,
            date_occurred: self.date_occurred,
            affected_wards: serde_json::from_str(&self.affected_wards)?,
            latitude: self.latitude,
            longitude: self.longitude,
            risk_level: from_sql("risk_level", &self.risk_level)?,
            estimated_casualties: self.estimated_casualties as u64,
            estimated_displaced: self.estimated_displaced as u64,
            rainfall_mm: self.rainfall_mm,
            primary_cause: from_sql("primary_cause", &self.primary_cause)?,
            data_source: self.data_source,
        })
    }
}

#[derive(Debug, FromRow)]
struct YearStatsRow {
    ward_id: i64,
    year: i32,
    flood_count: i64,
    avg_rainfall_mm: f64,
    vulnerability_index: f64,
    flood_risk_score: f64,
}

impl From<YearStatsRow> for WardYearStats {
    fn from(row: YearStatsRow) -> Self {
        Self {
            ward_id: WardId(row.ward_id as u64),
            year: row.year,
            flood_count: row.flood_count as u32,
            avg_rainfall_mm: row.avg_rainfall_mm,
            vulnerability_index: row.vulnerability_index,
            flood_risk_score: row.flood_risk_score,
        }
    }
}

#[derive(Debug, FromRow)]
struct UserRow {
    user_id: String,
    username: String,
    email: Option<String>,
    phone_number: Option<String>,
    role: String,
    is_active: bool,
    subscribed_wards: String,
    created_at: DateTime<Utc>,
}

impl UserRow {
    fn into_record(self) -> DbResult<UserRecord> {
        Ok(UserRecord {
            user_id: UserId(self.user_id),
            username: self.username,
            email: self.email,
            phone_number: self.phone_number,
            role: from_sql("role", &self.role)?,
            is_active: self.is_active,
            subscribed_wards: serde_json::from_str(&self.subscribed_wards)?,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct EmailRow {
    recipient_email: String,
    recipient_kind: String,
    subject: String,
    event: String,
    related_report: Option<i64>,
    sent_at: DateTime<Utc>,
    status: String,
    error_message: String,
}

impl EmailRow {
    fn into_record(self) -> DbResult<EmailLogEntry> {
        Ok(EmailLogEntry {
            recipient_email: self.recipient_email,
            recipient_kind: from_sql("recipient_kind", &self.recipient_kind)?,
            subject: self.subject,
            event: from_sql("event", &self.event)?,
            related_report: self.related_report.map(|r| ReportId(r as u64)),
            sent_at: self.sent_at,
            status: from_sql("status", &self.status)?,
            error_message: self.error_message,
        })
    }
}

#[async_trait]
impl ReportLedger for FloodStore {
    async fn insert_report(&self, draft: ReportDraft) -> FloodResult<ReportRecord> {
        let created_at = Utc::now();
        let (photo, written) = match &draft.photo {
            Some(upload) => {
                let (attachment, path) = self.store_photo(created_at, upload).await?;
                (Some(attachment), path)
            }
            None => (None, None),
        };

        match self.insert_report_row(&draft, photo, created_at).await {
            Ok(record) => {
                debug!(report_id = %record.report_id, "Inserted report");
                Ok(record)
            }
            Err(e) => {
                if let Some(path) = written {
                    if let Err(rm) = fs::remove_file(&path).await {
                        warn!(path = ?path, error = %rm, "Failed to remove orphaned photo");
                    }
                }
                Err(e.into())
            }
        }
    }

    async fn get_report(&self, report_id: ReportId) -> FloodResult<Option<ReportRecord>> {
        let row = sqlx::query_as::<_, ReportRow>("SELECT * FROM reports WHERE report_id = ?")
            .bind(report_id.0 as i64)
            .fetch_optional(&self.pool)
            .await
            .map_err(DbError::from)?;
        Ok(row.map(ReportRow::into_record).transpose()?)
    }

    async fn list_reports(
        &self,
        status: Option<ReportStatus>,
        limit: usize,
    ) -> FloodResult<Vec<ReportRecord>> {
        let status = status.map(|s| to_sql(&s)).transpose()?;
        let rows = sqlx::query_as::<_, ReportRow>(
            r#"
            SELECT * FROM reports
            WHERE (? IS NULL OR status = ?)
            ORDER BY report_id DESC
            LIMIT ?
            "#,
        )
        .bind(status.as_deref())
        .bind(status.as_deref())
        .bind(limit_param(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::from)?;

        Ok(rows
            .into_iter()
            .map(ReportRow::into_record)
            .collect::<DbResult<_>>()?)
    }

    async fn record_review(
        &self,
        report_id: ReportId,
        admin_id: &UserId,
        decision: ReviewDecision,
        notes: Option<String>,
    ) -> FloodResult<(ReportRecord, ReportAction)> {
        Ok(self.review_tx(report_id, admin_id, decision, notes).await?)
    }

    async fn actions_for_report(&self, report_id: ReportId) -> FloodResult<Vec<ReportAction>> {
        let rows = sqlx::query_as::<_, ActionRow>(
            "SELECT * FROM report_actions WHERE report_id = ? ORDER BY action_id",
        )
        .bind(report_id.0 as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::from)?;

        Ok(rows
            .into_iter()
            .map(ActionRow::into_record)
            .collect::<DbResult<_>>()?)
    }

    async fn apply_vote(
        &self,
        report_id: ReportId,
        voter: &UserId,
        vote: Vote,
    ) -> FloodResult<VoteTally> {
        Ok(self.vote_tx(report_id, voter, vote).await?)
    }

    async fn status_counts(&self) -> FloodResult<StatusCounts> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT status, COUNT(*) FROM reports GROUP BY status")
                .fetch_all(&self.pool)
                .await
                .map_err(DbError::from)?;

        let mut counts = StatusCounts::default();
        for (status, count) in rows {
            let count = count as u64;
            match from_sql::<ReportStatus>("status", &status)? {
                ReportStatus::Pending => counts.pending = count,
                ReportStatus::Validated => counts.validated = count,
                ReportStatus::Rejected => counts.rejected = count,
            }
            counts.total += count;
        }
        Ok(counts)
    }
}

#[async_trait]
impl WardRegistry for FloodStore {
    async fn list_wards(&self) -> FloodResult<Vec<WardRecord>> {
        let rows = sqlx::query_as::<_, WardRow>("SELECT * FROM wards ORDER BY ward_id")
            .fetch_all(&self.pool)
            .await
            .map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .map(WardRow::into_record)
            .collect::<DbResult<_>>()?)
    }

    async fn get_ward(&self, ward_id: WardId) -> FloodResult<Option<WardRecord>> {
        let row = sqlx::query_as::<_, WardRow>("SELECT * FROM wards WHERE ward_id = ?")
            .bind(ward_id.0 as i64)
            .fetch_optional(&self.pool)
            .await
            .map_err(DbError::from)?;
        Ok(row.map(WardRow::into_record).transpose()?)
    }

    async fn upsert_ward(&self, ward: WardRecord) -> FloodResult<()> {
        sqlx::query(
            r#"
            INSERT INTO wards (
                ward_id, name, geometry, current_risk_level,
                population, critical_infrastructure, last_updated
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (ward_id) DO UPDATE SET
                name = excluded.name,
                geometry = excluded.geometry,
                current_risk_level = excluded.current_risk_level,
                population = excluded.population,
                critical_infrastructure = excluded.critical_infrastructure,
                last_updated = excluded.last_updated
            "#,
        )
        .bind(ward.ward_id.0 as i64)
        .bind(&ward.name)
        .bind(ward.geometry.to_string())
        .bind(to_sql(&ward.current_risk_level)?)
        .bind(ward.population as i64)
        .bind(ward.critical_infrastructure)
        .bind(ward.last_updated)
        .execute(&self.pool)
        .await
        .map_err(DbError::from)?;
        Ok(())
    }

    async fn set_risk_level(&self, ward_id: WardId, level: RiskLevel) -> FloodResult<RiskChange> {
        Ok(self.set_risk_tx(ward_id, level).await?)
    }

    async fn record_alert(
        &self,
        ward_id: WardId,
        risk_level: RiskLevel,
        message: String,
    ) -> FloodResult<AlertRecord> {
        let issued_at = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO alerts (ward_id, risk_level, message, issued_at)
            SELECT ?, ?, ?, ?
            WHERE EXISTS (SELECT 1 FROM wards WHERE ward_id = ?)
            "#,
        )
        .bind(ward_id.0 as i64)
        .bind(to_sql(&risk_level)?)
        .bind(&message)
        .bind(issued_at)
        .bind(ward_id.0 as i64)
        .execute(&self.pool)
        .await
        .map_err(DbError::from)?;

        if result.rows_affected() == 0 {
            return Err(FloodError::not_found(format!("ward {}", ward_id)));
        }

        Ok(AlertRecord {
            alert_id: AlertId(result.last_insert_rowid() as u64),
            ward_id,
            risk_level,
            message,
            issued_at,
        })
    }

    async fn list_alerts(
        &self,
        ward_id: Option<WardId>,
        limit: usize,
    ) -> FloodResult<Vec<AlertRecord>> {
        let ward = ward_id.map(|w| w.0 as i64);
        let rows = sqlx::query_as::<_, AlertRow>(
            r#"
            SELECT * FROM alerts
            WHERE (? IS NULL OR ward_id = ?)
            ORDER BY alert_id DESC
            LIMIT ?
            "#,
        )
        .bind(ward)
        .bind(ward)
        .bind(limit_param(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::from)?;

        Ok(rows
            .into_iter()
            .map(AlertRow::into_record)
            .collect::<DbResult<_>>()?)
    }
}

#[async_trait]
impl FloodHistory for FloodStore {
    async fn add_event(&self, event: HistoricalFloodEvent) -> FloodResult<()> {
        sqlx::query(
            r#"
            INSERT INTO flood_events (
                event_id, name, description, date_occurred, affected_wards,
                latitude, longitude, risk_level, estimated_casualties,
                estimated_displaced, rainfall_mm, primary_cause, data_source
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (event_id) DO UPDATE SET
                name = excluded.name,
                description = excluded.description,
                date_occurred = excluded.date_occurred,
                affected_wards = excluded.affected_wards,
                latitude = excluded.latitude,
                longitude = excluded.longitude,
                risk_level = excluded.risk_level,
                estimated_casualties = excluded.estimated_casualties,
                estimated_displaced = excluded.estimated_displaced,
                rainfall_mm = excluded.rainfall_mm,
                primary_cause = excluded.primary_cause,
                data_source = excluded.data_source
            "#,
        )
        .bind(event.event_id as i64)
        .bind(&event.name)
        .bind(&event.description)
        .bind(event.date_occurred)
        .bind(serde_json::to_string(&event.affected_wards)?)
        .bind(event.latitude)
        .bind(event.longitude)
        .bind(to_sql(&event.risk_level)?)
        .bind(event.estimated_casualties as i64)
        .bind(event.estimated_displaced as i64)
        .bind(event.rainfall_mm)
        .bind(to_sql(&event.primary_cause)?)
        .bind(&event.data_source)
        .execute(&self.pool)
        .await
        .map_err(DbError::from)?;
        Ok(())
    }

    async fn events(&self, ward_id: Option<WardId>) -> FloodResult<Vec<HistoricalFloodEvent>> {
        let ward = ward_id.map(|w| w.0 as i64);
        let rows = sqlx::query_as::<_, EventRow>(
            r#"
            SELECT * FROM flood_events
            WHERE ? IS NULL
               OR EXISTS (SELECT 1 FROM json_each(flood_events.affected_wards)
                          WHERE json_each.value = ?)
            ORDER BY date_occurred DESC, event_id DESC
            "#,
        )
        .bind(ward)
        .bind(ward)
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::from)?;

        Ok(rows
            .into_iter()
            .map(EventRow::into_record)
            .collect::<DbResult<_>>()?)
    }

    async fn upsert_year_stats(&self, stats: WardYearStats) -> FloodResult<()> {
        sqlx::query(
            r#"
            INSERT INTO ward_year_stats (
                ward_id, year, flood_count, avg_rainfall_mm,
                vulnerability_index, flood_risk_score
            ) VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT (ward_id, year) DO UPDATE SET
                flood_count = excluded.flood_count,
                avg_rainfall_mm = excluded.avg_rainfall_mm,
                vulnerability_index = excluded.vulnerability_index,
                flood_risk_score = excluded.flood_risk_score
            "#,
        )
        .bind(stats.ward_id.0 as i64)
        .bind(stats.year)
        .bind(i64::from(stats.flood_count))
        .bind(stats.avg_rainfall_mm)
        .bind(stats.vulnerability_index)
        .bind(stats.flood_risk_score)
        .execute(&self.pool)
        .await
        .map_err(DbError::from)?;
        Ok(())
    }

    async fn year_stats(&self, ward_id: WardId) -> FloodResult<Vec<WardYearStats>> {
        let rows = sqlx::query_as::<_, YearStatsRow>(
            "SELECT * FROM ward_year_stats WHERE ward_id = ? ORDER BY year DESC",
        )
        .bind(ward_id.0 as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::from)?;
        Ok(rows.into_iter().map(WardYearStats::from).collect())
    }
}

#[async_trait]
impl UserDirectory for FloodStore {
    async fn get_user(&self, user_id: &UserId) -> FloodResult<Option<UserRecord>> {
        let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE user_id = ?")
            .bind(user_id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(DbError::from)?;
        Ok(row.map(UserRow::into_record).transpose()?)
    }

    async fn upsert_user(&self, user: UserRecord) -> FloodResult<()> {
        sqlx::query(
            r#"
            INSERT INTO users (
                user_id, username, email, phone_number, role,
                is_active, subscribed_wards, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (user_id) DO UPDATE SET
                username = excluded.username,
                email = excluded.email,
                phone_number = excluded.phone_number,
                role = excluded.role,
                is_active = excluded.is_active,
                subscribed_wards = excluded.subscribed_wards
            "#,
        )
        .bind(user.user_id.as_str())
        .bind(&user.username)
        .bind(user.email.as_deref())
        .bind(user.phone_number.as_deref())
        .bind(to_sql(&user.role)?)
        .bind(user.is_active)
        .bind(serde_json::to_string(&user.subscribed_wards)?)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(DbError::from)?;
        Ok(())
    }

    async fn list_users(&self) -> FloodResult<Vec<UserRecord>> {
        Ok(self.users_where("1 = 1", None).await?)
    }

    async fn active_authorities(&self) -> FloodResult<Vec<UserRecord>> {
        Ok(self
            .users_where("is_active = 1 AND role = 'authority'", None)
            .await?)
    }

    async fn active_users(&self) -> FloodResult<Vec<UserRecord>> {
        Ok(self.users_where("is_active = 1", None).await?)
    }

    async fn ward_subscribers(&self, ward_id: WardId) -> FloodResult<Vec<UserRecord>> {
        Ok(self
            .users_where(
                "is_active = 1 AND EXISTS (SELECT 1 FROM json_each(users.subscribed_wards) \
                 WHERE json_each.value = ?)",
                Some(ward_id),
            )
            .await?)
    }
}

#[async_trait]
impl EmailLog for FloodStore {
    async fn record_email(&self, entry: EmailLogEntry) -> FloodResult<()> {
        sqlx::query(
            r#"
            INSERT INTO email_log (
                recipient_email, recipient_kind, subject, event,
                related_report, sent_at, status, error_message
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&entry.recipient_email)
        .bind(to_sql(&entry.recipient_kind)?)
        .bind(&entry.subject)
        .bind(to_sql(&entry.event)?)
        .bind(entry.related_report.map(|r| r.0 as i64))
        .bind(entry.sent_at)
        .bind(to_sql(&entry.status)?)
        .bind(&entry.error_message)
        .execute(&self.pool)
        .await
        .map_err(DbError::from)?;
        Ok(())
    }

    async fn list_emails(&self, limit: usize) -> FloodResult<Vec<EmailLogEntry>> {
        let rows = sqlx::query_as::<_, EmailRow>(
            "SELECT * FROM email_log ORDER BY email_id DESC LIMIT ?",
        )
        .bind(limit_param(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::from)?;

        Ok(rows
            .into_iter()
            .map(EmailRow::into_record)
            .collect::<DbResult<_>>()?)
    }

    async fn prune_emails(&self, cutoff: DateTime<Utc>) -> FloodResult<u64> {
        let result = sqlx::query("DELETE FROM email_log WHERE sent_at < ?")
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(DbError::from)?;
        Ok(result.rows_affected())
    }
}

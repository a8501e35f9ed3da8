//! SQLite schema for the Flood Watch store
//!
//! Statements are idempotent and run on every open. Enum columns hold the
//! serde names of the domain enums; nested values (ward geometry, photo
//! metadata, ward lists) are JSON text.

pub const FLOOD_SCHEMA: &[&str] = &[
    // Crowd reports
    r#"CREATE TABLE IF NOT EXISTS reports (
        report_id INTEGER PRIMARY KEY AUTOINCREMENT,
        reporter_id TEXT NOT NULL,
        ward_id INTEGER,
        location TEXT NOT NULL,
        latitude REAL NOT NULL,
        longitude REAL NOT NULL,
        description TEXT NOT NULL,
        photo TEXT,
        status TEXT NOT NULL CHECK (status IN ('Pending', 'Validated', 'Rejected')),
        created_at TEXT NOT NULL,
        upvotes INTEGER NOT NULL DEFAULT 0,
        downvotes INTEGER NOT NULL DEFAULT 0,
        reliability_score REAL NOT NULL
    )"#,
    "CREATE INDEX IF NOT EXISTS idx_reports_status ON reports (status, report_id)",
    // One terminal action per report
    r#"CREATE TABLE IF NOT EXISTS report_actions (
        action_id INTEGER PRIMARY KEY AUTOINCREMENT,
        report_id INTEGER NOT NULL UNIQUE REFERENCES reports (report_id),
        admin_id TEXT NOT NULL,
        decision TEXT NOT NULL CHECK (decision IN ('validate', 'reject')),
        notes TEXT,
        created_at TEXT NOT NULL
    )"#,
    // One vote per user and report; a later vote replaces the earlier one
    r#"CREATE TABLE IF NOT EXISTS report_votes (
        report_id INTEGER NOT NULL REFERENCES reports (report_id),
        user_id TEXT NOT NULL,
        vote TEXT NOT NULL CHECK (vote IN ('up', 'down')),
        voted_at TEXT NOT NULL,
        PRIMARY KEY (report_id, user_id)
    )"#,
    r#"CREATE TABLE IF NOT EXISTS wards (
        ward_id INTEGER PRIMARY KEY,
        name TEXT NOT NULL,
        geometry TEXT NOT NULL,
        current_risk_level TEXT NOT NULL CHECK (current_risk_level IN ('Low', 'Medium', 'High')),
        population INTEGER NOT NULL DEFAULT 0,
        critical_infrastructure INTEGER NOT NULL DEFAULT 0,
        last_updated TEXT NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS alerts (
        alert_id INTEGER PRIMARY KEY AUTOINCREMENT,
        ward_id INTEGER NOT NULL REFERENCES wards (ward_id),
        risk_level TEXT NOT NULL,
        message TEXT NOT NULL,
        issued_at TEXT NOT NULL
    )"#,
    "CREATE INDEX IF NOT EXISTS idx_alerts_ward ON alerts (ward_id, alert_id)",
    r#"CREATE TABLE IF NOT EXISTS flood_events (
        event_id INTEGER PRIMARY KEY,
        name TEXT NOT NULL,
        description TEXT NOT NULL,
        date_occurred TEXT NOT NULL,
        affected_wards TEXT NOT NULL,
        latitude REAL NOT NULL,
        longitude REAL NOT NULL,
        risk_level TEXT NOT NULL,
        estimated_casualties INTEGER NOT NULL DEFAULT 0,
        estimated_displaced INTEGER NOT NULL DEFAULT 0,
        rainfall_mm REAL NOT NULL,
        primary_cause TEXT NOT NULL,
        data_source TEXT NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS ward_year_stats (
        ward_id INTEGER NOT NULL,
        year INTEGER NOT NULL,
        flood_count INTEGER NOT NULL,
        avg_rainfall_mm REAL NOT NULL,
        vulnerability_index REAL NOT NULL,
        flood_risk_score REAL NOT NULL,
        PRIMARY KEY (ward_id, year)
    )"#,
    r#"CREATE TABLE IF NOT EXISTS users (
        user_id TEXT PRIMARY KEY,
        username TEXT NOT NULL,
        email TEXT,
        phone_number TEXT,
        role TEXT NOT NULL CHECK (role IN ('resident', 'authority')),
        is_active INTEGER NOT NULL DEFAULT 1,
        subscribed_wards TEXT NOT NULL DEFAULT '[]',
        created_at TEXT NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS email_log (
        email_id INTEGER PRIMARY KEY AUTOINCREMENT,
        recipient_email TEXT NOT NULL,
        recipient_kind TEXT NOT NULL,
        subject TEXT NOT NULL,
        event TEXT NOT NULL,
        related_report INTEGER,
        sent_at TEXT NOT NULL,
        status TEXT NOT NULL,
        error_message TEXT NOT NULL DEFAULT ''
    )"#,
    "CREATE INDEX IF NOT EXISTS idx_email_log_sent ON email_log (sent_at)",
];

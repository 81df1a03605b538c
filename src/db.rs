use std::path::Path;

use anyhow::Context;
use serde::de::DeserializeOwned;
use sqlx::{PgPool, Row};
use tracing::debug;
use uuid::Uuid;

use crate::models::{
    DesignationCount, EnrollmentRecord, FeedbackRecord, LoginEvent, RowSets, School,
    SchoolCpdTotal, WorkshopRecord,
};

pub async fn fetch_school(pool: &PgPool, school_id: Uuid) -> anyhow::Result<Option<School>> {
    let row = sqlx::query("SELECT id, name, email, mobile, is_active FROM schools WHERE id = $1")
        .bind(school_id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch school details")?;

    Ok(row.map(|row| School {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        mobile: row.get("mobile"),
        is_active: row.get("is_active"),
    }))
}

/// Fetch every row set the aggregator needs for one school. Any fetch error
/// fails the whole call; no partial results are returned.
pub async fn fetch_rowsets(pool: &PgPool, school_id: Uuid, year: i32) -> anyhow::Result<RowSets> {
    let total_teachers = fetch_teacher_count(pool, school_id).await?;
    let workshops = fetch_workshops(pool, school_id).await?;
    let enrollments = fetch_enrollments(pool, school_id).await?;
    let logins = fetch_logins(pool, school_id, year).await?;
    let feedback = fetch_feedback(pool, school_id).await?;
    let demographics = fetch_demographics(pool, school_id).await?;
    let school_totals = fetch_school_cpd_totals(pool).await?;

    debug!(
        %school_id,
        enrollments = enrollments.len(),
        workshops = workshops.len(),
        logins = logins.len(),
        "row sets fetched"
    );

    Ok(RowSets {
        total_teachers,
        enrollments,
        workshops,
        logins,
        feedback,
        demographics,
        school_totals,
    })
}

async fn fetch_teacher_count(pool: &PgPool, school_id: Uuid) -> anyhow::Result<i64> {
    let row = sqlx::query("SELECT COUNT(*) AS count FROM users WHERE school_id = $1")
        .bind(school_id)
        .fetch_one(pool)
        .await
        .context("failed to count teachers")?;
    Ok(row.get("count"))
}

async fn fetch_workshops(pool: &PgPool, school_id: Uuid) -> anyhow::Result<Vec<WorkshopRecord>> {
    let rows = sqlx::query(
        "SELECT DISTINCT w.id, w.name, w.duration, w.start_date, c.name AS category \
         FROM workshops w \
         LEFT JOIN categories c ON w.category_id = c.id \
         WHERE w.id IN (SELECT workshop_id FROM payments WHERE school_id = $1) \
         ORDER BY w.start_date DESC",
    )
    .bind(school_id)
    .fetch_all(pool)
    .await
    .context("failed to fetch workshops")?;

    Ok(rows
        .into_iter()
        .map(|row| WorkshopRecord {
            id: row.get("id"),
            name: row.get("name"),
            duration: row.get("duration"),
            start_date: row.get("start_date"),
            category: row.get("category"),
        })
        .collect())
}

async fn fetch_enrollments(
    pool: &PgPool,
    school_id: Uuid,
) -> anyhow::Result<Vec<EnrollmentRecord>> {
    let rows = sqlx::query(
        "SELECT p.user_id, u.name AS user_name, p.workshop_id, w.name AS workshop_name, \
         p.is_attended, COALESCE(p.attended_duration, 0) AS attended_minutes, \
         COALESCE(p.cpd, 0)::float8 AS earned_cpd, p.created_at, \
         w.duration AS workshop_duration, w.start_date AS workshop_start, \
         c.name AS category \
         FROM payments p \
         JOIN users u ON p.user_id = u.id \
         JOIN workshops w ON p.workshop_id = w.id \
         LEFT JOIN categories c ON w.category_id = c.id \
         WHERE p.school_id = $1",
    )
    .bind(school_id)
    .fetch_all(pool)
    .await
    .context("failed to fetch enrollments")?;

    Ok(rows
        .into_iter()
        .map(|row| EnrollmentRecord {
            user_id: row.get("user_id"),
            user_name: row.get("user_name"),
            workshop_id: row.get("workshop_id"),
            workshop_name: row.get("workshop_name"),
            attended: row.get("is_attended"),
            attended_minutes: row.get("attended_minutes"),
            earned_cpd: row.get("earned_cpd"),
            created_at: row.get("created_at"),
            workshop_duration: row.get("workshop_duration"),
            workshop_start: row.get("workshop_start"),
            category: row.get("category"),
        })
        .collect())
}

async fn fetch_logins(
    pool: &PgPool,
    school_id: Uuid,
    year: i32,
) -> anyhow::Result<Vec<LoginEvent>> {
    let rows = sqlx::query(
        "SELECT a.login AS login_at \
         FROM attendees a \
         JOIN users u ON a.user_id = u.id \
         WHERE u.school_id = $1 AND EXTRACT(YEAR FROM a.login)::int = $2",
    )
    .bind(school_id)
    .bind(year)
    .fetch_all(pool)
    .await
    .context("failed to fetch login activity")?;

    Ok(rows
        .into_iter()
        .map(|row| LoginEvent {
            login_at: row.get("login_at"),
        })
        .collect())
}

async fn fetch_feedback(pool: &PgPool, school_id: Uuid) -> anyhow::Result<Vec<FeedbackRecord>> {
    let rows = sqlx::query(
        "SELECT f.workshop_id, f.rating \
         FROM feedback f \
         JOIN users u ON f.user_id = u.id \
         WHERE u.school_id = $1",
    )
    .bind(school_id)
    .fetch_all(pool)
    .await
    .context("failed to fetch feedback")?;

    Ok(rows
        .into_iter()
        .map(|row| FeedbackRecord {
            workshop_id: row.get("workshop_id"),
            rating: row.get("rating"),
        })
        .collect())
}

async fn fetch_demographics(
    pool: &PgPool,
    school_id: Uuid,
) -> anyhow::Result<Vec<DesignationCount>> {
    let rows = sqlx::query(
        "SELECT designation, COUNT(*) AS count \
         FROM users WHERE school_id = $1 \
         GROUP BY designation",
    )
    .bind(school_id)
    .fetch_all(pool)
    .await
    .context("failed to fetch demographics")?;

    Ok(rows
        .into_iter()
        .map(|row| DesignationCount {
            designation: row.get("designation"),
            count: row.get("count"),
        })
        .collect())
}

/// Total earned CPD per school across the whole platform, for ranking.
/// Completion uses the same attended-flag-or-90%-duration rule the aggregator
/// applies, with the 90-minute default for workshops missing a duration.
async fn fetch_school_cpd_totals(pool: &PgPool) -> anyhow::Result<Vec<SchoolCpdTotal>> {
    let rows = sqlx::query(
        "SELECT p.school_id, COALESCE(SUM(p.cpd), 0)::float8 AS total_cpd \
         FROM payments p \
         JOIN workshops w ON p.workshop_id = w.id \
         WHERE p.is_attended \
            OR COALESCE(p.attended_duration, 0) >= 0.9 * COALESCE(w.duration, 90) \
         GROUP BY p.school_id",
    )
    .fetch_all(pool)
    .await
    .context("failed to fetch school CPD totals")?;

    Ok(rows
        .into_iter()
        .map(|row| SchoolCpdTotal {
            school_id: row.get("school_id"),
            total_cpd: row.get("total_cpd"),
        })
        .collect())
}

// ---- CSV fixtures ----
//
// Offline input path: one CSV per row set in a directory. A missing file is an
// empty row set, not an error; a malformed row is a retrieval failure.
//
// Every file must hold the queried school's rows only, exactly as the SQL
// fetches would scope them (school_totals.csv is the one platform-wide set).
// In particular feedback.csv feeds the average rating unfiltered; only the
// star distribution additionally restricts to the school's workshop ids.

pub fn load_school_from_dir(dir: &Path, school_id: Uuid) -> anyhow::Result<Option<School>> {
    let schools: Vec<School> = load_csv(&dir.join("schools.csv"))?;
    Ok(schools.into_iter().find(|s| s.id == school_id))
}

pub fn load_rowsets_from_dir(dir: &Path) -> anyhow::Result<RowSets> {
    let demographics: Vec<DesignationCount> = load_csv(&dir.join("demographics.csv"))?;
    // Designation groups include the null group, so their counts sum to the
    // school's full user count.
    let total_teachers = demographics.iter().map(|d| d.count).sum();

    Ok(RowSets {
        total_teachers,
        enrollments: load_csv(&dir.join("enrollments.csv"))?,
        workshops: load_csv(&dir.join("workshops.csv"))?,
        logins: load_csv(&dir.join("logins.csv"))?,
        feedback: load_csv(&dir.join("feedback.csv"))?,
        demographics,
        school_totals: load_csv(&dir.join("school_totals.csv"))?,
    })
}

fn load_csv<T: DeserializeOwned>(path: &Path) -> anyhow::Result<Vec<T>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;

    let mut rows = Vec::new();
    for result in reader.deserialize::<T>() {
        rows.push(result.with_context(|| format!("invalid row in {}", path.display()))?);
    }
    Ok(rows)
}

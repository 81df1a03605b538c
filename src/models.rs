use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// School details as stored, echoed verbatim into the dashboard document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct School {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub mobile: Option<String>,
    pub is_active: bool,
}

/// One payment/enrollment row joined with its user and workshop.
///
/// Completion is never stored; it is derived from the attended flag and the
/// attended-minutes threshold (see `analytics::is_completed`).
#[derive(Debug, Clone, Deserialize)]
pub struct EnrollmentRecord {
    pub user_id: Uuid,
    pub user_name: String,
    pub workshop_id: Uuid,
    pub workshop_name: String,
    pub attended: bool,
    pub attended_minutes: i32,
    pub earned_cpd: f64,
    pub created_at: Option<NaiveDateTime>,
    pub workshop_duration: Option<i32>,
    pub workshop_start: Option<NaiveDate>,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WorkshopRecord {
    pub id: Uuid,
    pub name: String,
    pub duration: Option<i32>,
    pub start_date: Option<NaiveDate>,
    pub category: Option<String>,
}

/// A login event from the attendance log. Only the timestamp matters to the
/// monthly histogram; events are counted, not visitors.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginEvent {
    pub login_at: NaiveDateTime,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedbackRecord {
    pub workshop_id: Uuid,
    pub rating: i32,
}

/// Pre-grouped designation counts for the school's users.
#[derive(Debug, Clone, Deserialize)]
pub struct DesignationCount {
    pub designation: Option<String>,
    pub count: i64,
}

/// Total earned CPD for one school, across all schools. Used only for ranking.
#[derive(Debug, Clone, Deserialize)]
pub struct SchoolCpdTotal {
    pub school_id: Uuid,
    pub total_cpd: f64,
}

/// All row sets the aggregator consumes for one school.
#[derive(Debug, Clone, Default)]
pub struct RowSets {
    pub total_teachers: i64,
    pub enrollments: Vec<EnrollmentRecord>,
    pub workshops: Vec<WorkshopRecord>,
    pub logins: Vec<LoginEvent>,
    pub feedback: Vec<FeedbackRecord>,
    pub demographics: Vec<DesignationCount>,
    pub school_totals: Vec<SchoolCpdTotal>,
}

// ---- derived document ----

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub school: School,
    pub stats: Stats,
    pub workshops: Vec<WorkshopView>,
    pub charts: Charts,
    #[serde(rename = "topTeachers")]
    pub top_teachers: Vec<TeacherPerformance>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Stats {
    #[serde(rename = "totalTeachers")]
    pub total_teachers: i64,
    #[serde(rename = "activeLearners")]
    pub active_learners: usize,
    #[serde(rename = "totalEnrollments")]
    pub total_enrollments: usize,
    #[serde(rename = "completionRate")]
    pub completion_rate: u32,
    #[serde(rename = "totalCPDEarned")]
    pub total_cpd_earned: i64,
    #[serde(rename = "avgCPDPerTeacher")]
    pub avg_cpd_per_teacher: f64,
    #[serde(rename = "certificatesIssued")]
    pub certificates_issued: usize,
    #[serde(rename = "engagementRate")]
    pub engagement_rate: u32,
    #[serde(rename = "totalLearningHours")]
    pub total_learning_hours: i64,
    #[serde(rename = "totalWorkshops")]
    pub total_workshops: usize,
    #[serde(rename = "avgJoinTime")]
    pub avg_join_time: i64,
    #[serde(rename = "avgRating")]
    pub avg_rating: Option<f64>,
    #[serde(rename = "totalFeedback")]
    pub total_feedback: usize,
    #[serde(rename = "cpdRank")]
    pub cpd_rank: usize,
    #[serde(rename = "totalSchools")]
    pub total_schools: usize,
    #[serde(rename = "statusDistribution")]
    pub status_distribution: StatusDistribution,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusDistribution {
    pub attended: usize,
    pub enrolled: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkshopStatus {
    Active,
    Upcoming,
}

/// A workshop as presented, with the school's earned CPD attached as a new
/// value rather than written back onto the input row.
#[derive(Debug, Clone, Serialize)]
pub struct WorkshopView {
    pub id: Uuid,
    pub name: String,
    pub duration: Option<i32>,
    pub start_date: Option<NaiveDate>,
    pub category: Option<String>,
    pub status: WorkshopStatus,
    pub total_school_cpd: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Charts {
    #[serde(rename = "monthlyActivity")]
    pub monthly_activity: Vec<MonthlyActivityPoint>,
    #[serde(rename = "cpdTrend")]
    pub cpd_trend: Vec<CpdTrendPoint>,
    #[serde(rename = "categoryDistribution")]
    pub category_distribution: Vec<CategoryStat>,
    #[serde(rename = "topWorkshops")]
    pub top_workshops: Vec<WorkshopAttendance>,
    pub demographics: Vec<DemographicSlice>,
    #[serde(rename = "ratingDistribution")]
    pub rating_distribution: Vec<RatingBucket>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthlyActivityPoint {
    pub name: &'static str,
    pub visits: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct CpdTrendPoint {
    pub name: &'static str,
    pub cpd: f64,
    pub monthly: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryStat {
    pub name: String,
    pub count: usize,
    pub completed: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkshopAttendance {
    pub name: String,
    pub attendees: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct TeacherPerformance {
    pub name: String,
    pub completed: usize,
    pub attended: usize,
    pub cpd: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DemographicSlice {
    pub name: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RatingBucket {
    pub name: String,
    pub count: usize,
}

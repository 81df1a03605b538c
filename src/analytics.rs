use std::collections::{HashMap, HashSet};

use chrono::{Datelike, NaiveDate};
use uuid::Uuid;

use crate::models::{
    CategoryStat, Charts, CpdTrendPoint, Dashboard, DemographicSlice, EnrollmentRecord,
    FeedbackRecord, MonthlyActivityPoint, RatingBucket, RowSets, School, SchoolCpdTotal, Stats,
    StatusDistribution, TeacherPerformance, WorkshopAttendance, WorkshopStatus, WorkshopView,
};

/// Workshops without a stored duration are treated as 90 minutes.
pub const DEFAULT_WORKSHOP_MINUTES: i32 = 90;

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// An enrollment counts as completed when the attended flag is set or the
/// learner sat through at least 90% of the workshop duration.
pub fn is_completed(enrollment: &EnrollmentRecord) -> bool {
    let duration = enrollment.workshop_duration.unwrap_or(DEFAULT_WORKSHOP_MINUTES);
    enrollment.attended
        || f64::from(enrollment.attended_minutes) >= f64::from(duration) * 0.9
}

/// Completed or at least joined for some minutes.
pub fn has_participated(enrollment: &EnrollmentRecord) -> bool {
    is_completed(enrollment) || enrollment.attended_minutes > 0
}

/// Build the full dashboard document for one school.
///
/// Pure over its inputs: no row set is mutated and nothing is cached between
/// calls, so this is safe to invoke concurrently for different schools.
/// `year` scopes the login histogram; `today` anchors workshop status.
pub fn build_dashboard(school: School, rows: &RowSets, year: i32, today: NaiveDate) -> Dashboard {
    let total_enrollments = rows.enrollments.len();

    let mut attended_count = 0usize;
    let mut enrolled_count = 0usize;
    let mut total_cpd_earned = 0.0f64;
    let mut total_learning_minutes = 0i64;
    let mut joined_minutes = 0i64;
    let mut attended_sessions = 0usize;
    let mut active_ids: HashSet<Uuid> = HashSet::new();

    for enrollment in &rows.enrollments {
        if has_participated(enrollment) {
            attended_count += 1;
            attended_sessions += 1;
            joined_minutes += i64::from(enrollment.attended_minutes);
            active_ids.insert(enrollment.user_id);
            if is_completed(enrollment) {
                total_cpd_earned += enrollment.earned_cpd;
            }
        } else {
            enrolled_count += 1;
        }
        total_learning_minutes += i64::from(enrollment.attended_minutes);
    }

    let active_learners = active_ids.len();
    let avg_rating = average_rating(&rows.feedback);
    let (cpd_rank, total_schools) = school_rank(&rows.school_totals, school.id);

    let stats = Stats {
        total_teachers: rows.total_teachers,
        active_learners,
        total_enrollments,
        completion_rate: completion_rate(active_learners, rows.total_teachers, avg_rating),
        total_cpd_earned: total_cpd_earned.round() as i64,
        avg_cpd_per_teacher: if rows.total_teachers > 0 {
            round1(total_cpd_earned / rows.total_teachers as f64)
        } else {
            0.0
        },
        certificates_issued: attended_count,
        engagement_rate: ratio_percent(attended_count, total_enrollments),
        total_learning_hours: (total_learning_minutes as f64 / 60.0).round() as i64,
        total_workshops: rows.workshops.len(),
        avg_join_time: if attended_sessions > 0 {
            (joined_minutes as f64 / attended_sessions as f64).round() as i64
        } else {
            0
        },
        avg_rating,
        total_feedback: rows.feedback.len(),
        cpd_rank,
        total_schools,
        status_distribution: StatusDistribution {
            attended: attended_count,
            enrolled: enrolled_count,
        },
    };

    let charts = Charts {
        monthly_activity: monthly_activity(rows, year),
        cpd_trend: cpd_trend(&rows.enrollments),
        category_distribution: category_distribution(&rows.enrollments),
        top_workshops: top_workshops(&rows.enrollments),
        demographics: demographics_chart(rows),
        rating_distribution: rating_distribution(rows),
    };

    Dashboard {
        workshops: workshop_views(rows, today),
        top_teachers: top_teachers(&rows.enrollments),
        school,
        stats,
        charts,
    }
}

/// Composite health score: participation (active learners over teachers)
/// averaged with quality (rating over 5) when a rating exists, participation
/// alone otherwise. Percent, rounded, clamped to 100.
pub fn completion_rate(active_learners: usize, total_teachers: i64, avg_rating: Option<f64>) -> u32 {
    let active_ratio = if total_teachers > 0 {
        active_learners as f64 / total_teachers as f64
    } else {
        0.0
    };
    let score = match avg_rating.filter(|r| *r > 0.0) {
        Some(rating) => (active_ratio + rating / 5.0) / 2.0,
        None => active_ratio,
    };
    ((score * 100.0).round() as u32).min(100)
}

fn average_rating(feedback: &[FeedbackRecord]) -> Option<f64> {
    if feedback.is_empty() {
        return None;
    }
    let total: i64 = feedback.iter().map(|f| i64::from(f.rating)).sum();
    Some(round1(total as f64 / feedback.len() as f64))
}

/// Login counts per calendar month of the target year. When the school has no
/// login events at all, fall back to enrollment creation months so the chart
/// still reflects activity.
fn monthly_activity(rows: &RowSets, year: i32) -> Vec<MonthlyActivityPoint> {
    let mut buckets = [0usize; 12];
    let mut any_login = false;

    for login in rows.logins.iter().filter(|l| l.login_at.year() == year) {
        buckets[login.login_at.month0() as usize] += 1;
        any_login = true;
    }
    if !any_login {
        for enrollment in &rows.enrollments {
            if let Some(created) = enrollment.created_at {
                buckets[created.month0() as usize] += 1;
            }
        }
    }

    MONTHS
        .into_iter()
        .zip(buckets)
        .map(|(name, visits)| MonthlyActivityPoint { name, visits })
        .collect()
}

/// Monthly earned CPD for completed enrollments, bucketed by workshop start
/// month and prefix-summed into a running total.
fn cpd_trend(enrollments: &[EnrollmentRecord]) -> Vec<CpdTrendPoint> {
    let mut monthly = [0.0f64; 12];
    for enrollment in enrollments {
        if !is_completed(enrollment) {
            continue;
        }
        if let Some(start) = enrollment.workshop_start {
            monthly[start.month0() as usize] += enrollment.earned_cpd;
        }
    }

    let mut cumulative = 0.0;
    MONTHS
        .into_iter()
        .zip(monthly)
        .map(|(name, cpd)| {
            cumulative += cpd;
            CpdTrendPoint {
                name,
                cpd: cumulative,
                monthly: cpd,
            }
        })
        .collect()
}

fn category_distribution(enrollments: &[EnrollmentRecord]) -> Vec<CategoryStat> {
    let mut order: Vec<CategoryStat> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for enrollment in enrollments {
        let name = enrollment.category.clone().unwrap_or_else(|| "General".to_string());
        let slot = *index.entry(name.clone()).or_insert_with(|| {
            order.push(CategoryStat {
                name,
                count: 0,
                completed: 0,
            });
            order.len() - 1
        });
        order[slot].count += 1;
        if is_completed(enrollment) {
            order[slot].completed += 1;
        }
    }

    order
}

fn top_workshops(enrollments: &[EnrollmentRecord]) -> Vec<WorkshopAttendance> {
    let mut order: Vec<WorkshopAttendance> = Vec::new();
    let mut index: HashMap<Uuid, usize> = HashMap::new();

    for enrollment in enrollments {
        let slot = *index.entry(enrollment.workshop_id).or_insert_with(|| {
            order.push(WorkshopAttendance {
                name: enrollment.workshop_name.clone(),
                attendees: 0,
            });
            order.len() - 1
        });
        if has_participated(enrollment) {
            order[slot].attendees += 1;
        }
    }

    order.sort_by(|a, b| b.attendees.cmp(&a.attendees));
    order.truncate(5);
    order
}

fn top_teachers(enrollments: &[EnrollmentRecord]) -> Vec<TeacherPerformance> {
    let mut order: Vec<TeacherPerformance> = Vec::new();
    let mut index: HashMap<Uuid, usize> = HashMap::new();

    for enrollment in enrollments {
        let slot = *index.entry(enrollment.user_id).or_insert_with(|| {
            order.push(TeacherPerformance {
                name: enrollment.user_name.clone(),
                completed: 0,
                attended: 0,
                cpd: 0.0,
            });
            order.len() - 1
        });
        if is_completed(enrollment) {
            order[slot].completed += 1;
            order[slot].cpd += enrollment.earned_cpd;
        }
        if enrollment.attended_minutes > 0 {
            order[slot].attended += 1;
        }
    }

    order.sort_by(|a, b| b.cpd.partial_cmp(&a.cpd).unwrap_or(std::cmp::Ordering::Equal));
    order.truncate(5);
    order
}

fn demographics_chart(rows: &RowSets) -> Vec<DemographicSlice> {
    let mut slices: Vec<DemographicSlice> = rows
        .demographics
        .iter()
        .map(|d| DemographicSlice {
            name: d.designation.clone().unwrap_or_else(|| "Other".to_string()),
            count: d.count,
        })
        .collect();
    slices.sort_by(|a, b| b.count.cmp(&a.count));
    slices.truncate(5);
    slices
}

/// Counts per star from five down to one, restricted to feedback on the
/// school's own workshops, zero-filled where no feedback exists.
fn rating_distribution(rows: &RowSets) -> Vec<RatingBucket> {
    let workshop_ids: HashSet<Uuid> = rows.workshops.iter().map(|w| w.id).collect();
    (1..=5)
        .rev()
        .map(|star| RatingBucket {
            name: format!("{star} Star"),
            count: rows
                .feedback
                .iter()
                .filter(|f| f.rating == star && workshop_ids.contains(&f.workshop_id))
                .count(),
        })
        .collect()
}

fn workshop_views(rows: &RowSets, today: NaiveDate) -> Vec<WorkshopView> {
    let mut cpd_by_workshop: HashMap<Uuid, f64> = HashMap::new();
    for enrollment in &rows.enrollments {
        if is_completed(enrollment) && enrollment.earned_cpd > 0.0 {
            *cpd_by_workshop.entry(enrollment.workshop_id).or_insert(0.0) +=
                enrollment.earned_cpd;
        }
    }

    rows.workshops
        .iter()
        .map(|w| WorkshopView {
            id: w.id,
            name: w.name.clone(),
            duration: w.duration,
            start_date: w.start_date,
            category: w.category.clone(),
            status: match w.start_date {
                Some(start) if start > today => WorkshopStatus::Upcoming,
                _ => WorkshopStatus::Active,
            },
            total_school_cpd: cpd_by_workshop.get(&w.id).copied().unwrap_or(0.0),
        })
        .collect()
}

/// 1-based rank by total earned CPD, descending. Schools with zero credit rank
/// after every ranked school; an empty field ranks the school 1 of 1.
///
/// A school with no completed enrollments never appears in `totals`, so the
/// school count includes it explicitly in that case to keep rank within range.
pub fn school_rank(totals: &[SchoolCpdTotal], school_id: Uuid) -> (usize, usize) {
    let mut ranked: Vec<&SchoolCpdTotal> =
        totals.iter().filter(|t| t.total_cpd > 0.0).collect();
    ranked.sort_by(|a, b| {
        b.total_cpd
            .partial_cmp(&a.total_cpd)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let total_schools = if totals.iter().any(|t| t.school_id == school_id) {
        totals.len()
    } else {
        totals.len() + 1
    };
    match ranked.iter().position(|t| t.school_id == school_id) {
        Some(position) => (position + 1, total_schools),
        None => (ranked.len() + 1, total_schools),
    }
}

fn ratio_percent(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 0;
    }
    (part as f64 / whole as f64 * 100.0).round() as u32
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DesignationCount, FeedbackRecord, LoginEvent, WorkshopRecord};
    use chrono::NaiveDateTime;

    fn uid(n: u128) -> Uuid {
        Uuid::from_u128(n)
    }

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn datetime(year: i32, month: u32, day: u32) -> NaiveDateTime {
        date(year, month, day).and_hms_opt(9, 0, 0).unwrap()
    }

    fn sample_school() -> School {
        School {
            id: uid(1),
            name: "Riverside High".to_string(),
            email: Some("office@riverside.example".to_string()),
            mobile: None,
            is_active: true,
        }
    }

    fn enrollment(user: u128, workshop: u128, minutes: i32, attended: bool) -> EnrollmentRecord {
        EnrollmentRecord {
            user_id: uid(user),
            user_name: format!("Teacher {user}"),
            workshop_id: uid(workshop),
            workshop_name: format!("Workshop {workshop}"),
            attended,
            attended_minutes: minutes,
            earned_cpd: 2.0,
            created_at: Some(datetime(2025, 3, 10)),
            workshop_duration: Some(100),
            workshop_start: Some(date(2025, 3, 1)),
            category: None,
        }
    }

    #[test]
    fn empty_inputs_yield_zeroes_and_rank_one_of_one() {
        let dashboard = build_dashboard(
            sample_school(),
            &RowSets::default(),
            2025,
            date(2025, 6, 1),
        );

        assert_eq!(dashboard.stats.total_enrollments, 0);
        assert_eq!(dashboard.stats.active_learners, 0);
        assert_eq!(dashboard.stats.completion_rate, 0);
        assert_eq!(dashboard.stats.total_cpd_earned, 0);
        assert_eq!(dashboard.stats.avg_cpd_per_teacher, 0.0);
        assert_eq!(dashboard.stats.engagement_rate, 0);
        assert_eq!(dashboard.stats.avg_rating, None);
        assert_eq!(dashboard.stats.cpd_rank, 1);
        assert_eq!(dashboard.stats.total_schools, 1);
        assert!(dashboard.top_teachers.is_empty());
        assert!(dashboard.charts.monthly_activity.iter().all(|m| m.visits == 0));
        assert_eq!(dashboard.charts.rating_distribution.len(), 5);
        assert!(dashboard.charts.rating_distribution.iter().all(|b| b.count == 0));
    }

    #[test]
    fn completion_threshold_is_inclusive_at_ninety_percent() {
        assert!(is_completed(&enrollment(1, 1, 90, false)));
        assert!(!is_completed(&enrollment(1, 1, 89, false)));
        assert!(is_completed(&enrollment(1, 1, 0, true)));
    }

    #[test]
    fn missing_duration_defaults_to_ninety_minutes() {
        let mut short = enrollment(1, 1, 81, false);
        short.workshop_duration = None;
        assert!(is_completed(&short));

        let mut too_short = enrollment(1, 1, 80, false);
        too_short.workshop_duration = None;
        assert!(!is_completed(&too_short));
    }

    #[test]
    fn completion_rate_matches_composite_worked_example() {
        // 10 teachers, 4 active, avg rating 4.0 -> ((0.4 + 0.8) / 2) * 100 = 60
        assert_eq!(completion_rate(4, 10, Some(4.0)), 60);
    }

    #[test]
    fn completion_rate_without_rating_is_participation_only() {
        assert_eq!(completion_rate(4, 10, None), 40);
        assert_eq!(completion_rate(4, 0, None), 0);
    }

    #[test]
    fn completion_rate_is_clamped_to_one_hundred() {
        assert_eq!(completion_rate(30, 10, Some(5.0)), 100);
    }

    #[test]
    fn active_learners_are_distinct_participants() {
        let rows = RowSets {
            total_teachers: 10,
            enrollments: vec![
                enrollment(1, 1, 95, false),
                enrollment(1, 2, 10, false),
                enrollment(2, 1, 0, true),
                enrollment(3, 1, 0, false),
            ],
            ..RowSets::default()
        };
        let dashboard = build_dashboard(sample_school(), &rows, 2025, date(2025, 6, 1));

        assert_eq!(dashboard.stats.active_learners, 2);
        assert_eq!(dashboard.stats.total_enrollments, 4);
        assert_eq!(dashboard.stats.status_distribution.attended, 3);
        assert_eq!(dashboard.stats.status_distribution.enrolled, 1);
        // 3 of 4 enrollments attended -> 75%
        assert_eq!(dashboard.stats.engagement_rate, 75);
    }

    #[test]
    fn cpd_is_earned_for_completed_enrollments_only() {
        let rows = RowSets {
            total_teachers: 4,
            enrollments: vec![
                enrollment(1, 1, 95, false),
                enrollment(2, 1, 0, true),
                enrollment(3, 1, 50, false),
            ],
            ..RowSets::default()
        };
        let dashboard = build_dashboard(sample_school(), &rows, 2025, date(2025, 6, 1));

        assert_eq!(dashboard.stats.total_cpd_earned, 4);
        assert_eq!(dashboard.stats.avg_cpd_per_teacher, 1.0);
    }

    #[test]
    fn monthly_buckets_conserve_login_count() {
        let rows = RowSets {
            logins: vec![
                LoginEvent { login_at: datetime(2025, 1, 5) },
                LoginEvent { login_at: datetime(2025, 1, 20) },
                LoginEvent { login_at: datetime(2025, 7, 3) },
                LoginEvent { login_at: datetime(2024, 12, 31) },
            ],
            ..RowSets::default()
        };
        let dashboard = build_dashboard(sample_school(), &rows, 2025, date(2025, 6, 1));

        let total: usize = dashboard.charts.monthly_activity.iter().map(|m| m.visits).sum();
        assert_eq!(total, 3);
        assert_eq!(dashboard.charts.monthly_activity[0].visits, 2);
        assert_eq!(dashboard.charts.monthly_activity[6].visits, 1);
    }

    #[test]
    fn monthly_activity_falls_back_to_enrollment_months() {
        let mut spring = enrollment(1, 1, 0, false);
        spring.created_at = Some(datetime(2025, 4, 2));
        let mut autumn = enrollment(2, 1, 0, false);
        autumn.created_at = Some(datetime(2025, 10, 9));

        let rows = RowSets {
            enrollments: vec![spring, autumn],
            ..RowSets::default()
        };
        let dashboard = build_dashboard(sample_school(), &rows, 2025, date(2025, 6, 1));

        assert_eq!(dashboard.charts.monthly_activity[3].visits, 1);
        assert_eq!(dashboard.charts.monthly_activity[9].visits, 1);
        let total: usize = dashboard.charts.monthly_activity.iter().map(|m| m.visits).sum();
        assert_eq!(total, 2);
    }

    #[test]
    fn cpd_trend_is_cumulative_and_nondecreasing() {
        let mut january = enrollment(1, 1, 0, true);
        january.workshop_start = Some(date(2025, 1, 15));
        january.earned_cpd = 3.0;
        let mut june = enrollment(2, 2, 0, true);
        june.workshop_start = Some(date(2025, 6, 15));
        june.earned_cpd = 2.0;
        let mut skipped = enrollment(3, 3, 10, false);
        skipped.workshop_start = Some(date(2025, 2, 1));

        let rows = RowSets {
            enrollments: vec![january, june, skipped],
            ..RowSets::default()
        };
        let dashboard = build_dashboard(sample_school(), &rows, 2025, date(2025, 6, 1));
        let trend = &dashboard.charts.cpd_trend;

        assert_eq!(trend[0].cpd, 3.0);
        assert_eq!(trend[5].cpd, 5.0);
        assert_eq!(trend[11].cpd, 5.0);
        assert_eq!(trend[5].monthly, 2.0);
        for window in trend.windows(2) {
            assert!(window[1].cpd >= window[0].cpd);
        }
    }

    #[test]
    fn categories_default_to_general_and_count_completions() {
        let mut maths = enrollment(1, 1, 95, false);
        maths.category = Some("Mathematics".to_string());
        let uncategorized_done = enrollment(2, 2, 0, true);
        let uncategorized_open = enrollment(3, 2, 0, false);

        let rows = RowSets {
            enrollments: vec![maths, uncategorized_done, uncategorized_open],
            ..RowSets::default()
        };
        let dashboard = build_dashboard(sample_school(), &rows, 2025, date(2025, 6, 1));
        let categories = &dashboard.charts.category_distribution;

        assert_eq!(categories.len(), 2);
        let general = categories.iter().find(|c| c.name == "General").unwrap();
        assert_eq!(general.count, 2);
        assert_eq!(general.completed, 1);
        let maths = categories.iter().find(|c| c.name == "Mathematics").unwrap();
        assert_eq!(maths.count, 1);
        assert_eq!(maths.completed, 1);
    }

    #[test]
    fn top_teachers_sorted_by_cpd_and_capped_at_five() {
        let mut enrollments = Vec::new();
        for user in 1..=6u128 {
            let mut e = enrollment(user, 1, 0, true);
            e.earned_cpd = user as f64;
            enrollments.push(e);
        }
        let rows = RowSets {
            enrollments,
            ..RowSets::default()
        };
        let dashboard = build_dashboard(sample_school(), &rows, 2025, date(2025, 6, 1));

        assert_eq!(dashboard.top_teachers.len(), 5);
        assert_eq!(dashboard.top_teachers[0].name, "Teacher 6");
        assert_eq!(dashboard.top_teachers[0].cpd, 6.0);
        assert_eq!(dashboard.top_teachers[4].name, "Teacher 2");
    }

    #[test]
    fn top_workshops_ranked_by_participants() {
        let rows = RowSets {
            enrollments: vec![
                enrollment(1, 1, 95, false),
                enrollment(2, 1, 30, false),
                enrollment(3, 2, 0, true),
                enrollment(4, 3, 0, false),
            ],
            ..RowSets::default()
        };
        let dashboard = build_dashboard(sample_school(), &rows, 2025, date(2025, 6, 1));
        let top = &dashboard.charts.top_workshops;

        assert_eq!(top[0].name, "Workshop 1");
        assert_eq!(top[0].attendees, 2);
        assert_eq!(top[1].attendees, 1);
        // Enrolled-only workshops still appear, with zero attendees.
        assert_eq!(top[2].attendees, 0);
    }

    #[test]
    fn rating_distribution_counts_only_school_workshops() {
        let rows = RowSets {
            workshops: vec![WorkshopRecord {
                id: uid(1),
                name: "Workshop 1".to_string(),
                duration: Some(90),
                start_date: Some(date(2025, 3, 1)),
                category: None,
            }],
            feedback: vec![
                FeedbackRecord { workshop_id: uid(1), rating: 5 },
                FeedbackRecord { workshop_id: uid(1), rating: 5 },
                FeedbackRecord { workshop_id: uid(1), rating: 3 },
                FeedbackRecord { workshop_id: uid(99), rating: 1 },
            ],
            ..RowSets::default()
        };
        let dashboard = build_dashboard(sample_school(), &rows, 2025, date(2025, 6, 1));
        let dist = &dashboard.charts.rating_distribution;

        assert_eq!(dist[0].name, "5 Star");
        assert_eq!(dist[0].count, 2);
        assert_eq!(dist[2].count, 1);
        assert_eq!(dist[4].count, 0);
    }

    #[test]
    fn workshop_status_derives_from_start_date() {
        let rows = RowSets {
            workshops: vec![
                WorkshopRecord {
                    id: uid(1),
                    name: "Past".to_string(),
                    duration: Some(90),
                    start_date: Some(date(2025, 2, 1)),
                    category: None,
                },
                WorkshopRecord {
                    id: uid(2),
                    name: "Future".to_string(),
                    duration: Some(90),
                    start_date: Some(date(2025, 12, 1)),
                    category: None,
                },
            ],
            enrollments: vec![enrollment(1, 1, 95, false)],
            ..RowSets::default()
        };
        let dashboard = build_dashboard(sample_school(), &rows, 2025, date(2025, 6, 1));

        assert_eq!(dashboard.workshops[0].status, WorkshopStatus::Active);
        assert_eq!(dashboard.workshops[1].status, WorkshopStatus::Upcoming);
        assert_eq!(dashboard.workshops[0].total_school_cpd, 2.0);
        assert_eq!(dashboard.workshops[1].total_school_cpd, 0.0);
    }

    #[test]
    fn highest_total_ranks_first() {
        let totals = vec![
            SchoolCpdTotal { school_id: uid(1), total_cpd: 10.0 },
            SchoolCpdTotal { school_id: uid(2), total_cpd: 40.0 },
            SchoolCpdTotal { school_id: uid(3), total_cpd: 25.0 },
        ];
        assert_eq!(school_rank(&totals, uid(2)), (1, 3));
        assert_eq!(school_rank(&totals, uid(3)), (2, 3));
        assert_eq!(school_rank(&totals, uid(1)), (3, 3));
    }

    #[test]
    fn zero_credit_schools_rank_after_ranked_ones() {
        let totals = vec![
            SchoolCpdTotal { school_id: uid(1), total_cpd: 10.0 },
            SchoolCpdTotal { school_id: uid(2), total_cpd: 0.0 },
            SchoolCpdTotal { school_id: uid(3), total_cpd: 5.0 },
        ];
        assert_eq!(school_rank(&totals, uid(2)), (3, 3));
        // A school missing from the field entirely also ranks after, and is
        // added to the school count.
        assert_eq!(school_rank(&totals, uid(9)), (3, 4));
    }

    #[test]
    fn rank_stays_within_school_count_for_school_absent_from_totals() {
        // Schools without a single completed enrollment never appear in the
        // platform totals at all.
        let totals = vec![
            SchoolCpdTotal { school_id: uid(1), total_cpd: 30.0 },
            SchoolCpdTotal { school_id: uid(2), total_cpd: 20.0 },
            SchoolCpdTotal { school_id: uid(3), total_cpd: 10.0 },
        ];
        let (rank, total_schools) = school_rank(&totals, uid(7));
        assert_eq!(rank, 4);
        assert_eq!(total_schools, 4);
        assert!(rank <= total_schools);
    }

    #[test]
    fn demographics_render_other_and_sort_descending() {
        let rows = RowSets {
            demographics: vec![
                DesignationCount { designation: None, count: 2 },
                DesignationCount { designation: Some("Head Teacher".to_string()), count: 7 },
                DesignationCount { designation: Some("Assistant".to_string()), count: 4 },
            ],
            ..RowSets::default()
        };
        let dashboard = build_dashboard(sample_school(), &rows, 2025, date(2025, 6, 1));
        let slices = &dashboard.charts.demographics;

        assert_eq!(slices[0].name, "Head Teacher");
        assert_eq!(slices[1].name, "Assistant");
        assert_eq!(slices[2].name, "Other");
    }

    #[test]
    fn average_rating_rounds_to_one_decimal() {
        let rows = RowSets {
            feedback: vec![
                FeedbackRecord { workshop_id: uid(1), rating: 5 },
                FeedbackRecord { workshop_id: uid(1), rating: 4 },
                FeedbackRecord { workshop_id: uid(1), rating: 4 },
            ],
            ..RowSets::default()
        };
        let dashboard = build_dashboard(sample_school(), &rows, 2025, date(2025, 6, 1));
        assert_eq!(dashboard.stats.avg_rating, Some(4.3));
        assert_eq!(dashboard.stats.total_feedback, 3);
    }
}

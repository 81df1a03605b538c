use std::fmt::Write;

use crate::models::{Dashboard, WorkshopStatus};

/// Render the dashboard document as a markdown report.
pub fn build_report(dashboard: &Dashboard, year: i32) -> String {
    let mut output = String::new();
    let stats = &dashboard.stats;

    let _ = writeln!(output, "# CPD Report: {}", dashboard.school.name);
    let _ = writeln!(
        output,
        "Ranked {} of {} schools by earned CPD ({} activity)",
        stats.cpd_rank, stats.total_schools, year
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Headline");
    let _ = writeln!(output, "- Teachers: {}", stats.total_teachers);
    let _ = writeln!(
        output,
        "- Active learners: {} across {} enrollments",
        stats.active_learners, stats.total_enrollments
    );
    let _ = writeln!(output, "- Completion score: {}%", stats.completion_rate);
    let _ = writeln!(output, "- Engagement: {}%", stats.engagement_rate);
    let _ = writeln!(
        output,
        "- CPD earned: {} ({} per teacher)",
        stats.total_cpd_earned, stats.avg_cpd_per_teacher
    );
    let _ = writeln!(output, "- Learning hours: {}", stats.total_learning_hours);
    match stats.avg_rating {
        Some(rating) => {
            let _ = writeln!(
                output,
                "- Average rating: {:.1} from {} responses",
                rating, stats.total_feedback
            );
        }
        None => {
            let _ = writeln!(output, "- Average rating: no feedback yet");
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Workshops");
    if dashboard.workshops.is_empty() {
        let _ = writeln!(output, "No workshops booked for this school.");
    } else {
        for workshop in dashboard.workshops.iter() {
            let status = match workshop.status {
                WorkshopStatus::Upcoming => "upcoming",
                WorkshopStatus::Active => "active",
            };
            let _ = writeln!(
                output,
                "- {} ({status}): {} CPD earned by this school",
                workshop.name, workshop.total_school_cpd
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Top Teachers");
    if dashboard.top_teachers.is_empty() {
        let _ = writeln!(output, "No teacher activity recorded.");
    } else {
        for teacher in dashboard.top_teachers.iter() {
            let _ = writeln!(
                output,
                "- {}: {} completed, {} attended, {} CPD",
                teacher.name, teacher.completed, teacher.attended, teacher.cpd
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Categories");
    if dashboard.charts.category_distribution.is_empty() {
        let _ = writeln!(output, "No enrollments recorded.");
    } else {
        for category in dashboard.charts.category_distribution.iter() {
            let _ = writeln!(
                output,
                "- {}: {} enrollments, {} completed",
                category.name, category.count, category.completed
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Monthly Activity");
    for point in dashboard.charts.monthly_activity.iter() {
        if point.visits > 0 {
            let _ = writeln!(output, "- {}: {} visits", point.name, point.visits);
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::build_dashboard;
    use crate::models::{RowSets, School};
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn empty_dashboard() -> Dashboard {
        let school = School {
            id: Uuid::nil(),
            name: "Riverside High".to_string(),
            email: None,
            mobile: None,
            is_active: true,
        };
        build_dashboard(
            school,
            &RowSets::default(),
            2025,
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
        )
    }

    #[test]
    fn report_names_the_school_and_rank() {
        let report = build_report(&empty_dashboard(), 2025);
        assert!(report.starts_with("# CPD Report: Riverside High"));
        assert!(report.contains("Ranked 1 of 1 schools"));
    }

    #[test]
    fn report_handles_empty_sections() {
        let report = build_report(&empty_dashboard(), 2025);
        assert!(report.contains("No workshops booked for this school."));
        assert!(report.contains("No teacher activity recorded."));
        assert!(report.contains("no feedback yet"));
    }
}

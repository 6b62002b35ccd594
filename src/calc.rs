use serde::Serialize;
use std::collections::BTreeSet;

use crate::store::{AttendanceStatus, Snapshot, Student};

/// Letter grade with the grade-point value used for SGPA/CGPA.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Grade {
    pub letter: char,
    pub points: i64,
}

/// Step function over closed lower bounds. Percentages above 100 grade as A
/// and below 0 as F by the same bounds; callers get no rounding help.
pub fn grade_from_percentage(pct: f64) -> Grade {
    if pct >= 90.0 {
        Grade { letter: 'A', points: 10 }
    } else if pct >= 80.0 {
        Grade { letter: 'B', points: 9 }
    } else if pct >= 70.0 {
        Grade { letter: 'C', points: 8 }
    } else if pct >= 60.0 {
        Grade { letter: 'D', points: 7 }
    } else {
        Grade { letter: 'F', points: 0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SemesterGpa {
    pub sgpa: f64,
    pub credits: i64,
}

/// Credit-weighted GPA for one semester. Per enrolled course, the student's
/// non-null scores and the matching max scores are summed across the
/// semester's assessments; a course whose summed max is 0 (nothing graded)
/// contributes no credits rather than a failing grade.
pub fn semester_gpa(data: &Snapshot, student_id: &str, semester: &str) -> SemesterGpa {
    let mut total_credits = 0i64;
    let mut total_grade_points = 0i64;

    for course in &data.courses {
        if !data.is_enrolled(&course.id, student_id) {
            continue;
        }
        let mut scored = 0.0f64;
        let mut max = 0.0f64;
        for assessment in data
            .course_assessments(&course.id)
            .iter()
            .filter(|a| a.semester == semester)
        {
            let record = assessment
                .scores
                .iter()
                .find(|r| r.student_id == student_id);
            if let Some(score) = record.and_then(|r| r.score) {
                scored += score;
                max += assessment.max_score;
            }
        }
        if max > 0.0 {
            let grade = grade_from_percentage(scored / max * 100.0);
            total_credits += course.credits;
            total_grade_points += grade.points * course.credits;
        }
    }

    let sgpa = if total_credits > 0 {
        total_grade_points as f64 / total_credits as f64
    } else {
        0.0
    };
    SemesterGpa {
        sgpa,
        credits: total_credits,
    }
}

/// Semesters in which the student has at least one graded score, sorted
/// descending lexicographically (newest label first for the usual
/// "Season YYYY" labels).
pub fn semesters_for_student(data: &Snapshot, student_id: &str) -> Vec<String> {
    let mut semesters: BTreeSet<String> = BTreeSet::new();
    for assessment in data.assessments.values().flat_map(|list| list.iter()) {
        let graded = assessment
            .scores
            .iter()
            .any(|r| r.student_id == student_id && r.score.is_some());
        if graded && !assessment.semester.is_empty() {
            semesters.insert(assessment.semester.clone());
        }
    }
    semesters.into_iter().rev().collect()
}

/// Credit-weighted average of SGPA across the student's graded semesters.
/// The weighted sum makes the result independent of semester order.
pub fn cumulative_gpa(data: &Snapshot, student_id: &str) -> f64 {
    let mut grade_points = 0.0f64;
    let mut credits = 0i64;
    for semester in semesters_for_student(data, student_id) {
        let term = semester_gpa(data, student_id, &semester);
        grade_points += term.sgpa * term.credits as f64;
        credits += term.credits;
    }
    if credits > 0 {
        grade_points / credits as f64
    } else {
        0.0
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CalcError {
    pub code: String,
    pub message: String,
}

impl CalcError {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentView {
    #[serde(flatten)]
    pub student: Student,
    pub cgpa: f64,
}

pub fn student_view(data: &Snapshot, student: &Student) -> StudentView {
    StudentView {
        student: student.clone(),
        cgpa: cumulative_gpa(data, &student.id),
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkSheetCourse {
    pub code: String,
    pub title: String,
    pub credits: i64,
    pub score: f64,
    pub max_score: f64,
    pub grade: Grade,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkSheet {
    pub student: StudentView,
    pub semester: String,
    pub courses: Vec<MarkSheetCourse>,
    pub sgpa: f64,
    pub cgpa: f64,
}

/// Per-course line items for one semester plus the semester SGPA and the
/// overall CGPA. Courses with no assessment in the semester, or with a zero
/// semester-max sum, are omitted entirely.
pub fn generate_mark_sheet(
    data: &Snapshot,
    student_id: &str,
    semester: &str,
) -> Result<MarkSheet, CalcError> {
    let Some(student) = data.student(student_id) else {
        return Err(CalcError::new("not_found", "student not found"));
    };

    let mut courses: Vec<MarkSheetCourse> = Vec::new();
    for course in &data.courses {
        if !data.is_enrolled(&course.id, student_id) {
            continue;
        }
        let in_semester: Vec<_> = data
            .course_assessments(&course.id)
            .iter()
            .filter(|a| a.semester == semester)
            .collect();
        if in_semester.is_empty() {
            continue;
        }
        let mut scored = 0.0f64;
        let mut max = 0.0f64;
        for assessment in in_semester {
            let record = assessment
                .scores
                .iter()
                .find(|r| r.student_id == student_id);
            if let Some(score) = record.and_then(|r| r.score) {
                scored += score;
                max += assessment.max_score;
            }
        }
        if max > 0.0 {
            courses.push(MarkSheetCourse {
                code: course.code.clone(),
                title: course.title.clone(),
                credits: course.credits,
                score: scored,
                max_score: max,
                grade: grade_from_percentage(scored / max * 100.0),
            });
        }
    }

    let term = semester_gpa(data, student_id, semester);
    let cgpa = cumulative_gpa(data, student_id);
    Ok(MarkSheet {
        student: StudentView {
            student: student.clone(),
            cgpa,
        },
        semester: semester.to_string(),
        courses,
        sgpa: term.sgpa,
        cgpa,
    })
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardKpis {
    pub total_students: usize,
    pub total_faculty: usize,
    pub total_courses: usize,
    pub average_cgpa: String,
    pub attendance_rate: String,
    pub students_at_risk: usize,
    pub faculty_load_avg: String,
}

/// CGPA below this marks a student "at risk".
pub const AT_RISK_CGPA: f64 = 7.5;

pub fn dashboard_kpis(data: &Snapshot) -> DashboardKpis {
    let cgpas: Vec<f64> = data
        .students
        .iter()
        .map(|s| cumulative_gpa(data, &s.id))
        .collect();
    let total_students = data.students.len();
    let average_cgpa = if total_students > 0 {
        format!("{:.2}", cgpas.iter().sum::<f64>() / total_students as f64)
    } else {
        "0.00".to_string()
    };

    let mut attended = 0usize;
    let mut recorded = 0usize;
    for by_student in data.attendance.values() {
        for by_date in by_student.values() {
            for status in by_date.values() {
                recorded += 1;
                if status.counts_as_attended() {
                    attended += 1;
                }
            }
        }
    }
    let attendance_rate = if recorded > 0 {
        format!("{:.1}", attended as f64 / recorded as f64 * 100.0)
    } else {
        "0.0".to_string()
    };

    let total_faculty = data.faculty.len();
    let total_courses = data.courses.len();
    let faculty_load_avg = if total_faculty > 0 {
        format!("{:.1}", total_courses as f64 / total_faculty as f64)
    } else {
        "0.0".to_string()
    };

    DashboardKpis {
        total_students,
        total_faculty,
        total_courses,
        average_cgpa,
        attendance_rate,
        students_at_risk: cgpas.iter().filter(|c| **c < AT_RISK_CGPA).count(),
        faculty_load_avg,
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GpaTrendPoint {
    pub semester: String,
    pub avg_gpa: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionBucket {
    pub name: String,
    pub value: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsOverview {
    pub gpa_trend: Vec<GpaTrendPoint>,
    pub grade_distribution: Vec<DistributionBucket>,
    pub attendance_summary: Vec<DistributionBucket>,
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

pub fn analytics_overview(data: &Snapshot) -> AnalyticsOverview {
    // GPA trend: semesters ascending, credit-weighted mean SGPA over every
    // student with nonzero credits that semester. Empty semesters are
    // omitted from the trend, not reported as zero.
    let semesters: BTreeSet<String> = data
        .assessments
        .values()
        .flat_map(|list| list.iter())
        .filter(|a| !a.semester.is_empty())
        .map(|a| a.semester.clone())
        .collect();
    let mut gpa_trend = Vec::new();
    for semester in semesters {
        let mut points = 0.0f64;
        let mut credits = 0i64;
        for student in &data.students {
            let term = semester_gpa(data, &student.id, &semester);
            if term.credits > 0 {
                points += term.sgpa * term.credits as f64;
                credits += term.credits;
            }
        }
        if credits > 0 {
            gpa_trend.push(GpaTrendPoint {
                semester,
                avg_gpa: round2(points / credits as f64),
            });
        }
    }

    // Grade distribution: every graded score across all assessments,
    // independent of semester.
    let mut counts = [0u64; 5];
    for assessment in data.assessments.values().flat_map(|list| list.iter()) {
        for record in &assessment.scores {
            let Some(score) = record.score else { continue };
            let grade = grade_from_percentage(score / assessment.max_score * 100.0);
            let idx = match grade.letter {
                'A' => 0,
                'B' => 1,
                'C' => 2,
                'D' => 3,
                _ => 4,
            };
            counts[idx] += 1;
        }
    }
    let grade_distribution = ['A', 'B', 'C', 'D', 'F']
        .iter()
        .zip(counts.iter())
        .map(|(letter, value)| DistributionBucket {
            name: letter.to_string(),
            value: *value,
        })
        .collect();

    // Attendance distribution tallies Present/Absent/Late only; Excused is
    // not bucketed in this summary.
    let mut present = 0u64;
    let mut absent = 0u64;
    let mut late = 0u64;
    for by_student in data.attendance.values() {
        for by_date in by_student.values() {
            for status in by_date.values() {
                match status {
                    AttendanceStatus::Present => present += 1,
                    AttendanceStatus::Absent => absent += 1,
                    AttendanceStatus::Late => late += 1,
                    AttendanceStatus::Excused => {}
                }
            }
        }
    }
    let attendance_summary = vec![
        DistributionBucket {
            name: "Present".to_string(),
            value: present,
        },
        DistributionBucket {
            name: "Absent".to_string(),
            value: absent,
        },
        DistributionBucket {
            name: "Late".to_string(),
            value: late,
        },
    ];

    AnalyticsOverview {
        gpa_trend,
        grade_distribution,
        attendance_summary,
    }
}

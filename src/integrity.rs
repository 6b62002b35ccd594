use serde::Serialize;

use crate::store::Snapshot;

/// Read-only referential integrity scan. Removal operations deliberately do
/// not cascade into every dependent table (instructor names on courses,
/// attendance cells, score rows), so orphans can accumulate; this report
/// surfaces them without repairing anything.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrityReport {
    /// Courses whose instructor matches no faculty member's name.
    pub dangling_instructors: Vec<DanglingInstructor>,
    /// Enrollment rows referencing a missing course or student.
    pub orphan_enrollments: Vec<OrphanRef>,
    /// Assessment score records for students not enrolled in the course.
    pub orphan_score_records: Vec<OrphanScore>,
    /// Attendance cells referencing a missing course or student.
    pub orphan_attendance: Vec<OrphanRef>,
    /// Users pointing at a missing student or faculty row.
    pub orphan_users: Vec<OrphanUser>,
    pub total_findings: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DanglingInstructor {
    pub course_id: String,
    pub instructor: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrphanRef {
    pub course_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_id: Option<String>,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrphanScore {
    pub course_id: String,
    pub assessment_id: i64,
    pub student_id: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrphanUser {
    pub user_id: i64,
    pub reason: String,
}

pub fn check(data: &Snapshot) -> IntegrityReport {
    let mut report = IntegrityReport::default();

    for course in &data.courses {
        if data.faculty_by_name(&course.instructor).is_none() {
            report.dangling_instructors.push(DanglingInstructor {
                course_id: course.id.clone(),
                instructor: course.instructor.clone(),
            });
        }
    }

    for (course_id, enrolled) in &data.enrollments {
        if data.course(course_id).is_none() {
            report.orphan_enrollments.push(OrphanRef {
                course_id: course_id.clone(),
                student_id: None,
                reason: "enrollment list for unknown course".to_string(),
            });
            continue;
        }
        for student_id in enrolled {
            if data.student(student_id).is_none() {
                report.orphan_enrollments.push(OrphanRef {
                    course_id: course_id.clone(),
                    student_id: Some(student_id.clone()),
                    reason: "enrollment references unknown student".to_string(),
                });
            }
        }
    }

    for (course_id, assessments) in &data.assessments {
        for assessment in assessments {
            for record in &assessment.scores {
                if !data.is_enrolled(course_id, &record.student_id) {
                    report.orphan_score_records.push(OrphanScore {
                        course_id: course_id.clone(),
                        assessment_id: assessment.id,
                        student_id: record.student_id.clone(),
                    });
                }
            }
        }
    }

    for (course_id, by_student) in &data.attendance {
        if data.course(course_id).is_none() {
            report.orphan_attendance.push(OrphanRef {
                course_id: course_id.clone(),
                student_id: None,
                reason: "attendance for unknown course".to_string(),
            });
            continue;
        }
        for student_id in by_student.keys() {
            if data.student(student_id).is_none() {
                report.orphan_attendance.push(OrphanRef {
                    course_id: course_id.clone(),
                    student_id: Some(student_id.clone()),
                    reason: "attendance references unknown student".to_string(),
                });
            }
        }
    }

    for user in &data.users {
        if let Some(student_id) = &user.student_id {
            if data.student(student_id).is_none() {
                report.orphan_users.push(OrphanUser {
                    user_id: user.id,
                    reason: format!("user references unknown student {}", student_id),
                });
            }
        }
        if let Some(faculty_id) = user.faculty_id {
            if data.faculty_by_id(faculty_id).is_none() {
                report.orphan_users.push(OrphanUser {
                    user_id: user.id,
                    reason: format!("user references unknown faculty {}", faculty_id),
                });
            }
        }
    }

    report.total_findings = report.dangling_instructors.len()
        + report.orphan_enrollments.len()
        + report.orphan_score_records.len()
        + report.orphan_attendance.len()
        + report.orphan_users.len();
    report
}

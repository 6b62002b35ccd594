use chrono::{Datelike, Duration, Local, NaiveDate, Weekday};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::BTreeMap;

use crate::store::{
    Assessment, AttendanceStatus, Course, CourseAttendance, Faculty, Role, ScoreRecord, Snapshot,
    Student, User,
};

const DEPARTMENTS: [&str; 4] = [
    "Computer Science",
    "Physics",
    "Mathematics",
    "Electrical Engineering",
];

const FIRST_NAMES: [&str; 20] = [
    "Liam", "Olivia", "Noah", "Emma", "Oliver", "Ava", "Elijah", "Charlotte", "William", "Sophia",
    "James", "Amelia", "Benjamin", "Isabella", "Lucas", "Mia", "Henry", "Evelyn", "Alexander",
    "Harper",
];

const LAST_NAMES: [&str; 20] = [
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis", "Rodriguez",
    "Martinez", "Wilson", "Anderson", "Thomas", "Taylor", "Moore", "Lee", "Clark", "Walker",
    "Young", "King",
];

const TOTAL_STUDENTS: usize = 50;
const COURSES_PER_STUDENT: usize = 5;
const SEMESTERS: [&str; 2] = ["Fall 2023", "Spring 2024"];
const SEMESTER_MONTH_DURATION: i64 = 4;

/// One-time bulk generation of a demo dataset shaped like a small
/// institution: fixed faculty and courses, randomized students,
/// enrollments, partially graded assessments, and weekday attendance over
/// the trailing four months.
pub fn generate() -> Snapshot {
    let mut rng = rand::thread_rng();
    let mut data = Snapshot {
        initialized: true,
        ..Snapshot::default()
    };

    data.faculty = fixed_faculty();
    data.courses = fixed_courses();

    // Students plus mirrored Student-role users. Roll numbers are
    // per-department counters over a two-letter department prefix.
    let mut dept_counters: BTreeMap<&str, usize> = BTreeMap::new();
    let now = Local::now();
    for i in 0..TOTAL_STUDENTS {
        let first = *FIRST_NAMES.choose(&mut rng).unwrap_or(&FIRST_NAMES[0]);
        let last = *LAST_NAMES.choose(&mut rng).unwrap_or(&LAST_NAMES[0]);
        let name = format!("{} {}", first, last);
        let email = format!(
            "{}.{}{}@university.edu",
            first.to_lowercase(),
            last.to_lowercase(),
            i
        );
        let department = *DEPARTMENTS.choose(&mut rng).unwrap_or(&DEPARTMENTS[0]);
        let counter = dept_counters.entry(department).or_insert(0);
        *counter += 1;
        let prefix: String = department
            .chars()
            .filter(|c| c.is_ascii_alphabetic())
            .take(2)
            .collect::<String>()
            .to_uppercase();
        let roll_no = format!("{}-{:03}", prefix, counter);
        let enrollment_year = rng.gen_range(2020..=2023);

        data.students.push(Student {
            id: roll_no.clone(),
            name: name.clone(),
            email: email.clone(),
            department: department.to_string(),
            enrollment_date: format!("{}-08-20", enrollment_year),
        });
        data.users.push(User {
            id: 100 + i as i64,
            name,
            email,
            role: Role::Student,
            last_login: now.to_rfc3339(),
            status: "Active".to_string(),
            student_id: Some(roll_no),
            faculty_id: None,
        });
    }

    // Static admin plus one mirrored user per faculty member.
    data.users.insert(
        0,
        User {
            id: 1,
            name: "Admin User".to_string(),
            email: "admin@university.edu".to_string(),
            role: Role::Admin,
            last_login: now.to_rfc3339(),
            status: "Active".to_string(),
            student_id: None,
            faculty_id: None,
        },
    );
    for (idx, member) in data.faculty.iter().enumerate() {
        data.users.insert(
            1 + idx,
            User {
                id: member.id,
                name: member.name.clone(),
                email: member.email.clone(),
                role: Role::Faculty,
                last_login: now.to_rfc3339(),
                status: "Active".to_string(),
                student_id: None,
                faculty_id: Some(member.id),
            },
        );
    }

    // Enrollments: five distinct courses per student.
    for course in &data.courses {
        data.enrollments.insert(course.id.clone(), Vec::new());
    }
    let course_ids: Vec<String> = data.courses.iter().map(|c| c.id.clone()).collect();
    for student in &data.students {
        let mut picked: Vec<&String> = Vec::new();
        while picked.len() < COURSES_PER_STUDENT.min(course_ids.len()) {
            let candidate = course_ids.choose(&mut rng).unwrap_or(&course_ids[0]);
            if !picked.contains(&candidate) {
                picked.push(candidate);
            }
        }
        for course_id in picked {
            if let Some(list) = data.enrollments.get_mut(course_id) {
                list.push(student.id.clone());
            }
        }
    }

    // Three assessments per course, each tagged with a random semester and
    // one score record per enrolled student (roughly 10% left ungraded).
    let templates: [(&str, &str, f64); 3] = [
        ("Midterm", "Exam", 100.0),
        ("Final", "Exam", 150.0),
        ("Project", "Project", 50.0),
    ];
    let mut next_assessment_id = 1i64;
    for course in &data.courses {
        let enrolled = data
            .enrollments
            .get(&course.id)
            .cloned()
            .unwrap_or_default();
        let mut list = Vec::new();
        for (title, kind, max) in templates {
            let semester = *SEMESTERS.choose(&mut rng).unwrap_or(&SEMESTERS[0]);
            let scores = enrolled
                .iter()
                .map(|student_id| {
                    let name = data
                        .students
                        .iter()
                        .find(|s| &s.id == student_id)
                        .map(|s| s.name.clone())
                        .unwrap_or_default();
                    let score = if rng.gen::<f64>() > 0.1 {
                        Some(rng.gen_range((max * 0.6).floor()..=max).round())
                    } else {
                        None
                    };
                    ScoreRecord {
                        student_id: student_id.clone(),
                        student_name: name,
                        score,
                    }
                })
                .collect();
            list.push(Assessment {
                id: next_assessment_id,
                title: title.to_string(),
                kind: kind.to_string(),
                max_score: max,
                semester: semester.to_string(),
                scores,
            });
            next_assessment_id += 1;
        }
        data.assessments.insert(course.id.clone(), list);
    }

    // Weekday attendance from the start of the semester window to today.
    let today = now.date_naive();
    let mut day = semester_start(today);
    while day <= today {
        if day.weekday() != Weekday::Sat && day.weekday() != Weekday::Sun {
            let date = day.format("%Y-%m-%d").to_string();
            for (course_id, enrolled) in &data.enrollments {
                let by_student = data
                    .attendance
                    .entry(course_id.clone())
                    .or_insert_with(CourseAttendance::new);
                for student_id in enrolled {
                    let roll: f64 = rng.gen();
                    let status = if roll > 0.95 {
                        AttendanceStatus::Absent
                    } else if roll > 0.9 {
                        AttendanceStatus::Late
                    } else {
                        AttendanceStatus::Present
                    };
                    by_student
                        .entry(student_id.clone())
                        .or_default()
                        .insert(date.clone(), status);
                }
            }
        }
        day += Duration::days(1);
    }

    data
}

fn semester_start(today: NaiveDate) -> NaiveDate {
    let mut year = today.year();
    let mut month = today.month() as i64 - (SEMESTER_MONTH_DURATION - 1);
    while month < 1 {
        month += 12;
        year -= 1;
    }
    NaiveDate::from_ymd_opt(year, month as u32, 1).unwrap_or(today)
}

fn fixed_faculty() -> Vec<Faculty> {
    let rows = [
        (2, "Dr. Evelyn Reed", "evelyn.r", "Computer Science", "Professor", "CS-101"),
        (10, "Dr. Robert Chen", "robert.c", "Physics", "Associate Professor", "PHY-205"),
        (11, "Dr. Susan Bones", "susan.b", "Mathematics", "Professor", "MATH-314"),
        (12, "Dr. Alan Grant", "alan.g", "Electrical Engineering", "Professor", "EE-A21"),
        (13, "Dr. Laura Dern", "laura.d", "Computer Science", "Assistant Professor", "CS-112"),
        (14, "Dr. Indiana Jones", "indy.j", "Physics", "Professor", "PHY-111"),
        (15, "Dr. Ellie Sattler", "ellie.s", "Computer Science", "Associate Professor", "CS-222"),
    ];
    rows.into_iter()
        .map(|(id, name, mail, department, title, office)| Faculty {
            id,
            name: name.to_string(),
            email: format!("{}@university.edu", mail),
            department: department.to_string(),
            title: title.to_string(),
            office: office.to_string(),
        })
        .collect()
}

fn fixed_courses() -> Vec<Course> {
    let rows = [
        ("CS101", "Introduction to Programming", "Computer Science", 3, "Dr. Evelyn Reed"),
        ("CS202", "Data Structures", "Computer Science", 4, "Dr. Laura Dern"),
        ("PHY201", "Classical Mechanics", "Physics", 4, "Dr. Robert Chen"),
        ("MATH301", "Abstract Algebra", "Mathematics", 3, "Dr. Susan Bones"),
        ("EE101", "Circuit Theory", "Electrical Engineering", 3, "Dr. Alan Grant"),
        ("EE205", "Digital Logic Design", "Electrical Engineering", 4, "Dr. Alan Grant"),
        ("CS303", "Analysis of Algorithms", "Computer Science", 3, "Dr. Ellie Sattler"),
        ("CS450", "Machine Learning", "Computer Science", 4, "Dr. Evelyn Reed"),
        ("PHY310", "Quantum Mechanics", "Physics", 4, "Dr. Indiana Jones"),
        ("MATH205", "Linear Algebra", "Mathematics", 4, "Dr. Susan Bones"),
        ("EE320", "Signals and Systems", "Electrical Engineering", 3, "Dr. Alan Grant"),
    ];
    rows.into_iter()
        .map(|(code, title, department, credits, instructor)| Course {
            id: code.to_string(),
            title: title.to_string(),
            code: code.to_string(),
            department: department.to_string(),
            credits,
            instructor: instructor.to_string(),
        })
        .collect()
}

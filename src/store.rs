use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const SNAPSHOT_FILE: &str = "campus.json";

/// Semester label stamped onto newly created assessments.
pub const CURRENT_SEMESTER: &str = "Spring 2024";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
    Excused,
}

impl AttendanceStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Present" => Some(Self::Present),
            "Absent" => Some(Self::Absent),
            "Late" => Some(Self::Late),
            "Excused" => Some(Self::Excused),
            _ => None,
        }
    }

    /// Present and Late both count toward attendance rates.
    pub fn counts_as_attended(self) -> bool {
        matches!(self, Self::Present | Self::Late)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Present => "Present",
            Self::Absent => "Absent",
            Self::Late => "Late",
            Self::Excused => "Excused",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Admin,
    Faculty,
    Student,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Faculty {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub department: String,
    pub title: String,
    pub office: String,
}

/// Student identity row. The roll number is the id; CGPA is derived at read
/// time and never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub name: String,
    pub email: String,
    pub department: String,
    pub enrollment_date: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    /// Uppercased course code, unique across the table.
    pub id: String,
    pub title: String,
    pub code: String,
    pub department: String,
    pub credits: i64,
    /// Denormalized faculty name, not an id. Renaming or removing the
    /// faculty member orphans this silently; integrity.check reports it.
    pub instructor: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub last_login: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub faculty_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRecord {
    pub student_id: String,
    pub student_name: String,
    /// None means not yet graded; excluded from every aggregate.
    pub score: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
    pub id: i64,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub max_score: f64,
    pub semester: String,
    pub scores: Vec<ScoreRecord>,
}

/// date (YYYY-MM-DD) -> status
pub type AttendanceByDate = BTreeMap<String, AttendanceStatus>;
/// student id -> dates
pub type CourseAttendance = BTreeMap<String, AttendanceByDate>;

/// The persisted shape: seven named tables plus the initialization flag,
/// written whole on every mutation. No deltas, no versioning.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Snapshot {
    pub initialized: bool,
    pub faculty: Vec<Faculty>,
    pub courses: Vec<Course>,
    pub users: Vec<User>,
    pub students: Vec<Student>,
    pub enrollments: BTreeMap<String, Vec<String>>,
    pub assessments: BTreeMap<String, Vec<Assessment>>,
    pub attendance: BTreeMap<String, CourseAttendance>,
}

pub struct Store {
    path: PathBuf,
    pub data: Snapshot,
}

impl Store {
    /// Opens the snapshot in `workspace`, creating the directory and an
    /// empty initialized snapshot when none exists yet. `seed_demo_data`
    /// only applies to a fresh workspace; an existing snapshot is never
    /// overwritten by generated data.
    pub fn open(workspace: &Path, seed_demo_data: bool) -> anyhow::Result<Store> {
        std::fs::create_dir_all(workspace)
            .with_context(|| format!("failed to create workspace {}", workspace.display()))?;
        let path = workspace.join(SNAPSHOT_FILE);

        if path.is_file() {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read snapshot {}", path.display()))?;
            let data: Snapshot = serde_json::from_str(&raw)
                .with_context(|| format!("snapshot {} is not valid JSON", path.display()))?;
            return Ok(Store { path, data });
        }

        let mut data = if seed_demo_data {
            crate::seed::generate()
        } else {
            Snapshot::default()
        };
        data.initialized = true;
        let store = Store { path, data };
        store.persist()?;
        Ok(store)
    }

    /// Whole-snapshot overwrite via temp file + rename so a crash mid-write
    /// never leaves a torn snapshot behind.
    pub fn persist(&self) -> anyhow::Result<()> {
        let json = serde_json::to_string(&self.data).context("failed to serialize snapshot")?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)
            .with_context(|| format!("failed to write snapshot {}", tmp.display()))?;
        std::fs::rename(&tmp, &self.path)
            .with_context(|| format!("failed to replace snapshot {}", self.path.display()))?;
        Ok(())
    }

    pub fn snapshot_path(&self) -> &Path {
        &self.path
    }
}

impl Snapshot {
    pub fn course(&self, course_id: &str) -> Option<&Course> {
        self.courses.iter().find(|c| c.id == course_id)
    }

    pub fn student(&self, student_id: &str) -> Option<&Student> {
        self.students.iter().find(|s| s.id == student_id)
    }

    pub fn faculty_by_id(&self, faculty_id: i64) -> Option<&Faculty> {
        self.faculty.iter().find(|f| f.id == faculty_id)
    }

    pub fn faculty_by_name(&self, name: &str) -> Option<&Faculty> {
        self.faculty.iter().find(|f| f.name == name)
    }

    pub fn enrolled_students(&self, course_id: &str) -> &[String] {
        self.enrollments
            .get(course_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_enrolled(&self, course_id: &str, student_id: &str) -> bool {
        self.enrolled_students(course_id)
            .iter()
            .any(|s| s == student_id)
    }

    pub fn course_assessments(&self, course_id: &str) -> &[Assessment] {
        self.assessments
            .get(course_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn courses_for_student(&self, student_id: &str) -> Vec<&Course> {
        self.courses
            .iter()
            .filter(|c| self.is_enrolled(&c.id, student_id))
            .collect()
    }

    pub fn courses_for_faculty(&self, faculty_id: i64) -> Vec<&Course> {
        let Some(member) = self.faculty_by_id(faculty_id) else {
            return Vec::new();
        };
        self.courses
            .iter()
            .filter(|c| c.instructor == member.name)
            .collect()
    }

    pub fn find_assessment_mut(&mut self, assessment_id: i64) -> Option<&mut Assessment> {
        self.assessments
            .values_mut()
            .flat_map(|list| list.iter_mut())
            .find(|a| a.id == assessment_id)
    }

    /// New faculty/user ids come from the max of both tables so the mirrored
    /// user row can share the faculty id.
    pub fn next_account_id(&self) -> i64 {
        let max_user = self.users.iter().map(|u| u.id).max().unwrap_or(0);
        let max_faculty = self.faculty.iter().map(|f| f.id).max().unwrap_or(0);
        max_user.max(max_faculty).max(0) + 1
    }

    pub fn next_assessment_id(&self) -> i64 {
        self.assessments
            .values()
            .flat_map(|list| list.iter())
            .map(|a| a.id)
            .max()
            .unwrap_or(0)
            .max(0)
            + 1
    }
}

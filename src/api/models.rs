use serde::{Deserialize, Serialize};
use serde_json::Value;

pub type UserId = i64;

/// A direct message, already normalized at the API boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: i64,
    pub sender_id: UserId,
    pub receiver_id: UserId,
    pub sender_full_name: String,
    pub receiver_full_name: String,
    pub sender_email: String,
    pub receiver_email: String,
    pub message: String,
    pub created_at: String,
}

/// Messages exchanged between the current user and one counterpart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub other_user_id: UserId,
    pub other_user_name: String,
    pub other_user_email: String,
    pub messages: Vec<Message>,
    /// Always 0, the backend exposes no read state.
    pub unread_count: u32,
}

impl Conversation {
    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseEntry {
    pub id: i64,
    pub name: String,
    pub day: String,
    pub duration: String,
    pub teacher_name: String,
    pub department_name: String,
}

/// Payload for `POST /course/create`. `teacher_email` is sent as `teacher.email`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCourse {
    pub name: String,
    pub day: String,
    pub duration: String,
    pub teacher_email: String,
    pub department_name: String,
}

impl NewCourse {
    pub fn to_body(&self) -> Value {
        serde_json::json!({
            "name": self.name,
            "day": self.day,
            "duration": self.duration,
            "teacher": { "email": self.teacher_email },
            "department": { "name": self.department_name },
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: UserId,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub birth_date: Option<String>,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub department_name: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default, alias = "deptId")]
    pub department_id: Option<i64>,
}

impl Profile {
    pub fn display_name(&self) -> String {
        if !self.full_name.is_empty() {
            return self.full_name.clone();
        }
        let joined = format!("{} {}", self.last_name, self.first_name);
        let joined = joined.trim();
        if joined.is_empty() { self.email.clone() } else { joined.to_string() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Role {
    Student,
    Teacher,
    Sysadmin,
    Other(String),
}

impl Role {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim().trim_matches('"');
        let upper = trimmed.to_ascii_uppercase();
        let upper = upper.strip_prefix("ROLE_").unwrap_or(&upper);
        match upper {
            "STUDENT" => Role::Student,
            "TEACHER" => Role::Teacher,
            "SYSADMIN" => Role::Sysadmin,
            _ => Role::Other(trimmed.to_string()),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Student => f.write_str("STUDENT"),
            Role::Teacher => f.write_str("TEACHER"),
            Role::Sysadmin => f.write_str("SYSADMIN"),
            Role::Other(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    pub id: Option<i64>,
    pub name: String,
}

/// A message posted to a whole department.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepartmentMessage {
    pub id: i64,
    pub department_id: Option<i64>,
    pub sender_id: Option<UserId>,
    pub sender_full_name: String,
    pub text: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Grade {
    pub id: i64,
    pub subject: String,
    /// `None` when the backend sent something that is not a number.
    pub value: Option<f64>,
    pub teacher_name: String,
    pub created_at: String,
}

// Wire shapes. The backend omits or renames fields depending on the endpoint,
// so everything is optional here and `normalize_*` below produces the typed records.

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMessage {
    pub id: Option<i64>,
    pub sender_id: Option<UserId>,
    pub receiver_id: Option<UserId>,
    pub sender_full_name: Option<String>,
    pub receiver_full_name: Option<String>,
    pub sender_email: Option<String>,
    pub receiver_email: Option<String>,
    pub message: Option<String>,
    pub created_at: Option<String>,
    #[serde(alias = "departmentId")]
    pub dept_id: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCourse {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub day: Option<String>,
    pub duration: Option<String>,
    pub teacher_name: Option<String>,
    pub department_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSender {
    pub id: Option<UserId>,
    pub full_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDepartmentMessage {
    pub id: Option<i64>,
    pub sender_id: Option<UserId>,
    pub sender: Option<RawSender>,
    pub sender_full_name: Option<String>,
    pub value: Option<String>,
    pub message: Option<String>,
    #[serde(alias = "created_at")]
    pub created_at: Option<String>,
    #[serde(alias = "departmentId")]
    pub dept_id: Option<i64>,
}

/// Lists arrive either bare or wrapped in `{"data": [...]}`; anything else is empty.
pub fn list_items(json: &Value) -> Vec<Value> {
    json.as_array()
        .cloned()
        .or_else(|| json.get("data").and_then(|v| v.as_array()).cloned())
        .unwrap_or_default()
}

/// Direct messages only: department broadcasts and records without both
/// participants are dropped. Department posts are read with
/// [`normalize_department_messages`].
pub fn normalize_messages(json: &Value) -> Vec<Message> {
    let mut out = Vec::new();
    for item in list_items(json) {
        let raw: RawMessage = match serde_json::from_value(item) {
            Ok(r) => r,
            Err(e) => {
                log::warn!("skipping undecodable message record: {e}");
                continue;
            }
        };
        // a zero deptId means no department
        if raw.dept_id.is_some_and(|d| d != 0) {
            continue;
        }
        let (Some(sender_id), Some(receiver_id)) = (raw.sender_id, raw.receiver_id) else {
            log::warn!("skipping message {:?} without sender/receiver id", raw.id);
            continue;
        };
        out.push(Message {
            id: raw.id.unwrap_or_default(),
            sender_id,
            receiver_id,
            sender_full_name: raw.sender_full_name.unwrap_or_default(),
            receiver_full_name: raw.receiver_full_name.unwrap_or_default(),
            sender_email: raw.sender_email.unwrap_or_default(),
            receiver_email: raw.receiver_email.unwrap_or_default(),
            message: raw.message.unwrap_or_default(),
            created_at: raw.created_at.unwrap_or_default(),
        });
    }
    out
}

/// Department posts carry the text in `value` (falling back to `message`) and
/// the sender either flat or nested under `sender`.
pub fn normalize_department_messages(json: &Value) -> Vec<DepartmentMessage> {
    let mut out = Vec::new();
    for item in list_items(json) {
        let raw: RawDepartmentMessage = match serde_json::from_value(item) {
            Ok(r) => r,
            Err(e) => {
                log::warn!("skipping undecodable department message: {e}");
                continue;
            }
        };
        let sender = raw.sender.unwrap_or_default();
        out.push(DepartmentMessage {
            id: raw.id.unwrap_or_default(),
            department_id: raw.dept_id,
            sender_id: raw.sender_id.or(sender.id),
            sender_full_name: raw.sender_full_name.or(sender.full_name).unwrap_or_default(),
            text: raw.value.or(raw.message).unwrap_or_default(),
            created_at: raw.created_at.unwrap_or_default(),
        });
    }
    out
}

fn grade_value(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn str_field<'a>(item: &'a Value, keys: &[&str]) -> Option<&'a str> {
    keys.iter().find_map(|k| item.get(*k).and_then(|v| v.as_str()))
}

/// Grades come as objects with a `value`, or as bare numbers. The subject is a
/// plain string or an object with a `name`, under one of several keys.
pub fn normalize_grades(json: &Value) -> Vec<Grade> {
    list_items(json)
        .iter()
        .map(|g| {
            if !g.is_object() {
                return Grade {
                    id: 0,
                    subject: String::new(),
                    value: grade_value(g),
                    teacher_name: String::new(),
                    created_at: String::new(),
                };
            }
            let subject = str_field(g, &["subjectName", "courseName", "subject", "course"])
                .or_else(|| {
                    ["subject", "course"]
                        .iter()
                        .find_map(|k| g.get(*k).and_then(|v| v.get("name")).and_then(|v| v.as_str()))
                })
                .unwrap_or_default()
                .to_string();
            Grade {
                id: g.get("id").and_then(|v| v.as_i64()).unwrap_or_default(),
                subject,
                value: g.get("value").and_then(grade_value),
                teacher_name: str_field(g, &["teacherName", "teacherFullName"]).unwrap_or_default().to_string(),
                created_at: str_field(g, &["createdAt", "date"]).unwrap_or_default().to_string(),
            }
        })
        .collect()
}

pub fn normalize_courses(json: &Value) -> Vec<CourseEntry> {
    let mut out = Vec::new();
    for item in list_items(json) {
        match serde_json::from_value::<RawCourse>(item) {
            Ok(raw) => out.push(CourseEntry {
                id: raw.id.unwrap_or_default(),
                name: raw.name.unwrap_or_default(),
                day: raw.day.unwrap_or_default(),
                duration: raw.duration.unwrap_or_default().trim().to_string(),
                teacher_name: raw.teacher_name.unwrap_or_default(),
                department_name: raw.department_name.unwrap_or_default(),
            }),
            Err(e) => log::warn!("skipping undecodable course record: {e}"),
        }
    }
    out
}

pub fn normalize_departments(json: &Value) -> Vec<Department> {
    list_items(json)
        .iter()
        .filter_map(|d| match d {
            Value::String(name) => Some(Department { id: None, name: name.clone() }),
            Value::Object(_) => {
                let name = d.get("name").and_then(|v| v.as_str())?.to_string();
                Some(Department { id: d.get("id").and_then(|v| v.as_i64()), name })
            }
            _ => None,
        })
        .collect()
}

/// Teacher lists come back as plain emails or as user objects.
pub fn normalize_emails(json: &Value) -> Vec<String> {
    list_items(json)
        .iter()
        .filter_map(|t| match t {
            Value::String(s) => Some(s.clone()),
            _ => t.get("email").and_then(|v| v.as_str()).map(str::to_string),
        })
        .filter(|s| !s.is_empty())
        .collect()
}

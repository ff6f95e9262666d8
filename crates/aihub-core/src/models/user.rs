use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Session user. One live user at a time, owned by the Identity Store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub is_student: bool,
    pub student_verified: bool,
}

impl User {
    /// Build a freshly registered user with a minted id and a generated
    /// placeholder avatar URL derived from the name.
    pub fn register(name: &str, email: &str, is_student: bool) -> Self {
        Self {
            id: format!("user-{}", Uuid::new_v4()),
            name: name.to_string(),
            email: email.to_string(),
            avatar: Some(placeholder_avatar_url(name)),
            is_student,
            student_verified: is_student,
        }
    }

    pub fn apply(&mut self, patch: UserPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(avatar) = patch.avatar {
            self.avatar = Some(avatar);
        }
        if let Some(is_student) = patch.is_student {
            self.is_student = is_student;
        }
        if let Some(student_verified) = patch.student_verified {
            self.student_verified = student_verified;
        }
    }
}

/// Typed partial update for profile edits. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub avatar: Option<String>,
    pub is_student: Option<bool>,
    pub student_verified: Option<bool>,
}

fn placeholder_avatar_url(name: &str) -> String {
    // Conservative percent-encoding: only alphanumerics pass through.
    let encoded: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_string()
            } else if c == ' ' {
                "%20".to_string()
            } else {
                let mut buf = [0u8; 4];
                c.encode_utf8(&mut buf)
                    .bytes()
                    .map(|b| format!("%{b:02X}"))
                    .collect()
            }
        })
        .collect();
    format!("https://ui-avatars.com/api/?name={encoded}&background=667eea&color=fff")
}

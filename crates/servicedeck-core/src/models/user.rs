use serde::{Deserialize, Serialize};

use crate::utils::format_created_at;

/// A user as stored by the users service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub created_at: String,
}

impl User {
    pub fn created_display(&self) -> String {
        format_created_at(&self.created_at)
    }
}

/// Body of a user creation request. Identifier and timestamp are assigned
/// by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_user_record() {
        let json = r#"{"id": 7, "username": "ada", "email": "ada@example.com", "created_at": "2024-03-01T09:30:00.123456"}"#;
        let user: User = serde_json::from_str(json).expect("Failed to parse user JSON");
        assert_eq!(user.id, 7);
        assert_eq!(user.username, "ada");
        assert_eq!(user.email, "ada@example.com");
    }

    #[test]
    fn test_new_user_has_no_server_fields() {
        let body = serde_json::to_value(NewUser {
            username: "ada".to_string(),
            email: "ada@example.com".to_string(),
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"username": "ada", "email": "ada@example.com"}));
    }
}

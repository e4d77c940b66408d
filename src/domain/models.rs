use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Number of click-points a graphical password must contain.
pub const GRAPHICAL_POINT_COUNT: usize = 4;

/// Simple `local@domain.tld` shape check. Deliberately loose; the store's
/// unique index is the real gatekeeper.
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    // ---
    Regex::new(r"^\w+([.-]?\w+)*@\w+([.-]?\w+)*(\.\w{2,3})+$").expect("email regex is valid")
});

/// Returns true if `email` looks like a plausible address.
pub fn is_valid_email(email: &str) -> bool {
    // ---
    EMAIL_RE.is_match(email)
}

/// Lowercases an email for storage and lookup so uniqueness is
/// case-insensitive.
pub fn normalize_email(email: &str) -> String {
    // ---
    email.trim().to_lowercase()
}

/// A single click coordinate on the reference image, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    // ---
    pub x: i32,
    pub y: i32,
}

/// The graphical factor: which image the user picked and where they clicked.
///
/// `points` has exactly [`GRAPHICAL_POINT_COUNT`] entries once a record is
/// created; registration rejects anything else.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphicalPassword {
    // ---
    pub image_id: String,
    pub points: Vec<Point>,
}

/// Access level for a registered user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    // ---
    User,
    Admin,
}

impl Default for Role {
    // ---
    fn default() -> Self {
        Role::User
    }
}

/// A registered principal and all of their authentication factors.
///
/// `password_hash` never leaves the process: it is skipped during
/// serialization so no handler can leak it by accident. The preference
/// factors are stored in clear; they are low-entropy hints, not secrets.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    // ---
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub color_preference: String,
    pub sport_preference: String,
    pub graphical_password: GraphicalPassword,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl User {
    // ---
    pub fn new(
        name: String,
        email: String,
        password_hash: String,
        color_preference: String,
        sport_preference: String,
        graphical_password: GraphicalPassword,
    ) -> Self {
        // ---
        Self {
            id: Uuid::new_v4(),
            name,
            email,
            password_hash,
            color_preference,
            sport_preference,
            graphical_password,
            role: Role::default(),
            created_at: Utc::now(),
        }
    }
}

/// Listing view of a user that omits the graphical click-points, so admin
/// screens never see another user's secret template.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    // ---
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub color_preference: String,
    pub sport_preference: String,
    pub image_id: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserSummary {
    // ---
    fn from(user: &User) -> Self {
        // ---
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            color_preference: user.color_preference.clone(),
            sport_preference: user.sport_preference.clone(),
            image_id: user.graphical_password.image_id.clone(),
            role: user.role,
            created_at: user.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn email_pattern_accepts_plain_addresses() {
        // ---
        assert!(is_valid_email("alice@example.com"));
        assert!(is_valid_email("a.b-c@mail.example.org"));
    }

    #[test]
    fn email_pattern_rejects_junk() {
        // ---
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("alice@"));
        assert!(!is_valid_email("alice@example"));
    }

    #[test]
    fn normalize_lowercases_and_trims() {
        // ---
        assert_eq!(normalize_email("  Alice@Example.COM "), "alice@example.com");
    }

    #[test]
    fn user_serialization_hides_password_hash() {
        // ---
        let user = User::new(
            "Alice".into(),
            "alice@example.com".into(),
            "$2b$10$abcdefghijklmnopqrstuv".into(),
            "blue".into(),
            "tennis".into(),
            GraphicalPassword {
                image_id: "img-1".into(),
                points: vec![
                    Point { x: 1, y: 2 },
                    Point { x: 3, y: 4 },
                    Point { x: 5, y: 6 },
                    Point { x: 7, y: 8 },
                ],
            },
        );

        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert_eq!(json["colorPreference"], "blue");
        assert_eq!(json["role"], "user");
    }
}

//! Credential verification protocol.
//!
//! The verifier is the state machine behind every login-shaped request:
//! `Start -> EmailLookup -> FactorChecks -> Success | Reject`. Each entry
//! operation checks its factors in a fixed order and short-circuits on the
//! first failure; only `register`, `verify_login`, and `verify_graphical`
//! end in session issuance.
//!
//! The staged flow (color -> sport+password -> graphical) exists so the
//! client can progressively reveal which image to show. Its stages are
//! independently callable and stateless across calls: the client resubmits
//! the email every time and no session exists until the final graphical
//! step succeeds.

use anyhow::anyhow;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::{
    is_valid_email, normalize_email, GraphicalPassword, Point, RepositoryPtr, StoreError, User,
    GRAPHICAL_POINT_COUNT,
};
use crate::graphical::points_match;
use crate::hasher::SecretHasher;
use crate::session::SessionIssuer;

// ============================================================================
// Error taxonomy
// ============================================================================

/// Closed set of rejection kinds the protocol can surface.
///
/// Everything is recovered at the operation boundary and converted to a
/// result value; nothing escapes as a panic. Only genuine infrastructure
/// failures travel inside `Internal`.
#[derive(Debug, Error)]
pub enum AuthError {
    // ---
    /// A required field is missing or empty. The message says which
    /// inputs the operation needs; it is safe to show to the user.
    #[error("{0}")]
    MissingFields(&'static str),

    /// Unknown email, or a failed password/preference factor. The two are
    /// deliberately indistinguishable so the endpoint cannot be used as an
    /// account-enumeration oracle.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The graphical factor was rejected: wrong point count at
    /// registration, or no tolerant match during verification.
    #[error("{0}")]
    InvalidGraphicalPassword(&'static str),

    /// The store's unique email constraint fired during registration.
    #[error("email already exists")]
    DuplicateEmail,

    /// Missing, malformed, tampered, or expired session token.
    #[error("not authorized to access this route")]
    Unauthorized,

    /// Store, hasher, or signer failure. Fatal to the request; logged at
    /// the boundary, never masked.
    #[error("internal server error")]
    Internal(#[source] anyhow::Error),
}

impl From<StoreError> for AuthError {
    // ---
    fn from(err: StoreError) -> Self {
        // ---
        match err {
            StoreError::DuplicateEmail => AuthError::DuplicateEmail,
            StoreError::Backend(e) => AuthError::Internal(e),
        }
    }
}

// ============================================================================
// Operation inputs
// ============================================================================

// Request bodies arrive loosely typed from the wire; every field is an
// Option here and presence is checked exactly once, at the top of each
// operation. An absent and an empty field are treated the same.

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphicalPasswordInput {
    // ---
    pub image_id: Option<String>,
    pub points: Option<Vec<Point>>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterInput {
    // ---
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub color_preference: Option<String>,
    pub sport_preference: Option<String>,
    pub graphical_password: Option<GraphicalPasswordInput>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginInput {
    // ---
    pub email: Option<String>,
    pub password: Option<String>,
    pub graphical_password: Option<GraphicalPasswordInput>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorCheckInput {
    // ---
    pub email: Option<String>,
    pub color_preference: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SportCheckInput {
    // ---
    pub email: Option<String>,
    pub sport_preference: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphicalCheckInput {
    // ---
    pub email: Option<String>,
    pub points: Option<Vec<Point>>,
}

// ============================================================================
// Operation payloads
// ============================================================================

/// Successful terminal outcome: a freshly minted session.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    // ---
    pub token: String,
    pub user_id: Uuid,
}

/// Successful color pre-check. No session is issued.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorCheck {
    // ---
    pub user_id: Uuid,
    pub email: String,
}

/// Successful sport+password check. Carries the image the client must
/// render for the graphical challenge. No session is issued.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SportCheck {
    // ---
    pub image_id: String,
}

// ============================================================================
// Verifier
// ============================================================================

fn require_text(value: Option<String>, msg: &'static str) -> Result<String, AuthError> {
    // ---
    match value {
        Some(s) if !s.trim().is_empty() => Ok(s),
        _ => Err(AuthError::MissingFields(msg)),
    }
}

fn require_points(value: Option<Vec<Point>>, msg: &'static str) -> Result<Vec<Point>, AuthError> {
    // ---
    match value {
        Some(points) if !points.is_empty() => Ok(points),
        _ => Err(AuthError::MissingFields(msg)),
    }
}

/// Orchestrates the multi-factor login and registration protocol.
///
/// All collaborators and tuning values are injected at construction time;
/// the verifier never reads configuration from the environment.
pub struct CredentialVerifier {
    // ---
    repository: RepositoryPtr,
    hasher: SecretHasher,
    sessions: SessionIssuer,
    tolerance: i32,
}

impl CredentialVerifier {
    // ---
    pub fn new(
        repository: RepositoryPtr,
        hasher: SecretHasher,
        sessions: SessionIssuer,
        tolerance: i32,
    ) -> Self {
        // ---
        Self {
            repository,
            hasher,
            sessions,
            tolerance,
        }
    }

    /// Email lookup shared by every verification entry point. An unknown
    /// email rejects exactly like a failed factor.
    async fn lookup(&self, email: &str) -> Result<User, AuthError> {
        // ---
        self.repository
            .find_by_email(&normalize_email(email))
            .await?
            .ok_or(AuthError::InvalidCredentials)
    }

    fn issue_session(&self, user_id: Uuid) -> Result<Session, AuthError> {
        // ---
        let token = self
            .sessions
            .issue(user_id, Utc::now())
            .map_err(|e| AuthError::Internal(anyhow!(e)))?;

        Ok(Session { token, user_id })
    }

    /// Register a new user and log them in.
    ///
    /// Validates presence of every field, enforces the 4-point graphical
    /// template, hashes the password, and inserts atomically; the unique
    /// email constraint is the store's, not ours. On success a session
    /// token is issued immediately.
    pub async fn register(&self, input: RegisterInput) -> Result<Session, AuthError> {
        // ---
        const MSG: &str = "please provide all required fields";

        let name = require_text(input.name, MSG)?;
        let email = require_text(input.email, MSG)?;
        let password = require_text(input.password, MSG)?;
        let color = require_text(input.color_preference, MSG)?;
        let sport = require_text(input.sport_preference, MSG)?;

        let graphical = input.graphical_password.ok_or(AuthError::MissingFields(MSG))?;
        let image_id = require_text(graphical.image_id, MSG)?;
        let points = require_points(graphical.points, MSG)?;

        let email = normalize_email(&email);
        if !is_valid_email(&email) {
            return Err(AuthError::MissingFields("please provide a valid email"));
        }

        if points.len() != GRAPHICAL_POINT_COUNT {
            return Err(AuthError::InvalidGraphicalPassword(
                "please select exactly 4 points for the graphical password",
            ));
        }

        let password_hash = self
            .hasher
            .hash(&password)
            .await
            .map_err(AuthError::Internal)?;

        let user = User::new(
            name,
            email,
            password_hash,
            color,
            sport,
            GraphicalPassword { image_id, points },
        );

        let user = self.repository.insert_user(user).await?;

        tracing::info!(user_id = %user.id, "user registered");
        self.issue_session(user.id)
    }

    /// Single-shot login: password and graphical factors in one call.
    ///
    /// Factor order is fixed: email lookup, password, graphical points.
    /// An unknown email and a wrong password reject identically.
    pub async fn verify_login(&self, input: LoginInput) -> Result<Session, AuthError> {
        // ---
        const MSG: &str = "please provide email, password and graphical password";

        let email = require_text(input.email, MSG)?;
        let password = require_text(input.password, MSG)?;
        let graphical = input.graphical_password.ok_or(AuthError::MissingFields(MSG))?;
        let points = require_points(graphical.points, MSG)?;

        let user = self.lookup(&email).await?;

        if !self.hasher.verify(&password, &user.password_hash).await {
            return Err(AuthError::InvalidCredentials);
        }

        if !points_match(&points, &user.graphical_password.points, self.tolerance) {
            return Err(AuthError::InvalidGraphicalPassword("invalid graphical password"));
        }

        tracing::info!(user_id = %user.id, "login succeeded");
        self.issue_session(user.id)
    }

    /// Staged flow, step 1: color preference pre-check. Never issues a
    /// session; a mismatch is indistinguishable from an unknown email.
    pub async fn verify_color(&self, input: ColorCheckInput) -> Result<ColorCheck, AuthError> {
        // ---
        const MSG: &str = "please provide email and color preference";

        let email = require_text(input.email, MSG)?;
        let color = require_text(input.color_preference, MSG)?;

        let user = self.lookup(&email).await?;

        if user.color_preference != color {
            return Err(AuthError::InvalidCredentials);
        }

        Ok(ColorCheck {
            user_id: user.id,
            email: user.email,
        })
    }

    /// Staged flow, step 2: sport preference plus password.
    ///
    /// Both factors are evaluated before deciding, and either failing
    /// collapses into the same rejection. Success reveals the image id the
    /// client needs for the graphical challenge, but no session.
    pub async fn verify_sport(&self, input: SportCheckInput) -> Result<SportCheck, AuthError> {
        // ---
        const MSG: &str = "please provide all required fields";

        let email = require_text(input.email, MSG)?;
        let sport = require_text(input.sport_preference, MSG)?;
        let password = require_text(input.password, MSG)?;

        let user = self.lookup(&email).await?;

        let sport_ok = user.sport_preference == sport;
        let password_ok = self.hasher.verify(&password, &user.password_hash).await;

        if !(sport_ok && password_ok) {
            return Err(AuthError::InvalidCredentials);
        }

        Ok(SportCheck {
            image_id: user.graphical_password.image_id,
        })
    }

    /// Staged flow, terminal step: graphical points. On success this is
    /// the one staged check that issues a session token.
    pub async fn verify_graphical(&self, input: GraphicalCheckInput) -> Result<Session, AuthError> {
        // ---
        const MSG: &str = "please provide email and graphical password points";

        let email = require_text(input.email, MSG)?;
        let points = require_points(input.points, MSG)?;

        let user = self.lookup(&email).await?;

        if !points_match(&points, &user.graphical_password.points, self.tolerance) {
            return Err(AuthError::InvalidGraphicalPassword("invalid graphical password"));
        }

        tracing::info!(user_id = %user.id, "graphical verification succeeded");
        self.issue_session(user.id)
    }

    /// Authenticate a bearer token back to its user record.
    ///
    /// Invalid, tampered, and expired tokens all reject uniformly, as does
    /// a token whose user has since been deleted.
    pub async fn authenticate(&self, token: &str) -> Result<User, AuthError> {
        // ---
        let user_id = self
            .sessions
            .authenticate(token, Utc::now())
            .map_err(|e| {
                tracing::debug!("token rejected: {e}");
                AuthError::Unauthorized
            })?;

        self.repository
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::Unauthorized)
    }
}

// ============================================================================
// Tests
// ============================================================================

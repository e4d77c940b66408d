use axum::response::IntoResponse;

pub async fn root_handler() -> impl IntoResponse {
    let version = env!("CARGO_PKG_VERSION");
    format!(
        r#"Welcome to the GraphPass API 👋
Version: {version}

Available endpoints:
  - POST   /api/auth/register         - Register with all four factors
  - POST   /api/auth/login            - Single-shot login (password + graphical)
  - POST   /api/auth/verify-color     - Staged flow: color preference check
  - POST   /api/auth/verify-sport     - Staged flow: sport + password check
  - POST   /api/auth/verify-graphical - Staged flow: graphical check, issues token
  - GET    /api/auth/me               - Current user (bearer token)
  - GET    /api/auth/logout           - Acknowledge logout
  - GET    /api/users                 - List users (admin)
  - GET    /api/users/{{id}}            - Fetch a user (admin)
  - DELETE /api/users/{{id}}            - Delete a user (admin)
  - PUT    /api/users/profile         - Update own name/email
  - GET    /api/admin/user-stats      - Aggregate counts (admin)
  - GET    /health                    - Light health check
  - GET    /health?mode=full          - Full health check (includes the store)
  - GET    /metrics                   - Prometheus metrics

This API demonstrates multi-factor authentication with a graphical password,
health checking (including store connectivity), and dynamic version reporting.
"#
    )
}

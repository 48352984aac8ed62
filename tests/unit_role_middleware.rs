use axum::http::StatusCode;
use chrono::Utc;
use xs_website::middleware::auth::AuthUser;
use xs_website::middleware::role::check_role;
use xs_website::xs_auth::{Claims, Role, TokenSubject};

fn create_test_auth_user(role: Role) -> AuthUser {
    AuthUser(Claims::new(TokenSubject::new(7, role), Utc::now()))
}

#[test]
fn test_check_role_exact_match() {
    assert!(check_role(&create_test_auth_user(Role::Admin), Role::Admin).is_ok());
    assert!(check_role(&create_test_auth_user(Role::Employee), Role::Employee).is_ok());
}

#[test]
fn test_check_role_roles_are_disjoint() {
    let err = check_role(&create_test_auth_user(Role::Employee), Role::Admin).unwrap_err();
    assert_eq!(err.status, StatusCode::FORBIDDEN);
    assert_eq!(err.public_message(), "Access denied");

    // ADMIN does not imply EMPLOYEE
    let err = check_role(&create_test_auth_user(Role::Admin), Role::Employee).unwrap_err();
    assert_eq!(err.status, StatusCode::FORBIDDEN);
}

#[test]
fn test_auth_user_accessors() {
    let user = create_test_auth_user(Role::Employee);
    assert_eq!(user.user_id(), 7);
    assert_eq!(user.role(), Role::Employee);
}

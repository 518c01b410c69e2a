pub mod login_attempt_repository;
pub mod session_repository;
pub mod user_repository;

pub mod assessments;
pub mod backup;
pub mod core;
pub mod features;
pub mod profiles;
pub mod ratings;
pub mod reports;
pub mod students;
pub mod taxonomy;

/// Methods that need an authenticated caller. Anything outside this list
/// and the public handlers is an unknown method.
pub fn is_protected(method: &str) -> bool {
    [
        profiles::METHODS,
        students::METHODS,
        assessments::METHODS,
        ratings::METHODS,
        reports::METHODS,
        features::METHODS,
        backup::METHODS,
    ]
    .iter()
    .any(|methods| methods.contains(&method))
}

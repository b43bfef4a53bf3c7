/// Minimal project: one `Auth` group holding `AuthManager.swift`, an empty
/// `Extensions` group, and one sources phase compiling `AuthManager.swift`.
pub(crate) const FIXTURE: &str = include_str!("../../tests/fixtures/minimal.pbxproj");

/// Two targets, each with its own group and sources phase. `Helpers.swift`
/// exists in both groups with different paths.
pub(crate) const TWO_TARGETS: &str = include_str!("../../tests/fixtures/two_targets.pbxproj");

/// Canonical form used for every free-text comparison in the engine:
/// lower-cased, trimmed, internal whitespace runs collapsed to one space.
pub fn normalize(input: &str) -> String {
    input.to_lowercase().split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Quick-fill suggestions offered next to the mood input.
pub const PRESETS: [&str; 5] = [
    "Focusing at work",
    "Midnight driving",
    "Heartbroken",
    "Morning Coffee",
    "Gym session",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_are_submittable() {
        assert!(PRESETS.iter().all(|p| !p.trim().is_empty()));
    }
}

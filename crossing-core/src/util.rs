//! Utilities.
use std::path::{Path, PathBuf};

/// Index of the maximum of `xs`. Ties resolve to the lowest index.
///
/// NaN entries are never selected unless all entries are NaN, in which case
/// `0` is returned.
pub fn argmax(xs: &[f32]) -> usize {
    let mut best = 0;
    let mut best_value = f32::NEG_INFINITY;
    for (i, &x) in xs.iter().enumerate() {
        if x > best_value {
            best = i;
            best_value = x;
        }
    }
    best
}

/// Directory of a parameter snapshot: `<root>/<experiment_id>/weights/<tag>`.
pub fn snapshot_dir(root: impl AsRef<Path>, experiment_id: &str, tag: &str) -> PathBuf {
    root.as_ref()
        .join(experiment_id)
        .join("weights")
        .join(tag)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argmax() {
        assert_eq!(argmax(&[0.1, 0.3]), 1);
        assert_eq!(argmax(&[0.3, 0.3]), 0);
        assert_eq!(argmax(&[f32::NAN, -1.0]), 1);
        assert_eq!(argmax(&[]), 0);
    }

    #[test]
    fn test_snapshot_dir() {
        let p = snapshot_dir("experiments", "global_experiment", "epochs_0_100");
        assert_eq!(
            p,
            PathBuf::from("experiments/global_experiment/weights/epochs_0_100")
        );
    }
}

//! # Shard Naming

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// The default dataset prefix of shard filenames.
pub const DEFAULT_PREFIX: &str = "open_subtitles18";
/// The training tag.
pub const TRAIN_TAG: &str = "train";
/// The development tag.
pub const DEV_TAG: &str = "dev";
/// The default number of training shards.
pub const TRAIN_SHARDS: usize = 100;
/// The default number of development shards.
pub const DEV_SHARDS: usize = 1;

/// Suffix of a shard being written.
pub const INCOMPLETE_SUFFIX: &str = ".incomplete";
/// Suffix of a shard being shuffled.
pub const UNSHUFFLED_SUFFIX: &str = ".unshuffled";

/// Identifies one set of shard files.
///
/// Shard `i` of `n` (1-based) is named ``{prefix}-{tag}-{i:05}-of-{n:05}``.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardSpec {
    /// The dataset identifier.
    pub prefix: String,

    /// The split tag; e.g. [`TRAIN_TAG`].
    pub tag: String,

    /// The number of shards.
    pub num_shards: usize,
}

impl ShardSpec {
    /// Create a spec with the default prefix.
    pub fn new<S: Into<String>>(
        tag: S,
        num_shards: usize,
    ) -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            tag: tag.into(),
            num_shards,
        }
    }

    /// The default training spec.
    pub fn train() -> Self {
        Self::new(TRAIN_TAG, TRAIN_SHARDS)
    }

    /// The default development spec.
    pub fn dev() -> Self {
        Self::new(DEV_TAG, DEV_SHARDS)
    }

    /// Set the dataset prefix.
    pub fn with_prefix<S: Into<String>>(
        self,
        prefix: S,
    ) -> Self {
        Self {
            prefix: prefix.into(),
            ..self
        }
    }

    /// Set the number of shards.
    pub fn with_num_shards(
        self,
        num_shards: usize,
    ) -> Self {
        Self { num_shards, ..self }
    }

    /// The filename of 1-based shard `index`.
    pub fn shard_filename(
        &self,
        index: usize,
    ) -> String {
        format!(
            "{}-{}-{index:05}-of-{:05}",
            self.prefix, self.tag, self.num_shards
        )
    }

    /// The 1-based shard receiving 0-based example `example_index`.
    pub fn shard_for_example(
        &self,
        example_index: usize,
    ) -> usize {
        example_index % self.num_shards + 1
    }

    /// All shard paths under `dir`, in shard order.
    pub fn shard_paths<P: AsRef<Path>>(
        &self,
        dir: P,
    ) -> Vec<PathBuf> {
        (1..=self.num_shards)
            .map(|index| dir.as_ref().join(self.shard_filename(index)))
            .collect()
    }
}

/// Do all `paths` exist?
pub fn all_exist<P: AsRef<Path>>(paths: &[P]) -> bool {
    paths.iter().all(|p| p.as_ref().exists())
}

/// Append `suffix` to the final path component.
pub fn with_suffix<P: AsRef<Path>>(
    path: P,
    suffix: &str,
) -> PathBuf {
    let mut name = path.as_ref().as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shard_filename() {
        let spec = ShardSpec::train();
        assert_eq!(spec.shard_filename(1), "open_subtitles18-train-00001-of-00100");
        assert_eq!(spec.shard_filename(100), "open_subtitles18-train-00100-of-00100");

        let spec = ShardSpec::dev().with_prefix("iwslt");
        assert_eq!(spec.shard_filename(1), "iwslt-dev-00001-of-00001");
    }

    #[test]
    fn test_shard_for_example() {
        let spec = ShardSpec::train();
        assert_eq!(spec.shard_for_example(0), 1);
        assert_eq!(spec.shard_for_example(100), 1);
        assert_eq!(spec.shard_for_example(200), 1);
        assert_eq!(spec.shard_for_example(49), 50);
        assert_eq!(spec.shard_for_example(249), 50);
        assert_eq!(spec.shard_for_example(99), 100);
    }

    #[test]
    fn test_shard_paths() {
        let spec = ShardSpec::new("train", 3).with_prefix("p");
        let paths = spec.shard_paths("/data");
        assert_eq!(
            paths,
            vec![
                PathBuf::from("/data/p-train-00001-of-00003"),
                PathBuf::from("/data/p-train-00002-of-00003"),
                PathBuf::from("/data/p-train-00003-of-00003"),
            ]
        );
    }

    #[test]
    fn test_all_exist() {
        let dir = tempdir::TempDir::new("shard_spec").unwrap();
        let spec = ShardSpec::new("dev", 2);
        let paths = spec.shard_paths(dir.path());

        assert!(!all_exist(&paths));
        std::fs::write(&paths[0], b"").unwrap();
        assert!(!all_exist(&paths));
        std::fs::write(&paths[1], b"").unwrap();
        assert!(all_exist(&paths));
    }

    #[test]
    fn test_with_suffix() {
        assert_eq!(
            with_suffix("/data/x-train-00001-of-00002", INCOMPLETE_SUFFIX),
            PathBuf::from("/data/x-train-00001-of-00002.incomplete")
        );
    }
}

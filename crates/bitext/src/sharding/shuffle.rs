//! # Shard Shuffler
//!
//! Shuffles the records of one finalized shard in memory:
//!
//! 1. rename ``{shard}`` to ``{shard}.unshuffled``;
//! 2. read every record;
//! 3. permute uniformly at random;
//! 4. write the permutation to ``{shard}``;
//! 5. remove ``{shard}.unshuffled``.
//!
//! The final name is absent between steps 1 and 4; if the process dies in
//! that window the records survive under the ``.unshuffled`` name and must
//! be renamed back by hand. No concurrent readers or writers are supported.

use std::{fs, path::Path};

use rand::{Rng, SeedableRng, rngs::StdRng, seq::SliceRandom};

use crate::{
    errors::{BTResult, require_file},
    records::{RecordFileReader, RecordFileWriter},
    sharding::{
        shard_spec::{UNSHUFFLED_SUFFIX, with_suffix},
        shard_writer::PROGRESS_INTERVAL,
    },
};

/// Shuffle the records of `path` with the thread-local rng.
///
/// ## Returns
/// The number of records shuffled.
pub fn shuffle_records<P: AsRef<Path>>(path: P) -> BTResult<usize> {
    shuffle_records_with(path, &mut rand::rng())
}

/// Shuffle the records of `path` with the given rng.
pub fn shuffle_records_with<P, R>(
    path: P,
    rng: &mut R,
) -> BTResult<usize>
where
    P: AsRef<Path>,
    R: Rng + ?Sized,
{
    let path = path.as_ref();
    require_file(path)?;
    log::info!("shuffling records in file {}", path.display());

    let tmp_path = with_suffix(path, UNSHUFFLED_SUFFIX);
    fs::rename(path, &tmp_path)?;

    let mut records = match read_records(&tmp_path) {
        Ok(records) => records,
        Err(e) => {
            log::warn!("restoring {} after failed read", path.display());
            fs::rename(&tmp_path, path)?;
            return Err(e);
        }
    };

    records.shuffle(rng);

    let mut writer = RecordFileWriter::create(path)?;
    for (count, record) in records.iter().enumerate() {
        writer.write_record(record)?;
        if count > 0 && count % PROGRESS_INTERVAL == 0 {
            log::info!("\twriting record: {count}");
        }
    }
    let file = writer.finish()?.into_inner().map_err(|e| e.into_error())?;
    file.sync_all()?;
    drop(file);

    fs::remove_file(&tmp_path)?;

    Ok(records.len())
}

fn read_records(path: &Path) -> BTResult<Vec<Vec<u8>>> {
    let mut records = Vec::new();
    for record in RecordFileReader::open(path)? {
        records.push(record?);
        if records.len() % PROGRESS_INTERVAL == 0 {
            log::info!("\tread: {}", records.len());
        }
    }
    Ok(records)
}

/// A shuffle rng; seeded when `seed` is given, else from the OS.
pub fn shuffle_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_rng(&mut rand::rng()),
    }
}

/// Shuffle every shard in `paths`, in order, with one rng.
///
/// ## Arguments
/// * `paths` - the shard files.
/// * `seed` - optional seed; see [`shuffle_rng`].
///
/// ## Returns
/// The total number of records shuffled.
pub fn shuffle_shards<P: AsRef<Path>>(
    paths: &[P],
    seed: Option<u64>,
) -> BTResult<usize> {
    let mut rng = shuffle_rng(seed);
    let mut total = 0;
    for path in paths {
        total += shuffle_records_with(path, &mut rng)?;
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use tempdir::TempDir;

    use super::*;
    use crate::{errors::BitextError, records::read_all_records};

    fn write_shard(
        path: &Path,
        n: usize,
    ) -> Vec<Vec<u8>> {
        let records: Vec<Vec<u8>> = (0..n).map(|i| format!("record-{i}").into_bytes()).collect();
        let mut writer = RecordFileWriter::create(path).unwrap();
        for record in &records {
            writer.write_record(record).unwrap();
        }
        writer.finish().unwrap();
        records
    }

    #[test]
    fn test_shuffle_preserves_multiset() {
        let dir = TempDir::new("shuffle").unwrap();
        let path = dir.path().join("p-train-00001-of-00001");
        let original = write_shard(&path, 200);

        let mut rng = StdRng::seed_from_u64(17);
        let count = shuffle_records_with(&path, &mut rng).unwrap();
        assert_eq!(count, 200);

        assert!(!with_suffix(&path, UNSHUFFLED_SUFFIX).exists());

        let shuffled = read_all_records(&path).unwrap();
        assert_ne!(shuffled, original);

        let mut a = shuffled.clone();
        let mut b = original.clone();
        a.sort();
        b.sort();
        assert_eq!(a, b);
    }

    #[test]
    fn test_shuffle_deterministic_with_seed() {
        let dir = TempDir::new("shuffle").unwrap();
        let a = dir.path().join("a");
        let b = dir.path().join("b");
        write_shard(&a, 50);
        write_shard(&b, 50);

        shuffle_records_with(&a, &mut StdRng::seed_from_u64(3)).unwrap();
        shuffle_records_with(&b, &mut StdRng::seed_from_u64(3)).unwrap();

        assert_eq!(read_all_records(&a).unwrap(), read_all_records(&b).unwrap());
    }

    #[test]
    fn test_shuffle_shards_seeded() {
        let dir = TempDir::new("shuffle").unwrap();
        let a = [dir.path().join("a1"), dir.path().join("a2")];
        let b = [dir.path().join("b1"), dir.path().join("b2")];
        for path in a.iter().chain(&b) {
            write_shard(path, 40);
        }

        assert_eq!(shuffle_shards(&a, Some(8)).unwrap(), 80);
        assert_eq!(shuffle_shards(&b, Some(8)).unwrap(), 80);
        for (a, b) in a.iter().zip(&b) {
            assert_eq!(read_all_records(a).unwrap(), read_all_records(b).unwrap());
        }
    }

    #[test]
    fn test_shuffle_small_and_empty() {
        let dir = TempDir::new("shuffle").unwrap();
        let empty = dir.path().join("empty");
        let one = dir.path().join("one");
        write_shard(&empty, 0);
        let original = write_shard(&one, 1);

        assert_eq!(shuffle_shards(&[&empty, &one], None).unwrap(), 1);
        assert!(read_all_records(&empty).unwrap().is_empty());
        assert_eq!(read_all_records(&one).unwrap(), original);
    }

    #[test]
    fn test_shuffle_corrupt_restores_shard() {
        let dir = TempDir::new("shuffle").unwrap();
        let path = dir.path().join("p-train-00001-of-00001");
        fs::write(&path, [1u8, 0, 0]).unwrap();

        let err = shuffle_records(&path).unwrap_err();
        assert!(matches!(err, BitextError::CorruptRecord(_)));

        assert!(path.exists());
        assert!(!with_suffix(&path, UNSHUFFLED_SUFFIX).exists());
        assert_eq!(fs::read(&path).unwrap(), vec![1u8, 0, 0]);
    }

    #[test]
    fn test_shuffle_missing() {
        let dir = TempDir::new("shuffle").unwrap();
        let err = shuffle_records(dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, BitextError::MissingFile { .. }));
    }
}

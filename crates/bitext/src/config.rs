//! # Option Persistence
//!
//! Option structs are plain ``serde`` types; these helpers save and load
//! them as pretty-printed JSON next to the data they describe.

use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path,
};

use serde::{Serialize, de::DeserializeOwned};

use crate::errors::{BTResult, require_file};

/// Load options from a JSON file.
pub fn load_json_path<C, P>(path: P) -> BTResult<C>
where
    C: DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    require_file(path)?;
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

/// Save options to a JSON file.
pub fn save_json_path<C, P>(
    config: &C,
    path: P,
) -> BTResult<()>
where
    C: Serialize,
    P: AsRef<Path>,
{
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, config)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sharding::ShardSpec;

    #[test]
    fn test_save_load() {
        let dir = tempdir::TempDir::new("config").unwrap();
        let path = dir.path().join("spec.json");

        let spec = ShardSpec::train().with_prefix("iwslt18");
        save_json_path(&spec, &path).unwrap();
        let loaded: ShardSpec = load_json_path(&path).unwrap();
        assert_eq!(loaded, spec);
    }
}

//! Layout coordinate files (`sample_id\tx\ty`)

use std::path::Path;

use ndarray::Array2;

use crate::error::{CompendiumError, Result};
use crate::layout::Layout;

/// Write layout coordinates as TSV
pub fn write_layout<P: AsRef<Path>>(path: P, layout: &Layout) -> Result<()> {
    let mut writer = csv::WriterBuilder::new().delimiter(b'\t').from_path(path)?;
    writer.write_record(["sample_id", "x", "y"])?;
    for (i, id) in layout.sample_ids().iter().enumerate() {
        let (x, y) = layout.point(i);
        writer.write_record([id.clone(), x.to_string(), y.to_string()])?;
    }
    writer.flush()?;
    Ok(())
}

/// Read layout coordinates written by [`write_layout`]
pub fn read_layout<P: AsRef<Path>>(path: P) -> Result<Layout> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .trim(csv::Trim::All)
        .from_path(path)?;

    let mut sample_ids = Vec::new();
    let mut data = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.len() != 3 {
            return Err(CompendiumError::InvalidInput {
                reason: format!("layout row has {} columns, expected 3", record.len()),
            });
        }
        sample_ids.push(record[0].to_string());
        for field in record.iter().skip(1) {
            let v = field.parse::<f64>().map_err(|_| CompendiumError::InvalidInput {
                reason: format!("Invalid coordinate: {}", field),
            })?;
            data.push(v);
        }
    }

    let coords = Array2::from_shape_vec((sample_ids.len(), 2), data).map_err(|e| {
        CompendiumError::InvalidInput {
            reason: e.to_string(),
        }
    })?;
    Layout::new(sample_ids, coords)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use tempfile::tempdir;

    #[test]
    fn test_layout_file_round_trip() {
        let layout = Layout::new(
            vec!["s1".to_string(), "s2".to_string()],
            array![[0.5, -1.25], [3.0, 4.0]],
        )
        .unwrap();
        let dir = tempdir().unwrap();
        let path = dir.path().join("layout.tsv");
        write_layout(&path, &layout).unwrap();

        assert_eq!(read_layout(&path).unwrap(), layout);
    }
}

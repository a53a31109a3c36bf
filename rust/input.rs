use std::io::Read;
use std::path::Path;

use serde::de::DeserializeOwned;

use crate::error::InputError;

/// Reads a JSON array of scraper records. `-` reads standard input.
pub fn load_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, InputError> {
    let read_err = |source| InputError::Read {
        path: path.to_path_buf(),
        source,
    };

    let text = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf).map_err(read_err)?;
        buf
    } else {
        std::fs::read_to_string(path).map_err(read_err)?
    };

    let records = serde_json::from_str(&text).map_err(|source| InputError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(records)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;
    use crate::models::{AttendanceRecord, DeadlineRecord};

    #[test]
    fn optional_fields_default() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("deadlines.json");
        fs::write(
            &path,
            r#"[
                {"subject": "Operating Systems", "due": "24 July 2025"},
                {"subject": "Computer Networks", "assignment": "Lab Task 3", "due": "1 August 2025", "submitted": true, "extended": true}
            ]"#,
        )
        .unwrap();

        let records: Vec<DeadlineRecord> = load_records(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].assignment, "");
        assert!(!records[0].submitted && !records[0].extended);
        assert_eq!(records[1].assignment, "Lab Task 3");
        assert!(records[1].submitted && records[1].extended);
    }

    #[test]
    fn attendance_records() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("attendance.json");
        fs::write(&path, r#"[{"subject": "Physics Lab", "credits": 1, "absences": 3.0}]"#).unwrap();
        let records: Vec<AttendanceRecord> = load_records(&path).unwrap();
        assert_eq!(records[0].credits, 1.0);
    }

    #[test]
    fn missing_file_and_bad_json() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope.json");
        assert!(matches!(
            load_records::<DeadlineRecord>(&missing),
            Err(InputError::Read { .. })
        ));

        let bad = dir.path().join("bad.json");
        fs::write(&bad, r#"[{"due": "24 July 2025"}]"#).unwrap();
        assert!(matches!(
            load_records::<DeadlineRecord>(&bad),
            Err(InputError::Decode { .. })
        ));
    }
}

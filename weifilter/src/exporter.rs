use std::collections::HashMap;

use bytes::Bytes;
use itertools::Itertools;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{FilteredUserEntry, UserProfile};

pub const EXPORT_HEADER: [&str; 16] = [
    "UID",
    "Screen Name",
    "Gender",
    "Location",
    "Statuses Count",
    "Followers Count",
    "Friends Count",
    "User Type",
    "Is Star",
    "Is Mute User",
    "Verified",
    "Verified Type",
    "Mbrank",
    "Mbtype",
    "Description",
    "SVIP",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CsvDialect {
    /// RFC 4180: fields holding a comma, quote or line break are quoted.
    #[default]
    Quoted,
    /// Plain comma join without any escaping.
    Naive,
}

/// One output row: a list entry joined with its profile.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportRecord {
    pub uid: String,
    pub screen_name: String,
    pub profile: UserProfile,
}

fn cell<T: ToString>(value: &Option<T>) -> String {
    value.as_ref().map(ToString::to_string).unwrap_or_default()
}

impl ExportRecord {
    pub fn new(entry: &FilteredUserEntry, profile: Option<&UserProfile>) -> Self {
        Self {
            uid: entry.uid.clone(),
            screen_name: entry.screen_name.clone(),
            profile: profile.cloned().unwrap_or_default(),
        }
    }

    /// Cells in [`EXPORT_HEADER`] order.
    pub fn fields(&self) -> [String; 16] {
        let p = &self.profile;
        [
            self.uid.clone(),
            self.screen_name.clone(),
            cell(&p.gender),
            cell(&p.location),
            cell(&p.statuses_count),
            cell(&p.followers_count),
            cell(&p.friends_count),
            cell(&p.user_type),
            cell(&p.is_star),
            cell(&p.is_muteuser),
            cell(&p.verified),
            cell(&p.verified_type),
            cell(&p.mbrank),
            cell(&p.mbtype),
            cell(&p.description),
            cell(&p.svip),
        ]
    }
}

/// Joins entries with profiles by uid, keeping list order.
pub fn build_records(
    entries: &[FilteredUserEntry],
    profiles: &HashMap<String, UserProfile>,
) -> Vec<ExportRecord> {
    entries
        .iter()
        .map(|entry| ExportRecord::new(entry, profiles.get(&entry.uid)))
        .collect()
}

#[derive(Debug, Clone, Default)]
pub struct CsvExporter {
    dialect: CsvDialect,
}

impl CsvExporter {
    pub fn new(dialect: CsvDialect) -> Self {
        Self { dialect }
    }

    /// Header line, then one line per record, each terminated by `\n`.
    pub fn serialize(&self, records: &[ExportRecord]) -> Result<Bytes> {
        debug!(
            "Serializing {} records with {:?} dialect",
            records.len(),
            self.dialect
        );
        match self.dialect {
            CsvDialect::Naive => {
                let mut out = String::new();
                out.push_str(&EXPORT_HEADER.iter().join(","));
                out.push('\n');
                for record in records {
                    out.push_str(&record.fields().iter().join(","));
                    out.push('\n');
                }
                Ok(Bytes::from(out))
            }
            CsvDialect::Quoted => {
                let mut writer = csv::WriterBuilder::new()
                    .terminator(csv::Terminator::Any(b'\n'))
                    .from_writer(Vec::new());
                writer.write_record(EXPORT_HEADER)?;
                for record in records {
                    writer.write_record(record.fields())?;
                }
                Ok(Bytes::from(writer.into_inner()?))
            }
        }
    }
}

#[cfg(test)]
mod local_tests {
    use super::*;
    use crate::models::Scalar;

    const HEADER_LINE: &str = "UID,Screen Name,Gender,Location,Statuses Count,Followers Count,\
                               Friends Count,User Type,Is Star,Is Mute User,Verified,\
                               Verified Type,Mbrank,Mbtype,Description,SVIP";

    fn entry(uid: &str, name: &str) -> FilteredUserEntry {
        FilteredUserEntry {
            uid: uid.into(),
            screen_name: name.into(),
        }
    }

    fn full_profile() -> UserProfile {
        UserProfile {
            gender: Some("f".into()),
            location: Some("北京".into()),
            statuses_count: Some(Scalar::Int(10)),
            followers_count: Some(Scalar::Int(20)),
            friends_count: Some(Scalar::Int(30)),
            user_type: Some(Scalar::Int(0)),
            is_star: Some(Scalar::Str("0".into())),
            is_muteuser: Some(Scalar::Bool(true)),
            verified: Some(Scalar::Bool(false)),
            verified_type: Some(Scalar::Int(-1)),
            mbrank: Some(Scalar::Int(6)),
            mbtype: Some(Scalar::Int(12)),
            description: Some("hi, there".into()),
            svip: Some(Scalar::Int(0)),
        }
    }

    #[test]
    fn test_build_records_keeps_order_and_fills_missing() {
        let entries = vec![entry("2", "b"), entry("1", "a"), entry("3", "c")];
        let profiles = HashMap::from([("1".to_string(), full_profile())]);

        let records = build_records(&entries, &profiles);

        let uids: Vec<_> = records.iter().map(|r| r.uid.as_str()).collect();
        assert_eq!(uids, vec!["2", "1", "3"]);
        assert_eq!(records[1].profile, full_profile());
        assert!(records[0].profile.is_empty());
        assert!(records[2].profile.is_empty());
    }

    #[test]
    fn test_fields_order() {
        let record = ExportRecord::new(&entry("1", "a"), Some(&full_profile()));
        assert_eq!(
            record.fields(),
            [
                "1", "a", "f", "北京", "10", "20", "30", "0", "0", "true", "false", "-1", "6",
                "12", "hi, there", "0"
            ]
        );
        let empty = ExportRecord::new(&entry("2", "b"), None);
        assert!(empty.fields()[2..].iter().all(String::is_empty));
    }

    #[test]
    fn test_fields_render_raw_scalars() {
        let profile = UserProfile {
            followers_count: Some(Scalar::Str("123".into())),
            statuses_count: Some(Scalar::Float(5.0)),
            svip: Some(Scalar::Str("1".into())),
            ..Default::default()
        };
        let fields = ExportRecord::new(&entry("1", "a"), Some(&profile)).fields();
        assert_eq!(fields[4], "5");
        assert_eq!(fields[5], "123");
        assert_eq!(fields[15], "1");
    }

    #[test]
    fn test_naive_dialect() {
        let records = vec![
            ExportRecord::new(&entry("1", "a"), Some(&full_profile())),
            ExportRecord::new(&entry("2", "b"), None),
        ];
        let out = CsvExporter::new(CsvDialect::Naive)
            .serialize(&records)
            .unwrap();
        let text = String::from_utf8(out.to_vec()).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], HEADER_LINE);
        assert_eq!(
            lines[1],
            "1,a,f,北京,10,20,30,0,0,true,false,-1,6,12,hi, there,0"
        );
        assert_eq!(lines[2], "2,b,,,,,,,,,,,,,,");
    }

    #[test]
    fn test_quoted_dialect_escapes() {
        let mut profile = full_profile();
        profile.description = Some("say \"hi\"\nbye".into());
        let records = vec![
            ExportRecord::new(&entry("1", "a,b"), Some(&profile)),
            ExportRecord::new(&entry("2", "c"), None),
        ];
        let out = CsvExporter::default().serialize(&records).unwrap();
        let text = String::from_utf8(out.to_vec()).unwrap();
        assert!(text.starts_with(&format!("{HEADER_LINE}\n")));
        assert!(text.contains("1,\"a,b\",f,北京,"));
        assert!(text.contains(",\"say \"\"hi\"\"\nbye\",0\n"));
        assert!(text.ends_with("2,c,,,,,,,,,,,,,,\n"));

        let mut reader = csv::Reader::from_reader(text.as_bytes());
        assert_eq!(reader.headers().unwrap().len(), 16);
        assert_eq!(reader.records().count(), 2);
    }

    #[test]
    fn test_header_only_when_no_records() {
        let out = CsvExporter::default().serialize(&[]).unwrap();
        assert_eq!(out, Bytes::from(format!("{HEADER_LINE}\n")));
    }
}

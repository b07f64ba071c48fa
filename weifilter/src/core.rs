use std::collections::HashMap;
use std::time::Duration;

use log::{error, info};
use tokio::time::sleep;

use crate::api::ApiClient;
use crate::error::{Error, Result};
use crate::exporter::{CsvExporter, build_records};
use crate::sink::Sink;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportSummary {
    pub rows: usize,
    pub empty_profiles: usize,
}

/// Fetches the filtered-user list, enriches every entry with its profile and
/// hands the CSV to the sink. Requests are issued one at a time.
#[derive(Debug, Clone)]
pub struct Pipeline<A: ApiClient> {
    api_client: A,
    exporter: CsvExporter,
    profile_interval: Duration,
}

impl<A: ApiClient> Pipeline<A> {
    pub fn new(api_client: A, exporter: CsvExporter, profile_interval: Duration) -> Self {
        Self {
            api_client,
            exporter,
            profile_interval,
        }
    }

    pub async fn run<S: Sink>(&self, mut sink: S) -> Result<ExportSummary> {
        sink.open().await?;

        let entries = self.api_client.filtered_users().await;
        if entries.is_empty() {
            error!("Error: no filtered users fetched, nothing exported");
            return Err(Error::EmptyResult);
        }
        info!("Total users: {}", entries.len());

        let mut profiles = HashMap::with_capacity(entries.len());
        let mut empty_profiles = 0;
        for (i, entry) in entries.iter().enumerate() {
            if profiles.contains_key(&entry.uid) {
                info!("UID: {} listed twice, reusing its profile", entry.uid);
                continue;
            }
            if i > 0 && !self.profile_interval.is_zero() {
                sleep(self.profile_interval).await;
            }
            let profile = self.api_client.profile_info(&entry.uid).await;
            if profile.is_empty() {
                empty_profiles += 1;
            }
            info!(
                "UID: {}, Name: {}, Location: {}",
                entry.uid,
                entry.screen_name,
                profile.location.as_deref().unwrap_or_default()
            );
            profiles.insert(entry.uid.clone(), profile);
        }

        let records = build_records(&entries, &profiles);
        let content = self.exporter.serialize(&records)?;
        sink.write_all_and_close(content).await?;

        let summary = ExportSummary {
            rows: records.len(),
            empty_profiles,
        };
        info!(
            "Exported {} users, {} without profile",
            summary.rows, summary.empty_profiles
        );
        Ok(summary)
    }
}

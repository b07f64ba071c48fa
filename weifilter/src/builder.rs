use log::info;

use crate::{
    api::{ApiClientImpl, DefaultApiClient},
    config::Config,
    core::Pipeline,
    credentials::{CookieFile, CredentialProvider, NoCredentials, StaticCookie},
    error::Result,
    exporter::CsvExporter,
    http_client::WebClient,
    sink::FileSink,
};

pub struct PipelineBuilder {
    config: Config,
}

impl PipelineBuilder {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// An explicit cookie string wins over a cookie file.
    pub fn credentials(&self) -> Box<dyn CredentialProvider> {
        match (&self.config.cookie, &self.config.cookie_file) {
            (Some(cookie), _) => Box::new(StaticCookie(cookie.clone())),
            (None, Some(path)) => Box::new(CookieFile::new(path, &self.config.cookie_domain)),
            (None, None) => Box::new(NoCredentials),
        }
    }

    pub fn build(&self) -> Result<Pipeline<DefaultApiClient>> {
        info!("PipelineBuilder: building pipeline...");
        self.config.validate()?;

        let credentials = self.credentials();
        let http_client = WebClient::new(&self.config, credentials.as_ref())?;
        info!("HTTP client created");

        let api_client = ApiClientImpl::new(http_client, &self.config)?;
        info!("ApiClient initialized");

        let exporter = CsvExporter::new(self.config.csv_dialect);
        Ok(Pipeline::new(
            api_client,
            exporter,
            self.config.profile_interval,
        ))
    }

    pub fn build_sink(&self) -> FileSink {
        FileSink::new(&self.config.output_path)
    }
}

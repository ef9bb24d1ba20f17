use reqwest::Client;

use super::error::OmdbError;
use super::types::{OmdbDetailResponse, OmdbSearchResponse};
use crate::traits::{DetailOutcome, MetadataService, SearchOutcome, SearchQuery};

pub const DEFAULT_BASE_URL: &str = "https://www.omdbapi.com/";

/// Plot verbosity for detail lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlotLength {
    Short,
    #[default]
    Full,
}

impl PlotLength {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Short => "short",
            Self::Full => "full",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "short" => Some(Self::Short),
            "full" => Some(Self::Full),
            _ => None,
        }
    }
}

/// OMDb HTTP client. Both operations hit the same endpoint and are told
/// apart by query parameters.
pub struct OmdbClient {
    base_url: String,
    api_key: String,
    plot: PlotLength,
    http: Client,
}

impl OmdbClient {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL.to_string(), api_key)
    }

    pub fn with_base_url(base_url: String, api_key: String) -> Self {
        Self {
            base_url,
            api_key,
            plot: PlotLength::default(),
            http: Client::new(),
        }
    }

    pub fn plot(mut self, plot: PlotLength) -> Self {
        self.plot = plot;
        self
    }

    /// Check the HTTP response for errors and return the body text on failure.
    async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, OmdbError> {
        if resp.status().is_success() {
            Ok(resp)
        } else {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(status, "OMDb API error");
            Err(OmdbError::Api {
                status,
                message: body,
            })
        }
    }
}

impl MetadataService for OmdbClient {
    type Error = OmdbError;

    async fn search_titles(&self, query: &SearchQuery) -> Result<SearchOutcome, OmdbError> {
        let mut params: Vec<(&str, String)> = vec![
            ("apikey", self.api_key.clone()),
            ("s", query.query.clone()),
            ("page", query.page.to_string()),
        ];
        if let Some(ref year) = query.year {
            params.push(("y", year.clone()));
        }
        if let Some(kind) = query.kind {
            params.push(("type", kind.as_str().to_string()));
        }

        let resp = self.http.get(&self.base_url).query(&params).send().await?;

        let resp = Self::check_response(resp).await?;
        let body: OmdbSearchResponse = resp
            .json()
            .await
            .map_err(|e| OmdbError::Parse(e.to_string()))?;

        Ok(body.into_outcome())
    }

    async fn title_details(&self, id: &str) -> Result<DetailOutcome, OmdbError> {
        let resp = self
            .http
            .get(&self.base_url)
            .query(&[
                ("apikey", self.api_key.as_str()),
                ("i", id),
                ("plot", self.plot.as_str()),
            ])
            .send()
            .await?;

        let resp = Self::check_response(resp).await?;
        let body: OmdbDetailResponse = resp
            .json()
            .await
            .map_err(|e| OmdbError::Parse(e.to_string()))?;

        Ok(body.into_outcome())
    }
}

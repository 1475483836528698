use serde::{Deserialize, Serialize};
use url::Url;

pub const DEFAULT_ENDPOINT: &str = "https://service.pdok.nl/lv/bag/wfs/v2_0";
pub const DEFAULT_VERSION: &str = "2.0.0";
pub const DEFAULT_TYPE_NAME: &str = "bag:verblijfsobject";
pub const DEFAULT_OUTPUT_FORMAT: &str = "application/json";
pub const DEFAULT_SRS_NAME: &str = "EPSG:3857";

/// A WFS `GetFeature` request for every feature of one type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WfsRequest {
    pub endpoint: String,
    pub version: String,
    pub type_name: String,
    pub output_format: String,
    pub srs_name: String,
    /// WFS 2.0 `count`; the service's own limit applies when unset.
    pub count: Option<u32>,
}

impl Default for WfsRequest {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            version: DEFAULT_VERSION.to_string(),
            type_name: DEFAULT_TYPE_NAME.to_string(),
            output_format: DEFAULT_OUTPUT_FORMAT.to_string(),
            srs_name: DEFAULT_SRS_NAME.to_string(),
            count: None,
        }
    }
}

impl WfsRequest {
    /// Full `GetFeature` URL. Query pairs already present on the endpoint are kept.
    pub fn url(&self) -> Result<Url, url::ParseError> {
        let mut url = Url::parse(self.endpoint.trim())?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("service", "WFS")
                .append_pair("version", &self.version)
                .append_pair("request", "GetFeature")
                .append_pair("typeName", &self.type_name)
                .append_pair("outputFormat", &self.output_format)
                .append_pair("srsname", &self.srs_name);
            if let Some(count) = self.count {
                query.append_pair("count", &count.to_string());
            }
        }
        Ok(url)
    }
}

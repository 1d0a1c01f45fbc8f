use crate::error::ToolError;
use crate::tools::string_input;
use crate::traits::{Tool, ToolOutcome};
use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;

/// Condition and temperature, e.g. "Sunny +20°C".
const WTTR_FORMAT: &str = "format=%C+%t";

pub struct WeatherTool {
    client: reqwest::Client,
    base_url: String,
}

impl WeatherTool {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn url_for(&self, city: &str) -> Result<reqwest::Url, ToolError> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| ToolError::InvalidInput(format!("Bad weather endpoint: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| ToolError::InvalidInput("Weather endpoint cannot take a path".into()))?
            .pop_if_empty()
            .push(city);
        url.set_query(Some(WTTR_FORMAT));
        Ok(url)
    }
}

#[async_trait]
impl Tool for WeatherTool {
    fn name(&self) -> &str {
        "get_weather"
    }

    fn description(&self) -> &str {
        "Takes a city name as an input and returns the current weather for the city"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "string",
            "description": "City name, e.g. \"new york\""
        })
    }

    async fn execute(&self, input: serde_json::Value) -> ToolOutcome {
        let city = string_input(&input, "city")?;
        if city.trim().is_empty() {
            return Err(ToolError::InvalidInput("City must not be empty".into()));
        }

        let url = self.url_for(city.trim())?;
        tracing::debug!(%url, "fetching weather");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ToolError::Request(e.to_string()))?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            tracing::warn!(city = %city, status = status.as_u16(), "weather lookup failed");
            return Err(ToolError::HttpStatus(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ToolError::Request(e.to_string()))?;

        Ok(format!("The weather in {} is {}", city, body.trim_end()))
    }
}

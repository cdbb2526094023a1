// SPDX-License-Identifier: MIT

use crate::adk::error::{Result, VoyageError};
use crate::adk::tool::Tool;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

const BRAVE_ENDPOINT: &str = "https://api.search.brave.com/res/v1/web/search";

static WEB_SEARCH_SCHEMA: Lazy<Value> = Lazy::new(|| {
    json!({
        "type": "object",
        "properties": {
            "query": {
                "type": "string",
                "description": "What to look up, e.g. 'best food markets in Seoul'"
            },
            "count": {
                "type": "integer",
                "description": "Number of results to return (default 5, max 20)"
            },
            "freshness": {
                "type": "string",
                "description": "Freshness filter: pd (past day), pw (past week), pm (past month), py (past year)"
            }
        },
        "required": ["query"]
    })
});

#[derive(Debug, Serialize, Deserialize)]
pub struct WebSearchArgs {
    pub query: String,
    #[serde(default)]
    pub count: Option<u32>,
    #[serde(default)]
    pub freshness: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WebSearchResult {
    pub results: Vec<SearchResult>,
    pub query: String,
}

/// Web search for the itinerary planner, backed by the Brave Search API
pub struct WebSearchTool {
    client: Client,
    api_key: String,
}

impl WebSearchTool {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
        }
    }
}

/// Pull `web.results` out of a Brave response body
fn parse_results(body: &Value) -> Result<Vec<SearchResult>> {
    let results = body
        .get("web")
        .and_then(|w| w.get("results"))
        .ok_or_else(|| VoyageError::api("Brave", "invalid response format: missing web.results"))?;
    Ok(serde_json::from_value(results.clone())?)
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        "Searches the web for attractions, neighbourhoods, events and practical travel information. Returns titles, URLs and descriptions."
    }

    fn schema(&self) -> &Value {
        &WEB_SEARCH_SCHEMA
    }

    async fn execute(&self, input: Value) -> Result<Value> {
        let args: WebSearchArgs = serde_json::from_value(input)?;
        let count = args.count.unwrap_or(5).clamp(1, 20);

        let mut url = reqwest::Url::parse(BRAVE_ENDPOINT)
            .map_err(|e| VoyageError::config(format!("bad search endpoint: {}", e)))?;
        url.query_pairs_mut()
            .append_pair("q", &args.query)
            .append_pair("count", &count.to_string());
        if let Some(freshness) = &args.freshness {
            url.query_pairs_mut().append_pair("freshness", freshness);
        }

        log::debug!("web_search: {}", args.query);
        let resp = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .header("X-Subscription-Token", &self.api_key)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await?;
            return Err(VoyageError::api("Brave", format!("{}: {}", status, text)));
        }

        let body: Value = resp.json().await?;
        let result = WebSearchResult {
            results: parse_results(&body)?,
            query: args.query,
        };
        Ok(serde_json::to_value(result)?)
    }
}

use log::error;
use reqwest::Client;
use serde::Deserialize;
use std::env;

const UNSPLASH_SEARCH_URL: &str = "https://api.unsplash.com/search/photos";

#[derive(Debug, Deserialize)]
struct UnsplashSearchResponse {
    results: Vec<UnsplashPhoto>,
}

#[derive(Debug, Deserialize)]
struct UnsplashPhoto {
    urls: UnsplashUrls,
}

#[derive(Debug, Deserialize)]
struct UnsplashUrls {
    regular: String,
}

/// Destination photo lookup. Entirely best-effort: a missing access key or
/// any request failure yields an empty list, never an error.
pub struct ImageService {
    client: Client,
    access_key: Option<String>,
}

impl ImageService {
    pub fn from_env() -> Self {
        let access_key = env::var("UNSPLASH_ACCESS_KEY")
            .ok()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());
        Self {
            client: Client::new(),
            access_key,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.access_key.is_some()
    }

    pub async fn destination_photos(&self, city: &str, count: usize) -> Vec<String> {
        let Some(access_key) = &self.access_key else {
            return Vec::new();
        };

        let request = self
            .client
            .get(UNSPLASH_SEARCH_URL)
            .query(&[
                ("query", format!("{} travel destination", city)),
                ("per_page", count.to_string()),
                ("client_id", access_key.clone()),
            ])
            .send()
            .await;

        match request {
            Ok(response) if response.status().is_success() => {
                match response.json::<UnsplashSearchResponse>().await {
                    Ok(body) => body.results.into_iter().map(|p| p.urls.regular).collect(),
                    Err(err) => {
                        error!("Error parsing Unsplash response: {}", err);
                        Vec::new()
                    }
                }
            }
            Ok(response) => {
                error!("Unsplash request failed with status {}", response.status());
                Vec::new()
            }
            Err(err) => {
                error!("Error fetching images: {}", err);
                Vec::new()
            }
        }
    }
}

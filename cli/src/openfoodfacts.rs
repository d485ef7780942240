use anyhow::{Context, Result};

use macrolog_core::models::NutritionPrefill;
use macrolog_core::openfoodfacts::{ProductResponse, product_to_prefill};
use macrolog_core::service::NutritionLookup;

const PRODUCT_URL: &str = "https://world.openfoodfacts.org/api/v2/product";

pub struct OpenFoodFactsClient {
    client: reqwest::Client,
    rt: tokio::runtime::Handle,
}

impl OpenFoodFactsClient {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(format!(
                "macrolog/{} (nutrition tracker)",
                env!("CARGO_PKG_VERSION")
            ))
            .timeout(std::time::Duration::from_secs(10))
            .connect_timeout(std::time::Duration::from_secs(5))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            rt: tokio::runtime::Handle::current(),
        })
    }

    pub async fn lookup_barcode_async(&self, barcode: &str) -> Result<Option<NutritionPrefill>> {
        let url = format!("{PRODUCT_URL}/{barcode}.json");
        tracing::debug!("GET {url}");
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to reach OpenFoodFacts API")?;

        // Unknown barcodes come back as 404 with a regular JSON body
        let data: ProductResponse = resp
            .json()
            .await
            .context("Failed to parse OpenFoodFacts product response")?;

        Ok(product_to_prefill(data))
    }
}

impl NutritionLookup for OpenFoodFactsClient {
    fn lookup_barcode(&self, barcode: &str) -> Result<Option<NutritionPrefill>> {
        tokio::task::block_in_place(|| self.rt.block_on(self.lookup_barcode_async(barcode)))
    }
}

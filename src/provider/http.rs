use std::str::FromStr;

use bigdecimal::BigDecimal;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::{error::Error, handler::PriceSource};

#[derive(Debug, Deserialize)]
struct QuoteResponse {
    price: Option<String>,
}

/// Quote client for `PRICE_SOURCE_URL`. Without a URL every quote is empty.
#[derive(Debug, Clone)]
pub struct HTTP {
    client: Client,
    price_source_url: Option<String>,
}

impl HTTP {
    pub fn new(price_source_url: Option<String>) -> Self {
        HTTP {
            client: Client::new(),
            price_source_url,
        }
    }
}

impl PriceSource for HTTP {
    async fn quote(
        &self,
        asset: &str,
        reference_amount: &BigDecimal,
    ) -> Result<Option<BigDecimal>, Error> {
        let Some(url) = &self.price_source_url else {
            return Ok(None);
        };

        let amount = reference_amount.to_string();
        let json = self
            .client
            .get(url)
            .query(&[("asset", asset), ("amount", amount.as_str())])
            .send()
            .await?
            .error_for_status()?
            .json::<QuoteResponse>()
            .await?;
        debug!("Quote for {}: {:?}", asset, json.price);

        match json.price {
            Some(price) => Ok(Some(BigDecimal::from_str(&price)?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_no_url_means_no_quote() {
        let http = HTTP::new(None);
        let quote = http.quote("0xasset", &BigDecimal::from(1)).await.unwrap();
        assert_eq!(quote, None);
    }

    #[test]
    fn test_quote_response_allows_null() {
        let json: QuoteResponse =
            serde_json::from_str(r#"{"price":null}"#).unwrap();
        assert_eq!(json.price, None);

        let json: QuoteResponse =
            serde_json::from_str(r#"{"price":"1.0042"}"#).unwrap();
        assert_eq!(json.price.as_deref(), Some("1.0042"));
    }
}

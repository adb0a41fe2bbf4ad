/*  This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use crate::common::pricing::estimate_offline_price;
use crate::common::types::*;
use crate::domain::types::ui::estimate::*;
use crate::environment::AppState;
use crate::outbound::external::fetch_live_price;
use crate::outbound::types::LivePriceRequest;
use crate::tools::error::AppError;
use crate::tools::prometheus::OFFLINE_PRICE_FALLBACK;
use actix_web::web::Data;
use async_trait::async_trait;
use reqwest::Url;
use tracing::{info, warn};

/// One link in the pricing chain. `Ok(None)` means "I cannot price this
/// trip, ask the next provider"; `Err` means the provider itself failed and
/// the chain should also continue.
#[async_trait]
pub trait PricingProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn quote(
        &self,
        request: &PriceEstimateRequest,
    ) -> Result<Option<PriceEstimate>, AppError>;
}

/// Live quote from the pricing backend, first in the chain.
pub struct LivePricingProvider {
    pub live_pricing_url: Url,
    pub api_key: String,
}

#[async_trait]
impl PricingProvider for LivePricingProvider {
    fn name(&self) -> &'static str {
        "live"
    }

    async fn quote(
        &self,
        request: &PriceEstimateRequest,
    ) -> Result<Option<PriceEstimate>, AppError> {
        let estimate = fetch_live_price(
            &self.live_pricing_url,
            &self.api_key,
            &LivePriceRequest {
                pickup: request.pickup.to_owned(),
                dropoff: request.dropoff.to_owned(),
                city: request.city.to_owned(),
                service_type: request.service_type,
            },
        )
        .await?;
        Ok(Some(estimate))
    }
}

/// Tariff-table fallback, fully offline.
pub struct OfflinePricingProvider;

#[async_trait]
impl PricingProvider for OfflinePricingProvider {
    fn name(&self) -> &'static str {
        "offline_tariff"
    }

    async fn quote(
        &self,
        request: &PriceEstimateRequest,
    ) -> Result<Option<PriceEstimate>, AppError> {
        Ok(estimate_offline_price(
            &request.pickup,
            &request.dropoff,
            &request.city,
            request.service_type,
        ))
    }
}

/// Walks the providers in order and returns the first quote, tagged with the
/// provider that produced it and its position in the chain. Provider errors
/// are logged and skipped; only an exhausted chain is an error.
pub async fn first_quote(
    providers: &[Box<dyn PricingProvider>],
    request: &PriceEstimateRequest,
) -> Result<(PriceEstimate, &'static str, usize), AppError> {
    for (position, provider) in providers.iter().enumerate() {
        match provider.quote(request).await {
            Ok(Some(estimate)) => return Ok((estimate, provider.name(), position)),
            Ok(None) => {
                info!(
                    tag = "[Pricing]",
                    provider = provider.name(),
                    "Provider has no quote for this trip"
                );
            }
            Err(err) => {
                warn!(
                    tag = "[Pricing]",
                    provider = provider.name(),
                    error = %err,
                    "Provider failed, trying next"
                );
            }
        }
    }

    Err(AppError::PricingUnavailable)
}

pub async fn get_price(
    data: Data<AppState>,
    request_body: PriceEstimateRequest,
) -> Result<PriceEstimateResponse, AppError> {
    let (estimate, source, position) = first_quote(&data.pricing_providers, &request_body).await?;
    if position > 0 {
        OFFLINE_PRICE_FALLBACK.inc();
    }

    if let Err(err) = data.zone_service.initialize().await {
        warn!(tag = "[Pricing]", error = %err, "Zone cache unavailable, pricing without surge");
    }
    let multiplier = data.zone_service.price_multiplier(&request_body.pickup).await;

    // Live quotes already carry zone surge; only the zone-ignorant tariff
    // fallback gets the multiplier applied here.
    let total_price = if position > 0 {
        let Multiplier(factor) = multiplier;
        (estimate.price as f64 * factor).round() as i64
    } else {
        estimate.price
    };

    Ok(PriceEstimateResponse {
        estimate,
        total_price,
        zone_multiplier: multiplier,
        source: source.to_string(),
    })
}

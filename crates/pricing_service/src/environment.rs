/*  This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
#![allow(clippy::expect_used)]

use std::sync::Arc;

use crate::{
    common::zones::ZoneService,
    domain::action::internal::dispatch::{AlertRepository, DriverSearchRepository},
    domain::action::internal::zone::DriverStatusRepository,
    domain::action::ui::estimate::{LivePricingProvider, OfflinePricingProvider, PricingProvider},
    outbound::external::BackendClient,
    tools::logger::LoggerConfig,
};
use reqwest::Url;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub workers: usize,
    pub logger_cfg: LoggerConfig,
    pub backend_api_key: String,
    pub zone_fetch_url: String,
    pub live_pricing_url: String,
    pub driver_search_url: String,
    pub dispatch_alert_url: String,
    pub available_drivers_url: String,
    pub driver_ping_window_minutes: i64,
    pub max_dispatch_radius_km: u32,
    pub request_timeout: u64,
}

pub struct AppState {
    pub zone_service: ZoneService,
    pub pricing_providers: Vec<Box<dyn PricingProvider>>,
    pub driver_search: Arc<dyn DriverSearchRepository>,
    pub alerts: Arc<dyn AlertRepository>,
    pub driver_status: Arc<dyn DriverStatusRepository>,
    pub driver_ping_window_minutes: i64,
    pub max_dispatch_radius_km: u32,
    pub request_timeout: u64,
}

fn parse_url(name: &str, url: &str) -> Url {
    Url::parse(url).unwrap_or_else(|err| panic!("Invalid {} : {}", name, err))
}

impl AppState {
    pub async fn new(app_config: AppConfig) -> AppState {
        let live_pricing_url = parse_url("live_pricing_url", &app_config.live_pricing_url);

        let backend = Arc::new(BackendClient {
            api_key: app_config.backend_api_key.to_owned(),
            zone_fetch_url: parse_url("zone_fetch_url", &app_config.zone_fetch_url),
            live_pricing_url: live_pricing_url.to_owned(),
            driver_search_url: parse_url("driver_search_url", &app_config.driver_search_url),
            dispatch_alert_url: parse_url("dispatch_alert_url", &app_config.dispatch_alert_url),
            available_drivers_url: parse_url(
                "available_drivers_url",
                &app_config.available_drivers_url,
            ),
        });

        // Live quotes first; the static tariff table prices the trip whenever
        // the backend cannot.
        let pricing_providers: Vec<Box<dyn PricingProvider>> = vec![
            Box::new(LivePricingProvider {
                live_pricing_url,
                api_key: app_config.backend_api_key,
            }),
            Box::new(OfflinePricingProvider),
        ];

        AppState {
            zone_service: ZoneService::new(backend.clone()),
            pricing_providers,
            driver_search: backend.clone(),
            alerts: backend.clone(),
            driver_status: backend,
            driver_ping_window_minutes: app_config.driver_ping_window_minutes,
            max_dispatch_radius_km: app_config.max_dispatch_radius_km,
            request_timeout: app_config.request_timeout,
        }
    }
}

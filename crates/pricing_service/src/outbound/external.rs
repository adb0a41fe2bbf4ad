/*  This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use super::types::*;
use crate::common::types::*;
use crate::common::zones::ZoneRepository;
use crate::domain::action::internal::dispatch::{AlertRepository, DriverSearchRepository};
use crate::domain::action::internal::zone::DriverStatusRepository;
use crate::tools::{callapi::call_api, error::AppError};
use async_trait::async_trait;
use reqwest::{Method, Url};

pub async fn fetch_active_zones(zone_fetch_url: &Url, api_key: &str) -> Result<Vec<Zone>, AppError> {
    let mut zones = call_api::<Vec<Zone>, String>(
        Method::GET,
        zone_fetch_url,
        vec![("content-type", "application/json"), ("api-key", api_key)],
        None,
    )
    .await?;

    // The backend read is already scoped to active zones; this only guards
    // against a misconfigured zone fetch URL.
    zones.retain(|zone| zone.status == ZoneStatus::Active);

    Ok(zones)
}

pub async fn search_drivers_within_radius(
    driver_search_url: &Url,
    api_key: &str,
    pickup: &Point,
    radius_km: u32,
    vehicle_class: VehicleClass,
) -> Result<Vec<NearbyDriver>, AppError> {
    call_api::<Vec<NearbyDriver>, DriverSearchRequest>(
        Method::POST,
        driver_search_url,
        vec![("content-type", "application/json"), ("api-key", api_key)],
        Some(DriverSearchRequest {
            lat: pickup.lat,
            lon: pickup.lon,
            max_distance_km: radius_km,
            vehicle_class,
        }),
    )
    .await
}

pub async fn fetch_live_price(
    live_pricing_url: &Url,
    api_key: &str,
    request: &LivePriceRequest,
) -> Result<PriceEstimate, AppError> {
    call_api::<PriceEstimate, LivePriceRequest>(
        Method::POST,
        live_pricing_url,
        vec![("content-type", "application/json"), ("api-key", api_key)],
        Some(request.clone()),
    )
    .await
}

pub async fn create_dispatch_alerts(
    dispatch_alert_url: &Url,
    api_key: &str,
    alerts: &[DispatchAlert],
) -> Result<APISuccess, AppError> {
    call_api::<APISuccess, Vec<DispatchAlert>>(
        Method::POST,
        dispatch_alert_url,
        vec![("content-type", "application/json"), ("api-key", api_key)],
        Some(alerts.to_vec()),
    )
    .await
}

pub async fn fetch_available_drivers(
    available_drivers_url: &Url,
    api_key: &str,
) -> Result<Vec<DriverLocationSample>, AppError> {
    call_api::<Vec<DriverLocationSample>, String>(
        Method::GET,
        available_drivers_url,
        vec![("content-type", "application/json"), ("api-key", api_key)],
        None,
    )
    .await
}

/// HTTP client over the managed backend, implementing every repository seam
/// this service consumes.
#[derive(Clone)]
pub struct BackendClient {
    pub api_key: String,
    pub zone_fetch_url: Url,
    pub live_pricing_url: Url,
    pub driver_search_url: Url,
    pub dispatch_alert_url: Url,
    pub available_drivers_url: Url,
}

#[async_trait]
impl ZoneRepository for BackendClient {
    async fn fetch_active_zones(&self) -> Result<Vec<Zone>, AppError> {
        fetch_active_zones(&self.zone_fetch_url, &self.api_key).await
    }
}

#[async_trait]
impl DriverSearchRepository for BackendClient {
    async fn drivers_within_radius(
        &self,
        pickup: &Point,
        radius_km: u32,
        vehicle_class: VehicleClass,
    ) -> Result<Vec<NearbyDriver>, AppError> {
        search_drivers_within_radius(
            &self.driver_search_url,
            &self.api_key,
            pickup,
            radius_km,
            vehicle_class,
        )
        .await
    }
}

#[async_trait]
impl AlertRepository for BackendClient {
    async fn create_alerts(&self, alerts: &[DispatchAlert]) -> Result<(), AppError> {
        create_dispatch_alerts(&self.dispatch_alert_url, &self.api_key, alerts).await?;
        Ok(())
    }
}

#[async_trait]
impl DriverStatusRepository for BackendClient {
    async fn fetch_available_drivers(&self) -> Result<Vec<DriverLocationSample>, AppError> {
        fetch_available_drivers(&self.available_drivers_url, &self.api_key).await
    }
}

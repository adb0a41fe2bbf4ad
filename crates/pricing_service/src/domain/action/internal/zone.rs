/*  This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use crate::common::types::*;
use crate::common::zones::filter_drivers_in_zone;
use crate::domain::types::internal::zone::*;
use crate::environment::AppState;
use crate::tools::error::AppError;
use actix_web::web::Data;
use async_trait::async_trait;
use chrono::Utc;
use tracing::warn;

/// Fleet-wide status read. Samples arrive unfiltered; zone membership and
/// recency checks happen in this service.
#[async_trait]
pub trait DriverStatusRepository: Send + Sync {
    async fn fetch_available_drivers(&self) -> Result<Vec<DriverLocationSample>, AppError>;
}

/// Lazy cache warm-up shared by the query paths. A failed load is logged and
/// swallowed so lookups degrade to "no zone" instead of erroring.
async fn ensure_zones_loaded(data: &Data<AppState>) {
    if let Err(err) = data.zone_service.initialize().await {
        warn!(tag = "[Zone]", error = %err, "Zone cache unavailable, serving without zones");
    }
}

pub async fn detect_zone(
    data: Data<AppState>,
    request_body: DetectZoneRequest,
) -> Result<DetectZoneResponse, AppError> {
    ensure_zones_loaded(&data).await;

    let point = Point {
        lat: request_body.lat,
        lon: request_body.lon,
    };
    let zone = data.zone_service.detect_zone(&point).await;

    Ok(DetectZoneResponse {
        zone: zone.map(ZoneInfo::from),
    })
}

pub async fn price_multiplier(
    data: Data<AppState>,
    request_body: DetectZoneRequest,
) -> Result<PriceMultiplierResponse, AppError> {
    ensure_zones_loaded(&data).await;

    let point = Point {
        lat: request_body.lat,
        lon: request_body.lon,
    };
    let zone = data.zone_service.detect_zone(&point).await;

    Ok(PriceMultiplierResponse {
        zone_id: zone.as_ref().map(|zone| zone.id.to_owned()),
        multiplier: zone
            .map(|zone| zone.base_price_multiplier)
            .unwrap_or(Multiplier(1.0)),
    })
}

/// Unlike the lookup paths, a refresh that cannot reach the backend is a
/// hard error; the caller asked for fresh data and did not get it.
pub async fn refresh_zones(data: Data<AppState>) -> Result<APISuccess, AppError> {
    data.zone_service.refresh().await?;
    Ok(APISuccess::default())
}

pub async fn drivers_in_zone(
    data: Data<AppState>,
    zone_id: ZoneId,
) -> Result<ZoneDriversResponse, AppError> {
    ensure_zones_loaded(&data).await;

    let zone = data
        .zone_service
        .find_zone(&zone_id)
        .await
        .ok_or_else(|| {
            let ZoneId(zone_id) = zone_id;
            AppError::ZoneNotFound(zone_id)
        })?;

    let samples = data.driver_status.fetch_available_drivers().await?;
    let drivers = filter_drivers_in_zone(
        &zone,
        samples,
        TimeStamp(Utc::now()),
        data.driver_ping_window_minutes,
    );

    Ok(ZoneDriversResponse {
        zone_id: zone.id,
        drivers,
    })
}

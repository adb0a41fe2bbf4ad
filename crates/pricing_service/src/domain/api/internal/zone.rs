/*  This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use actix_web::{
    get, post,
    web::{Data, Json, Path},
};

use crate::{
    common::types::*,
    domain::{action::internal::zone, types::internal::zone::*},
    environment::AppState,
    tools::error::AppError,
};

#[post("/internal/zone/detect")]
async fn detect_zone(
    data: Data<AppState>,
    param_obj: Json<DetectZoneRequest>,
) -> Result<Json<DetectZoneResponse>, AppError> {
    let request_body = param_obj.into_inner();

    Ok(Json(zone::detect_zone(data, request_body).await?))
}

#[post("/internal/zone/multiplier")]
async fn price_multiplier(
    data: Data<AppState>,
    param_obj: Json<DetectZoneRequest>,
) -> Result<Json<PriceMultiplierResponse>, AppError> {
    let request_body = param_obj.into_inner();

    Ok(Json(zone::price_multiplier(data, request_body).await?))
}

#[post("/internal/zone/refresh")]
async fn refresh_zones(data: Data<AppState>) -> Result<Json<APISuccess>, AppError> {
    Ok(Json(zone::refresh_zones(data).await?))
}

#[get("/internal/zone/{zoneId}/drivers")]
async fn zone_drivers(
    data: Data<AppState>,
    path: Path<String>,
) -> Result<Json<ZoneDriversResponse>, AppError> {
    let zone_id = ZoneId(path.into_inner());

    Ok(Json(zone::drivers_in_zone(data, zone_id).await?))
}

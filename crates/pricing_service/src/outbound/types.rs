/*  This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use crate::common::types::*;
use serde::{Deserialize, Serialize};

/// Proximity query payload for the backend driver-search function.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct DriverSearchRequest {
    pub lat: Latitude,
    pub lon: Longitude,
    pub max_distance_km: u32,
    pub vehicle_class: VehicleClass,
}

/// Request payload of the authoritative pricing RPC.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct LivePriceRequest {
    pub pickup: Point,
    pub dropoff: Point,
    pub city: CityName,
    pub service_type: ServiceType,
}

/// One alert row, inserted per notified driver. The hand-off point to the
/// driver notification system, which is outside this service.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct DispatchAlert {
    pub order_id: OrderId,
    pub driver_id: DriverId,
    pub distance_km: f64,
    pub order_details: serde_json::Value,
}

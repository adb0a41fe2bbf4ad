/*  This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use crate::common::types::*;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct NearbyDriversRequest {
    pub order_id: OrderId,
    pub pickup: Point,
    pub vehicle_class: VehicleClass,
    /// Caps the radius ladder; defaults to the configured maximum.
    pub max_radius_km: Option<u32>,
    /// Copied verbatim into each alert row for the courier app.
    pub order_details: serde_json::Value,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct NearbyDriversResponse {
    pub drivers: Vec<NearbyDriver>,
    /// Radius that satisfied the search; `None` when every rung came up
    /// empty and no courier is available.
    pub radius_used: Option<u32>,
}

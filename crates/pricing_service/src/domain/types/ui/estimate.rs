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
pub struct PriceEstimateRequest {
    pub pickup: Point,
    pub dropoff: Point,
    pub city: CityName,
    pub service_type: ServiceType,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PriceEstimateResponse {
    #[serde(flatten)]
    pub estimate: PriceEstimate,
    /// Final price in the smallest currency unit. Equals `price` for live
    /// quotes (already zone aware); offline quotes get the pickup zone's
    /// surge multiplier applied and rounded once.
    pub total_price: i64,
    pub zone_multiplier: Multiplier,
    /// Which provider produced the estimate ("live" or "offline_tariff").
    pub source: String,
}

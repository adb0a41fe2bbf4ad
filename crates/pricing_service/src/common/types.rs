/*  This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

#[derive(Deserialize, Serialize, Clone, Debug, Eq, Hash, PartialEq)]
pub struct DriverId(pub String);
#[derive(Deserialize, Serialize, Clone, Debug, Eq, Hash, PartialEq)]
pub struct ZoneId(pub String);
#[derive(Deserialize, Serialize, Clone, Debug, Eq, Hash, PartialEq)]
pub struct OrderId(pub String);
#[derive(Deserialize, Serialize, Clone, Debug, Eq, Hash, PartialEq)]
pub struct CityName(pub String);
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Copy)]
pub struct Latitude(pub f64);
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Copy)]
pub struct Longitude(pub f64);
#[derive(Deserialize, Serialize, Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Hash, Ord)]
pub struct TimeStamp(pub DateTime<Utc>);
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, PartialOrd, Copy)]
pub struct Multiplier(pub f64);

/// WGS-84 degrees. Out of range latitude/longitude is not validated and
/// produces nonsense distances, matching upstream behavior.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Point {
    pub lat: Latitude,
    pub lon: Longitude,
}

#[derive(
    Debug, Clone, EnumString, Display, Serialize, Deserialize, Eq, Hash, PartialEq, Copy,
)]
#[strum(ascii_case_insensitive)]
pub enum ServiceType {
    #[strum(serialize = "moto_taxi")]
    #[serde(rename = "moto_taxi")]
    MotoTaxi,
    #[strum(serialize = "car_taxi")]
    #[serde(rename = "car_taxi")]
    CarTaxi,
    #[strum(serialize = "delivery")]
    #[serde(rename = "delivery")]
    Delivery,
    #[strum(serialize = "food_delivery")]
    #[serde(rename = "food_delivery")]
    FoodDelivery,
}

#[derive(
    Debug, Clone, EnumString, Display, Serialize, Deserialize, Eq, Hash, PartialEq, Copy,
)]
pub enum VehicleClass {
    MOTO,
    CAR,
    VAN,
    TRUCK,
}

#[derive(Debug, Clone, EnumString, Display, Serialize, Deserialize, Eq, Hash, PartialEq, Copy)]
pub enum ZoneStatus {
    #[strum(serialize = "active")]
    #[serde(rename = "active")]
    Active,
    #[strum(serialize = "inactive")]
    #[serde(rename = "inactive")]
    Inactive,
}

/// A service zone polygon with its surge multiplier. Read-only to this
/// service; mutated only by backend administrators.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Zone {
    pub id: ZoneId,
    pub name: String,
    /// Ordered ring of `[lng, lat]` pairs. Assumed simple and closed.
    pub coordinates: Vec<[f64; 2]>,
    pub base_price_multiplier: Multiplier,
    pub status: ZoneStatus,
}

/// Latest location ping written by a driver's client. Read-only here.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct DriverLocationSample {
    pub driver_id: DriverId,
    pub latitude: Latitude,
    pub longitude: Longitude,
    pub is_online: bool,
    pub is_available: bool,
    pub last_ping: TimeStamp,
}

impl DriverLocationSample {
    pub fn location(&self) -> Point {
        Point {
            lat: self.latitude,
            lon: self.longitude,
        }
    }
}

/// Output of a price computation. `price` is in the smallest unit of
/// `currency`; no fractional money anywhere.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PriceEstimate {
    pub price: i64,
    pub distance_km: f64,
    pub duration_minutes: u32,
    pub currency: String,
}

/// One row of the backend proximity query, already sorted by distance
/// by the backend. This service never re-sorts.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NearbyDriver {
    pub driver_id: DriverId,
    pub distance_km: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct APISuccess {
    result: String,
}

impl Default for APISuccess {
    fn default() -> Self {
        Self {
            result: "Success".to_string(),
        }
    }
}

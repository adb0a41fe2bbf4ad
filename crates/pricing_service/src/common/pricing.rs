/*  This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use super::{
    geometry::haversine_distance_km,
    tariff::{average_speed_kmph, tariff_for},
    types::*,
};

/// Computes a price estimate entirely from the compiled-in tariff tables,
/// without any network call. Used as the fallback when the live pricing
/// backend is unreachable.
///
/// Returns `None` when no tariff exists for the `(city, service_type)` pair,
/// meaning "no offline tariff available" rather than a zero price. Rounding
/// (half away from zero) is applied once at the end, not per sub-term.
pub fn estimate_offline_price(
    pickup: &Point,
    dropoff: &Point,
    city: &CityName,
    service_type: ServiceType,
) -> Option<PriceEstimate> {
    let tariff = tariff_for(city, service_type)?;

    let distance_km = haversine_distance_km(pickup, dropoff);
    let price = (tariff.base_fare as f64 + distance_km * tariff.per_km_rate as f64).round() as i64;
    let duration_minutes = (distance_km / average_speed_kmph(city) * 60.0).round() as u32;

    Some(PriceEstimate {
        price,
        distance_km,
        duration_minutes,
        currency: tariff.currency.to_string(),
    })
}

/*  This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use super::types::*;
use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;

/// Fallback speed when a city has no entry of its own.
pub const DEFAULT_AVERAGE_SPEED_KMPH: f64 = 20.0;

/// One tariff entry. Money values are integers in the smallest unit of
/// `currency` (no fractional currency anywhere in the table).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tariff {
    pub base_fare: i64,
    pub per_km_rate: i64,
    pub currency: &'static str,
}

const fn cdf(base_fare: i64, per_km_rate: i64) -> Tariff {
    Tariff {
        base_fare,
        per_km_rate,
        currency: "CDF",
    }
}

/// Static tariff table compiled into the service, keyed by lowercase city
/// name and service type. Immutable at runtime; the live pricing backend is
/// the authoritative source, this table only backs the offline fallback.
static TARIFFS: Lazy<FxHashMap<(String, ServiceType), Tariff>> = Lazy::new(|| {
    let entries = [
        (("kinshasa", ServiceType::MotoTaxi), cdf(1500, 500)),
        (("kinshasa", ServiceType::CarTaxi), cdf(3000, 900)),
        (("kinshasa", ServiceType::Delivery), cdf(2000, 600)),
        (("kinshasa", ServiceType::FoodDelivery), cdf(1500, 500)),
        (("lubumbashi", ServiceType::MotoTaxi), cdf(1200, 450)),
        (("lubumbashi", ServiceType::CarTaxi), cdf(2500, 800)),
        (("lubumbashi", ServiceType::Delivery), cdf(1800, 550)),
        (("goma", ServiceType::MotoTaxi), cdf(1000, 400)),
        (("goma", ServiceType::Delivery), cdf(1500, 500)),
        (("matadi", ServiceType::MotoTaxi), cdf(1000, 400)),
    ];
    entries
        .into_iter()
        .map(|((city, service_type), tariff)| ((city.to_string(), service_type), tariff))
        .collect()
});

static AVERAGE_SPEED_KMPH: Lazy<FxHashMap<String, f64>> = Lazy::new(|| {
    [
        ("kinshasa", 18.0),
        ("lubumbashi", 25.0),
        ("goma", 22.0),
        ("matadi", 20.0),
    ]
    .into_iter()
    .map(|(city, speed)| (city.to_string(), speed))
    .collect()
});

/// Case-insensitive lookup of the `(city, service_type)` tariff entry.
/// `None` means no offline tariff exists for the pair.
pub fn tariff_for(city: &CityName, service_type: ServiceType) -> Option<&'static Tariff> {
    let CityName(city) = city;
    TARIFFS.get(&(city.to_lowercase(), service_type))
}

/// Average urban travel speed used for ETA, defaulting when the city is
/// unknown.
pub fn average_speed_kmph(city: &CityName) -> f64 {
    let CityName(city) = city;
    AVERAGE_SPEED_KMPH
        .get(&city.to_lowercase())
        .copied()
        .unwrap_or(DEFAULT_AVERAGE_SPEED_KMPH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn city_lookup_is_case_insensitive() {
        let tariff = tariff_for(&CityName("Kinshasa".to_string()), ServiceType::MotoTaxi)
            .expect("kinshasa moto_taxi tariff must exist");
        assert_eq!(tariff.base_fare, 1500);
        assert_eq!(tariff.currency, "CDF");

        assert_eq!(
            tariff_for(&CityName("KINSHASA".to_string()), ServiceType::MotoTaxi),
            tariff_for(&CityName("kinshasa".to_string()), ServiceType::MotoTaxi)
        );
    }

    #[test]
    fn unknown_pairs_have_no_tariff() {
        assert!(tariff_for(&CityName("nairobi".to_string()), ServiceType::MotoTaxi).is_none());
        assert!(tariff_for(&CityName("goma".to_string()), ServiceType::CarTaxi).is_none());
    }

    #[test]
    fn unknown_city_speed_defaults() {
        assert_eq!(
            average_speed_kmph(&CityName("nowhere".to_string())),
            DEFAULT_AVERAGE_SPEED_KMPH
        );
        assert_eq!(average_speed_kmph(&CityName("Kinshasa".to_string())), 18.0);
    }
}

/*  This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use crate::common::types::*;
use crate::domain::types::internal::dispatch::*;
use crate::environment::AppState;
use crate::outbound::types::DispatchAlert;
use crate::tools::error::AppError;
use crate::tools::prometheus::DISPATCH_SEARCH_RADIUS;
use actix_web::web::Data;
use async_trait::async_trait;
use tracing::info;

/// Radii tried in order by the cascading search. Widening only happens when
/// the narrower radius is truly empty; the two queries are never raced.
pub const RADIUS_LADDER_KM: [u32; 4] = [5, 10, 15, 20];

/// Backend proximity query. Rows come back sorted by distance; this service
/// never re-sorts them.
#[async_trait]
pub trait DriverSearchRepository: Send + Sync {
    async fn drivers_within_radius(
        &self,
        pickup: &Point,
        radius_km: u32,
        vehicle_class: VehicleClass,
    ) -> Result<Vec<NearbyDriver>, AppError>;
}

/// Alert-row sink, one row per notified driver. Delivery to the courier app
/// happens elsewhere.
#[async_trait]
pub trait AlertRepository: Send + Sync {
    async fn create_alerts(&self, alerts: &[DispatchAlert]) -> Result<(), AppError>;
}

pub struct DispatchOutcome {
    pub drivers: Vec<NearbyDriver>,
    pub radius_used: Option<u32>,
}

/// Walks the radius ladder (capped at `max_radius_km`) and stops at the
/// first radius with at least one driver. Exhausting the ladder is not an
/// error; it returns an empty list and no radius.
pub async fn find_nearby_drivers(
    search: &dyn DriverSearchRepository,
    pickup: &Point,
    max_radius_km: u32,
    vehicle_class: VehicleClass,
) -> Result<DispatchOutcome, AppError> {
    for radius_km in RADIUS_LADDER_KM
        .into_iter()
        .filter(|radius_km| *radius_km <= max_radius_km)
    {
        let drivers = search
            .drivers_within_radius(pickup, radius_km, vehicle_class)
            .await?;

        if !drivers.is_empty() {
            DISPATCH_SEARCH_RADIUS
                .with_label_values(&[vehicle_class.to_string().as_str()])
                .observe(radius_km as f64);
            return Ok(DispatchOutcome {
                drivers,
                radius_used: Some(radius_km),
            });
        }

        info!(tag = "[Dispatch]", radius_km, "No drivers in radius, widening search");
    }

    Ok(DispatchOutcome {
        drivers: Vec::new(),
        radius_used: None,
    })
}

pub async fn nearby_drivers(
    data: Data<AppState>,
    request_body: NearbyDriversRequest,
) -> Result<NearbyDriversResponse, AppError> {
    let max_radius_km = request_body
        .max_radius_km
        .unwrap_or(data.max_dispatch_radius_km);

    let outcome = find_nearby_drivers(
        data.driver_search.as_ref(),
        &request_body.pickup,
        max_radius_km,
        request_body.vehicle_class,
    )
    .await?;

    if !outcome.drivers.is_empty() {
        let alerts = outcome
            .drivers
            .iter()
            .map(|driver| DispatchAlert {
                order_id: request_body.order_id.to_owned(),
                driver_id: driver.driver_id.to_owned(),
                distance_km: driver.distance_km,
                order_details: request_body.order_details.to_owned(),
            })
            .collect::<Vec<DispatchAlert>>();

        data.alerts.create_alerts(&alerts).await?;
    }

    Ok(NearbyDriversResponse {
        drivers: outcome.drivers,
        radius_used: outcome.radius_used,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Fake backend where every driver sits at a fixed distance from pickup.
    struct DriversAtDistance {
        distance_km: f64,
        queries: AtomicUsize,
    }

    impl DriversAtDistance {
        fn new(distance_km: f64) -> Self {
            Self {
                distance_km,
                queries: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl DriverSearchRepository for DriversAtDistance {
        async fn drivers_within_radius(
            &self,
            _pickup: &Point,
            radius_km: u32,
            _vehicle_class: VehicleClass,
        ) -> Result<Vec<NearbyDriver>, AppError> {
            self.queries.fetch_add(1, Ordering::SeqCst);
            if self.distance_km <= radius_km as f64 {
                Ok(vec![NearbyDriver {
                    driver_id: DriverId("driver-1".to_string()),
                    distance_km: self.distance_km,
                }])
            } else {
                Ok(vec![])
            }
        }
    }

    struct RecordingAlerts {
        rows: Mutex<Vec<DispatchAlert>>,
    }

    #[async_trait]
    impl AlertRepository for RecordingAlerts {
        async fn create_alerts(&self, alerts: &[DispatchAlert]) -> Result<(), AppError> {
            self.rows.lock().unwrap().extend(alerts.to_vec());
            Ok(())
        }
    }

    fn pickup() -> Point {
        Point {
            lat: Latitude(-4.325),
            lon: Longitude(15.3222),
        }
    }

    #[tokio::test]
    async fn stops_at_first_radius_with_drivers() {
        let search = DriversAtDistance::new(12.0);

        let outcome = find_nearby_drivers(&search, &pickup(), 20, VehicleClass::MOTO)
            .await
            .unwrap();

        // 15 is the first rung of [5, 10, 15, 20] that covers 12 km.
        assert_eq!(outcome.radius_used, Some(15));
        assert_eq!(outcome.drivers.len(), 1);
        assert_eq!(search.queries.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn close_drivers_resolve_on_the_first_rung() {
        let search = DriversAtDistance::new(2.0);

        let outcome = find_nearby_drivers(&search, &pickup(), 20, VehicleClass::MOTO)
            .await
            .unwrap();

        assert_eq!(outcome.radius_used, Some(5));
        assert_eq!(search.queries.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn exhausted_ladder_returns_empty_not_error() {
        let search = DriversAtDistance::new(50.0);

        let outcome = find_nearby_drivers(&search, &pickup(), 20, VehicleClass::MOTO)
            .await
            .unwrap();

        assert!(outcome.drivers.is_empty());
        assert_eq!(outcome.radius_used, None);
        assert_eq!(search.queries.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn ladder_is_capped_by_max_radius() {
        let search = DriversAtDistance::new(12.0);

        // Drivers exist at 12 km but the caller only allows 10.
        let outcome = find_nearby_drivers(&search, &pickup(), 10, VehicleClass::MOTO)
            .await
            .unwrap();

        assert!(outcome.drivers.is_empty());
        assert_eq!(outcome.radius_used, None);
        assert_eq!(search.queries.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn alert_rows_carry_order_details() {
        let alerts = RecordingAlerts {
            rows: Mutex::new(vec![]),
        };
        let drivers = [
            NearbyDriver {
                driver_id: DriverId("a".to_string()),
                distance_km: 1.2,
            },
            NearbyDriver {
                driver_id: DriverId("b".to_string()),
                distance_km: 3.4,
            },
        ];

        let rows = drivers
            .iter()
            .map(|driver| DispatchAlert {
                order_id: OrderId("order-7".to_string()),
                driver_id: driver.driver_id.to_owned(),
                distance_km: driver.distance_km,
                order_details: serde_json::json!({"items": 2}),
            })
            .collect::<Vec<DispatchAlert>>();
        alerts.create_alerts(&rows).await.unwrap();

        let stored = alerts.rows.lock().unwrap();
        assert_eq!(stored.len(), 2);
        assert!(stored
            .iter()
            .all(|row| row.order_id == OrderId("order-7".to_string())));
    }
}

/*  This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use crate::common::{geometry::point_in_polygon, types::*};
use crate::tools::error::AppError;
use crate::tools::prometheus::ZONE_CACHE_RELOADS;
use async_trait::async_trait;
use chrono::Duration;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info};

/// Source of active service zones. Production uses the backend zone table
/// read; tests inject fakes.
#[async_trait]
pub trait ZoneRepository: Send + Sync {
    async fn fetch_active_zones(&self) -> Result<Vec<Zone>, AppError>;
}

enum ZoneCacheState {
    Uninitialized,
    Loading,
    Ready(Arc<Vec<Zone>>),
}

/// In-memory cache of active zones, loaded lazily on first use and kept for
/// the lifetime of the process until an explicit `refresh`.
///
/// The cached list is replaced wholesale, so readers observe either the
/// previous snapshot or the new one, never a partially updated list. While
/// the cache is empty (never loaded, or load failed) all queries degrade to
/// "no zone" answers; whether that is acceptable is the caller's decision,
/// which is why `initialize` and `refresh` surface their errors.
pub struct ZoneService {
    repository: Arc<dyn ZoneRepository>,
    state: RwLock<ZoneCacheState>,
}

impl ZoneService {
    pub fn new(repository: Arc<dyn ZoneRepository>) -> Self {
        Self {
            repository,
            state: RwLock::new(ZoneCacheState::Uninitialized),
        }
    }

    /// Idempotent lazy load. A no-op when zones are already loaded or a load
    /// is in flight; on fetch failure the cache reverts to uninitialized so
    /// the next call retries (no backoff by design).
    pub async fn initialize(&self) -> Result<(), AppError> {
        {
            let mut state = self.state.write().await;
            match *state {
                ZoneCacheState::Uninitialized => *state = ZoneCacheState::Loading,
                _ => return Ok(()),
            }
        }

        self.load().await
    }

    /// Forced reload. The previous snapshot keeps serving queries until the
    /// replacement list has been fetched in full.
    pub async fn refresh(&self) -> Result<(), AppError> {
        self.load().await
    }

    async fn load(&self) -> Result<(), AppError> {
        match self.repository.fetch_active_zones().await {
            Ok(zones) => {
                info!(tag = "[Zone Cache]", count = zones.len(), "Loaded active zones");
                ZONE_CACHE_RELOADS.inc();
                *self.state.write().await = ZoneCacheState::Ready(Arc::new(zones));
                Ok(())
            }
            Err(err) => {
                error!(tag = "[Zone Cache]", error = %err, "Failed to load active zones");
                let mut state = self.state.write().await;
                if let ZoneCacheState::Loading = *state {
                    *state = ZoneCacheState::Uninitialized;
                }
                Err(AppError::ZoneFetchFailed(err.message()))
            }
        }
    }

    async fn snapshot(&self) -> Option<Arc<Vec<Zone>>> {
        match &*self.state.read().await {
            ZoneCacheState::Ready(zones) => Some(zones.clone()),
            _ => None,
        }
    }

    /// First zone (in load order) whose polygon contains the point. Overlaps
    /// resolve by load order, not specificity; the scan is O(zones) with no
    /// spatial index, which is fine at tens of zones.
    pub async fn detect_zone(&self, point: &Point) -> Option<Zone> {
        let zones = self.snapshot().await?;
        zones
            .iter()
            .find(|zone| point_in_polygon(point, &zone.coordinates))
            .cloned()
    }

    /// Surge multiplier at the point; identity outside any zone or while the
    /// cache is unavailable (fail open).
    pub async fn price_multiplier(&self, point: &Point) -> Multiplier {
        self.detect_zone(point)
            .await
            .map(|zone| zone.base_price_multiplier)
            .unwrap_or(Multiplier(1.0))
    }

    pub async fn find_zone(&self, zone_id: &ZoneId) -> Option<Zone> {
        let zones = self.snapshot().await?;
        zones.iter().find(|zone| &zone.id == zone_id).cloned()
    }
}

/// Keeps the samples that are online, available, recently pinged, and inside
/// the zone polygon. Read-then-filter on purpose; the proximity work is not
/// pushed to the backend at the current fleet size.
pub fn filter_drivers_in_zone(
    zone: &Zone,
    samples: Vec<DriverLocationSample>,
    now: TimeStamp,
    max_ping_age_minutes: i64,
) -> Vec<DriverLocationSample> {
    let TimeStamp(now) = now;
    let max_age = Duration::minutes(max_ping_age_minutes);

    samples
        .into_iter()
        .filter(|sample| {
            let TimeStamp(last_ping) = sample.last_ping;
            sample.is_online
                && sample.is_available
                && now.signed_duration_since(last_ping) <= max_age
                && point_in_polygon(&sample.location(), &zone.coordinates)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeZoneRepository {
        zones: Vec<Zone>,
        fetches: AtomicUsize,
        fail: bool,
    }

    impl FakeZoneRepository {
        fn new(zones: Vec<Zone>) -> Self {
            Self {
                zones,
                fetches: AtomicUsize::new(0),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                zones: vec![],
                fetches: AtomicUsize::new(0),
                fail: true,
            }
        }
    }

    #[async_trait]
    impl ZoneRepository for FakeZoneRepository {
        async fn fetch_active_zones(&self) -> Result<Vec<Zone>, AppError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(AppError::ExternalAPICallError(
                    "connection refused".to_string(),
                ))
            } else {
                Ok(self.zones.clone())
            }
        }
    }

    fn zone(id: &str, multiplier: f64, ring: Vec<[f64; 2]>) -> Zone {
        Zone {
            id: ZoneId(id.to_string()),
            name: id.to_string(),
            coordinates: ring,
            base_price_multiplier: Multiplier(multiplier),
            status: ZoneStatus::Active,
        }
    }

    fn unit_square() -> Vec<[f64; 2]> {
        vec![[0.0, 0.0], [0.0, 1.0], [1.0, 1.0], [1.0, 0.0]]
    }

    fn big_square() -> Vec<[f64; 2]> {
        vec![[-1.0, -1.0], [-1.0, 2.0], [2.0, 2.0], [2.0, -1.0]]
    }

    fn point(lat: f64, lon: f64) -> Point {
        Point {
            lat: Latitude(lat),
            lon: Longitude(lon),
        }
    }

    #[tokio::test]
    async fn initialize_is_idempotent() {
        let repository = Arc::new(FakeZoneRepository::new(vec![zone(
            "a",
            1.5,
            unit_square(),
        )]));
        let service = ZoneService::new(repository.clone());

        service.initialize().await.unwrap();
        service.initialize().await.unwrap();

        assert_eq!(repository.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn refresh_fetches_again() {
        let repository = Arc::new(FakeZoneRepository::new(vec![zone(
            "a",
            1.5,
            unit_square(),
        )]));
        let service = ZoneService::new(repository.clone());

        service.initialize().await.unwrap();
        service.refresh().await.unwrap();

        assert_eq!(repository.fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failed_initialize_retries_on_next_call() {
        let repository = Arc::new(FakeZoneRepository::failing());
        let service = ZoneService::new(repository.clone());

        assert!(service.initialize().await.is_err());
        assert!(service.initialize().await.is_err());

        // Both calls hit the backend since the cache reverted to uninitialized.
        assert_eq!(repository.fetches.load(Ordering::SeqCst), 2);
        // Queries fail open while the cache is empty.
        assert_eq!(service.detect_zone(&point(0.5, 0.5)).await, None);
        assert_eq!(
            service.price_multiplier(&point(0.5, 0.5)).await,
            Multiplier(1.0)
        );
    }

    #[tokio::test]
    async fn overlapping_zones_resolve_by_load_order() {
        let repository = Arc::new(FakeZoneRepository::new(vec![
            zone("a", 2.0, unit_square()),
            zone("b", 3.0, big_square()),
        ]));
        let service = ZoneService::new(repository);
        service.initialize().await.unwrap();

        // Inside both rings; zone "a" was loaded first and wins.
        let hit = service.detect_zone(&point(0.5, 0.5)).await.unwrap();
        assert_eq!(hit.id, ZoneId("a".to_string()));
        assert_eq!(
            service.price_multiplier(&point(0.5, 0.5)).await,
            Multiplier(2.0)
        );

        // Only inside the bigger ring.
        let hit = service.detect_zone(&point(1.5, 1.5)).await.unwrap();
        assert_eq!(hit.id, ZoneId("b".to_string()));
    }

    #[tokio::test]
    async fn multiplier_is_identity_outside_all_zones() {
        let repository = Arc::new(FakeZoneRepository::new(vec![zone(
            "a",
            2.0,
            unit_square(),
        )]));
        let service = ZoneService::new(repository);
        service.initialize().await.unwrap();

        assert_eq!(
            service.price_multiplier(&point(5.0, 5.0)).await,
            Multiplier(1.0)
        );
    }

    #[test]
    fn driver_filter_honours_flags_recency_and_geometry() {
        let zone = zone("a", 1.0, unit_square());
        let now = Utc::now();

        let sample = |id: &str, lat: f64, lon: f64, online: bool, available: bool, age_min: i64| {
            DriverLocationSample {
                driver_id: DriverId(id.to_string()),
                latitude: Latitude(lat),
                longitude: Longitude(lon),
                is_online: online,
                is_available: available,
                last_ping: TimeStamp(now - Duration::minutes(age_min)),
            }
        };

        let samples = vec![
            sample("in-zone", 0.5, 0.5, true, true, 1),
            sample("offline", 0.5, 0.5, false, true, 1),
            sample("busy", 0.5, 0.5, true, false, 1),
            sample("stale", 0.5, 0.5, true, true, 30),
            sample("elsewhere", 5.0, 5.0, true, true, 1),
        ];

        let kept = filter_drivers_in_zone(&zone, samples, TimeStamp(now), 10);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].driver_id, DriverId("in-zone".to_string()));
    }
}

/*  This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use std::sync::Arc;

use pricing_service::common::types::*;
use pricing_service::common::zones::ZoneService;
use pricing_service::domain::action::internal::dispatch::find_nearby_drivers;
use pricing_service::domain::action::ui::estimate::{
    first_quote, LivePricingProvider, OfflinePricingProvider, PricingProvider,
};
use pricing_service::domain::types::ui::estimate::PriceEstimateRequest;
use pricing_service::outbound::external::{fetch_live_price, BackendClient};
use pricing_service::outbound::types::LivePriceRequest;
use pricing_service::tools::error::AppError;
use reqwest::Url;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn point(lat: f64, lon: f64) -> Point {
    Point {
        lat: Latitude(lat),
        lon: Longitude(lon),
    }
}

fn backend_client(server: &MockServer) -> BackendClient {
    let url = |suffix: &str| {
        Url::parse(&format!("{}{}", server.uri(), suffix)).expect("Invalid mock server url")
    };
    BackendClient {
        api_key: "test-api-key".to_string(),
        zone_fetch_url: url("/internal/zones/active"),
        live_pricing_url: url("/internal/pricing/quote"),
        driver_search_url: url("/internal/drivers/search"),
        dispatch_alert_url: url("/internal/dispatch/alerts"),
        available_drivers_url: url("/internal/drivers/available"),
    }
}

fn live_price_request() -> LivePriceRequest {
    LivePriceRequest {
        pickup: point(-4.325, 15.3222),
        dropoff: point(-4.34, 15.31),
        city: CityName("kinshasa".to_string()),
        service_type: ServiceType::MotoTaxi,
    }
}

#[tokio::test]
async fn live_price_round_trips_through_the_backend() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/internal/pricing/quote"))
        .and(header("api-key", "test-api-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "price": 4200,
            "distanceKm": 5.4,
            "durationMinutes": 18,
            "currency": "CDF"
        })))
        .mount(&server)
        .await;
    let client = backend_client(&server);

    let estimate = fetch_live_price(
        &client.live_pricing_url,
        &client.api_key,
        &live_price_request(),
    )
    .await
    .unwrap();

    assert_eq!(estimate.price, 4200);
    assert_eq!(estimate.duration_minutes, 18);
    assert_eq!(estimate.currency, "CDF");
}

#[tokio::test]
async fn backend_errors_surface_as_external_api_failures() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/internal/pricing/quote"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let client = backend_client(&server);

    let err = fetch_live_price(
        &client.live_pricing_url,
        &client.api_key,
        &live_price_request(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, AppError::ExternalAPICallError(_)));
}

#[tokio::test]
async fn pricing_chain_falls_back_to_the_tariff_table_when_live_pricing_is_down() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/internal/pricing/quote"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    let client = backend_client(&server);

    let providers: Vec<Box<dyn PricingProvider>> = vec![
        Box::new(LivePricingProvider {
            live_pricing_url: client.live_pricing_url,
            api_key: client.api_key,
        }),
        Box::new(OfflinePricingProvider),
    ];
    let request = PriceEstimateRequest {
        pickup: point(-4.325, 15.3222),
        dropoff: point(-4.325, 15.3222),
        city: CityName("kinshasa".to_string()),
        service_type: ServiceType::MotoTaxi,
    };

    let (estimate, source, position) = first_quote(&providers, &request).await.unwrap();

    // Identical pickup and dropoff, so the tariff base fare is the answer.
    assert_eq!(source, "offline_tariff");
    assert_eq!(position, 1);
    assert_eq!(estimate.price, 1500);
    assert_eq!(estimate.currency, "CDF");
}

#[tokio::test]
async fn dispatch_widens_the_radius_until_the_backend_finds_drivers() {
    let server = MockServer::start().await;
    for radius in [5, 10] {
        Mock::given(method("POST"))
            .and(path("/internal/drivers/search"))
            .and(body_partial_json(json!({ "maxDistanceKm": radius })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;
    }
    Mock::given(method("POST"))
        .and(path("/internal/drivers/search"))
        .and(body_partial_json(json!({ "maxDistanceKm": 15 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "driverId": "driver-42", "distanceKm": 11.8 }
        ])))
        .mount(&server)
        .await;
    let client = backend_client(&server);

    let outcome = find_nearby_drivers(&client, &point(-4.325, 15.3222), 20, VehicleClass::MOTO)
        .await
        .unwrap();

    assert_eq!(outcome.radius_used, Some(15));
    assert_eq!(outcome.drivers.len(), 1);
    assert_eq!(outcome.drivers[0].driver_id, DriverId("driver-42".to_string()));
}

#[tokio::test]
async fn dispatch_reports_no_drivers_when_every_radius_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/internal/drivers/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(4)
        .mount(&server)
        .await;
    let client = backend_client(&server);

    let outcome = find_nearby_drivers(&client, &point(-4.325, 15.3222), 20, VehicleClass::MOTO)
        .await
        .unwrap();

    assert!(outcome.drivers.is_empty());
    assert_eq!(outcome.radius_used, None);
}

#[tokio::test]
async fn zone_cache_serves_the_fetched_polygons() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/internal/zones/active"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": "zone-centre",
                "name": "Centre Ville",
                "coordinates": [[15.30, -4.34], [15.30, -4.30], [15.35, -4.30], [15.35, -4.34]],
                "base_price_multiplier": 1.8,
                "status": "active"
            },
            {
                "id": "zone-dormant",
                "name": "Dormant",
                "coordinates": [[15.40, -4.40], [15.40, -4.36], [15.45, -4.36], [15.45, -4.40]],
                "base_price_multiplier": 2.5,
                "status": "inactive"
            }
        ])))
        .mount(&server)
        .await;
    let service = ZoneService::new(Arc::new(backend_client(&server)));

    service.initialize().await.unwrap();

    // Inside the active polygon.
    let hit = service.detect_zone(&point(-4.32, 15.32)).await.unwrap();
    assert_eq!(hit.id, ZoneId("zone-centre".to_string()));
    assert_eq!(
        service.price_multiplier(&point(-4.32, 15.32)).await,
        Multiplier(1.8)
    );

    // Inactive zones are dropped at fetch time.
    assert_eq!(service.detect_zone(&point(-4.38, 15.42)).await, None);
}

#[tokio::test]
async fn zone_refresh_swaps_in_the_new_list() {
    let server = MockServer::start().await;
    let zone = |id: &str, multiplier: f64| {
        json!({
            "id": id,
            "name": id,
            "coordinates": [[15.30, -4.34], [15.30, -4.30], [15.35, -4.30], [15.35, -4.34]],
            "base_price_multiplier": multiplier,
            "status": "active"
        })
    };
    Mock::given(method("GET"))
        .and(path("/internal/zones/active"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([zone("zone-v1", 1.0)])))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/internal/zones/active"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([zone("zone-v2", 2.0)])))
        .mount(&server)
        .await;
    let service = ZoneService::new(Arc::new(backend_client(&server)));

    service.initialize().await.unwrap();
    let hit = service.detect_zone(&point(-4.32, 15.32)).await.unwrap();
    assert_eq!(hit.id, ZoneId("zone-v1".to_string()));

    service.refresh().await.unwrap();
    let hit = service.detect_zone(&point(-4.32, 15.32)).await.unwrap();
    assert_eq!(hit.id, ZoneId("zone-v2".to_string()));
    assert_eq!(
        service.price_multiplier(&point(-4.32, 15.32)).await,
        Multiplier(2.0)
    );
}

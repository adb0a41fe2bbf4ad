/*  This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
#![allow(clippy::expect_used)]

use actix_web_prom::{PrometheusMetrics, PrometheusMetricsBuilder};
use prometheus::{
    histogram_opts, opts, register_histogram_vec, register_int_counter, HistogramVec, IntCounter,
};

pub static CALL_EXTERNAL_API: once_cell::sync::Lazy<HistogramVec> =
    once_cell::sync::Lazy::new(|| {
        register_histogram_vec!(
            opts!("call_external_api", "Outgoing API requests").into(),
            &["method", "host", "path", "status"]
        )
        .expect("Failed to register external API call metrics")
    });

pub static OFFLINE_PRICE_FALLBACK: once_cell::sync::Lazy<IntCounter> =
    once_cell::sync::Lazy::new(|| {
        register_int_counter!(
            "offline_price_fallback",
            "Price estimates served from the offline tariff tables"
        )
        .expect("Failed to register offline price fallback metrics")
    });

pub static ZONE_CACHE_RELOADS: once_cell::sync::Lazy<IntCounter> =
    once_cell::sync::Lazy::new(|| {
        register_int_counter!("zone_cache_reloads", "Zone cache loads and refreshes")
            .expect("Failed to register zone cache reload metrics")
    });

pub static DISPATCH_SEARCH_RADIUS: once_cell::sync::Lazy<HistogramVec> =
    once_cell::sync::Lazy::new(|| {
        register_histogram_vec!(
            histogram_opts!(
                "dispatch_search_radius_km",
                "Radius at which the cascading driver search found drivers",
                vec![5.0, 10.0, 15.0, 20.0]
            ),
            &["vehicle_class"]
        )
        .expect("Failed to register dispatch search radius metrics")
    });

/// Observes the duration and outcome of an outgoing API request.
#[macro_export]
macro_rules! call_external_api {
    ($method:expr, $host:expr, $path:expr, $status:expr, $start:expr) => {
        let duration = $start.elapsed().as_secs_f64();
        CALL_EXTERNAL_API
            .with_label_values(&[$method, $host, $path, $status])
            .observe(duration);
    };
}

/// Builds the actix middleware that records per-route request metrics and
/// serves them on `/metrics`, with this service's own collectors registered
/// on top.
pub fn prometheus_metrics() -> PrometheusMetrics {
    let prometheus = PrometheusMetricsBuilder::new("pricing_service")
        .endpoint("/metrics")
        .build()
        .expect("Failed to initialize prometheus metrics");

    prometheus
        .registry
        .register(Box::new(CALL_EXTERNAL_API.to_owned()))
        .expect("Failed to register external API call metrics");

    prometheus
        .registry
        .register(Box::new(OFFLINE_PRICE_FALLBACK.to_owned()))
        .expect("Failed to register offline price fallback metrics");

    prometheus
        .registry
        .register(Box::new(ZONE_CACHE_RELOADS.to_owned()))
        .expect("Failed to register zone cache reload metrics");

    prometheus
        .registry
        .register(Box::new(DISPATCH_SEARCH_RADIUS.to_owned()))
        .expect("Failed to register dispatch search radius metrics");

    prometheus
}

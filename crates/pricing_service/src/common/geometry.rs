/*  This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use super::types::*;
use std::f64::consts::PI;

fn deg2rad(degrees: f64) -> f64 {
    degrees * PI / 180.0
}

/// Great-circle distance in kilometers using the haversine formula.
/// NaN in, NaN out; inputs are not range checked.
pub fn haversine_distance_km(latlong1: &Point, latlong2: &Point) -> f64 {
    // Radius of Earth in kilometers
    let r: f64 = 6371.0;

    let Latitude(lat1) = latlong1.lat;
    let Longitude(lon1) = latlong1.lon;
    let Latitude(lat2) = latlong2.lat;
    let Longitude(lon2) = latlong2.lon;

    let dlat = deg2rad(lat2 - lat1);
    let dlon = deg2rad(lon2 - lon1);

    let rlat1 = deg2rad(lat1);
    let rlat2 = deg2rad(lat2);

    let sq = |x: f64| x * x;

    // Calculated distance is real (not imaginary) when 0 <= h <= 1
    let h = sq((dlat / 2.0).sin()) + rlat1.cos() * rlat2.cos() * sq((dlon / 2.0).sin());

    2.0 * r * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Even-odd ray-casting test against an ordered ring of `[lng, lat]` pairs.
/// The ring must be a simple closed polygon; behavior on self-intersecting
/// or open rings is unspecified.
pub fn point_in_polygon(point: &Point, ring: &[[f64; 2]]) -> bool {
    if ring.len() < 3 {
        return false;
    }

    let Latitude(y) = point.lat;
    let Longitude(x) = point.lon;

    let mut inside = false;
    let mut j = ring.len() - 1;
    for i in 0..ring.len() {
        let (xi, yi) = (ring[i][0], ring[i][1]);
        let (xj, yj) = (ring[j][0], ring[j][1]);

        let crosses = (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi;
        if crosses {
            inside = !inside;
        }
        j = i;
    }

    inside
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(lat: f64, lon: f64) -> Point {
        Point {
            lat: Latitude(lat),
            lon: Longitude(lon),
        }
    }

    #[test]
    fn haversine_is_symmetric_and_zero_on_identity() {
        let kinshasa = point(-4.325, 15.3222);
        let lubumbashi = point(-11.6876, 27.5026);

        assert_eq!(
            haversine_distance_km(&kinshasa, &lubumbashi),
            haversine_distance_km(&lubumbashi, &kinshasa)
        );
        assert_eq!(haversine_distance_km(&kinshasa, &kinshasa), 0.0);
    }

    #[test]
    fn haversine_matches_known_distance() {
        // Kinshasa <-> Lubumbashi is roughly 1570 km as the crow flies.
        let d = haversine_distance_km(&point(-4.325, 15.3222), &point(-11.6876, 27.5026));
        assert!((d - 1570.0).abs() < 20.0, "got {d}");
    }

    #[test]
    fn unit_square_membership() {
        let ring = [[0.0, 0.0], [0.0, 1.0], [1.0, 1.0], [1.0, 0.0]];

        assert!(point_in_polygon(&point(0.5, 0.5), &ring));
        assert!(!point_in_polygon(&point(2.0, 2.0), &ring));
    }

    #[test]
    fn points_outside_bounding_box_are_outside() {
        let ring = [[15.2, -4.5], [15.2, -4.2], [15.5, -4.2], [15.5, -4.5]];

        for p in [
            point(-5.0, 15.3),
            point(-4.3, 16.0),
            point(0.0, 0.0),
            point(-4.0, 15.0),
        ] {
            assert!(!point_in_polygon(&p, &ring), "{p:?} should be outside");
        }
    }

    #[test]
    fn degenerate_rings_are_never_hit() {
        assert!(!point_in_polygon(&point(0.5, 0.5), &[]));
        assert!(!point_in_polygon(&point(0.5, 0.5), &[[0.0, 0.0], [1.0, 1.0]]));
    }
}

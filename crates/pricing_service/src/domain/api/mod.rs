/*  This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
pub mod internal;
pub mod ui;

use actix_web::web::ServiceConfig;

pub fn handler(config: &mut ServiceConfig) {
    config
        .service(ui::estimate::estimate_price)
        .service(ui::healthcheck::health_check)
        .service(internal::zone::detect_zone)
        .service(internal::zone::price_multiplier)
        .service(internal::zone::refresh_zones)
        .service(internal::zone::zone_drivers)
        .service(internal::dispatch::nearby_drivers);
}

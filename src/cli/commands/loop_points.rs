use anyhow::Result;

use ranno::routing::LatLng;
use ranno::routing::geometry::haversine_m;
use ranno::routing::loop_geometry::{generate_loop_waypoints, loop_bearing_deg, loop_radius_km};
use ranno::ui::Style;
use ranno::utils::formatting::format_distance;

use crate::cli::color::Colors;

pub fn run(lat: f64, lng: f64, km: f64, count: usize) -> Result<()> {
    let c = Colors::new(&Style::default());
    let origin = LatLng::new(lat, lng);
    let points = generate_loop_waypoints(origin, km, count);

    println!(
        "Loop of {} around {:.5},{:.5} (radius {})",
        format_distance(km * 1000.0),
        lat,
        lng,
        format_distance(loop_radius_km(km) * 1000.0)
    );
    println!();
    println!(
        "{:>3}  {:>7}  {:>10}  {:>11}",
        c.dim("#"),
        c.dim("bearing"),
        c.dim("lat"),
        c.dim("lng")
    );
    for (i, p) in points.iter().enumerate() {
        println!(
            "{:>3}  {:>6.1}°  {:>10.6}  {:>11.6}",
            i + 1,
            loop_bearing_deg(i, count),
            p.lat,
            p.lng
        );
    }

    let ring: f64 = points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(a, b)| haversine_m(*a, *b))
        .sum();
    println!();
    println!("Waypoint ring length: {}", c.info(format_distance(ring)));
    Ok(())
}

use anyhow::{Result, bail};

pub const TIP_NEGATIVE_COORDS: &str =
    "Note: for negative coordinates, use the '=' form, e.g.:\n  loop --lat 37.79 --lng=-122.39 --km 5";

pub fn validate_lat_lng(lat: f64, lng: f64) -> Result<()> {
    if !(-90.0..=90.0).contains(&lat) {
        bail!("--lat must be within [-90, 90], got {lat}");
    }
    if !(-180.0..=180.0).contains(&lng) {
        bail!("--lng must be within [-180, 180], got {lng}\n\n{TIP_NEGATIVE_COORDS}");
    }
    Ok(())
}

pub fn validate_loop(lat: f64, lng: f64, km: f64, count: usize) -> Result<()> {
    validate_lat_lng(lat, lng)?;
    if !km.is_finite() || km <= 0.0 {
        bail!("--km must be > 0.");
    }
    if count < 3 {
        bail!("--count must be at least 3 to form a loop.");
    }
    Ok(())
}

pub fn validate_bounds(south: f64, west: f64, north: f64, east: f64) -> Result<()> {
    validate_lat_lng(south, west)?;
    validate_lat_lng(north, east)?;
    if south > north {
        bail!("--south must not be greater than --north");
    }
    if west > east {
        bail!("--west must not be greater than --east");
    }
    Ok(())
}

pub fn validate_limit(limit: usize, ctx: &str) -> Result<()> {
    if limit == 0 {
        bail!("Invalid limit for {ctx}: must be > 0");
    }
    Ok(())
}

use cardiac_planes::{
    CardiacPlanner, LineSegment2, Orientation, PlannerConfig, PlanningError, Volume,
};
use ndarray::Array3;

/// Ellipsoidal "heart" inside a dimmer body, tilted so none of the derived
/// planes are axis aligned.
fn phantom(shape: (usize, usize, usize)) -> Result<Volume, PlanningError> {
    let (depth, height, width) = shape;
    let center = (depth as f32 / 2.0, height as f32 / 2.0, width as f32 / 2.0);
    let data = Array3::from_shape_fn(shape, |(z, y, x)| {
        let (dz, dy, dx) = (
            z as f32 - center.0,
            y as f32 - center.1,
            x as f32 - center.2,
        );
        let (a, b) = (dx + 0.5 * dz, dy - 0.3 * dz);
        let heart = (a / 40.0).powi(2) + (b / 25.0).powi(2) + (dz / 30.0).powi(2);
        let body = (dx / 110.0).powi(2) + (dy / 90.0).powi(2);
        if heart <= 1.0 {
            1000.0
        } else if body <= 1.0 {
            300.0
        } else {
            0.0
        }
    });
    Volume::new(data, (1.0, 1.0, 1.0))
}

fn main() -> Result<(), PlanningError> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let volume = phantom((100, 256, 256))?;
    let window = volume.default_window();
    let mut planner = CardiacPlanner::new(volume.dim(), PlannerConfig::default());
    log::info!("Volume {:?}, window {window:?}", volume.dim());

    let axial_index = volume.dim().0 / 2;
    save(
        volume.get_image_from_axis(axial_index, Orientation::Axial, window)?,
        "axial.png",
    );

    let p2ch = planner
        .set_axial_line(LineSegment2::new((80.0, 150.0), (180.0, 100.0)), axial_index)?
        .clone();
    save(volume.get_image_from_plane(&p2ch, 0.0, window)?, "p2ch.png");

    let valve_to_apex = LineSegment2::new((170.0, 30.0), (230.0, 75.0)).lift(&p2ch, 0.0);
    planner.set_p2ch_line(valve_to_apex)?;
    if let Some(p4ch) = planner.set_rotation(15.0).cloned() {
        save(volume.get_image_from_plane(&p4ch, 0.0, window)?, "p4ch.png");

        let long_axis = LineSegment2::new((190.0, 25.0), (200.0, 80.0)).lift(&p4ch, 0.0);
        planner.set_p4ch_line(long_axis)?;
    }

    let (low, high) = planner.sax_scroll_range();
    log::info!("SAX scroll range {low}..{high}");
    if let Some(sax) = planner.sax_plane() {
        save(volume.get_image_from_plane(sax, 0.0, window)?, "sax.png");
    }
    Ok(())
}

fn save(image: cardiac_planes::render::GrayImage, path: &str) {
    match image.save(path) {
        Ok(()) => log::info!("Wrote {path}"),
        Err(err) => log::warn!("Could not write {path}: {err}"),
    }
}

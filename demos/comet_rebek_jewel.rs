use gauss_orbit::initial_orbit_determination::gauss::GaussObs;
use gauss_orbit::initial_orbit_determination::{determine_orbit, IODParams, RootBracket};
use gauss_orbit::orbit_errors::OrbitError;
use gauss_orbit::orbit_type::ElementsContext;

/// Preliminary orbit of comet Rebek-Jewel, a high-eccentricity case.
///
/// The state is then propagated a hundred days ahead twice, once with the universal f and g
/// functions and once through the classical elements, and the two positions are compared.
fn main() -> Result<(), OrbitError> {
    let triplet = GaussObs::from_hours_degrees(
        [6370.57744, 6374.57284, 6378.56789],
        [5.41652, 5.12686, 4.75436],
        [21.85272, 22.14104, 22.32127],
        [
            [-0.7735829, -0.5704494, -0.2473703],
            [-0.7275905, -0.6179560, -0.2679668],
            [-0.6780640, -0.6624821, -0.2872733],
        ],
    )?;
    let params = IODParams::default();
    let ctx = ElementsContext::heliocentric();

    let result = determine_orbit(&triplet, &RootBracket::new(1.0, 3.0, 1.8)?, &params)?;
    let elements = result.elements(&ctx)?;
    println!("{result}\n\n{elements}\n");

    let dt = 100.0;
    let by_fg = result
        .state
        .propagate(dt, params.mu, params.gauss_grav, &params.kepler)?;
    let by_elements = elements.to_state(result.state.epoch + dt, &ctx)?;
    println!("{by_fg}");
    println!(
        "|r_fg - r_elements| = {:.3e} AU",
        (by_fg.position - by_elements.position).norm()
    );
    Ok(())
}

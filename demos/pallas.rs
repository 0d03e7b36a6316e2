use gauss_orbit::initial_orbit_determination::gauss::GaussObs;
use gauss_orbit::initial_orbit_determination::refinement::GaussRefinement;
use gauss_orbit::initial_orbit_determination::{IODParams, RootBracket};
use gauss_orbit::orbit_errors::OrbitError;
use gauss_orbit::orbit_type::ElementsContext;

/// Preliminary orbit of (2) Pallas from three observations.
///
/// The triplet gives three positive roots of the distance equation; the table printed first
/// shows which one yields a positive slant range, and the bracket selects it.
///
/// Usage:
///   cargo run --example pallas [--steps]
fn main() -> Result<(), OrbitError> {
    let show_steps = std::env::args().any(|a| a == "--steps");

    // Epochs in days, RA in hours, Dec in degrees, geocentric Sun in AU (equatorial)
    let triplet = GaussObs::from_hours_degrees(
        [6370.57744, 6378.56789, 6390.65113],
        [6.38029, 6.40793, 6.38762],
        [-24.25104, -26.48060, -29.48400],
        [
            [-0.7735829, -0.5704494, -0.2473703],
            [-0.6780640, -0.6624821, -0.2872733],
            [-0.5091536, -0.7766740, -0.3367798],
        ],
    )?;
    let params = IODParams::default();

    let geometry = triplet.geometry(&params)?;
    println!(
        "D0 = {:.6e}, A = {:.6}, B = {:.6}, C = {:.6}",
        geometry.d0, geometry.coeff_a, geometry.coeff_b, geometry.coeff_c
    );
    println!(
        "Positive roots: {:?}",
        geometry.candidate_roots(&params)?.as_slice()
    );

    println!("{:>8} {:>14} {:>14}", "r2", "rho2", "f(r2)");
    for row in geometry.tabulate(&RootBracket::new(0.5, 3.0, 1.0)?, 25) {
        println!(
            "{:>8.3} {:>14.6} {:>14.6e}",
            row.x, row.slant_range, row.residual
        );
    }

    let bracket = RootBracket::new(2.0, 3.0, 2.3)?;
    let mut session = GaussRefinement::new(&triplet, &bracket, &params)?;
    println!(
        "\nRoot r2 = {:.9} after {} Newton steps",
        session.root().x,
        session.root().iterations
    );

    let result = if show_steps {
        loop {
            let step = session.advance()?;
            println!(
                "  iteration {:>2}: |dp| = {:.3e}",
                step.iteration, step.dp_norm
            );
            if step.converged {
                break session.run()?;
            }
        }
    } else {
        session.run()?
    };

    println!("\n{result}\n");
    println!("{}", result.elements(&ElementsContext::heliocentric())?);
    Ok(())
}

mod common;

use approx::assert_relative_eq;
use gauss_orbit::initial_orbit_determination::gauss::OcticRoot;
use gauss_orbit::initial_orbit_determination::refinement::GaussRefinement;
use gauss_orbit::initial_orbit_determination::{determine_orbit, IODParams, RootBracket};
use gauss_orbit::orbit_errors::OrbitError;
use gauss_orbit::orbit_type::{ElementsContext, OrbitType};
use nalgebra::Vector3;

use crate::common::{pallas_bracket, pallas_triplet, rebek_jewel_bracket, rebek_jewel_triplet};

#[test]
fn test_pallas_state() {
    let result = determine_orbit(&pallas_triplet(), &pallas_bracket(), &IODParams::default())
        .unwrap();

    assert_eq!(result.iterations, 18);
    assert_relative_eq!(result.root, 2.264906312526451, epsilon = 1e-9);
    assert_relative_eq!(result.slant_range, 1.6782978155022739, epsilon = 1e-8);
    assert_relative_eq!(result.state.epoch, 6378.558200430307, epsilon = 1e-9);
    assert_relative_eq!(
        result.state.position,
        Vector3::new(0.5179953050915935, 2.1556086936333294, -0.4608030085248795),
        epsilon = 1e-8
    );
    assert_relative_eq!(
        result.state.velocity,
        Vector3::new(-0.7187610783678979, 0.06805577375198091, 0.03512432684630462),
        epsilon = 1e-8
    );
    assert_relative_eq!(
        result.ranges,
        Vector3::new(1.7350042307905804, 1.6776969854777, 1.6039253443027208),
        epsilon = 1e-8
    );
}

#[test]
fn test_pallas_elements() {
    let result = determine_orbit(&pallas_triplet(), &pallas_bracket(), &IODParams::default())
        .unwrap();
    let elements = result.elements(&ElementsContext::heliocentric()).unwrap();

    assert_eq!(elements.orbit_type(), OrbitType::Elliptical);
    assert_relative_eq!(elements.size(), 2.771844441714096, epsilon = 1e-7);
    assert_relative_eq!(elements.eccentricity(), 0.23369609099693647, epsilon = 1e-8);
    assert_relative_eq!(elements.perihelion_time(), 6519.501612980769, epsilon = 1e-5);

    let orientation = elements.orientation();
    assert_relative_eq!(orientation.inclination, 0.6072798071268944, epsilon = 1e-8);
    assert_relative_eq!(orientation.ascending_node, 3.025416803245941, epsilon = 1e-8);
    assert_relative_eq!(orientation.periapsis_arg, 5.409214704509135, epsilon = 1e-7);
}

#[test]
fn test_rebek_jewel() {
    let triplet = rebek_jewel_triplet();
    let params = IODParams::default();

    let geometry = triplet.geometry(&params).unwrap();
    assert_relative_eq!(geometry.d0, 2.5024652210013654e-05, max_relative = 1e-8);
    assert_relative_eq!(geometry.aa, 1.129224001825112, max_relative = 1e-8);
    assert_relative_eq!(geometry.bb, -1.0828889411781193, max_relative = 1e-8);

    let result = determine_orbit(&triplet, &rebek_jewel_bracket(), &params).unwrap();
    assert_eq!(result.iterations, 20);
    assert_relative_eq!(result.root, 1.862139160805794, epsilon = 1e-9);
    assert_relative_eq!(result.slant_range, 0.9615184197515608, epsilon = 1e-8);
    assert_relative_eq!(result.state.epoch, 6374.5672836018475, epsilon = 1e-9);
    assert_relative_eq!(
        result.state.position,
        Vector3::new(0.9295194317133033, 1.4858928864117351, 0.6305556942472927),
        epsilon = 1e-8
    );
    assert_relative_eq!(
        result.state.velocity,
        Vector3::new(0.06362636984688574, -0.9808128932986211, -0.22743903847408387),
        epsilon = 1e-8
    );

    let elements = result.elements(&ElementsContext::heliocentric()).unwrap();
    assert_eq!(elements.orbit_type(), OrbitType::Elliptical);
    assert_relative_eq!(elements.size(), 17.868231782694515, max_relative = 1e-6);
    assert_relative_eq!(elements.eccentricity(), 0.9671563003756055, epsilon = 1e-8);
    assert_relative_eq!(elements.perihelion_time(), 6470.935047118755, epsilon = 1e-4);
    assert_relative_eq!(
        elements.orientation().inclination,
        2.8316305810118223,
        epsilon = 1e-8
    );
}

#[test]
fn test_refinement_steps_decrease() {
    let mut session =
        GaussRefinement::new(&pallas_triplet(), &pallas_bracket(), &IODParams::default())
            .unwrap();

    let mut dps = Vec::new();
    loop {
        let step = session.advance().unwrap();
        dps.push(step.dp_norm);
        if step.converged {
            break;
        }
    }

    assert_eq!(dps.len(), 18);
    assert!(dps[1..].windows(2).all(|w| w[1] < w[0]));
    assert!(dps[16] > 1e-7);
    assert!(dps[17] < 1e-7);
}

#[test]
fn test_stepping_matches_run() {
    let params = IODParams::default();
    let triplet = pallas_triplet();

    let mut session = GaussRefinement::new(&triplet, &pallas_bracket(), &params).unwrap();
    let mut step = session.advance().unwrap();
    while !step.converged {
        step = session.advance().unwrap();
    }

    let result = determine_orbit(&triplet, &pallas_bracket(), &params).unwrap();
    assert_eq!(step.position, result.state.position);
    assert_eq!(step.velocity, result.state.velocity);
    assert_eq!(step.epoch, result.state.epoch);
    assert_eq!(step.iteration, result.iterations);
}

#[test]
fn test_choose_root_by_enumeration() {
    let params = IODParams::default();
    let triplet = pallas_triplet();
    let geometry = triplet.geometry(&params).unwrap();

    let roots = geometry.candidate_roots(&params).unwrap();
    let largest = *roots.last().unwrap();
    let bracket = RootBracket::new(largest - 0.05, largest + 0.05, largest).unwrap();
    let root = geometry.solve_octic(&bracket, &params).unwrap();

    let result = GaussRefinement::from_root(&triplet, geometry, root, &params)
        .unwrap()
        .run()
        .unwrap();
    let reference = determine_orbit(&triplet, &pallas_bracket(), &params).unwrap();

    assert_relative_eq!(
        result.state.position,
        reference.state.position,
        epsilon = 1e-9
    );
}

#[test]
fn test_small_root_has_negative_range() {
    let params = IODParams::default();
    let geometry = pallas_triplet().geometry(&params).unwrap();

    // the two small roots lie inside the Earth's orbit and give ρ₂ < 0
    let table = geometry.tabulate(&RootBracket::new(0.85, 0.98, 0.9).unwrap(), 13);
    assert!(table.iter().all(|row| row.slant_range < 0.0));
}

#[test]
fn test_bracket_selects_non_physical_root() {
    let params = IODParams::default();
    let geometry = pallas_triplet().geometry(&params).unwrap();

    // no automatic root selection: the bracket alone decides
    let bracket = RootBracket::new(0.5, 1.5, 0.9).unwrap();
    let root = geometry.solve_octic(&bracket, &params).unwrap();
    assert_relative_eq!(root.x, 0.9111986511136881, epsilon = 1e-9);
    assert!(root.slant_range < 0.0);

    let manual = OcticRoot {
        x: -1.0,
        slant_range: 0.0,
        iterations: 0,
    };
    assert!(matches!(
        GaussRefinement::from_root(&pallas_triplet(), geometry, manual, &params),
        Err(OrbitError::DegenerateGeometry(_))
    ));
}

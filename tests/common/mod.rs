#![allow(dead_code)]

use approx::assert_relative_eq;
use gauss_orbit::initial_orbit_determination::gauss::GaussObs;
use gauss_orbit::initial_orbit_determination::RootBracket;
use gauss_orbit::kepler::angle_diff;
use gauss_orbit::orbit_type::KeplerElements;

/// Three observations of (2) Pallas, with the geocentric position of the Sun.
pub fn pallas_triplet() -> GaussObs {
    GaussObs::from_hours_degrees(
        [6370.57744, 6378.56789, 6390.65113],
        [6.38029, 6.40793, 6.38762],
        [-24.25104, -26.48060, -29.48400],
        [
            [-0.7735829, -0.5704494, -0.2473703],
            [-0.6780640, -0.6624821, -0.2872733],
            [-0.5091536, -0.7766740, -0.3367798],
        ],
    )
    .unwrap()
}

pub fn pallas_bracket() -> RootBracket {
    RootBracket::new(2.0, 3.0, 2.3).unwrap()
}

/// Three observations of comet Rebek-Jewel.
pub fn rebek_jewel_triplet() -> GaussObs {
    GaussObs::from_hours_degrees(
        [6370.57744, 6374.57284, 6378.56789],
        [5.41652, 5.12686, 4.75436],
        [21.85272, 22.14104, 22.32127],
        [
            [-0.7735829, -0.5704494, -0.2473703],
            [-0.7275905, -0.6179560, -0.2679668],
            [-0.6780640, -0.6624821, -0.2872733],
        ],
    )
    .unwrap()
}

pub fn rebek_jewel_bracket() -> RootBracket {
    RootBracket::new(1.0, 3.0, 1.8).unwrap()
}

/// Compare two element sets, angles modulo 2π.
pub fn assert_elements_close(actual: &KeplerElements, expected: &KeplerElements, epsilon: f64) {
    assert_eq!(actual.orbit_type(), expected.orbit_type());
    assert_relative_eq!(
        actual.perihelion_time(),
        expected.perihelion_time(),
        epsilon = epsilon
    );
    assert_relative_eq!(actual.size(), expected.size(), epsilon = epsilon);
    assert_relative_eq!(
        actual.eccentricity(),
        expected.eccentricity(),
        epsilon = epsilon
    );

    let (a, e) = (actual.orientation(), expected.orientation());
    assert_relative_eq!(a.inclination, e.inclination, epsilon = epsilon);
    assert!(angle_diff(a.ascending_node, e.ascending_node).abs() < epsilon);
    assert!(angle_diff(a.periapsis_arg, e.periapsis_arg).abs() < epsilon);
}


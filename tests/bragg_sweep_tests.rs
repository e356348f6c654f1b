use num_complex::Complex64;

use tmm::grating::Bragg;
use tmm::material::Material;
use tmm::powers::matrix_power;
use tmm::result::Columns;
use tmm::settings::Settings;
use tmm::sweep::Sweep;

const TOL: f64 = 1e-9;

/// Explicit 2x2 complex multiplication, independent of the matrix library.
fn mul(a: [[Complex64; 2]; 2], b: [[Complex64; 2]; 2]) -> [[Complex64; 2]; 2] {
    let mut out = [[Complex64::new(0.0, 0.0); 2]; 2];
    for i in 0..2 {
        for j in 0..2 {
            out[i][j] = a[i][0] * b[0][j] + a[i][1] * b[1][j];
        }
    }
    out
}

fn propagation(wavelength: f64, length: f64, neff: f64) -> [[Complex64; 2]; 2] {
    let phi = 2.0 * std::f64::consts::PI / wavelength * neff * length;
    let zero = Complex64::new(0.0, 0.0);
    [
        [Complex64::new(0.0, phi).exp(), zero],
        [zero, Complex64::new(0.0, -phi).exp()],
    ]
}

fn step(n1: f64, n2: f64) -> [[Complex64; 2]; 2] {
    let a = Complex64::new((n1 + n2) / (2.0 * (n1 * n2).sqrt()), 0.0);
    let b = Complex64::new((n1 - n2) / (2.0 * (n1 * n2).sqrt()), 0.0);
    [[a, b], [b, a]]
}

#[test]
fn period_matrix_matches_hand_computation() {
    // period=1.0, duty=0.5, wavelength=1.0, n1=2.0, n2=1.5, lossless
    let grating = Bragg::new(1.0, 0.5, 1.0).unwrap();
    let tp = grating.transfer_matrix(1.0, 2.0, 1.5, 0.0);

    let expected = mul(
        mul(mul(propagation(1.0, 0.5, 2.0), step(2.0, 1.5)), propagation(1.0, 0.5, 1.5)),
        step(1.5, 2.0),
    );

    for i in 0..2 {
        for j in 0..2 {
            let diff = (tp[(i, j)] - expected[i][j]).norm();
            assert!(diff < TOL, "entry ({}, {}): diff {}", i, j, diff);
        }
    }
}

#[test]
fn ten_period_scattering_matrix_matches_repeated_multiplication() {
    let grating = Bragg::new(1.0, 0.5, 10.0).unwrap();
    let tp = grating.transfer_matrix(1.0, 2.0, 1.5, 0.0);
    let s = grating.scattering_matrix(1.0, 2.0, 1.5, 0.0);

    let mut naive = [
        [Complex64::new(1.0, 0.0), Complex64::new(0.0, 0.0)],
        [Complex64::new(0.0, 0.0), Complex64::new(1.0, 0.0)],
    ];
    let tp_arr = [
        [tp[(0, 0)], tp[(0, 1)]],
        [tp[(1, 0)], tp[(1, 1)]],
    ];
    for _ in 0..10 {
        naive = mul(naive, tp_arr);
    }

    for i in 0..2 {
        for j in 0..2 {
            let diff = (s[(i, j)] - naive[i][j]).norm();
            assert!(diff < 1e-7, "entry ({}, {}): diff {}", i, j, diff);
        }
    }

    // and the library's own power routine agrees
    let powered = matrix_power(&tp, 10);
    assert!((s - powered).norm() < TOL);
}

fn base_settings() -> Settings {
    Settings {
        wavelengths: vec![1.50, 1.55, 1.60],
        periods: vec![0.38, 0.39],
        duty_cycles: vec![0.5],
        n_periods: vec![10.0, 20.0],
        n1: Some(Material::from_values(&[2.0]).unwrap()),
        n2: Some(Material::from_values(&[1.5]).unwrap()),
        loss: Some(Material::from_values(&[0.0]).unwrap()),
        ..Default::default()
    }
}

#[test]
fn sweep_emits_one_row_per_point_in_canonical_order() {
    let mut sweep = Sweep::new(base_settings());
    sweep.solve().unwrap();

    // 2 periods x 1 duty cycle x 2 counts x 3 wavelengths
    assert_eq!(sweep.result.len(), 12);

    // wavelength is the innermost loop, period the outermost
    assert_eq!(sweep.result[0].period, 0.38);
    assert_eq!(sweep.result[0].n_periods, 10.0);
    assert_eq!(sweep.result[0].wavelength, 1.50);
    assert_eq!(sweep.result[1].wavelength, 1.55);
    assert_eq!(sweep.result[3].n_periods, 20.0);
    assert_eq!(sweep.result[6].period, 0.39);

    for row in &sweep.result {
        assert_eq!(row.n1, 2.0);
        assert_eq!(row.n2, 1.5);
        assert!(row.reflectance >= 0.0);
        assert!(row.transmittance >= 0.0);
        assert!((row.reflectance + row.transmittance - 1.0).abs() < TOL);
        assert_eq!(row.w1, None);
        assert_eq!(row.group_delay, None);
    }
}

#[test]
fn width_sweep_multiplies_points_and_fills_columns() {
    let mut settings = base_settings();
    settings.width1 = vec![0.4, 0.5];
    let mut sweep = Sweep::new(settings);
    sweep.solve().unwrap();

    assert_eq!(sweep.result.len(), 24);
    assert!(sweep.columns.width1);
    assert!(!sweep.columns.width2);
    assert_eq!(sweep.result[0].w1, Some(0.4));
    assert_eq!(sweep.result[0].w2, None);
}

#[test]
fn sampled_material_follows_the_wavelength_index() {
    let mut settings = base_settings();
    settings.n1 = Some(Material::from_values(&[2.0, 2.1, 2.2]).unwrap());
    let mut sweep = Sweep::new(settings);
    sweep.solve().unwrap();

    assert_eq!(sweep.result[0].n1, 2.0);
    assert_eq!(sweep.result[1].n1, 2.1);
    assert_eq!(sweep.result[2].n1, 2.2);
}

#[test]
fn short_sampled_list_aborts_the_sweep() {
    let mut settings = base_settings();
    settings.n1 = Some(Material::from_values(&[2.0, 2.1]).unwrap());
    let mut sweep = Sweep::new(settings);
    assert!(sweep.solve().is_err());
}

#[test]
fn group_delay_column_requires_interval_and_unsampled_models() {
    let mut settings = base_settings();
    settings.dl = 1e-4;
    assert!(Columns::from_settings(&settings).group_delay);

    let mut sweep = Sweep::new(settings.clone());
    sweep.solve().unwrap();
    assert!(sweep.result.iter().all(|r| r.group_delay.is_some()));

    settings.loss = Some(Material::from_values(&[0.0, 0.1, 0.2]).unwrap());
    assert!(!Columns::from_settings(&settings).group_delay);
    let mut sweep = Sweep::new(settings);
    sweep.solve().unwrap();
    assert!(sweep.result.iter().all(|r| r.group_delay.is_none()));
}

#[test]
fn fractional_period_count_fails_before_any_row() {
    let mut settings = base_settings();
    settings.n_periods = vec![10.0, 2.5];
    let mut sweep = Sweep::new(settings);
    assert!(sweep.solve().is_err());
    assert!(sweep.result.is_empty());
}

#[test]
fn json_rows_round_trip() {
    let mut sweep = Sweep::new(base_settings());
    sweep.solve().unwrap();

    let mut buf = Vec::new();
    tmm::output::write_json(&mut buf, &sweep.result).unwrap();
    let parsed: serde_json::Value = serde_json::from_slice(&buf).unwrap();
    let rows = parsed.as_array().unwrap();
    assert_eq!(rows.len(), sweep.result.len());
    assert_eq!(rows[0]["period"], 0.38);
    assert!(rows[0].get("w1").is_none());
    assert!(rows[0]["R"].is_number());
}

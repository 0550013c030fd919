mod common;

use std::f64::consts::PI;

use approx::assert_abs_diff_eq;
use common::{init_tracing, make_known_orbit};
use galdyn::dynamics::period::{
    peak_to_peak_period, radial_period, PeriodAggregate, PeriodParams,
};
use galdyn::galdyn_errors::GaldynError;

const N_TIMES: usize = 16384;

fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| start + (stop - start) * i as f64 / (n - 1) as f64)
        .collect()
}

#[test]
fn test_peak_to_peak_period() {
    init_tracing();
    let t = linspace(0.0, 10.0, N_TIMES);

    for true_period in [1.0, 2.0, 4.123] {
        let f: Vec<f64> = t.iter().map(|x| (2.0 * PI / true_period * x).sin()).collect();
        let period = peak_to_peak_period(&t, &f, &PeriodParams::default()).unwrap();
        assert_abs_diff_eq!(period, true_period, epsilon = 1e-3);
    }
}

#[test]
fn test_modulated_period() {
    init_tracing();
    let t = linspace(0.0, 10.0, N_TIMES);

    for true_period in [1.0, 2.0, 4.123] {
        let f: Vec<f64> = t
            .iter()
            .map(|x| {
                (2.0 * PI / true_period * x).sin()
                    + 0.1 * (2.0 * PI / (10.0 * true_period) * x).cos()
            })
            .collect();
        let period = peak_to_peak_period(&t, &f, &PeriodParams::default()).unwrap();
        assert_abs_diff_eq!(period, true_period, epsilon = 1e-3);
    }
}

#[test]
fn test_ten_periods() {
    init_tracing();

    for true_period in [1.0, 2.0, 4.123] {
        let t = linspace(0.0, 10.0 * true_period, 10_000);
        for modulation in [0.0, 0.1] {
            let f: Vec<f64> = t
                .iter()
                .map(|x| {
                    (2.0 * PI / true_period * x).sin()
                        + modulation * (2.0 * PI / (10.0 * true_period) * x).cos()
                })
                .collect();
            let period = peak_to_peak_period(&t, &f, &PeriodParams::default()).unwrap();
            assert_abs_diff_eq!(period, true_period, epsilon = 1e-3);
        }
    }
}

#[test]
fn test_median_aggregate() {
    init_tracing();
    let t = linspace(0.0, 10.0, N_TIMES);
    let params = PeriodParams::builder()
        .aggregate(PeriodAggregate::Median)
        .build()
        .unwrap();

    let true_period = 2.0;
    let f: Vec<f64> = t
        .iter()
        .map(|x| (2.0 * PI / true_period * x).sin() + 0.1 * (2.0 * PI / 20.0 * x).cos())
        .collect();
    let period = peak_to_peak_period(&t, &f, &params).unwrap();
    assert_abs_diff_eq!(period, true_period, epsilon = 1e-3);
}

#[test]
fn test_too_few_extrema() {
    init_tracing();
    let t = linspace(0.0, 10.0, N_TIMES);
    let f: Vec<f64> = t.iter().map(|x| (2.0 * PI / 30.0 * x).sin()).collect();

    assert!(matches!(
        peak_to_peak_period(&t, &f, &PeriodParams::default()),
        Err(GaldynError::InsufficientData(_))
    ));
}

#[test]
fn test_single_kind_requires_opt_in() {
    init_tracing();
    // two maxima, one minimum
    let t = linspace(0.0, 1.6, 1601);
    let f: Vec<f64> = t.iter().map(|x| (2.0 * PI * x).sin()).collect();

    assert!(matches!(
        peak_to_peak_period(&t, &f, &PeriodParams::default()),
        Err(GaldynError::InsufficientData(_))
    ));

    let params = PeriodParams::builder()
        .single_kind_fallback(true)
        .build()
        .unwrap();
    let period = peak_to_peak_period(&t, &f, &params).unwrap();
    assert_abs_diff_eq!(period, 1.0, epsilon = 1e-6);
}

#[test]
fn test_radial_period_of_integrated_loop() {
    init_tracing();
    let orbit = make_known_orbit(0.5, 0.0);
    let period = radial_period(&orbit, &PeriodParams::default()).unwrap();

    // radial oscillation of the Binney & Tremaine loop orbit
    assert_abs_diff_eq!(period, 1.81, epsilon = 1e-2);
}

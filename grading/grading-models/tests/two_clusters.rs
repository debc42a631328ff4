//! Scaler, clustering and grade mapping on two well-separated groups.

#![allow(clippy::unwrap_used, clippy::cast_precision_loss, clippy::float_cmp)]

use grading_models::{
    ClusteringConfig, ClusteringEngine, FeatureScaler, GradeMapper, ModelBundle,
};

/// Ten soft specimens (low proxy) and ten hard ones (high proxy) over three
/// features; the proxy is column 1.
fn corpus() -> Vec<Vec<f64>> {
    (0..20)
        .map(|i| {
            let jitter = (i % 5) as f64 * 0.01;
            if i < 10 {
                vec![3.0 + jitter, 1.0 + jitter, -0.5]
            } else {
                vec![3.0 - jitter, 8.0 + jitter, -4.0]
            }
        })
        .collect()
}

#[test]
fn harder_group_gets_higher_grade() {
    let corpus = corpus();

    let mut scaler = FeatureScaler::new();
    scaler.fit(&corpus).unwrap();
    let scaled = scaler.apply_all(&corpus).unwrap();

    let mut engine = ClusteringEngine::new(ClusteringConfig::default()).unwrap();
    let fit = engine.fit_partition(&scaled, 2).unwrap();

    assert!(fit.assignments[..10].iter().all(|&a| a == fit.assignments[0]));
    assert!(fit.assignments[10..].iter().all(|&a| a == fit.assignments[10]));
    assert_ne!(fit.assignments[0], fit.assignments[10]);

    let mut mapper = GradeMapper::new();
    mapper.fit(&fit.model, &fit.assignments, &corpus, 1).unwrap();
    assert_eq!(mapper.apply(fit.assignments[0]).unwrap(), 1);
    assert_eq!(mapper.apply(fit.assignments[10]).unwrap(), 2);

    let bundle = ModelBundle::new(
        vec!["a".into(), "proxy".into(), "c".into()],
        "proxy",
        scaler,
        fit.model,
        mapper.into_map().unwrap(),
    )
    .unwrap();

    let soft = bundle.assess(&[3.0, 1.2, -0.5]).unwrap();
    let hard = bundle.assess(&[3.0, 7.9, -4.0]).unwrap();
    assert_eq!(soft.grade, 1);
    assert_eq!(hard.grade, 2);
    assert!(soft.distance.is_finite() && hard.distance.is_finite());
}

#[test]
fn duplicated_points_split_into_exact_centroids() {
    let data = vec![
        vec![0.0, 0.0],
        vec![0.0, 0.0],
        vec![10.0, 10.0],
        vec![10.0, 10.0],
    ];

    let mut engine = ClusteringEngine::new(ClusteringConfig::default()).unwrap();
    let fit = engine.fit_partition(&data, 2).unwrap();

    let low = fit.assignments[0];
    let high = fit.assignments[2];
    assert_ne!(low, high);
    assert_eq!(fit.assignments, vec![low, low, high, high]);
    assert_eq!(fit.model.centroids()[low], vec![0.0, 0.0]);
    assert_eq!(fit.model.centroids()[high], vec![10.0, 10.0]);

    let mut mapper = GradeMapper::new();
    mapper.fit(&fit.model, &fit.assignments, &data, 0).unwrap();
    assert_eq!(mapper.apply(low).unwrap(), 1);
    assert_eq!(mapper.apply(high).unwrap(), 2);
}

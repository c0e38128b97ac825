//! # Integration Tests for Moodmix
//!
//! End-to-end checks of catalog loading, the aggregate → adjust → retrieve
//! pipeline, session behaviour and the command-line binary.

use anyhow::Result;
use moodmix::{Adjustments, Catalog, Feature, MoodEngine, Session};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

const HEADER: &str = "track_name,artist_name,genre,popularity,acousticness,danceability,energy,\
                      instrumentalness,liveness,loudness,speechiness,tempo,valence";

/// Deterministic catalog with every canonical column
fn catalog_csv(rows: usize, seed: u64) -> String {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut csv = format!("{HEADER}\n");
    for i in 0..rows {
        csv.push_str(&format!(
            "Track {i},Artist {},genre{},{},{:.4},{:.4},{:.4},{:.4},{:.4},{:.2},{:.4},{:.1},{:.4}\n",
            i % 7,
            i % 4,
            rng.gen_range(0..100),
            rng.gen::<f64>(),
            rng.gen::<f64>(),
            rng.gen::<f64>(),
            rng.gen::<f64>(),
            rng.gen::<f64>(),
            rng.gen_range(-40.0..0.0),
            rng.gen::<f64>(),
            rng.gen_range(60.0..180.0),
            rng.gen::<f64>(),
        ));
    }
    csv
}

fn engine(rows: usize) -> Arc<MoodEngine> {
    let catalog = Catalog::from_reader(catalog_csv(rows, 42).as_bytes()).unwrap();
    Arc::new(MoodEngine::load(catalog).unwrap())
}

/// Writes a CSV catalog into a fresh temp dir
fn write_catalog(contents: &str) -> Result<(TempDir, PathBuf)> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("tracks.csv");
    let mut file = std::fs::File::create(&path)?;
    file.write_all(contents.as_bytes())?;
    Ok((temp_dir, path))
}

#[cfg(test)]
mod loading_tests {
    use super::*;
    use moodmix::EngineError;

    #[test]
    fn test_load_from_file() -> Result<()> {
        let (_temp_dir, path) = write_catalog(&catalog_csv(25, 1))?;
        let engine = MoodEngine::load(Catalog::from_path(&path)?)?;

        assert_eq!(engine.len(), 25);
        assert_eq!(engine.columns(), &Feature::ALL);
        assert_eq!(engine.item_summary(3)?.name, "Track 3");
        Ok(())
    }

    #[test]
    fn test_catalog_without_features_is_schema_error() -> Result<()> {
        let (_temp_dir, path) = write_catalog("track_name,artist_name\nA,B\nC,D\n")?;
        let result = MoodEngine::load(Catalog::from_path(&path)?);
        assert!(matches!(result, Err(EngineError::Schema { .. })));
        Ok(())
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = Catalog::from_path("/no/such/catalog.csv");
        assert!(matches!(result, Err(EngineError::Io(_))));
    }

    #[test]
    fn test_degenerate_columns_never_produce_nan() {
        let csv = "energy,tempo,loudness,valence\n0.5,120,-5,0.1\n0.5,120,-5,0.9\n0.5,120,-5,0.4\n";
        let engine = MoodEngine::load(Catalog::from_reader(csv.as_bytes()).unwrap()).unwrap();

        assert!(engine.matrix().rows().flatten().all(|v| v.is_finite()));
        let target = engine.aggregate(&[1]).unwrap();
        let hits = engine.retrieve(&target, &HashSet::new(), 3).unwrap();
        assert!(hits.iter().all(|h| h.score.is_finite()));
        assert_eq!(hits[0].index, 1);
    }
}

#[cfg(test)]
mod pipeline_tests {
    use super::*;
    use moodmix::similarity::{cosine_similarity, score_rows, top_n};
    use moodmix::{FeatureMatrix, KeywordTable};

    fn padded(prefix: &[f64]) -> Vec<f64> {
        let mut row = vec![0.0; Feature::ALL.len()];
        row[..prefix.len()].copy_from_slice(prefix);
        row
    }

    #[test]
    fn test_three_item_retrieval_scenario() {
        let matrix = FeatureMatrix::from_rows(
            Feature::ALL.to_vec(),
            vec![padded(&[1.0, 0.0]), padded(&[0.0, 1.0]), padded(&[1.0, 1.0])],
        )
        .unwrap();

        let scores = score_rows(&matrix, &padded(&[1.0]), &HashSet::new());
        let ranked = top_n(&scores, 2);

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].index, 0);
        assert!((ranked[0].score - 1.0).abs() < 1e-12);
        assert_eq!(ranked[1].index, 2);
        assert!((ranked[1].score - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-12);

        // B is orthogonal: even with room for it, the positivity floor drops it
        assert_eq!(top_n(&scores, 3).len(), 2);
    }

    #[test]
    fn test_aggregate_is_exact_column_mean() {
        let engine = engine(60);
        let mut rng = StdRng::seed_from_u64(9);

        for _ in 0..20 {
            let size = rng.gen_range(1..10);
            let indices: Vec<usize> = (0..size).map(|_| rng.gen_range(0..engine.len())).collect();
            let mood = engine.aggregate(&indices).unwrap();

            for (col, value) in mood.iter().enumerate() {
                let expected = indices
                    .iter()
                    .map(|&i| engine.matrix().row(i)[col])
                    .sum::<f64>()
                    / indices.len() as f64;
                assert!((value - expected).abs() < 1e-12);
            }
        }
        assert_eq!(engine.aggregate(&[]).unwrap(), vec![0.0; Feature::ALL.len()]);
    }

    #[test]
    fn test_negative_valence_scenario_on_engine() {
        let engine = engine(30);
        let base = engine.aggregate(&[4, 8, 15]).unwrap();
        let adjustments = Adjustments::from_named([("valence", -0.8)]);

        let adjusted = engine.adjust(&base, &adjustments).unwrap();
        let col = |f: Feature| engine.columns().iter().position(|&c| c == f).unwrap();

        let energy = col(Feature::Energy);
        let acoustic = col(Feature::Acousticness);
        let valence = col(Feature::Valence);
        assert!((adjusted[energy] - (base[energy] - 0.32).clamp(-3.0, 3.0)).abs() < 1e-12);
        assert!((adjusted[acoustic] - (base[acoustic] + 0.32).clamp(-3.0, 3.0)).abs() < 1e-12);
        assert!((adjusted[valence] - (base[valence] - 0.8).clamp(-3.0, 3.0)).abs() < 1e-12);
        assert_eq!(adjusted[col(Feature::Tempo)], base[col(Feature::Tempo)]);
    }

    #[test]
    fn test_adjust_identity_under_empty_map() {
        let engine = engine(30);
        let base = engine.aggregate(&[1, 2, 3]).unwrap();
        assert_eq!(engine.adjust(&base, &Adjustments::new()).unwrap(), base);
    }

    #[test]
    fn test_turn_bounds_outlier_selection() {
        let mut csv = String::from("track_name,energy,speechiness,valence\n");
        for i in 0..30 {
            let energy = f64::from(i % 10) / 10.0;
            let valence = f64::from(i * 7 % 10) / 10.0;
            csv.push_str(&format!("Track {i},{energy:.1},0.05,{valence:.1}\n"));
        }
        csv.push_str("Monologue,0.6,0.95,0.5\n");
        let catalog = Catalog::from_reader(csv.as_bytes()).unwrap();
        let engine = Arc::new(MoodEngine::load(catalog).unwrap());
        let speech = engine.columns().iter().position(|&c| c == Feature::Speechiness).unwrap();

        let base = engine.aggregate(&[30]).unwrap();
        assert!(base[speech] > 3.0);

        let adjustments = KeywordTable::default().extract("happy");
        let target = engine.adjust(&base, &adjustments).unwrap();
        assert!(target.iter().all(|v| (-3.0..=3.0).contains(v)));
        assert_eq!(target[speech], 3.0);

        let mut session = Session::new(Arc::clone(&engine));
        session.set_initial_selection(&[30]).unwrap();
        let turn = session.turn(&adjustments).unwrap();
        assert!(!turn.recommendations.is_empty());
        for rec in &turn.recommendations {
            let expected = cosine_similarity(engine.matrix().row(rec.item.index), &target);
            assert!((rec.similarity - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn test_retrieve_invariants_over_random_targets() {
        let engine = engine(80);
        let mut rng = StdRng::seed_from_u64(3);

        for _ in 0..25 {
            let target: Vec<f64> = (0..engine.width()).map(|_| rng.gen_range(-3.0..3.0)).collect();
            let exclude: HashSet<usize> = (0..15).map(|_| rng.gen_range(0..engine.len())).collect();
            let n = rng.gen_range(0..20);

            let hits = engine.retrieve(&target, &exclude, n).unwrap();
            assert!(hits.len() <= n);
            assert!(hits.iter().all(|h| h.score > 0.0));
            assert!(hits.iter().all(|h| !exclude.contains(&h.index)));
            assert!(hits.windows(2).all(|w| {
                w[0].score > w[1].score || (w[0].score == w[1].score && w[0].index < w[1].index)
            }));

            let again = engine.retrieve(&target, &exclude, n).unwrap();
            assert_eq!(hits, again);
        }
    }

    #[test]
    fn test_zero_target_recommends_nothing() {
        let engine = engine(20);
        let hits = engine
            .retrieve(&vec![0.0; engine.width()], &HashSet::new(), 10)
            .unwrap();
        assert!(hits.is_empty());
    }
}

#[cfg(test)]
mod session_tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_growing_selection_is_never_recommended() {
        let engine = engine(50);
        let mut session = Session::new(Arc::clone(&engine)).with_counts(50, 50);
        session.set_initial_selection(&[0, 1, 2, 3, 4]).unwrap();

        let first = session.turn(&Adjustments::new()).unwrap();
        let picks: Vec<usize> = first
            .recommendations
            .iter()
            .take(5)
            .map(|r| r.item.index)
            .collect();
        session.commit(&picks).unwrap();
        let padding: Vec<usize> = (5..50)
            .filter(|i| !picks.contains(i))
            .take(5 - picks.len())
            .collect();
        session.commit(&padding).unwrap();
        assert_eq!(session.selection().len(), 10);

        for message in [
            Adjustments::new(),
            Adjustments::new().with(Feature::Energy, 1.5),
            Adjustments::new().with(Feature::Valence, -2.0),
        ] {
            let turn = session.turn(&message).unwrap();
            for rec in &turn.recommendations {
                assert!(!session.selection().contains(&rec.item.index));
            }
        }
    }

    #[test]
    fn test_sessions_share_engine_but_not_selection() {
        let engine = engine(40);

        let handles: Vec<_> = (0..4)
            .map(|worker| {
                let engine = Arc::clone(&engine);
                thread::spawn(move || {
                    let mut session = Session::new(engine);
                    session.set_initial_selection(&[worker]).unwrap();
                    session.commit(&[10 + worker, 20 + worker]).unwrap();
                    session.selection().to_vec()
                })
            })
            .collect();

        for (worker, handle) in handles.into_iter().enumerate() {
            let selection = handle.join().unwrap();
            assert_eq!(selection, vec![worker, 10 + worker, 20 + worker]);
        }
    }

    #[test]
    fn test_shared_session_serializes_commits() {
        let shared = Session::new(engine(40)).into_shared();

        let handles: Vec<_> = (0..4)
            .map(|worker| {
                let shared = Arc::clone(&shared);
                thread::spawn(move || {
                    for i in 0..10 {
                        let index = (worker * 7 + i) % 40;
                        shared.lock().unwrap().commit(&[index]).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let session = shared.lock().unwrap();
        let distinct: HashSet<_> = session.selection().iter().copied().collect();
        assert_eq!(distinct.len(), session.selection().len());
        assert_eq!(session.excluded().len(), session.selection().len());
    }
}

#[cfg(test)]
mod cli_tests {
    use super::*;
    use std::process::Command;

    fn moodmix() -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_moodmix"));
        cmd.env_remove("MOODMIX_CONFIG");
        cmd
    }

    #[test]
    fn test_cli_help_displays_correctly() {
        let output = moodmix().arg("--help").output().expect("Failed to run help command");

        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("moodmix"));
        assert!(stdout.contains("recommend"));
        assert!(stdout.contains("chat"));
        assert!(stdout.contains("info"));
    }

    #[test]
    fn test_info_command() -> Result<()> {
        let (temp_dir, path) = write_catalog(&catalog_csv(10, 5))?;
        let config = temp_dir.path().join("config.json");
        std::fs::write(&config, "{}")?;

        let output = moodmix()
            .args([
                "--config",
                config.to_str().unwrap(),
                "info",
                path.to_str().unwrap(),
                "3",
                "--json",
            ])
            .output()?;
        assert!(output.status.success());

        let item: serde_json::Value = serde_json::from_slice(&output.stdout)?;
        assert_eq!(item["index"], 3);
        assert_eq!(item["name"], "Track 3");
        Ok(())
    }

    #[test]
    fn test_recommend_excludes_starting_playlist() -> Result<()> {
        let (temp_dir, path) = write_catalog(&catalog_csv(40, 6))?;
        let config = temp_dir.path().join("config.json");
        std::fs::write(&config, r#"{ "display_count": 4 }"#)?;

        let output = moodmix()
            .args([
                "--config",
                config.to_str().unwrap(),
                "recommend",
                path.to_str().unwrap(),
                "happy and upbeat",
                "--select",
                "1,2,3",
                "--json",
            ])
            .output()?;
        assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

        let body: serde_json::Value = serde_json::from_slice(&output.stdout)?;
        let recs = body["new_recommendations"].as_array().unwrap();
        assert!(recs.len() <= 4);
        for rec in recs {
            let index = rec["index"].as_u64().unwrap();
            assert!(![1, 2, 3].contains(&index));
            assert!(rec["similarity"].as_f64().unwrap() > 0.0);
        }
        assert_eq!(body["playlist"].as_array().unwrap().len(), 3);
        assert!(body["interpretation"].as_str().unwrap().starts_with("Looking for"));
        Ok(())
    }

    #[test]
    fn test_invalid_index_fails() -> Result<()> {
        let (temp_dir, path) = write_catalog(&catalog_csv(5, 7))?;
        let config = temp_dir.path().join("config.json");
        std::fs::write(&config, "{}")?;

        let output = moodmix()
            .args(["--config", config.to_str().unwrap(), "info", path.to_str().unwrap(), "5"])
            .output()?;
        assert!(!output.status.success());
        assert!(String::from_utf8_lossy(&output.stderr).contains("out of range"));
        Ok(())
    }
}

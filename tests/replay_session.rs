use anyhow::Result;
use facematch::config::Config;
use facematch::overlay::Overlay;
use facematch::{storage, video, Feature, Session};
use facematch_vision::RecordedAnalyzer;
use std::path::PathBuf;

fn scratch() -> Result<PathBuf> {
    let dir = std::env::temp_dir().join(format!("facematch-replay-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

const REFERENCE: &str = r#"{
  "width": 300, "height": 300,
  "faces": [{"bbox": {"x": 50, "y": 50, "width": 100, "height": 100}, "score": 0.95,
             "descriptor": [0.1, 0.2, 0.3, 0.4]}]
}"#;

const CROWD: &str = r#"{
  "width": 470, "height": 360,
  "faces": [
    {"bbox": {"x": 10, "y": 10, "width": 50, "height": 50}, "score": 0.9,
     "descriptor": [0.9, 0.9, 0.9, 0.9], "age": 52.4, "gender": "male"},
    {"bbox": {"x": 200, "y": 40, "width": 60, "height": 60}, "score": 0.8,
     "descriptor": [0.15, 0.2, 0.3, 0.35], "age": 33.0, "gender": "female",
     "expressions": {"happy": 0.8, "neutral": 0.15}}
  ]
}"#;

const EMPTY: &str = r#"{"width": 470, "height": 360, "faces": []}"#;

#[test]
fn test_enrolled_reference_matches_during_replay() -> Result<()> {
    env_logger::try_init().ok();
    let root = scratch()?;
    let cfg = Config {
        store: root.join("store"),
        ..Config::default()
    };

    // enroll
    std::fs::write(root.join("reference.json"), REFERENCE)?;
    let faces = video::load_faces(&root.join("reference.json"))?;
    let record = storage::ReferenceRecord::new("reference.json", &faces[0].descriptor);
    storage::save_reference(&cfg.store, &record)?;

    // recording
    let frames = root.join("frames");
    std::fs::create_dir_all(&frames)?;
    std::fs::write(frames.join("0001.json"), CROWD)?;
    std::fs::write(frames.join("0002.json"), EMPTY)?;

    let mut session = Session::new(RecordedAnalyzer::new(), &cfg);
    session.toggle(Feature::FaceMatch);
    session.toggle(Feature::AgeGender);
    let reference = storage::load_reference(&cfg.store)?.expect("reference stored");
    session.set_reference_descriptor(reference.descriptor());

    let mut cycles = Vec::new();
    for frame in video::Playback::open(&frames)? {
        let frame = frame?;
        session.analyzer_mut().push(frame.faces);
        cycles.push(session.run_cycle(&frame.image).expect("features enabled"));
    }

    let first = &cycles[0];
    let results = first.recognition.as_ref().expect("compared");
    assert_eq!(results.len(), 2);
    assert!(!results[0].is_match);
    assert!(results[1].is_match);
    assert!(results[1].to_string().starts_with("Face 2: Match Found"));

    // 470x360 recording drawn on the 940x720 display
    let labels: Vec<String> = first.overlays.iter().filter_map(|o| o.text()).collect();
    assert_eq!(labels, vec!["Age: 52 | male", "Age: 33 | female"]);
    assert!(first.overlays.contains(&Overlay::MatchHighlight {
        bbox: facematch::face::BoundingBox {
            x: 400.0,
            y: 80.0,
            width: 120.0,
            height: 120.0
        }
    }));

    // empty frame keeps the earlier results
    assert!(cycles[1].recognition.is_none());
    assert_eq!(session.recognition_results().map(|r| r.len()), Some(2));

    std::fs::remove_dir_all(&root)?;
    Ok(())
}

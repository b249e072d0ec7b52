use github_stars_harvester::export::{render_csv, render_json, SnapshotWriter};
use github_stars_harvester::models::SnapshotRow;

fn row(id: &str, repo_name: &str, owner: &str, stars: u32, last_updated: &str) -> SnapshotRow {
    SnapshotRow {
        id: id.to_string(),
        repo_name: repo_name.to_string(),
        owner: owner.to_string(),
        stars,
        last_updated: last_updated.to_string(),
    }
}

#[test]
fn both_artifacts_carry_the_same_rows_in_order() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let csv_path = dir.path().join("repos_data.csv");
    let json_path = dir.path().join("repos_data.json");

    let rows = vec![
        row("1", "a", "o1", 5, "2024-01-01T00:00:00Z"),
        row("2", "b", "o2", 9, "2024-01-02T00:00:00Z"),
    ];

    SnapshotWriter::new(csv_path.clone(), json_path.clone())
        .write(&rows)
        .expect("Failed to write snapshot");

    let csv = std::fs::read_to_string(&csv_path).expect("Failed to read CSV");
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(
        lines,
        vec![
            "id,repo_name,owner,stars,last_updated",
            "1,a,o1,5,2024-01-01T00:00:00Z",
            "2,b,o2,9,2024-01-02T00:00:00Z",
        ]
    );

    let json = std::fs::read_to_string(&json_path).expect("Failed to read JSON");
    let parsed: Vec<SnapshotRow> = serde_json::from_str(&json).expect("Failed to parse JSON");
    assert_eq!(parsed, rows);
}

#[test]
fn json_objects_carry_the_five_column_layout() {
    let json = render_json(&[row("1", "a", "o1", 5, "t1")]).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    let obj = value[0].as_object().unwrap();
    assert_eq!(obj.len(), 5);
    for key in ["id", "repo_name", "owner", "stars", "last_updated"] {
        assert!(obj.contains_key(key), "missing key {key}");
    }
    assert_eq!(obj["stars"], 5);
    assert_eq!(obj["owner"], "o1");
}

#[test]
fn csv_fields_are_quoted_when_needed() {
    let rows = vec![row(
        "1",
        "has,comma",
        "quote\"inside",
        3,
        "2024-01-01T00:00:00Z",
    )];

    let csv = render_csv(&rows);
    assert_eq!(
        csv.lines().nth(1).unwrap(),
        r#"1,"has,comma","quote""inside",3,2024-01-01T00:00:00Z"#
    );
}

#[test]
fn empty_store_yields_header_only_csv_and_empty_json_array() {
    let csv = render_csv(&[]);
    assert_eq!(csv, "id,repo_name,owner,stars,last_updated\n");

    let json = render_json(&[]).unwrap();
    let parsed: Vec<SnapshotRow> = serde_json::from_str(&json).unwrap();
    assert!(parsed.is_empty());
}

#[test]
fn no_temporary_files_are_left_behind() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let csv_path = dir.path().join("repos_data.csv");
    let json_path = dir.path().join("repos_data.json");

    SnapshotWriter::new(csv_path, json_path)
        .write(&[row("1", "a", "o1", 5, "t1")])
        .expect("Failed to write snapshot");

    let names: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names.len(), 2);
    assert!(names.iter().all(|n| !n.ends_with(".tmp")));
}

#[test]
fn a_second_write_overwrites_the_first() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let csv_path = dir.path().join("repos_data.csv");
    let json_path = dir.path().join("repos_data.json");
    let writer = SnapshotWriter::new(csv_path.clone(), json_path);

    writer.write(&[row("1", "a", "o1", 5, "t1")]).unwrap();
    writer
        .write(&[row("1", "a", "o1", 7, "t2"), row("2", "b", "o2", 9, "t2")])
        .unwrap();

    let csv = std::fs::read_to_string(&csv_path).unwrap();
    assert_eq!(csv.lines().count(), 3);
    assert!(csv.contains("1,a,o1,7,t2"));
}

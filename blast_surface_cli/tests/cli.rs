use assert_cmd::prelude::*;
use assert_fs::prelude::*;
use predicates::prelude::*;
use std::process::Command;

const SQUARE: &str = "0,0,10\n4,0,10\n4,4,12\n0,4,12\n2,0.8,11,collar\n2,3.2,11,collar\n";

#[test]
fn triangulate_csv_command() {
    let dir = assert_fs::TempDir::new().unwrap();
    let points = dir.child("pts.csv");
    points.write_str(SQUARE).unwrap();
    let output = dir.child("surface.json");

    Command::cargo_bin("blast_surface_cli")
        .unwrap()
        .args([
            "triangulate-csv",
            points.path().to_str().unwrap(),
            output.path().to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Triangles: 6"));

    output.assert(predicate::str::contains("\"triangles_final\": 6"));
    dir.close().unwrap();
}

#[test]
fn crossing_breaklines_warn() {
    let dir = assert_fs::TempDir::new().unwrap();
    let points = dir.child("pts.csv");
    points.write_str(SQUARE).unwrap();
    let lines = dir.child("lines.txt");
    lines
        .write_str("open\n0,0,10\n4,4,12\n\nopen\n4,0,10\n0,4,12\n")
        .unwrap();
    let output = dir.child("surface.json");

    Command::cargo_bin("blast_surface_cli")
        .unwrap()
        .args([
            "triangulate-csv",
            points.path().to_str().unwrap(),
            output.path().to_str().unwrap(),
            "--breaklines",
            lines.path().to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Triangles: 6"))
        .stdout(predicate::str::contains("Warning: breakline edge (1, 3) conflicts with (0, 2)"));
    dir.close().unwrap();
}

#[test]
fn clip_file_is_applied() {
    let dir = assert_fs::TempDir::new().unwrap();
    let points = dir.child("pts.csv");
    points.write_str("0,0,0\n1,0,0\n1,1,0\n0,1,0\n3,0,0\n3,1,0\n").unwrap();
    let clip = dir.child("clip.csv");
    clip.write_str("-0.5,-0.5\n1.5,-0.5\n1.5,1.5\n-0.5,1.5\n").unwrap();
    let output = dir.child("surface.json");

    Command::cargo_bin("blast_surface_cli")
        .unwrap()
        .args([
            "triangulate-csv",
            points.path().to_str().unwrap(),
            output.path().to_str().unwrap(),
            "--clip",
            clip.path().to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Triangles: 2"));
    dir.close().unwrap();
}

#[test]
fn triangulate_job_command() {
    let dir = assert_fs::TempDir::new().unwrap();
    let job = dir.child("job.json");
    job.write_str(
        r#"{
  "input": {
    "points": [
      { "position": { "x": -1.0, "y": 0.0, "z": 0.0 }, "tag": "HoleCollar" },
      { "position": { "x": 0.0, "y": -0.5, "z": 0.0 }, "tag": "RawPoint" },
      { "position": { "x": 1.0, "y": 0.0, "z": 0.0 }, "tag": "HoleCollar" },
      { "position": { "x": 0.0, "y": 0.5, "z": 0.0 }, "tag": "RawPoint" }
    ],
    "breaklines": [
      {
        "shape": "Open",
        "vertices": [
          { "x": -1.0, "y": 0.0, "z": 0.0 },
          { "x": 1.0, "y": 0.0, "z": 0.0 }
        ]
      }
    ]
  },
  "options": { "dedup_tolerance": 0.001 }
}"#,
    )
    .unwrap();
    let output = dir.child("surface.json");

    Command::cargo_bin("blast_surface_cli")
        .unwrap()
        .args([
            "triangulate",
            job.path().to_str().unwrap(),
            output.path().to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Triangles: 2"))
        .stdout(predicate::str::contains("Warning").not());

    output.assert(predicate::str::contains("\"constraints\""));
    dir.close().unwrap();
}

#[test]
fn bad_points_file_fails() {
    let dir = assert_fs::TempDir::new().unwrap();
    let points = dir.child("pts.csv");
    points.write_str("0,0,0\n1,zero,0\n").unwrap();
    let output = dir.child("surface.json");

    Command::cargo_bin("blast_surface_cli")
        .unwrap()
        .args([
            "triangulate-csv",
            points.path().to_str().unwrap(),
            output.path().to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("line 2"));
    dir.close().unwrap();
}

#[test]
fn collinear_points_fail() {
    let dir = assert_fs::TempDir::new().unwrap();
    let points = dir.child("pts.csv");
    points.write_str("0,0,0\n1,1,0\n2,2,0\n").unwrap();
    let output = dir.child("surface.json");

    Command::cargo_bin("blast_surface_cli")
        .unwrap()
        .args([
            "triangulate-csv",
            points.path().to_str().unwrap(),
            output.path().to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("collinear"));
    dir.close().unwrap();
}

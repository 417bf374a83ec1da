mod common;

use std::fs;

use tempfile::tempdir;
use trashbox_core::ErrorKind;

use common::{flaky_engine, sidecar_engine, trash_file, FlakyFs};

#[test]
fn move_then_restore_round_trip() {
    let home = tempdir().unwrap();
    let root = home.path().join("Trash");
    let original = trash_file(&root, &home.path().join("docs"), "notes.md", "# notes");

    assert!(!original.exists());
    let mut engine = sidecar_engine(&root);
    assert_eq!(engine.catalog().len(), 1);
    let entry = &engine.catalog().entries()[0];
    assert_eq!(entry.display_name, "notes.md");
    assert_eq!(entry.original_path, original);
    assert_eq!(entry.size_bytes, 7);

    let restored = engine
        .restore_by_name("notes", None, |_| panic!("single match"))
        .unwrap();
    assert!(restored.report.is_clean());
    assert_eq!(restored.destination, original);
    assert_eq!(fs::read_to_string(&original).unwrap(), "# notes");
    assert!(engine.catalog().is_empty());
    assert!(!root.join("info/notes.md.trashinfo").exists());
    assert!(!root.join("files/notes.md").exists());
}

#[test]
fn same_name_is_stored_with_a_suffix() {
    let home = tempdir().unwrap();
    let root = home.path().join("Trash");
    trash_file(&root, &home.path().join("a"), "report.txt", "first");
    trash_file(&root, &home.path().join("b"), "report.txt", "second");

    assert_eq!(fs::read_to_string(root.join("files/report.txt")).unwrap(), "first");
    assert_eq!(fs::read_to_string(root.join("files/report.txt.1")).unwrap(), "second");
    assert!(root.join("info/report.txt.1.trashinfo").exists());
}

#[test]
fn leftover_record_alone_blocks_a_name() {
    let home = tempdir().unwrap();
    let root = home.path().join("Trash");
    fs::create_dir_all(root.join("info")).unwrap();
    fs::write(root.join("info/a.txt.trashinfo"), "[Trash Info]\nPath=/elsewhere/a.txt\n").unwrap();

    trash_file(&root, home.path(), "a.txt", "fresh");

    assert!(!root.join("files/a.txt").exists());
    assert_eq!(fs::read_to_string(root.join("files/a.txt.1")).unwrap(), "fresh");
    assert!(root.join("info/a.txt.1.trashinfo").exists());
}

#[test]
fn failed_record_write_leaves_the_source_alone() {
    let home = tempdir().unwrap();
    let root = home.path().join("Trash");
    let victim = home.path().join("a.txt");
    fs::write(&victim, "a").unwrap();

    let engine = flaky_engine(
        &root,
        FlakyFs {
            fail_write: true,
            ..FlakyFs::default()
        },
    );
    let err = engine.move_in(&victim).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::PermissionDenied);
    assert_eq!(fs::read_to_string(&victim).unwrap(), "a");
    assert_eq!(fs::read_dir(root.join("files")).unwrap().count(), 0);
    assert_eq!(fs::read_dir(root.join("info")).unwrap().count(), 0);
}

#[test]
fn failed_move_in_rename_keeps_the_record() {
    let home = tempdir().unwrap();
    let root = home.path().join("Trash");
    let victim = home.path().join("a.txt");
    fs::write(&victim, "a").unwrap();

    let engine = flaky_engine(
        &root,
        FlakyFs {
            cross_device: true,
            ..FlakyFs::default()
        },
    );
    let err = engine.move_in(&victim).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::CrossDevice);
    assert!(victim.exists());
    assert!(root.join("info/a.txt.trashinfo").exists());
    assert_eq!(fs::read_dir(root.join("files")).unwrap().count(), 0);
}

#[cfg(unix)]
#[test]
fn non_utf8_name_comes_back_byte_for_byte() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let home = tempdir().unwrap();
    let root = home.path().join("Trash");
    let victim = home.path().join(OsStr::from_bytes(b"bad\xff.txt"));
    fs::write(&victim, "odd").unwrap();
    sidecar_engine(&root).move_in(&victim).unwrap();
    assert!(!victim.exists());

    let mut engine = sidecar_engine(&root);
    let entry = &engine.catalog().entries()[0];
    assert_eq!(entry.original_path, victim);
    let id = entry.id;

    let restored = engine.restore(id, None).unwrap();
    assert_eq!(restored.destination, victim);
    assert_eq!(fs::read_to_string(&victim).unwrap(), "odd");
    assert!(engine.catalog().is_empty());
}

#[test]
fn ambiguous_restore_uses_the_chosen_candidate() {
    let home = tempdir().unwrap();
    let root = home.path().join("Trash");
    let originals: Vec<_> = ["d0", "d1", "d2"]
        .iter()
        .map(|dir| trash_file(&root, &home.path().join(dir), "report.txt", dir))
        .collect();

    let mut engine = sidecar_engine(&root);
    let restored = engine
        .restore_by_name("report", None, |candidates| {
            assert_eq!(candidates.len(), 3);
            assert!(candidates.iter().enumerate().all(|(i, c)| c.index == i));
            Ok(1)
        })
        .unwrap();

    assert_eq!(restored.destination, originals[1]);
    assert_eq!(fs::read_to_string(&originals[1]).unwrap(), "d1");
    assert!(!originals[0].exists());
    assert!(!originals[2].exists());
    assert_eq!(engine.catalog().len(), 2);
}

#[test]
fn out_of_range_choice_changes_nothing() {
    let home = tempdir().unwrap();
    let root = home.path().join("Trash");
    for dir in ["d0", "d1", "d2"] {
        trash_file(&root, &home.path().join(dir), "report.txt", dir);
    }

    let mut engine = sidecar_engine(&root);
    let err = engine.restore_by_name("report", None, |_| Ok(5)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidSelection);
    assert_eq!(engine.catalog().len(), 3);
    assert_eq!(fs::read_dir(root.join("files")).unwrap().count(), 3);
    assert_eq!(fs::read_dir(root.join("info")).unwrap().count(), 3);
}

#[test]
fn no_match_is_not_found() {
    let home = tempdir().unwrap();
    let root = home.path().join("Trash");
    trash_file(&root, home.path(), "a.txt", "a");

    let mut engine = sidecar_engine(&root);
    let err = engine.restore_by_name("zzz", None, |_| Ok(0)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(engine.catalog().len(), 1);
}

#[test]
fn content_without_metadata_is_left_out() {
    let home = tempdir().unwrap();
    let root = home.path().join("Trash");
    trash_file(&root, home.path(), "kept.txt", "k");
    fs::write(root.join("files/orphan.txt"), "o").unwrap();
    fs::write(root.join("info/broken.txt.trashinfo"), b"[Trash Info]\nPath=\xff\xfe\n").unwrap();
    fs::write(root.join("files/broken.txt"), "b").unwrap();

    let engine = sidecar_engine(&root);
    let names: Vec<_> = engine
        .catalog()
        .entries()
        .iter()
        .map(|entry| entry.display_name.as_str())
        .collect();
    assert_eq!(names, ["kept.txt"]);
}

#[test]
fn failed_rename_leaves_store_and_catalog_alone() {
    let home = tempdir().unwrap();
    let root = home.path().join("Trash");
    let original = trash_file(&root, home.path(), "a.txt", "a");

    let mut engine = flaky_engine(
        &root,
        FlakyFs {
            fail_rename: true,
            ..FlakyFs::default()
        },
    );
    let id = engine.catalog().entries()[0].id;
    let err = engine.restore(id, None).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::PermissionDenied);
    assert!(engine.catalog().get(id).is_some());
    assert!(!original.exists());
    assert!(root.join("files/a.txt").exists());
    assert!(root.join("info/a.txt.trashinfo").exists());
}

#[test]
fn failed_metadata_removal_is_a_warning() {
    let home = tempdir().unwrap();
    let root = home.path().join("Trash");
    let original = trash_file(&root, home.path(), "a.txt", "a");

    let mut engine = flaky_engine(
        &root,
        FlakyFs {
            fail_remove: true,
            ..FlakyFs::default()
        },
    );
    let id = engine.catalog().entries()[0].id;
    let restored = engine.restore(id, None).unwrap();

    assert_eq!(restored.report.warnings.len(), 1);
    assert!(original.exists());
    assert!(engine.catalog().is_empty());
    assert!(root.join("info/a.txt.trashinfo").exists());
}

#[test]
fn existing_destination_is_a_conflict() {
    let home = tempdir().unwrap();
    let root = home.path().join("Trash");
    let original = trash_file(&root, home.path(), "a.txt", "trashed");
    fs::write(&original, "newer").unwrap();

    let mut engine = sidecar_engine(&root);
    let id = engine.catalog().entries()[0].id;
    let err = engine.restore(id, None).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(fs::read_to_string(&original).unwrap(), "newer");
    assert_eq!(engine.catalog().len(), 1);
    assert!(root.join("files/a.txt").exists());
}

#[test]
fn ids_go_stale_on_reload() {
    let home = tempdir().unwrap();
    let root = home.path().join("Trash");
    let original = trash_file(&root, home.path(), "a.txt", "a");

    let mut engine = sidecar_engine(&root);
    let stale = engine.catalog().entries()[0].id;
    engine.reload().unwrap();

    let err = engine.restore(stale, None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(!original.exists());

    let fresh = engine.catalog().entries()[0].id;
    assert_ne!(fresh, stale);
    engine.restore(fresh, None).unwrap();
    assert!(original.exists());
}

#[test]
fn restore_to_an_explicit_destination() {
    let home = tempdir().unwrap();
    let root = home.path().join("Trash");
    let original = trash_file(&root, home.path(), "a.txt", "a");
    let elsewhere = home.path().join("elsewhere.txt");

    let mut engine = sidecar_engine(&root);
    let restored = engine
        .restore_by_name("a.txt", Some(elsewhere.as_path()), |_| Ok(0))
        .unwrap();

    assert_eq!(restored.destination, elsewhere);
    assert!(elsewhere.exists());
    assert!(!original.exists());
}

//! Temporary layers disappear on every exit path of a run.

mod common;

use common::valley_workspace;
use hydrosite_lib::{
    clean_lines, read_river_layer, write_river_layer, Error, LayerKind, Result, Session,
    TempLayerGuard, CLEAN_RIVER_LAYER, TEMPORARY_VECTORS,
};

/// Clean the river layer into the temporary layer, then fail.
fn clean_then_fail(session: &Session) -> Result<()> {
    let mut guard = TempLayerGuard::new(session);
    let rivers = read_river_layer(&session.find_layer(LayerKind::Vector, "rivers")?)?;
    guard.create(LayerKind::Vector, CLEAN_RIVER_LAYER, |path| {
        write_river_layer(path, &clean_lines(&rivers))
    })?;

    session.find_layer(LayerKind::Raster, "missing")?;
    guard.release()
}

#[test]
fn early_error_still_removes_the_temporary_layer() {
    let (_dir, session) = valley_workspace();
    let err = clean_then_fail(&session).expect_err("missing raster");
    assert!(matches!(err, Error::LayerNotFound { .. }));
    assert!(!session
        .layer_exists(LayerKind::Vector, CLEAN_RIVER_LAYER)
        .unwrap());
}

#[test]
fn leftover_temporary_layer_blocks_the_run() {
    let (dir, session) = valley_workspace();
    let rivers = read_river_layer(&session.find_layer(LayerKind::Vector, "rivers").unwrap()).unwrap();
    write_river_layer(
        &session.layer_path(LayerKind::Vector, CLEAN_RIVER_LAYER).unwrap(),
        &rivers,
    )
    .unwrap();

    let err = session
        .check_temporary_vectors(TEMPORARY_VECTORS)
        .expect_err("name collision");
    assert!(matches!(err, Error::TemporaryLayerExists { .. }));

    let permissive = Session::open(Some(dir.path()), true).unwrap();
    permissive
        .check_temporary_vectors(TEMPORARY_VECTORS)
        .expect("overwrite allows reuse");
}

#[test]
fn released_guard_leaves_nothing_behind() {
    let (_dir, session) = valley_workspace();
    let path = session.layer_path(LayerKind::Vector, CLEAN_RIVER_LAYER).unwrap();
    write_river_layer(&path, &[]).unwrap();

    let mut guard = TempLayerGuard::new(&session);
    guard.register(LayerKind::Vector, CLEAN_RIVER_LAYER);
    guard.release().expect("removal succeeds");
    assert!(!path.exists());
}

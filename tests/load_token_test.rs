use flow_spotlight::{
    SceneError,
    resources::{LUCY_PATH, MeshData},
    scene::{LoadToken, SceneEvent, SceneState, load_lucy},
};

use crate::common::test_utils::grid_mesh;
mod common;

fn decode_failure() -> SceneError {
    SceneError::AssetDecodeFailure {
        path: LUCY_PATH.to_string(),
        reason: "truncated".to_string(),
    }
}

#[test]
fn clones_share_the_cancellation() {
    let token = LoadToken::new();
    let handed_to_task = token.clone();
    assert!(!handed_to_task.is_cancelled());

    token.cancel();
    assert!(handed_to_task.is_cancelled());
}

#[test]
fn live_token_accepts_the_mesh() {
    let state = SceneState::new();
    let token = LoadToken::new();
    let mesh = grid_mesh(3, 3);

    assert_eq!(state.accept_mesh(&token, Ok(mesh.clone())), Some(mesh));
}

#[test]
fn cancelled_token_makes_completion_a_no_op() {
    let state = SceneState::new();
    let token = LoadToken::new();
    token.cancel();

    assert_eq!(state.accept_mesh(&token, Ok(grid_mesh(3, 3))), None);
    assert_eq!(state.accept_mesh(&token, Err(decode_failure())), None);
}

#[test]
fn failed_load_leaves_the_scene_without_a_mesh() {
    let state = SceneState::new();
    let result: Result<MeshData, SceneError> = Err(decode_failure());
    assert_eq!(state.accept_mesh(&LoadToken::new(), result), None);
}

#[tokio::test]
async fn cancelled_load_is_abandoned_before_reading() {
    let token = LoadToken::new();
    token.cancel();

    match load_lucy(token).await {
        SceneEvent::LoadAbandoned { path } => assert_eq!(path, LUCY_PATH),
        other => panic!("expected the load to be abandoned, got {other:?}"),
    }
}

#[test]
fn unmount_releases_the_panel() {
    let mut state = common::test_utils::mounted_scene();
    assert!(state.panel.is_present());

    state.unmount();
    assert!(!state.panel.is_present());
}

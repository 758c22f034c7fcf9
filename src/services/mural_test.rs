use super::*;
use crate::net::error::ErrorKind;
use crate::services::mock_api::{MockMuralApi, mural};

// =========================================================================
// load_all
// =========================================================================

#[tokio::test]
async fn load_all_returns_both_lists() {
    let api = MockMuralApi::default();
    api.own.lock().unwrap().push_back(Ok(vec![mural("m1", "Mio")]));
    api.participant.lock().unwrap().push_back(Ok(vec![mural("m2", "Ajeno"), mural("m3", "Otro")]));

    let lists = load_all(&api).await.unwrap();
    assert_eq!(lists.own.len(), 1);
    assert_eq!(lists.participant.len(), 2);
    assert_eq!(lists.participant[0].titulo, "Ajeno");
}

#[tokio::test]
async fn load_all_fails_when_either_list_fails() {
    let api = MockMuralApi::default();
    api.participant
        .lock()
        .unwrap()
        .push_back(Err(ApiError::from_response(500, "")));

    let err = load_all(&api).await.unwrap_err();
    assert_eq!(err.status(), Some(500));
}

// =========================================================================
// create
// =========================================================================

#[tokio::test]
async fn create_attaches_owner_id_and_trims() {
    let api = MockMuralApi::default();
    api.create.lock().unwrap().push_back(Ok(mural("m9", "Viaje")));
    let owner = User { id: Some("u1".to_owned()), ..User::default() };

    let created = create(&api, "  Viaje ", " fotos ", Some(&owner)).await.unwrap();
    assert_eq!(created.id.as_deref(), Some("m9"));

    let sent = api.created.lock().unwrap()[0].clone();
    assert_eq!(sent, NewMural { titulo: "Viaje".to_owned(), descripcion: "fotos".to_owned(), user: Some("u1".to_owned()) });
}

#[tokio::test]
async fn create_blank_title_is_local_validation() {
    let api = MockMuralApi::default();
    let err = create(&api, "   ", "desc", None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(api.calls().is_empty());
}

// =========================================================================
// join / delete
// =========================================================================

#[tokio::test]
async fn join_trims_code_then_reloads() {
    let api = MockMuralApi::default();
    api.participant.lock().unwrap().push_back(Ok(vec![mural("m2", "Nuevo")]));

    let lists = join(&api, "  XK21 ").await.unwrap();
    assert_eq!(lists.participant, vec![mural("m2", "Nuevo")]);
    assert_eq!(api.calls(), vec!["join XK21", "own", "participant"]);
}

#[tokio::test]
async fn join_rejection_surfaces_server_message_without_reload() {
    let api = MockMuralApi::default();
    api.join
        .lock()
        .unwrap()
        .push_back(Err(ApiError::from_response(404, r#"{"message":"Código inválido"}"#)));

    let err = join(&api, "NOPE").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Operation);
    assert_eq!(err.messages(), vec!["Código inválido".to_owned()]);
    assert_eq!(api.calls(), vec!["join NOPE"]);
}

#[tokio::test]
async fn join_blank_code_is_local_validation() {
    let api = MockMuralApi::default();
    assert_eq!(join(&api, " ").await.unwrap_err().kind(), ErrorKind::Validation);
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn delete_then_reload() {
    let api = MockMuralApi::default();
    let lists = delete(&api, "m1").await.unwrap();
    assert_eq!(lists, MuralLists::default());
    assert_eq!(api.calls(), vec!["delete m1", "own", "participant"]);
}

#[tokio::test]
async fn delete_forbidden_does_not_reload() {
    let api = MockMuralApi::default();
    api.delete
        .lock()
        .unwrap()
        .push_back(Err(ApiError::from_response(403, r#"{"message":"No autorizado"}"#)));
    let err = delete(&api, "m1").await.unwrap_err();
    assert_eq!(err.status(), Some(403));
    assert_eq!(api.calls(), vec!["delete m1"]);
}

// =========================================================================
// contents / update
// =========================================================================

#[tokio::test]
async fn contents_requires_id() {
    let api = MockMuralApi::default();
    assert_eq!(contents(&api, "").await.unwrap_err().kind(), ErrorKind::Validation);
    assert!(contents(&api, "m1").await.unwrap().is_empty());
    assert_eq!(api.calls(), vec!["contents m1"]);
}

#[tokio::test]
async fn update_rejects_empty_and_blank_title() {
    let api = MockMuralApi::default();
    let empty = update(&api, "m1", &MuralUpdate::default()).await.unwrap_err();
    assert_eq!(empty.messages(), vec!["nothing to update".to_owned()]);

    let blank = MuralUpdate { titulo: Some(" ".to_owned()), descripcion: None };
    let err = update(&api, "m1", &blank).await.unwrap_err();
    assert_eq!(err.messages(), vec!["titulo is required".to_owned()]);
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn update_sends_to_service() {
    let api = MockMuralApi::default();
    api.update.lock().unwrap().push_back(Ok(mural("m1", "Renombrado")));
    let change = MuralUpdate { titulo: Some("Renombrado".to_owned()), descripcion: None };
    let updated = update(&api, "m1", &change).await.unwrap();
    assert_eq!(updated.titulo, "Renombrado");
}

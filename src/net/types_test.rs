use super::*;
use serde_json::json;

// =============================================================
// User decoding
// =============================================================

#[test]
fn user_decodes_numeric_id_and_camel_case_name() {
    let user: User = serde_json::from_value(json!({ "id": 1, "nombreUsuario": "a" })).unwrap();
    assert_eq!(user.id.as_deref(), Some("1"));
    assert_eq!(user.nombre_usuario.as_deref(), Some("a"));
    assert_eq!(user.correo, None);
}

#[test]
fn user_decodes_mongo_style_id() {
    let user: User =
        serde_json::from_value(json!({ "_id": "665f", "nombreUsuario": "moni123", "correo": "moni@gmail.com" }))
            .unwrap();
    assert_eq!(user.id.as_deref(), Some("665f"));
    assert_eq!(user.correo.as_deref(), Some("moni@gmail.com"));
}

#[test]
fn user_ignores_unknown_fields() {
    let user: User =
        serde_json::from_value(json!({ "id": "u1", "createdAt": "2024-01-01", "password": "hash" })).unwrap();
    assert_eq!(user.id.as_deref(), Some("u1"));
}

#[test]
fn user_rejects_object_id() {
    let result = serde_json::from_value::<User>(json!({ "id": { "$oid": "x" } }));
    assert!(result.is_err());
}

#[test]
fn user_with_both_id_keys_prefers_id() {
    let user: User = serde_json::from_value(json!({ "id": 7, "_id": "665f", "nombreUsuario": "a" })).unwrap();
    assert_eq!(user.id.as_deref(), Some("7"));

    let user: User = serde_json::from_value(json!({ "id": null, "_id": "665f" })).unwrap();
    assert_eq!(user.id.as_deref(), Some("665f"));
}

#[test]
fn user_merge_replaces_only_present_fields() {
    let mut user = User {
        id: Some("1".to_owned()),
        nombre_usuario: Some("old".to_owned()),
        correo: Some("old@example.com".to_owned()),
    };
    user.merge(User { id: None, nombre_usuario: Some("new".to_owned()), correo: None });
    assert_eq!(user.id.as_deref(), Some("1"));
    assert_eq!(user.nombre_usuario.as_deref(), Some("new"));
    assert_eq!(user.correo.as_deref(), Some("old@example.com"));
}

#[test]
fn display_name_falls_back_through_fields() {
    let mut user = User { id: Some("7".to_owned()), nombre_usuario: None, correo: Some("c@d.io".to_owned()) };
    assert_eq!(user.display_name(), "c@d.io");
    user.correo = None;
    assert_eq!(user.display_name(), "7");
    user.nombre_usuario = Some("ana".to_owned());
    assert_eq!(user.display_name(), "ana");
}

// =============================================================
// Mural / Contenido decoding
// =============================================================

#[test]
fn mural_decodes_populated_owner() {
    let mural: Mural = serde_json::from_value(json!({
        "_id": "m1",
        "titulo": "Clase 3B",
        "descripcion": "Fotos del viaje",
        "codigoAcceso": "XK21",
        "user": { "_id": "u1", "nombreUsuario": "profe" }
    }))
    .unwrap();
    assert_eq!(mural.id.as_deref(), Some("m1"));
    assert_eq!(mural.codigo_acceso.as_deref(), Some("XK21"));
    let owner = mural.user.unwrap();
    assert_eq!(owner.id(), Some("u1"));
    assert!(matches!(owner, UserRef::User(ref u) if u.nombre_usuario.as_deref() == Some("profe")));
}

#[test]
fn mural_decodes_bare_owner_id() {
    let mural: Mural = serde_json::from_value(json!({ "_id": "m2", "titulo": "t", "user": "u9" })).unwrap();
    assert_eq!(mural.user, Some(UserRef::Id("u9".to_owned())));
}

#[test]
fn mural_decodes_numeric_owner_and_both_id_keys() {
    let mural: Mural = serde_json::from_value(json!({ "id": "m3", "_id": "665f", "titulo": "t", "user": 42 })).unwrap();
    assert_eq!(mural.id.as_deref(), Some("m3"));
    assert_eq!(mural.user, Some(UserRef::Id("42".to_owned())));
    assert_eq!(mural.user.as_ref().and_then(UserRef::id), Some("42"));
}

#[test]
fn contenido_with_both_id_keys_decodes() {
    let contenido: Contenido = serde_json::from_value(json!({ "id": "c9", "_id": "665f", "texto": "hola", "user": 3 })).unwrap();
    assert_eq!(contenido.id.as_deref(), Some("c9"));
    assert_eq!(contenido.user.and_then(|u| u.id().map(str::to_owned)).as_deref(), Some("3"));
}

#[test]
fn contenido_decodes_archivo_and_date() {
    let contenido: Contenido = serde_json::from_value(json!({
        "_id": "c1",
        "texto": "hola",
        "archivo": { "secure_url": "https://cdn.example/x.png", "public_id": "x" },
        "fechaSubida": "2024-05-01T10:00:00Z"
    }))
    .unwrap();
    assert_eq!(contenido.texto, "hola");
    assert_eq!(contenido.archivo.unwrap().secure_url.as_deref(), Some("https://cdn.example/x.png"));
    assert_eq!(contenido.fecha_subida.as_deref(), Some("2024-05-01T10:00:00Z"));
}

// =============================================================
// Request payloads
// =============================================================

#[test]
fn registration_serializes_wire_names() {
    let reg = Registration {
        nombre_usuario: "ana".to_owned(),
        correo: "ana@example.com".to_owned(),
        password: "pw".to_owned(),
    };
    assert_eq!(
        serde_json::to_value(&reg).unwrap(),
        json!({ "nombreUsuario": "ana", "correo": "ana@example.com", "password": "pw" })
    );
}

#[test]
fn profile_update_omits_absent_fields() {
    let update = ProfileUpdate { nombre_usuario: Some("new".to_owned()), correo: None };
    assert_eq!(serde_json::to_value(&update).unwrap(), json!({ "nombreUsuario": "new" }));
}

#[test]
fn new_mural_omits_missing_owner() {
    let mural = NewMural { titulo: "t".to_owned(), descripcion: String::new(), user: None };
    assert_eq!(serde_json::to_value(&mural).unwrap(), json!({ "titulo": "t", "descripcion": "" }));
}

// =============================================================
// Validation
// =============================================================

#[test]
fn credentials_validate_accepts_plain_email() {
    assert!(Credentials::new("a@b.com", "x").validate().is_ok());
}

#[test]
fn credentials_validate_reports_every_missing_field() {
    let errors = Credentials::new(" ", "").validate().unwrap_err();
    assert_eq!(errors, vec!["correo is required".to_owned(), "password is required".to_owned()]);
}

#[test]
fn credentials_validate_rejects_malformed_email() {
    for bad in ["ana", "ana@", "@b.com", "a@b", "a@@b.com", "a b@c.com"] {
        let errors = Credentials::new(bad, "x").validate().unwrap_err();
        assert_eq!(errors, vec!["correo is not a valid email address".to_owned()], "input: {bad}");
    }
}

#[test]
fn registration_validate_requires_name() {
    let reg = Registration { nombre_usuario: String::new(), correo: "a@b.com".to_owned(), password: "x".to_owned() };
    assert_eq!(reg.validate().unwrap_err(), vec!["nombreUsuario is required".to_owned()]);
}

#[test]
fn profile_update_validate_rejects_empty_update() {
    let errors = ProfileUpdate::default().validate().unwrap_err();
    assert_eq!(errors, vec!["nothing to update".to_owned()]);
}

#[test]
fn profile_update_validate_rejects_blank_name() {
    let update = ProfileUpdate { nombre_usuario: Some("  ".to_owned()), correo: None };
    assert_eq!(update.validate().unwrap_err(), vec!["nombreUsuario is required".to_owned()]);
}

// =============================================================
// Error bodies
// =============================================================

#[test]
fn error_body_single_message_becomes_list() {
    let body: ErrorBody = serde_json::from_value(json!({ "message": "Mural no encontrado" })).unwrap();
    assert_eq!(body.message.unwrap().into_messages(), vec!["Mural no encontrado".to_owned()]);
}

#[test]
fn error_body_message_list_drops_blanks() {
    let body: ErrorBody = serde_json::from_value(json!({ "message": ["bad credentials", " ", ""] })).unwrap();
    assert_eq!(body.message.unwrap().into_messages(), vec!["bad credentials".to_owned()]);
}

#[test]
fn error_body_without_message() {
    let body: ErrorBody = serde_json::from_value(json!({ "error": "boom" })).unwrap();
    assert_eq!(body.message, None);
}

// =============================================================
// Attachment
// =============================================================

#[test]
fn attachment_guesses_content_type() {
    assert_eq!(Attachment::new("foto.png", vec![1, 2]).content_type, "image/png");
    assert_eq!(Attachment::new("notas", vec![]).content_type, "application/octet-stream");
}

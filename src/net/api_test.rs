use super::*;
use crate::net::token::MemoryTokenStore;

#[test]
fn board_endpoints_format_expected_paths() {
    assert_eq!(mural_contents_endpoint("m1"), "/verPublicacionesMural/m1");
    assert_eq!(update_mural_endpoint("m1"), "/actualizarMural/m1");
    assert_eq!(delete_mural_endpoint("m1"), "/bajarMural/m1");
    assert_eq!(upload_contenido_endpoint("m1"), "/subirPublicacion/m1");
}

#[test]
fn parse_optional_user_empty_body_is_none() {
    assert_eq!(parse_optional_user("").unwrap(), None);
    assert_eq!(parse_optional_user("  \n").unwrap(), None);
}

#[test]
fn parse_optional_user_null_is_none() {
    assert_eq!(parse_optional_user("null").unwrap(), None);
}

#[test]
fn parse_optional_user_record() {
    let user = parse_optional_user(r#"{"id":"u1","nombreUsuario":"ana"}"#)
        .unwrap()
        .unwrap();
    assert_eq!(user.nombre_usuario.as_deref(), Some("ana"));
}

#[test]
fn parse_optional_user_garbage_is_decode_error() {
    assert!(matches!(parse_optional_user("<html>"), Err(ApiError::Decode(_))));
}

#[test]
fn parse_json_list_of_murales() {
    let murales: Vec<Mural> = parse_json(r#"[{"_id":"m1","titulo":"a"},{"_id":"m2","titulo":"b"}]"#).unwrap();
    assert_eq!(murales.len(), 2);
    assert_eq!(murales[1].titulo, "b");
}

#[test]
fn success_range() {
    assert!(is_success(200));
    assert!(is_success(204));
    assert!(!is_success(304));
    assert!(!is_success(401));
}

#[test]
fn new_trims_trailing_slash_from_base_url() {
    let config = ClientConfig { base_url: "http://localhost:4000/".to_owned(), ..ClientConfig::default() };
    let api = HttpApi::new(&config, Arc::new(MemoryTokenStore::new())).unwrap();
    assert_eq!(api.base_url(), "http://localhost:4000");
    assert_eq!(api.url(LOGIN_PATH), "http://localhost:4000/login");
}

#[test]
fn absorb_cookies_saves_and_clears_token() {
    let tokens = Arc::new(MemoryTokenStore::new());
    let api = HttpApi::new(&ClientConfig::default(), tokens.clone()).unwrap();

    let mut headers = HeaderMap::new();
    headers.append(SET_COOKIE, "theme=dark".parse().unwrap());
    headers.append(SET_COOKIE, "token=abc; Path=/; HttpOnly".parse().unwrap());
    api.absorb_cookies(&headers);
    assert_eq!(tokens.load().unwrap().as_deref(), Some("abc"));

    let mut headers = HeaderMap::new();
    headers.append(SET_COOKIE, "token=; Max-Age=0".parse().unwrap());
    api.absorb_cookies(&headers);
    assert_eq!(tokens.load().unwrap(), None);
}

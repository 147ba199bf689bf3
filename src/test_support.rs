use std::net::SocketAddr;

use actix_web::{
    App, Error,
    body::MessageBody,
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    test::TestRequest,
    web,
};

use crate::{
    auth::{handlers::issue_tokens, password::hash_password},
    config::Config,
    models::TokenPair,
    routes::{self, RateLimits},
    store::Store,
    utils::email_index::EmailIndex,
};

const PEER: &str = "127.0.0.1:40000";

pub fn app(
    store: web::Data<Store>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = Error,
        InitError = (),
    >,
> {
    app_with_config(store, Config::for_tests())
}

pub fn app_with_config(
    store: web::Data<Store>,
    config: Config,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = Error,
        InitError = (),
    >,
> {
    let limits = RateLimits::new(&config);
    let data = web::Data::new(config.clone());

    App::new()
        .app_data(store)
        .app_data(web::Data::new(EmailIndex::default()))
        .app_data(data)
        .configure(move |cfg| routes::configure(cfg, &config, &limits))
}

fn peer() -> SocketAddr {
    PEER.parse().expect("valid peer address")
}

// The governor keys on the peer address, so every request needs one.
pub fn get(uri: &str) -> TestRequest {
    TestRequest::get().uri(uri).peer_addr(peer())
}

pub fn post(uri: &str) -> TestRequest {
    TestRequest::post().uri(uri).peer_addr(peer())
}

pub fn put(uri: &str) -> TestRequest {
    TestRequest::put().uri(uri).peer_addr(peer())
}

pub fn delete(uri: &str) -> TestRequest {
    TestRequest::delete().uri(uri).peer_addr(peer())
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {token}"))
}

/// Creates a user named "Tester" and signs them in.
pub fn register(store: &Store, email: &str) -> TokenPair {
    let user = store
        .insert_user("Tester", email, hash_password("pw").unwrap())
        .unwrap();
    issue_tokens(&user, store, &Config::for_tests()).unwrap()
}

pub mod auth;
pub mod chats;
pub mod conversations;
pub mod messages;
pub mod profiles;

use axum::Router;

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(conversations::router())
        .merge(chats::router())
        .merge(messages::router())
        .merge(profiles::router())
}
